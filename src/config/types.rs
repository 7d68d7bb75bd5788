use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::metrics::MetricsConfig;
use super::store::StoreConfig;

/// Environment variable holding the MongoDB connection string.
pub const MONGO_URI_ENV: &str = "MONGO_URI";
/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "ITEMDEMO_CONFIG";
/// Prefix for environment overrides, e.g. `ITEMDEMO_LOGGING__LEVEL=debug`.
pub const ENV_PREFIX: &str = "ITEMDEMO_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0. Every section has defaults, so an empty file is valid.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
#[serde(default)]
pub struct ConfigV1 {
    pub bind_address: String,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

impl Default for ConfigV1 {
    fn default() -> Self {
        ConfigV1 {
            bind_address: "0.0.0.0:3000".to_string(),
            store: StoreConfig::default(),
            logging: LoggingConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

/// Builds the layered configuration: defaults, then the YAML file, then the environment.
pub fn figment() -> Figment {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "./config.yaml".to_string());

    Figment::new()
        .merge(Serialized::defaults(Config::ConfigV1(ConfigV1::default())))
        .merge(Yaml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .merge(Env::raw().only(&[MONGO_URI_ENV]).map(|_| "store.uri".into()))
}

/// Extracts a `ConfigV1` from any figment, so tests can feed their own providers.
pub fn extract(figment: &Figment) -> Result<ConfigV1, figment::Error> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
}

/// Load config from the layered sources, exiting the process if it is invalid.
pub fn load_config() -> ConfigV1 {
    match extract(&figment()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() -> Result<(), serde_json::Error> {
    let schema = schema_for!(Config);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
