use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Settings for the Prometheus registry exposed on `/metrics`.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
#[serde(default)]
pub struct MetricsConfig {
    /// Value of the `app` label attached to every series.
    pub app_label: String,
    /// Register the process collector (CPU, memory, open fds). Linux only.
    pub process_metrics: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        MetricsConfig {
            app_label: "items-demo".to_string(),
            process_metrics: true,
        }
    }
}
