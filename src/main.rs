use std::sync::Arc;

use itemdemo::config::{load_config, print_schema};
use itemdemo::startup;
use itemdemo::utils::logger::init_logging;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if std::env::args().any(|arg| arg == "--schema") {
        if let Err(e) = print_schema() {
            eprintln!("Failed to render configuration schema: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let config = load_config();

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
    info!(
        "Starting {} {}",
        config.logging.service_name, config.logging.service_version
    );

    if let Err(e) = startup::run(Arc::new(config)).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
