use log::*;
use service::{config::Config, logging::Logger};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to start logger: {e}");
    }

    info!(
        "Starting meeting_trainer v{} [{}]",
        env!("CARGO_PKG_VERSION"),
        config.runtime_env()
    );
    info!("Writing training modules to {}", config.output_dir().display());

    let db = match service::init_database(&config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let app_state = match web::AppState::from_config(config, &db).await {
        Ok(app_state) => app_state,
        Err(e) => {
            error!("Failed to configure the processing pipeline: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = web::init_server(app_state).await {
        error!("Server exited with an error: {e}");
        std::process::exit(1);
    }
}
