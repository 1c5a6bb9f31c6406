use config::Config;
use log::info;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::sync::Arc;
use tokio::time::Duration;

pub mod config;
pub mod logging;

/// PostgreSQL schema holding every table owned by this service.
pub const DATABASE_SCHEMA: &str = "meeting_trainer";

/// Opens the connection pool described by `config`.
pub async fn init_database(config: &Config) -> Result<DatabaseConnection, DbErr> {
    info!(
        "Connecting to the database (pool {}..{} connections, schema {DATABASE_SCHEMA})",
        config.db_min_connections, config.db_max_connections,
    );

    Database::connect(connect_options(config)).await
}

fn connect_options(config: &Config) -> ConnectOptions {
    let seconds = Duration::from_secs;

    let mut options = ConnectOptions::new(config.database_url());
    options
        .max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections)
        .connect_timeout(seconds(config.db_connect_timeout_secs))
        .acquire_timeout(seconds(config.db_acquire_timeout_secs))
        .idle_timeout(seconds(config.db_idle_timeout_secs))
        .max_lifetime(seconds(config.db_max_lifetime_secs))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug)
        .set_schema_search_path(DATABASE_SCHEMA);
    options
}

/// Infrastructure shared by every request: the pool and the loaded config.
#[derive(Clone)]
pub struct AppState {
    pub database_connection: Arc<DatabaseConnection>,
    pub config: Config,
}

impl AppState {
    pub fn new(app_config: Config, db: &Arc<DatabaseConnection>) -> Self {
        Self {
            database_connection: Arc::clone(db),
            config: app_config,
        }
    }

    pub fn db_conn_ref(&self) -> &DatabaseConnection {
        &self.database_connection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_options_apply_pool_settings() {
        let mut config = Config::from_env();
        config.db_max_connections = 12;
        config.db_min_connections = 2;
        config.db_idle_timeout_secs = 30;

        let options = connect_options(&config);

        assert_eq!(options.get_url(), config.database_url());
        assert_eq!(options.get_max_connections(), Some(12));
        assert_eq!(options.get_min_connections(), Some(2));
        assert_eq!(options.get_idle_timeout(), Some(Duration::from_secs(30)));
    }
}
