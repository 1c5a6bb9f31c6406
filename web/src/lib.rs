use axum::http::{header, HeaderValue, Method};
use domain::pipeline::PipelineConfig;
use domain::{embedding, generation};
use log::*;
use sea_orm::DatabaseConnection;
use service::config::Config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

mod controller;
mod error;
mod params;
mod response;
pub mod router;

pub use error::{Error, Result};

// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub service_state: service::AppState,
    pub pipeline_config: Arc<PipelineConfig>,
    pub embedder: Arc<dyn embedding::Provider>,
    pub generator: Arc<dyn generation::Provider>,
    /// Held for the duration of a processing run so two runs never interleave
    /// their module and version writes.
    pub pipeline_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(
        service_state: service::AppState,
        pipeline_config: PipelineConfig,
        embedder: Arc<dyn embedding::Provider>,
        generator: Arc<dyn generation::Provider>,
    ) -> Self {
        Self {
            service_state,
            pipeline_config: Arc::new(pipeline_config),
            embedder,
            generator,
            pipeline_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Builds the state the server runs with: pipeline settings from `config`
    /// and the Gemini client as both embedding and generation provider.
    pub async fn from_config(
        config: Config,
        db: &Arc<DatabaseConnection>,
    ) -> core::result::Result<Self, domain::error::Error> {
        let pipeline_config = PipelineConfig::from_config(&config).await?;
        let gemini = Arc::new(domain::gateway::gemini::GeminiClient::from_config(&config)?);

        Ok(Self::new(
            service::AppState::new(config, db),
            pipeline_config,
            gemini.clone(),
            gemini,
        ))
    }

    pub fn db_conn_ref(&self) -> &DatabaseConnection {
        self.service_state.db_conn_ref()
    }

    pub fn config(&self) -> &Config {
        &self.service_state.config
    }
}

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let config = app_state.config();
    let interface = config.interface.as_deref().unwrap_or("127.0.0.1");
    let server_url = format!("{interface}:{}", config.port);

    info!("Server starting... listening for connections on http://{server_url}");

    let allowed_origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {origin:?}");
                None
            }
        })
        .collect();

    let cors_layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_credentials(true)
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
        .allow_origin(allowed_origins);

    let listener = TcpListener::bind(&server_url).await?;
    axum::serve(listener, router::define_routes(app_state).layer(cors_layer)).await
}
