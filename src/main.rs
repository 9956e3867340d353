//! Service entry point: configuration, logging, state wiring, HTTP serve.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use finbot::config::{credential_is_usable, Config};
use finbot::executor::Database;
use finbot::provider::{ModelClient, OpenAiChatModel};
use finbot::resolver::Resolver;
use finbot::{http, logging, schema};

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const CACHE_CAPACITY: usize = 1024;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = match Config::load(DEFAULT_CONFIG_PATH) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("config file unavailable ({e}), using defaults with env overrides");
            Config::from_env()
        }
    };
    config.apply_logging_env();
    logging::init();

    let model: Option<Arc<dyn ModelClient>> = match Config::get_api_key() {
        Ok(key) if credential_is_usable(&key) => {
            info!(model = %config.provider.model, "provider credential loaded");
            Some(Arc::new(OpenAiChatModel::new(
                config.provider.endpoint.as_deref(),
                key.trim(),
                &config.provider.model,
                Duration::from_secs(config.provider.timeout_secs),
            )))
        }
        _ => {
            warn!("no usable provider credential; questions will report a configuration error");
            None
        }
    };

    let db = Arc::new(Database::connect(&config.database)?);
    info!(dialect = ?db.dialect(), url = %config.database.url, "database connected");

    let schema = schema::load(&db).await;
    info!(tables = schema.tables.len(), "schema context ready");

    let resolver = Arc::new(Resolver::new(model, db, &schema, CACHE_CAPACITY));
    let app = http::router(resolver);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
