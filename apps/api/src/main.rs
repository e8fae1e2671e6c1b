mod assist;
mod auth;
mod bundle;
mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod profile;
mod routes;
mod state;
mod store;
mod template;

#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::spawn_session_sweeper;
use crate::bundle::assets::{AssetSource, DirAssetSource, HttpAssetSource};
use crate::bundle::PreviewSlots;
use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::llm_client::{GeminiClient, TextGenerator};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{AccountStore, MemoryStore, PgStore, ProfileStore};
use crate::template::StylesheetCache;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Folio API v{}", env!("CARGO_PKG_VERSION"));

    // Persistence: Postgres when configured, otherwise process memory
    let (accounts, profiles): (Arc<dyn AccountStore>, Arc<dyn ProfileStore>) =
        match &config.database_url {
            Some(url) => {
                let pool = create_pool(url).await?;
                ensure_schema(&pool).await?;
                let store = Arc::new(PgStore::new(pool));
                (store.clone(), store)
            }
            None => {
                warn!("DATABASE_URL is not set; accounts and profiles are kept in memory");
                let store = Arc::new(MemoryStore::new());
                (store.clone(), store)
            }
        };

    // Text generation
    let assistant: Option<Arc<dyn TextGenerator>> = match &config.gemini_api_key {
        Some(key) => {
            let client = GeminiClient::new(key.clone(), config.gemini_model.clone());
            info!("LLM client initialized (model: {})", client.model());
            Some(Arc::new(client))
        }
        None => {
            warn!("GEMINI_API_KEY is not set; proofreading and question generation are disabled");
            None
        }
    };

    // Static assets and template stylesheets
    let assets: Arc<dyn AssetSource> = match &config.asset_base_url {
        Some(base) => {
            info!("Fetching assets from {base}");
            Arc::new(HttpAssetSource::new(
                base,
                Duration::from_secs(config.asset_fetch_timeout_secs),
            )?)
        }
        None => {
            info!("Reading assets from {}", config.assets_dir);
            Arc::new(DirAssetSource::new(&config.assets_dir))
        }
    };
    let stylesheets = StylesheetCache::load(assets.as_ref()).await;

    let state = AppState {
        accounts,
        profiles,
        assistant,
        assets,
        stylesheets: Arc::new(stylesheets),
        previews: Arc::new(PreviewSlots::default()),
        config: config.clone(),
    };

    spawn_session_sweeper(
        state.clone(),
        Duration::from_secs(config.session_sweep_minutes * 60),
    );

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
