use std::sync::Arc;

use crate::bundle::assets::AssetSource;
use crate::bundle::PreviewSlots;
use crate::config::Config;
use crate::llm_client::TextGenerator;
use crate::store::{AccountStore, ProfileStore};
use crate::template::StylesheetCache;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountStore>,
    pub profiles: Arc<dyn ProfileStore>,
    /// `None` when no API key is configured; assist endpoints answer 503.
    pub assistant: Option<Arc<dyn TextGenerator>>,
    pub assets: Arc<dyn AssetSource>,
    pub stylesheets: Arc<StylesheetCache>,
    pub previews: Arc<PreviewSlots>,
    pub config: Config,
}
