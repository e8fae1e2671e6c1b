use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::bundle::assets::AssetSource;
use crate::errors::AppError;
use crate::template::{TemplateKey, TEMPLATES};

/// Template stylesheets fetched once at startup, keyed by template.
#[derive(Debug, Default, Clone)]
pub struct StylesheetCache {
    sheets: HashMap<TemplateKey, Arc<str>>,
}

impl StylesheetCache {
    /// Fetches every registered template's stylesheet. A template whose
    /// stylesheet cannot be fetched stays unavailable until restart.
    pub async fn load(source: &dyn AssetSource) -> Self {
        let mut sheets = HashMap::new();
        for descriptor in TEMPLATES {
            match source.fetch(descriptor.css_path).await {
                Ok(bytes) => match String::from_utf8(bytes.to_vec()) {
                    Ok(css) => {
                        sheets.insert(descriptor.key, Arc::from(css));
                    }
                    Err(e) => warn!(
                        "Stylesheet {} for template {} is not UTF-8: {e}",
                        descriptor.css_path, descriptor.key
                    ),
                },
                Err(e) => warn!(
                    "Failed to fetch stylesheet for template {}: {e}",
                    descriptor.key
                ),
            }
        }
        info!(
            "Loaded {}/{} template stylesheets",
            sheets.len(),
            TEMPLATES.len()
        );
        Self { sheets }
    }

    #[cfg(test)]
    pub fn from_map(sheets: HashMap<TemplateKey, Arc<str>>) -> Self {
        Self { sheets }
    }

    pub fn get(&self, key: TemplateKey) -> Option<&str> {
        self.sheets.get(&key).map(|css| css.as_ref())
    }

    pub fn is_loaded(&self, key: TemplateKey) -> bool {
        self.sheets.contains_key(&key)
    }

    /// Like `get`, but a missing stylesheet is a service-level error.
    pub fn require(&self, key: TemplateKey) -> Result<&str, AppError> {
        self.get(key).ok_or_else(|| {
            AppError::Unavailable(format!(
                "Stylesheet for template '{key}' is not loaded yet; try again later"
            ))
        })
    }
}
