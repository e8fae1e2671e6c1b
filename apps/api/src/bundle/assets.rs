//! Static asset sources: template stylesheets and the fixed images some
//! skeletons reference by relative path.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset '{0}' not found")]
    NotFound(String),

    #[error("asset path '{0}' is not a relative path inside the asset root")]
    InvalidPath(String),

    #[error("asset '{path}' returned status {status}")]
    Status { path: String, status: u16 },

    #[error("asset '{path}' request failed: {source}")]
    Http {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("asset '{path}' could not be read: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Where fixed assets come from. Paths are relative to the asset root,
/// e.g. `css/pattern1.css` or `img/logo.png`.
#[async_trait]
pub trait AssetSource: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<Bytes, AssetError>;
}

/// Fetches assets over HTTP from a base URL, with a bounded per-request timeout.
pub struct HttpAssetSource {
    client: Client,
    base_url: String,
}

impl HttpAssetSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl AssetSource for HttpAssetSource {
    async fn fetch(&self, path: &str) -> Result<Bytes, AssetError> {
        let path = checked_relative(path)?;
        let url = format!("{}/{}", self.base_url, path);
        debug!("Fetching asset {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| AssetError::Http {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AssetError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(AssetError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        response.bytes().await.map_err(|source| AssetError::Http {
            path: path.to_string(),
            source,
        })
    }
}

/// Reads assets from a local directory.
pub struct DirAssetSource {
    root: PathBuf,
}

impl DirAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl AssetSource for DirAssetSource {
    async fn fetch(&self, path: &str) -> Result<Bytes, AssetError> {
        let rel = checked_relative(path)?;
        match tokio::fs::read(self.root.join(rel)).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AssetError::NotFound(path.to_string()))
            }
            Err(source) => Err(AssetError::Io {
                path: path.to_string(),
                source,
            }),
        }
    }
}

fn checked_relative(path: &str) -> Result<&str, AssetError> {
    let ok = !path.is_empty()
        && Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if ok {
        Ok(path)
    } else {
        Err(AssetError::InvalidPath(path.to_string()))
    }
}

/// A fixed image fetched for a bundle, stored as `img/<name>`.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticAsset {
    pub name: String,
    pub bytes: Bytes,
}

/// Fetches `img/<name>` for every name concurrently. Failures are logged
/// and skipped; the successes come back in the order of `names`.
pub async fn fetch_static_assets(
    source: Arc<dyn AssetSource>,
    names: &[&'static str],
) -> Vec<StaticAsset> {
    let mut tasks = JoinSet::new();
    for (index, name) in names.iter().copied().enumerate() {
        let source = Arc::clone(&source);
        tasks.spawn(async move {
            let result = source.fetch(&format!("img/{name}")).await;
            (index, name, result)
        });
    }

    let mut fetched = Vec::with_capacity(names.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, name, Ok(bytes))) => fetched.push((
                index,
                StaticAsset {
                    name: name.to_string(),
                    bytes,
                },
            )),
            Ok((_, name, Err(e))) => warn!("Skipping static asset {name}: {e}"),
            Err(e) => warn!("Static asset fetch task failed: {e}"),
        }
    }

    fetched.sort_by_key(|(index, _)| *index);
    fetched.into_iter().map(|(_, asset)| asset).collect()
}
