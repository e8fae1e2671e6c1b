//! Shared fixtures for unit and router tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;

use crate::auth::{hash_token, new_token};
use crate::bundle::assets::{AssetError, AssetSource};
use crate::bundle::PreviewSlots;
use crate::config::Config;
use crate::llm_client::{LlmError, TextGenerator};
use crate::profile::record::{ProfileRecord, QuestionEntry};
use crate::state::AppState;
use crate::store::{AccountStore, MemoryStore};
use crate::template::{StylesheetCache, TemplateKey, TEMPLATES};

pub fn sample_record() -> ProfileRecord {
    ProfileRecord {
        your_name: "山田 太郎".into(),
        hometown: "大阪府".into(),
        university: "東京大学".into(),
        faculty: "工学部 情報工学科".into(),
        dream: "世界を変えるエンジニア".into(),
        hobby: vec!["読書".into(), "ランニング".into()],
        skill: vec!["Python".into(), "HTML".into(), "CSS".into()],
        self_pr: "line1\nline2".into(),
        questions: vec![QuestionEntry {
            id: "1".into(),
            question: "チームワークで重視することは何ですか？".into(),
            answer: "相互尊重です。\n対話も大切です。".into(),
        }],
    }
}

/// In-memory asset source. Missing paths answer `NotFound`.
#[derive(Debug, Default)]
pub struct MapAssetSource {
    files: HashMap<String, Bytes>,
}

impl MapAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str, bytes: &[u8]) -> Self {
        self.files
            .insert(path.to_string(), Bytes::copy_from_slice(bytes));
        self
    }

    /// Every template stylesheet plus the profile card images.
    pub fn complete() -> Self {
        let mut source = Self::new()
            .with("img/logo.png", b"logo-bytes")
            .with("img/english-icon.png", b"flag-bytes");
        for d in TEMPLATES {
            source = source.with(d.css_path, format!("/* {} */", d.key).as_bytes());
        }
        source
    }
}

#[async_trait]
impl AssetSource for MapAssetSource {
    async fn fetch(&self, path: &str) -> Result<Bytes, AssetError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(path.to_string()))
    }
}

/// Scripted text generator that records the prompts it receives.
pub struct FakeGenerator {
    reply: Result<String, fn() -> LlmError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl FakeGenerator {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            delay: None,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn failing(error: fn() -> LlmError) -> Self {
        Self {
            reply: Err(error),
            ..Self::replying("")
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(make) => Err(make()),
        }
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: None,
        gemini_api_key: None,
        gemini_model: "gemini-1.5-flash".into(),
        ai_timeout_secs: 10,
        asset_base_url: None,
        assets_dir: "assets".into(),
        asset_fetch_timeout_secs: 5,
        session_ttl_hours: 1,
        session_sweep_minutes: 30,
        max_upload_bytes: 1024,
        port: 0,
        rust_log: "info".into(),
    }
}

/// State backed by a fresh `MemoryStore`, fully loaded stylesheets and the
/// given generator. The store is returned for direct seeding.
pub fn test_state(generator: Option<FakeGenerator>) -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let sheets = TemplateKey::ALL
        .into_iter()
        .map(|key| (key, Arc::<str>::from(format!("/* {key} */"))))
        .collect();

    let state = AppState {
        accounts: store.clone(),
        profiles: store.clone(),
        assistant: generator.map(|g| Arc::new(g) as Arc<dyn TextGenerator>),
        assets: Arc::new(MapAssetSource::complete()),
        stylesheets: Arc::new(StylesheetCache::from_map(sheets)),
        previews: Arc::new(PreviewSlots::default()),
        config: test_config(),
    };
    (state, store)
}

/// Creates a user with a live session and returns its id and bearer token.
pub async fn seed_session(store: &MemoryStore, email: &str) -> (Uuid, String) {
    let user = store.create_user(email, "not-a-real-hash").await.unwrap();
    let token = new_token();
    store
        .create_session(user.id, &hash_token(&token), Utc::now() + chrono::Duration::hours(1))
        .await
        .unwrap();
    (user.id, token)
}
