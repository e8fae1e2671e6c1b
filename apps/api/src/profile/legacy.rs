//! Load-time upconverter for persisted profile documents.
//!
//! Version 1 documents (no `schemaVersion`) may store `questions` as one
//! formatted string of blank-line separated `Q<n>.` / `A<n>.` paragraphs.
//! The upconverter turns that into the structured list once, at the data
//! load boundary; renderers only ever see `ProfileDocument`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::profile::record::{ProfileDocument, QuestionEntry, CURRENT_SCHEMA_VERSION};
use crate::template::TemplateKey;

static QUESTION_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Q\d+\.\s*").expect("question prefix pattern is valid"));
static ANSWER_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^A\d+\.\s*").expect("answer prefix pattern is valid"));

/// Converts a stored JSON document of any known schema version into the
/// current `ProfileDocument`.
pub fn upconvert(mut stored: Value) -> Result<ProfileDocument, AppError> {
    let root = stored
        .as_object_mut()
        .ok_or_else(|| anyhow::anyhow!("Stored profile is not a JSON object"))?;

    let version = root
        .get("schemaVersion")
        .and_then(Value::as_u64)
        .unwrap_or(1);

    if version < u64::from(CURRENT_SCHEMA_VERSION) {
        if let Some(content) = root.get_mut("content").and_then(Value::as_object_mut) {
            upgrade_questions_v1(content);
        }
        root.insert("schemaVersion".into(), Value::from(CURRENT_SCHEMA_VERSION));
    }

    // An unknown template key in storage falls back to the default rather
    // than making the whole profile unreadable.
    let template_known = match root.get("templateId") {
        Some(Value::String(key)) => key.parse::<TemplateKey>().is_ok(),
        _ => false,
    };
    if !template_known {
        if let Some(old) = root.insert(
            "templateId".into(),
            Value::from(TemplateKey::default().as_str()),
        ) {
            warn!("Stored profile has unknown templateId {old}; using default");
        }
    }

    serde_json::from_value(stored)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Stored profile is malformed: {e}")))
}

fn upgrade_questions_v1(content: &mut serde_json::Map<String, Value>) {
    let upgraded = match content.get("questions") {
        Some(Value::String(text)) => {
            let parsed = parse_legacy_questions(text);
            debug!("Upconverted {} legacy question entries", parsed.len());
            parsed
        }
        Some(Value::Array(_)) => return,
        _ => Vec::new(),
    };
    match serde_json::to_value(upgraded) {
        Ok(list) => {
            content.insert("questions".into(), list);
        }
        Err(e) => warn!("Could not encode upconverted questions: {e}"),
    }
}

/// Parses the legacy string form of the questions list.
///
/// A `Q` paragraph opens a question, the next `A` paragraph answers and
/// closes it. A `Q` with no following `A` is dropped. Ids are assigned
/// sequentially from 1 in output order.
pub fn parse_legacy_questions(text: &str) -> Vec<QuestionEntry> {
    let mut entries = Vec::new();
    let mut open_question: Option<String> = None;

    for block in paragraphs(text) {
        if block.starts_with('Q') {
            if let Some(dropped) = open_question.replace(strip(&QUESTION_PREFIX, &block)) {
                debug!("Dropping legacy question without answer: {dropped}");
            }
        } else if block.starts_with('A') {
            if let Some(question) = open_question.take() {
                entries.push(QuestionEntry {
                    id: (entries.len() + 1).to_string(),
                    question,
                    answer: strip(&ANSWER_PREFIX, &block),
                });
            }
        }
    }

    if let Some(dropped) = open_question {
        debug!("Dropping trailing legacy question without answer: {dropped}");
    }

    entries
}

fn strip(prefix: &Regex, block: &str) -> String {
    prefix.replace(block, "").into_owned()
}

/// Splits text into trimmed paragraphs on blank (whitespace-only) lines.
fn paragraphs(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(current.join("\n").trim().to_string());
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current.join("\n").trim().to_string());
    }

    blocks
}
