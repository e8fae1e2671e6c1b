//! Profile record: the structured portfolio content a user edits.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::AppError;
use crate::template::TemplateKey;

/// Schema version written on every save. Documents without a version are
/// treated as version 1 and may carry the legacy string-shaped `questions`.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// A single interview-style question and the user's answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionEntry {
    #[serde(deserialize_with = "nullable_string")]
    pub id: String,
    #[serde(deserialize_with = "nullable_string")]
    pub question: String,
    #[serde(deserialize_with = "nullable_string")]
    pub answer: String,
}

/// The portfolio content. Field names on the wire follow the persisted
/// shape (`yourName`, `self_pr`, ...). Every field defaults to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileRecord {
    #[serde(rename = "yourName", deserialize_with = "nullable_string")]
    pub your_name: String,
    #[serde(deserialize_with = "nullable_string")]
    pub hometown: String,
    #[serde(deserialize_with = "nullable_string")]
    pub university: String,
    #[serde(deserialize_with = "nullable_string")]
    pub faculty: String,
    #[serde(deserialize_with = "nullable_string")]
    pub dream: String,
    #[serde(deserialize_with = "list_or_csv")]
    pub hobby: Vec<String>,
    #[serde(deserialize_with = "list_or_csv")]
    pub skill: Vec<String>,
    #[serde(deserialize_with = "nullable_string")]
    pub self_pr: String,
    #[serde(deserialize_with = "nullable_list")]
    pub questions: Vec<QuestionEntry>,
}

impl ProfileRecord {
    /// Checks the record invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), AppError> {
        let mut seen = HashSet::with_capacity(self.questions.len());
        for q in &self.questions {
            if !seen.insert(q.id.as_str()) {
                return Err(AppError::Validation(format!(
                    "Duplicate question id '{}'",
                    q.id
                )));
            }
        }
        Ok(())
    }
}

/// The persisted document: record plus the selected template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDocument {
    pub content: ProfileRecord,
    #[serde(default)]
    pub template_id: TemplateKey,
    #[serde(default = "current_schema_version")]
    pub schema_version: u32,
}

impl ProfileDocument {
    pub fn new(content: ProfileRecord, template_id: TemplateKey) -> Self {
        Self {
            content,
            template_id,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }
}

fn current_schema_version() -> u32 {
    CURRENT_SCHEMA_VERSION
}

/// Splits comma-separated form input into trimmed, non-empty items.
pub fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn nullable_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListInput {
    Items(Vec<Option<String>>),
    Csv(String),
    Missing(()),
}

fn list_or_csv<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match ListInput::deserialize(deserializer)? {
        ListInput::Items(items) => items.into_iter().map(Option::unwrap_or_default).collect(),
        ListInput::Csv(text) => split_list(&text),
        ListInput::Missing(()) => Vec::new(),
    })
}
