//! Entities held by a room.

use std::collections::BTreeMap;

use serde::Serialize;

use super::value_object::{ClientId, Role, Timestamp};

/// A participant currently registered in a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub id: ClientId,
    pub role: Role,
    pub joined_at: Timestamp,
}

impl Member {
    pub fn new(id: ClientId, role: Role, joined_at: Timestamp) -> Self {
        Self {
            id,
            role,
            joined_at,
        }
    }
}

/// Problem metadata replicated between the two participants.
///
/// Every field is optional. Merging follows last-non-empty-write-wins per
/// field: an empty incoming value never clears what is already stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProblemFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub meta: Option<serde_json::Value>,
    pub hints: Option<Vec<String>>,
    pub snippets: Option<BTreeMap<String, String>>,
}

impl ProblemFields {
    /// Overwrite every field for which `update` carries a non-empty value.
    pub fn merge_from(&mut self, update: &ProblemFields) {
        if let Some(title) = update.title.as_ref().filter(|t| !t.is_empty()) {
            self.title = Some(title.clone());
        }
        if let Some(description) = update.description.as_ref().filter(|d| !d.is_empty()) {
            self.description = Some(description.clone());
        }
        if let Some(meta) = update.meta.as_ref().filter(|m| !is_empty_json(m)) {
            self.meta = Some(meta.clone());
        }
        if let Some(hints) = update.hints.as_ref().filter(|h| !h.is_empty()) {
            self.hints = Some(hints.clone());
        }
        if let Some(snippets) = update.snippets.as_ref().filter(|s| !s.is_empty()) {
            self.snippets = Some(snippets.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == ProblemFields::default()
    }
}

fn is_empty_json(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::String(s) => s.is_empty(),
        serde_json::Value::Array(a) => a.is_empty(),
        serde_json::Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

/// Session state replicated to late joiners
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub code: String,
    pub language: String,
    pub problem: ProblemFields,
}
