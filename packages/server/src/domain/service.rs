//! External collaborators consumed by the hub.
//!
//! The question service and the code-execution engine are black boxes: they
//! return a value or an error and never touch room state directly.

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

/// Problem statement returned by the question service
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub title: String,
    pub title_slug: String,
    /// HTML body of the problem
    pub description: String,
    pub difficulty: String,
    pub likes: i64,
    pub hints: Vec<String>,
    /// Language slug (e.g. `python3`, `cpp`) to starter code
    pub snippets: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionLookupError {
    #[error("no question found for '{0}'")]
    NotFound(String),

    #[error("question service timed out")]
    Timeout,

    #[error("question service error: {0}")]
    Upstream(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionLookup: Send + Sync {
    /// Resolve a keyword or title slug to a full question.
    async fn find(&self, keyword: &str) -> Result<Question, QuestionLookupError>;
}

/// Program submitted for execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSubmission {
    /// Normalized language slug understood by the engine
    pub language: String,
    pub code: String,
    pub stdin: String,
}

impl CodeSubmission {
    pub fn new(language: &str, code: String, stdin: String) -> Self {
        Self {
            language: normalize_language(language),
            code,
            stdin,
        }
    }
}

/// Lower-case a language name, mapping `C++` to the engine's `cpp`.
pub fn normalize_language(language: &str) -> String {
    let lang = language.trim().to_lowercase();
    if lang == "c++" { "cpp".to_string() } else { lang }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeExecutionError {
    #[error("execution timed out")]
    Timeout,

    #[error("failed to call execution engine: {0}")]
    Upstream(String),

    #[error("execution engine returned an invalid response: {0}")]
    InvalidResponse(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CodeExecutor: Send + Sync {
    /// Run a submission and return the engine's result document
    /// (stdout, stderr, exit status).
    async fn execute(
        &self,
        submission: &CodeSubmission,
    ) -> Result<serde_json::Value, CodeExecutionError>;
}
