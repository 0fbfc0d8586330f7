//! `CodeExecutor` that forwards submissions to a remote engine over HTTP.
//!
//! The engine expects `{"language", "code", "stdin"}` with the source
//! base64-encoded and answers with a JSON result document.

use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::Serialize;

use crate::domain::{CodeExecutionError, CodeExecutor, CodeSubmission};

#[derive(Debug, Serialize, PartialEq)]
struct EngineRequest<'a> {
    language: &'a str,
    code: String,
    stdin: &'a str,
}

impl<'a> From<&'a CodeSubmission> for EngineRequest<'a> {
    fn from(submission: &'a CodeSubmission) -> Self {
        Self {
            language: &submission.language,
            code: STANDARD.encode(submission.code.as_bytes()),
            stdin: &submission.stdin,
        }
    }
}

pub struct HttpCodeExecutor {
    client: reqwest::Client,
    engine_url: String,
}

impl HttpCodeExecutor {
    pub fn new(engine_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            engine_url: engine_url.into(),
        })
    }
}

#[async_trait]
impl CodeExecutor for HttpCodeExecutor {
    async fn execute(
        &self,
        submission: &CodeSubmission,
    ) -> Result<serde_json::Value, CodeExecutionError> {
        let response = self
            .client
            .post(&self.engine_url)
            .json(&EngineRequest::from(submission))
            .send()
            .await
            .map_err(engine_error)?;

        let status = response.status();
        let body = response.text().await.map_err(engine_error)?;
        if !status.is_success() {
            return Err(CodeExecutionError::Upstream(format!(
                "engine responded with {status}: {body}"
            )));
        }

        parse_result(&body)
    }
}

fn engine_error(e: reqwest::Error) -> CodeExecutionError {
    if e.is_timeout() {
        CodeExecutionError::Timeout
    } else {
        CodeExecutionError::Upstream(e.to_string())
    }
}

fn parse_result(body: &str) -> Result<serde_json::Value, CodeExecutionError> {
    serde_json::from_str(body).map_err(|e| CodeExecutionError::InvalidResponse(e.to_string()))
}
