//! services/api/src/adapters/judge0.rs
//!
//! This module contains the adapter for the Judge0 code execution API (RapidAPI
//! hosted edition). It implements the `CodeExecutionService` port from the `core` crate.

use async_trait::async_trait;
use codelab_core::domain::ExecutionRequest;
use codelab_core::ports::{CodeExecutionService, PortError, PortResult};
use serde::Serialize;
use std::time::Duration;
use tracing::error;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that submits code to Judge0 and waits for the result in the same call.
#[derive(Clone)]
pub struct Judge0Adapter {
    client: reqwest::Client,
    base_url: String,
    api_host: String,
    api_key: String,
}

/// The JSON body Judge0 expects for a submission.
#[derive(Serialize)]
struct SubmissionBody<'a> {
    source_code: &'a str,
    language_id: i64,
    stdin: &'a str,
}

impl<'a> From<&'a ExecutionRequest> for SubmissionBody<'a> {
    fn from(request: &'a ExecutionRequest) -> Self {
        Self {
            source_code: &request.source_code,
            language_id: request.language_id,
            stdin: request.stdin.as_deref().unwrap_or(""),
        }
    }
}

impl Judge0Adapter {
    /// Creates a new `Judge0Adapter` whose requests give up after `timeout`.
    pub fn new(
        base_url: String,
        api_host: String,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            api_host,
            api_key,
        })
    }

    fn submissions_url(&self) -> String {
        format!(
            "{}/submissions?base64_encoded=false&wait=true",
            self.base_url.trim_end_matches('/')
        )
    }
}

//=========================================================================================
// `CodeExecutionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CodeExecutionService for Judge0Adapter {
    async fn execute(&self, request: &ExecutionRequest) -> PortResult<serde_json::Value> {
        let response = self
            .client
            .post(self.submissions_url())
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", &self.api_host)
            .json(&SubmissionBody::from(request))
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!("Judge0 submission failed with {}: {}", status, message);
            return Err(PortError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}
