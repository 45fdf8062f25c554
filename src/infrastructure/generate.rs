//! # Generation Backend Client
//!
//! Sends chat prompts to the hosted generation backend and extracts the
//! assistant reply from its JSON response.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::domain::config::AppConfig;
use crate::domain::traits::Generator;
use crate::infrastructure::http_client;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
}

/// Client for the `/generate` endpoint of the remote backend.
#[derive(Debug, Clone)]
pub struct GenerateClient {
    base_url: String,
    timeout: Duration,
}

impl GenerateClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            base_url: config.backend.generate_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeouts.request),
        }
    }
}

/// Pulls the assistant reply out of a raw response body. The backend is
/// expected to answer with a JSON object carrying a `response` field; when
/// the field is missing the whole object is passed through verbatim so the
/// caller still sees what came back.
fn parse_reply(body: &str) -> Result<String, String> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| format!("invalid response from backend: {e}"))?;
    match value.get("response").and_then(Value::as_str) {
        Some(reply) if !reply.is_empty() => Ok(reply.to_string()),
        _ => Ok(value.to_string()),
    }
}

#[async_trait]
impl Generator for GenerateClient {
    async fn generate(&self, prompt: &str) -> Result<String, String> {
        let url = format!("{}/generate", self.base_url);
        let request = GenerateRequest { prompt };

        let response = http_client()
            .post(&url)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        // The backend reports some failures as JSON bodies on non-2xx
        // statuses, so the body is read before any status check.
        let body = response.text().await.map_err(|e| e.to_string())?;
        parse_reply(&body)
    }
}
