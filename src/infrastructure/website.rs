//! # Website Builder Client
//!
//! Talks to the local website building service: intent analysis over
//! `/chat`, generation kickoff over `/generate`, and a server-sent-events
//! progress stream per task.

use std::time::Duration;

use async_stream::stream;
use bytes::BytesMut;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::domain::config::AppConfig;
use crate::infrastructure::http_client;

#[derive(Debug, Serialize)]
struct ChatPayload<'a> {
    message: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerateForm<'a> {
    prompt: &'a str,
    is_edit: bool,
}

/// Reply from the `/chat` intent endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub reply: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub is_edit: bool,
}

/// Reply from the `/generate` kickoff endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// One progress record from the generation stream.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StreamUpdate {
    Log {
        #[serde(default)]
        message: String,
    },
    Summary {
        #[serde(default)]
        message: String,
    },
    Generating {
        #[serde(default)]
        file: String,
        #[serde(default)]
        progress: u32,
    },
    Complete {
        preview_url: Option<String>,
        zip_url: Option<String>,
    },
    Error {
        #[serde(default)]
        message: String,
    },
}

impl StreamUpdate {
    fn is_terminal(&self) -> bool {
        matches!(self, StreamUpdate::Complete { .. } | StreamUpdate::Error { .. })
    }
}

/// Parses one line of the event stream. Lines without the `data:` prefix and
/// lines whose payload does not decode are both dropped.
fn parse_stream_line(line: &str) -> Option<StreamUpdate> {
    let payload = line.trim().strip_prefix("data:")?;
    serde_json::from_str(payload.trim()).ok()
}

/// Client for the website building service.
#[derive(Debug, Clone)]
pub struct WebsiteClient {
    base_url: String,
    health_timeout: Duration,
    chat_timeout: Duration,
    stream_timeout: Duration,
}

impl WebsiteClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            base_url: config.backend.website_url.trim_end_matches('/').to_string(),
            health_timeout: Duration::from_secs(config.timeouts.health),
            chat_timeout: Duration::from_secs(config.timeouts.website_chat),
            stream_timeout: Duration::from_secs(config.timeouts.website_stream),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Probes `/health`. Any transport error counts as unavailable.
    pub async fn available(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match http_client()
            .get(&url)
            .timeout(self.health_timeout)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// Asks the service what the user wants done with this message.
    pub async fn chat(&self, message: &str) -> Result<ChatReply, String> {
        let url = format!("{}/chat", self.base_url);
        let response = http_client()
            .post(&url)
            .timeout(self.chat_timeout)
            .json(&ChatPayload { message })
            .send()
            .await
            .map_err(|e| e.to_string())?
            .error_for_status()
            .map_err(|e| e.to_string())?;
        response.json::<ChatReply>().await.map_err(|e| e.to_string())
    }

    /// Kicks off a generation task. The service expects form encoding here,
    /// not JSON.
    pub async fn start_generation(
        &self,
        prompt: &str,
        is_edit: bool,
    ) -> Result<GenerateReply, String> {
        let url = format!("{}/generate", self.base_url);
        let response = http_client()
            .post(&url)
            .timeout(self.chat_timeout)
            .form(&GenerateForm { prompt, is_edit })
            .send()
            .await
            .map_err(|e| e.to_string())?
            .error_for_status()
            .map_err(|e| e.to_string())?;
        response
            .json::<GenerateReply>()
            .await
            .map_err(|e| e.to_string())
    }

    /// Opens the progress stream for a task. The stream ends after a
    /// `complete` or `error` update, or when the connection drops.
    pub fn updates(
        &self,
        task_id: &str,
    ) -> impl Stream<Item = Result<StreamUpdate, String>> + Send {
        let url = format!("{}/generate_stream/{}", self.base_url, task_id);
        let timeout = self.stream_timeout;
        stream! {
            let response = match http_client().get(&url).timeout(timeout).send().await {
                Ok(response) => response,
                Err(e) => {
                    yield Err(e.to_string());
                    return;
                }
            };
            let response = match response.error_for_status() {
                Ok(response) => response,
                Err(e) => {
                    yield Err(e.to_string());
                    return;
                }
            };

            let mut body = response.bytes_stream();
            let mut buffer = BytesMut::new();
            while let Some(chunk) = body.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        yield Err(e.to_string());
                        return;
                    }
                };
                buffer.extend_from_slice(&chunk);
                while let Some(newline) = buffer.iter().position(|&b| b == b'\n') {
                    let line = buffer.split_to(newline + 1);
                    let line = String::from_utf8_lossy(&line);
                    if let Some(update) = parse_stream_line(&line) {
                        let terminal = update.is_terminal();
                        yield Ok(update);
                        if terminal {
                            return;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stream_line_log() {
        let update = parse_stream_line(r#"data: {"status": "log", "message": "Planning pages"}"#);
        assert_eq!(
            update,
            Some(StreamUpdate::Log {
                message: "Planning pages".to_string()
            })
        );
    }

    #[test]
    fn test_parse_stream_line_generating() {
        let update =
            parse_stream_line(r#"data: {"status": "generating", "file": "index.html", "progress": 40}"#);
        assert_eq!(
            update,
            Some(StreamUpdate::Generating {
                file: "index.html".to_string(),
                progress: 40
            })
        );
    }

    #[test]
    fn test_parse_stream_line_complete() {
        let update = parse_stream_line(
            r#"data: {"status": "complete", "preview_url": "/preview/abc", "zip_url": "/download/abc.zip"}"#,
        );
        assert_eq!(
            update,
            Some(StreamUpdate::Complete {
                preview_url: Some("/preview/abc".to_string()),
                zip_url: Some("/download/abc.zip".to_string()),
            })
        );
    }

    #[test]
    fn test_parse_stream_line_ignores_heartbeats_and_garbage() {
        assert_eq!(parse_stream_line(""), None);
        assert_eq!(parse_stream_line(": keep-alive"), None);
        assert_eq!(parse_stream_line("data: not json"), None);
        assert_eq!(parse_stream_line(r#"data: {"status": "unheard-of"}"#), None);
    }

    #[test]
    fn test_terminal_updates() {
        assert!(StreamUpdate::Complete {
            preview_url: None,
            zip_url: None
        }
        .is_terminal());
        assert!(StreamUpdate::Error {
            message: "boom".to_string()
        }
        .is_terminal());
        assert!(!StreamUpdate::Log {
            message: String::new()
        }
        .is_terminal());
    }
}
