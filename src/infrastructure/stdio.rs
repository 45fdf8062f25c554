//! # Stdio Transport
//!
//! Protocol events go to stdout, one JSON object per line. Nothing else may
//! write to stdout while the session runs or the editor side would choke on
//! it; diagnostics belong in the log file.

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::domain::traits::EventSink;
use crate::domain::types::UiEvent;

/// Writes events to the process stdout.
#[derive(Debug, Default, Clone)]
pub struct StdoutSink;

#[async_trait]
impl EventSink for StdoutSink {
    async fn emit(&self, event: UiEvent) -> Result<(), String> {
        let line = serde_json::to_string(&event).map_err(|e| e.to_string())?;
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(line.as_bytes())
            .await
            .map_err(|e| e.to_string())?;
        stdout.write_all(b"\n").await.map_err(|e| e.to_string())?;
        stdout.flush().await.map_err(|e| e.to_string())?;
        Ok(())
    }
}
