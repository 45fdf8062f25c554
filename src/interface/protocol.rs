//! # Protocol Loop
//!
//! Reads one JSON message per line from the editor and drives the session
//! until an `exit` message arrives or the pipe closes. A line that is not
//! JSON at all is answered with an `error` event; a JSON object of an
//! unknown shape is logged and dropped.

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::application::session::Session;
use crate::domain::traits::EventSink;
use crate::domain::types::{Inbound, UiEvent};
use crate::strings::messages;

/// Runs the protocol loop to completion. Emits `ready` before reading the
/// first line.
pub async fn run<R>(reader: R, session: &mut Session, sink: &impl EventSink) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    sink.emit(UiEvent::Ready { text: messages::READY.to_string() })
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let value: serde_json::Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "discarding malformed protocol line");
                if let Err(e) = sink
                    .emit(UiEvent::Error { text: messages::invalid_message(line) })
                    .await
                {
                    tracing::error!(error = %e, "failed to report protocol error");
                }
                continue;
            }
        };
        let inbound: Inbound = match serde_json::from_value(value) {
            Ok(inbound) => inbound,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unrecognized protocol message");
                continue;
            }
        };

        if inbound == Inbound::Exit {
            tracing::info!("exit requested by editor");
            break;
        }
        if let Err(e) = dispatch(session, sink, inbound).await {
            tracing::error!(error = %e, "failed to handle protocol message");
        }
    }
    Ok(())
}

async fn dispatch(
    session: &mut Session,
    sink: &impl EventSink,
    inbound: Inbound,
) -> Result<(), String> {
    match inbound {
        Inbound::Message { text, files } => {
            if !files.is_empty() {
                tracing::debug!(count = files.len(), "attachments received and ignored");
            }
            session.handle_message(sink, &text).await
        }
        Inbound::Config { workspace_path } => session.handle_config(sink, workspace_path).await,
        Inbound::FileOperation { action, fields } => {
            session.handle_file_operation(sink, action, fields).await
        }
        Inbound::ConfirmationResponse { confirmed, action } => {
            session.handle_confirmation_response(sink, confirmed, &action).await
        }
        Inbound::Exit => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use tokio::io::BufReader;

    use crate::domain::config::AppConfig;
    use crate::domain::traits::Generator;
    use crate::infrastructure::website::WebsiteClient;

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<UiEvent>>,
    }

    impl RecordingSink {
        fn events(&self) -> Vec<UiEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EventSink for RecordingSink {
        async fn emit(&self, event: UiEvent) -> Result<(), String> {
            self.events.lock().unwrap().push(event);
            Ok(())
        }
    }

    struct EchoGenerator;

    #[async_trait]
    impl Generator for EchoGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, String> {
            Ok("echo".to_string())
        }
    }

    fn fresh_session() -> Session {
        let config = AppConfig::default();
        let website = WebsiteClient::new(&config);
        Session::new(config, Arc::new(EchoGenerator), website)
    }

    async fn run_script(script: &str) -> Vec<UiEvent> {
        let mut session = fresh_session();
        let sink = RecordingSink::default();
        run(BufReader::new(script.as_bytes()), &mut session, &sink).await.unwrap();
        sink.events()
    }

    #[tokio::test]
    async fn emits_ready_then_processes_lines() {
        let events = run_script("{\"type\": \"message\", \"text\": \"hi\"}\n").await;
        assert_eq!(
            events,
            vec![
                UiEvent::Ready { text: messages::READY.to_string() },
                UiEvent::Response { text: messages::GREETING_REPLY.to_string() },
            ]
        );
    }

    #[tokio::test]
    async fn malformed_line_reports_an_error_and_continues() {
        let events = run_script("this is not json\n{\"type\": \"message\", \"text\": \"hey\"}\n").await;
        assert_eq!(events.len(), 3);
        match &events[1] {
            UiEvent::Error { text } => {
                assert!(text.starts_with("Invalid JSON message received: this is not json"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(
            events[2],
            UiEvent::Response { text: messages::GREETING_REPLY.to_string() }
        );
    }

    #[tokio::test]
    async fn unknown_message_types_are_dropped_silently() {
        let events = run_script("{\"type\": \"telemetry\", \"data\": 1}\n").await;
        assert_eq!(events, vec![UiEvent::Ready { text: messages::READY.to_string() }]);
    }

    #[tokio::test]
    async fn exit_stops_the_loop_before_later_lines() {
        let events =
            run_script("{\"type\": \"exit\"}\n{\"type\": \"message\", \"text\": \"hi\"}\n").await;
        assert_eq!(events, vec![UiEvent::Ready { text: messages::READY.to_string() }]);
    }

    #[tokio::test]
    async fn blank_lines_are_skipped() {
        let events = run_script("\n   \n{\"type\": \"exit\"}\n").await;
        assert_eq!(events, vec![UiEvent::Ready { text: messages::READY.to_string() }]);
    }
}
