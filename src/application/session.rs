//! # Chat Session
//!
//! Owns the per-session state: workspace root, conversation history and the
//! confirmation slot. Every inbound message runs through a fixed chain of
//! intent checks (direct run, pending confirmation, website request,
//! greeting) before falling back to the generation backend.

use std::path::PathBuf;
use std::sync::Arc;

use futures::{StreamExt, pin_mut};
use regex::Regex;
use serde_json::{Map, Value};

use crate::application::compose;
use crate::application::confirm::{self, ConfirmationDecision, ConfirmationGate, Resolution};
use crate::application::dispatch;
use crate::application::extract;
use crate::application::runner;
use crate::application::workspace::Workspace;
use crate::domain::config::AppConfig;
use crate::domain::traits::{EventSink, Generator};
use crate::domain::types::{ActionRequest, Outcome, PendingAction, UiEvent};
use crate::infrastructure::website::{StreamUpdate, WebsiteClient};
use crate::strings::{messages, prompts};

const WEBSITE_KEYWORDS: &[&str] = &[
    "build website", "create website", "generate website", "make website",
    "build a website", "create a website", "generate a website", "make a website",
    "build me a website", "create me a website", "generate me a website",
    "e-commerce website", "ecommerce website", "portfolio website", "business website",
    "landing page", "web app", "web application", "react website", "react site",
    "online store", "shop website", "company website", "personal website",
    "blog website", "dashboard website", "admin panel", "website for",
];

const GREETING_KEYWORDS: &[&str] = &["hi", "hello", "hey", "help", "start"];

/// Words that match the run-file patterns but are clearly not filenames.
const COMMON_WORDS: &[&str] = &[
    "the", "a", "an", "this", "that", "these", "those", "my", "your", "our", "their",
];

fn is_website_request(text: &str) -> bool {
    let lower = text.to_lowercase();
    WEBSITE_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

fn is_greeting(text: &str) -> bool {
    let lower = text.to_lowercase();
    GREETING_KEYWORDS.iter().any(|keyword| lower.starts_with(keyword)) && text.chars().count() < 20
}

/// Looks for a "run/test/execute <file>" request that can be handled without
/// the generation backend. Extensionless targets are assumed to be Python.
fn detect_direct_run(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    let patterns = [
        Regex::new(r"run\s+([a-zA-Z0-9_./-]+)").unwrap(),
        Regex::new(r"test\s+([a-zA-Z0-9_./-]+)").unwrap(),
        Regex::new(r"execute\s+([a-zA-Z0-9_./-]+)").unwrap(),
    ];
    for pattern in &patterns {
        for captures in pattern.captures_iter(&lower) {
            let target = &captures[1];
            if COMMON_WORDS.contains(&target) {
                continue;
            }
            let mut target = target.to_string();
            if !target.contains('.') && !target.ends_with('/') {
                target.push_str(".py");
            }
            return Some(target);
        }
    }
    None
}

/// One editor-facing chat session.
pub struct Session {
    config: AppConfig,
    generator: Arc<dyn Generator>,
    website: WebsiteClient,
    workspace: Workspace,
    gate: ConfirmationGate,
    history: String,
}

impl Session {
    pub fn new(config: AppConfig, generator: Arc<dyn Generator>, website: WebsiteClient) -> Self {
        let workspace = Workspace::new(config.workspace.path.as_ref().map(PathBuf::from));
        Self {
            config,
            generator,
            website,
            workspace,
            gate: ConfirmationGate::default(),
            history: String::new(),
        }
    }

    /// Routes one chat message. The checks run in a fixed order; the first
    /// one that claims the message handles it entirely.
    pub async fn handle_message(
        &mut self,
        sink: &impl EventSink,
        text: &str,
    ) -> Result<(), String> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }

        if let Some(path) = detect_direct_run(text) {
            tracing::info!(path, "direct run request");
            let outcome = match self.workspace.root() {
                Some(root) => runner::run_file(root, &path, "none", self.config.timeouts.run).await,
                None => Outcome::error(messages::NO_WORKSPACE),
            };
            let reply = messages::running_file(&path, &outcome.render());
            return sink.emit(UiEvent::Response { text: reply }).await;
        }

        // A reply only counts as a confirmation answer while something is
        // actually suspended; otherwise "no" is just conversation.
        if self.gate.is_open() {
            if let Some(decision) = ConfirmationDecision::from_reply(text) {
                let pending = self.gate.take();
                let resolution = confirm::resolve(self.workspace.root(), pending, decision);
                return self.report_resolution(sink, resolution).await;
            }
        }

        if is_website_request(text) {
            return self.run_website_flow(sink, text).await;
        }

        if is_greeting(text) {
            return sink
                .emit(UiEvent::Response { text: messages::GREETING_REPLY.to_string() })
                .await;
        }

        self.chat_turn(sink, text).await
    }

    /// The generation path: prompt the backend, execute any actions embedded
    /// in the reply, compose the final text.
    async fn chat_turn(&mut self, sink: &impl EventSink, text: &str) -> Result<(), String> {
        sink.emit(UiEvent::Thinking).await?;

        let prompt = prompts::build_prompt(&self.history, text);
        let reply = match self.generator.generate(&prompt).await {
            Ok(reply) => reply.trim().to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "generation request failed");
                return sink
                    .emit(UiEvent::Error { text: messages::connect_failed(&e) })
                    .await;
            }
        };
        self.history.push_str(&format!("User: {text}\nAssistant: {reply}\n"));

        let mut spans = Vec::new();
        let mut blocks = Vec::new();
        for (value, start, end) in extract::extract_json_objects(&reply) {
            spans.push((start, end));
            let Some(request) = ActionRequest::new(value) else {
                continue;
            };
            let (outcomes, signal) =
                dispatch::execute_action(&self.workspace, &request, self.config.timeouts.run).await;
            blocks.push(compose::render_block(&outcomes));
            if let Some(signal) = signal {
                self.gate.suspend(signal.pending.clone());
                sink.emit(UiEvent::Confirmation { text: signal.prompt, action: signal.pending })
                    .await?;
            }
        }

        let text = compose::compose_response(&reply, &spans, &blocks);
        sink.emit(UiEvent::Response { text }).await
    }

    /// Applies a workspace path sent by the editor, creating it if needed.
    pub async fn handle_config(
        &mut self,
        sink: &impl EventSink,
        workspace_path: Option<String>,
    ) -> Result<(), String> {
        let Some(path) = workspace_path else {
            return Ok(());
        };
        let root = PathBuf::from(&path);
        if !root.exists() {
            if let Err(e) = std::fs::create_dir_all(&root) {
                return sink
                    .emit(UiEvent::Error {
                        text: messages::file_operation_failed(&e.to_string()),
                    })
                    .await;
            }
        }
        tracing::info!(path, "workspace configured");
        self.workspace.set_root(root);
        sink.emit(UiEvent::Status { text: messages::workspace_set(&path) }).await
    }

    /// Runs one action requested directly by the editor, bypassing the
    /// confirmation gate.
    pub async fn handle_file_operation(
        &mut self,
        sink: &impl EventSink,
        action: String,
        fields: Map<String, Value>,
    ) -> Result<(), String> {
        let mut object = fields;
        object.insert("action".to_string(), Value::String(action));
        let Some(request) = ActionRequest::new(Value::Object(object)) else {
            return Ok(());
        };
        match dispatch::execute_file_operation(&self.workspace, &request, self.config.timeouts.run)
            .await
        {
            Ok(outcomes) => {
                sink.emit(UiEvent::Response { text: compose::render_block(&outcomes) }).await
            }
            Err(e) => {
                sink.emit(UiEvent::Error {
                    text: messages::file_operation_failed(&e.to_string()),
                })
                .await
            }
        }
    }

    /// Applies a structured confirmation answer from the editor UI. The slot
    /// is cleared no matter which branch runs.
    pub async fn handle_confirmation_response(
        &mut self,
        sink: &impl EventSink,
        confirmed: bool,
        action: &str,
    ) -> Result<(), String> {
        let pending = self.gate.take();
        match ConfirmationDecision::from_protocol(confirmed, action) {
            Some(decision) => {
                let resolution = confirm::resolve(self.workspace.root(), pending, decision);
                self.report_resolution(sink, resolution).await
            }
            None => {
                let outcome = if pending.is_some() {
                    Outcome::error(messages::unknown_action(action))
                } else {
                    Outcome::info(messages::OPERATION_CANCELLED)
                };
                sink.emit(UiEvent::Response { text: outcome.render() }).await
            }
        }
    }

    async fn report_resolution(
        &mut self,
        sink: &impl EventSink,
        resolution: Resolution,
    ) -> Result<(), String> {
        match resolution {
            Resolution::Done(outcome) => {
                sink.emit(UiEvent::Response { text: outcome.render() }).await
            }
            Resolution::StartWebsite { prompt, is_edit } => {
                self.start_generation_task(sink, &prompt, is_edit, messages::WEBSITE_START_REPLY)
                    .await
            }
        }
    }

    /// Website flow: confirm the service is alive, let it classify the
    /// request, then either kick off generation, park a confirmation, or
    /// relay its conversational reply.
    async fn run_website_flow(&mut self, sink: &impl EventSink, input: &str) -> Result<(), String> {
        sink.emit(UiEvent::Status { text: messages::WEBSITE_DETECTED.to_string() }).await?;

        if !self.website.available().await {
            let error = messages::website_unreachable(self.website.base_url());
            return sink
                .emit(UiEvent::Error { text: messages::website_failed(&error) })
                .await;
        }

        let chat = match self.website.chat(input).await {
            Ok(chat) => chat,
            Err(e) => {
                return sink
                    .emit(UiEvent::Error { text: messages::website_failed(&e) })
                    .await;
            }
        };

        match chat.action.as_deref() {
            Some("start_generation") => {
                let prompt = chat.prompt.unwrap_or_else(|| input.to_string());
                let announce =
                    chat.reply.unwrap_or_else(|| messages::WEBSITE_START_REPLY.to_string());
                self.start_generation_task(sink, &prompt, false, &announce).await
            }
            Some("request_confirmation") => {
                let text =
                    chat.reply.unwrap_or_else(|| messages::WEBSITE_CHAT_REPLY.to_string());
                sink.emit(UiEvent::Response { text }).await?;
                self.gate.suspend(PendingAction::WebsiteGeneration {
                    prompt: chat.prompt.unwrap_or_else(|| input.to_string()),
                    is_edit: chat.is_edit,
                });
                Ok(())
            }
            _ => {
                let text =
                    chat.reply.unwrap_or_else(|| messages::WEBSITE_CHAT_REPLY.to_string());
                sink.emit(UiEvent::Response { text }).await
            }
        }
    }

    async fn start_generation_task(
        &self,
        sink: &impl EventSink,
        prompt: &str,
        is_edit: bool,
        announce: &str,
    ) -> Result<(), String> {
        let reply = match self.website.start_generation(prompt, is_edit).await {
            Ok(reply) => reply,
            Err(e) => {
                return sink
                    .emit(UiEvent::Error { text: messages::website_failed(&e) })
                    .await;
            }
        };
        if !reply.success {
            let message =
                reply.message.unwrap_or_else(|| messages::WEBSITE_START_FAILED.to_string());
            return sink
                .emit(UiEvent::Error { text: messages::website_failed(&message) })
                .await;
        }
        let Some(task_id) = reply.task_id else {
            return sink
                .emit(UiEvent::Error {
                    text: messages::website_failed(messages::WEBSITE_START_FAILED),
                })
                .await;
        };

        sink.emit(UiEvent::Response { text: announce.to_string() }).await?;
        sink.emit(UiEvent::Status { text: messages::WEBSITE_STREAMING.to_string() }).await?;
        self.stream_generation(sink, &task_id).await
    }

    /// Relays progress updates live as the stream produces them and closes
    /// out with either a failure notice or the completed-site links.
    async fn stream_generation(&self, sink: &impl EventSink, task_id: &str) -> Result<(), String> {
        let mut preview_url = None;
        let mut zip_url = None;
        let mut error = None;

        let updates = self.website.updates(task_id);
        pin_mut!(updates);
        while let Some(update) = updates.next().await {
            match update {
                Ok(StreamUpdate::Log { message }) => {
                    sink.emit(UiEvent::Status { text: message }).await?;
                }
                Ok(StreamUpdate::Summary { message }) => {
                    sink.emit(UiEvent::Response { text: message }).await?;
                }
                Ok(StreamUpdate::Generating { file, progress }) => {
                    sink.emit(UiEvent::Status {
                        text: messages::generating_progress(&file, progress),
                    })
                    .await?;
                }
                Ok(StreamUpdate::Complete { preview_url: preview, zip_url: zip }) => {
                    preview_url = preview;
                    zip_url = zip;
                }
                Ok(StreamUpdate::Error { message }) => {
                    sink.emit(UiEvent::Error { text: message.clone() }).await?;
                    error = Some(if message.is_empty() {
                        messages::STREAM_ERROR_FALLBACK.to_string()
                    } else {
                        message
                    });
                }
                Err(e) => {
                    error = Some(messages::stream_transport_failed(&e));
                    break;
                }
            }
        }

        if let Some(error) = error {
            return sink
                .emit(UiEvent::Error { text: messages::generation_failed(&error) })
                .await;
        }
        if let Some(preview) = preview_url {
            let preview = format!("{}{preview}", self.website.base_url());
            let zip = zip_url
                .map(|zip| format!("{}{zip}", self.website.base_url()))
                .unwrap_or_default();
            let text = messages::website_complete_text(&preview, &zip);
            return sink
                .emit(UiEvent::WebsiteComplete { preview_url: preview, zip_url: zip, text })
                .await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::fs;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

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

    struct CannedGenerator {
        reply: String,
        calls: AtomicUsize,
    }

    impl CannedGenerator {
        fn new(reply: &str) -> Self {
            Self { reply: reply.to_string(), calls: AtomicUsize::new(0) }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Generator for CannedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl Generator for FailingGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, String> {
            Err("connection refused".to_string())
        }
    }

    fn session_with(generator: Arc<dyn Generator>, root: Option<PathBuf>) -> Session {
        let mut config = AppConfig::default();
        config.workspace.path = root.map(|p| p.to_string_lossy().to_string());
        let website = WebsiteClient::new(&config);
        Session::new(config, generator, website)
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let mut session = session_with(Arc::new(FailingGenerator), None);
        let sink = RecordingSink::default();
        session.handle_message(&sink, "   ").await.unwrap();
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn greeting_answers_without_the_generator() {
        let generator = Arc::new(CannedGenerator::new("unused"));
        let mut session = session_with(generator.clone(), None);
        let sink = RecordingSink::default();

        session.handle_message(&sink, "hello there").await.unwrap();

        assert_eq!(
            sink.events(),
            vec![UiEvent::Response { text: messages::GREETING_REPLY.to_string() }]
        );
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn long_greeting_like_input_still_reaches_the_generator() {
        let generator = Arc::new(CannedGenerator::new("Sure, picking that up now."));
        let mut session = session_with(generator.clone(), None);
        let sink = RecordingSink::default();

        session
            .handle_message(&sink, "help me refactor the parser module please")
            .await
            .unwrap();

        assert_eq!(generator.calls(), 1);
        let events = sink.events();
        assert_eq!(events[0], UiEvent::Thinking);
        assert_eq!(
            events[1],
            UiEvent::Response { text: "Sure, picking that up now.".to_string() }
        );
    }

    #[tokio::test]
    async fn direct_run_bypasses_the_generator() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("greet.sh"), "#!/bin/sh\necho direct hello\n").unwrap();
        let generator = Arc::new(CannedGenerator::new("unused"));
        let mut session = session_with(generator.clone(), Some(dir.path().to_path_buf()));
        let sink = RecordingSink::default();

        session.handle_message(&sink, "please run greet.sh").await.unwrap();

        assert_eq!(generator.calls(), 0);
        let events = sink.events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            UiEvent::Response { text } => {
                assert!(text.starts_with("Running greet.sh:\n\n[RUN] Output:"));
                assert!(text.contains("direct hello"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn direct_run_defaults_extensionless_targets_to_python() {
        let dir = tempdir().unwrap();
        let generator = Arc::new(CannedGenerator::new("unused"));
        let mut session = session_with(generator.clone(), Some(dir.path().to_path_buf()));
        let sink = RecordingSink::default();

        session.handle_message(&sink, "run app").await.unwrap();

        assert_eq!(generator.calls(), 0);
        assert_eq!(
            sink.events(),
            vec![UiEvent::Response {
                text: "Running app.py:\n\n[ERROR] File 'app.py' not found.".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn run_followed_by_a_common_word_is_not_a_direct_run() {
        let generator = Arc::new(CannedGenerator::new("Happy to help with the tests."));
        let mut session = session_with(generator.clone(), None);
        let sink = RecordingSink::default();

        session.handle_message(&sink, "can you run the whole thing for me and explain").await.unwrap();

        assert_eq!(generator.calls(), 1);
    }

    #[test]
    fn direct_run_detection_cases() {
        assert_eq!(detect_direct_run("run app"), Some("app.py".to_string()));
        assert_eq!(detect_direct_run("please execute scripts/build.sh"), Some("scripts/build.sh".to_string()));
        assert_eq!(detect_direct_run("test utils"), Some("utils.py".to_string()));
        // Skips the article but still picks up a later real target.
        assert_eq!(detect_direct_run("run the setup then run deploy"), Some("deploy.py".to_string()));
        assert_eq!(detect_direct_run("run src/"), Some("src/".to_string()));
        assert_eq!(detect_direct_run("tell me about rust"), None);
    }

    #[test]
    fn website_request_detection_cases() {
        assert!(is_website_request("Build me a website for my bakery"));
        assert!(is_website_request("I need a landing page"));
        assert!(is_website_request("create an ADMIN PANEL for the shop"));
        assert!(!is_website_request("update the website_config.py file"));
        assert!(!is_website_request("what is a web server"));
    }

    #[tokio::test]
    async fn chat_turn_executes_extracted_actions() {
        let dir = tempdir().unwrap();
        let generator = Arc::new(CannedGenerator::new(
            "Setting that up. {\"action\": \"create_folder\", \"folder\": \"out\"} Anything else?",
        ));
        let mut session = session_with(generator.clone(), Some(dir.path().to_path_buf()));
        let sink = RecordingSink::default();

        session.handle_message(&sink, "make me an out folder").await.unwrap();

        assert!(dir.path().join("out").is_dir());
        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], UiEvent::Thinking);
        match &events[1] {
            UiEvent::Response { text } => {
                assert!(text.starts_with("Setting that up."));
                assert!(text.contains("Anything else?"));
                assert!(text.contains("[OK] Folder '"));
                assert!(!text.contains("create_folder"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(session.history.contains("User: make me an out folder"));
    }

    #[tokio::test]
    async fn transport_failure_reports_an_error_and_keeps_history_clean() {
        let mut session = session_with(Arc::new(FailingGenerator), None);
        let sink = RecordingSink::default();

        session.handle_message(&sink, "write me a parser").await.unwrap();

        let events = sink.events();
        assert_eq!(events[0], UiEvent::Thinking);
        assert_eq!(
            events[1],
            UiEvent::Error {
                text: "Failed to connect to AI Assistant: connection refused. \
                       Please check your internet connection."
                    .to_string()
            }
        );
        assert!(session.history.is_empty());
    }

    #[tokio::test]
    async fn conflicting_create_suspends_then_phrase_resolves() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("app.py"), "old").unwrap();
        let generator = Arc::new(CannedGenerator::new(
            "{\"action\": \"create_file\", \"path\": \"app.py\", \"content\": \"new\"}",
        ));
        let mut session = session_with(generator.clone(), Some(dir.path().to_path_buf()));
        let sink = RecordingSink::default();

        session.handle_message(&sink, "recreate app.py").await.unwrap();

        let events = sink.events();
        assert_eq!(events[0], UiEvent::Thinking);
        assert_eq!(
            events[1],
            UiEvent::Confirmation {
                text: messages::overwrite_prompt("app.py"),
                action: PendingAction::CreateFile { path: "app.py".into(), content: "new".into() },
            }
        );
        match &events[2] {
            UiEvent::Response { text } => {
                assert!(text.contains("[CONFIRMATION_REQUIRED]"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(fs::read_to_string(dir.path().join("app.py")).unwrap(), "old");

        // The natural-language answer lands on the suspended write.
        session.handle_message(&sink, "yes, update it").await.unwrap();
        let events = sink.events();
        assert_eq!(
            events.last(),
            Some(&UiEvent::Response { text: "[OK] Updated: app.py".to_string() })
        );
        assert_eq!(fs::read_to_string(dir.path().join("app.py")).unwrap(), "new");
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn confirmation_phrase_with_nothing_pending_goes_to_the_generator() {
        let generator = Arc::new(CannedGenerator::new("Understood, not touching anything."));
        let mut session = session_with(generator.clone(), None);
        let sink = RecordingSink::default();

        session.handle_message(&sink, "no").await.unwrap();

        assert_eq!(generator.calls(), 1);
        let events = sink.events();
        assert_eq!(events[0], UiEvent::Thinking);
    }

    #[tokio::test]
    async fn protocol_cancel_clears_the_slot_and_reports() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("app.py"), "old").unwrap();
        let generator = Arc::new(CannedGenerator::new(
            "{\"action\": \"create_file\", \"path\": \"app.py\", \"content\": \"new\"}",
        ));
        let mut session = session_with(generator, Some(dir.path().to_path_buf()));
        let sink = RecordingSink::default();

        session.handle_message(&sink, "recreate app.py").await.unwrap();
        assert!(session.gate.is_open());

        session.handle_confirmation_response(&sink, false, "modify_existing").await.unwrap();

        assert!(!session.gate.is_open());
        assert_eq!(
            sink.events().last(),
            Some(&UiEvent::Response { text: "[INFO] Operation cancelled by user.".to_string() })
        );
        assert_eq!(fs::read_to_string(dir.path().join("app.py")).unwrap(), "old");
    }

    #[tokio::test]
    async fn confirmed_unknown_action_name_is_reported() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("app.py"), "old").unwrap();
        let generator = Arc::new(CannedGenerator::new(
            "{\"action\": \"create_file\", \"path\": \"app.py\", \"content\": \"new\"}",
        ));
        let mut session = session_with(generator, Some(dir.path().to_path_buf()));
        let sink = RecordingSink::default();

        session.handle_message(&sink, "recreate app.py").await.unwrap();
        session.handle_confirmation_response(&sink, true, "frobnicate").await.unwrap();

        assert!(!session.gate.is_open());
        assert_eq!(
            sink.events().last(),
            Some(&UiEvent::Response { text: "[ERROR] Unknown action: frobnicate".to_string() })
        );
    }

    #[tokio::test]
    async fn config_sets_workspace_and_creates_the_directory() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("fresh-workspace");
        let mut session = session_with(Arc::new(FailingGenerator), None);
        let sink = RecordingSink::default();

        session
            .handle_config(&sink, Some(root.to_string_lossy().to_string()))
            .await
            .unwrap();

        assert!(root.is_dir());
        let events = sink.events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            UiEvent::Status { text } => assert!(text.starts_with("Workspace set to: ")),
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(session.workspace.root(), Some(root.as_path()));
    }

    #[tokio::test]
    async fn file_operation_overwrites_without_confirmation() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "old").unwrap();
        let mut session =
            session_with(Arc::new(FailingGenerator), Some(dir.path().to_path_buf()));
        let sink = RecordingSink::default();

        let mut fields = Map::new();
        fields.insert("path".to_string(), Value::String("notes.txt".to_string()));
        fields.insert("content".to_string(), Value::String("fresh".to_string()));
        session
            .handle_file_operation(&sink, "create_file".to_string(), fields)
            .await
            .unwrap();

        assert!(!session.gate.is_open());
        assert_eq!(fs::read_to_string(dir.path().join("notes.txt")).unwrap(), "fresh");
        assert_eq!(
            sink.events(),
            vec![UiEvent::Response { text: "[OK] Updated: notes.txt".to_string() }]
        );
    }

    #[tokio::test]
    async fn second_conflict_replaces_the_first_pending_write() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.py"), "a").unwrap();
        fs::write(dir.path().join("b.py"), "b").unwrap();
        let generator = Arc::new(CannedGenerator::new(
            "{\"action\": \"create_file\", \"path\": \"a.py\", \"content\": \"A\"} \
             {\"action\": \"create_file\", \"path\": \"b.py\", \"content\": \"B\"}",
        ));
        let mut session = session_with(generator, Some(dir.path().to_path_buf()));
        let sink = RecordingSink::default();

        session.handle_message(&sink, "rewrite both files").await.unwrap();
        session.handle_message(&sink, "yes, update it").await.unwrap();

        // Only the later suspension survives to be resolved.
        assert_eq!(fs::read_to_string(dir.path().join("a.py")).unwrap(), "a");
        assert_eq!(fs::read_to_string(dir.path().join("b.py")).unwrap(), "B");
    }
}
