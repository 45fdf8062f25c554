//! # Domain Types
//!
//! Common data structures and enums used across the application logic:
//! parsed action requests, tagged handler outcomes, the pending-confirmation
//! payload, and both directions of the editor protocol.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The fixed set of operations the dispatcher can route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    CreateFolder,
    CreateProject,
    CreateFile,
    UpdateFile,
    DebugFile,
    RunFile,
    SearchFiles,
    SearchFolders,
    SearchInFiles,
    GetFileInfo,
}

/// One JSON object lifted out of the model's reply. Fields are read
/// permissively: the first present key of a synonym list wins and
/// unrecognized keys are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRequest(Value);

impl ActionRequest {
    /// Wraps a parsed value; anything that is not a JSON object is rejected.
    pub fn new(value: Value) -> Option<Self> {
        value.is_object().then_some(Self(value))
    }

    /// The raw action identifier (`action`, falling back to `intent`).
    pub fn name(&self) -> Option<&str> {
        self.str_field(&["action", "intent"])
    }

    /// First non-empty string value found under any of the given keys.
    /// Empty strings count as absent so synonym fallback skips past them.
    pub fn str_field(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| {
            self.0
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        })
    }

    pub fn content(&self) -> &str {
        self.str_field(&["content"]).unwrap_or("")
    }

    pub fn environment(&self) -> &str {
        self.str_field(&["environment"]).unwrap_or("none")
    }

    /// Result cap for search actions. Missing or non-positive values fall
    /// back to 10.
    pub fn max_results(&self) -> usize {
        self.0
            .get("max_results")
            .and_then(Value::as_u64)
            .filter(|&n| n > 0)
            .map(|n| n as usize)
            .unwrap_or(10)
    }

    /// The `files` list of a create_project request. Entries without a
    /// `path` key are kept so the handler can report them as failures.
    pub fn files(&self) -> Vec<FileSpec> {
        let Some(entries) = self.0.get("files").and_then(Value::as_array) else {
            return Vec::new();
        };
        entries
            .iter()
            .map(|entry| FileSpec {
                path: entry.get("path").and_then(Value::as_str).map(String::from),
                content: entry
                    .get("content")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string(),
            })
            .collect()
    }
}

/// One file entry inside a create_project request.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSpec {
    pub path: Option<String>,
    pub content: String,
}

/// Category of a handler result. Rendered to the bracketed prefix form
/// only when the final response is composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Ok,
    Info,
    Error,
    Created,
    Updated,
    Summary,
    ConfirmationRequired,
    Run,
    Diff,
    Backup,
}

impl OutcomeKind {
    pub fn tag(self) -> &'static str {
        match self {
            OutcomeKind::Ok => "[OK]",
            OutcomeKind::Info => "[INFO]",
            OutcomeKind::Error => "[ERROR]",
            OutcomeKind::Created => "[CREATED]",
            OutcomeKind::Updated => "[UPDATED]",
            OutcomeKind::Summary => "[SUMMARY]",
            OutcomeKind::ConfirmationRequired => "[CONFIRMATION_REQUIRED]",
            OutcomeKind::Run => "[RUN]",
            OutcomeKind::Diff => "[DIFF]",
            OutcomeKind::Backup => "[BACKUP]",
        }
    }
}

/// A single handler result line (the text may span multiple lines for
/// search listings and run output).
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub kind: OutcomeKind,
    pub text: String,
}

impl Outcome {
    pub fn new(kind: OutcomeKind, text: impl Into<String>) -> Self {
        Self { kind, text: text.into() }
    }

    pub fn ok(text: impl Into<String>) -> Self {
        Self::new(OutcomeKind::Ok, text)
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(OutcomeKind::Info, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(OutcomeKind::Error, text)
    }

    pub fn run(text: impl Into<String>) -> Self {
        Self::new(OutcomeKind::Run, text)
    }

    /// The user-facing form, e.g. `[ERROR] No workspace open`.
    pub fn render(&self) -> String {
        format!("{} {}", self.kind.tag(), self.text)
    }
}

/// A suspended operation waiting for the user's decision. At most one per
/// session; a newer conflict replaces the older one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PendingAction {
    CreateFile { path: String, content: String },
    UpdateFile { path: String, content: String },
    WebsiteGeneration { prompt: String, is_edit: bool },
}

/// Messages arriving from the editor, one JSON object per stdin line.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inbound {
    Message {
        #[serde(default)]
        text: String,
        /// Attachment descriptors are accepted but not consumed here.
        #[serde(default)]
        files: Vec<Attachment>,
    },
    Config {
        #[serde(rename = "workspacePath")]
        workspace_path: Option<String>,
    },
    FileOperation {
        #[serde(default)]
        action: String,
        #[serde(flatten)]
        fields: serde_json::Map<String, Value>,
    },
    ConfirmationResponse {
        #[serde(default)]
        confirmed: bool,
        #[serde(default = "default_confirmation_action")]
        action: String,
    },
    Exit,
}

fn default_confirmation_action() -> String {
    "modify_existing".to_string()
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Attachment {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Events sent back to the editor, one JSON object per stdout line.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    Ready { text: String },
    Thinking,
    Status { text: String },
    Response { text: String },
    Error { text: String },
    Confirmation { text: String, action: PendingAction },
    WebsiteComplete {
        preview_url: String,
        zip_url: String,
        text: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_reads_first_present_synonym() {
        let request = ActionRequest::new(json!({
            "action": "create_file",
            "filename": "a.py",
            "file": "b.py"
        }))
        .unwrap();
        assert_eq!(request.str_field(&["path", "filename", "file"]), Some("a.py"));
        assert_eq!(request.name(), Some("create_file"));
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let request = ActionRequest::new(json!({
            "action": "create_folder",
            "folder": "",
            "name": "demo"
        }))
        .unwrap();
        assert_eq!(request.str_field(&["folder", "name"]), Some("demo"));
        assert_eq!(request.str_field(&["folder"]), None);
    }

    #[test]
    fn request_rejects_non_objects() {
        assert!(ActionRequest::new(json!([1, 2])).is_none());
        assert!(ActionRequest::new(json!("text")).is_none());
    }

    #[test]
    fn max_results_defaults_and_clamps() {
        let missing = ActionRequest::new(json!({"action": "search_files"})).unwrap();
        assert_eq!(missing.max_results(), 10);
        let zero = ActionRequest::new(json!({"action": "search_files", "max_results": 0})).unwrap();
        assert_eq!(zero.max_results(), 10);
        let five = ActionRequest::new(json!({"action": "search_files", "max_results": 5})).unwrap();
        assert_eq!(five.max_results(), 5);
    }

    #[test]
    fn files_keeps_entries_without_path() {
        let request = ActionRequest::new(json!({
            "action": "create_project",
            "files": [
                {"path": "main.py", "content": "print(1)"},
                {"content": "orphan"}
            ]
        }))
        .unwrap();
        let files = request.files();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path.as_deref(), Some("main.py"));
        assert!(files[1].path.is_none());
    }

    #[test]
    fn inbound_message_types_deserialize() {
        let msg: Inbound =
            serde_json::from_str(r#"{"type":"message","text":"hi","files":[]}"#).unwrap();
        assert!(matches!(msg, Inbound::Message { .. }));

        let config: Inbound =
            serde_json::from_str(r#"{"type":"config","workspacePath":"/tmp/ws"}"#).unwrap();
        assert_eq!(
            config,
            Inbound::Config { workspace_path: Some("/tmp/ws".to_string()) }
        );

        let confirm: Inbound =
            serde_json::from_str(r#"{"type":"confirmation_response","confirmed":true}"#).unwrap();
        assert_eq!(
            confirm,
            Inbound::ConfirmationResponse {
                confirmed: true,
                action: "modify_existing".to_string()
            }
        );
    }

    #[test]
    fn file_operation_collects_extra_fields() {
        let op: Inbound = serde_json::from_str(
            r#"{"type":"file_operation","action":"create_folder","folder":"src"}"#,
        )
        .unwrap();
        match op {
            Inbound::FileOperation { action, fields } => {
                assert_eq!(action, "create_folder");
                assert_eq!(fields.get("folder").and_then(Value::as_str), Some("src"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let ready = serde_json::to_value(UiEvent::Ready { text: "hello".into() }).unwrap();
        assert_eq!(ready, json!({"type": "ready", "text": "hello"}));

        let thinking = serde_json::to_value(UiEvent::Thinking).unwrap();
        assert_eq!(thinking, json!({"type": "thinking"}));

        let confirmation = serde_json::to_value(UiEvent::Confirmation {
            text: "File 'a.py' already exists. Overwrite? (yes/no)".into(),
            action: PendingAction::CreateFile { path: "a.py".into(), content: "x".into() },
        })
        .unwrap();
        assert_eq!(confirmation["type"], "confirmation");
        assert_eq!(confirmation["action"]["action"], "create_file");
        assert_eq!(confirmation["action"]["path"], "a.py");
    }

    #[test]
    fn outcome_renders_with_bracket_tag() {
        assert_eq!(Outcome::error("No workspace open").render(), "[ERROR] No workspace open");
        assert_eq!(
            Outcome::new(OutcomeKind::ConfirmationRequired, "File exists. Waiting for user response.").render(),
            "[CONFIRMATION_REQUIRED] File exists. Waiting for user response."
        );
    }
}
