//! # Confirmation Gate
//!
//! Holds the single suspended write per session and resolves it once the
//! user answers, either through a structured `confirmation_response` message
//! or by replying in chat with a recognizable phrase.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use similar::TextDiff;

use crate::application::search::{find_file_by_name, relative_display};
use crate::domain::types::{Outcome, OutcomeKind, PendingAction};
use crate::strings::messages;

/// What the user chose to do with the suspended write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationDecision {
    UseExisting,
    CreateNew,
    ShowDiff,
    BackupAndModify,
    Cancel,
}

const MODIFY_PHRASES: &[&str] = &[
    "modify existing", "modify the existing", "update existing", "update the existing",
    "change existing", "edit existing", "use existing", "existing one", "existing file",
    "yes modify", "yes update", "modify it", "update it", "update", "modify",
    "option 1", "1)", "1.", "first option", "first",
];

const CREATE_PHRASES: &[&str] = &[
    "create new", "create a new", "new one", "new file", "create it",
    "yes create", "make new", "make a new", "new",
    "option 2", "2)", "2.", "second option", "second",
];

const DIFF_PHRASES: &[&str] = &[
    "show diff", "see diff", "compare", "difference", "what changed",
    "option 3", "3)", "3.", "third option", "third", "diff",
];

const BACKUP_PHRASES: &[&str] = &[
    "backup", "save backup", "backup first", "create backup",
    "option 4", "4)", "4.", "fourth option", "fourth",
];

const CANCEL_PHRASES: &[&str] = &[
    "cancel", "no", "stop", "abort", "don't", "dont", "never mind", "nevermind",
    "option 5", "5)", "5.", "fifth option", "fifth", "skip", "ignore",
];

impl ConfirmationDecision {
    /// Classifies a free-form chat reply. Phrase groups are checked in a
    /// fixed order, so an answer touching several groups resolves to the
    /// earliest one.
    pub fn from_reply(text: &str) -> Option<Self> {
        let lower = text.to_lowercase();
        let lower = lower.trim();
        let groups = [
            (MODIFY_PHRASES, Self::UseExisting),
            (CREATE_PHRASES, Self::CreateNew),
            (DIFF_PHRASES, Self::ShowDiff),
            (BACKUP_PHRASES, Self::BackupAndModify),
            (CANCEL_PHRASES, Self::Cancel),
        ];
        for (phrases, decision) in groups {
            if phrases.iter().any(|phrase| lower.contains(phrase)) {
                return Some(decision);
            }
        }
        None
    }

    /// Maps a structured `confirmation_response` payload. Returns `None` for
    /// an affirmative response with an unrecognized action name.
    pub fn from_protocol(confirmed: bool, action: &str) -> Option<Self> {
        if !confirmed {
            return Some(Self::Cancel);
        }
        match action {
            "modify_existing" => Some(Self::UseExisting),
            "create_new" => Some(Self::CreateNew),
            "show_diff" => Some(Self::ShowDiff),
            "backup_and_modify" => Some(Self::BackupAndModify),
            _ => None,
        }
    }
}

/// Single-slot store for the suspended operation. A new suspension replaces
/// the previous one; the replaced write is dropped.
#[derive(Debug, Default)]
pub struct ConfirmationGate {
    pending: Option<PendingAction>,
}

impl ConfirmationGate {
    pub fn suspend(&mut self, pending: PendingAction) {
        if self.pending.replace(pending).is_some() {
            tracing::debug!("replacing an unresolved pending action");
        }
    }

    pub fn take(&mut self) -> Option<PendingAction> {
        self.pending.take()
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }
}

/// Outcome of resolving the pending slot.
#[derive(Debug)]
pub enum Resolution {
    Done(Outcome),
    StartWebsite { prompt: String, is_edit: bool },
}

/// Applies the user's decision to the suspended operation. An empty slot
/// resolves to a cancellation notice regardless of the decision.
pub fn resolve(
    root: Option<&Path>,
    pending: Option<PendingAction>,
    decision: ConfirmationDecision,
) -> Resolution {
    let Some(pending) = pending else {
        return Resolution::Done(Outcome::info(messages::OPERATION_CANCELLED));
    };
    if decision == ConfirmationDecision::Cancel {
        return Resolution::Done(Outcome::info(messages::OPERATION_CANCELLED));
    }
    match pending {
        PendingAction::WebsiteGeneration { prompt, is_edit } => {
            Resolution::StartWebsite { prompt, is_edit }
        }
        PendingAction::CreateFile { path, content } | PendingAction::UpdateFile { path, content } => {
            let Some(root) = root else {
                return Resolution::Done(Outcome::error(messages::NO_WORKSPACE));
            };
            Resolution::Done(resolve_write(root, &path, &content, decision))
        }
    }
}

fn resolve_write(root: &Path, path: &str, content: &str, decision: ConfirmationDecision) -> Outcome {
    match decision {
        ConfirmationDecision::UseExisting => match locate_existing(root, path) {
            Some(existing) => overwrite_existing(root, &existing, content),
            None => Outcome::error(messages::MISSING_ORIGINAL),
        },
        ConfirmationDecision::CreateNew => {
            let full = root.join(path);
            match write_with_parents(&full, content) {
                Ok(()) => Outcome::ok(messages::file_created(path)),
                Err(e) => Outcome::error(e.to_string()),
            }
        }
        ConfirmationDecision::ShowDiff => match locate_existing(root, path) {
            Some(existing) => diff_against(root, &existing, content),
            None => Outcome::error(messages::diff_failed("no existing file found")),
        },
        ConfirmationDecision::BackupAndModify => match locate_existing(root, path) {
            Some(existing) => backup_then_overwrite(root, &existing, content),
            None => Outcome::error(messages::BACKUP_FAILED),
        },
        ConfirmationDecision::Cancel => Outcome::info(messages::OPERATION_CANCELLED),
    }
}

/// The file the suspended write collides with: the requested path itself when
/// it exists, otherwise the nearest file with the same name anywhere in the
/// workspace.
fn locate_existing(root: &Path, path: &str) -> Option<PathBuf> {
    let full = root.join(path);
    if full.is_file() {
        return Some(full);
    }
    let name = Path::new(path).file_name()?.to_string_lossy();
    find_file_by_name(root, &name)
}

fn overwrite_existing(root: &Path, existing: &Path, content: &str) -> Outcome {
    match fs::write(existing, content) {
        Ok(()) => Outcome::ok(messages::file_updated(&relative_display(root, existing))),
        Err(e) => Outcome::error(e.to_string()),
    }
}

fn diff_against(root: &Path, existing: &Path, proposed: &str) -> Outcome {
    let current = match fs::read_to_string(existing) {
        Ok(current) => current,
        Err(e) => return Outcome::error(messages::diff_failed(&e.to_string())),
    };
    if current == proposed {
        return Outcome::info(messages::DIFF_NO_CHANGES);
    }
    let display = relative_display(root, existing);
    let diff = TextDiff::from_lines(current.as_str(), proposed)
        .unified_diff()
        .context_radius(3)
        .header(&format!("existing: {display}"), "new: proposed")
        .to_string();
    Outcome::new(OutcomeKind::Diff, format!("{}\n{diff}", messages::DIFF_HEADER))
}

fn backup_then_overwrite(root: &Path, existing: &Path, content: &str) -> Outcome {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let backup = PathBuf::from(format!("{}.backup_{timestamp}", existing.display()));
    if fs::copy(existing, &backup).is_err() {
        return Outcome::error(messages::BACKUP_FAILED);
    }
    match fs::write(existing, content) {
        Ok(()) => {
            let updated = Outcome::ok(messages::file_updated(&relative_display(root, existing)));
            Outcome::new(
                OutcomeKind::Backup,
                format!("{}\n{}", messages::backup_created(&relative_display(root, &backup)), updated.render()),
            )
        }
        Err(e) => Outcome::error(e.to_string()),
    }
}

fn write_with_parents(target: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(target, content)
}
