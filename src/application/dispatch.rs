//! # Action Dispatch
//!
//! Maps an extracted action object to the operation it names and runs the
//! handler. The lookup is an ordered table of substring matches plus compact
//! aliases, so minor naming drift in model output still routes correctly.

use std::io;

use crate::application::runner;
use crate::application::search;
use crate::application::workspace::{Workspace, WriteAttempt};
use crate::domain::types::{ActionKind, ActionRequest, Outcome, PendingAction};
use crate::strings::messages;

/// A suspension raised while dispatching, to be surfaced to the user as a
/// confirmation prompt.
#[derive(Debug)]
pub struct ConfirmationSignal {
    pub prompt: String,
    pub pending: PendingAction,
}

/// Ordered lookup table; earlier rows win. The second column matches as a
/// substring of the normalized name, the third must match exactly.
const DISPATCH_TABLE: &[(ActionKind, &[&str], &[&str])] = &[
    (ActionKind::CreateFolder, &["create_folder"], &["createfolder"]),
    (ActionKind::CreateProject, &["create_project"], &["createproject"]),
    (ActionKind::CreateFile, &["create_file"], &["createfile"]),
    (ActionKind::UpdateFile, &["update_file"], &["updatefile"]),
    (ActionKind::DebugFile, &["debug_file"], &["debugfile"]),
    (ActionKind::RunFile, &["run_file", "test_file"], &["runfile"]),
    (ActionKind::SearchFiles, &["search_files"], &["searchfiles"]),
    (ActionKind::SearchFolders, &["search_folders"], &["searchfolders"]),
    (ActionKind::SearchInFiles, &["search_in_files"], &["searchinfiles", "grep"]),
    (ActionKind::GetFileInfo, &["get_file_info"], &["getfileinfo", "file_info"]),
];

/// Lowercases the raw action name and joins whitespace runs with
/// underscores, so `"CREATE File"` becomes `"create_file"`.
pub fn normalize_action(raw: &str) -> String {
    raw.to_lowercase().split_whitespace().collect::<Vec<_>>().join("_")
}

pub fn resolve_kind(normalized: &str) -> Option<ActionKind> {
    for (kind, substrings, aliases) in DISPATCH_TABLE {
        if substrings.iter().any(|s| normalized.contains(s))
            || aliases.iter().any(|a| normalized == *a)
        {
            return Some(*kind);
        }
    }
    None
}

/// Runs one extracted action for the chat path. Write conflicts suspend and
/// raise a [`ConfirmationSignal`]; unexpected handler failures fold into an
/// error outcome so the batch keeps going.
pub async fn execute_action(
    workspace: &Workspace,
    request: &ActionRequest,
    run_timeout: u64,
) -> (Vec<Outcome>, Option<ConfirmationSignal>) {
    match run_action(workspace, request, run_timeout, true).await {
        Ok(result) => result,
        Err(e) => (
            vec![Outcome::error(messages::action_failed(&e.to_string()))],
            None,
        ),
    }
}

/// Runs an action requested directly by the editor. The confirmation gate is
/// bypassed (the editor carries its own confirmation UI), and handler
/// failures propagate so the caller can raise a protocol error.
pub async fn execute_file_operation(
    workspace: &Workspace,
    request: &ActionRequest,
    run_timeout: u64,
) -> io::Result<Vec<Outcome>> {
    let raw = request.name().unwrap_or("");
    if resolve_kind(&normalize_action(raw)).is_none() {
        return Ok(vec![Outcome::error(messages::unknown_file_operation(raw))]);
    }
    let (outcomes, _) = run_action(workspace, request, run_timeout, false).await?;
    Ok(outcomes)
}

async fn run_action(
    workspace: &Workspace,
    request: &ActionRequest,
    run_timeout: u64,
    gated: bool,
) -> io::Result<(Vec<Outcome>, Option<ConfirmationSignal>)> {
    let normalized = normalize_action(request.name().unwrap_or(""));
    let Some(kind) = resolve_kind(&normalized) else {
        return Ok((vec![Outcome::info(messages::unknown_action(&normalized))], None));
    };

    let outcomes = match kind {
        ActionKind::CreateFolder => {
            let Some(folder) = request.str_field(&["folder", "name"]) else {
                return Ok((vec![Outcome::error(messages::MISSING_FOLDER_NAME)], None));
            };
            vec![workspace.create_folder(folder)]
        }
        ActionKind::CreateProject => {
            let folder = request.str_field(&["folder", "name", "project"]);
            let files = request.files();
            let Some(folder) = folder else {
                return Ok((vec![Outcome::error(messages::MISSING_FOLDER_OR_FILES)], None));
            };
            if files.is_empty() {
                return Ok((vec![Outcome::error(messages::MISSING_FOLDER_OR_FILES)], None));
            }
            workspace.create_project(folder, &files)
        }
        ActionKind::CreateFile | ActionKind::UpdateFile | ActionKind::DebugFile => {
            let Some(path) = request.str_field(&["path", "filename", "file"]) else {
                return Ok((vec![Outcome::error(messages::MISSING_FILE_PATH)], None));
            };
            let content = request.content();
            if !gated {
                return Ok((vec![workspace.write_confirmed(path, content)], None));
            }
            let attempt = if kind == ActionKind::CreateFile {
                workspace.create_file(path, content)
            } else {
                workspace.update_file(path, content)
            };
            return Ok(match attempt {
                WriteAttempt::Done(outcome) => (vec![outcome], None),
                WriteAttempt::Suspended { outcome, prompt, pending } => {
                    (vec![outcome], Some(ConfirmationSignal { prompt, pending }))
                }
            });
        }
        ActionKind::RunFile => {
            let Some(path) = request.str_field(&["path", "filename", "file"]) else {
                return Ok((vec![Outcome::error(messages::MISSING_FILE_PATH)], None));
            };
            let Some(root) = workspace.root() else {
                return Ok((vec![Outcome::error(messages::NO_WORKSPACE)], None));
            };
            vec![runner::run_file(root, path, request.environment(), run_timeout).await]
        }
        ActionKind::SearchFiles => {
            let Some(keyword) = request.str_field(&["keyword", "search", "query"]) else {
                return Ok((vec![Outcome::error(messages::MISSING_SEARCH_KEYWORD)], None));
            };
            let Some(root) = workspace.root() else {
                return Ok((vec![Outcome::error(messages::NO_WORKSPACE)], None));
            };
            let file_type = request.str_field(&["file_type", "extension"]);
            let hits = search::search_files(root, keyword, file_type, request.max_results())?;
            vec![search::format_file_results(&hits)]
        }
        ActionKind::SearchFolders => {
            let Some(keyword) = request.str_field(&["keyword", "search", "query"]) else {
                return Ok((vec![Outcome::error(messages::MISSING_SEARCH_KEYWORD)], None));
            };
            let Some(root) = workspace.root() else {
                return Ok((vec![Outcome::error(messages::NO_WORKSPACE)], None));
            };
            let hits = search::search_folders(root, keyword, request.max_results())?;
            vec![search::format_folder_results(&hits)]
        }
        ActionKind::SearchInFiles => {
            let Some(keyword) = request.str_field(&["keyword", "search", "query"]) else {
                return Ok((vec![Outcome::error(messages::MISSING_SEARCH_KEYWORD)], None));
            };
            let Some(root) = workspace.root() else {
                return Ok((vec![Outcome::error(messages::NO_WORKSPACE)], None));
            };
            let pattern = request.str_field(&["file_pattern", "pattern"]).unwrap_or("*");
            let hits = search::search_in_files(root, keyword, pattern, request.max_results())?;
            vec![search::format_content_results(&hits)]
        }
        ActionKind::GetFileInfo => {
            let Some(path) = request.str_field(&["path", "file", "filename"]) else {
                return Ok((vec![Outcome::error(messages::MISSING_FILE_PATH)], None));
            };
            let Some(root) = workspace.root() else {
                return Ok((vec![Outcome::error(messages::NO_WORKSPACE)], None));
            };
            vec![search::file_info(root, path)?]
        }
    };
    Ok((outcomes, None))
}
