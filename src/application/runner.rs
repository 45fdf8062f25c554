//! # File Execution
//!
//! Runs a workspace script with the interpreter implied by its extension,
//! optionally inside a named conda environment, under a hard timeout.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::domain::types::Outcome;
use crate::strings::messages;

fn interpreter_for(path: &str) -> Option<&'static str> {
    if path.ends_with(".py") {
        Some("python")
    } else if path.ends_with(".js") {
        Some("node")
    } else if path.ends_with(".sh") {
        Some("bash")
    } else {
        None
    }
}

/// Executes `path` relative to the workspace root and captures its output.
///
/// Exceeding `timeout_secs` kills the child and reports a timeout. A nonzero
/// exit reports the captured stderr, falling back to the exit status when the
/// script printed nothing.
pub async fn run_file(root: &Path, path: &str, environment: &str, timeout_secs: u64) -> Outcome {
    let full = root.join(path);
    if !full.exists() {
        return Outcome::error(messages::file_not_found(path));
    }
    let Some(interpreter) = interpreter_for(path) else {
        return Outcome::error(messages::UNSUPPORTED_FILE_TYPE);
    };

    let mut command = if environment.eq_ignore_ascii_case("none") {
        let mut c = Command::new(interpreter);
        c.arg(&full);
        c
    } else {
        let mut c = Command::new("conda");
        c.args(["run", "-n", environment, interpreter]);
        c.arg(&full);
        c
    };
    command
        .current_dir(root)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = match command.spawn() {
        Ok(child) => child,
        Err(e) => return Outcome::error(messages::run_failed(&e.to_string())),
    };

    let waited = tokio::time::timeout(Duration::from_secs(timeout_secs), child.wait_with_output()).await;
    let output = match waited {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => return Outcome::error(messages::run_failed(&e.to_string())),
        Err(_) => return Outcome::error(messages::run_failed(&messages::run_timed_out(timeout_secs))),
    };

    if output.status.success() {
        Outcome::run(messages::run_output(&String::from_utf8_lossy(&output.stdout)))
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = if stderr.trim().is_empty() {
            output.status.to_string()
        } else {
            stderr.into_owned()
        };
        Outcome::error(messages::run_failed(&detail))
    }
}
