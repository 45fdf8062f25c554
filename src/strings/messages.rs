//! # Messages
//!
//! Contains constant strings and format functions for user-facing messages.
//! Includes protocol banners, confirmation prompts, and error templates.

pub const READY: &str = "Hello! What would you like to work on today?";
pub const GREETING_REPLY: &str = "Hello! Great to connect. What are we building today?";

pub const NO_WORKSPACE: &str = "No workspace open";
pub const MISSING_FILE_PATH: &str = "Missing file path";
pub const MISSING_FOLDER_NAME: &str = "Missing folder name";
pub const MISSING_FOLDER_OR_FILES: &str = "Missing folder name or files list";
pub const MISSING_SEARCH_KEYWORD: &str = "Missing search keyword";
pub const UNSUPPORTED_FILE_TYPE: &str = "Unsupported file type for execution.";

pub const CONFIRM_FILE_EXISTS: &str = "File exists. Waiting for user response.";
pub const CONFIRM_FILE_MISSING: &str = "File not found.";
pub const OPERATION_CANCELLED: &str = "Operation cancelled by user.";
pub const DIFF_NO_CHANGES: &str = "No differences found - files are identical.";

pub fn overwrite_prompt(path: &str) -> String {
    format!("File '{path}' already exists. Overwrite? (yes/no)")
}

pub fn create_prompt(path: &str) -> String {
    format!("File '{path}' does not exist. Create it? (yes/no)")
}

pub fn unknown_action(action: &str) -> String {
    format!("Unknown action: {action}")
}

pub fn action_failed(err: &str) -> String {
    format!("Failed to execute action: {err}")
}

pub fn connect_failed(err: &str) -> String {
    format!("Failed to connect to AI Assistant: {err}. Please check your internet connection.")
}

pub fn workspace_set(path: &str) -> String {
    format!("Workspace set to: {path}")
}

pub fn invalid_message(line: &str) -> String {
    let head: String = line.chars().take(100).collect();
    format!("Invalid JSON message received: {head}...")
}

pub fn file_operation_failed(err: &str) -> String {
    format!("File operation failed: {err}")
}

pub fn unknown_file_operation(action: &str) -> String {
    format!("Unknown file operation: {action}")
}

pub fn running_file(path: &str, result: &str) -> String {
    format!("Running {path}:\n\n{result}")
}

pub const WEBSITE_DETECTED: &str =
    "Detected website building request. Connecting to Website Building Backend...";
pub const WEBSITE_STREAMING: &str = "Streaming website generation progress...";
pub const WEBSITE_START_REPLY: &str = "Starting website generation...";
pub const WEBSITE_CHAT_REPLY: &str = "I understand. Let me know when you're ready to proceed.";

pub fn website_unreachable(url: &str) -> String {
    format!(
        "Cannot connect to Website Building Backend at {url}. Please start the server and try again."
    )
}

pub fn website_failed(err: &str) -> String {
    format!("Website generation failed: {err}")
}

pub fn generation_failed(err: &str) -> String {
    format!("Generation failed: {err}")
}

pub fn generating_progress(file: &str, progress: u32) -> String {
    format!("Generating: {file} ({progress}%)")
}

pub const WEBSITE_START_FAILED: &str = "Failed to start generation";
pub const STREAM_ERROR_FALLBACK: &str = "Unknown error";

pub fn stream_transport_failed(err: &str) -> String {
    format!("Error streaming generation: {err}")
}

pub fn website_complete_text(preview_url: &str, zip_url: &str) -> String {
    format!("✅ Website generated successfully!\n\n🌐 Preview: {preview_url}\n\n📦 Download: {zip_url}")
}

pub fn folder_created(path: &str) -> String {
    format!("Folder '{path}' created.")
}

pub fn folder_exists(path: &str) -> String {
    format!("Folder '{path}' already exists.")
}

pub fn project_folder_created(path: &str) -> String {
    format!("Created project folder: {path}")
}

pub fn project_folder_exists(name: &str) -> String {
    format!("Project folder '{name}' already exists.")
}

pub fn project_failed(err: &str) -> String {
    format!("Failed to create project: {err}")
}

pub fn file_write_failed(path: &str, err: &str) -> String {
    format!("Failed to create {path}: {err}")
}

pub fn project_summary(created: usize, updated: usize, errors: usize) -> String {
    format!("Created: {created}, Updated: {updated}, Errors: {errors}")
}

pub fn file_created(path: &str) -> String {
    format!("Created: {path}")
}

pub fn file_updated(path: &str) -> String {
    format!("Updated: {path}")
}

pub fn file_not_found(path: &str) -> String {
    format!("File '{path}' not found.")
}

pub const INFO_TARGET_MISSING: &str = "File not found";

pub fn run_output(stdout: &str) -> String {
    format!("Output:\n{stdout}")
}

pub fn run_failed(detail: &str) -> String {
    format!("Execution failed:\n{detail}")
}

pub fn run_timed_out(secs: u64) -> String {
    format!("Execution timed out after {secs} seconds")
}

pub fn no_results(entity: &str) -> String {
    format!("No {entity} found.")
}

pub fn found_results(count: usize, entity: &str) -> String {
    format!("Found {count} {entity}:")
}

pub const DIFF_HEADER: &str = "Changes between existing and new content:";
pub const BACKUP_FAILED: &str = "Failed to create backup. Operation cancelled.";
pub const MISSING_ORIGINAL: &str = "Could not find existing file to modify.";

pub fn diff_failed(err: &str) -> String {
    format!("Could not generate diff: {err}")
}

pub fn backup_created(path: &str) -> String {
    format!("Created backup at: {path}")
}
