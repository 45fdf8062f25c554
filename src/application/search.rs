//! # Workspace Search
//!
//! Read-only lookups over the workspace tree: filename search, folder search,
//! content search, and file metadata. All walks skip hidden directories and
//! dependency caches, and stop as soon as the result cap is reached.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};

use crate::domain::types::Outcome;
use crate::strings::messages;

const SKIP_DIRS: &[&str] = &["node_modules", "__pycache__"];
/// Additional noise directories ignored when resolving a file by bare name.
const RESOLVE_SKIP_DIRS: &[&str] = &["node_modules", "__pycache__", "venv", "env"];
const TEXT_EXTENSIONS: &[&str] = &[
    ".py", ".js", ".ts", ".html", ".css", ".json", ".md", ".txt", ".xml", ".yaml", ".yml",
];
const LINE_MATCH_LIMIT: usize = 3;
const EXCERPT_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct FileHit {
    pub name: String,
    pub path: String,
    pub size: u64,
    pub modified: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FolderHit {
    pub name: String,
    pub path: String,
    pub file_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineHit {
    pub line: usize,
    pub excerpt: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContentHit {
    pub name: String,
    pub path: String,
    pub lines: Vec<LineHit>,
}

fn should_descend(name: &str) -> bool {
    !name.starts_with('.') && !SKIP_DIRS.contains(&name)
}

pub fn relative_display(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Local>::from(time).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Humanizes a byte count, e.g. `1536` becomes `1.50 KB`.
pub fn format_file_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB", "GB", "TB"] {
        if size < 1024.0 {
            return format!("{size:.2} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.2} PB")
}

/// Finds files whose name contains `keyword` (case-insensitive), optionally
/// restricted to names ending with `file_type`.
pub fn search_files(
    root: &Path,
    keyword: &str,
    file_type: Option<&str>,
    max_results: usize,
) -> io::Result<Vec<FileHit>> {
    let keyword = keyword.to_lowercase();
    let mut hits = Vec::new();
    walk_files(root, root, &keyword, file_type, max_results, &mut hits)?;
    Ok(hits)
}

fn walk_files(
    root: &Path,
    dir: &Path,
    keyword: &str,
    file_type: Option<&str>,
    max_results: usize,
    hits: &mut Vec<FileHit>,
) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        if hits.len() >= max_results {
            return Ok(());
        }
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            if should_descend(&name) {
                walk_files(root, &path, keyword, file_type, max_results, hits)?;
            }
        } else if name.to_lowercase().contains(keyword) {
            if let Some(suffix) = file_type {
                if !name.ends_with(suffix) {
                    continue;
                }
            }
            let meta = fs::metadata(&path)?;
            hits.push(FileHit {
                path: relative_display(root, &path),
                name,
                size: meta.len(),
                modified: format_timestamp(meta.modified()?),
            });
        }
    }
    Ok(())
}

/// Finds directories whose name contains `keyword` (case-insensitive). The
/// match runs against every directory, including ones the walk does not
/// descend into.
pub fn search_folders(root: &Path, keyword: &str, max_results: usize) -> io::Result<Vec<FolderHit>> {
    let keyword = keyword.to_lowercase();
    let mut hits = Vec::new();
    walk_folders(root, root, &keyword, max_results, &mut hits)?;
    Ok(hits)
}

fn walk_folders(
    root: &Path,
    dir: &Path,
    keyword: &str,
    max_results: usize,
    hits: &mut Vec<FolderHit>,
) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        if hits.len() >= max_results {
            return Ok(());
        }
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        let path = entry.path();
        if name.to_lowercase().contains(keyword) {
            let file_count = fs::read_dir(&path)?.count();
            hits.push(FolderHit {
                path: relative_display(root, &path),
                name: name.clone(),
                file_count,
            });
        }
        if hits.len() < max_results && should_descend(&name) {
            walk_folders(root, &path, keyword, max_results, hits)?;
        }
    }
    Ok(())
}

/// Greps text files for `keyword` (case-insensitive). At most three matching
/// lines are reported per file, each trimmed and truncated. `file_pattern`
/// filters file names by substring once `*` wildcards are removed.
pub fn search_in_files(
    root: &Path,
    keyword: &str,
    file_pattern: &str,
    max_results: usize,
) -> io::Result<Vec<ContentHit>> {
    let keyword = keyword.to_lowercase();
    let name_filter = if file_pattern == "*" {
        None
    } else {
        Some(file_pattern.replace('*', ""))
    };
    let mut hits = Vec::new();
    walk_contents(root, root, &keyword, name_filter.as_deref(), max_results, &mut hits)?;
    Ok(hits)
}

fn walk_contents(
    root: &Path,
    dir: &Path,
    keyword: &str,
    name_filter: Option<&str>,
    max_results: usize,
    hits: &mut Vec<ContentHit>,
) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        if hits.len() >= max_results {
            return Ok(());
        }
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            if should_descend(&name) {
                walk_contents(root, &path, keyword, name_filter, max_results, hits)?;
            }
            continue;
        }
        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        if !TEXT_EXTENSIONS.contains(&extension.as_str()) {
            continue;
        }
        if let Some(filter) = name_filter {
            if !name.contains(filter) {
                continue;
            }
        }
        // Unreadable or non-UTF-8 files are skipped silently.
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        let mut lines = Vec::new();
        for (index, line) in content.lines().enumerate() {
            if line.to_lowercase().contains(keyword) {
                lines.push(LineHit {
                    line: index + 1,
                    excerpt: line.trim().chars().take(EXCERPT_LIMIT).collect(),
                });
                if lines.len() >= LINE_MATCH_LIMIT {
                    break;
                }
            }
        }
        if !lines.is_empty() {
            hits.push(ContentHit {
                path: relative_display(root, &path),
                name,
                lines,
            });
        }
    }
    Ok(())
}

/// Collects metadata for a single file or directory, already formatted for
/// display.
pub fn file_info(root: &Path, path: &str) -> io::Result<Outcome> {
    let full = root.join(path);
    if !full.exists() {
        return Ok(Outcome::error(messages::INFO_TARGET_MISSING));
    }
    let meta = fs::metadata(&full)?;
    let name = full
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string());
    let modified = format_timestamp(meta.modified()?);
    // Not every filesystem records a birth time; report the mtime then.
    let created = meta
        .created()
        .map(format_timestamp)
        .unwrap_or_else(|_| modified.clone());
    Ok(Outcome::ok(format!(
        "File Info:\nName: {name}\nPath: {path}\nSize: {size} bytes\nCreated: {created}\nModified: {modified}\nDirectory: {is_dir}",
        size = meta.len(),
        is_dir = meta.is_dir(),
    )))
}

/// Locates a file by exact name anywhere under `root`, preferring a direct
/// path hit. Used to re-target suspended updates whose original path no
/// longer exists.
pub fn find_file_by_name(root: &Path, name: &str) -> Option<PathBuf> {
    let direct = root.join(name);
    if direct.is_file() {
        return Some(direct);
    }
    let target = Path::new(name).file_name()?;
    walk_for_name(root, target)
}

fn walk_for_name(dir: &Path, target: &OsStr) -> Option<PathBuf> {
    for entry in fs::read_dir(dir).ok()?.flatten() {
        let path = entry.path();
        if path.is_dir() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !name.starts_with('.') && !RESOLVE_SKIP_DIRS.contains(&name.as_ref()) {
                if let Some(found) = walk_for_name(&path, target) {
                    return Some(found);
                }
            }
        } else if entry.file_name() == target {
            return Some(path);
        }
    }
    None
}

pub fn format_file_results(hits: &[FileHit]) -> Outcome {
    if hits.is_empty() {
        return Outcome::info(messages::no_results("files"));
    }
    let mut lines = vec![messages::found_results(hits.len(), "files")];
    for (i, hit) in hits.iter().enumerate() {
        lines.push(format!("{}. {} ({})", i + 1, hit.name, hit.path));
        lines.push(format!(
            "   Size: {}, Modified: {}",
            format_file_size(hit.size),
            hit.modified
        ));
    }
    Outcome::ok(lines.join("\n"))
}

pub fn format_folder_results(hits: &[FolderHit]) -> Outcome {
    if hits.is_empty() {
        return Outcome::info(messages::no_results("folders"));
    }
    let mut lines = vec![messages::found_results(hits.len(), "folders")];
    for (i, hit) in hits.iter().enumerate() {
        lines.push(format!("{}. {} ({})", i + 1, hit.name, hit.path));
        lines.push(format!("   Files: {}", hit.file_count));
    }
    Outcome::ok(lines.join("\n"))
}

pub fn format_content_results(hits: &[ContentHit]) -> Outcome {
    if hits.is_empty() {
        return Outcome::info(messages::no_results("content matches"));
    }
    let mut lines = vec![messages::found_results(hits.len(), "content matches")];
    for (i, hit) in hits.iter().enumerate() {
        lines.push(format!("{}. {} ({})", i + 1, hit.name, hit.path));
        lines.push(format!("   Matches: {}", hit.lines.len()));
        for line_hit in &hit.lines {
            lines.push(format!("      Line {}: {}", line_hit.line, line_hit.excerpt));
        }
    }
    Outcome::ok(lines.join("\n"))
}
