//! # Workspace Operations
//!
//! File and folder mutations inside the active workspace root. Writes that
//! would clobber (or silently create) a file are suspended and handed back to
//! the caller for user confirmation instead of being applied immediately.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::domain::types::{FileSpec, Outcome, OutcomeKind, PendingAction};
use crate::strings::messages;

/// Result of a gated write. Either the write happened (or failed cleanly), or
/// the operation was suspended and needs a user decision before it can run.
#[derive(Debug)]
pub enum WriteAttempt {
    Done(Outcome),
    Suspended {
        outcome: Outcome,
        prompt: String,
        pending: PendingAction,
    },
}

/// The active workspace root. All mutating operations resolve against it and
/// refuse to run while it is unset.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    root: Option<PathBuf>,
}

impl Workspace {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    pub fn set_root(&mut self, root: PathBuf) {
        self.root = Some(root);
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Joins `relative` onto the workspace root, or `None` when no workspace
    /// is open.
    pub fn resolve(&self, relative: &str) -> Option<PathBuf> {
        self.root.as_ref().map(|root| root.join(relative))
    }

    pub fn create_folder(&self, folder: &str) -> Outcome {
        let Some(full) = self.resolve(folder) else {
            return Outcome::error(messages::NO_WORKSPACE);
        };
        if full.exists() {
            return Outcome::info(messages::folder_exists(&full.display().to_string()));
        }
        match fs::create_dir_all(&full) {
            Ok(()) => Outcome::ok(messages::folder_created(&full.display().to_string())),
            Err(e) => Outcome::error(e.to_string()),
        }
    }

    /// Creates a project folder and writes every file spec into it. Individual
    /// file failures are tallied and reported inline; the batch keeps going.
    pub fn create_project(&self, folder: &str, files: &[FileSpec]) -> Vec<Outcome> {
        let Some(project_root) = self.resolve(folder) else {
            return vec![Outcome::error(messages::NO_WORKSPACE)];
        };

        let mut outcomes = Vec::new();
        if project_root.exists() {
            outcomes.push(Outcome::info(messages::project_folder_exists(folder)));
        } else if let Err(e) = fs::create_dir_all(&project_root) {
            return vec![Outcome::error(messages::project_failed(&e.to_string()))];
        } else {
            outcomes.push(Outcome::ok(messages::project_folder_created(
                &project_root.display().to_string(),
            )));
        }

        let (mut created, mut updated, mut errors) = (0usize, 0usize, 0usize);
        for spec in files {
            let Some(rel) = spec.path.as_deref() else {
                errors += 1;
                outcomes.push(Outcome::error(messages::file_write_failed("file", "missing path")));
                continue;
            };
            let target = project_root.join(rel);
            let existed = target.exists();
            match write_with_parents(&target, &spec.content) {
                Ok(()) => {
                    let display = format!("{folder}/{rel}");
                    if existed {
                        updated += 1;
                        outcomes.push(Outcome::new(OutcomeKind::Updated, display));
                    } else {
                        created += 1;
                        outcomes.push(Outcome::new(OutcomeKind::Created, display));
                    }
                }
                Err(e) => {
                    errors += 1;
                    outcomes.push(Outcome::error(messages::file_write_failed(rel, &e.to_string())));
                }
            }
        }

        outcomes.push(Outcome::new(
            OutcomeKind::Summary,
            messages::project_summary(created, updated, errors),
        ));
        outcomes
    }

    /// Writes a new file, suspending when the path already exists.
    pub fn create_file(&self, path: &str, content: &str) -> WriteAttempt {
        let Some(full) = self.resolve(path) else {
            return WriteAttempt::Done(Outcome::error(messages::NO_WORKSPACE));
        };
        if full.exists() {
            return WriteAttempt::Suspended {
                outcome: Outcome::new(OutcomeKind::ConfirmationRequired, messages::CONFIRM_FILE_EXISTS),
                prompt: messages::overwrite_prompt(path),
                pending: PendingAction::CreateFile {
                    path: path.to_string(),
                    content: content.to_string(),
                },
            };
        }
        WriteAttempt::Done(match write_with_parents(&full, content) {
            Ok(()) => Outcome::ok(messages::file_created(path)),
            Err(e) => Outcome::error(e.to_string()),
        })
    }

    /// Overwrites an existing file, suspending when the path does not exist.
    pub fn update_file(&self, path: &str, content: &str) -> WriteAttempt {
        let Some(full) = self.resolve(path) else {
            return WriteAttempt::Done(Outcome::error(messages::NO_WORKSPACE));
        };
        if !full.exists() {
            return WriteAttempt::Suspended {
                outcome: Outcome::new(OutcomeKind::ConfirmationRequired, messages::CONFIRM_FILE_MISSING),
                prompt: messages::create_prompt(path),
                pending: PendingAction::UpdateFile {
                    path: path.to_string(),
                    content: content.to_string(),
                },
            };
        }
        WriteAttempt::Done(match fs::write(&full, content) {
            Ok(()) => Outcome::ok(messages::file_updated(path)),
            Err(e) => Outcome::error(e.to_string()),
        })
    }

    /// Unconditional write used once the user has confirmed (and by editor
    /// file operations, which carry their own confirmation UI). Reports
    /// created versus updated based on whether the file existed beforehand.
    pub fn write_confirmed(&self, path: &str, content: &str) -> Outcome {
        let Some(full) = self.resolve(path) else {
            return Outcome::error(messages::NO_WORKSPACE);
        };
        let existed = full.exists();
        match write_with_parents(&full, content) {
            Ok(()) if existed => Outcome::ok(messages::file_updated(path)),
            Ok(()) => Outcome::ok(messages::file_created(path)),
            Err(e) => Outcome::error(e.to_string()),
        }
    }
}

fn write_with_parents(target: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(target, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_workspace(dir: &tempfile::TempDir) -> Workspace {
        Workspace::new(Some(dir.path().to_path_buf()))
    }

    #[test]
    fn create_folder_reports_created_then_exists() {
        let dir = tempdir().unwrap();
        let ws = open_workspace(&dir);

        let first = ws.create_folder("src");
        assert_eq!(first.kind, OutcomeKind::Ok);
        assert!(dir.path().join("src").is_dir());

        let second = ws.create_folder("src");
        assert_eq!(second.kind, OutcomeKind::Info);
        assert!(second.text.contains("already exists"));
    }

    #[test]
    fn operations_refuse_without_workspace() {
        let ws = Workspace::default();
        assert_eq!(ws.create_folder("src").render(), "[ERROR] No workspace open");

        match ws.create_file("a.py", "x") {
            WriteAttempt::Done(o) => assert_eq!(o.text, messages::NO_WORKSPACE),
            WriteAttempt::Suspended { .. } => panic!("should not suspend without workspace"),
        }
    }

    #[test]
    fn create_file_writes_new_file_with_parents() {
        let dir = tempdir().unwrap();
        let ws = open_workspace(&dir);

        match ws.create_file("pkg/lib/a.py", "print(1)\n") {
            WriteAttempt::Done(o) => assert_eq!(o.render(), "[OK] Created: pkg/lib/a.py"),
            WriteAttempt::Suspended { .. } => panic!("fresh path should not suspend"),
        }
        let written = fs::read_to_string(dir.path().join("pkg/lib/a.py")).unwrap();
        assert_eq!(written, "print(1)\n");
    }

    #[test]
    fn create_file_suspends_on_existing_path_without_writing() {
        let dir = tempdir().unwrap();
        let ws = open_workspace(&dir);
        fs::write(dir.path().join("a.py"), "old").unwrap();

        match ws.create_file("a.py", "new") {
            WriteAttempt::Suspended { outcome, prompt, pending } => {
                assert_eq!(outcome.kind, OutcomeKind::ConfirmationRequired);
                assert_eq!(outcome.text, messages::CONFIRM_FILE_EXISTS);
                assert!(prompt.contains("Overwrite? (yes/no)"));
                assert_eq!(
                    pending,
                    PendingAction::CreateFile { path: "a.py".into(), content: "new".into() }
                );
            }
            WriteAttempt::Done(o) => panic!("expected suspension, got {o:?}"),
        }
        assert_eq!(fs::read_to_string(dir.path().join("a.py")).unwrap(), "old");
    }

    #[test]
    fn update_file_overwrites_existing_path() {
        let dir = tempdir().unwrap();
        let ws = open_workspace(&dir);
        fs::write(dir.path().join("a.py"), "old").unwrap();

        match ws.update_file("a.py", "new") {
            WriteAttempt::Done(o) => assert_eq!(o.render(), "[OK] Updated: a.py"),
            WriteAttempt::Suspended { .. } => panic!("existing path should not suspend"),
        }
        assert_eq!(fs::read_to_string(dir.path().join("a.py")).unwrap(), "new");
    }

    #[test]
    fn update_file_suspends_on_missing_path() {
        let dir = tempdir().unwrap();
        let ws = open_workspace(&dir);

        match ws.update_file("ghost.py", "new") {
            WriteAttempt::Suspended { outcome, prompt, pending } => {
                assert_eq!(outcome.text, messages::CONFIRM_FILE_MISSING);
                assert!(prompt.contains("Create it? (yes/no)"));
                assert_eq!(
                    pending,
                    PendingAction::UpdateFile { path: "ghost.py".into(), content: "new".into() }
                );
            }
            WriteAttempt::Done(o) => panic!("expected suspension, got {o:?}"),
        }
        assert!(!dir.path().join("ghost.py").exists());
    }

    #[test]
    fn write_confirmed_reports_created_or_updated_by_preexistence() {
        let dir = tempdir().unwrap();
        let ws = open_workspace(&dir);

        let first = ws.write_confirmed("notes.md", "a");
        assert_eq!(first.render(), "[OK] Created: notes.md");

        let second = ws.write_confirmed("notes.md", "b");
        assert_eq!(second.render(), "[OK] Updated: notes.md");
        assert_eq!(fs::read_to_string(dir.path().join("notes.md")).unwrap(), "b");
    }

    #[test]
    fn create_project_tallies_created_updated_and_errors() {
        let dir = tempdir().unwrap();
        let ws = open_workspace(&dir);
        fs::create_dir_all(dir.path().join("demo")).unwrap();
        fs::write(dir.path().join("demo/old.py"), "v1").unwrap();

        let files = vec![
            FileSpec { path: Some("old.py".into()), content: "v2".into() },
            FileSpec { path: Some("sub/new.py".into()), content: "print(1)".into() },
            FileSpec { path: None, content: "orphan".into() },
        ];
        let outcomes = ws.create_project("demo", &files);

        assert_eq!(outcomes[0].kind, OutcomeKind::Info);
        assert!(outcomes[0].text.contains("already exists"));
        assert!(outcomes.iter().any(|o| o.render() == "[UPDATED] demo/old.py"));
        assert!(outcomes.iter().any(|o| o.render() == "[CREATED] demo/sub/new.py"));
        let summary = outcomes.last().unwrap();
        assert_eq!(summary.render(), "[SUMMARY] Created: 1, Updated: 1, Errors: 1");
        assert_eq!(fs::read_to_string(dir.path().join("demo/old.py")).unwrap(), "v2");
        assert_eq!(fs::read_to_string(dir.path().join("demo/sub/new.py")).unwrap(), "print(1)");
    }

    #[test]
    fn create_project_reports_new_project_folder() {
        let dir = tempdir().unwrap();
        let ws = open_workspace(&dir);

        let files = vec![FileSpec { path: Some("main.py".into()), content: "pass".into() }];
        let outcomes = ws.create_project("fresh", &files);

        assert_eq!(outcomes[0].kind, OutcomeKind::Ok);
        assert!(outcomes[0].text.starts_with("Created project folder:"));
        assert_eq!(outcomes.last().unwrap().render(), "[SUMMARY] Created: 1, Updated: 0, Errors: 0");
    }
}
