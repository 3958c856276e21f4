//! Discovery of the markdown document to run when none is given explicitly.

use std::path::{Path, PathBuf};

use log::{debug, info};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LocateError {
    #[error("No markdown file found in {} or its parents", .0.display())]
    DocumentNotFound(PathBuf),
}

/// File names probed in each directory, highest priority first.
pub fn candidate_names(program: &str) -> [String; 3] {
    [
        format!("{program}.md"),
        format!(".{program}.md"),
        "README.md".to_string(),
    ]
}

/// Searches `start` and then each of its parents for a script document.
///
/// All candidate names are checked in a directory before moving up. Symbolic
/// links count when they resolve to a regular file.
///
/// # Errors
///
/// Returns `LocateError::DocumentNotFound` once the filesystem root has been
/// checked without a match.
pub fn find_document(start: &Path, program: &str) -> Result<PathBuf, LocateError> {
    let names = candidate_names(program);
    let mut dir = start.to_path_buf();
    loop {
        for name in &names {
            let candidate = dir.join(name);
            debug!("Looking for {}", candidate.display());
            if candidate.is_file() {
                info!("Found markdown file: {}", candidate.display());
                return Ok(candidate);
            }
        }
        if !dir.pop() {
            return Err(LocateError::DocumentNotFound(start.to_path_buf()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_readme_three_levels_up() {
        let dir = tempfile::tempdir().unwrap();
        let start = dir.path().join("a").join("b").join("c");
        std::fs::create_dir_all(&start).unwrap();
        std::fs::write(dir.path().join("README.md"), "# Hi\n").unwrap();

        let found = find_document(&start, "scripts").unwrap();
        assert_eq!(found, dir.path().join("README.md"));
    }

    #[test]
    fn program_document_beats_readme_in_same_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README.md"), "").unwrap();
        std::fs::write(dir.path().join(".scripts.md"), "").unwrap();
        assert_eq!(
            find_document(dir.path(), "scripts").unwrap(),
            dir.path().join(".scripts.md")
        );

        std::fs::write(dir.path().join("scripts.md"), "").unwrap();
        assert_eq!(
            find_document(dir.path(), "scripts").unwrap(),
            dir.path().join("scripts.md")
        );
    }

    #[test]
    fn nearer_directory_wins_over_priority() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("pkg");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(dir.path().join("tasks.md"), "").unwrap();
        std::fs::write(nested.join("README.md"), "").unwrap();

        assert_eq!(find_document(&nested, "tasks").unwrap(), nested.join("README.md"));
    }

    #[test]
    fn directories_are_not_documents() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("pkg");
        std::fs::create_dir_all(nested.join("README.md")).unwrap();
        std::fs::write(dir.path().join("README.md"), "").unwrap();

        assert_eq!(
            find_document(&nested, "scripts").unwrap(),
            dir.path().join("README.md")
        );
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_document_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("docs.md");
        std::fs::write(&target, "").unwrap();
        std::os::unix::fs::symlink(&target, dir.path().join("scripts.md")).unwrap();

        assert_eq!(
            find_document(dir.path(), "scripts").unwrap(),
            dir.path().join("scripts.md")
        );
    }

    #[test]
    fn missing_document_reports_start() {
        let dir = tempfile::tempdir().unwrap();
        let start = dir.path().join("empty");
        std::fs::create_dir(&start).unwrap();

        match find_document(&start, "no-such-program-name") {
            Err(LocateError::DocumentNotFound(path)) => assert_eq!(path, start),
            // A README.md above the temp directory is outside our control.
            Ok(path) => assert!(!path.starts_with(dir.path())),
        }
    }
}
