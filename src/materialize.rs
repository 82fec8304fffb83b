use std::fs;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

use crate::layout::{Node, Tree};
use crate::util;

#[derive(Clone, Copy, Debug, Default)]
pub struct MaterializeOptions {
    /// Log and count planned operations without touching the filesystem.
    pub dry_run: bool,
}

/// Outcome of a completed run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaterializeReport {
    pub base: Utf8PathBuf,
    pub directories: usize,
    pub files: usize,
    pub dry_run: bool,
}

impl MaterializeReport {
    pub fn completion_line(&self) -> String {
        if self.dry_run {
            format!("Dry run: would create directory structure at {}", self.base)
        } else {
            format!("Directory structure created successfully at {}", self.base)
        }
    }
}

/// Create every directory and file described by `tree` under `base`.
///
/// Existing directories are reused and existing files are truncated to the
/// given contents. Unrelated entries already under `base` are left alone.
/// The walk stops at the first failure, leaving whatever was created so far.
pub fn materialize(
    base: &Utf8Path,
    tree: &Tree,
    options: MaterializeOptions,
) -> Result<MaterializeReport> {
    if options.dry_run {
        debug!(path = %base, "would ensure base directory");
    } else {
        util::fs::ensure_dir(base).with_context(|| format!("creating directory {}", base))?;
    }

    let mut report = MaterializeReport {
        base: base.to_owned(),
        directories: 0,
        files: 0,
        dry_run: options.dry_run,
    };
    walk(base, tree, options, &mut report)?;

    println!("{}", report.completion_line());
    Ok(report)
}

fn walk(
    parent: &Utf8Path,
    tree: &Tree,
    options: MaterializeOptions,
    report: &mut MaterializeReport,
) -> Result<()> {
    for (name, node) in tree.iter() {
        let path = parent.join(name);
        match node {
            Node::Directory(children) => {
                if options.dry_run {
                    debug!(path = %path, "would create directory");
                } else {
                    fs::create_dir_all(&path)
                        .with_context(|| format!("creating directory {}", path))?;
                    debug!(path = %path, "directory ready");
                }
                report.directories += 1;
                walk(&path, children, options, report)?;
            }
            Node::File(contents) => {
                if options.dry_run {
                    debug!(path = %path, bytes = contents.len(), "would write file");
                } else {
                    fs::write(&path, contents).with_context(|| format!("writing {}", path))?;
                    debug!(path = %path, bytes = contents.len(), "file written");
                }
                report.files += 1;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn scratch() -> (TempDir, Utf8PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).unwrap();
        (tmp, root)
    }

    fn sample() -> Tree {
        Tree::new()
            .file("a.txt", "hi")
            .dir("b", Tree::new().file("c.txt", ""))
    }

    fn snapshot(root: &Utf8Path) -> Vec<(String, Option<String>)> {
        let mut entries = Vec::new();
        collect(root, root, &mut entries);
        entries.sort();
        entries
    }

    fn collect(root: &Utf8Path, dir: &Utf8Path, out: &mut Vec<(String, Option<String>)>) {
        for entry in dir.read_dir_utf8().unwrap() {
            let entry = entry.unwrap();
            let path = entry.path();
            let rel = path.strip_prefix(root).unwrap().to_string();
            if path.is_dir() {
                out.push((rel, None));
                collect(root, path, out);
            } else {
                out.push((rel, Some(fs::read_to_string(path).unwrap())));
            }
        }
    }

    #[test]
    fn creates_files_and_directories() {
        let (_tmp, root) = scratch();
        let base = root.join("apps").join("demo");

        let report = materialize(&base, &sample(), MaterializeOptions::default()).unwrap();

        assert_eq!(fs::read_to_string(base.join("a.txt")).unwrap(), "hi");
        assert_eq!(fs::read_to_string(base.join("b").join("c.txt")).unwrap(), "");
        assert!(base.join("b").is_dir());
        assert_eq!((report.directories, report.files), (1, 2));
        assert_eq!(
            report.completion_line(),
            format!("Directory structure created successfully at {}", base)
        );
    }

    #[test]
    fn second_run_yields_same_state() {
        let (_tmp, root) = scratch();
        let tree = sample();

        materialize(&root, &tree, MaterializeOptions::default()).unwrap();
        let first = snapshot(&root);
        materialize(&root, &tree, MaterializeOptions::default()).unwrap();
        assert_eq!(snapshot(&root), first);
    }

    #[test]
    fn existing_files_are_truncated_and_unrelated_entries_kept() {
        let (_tmp, root) = scratch();
        fs::write(root.join("a.txt"), "a much longer previous body").unwrap();
        fs::create_dir_all(root.join("b")).unwrap();
        fs::write(root.join("b").join("keep.md"), "mine").unwrap();
        fs::write(root.join("unrelated.txt"), "still here").unwrap();

        materialize(&root, &sample(), MaterializeOptions::default()).unwrap();

        assert_eq!(fs::read_to_string(root.join("a.txt")).unwrap(), "hi");
        assert_eq!(fs::read_to_string(root.join("b").join("keep.md")).unwrap(), "mine");
        assert_eq!(fs::read_to_string(root.join("unrelated.txt")).unwrap(), "still here");
    }

    #[test]
    fn file_in_place_of_directory_is_an_error() {
        let (_tmp, root) = scratch();
        fs::write(root.join("b"), "not a directory").unwrap();

        let err = materialize(&root, &sample(), MaterializeOptions::default()).unwrap_err();
        assert!(err.to_string().contains("creating directory"));
        // Entries before the collision were already written.
        assert_eq!(fs::read_to_string(root.join("a.txt")).unwrap(), "hi");
    }

    #[test]
    fn directory_in_place_of_file_is_an_error() {
        let (_tmp, root) = scratch();
        fs::create_dir_all(root.join("a.txt")).unwrap();

        let err = materialize(&root, &sample(), MaterializeOptions::default()).unwrap_err();
        assert!(err.to_string().contains("writing"));
    }

    #[test]
    fn base_under_a_file_is_an_error() {
        let (_tmp, root) = scratch();
        fs::write(root.join("apps"), "").unwrap();

        let base = root.join("apps").join("web");
        assert!(materialize(&base, &sample(), MaterializeOptions::default()).is_err());
    }

    #[test]
    fn dry_run_touches_nothing() {
        let (_tmp, root) = scratch();
        let base = root.join("apps").join("demo");

        let report = materialize(&base, &sample(), MaterializeOptions { dry_run: true }).unwrap();

        assert!(!base.exists());
        assert_eq!((report.directories, report.files), (1, 2));
        assert!(report.completion_line().starts_with("Dry run"));
    }

    #[test]
    fn empty_tree_only_creates_base() {
        let (_tmp, root) = scratch();
        let base = root.join("empty");

        let report = materialize(&base, &Tree::new(), MaterializeOptions::default()).unwrap();
        assert!(base.is_dir());
        assert_eq!((report.directories, report.files), (0, 0));
    }
}
