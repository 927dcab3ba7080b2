//! Template file discovery.

use crate::config::ScanDepth;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A template found below a controller's template directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    /// File name without the template extension. May be empty (`.html`).
    pub base_name: String,
    /// Subdirectories between the template directory and the file.
    pub relative_segments: Vec<String>,
    pub path: PathBuf,
}

pub trait FileLister: Send + Sync {
    /// Files of `dir` ending in `extension`, in a stable order.
    ///
    /// Fails only when `dir` itself cannot be read.
    fn list_files(&self, dir: &Path, extension: &str, depth: ScanDepth) -> io::Result<Vec<TemplateFile>>;
}

/// [`FileLister`] over the real filesystem, sorted by file name.
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkDirLister;

impl FileLister for WalkDirLister {
    fn list_files(&self, dir: &Path, extension: &str, depth: ScanDepth) -> io::Result<Vec<TemplateFile>> {
        let max_depth = match depth {
            ScanDepth::TopLevel => 1,
            ScanDepth::Recursive => usize::MAX,
        };

        let mut files = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => return Err(err.into()),
                Err(err) => {
                    tracing::warn!("Skipping unreadable entry below {}: {}", dir.display(), err);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(file_name) = entry.file_name().to_str() else {
                tracing::warn!("Skipping template with non UTF-8 name: {}", entry.path().display());
                continue;
            };
            let Some(base_name) = file_name.strip_suffix(extension) else {
                continue;
            };

            let relative_segments = entry
                .path()
                .strip_prefix(dir)
                .ok()
                .and_then(Path::parent)
                .map(|parent| {
                    parent
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy().into_owned())
                        .collect()
                })
                .unwrap_or_default();

            files.push(TemplateFile {
                base_name: base_name.to_string(),
                relative_segments,
                path: entry.path().to_path_buf(),
            });
        }
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("archive/2024")).unwrap();
        for file in [
            "index.tpl",
            "detail.tpl",
            "notes.txt",
            ".tpl",
            "archive/list.tpl",
            "archive/2024/recap.tpl",
        ] {
            fs::write(root.join(file), "").unwrap();
        }
        dir
    }

    #[test]
    fn test_top_level_only() {
        let dir = fixture();
        let files = WalkDirLister
            .list_files(dir.path(), ".tpl", ScanDepth::TopLevel)
            .unwrap();

        let names: Vec<_> = files.iter().map(|f| f.base_name.as_str()).collect();
        assert_eq!(names, vec!["", "detail", "index"]);
        assert!(files.iter().all(|f| f.relative_segments.is_empty()));
    }

    #[test]
    fn test_recursive_relative_segments() {
        let dir = fixture();
        let files = WalkDirLister
            .list_files(dir.path(), ".tpl", ScanDepth::Recursive)
            .unwrap();

        let recap = files.iter().find(|f| f.base_name == "recap").unwrap();
        assert_eq!(recap.relative_segments, vec!["archive", "2024"]);
        let list = files.iter().find(|f| f.base_name == "list").unwrap();
        assert_eq!(list.relative_segments, vec!["archive"]);
        assert_eq!(files.len(), 5);
    }

    #[test]
    fn test_stable_order() {
        let dir = fixture();
        let first = WalkDirLister
            .list_files(dir.path(), ".tpl", ScanDepth::Recursive)
            .unwrap();
        let second = WalkDirLister
            .list_files(dir.path(), ".tpl", ScanDepth::Recursive)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = WalkDirLister.list_files(&dir.path().join("nope"), ".tpl", ScanDepth::TopLevel);
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_loop_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("index.tpl"), "").unwrap();
        fs::write(root.join("detail.tpl"), "").unwrap();
        std::os::unix::fs::symlink("..", root.join("sub/loop")).unwrap();

        let files = WalkDirLister
            .list_files(root, ".tpl", ScanDepth::Recursive)
            .unwrap();
        let names: Vec<_> = files.iter().map(|f| f.base_name.as_str()).collect();
        assert_eq!(names, vec!["detail", "index"]);
    }
}
