//! JWalk-based project tree scanner.

use std::path::{Path, PathBuf};
use std::time::Instant;

use compact_str::CompactString;
use jwalk::{Parallelism, WalkDir};
use rayon::prelude::*;

use lintree_core::{Directory, File, Project, ScanConfig, ScanError, path};

use crate::loc::count_file_lines;

/// Builds the directory tree of a project.
///
/// Any enumeration or read failure aborts the whole scan.
#[derive(Debug, Default)]
pub struct TreeScanner;

impl TreeScanner {
    /// Create a new scanner.
    pub fn new() -> Self {
        Self
    }

    /// Scan the project rooted at `config.root`.
    pub fn scan(&self, config: &ScanConfig) -> Result<Project, ScanError> {
        let start = Instant::now();
        let root_path = config
            .root
            .canonicalize()
            .map_err(|e| ScanError::io(&config.root, e))?;

        // Verify root is a directory
        if !root_path.is_dir() {
            return Err(ScanError::NotADirectory { path: root_path });
        }

        let entries = self.collect_entries(config, &root_path)?;

        let sources: Vec<(String, u64)> = entries
            .sources
            .into_par_iter()
            .map(|(relative, absolute)| {
                count_file_lines(&absolute, &config.comment_prefix).map(|count| (relative, count))
            })
            .collect::<Result<_, _>>()?;

        let root = self.build_tree(entries.directories, sources);

        tracing::debug!(
            root = %root_path.display(),
            files = root.file_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Scanned project tree"
        );

        Ok(Project::new(root_path, root))
    }

    /// Collect directories and source files, pruning excluded directories.
    fn collect_entries(
        &self,
        config: &ScanConfig,
        root_path: &Path,
    ) -> Result<CollectedEntries, ScanError> {
        let parallelism = match config.threads {
            0 => Parallelism::RayonDefaultPool {
                busy_timeout: std::time::Duration::from_millis(100),
            },
            n => Parallelism::RayonNewPool(n),
        };

        let prune = config.clone();
        let walker = WalkDir::new(root_path)
            .parallelism(parallelism)
            .skip_hidden(false)
            .follow_links(false)
            .sort(true)
            .process_read_dir(move |_depth, _path, _state, children| {
                children.retain(|child| match child {
                    Ok(entry) => {
                        !(entry.file_type().is_dir()
                            && prune.should_exclude(&entry.file_name().to_string_lossy()))
                    }
                    Err(_) => true,
                });
            });

        let mut collected = CollectedEntries::default();

        for entry_result in walker {
            let entry = entry_result.map_err(|err| {
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root_path.to_path_buf());
                ScanError::io(path, std::io::Error::other(err.to_string()))
            })?;

            if entry.depth() == 0 {
                continue;
            }

            let path = entry.path();
            let Some(relative) = path::relative_to(&path, root_path) else {
                return Err(ScanError::InvalidConfig {
                    message: format!("{} is not valid UTF-8 or escapes the root", path.display()),
                });
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                collected.directories.push(relative);
            } else if file_type.is_file() && config.is_source(&entry.file_name().to_string_lossy())
            {
                collected.sources.push((relative, path));
            }
        }

        Ok(collected)
    }

    /// Assemble the tree from collected entries.
    fn build_tree(&self, mut directories: Vec<String>, sources: Vec<(String, u64)>) -> Directory {
        let mut root = Directory::new(".");

        // Parents before children.
        directories.sort_by(|a, b| path::depth(a).cmp(&path::depth(b)).then(a.cmp(b)));
        for dir_path in directories {
            let Some((parent, name)) = split_parent(&dir_path) else {
                continue;
            };
            if let Some(parent) = root.directory_mut(&parent) {
                parent
                    .subdirectories
                    .insert(CompactString::from(name), Directory::new(dir_path.as_str()));
            }
        }

        for (file_path, line_count) in sources {
            let Some((parent, name)) = split_parent(&file_path) else {
                continue;
            };
            if let Some(parent) = root.directory_mut(&parent) {
                parent
                    .files
                    .insert(CompactString::from(name), File::new(file_path.as_str(), line_count));
            }
        }

        root
    }
}

#[derive(Debug, Default)]
struct CollectedEntries {
    /// Project-relative directory paths.
    directories: Vec<String>,
    /// Project-relative and absolute paths of source files.
    sources: Vec<(String, PathBuf)>,
}

/// Split a relative path into its parent components and final name.
fn split_parent(relative: &str) -> Option<(Vec<&str>, &str)> {
    let mut components = path::components(relative)?;
    let name = components.pop()?;
    Some((components, name))
}
