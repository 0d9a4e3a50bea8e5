//! File system helpers: path normalization and the tree-walk filter.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// Normalize a path lexically (collapses `.` and `..` segments)
pub fn normalize_path(path: &Path) -> PathBuf {
    path_clean::clean(path)
}

/// Render `path` relative to `root` with `/` separators.
///
/// Falls back to the full path when `path` is not under `root`.
pub fn relative_path_string(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Uniform exclusion policy applied while walking a source tree.
#[derive(Debug, Clone)]
pub struct PathFilter {
    excluded_dirs: HashSet<String>,
    extra: GlobSet,
    exclude_tests: bool,
}

impl PathFilter {
    /// Build a filter from the default directory exclusions plus extra glob patterns
    pub fn new(extra_patterns: &[String], exclude_tests: bool) -> crate::Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in extra_patterns {
            let glob = Glob::new(pattern)
                .map_err(|e| crate::UtilError::Pattern(format!("Invalid glob '{pattern}': {e}")))?;
            builder.add(glob);
        }
        let extra = builder
            .build()
            .map_err(|e| crate::UtilError::Pattern(format!("Failed to compile globs: {e}")))?;

        Ok(Self {
            excluded_dirs: crate::default_excluded_directories()
                .into_iter()
                .map(str::to_string)
                .collect(),
            extra,
            exclude_tests,
        })
    }

    /// Whether a directory (by its own name) is skipped entirely
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.excluded_dirs.contains(name) || name.ends_with(".egg-info")
    }

    /// Whether a file or directory at `relative` (slash separated) is excluded
    pub fn is_excluded(&self, relative: &str) -> bool {
        if self.extra.is_match(relative) {
            return true;
        }
        if relative.split('/').any(|segment| self.is_excluded_dir(segment)) {
            return true;
        }
        let file_name = relative.rsplit('/').next().unwrap_or(relative);
        self.exclude_tests && crate::is_test_file_name(file_name)
    }
}
