//! Project-relative path handling.

use std::path::{Component, Path};

/// Split a project-relative path into its normal components.
///
/// `.` components and trailing separators are ignored. Returns `None` for
/// absolute paths and paths escaping the project through `..`.
pub fn components(path: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    for component in Path::new(path).components() {
        match component {
            Component::CurDir => {}
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(parts)
}

/// Canonical `/`-separated form of a project-relative path; `"."` for the root.
pub fn normalize(path: &str) -> Option<String> {
    let parts = components(path)?;
    if parts.is_empty() {
        return Some(".".to_string());
    }
    Some(parts.join("/"))
}

/// Number of normal components in a path.
pub fn depth(path: &str) -> usize {
    components(path).map_or(0, |parts| parts.len())
}

/// Project-relative form of a path inside `root`, or `None` if it lies outside.
pub fn relative_to(path: &Path, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Option<Vec<&str>> = relative
        .components()
        .map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect();
    let parts = parts?;
    if parts.is_empty() {
        return Some(".".to_string());
    }
    Some(parts.join("/"))
}
