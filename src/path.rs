//! Template path resolution.
//!
//! Paths are `/`-separated and absolute once resolved. A path starting with
//! `/` is absolute, one starting with `~` is relative to the configured
//! root, and anything else is relative to the directory of the template
//! that references it.

/// Resolves `path` as referenced from the template at `referencing`.
///
/// ```
/// use beard::path::resolve_path;
///
/// assert_eq!(resolve_path("../images/a.png", "/views/home", None), "/images/a.png");
/// assert_eq!(resolve_path("~/partials/nav", "/views/home", Some("/site")), "/site/partials/nav");
/// assert_eq!(resolve_path("/layout", "/views/home", None), "/layout");
/// ```
pub fn resolve_path(path: &str, referencing: &str, root: Option<&str>) -> String {
    if path.starts_with('/') {
        normalize(path)
    } else if let Some(rest) = path.strip_prefix('~') {
        normalize(&format!("{}/{}", root.unwrap_or("/"), rest))
    } else {
        normalize(&format!("{}/{}", parent_dir(referencing), path))
    }
}

/// Everything before the last `/`-separated segment.
fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(i) if i + 1 < path.len() => &path[..i],
        Some(_) => path.trim_end_matches('/'),
        None => path,
    }
}

/// Collapses empty, `.` and `..` segments. `..` stops at the root.
pub fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }
    format!("/{}", segments.join("/"))
}
