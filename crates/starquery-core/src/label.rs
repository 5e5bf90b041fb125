//! Label and path conventions
//!
//! Index keys are root-relative, `/`-separated paths. Load statements refer
//! to files through labels (`//pkg:file.bzl`); these helpers convert between
//! the two without touching the filesystem.

/// Convert a module label to a root-relative file path.
///
/// - `//lib:utils.bzl` -> `lib/utils.bzl`
/// - `//pkg/sub:file.star` -> `pkg/sub/file.star`
/// - `//:utils.bzl` -> `utils.bzl`
/// - `@repo//lib:utils.bzl` -> `""`
///
/// An empty result means the label is external and cannot be resolved
/// locally; traversals stop there.
pub fn module_to_path(module: &str) -> String {
    if module.starts_with('@') {
        return String::new();
    }

    let rest = module.strip_prefix("//").unwrap_or(module);
    match rest.find(':') {
        Some(0) => rest[1..].to_string(),
        Some(i) => format!("{}/{}", &rest[..i], &rest[i + 1..]),
        None => rest.to_string(),
    }
}

/// Normalize a relative path: backslashes become `/`, `.` segments and
/// empty segments are dropped, and the leading `./` is removed.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
        .split('/')
        .filter(|seg| !seg.is_empty() && *seg != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Whether any directory component of a relative path starts with a dot
pub fn has_hidden_dir(path: &str) -> bool {
    let mut segments: Vec<&str> = path.split('/').collect();
    segments.pop();
    segments.iter().any(|seg| seg.starts_with('.') && *seg != ".")
}
