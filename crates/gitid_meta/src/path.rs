//! File path normalization shared by the normalizer and permalink builder.

/// Normalizes a file path to POSIX form for deterministic serialization.
///
/// Backslashes become forward slashes, one leading `./` is stripped,
/// duplicate slashes collapse, and trailing slashes are dropped. The
/// relative-vs-absolute nature of the path is preserved.
pub fn normalize_file_path(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }

    let mut normalized = path.replace('\\', "/");
    if let Some(rest) = normalized.strip_prefix("./") {
        normalized = rest.to_string();
    }
    while normalized.contains("//") {
        normalized = normalized.replace("//", "/");
    }
    normalized.trim_end_matches('/').to_string()
}
