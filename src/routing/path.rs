//! Path tokenization.
//!
//! # Responsibilities
//! - Split raw paths into non-empty segments
//! - Extract the path component of a request target
//! - Strip the configured root prefix

pub const SEPARATOR: char = '/';

/// Splits `path` into its non-empty segments.
///
/// Repeated, leading and trailing separators are ignored, so `"/"`, `""` and
/// `"//"` all yield nothing.
pub fn tokenize(path: &str) -> Vec<&str> {
    path.split(SEPARATOR).filter(|s| !s.is_empty()).collect()
}

/// Joins segments back into a separator-delimited string without a leading
/// separator.
pub fn join<S: AsRef<str>>(segments: &[S]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            out.push(SEPARATOR);
        }
        out.push_str(segment.as_ref());
    }
    out
}

/// Returns the path component of a request target, dropping any query or
/// fragment.
pub fn request_path(target: &str) -> &str {
    let end = target.find(['?', '#']).unwrap_or(target.len());
    &target[..end]
}

/// Removes `root` from the front of `path` when it matches case-insensitively
/// on a segment boundary.
pub fn strip_root<'a>(path: &'a str, root: &str) -> &'a str {
    let root = root.trim_end_matches(SEPARATOR);
    if root.is_empty() || path.len() < root.len() || !path.is_char_boundary(root.len()) {
        return path;
    }
    let (head, tail) = path.split_at(root.len());
    if head.eq_ignore_ascii_case(root) && (tail.is_empty() || tail.starts_with(SEPARATOR)) {
        tail
    } else {
        path
    }
}
