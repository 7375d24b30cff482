//! Request path and file path conversion.
//!
//! This module handles conversions between:
//! - Raw request paths (percent-encoded, as they arrive)
//! - Files under the document root that a request may name
//! - Export paths (where a response is written in the export directory)

use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

/// Percent-decode a request path.
///
/// Returns `None` for paths that can never name a file: not absolute, not
/// UTF-8 after decoding, or containing a `..` segment.
pub fn decode_request_path(raw: &str) -> Option<String> {
    let decoded = percent_decode_str(raw).decode_utf8().ok()?;
    if !decoded.starts_with('/') || decoded.contains('\0') {
        return None;
    }
    if decoded.split(['/', '\\']).any(|segment| segment == "..") {
        return None;
    }
    Some(decoded.into_owned())
}

/// The regular file `relative` names under `root`, if there is one.
///
/// Directories never match.
pub fn existing_file(root: &Path, relative: &str) -> Option<PathBuf> {
    let path = root.join(relative.trim_start_matches('/'));
    path.is_file().then_some(path)
}

/// Convert a request path to an export file path.
///
/// Documents (no extension) become `path/index.html`.
/// Files (with extension) keep their path.
///
/// # Examples
/// ```ignore
/// url_to_output_path("/guide/install", output_dir) => output_dir/guide/install/index.html
/// url_to_output_path("/", output_dir) => output_dir/index.html
/// url_to_output_path("/gitdoc.css", output_dir) => output_dir/gitdoc.css
/// ```
pub fn url_to_output_path(url_path: &str, output_dir: &Path) -> PathBuf {
    let url_path = url_path.trim_matches('/');
    let last_segment = url_path.rsplit('/').next().unwrap_or_default();

    if url_path.is_empty() {
        output_dir.join("index.html")
    } else if last_segment.contains('.') {
        output_dir.join(url_path)
    } else {
        output_dir.join(url_path).join("index.html")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_decode_plain_path() {
        assert_eq!(decode_request_path("/guide/install"), Some("/guide/install".to_string()));
    }

    #[test]
    fn test_decode_percent_escapes() {
        assert_eq!(
            decode_request_path("/release%20notes.md"),
            Some("/release notes.md".to_string())
        );
    }

    #[test]
    fn test_reject_parent_segments() {
        assert_eq!(decode_request_path("/../secret"), None);
        assert_eq!(decode_request_path("/a/%2e%2e/b"), None);
        assert_eq!(decode_request_path("/a/..%5cb"), None);
    }

    #[test]
    fn test_dots_inside_names_are_fine() {
        assert_eq!(decode_request_path("/v1..2.txt"), Some("/v1..2.txt".to_string()));
    }

    #[test]
    fn test_reject_invalid_utf8() {
        assert_eq!(decode_request_path("/%ff"), None);
    }

    #[test]
    fn test_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("about.md"), "# About").unwrap();
        fs::create_dir(dir.path().join("guide.md")).unwrap();

        assert_eq!(
            existing_file(dir.path(), "/about.md"),
            Some(dir.path().join("about.md"))
        );
        assert_eq!(existing_file(dir.path(), "/guide.md"), None);
        assert_eq!(existing_file(dir.path(), "/missing.md"), None);
    }

    #[test]
    fn test_existing_file_stays_under_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("etc"), "inside").unwrap();

        assert_eq!(existing_file(dir.path(), "//etc"), Some(dir.path().join("etc")));
    }

    #[test]
    fn test_url_to_output_path_root() {
        let output = Path::new("/output");
        assert_eq!(url_to_output_path("/", output), PathBuf::from("/output/index.html"));
    }

    #[test]
    fn test_url_to_output_path_document() {
        let output = Path::new("/output");
        assert_eq!(
            url_to_output_path("/guide/install", output),
            PathBuf::from("/output/guide/install/index.html")
        );
        assert_eq!(
            url_to_output_path("/guide/", output),
            PathBuf::from("/output/guide/index.html")
        );
    }

    #[test]
    fn test_url_to_output_path_file() {
        let output = Path::new("/output");
        assert_eq!(
            url_to_output_path("/gitdoc.css", output),
            PathBuf::from("/output/gitdoc.css")
        );
        assert_eq!(
            url_to_output_path("/v1.2/notes", output),
            PathBuf::from("/output/v1.2/notes/index.html")
        );
    }
}
