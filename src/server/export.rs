//! Write-through export of served responses.
//!
//! Exported files are never read back; the directory ends up holding a
//! static copy of every page that has been requested.

use std::fs;
use std::path::{Path, PathBuf};

use super::paths::url_to_output_path;

pub struct Exporter {
    dir: PathBuf,
}

impl Exporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write `body` to the export path for `url_path`.
    ///
    /// Failures are logged and otherwise ignored.
    pub fn write(&self, url_path: &str, body: &[u8]) {
        let output_path = url_to_output_path(url_path, &self.dir);
        match write_file(&output_path, body) {
            Ok(()) => tracing::debug!(path = %output_path.display(), "exported"),
            Err(e) => tracing::warn!(
                path = %output_path.display(),
                error = %e,
                "failed to export response"
            ),
        }
    }
}

fn write_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_documents_as_index_files() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path().join("build"));

        exporter.write("/guide/install", b"<html>install</html>");
        exporter.write("/", b"<html>home</html>");
        exporter.write("/gitdoc.css", b"body {}");

        let read = |p: &str| fs::read_to_string(dir.path().join("build").join(p)).unwrap();
        assert_eq!(read("guide/install/index.html"), "<html>install</html>");
        assert_eq!(read("index.html"), "<html>home</html>");
        assert_eq!(read("gitdoc.css"), "body {}");
    }

    #[test]
    fn test_failure_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();

        Exporter::new(&blocker).write("/page", b"x");

        assert!(blocker.is_file());
    }
}
