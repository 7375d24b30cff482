//! Request resolution.
//!
//! Routes are tried in order. A route that finds no file for the path
//! passes, and the next one is tried; when every route has passed the
//! 404 page is served.

use std::fs;
use std::path::Path;

use axum::http::StatusCode;

use super::error::ServerError;
use super::export::Exporter;
use super::paths::{decode_request_path, existing_file};
use super::reply::Reply;
use crate::compile::style::StyleDialect;
use crate::compile::{Compiler, PageContext, Renderer, VERSION};
use crate::config::Settings;

const RESET_SCSS: &str = include_str!("../../assets/styles/reset.scss");
const DEFAULT_SCSS: &str = include_str!("../../assets/styles/default.scss");
const FAVICON: &[u8] = include_bytes!("../../assets/favicon.ico");

/// Template for the page body, looked up in the document root.
const CUSTOM_BODY_FILE: &str = "body.html";

/// Custom stylesheets appended to `/gitdoc.css`, in order.
const CUSTOM_STYLES: [(&str, StyleDialect); 2] = [
    ("styles.sass", StyleDialect::Sass),
    ("styles.scss", StyleDialect::Scss),
];

type Route = fn(&Site, &str) -> Result<Option<Reply>, ServerError>;

const ROUTES: &[(&str, Route)] = &[
    ("document", Site::document),
    ("html", Site::html),
    ("stylesheet", Site::stylesheet),
    ("coffeescript", Site::coffeescript),
    ("text", Site::text),
    ("file", Site::file),
    ("favicon", Site::favicon),
];

/// The document root, served.
pub struct Site {
    settings: Settings,
    compiler: Compiler,
    renderer: Renderer,
    exporter: Option<Exporter>,
}

impl Site {
    pub fn new(settings: Settings) -> Result<Self, ServerError> {
        let compiler = Compiler::new(&settings)?;
        Self::with_compiler(settings, compiler)
    }

    pub fn with_compiler(settings: Settings, compiler: Compiler) -> Result<Self, ServerError> {
        let exporter = settings
            .export
            .enabled
            .then(|| Exporter::new(settings.export_dir()));
        Ok(Self {
            renderer: Renderer::new()?,
            settings,
            compiler,
            exporter,
        })
    }

    /// Resolve a request and export the result when export is enabled.
    pub fn serve(&self, raw_path: &str) -> Result<Reply, ServerError> {
        let reply = self.respond(raw_path)?;
        if let Some(exporter) = &self.exporter
            && reply.status == StatusCode::OK
            && let Some(path) = decode_request_path(raw_path)
        {
            exporter.write(&path, &reply.body);
        }
        Ok(reply)
    }

    /// Resolve a raw (percent-encoded) request path to a reply.
    pub fn respond(&self, raw_path: &str) -> Result<Reply, ServerError> {
        let Some(path) = decode_request_path(raw_path) else {
            tracing::debug!(path = raw_path, "rejected request path");
            return self.not_found();
        };

        for (name, route) in ROUTES {
            if let Some(reply) = route(self, &path)? {
                tracing::debug!(route = name, path = %path, "matched");
                return Ok(reply);
            }
        }

        tracing::debug!(path = %path, "no route matched");
        self.not_found()
    }

    /// `/name` → `name.md`, `/dir/` → `dir/index.md`.
    fn document(&self, path: &str) -> Result<Option<Reply>, ServerError> {
        let name = if path.ends_with('/') {
            format!("{path}index")
        } else {
            path.to_string()
        };
        let Some(file) = existing_file(&self.settings.dir, &format!("{name}.md")) else {
            return Ok(None);
        };

        let source = read_text(&file)?;
        let doc = self.compiler.compile_document(&source, self.source_dir(&file))?;
        Ok(Some(Reply::html(self.page(doc)?)))
    }

    /// `/name` or `/name.html` → `name.html` through the HTML pipeline.
    fn html(&self, path: &str) -> Result<Option<Reply>, ServerError> {
        if path.ends_with('/') {
            return Ok(None);
        }
        let name = path.strip_suffix(".html").unwrap_or(path);
        let Some(file) = existing_file(&self.settings.dir, &format!("{name}.html")) else {
            return Ok(None);
        };

        let source = read_text(&file)?;
        let html = self.compiler.compile_html(&source, self.source_dir(&file))?;
        Ok(Some(Reply::html(html)))
    }

    fn stylesheet(&self, path: &str) -> Result<Option<Reply>, ServerError> {
        if path != "/gitdoc.css" {
            return Ok(None);
        }
        let dir = &self.settings.dir;

        let mut css = self
            .compiler
            .compile_stylesheet(RESET_SCSS, StyleDialect::Scss, dir)?;
        push_section(&mut css, &self.compiler.highlight_css());
        if self.settings.default_styles {
            let default = self
                .compiler
                .compile_stylesheet(DEFAULT_SCSS, StyleDialect::Scss, dir)?;
            push_section(&mut css, &default);
        }
        for (name, dialect) in CUSTOM_STYLES {
            if let Some(file) = existing_file(dir, name) {
                let source = read_text(&file)?;
                let custom = self.compiler.compile_stylesheet(&source, dialect, dir)?;
                push_section(&mut css, &custom);
            }
        }

        Ok(Some(Reply::css(css)))
    }

    /// `/name.coffee.js` → `name.coffee` compiled.
    fn coffeescript(&self, path: &str) -> Result<Option<Reply>, ServerError> {
        let Some(source_path) = path
            .strip_suffix(".js")
            .filter(|name| name.ends_with(".coffee"))
        else {
            return Ok(None);
        };
        let Some(file) = existing_file(&self.settings.dir, source_path) else {
            return Ok(None);
        };

        let source = read_text(&file)?;
        Ok(Some(Reply::javascript(self.compiler.compile_coffee(&source)?)))
    }

    fn text(&self, path: &str) -> Result<Option<Reply>, ServerError> {
        if !path.ends_with(".txt") {
            return Ok(None);
        }
        let Some(file) = existing_file(&self.settings.dir, path) else {
            return Ok(None);
        };
        Ok(Some(Reply::text(read_bytes(&file)?)))
    }

    /// Any other file with an extension, sent verbatim.
    fn file(&self, path: &str) -> Result<Option<Reply>, ServerError> {
        if !path.contains('.') {
            return Ok(None);
        }
        let Some(file) = existing_file(&self.settings.dir, path) else {
            return Ok(None);
        };
        let mime = mime_guess::from_path(&file).first_or_octet_stream();
        Ok(Some(Reply::new(mime.to_string(), read_bytes(&file)?)))
    }

    /// Built-in icon, used when the document root has none.
    fn favicon(&self, path: &str) -> Result<Option<Reply>, ServerError> {
        if path != "/favicon.ico" {
            return Ok(None);
        }
        Ok(Some(Reply::new("image/x-icon", FAVICON)))
    }

    fn not_found(&self) -> Result<Reply, ServerError> {
        let source = format!("# Not Found\n\nGitDoc version {VERSION}");
        let doc = self.compiler.compile_document(&source, &self.settings.dir)?;
        Ok(Reply::html(self.page(doc)?).with_status(StatusCode::NOT_FOUND))
    }

    fn page(&self, doc: String) -> Result<String, ServerError> {
        let custom_body = existing_file(&self.settings.dir, CUSTOM_BODY_FILE)
            .map(|file| read_text(&file))
            .transpose()?;
        let context = PageContext {
            title: self.settings.title.clone(),
            header: self.settings.header.clone(),
            doc,
        };
        Ok(self.renderer.render_page(&context, custom_body.as_deref())?)
    }

    fn source_dir<'a>(&'a self, file: &'a Path) -> &'a Path {
        file.parent().unwrap_or(&self.settings.dir)
    }
}

fn push_section(css: &mut String, section: &str) {
    if section.is_empty() {
        return;
    }
    if !css.is_empty() && !css.ends_with('\n') {
        css.push('\n');
    }
    css.push_str(section);
}

fn read_text(path: &Path) -> Result<String, ServerError> {
    fs::read_to_string(path).map_err(|source| ServerError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, ServerError> {
    fs::read(path).map_err(|source| ServerError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HighlighterKind;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn settings(dir: &TempDir) -> Settings {
        let mut settings = Settings::for_dir(dir.path());
        settings.tools.highlighter = HighlighterKind::Plain;
        settings
    }

    fn site(dir: &TempDir) -> Site {
        Site::new(settings(dir)).unwrap()
    }

    fn write(dir: &TempDir, name: &str, contents: impl AsRef<[u8]>) {
        let path = dir.path().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn body(reply: &Reply) -> String {
        String::from_utf8(reply.body.clone()).unwrap()
    }

    #[test]
    fn test_markdown_document() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "about.md", "# About\n\n```ruby\nputs 1\n```\n");

        let reply = site(&dir).respond("/about").unwrap();

        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.content_type, "text/html; charset=utf-8");
        let html = body(&reply);
        assert!(html.contains("<title>Documents</title>"));
        assert!(html.contains("<h1>About</h1>"));
        assert!(html.contains("<pre><code class=\"language-ruby\">puts 1</code></pre>"));
    }

    #[test]
    fn test_markdown_wins_over_html() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "about.md", "# From markdown\n");
        write(&dir, "about.html", "<h1>From html</h1>\n");

        let html = body(&site(&dir).respond("/about").unwrap());

        assert!(html.contains("From markdown"));
    }

    #[test]
    fn test_html_document_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "about.html", "<html><body>raw page</body></html>\n");

        let site = site(&dir);
        let reply = site.respond("/about").unwrap();

        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(body(&reply), "<html><body>raw page</body></html>\n");
        assert_eq!(site.respond("/about.html").unwrap(), reply);
    }

    #[test]
    fn test_html_style_tags_are_compiled() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "page.html", "<style type=\"text/scss\">\na { b { c: d; } }\n</style>\n");

        let html = body(&site(&dir).respond("/page").unwrap());

        assert!(html.starts_with("<style type='text/css'>\n"));
        assert!(html.contains("a b {"));
    }

    #[test]
    fn test_index_documents() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "index.md", "# Home\n");
        write(&dir, "guide/index.md", "# Guide\n");

        let site = site(&dir);

        assert!(body(&site.respond("/").unwrap()).contains("<h1>Home</h1>"));
        assert!(body(&site.respond("/guide/").unwrap()).contains("<h1>Guide</h1>"));
    }

    #[test]
    fn test_not_found_page() {
        let dir = tempfile::tempdir().unwrap();

        let reply = site(&dir).respond("/does-not-exist").unwrap();

        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        let html = body(&reply);
        assert!(html.contains("<h1>Not Found</h1>"));
        assert!(html.contains(&format!("GitDoc version {VERSION}")));
    }

    #[test]
    fn test_parent_segments_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "inner/secret.txt", "hidden");

        let reply = site(&dir).respond("/inner/../inner/secret.txt").unwrap();

        assert_eq!(reply.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_directories_never_match() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("notes.txt")).unwrap();

        assert_eq!(site(&dir).respond("/notes.txt").unwrap().status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_static_file_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let png = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0xff];
        write(&dir, "logo.png", png);

        let reply = site(&dir).respond("/logo.png").unwrap();

        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.content_type, "image/png");
        assert_eq!(reply.body, png.to_vec());
    }

    #[test]
    fn test_text_file() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "notes.txt", "# not markdown\n");

        let reply = site(&dir).respond("/notes.txt").unwrap();

        assert_eq!(reply.content_type, "text/plain; charset=utf-8");
        assert_eq!(body(&reply), "# not markdown\n");
    }

    #[test]
    fn test_percent_encoded_path() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "release notes.md", "# Notes\n");

        let reply = site(&dir).respond("/release%20notes").unwrap();

        assert!(body(&reply).contains("<h1>Notes</h1>"));
    }

    #[test]
    fn test_builtin_favicon() {
        let dir = tempfile::tempdir().unwrap();

        let reply = site(&dir).respond("/favicon.ico").unwrap();

        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.content_type, "image/x-icon");
        assert_eq!(reply.body, FAVICON.to_vec());
    }

    #[test]
    fn test_directory_favicon_wins() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "favicon.ico", b"custom icon");

        let reply = site(&dir).respond("/favicon.ico").unwrap();

        assert_eq!(reply.body, b"custom icon".to_vec());
    }

    #[test]
    fn test_stylesheet() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "styles.scss", ".custom { a { color: red; } }\n");

        let reply = site(&dir).respond("/gitdoc.css").unwrap();

        assert_eq!(reply.content_type, "text/css; charset=utf-8");
        let css = body(&reply);
        assert!(css.contains("border-collapse: collapse;"));
        assert!(css.contains("#doc"));
        assert!(css.contains(".custom a"));
        assert!(!css.contains('$'));
    }

    #[test]
    fn test_stylesheet_without_default_styles() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "styles.sass", ".custom\n  color: blue\n");
        let mut settings = settings(&dir);
        settings.default_styles = false;

        let css = body(&Site::new(settings).unwrap().respond("/gitdoc.css").unwrap());

        assert!(!css.contains("#doc"));
        assert!(css.contains("color: blue;"));
    }

    #[test]
    fn test_custom_body_and_header() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "body.html", "<main class=\"mine\">{{ doc | safe }}</main>");
        write(&dir, "index.md", "# Home\n");
        let mut settings = settings(&dir);
        settings.title = "Handbook".to_string();
        settings.header = Some("<script src=\"/extra.js\"></script>".to_string());

        let html = body(&Site::new(settings).unwrap().respond("/").unwrap());

        assert!(html.contains("<title>Handbook</title>"));
        assert!(html.contains("<script src=\"/extra.js\"></script>"));
        assert!(html.contains("<main class=\"mine\"><h1>Home</h1>"));
        assert!(!html.contains("<div id=\"doc\">"));
    }

    #[test]
    fn test_style_compile_failure_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "broken.md", "<style>\na { color: \n</style>\n");

        assert!(site(&dir).respond("/broken").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_coffeescript_route() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        write(&dir, "app.coffee", "alert 'hi'\n");
        let fake = dir.path().join("fake-coffee");
        fs::write(&fake, "#!/bin/sh\necho '// compiled'\n").unwrap();
        fs::set_permissions(&fake, fs::Permissions::from_mode(0o755)).unwrap();
        let mut settings = settings(&dir);
        settings.tools.coffee = fake.to_string_lossy().into_owned();

        let reply = Site::new(settings).unwrap().respond("/app.coffee.js").unwrap();

        assert_eq!(reply.content_type, "application/javascript; charset=utf-8");
        assert_eq!(body(&reply), "// compiled\n");
    }

    #[test]
    fn test_export_writes_successful_responses() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "guide.md", "# Guide\n");
        let mut settings = settings(&dir);
        settings.export.enabled = true;
        let site = Site::new(settings).unwrap();

        let reply = site.serve("/guide").unwrap();
        site.serve("/missing").unwrap();

        let exported = dir.path().join("build/guide/index.html");
        assert_eq!(fs::read(exported).unwrap(), reply.body);
        assert!(!dir.path().join("build/missing").exists());
    }

    #[test]
    fn test_export_disabled_by_default() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "guide.md", "# Guide\n");

        site(&dir).serve("/guide").unwrap();

        assert!(!dir.path().join("build").exists());
    }
}
