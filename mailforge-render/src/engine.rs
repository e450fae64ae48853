//! Tera rendering engine over the emails directory.
//!
//! One template file per email; the template name is the file stem
//! (`emails/welcome.html` → `welcome`). Templates receive two context
//! values: `locale` (the locale code) and `t` (that locale's string table).

use std::path::{Path, PathBuf};

use tera::{Context, Tera};

use crate::error::{io_err, RenderError};
use crate::i18n::LocaleCatalog;

/// Template file extensions the loader accepts.
const TEMPLATE_EXTENSIONS: &[&str] = &["html", "tera"];

/// Output of a single `(template, locale)` render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub html: String,
    /// Text of the rendered `<title>` element; empty if absent.
    pub title: String,
}

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn collect_template_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), RenderError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let meta = entry.metadata().map_err(|e| io_err(&path, e))?;
        if meta.is_dir() {
            collect_template_files(&path, out)?;
        } else if meta.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

fn is_template(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| TEMPLATE_EXTENSIONS.contains(&ext))
}

fn template_name(path: &Path) -> Option<String> {
    path.file_stem().and_then(|s| s.to_str()).map(str::to_owned)
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Tera-based renderer over one emails directory.
pub struct Renderer {
    tera: Tera,
    names: Vec<String>,
}

impl Renderer {
    /// Load every template under `emails_dir`.
    ///
    /// Files with extensions other than `.html`/`.tera` are ignored.
    pub fn from_dir(emails_dir: &Path) -> Result<Self, RenderError> {
        let mut files = Vec::new();
        collect_template_files(emails_dir, &mut files)?;

        let mut templates = Vec::new();
        let mut names = Vec::new();
        for path in files {
            if !is_template(&path) {
                continue;
            }
            let Some(name) = template_name(&path) else {
                continue;
            };
            let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
            templates.push((name.clone(), contents));
            names.push(name);
        }
        names.sort();

        let mut tera = Tera::default();
        tera.add_raw_templates(templates)?;
        Ok(Self { tera, names })
    }

    /// Template names in a stable order.
    pub fn template_names(&self) -> &[String] {
        &self.names
    }

    /// Render one template for one locale.
    pub fn render(
        &self,
        template: &str,
        locale: &str,
        catalog: &LocaleCatalog,
    ) -> Result<RenderedEmail, RenderError> {
        if !self.names.iter().any(|n| n == template) {
            return Err(RenderError::UnknownTemplate {
                name: template.to_string(),
            });
        }
        let strings = catalog.strings(locale)?;

        let mut ctx = Context::new();
        ctx.insert("locale", locale);
        ctx.insert("t", strings);

        let html = self.tera.render(template, &ctx)?;
        let title = extract_title(&html).unwrap_or_default();
        Ok(RenderedEmail { html, title })
    }
}

// ---------------------------------------------------------------------------
// Title extraction
// ---------------------------------------------------------------------------

/// Text content of the first `<title>` element, trimmed.
///
/// A full HTML parser is overkill for this one query; an ASCII
/// case-insensitive scan that tolerates attributes covers every template
/// we render.
pub fn extract_title(html: &str) -> Option<String> {
    let bytes = html.as_bytes();
    let open = find_ascii_ci(bytes, b"<title", 0)?;
    let gt = open + bytes[open..].iter().position(|&b| b == b'>')?;
    let start = gt + 1;
    let end = find_ascii_ci(bytes, b"</title", start)?;
    Some(html[start..end].trim().to_string())
}

fn find_ascii_ci(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
        .map(|i| i + from)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    fn catalog() -> LocaleCatalog {
        let mut locales = BTreeMap::new();
        locales.insert(
            "en".to_string(),
            json!({"title": "Welcome!", "body": "Glad you're here."}),
        );
        locales.insert(
            "de".to_string(),
            json!({"title": "Willkommen!", "body": "Schön, dass du da bist."}),
        );
        LocaleCatalog::from_map(locales)
    }

    fn write_template(dir: &Path, name: &str, body: &str) {
        std::fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn renders_locale_strings_and_extracts_title() {
        let tmp = TempDir::new().unwrap();
        write_template(
            tmp.path(),
            "welcome.html",
            "<html><head><title>{{ t.title }}</title></head>\
             <body><p>{{ t.body }} ({{ locale }})</p></body></html>",
        );

        let renderer = Renderer::from_dir(tmp.path()).expect("load");
        assert_eq!(renderer.template_names(), ["welcome"]);

        let en = renderer.render("welcome", "en", &catalog()).expect("render en");
        assert_eq!(en.title, "Welcome!");
        assert!(en.html.contains("Glad you're here. (en)"));

        let de = renderer.render("welcome", "de", &catalog()).expect("render de");
        assert_eq!(de.title, "Willkommen!");
        assert!(de.html.contains("(de)"));
    }

    #[test]
    fn non_template_files_are_ignored() {
        let tmp = TempDir::new().unwrap();
        write_template(tmp.path(), "welcome.html", "<p>hi</p>");
        write_template(tmp.path(), "notes.txt", "not a template");
        write_template(tmp.path(), "README.md", "docs");

        let renderer = Renderer::from_dir(tmp.path()).expect("load");
        assert_eq!(renderer.template_names(), ["welcome"]);
    }

    #[test]
    fn unknown_template_is_a_typed_error() {
        let tmp = TempDir::new().unwrap();
        let renderer = Renderer::from_dir(tmp.path()).expect("load");
        let err = renderer.render("ghost", "en", &catalog()).unwrap_err();
        assert!(matches!(err, RenderError::UnknownTemplate { .. }), "got: {err}");
    }

    #[test]
    fn unknown_locale_propagates_from_catalog() {
        let tmp = TempDir::new().unwrap();
        write_template(tmp.path(), "welcome.html", "<p>hi</p>");
        let renderer = Renderer::from_dir(tmp.path()).expect("load");
        let err = renderer.render("welcome", "fr", &catalog()).unwrap_err();
        assert!(matches!(err, RenderError::UnknownLocale { .. }), "got: {err}");
    }

    #[test]
    fn missing_context_key_is_a_render_error() {
        let tmp = TempDir::new().unwrap();
        write_template(tmp.path(), "welcome.html", "{{ t.no_such_key }}");
        let renderer = Renderer::from_dir(tmp.path()).expect("load");
        let err = renderer.render("welcome", "en", &catalog()).unwrap_err();
        assert!(matches!(err, RenderError::Tera(_)), "got: {err}");
    }

    #[test]
    fn extract_title_handles_attributes_and_case() {
        assert_eq!(
            extract_title("<TITLE data-x=\"1\">  Hello  </TITLE>"),
            Some("Hello".to_string())
        );
        assert_eq!(extract_title("<title></title>"), Some(String::new()));
        assert_eq!(extract_title("<body>no title</body>"), None);
        assert_eq!(
            extract_title("<title>first</title><title>second</title>"),
            Some("first".to_string())
        );
        // Non-ASCII content before the element must not skew offsets.
        assert_eq!(
            extract_title("<!-- Grüße --><title>Servus</title>"),
            Some("Servus".to_string())
        );
    }
}
