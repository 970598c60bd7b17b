//! Rendering of canonical documents into the three output formats.
//!
//! All formats walk the same section tree, so headings appear in the same
//! order everywhere. JSON is the lossless canonical form; HTML and Markdown
//! are derived conveniences.

mod html;
mod json;
mod markdown;

use clap::ValueEnum;

use crate::config::{HTML_ARTIFACT, JSON_ARTIFACT, MARKDOWN_ARTIFACT};
use crate::error::Result;
use crate::types::CanonicalDocument;

/// Output formats for a canonical document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Canonical lossless JSON.
    Json,
    /// Standalone HTML page.
    Html,
    /// Plain Markdown.
    Markdown,
}

impl Format {
    /// Get the string value of the format.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Html => "html",
            Self::Markdown => "markdown",
        }
    }

    /// Artifact file name inside a document directory.
    #[must_use]
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Json => JSON_ARTIFACT,
            Self::Html => HTML_ARTIFACT,
            Self::Markdown => MARKDOWN_ARTIFACT,
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render a document in one format.
///
/// # Errors
/// Returns a `Render` error naming the document and format on failure.
pub fn render(document: &CanonicalDocument, format: Format) -> Result<String> {
    match format {
        Format::Json => json::render(document),
        Format::Html => html::render(document),
        Format::Markdown => markdown::render(document),
    }
}

/// All renderings of one document.
///
/// JSON is mandatory; a failed HTML or Markdown rendering is recorded as a
/// warning and the remaining artifacts still commit.
#[derive(Debug, Clone)]
pub struct RenderedArtifacts {
    pub json: String,
    pub html: Option<String>,
    pub markdown: Option<String>,
    pub warnings: Vec<String>,
}

/// Render all three formats for a document.
///
/// # Errors
/// Fails only when the canonical JSON form cannot be produced.
pub fn render_all(document: &CanonicalDocument) -> Result<RenderedArtifacts> {
    let json = json::render(document)?;

    let mut warnings = Vec::new();
    let html = match html::render(document) {
        Ok(html) => Some(html),
        Err(err) => {
            warnings.push(format!("html rendering failed: {err}"));
            None
        }
    };
    let markdown = match markdown::render(document) {
        Ok(markdown) => Some(markdown),
        Err(err) => {
            warnings.push(format!("markdown rendering failed: {err}"));
            None
        }
    };

    Ok(RenderedArtifacts {
        json,
        html,
        markdown,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DocumentKind, Section, Sourced};

    pub(super) fn sample_document() -> CanonicalDocument {
        let mut chapter = Section::new(vec!["Kapittel 1".to_string()]);
        chapter.heading = Some("Alminnelige bestemmelser".to_string());
        let mut article = Section::new(vec!["Kapittel 1".to_string(), "§ 1".to_string()]);
        article.heading = Some("Formål".to_string());
        article.body.push("Lovens formål er å teste.".to_string());
        chapter.children.push(article);

        CanonicalDocument {
            id: "lov-2020-01-01-1".to_string(),
            title: Sourced::primary("Lov om testing".to_string()),
            kind: Sourced::primary(DocumentKind::Law),
            issuing_authority: vec!["Justisdepartementet".to_string()],
            dates: crate::types::DocumentDates::default(),
            official_url: "https://lovdata.no/dokument/NL/lov/2020-01-01-1".to_string(),
            sections: vec![chapter],
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_render_all_produces_all_formats() {
        let artifacts = render_all(&sample_document()).unwrap();
        assert!(artifacts.json.contains("lov-2020-01-01-1"));
        assert!(artifacts.html.is_some());
        assert!(artifacts.markdown.is_some());
        assert!(artifacts.warnings.is_empty());
    }

    #[test]
    fn test_heading_order_identical_across_formats() {
        let document = sample_document();
        let outline = document.heading_outline();

        let html = render(&document, Format::Html).unwrap();
        let markdown = render(&document, Format::Markdown).unwrap();

        let mut html_pos = 0;
        let mut md_pos = 0;
        for heading in &outline {
            let in_html = html[html_pos..].find(heading.as_str());
            let in_md = markdown[md_pos..].find(heading.as_str());
            assert!(in_html.is_some(), "heading {heading:?} missing from html");
            assert!(in_md.is_some(), "heading {heading:?} missing from markdown");
            // Move past the match so a repeated earlier heading cannot
            // satisfy a later position
            html_pos += in_html.unwrap_or(0) + heading.len();
            md_pos += in_md.unwrap_or(0) + heading.len();
        }
    }

    #[test]
    fn test_format_file_names() {
        assert_eq!(Format::Json.file_name(), "document.json");
        assert_eq!(Format::Html.file_name(), "document.html");
        assert_eq!(Format::Markdown.file_name(), "document.md");
    }
}
