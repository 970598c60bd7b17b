//! Standalone HTML rendering.

use std::fmt::Write;

use crate::error::{NormalizerError, Result};
use crate::types::{CanonicalDocument, Section};

/// Escape text for HTML element and attribute content.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

fn write_section(out: &mut String, section: &Section, depth: usize) -> std::fmt::Result {
    // h2 for root sections, one deeper per level, capped at h6
    let tag_level = (2 + depth).min(6);
    writeln!(
        out,
        "<h{tag_level}>{}</h{tag_level}>",
        escape(&section.display_heading())
    )?;
    for paragraph in &section.body {
        writeln!(out, "<p>{}</p>", escape(paragraph))?;
    }
    for child in &section.children {
        write_section(out, child, depth + 1)?;
    }
    Ok(())
}

/// Render a standalone HTML page for the document.
///
/// Shape follows the Lovdata-era convention: `lang="no"`, inline style,
/// `<h1>` title, section headings stepping down from `<h2>`.
pub fn render(document: &CanonicalDocument) -> Result<String> {
    build(document).map_err(|err| NormalizerError::Render {
        id: document.id.clone(),
        format: "html",
        message: err.to_string(),
    })
}

fn build(document: &CanonicalDocument) -> std::result::Result<String, std::fmt::Error> {
    let title = escape(&document.title.value);
    let mut out = String::new();

    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html lang=\"no\">")?;
    writeln!(out, "<head>")?;
    writeln!(out, "<meta charset=\"utf-8\">")?;
    writeln!(out, "<title>{title}</title>")?;
    writeln!(
        out,
        "<style>body {{ font-family: serif; max-width: 42em; margin: 2em auto; padding: 0 1em; line-height: 1.5; }}</style>"
    )?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;
    writeln!(out, "<h1>{title}</h1>")?;
    if !document.issuing_authority.is_empty() {
        writeln!(
            out,
            "<p class=\"ministry\">{}</p>",
            escape(&document.issuing_authority.join(", "))
        )?;
    }
    writeln!(
        out,
        "<p class=\"source\"><a href=\"{}\">{}</a></p>",
        escape(&document.official_url),
        escape(&document.official_url)
    )?;
    for section in &document.sections {
        write_section(&mut out, section, 0)?;
    }
    writeln!(out, "</body>")?;
    writeln!(out, "</html>")?;

    Ok(out)
}
