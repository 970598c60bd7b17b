//! Plain Markdown rendering.

use std::fmt::Write;

use crate::config::TEXT_WRAP_WIDTH;
use crate::error::{NormalizerError, Result};
use crate::types::{CanonicalDocument, Section};

fn write_section(out: &mut String, section: &Section, depth: usize) -> std::fmt::Result {
    // ## for root sections, one deeper per level, capped at ######
    let hashes = "#".repeat((2 + depth).min(6));
    writeln!(out, "{hashes} {}", section.display_heading())?;
    writeln!(out)?;
    for paragraph in &section.body {
        writeln!(out, "{}", textwrap::fill(paragraph, TEXT_WRAP_WIDTH))?;
        writeln!(out)?;
    }
    for child in &section.children {
        write_section(out, child, depth + 1)?;
    }
    Ok(())
}

/// Render the document as Markdown, paragraphs wrapped at
/// [`TEXT_WRAP_WIDTH`] columns.
pub fn render(document: &CanonicalDocument) -> Result<String> {
    build(document).map_err(|err| NormalizerError::Render {
        id: document.id.clone(),
        format: "markdown",
        message: err.to_string(),
    })
}

fn build(document: &CanonicalDocument) -> std::result::Result<String, std::fmt::Error> {
    let mut out = String::new();

    writeln!(out, "# {}", document.title.value)?;
    writeln!(out)?;
    if !document.issuing_authority.is_empty() {
        writeln!(out, "{}", document.issuing_authority.join(", "))?;
        writeln!(out)?;
    }
    writeln!(out, "Kilde: {}", document.official_url)?;
    writeln!(out)?;
    for section in &document.sections {
        write_section(&mut out, section, 0)?;
    }

    Ok(out.trim_end().to_string() + "\n")
}
