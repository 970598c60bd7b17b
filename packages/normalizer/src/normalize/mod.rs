//! XML normalization: raw archive bytes to header fields and a block list.
//!
//! The normalizer repairs the bytes (encoding, entities), parses the tree,
//! collects the `<dd class="…">` header metadata, and walks the content with
//! a registry of element handlers to produce an ordered list of heading and
//! paragraph blocks. Only documents that cannot be parsed into any tree at
//! all fail.

pub mod encoding;
mod engine;
mod handlers;
mod registry;

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use roxmltree::{Document, Node, ParsingOptions};

use crate::archive::RawDocument;
use crate::error::{NormalizerError, Result};

pub use engine::ExtractEngine;
pub use handlers::create_block_registry;
pub use registry::{BlockHandler, BlockRegistry, Emit, NormalizeContext, RecurseFn};

/// A flat content unit extracted from the markup, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A structural heading opening a section at the given level (1-based).
    Heading {
        level: u8,
        label: String,
        title: Option<String>,
    },
    /// A body paragraph.
    Paragraph(String),
    /// Flattened text of markup the extractor did not recognize.
    Preserved(String),
}

/// Header metadata collected from the document's definition list.
///
/// Lovdata files carry their metadata as `<dd class="refid">…</dd>` entries;
/// ministries are an embedded `<li>` list. The first `<h1>` is kept as a
/// title fallback.
#[derive(Debug, Clone, Default)]
pub struct HeaderFields {
    fields: HashMap<String, String>,
    ministries: Vec<String>,
    h1: Option<String>,
}

impl HeaderFields {
    /// Collect header fields from a parsed document.
    #[must_use]
    pub fn collect(doc: &Document<'_>) -> Self {
        let mut fields = HashMap::new();
        let mut ministries = Vec::new();
        let mut h1 = None;

        for node in doc.descendants().filter(Node::is_element) {
            match node.tag_name().name() {
                "dd" => {
                    let Some(class) = node.attribute("class") else {
                        continue;
                    };
                    if class == "ministry" {
                        for item in node
                            .descendants()
                            .filter(|n| n.is_element() && n.tag_name().name() == "li")
                        {
                            let name = collapse_ws(&deep_text(item));
                            if !name.is_empty() {
                                ministries.push(name);
                            }
                        }
                        if ministries.is_empty() {
                            let name = collapse_ws(&deep_text(node));
                            if !name.is_empty() {
                                ministries.push(name);
                            }
                        }
                    } else {
                        let value = collapse_ws(&deep_text(node));
                        if !value.is_empty() {
                            // First occurrence wins
                            fields.entry(class.to_string()).or_insert(value);
                        }
                    }
                }
                "h1" if h1.is_none() => {
                    let text = collapse_ws(&deep_text(node));
                    if !text.is_empty() {
                        h1 = Some(text);
                    }
                }
                _ => {}
            }
        }

        Self {
            fields,
            ministries,
            h1,
        }
    }

    /// Value of a header field by its class name.
    #[must_use]
    pub fn get(&self, class: &str) -> Option<&str> {
        self.fields.get(class).map(String::as_str)
    }

    /// Ministry names in document order.
    #[must_use]
    pub fn ministries(&self) -> &[String] {
        &self.ministries
    }

    /// Text of the first `<h1>`, if any.
    #[must_use]
    pub fn h1(&self) -> Option<&str> {
        self.h1.as_deref()
    }
}

/// Output of the normalization stage for one document.
#[derive(Debug, Clone)]
pub struct NormalizedDocument {
    pub header: HeaderFields,
    pub blocks: Vec<Block>,
    pub warnings: Vec<String>,
}

/// Normalize one raw archive file.
///
/// # Errors
/// Returns `MalformedSource` when the repaired text still cannot be parsed
/// into an XML tree.
pub fn normalize(raw: &RawDocument) -> Result<NormalizedDocument> {
    let mut warnings = Vec::new();
    let text = encoding::repair(&raw.bytes, &mut warnings);

    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(&text, options).map_err(|source| {
        NormalizerError::MalformedSource {
            path: raw.path.clone(),
            source,
        }
    })?;

    let header = HeaderFields::collect(&doc);

    let engine = ExtractEngine::new(create_block_registry());
    let mut context = NormalizeContext::new();
    let blocks = engine.extract_children(content_root(&doc), &mut context);
    warnings.extend(context.warnings);

    Ok(NormalizedDocument {
        header,
        blocks,
        warnings,
    })
}

/// The node whose children hold the document content.
///
/// Prefers `<main>` when present (the header `<dl>` lives outside it);
/// otherwise the root element.
fn content_root<'a, 'input>(doc: &'a Document<'input>) -> Node<'a, 'input> {
    doc.descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "main")
        .unwrap_or_else(|| doc.root_element())
}

/// Collapse runs of whitespace (including newlines) to single spaces.
#[must_use]
pub fn collapse_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Concatenated text of all descendant text nodes, in document order.
#[must_use]
pub fn deep_text(node: Node<'_, '_>) -> String {
    let mut out = String::new();
    for descendant in node.descendants().filter(Node::is_text) {
        if let Some(text) = descendant.text() {
            out.push_str(text);
        }
    }
    out
}

/// Heading label/title split on the first sentence period.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static HEADING_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.{1,40}?)\.\s+(\S.*)$").expect("valid regex"));

/// Split a heading like `Kapittel 2. Tittel` into label and title.
///
/// Headings without a period (`§ 5`) are all label.
#[must_use]
pub fn split_heading(text: &str) -> (String, Option<String>) {
    if let Some(caps) = HEADING_SPLIT.captures(text) {
        (caps[1].to_string(), Some(caps[2].to_string()))
    } else {
        (text.to_string(), None)
    }
}
