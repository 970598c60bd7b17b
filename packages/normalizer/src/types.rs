//! Core data types for the normalized corpus.

use serde::{Deserialize, Serialize};

use crate::config::lovdata_url;

/// Kinds of documents in the Lovdata archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Statute (lov).
    Law,

    /// Regulation issued under statutory authority (forskrift).
    Regulation,
}

impl DocumentKind {
    /// Get the string value used in JSON output.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Law => "law",
            Self::Regulation => "regulation",
        }
    }

    /// The id prefix used by this kind (`lov` / `forskrift`).
    #[must_use]
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Self::Law => "lov",
            Self::Regulation => "forskrift",
        }
    }

    /// Lovdata collection code (`NL` for statutes, `SF` for regulations).
    #[must_use]
    pub fn collection(&self) -> &'static str {
        match self {
            Self::Law => "NL",
            Self::Regulation => "SF",
        }
    }

    /// Derive the kind from a normalized document id.
    #[must_use]
    pub fn from_doc_id(id: &str) -> Option<Self> {
        if id.starts_with("lov-") {
            Some(Self::Law)
        } else if id.starts_with("forskrift-") {
            Some(Self::Regulation)
        } else {
            None
        }
    }

    /// Derive the kind from a dokid collection prefix.
    #[must_use]
    pub fn from_collection(code: &str) -> Option<Self> {
        match code {
            "NL" => Some(Self::Law),
            "SF" => Some(Self::Regulation),
            _ => None,
        }
    }

    /// Derive the kind from an archive path component.
    ///
    /// The public tarballs unpack into `nl/` (statutes) and `sf/`
    /// (regulations) subdirectories; some mirrors use spelled-out names.
    #[must_use]
    pub fn from_path_component(component: &str) -> Option<Self> {
        match component.to_lowercase().as_str() {
            "nl" | "lov" | "lover" | "laws" => Some(Self::Law),
            "sf" | "forskrift" | "forskrifter" | "regulations" => Some(Self::Regulation),
            _ => None,
        }
    }
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// A metadata value together with its provenance confidence.
///
/// Fields resolved from the expected markup location are authoritative;
/// fields resolved via a fallback heuristic are flagged `low_confidence` so
/// downstream consumers can tell the two apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sourced<T> {
    pub value: T,

    #[serde(default, skip_serializing_if = "is_false")]
    pub low_confidence: bool,
}

impl<T> Sourced<T> {
    /// A value from the primary (expected) markup location.
    #[must_use]
    pub fn primary(value: T) -> Self {
        Self {
            value,
            low_confidence: false,
        }
    }

    /// A value derived via a fallback heuristic.
    #[must_use]
    pub fn fallback(value: T) -> Self {
        Self {
            value,
            low_confidence: true,
        }
    }
}

/// Date stamps attached to a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDates {
    /// Date of issue, ISO format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued: Option<Sourced<String>>,

    /// Date the document entered into force, ISO format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective: Option<Sourced<String>>,

    /// Historical stamps carried verbatim from the source (legacy ids,
    /// amendment markers). Not normalized.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub historical: Vec<String>,
}

/// A node in the section hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Ordered list of labels from the root down to this section,
    /// e.g. `["Kapittel 2", "§ 5"]`. Labels are unique among siblings.
    pub path: Vec<String>,

    /// Descriptive heading, when the source provides one beyond the label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,

    /// Normalized body paragraphs, in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub body: Vec<String>,

    /// Child sections, in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Section>,
}

impl Section {
    /// Create a section with the given path.
    #[must_use]
    pub fn new(path: Vec<String>) -> Self {
        Self {
            path,
            heading: None,
            body: Vec::new(),
            children: Vec::new(),
        }
    }

    /// The section's own label (last path segment).
    #[must_use]
    pub fn label(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    /// Label and heading joined for display, e.g. `§ 1. Formål`.
    #[must_use]
    pub fn display_heading(&self) -> String {
        match &self.heading {
            Some(heading) => format!("{}. {}", self.label(), heading),
            None => self.label().to_string(),
        }
    }

    /// Visit this section and all descendants in document order.
    pub fn walk(&self, visit: &mut impl FnMut(&Section)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// The normalized, format-independent representation of one document.
///
/// All renderings derive from this; it is immutable once emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalDocument {
    /// Stable identifier, unique across the corpus, e.g. `lov-2006-05-19-16`.
    pub id: String,

    pub title: Sourced<String>,

    pub kind: Sourced<DocumentKind>,

    /// Ministries responsible for the document, in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issuing_authority: Vec<String>,

    #[serde(default)]
    pub dates: DocumentDates,

    /// Public lovdata.no URL for the document.
    pub official_url: String,

    /// Root sections in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<Section>,

    /// Non-fatal anomalies recorded during normalization, kept alongside
    /// the document for auditability.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl CanonicalDocument {
    /// Visit every section of the document in document order.
    pub fn walk_sections(&self, visit: &mut impl FnMut(&Section)) {
        for section in &self.sections {
            section.walk(visit);
        }
    }

    /// Ordered display headings of every section, used for cross-format
    /// equivalence checks.
    #[must_use]
    pub fn heading_outline(&self) -> Vec<String> {
        let mut outline = Vec::new();
        self.walk_sections(&mut |section| outline.push(section.display_heading()));
        outline
    }

    /// Concatenated normalized text (headings and paragraphs), used for
    /// substring search over the corpus.
    #[must_use]
    pub fn body_text(&self) -> String {
        let mut parts = vec![self.title.value.clone()];
        self.walk_sections(&mut |section| {
            parts.push(section.display_heading());
            parts.extend(section.body.iter().cloned());
        });
        parts.join("\n")
    }

    /// Names of metadata fields that were resolved via fallback heuristics.
    #[must_use]
    pub fn low_confidence_fields(&self) -> Vec<String> {
        let mut fields = Vec::new();
        if self.title.low_confidence {
            fields.push("title".to_string());
        }
        if self.kind.low_confidence {
            fields.push("kind".to_string());
        }
        if self.dates.issued.as_ref().is_some_and(|d| d.low_confidence) {
            fields.push("dates.issued".to_string());
        }
        if self
            .dates
            .effective
            .as_ref()
            .is_some_and(|d| d.low_confidence)
        {
            fields.push("dates.effective".to_string());
        }
        fields
    }

    /// Build the public URL for this document's id and kind.
    #[must_use]
    pub fn official_url_for(id: &str, kind: DocumentKind) -> String {
        lovdata_url(id, kind.collection())
    }
}
