//! Configuration constants and validation functions for the normalizer.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{NormalizerError, Result};

/// Base URL for public Lovdata document pages.
pub const LOVDATA_BASE_URL: &str = "https://lovdata.no/dokument";

/// Text wrap width for Markdown output.
pub const TEXT_WRAP_WIDTH: usize = 100;

/// File name of the canonical JSON artifact inside a document directory.
pub const JSON_ARTIFACT: &str = "document.json";

/// File name of the HTML artifact inside a document directory.
pub const HTML_ARTIFACT: &str = "document.html";

/// File name of the Markdown artifact inside a document directory.
pub const MARKDOWN_ARTIFACT: &str = "document.md";

/// File name of the corpus-level index at the output root.
pub const INDEX_FILE: &str = "index.json";

/// Staging directory (under the output root) for uncommitted documents.
pub const STAGING_DIR: &str = ".staging";

/// Document id pattern: kind prefix, ISO date, sequence number.
///
/// Examples: `lov-2006-05-19-16`, `forskrift-2006-10-27-1196`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DOC_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(lov|forskrift)-\d{4}-\d{2}-\d{2}-\d+$").expect("valid regex")
});

/// Pattern extracting the date segment of a document id.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DOC_ID_DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:lov|forskrift)-(\d{4}-\d{2}-\d{2})-\d+$").expect("valid regex")
});

/// Validate a normalized document id.
///
/// # Examples
/// ```
/// use lovkorpus_normalizer::config::validate_doc_id;
///
/// assert!(validate_doc_id("lov-2006-05-19-16").is_ok());
/// assert!(validate_doc_id("forskrift-2006-10-27-1196").is_ok());
/// assert!(validate_doc_id("lov/2006-05-19-16").is_err());
/// ```
pub fn validate_doc_id(id: &str) -> Result<()> {
    if DOC_ID_PATTERN.is_match(id) {
        Ok(())
    } else {
        Err(NormalizerError::InvalidDocId(id.to_string()))
    }
}

/// Check whether a string is a well-formed document id.
#[must_use]
pub fn is_doc_id(candidate: &str) -> bool {
    DOC_ID_PATTERN.is_match(candidate)
}

/// Normalize a Lovdata `refid` into a document id.
///
/// A refid uses a slash between the kind and the rest
/// (`lov/2006-05-19-16`); the corpus id replaces it with a dash so ids are
/// safe as directory names. Returns `None` when the refid does not follow
/// the known convention.
///
/// # Examples
/// ```
/// use lovkorpus_normalizer::config::normalize_ref_id;
///
/// assert_eq!(
///     normalize_ref_id("lov/2006-05-19-16").as_deref(),
///     Some("lov-2006-05-19-16")
/// );
/// assert_eq!(normalize_ref_id("rundskriv/2006-1"), None);
/// ```
#[must_use]
pub fn normalize_ref_id(ref_id: &str) -> Option<String> {
    let candidate = ref_id.trim().replacen('/', "-", 1);
    is_doc_id(&candidate).then_some(candidate)
}

/// Strip the collection prefix (`NL/` or `SF/`) from a Lovdata `dokid`.
///
/// Returns the collection code and the remaining refid.
#[must_use]
pub fn split_dok_id(dok_id: &str) -> Option<(&str, &str)> {
    let dok_id = dok_id.trim();
    for prefix in ["NL", "SF"] {
        if let Some(rest) = dok_id.strip_prefix(prefix).and_then(|r| r.strip_prefix('/')) {
            return Some((prefix, rest));
        }
    }
    None
}

/// Extract the date segment (`YYYY-MM-DD`) from a document id.
#[must_use]
pub fn date_from_doc_id(id: &str) -> Option<String> {
    DOC_ID_DATE_PATTERN
        .captures(id)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Build the public lovdata.no URL for a document id.
///
/// # Arguments
/// * `id` - Normalized document id (should be validated with
///   [`validate_doc_id`] first)
/// * `collection` - Collection code (`NL` for statutes, `SF` for
///   regulations)
pub fn lovdata_url(id: &str, collection: &str) -> String {
    debug_assert!(
        is_doc_id(id),
        "id should be validated before calling lovdata_url"
    );
    let ref_id = id.replacen('-', "/", 1);
    format!("{LOVDATA_BASE_URL}/{collection}/{ref_id}")
}
