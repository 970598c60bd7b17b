//! Byte-level repair of legacy encodings and entity escaping.
//!
//! Older archive eras ship ISO-8859-1 bytes and HTML entity names that a
//! strict XML parser rejects. Repairs happen before structural parsing so
//! the parser only ever sees well-formed UTF-8.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Entity-name pattern; numeric entities (`&#..;`) are valid XML and left alone.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ENTITY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&([a-zA-Z][a-zA-Z0-9]{0,31});").expect("valid regex"));

/// Decode raw bytes to a string.
///
/// Valid UTF-8 passes through; anything else is treated as ISO-8859-1, the
/// legacy archive encoding, where every byte maps to the same code point.
///
/// Returns the decoded text and whether the legacy fallback was used.
#[must_use]
pub fn decode(bytes: &[u8]) -> (String, bool) {
    match std::str::from_utf8(bytes) {
        Ok(text) => (text.to_string(), false),
        Err(_) => (bytes.iter().map(|&b| b as char).collect(), true),
    }
}

/// Replacement text for a named HTML entity, if it is one we know.
///
/// The five XML built-ins are kept as-is; everything listed here appears in
/// real archive files.
fn known_entity(name: &str) -> Option<&'static str> {
    Some(match name {
        "amp" | "lt" | "gt" | "apos" | "quot" => return None, // valid XML, keep
        "nbsp" => "\u{00a0}",
        "sect" => "§",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "hellip" => "\u{2026}",
        "laquo" => "«",
        "raquo" => "»",
        "rsquo" => "\u{2019}",
        "lsquo" => "\u{2018}",
        "aring" => "å",
        "Aring" => "Å",
        "aelig" => "æ",
        "AElig" => "Æ",
        "oslash" => "ø",
        "Oslash" => "Ø",
        "eacute" => "é",
        "egrave" => "è",
        "uuml" => "ü",
        "ouml" => "ö",
        "auml" => "ä",
        _ => return Some(""),
    })
}

/// Repair raw bytes into parseable UTF-8 text.
///
/// - decodes legacy ISO-8859-1 when the bytes are not valid UTF-8;
/// - normalizes line breaks to `\n`;
/// - applies Unicode NFC (legacy decoding can surface combining sequences);
/// - replaces known HTML entity names with their characters and escapes
///   unknown ones to `&amp;name;` so no content is lost.
///
/// Non-fatal anomalies are appended to `warnings`.
#[must_use]
pub fn repair(bytes: &[u8], warnings: &mut Vec<String>) -> String {
    let (text, used_legacy) = decode(bytes);
    if used_legacy {
        warnings.push("source is not valid UTF-8; decoded as ISO-8859-1".to_string());
    }

    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text: String = text.nfc().collect();

    let mut unknown: Vec<String> = Vec::new();
    let repaired = ENTITY_PATTERN.replace_all(&text, |caps: &regex::Captures<'_>| {
        let name = &caps[1];
        match known_entity(name) {
            None => caps[0].to_string(), // XML built-in
            Some("") => {
                unknown.push(name.to_string());
                format!("&amp;{name};")
            }
            Some(replacement) => replacement.to_string(),
        }
    });

    unknown.sort();
    unknown.dedup();
    for name in unknown {
        warnings.push(format!("unknown entity &{name}; escaped as literal text"));
    }

    repaired.into_owned()
}
