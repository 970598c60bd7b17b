//! Canonical JSON rendering.

use crate::error::{NormalizerError, Result};
use crate::types::CanonicalDocument;

/// Render the canonical JSON form: pretty-printed, trailing newline.
///
/// This is the lossless representation; the corpus reader deserializes it
/// back into a [`CanonicalDocument`]. Output is deterministic, so
/// re-rendering an unchanged document is byte-identical.
pub fn render(document: &CanonicalDocument) -> Result<String> {
    let mut out =
        serde_json::to_string_pretty(document).map_err(|err| NormalizerError::Render {
            id: document.id.clone(),
            format: "json",
            message: err.to_string(),
        })?;
    out.push('\n');
    Ok(out)
}
