//! Metadata extraction with ordered fallback chains.
//!
//! Every field resolves independently: the primary markup location first,
//! then documented fallbacks. Fallback-resolved values are flagged
//! `low_confidence` and leave a warning, so the corpus records how each
//! value was obtained. Only a document with no derivable id fails.

use std::path::Path;

use chrono::NaiveDate;

use crate::archive;
use crate::config::{date_from_doc_id, is_doc_id, normalize_ref_id, split_dok_id};
use crate::error::{NormalizerError, Result};
use crate::normalize::HeaderFields;
use crate::types::{DocumentDates, DocumentKind, Sourced};

/// Date formats accepted for `dateInForce`, tried in order.
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d.%m.%Y"];

/// Resolved document metadata, before the section tree is attached.
#[derive(Debug, Clone)]
pub struct DocumentMeta {
    pub id: String,
    pub title: Sourced<String>,
    pub kind: Sourced<DocumentKind>,
    pub issuing_authority: Vec<String>,
    pub dates: DocumentDates,
}

/// Resolve all metadata fields for one document.
///
/// # Arguments
/// * `path` - Provenance path of the source file (used for fallbacks)
/// * `header` - Header fields collected during normalization
/// * `warnings` - Sink for fallback and anomaly warnings
///
/// # Errors
/// Returns `MissingMetadata` when no id can be derived at all.
pub fn extract(
    path: &Path,
    header: &HeaderFields,
    warnings: &mut Vec<String>,
) -> Result<DocumentMeta> {
    let id = resolve_id(path, header, warnings)?;
    let kind = resolve_kind(&id, header, path, warnings);
    let title = resolve_title(header, &id, warnings);
    let dates = resolve_dates(header, &id, warnings);

    Ok(DocumentMeta {
        id,
        title,
        kind,
        issuing_authority: header.ministries().to_vec(),
        dates,
    })
}

/// Id chain: `refid` → `dokid` without collection prefix → file name stem.
fn resolve_id(path: &Path, header: &HeaderFields, warnings: &mut Vec<String>) -> Result<String> {
    if let Some(ref_id) = header.get("refid") {
        if let Some(id) = normalize_ref_id(ref_id) {
            return Ok(id);
        }
        warnings.push(format!("refid {ref_id:?} does not follow the id convention"));
    }

    if let Some(dok_id) = header.get("dokid") {
        if let Some(id) = split_dok_id(dok_id).and_then(|(_, rest)| normalize_ref_id(rest)) {
            warnings.push(format!("id {id} derived from dokid"));
            return Ok(id);
        }
    }

    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
        if is_doc_id(stem) {
            warnings.push(format!("id {stem} derived from file name"));
            return Ok(stem.to_string());
        }
    }

    Err(NormalizerError::MissingMetadata {
        path: path.to_path_buf(),
    })
}

/// Kind chain: id prefix → `dokid` collection → archive subdirectory →
/// default law.
fn resolve_kind(
    id: &str,
    header: &HeaderFields,
    path: &Path,
    warnings: &mut Vec<String>,
) -> Sourced<DocumentKind> {
    if let Some(kind) = DocumentKind::from_doc_id(id) {
        return Sourced::primary(kind);
    }

    if let Some(kind) = header
        .get("dokid")
        .and_then(split_dok_id)
        .and_then(|(collection, _)| DocumentKind::from_collection(collection))
    {
        warnings.push(format!("kind {} derived from dokid collection", kind.as_str()));
        return Sourced::fallback(kind);
    }

    if let Some(kind) = archive::kind_hint(path) {
        warnings.push(format!(
            "kind {} derived from archive directory layout",
            kind.as_str()
        ));
        return Sourced::fallback(kind);
    }

    warnings.push("kind not derivable, defaulting to law".to_string());
    Sourced::fallback(DocumentKind::Law)
}

/// Title chain: `dd.title` → `dd.titleShort` → `<h1>` → the id itself.
fn resolve_title(header: &HeaderFields, id: &str, warnings: &mut Vec<String>) -> Sourced<String> {
    if let Some(title) = header.get("title") {
        return Sourced::primary(title.to_string());
    }
    if let Some(title) = header.get("titleShort") {
        warnings.push("title taken from short title".to_string());
        return Sourced::fallback(title.to_string());
    }
    if let Some(title) = header.h1() {
        warnings.push("title taken from document heading".to_string());
        return Sourced::fallback(title.to_string());
    }
    warnings.push("no title found, using id".to_string());
    Sourced::fallback(id.to_string())
}

/// Parse a source date in any accepted format, normalized to ISO.
fn parse_date(raw: &str) -> Option<String> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw.trim(), format).ok())
        .map(|date| date.format("%Y-%m-%d").to_string())
}

/// Dates: `effective` from `dd.dateInForce`, falling back to the id's date
/// segment; `issued` from the id's date segment (a filename-convention
/// heuristic, always flagged); `historical` carries `dd.legacyID` verbatim.
fn resolve_dates(header: &HeaderFields, id: &str, warnings: &mut Vec<String>) -> DocumentDates {
    let id_date = date_from_doc_id(id);

    let effective = match header.get("dateInForce") {
        Some(raw) => match parse_date(raw) {
            Some(date) => Some(Sourced::primary(date)),
            None => {
                warnings.push(format!("unparseable dateInForce {raw:?}"));
                id_date.clone().map(|date| {
                    warnings.push("effective date taken from id".to_string());
                    Sourced::fallback(date)
                })
            }
        },
        None => id_date.clone().map(|date| {
            warnings.push("effective date taken from id".to_string());
            Sourced::fallback(date)
        }),
    };

    let issued = id_date.map(Sourced::fallback);

    let historical = header
        .get("legacyID")
        .map(|legacy| vec![legacy.to_string()])
        .unwrap_or_default();

    DocumentDates {
        issued,
        effective,
        historical,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use roxmltree::Document;
    use std::path::PathBuf;

    fn header_from(xml: &str) -> HeaderFields {
        let doc = Document::parse(xml).unwrap();
        HeaderFields::collect(&doc)
    }

    #[test]
    fn test_id_from_refid() {
        let header = header_from(r#"<dl><dd class="refid">lov/2020-01-01-1</dd></dl>"#);
        let mut warnings = Vec::new();
        let meta = extract(Path::new("whatever.xml"), &header, &mut warnings).unwrap();

        assert_eq!(meta.id, "lov-2020-01-01-1");
        assert!(!meta.kind.low_confidence);
        assert_eq!(meta.kind.value, DocumentKind::Law);
        assert!(warnings.iter().all(|w| !w.contains("derived")));
    }

    #[test]
    fn test_id_from_dokid_fallback() {
        let header = header_from(r#"<dl><dd class="dokid">SF/forskrift/2006-10-27-1196</dd></dl>"#);
        let mut warnings = Vec::new();
        let meta = extract(Path::new("whatever.xml"), &header, &mut warnings).unwrap();

        assert_eq!(meta.id, "forskrift-2006-10-27-1196");
        assert_eq!(meta.kind.value, DocumentKind::Regulation);
        assert!(warnings.iter().any(|w| w.contains("derived from dokid")));
    }

    #[test]
    fn test_id_from_file_name_fallback() {
        let header = header_from("<dl/>");
        let mut warnings = Vec::new();
        let meta = extract(
            Path::new("archive/nl/lov-2020-01-01-1.xml"),
            &header,
            &mut warnings,
        )
        .unwrap();

        assert_eq!(meta.id, "lov-2020-01-01-1");
        assert!(warnings.iter().any(|w| w.contains("file name")));
    }

    #[test]
    fn test_no_id_is_an_error() {
        let header = header_from("<dl/>");
        let mut warnings = Vec::new();
        let err = extract(Path::new("archive/nl/xyz.xml"), &header, &mut warnings).unwrap_err();
        assert!(matches!(err, NormalizerError::MissingMetadata { .. }));
    }

    #[test]
    fn test_title_fallback_chain() {
        let header = header_from(r#"<div><dl><dd class="refid">lov/2020-01-01-1</dd><dd class="titleShort">Kort</dd></dl></div>"#);
        let mut warnings = Vec::new();
        let meta = extract(Path::new("x.xml"), &header, &mut warnings).unwrap();

        assert_eq!(meta.title.value, "Kort");
        assert!(meta.title.low_confidence);

        let header = header_from(r#"<dl><dd class="refid">lov/2020-01-01-1</dd></dl>"#);
        let mut warnings = Vec::new();
        let meta = extract(Path::new("x.xml"), &header, &mut warnings).unwrap();
        assert_eq!(meta.title.value, "lov-2020-01-01-1");
        assert!(meta.title.low_confidence);
    }

    #[test]
    fn test_dates_from_header_and_id() {
        let header = header_from(
            r#"<dl><dd class="refid">lov/2020-01-01-1</dd><dd class="dateInForce">01.07.2020</dd><dd class="legacyID">LOV-2020-01-01-1</dd></dl>"#,
        );
        let mut warnings = Vec::new();
        let meta = extract(Path::new("x.xml"), &header, &mut warnings).unwrap();

        let effective = meta.dates.effective.unwrap();
        assert_eq!(effective.value, "2020-07-01");
        assert!(!effective.low_confidence);

        let issued = meta.dates.issued.unwrap();
        assert_eq!(issued.value, "2020-01-01");
        assert!(issued.low_confidence);

        assert_eq!(meta.dates.historical, vec!["LOV-2020-01-01-1".to_string()]);
    }

    #[test]
    fn test_effective_date_falls_back_to_id() {
        let header = header_from(r#"<dl><dd class="refid">lov/2020-01-01-1</dd></dl>"#);
        let mut warnings = Vec::new();
        let meta = extract(Path::new("x.xml"), &header, &mut warnings).unwrap();

        let effective = meta.dates.effective.unwrap();
        assert_eq!(effective.value, "2020-01-01");
        assert!(effective.low_confidence);
        assert!(warnings.iter().any(|w| w.contains("effective date")));
    }

    #[test]
    fn test_ministries_carried_over() {
        let header = header_from(
            r#"<dl><dd class="refid">lov/2020-01-01-1</dd><dd class="ministry"><ul><li>Justisdepartementet</li><li>Finansdepartementet</li></ul></dd></dl>"#,
        );
        let mut warnings = Vec::new();
        let meta = extract(Path::new("x.xml"), &header, &mut warnings).unwrap();

        assert_eq!(
            meta.issuing_authority,
            vec![
                "Justisdepartementet".to_string(),
                "Finansdepartementet".to_string()
            ]
        );
    }

    #[test]
    fn test_kind_from_path_hint() {
        let header = header_from("<dl/>");
        let mut warnings = Vec::new();
        // File name stem gives an id-less name, dokid missing: kind comes
        // from the sf/ directory once the id fallback kicks in.
        let path = PathBuf::from("archive/sf/forskrift-2006-10-27-1196.xml");
        let meta = extract(&path, &header, &mut warnings).unwrap();

        // Id prefix wins here because the file name is a well-formed id
        assert_eq!(meta.kind.value, DocumentKind::Regulation);
        assert!(!meta.kind.low_confidence);
    }
}
