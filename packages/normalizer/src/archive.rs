//! Archive loader: enumerate and stage raw source files for parsing.
//!
//! The download/unpack step is an external collaborator; this module only
//! deals with an already-unpacked directory tree of source XML files.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::Result;
use crate::types::DocumentKind;

/// An unparsed source unit. Ephemeral; discarded after normalization.
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Provenance path of the source file.
    pub path: PathBuf,

    /// Raw byte content, possibly in a legacy encoding.
    pub bytes: Vec<u8>,
}

impl RawDocument {
    /// Read a raw document from disk.
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            bytes,
        })
    }

    /// Create a raw document from in-memory bytes (used by tests).
    #[must_use]
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            bytes,
        }
    }
}

/// Enumerate source XML files under a directory, sorted by path.
///
/// Sorting makes batch processing order (and therefore duplicate-id
/// tie-breaking) deterministic across runs.
pub fn enumerate(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = Vec::new();

    for entry in WalkDir::new(input_dir).follow_links(false) {
        let entry = entry.map_err(|e| {
            std::io::Error::other(format!("cannot walk {}: {e}", input_dir.display()))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_xml = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
        if is_xml {
            paths.push(entry.path().to_path_buf());
        }
    }

    paths.sort();
    tracing::debug!(count = paths.len(), dir = %input_dir.display(), "enumerated archive");
    Ok(paths)
}

/// Derive a document-kind hint from the archive path convention.
///
/// The public tarballs unpack into `nl/` and `sf/` subdirectories; when the
/// markup lacks a usable identifier the directory name is the last signal
/// for the kind of document.
#[must_use]
pub fn kind_hint(path: &Path) -> Option<DocumentKind> {
    path.components()
        .rev()
        .skip(1) // the file name itself carries no collection
        .filter_map(|c| c.as_os_str().to_str())
        .find_map(DocumentKind::from_path_component)
}
