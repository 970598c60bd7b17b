//! Persistence: per-document artifact directories and the corpus index.
//!
//! Artifacts for one document are written into a staging directory and
//! committed with a single rename, so an interrupted run leaves either the
//! complete document directory or nothing. The index at the corpus root is
//! a sorted map and is merge-upserted, so reprocessing touches only the
//! affected ids.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{INDEX_FILE, STAGING_DIR};
use crate::error::Result;
use crate::render::{Format, RenderedArtifacts};
use crate::types::{CanonicalDocument, DocumentDates, DocumentKind};

/// One entry in the corpus index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub title: String,
    pub kind: DocumentKind,

    #[serde(default)]
    pub dates: DocumentDates,

    /// Artifact directory, relative to the corpus root.
    pub path: String,

    /// Metadata fields that were resolved via fallback heuristics.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub low_confidence: Vec<String>,
}

/// The corpus-level index: id → entry, sorted by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusIndex {
    pub documents: BTreeMap<String, IndexEntry>,
}

impl CorpusIndex {
    /// Load the index from a corpus root. A missing index file yields an
    /// empty index.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(INDEX_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save the index at the corpus root, atomically.
    pub fn save(&self, root: &Path) -> Result<()> {
        let mut content = serde_json::to_string_pretty(self)?;
        content.push('\n');
        write_atomic(root, INDEX_FILE, content.as_bytes())
    }

    /// Insert or replace the entry for a document.
    pub fn upsert(&mut self, document: &CanonicalDocument) {
        self.documents.insert(
            document.id.clone(),
            IndexEntry {
                title: document.title.value.clone(),
                kind: document.kind.value,
                dates: document.dates.clone(),
                path: document.id.clone(),
                low_confidence: document.low_confidence_fields(),
            },
        );
    }
}

/// A document staged on disk, ready to commit.
#[derive(Debug, Clone)]
pub struct StagedDocument {
    pub id: String,
    dir: PathBuf,
}

/// Artifact store rooted at the corpus output directory.
pub struct Store {
    root: PathBuf,
}

impl Store {
    /// Open (creating if needed) a store at the given root.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(root.join(STAGING_DIR))?;
        Ok(Self { root })
    }

    /// The corpus root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory a committed document lives in.
    #[must_use]
    pub fn document_dir(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }

    /// Write a document's artifacts into the staging area.
    ///
    /// `stage_key` must be unique within the run (duplicate ids may be
    /// staged concurrently); the document directory only takes the id's
    /// name at commit time.
    pub fn stage(
        &self,
        stage_key: &str,
        document: &CanonicalDocument,
        artifacts: &RenderedArtifacts,
    ) -> Result<StagedDocument> {
        let dir = self.root.join(STAGING_DIR).join(stage_key);
        fs::create_dir_all(&dir)?;

        write_atomic(&dir, Format::Json.file_name(), artifacts.json.as_bytes())?;
        if let Some(html) = &artifacts.html {
            write_atomic(&dir, Format::Html.file_name(), html.as_bytes())?;
        }
        if let Some(markdown) = &artifacts.markdown {
            write_atomic(&dir, Format::Markdown.file_name(), markdown.as_bytes())?;
        }

        Ok(StagedDocument {
            id: document.id.clone(),
            dir,
        })
    }

    /// Commit a staged document: one rename into its final directory.
    ///
    /// An existing directory for the same id is replaced.
    pub fn commit(&self, staged: &StagedDocument) -> Result<PathBuf> {
        let target = self.document_dir(&staged.id);
        if target.exists() {
            fs::remove_dir_all(&target)?;
        }
        fs::rename(&staged.dir, &target)?;
        Ok(target)
    }

    /// Remove leftover staging state after a run. Best effort.
    pub fn sweep_staging(&self) {
        let staging = self.root.join(STAGING_DIR);
        if let Err(err) = fs::remove_dir_all(&staging) {
            tracing::debug!(error = %err, "could not remove staging directory");
        }
    }
}

/// Atomic write pattern: temp file in the same directory, sync, rename.
fn write_atomic(dir: &Path, name: &str, content: &[u8]) -> Result<()> {
    let temp = dir.join(format!(".{name}.tmp"));
    {
        let mut file = File::create(&temp)?;
        file.write_all(content)?;
        file.sync_all()?;
    }

    let target = dir.join(name);

    // On Windows, rename fails if the destination already exists
    #[cfg(target_os = "windows")]
    if target.exists() {
        fs::remove_file(&target)?;
    }

    fs::rename(&temp, &target)?;
    Ok(())
}
