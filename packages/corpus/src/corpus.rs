//! Read-only access to a persisted corpus.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use lovkorpus_normalizer::config::{INDEX_FILE, JSON_ARTIFACT};
use lovkorpus_normalizer::render::Format;
use lovkorpus_normalizer::store::{CorpusIndex, IndexEntry};
use lovkorpus_normalizer::types::CanonicalDocument;

use crate::error::{CorpusError, Result};

/// Characters of context on each side of a search match.
const SNIPPET_RADIUS: usize = 120;

/// One search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    /// Text around the first match in the document.
    pub snippet: String,
}

/// A persisted corpus opened for reading.
#[derive(Debug)]
pub struct Corpus {
    root: PathBuf,
    index: CorpusIndex,
}

impl Corpus {
    /// Open a corpus at the given root.
    ///
    /// Loads `index.json`; when the index file is missing, the root is
    /// scanned for `*/document.json` artifacts instead, so a corpus with a
    /// lost index stays readable.
    ///
    /// # Errors
    /// Returns `MissingIndex` when the root is not a directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(CorpusError::MissingIndex { root });
        }

        let index_path = root.join(INDEX_FILE);
        let index = if index_path.exists() {
            serde_json::from_str(&fs::read_to_string(index_path)?)?
        } else {
            tracing::warn!(root = %root.display(), "index missing, scanning artifact directories");
            scan(&root)?
        };

        Ok(Self { root, index })
    }

    /// The corpus root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of documents in the corpus.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.documents.len()
    }

    /// Whether the corpus holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.documents.is_empty()
    }

    /// Document ids in index (sorted) order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.index.documents.keys().map(String::as_str)
    }

    /// Index entries in index order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &IndexEntry)> {
        self.index
            .documents
            .iter()
            .map(|(id, entry)| (id.as_str(), entry))
    }

    /// Fetch the full canonical document for an id.
    ///
    /// # Errors
    /// Returns `NotFound` for unknown ids.
    pub fn get(&self, id: &str) -> Result<CanonicalDocument> {
        let entry = self
            .index
            .documents
            .get(id)
            .ok_or_else(|| CorpusError::NotFound { id: id.to_string() })?;
        let path = self.root.join(&entry.path).join(JSON_ARTIFACT);
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    /// Read one rendered artifact for an id, verbatim.
    ///
    /// # Errors
    /// Returns `NotFound` for unknown ids; an `Io` error means the artifact
    /// file itself is missing (e.g. its rendering failed during the build).
    pub fn artifact(&self, id: &str, format: Format) -> Result<String> {
        let entry = self
            .index
            .documents
            .get(id)
            .ok_or_else(|| CorpusError::NotFound { id: id.to_string() })?;
        let path = self.root.join(&entry.path).join(format.file_name());
        Ok(fs::read_to_string(path)?)
    }

    /// Case-insensitive substring search over the normalized text of every
    /// document (title, headings, paragraphs).
    ///
    /// Hits come back in index order, one per matching document, each with
    /// a snippet around the document's first match. No relevance scoring.
    pub fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let needle = query.to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits = Vec::new();
        for (id, entry) in self.entries() {
            let document = match self.get(id) {
                Ok(document) => document,
                Err(err) => {
                    tracing::warn!(id, error = %err, "skipping unreadable document in search");
                    continue;
                }
            };
            let haystack = document.body_text();
            if let Some((pos, len)) = find_case_insensitive(&haystack, &needle) {
                hits.push(SearchHit {
                    id: id.to_string(),
                    title: entry.title.clone(),
                    snippet: extract_snippet(&haystack, pos, len),
                });
            }
        }
        Ok(hits)
    }
}

/// Rebuild an index by scanning `*/document.json` under the root.
fn scan(root: &Path) -> Result<CorpusIndex> {
    let mut index = CorpusIndex::default();
    for entry in WalkDir::new(root)
        .min_depth(2)
        .max_depth(2)
        .sort_by_file_name()
    {
        let entry = entry.map_err(std::io::Error::other)?;
        if !entry.file_type().is_file() || entry.file_name() != JSON_ARTIFACT {
            continue;
        }
        match fs::read_to_string(entry.path())
            .map_err(CorpusError::from)
            .and_then(|content| Ok(serde_json::from_str::<CanonicalDocument>(&content)?))
        {
            Ok(document) => index.upsert(&document),
            Err(err) => {
                tracing::warn!(path = %entry.path().display(), error = %err, "skipping unreadable artifact");
            }
        }
    }
    Ok(index)
}

/// Byte range of the first occurrence of `needle` (already lowercased) in
/// `haystack`, compared case-insensitively.
///
/// Offsets index the original string, so the snippet window lands on the
/// match even where lowercasing changes byte lengths.
fn find_case_insensitive(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    haystack
        .char_indices()
        .find_map(|(start, _)| match_len_at(haystack, start, needle).map(|len| (start, len)))
}

/// Length in `haystack` bytes of a match of `needle` starting at `start`,
/// if there is one.
fn match_len_at(haystack: &str, start: usize, needle: &str) -> Option<usize> {
    let mut remaining = needle.chars().peekable();
    for (offset, ch) in haystack[start..].char_indices() {
        if remaining.peek().is_none() {
            return Some(offset);
        }
        for lower in ch.to_lowercase() {
            if remaining.next() != Some(lower) {
                return None;
            }
        }
    }
    remaining.peek().is_none().then_some(haystack.len() - start)
}

/// Cut a snippet around a match, clamped to char boundaries, newlines
/// flattened, with ellipses marking truncation.
fn extract_snippet(text: &str, pos: usize, match_len: usize) -> String {
    let pos = pos.min(text.len());
    let mut start = pos.saturating_sub(SNIPPET_RADIUS);
    while start > 0 && !text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (pos + match_len + SNIPPET_RADIUS).min(text.len());
    while end < text.len() && !text.is_char_boundary(end) {
        end += 1;
    }

    let mut snippet = text[start..end].split_whitespace().collect::<Vec<_>>().join(" ");
    if start > 0 {
        snippet.insert(0, '…');
    }
    if end < text.len() {
        snippet.push('…');
    }
    snippet
}
