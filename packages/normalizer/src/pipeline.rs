//! Batch pipeline tying the stages together.
//!
//! Documents are independent, so normalization and rendering run on a small
//! worker pool. Workers only stage artifacts; the coordinator commits staged
//! documents in sorted source-path order, which makes duplicate-id
//! collisions resolve deterministically (last write wins, by path order) and
//! keeps the run safe to interrupt: a document is either fully committed or
//! absent.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use crate::archive::{self, RawDocument};
use crate::error::Result;
use crate::hierarchy;
use crate::metadata;
use crate::normalize;
use crate::render::{self, RenderedArtifacts};
use crate::store::{CorpusIndex, StagedDocument, Store};
use crate::types::CanonicalDocument;

/// Options for a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Maximum worker threads. `None` uses the available parallelism.
    pub jobs: Option<usize>,
}

/// Summary of one pipeline run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Number of source files considered.
    pub total: usize,
    /// Documents committed to the corpus.
    pub succeeded: usize,
    /// Committed documents that carried warnings.
    pub warned: usize,
    /// Warnings attached to committed documents, keyed by document id.
    /// Includes render failures, which are recorded nowhere else.
    pub warnings: Vec<(String, String)>,
    /// Files that could not be processed, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
    /// Ids that appeared more than once; the earlier commit was replaced.
    pub replaced: Vec<String>,
}

impl RunReport {
    /// Whether every file made it into the corpus cleanly.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.warned == 0 && self.replaced.is_empty()
    }
}

/// Build the canonical form of one raw archive file.
///
/// Runs normalization, metadata extraction, and hierarchy construction;
/// all per-stage warnings end up on the document.
///
/// # Errors
/// Fails on unparseable XML (`MalformedSource`) or when no id can be
/// derived (`MissingMetadata`).
pub fn build_document(raw: &RawDocument) -> Result<CanonicalDocument> {
    let normalized = normalize::normalize(raw)?;

    let mut warnings = normalized.warnings.clone();
    let meta = metadata::extract(&raw.path, &normalized.header, &mut warnings)?;
    let sections = hierarchy::build(&normalized.blocks, &mut warnings);
    let official_url = CanonicalDocument::official_url_for(&meta.id, meta.kind.value);

    Ok(CanonicalDocument {
        id: meta.id,
        title: meta.title,
        kind: meta.kind,
        issuing_authority: meta.issuing_authority,
        dates: meta.dates,
        official_url,
        sections,
        warnings,
    })
}

enum Outcome {
    Staged {
        document: CanonicalDocument,
        staged: StagedDocument,
        render_warnings: Vec<String>,
    },
    Failed {
        reason: String,
    },
}

fn stage_one(store: &Store, path: &Path, stage_key: &str) -> Outcome {
    let staged = RawDocument::read(path)
        .and_then(|raw| build_document(&raw))
        .and_then(|document| {
            let artifacts: RenderedArtifacts = render::render_all(&document)?;
            let staged = store.stage(stage_key, &document, &artifacts)?;
            Ok((document, staged, artifacts.warnings))
        });

    match staged {
        Ok((document, staged, render_warnings)) => Outcome::Staged {
            document,
            staged,
            render_warnings,
        },
        Err(err) => Outcome::Failed {
            reason: err.to_string(),
        },
    }
}

fn worker_count(options: &RunOptions, files: usize) -> usize {
    let available = thread::available_parallelism().map(usize::from).unwrap_or(1);
    let cap = options.jobs.unwrap_or(available).max(1);
    available.min(cap).min(files).max(1)
}

/// Run the full pipeline: enumerate, normalize, render, commit, index.
///
/// `tick` is called on the coordinating thread once per finished source
/// file (in completion order), for progress reporting.
///
/// # Errors
/// Fails only on corpus-level problems (unreadable input directory,
/// unwritable output root, unwritable index). Per-document failures are
/// recorded in the report instead.
pub fn run(
    input: &Path,
    output: &Path,
    options: &RunOptions,
    mut tick: impl FnMut(&Path),
) -> Result<RunReport> {
    let paths = archive::enumerate(input)?;
    let store = Store::open(output)?;
    let mut index = CorpusIndex::load(output)?;

    let mut report = RunReport {
        total: paths.len(),
        ..RunReport::default()
    };

    let workers = worker_count(options, paths.len());
    tracing::info!(files = paths.len(), workers, "starting pipeline run");

    let next = AtomicUsize::new(0);
    let mut outcomes: Vec<Option<Outcome>> = Vec::new();
    outcomes.resize_with(paths.len(), || None);

    thread::scope(|scope| {
        let (sender, receiver) = mpsc::channel::<(usize, Outcome)>();

        for _ in 0..workers {
            let sender = sender.clone();
            let paths = &paths;
            let store = &store;
            let next = &next;
            scope.spawn(move || loop {
                let idx = next.fetch_add(1, Ordering::Relaxed);
                let Some(path) = paths.get(idx) else {
                    break;
                };
                let outcome = stage_one(store, path, &format!("{idx:06}"));
                if sender.send((idx, outcome)).is_err() {
                    break;
                }
            });
        }
        drop(sender);

        for (idx, outcome) in receiver {
            if let Some(path) = paths.get(idx) {
                tick(path);
            }
            if let Some(slot) = outcomes.get_mut(idx) {
                *slot = Some(outcome);
            }
        }
    });

    // Commit in source-path order so duplicate ids resolve last-write-wins
    let mut committed_ids: HashSet<String> = HashSet::new();
    for (idx, outcome) in outcomes.into_iter().enumerate() {
        let path = paths.get(idx).cloned().unwrap_or_default();
        match outcome {
            Some(Outcome::Staged {
                document,
                staged,
                render_warnings,
            }) => {
                if !committed_ids.insert(document.id.clone()) {
                    tracing::warn!(id = %document.id, path = %path.display(), "duplicate id, replacing earlier document");
                    report.replaced.push(document.id.clone());
                }
                match store.commit(&staged) {
                    Ok(_) => {
                        index.upsert(&document);
                        report.succeeded += 1;
                        if !document.warnings.is_empty() || !render_warnings.is_empty() {
                            report.warned += 1;
                        }
                        for warning in document.warnings.iter().cloned().chain(render_warnings) {
                            report.warnings.push((document.id.clone(), warning));
                        }
                    }
                    Err(err) => {
                        report.skipped.push((path, err.to_string()));
                    }
                }
            }
            Some(Outcome::Failed { reason }) => {
                tracing::warn!(path = %path.display(), reason, "skipping document");
                report.skipped.push((path, reason));
            }
            None => {
                report.skipped.push((path, "worker produced no result".to_string()));
            }
        }
    }

    index.save(output)?;
    store.sweep_staging();

    Ok(report)
}
