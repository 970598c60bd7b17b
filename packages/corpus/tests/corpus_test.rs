//! Integration tests for the corpus client against a corpus produced by
//! the real normalization pipeline.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use lovkorpus_corpus::{Corpus, CorpusError};
use lovkorpus_normalizer::pipeline::{run, RunOptions};
use lovkorpus_normalizer::render::Format;
use lovkorpus_normalizer::types::DocumentKind;

fn source_xml(ref_id: &str, title: &str, body: &str) -> String {
    format!(
        "<html><body><header><dl>\
         <dd class=\"refid\">{ref_id}</dd>\
         <dd class=\"title\">{title}</dd>\
         </dl></header><main>\
         <section class=\"legalChapter\"><h2>Kapittel 1. Innhold</h2>\
         <p>{body}</p></section>\
         </main></body></html>"
    )
}

/// Build a two-document corpus through the full pipeline.
fn build_corpus() -> TempDir {
    let input = tempfile::tempdir().unwrap();
    fs::write(
        input.path().join("lov-2020-01-01-1.xml"),
        source_xml(
            "lov/2020-01-01-1",
            "Lov om fjellvandring",
            "Enhver har rett til ferdsel i utmark.",
        ),
    )
    .unwrap();
    fs::write(
        input.path().join("forskrift-2006-10-27-1196.xml"),
        source_xml(
            "forskrift/2006-10-27-1196",
            "Forskrift om ferdsel",
            "Ferdsel i verneområder krever tillatelse.",
        ),
    )
    .unwrap();

    let output = tempfile::tempdir().unwrap();
    let report = run(input.path(), output.path(), &RunOptions::default(), |_| {})
        .unwrap_or_else(|e| panic!("pipeline run failed: {e}"));
    assert_eq!(report.succeeded, 2);
    output
}

#[test]
fn test_open_lists_documents_sorted_by_id() {
    let root = build_corpus();
    let corpus = Corpus::open(root.path()).unwrap();

    assert_eq!(corpus.len(), 2);
    assert_eq!(
        corpus.ids().collect::<Vec<_>>(),
        vec!["forskrift-2006-10-27-1196", "lov-2020-01-01-1"]
    );
    let (_, entry) = corpus
        .entries()
        .find(|(id, _)| *id == "forskrift-2006-10-27-1196")
        .unwrap();
    assert_eq!(entry.kind, DocumentKind::Regulation);
    assert_eq!(entry.title, "Forskrift om ferdsel");
}

#[test]
fn test_get_returns_canonical_document() {
    let root = build_corpus();
    let corpus = Corpus::open(root.path()).unwrap();

    let document = corpus.get("lov-2020-01-01-1").unwrap();
    assert_eq!(document.title.value, "Lov om fjellvandring");
    assert_eq!(document.sections[0].path, vec!["Kapittel 1".to_string()]);
}

#[test]
fn test_get_unknown_id_fails() {
    let root = build_corpus();
    let corpus = Corpus::open(root.path()).unwrap();

    let err = corpus.get("lov-1999-12-31-99").unwrap_err();
    assert!(matches!(err, CorpusError::NotFound { ref id } if id == "lov-1999-12-31-99"));
}

#[test]
fn test_artifact_returns_verbatim_rendering() {
    let root = build_corpus();
    let corpus = Corpus::open(root.path()).unwrap();

    let markdown = corpus.artifact("lov-2020-01-01-1", Format::Markdown).unwrap();
    assert!(markdown.starts_with("# Lov om fjellvandring"));
    assert_eq!(
        markdown,
        fs::read_to_string(root.path().join("lov-2020-01-01-1/document.md")).unwrap()
    );
}

#[test]
fn test_search_is_case_insensitive_with_snippets() {
    let root = build_corpus();
    let corpus = Corpus::open(root.path()).unwrap();

    let hits = corpus.search("FERDSEL").unwrap();
    assert_eq!(hits.len(), 2);
    // Hits follow index order
    assert_eq!(hits[0].id, "forskrift-2006-10-27-1196");
    assert_eq!(hits[1].id, "lov-2020-01-01-1");
    assert!(hits[0].snippet.contains("verneområder"));

    assert!(corpus.search("grunnloven").unwrap().is_empty());
}

#[test]
fn test_open_scans_when_index_is_missing() {
    let root = build_corpus();
    fs::remove_file(root.path().join("index.json")).unwrap();

    let corpus = Corpus::open(root.path()).unwrap();
    assert_eq!(corpus.len(), 2);
    assert!(corpus.get("lov-2020-01-01-1").is_ok());
}

#[test]
fn test_open_missing_root_fails() {
    let err = Corpus::open(Path::new("no/such/corpus")).unwrap_err();
    assert!(matches!(err, CorpusError::MissingIndex { .. }));
}

#[test]
fn test_cli_list_and_get() {
    let root = build_corpus();

    Command::cargo_bin("lovkorpus")
        .unwrap()
        .args(["--corpus"])
        .arg(root.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("lov-2020-01-01-1"))
        .stdout(predicate::str::contains("forskrift-2006-10-27-1196"));

    Command::cargo_bin("lovkorpus")
        .unwrap()
        .args(["--corpus"])
        .arg(root.path())
        .args(["get", "lov-2020-01-01-1", "--format", "markdown"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# Lov om fjellvandring"));
}

#[test]
fn test_cli_search() {
    let root = build_corpus();

    Command::cargo_bin("lovkorpus")
        .unwrap()
        .args(["--corpus"])
        .arg(root.path())
        .args(["search", "ferdsel"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 hits"));
}
