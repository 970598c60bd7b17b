//! Lovkorpus normalizer - Turn the public Lovdata archive into a corpus.
//!
//! This crate normalizes the editorially marked-up XML of Norwegian
//! statutes (lov) and regulations (forskrift) into a machine-readable
//! corpus: consistent metadata, a predictable section hierarchy, and
//! parallel JSON/HTML/Markdown renderings keyed by a stable document id.
//!
//! # Example
//!
//! ```
//! use lovkorpus_normalizer::config;
//!
//! // Validate document ids
//! assert!(config::validate_doc_id("lov-2006-05-19-16").is_ok());
//! assert!(config::validate_doc_id("not-an-id").is_err());
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Constants and id validation
//! - [`types`]: Core data types (CanonicalDocument, Section, Sourced)
//! - [`error`]: Error types and Result alias
//! - [`archive`]: Archive enumeration and raw file loading
//! - [`normalize`]: Encoding/entity repair and block extraction
//! - [`metadata`]: Metadata fallback chains
//! - [`hierarchy`]: Section tree construction
//! - [`render`]: JSON/HTML/Markdown rendering
//! - [`store`]: Artifact persistence and the corpus index
//! - [`pipeline`]: Batch runner
//! - [`cli`]: Command-line interface

pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod metadata;
pub mod normalize;
pub mod pipeline;
pub mod render;
pub mod store;
pub mod types;

// Re-export main entry points
pub use pipeline::{build_document, run, RunOptions, RunReport};

// Re-export commonly used items
pub use config::validate_doc_id;
pub use error::{NormalizerError, Result};
pub use types::{CanonicalDocument, DocumentKind, Section, Sourced};
