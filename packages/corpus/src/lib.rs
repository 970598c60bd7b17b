//! Lovkorpus corpus reader - Consume a normalized Lovdata corpus.
//!
//! Read-only access to a corpus built by `lovkorpus-normalizer`:
//! enumerate documents, fetch one by id, or search the normalized text.
//!
//! # Example
//!
//! ```no_run
//! use lovkorpus_corpus::Corpus;
//!
//! let corpus = Corpus::open("corpus")?;
//! for id in corpus.ids() {
//!     println!("{id}");
//! }
//! # Ok::<(), lovkorpus_corpus::CorpusError>(())
//! ```

pub mod cli;
pub mod corpus;
pub mod error;

pub use corpus::{Corpus, SearchHit};
pub use error::{CorpusError, Result};
