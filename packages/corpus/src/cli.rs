//! Command-line interface for reading a corpus.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use console::style;

use lovkorpus_normalizer::render::Format;
use lovkorpus_normalizer::types::DocumentKind;

use crate::corpus::Corpus;
use crate::error::Result;

/// Lovkorpus - Read a normalized corpus of Norwegian legal texts.
#[derive(Parser)]
#[command(name = "lovkorpus")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Corpus root directory.
    #[arg(short, long, default_value = "corpus", global = true)]
    pub corpus: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

/// Document kind filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Law,
    Regulation,
}

impl From<KindArg> for DocumentKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Law => DocumentKind::Law,
            KindArg::Regulation => DocumentKind::Regulation,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List documents in the corpus.
    List {
        /// Only show documents of this kind.
        #[arg(short, long)]
        kind: Option<KindArg>,
    },

    /// Print one document in the requested format.
    Get {
        /// Document id (e.g. lov-2006-05-19-16).
        id: String,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },

    /// Search document text for a substring.
    Search {
        /// Query text (case-insensitive).
        query: String,

        /// Maximum number of hits to print.
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let corpus = Corpus::open(&cli.corpus)?;

    match cli.command {
        Commands::List { kind } => list_command(&corpus, kind.map(DocumentKind::from)),
        Commands::Get { id, format } => get_command(&corpus, &id, format),
        Commands::Search { query, limit } => search_command(&corpus, &query, limit),
    }
}

fn list_command(corpus: &Corpus, kind: Option<DocumentKind>) -> Result<()> {
    let mut shown = 0;
    for (id, entry) in corpus.entries() {
        if kind.is_some_and(|k| k != entry.kind) {
            continue;
        }
        println!(
            "{}  {}  {}",
            style(id).cyan(),
            entry.kind.as_str(),
            entry.title
        );
        shown += 1;
    }
    println!();
    println!("{} documents", style(shown).bold());
    Ok(())
}

fn get_command(corpus: &Corpus, id: &str, format: Format) -> Result<()> {
    print!("{}", corpus.artifact(id, format)?);
    Ok(())
}

fn search_command(corpus: &Corpus, query: &str, limit: usize) -> Result<()> {
    let hits = corpus.search(query)?;
    let total = hits.len();

    for hit in hits.iter().take(limit) {
        println!("{}  {}", style(&hit.id).cyan(), style(&hit.title).bold());
        println!("  {}", hit.snippet);
    }

    println!();
    if total > limit {
        println!("{total} hits ({limit} shown)");
    } else {
        println!("{total} hits");
    }
    Ok(())
}
