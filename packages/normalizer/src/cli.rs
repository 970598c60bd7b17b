//! Command-line interface for the normalizer.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::{NormalizerError, Result};
use crate::pipeline::{self, RunOptions};

/// Lovkorpus normalizer - Build a normalized corpus from the Lovdata archive.
#[derive(Parser)]
#[command(name = "lovkorpus-normalizer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Normalize an unpacked archive directory into a corpus.
    Build {
        /// Directory holding the unpacked archive XML files.
        input: PathBuf,

        /// Output directory for the corpus.
        #[arg(short, long, default_value = "corpus")]
        output: PathBuf,

        /// Maximum worker threads (default: available parallelism).
        #[arg(short, long)]
        jobs: Option<usize>,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            input,
            output,
            jobs,
        } => build_command(&input, &output, jobs),
    }
}

/// Execute the build command.
fn build_command(input: &PathBuf, output: &PathBuf, jobs: Option<usize>) -> Result<()> {
    if !input.is_dir() {
        return Err(NormalizerError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Input directory does not exist: {}", input.display()),
        )));
    }

    println!(
        "{} {} into {}",
        style("Normalizing").bold(),
        style(input.display()).cyan(),
        style(output.display()).green()
    );
    println!();

    let files = crate::archive::enumerate(input)?.len();
    let pb = ProgressBar::new(files as u64);
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.green} {pos}/{len} {msg}")
            .expect("valid template"),
    );

    let report = pipeline::run(input, output, &RunOptions { jobs }, |path| {
        if let Some(name) = path.file_name() {
            pb.set_message(name.to_string_lossy().into_owned());
        }
        pb.inc(1);
    })?;

    pb.finish_and_clear();

    println!("  Files: {}", report.total);
    println!("  Documents: {}", style(report.succeeded).green());
    if report.warned > 0 {
        println!("  With warnings: {}", style(report.warned).yellow().bold());
        for (id, warning) in &report.warnings {
            println!("    {id}: {warning}");
        }
    }
    if !report.replaced.is_empty() {
        println!(
            "  Replaced duplicates: {}",
            style(report.replaced.len()).yellow()
        );
    }
    if !report.skipped.is_empty() {
        println!("  Skipped: {}", style(report.skipped.len()).red().bold());
        for (path, reason) in &report.skipped {
            println!("    {}: {reason}", path.display());
        }
    }

    println!();
    println!(
        "{} {}",
        style("Corpus written to:").green().bold(),
        output.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_build() {
        let cli = Cli::parse_from(["lovkorpus-normalizer", "build", "raw/"]);

        let Commands::Build {
            input,
            output,
            jobs,
        } = cli.command;
        assert_eq!(input, PathBuf::from("raw/"));
        assert_eq!(output, PathBuf::from("corpus"));
        assert!(jobs.is_none());
    }

    #[test]
    fn test_cli_parse_build_with_options() {
        let cli = Cli::parse_from([
            "lovkorpus-normalizer",
            "build",
            "raw/",
            "--output",
            "out/",
            "--jobs",
            "4",
        ]);

        let Commands::Build { output, jobs, .. } = cli.command;
        assert_eq!(output, PathBuf::from("out/"));
        assert_eq!(jobs, Some(4));
    }
}
