use std::num::NonZeroU32;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Paths;

/// Top-level CLI parser for the `devotional` binary.
#[derive(Debug, Parser)]
#[command(
    name = "devotional",
    version,
    about = "Generate, deduplicate and publish daily devotional entries"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding the YYYY-MM-DD.md entry files
    #[arg(long, global = true, env = "ENTRIES_DIR", default_value = "src/content/entries")]
    pub entries_dir: PathBuf,

    /// Passage registry JSON file
    #[arg(long, global = true, env = "PASSAGES_FILE", default_value = "scripts/used-passages.json")]
    pub registry: PathBuf,

    /// Editorial configuration (themes, authors, tag vocabulary)
    #[arg(long, global = true, env = "SOURCES_FILE", default_value = "scripts/sources.json")]
    pub sources: PathBuf,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate new draft entries on the next free dates
    Generate {
        /// Number of consecutive entries to generate
        #[arg(short, long, default_value = "1")]
        count: NonZeroU32,
    },
    /// Flip drafts dated today or earlier to published
    Publish,
    /// Rebuild the passage registry from existing entries
    Backfill,
}

impl Cli {
    pub fn paths(&self) -> Paths {
        Paths {
            entries_dir: self.entries_dir.clone(),
            registry_file: self.registry.clone(),
            sources_file: self.sources.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_defaults_to_one_entry() {
        let cli = Cli::try_parse_from(["devotional", "generate"]).unwrap();
        match cli.command {
            Commands::Generate { count } => assert_eq!(count.get(), 1),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_generate_rejects_zero_count() {
        assert!(Cli::try_parse_from(["devotional", "generate", "--count", "0"]).is_err());
    }

    #[test]
    fn test_global_paths_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "devotional",
            "publish",
            "--entries-dir",
            "/tmp/site/entries",
            "--registry",
            "/tmp/site/used.json",
            "-v",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::Publish));
        assert!(cli.verbose);
        let paths = cli.paths();
        assert_eq!(paths.entries_dir, PathBuf::from("/tmp/site/entries"));
        assert_eq!(paths.registry_file, PathBuf::from("/tmp/site/used.json"));
    }

    #[test]
    fn test_backfill_takes_no_arguments() {
        assert!(matches!(
            Cli::try_parse_from(["devotional", "backfill"]).unwrap().command,
            Commands::Backfill
        ));
        assert!(Cli::try_parse_from(["devotional", "backfill", "--count", "2"]).is_err());
    }
}
