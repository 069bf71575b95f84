//! CLI module for Hente.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Hente - Knowledge Base Retrieval
///
/// A CLI tool for building and querying a vector index over a markdown
/// knowledge base. The name "Hente" comes from the Norwegian word for
/// "fetch" or "retrieve."
#[derive(Parser, Debug)]
#[command(name = "hente")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Hente configuration and knowledge directory
    Init,

    /// Check credentials, knowledge directory and index health
    Doctor,

    /// Build the vector index from the knowledge directory
    Build,

    /// Search the knowledge base for relevant chunks
    Search {
        /// Search query
        query: String,

        /// Maximum number of results (overrides configuration)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Minimum similarity score (overrides configuration)
        #[arg(short, long)]
        min_score: Option<f32>,

        /// Print the prompt-ready context block instead of a result list
        #[arg(long)]
        context: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_limit_defaults_to_config() {
        let cli = Cli::parse_from(["hente", "search", "query"]);
        let Commands::Search { limit, min_score, .. } = cli.command else {
            panic!("expected search command");
        };
        // No flag means the configured values apply.
        assert_eq!(limit, None);
        assert_eq!(min_score, None);
    }

    #[test]
    fn search_limit_flag_overrides() {
        let cli = Cli::parse_from(["hente", "search", "query", "--limit", "3"]);
        let Commands::Search { limit, .. } = cli.command else {
            panic!("expected search command");
        };
        assert_eq!(limit, Some(3));
    }
}
