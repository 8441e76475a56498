//! CLI argument parsing and command definitions.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

// ============================================================================
// CLI argument types
// ============================================================================

/// Match resumes against job descriptions and back.
#[derive(Parser, Debug)]
#[command(name = "hirematch", author, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file.
    #[arg(short, long, global = true, env = "HIREMATCH_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load resources and print their status as JSON.
    Health,

    /// Rank resumes against a job description.
    SearchCandidates(SearchCandidatesArgs),

    /// Rank job descriptions against a resume.
    SearchJobs(SearchJobsArgs),

    /// Look up the first stored job matching keywords.
    FindJob {
        /// Case-insensitive literal text to look for.
        #[arg(long)]
        keywords: String,
    },

    /// Print version information.
    Version,

    /// Configuration operations.
    Config(ConfigCommand),
}

/// Shortlist and result sizes shared by both search commands.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct RankingArgs {
    /// Shortlist size fetched from the vector index.
    #[arg(short = 'k', long = "k")]
    pub k: Option<usize>,

    /// Number of ranked rows to print.
    #[arg(long)]
    pub top_m: Option<usize>,
}

/// Arguments for `search-candidates`.
#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("query")
        .required(true)
        .args(["jd_text", "jd_file", "keywords"])
))]
pub struct SearchCandidatesArgs {
    /// Job description text.
    #[arg(long)]
    pub jd_text: Option<String>,

    /// File containing the job description.
    #[arg(long)]
    pub jd_file: Option<PathBuf>,

    /// Keywords resolved to a stored job description.
    #[arg(long)]
    pub keywords: Option<String>,

    #[command(flatten)]
    pub ranking: RankingArgs,
}

/// Arguments for `search-jobs`.
#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("query")
        .required(true)
        .args(["resume_text", "resume_file"])
))]
pub struct SearchJobsArgs {
    /// Resume text.
    #[arg(long)]
    pub resume_text: Option<String>,

    /// File containing the resume.
    #[arg(long)]
    pub resume_file: Option<PathBuf>,

    #[command(flatten)]
    pub ranking: RankingArgs,
}

/// Config-specific subcommands.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    /// Config subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigAction,
}

/// Available config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path.
    Path,

    /// Get a configuration value by dotted key.
    Get {
        /// Dotted key (e.g., "search.default_k").
        key: String,
    },

    /// Create a default configuration file.
    Init {
        /// Output file path (defaults to XDG config path).
        #[arg(short, long)]
        file: Option<String>,

        /// Overwrite existing file.
        #[arg(long)]
        force: bool,
    },

    /// Export configuration as environment variables.
    Export {
        /// Format as Docker --env flags.
        #[arg(long)]
        docker_env: bool,
    },
}

// ============================================================================
// Tests
// ============================================================================
