//! The hirematch CLI application.
//!
//! Wires configuration, logging and the engine's [`Matcher`] together and
//! dispatches the parsed command. Results go to stdout as JSON; logs go to
//! stderr.

use std::path::Path;
use std::sync::Arc;

use hirematch_core::{Error, ErrorKind, Result};
use hirematch_engine::{
    ArtifactPaths, CandidateSearchRequest, JobSearchRequest, Matcher, ModelLoader, ResourceLoader,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::cli::{CliArgs, Command, SearchCandidatesArgs, SearchJobsArgs};
use crate::config::HirematchConfig;
use crate::config_handlers;

/// Process exit code for a failed command.
pub fn exit_code(err: &Error) -> i32 {
    match err.kind() {
        ErrorKind::InvalidInput => 2,
        ErrorKind::NoMatch => 3,
        ErrorKind::ResourceUnavailable => 4,
        ErrorKind::Processing => 1,
    }
}

// ============================================================================
// HirematchCli
// ============================================================================

/// CLI application holding the loaded configuration.
pub struct HirematchCli {
    config: Arc<HirematchConfig>,
    models: Option<Arc<dyn ModelLoader>>,
    version: String,
}

impl HirematchCli {
    /// Create from CLI args, loading config from file/env.
    pub fn from_args(args: &CliArgs) -> Result<Self> {
        let config = HirematchConfig::load(args.config.as_deref())?;
        Ok(Self::new(config))
    }

    /// Create a new CLI application.
    pub fn new(config: HirematchConfig) -> Self {
        Self {
            config: Arc::new(config),
            models: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Use `models` instead of the configured model backend.
    pub fn with_model_loader(mut self, models: Arc<dyn ModelLoader>) -> Self {
        self.models = Some(models);
        self
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &HirematchConfig {
        &self.config
    }

    /// Initialise tracing-based logging on stderr.
    ///
    /// Uses `RUST_LOG` env var if set, otherwise defaults based on verbosity flags.
    pub fn init_logging(&self, verbose: bool, quiet: bool) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if quiet {
            EnvFilter::new("warn")
        } else if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        };

        // A subscriber may already be installed (e.g. in tests).
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }

    /// Run the CLI with the given arguments.
    pub async fn run(&self, args: CliArgs) -> Result<()> {
        self.init_logging(args.verbose, args.quiet);

        match args.command {
            Some(Command::Version) | None => {
                println!("hirematch {}", self.version);
                Ok(())
            }
            Some(Command::Config(config_cmd)) => {
                config_handlers::handle_config_command(args.config.as_deref(), config_cmd.command)
            }
            Some(Command::Health) => print_json(&self.matcher()?.health().await?),
            Some(Command::FindJob { keywords }) => {
                match self.matcher()?.find_by_keywords(&keywords).await? {
                    Some(hit) => print_json(&hit),
                    None => Err(Error::not_found(format!(
                        "No job description matches keywords '{keywords}'"
                    ))),
                }
            }
            Some(Command::SearchCandidates(search)) => {
                let request = candidate_request(search)?;
                print_json(&self.matcher()?.search_candidates(&request).await?)
            }
            Some(Command::SearchJobs(search)) => {
                let request = job_request(search)?;
                print_json(&self.matcher()?.search_jobs(&request).await?)
            }
        }
    }

    fn matcher(&self) -> Result<Matcher> {
        let paths = ArtifactPaths::from_config(self.config.as_ref())?;
        let models = match &self.models {
            Some(models) => Arc::clone(models),
            None => default_model_loader(&self.config)?,
        };
        tracing::debug!(artifacts = %paths.jobs_index.display(), "Resolved artifact paths");

        let loader = Arc::new(ResourceLoader::new(paths, models));
        Ok(Matcher::new(loader).with_search_settings(self.config.search.clone()))
    }
}

#[cfg(feature = "fastembed")]
fn default_model_loader(config: &HirematchConfig) -> Result<Arc<dyn ModelLoader>> {
    Ok(Arc::new(hirematch_engine::FastEmbedModelLoader::new(
        config.embedding.clone(),
        config.reranker.clone(),
    )))
}

#[cfg(not(feature = "fastembed"))]
fn default_model_loader(_config: &HirematchConfig) -> Result<Arc<dyn ModelLoader>> {
    Err(Error::config(
        "hirematch was built without model support; rebuild with `--features fastembed`",
    ))
}

// ============================================================================
// Request building
// ============================================================================

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))
}

fn candidate_request(args: SearchCandidatesArgs) -> Result<CandidateSearchRequest> {
    let jd_text = match (args.jd_text, args.jd_file) {
        (Some(text), _) => Some(text),
        (None, Some(path)) => Some(read_text(&path)?),
        (None, None) => None,
    };
    Ok(CandidateSearchRequest {
        jd_text,
        keywords: args.keywords,
        k: args.ranking.k,
        top_m: args.ranking.top_m,
    })
}

fn job_request(args: SearchJobsArgs) -> Result<JobSearchRequest> {
    let resume_text = match (args.resume_text, args.resume_file) {
        (Some(text), _) => text,
        (None, Some(path)) => read_text(&path)?,
        (None, None) => String::new(),
    };
    Ok(JobSearchRequest {
        resume_text,
        k: args.ranking.k,
        top_m: args.ranking.top_m,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| Error::operation(format!("Failed to serialize output: {e}")))?;
    println!("{json}");
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
