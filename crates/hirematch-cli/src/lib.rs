//! Command-line front end for hirematch.
//!
//! # Key Abstractions
//!
//! - [`HirematchCli`]: loads configuration and dispatches commands
//! - [`HirematchConfig`]: confyg-backed configuration implementing
//!   [`hirematch_core::ConfigProvider`]
//!
//! # Features
//!
//! - `fastembed`: Load real encoder and reranker models. Without it, every
//!   command that needs models fails with a configuration error.

pub mod app;
pub mod cli;
pub mod config;
pub mod config_handlers;

pub use app::{HirematchCli, exit_code};
pub use cli::CliArgs;
pub use config::HirematchConfig;
