//! hirematch core: shared types, traits and errors.
//!
//! This crate provides the foundational types used across all hirematch
//! crates. It has no internal hirematch dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types, error kinds and the Result alias
//! - [`pool`]: The two document pools (jobs and resumes)
//! - [`serde_ext`]: Lenient deserializers for env-sourced settings
//! - [`traits`]: Configuration abstraction

pub mod error;
pub mod pool;
pub mod serde_ext;
pub mod traits;

// Re-export key types at crate root for convenience
pub use error::{Error, ErrorKind, Result};
pub use pool::Pool;
pub use traits::ConfigProvider;
