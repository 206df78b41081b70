//! Common error types for BCP

use crate::taxonomy::{Environment, SubPost};
use thiserror::Error;

/// Common result type for BCP operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across BCP crates
///
/// Only configuration defects and I/O failures live here. Data-quality gaps
/// (missing values, missing ratings, half-answered composite questions) are
/// routine and never surface as errors.
#[derive(Error, Debug)]
pub enum Error {
    /// Emission source references a SubPost the active taxonomy does not map
    #[error("SubPost {sub_post} is not part of the {environment} taxonomy")]
    UnknownSubPost {
        sub_post: SubPost,
        environment: Environment,
    },

    /// Quality dimension name not known to the quality model
    #[error("Unknown quality dimension: {0}")]
    UnknownQualityDimension(String),

    /// Post, SubPost or environment name that does not parse
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Situation snapshot could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration could not be decoded
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}
