//! Error handling for fbcgen.
//! Defines the error type and result alias used throughout the crate.

use std::io;
use thiserror::Error;

/// All failures fbcgen can report.
///
/// Each step of the catalog pipeline maps its failures onto one of these
/// variants so that `main` can print a single line and exit.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Represents errors in loading or merging the catalog context
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid image reference '{reference}': {reason}")]
    ImageReferenceError { reference: String, reason: String },

    /// Represents failures while turning a bundle image into an `olm.bundle` blob
    #[error("Failed to render bundle image '{image}': {reason}")]
    RenderError { image: String, reason: String },

    #[error("Failed to initialize package: {0}")]
    PackageInitError(String),

    #[error("Failed to build channel: {0}")]
    ChannelError(String),

    /// The minimal catalog must hold exactly one blob of each kind
    #[error("Expected exactly one {kind}, found {count}")]
    CatalogShapeError { kind: &'static str, count: usize },

    /// A blob failed its JSON Schema check
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// The declarative config could not be converted into a catalog model
    #[error("Conversion error: {0}")]
    ConversionError(String),

    /// The catalog model is inconsistent; holds every problem found
    #[error("Validation error: {}", .0.join("; "))]
    ValidationError(Vec<String>),

    #[error("Output file '{path}' already exists. Use --force to overwrite it")]
    OutputExistsError { path: String },

    #[error("Prompt error: {0}")]
    PromptError(String),
}

/// Convenience type alias for Results with fbcgen's `Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Arguments
/// * `err` - The error to handle
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    std::process::exit(1);
}
