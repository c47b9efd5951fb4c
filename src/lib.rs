//! fbcgen assembles a minimal File-Based Catalog (one bundle, one package,
//! one channel), writes it to disk and validates it.

/// Channel blob construction
pub mod channel;

/// Command-line interface module for the fbcgen application
pub mod cli;

/// Catalog context handling
/// Supports JSON and YAML formats (fbc.json, fbc.yml, fbc.yaml)
pub mod config;

pub mod constants;

/// Declarative config blobs and their JSON/YAML streams
pub mod declcfg;

/// Error types and handling for the fbcgen application
pub mod error;

pub mod image;

/// Package blob initialization
pub mod init;

pub mod logger;

/// Package/channel/bundle model and its consistency checks
pub mod model;

/// Render, init, channel and merge steps, plus end-to-end validation
pub mod pipeline;

/// User input and interaction handling
pub mod prompt;

/// Bundle image rendering
pub mod render;

/// JSON Schema checks for individual blobs
pub mod schema;

pub mod writer;
