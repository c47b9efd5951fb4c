//! Catalog context handling.
//! The context holds every literal parameter of a catalog run. It is built
//! once from defaults, an optional `fbc.json`/`fbc.yml`/`fbc.yaml` file and
//! command-line overrides, and is not mutated afterwards.

use crate::constants::{
    CONFIG_FILES, DEFAULT_BUNDLE_IMAGE, DEFAULT_CHANNEL, DEFAULT_CHANNEL_ENTRY,
    DEFAULT_DESCRIPTION, DEFAULT_FBC_DIR, DEFAULT_FBC_FILE, DEFAULT_PACKAGE, SCHEMA_CHANNEL,
};
use crate::declcfg::ChannelEntry;
use crate::error::{Error, Result};
use log::debug;
use serde::Deserialize;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

/// Where the package description text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptionSource {
    Inline(String),
    File(PathBuf),
}

impl DescriptionSource {
    /// Opens the description as a reader.
    pub fn open(&self) -> Result<Box<dyn Read>> {
        match self {
            DescriptionSource::Inline(text) => Ok(Box::new(Cursor::new(text.clone().into_bytes()))),
            DescriptionSource::File(path) => {
                debug!("Reading package description from {}", path.display());
                Ok(Box::new(File::open(path)?))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

/// Every parameter of a catalog run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogContext {
    pub bundle_image: String,
    pub package: String,
    pub default_channel: String,
    pub fbc_dir: PathBuf,
    pub fbc_file: String,
    pub channel_schema: String,
    pub channel_name: String,
    pub channel_entries: Vec<ChannelEntry>,
    pub description: DescriptionSource,
    /// Unpacked bundle contents for `bundle_image`, if available locally
    pub bundle_dir: Option<PathBuf>,
    pub format: OutputFormat,
}

impl Default for CatalogContext {
    fn default() -> Self {
        Self {
            bundle_image: DEFAULT_BUNDLE_IMAGE.to_string(),
            package: DEFAULT_PACKAGE.to_string(),
            default_channel: DEFAULT_CHANNEL.to_string(),
            fbc_dir: PathBuf::from(DEFAULT_FBC_DIR),
            fbc_file: DEFAULT_FBC_FILE.to_string(),
            channel_schema: SCHEMA_CHANNEL.to_string(),
            channel_name: DEFAULT_CHANNEL.to_string(),
            channel_entries: vec![ChannelEntry::new(DEFAULT_CHANNEL_ENTRY)],
            description: DescriptionSource::Inline(DEFAULT_DESCRIPTION.to_string()),
            bundle_dir: None,
            format: OutputFormat::Json,
        }
    }
}

impl CatalogContext {
    /// Full path of the catalog file to write.
    pub fn fbc_path(&self) -> PathBuf {
        self.fbc_dir.join(&self.fbc_file)
    }

    /// Applies a layer of overrides on top of this context.
    ///
    /// # Errors
    /// * `Error::ConfigError` if both an inline description and a description
    ///   file are given in the same layer
    pub fn with_overrides(mut self, overrides: ContextOverrides) -> Result<Self> {
        if overrides.description.is_some() && overrides.description_file.is_some() {
            return Err(Error::ConfigError(
                "'description' and 'descriptionFile' are mutually exclusive".to_string(),
            ));
        }

        if let Some(v) = overrides.bundle_image {
            self.bundle_image = v;
        }
        if let Some(v) = overrides.package {
            self.package = v;
        }
        if let Some(v) = overrides.default_channel {
            self.default_channel = v;
        }
        if let Some(v) = overrides.fbc_dir {
            self.fbc_dir = v;
        }
        if let Some(v) = overrides.fbc_file {
            self.fbc_file = v;
        }
        if let Some(v) = overrides.channel_schema {
            self.channel_schema = v;
        }
        if let Some(v) = overrides.channel_name {
            self.channel_name = v;
        }
        if let Some(v) = overrides.channel_entries {
            self.channel_entries = v;
        }
        if let Some(v) = overrides.description {
            self.description = DescriptionSource::Inline(v);
        }
        if let Some(v) = overrides.description_file {
            self.description = DescriptionSource::File(v);
        }
        if let Some(v) = overrides.bundle_dir {
            self.bundle_dir = Some(v);
        }
        if let Some(v) = overrides.format {
            self.format = v;
        }
        Ok(self)
    }
}

/// One layer of optional settings; used for both the config file and the CLI.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ContextOverrides {
    pub bundle_image: Option<String>,
    pub package: Option<String>,
    pub default_channel: Option<String>,
    pub fbc_dir: Option<PathBuf>,
    pub fbc_file: Option<String>,
    pub channel_schema: Option<String>,
    pub channel_name: Option<String>,
    pub channel_entries: Option<Vec<ChannelEntry>>,
    pub description: Option<String>,
    pub description_file: Option<PathBuf>,
    pub bundle_dir: Option<PathBuf>,
    pub format: Option<OutputFormat>,
}

/// Loads configuration from a directory, trying multiple file formats.
/// Supports: fbc.json, fbc.yml, fbc.yaml
///
/// # Arguments
/// * `config_dir` - Directory to search
/// * `config_files` - List of configuration files to try
///
/// # Returns
/// * `Result<Option<String>>` - Contents of the first found configuration file, if any
pub fn find_config<P: AsRef<Path>>(config_dir: P, config_files: &[&str]) -> Result<Option<String>> {
    for file in config_files {
        let config_path = config_dir.as_ref().join(file);
        if config_path.exists() {
            debug!("Loading configuration from {}", config_path.display());
            return Ok(Some(std::fs::read_to_string(&config_path)?));
        }
    }
    debug!("No configuration file found (tried: {})", config_files.join(", "));
    Ok(None)
}

/// Parses configuration content, trying JSON first and YAML second.
///
/// # Errors
/// * `Error::ConfigError` if the content is neither valid JSON nor valid YAML,
///   or contains unknown keys
pub fn parse_config(content: &str) -> Result<ContextOverrides> {
    match serde_json::from_str(content) {
        Ok(overrides) => Ok(overrides),
        Err(_) => serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Invalid configuration format: {e}"))),
    }
}

/// Builds the catalog context from defaults and the configuration file.
///
/// An explicit `config_path` must exist; otherwise `config_dir` is searched
/// for one of [`CONFIG_FILES`] and defaults are used when none is present.
pub fn get_context<P: AsRef<Path>>(
    config_path: Option<&Path>,
    config_dir: P,
) -> Result<CatalogContext> {
    let content = match config_path {
        Some(path) => {
            if !path.is_file() {
                return Err(Error::ConfigError(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            debug!("Loading configuration from {}", path.display());
            Some(std::fs::read_to_string(path)?)
        }
        None => find_config(config_dir, &CONFIG_FILES)?,
    };

    let context = CatalogContext::default();
    match content {
        Some(content) => context.with_overrides(parse_config(&content)?),
        None => Ok(context),
    }
}
