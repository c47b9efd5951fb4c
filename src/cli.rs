//! Command-line interface implementation for fbcgen.
//! Provides argument parsing and help text formatting using clap.

use crate::config::{ContextOverrides, OutputFormat};
use crate::declcfg::ChannelEntry;
use clap::{error::ErrorKind, Args as ClapArgs, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments structure for fbcgen.
#[derive(Parser, Debug)]
#[command(author, version, about = "fbcgen: build and validate a minimal File-Based Catalog", long_about = None)]
pub struct Args {
    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render the bundle, write the catalog file and validate it
    Generate(GenerateArgs),
    /// Validate an existing catalog file
    Validate {
        /// Catalog file: JSON or YAML stream, detected from the extension or content
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[derive(ClapArgs, Debug, Default)]
pub struct GenerateArgs {
    /// Configuration file; defaults to fbc.json, fbc.yml or fbc.yaml in the working directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Bundle image reference
    #[arg(long, value_name = "IMAGE")]
    pub image: Option<String>,

    /// Package name
    #[arg(long)]
    pub package: Option<String>,

    /// Default channel of the package
    #[arg(long)]
    pub default_channel: Option<String>,

    /// Channel name
    #[arg(long)]
    pub channel: Option<String>,

    /// Channel schema identifier
    #[arg(long)]
    pub channel_schema: Option<String>,

    /// Channel entry; repeat for several entries. `NAME` or `NAME:REPLACES`
    #[arg(long = "entry", value_name = "ENTRY")]
    pub entries: Vec<String>,

    /// Package description text
    #[arg(long, conflicts_with = "description_file")]
    pub description: Option<String>,

    /// File holding the package description
    #[arg(long, value_name = "FILE")]
    pub description_file: Option<PathBuf>,

    /// Directory holding the unpacked bundle image contents
    #[arg(long, value_name = "DIR")]
    pub bundle_dir: Option<PathBuf>,

    /// Directory the catalog file is written to
    #[arg(long, value_name = "DIR")]
    pub fbc_dir: Option<PathBuf>,

    /// Name of the catalog file
    #[arg(long, value_name = "NAME")]
    pub fbc_file: Option<String>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Overwrite an existing catalog file without asking
    #[arg(short, long)]
    pub force: bool,

    /// Skip validation of the generated catalog
    #[arg(long)]
    pub skip_validation: bool,
}

/// Parses `NAME` or `NAME:REPLACES` into a channel entry.
pub fn parse_entry(raw: &str) -> ChannelEntry {
    match raw.split_once(':') {
        Some((name, replaces)) => ChannelEntry {
            name: name.to_string(),
            replaces: replaces.to_string(),
            ..Default::default()
        },
        None => ChannelEntry::new(raw),
    }
}

impl GenerateArgs {
    /// The command-line layer of context overrides.
    pub fn overrides(&self) -> ContextOverrides {
        ContextOverrides {
            bundle_image: self.image.clone(),
            package: self.package.clone(),
            default_channel: self.default_channel.clone(),
            fbc_dir: self.fbc_dir.clone(),
            fbc_file: self.fbc_file.clone(),
            channel_schema: self.channel_schema.clone(),
            channel_name: self.channel.clone(),
            channel_entries: if self.entries.is_empty() {
                None
            } else {
                Some(self.entries.iter().map(|e| parse_entry(e)).collect())
            },
            description: self.description.clone(),
            description_file: self.description_file.clone(),
            bundle_dir: self.bundle_dir.clone(),
            format: self.format,
        }
    }
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument
                || e.kind() == ErrorKind::MissingSubcommand
            {
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
