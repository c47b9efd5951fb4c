//! fbcgen's main application entry point and orchestration logic.

use fbcgen::{
    cli::{get_args, Args, Command, GenerateArgs},
    config::get_context,
    declcfg::load_file,
    error::{default_error_handler, Error, Result},
    logger::init_logger,
    pipeline::{create_minimal_fbc, renderer_for, validate_fbc},
    prompt::DialoguerPrompter,
    writer::{confirm_overwrite, write_fbc},
};
use std::path::Path;

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Main application logic execution.
///
/// # Flow
/// 1. Builds the catalog context from defaults, config file and flags
/// 2. Renders the bundle and assembles the minimal catalog
/// 3. Writes the catalog file, asking before overwriting
/// 4. Validates the catalog
fn generate(args: GenerateArgs) -> Result<()> {
    let context = get_context(args.config.as_deref(), std::env::current_dir()?)?
        .with_overrides(args.overrides())?;
    log::debug!("Catalog context: {context:?}");

    let renderer = renderer_for(&context)?;
    let cfg = create_minimal_fbc(&context, &*renderer)
        .inspect_err(|e| log::error!("error creating a minimal FBC: {e}"))?;

    let fbc_path = context.fbc_path();
    let prompt = DialoguerPrompter::new();
    if !confirm_overwrite(&prompt, &fbc_path, args.force)? {
        return Err(Error::OutputExistsError {
            path: fbc_path.display().to_string(),
        });
    }
    let written = write_fbc(&cfg, &fbc_path, context.format, true)?;
    println!("Catalog written to '{}'.", written.display());

    if args.skip_validation {
        log::warn!("Skipping validation of '{}'", written.display());
        return Ok(());
    }
    validate_fbc(&cfg)?;
    println!("Catalog '{}' is valid.", written.display());
    Ok(())
}

fn validate(file: &Path) -> Result<()> {
    let cfg = load_file(file)?;
    validate_fbc(&cfg)?;
    println!("Catalog '{}' is valid.", file.display());
    Ok(())
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Generate(generate_args) => generate(generate_args),
        Command::Validate { file } => validate(&file),
    }
}
