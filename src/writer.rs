//! Writes a declarative config to disk.

use crate::config::OutputFormat;
use crate::declcfg::{write_json, write_yaml, DeclarativeConfig};
use crate::error::{Error, Result};
use crate::prompt::Prompter;
use log::{debug, error};
use std::path::{Path, PathBuf};

/// Serializes `cfg` into `format`.
pub fn render_fbc(cfg: &DeclarativeConfig, format: OutputFormat) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    match format {
        OutputFormat::Json => write_json(cfg, &mut buf)?,
        OutputFormat::Yaml => write_yaml(cfg, &mut buf)?,
    }
    Ok(buf)
}

/// Writes the catalog file, creating parent directories as needed.
///
/// # Arguments
/// * `cfg` - Catalog to write
/// * `path` - Destination file
/// * `format` - JSON or YAML stream
/// * `overwrite` - Whether an existing file may be replaced
///
/// # Returns
/// * `Result<PathBuf>` - Absolute path of the written file
///
/// # Errors
/// * `Error::OutputExistsError` if the file exists and `overwrite` is false
pub fn write_fbc<P: AsRef<Path>>(
    cfg: &DeclarativeConfig,
    path: P,
    format: OutputFormat,
    overwrite: bool,
) -> Result<PathBuf> {
    let abs_path = std::path::absolute(path.as_ref())?;
    if abs_path.exists() && !overwrite {
        return Err(Error::OutputExistsError {
            path: abs_path.display().to_string(),
        });
    }

    let content = render_fbc(cfg, format)?;
    if let Some(parent) = abs_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    debug!("Writing {} bytes to {}", content.len(), abs_path.display());
    std::fs::write(&abs_path, content).inspect_err(|e| {
        error!("failed to write catalog to {}: {e}", abs_path.display());
    })?;
    Ok(abs_path)
}

/// Decides whether an existing catalog file may be replaced.
///
/// Returns `true` straight away when `force` is set or the file is absent,
/// otherwise asks through `prompt`.
pub fn confirm_overwrite<P: AsRef<Path>>(prompt: &dyn Prompter, path: P, force: bool) -> Result<bool> {
    let path = path.as_ref();
    if force || !path.exists() {
        return Ok(true);
    }
    prompt.confirm(
        &format!("'{}' already exists. Overwrite it?", path.display()),
        false,
    )
}
