//! Minimal catalog assembly: render bundle, init package, build channel,
//! and merge the three blobs into one declarative config.

use crate::channel::build_channel;
use crate::config::CatalogContext;
use crate::declcfg::DeclarativeConfig;
use crate::error::{Error, Result};
use crate::init::PackageInit;
use crate::render::{BundleRenderer, DirectoryRenderer, Render, ReferenceRenderer};
use log::{debug, error};

/// Picks the renderer for the context: the unpacked bundle directory when one
/// is configured, the image reference alone otherwise.
pub fn renderer_for(context: &CatalogContext) -> Result<Box<dyn BundleRenderer>> {
    match &context.bundle_dir {
        Some(dir) => {
            debug!("Rendering from bundle directory {}", dir.display());
            Ok(Box::new(DirectoryRenderer::new(dir, context.package.clone())?))
        }
        None => Ok(Box::new(ReferenceRenderer::new(context.package.clone()))),
    }
}

fn expect_one(kind: &'static str, count: usize) -> Result<()> {
    if count != 1 {
        error!("minimal catalog needs exactly one {kind}, got {count}");
        return Err(Error::CatalogShapeError { kind, count });
    }
    Ok(())
}

/// Builds the minimal catalog for `context`.
///
/// # Flow
/// 1. Renders the bundle image into a config holding one bundle
/// 2. Initializes the package blob and assigns it as the only package
/// 3. Builds the channel blob and assigns it as the only channel
///
/// # Errors
/// * `Error::CatalogShapeError` if rendering does not produce exactly one bundle
/// * Any render, package or channel error, unchanged
pub fn create_minimal_fbc(
    context: &CatalogContext,
    renderer: &dyn BundleRenderer,
) -> Result<DeclarativeConfig> {
    let mut cfg = Render::new([context.bundle_image.as_str()]).run(renderer)?;
    expect_one("bundle", cfg.bundles.len())?;

    let package = PackageInit {
        package: context.package.clone(),
        default_channel: context.default_channel.clone(),
        description_reader: Some(context.description.open()?),
    }
    .run()
    .inspect_err(|e| error!("error initializing package: {e}"))?;
    cfg.packages = vec![package];

    let channel = build_channel(context).inspect_err(|e| error!("error building channel: {e}"))?;
    cfg.channels = vec![channel];

    // Package and channel are assigned as single-element vectors above; only
    // the rendered bundle count can differ from one.
    Ok(cfg)
}

/// Validates a catalog: blob schemas first, then the package/channel/bundle model.
///
/// # Errors
/// * `Error::SchemaError` if any blob has the wrong shape
/// * `Error::ConversionError` if the blobs do not form a consistent model
/// * `Error::ValidationError` holding every model problem found
pub fn validate_fbc(cfg: &DeclarativeConfig) -> Result<()> {
    crate::schema::check_config(cfg)?;
    let model = crate::model::convert_to_model(cfg)?;
    model.validate()?;
    debug!("Catalog with {} package(s) is valid", model.packages.len());
    Ok(())
}
