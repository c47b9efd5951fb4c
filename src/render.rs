//! Bundle rendering.
//! Turns bundle image references into `olm.bundle` blobs, either purely from
//! the reference or from an unpacked copy of the bundle on disk.

use crate::constants::{ANNOTATION_PACKAGE, SCHEMA_BUNDLE};
use crate::declcfg::{Bundle, DeclarativeConfig, Property, RelatedImage};
use crate::error::{Error, Result};
use crate::image::ImageReference;
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::{debug, error, info};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Trait for bundle renderers.
pub trait BundleRenderer {
    /// Renders one bundle image into an `olm.bundle` blob.
    ///
    /// # Arguments
    /// * `image` - Parsed bundle image reference
    ///
    /// # Returns
    /// * `Result<Bundle>` - The rendered bundle blob
    fn render(&self, image: &ImageReference) -> Result<Bundle>;
}

/// Renders a list of image references into a declarative config.
#[derive(Debug, Clone)]
pub struct Render {
    pub refs: Vec<String>,
}

impl Render {
    pub fn new<S: Into<String>>(refs: impl IntoIterator<Item = S>) -> Self {
        Self {
            refs: refs.into_iter().map(Into::into).collect(),
        }
    }

    /// Runs the renderer over every reference, in order.
    ///
    /// # Errors
    /// * `Error::ImageReferenceError` for unparseable references
    /// * Any error returned by `renderer`
    pub fn run(&self, renderer: &dyn BundleRenderer) -> Result<DeclarativeConfig> {
        let mut cfg = DeclarativeConfig::default();
        for reference in &self.refs {
            let image = ImageReference::parse(reference)?;
            debug!("Rendering bundle image {image}");
            let bundle = renderer.render(&image).inspect_err(|e| {
                error!("error in rendering the bundle image: {e}");
            })?;
            info!("Rendered bundle '{}' from {}", bundle.name, image);
            cfg.bundles.push(bundle);
        }
        Ok(cfg)
    }
}

fn render_error(image: &ImageReference, reason: impl Into<String>) -> Error {
    Error::RenderError {
        image: image.to_string(),
        reason: reason.into(),
    }
}

fn parse_version(image: &ImageReference, version: &str) -> Result<semver::Version> {
    semver::Version::parse(version)
        .map_err(|e| render_error(image, format!("version '{version}' is not valid semver: {e}")))
}

/// Derives a bundle from the image reference alone.
///
/// The tag is the bundle version, so `quay.io/org/api-operator:1.0.1` becomes
/// bundle `<package>.v1.0.1`.
pub struct ReferenceRenderer {
    package: String,
}

impl ReferenceRenderer {
    pub fn new<S: Into<String>>(package: S) -> Self {
        Self {
            package: package.into(),
        }
    }
}

impl BundleRenderer for ReferenceRenderer {
    fn render(&self, image: &ImageReference) -> Result<Bundle> {
        let tag = image
            .tag
            .as_deref()
            .ok_or_else(|| render_error(image, "reference has no tag to derive a version from"))?;
        let version = parse_version(image, tag.strip_prefix('v').unwrap_or(tag))?;

        Ok(Bundle {
            schema: SCHEMA_BUNDLE.to_string(),
            name: format!("{}.v{}", self.package, version),
            package: self.package.clone(),
            image: image.to_string(),
            properties: vec![Property::package(&self.package, &version.to_string())?],
            related_images: vec![RelatedImage {
                name: String::new(),
                image: image.to_string(),
            }],
        })
    }
}

#[derive(Debug, Deserialize)]
struct AnnotationsFile {
    annotations: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct DependenciesFile {
    #[serde(default)]
    dependencies: Vec<Property>,
}

/// Renders the unpacked contents of a bundle image found on disk.
///
/// Expected layout:
/// ```text
/// <root>/metadata/annotations.yaml
/// <root>/metadata/dependencies.yaml   (optional)
/// <root>/manifests/*.yaml
/// ```
pub struct DirectoryRenderer {
    root: PathBuf,
    package: String,
    manifest_globs: GlobSet,
}

impl DirectoryRenderer {
    pub fn new<P: AsRef<Path>, S: Into<String>>(root: P, package: S) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in ["*.yaml", "*.yml", "*.json"] {
            builder.add(
                Glob::new(pattern).map_err(|e| Error::ConfigError(format!("bad manifest glob: {e}")))?,
            );
        }
        let manifest_globs = builder
            .build()
            .map_err(|e| Error::ConfigError(format!("bad manifest glob: {e}")))?;

        Ok(Self {
            root: root.as_ref().to_path_buf(),
            package: package.into(),
            manifest_globs,
        })
    }

    fn read_package(&self, image: &ImageReference) -> Result<String> {
        let path = self.root.join("metadata").join("annotations.yaml");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| render_error(image, format!("reading {}: {e}", path.display())))?;
        let file: AnnotationsFile = serde_yaml::from_str(&content)?;
        file.annotations
            .get(ANNOTATION_PACKAGE)
            .cloned()
            .ok_or_else(|| render_error(image, format!("annotation {ANNOTATION_PACKAGE} is missing")))
    }

    fn read_dependencies(&self) -> Result<Vec<Property>> {
        let path = self.root.join("metadata").join("dependencies.yaml");
        if !path.exists() {
            return Ok(Vec::new());
        }
        let file: DependenciesFile = serde_yaml::from_str(&std::fs::read_to_string(&path)?)?;
        let mut properties = Vec::new();
        for dependency in file.dependencies {
            let field = |key: &str| {
                dependency
                    .value
                    .get(key)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            match dependency.type_.as_str() {
                "olm.package" => properties.push(Property::package_required(
                    &field("packageName"),
                    &field("version"),
                )?),
                "olm.gvk" => properties.push(Property::gvk_required(
                    &field("group"),
                    &field("kind"),
                    &field("version"),
                )?),
                other => debug!("Ignoring dependency of type {other}"),
            }
        }
        Ok(properties)
    }

    fn read_manifests(&self) -> Result<Vec<Value>> {
        let manifests_dir = self.root.join("manifests");
        let mut manifests = Vec::new();
        for entry in WalkDir::new(&manifests_dir).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::IoError(e.into()))?;
            if !entry.file_type().is_file() || !self.manifest_globs.is_match(entry.file_name()) {
                continue;
            }
            debug!("Reading manifest {}", entry.path().display());
            let content = std::fs::read_to_string(entry.path())?;
            manifests.push(serde_yaml::from_str(&content)?);
        }
        Ok(manifests)
    }
}

fn str_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value.pointer(pointer).and_then(Value::as_str)
}

fn crd_gvks(crd: &Value) -> Vec<(String, String, String)> {
    let group = str_at(crd, "/spec/group").unwrap_or_default();
    let kind = str_at(crd, "/spec/names/kind").unwrap_or_default();
    let versions: Vec<String> = match crd.pointer("/spec/versions").and_then(Value::as_array) {
        Some(versions) => versions
            .iter()
            .filter(|v| v.get("served").and_then(Value::as_bool).unwrap_or(true))
            .filter_map(|v| v.get("name").and_then(Value::as_str).map(str::to_string))
            .collect(),
        None => str_at(crd, "/spec/version").map(str::to_string).into_iter().collect(),
    };
    versions
        .into_iter()
        .map(|version| (group.to_string(), kind.to_string(), version))
        .collect()
}

/// Picks the display metadata of a CSV for the `olm.csv.metadata` property.
fn csv_metadata(csv: &Value) -> Value {
    let mut metadata = serde_json::Map::new();
    for (key, pointer) in [
        ("annotations", "/metadata/annotations"),
        ("labels", "/metadata/labels"),
        ("apiServiceDefinitions", "/spec/apiservicedefinitions"),
        ("crdDescriptions", "/spec/customresourcedefinitions"),
        ("description", "/spec/description"),
        ("displayName", "/spec/displayName"),
        ("installModes", "/spec/installModes"),
        ("keywords", "/spec/keywords"),
        ("links", "/spec/links"),
        ("maintainers", "/spec/maintainers"),
        ("maturity", "/spec/maturity"),
        ("minKubeVersion", "/spec/minKubeVersion"),
        ("nativeAPIs", "/spec/nativeAPIs"),
        ("provider", "/spec/provider"),
    ] {
        if let Some(value) = csv.pointer(pointer) {
            metadata.insert(key.to_string(), value.clone());
        }
    }
    Value::Object(metadata)
}

impl BundleRenderer for DirectoryRenderer {
    fn render(&self, image: &ImageReference) -> Result<Bundle> {
        let package = self.read_package(image)?;
        if package != self.package {
            return Err(render_error(
                image,
                format!("bundle belongs to package '{package}', expected '{}'", self.package),
            ));
        }

        let manifests = self.read_manifests()?;
        let kind_of = |m: &Value| m.get("kind").and_then(Value::as_str).unwrap_or_default().to_string();
        let csvs: Vec<&Value> =
            manifests.iter().filter(|m| kind_of(*m) == "ClusterServiceVersion").collect();
        let csv = match csvs.as_slice() {
            [csv] => *csv,
            other => {
                return Err(render_error(
                    image,
                    format!("expected exactly one ClusterServiceVersion, found {}", other.len()),
                ))
            }
        };

        let name = str_at(csv, "/metadata/name")
            .ok_or_else(|| render_error(image, "ClusterServiceVersion has no metadata.name"))?;
        let version = str_at(csv, "/spec/version")
            .ok_or_else(|| render_error(image, "ClusterServiceVersion has no spec.version"))?;
        let version = parse_version(image, version)?;

        let mut properties = vec![Property::package(&package, &version.to_string())?];

        let mut gvks: Vec<(String, String, String)> = manifests
            .iter()
            .filter(|m| kind_of(*m) == "CustomResourceDefinition")
            .flat_map(crd_gvks)
            .collect();
        gvks.sort();
        gvks.dedup();
        for (group, kind, version) in &gvks {
            properties.push(Property::gvk(group, kind, version)?);
        }

        if let Some(required) = csv
            .pointer("/spec/customresourcedefinitions/required")
            .and_then(Value::as_array)
        {
            for crd in required {
                let group = str_at(crd, "/name")
                    .and_then(|n| n.split_once('.'))
                    .map(|(_, group)| group)
                    .unwrap_or_default();
                properties.push(Property::gvk_required(
                    group,
                    str_at(crd, "/kind").unwrap_or_default(),
                    str_at(crd, "/version").unwrap_or_default(),
                )?);
            }
        }

        properties.extend(self.read_dependencies()?);
        properties.push(Property::csv_metadata(csv_metadata(csv)));

        let mut related_images = vec![RelatedImage {
            name: String::new(),
            image: image.to_string(),
        }];
        if let Some(images) = csv.pointer("/spec/relatedImages").and_then(Value::as_array) {
            for related in images {
                let related: RelatedImage = serde_json::from_value(related.clone())?;
                related_images.push(related);
            }
        }

        Ok(Bundle {
            schema: SCHEMA_BUNDLE.to_string(),
            name: name.to_string(),
            package,
            image: image.to_string(),
            properties,
            related_images,
        })
    }
}
