//! Declarative config: the blob types of a File-Based Catalog and the
//! JSON/YAML streams they are written to and read from.

use crate::constants::{
    PROPERTY_CSV_METADATA, PROPERTY_GVK, PROPERTY_GVK_REQUIRED, PROPERTY_PACKAGE,
    PROPERTY_PACKAGE_REQUIRED, SCHEMA_BUNDLE, SCHEMA_CHANNEL, SCHEMA_PACKAGE,
};
use crate::error::{Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

/// An `olm.package` blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub schema: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default_channel: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Property>,
}

/// An `olm.channel` blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub schema: String,
    pub name: String,
    pub package: String,
    pub entries: Vec<ChannelEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Property>,
}

/// Names one bundle version within a channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub replaces: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skips: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub skip_range: String,
}

impl ChannelEntry {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// An `olm.bundle` blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub schema: String,
    pub name: String,
    pub package: String,
    pub image: String,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_images: Vec<RelatedImage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedImage {
    #[serde(default)]
    pub name: String,
    pub image: String,
}

/// A typed key/value attached to a package, channel or bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    #[serde(rename = "type")]
    pub type_: String,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageProperty {
    pub package_name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GvkProperty {
    pub group: String,
    pub kind: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageRequiredProperty {
    pub package_name: String,
    pub version_range: String,
}

impl Property {
    fn typed<T: Serialize>(type_: &str, value: &T) -> Result<Self> {
        Ok(Self {
            type_: type_.to_string(),
            value: serde_json::to_value(value)?,
        })
    }

    pub fn package(package_name: &str, version: &str) -> Result<Self> {
        Self::typed(
            PROPERTY_PACKAGE,
            &PackageProperty {
                package_name: package_name.to_string(),
                version: version.to_string(),
            },
        )
    }

    pub fn gvk(group: &str, kind: &str, version: &str) -> Result<Self> {
        Self::typed(PROPERTY_GVK, &Self::gvk_value(group, kind, version))
    }

    pub fn gvk_required(group: &str, kind: &str, version: &str) -> Result<Self> {
        Self::typed(PROPERTY_GVK_REQUIRED, &Self::gvk_value(group, kind, version))
    }

    pub fn package_required(package_name: &str, version_range: &str) -> Result<Self> {
        Self::typed(
            PROPERTY_PACKAGE_REQUIRED,
            &PackageRequiredProperty {
                package_name: package_name.to_string(),
                version_range: version_range.to_string(),
            },
        )
    }

    pub fn csv_metadata(metadata: serde_json::Value) -> Self {
        Self {
            type_: PROPERTY_CSV_METADATA.to_string(),
            value: metadata,
        }
    }

    fn gvk_value(group: &str, kind: &str, version: &str) -> GvkProperty {
        GvkProperty {
            group: group.to_string(),
            kind: kind.to_string(),
            version: version.to_string(),
        }
    }

    /// Decodes the value of an `olm.package` property.
    pub fn as_package(&self) -> Result<PackageProperty> {
        Ok(serde_json::from_value(self.value.clone())?)
    }
}

/// A blob whose schema is none of the three core schemas; kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct Meta {
    pub schema: String,
    pub package: String,
    pub name: String,
    pub blob: serde_json::Value,
}

/// The aggregate of every blob in a catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeclarativeConfig {
    pub packages: Vec<Package>,
    pub channels: Vec<Channel>,
    pub bundles: Vec<Bundle>,
    pub others: Vec<Meta>,
}

impl DeclarativeConfig {
    /// Appends every blob of `other` to this config.
    pub fn merge(&mut self, other: DeclarativeConfig) {
        self.packages.extend(other.packages);
        self.channels.extend(other.channels);
        self.bundles.extend(other.bundles);
        self.others.extend(other.others);
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
            && self.channels.is_empty()
            && self.bundles.is_empty()
            && self.others.is_empty()
    }

    /// Every blob as JSON, packages first and grouped by package name.
    pub fn blobs(&self) -> Result<Vec<serde_json::Value>> {
        let mut out = Vec::new();
        let mut package_names: Vec<&str> =
            self.packages.iter().map(|p| p.name.as_str()).collect();
        package_names.sort_unstable();
        package_names.dedup();

        let known: BTreeSet<&str> = package_names.iter().copied().collect();
        let orphans: BTreeSet<&str> = self
            .channels
            .iter()
            .map(|c| c.package.as_str())
            .chain(self.bundles.iter().map(|b| b.package.as_str()))
            .chain(self.others.iter().map(|m| m.package.as_str()))
            .filter(|name| !name.is_empty() && !known.contains(name))
            .collect();

        for name in package_names {
            for package in self.packages.iter().filter(|p| p.name == name) {
                out.push(serde_json::to_value(package)?);
            }
            self.push_package_members(name, &mut out)?;
        }
        for name in orphans {
            self.push_package_members(name, &mut out)?;
        }
        // Global blobs go last.
        if !known.contains("") {
            self.push_package_members("", &mut out)?;
        }

        Ok(out)
    }

    fn push_package_members(&self, package: &str, out: &mut Vec<serde_json::Value>) -> Result<()> {
        let mut channels: Vec<&Channel> =
            self.channels.iter().filter(|c| c.package == package).collect();
        channels.sort_by(|a, b| a.name.cmp(&b.name));
        for channel in channels {
            out.push(serde_json::to_value(channel)?);
        }

        let mut bundles: Vec<&Bundle> =
            self.bundles.iter().filter(|b| b.package == package).collect();
        bundles.sort_by(|a, b| a.name.cmp(&b.name));
        for bundle in bundles {
            out.push(serde_json::to_value(bundle)?);
        }

        let mut others: Vec<&Meta> = self.others.iter().filter(|m| m.package == package).collect();
        others.sort_by(|a, b| (&a.schema, &a.name).cmp(&(&b.schema, &b.name)));
        out.extend(others.into_iter().map(|m| m.blob.clone()));
        Ok(())
    }

    fn push_blob(&mut self, blob: serde_json::Value) -> Result<()> {
        let schema = blob
            .get("schema")
            .and_then(|s| s.as_str())
            .ok_or_else(|| Error::SchemaError("blob has no 'schema' field".to_string()))?
            .to_string();

        debug!("Loading blob with schema {schema}");
        match schema.as_str() {
            SCHEMA_PACKAGE => self.packages.push(serde_json::from_value(blob)?),
            SCHEMA_CHANNEL => self.channels.push(serde_json::from_value(blob)?),
            SCHEMA_BUNDLE => self.bundles.push(serde_json::from_value(blob)?),
            _ => {
                let field = |key: &str| {
                    blob.get(key)
                        .and_then(|v| v.as_str())
                        .unwrap_or_default()
                        .to_string()
                };
                let (package, name) = (field("package"), field("name"));
                self.others.push(Meta {
                    schema,
                    package,
                    name,
                    blob,
                });
            }
        }
        Ok(())
    }
}

/// Writes the config as a stream of 4-space indented JSON objects.
pub fn write_json<W: Write>(cfg: &DeclarativeConfig, mut writer: W) -> Result<()> {
    for blob in cfg.blobs()? {
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
        blob.serialize(&mut serializer)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// Writes the config as a multi-document YAML stream.
pub fn write_yaml<W: Write>(cfg: &DeclarativeConfig, mut writer: W) -> Result<()> {
    for blob in cfg.blobs()? {
        writer.write_all(b"---\n")?;
        writer.write_all(serde_yaml::to_string(&blob)?.as_bytes())?;
    }
    Ok(())
}

/// Parses a stream of concatenated JSON objects.
pub fn load_json(content: &str) -> Result<DeclarativeConfig> {
    let mut cfg = DeclarativeConfig::default();
    for blob in serde_json::Deserializer::from_str(content).into_iter::<serde_json::Value>() {
        cfg.push_blob(blob?)?;
    }
    Ok(cfg)
}

/// Parses a multi-document YAML stream; empty documents are skipped.
pub fn load_yaml(content: &str) -> Result<DeclarativeConfig> {
    let mut cfg = DeclarativeConfig::default();
    for document in serde_yaml::Deserializer::from_str(content) {
        let blob = serde_json::Value::deserialize(document)?;
        if blob.is_null() {
            continue;
        }
        cfg.push_blob(blob)?;
    }
    Ok(cfg)
}

/// Loads a catalog file.
///
/// `.json` is read as JSON and `.yaml`/`.yml` as YAML. Any other name is tried
/// as JSON first and YAML second; if both fail the JSON error is returned.
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<DeclarativeConfig> {
    let path = path.as_ref();
    debug!("Loading catalog from {}", path.display());
    let content = std::fs::read_to_string(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => load_json(&content),
        Some("yaml") | Some("yml") => load_yaml(&content),
        _ => load_json(&content).or_else(|json_err| {
            debug!("{} is not a JSON stream ({json_err}), trying YAML", path.display());
            load_yaml(&content).map_err(|_| json_err)
        }),
    }
}
