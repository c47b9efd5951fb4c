//! Catalog model: a package -> channel -> bundle tree built from a
//! declarative config, and the consistency checks run on it.

use crate::constants::PROPERTY_PACKAGE;
use crate::declcfg::{Bundle, DeclarativeConfig, Property};
use crate::error::{Error, Result};
use indexmap::{IndexMap, IndexSet};
use log::{debug, error};

#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub packages: IndexMap<String, ModelPackage>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelPackage {
    pub name: String,
    pub default_channel: String,
    pub description: String,
    pub channels: IndexMap<String, ModelChannel>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelChannel {
    pub name: String,
    pub package: String,
    pub bundles: IndexMap<String, ModelBundle>,
}

/// A bundle as it appears in one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelBundle {
    pub name: String,
    pub package: String,
    pub channel: String,
    pub image: String,
    pub version: semver::Version,
    pub replaces: String,
    pub skips: Vec<String>,
    pub skip_range: String,
    pub properties: Vec<Property>,
}

fn conversion_error(message: String) -> Error {
    error!("error converting the declarative config to model: {message}");
    Error::ConversionError(message)
}

fn bundle_version(bundle: &Bundle) -> Result<semver::Version> {
    let packages: Vec<&Property> = bundle
        .properties
        .iter()
        .filter(|p| p.type_ == PROPERTY_PACKAGE)
        .collect();
    let [property] = packages.as_slice() else {
        return Err(conversion_error(format!(
            "bundle '{}' must have exactly one {PROPERTY_PACKAGE} property, found {}",
            bundle.name,
            packages.len()
        )));
    };

    let value = property.as_package()?;
    if value.package_name != bundle.package {
        return Err(conversion_error(format!(
            "bundle '{}' has {PROPERTY_PACKAGE} '{}' but belongs to package '{}'",
            bundle.name, value.package_name, bundle.package
        )));
    }
    semver::Version::parse(&value.version).map_err(|e| {
        conversion_error(format!(
            "bundle '{}' has invalid version '{}': {e}",
            bundle.name, value.version
        ))
    })
}

/// Converts a declarative config into a catalog model.
///
/// # Errors
/// * `Error::ConversionError` on duplicates, references to unknown packages
///   or bundles, bundles in no channel, or malformed `olm.package` properties
pub fn convert_to_model(cfg: &DeclarativeConfig) -> Result<Model> {
    let mut packages: IndexMap<String, ModelPackage> = IndexMap::new();
    for package in &cfg.packages {
        if packages.contains_key(&package.name) {
            return Err(conversion_error(format!("duplicate package '{}'", package.name)));
        }
        packages.insert(
            package.name.clone(),
            ModelPackage {
                name: package.name.clone(),
                default_channel: package.default_channel.clone(),
                description: package.description.clone(),
                channels: IndexMap::new(),
            },
        );
    }

    // (package, bundle name) -> (blob, version)
    let mut bundles: IndexMap<(String, String), (&Bundle, semver::Version)> = IndexMap::new();
    for bundle in &cfg.bundles {
        if !packages.contains_key(&bundle.package) {
            return Err(conversion_error(format!(
                "unknown package '{}' for bundle '{}'",
                bundle.package, bundle.name
            )));
        }
        let key = (bundle.package.clone(), bundle.name.clone());
        if bundles.contains_key(&key) {
            return Err(conversion_error(format!(
                "duplicate bundle '{}' in package '{}'",
                bundle.name, bundle.package
            )));
        }
        let version = bundle_version(bundle)?;
        bundles.insert(key, (bundle, version));
    }

    let mut used: IndexSet<(String, String)> = IndexSet::new();
    for channel in &cfg.channels {
        let package = packages.get_mut(&channel.package).ok_or_else(|| {
            conversion_error(format!(
                "unknown package '{}' for channel '{}'",
                channel.package, channel.name
            ))
        })?;
        if package.channels.contains_key(&channel.name) {
            return Err(conversion_error(format!(
                "duplicate channel '{}' in package '{}'",
                channel.name, channel.package
            )));
        }

        let mut model_channel = ModelChannel {
            name: channel.name.clone(),
            package: channel.package.clone(),
            bundles: IndexMap::new(),
        };
        for entry in &channel.entries {
            if model_channel.bundles.contains_key(&entry.name) {
                return Err(conversion_error(format!(
                    "duplicate entry '{}' in channel '{}'",
                    entry.name, channel.name
                )));
            }
            let key = (channel.package.clone(), entry.name.clone());
            let (bundle, version) = bundles.get(&key).ok_or_else(|| {
                conversion_error(format!(
                    "channel '{}' entry '{}': bundle not found in package '{}'",
                    channel.name, entry.name, channel.package
                ))
            })?;
            model_channel.bundles.insert(
                entry.name.clone(),
                ModelBundle {
                    name: bundle.name.clone(),
                    package: bundle.package.clone(),
                    channel: channel.name.clone(),
                    image: bundle.image.clone(),
                    version: version.clone(),
                    replaces: entry.replaces.clone(),
                    skips: entry.skips.clone(),
                    skip_range: entry.skip_range.clone(),
                    properties: bundle.properties.clone(),
                },
            );
            used.insert(key);
        }
        package.channels.insert(channel.name.clone(), model_channel);
    }

    if let Some((package, bundle)) = bundles.keys().find(|key| !used.contains(*key)) {
        return Err(conversion_error(format!(
            "bundle '{bundle}' in package '{package}' is not in any channel"
        )));
    }

    debug!("Converted declarative config into {} package(s)", packages.len());
    Ok(Model { packages })
}

const RANGE_OPERATORS: &str = "<>=!~^";

/// Translates a space separated range (`>=1.0.0 <1.0.1 || >2.0.0`) into
/// `semver` requirements, one per alternative.
///
/// A bare version means exactly that version. `!=X` (or `!X`) has no `semver`
/// counterpart, so it splits its alternative into one below `X` and one above.
pub fn parse_skip_range(range: &str) -> std::result::Result<Vec<semver::VersionReq>, String> {
    let mut requirements = Vec::new();
    for alternative in range.split("||") {
        let mut comparators: Vec<(String, String)> = Vec::new();
        let mut pending_op = String::new();
        for token in alternative.split_whitespace() {
            let version_start = token
                .find(|c: char| !RANGE_OPERATORS.contains(c))
                .unwrap_or(token.len());
            let (op, version) = token.split_at(version_start);
            pending_op.push_str(op);
            if !version.is_empty() {
                comparators.push((std::mem::take(&mut pending_op), version.to_string()));
            }
        }
        if !pending_op.is_empty() || comparators.is_empty() {
            return Err(format!("incomplete range '{}'", alternative.trim()));
        }

        let mut expanded: Vec<Vec<String>> = vec![Vec::new()];
        for (op, version) in comparators {
            match op.as_str() {
                "!=" | "!" => {
                    expanded = expanded
                        .into_iter()
                        .flat_map(|current| {
                            let mut below = current.clone();
                            below.push(format!("<{version}"));
                            let mut above = current;
                            above.push(format!(">{version}"));
                            [below, above]
                        })
                        .collect();
                }
                "" | "=" | "==" => expanded.iter_mut().for_each(|c| c.push(format!("={version}"))),
                _ => expanded.iter_mut().for_each(|c| c.push(format!("{op}{version}"))),
            }
        }
        for comparators in expanded {
            requirements.push(
                semver::VersionReq::parse(&comparators.join(", ")).map_err(|e| e.to_string())?,
            );
        }
    }
    Ok(requirements)
}

impl ModelChannel {
    /// Bundles no other bundle in the channel replaces or skips.
    pub fn heads(&self) -> Vec<&ModelBundle> {
        let superseded: IndexSet<&str> = self
            .bundles
            .values()
            .flat_map(|b| {
                std::iter::once(b.replaces.as_str()).chain(b.skips.iter().map(String::as_str))
            })
            .filter(|name| !name.is_empty())
            .collect();
        self.bundles
            .values()
            .filter(|b| !superseded.contains(b.name.as_str()))
            .collect()
    }

    /// The single channel head.
    ///
    /// # Errors
    /// * `Error::ValidationError` when the channel has zero or several heads
    pub fn head(&self) -> Result<&ModelBundle> {
        match self.heads().as_slice() {
            [head] => Ok(*head),
            [] => Err(Error::ValidationError(vec![format!(
                "channel '{}' has no head",
                self.name
            )])),
            heads => Err(Error::ValidationError(vec![format!(
                "channel '{}' has multiple heads: {}",
                self.name,
                heads.iter().map(|b| b.name.as_str()).collect::<Vec<_>>().join(", ")
            )])),
        }
    }

    fn has_replaces_cycle(&self) -> bool {
        for start in self.bundles.values() {
            let mut seen: IndexSet<&str> = IndexSet::new();
            let mut current = Some(start);
            while let Some(bundle) = current {
                if !seen.insert(bundle.name.as_str()) {
                    return true;
                }
                current = match bundle.replaces.as_str() {
                    "" => None,
                    replaces => self.bundles.get(replaces),
                };
            }
        }
        false
    }

    fn validate(&self, problems: &mut Vec<String>) {
        if self.name.is_empty() {
            problems.push(format!("package '{}' has a channel with no name", self.package));
        }
        if self.bundles.is_empty() {
            problems.push(format!("channel '{}' has no bundles", self.name));
            return;
        }
        if let Err(Error::ValidationError(mut head_problems)) = self.head() {
            problems.append(&mut head_problems);
        }
        if self.has_replaces_cycle() {
            problems.push(format!("detected cycle in replaces chain of channel '{}'", self.name));
        }
        for bundle in self.bundles.values() {
            bundle.validate(problems);
        }
    }
}

impl ModelBundle {
    fn validate(&self, problems: &mut Vec<String>) {
        if self.name.is_empty() {
            problems.push(format!("channel '{}' has a bundle with no name", self.channel));
        }
        if self.image.is_empty() {
            problems.push(format!("bundle '{}' has no image", self.name));
        }
        if !self.skip_range.is_empty() {
            if let Err(e) = parse_skip_range(&self.skip_range) {
                problems.push(format!(
                    "bundle '{}' has invalid skipRange '{}': {e}",
                    self.name, self.skip_range
                ));
            }
        }
    }
}

impl ModelPackage {
    fn validate(&self, problems: &mut Vec<String>) {
        if self.name.is_empty() {
            problems.push("package has no name".to_string());
        }
        if self.channels.is_empty() {
            problems.push(format!("package '{}' has no channels", self.name));
        }
        if self.default_channel.is_empty() {
            problems.push(format!("package '{}' has no default channel", self.name));
        } else if !self.channels.contains_key(&self.default_channel) {
            problems.push(format!(
                "default channel '{}' not found in package '{}'",
                self.default_channel, self.name
            ));
        }
        for channel in self.channels.values() {
            channel.validate(problems);
        }
    }
}

impl Model {
    /// Checks every package, channel and bundle; reports all problems at once.
    ///
    /// # Errors
    /// * `Error::ValidationError` holding every problem found
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();
        for package in self.packages.values() {
            package.validate(&mut problems);
        }
        if problems.is_empty() {
            Ok(())
        } else {
            error!("error validating the generated FBC: {}", problems.join("; "));
            Err(Error::ValidationError(problems))
        }
    }
}
