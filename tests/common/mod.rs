#![allow(dead_code)]

use fbcgen::constants::{SCHEMA_BUNDLE, SCHEMA_CHANNEL, SCHEMA_PACKAGE};
use fbcgen::declcfg::{Bundle, Channel, ChannelEntry, DeclarativeConfig, Package, Property};

pub fn package(name: &str, default_channel: &str) -> Package {
    Package {
        schema: SCHEMA_PACKAGE.to_string(),
        name: name.to_string(),
        default_channel: default_channel.to_string(),
        description: String::new(),
        properties: Vec::new(),
    }
}

pub fn channel(package: &str, name: &str, entries: Vec<ChannelEntry>) -> Channel {
    Channel {
        schema: SCHEMA_CHANNEL.to_string(),
        name: name.to_string(),
        package: package.to_string(),
        entries,
        properties: Vec::new(),
    }
}

pub fn entry(name: &str, replaces: &str) -> ChannelEntry {
    ChannelEntry {
        name: name.to_string(),
        replaces: replaces.to_string(),
        ..Default::default()
    }
}

pub fn bundle(package: &str, version: &str) -> Bundle {
    Bundle {
        schema: SCHEMA_BUNDLE.to_string(),
        name: format!("{package}.v{version}"),
        package: package.to_string(),
        image: format!("quay.io/example/{package}:{version}"),
        properties: vec![Property::package(package, version).unwrap()],
        related_images: Vec::new(),
    }
}

/// api-operator with one channel `foo` holding v1.0.1.
pub fn minimal_config() -> DeclarativeConfig {
    DeclarativeConfig {
        packages: vec![package("api-operator", "foo")],
        channels: vec![channel(
            "api-operator",
            "foo",
            vec![ChannelEntry::new("api-operator.v1.0.1")],
        )],
        bundles: vec![bundle("api-operator", "1.0.1")],
        others: Vec::new(),
    }
}
