mod common;

use common::{bundle, channel, minimal_config, package};
use fbcgen::declcfg::{load_json, load_yaml, write_json, write_yaml, ChannelEntry, DeclarativeConfig};
use fbcgen::error::Error;

fn positions(output: &str, needles: &[&str]) -> Vec<usize> {
    needles
        .iter()
        .map(|needle| output.find(needle).unwrap_or_else(|| panic!("missing {needle}")))
        .collect()
}

#[test]
fn test_write_json_layout() {
    let mut buf = Vec::new();
    write_json(&minimal_config(), &mut buf).unwrap();
    let output = String::from_utf8(buf).unwrap();

    assert!(output.starts_with(
        "{\n    \"schema\": \"olm.package\",\n    \"name\": \"api-operator\",\n    \"defaultChannel\": \"foo\"\n}\n"
    ));
    let order = positions(
        &output,
        &["\"olm.package\"", "\"olm.channel\"", "\"olm.bundle\""],
    );
    assert!(order.windows(2).all(|w| w[0] < w[1]));
    assert!(output.ends_with("}\n"));
    // Empty optional fields are omitted.
    assert!(!output.contains("\"description\""));
    assert!(!output.contains("\"replaces\""));
}

#[test]
fn test_blobs_group_by_package() {
    let cfg = DeclarativeConfig {
        packages: vec![package("zeta", "stable"), package("alpha", "stable")],
        channels: vec![
            channel("zeta", "stable", vec![ChannelEntry::new("zeta.v1.0.0")]),
            channel("alpha", "stable", vec![ChannelEntry::new("alpha.v1.0.0")]),
            channel("orphan", "stable", Vec::new()),
        ],
        bundles: vec![bundle("zeta", "1.0.0"), bundle("alpha", "1.0.0")],
        others: Vec::new(),
    };

    let names: Vec<String> = cfg
        .blobs()
        .unwrap()
        .iter()
        .map(|b| format!("{}:{}", b["schema"].as_str().unwrap(), b["name"].as_str().unwrap()))
        .collect();
    assert_eq!(
        names,
        vec![
            "olm.package:alpha",
            "olm.channel:stable",
            "olm.bundle:alpha.v1.0.0",
            "olm.package:zeta",
            "olm.channel:stable",
            "olm.bundle:zeta.v1.0.0",
            "olm.channel:stable",
        ]
    );
}

#[test]
fn test_json_stream_reloads() {
    let cfg = minimal_config();
    let mut buf = Vec::new();
    write_json(&cfg, &mut buf).unwrap();

    let loaded = load_json(std::str::from_utf8(&buf).unwrap()).unwrap();
    assert_eq!(loaded, cfg);
}

#[test]
fn test_yaml_stream_reloads() {
    let cfg = minimal_config();
    let mut buf = Vec::new();
    write_yaml(&cfg, &mut buf).unwrap();
    let output = String::from_utf8(buf).unwrap();

    assert_eq!(output.matches("---\n").count(), 3);
    assert_eq!(load_yaml(&output).unwrap(), cfg);
}

#[test]
fn test_unknown_schema_is_kept() {
    let content = r#"{"schema": "olm.deprecations", "package": "api-operator", "entries": []}
{"schema": "olm.package", "name": "api-operator"}"#;
    let cfg = load_json(content).unwrap();

    assert_eq!(cfg.packages.len(), 1);
    assert_eq!(cfg.others.len(), 1);
    assert_eq!(cfg.others[0].schema, "olm.deprecations");
    assert_eq!(cfg.others[0].package, "api-operator");
    assert_eq!(cfg.others[0].name, "");
}

#[test]
fn test_blob_without_schema_is_rejected() {
    let err = load_json(r#"{"name": "api-operator"}"#).unwrap_err();
    assert!(matches!(err, Error::SchemaError(_)));

    assert!(load_json("{ not json").is_err());
}

#[test]
fn test_merge() {
    let mut cfg = DeclarativeConfig::default();
    assert!(cfg.is_empty());
    cfg.merge(minimal_config());
    cfg.merge(minimal_config());
    assert_eq!(cfg.packages.len(), 2);
    assert_eq!(cfg.channels.len(), 2);
    assert_eq!(cfg.bundles.len(), 2);
}
