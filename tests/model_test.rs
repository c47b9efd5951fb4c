mod common;

use common::{bundle, channel, entry, minimal_config, package};
use fbcgen::declcfg::{ChannelEntry, Property};
use fbcgen::error::Error;
use fbcgen::model::{convert_to_model, parse_skip_range};

fn validation_problems(err: Error) -> Vec<String> {
    match err {
        Error::ValidationError(problems) => problems,
        other => panic!("Expected ValidationError, got {other:?}"),
    }
}

#[test]
fn test_minimal_config_is_valid() {
    let model = convert_to_model(&minimal_config()).unwrap();
    assert!(model.validate().is_ok());

    let channel = &model.packages["api-operator"].channels["foo"];
    let head = channel.head().unwrap();
    assert_eq!(head.name, "api-operator.v1.0.1");
    assert_eq!(head.version, semver::Version::new(1, 0, 1));
}

#[test]
fn test_default_channel_must_exist() {
    let mut cfg = minimal_config();
    cfg.packages[0].default_channel = "stable".to_string();

    let err = convert_to_model(&cfg).unwrap().validate().unwrap_err();
    assert_eq!(
        validation_problems(err),
        vec!["default channel 'stable' not found in package 'api-operator'".to_string()]
    );
}

#[test]
fn test_missing_default_channel() {
    let mut cfg = minimal_config();
    cfg.packages[0].default_channel.clear();

    let problems = validation_problems(convert_to_model(&cfg).unwrap().validate().unwrap_err());
    assert!(problems.contains(&"package 'api-operator' has no default channel".to_string()));
}

#[test]
fn test_entry_without_bundle_fails_conversion() {
    let mut cfg = minimal_config();
    cfg.channels[0].entries.push(ChannelEntry::new("api-operator.v2.0.0"));

    match convert_to_model(&cfg) {
        Err(Error::ConversionError(msg)) => assert!(msg.contains("bundle not found")),
        other => panic!("Expected ConversionError, got {other:?}"),
    }
}

#[test]
fn test_bundle_outside_any_channel_fails_conversion() {
    let mut cfg = minimal_config();
    cfg.bundles.push(bundle("api-operator", "2.0.0"));

    match convert_to_model(&cfg) {
        Err(Error::ConversionError(msg)) => {
            assert_eq!(
                msg,
                "bundle 'api-operator.v2.0.0' in package 'api-operator' is not in any channel"
            )
        }
        other => panic!("Expected ConversionError, got {other:?}"),
    }
}

#[test]
fn test_unknown_package_and_duplicates() {
    let mut cfg = minimal_config();
    cfg.bundles[0].package = "other".to_string();
    assert!(matches!(convert_to_model(&cfg), Err(Error::ConversionError(_))));

    let mut cfg = minimal_config();
    cfg.packages.push(package("api-operator", "foo"));
    assert!(matches!(convert_to_model(&cfg), Err(Error::ConversionError(_))));

    let mut cfg = minimal_config();
    cfg.channels[0].entries.push(ChannelEntry::new("api-operator.v1.0.1"));
    assert!(matches!(convert_to_model(&cfg), Err(Error::ConversionError(_))));
}

#[test]
fn test_package_property_must_match() {
    let mut cfg = minimal_config();
    cfg.bundles[0].properties = vec![Property::package("someone-else", "1.0.1").unwrap()];
    assert!(matches!(convert_to_model(&cfg), Err(Error::ConversionError(_))));

    let mut cfg = minimal_config();
    cfg.bundles[0].properties.clear();
    assert!(matches!(convert_to_model(&cfg), Err(Error::ConversionError(_))));

    let mut cfg = minimal_config();
    cfg.bundles[0].properties = vec![Property::package("api-operator", "one").unwrap()];
    assert!(matches!(convert_to_model(&cfg), Err(Error::ConversionError(_))));
}

#[test]
fn test_replaces_chain_has_single_head() {
    let mut cfg = minimal_config();
    cfg.bundles.push(bundle("api-operator", "1.0.2"));
    cfg.channels[0]
        .entries
        .push(entry("api-operator.v1.0.2", "api-operator.v1.0.1"));

    let model = convert_to_model(&cfg).unwrap();
    assert!(model.validate().is_ok());
    assert_eq!(
        model.packages["api-operator"].channels["foo"].head().unwrap().name,
        "api-operator.v1.0.2"
    );
}

#[test]
fn test_multiple_heads() {
    let mut cfg = minimal_config();
    cfg.bundles.push(bundle("api-operator", "1.0.2"));
    cfg.channels[0].entries.push(ChannelEntry::new("api-operator.v1.0.2"));

    let problems = validation_problems(convert_to_model(&cfg).unwrap().validate().unwrap_err());
    assert_eq!(
        problems,
        vec!["channel 'foo' has multiple heads: api-operator.v1.0.1, api-operator.v1.0.2".to_string()]
    );
}

#[test]
fn test_replaces_cycle() {
    let mut cfg = minimal_config();
    cfg.bundles.push(bundle("api-operator", "1.0.2"));
    cfg.channels = vec![channel(
        "api-operator",
        "foo",
        vec![
            entry("api-operator.v1.0.1", "api-operator.v1.0.2"),
            entry("api-operator.v1.0.2", "api-operator.v1.0.1"),
        ],
    )];

    let problems = validation_problems(convert_to_model(&cfg).unwrap().validate().unwrap_err());
    assert!(problems.contains(&"channel 'foo' has no head".to_string()));
    assert!(problems.contains(&"detected cycle in replaces chain of channel 'foo'".to_string()));
}

#[test]
fn test_all_problems_are_reported() {
    let mut cfg = minimal_config();
    cfg.packages[0].default_channel = "stable".to_string();
    cfg.bundles[0].image.clear();
    cfg.channels[0].entries[0].skip_range = "not a range".to_string();

    let problems = validation_problems(convert_to_model(&cfg).unwrap().validate().unwrap_err());
    assert_eq!(problems.len(), 3);
}

#[test]
fn test_parse_skip_range() {
    assert_eq!(parse_skip_range(">=1.0.0 <1.0.1").unwrap().len(), 1);
    assert_eq!(parse_skip_range(">= 1.0.0 < 2.0.0").unwrap().len(), 1);
    assert_eq!(parse_skip_range(">=1.0.0 <1.1.0 || >=2.0.0").unwrap().len(), 2);
    assert!(parse_skip_range(">=").is_err());
    assert!(parse_skip_range("").is_err());
    assert!(parse_skip_range("not a range").is_err());

    let reqs = parse_skip_range(">=1.0.0 <1.0.1").unwrap();
    assert!(reqs[0].matches(&semver::Version::new(1, 0, 0)));
    assert!(!reqs[0].matches(&semver::Version::new(1, 0, 1)));
}

#[test]
fn test_skip_range_not_equal() {
    let reqs = parse_skip_range(">=1.0.0 !=1.0.1").unwrap();
    let matched = |v: semver::Version| reqs.iter().any(|r| r.matches(&v));
    assert!(matched(semver::Version::new(1, 0, 0)));
    assert!(!matched(semver::Version::new(1, 0, 1)));
    assert!(matched(semver::Version::new(1, 0, 2)));

    assert!(parse_skip_range(">=1.0.0 !=1.0.1 !=1.0.3 || <0.5.0").is_ok());
}

#[test]
fn test_skip_range_bare_version_is_exact() {
    let reqs = parse_skip_range("1.0.0").unwrap();
    assert_eq!(reqs.len(), 1);
    assert!(reqs[0].matches(&semver::Version::new(1, 0, 0)));
    assert!(!reqs[0].matches(&semver::Version::new(1, 5, 0)));
    assert!(!reqs[0].matches(&semver::Version::new(1, 0, 1)));
}

#[test]
fn test_channel_without_bundles() {
    let mut cfg = minimal_config();
    cfg.channels.push(channel("api-operator", "empty", Vec::new()));

    let problems = validation_problems(convert_to_model(&cfg).unwrap().validate().unwrap_err());
    assert_eq!(problems, vec!["channel 'empty' has no bundles".to_string()]);
}

#[test]
fn test_package_without_channels() {
    let mut cfg = minimal_config();
    cfg.channels.clear();
    cfg.bundles.clear();

    let problems = validation_problems(convert_to_model(&cfg).unwrap().validate().unwrap_err());
    assert!(problems.contains(&"package 'api-operator' has no channels".to_string()));
    assert!(problems.contains(&"default channel 'foo' not found in package 'api-operator'".to_string()));
}

#[test]
fn test_channel_without_name() {
    let mut cfg = minimal_config();
    cfg.packages[0].default_channel.clear();
    cfg.channels[0].name.clear();

    let problems = validation_problems(convert_to_model(&cfg).unwrap().validate().unwrap_err());
    assert!(problems.contains(&"package 'api-operator' has a channel with no name".to_string()));
    assert!(problems.contains(&"package 'api-operator' has no default channel".to_string()));
}

#[test]
fn test_bundle_without_name() {
    let mut cfg = minimal_config();
    cfg.bundles[0].name.clear();
    cfg.channels[0].entries = vec![entry("", "")];

    let problems = validation_problems(convert_to_model(&cfg).unwrap().validate().unwrap_err());
    assert_eq!(problems, vec!["channel 'foo' has a bundle with no name".to_string()]);
}
