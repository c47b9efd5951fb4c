use std::io;

use fbcgen::error::Error;

#[test]
fn test_error_conversion() {
    let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();
    assert!(matches!(err, Error::IoError(_)));

    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err: Error = json_err.into();
    assert!(matches!(err, Error::JsonError(_)));
}

#[test]
fn test_error_display() {
    let err = Error::ConfigError("invalid config".to_string());
    assert_eq!(err.to_string(), "Configuration error: invalid config");

    let err = Error::CatalogShapeError {
        kind: "bundle",
        count: 2,
    };
    assert_eq!(err.to_string(), "Expected exactly one bundle, found 2");

    let err = Error::ValidationError(vec!["first".to_string(), "second".to_string()]);
    assert_eq!(err.to_string(), "Validation error: first; second");

    let err = Error::RenderError {
        image: "quay.io/org/op:1.0.0".to_string(),
        reason: "no tag".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Failed to render bundle image 'quay.io/org/op:1.0.0': no tag"
    );
}
