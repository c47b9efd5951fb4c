//! Common constants used throughout fbcgen.

/// Supported configuration file names, tried in order
pub const CONFIG_FILES: [&str; 3] = ["fbc.json", "fbc.yml", "fbc.yaml"];

pub const SCHEMA_PACKAGE: &str = "olm.package";
pub const SCHEMA_CHANNEL: &str = "olm.channel";
pub const SCHEMA_BUNDLE: &str = "olm.bundle";

pub const PROPERTY_PACKAGE: &str = "olm.package";
pub const PROPERTY_PACKAGE_REQUIRED: &str = "olm.package.required";
pub const PROPERTY_GVK: &str = "olm.gvk";
pub const PROPERTY_GVK_REQUIRED: &str = "olm.gvk.required";
pub const PROPERTY_CSV_METADATA: &str = "olm.csv.metadata";

/// Bundle annotation holding the package name
pub const ANNOTATION_PACKAGE: &str = "operators.operatorframework.io.bundle.package.v1";

pub const DEFAULT_BUNDLE_IMAGE: &str = "quay.io/rashmigottipati/api-operator:1.0.1";
pub const DEFAULT_PACKAGE: &str = "api-operator";
pub const DEFAULT_CHANNEL: &str = "foo";
pub const DEFAULT_CHANNEL_ENTRY: &str = "api-operator.v1.0.1";
pub const DEFAULT_DESCRIPTION: &str = "foo";
pub const DEFAULT_FBC_DIR: &str = "testdata";
pub const DEFAULT_FBC_FILE: &str = "testFBC";
