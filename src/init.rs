//! Package initialization: builds the `olm.package` blob of a catalog.

use crate::constants::SCHEMA_PACKAGE;
use crate::declcfg::Package;
use crate::error::{Error, Result};
use log::debug;
use std::io::Read;

/// Inputs for a new `olm.package` blob.
pub struct PackageInit {
    pub package: String,
    pub default_channel: String,
    pub description_reader: Option<Box<dyn Read>>,
}

impl PackageInit {
    /// Builds the package blob, consuming the description reader.
    ///
    /// # Errors
    /// * `Error::PackageInitError` if the package name is empty
    /// * `Error::IoError` if the description cannot be read
    pub fn run(self) -> Result<Package> {
        if self.package.trim().is_empty() {
            return Err(Error::PackageInitError("package name must be set".to_string()));
        }

        let mut description = String::new();
        if let Some(mut reader) = self.description_reader {
            reader.read_to_string(&mut description)?;
        }
        debug!(
            "Initialized package '{}' with default channel '{}'",
            self.package, self.default_channel
        );

        Ok(Package {
            schema: SCHEMA_PACKAGE.to_string(),
            name: self.package,
            default_channel: self.default_channel,
            description,
            properties: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_empty_description_is_omitted() {
        let package = PackageInit {
            package: "api-operator".to_string(),
            default_channel: "foo".to_string(),
            description_reader: None,
        }
        .run()
        .unwrap();

        assert_eq!(package.schema, SCHEMA_PACKAGE);
        let blob = serde_json::to_value(&package).unwrap();
        assert!(blob.get("description").is_none());
    }

    #[test]
    fn test_description_is_read() {
        let package = PackageInit {
            package: "api-operator".to_string(),
            default_channel: "foo".to_string(),
            description_reader: Some(Box::new(Cursor::new("foo"))),
        }
        .run()
        .unwrap();
        assert_eq!(package.description, "foo");
    }

    #[test]
    fn test_blank_package_is_rejected() {
        let result = PackageInit {
            package: "  ".to_string(),
            default_channel: "foo".to_string(),
            description_reader: None,
        }
        .run();
        assert!(matches!(result, Err(Error::PackageInitError(_))));
    }
}
