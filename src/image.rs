//! Container image references of the form `[domain/]path[:tag][@digest]`.

use crate::error::{Error, Result};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

fn path_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<path>[a-z0-9]+(?:(?:\.|_|__|-+)[a-z0-9]+)*(?:/[a-z0-9]+(?:(?:\.|_|__|-+)[a-z0-9]+)*)*)(?::(?P<tag>[\w][\w.-]{0,127}))?(?:@(?P<digest>[A-Za-z][A-Za-z0-9]*(?:[-_+.][A-Za-z][A-Za-z0-9]*)*:[0-9a-fA-F]{32,}))?$",
        )
        .expect("image path pattern is valid")
    })
}

fn domain_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?)*(?::[0-9]+)?$")
            .expect("image domain pattern is valid")
    })
}

/// A parsed bundle image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    pub domain: Option<String>,
    pub path: String,
    pub tag: Option<String>,
    pub digest: Option<String>,
}

impl ImageReference {
    /// Parses an image reference.
    ///
    /// The leading component is only treated as a registry domain when it
    /// contains `.` or `:` or is `localhost`, so `library/nginx` has no domain.
    ///
    /// # Errors
    /// * `Error::ImageReferenceError` if the reference is empty or malformed
    pub fn parse(reference: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::ImageReferenceError {
            reference: reference.to_string(),
            reason: reason.to_string(),
        };

        if reference.trim().is_empty() {
            return Err(invalid("reference is empty"));
        }

        let (domain, remainder) = match reference.split_once('/') {
            Some((first, rest))
                if first.contains('.') || first.contains(':') || first == "localhost" =>
            {
                if !domain_regex().is_match(first) {
                    return Err(invalid("registry domain is malformed"));
                }
                (Some(first.to_string()), rest)
            }
            _ => (None, reference),
        };

        let captures = path_regex()
            .captures(remainder)
            .ok_or_else(|| invalid("repository path, tag or digest is malformed"))?;

        Ok(Self {
            domain,
            path: captures["path"].to_string(),
            tag: captures.name("tag").map(|m| m.as_str().to_string()),
            digest: captures.name("digest").map(|m| m.as_str().to_string()),
        })
    }

    /// Last path component, e.g. `api-operator` for `quay.io/org/api-operator:1.0.1`.
    pub fn repository_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(domain) = &self.domain {
            write!(f, "{domain}/")?;
        }
        write!(f, "{}", self.path)?;
        if let Some(tag) = &self.tag {
            write!(f, ":{tag}")?;
        }
        if let Some(digest) = &self.digest {
            write!(f, "@{digest}")?;
        }
        Ok(())
    }
}
