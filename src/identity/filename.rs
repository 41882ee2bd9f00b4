//! Filename → identity parsing.

use std::fmt;

use thiserror::Error;

/// Identity derived from a configuration filename.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigIdentity {
    /// Main configuration id (the part before the first hyphen).
    pub primary_id: String,
    /// Instance discriminator for factory-style configurations.
    pub secondary_id: Option<String>,
}

impl ConfigIdentity {
    /// Whether this identity names a factory instance.
    pub fn is_factory(&self) -> bool {
        self.secondary_id.is_some()
    }
}

impl fmt::Display for ConfigIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.secondary_id {
            Some(secondary) => write!(f, "{}-{}", self.primary_id, secondary),
            None => f.write_str(&self.primary_id),
        }
    }
}

/// The filename has no usable `<id>.<ext>` shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed configuration filename `{0}`: expected <id>[-<instance>].<ext>")]
pub struct MalformedFilename(pub String);

/// Parse a filename (no directory part) into a configuration identity.
///
/// The final extension is stripped, then the stem is split at its first
/// hyphen. A hyphen in the very first position does not split, so
/// `-foo.json` names the primary id `-foo`.
pub fn parse_identity(filename: &str) -> Result<ConfigIdentity, MalformedFilename> {
    let stem = match filename.rfind('.') {
        Some(dot) => &filename[..dot],
        None => return Err(MalformedFilename(filename.to_string())),
    };
    if stem.is_empty() {
        return Err(MalformedFilename(filename.to_string()));
    }

    match stem.find('-') {
        Some(hyphen) if hyphen > 0 => Ok(ConfigIdentity {
            primary_id: stem[..hyphen].to_string(),
            secondary_id: Some(stem[hyphen + 1..].to_string()),
        }),
        _ => Ok(ConfigIdentity {
            primary_id: stem.to_string(),
            secondary_id: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singleton_identity() {
        let id = parse_identity("foo.json").unwrap();
        assert_eq!(id.primary_id, "foo");
        assert_eq!(id.secondary_id, None);
        assert!(!id.is_factory());
    }

    #[test]
    fn test_factory_identity() {
        let id = parse_identity("foo-bar.json").unwrap();
        assert_eq!(id.primary_id, "foo");
        assert_eq!(id.secondary_id.as_deref(), Some("bar"));
        assert!(id.is_factory());
    }

    #[test]
    fn test_split_at_first_hyphen_only() {
        let id = parse_identity("foo-bar-baz.json").unwrap();
        assert_eq!(id.primary_id, "foo");
        assert_eq!(id.secondary_id.as_deref(), Some("bar-baz"));
        assert_eq!(id.to_string(), "foo-bar-baz");
    }

    #[test]
    fn test_only_final_extension_stripped() {
        let id = parse_identity("org.example.service.json").unwrap();
        assert_eq!(id.primary_id, "org.example.service");
    }

    #[test]
    fn test_leading_hyphen_does_not_split() {
        let id = parse_identity("-foo.json").unwrap();
        assert_eq!(id.primary_id, "-foo");
        assert_eq!(id.secondary_id, None);
    }

    #[test]
    fn test_missing_extension_is_malformed() {
        assert_eq!(
            parse_identity("foo"),
            Err(MalformedFilename("foo".to_string()))
        );
    }

    #[test]
    fn test_empty_stem_is_malformed() {
        assert!(parse_identity(".json").is_err());
    }
}
