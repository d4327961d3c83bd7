//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core operations.
//! Nothing in the core reads environment variables while validating, merging or scoring.

use crate::constants::LATEST_SCHEMA;
use crate::{PassportError, PassportResult};
use passport_schema::SchemaVersion;

/// Core configuration resolved at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoreConfig {
    schema_version: SchemaVersion,
    strict_dates: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            schema_version: LATEST_SCHEMA,
            strict_dates: true,
        }
    }
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(schema_version: SchemaVersion, strict_dates: bool) -> Self {
        Self {
            schema_version,
            strict_dates,
        }
    }

    /// Schema version stamped onto serialised documents.
    pub fn schema_version(&self) -> SchemaVersion {
        self.schema_version
    }

    /// Whether malformed acquisition/collection dates are errors (`true`) or warnings.
    pub fn strict_dates(&self) -> bool {
        self.strict_dates
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the schema version from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the latest supported schema.
pub fn schema_version_from_env_value(value: Option<String>) -> PassportResult<SchemaVersion> {
    let parsed = non_blank(value)
        .map(|v| v.parse::<SchemaVersion>())
        .transpose()?;

    Ok(parsed.unwrap_or(LATEST_SCHEMA))
}

/// Parse the strict-dates flag from an optional string value.
///
/// If `value` is `None` or empty/whitespace, dates are strict.
pub fn strict_dates_from_env_value(value: Option<String>) -> PassportResult<bool> {
    match non_blank(value).map(|v| v.to_ascii_lowercase()).as_deref() {
        None | Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(PassportError::InvalidConfig(format!(
            "strict dates flag must be a boolean, got '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_fall_back_to_defaults() {
        assert_eq!(schema_version_from_env_value(None).unwrap(), LATEST_SCHEMA);
        assert_eq!(
            schema_version_from_env_value(Some("  ".into())).unwrap(),
            LATEST_SCHEMA
        );
        assert!(strict_dates_from_env_value(None).unwrap());
        assert!(strict_dates_from_env_value(Some(String::new())).unwrap());
    }

    #[test]
    fn parses_explicit_values() {
        assert_eq!(
            schema_version_from_env_value(Some("1.0".into())).unwrap(),
            SchemaVersion::v1_0
        );
        assert!(!strict_dates_from_env_value(Some("False".into())).unwrap());
        assert!(strict_dates_from_env_value(Some("on".into())).unwrap());
    }

    #[test]
    fn rejects_invalid_values() {
        let err = schema_version_from_env_value(Some("3.1".into())).unwrap_err();
        assert!(matches!(err, PassportError::Validation(_)));

        let err = strict_dates_from_env_value(Some("maybe".into())).unwrap_err();
        assert!(matches!(err, PassportError::InvalidConfig(msg) if msg.contains("maybe")));
    }

    #[test]
    fn default_is_latest_and_strict() {
        let config = CoreConfig::default();
        assert_eq!(config.schema_version(), LATEST_SCHEMA);
        assert!(config.strict_dates());
    }
}
