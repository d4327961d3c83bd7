//! Passport document wire/boundary support.
//!
//! This crate owns the JSON-compatible passport document: the exact field tags, the strict wire
//! structs per schema version, the immutable code tables the document refers to, and the schema
//! validator that runs before a document is accepted as a passport record.
//!
//! Domain meaning (record accessors, merging, scoring) lives in `passport-core`. This crate handles
//! document shape and standards alignment only.

pub mod codes;
pub mod v1_0;

use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::v1_0::constants as tags;

/// Errors returned by the `passport-schema` boundary crate.
///
/// Every failure surfaces as a single validation kind carrying the accession number (empty when
/// it could not be derived from the document) and a human-readable reason.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("{accession}: {reason}")]
    Validation { accession: String, reason: String },
}

impl SchemaError {
    /// Accession number the failing document carried, or `""`.
    pub fn accession(&self) -> &str {
        match self {
            SchemaError::Validation { accession, .. } => accession,
        }
    }

    /// Human-readable reason for the failure.
    pub fn reason(&self) -> &str {
        match self {
            SchemaError::Validation { reason, .. } => reason,
        }
    }
}

/// Type alias for Results that can fail with a [`SchemaError`].
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Internal cause of a validation failure.
///
/// A broken contract (wrong type, unknown code, empty value) and a missing required key are
/// structurally different, but callers only ever see [`SchemaError::Validation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Violation {
    Contract(String),
    MissingKey(String),
}

impl Violation {
    pub(crate) fn contract(reason: impl Into<String>) -> Self {
        Violation::Contract(reason.into())
    }

    pub(crate) fn into_error(self, accession: &str) -> SchemaError {
        let reason = match self {
            Violation::Contract(reason) => reason,
            Violation::MissingKey(key) => format!("missing required key '{key}'"),
        };
        SchemaError::Validation {
            accession: accession.to_string(),
            reason,
        }
    }
}

/// Supported passport schema versions.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SchemaVersion {
    v1_0,
}

impl SchemaVersion {
    /// The version string as written in the document's `version` field.
    pub fn as_str(self) -> &'static str {
        match self {
            SchemaVersion::v1_0 => "1.0",
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaVersion {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1.0" => Ok(SchemaVersion::v1_0),
            other => Err(SchemaError::Validation {
                accession: String::new(),
                reason: format!("unsupported schema version '{other}'"),
            }),
        }
    }
}

/// A validated passport document, tagged by the schema version it was written against.
#[allow(non_camel_case_types)]
#[derive(Clone, Debug, PartialEq)]
pub enum VersionedPassport {
    v1_0(v1_0::Passport),
}

/// Best-effort accession number for error context.
fn accession_hint(document: &Value) -> String {
    document
        .get(tags::GERMPLASM_NUMBER)
        .and_then(|id| id.get(tags::NUMBER))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Check the keys every version of the document must carry: `version` and the accession
/// identifier with string `germplasmNumber` and `instituteCode`.
fn check_envelope(document: &Value) -> Result<SchemaVersion, Violation> {
    let map = document
        .as_object()
        .ok_or_else(|| Violation::contract("passport document must be a mapping"))?;

    let version = map
        .get(tags::VERSION)
        .ok_or_else(|| Violation::MissingKey(tags::VERSION.to_string()))?
        .as_str()
        .ok_or_else(|| Violation::contract("version must be a string"))?;

    let accession = map
        .get(tags::GERMPLASM_NUMBER)
        .ok_or_else(|| Violation::MissingKey(tags::GERMPLASM_NUMBER.to_string()))?
        .as_object()
        .ok_or_else(|| Violation::contract("germplasmNumber must be a mapping"))?;

    for key in [tags::NUMBER, tags::INSTITUTE_CODE] {
        let value = accession
            .get(key)
            .ok_or_else(|| Violation::MissingKey(format!("{}.{key}", tags::GERMPLASM_NUMBER)))?;
        if !value.is_string() {
            return Err(Violation::contract(format!(
                "{}.{key} must be a string",
                tags::GERMPLASM_NUMBER
            )));
        }
    }

    version.parse::<SchemaVersion>().map_err(|err| Violation::contract(err.reason()))
}

/// Validate a raw passport document and return its typed wire form.
///
/// `raise_if_error` only governs the acquisition/collection date checks: when `false`, a
/// malformed date is logged as a warning and the document is still accepted. Every other
/// violation is always an error.
///
/// # Errors
///
/// Returns [`SchemaError::Validation`] if:
/// - the document is not a mapping or lacks `version` or the accession identifier,
/// - the accession identifier lacks a string `germplasmNumber` or `instituteCode`,
/// - the version is not supported,
/// - any version-specific structural or semantic check fails.
pub fn read_passport(document: &Value, raise_if_error: bool) -> SchemaResult<VersionedPassport> {
    let accession = accession_hint(document);
    let version = check_envelope(document).map_err(|v| v.into_error(&accession))?;

    match version {
        SchemaVersion::v1_0 => v1_0::validate(document, raise_if_error)
            .map(VersionedPassport::v1_0)
            .map_err(|v| v.into_error(&accession)),
    }
}

/// Validate a raw passport document without keeping the parsed result.
///
/// # Errors
///
/// See [`read_passport`].
pub fn validate_passport_data(document: &Value, raise_if_error: bool) -> SchemaResult<()> {
    read_passport(document, raise_if_error).map(|_| ())
}
