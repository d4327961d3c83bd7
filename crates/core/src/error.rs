use passport_schema::SchemaError;

#[derive(Debug, thiserror::Error)]
pub enum PassportError {
    /// Schema or field-level violation, propagated unmodified from the validator.
    #[error(transparent)]
    Validation(#[from] SchemaError),
    #[error("no input passports")]
    MergeInput,
    /// A composite flat-row column could not be decoded.
    #[error("{accession}: {reason}")]
    FlatRow { accession: String, reason: String },
    #[error("failed to serialize passport: {0}")]
    Serialization(serde_json::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PassportError {
    pub(crate) fn validation(accession: &str, reason: impl Into<String>) -> Self {
        PassportError::Validation(SchemaError::Validation {
            accession: accession.to_string(),
            reason: reason.into(),
        })
    }
}

pub type PassportResult<T> = std::result::Result<T, PassportError>;
