//! Shared primitives for passport records.
//!
//! These types sit below both the wire schema and the domain crate so neither has to depend on
//! the other for basic guarantees such as "present values are never empty".

use std::fmt;

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("text cannot be empty")]
    Empty,
}

/// A string type that guarantees non-empty content.
///
/// Passport documents reject "present but empty" values everywhere, so every text setter in the
/// domain crate funnels through this type. Unlike a trimmed identifier the content is kept
/// verbatim: a site description with a leading space must survive a document round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` if the input is empty or contains only whitespace.
    pub fn new(input: impl Into<String>) -> Result<Self, TextError> {
        let input = input.into();
        if input.trim().is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(input))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the owned string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<NonEmptyText> for String {
    fn from(text: NonEmptyText) -> Self {
        text.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(s).map_err(serde::de::Error::custom)
    }
}

/// A field value after reconciliation across data sources.
///
/// When every source agrees the native value is kept (`Value`). When sources disagree the
/// field carries the annotated description instead (`Disputed`), e.g.
/// `"40.1 (CRF), 40.2 (EURISCO)"`. Serialisation writes the bare number or the string.
///
/// Deserialisation only accepts the native type: disputed values are produced by the merge
/// engine, never read back from a submitted document.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciled<T> {
    /// All contributing sources agreed on this value.
    Value(T),
    /// Sources disagreed; the annotated description of every contribution.
    Disputed(String),
}

impl<T> Reconciled<T> {
    /// Returns the native value when the field is not disputed.
    pub fn value(&self) -> Option<&T> {
        match self {
            Reconciled::Value(v) => Some(v),
            Reconciled::Disputed(_) => None,
        }
    }

    /// Returns `true` when sources disagreed on this field.
    pub fn is_disputed(&self) -> bool {
        matches!(self, Reconciled::Disputed(_))
    }
}

impl<T> From<T> for Reconciled<T> {
    fn from(value: T) -> Self {
        Reconciled::Value(value)
    }
}

impl<T: fmt::Display> fmt::Display for Reconciled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reconciled::Value(v) => v.fmt(f),
            Reconciled::Disputed(s) => f.write_str(s),
        }
    }
}

impl<T: serde::Serialize> serde::Serialize for Reconciled<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Reconciled::Value(v) => v.serialize(serializer),
            Reconciled::Disputed(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de, T: serde::Deserialize<'de>> serde::Deserialize<'de> for Reconciled<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Reconciled::Value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_rejects_blank_input() {
        assert_eq!(NonEmptyText::new(""), Err(TextError::Empty));
        assert_eq!(NonEmptyText::new("   "), Err(TextError::Empty));
    }

    #[test]
    fn non_empty_text_keeps_content_verbatim() {
        let text = NonEmptyText::new(" Sierra Nevada").expect("valid text");
        assert_eq!(text.as_str(), " Sierra Nevada");
    }

    #[test]
    fn reconciled_serialises_native_or_annotated() {
        let agreed: Reconciled<f64> = Reconciled::Value(37.5);
        let disputed: Reconciled<f64> = Reconciled::Disputed("37.5 (A), 37.6 (B)".into());

        assert_eq!(serde_json::to_value(&agreed).unwrap(), serde_json::json!(37.5));
        assert_eq!(
            serde_json::to_value(&disputed).unwrap(),
            serde_json::json!("37.5 (A), 37.6 (B)")
        );
    }

    #[test]
    fn reconciled_only_deserialises_native_type() {
        let parsed: Reconciled<i64> = serde_json::from_value(serde_json::json!(600)).unwrap();
        assert_eq!(parsed, Reconciled::Value(600));

        let err = serde_json::from_value::<Reconciled<i64>>(serde_json::json!("600 (A)"));
        assert!(err.is_err());
    }
}
