//! Germplasm identifiers.
//!
//! One shape serves the accession's own identifier, the donor, the collection number and every
//! "other number". Equality compares every field; [`Identifier::same_accession`] compares only the
//! `(institute_code, number)` pair that names a germplasm.

use passport_schema::v1_0::wire;
use passport_types::NonEmptyText;

use crate::{PassportError, PassportResult};

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Identifier {
    pub(crate) institute_code: Option<String>,
    pub(crate) number: Option<String>,
    pub(crate) field_number: Option<String>,
    pub(crate) pui: Option<String>,
    pub(crate) url: Option<String>,
}

fn text(field: &str, value: impl Into<String>) -> PassportResult<String> {
    NonEmptyText::new(value)
        .map(String::from)
        .map_err(|e| PassportError::validation("", format!("{field}: {e}")))
}

impl Identifier {
    /// Identifier with both institute code and number set.
    pub fn new(institute_code: impl Into<String>, number: impl Into<String>) -> PassportResult<Self> {
        Ok(Self {
            institute_code: Some(text("institute_code", institute_code)?),
            number: Some(text("number", number)?),
            ..Self::default()
        })
    }

    pub fn institute_code(&self) -> Option<&str> {
        self.institute_code.as_deref()
    }

    pub fn number(&self) -> Option<&str> {
        self.number.as_deref()
    }

    pub fn field_number(&self) -> Option<&str> {
        self.field_number.as_deref()
    }

    pub fn pui(&self) -> Option<&str> {
        self.pui.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn set_institute_code(&mut self, value: impl Into<String>) -> PassportResult<()> {
        self.institute_code = Some(text("institute_code", value)?);
        Ok(())
    }

    pub fn set_number(&mut self, value: impl Into<String>) -> PassportResult<()> {
        self.number = Some(text("number", value)?);
        Ok(())
    }

    pub fn set_field_number(&mut self, value: impl Into<String>) -> PassportResult<()> {
        self.field_number = Some(text("field_number", value)?);
        Ok(())
    }

    pub fn set_pui(&mut self, value: impl Into<String>) -> PassportResult<()> {
        self.pui = Some(text("pui", value)?);
        Ok(())
    }

    pub fn set_url(&mut self, value: impl Into<String>) -> PassportResult<()> {
        self.url = Some(text("url", value)?);
        Ok(())
    }

    /// Both identifiers name the same germplasm: their `(institute_code, number)` pairs match.
    pub fn same_accession(&self, other: &Identifier) -> bool {
        self.institute_code == other.institute_code && self.number == other.number
    }

    /// An identifier is populated when any of its fields is set.
    pub fn is_empty(&self) -> bool {
        self.institute_code.is_none()
            && self.number.is_none()
            && self.field_number.is_none()
            && self.pui.is_none()
            && self.url.is_none()
    }

    pub(crate) fn from_wire(wire: wire::Identifier) -> Self {
        Self {
            institute_code: wire.institute_code,
            number: wire.germplasm_number,
            field_number: wire.field_collection_number,
            pui: wire.germplasm_pui,
            url: wire.url,
        }
    }

    pub(crate) fn to_wire(&self) -> wire::Identifier {
        wire::Identifier {
            institute_code: self.institute_code.clone(),
            germplasm_number: self.number.clone(),
            field_collection_number: self.field_number.clone(),
            germplasm_pui: self.pui.clone(),
            url: self.url.clone(),
        }
    }

    /// `None` when empty, so empty sub-objects are omitted from documents.
    pub(crate) fn to_wire_if_populated(&self) -> Option<wire::Identifier> {
        (!self.is_empty()).then(|| self.to_wire())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_accession_ignores_descriptive_fields() {
        let mut a = Identifier::new("ESP004", "BGE1").unwrap();
        let mut b = Identifier::new("ESP004", "BGE1").unwrap();
        a.set_url("https://a.example").unwrap();
        b.set_pui("doi:10.1/b").unwrap();
        assert!(a.same_accession(&b));
        assert_ne!(a, b);

        let c = Identifier::new("ESP027", "BGE1").unwrap();
        assert!(!a.same_accession(&c));
    }

    #[test]
    fn equality_compares_every_field() {
        let mut a = Identifier::new("ESP004", "BGE1").unwrap();
        let mut b = a.clone();
        a.set_pui("doi:a").unwrap();
        b.set_pui("doi:b").unwrap();
        assert_ne!(a, b);

        b.set_pui("doi:a").unwrap();
        assert_eq!(a, b);
        a.set_field_number("F-1").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn setters_reject_empty_values() {
        let mut id = Identifier::default();
        assert!(id.set_number("").is_err());
        assert!(Identifier::new(" ", "1").is_err());
        assert!(id.is_empty());
    }

    #[test]
    fn empty_identifier_is_omitted_from_wire() {
        assert!(Identifier::default().to_wire_if_populated().is_none());

        let mut id = Identifier::default();
        id.set_field_number("F-7").unwrap();
        let wire = id.to_wire_if_populated().expect("populated");
        assert_eq!(wire.field_collection_number.as_deref(), Some("F-7"));
    }
}
