//! The passport record: the typed view of one accession's passport as reported by one data source.
//!
//! A record is built in one of two ways:
//! - [`PassportRecord::from_document`] validates a raw document against its schema version and
//!   deep-copies it into owned sub-objects;
//! - [`PassportRecord::new`] plus the field setters, used by bulk import paths. Setters enforce
//!   field-level rules (no empty values, known codes, species author requires species) but do not
//!   run the full schema.
//!
//! [`PassportRecord::to_document`] serialises back into the nested document, omitting empty
//! sub-objects and stamping `version` whenever anything is populated.

use chrono::NaiveDate;
use serde_json::Value;

use passport_schema::codes;
use passport_schema::v1_0::{constants as tags, wire};
use passport_schema::{read_passport, SchemaVersion, VersionedPassport};
use passport_types::NonEmptyText;

use crate::constants::LATEST_SCHEMA;
use crate::identifier::Identifier;
use crate::location::Location;
use crate::taxonomy::Taxonomy;
use crate::{pdci, PassportError, PassportResult};

/// Origin of a passport.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DataSource {
    pub(crate) code: Option<String>,
    pub(crate) kind: Option<String>,
    pub(crate) retrieval_date: Option<String>,
}

impl DataSource {
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn retrieval_date(&self) -> Option<&str> {
        self.retrieval_date.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_none() && self.kind.is_none() && self.retrieval_date.is_none()
    }
}

/// Allowed remark keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemarkKey {
    Collection,
    GenebankManagement,
}

impl RemarkKey {
    pub const ALL: [RemarkKey; 2] = [RemarkKey::Collection, RemarkKey::GenebankManagement];

    pub fn as_str(self) -> &'static str {
        match self {
            RemarkKey::Collection => "collection",
            RemarkKey::GenebankManagement => "genebank_management",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Remarks {
    pub(crate) collection: Option<String>,
    pub(crate) genebank_management: Option<String>,
}

impl Remarks {
    pub fn get(&self, key: RemarkKey) -> Option<&str> {
        match key {
            RemarkKey::Collection => self.collection.as_deref(),
            RemarkKey::GenebankManagement => self.genebank_management.as_deref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.collection.is_none() && self.genebank_management.is_none()
    }

    /// Populated remarks in key order.
    pub fn iter(&self) -> impl Iterator<Item = (RemarkKey, &str)> {
        RemarkKey::ALL
            .into_iter()
            .filter_map(move |key| self.get(key).map(|value| (key, value)))
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PassportRecord {
    pub(crate) data_source: DataSource,
    pub(crate) accession: Identifier,
    pub(crate) germplasm_name: Option<String>,
    pub(crate) crop_name: Option<String>,
    pub(crate) taxonomy: Taxonomy,
    pub(crate) donor: Identifier,
    pub(crate) other_numbers: Vec<Identifier>,
    pub(crate) collection: Identifier,
    pub(crate) location: Location,
    pub(crate) acquisition_date: Option<String>,
    pub(crate) collection_date: Option<String>,
    pub(crate) bio_status: Option<String>,
    pub(crate) collection_source: Option<String>,
    pub(crate) ancest: Option<String>,
    pub(crate) remarks: Remarks,
    pub(crate) breeder_institute_code: Option<String>,
    pub(crate) breeder_institute_description: Option<String>,
    pub(crate) germplasm_storage_type: Option<String>,
    pub(crate) mls_status: Option<String>,
    pub(crate) save_dup_sites: Option<Vec<String>>,
    pub(crate) pedigree: Option<String>,
}

macro_rules! text_fields {
    ($($field:ident => $setter:ident),* $(,)?) => {
        $(
            pub fn $field(&self) -> Option<&str> {
                self.$field.as_deref()
            }

            pub fn $setter(&mut self, value: impl Into<String>) -> PassportResult<()> {
                self.$field = Some(self.non_empty(stringify!($field), value)?);
                Ok(())
            }
        )*
    };
}

impl PassportRecord {
    /// An empty record, to be populated through setters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `document` and build a record from it.
    ///
    /// `raise_if_error` is forwarded to the validator and only affects date checks.
    ///
    /// # Errors
    ///
    /// Returns [`PassportError::Validation`] with the validator's error unmodified.
    pub fn from_document(document: &Value, raise_if_error: bool) -> PassportResult<Self> {
        match read_passport(document, raise_if_error)? {
            VersionedPassport::v1_0(wire) => Ok(Self::from_wire(wire)),
        }
    }

    /// Build a record from a document that is only checked structurally (closed schema and
    /// value types), skipping the version envelope and semantic checks.
    ///
    /// # Errors
    ///
    /// Returns [`PassportError::Validation`] if the document does not fit the wire model.
    pub fn from_document_unvalidated(document: &Value) -> PassportResult<Self> {
        let wire: wire::Passport = serde_json::from_value(document.clone()).map_err(|e| {
            let accession = document
                .get(tags::GERMPLASM_NUMBER)
                .and_then(|id| id.get(tags::NUMBER))
                .and_then(Value::as_str)
                .unwrap_or_default();
            PassportError::validation(accession, e.to_string())
        })?;
        Ok(Self::from_wire(wire))
    }

    /// Serialise to the nested document shape for the latest schema version.
    ///
    /// # Errors
    ///
    /// Returns [`PassportError::Serialization`] if the document can not be encoded.
    pub fn to_document(&self) -> PassportResult<Value> {
        self.to_document_as(LATEST_SCHEMA)
    }

    /// Serialise to the nested document shape, stamping `version` when the record is populated.
    ///
    /// # Errors
    ///
    /// Returns [`PassportError::Serialization`] if the document can not be encoded.
    pub fn to_document_as(&self, version: SchemaVersion) -> PassportResult<Value> {
        let mut document = match version {
            SchemaVersion::v1_0 => self.to_wire(),
        };
        if document != wire::Passport::default() {
            document.version = Some(version.as_str().to_string());
        }
        serde_json::to_value(&document).map_err(PassportError::Serialization)
    }

    fn from_wire(wire: wire::Passport) -> Self {
        let data_source = wire
            .data_source
            .map(|ds| DataSource {
                code: ds.code,
                kind: ds.kind,
                retrieval_date: ds.retrieval_date,
            })
            .unwrap_or_default();
        let remarks = wire
            .remarks
            .map(|r| Remarks {
                collection: r.collection,
                genebank_management: r.genebank_management,
            })
            .unwrap_or_default();

        Self {
            data_source,
            accession: wire.germplasm_number.map(Identifier::from_wire).unwrap_or_default(),
            germplasm_name: wire.germplasm_name,
            crop_name: wire.crop_name,
            taxonomy: wire.taxonomy.map(Taxonomy::from_wire).unwrap_or_default(),
            donor: wire.donor.map(Identifier::from_wire).unwrap_or_default(),
            other_numbers: wire
                .other_numbers
                .unwrap_or_default()
                .into_iter()
                .map(Identifier::from_wire)
                .collect(),
            collection: wire.collection_number.map(Identifier::from_wire).unwrap_or_default(),
            location: wire.collection_site.map(Location::from_wire).unwrap_or_default(),
            acquisition_date: wire.acquisition_date,
            collection_date: wire.collection_date,
            bio_status: wire.biological_status,
            collection_source: wire.collection_source,
            ancest: wire.ancestral_data,
            remarks,
            breeder_institute_code: wire.breeder_institute_code,
            breeder_institute_description: wire.breeder_institute_description,
            germplasm_storage_type: wire.germplasm_storage_type,
            mls_status: wire.mls_status,
            save_dup_sites: wire.location_of_saved_duplicates,
            pedigree: wire.pedigree,
        }
    }

    fn to_wire(&self) -> wire::Passport {
        wire::Passport {
            version: None,
            data_source: (!self.data_source.is_empty()).then(|| wire::DataSource {
                code: self.data_source.code.clone(),
                kind: self.data_source.kind.clone(),
                retrieval_date: self.data_source.retrieval_date.clone(),
            }),
            germplasm_number: self.accession.to_wire_if_populated(),
            germplasm_name: self.germplasm_name.clone(),
            crop_name: self.crop_name.clone(),
            taxonomy: self.taxonomy.to_wire_if_populated(),
            donor: self.donor.to_wire_if_populated(),
            other_numbers: (!self.other_numbers.is_empty())
                .then(|| self.other_numbers.iter().map(Identifier::to_wire).collect()),
            collection_number: self.collection.to_wire_if_populated(),
            collection_site: self.location.to_wire_if_populated(),
            acquisition_date: self.acquisition_date.clone(),
            collection_date: self.collection_date.clone(),
            biological_status: self.bio_status.clone(),
            collection_source: self.collection_source.clone(),
            ancestral_data: self.ancest.clone(),
            remarks: (!self.remarks.is_empty()).then(|| wire::Remarks {
                collection: self.remarks.collection.clone(),
                genebank_management: self.remarks.genebank_management.clone(),
            }),
            breeder_institute_code: self.breeder_institute_code.clone(),
            breeder_institute_description: self.breeder_institute_description.clone(),
            germplasm_storage_type: self.germplasm_storage_type.clone(),
            mls_status: self.mls_status.clone(),
            location_of_saved_duplicates: self.save_dup_sites.clone(),
            pedigree: self.pedigree.clone(),
        }
    }

    /// Accession number for error context, `""` when not yet set.
    fn accession_context(&self) -> &str {
        self.accession.number().unwrap_or_default()
    }

    fn invalid(&self, reason: impl Into<String>) -> PassportError {
        PassportError::validation(self.accession_context(), reason)
    }

    fn non_empty(&self, field: &str, value: impl Into<String>) -> PassportResult<String> {
        NonEmptyText::new(value)
            .map(NonEmptyText::into_inner)
            .map_err(|e| self.invalid(format!("{field}: {e}")))
    }

    /// Re-attach accession context to errors raised by sub-object setters.
    fn with_context<T>(&self, result: PassportResult<T>) -> PassportResult<T> {
        result.map_err(|err| match err {
            PassportError::Validation(inner) if inner.accession().is_empty() => {
                self.invalid(inner.reason())
            }
            other => other,
        })
    }

    text_fields! {
        germplasm_name => set_germplasm_name,
        crop_name => set_crop_name,
        ancest => set_ancest,
        breeder_institute_code => set_breeder_institute_code,
        breeder_institute_description => set_breeder_institute_description,
        germplasm_storage_type => set_germplasm_storage_type,
        pedigree => set_pedigree,
    }

    pub fn data_source(&self) -> &DataSource {
        &self.data_source
    }

    pub fn accession(&self) -> &Identifier {
        &self.accession
    }

    pub fn institute_code(&self) -> Option<&str> {
        self.accession.institute_code()
    }

    pub fn germplasm_number(&self) -> Option<&str> {
        self.accession.number()
    }

    /// `(institute_code, number)` of the accession, once both are set.
    pub fn accession_key(&self) -> Option<(&str, &str)> {
        self.institute_code().zip(self.germplasm_number())
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn donor(&self) -> &Identifier {
        &self.donor
    }

    pub fn other_numbers(&self) -> &[Identifier] {
        &self.other_numbers
    }

    pub fn collection(&self) -> &Identifier {
        &self.collection
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn acquisition_date(&self) -> Option<&str> {
        self.acquisition_date.as_deref()
    }

    pub fn collection_date(&self) -> Option<&str> {
        self.collection_date.as_deref()
    }

    pub fn bio_status(&self) -> Option<&str> {
        self.bio_status.as_deref()
    }

    pub fn collection_source(&self) -> Option<&str> {
        self.collection_source.as_deref()
    }

    pub fn remarks(&self) -> &Remarks {
        &self.remarks
    }

    pub fn mls_status(&self) -> Option<&str> {
        self.mls_status.as_deref()
    }

    pub fn save_dup_sites(&self) -> Option<&[String]> {
        self.save_dup_sites.as_deref()
    }

    /// Passport Data Completeness Index of this record.
    pub fn pdci(&self) -> f64 {
        pdci::calculate_pdci(self)
    }

    /// `true` when no field at all is populated.
    pub fn is_empty(&self) -> bool {
        let texts = [
            &self.germplasm_name,
            &self.crop_name,
            &self.acquisition_date,
            &self.collection_date,
            &self.bio_status,
            &self.collection_source,
            &self.ancest,
            &self.breeder_institute_code,
            &self.breeder_institute_description,
            &self.germplasm_storage_type,
            &self.mls_status,
            &self.pedigree,
        ];
        texts.iter().all(|text| text.is_none())
            && self.data_source.is_empty()
            && self.accession.is_empty()
            && self.taxonomy.is_empty()
            && self.donor.is_empty()
            && self.other_numbers.is_empty()
            && self.collection.is_empty()
            && self.location.is_empty()
            && self.remarks.is_empty()
            && self.save_dup_sites.is_none()
    }

    pub fn set_data_source_code(&mut self, code: impl Into<String>) -> PassportResult<()> {
        self.data_source.code = Some(self.non_empty("data_source.code", code)?);
        Ok(())
    }

    /// # Errors
    ///
    /// Fails if no data source code is set yet or `kind` is not a known data source kind.
    pub fn set_data_source_kind(&mut self, kind: impl Into<String>) -> PassportResult<()> {
        if self.data_source.code.is_none() {
            return Err(self.invalid("data_source.kind requires data_source.code"));
        }
        let kind = kind.into();
        if !codes::is_data_source_kind(&kind) {
            return Err(self.invalid(format!("'{kind}' is not a known data source kind")));
        }
        self.data_source.kind = Some(kind);
        Ok(())
    }

    /// # Errors
    ///
    /// Fails if no data source code is set yet or `date` is not `YYYY-MM-DD`.
    pub fn set_retrieval_date(&mut self, date: impl Into<String>) -> PassportResult<()> {
        if self.data_source.code.is_none() {
            return Err(self.invalid("data_source.retrieval_date requires data_source.code"));
        }
        let date = date.into();
        if NaiveDate::parse_from_str(&date, tags::RETRIEVAL_DATE_FORMAT).is_err() {
            return Err(self.invalid(format!("retrieval date '{date}' is not YYYY-MM-DD")));
        }
        self.data_source.retrieval_date = Some(date);
        Ok(())
    }

    pub fn set_institute_code(&mut self, value: impl Into<String>) -> PassportResult<()> {
        let result = self.accession.set_institute_code(value);
        self.with_context(result)
    }

    pub fn set_germplasm_number(&mut self, value: impl Into<String>) -> PassportResult<()> {
        let result = self.accession.set_number(value);
        self.with_context(result)
    }

    pub fn set_pui(&mut self, value: impl Into<String>) -> PassportResult<()> {
        let result = self.accession.set_pui(value);
        self.with_context(result)
    }

    pub fn set_url(&mut self, value: impl Into<String>) -> PassportResult<()> {
        let result = self.accession.set_url(value);
        self.with_context(result)
    }

    /// Apply a fallible edit to the taxonomy, attaching accession context to its errors.
    pub fn edit_taxonomy<F>(&mut self, edit: F) -> PassportResult<()>
    where
        F: FnOnce(&mut Taxonomy) -> PassportResult<()>,
    {
        let result = edit(&mut self.taxonomy);
        self.with_context(result)
    }

    pub fn edit_donor<F>(&mut self, edit: F) -> PassportResult<()>
    where
        F: FnOnce(&mut Identifier) -> PassportResult<()>,
    {
        let result = edit(&mut self.donor);
        self.with_context(result)
    }

    pub fn edit_collection<F>(&mut self, edit: F) -> PassportResult<()>
    where
        F: FnOnce(&mut Identifier) -> PassportResult<()>,
    {
        let result = edit(&mut self.collection);
        self.with_context(result)
    }

    pub fn edit_location<F>(&mut self, edit: F) -> PassportResult<()>
    where
        F: FnOnce(&mut Location) -> PassportResult<()>,
    {
        let result = edit(&mut self.location);
        self.with_context(result)
    }

    /// Append an alternate identifier. Callers avoid duplicates.
    ///
    /// # Errors
    ///
    /// Fails if the identifier has no number.
    pub fn add_other_number(&mut self, identifier: Identifier) -> PassportResult<()> {
        if identifier.number().is_none() {
            return Err(self.invalid("other number entries require a number"));
        }
        self.other_numbers.push(identifier);
        Ok(())
    }

    /// # Errors
    ///
    /// Fails unless `date` is an 8-character `YYYYMMDD` string (trailing dashes allowed).
    pub fn set_acquisition_date(&mut self, date: impl Into<String>) -> PassportResult<()> {
        self.acquisition_date = Some(self.passport_date("acquisition_date", date.into())?);
        Ok(())
    }

    pub fn set_collection_date(&mut self, date: impl Into<String>) -> PassportResult<()> {
        self.collection_date = Some(self.passport_date("collection_date", date.into())?);
        Ok(())
    }

    fn passport_date(&self, field: &str, date: String) -> PassportResult<String> {
        if date.chars().count() != 8 {
            return Err(self.invalid(format!("{field} '{date}' must be YYYYMMDD")));
        }
        Ok(date)
    }

    pub fn set_bio_status(&mut self, code: impl Into<String>) -> PassportResult<()> {
        let code = code.into();
        if codes::biological_status(&code).is_none() {
            return Err(self.invalid(format!("'{code}' is not a known biological status")));
        }
        self.bio_status = Some(code);
        Ok(())
    }

    pub fn set_collection_source(&mut self, code: impl Into<String>) -> PassportResult<()> {
        let code = code.into();
        if codes::collection_source(&code).is_none() {
            return Err(self.invalid(format!("'{code}' is not a known collection source")));
        }
        self.collection_source = Some(code);
        Ok(())
    }

    pub fn set_remark(&mut self, key: RemarkKey, value: impl Into<String>) -> PassportResult<()> {
        let value = Some(self.non_empty(key.as_str(), value)?);
        match key {
            RemarkKey::Collection => self.remarks.collection = value,
            RemarkKey::GenebankManagement => self.remarks.genebank_management = value,
        }
        Ok(())
    }

    pub fn set_mls_status(&mut self, status: impl Into<String>) -> PassportResult<()> {
        let status = status.into();
        if !matches!(status.as_str(), "Y" | "N") {
            return Err(self.invalid(format!("mls_status must be 'Y' or 'N', got '{status}'")));
        }
        self.mls_status = Some(status);
        Ok(())
    }

    pub fn set_save_dup_sites(&mut self, sites: Vec<String>) -> PassportResult<()> {
        if sites.is_empty() {
            return Err(self.invalid("save_dup_sites: list cannot be empty"));
        }
        let sites = sites
            .into_iter()
            .map(|site| self.non_empty("save_dup_sites", site))
            .collect::<PassportResult<Vec<_>>>()?;
        self.save_dup_sites = Some(sites);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::Rank;
    use serde_json::json;

    fn sample_document() -> Value {
        json!({
            "version": "1.0",
            "dataSource": {"code": "CRF", "kind": "genebank", "retrievalDate": "2021-03-04"},
            "germplasmNumber": {"instituteCode": "ESP004", "germplasmNumber": "BGE001234", "url": "https://example.org/BGE001234"},
            "germplasmName": "Alfalfa de Aragón",
            "cropName": "alfalfa",
            "taxonomy": {
                "genus": {"name": "Medicago"},
                "species": {"name": "sativa", "author": "L."},
                "ncbiTaxon": "NCBITaxon:3879"
            },
            "donor": {"instituteCode": "ESP027", "germplasmNumber": "D-88"},
            "otherNumbers": [
                {"instituteCode": "FRA001", "germplasmNumber": "F-12"},
                {"germplasmNumber": "LOCAL-9"}
            ],
            "collectionNumber": {"germplasmNumber": "C-3", "instituteCode": "ESP004"},
            "collectionSite": {
                "countryOfOriginCode": "ESP",
                "province": "Zaragoza",
                "site": "2 km N of Ejea",
                "latitude": 42.15,
                "longitude": -1.13,
                "altitude": 350,
                "coordSpatialReference": "WGS84"
            },
            "acquisitionDate": "19860512",
            "collectionDate": "198605--",
            "biologicalStatusOfAccessionCode": "300",
            "collectionSource": "21",
            "ancestralData": "local population",
            "remarks": {"collection": "irrigated field", "genebank_management": "regenerated 2004"},
            "germplasmStorageType": "13",
            "mlsStatus": "Y",
            "locationOfSavedDuplicates": ["NOR051", "GBR004"],
            "pedigree": "unknown"
        })
    }

    #[test]
    fn document_round_trips() {
        let doc = sample_document();
        let record = PassportRecord::from_document(&doc, true).expect("valid document");
        assert_eq!(record.to_document().unwrap(), doc);
    }

    #[test]
    fn whole_number_coordinates_round_trip() {
        let mut doc = sample_document();
        doc["collectionSite"]["latitude"] = json!(42);
        doc["collectionSite"]["longitude"] = json!(-1);
        let record = PassportRecord::from_document(&doc, true).expect("valid document");
        assert_eq!(record.location().latitude_degrees(), Some(42.0));
        assert_eq!(record.to_document().unwrap(), doc);
    }

    #[test]
    fn record_does_not_alias_source_document() {
        let mut doc = sample_document();
        let record = PassportRecord::from_document(&doc, true).unwrap();
        doc["cropName"] = json!("wheat");
        assert_eq!(record.crop_name(), Some("alfalfa"));
    }

    #[test]
    fn validation_errors_propagate_unmodified() {
        let doc = json!({"version": "1.0", "germplasmNumber": {"germplasmNumber": "X"}});
        let err = PassportRecord::from_document(&doc, true).unwrap_err();
        assert_eq!(
            err.to_string(),
            "X: missing required key 'germplasmNumber.instituteCode'"
        );
    }

    #[test]
    fn empty_record_serialises_to_empty_document() {
        assert_eq!(PassportRecord::new().to_document().unwrap(), json!({}));
    }

    #[test]
    fn version_is_stamped_on_populated_records() {
        let mut record = PassportRecord::new();
        record.set_crop_name("maize").unwrap();
        assert_eq!(
            record.to_document().unwrap(),
            json!({"version": "1.0", "cropName": "maize"})
        );
    }

    #[test]
    fn empty_sub_objects_are_omitted() {
        let mut record = PassportRecord::new();
        record.set_institute_code("ESP004").unwrap();
        record.set_germplasm_number("BGE1").unwrap();
        let doc = record.to_document().unwrap();
        let keys: Vec<_> = doc.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["germplasmNumber".to_string(), "version".to_string()]);
    }

    #[test]
    fn setters_enforce_field_rules() {
        let mut record = PassportRecord::new();
        record.set_germplasm_number("BGE1").unwrap();

        let err = record.set_retrieval_date("2020-01-01").unwrap_err();
        assert_eq!(
            err.to_string(),
            "BGE1: data_source.retrieval_date requires data_source.code"
        );
        assert!(record.set_data_source_kind("genebank").is_err());

        record.set_data_source_code("CRF").unwrap();
        record.set_data_source_kind("genebank").unwrap();
        record.set_retrieval_date("2020-01-01").unwrap();
        assert!(record.set_retrieval_date("01/01/2020").is_err());

        assert!(record.set_bio_status("301").is_err());
        assert!(record.set_collection_source("77").is_err());
        assert!(record.set_mls_status("yes").is_err());
        assert!(record.set_crop_name("").is_err());
        assert!(record.set_acquisition_date("1986").is_err());
        assert!(record.set_save_dup_sites(vec![]).is_err());
        assert!(record.add_other_number(Identifier::default()).is_err());
    }

    #[test]
    fn species_author_requires_species_with_context() {
        let mut record = PassportRecord::new();
        record.set_germplasm_number("BGE1").unwrap();
        let err = record
            .edit_taxonomy(|t| t.set_author(Rank::Species, "L."))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "BGE1: species author can not be set without species name"
        );
    }

    #[test]
    fn unvalidated_path_skips_semantic_checks() {
        let doc = json!({"germplasmNumber": {"germplasmNumber": "X"}, "biologicalStatusOfAccessionCode": "301"});
        let record = PassportRecord::from_document_unvalidated(&doc).expect("structurally valid");
        assert_eq!(record.bio_status(), Some("301"));

        let doc = json!({"germplasmNumber": {"germplasmNumber": "X"}, "colour": "red"});
        let err = PassportRecord::from_document_unvalidated(&doc).unwrap_err();
        assert!(err.to_string().starts_with("X: "));
    }

    #[test]
    fn any_populated_field_makes_a_record_non_empty() {
        assert!(PassportRecord::new().is_empty());

        let mut record = PassportRecord::new();
        record.edit_donor(|d| d.set_url("https://example.org/donor")).unwrap();
        assert!(!record.is_empty());
        assert_eq!(
            record.to_document().unwrap()["donor"]["url"],
            json!("https://example.org/donor")
        );
    }

    #[test]
    fn records_differing_in_descriptive_identifiers_are_unequal() {
        let mut a = PassportRecord::new();
        a.set_institute_code("ESP004").unwrap();
        a.set_germplasm_number("BGE1").unwrap();
        let mut b = a.clone();
        a.set_pui("doi:a").unwrap();
        b.set_pui("doi:b").unwrap();
        assert_ne!(a, b);

        b.set_pui("doi:a").unwrap();
        assert_eq!(a, b);
        b.edit_collection(|c| c.set_field_number("F-1")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn accession_key_needs_both_parts() {
        let mut record = PassportRecord::new();
        record.set_institute_code("ESP004").unwrap();
        assert_eq!(record.accession_key(), None);
        record.set_germplasm_number("BGE1").unwrap();
        assert_eq!(record.accession_key(), Some(("ESP004", "BGE1")));
    }
}
