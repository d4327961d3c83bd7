//! Schema 1.0 wire model.
//!
//! Notes:
//! - This is a wire model: field names and nesting follow the document exactly.
//! - Every struct uses `#[serde(deny_unknown_fields)]`, so the schema is closed at every level.
//! - Optional fields are `Option<T>` and are omitted on serialisation when unset.

use passport_types::Reconciled;
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Top-level passport document.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Passport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<DataSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub germplasm_number: Option<Identifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub germplasm_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxonomy: Option<Taxonomy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donor: Option<Identifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_numbers: Option<Vec<Identifier>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_number: Option<Identifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_site: Option<CollectionSite>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquisition_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_date: Option<String>,
    #[serde(
        rename = "biologicalStatusOfAccessionCode",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub biological_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ancestral_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<Remarks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breeder_institute_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breeder_institute_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub germplasm_storage_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mls_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_of_saved_duplicates: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pedigree: Option<String>,
}

/// Origin of the passport.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct DataSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieval_date: Option<String>,
}

/// Accession, donor, collection and "other number" identifiers share one shape.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Identifier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institute_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub germplasm_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_collection_number: Option<String>,
    #[serde(rename = "germplasmPUI", default, skip_serializing_if = "Option::is_none")]
    pub germplasm_pui: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// One taxonomic rank entry.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Taxon {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// Taxonomy keyed by rank.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Taxonomy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<Taxon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genus: Option<Taxon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<Taxon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subspecies: Option<Taxon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variety: Option<Taxon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub convarietas: Option<Taxon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<Taxon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forma: Option<Taxon>,
    #[serde(rename = "ncbiTaxon", default, skip_serializing_if = "Option::is_none")]
    pub ncbi_taxon: Option<String>,
}

impl Taxonomy {
    /// Rank entries in fixed order, most general first.
    pub fn ranks(&self) -> [(&'static str, Option<&Taxon>); 8] {
        [
            ("family", self.family.as_ref()),
            ("genus", self.genus.as_ref()),
            ("species", self.species.as_ref()),
            ("subspecies", self.subspecies.as_ref()),
            ("variety", self.variety.as_ref()),
            ("convarietas", self.convarietas.as_ref()),
            ("group", self.group.as_ref()),
            ("forma", self.forma.as_ref()),
        ]
    }
}

/// Collection site.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CollectionSite {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_of_origin_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub municipality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub island: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_location: Option<String>,
    /// Kept as the submitted number so `42` is not rewritten as `42.0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<Reconciled<Number>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<Reconciled<Number>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<Reconciled<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub georef_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coord_uncertainty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coord_spatial_reference: Option<String>,
}

/// Free-text remarks.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Remarks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genebank_management: Option<String>,
}
