//! Field tags for schema 1.0 documents.
//!
//! Tags must match the wire format byte for byte; they are shared with collaborators that
//! produce and consume passport documents.

pub const VERSION: &str = "version";
pub const DATA_SOURCE: &str = "dataSource";
pub const GERMPLASM_NUMBER: &str = "germplasmNumber";
pub const TAXONOMY: &str = "taxonomy";
pub const OTHER_NUMBERS: &str = "otherNumbers";
pub const COLLECTION_NUMBER: &str = "collectionNumber";
pub const COLLECTION_SITE: &str = "collectionSite";
pub const ACQUISITION_DATE: &str = "acquisitionDate";
pub const COLLECTION_DATE: &str = "collectionDate";
pub const BIOLOGICAL_STATUS: &str = "biologicalStatusOfAccessionCode";
pub const COLLECTION_SOURCE: &str = "collectionSource";
pub const MLS_STATUS: &str = "mlsStatus";

// Identifier keys.
pub const INSTITUTE_CODE: &str = "instituteCode";
pub const NUMBER: &str = "germplasmNumber";

// Data source keys.
pub const DATA_SOURCE_KIND: &str = "kind";
pub const RETRIEVAL_DATE: &str = "retrievalDate";

/// Format of `dataSource.retrievalDate`.
pub const RETRIEVAL_DATE_FORMAT: &str = "%Y-%m-%d";

/// Earliest (exclusive) year accepted in acquisition and collection dates.
pub const MIN_PASSPORT_YEAR: i32 = 1800;
