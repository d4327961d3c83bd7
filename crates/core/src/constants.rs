//! Constants used throughout the passport core crate.

use passport_schema::SchemaVersion;

/// Latest supported passport schema version; stamped on serialised documents by default.
pub const LATEST_SCHEMA: SchemaVersion = SchemaVersion::v1_0;

/// Separator between contributions in a disputed merged value.
pub const MERGE_SEPARATOR: &str = ", ";

/// Attribution used when a contributing passport has no data source code.
pub const UNKNOWN_SOURCE: &str = "unknown";

/// PDCI points are divided by this to obtain the 0-10 score.
pub const PDCI_POINTS_PER_UNIT: f64 = 100.0;

/// Upper bound of the PDCI score in points.
pub const PDCI_MAX_POINTS: u32 = 1000;
