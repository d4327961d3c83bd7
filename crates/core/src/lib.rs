//! # Passport Core
//!
//! Domain logic for genebank passport records.
//!
//! This crate contains the pure, in-memory operations over passports:
//! - [`PassportRecord`]: the typed record, built from a validated document or through setters
//! - [`merge`]: reconcile passports from several data sources into one representative record
//! - [`calculate_pdci`]: the Passport Data Completeness Index
//! - [`to_flat_row`] / [`from_flat_row`]: the MCPD flat column mapping
//!
//! **No I/O concerns**: file formats, persistence and grouping passports by accession belong to
//! the caller (see the `passport` CLI).

pub mod config;
pub mod constants;
pub mod error;
pub mod flat;
pub mod identifier;
pub mod location;
pub mod merge;
pub mod passport;
pub mod pdci;
pub mod taxonomy;

pub use config::CoreConfig;
pub use error::{PassportError, PassportResult};
pub use flat::{from_flat_row, to_flat_row, FlatRow, COLUMNS};
pub use identifier::Identifier;
pub use location::Location;
pub use merge::merge;
pub use passport::{DataSource, PassportRecord, RemarkKey, Remarks};
pub use pdci::calculate_pdci;
pub use taxonomy::{Rank, Taxon, Taxonomy};

pub use passport_schema::{validate_passport_data, SchemaError, SchemaVersion};
pub use passport_types::{NonEmptyText, Reconciled};
