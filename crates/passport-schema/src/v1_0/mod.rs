//! Passport schema 1.0 wire support.
//!
//! This module implements the 1.0 specific wire structs and the validation rules applied to a
//! raw 1.0 document before it becomes a passport record.

pub mod constants;
mod validation;
pub mod wire;

pub(crate) use validation::validate;
pub use wire::{CollectionSite, DataSource, Identifier, Passport, Remarks, Taxon, Taxonomy};
