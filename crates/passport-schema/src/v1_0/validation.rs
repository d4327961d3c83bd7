//! Schema 1.0 validation.
//!
//! Validation runs in three passes over the raw document:
//! 1. a recursive walk rejecting any present-but-empty value,
//! 2. strict deserialisation into the closed wire model (unknown keys, wrong types),
//! 3. semantic checks against the code tables and the cross-field invariants.

use chrono::{Datelike, NaiveDate, Utc};
use serde_json::Value;

use super::constants as tags;
use super::wire::{CollectionSite, DataSource, Identifier, Passport, Taxonomy};
use crate::codes;
use crate::Violation;

/// Validate a 1.0 document whose envelope (version and accession identifier) was already
/// checked, returning the typed wire form.
pub(crate) fn validate(document: &Value, raise_if_error: bool) -> Result<Passport, Violation> {
    check_no_empty_fields(document, "")?;

    let passport = match serde_path_to_error::deserialize::<_, Passport>(document) {
        Ok(parsed) => parsed,
        Err(err) => {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() || path == "." {
                "<root>"
            } else {
                path.as_str()
            };
            return Err(Violation::contract(format!(
                "passport schema mismatch at {path}: {source}"
            )));
        }
    };

    if let Some(data_source) = &passport.data_source {
        check_data_source(data_source)?;
    }
    if let Some(taxonomy) = &passport.taxonomy {
        check_taxonomy(taxonomy)?;
    }
    if let Some(other_numbers) = &passport.other_numbers {
        check_other_numbers(other_numbers)?;
    }
    if let Some(collection) = &passport.collection_number {
        check_collection_number(collection)?;
    }
    if let Some(site) = &passport.collection_site {
        check_collection_site(site)?;
    }

    for (tag, date) in [
        (tags::ACQUISITION_DATE, passport.acquisition_date.as_deref()),
        (tags::COLLECTION_DATE, passport.collection_date.as_deref()),
    ] {
        let Some(date) = date else { continue };
        if let Err(violation) = check_passport_date(tag, date) {
            if raise_if_error {
                return Err(violation);
            }
            tracing::warn!(
                accession = passport_number(&passport),
                "accepting passport with invalid date: {violation:?}"
            );
        }
    }

    if let Some(status) = passport.biological_status.as_deref() {
        if codes::biological_status(status).is_none() {
            return Err(Violation::contract(format!(
                "{} '{status}' is not a known biological status",
                tags::BIOLOGICAL_STATUS
            )));
        }
    }

    if let Some(source) = passport.collection_source.as_deref() {
        if codes::collection_source(source).is_none() {
            return Err(Violation::contract(format!(
                "{} '{source}' is not a known collection source",
                tags::COLLECTION_SOURCE
            )));
        }
    }

    if let Some(mls) = passport.mls_status.as_deref() {
        if !matches!(mls, "Y" | "N") {
            return Err(Violation::contract(format!(
                "{} must be 'Y' or 'N', got '{mls}'",
                tags::MLS_STATUS
            )));
        }
    }

    Ok(passport)
}

fn passport_number(passport: &Passport) -> &str {
    passport
        .germplasm_number
        .as_ref()
        .and_then(|id| id.germplasm_number.as_deref())
        .unwrap_or_default()
}

/// Reject empty strings, lists, mappings and nulls anywhere in the document.
fn check_no_empty_fields(value: &Value, path: &str) -> Result<(), Violation> {
    let empty = match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                check_no_empty_fields(item, &format!("{path}[{index}]"))?;
            }
            items.is_empty()
        }
        Value::Object(map) => {
            for (key, item) in map {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                check_no_empty_fields(item, &child)?;
            }
            map.is_empty()
        }
        Value::Bool(_) | Value::Number(_) => false,
    };

    if empty {
        let path = if path.is_empty() { "<root>" } else { path };
        return Err(Violation::contract(format!("{path} is empty")));
    }
    Ok(())
}

fn check_data_source(data_source: &DataSource) -> Result<(), Violation> {
    if data_source.code.is_none() {
        if data_source.kind.is_some() {
            return Err(Violation::contract(format!(
                "{}.{} requires {}.code",
                tags::DATA_SOURCE,
                tags::DATA_SOURCE_KIND,
                tags::DATA_SOURCE
            )));
        }
        if data_source.retrieval_date.is_some() {
            return Err(Violation::contract(format!(
                "{}.{} requires {}.code",
                tags::DATA_SOURCE,
                tags::RETRIEVAL_DATE,
                tags::DATA_SOURCE
            )));
        }
    }

    if let Some(kind) = data_source.kind.as_deref() {
        if !codes::is_data_source_kind(kind) {
            return Err(Violation::contract(format!(
                "{}.{} '{kind}' is not one of {:?}",
                tags::DATA_SOURCE,
                tags::DATA_SOURCE_KIND,
                codes::DATA_SOURCE_KINDS
            )));
        }
    }

    if let Some(date) = data_source.retrieval_date.as_deref() {
        NaiveDate::parse_from_str(date, tags::RETRIEVAL_DATE_FORMAT).map_err(|_| {
            Violation::contract(format!(
                "{}.{} '{date}' is not a YYYY-MM-DD date",
                tags::DATA_SOURCE,
                tags::RETRIEVAL_DATE
            ))
        })?;
    }

    Ok(())
}

fn check_taxonomy(taxonomy: &Taxonomy) -> Result<(), Violation> {
    for (rank, taxon) in taxonomy.ranks() {
        if let Some(taxon) = taxon {
            if taxon.author.is_some() && taxon.name.is_none() {
                return Err(Violation::contract(format!(
                    "{}.{rank}: author may only be set together with name",
                    tags::TAXONOMY
                )));
            }
        }
    }
    Ok(())
}

fn check_other_numbers(other_numbers: &[Identifier]) -> Result<(), Violation> {
    for (index, identifier) in other_numbers.iter().enumerate() {
        if identifier.germplasm_number.is_none() {
            return Err(Violation::MissingKey(format!(
                "{}[{index}].{}",
                tags::OTHER_NUMBERS,
                tags::NUMBER
            )));
        }
    }
    Ok(())
}

fn check_collection_number(collection: &Identifier) -> Result<(), Violation> {
    if collection.germplasm_number.is_none()
        && collection.field_collection_number.is_none()
        && collection.institute_code.is_none()
    {
        return Err(Violation::contract(format!(
            "{} needs at least one of number, field number or institute code",
            tags::COLLECTION_NUMBER
        )));
    }
    Ok(())
}

fn check_collection_site(site: &CollectionSite) -> Result<(), Violation> {
    if let Some(country) = site.country_of_origin_code.as_deref() {
        if codes::country_name(country).is_none() {
            return Err(Violation::contract(format!(
                "{}: '{country}' is not a valid country code",
                tags::COLLECTION_SITE
            )));
        }
    }
    Ok(())
}

/// Check an 8-character `YYYYMMDD` date; trailing dashes mark unknown month/day.
fn check_passport_date(tag: &str, date: &str) -> Result<(), Violation> {
    if date.chars().count() != 8 {
        return Err(Violation::contract(format!(
            "{tag} '{date}' must be an 8-character YYYYMMDD string"
        )));
    }

    let year: i32 = date
        .get(..4)
        .and_then(|y| y.parse().ok())
        .ok_or_else(|| Violation::contract(format!("{tag} '{date}' has no valid year")))?;

    let current_year = Utc::now().year();
    if year <= tags::MIN_PASSPORT_YEAR || year > current_year {
        return Err(Violation::contract(format!(
            "{tag} year {year} is outside ({}, {current_year}]",
            tags::MIN_PASSPORT_YEAR
        )));
    }
    Ok(())
}
