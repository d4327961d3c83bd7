//! N→1 passport reconciliation.
//!
//! Each property group is described by a table of [`Property`] descriptors: a name plus a getter
//! and a setter over one concrete sub-object type. Merging walks every table and reconciles the
//! values supplied by each input independently:
//!
//! - no input supplies a value: the property stays unset;
//! - every supplied value is equal: that value is kept verbatim, in its native type;
//! - otherwise every contribution is rendered as `"{value} ({data source code})"` and joined
//!   with `", "`. The data source code itself is joined bare.
//!
//! `other_numbers` is a first-seen ordered union of every input's entries.

use tracing::debug;

use passport_types::Reconciled;
use serde_json::Number;

use crate::constants::{MERGE_SEPARATOR, UNKNOWN_SOURCE};
use crate::identifier::Identifier;
use crate::location::Location;
use crate::passport::PassportRecord;
use crate::taxonomy::{Rank, Taxon, Taxonomy};
use crate::{PassportError, PassportResult};

/// A property value lifted out of its sub-object for comparison.
#[derive(Clone, Debug, PartialEq)]
enum FieldValue {
    Text(String),
    Decimal(Reconciled<Number>),
    Integer(Reconciled<i64>),
    List(Vec<String>),
}

impl FieldValue {
    fn render(&self) -> String {
        match self {
            FieldValue::Text(text) => text.clone(),
            FieldValue::Decimal(value) => value.to_string(),
            FieldValue::Integer(value) => value.to_string(),
            FieldValue::List(items) => items.join(":"),
        }
    }

    /// Values agree when equal; decimals compare numerically so `42` and `42.0` agree.
    fn agrees_with(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (
                FieldValue::Decimal(Reconciled::Value(a)),
                FieldValue::Decimal(Reconciled::Value(b)),
            ) => a == b || (a.as_f64().is_some() && a.as_f64() == b.as_f64()),
            _ => self == other,
        }
    }

    /// The same kind of value, carrying the annotated description.
    fn disputed(&self, annotated: String) -> FieldValue {
        match self {
            FieldValue::Text(_) => FieldValue::Text(annotated),
            FieldValue::Decimal(_) => FieldValue::Decimal(Reconciled::Disputed(annotated)),
            FieldValue::Integer(_) => FieldValue::Integer(Reconciled::Disputed(annotated)),
            FieldValue::List(_) => FieldValue::List(vec![annotated]),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Attribution {
    /// `"{value} ({code})"`
    Annotated,
    /// `"{value}"`
    Bare,
}

type Getter<S> = Box<dyn Fn(&S) -> Option<FieldValue>>;
type Setter<S> = Box<dyn Fn(&mut S, FieldValue)>;

struct Property<S> {
    name: String,
    get: Getter<S>,
    set: Setter<S>,
    attribution: Attribution,
}

impl<S: 'static> Property<S> {
    fn text(
        name: impl Into<String>,
        get: impl Fn(&S) -> Option<&String> + 'static,
        set: impl Fn(&mut S, String) + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            get: Box::new(move |s| get(s).cloned().map(FieldValue::Text)),
            set: Box::new(move |s, value| {
                if let FieldValue::Text(text) = value {
                    set(s, text);
                }
            }),
            attribution: Attribution::Annotated,
        }
    }

    fn decimal(
        name: impl Into<String>,
        get: impl Fn(&S) -> Option<&Reconciled<Number>> + 'static,
        set: impl Fn(&mut S, Reconciled<Number>) + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            get: Box::new(move |s| get(s).cloned().map(FieldValue::Decimal)),
            set: Box::new(move |s, value| {
                if let FieldValue::Decimal(decimal) = value {
                    set(s, decimal);
                }
            }),
            attribution: Attribution::Annotated,
        }
    }

    fn integer(
        name: impl Into<String>,
        get: impl Fn(&S) -> Option<&Reconciled<i64>> + 'static,
        set: impl Fn(&mut S, Reconciled<i64>) + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            get: Box::new(move |s| get(s).cloned().map(FieldValue::Integer)),
            set: Box::new(move |s, value| {
                if let FieldValue::Integer(integer) = value {
                    set(s, integer);
                }
            }),
            attribution: Attribution::Annotated,
        }
    }

    fn list(
        name: impl Into<String>,
        get: impl Fn(&S) -> Option<&Vec<String>> + 'static,
        set: impl Fn(&mut S, Vec<String>) + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            get: Box::new(move |s| get(s).cloned().map(FieldValue::List)),
            set: Box::new(move |s, value| {
                if let FieldValue::List(items) = value {
                    set(s, items);
                }
            }),
            attribution: Attribution::Annotated,
        }
    }

    fn bare(mut self) -> Self {
        self.attribution = Attribution::Bare;
        self
    }
}

/// Generates `Property::text` descriptors for `Option<String>` fields reached by a field path.
macro_rules! text_properties {
    ($ty:ty; $($name:literal => $($field:ident).+),* $(,)?) => {
        vec![
            $(
                Property::<$ty>::text(
                    $name,
                    |s: &$ty| s.$($field).+.as_ref(),
                    |s: &mut $ty, v| s.$($field).+ = Some(v),
                ),
            )*
        ]
    };
}

fn passport_properties() -> Vec<Property<PassportRecord>> {
    let mut properties = vec![Property::text(
        "data_source",
        |p: &PassportRecord| p.data_source.code.as_ref(),
        |p: &mut PassportRecord, v| p.data_source.code = Some(v),
    )
    .bare()];

    properties.extend(text_properties! { PassportRecord;
        "data_source_kind" => data_source.kind,
        "retrieval_date" => data_source.retrieval_date,
        "institute_code" => accession.institute_code,
        "germplasm_number" => accession.number,
        "field_number" => accession.field_number,
        "pui" => accession.pui,
        "url" => accession.url,
        "germplasm_name" => germplasm_name,
        "crop_name" => crop_name,
        "acquisition_date" => acquisition_date,
        "collection_date" => collection_date,
        "bio_status" => bio_status,
        "collection_source" => collection_source,
        "ancest" => ancest,
        "remarks.collection" => remarks.collection,
        "remarks.genebank_management" => remarks.genebank_management,
        "breeder_institute_code" => breeder_institute_code,
        "breeder_institute_description" => breeder_institute_description,
        "germplasm_storage_type" => germplasm_storage_type,
        "mls_status" => mls_status,
        "pedigree" => pedigree,
    });

    properties.push(Property::list(
        "save_dup_sites",
        |p: &PassportRecord| p.save_dup_sites.as_ref(),
        |p: &mut PassportRecord, v| p.save_dup_sites = Some(v),
    ));
    properties
}

fn taxonomy_properties() -> Vec<Property<Taxonomy>> {
    let mut properties = Vec::with_capacity(Rank::ALL.len() * 2 + 1);
    for rank in Rank::ALL {
        properties.push(Property::text(
            rank.as_str(),
            move |t: &Taxonomy| t.ranks.get(&rank).map(|taxon| &taxon.name),
            move |t: &mut Taxonomy, name| {
                t.ranks
                    .entry(rank)
                    .and_modify(|taxon| taxon.name.clone_from(&name))
                    .or_insert(Taxon { name, author: None });
            },
        ));
        properties.push(Property::text(
            format!("{rank}_author"),
            move |t: &Taxonomy| t.ranks.get(&rank).and_then(|taxon| taxon.author.as_ref()),
            move |t: &mut Taxonomy, author| {
                if let Some(taxon) = t.ranks.get_mut(&rank) {
                    taxon.author = Some(author);
                }
            },
        ));
    }
    properties.push(Property::text(
        "ncbi_taxon",
        |t: &Taxonomy| t.ncbi_taxon.as_ref(),
        |t: &mut Taxonomy, v| t.ncbi_taxon = Some(v),
    ));
    properties
}

fn location_properties() -> Vec<Property<Location>> {
    let mut properties = text_properties! { Location;
        "country" => country,
        "state" => state,
        "province" => province,
        "municipality" => municipality,
        "island" => island,
        "site" => site,
        "other" => other,
        "georef_method" => georef_method,
        "coord_uncertainty" => coord_uncertainty,
        "coord_spatial_reference" => coord_spatial_reference,
    };
    properties.push(Property::decimal(
        "latitude",
        |l: &Location| l.latitude.as_ref(),
        |l: &mut Location, v| l.latitude = Some(v),
    ));
    properties.push(Property::decimal(
        "longitude",
        |l: &Location| l.longitude.as_ref(),
        |l: &mut Location, v| l.longitude = Some(v),
    ));
    properties.push(Property::integer(
        "altitude",
        |l: &Location| l.altitude.as_ref(),
        |l: &mut Location, v| l.altitude = Some(v),
    ));
    properties
}

fn identifier_properties() -> Vec<Property<Identifier>> {
    text_properties! { Identifier;
        "institute_code" => institute_code,
        "number" => number,
        "field_number" => field_number,
        "pui" => pui,
        "url" => url,
    }
}

/// Reconcile the values supplied for one property; `None` when no input supplied one.
fn reconcile<S>(property: &Property<S>, supplied: Vec<(FieldValue, &str)>) -> Option<FieldValue> {
    let (first, _) = supplied.first()?;
    if supplied.iter().all(|(value, _)| value.agrees_with(first)) {
        return Some(first.clone());
    }

    let annotated = supplied
        .iter()
        .map(|(value, code)| match property.attribution {
            Attribution::Annotated => format!("{} ({code})", value.render()),
            Attribution::Bare => value.render(),
        })
        .collect::<Vec<_>>()
        .join(MERGE_SEPARATOR);
    debug!(property = %property.name, %annotated, "sources disagree");
    Some(first.disputed(annotated))
}

fn merge_group<S>(sources: &[(&S, &str)], merged: &mut S, properties: &[Property<S>]) {
    for property in properties {
        let supplied = sources
            .iter()
            .filter_map(|(source, code)| (property.get)(*source).map(|value| (value, *code)))
            .collect::<Vec<_>>();
        if let Some(value) = reconcile(property, supplied) {
            (property.set)(merged, value);
        }
    }
}

fn source_code(passport: &PassportRecord) -> &str {
    passport.data_source.code().unwrap_or(UNKNOWN_SOURCE)
}

/// Merge passports that describe the same physical accession into one representative record.
///
/// A single passport is returned as is. The caller guarantees all inputs describe the same
/// accession; no identity check is made here.
///
/// # Errors
///
/// Returns [`PassportError::MergeInput`] if `passports` is empty.
pub fn merge(mut passports: Vec<PassportRecord>) -> PassportResult<PassportRecord> {
    if passports.len() <= 1 {
        return passports.pop().ok_or(PassportError::MergeInput);
    }

    let mut merged = PassportRecord::new();

    let sources: Vec<_> = passports.iter().map(|p| (p, source_code(p))).collect();
    merge_group(&sources, &mut merged, &passport_properties());

    let sources: Vec<_> = passports
        .iter()
        .map(|p| (&p.taxonomy, source_code(p)))
        .collect();
    merge_group(&sources, &mut merged.taxonomy, &taxonomy_properties());

    let sources: Vec<_> = passports
        .iter()
        .map(|p| (&p.location, source_code(p)))
        .collect();
    merge_group(&sources, &mut merged.location, &location_properties());

    let identifiers = identifier_properties();
    let sources: Vec<_> = passports.iter().map(|p| (&p.donor, source_code(p))).collect();
    merge_group(&sources, &mut merged.donor, &identifiers);

    let sources: Vec<_> = passports
        .iter()
        .map(|p| (&p.collection, source_code(p)))
        .collect();
    merge_group(&sources, &mut merged.collection, &identifiers);

    for other in passports.iter().flat_map(|p| p.other_numbers.iter()) {
        if !merged
            .other_numbers
            .iter()
            .any(|seen| seen.same_accession(other))
        {
            merged.other_numbers.push(other.clone());
        }
    }

    debug!(
        inputs = passports.len(),
        accession = merged.germplasm_number().unwrap_or_default(),
        "merged passports"
    );
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn passport(source: &str, extra: Value) -> PassportRecord {
        let mut doc = json!({
            "version": "1.0",
            "dataSource": {"code": source},
            "germplasmNumber": {"instituteCode": "ESP004", "germplasmNumber": "BGE1"},
        });
        if let (Some(doc), Some(extra)) = (doc.as_object_mut(), extra.as_object()) {
            doc.extend(extra.clone());
        }
        PassportRecord::from_document(&doc, true).expect("valid passport")
    }

    fn other_numbers(numbers: &[&str]) -> Value {
        json!({
            "otherNumbers": numbers
                .iter()
                .map(|n| json!({"instituteCode": "FRA001", "germplasmNumber": n}))
                .collect::<Vec<_>>()
        })
    }

    #[test]
    fn empty_input_is_an_error() {
        let err = merge(Vec::new()).unwrap_err();
        assert!(matches!(err, PassportError::MergeInput));
        assert_eq!(err.to_string(), "no input passports");
    }

    #[test]
    fn single_input_is_returned_unchanged() {
        let p = passport("S1", json!({"cropName": "alfalfa"}));
        assert_eq!(merge(vec![p.clone()]).unwrap(), p);
    }

    #[test]
    fn agreement_is_kept_regardless_of_order() {
        let a = passport("S1", json!({"cropName": "alfalfa", "pedigree": "x"}));
        let b = passport("S2", json!({"cropName": "alfalfa"}));

        for inputs in [vec![a.clone(), b.clone()], vec![b, a]] {
            let merged = merge(inputs).unwrap();
            assert_eq!(merged.crop_name(), Some("alfalfa"));
            assert_eq!(merged.pedigree(), Some("x"));
            assert_eq!(merged.accession_key(), Some(("ESP004", "BGE1")));
        }
    }

    #[test]
    fn disagreement_is_annotated_in_input_order() {
        let a = passport("S1", json!({"germplasmName": "v1"}));
        let b = passport("S2", json!({"germplasmName": "v2"}));
        let merged = merge(vec![a, b]).unwrap();
        assert_eq!(merged.germplasm_name(), Some("v1 (S1), v2 (S2)"));
        assert_eq!(merged.data_source().code(), Some("S1, S2"));
    }

    #[test]
    fn missing_source_code_is_attributed_to_unknown() {
        let a = passport("S1", json!({"cropName": "alfalfa"}));
        let mut b = PassportRecord::new();
        b.set_crop_name("lucerne").unwrap();
        let merged = merge(vec![a, b]).unwrap();
        assert_eq!(merged.crop_name(), Some("alfalfa (S1), lucerne (unknown)"));
        assert_eq!(merged.data_source().code(), Some("S1"));
    }

    #[test]
    fn other_numbers_are_unioned_in_first_seen_order() {
        let a = passport("S1", other_numbers(&["A", "B"]));
        let b = passport("S2", other_numbers(&["B", "C"]));
        let merged = merge(vec![a, b]).unwrap();
        let numbers: Vec<_> = merged
            .other_numbers()
            .iter()
            .filter_map(Identifier::number)
            .collect();
        assert_eq!(numbers, vec!["A", "B", "C"]);
    }

    #[test]
    fn disputed_coordinates_become_annotated_strings() {
        let a = passport(
            "S1",
            json!({"collectionSite": {"latitude": 42.15, "longitude": -1.13, "altitude": 350}}),
        );
        let b = passport(
            "S2",
            json!({"collectionSite": {"latitude": 42.2, "longitude": -1.13, "altitude": 350}}),
        );
        let merged = merge(vec![a, b]).unwrap();
        let location = merged.location();
        assert_eq!(
            location.latitude(),
            Some(&Reconciled::Disputed("42.15 (S1), 42.2 (S2)".to_string()))
        );
        assert_eq!(location.longitude_degrees(), Some(-1.13));
        assert_eq!(location.altitude(), Some(&Reconciled::Value(350)));

        let doc = merged.to_document().unwrap();
        assert_eq!(doc["collectionSite"]["latitude"], json!("42.15 (S1), 42.2 (S2)"));
        assert_eq!(doc["collectionSite"]["longitude"], json!(-1.13));
    }

    #[test]
    fn integral_and_decimal_coordinates_agree() {
        let a = passport("S1", json!({"collectionSite": {"latitude": 42, "longitude": -1}}));
        let b = passport("S2", json!({"collectionSite": {"latitude": 42.0, "longitude": -1.0}}));
        let merged = merge(vec![a, b]).unwrap();

        let doc = merged.to_document().unwrap();
        assert_eq!(doc["collectionSite"]["latitude"], json!(42));
        assert_eq!(doc["collectionSite"]["longitude"], json!(-1));
    }

    #[test]
    fn other_numbers_union_matches_on_accession_only() {
        let a = passport("S1", other_numbers(&["A"]));
        let b = passport(
            "S2",
            json!({"otherNumbers": [
                {"instituteCode": "FRA001", "germplasmNumber": "A", "url": "https://example.org/A"}
            ]}),
        );
        let merged = merge(vec![a, b]).unwrap();
        assert_eq!(merged.other_numbers().len(), 1);
        assert_eq!(merged.other_numbers()[0].url(), None);
    }

    #[test]
    fn sub_objects_merge_independently() {
        let a = passport(
            "S1",
            json!({
                "taxonomy": {"genus": {"name": "Medicago"}, "species": {"name": "sativa", "author": "L."}},
                "donor": {"instituteCode": "ESP027"},
                "collectionNumber": {"germplasmNumber": "C-1"}
            }),
        );
        let b = passport(
            "S2",
            json!({
                "taxonomy": {"genus": {"name": "Medicago"}, "species": {"name": "falcata"}},
                "donor": {"germplasmNumber": "D-9"},
                "collectionNumber": {"germplasmNumber": "C-1"}
            }),
        );
        let merged = merge(vec![a, b]).unwrap();
        let taxonomy = merged.taxonomy();
        assert_eq!(taxonomy.name(Rank::Genus), Some("Medicago"));
        assert_eq!(taxonomy.name(Rank::Species), Some("sativa (S1), falcata (S2)"));
        assert_eq!(taxonomy.author(Rank::Species), Some("L."));
        assert_eq!(merged.donor().institute_code(), Some("ESP027"));
        assert_eq!(merged.donor().number(), Some("D-9"));
        assert_eq!(merged.collection().number(), Some("C-1"));
    }

    #[test]
    fn saved_duplicates_disagreement_is_one_annotated_entry() {
        let a = passport("S1", json!({"locationOfSavedDuplicates": ["NOR051", "GBR004"]}));
        let b = passport("S2", json!({"locationOfSavedDuplicates": ["NOR051"]}));
        let merged = merge(vec![a, b]).unwrap();
        assert_eq!(
            merged.save_dup_sites(),
            Some(&["NOR051:GBR004 (S1), NOR051 (S2)".to_string()][..])
        );
    }
}
