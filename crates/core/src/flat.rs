//! Flat row mapping over the MCPD column set.
//!
//! A [`FlatRow`] maps column names to cell text. Encoding writes only populated columns; decoding
//! treats missing and blank cells as unset and builds the record through the field setters, so
//! setter rules (known codes, species author requires species) apply to imported rows. Cell text
//! is kept verbatim, surrounding spaces included; only the space-separated `SUBTAXA` column
//! normalises whitespace.
//!
//! Composite columns:
//!
//! | column       | encoding                                                   |
//! |--------------|------------------------------------------------------------|
//! | `COLLSITE`   | `;`-joined `key:value` over state, province, island, municipality, other, site |
//! | `SUBTAXA`    | space-joined `abbreviation name` per populated subtaxon    |
//! | `SUBTAUTHOR` | author of the lowest populated subtaxon                    |
//! | `OTHERNUMB`  | `;`-joined `institute:number`, institute may be empty      |
//! | `DUPLSITE`   | `:`-joined institute codes                                 |
//! | `REMARKS`    | `;`-joined `key:value`                                     |

use std::collections::BTreeMap;

use serde_json::Number;

use crate::identifier::Identifier;
use crate::passport::{PassportRecord, RemarkKey};
use crate::taxonomy::Rank;
use crate::{PassportError, PassportResult};

pub type FlatRow = BTreeMap<String, String>;

/// Column names in export order.
pub const COLUMNS: [&str; 33] = [
    "PUID",
    "INSTCODE",
    "ACCENUMB",
    "COLLNUMB",
    "COLLCODE",
    "GENUS",
    "SPECIES",
    "SPAUTHOR",
    "SUBTAXA",
    "SUBTAUTHOR",
    "CROPNAME",
    "ACCENAME",
    "ACQDATE",
    "ORIGCTY",
    "COLLSITE",
    "LATITUDE",
    "LONGITUDE",
    "COORDUNCERT",
    "COORDDATUM",
    "GEOREFMETH",
    "ELEVATION",
    "COLLDATE",
    "BREDCODE",
    "SAMPSTAT",
    "ANCEST",
    "COLLSRC",
    "DONORCODE",
    "DONORNUMB",
    "OTHERNUMB",
    "DUPLSITE",
    "STORAGE",
    "MLSSTAT",
    "REMARKS",
];

const PAIR_SEPARATOR: char = ';';
const KEY_VALUE_SEPARATOR: char = ':';
const SITE_KEYS: [&str; 6] = ["state", "province", "island", "municipality", "other", "site"];

type Read = fn(&PassportRecord) -> Option<String>;
type Write = fn(&mut PassportRecord, &str) -> PassportResult<()>;

struct Column {
    name: &'static str,
    read: Read,
    write: Write,
}

/// All columns in decode order: the accession number comes first so later errors carry it, and
/// each taxon comes before its author.
fn columns() -> [Column; 33] {
    [
        Column {
            name: "ACCENUMB",
            read: |r| r.accession.number.clone(),
            write: |r, v| r.set_germplasm_number(v),
        },
        Column {
            name: "INSTCODE",
            read: |r| r.accession.institute_code.clone(),
            write: |r, v| r.set_institute_code(v),
        },
        Column {
            name: "PUID",
            read: |r| r.accession.pui.clone(),
            write: |r, v| r.set_pui(v),
        },
        Column {
            name: "COLLNUMB",
            read: |r| r.collection.number.clone(),
            write: |r, v| r.edit_collection(|c| c.set_number(v)),
        },
        Column {
            name: "COLLCODE",
            read: |r| r.collection.institute_code.clone(),
            write: |r, v| r.edit_collection(|c| c.set_institute_code(v)),
        },
        Column {
            name: "GENUS",
            read: |r| r.taxonomy.name(Rank::Genus).map(str::to_string),
            write: |r, v| r.edit_taxonomy(|t| t.set_name(Rank::Genus, v)),
        },
        Column {
            name: "SPECIES",
            read: |r| r.taxonomy.name(Rank::Species).map(str::to_string),
            write: |r, v| r.edit_taxonomy(|t| t.set_name(Rank::Species, v)),
        },
        Column {
            name: "SPAUTHOR",
            read: |r| r.taxonomy.author(Rank::Species).map(str::to_string),
            write: |r, v| r.edit_taxonomy(|t| t.set_author(Rank::Species, v)),
        },
        Column {
            name: "SUBTAXA",
            read: encode_subtaxa,
            write: decode_subtaxa,
        },
        Column {
            name: "SUBTAUTHOR",
            read: |r| {
                r.taxonomy
                    .lowest_subtaxon()
                    .and_then(|(_, taxon)| taxon.author.clone())
            },
            write: decode_subtaxon_author,
        },
        Column {
            name: "CROPNAME",
            read: |r| r.crop_name.clone(),
            write: |r, v| r.set_crop_name(v),
        },
        Column {
            name: "ACCENAME",
            read: |r| r.germplasm_name.clone(),
            write: |r, v| r.set_germplasm_name(v),
        },
        Column {
            name: "ACQDATE",
            read: |r| r.acquisition_date.clone(),
            write: |r, v| r.set_acquisition_date(v),
        },
        Column {
            name: "ORIGCTY",
            read: |r| r.location.country.clone(),
            write: |r, v| r.edit_location(|l| l.set_country(v)),
        },
        Column {
            name: "COLLSITE",
            read: encode_site,
            write: decode_site,
        },
        Column {
            name: "LATITUDE",
            read: |r| r.location.latitude.as_ref().map(ToString::to_string),
            write: |r, v| {
                let latitude = parse_coordinate(r, "LATITUDE", v)?;
                r.location.set_latitude(latitude);
                Ok(())
            },
        },
        Column {
            name: "LONGITUDE",
            read: |r| r.location.longitude.as_ref().map(ToString::to_string),
            write: |r, v| {
                let longitude = parse_coordinate(r, "LONGITUDE", v)?;
                r.location.set_longitude(longitude);
                Ok(())
            },
        },
        Column {
            name: "COORDUNCERT",
            read: |r| r.location.coord_uncertainty.clone(),
            write: |r, v| r.edit_location(|l| l.set_coord_uncertainty(v)),
        },
        Column {
            name: "COORDDATUM",
            read: |r| r.location.coord_spatial_reference.clone(),
            write: |r, v| r.edit_location(|l| l.set_coord_spatial_reference(v)),
        },
        Column {
            name: "GEOREFMETH",
            read: |r| r.location.georef_method.clone(),
            write: |r, v| r.edit_location(|l| l.set_georef_method(v)),
        },
        Column {
            name: "ELEVATION",
            read: |r| r.location.altitude.as_ref().map(ToString::to_string),
            write: |r, v| {
                let altitude = parse_number(r, "ELEVATION", v)?;
                r.location.set_altitude(altitude);
                Ok(())
            },
        },
        Column {
            name: "COLLDATE",
            read: |r| r.collection_date.clone(),
            write: |r, v| r.set_collection_date(v),
        },
        Column {
            name: "BREDCODE",
            read: |r| r.breeder_institute_code.clone(),
            write: |r, v| r.set_breeder_institute_code(v),
        },
        Column {
            name: "SAMPSTAT",
            read: |r| r.bio_status.clone(),
            write: |r, v| r.set_bio_status(v),
        },
        Column {
            name: "ANCEST",
            read: |r| r.ancest.clone(),
            write: |r, v| r.set_ancest(v),
        },
        Column {
            name: "COLLSRC",
            read: |r| r.collection_source.clone(),
            write: |r, v| r.set_collection_source(v),
        },
        Column {
            name: "DONORCODE",
            read: |r| r.donor.institute_code.clone(),
            write: |r, v| r.edit_donor(|d| d.set_institute_code(v)),
        },
        Column {
            name: "DONORNUMB",
            read: |r| r.donor.number.clone(),
            write: |r, v| r.edit_donor(|d| d.set_number(v)),
        },
        Column {
            name: "OTHERNUMB",
            read: encode_other_numbers,
            write: decode_other_numbers,
        },
        Column {
            name: "DUPLSITE",
            read: |r| r.save_dup_sites.as_ref().map(|sites| sites.join(":")),
            write: |r, v| {
                let sites = v.split(KEY_VALUE_SEPARATOR).map(str::to_string).collect();
                r.set_save_dup_sites(sites)
            },
        },
        Column {
            name: "STORAGE",
            read: |r| r.germplasm_storage_type.clone(),
            write: |r, v| r.set_germplasm_storage_type(v),
        },
        Column {
            name: "MLSSTAT",
            read: |r| r.mls_status.clone(),
            write: |r, v| r.set_mls_status(v),
        },
        Column {
            name: "REMARKS",
            read: encode_remarks,
            write: decode_remarks,
        },
    ]
}

fn malformed(record: &PassportRecord, reason: impl Into<String>) -> PassportError {
    PassportError::FlatRow {
        accession: record.germplasm_number().unwrap_or_default().to_string(),
        reason: reason.into(),
    }
}

fn parse_number<T: std::str::FromStr>(
    record: &PassportRecord,
    column: &str,
    value: &str,
) -> PassportResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| malformed(record, format!("{column}: '{value}' is not a number")))
}

/// Parse a coordinate keeping its written form, so `42` is not widened to `42.0`.
fn parse_coordinate(record: &PassportRecord, column: &str, value: &str) -> PassportResult<Number> {
    serde_json::from_str(value)
        .map_err(|_| malformed(record, format!("{column}: '{value}' is not a number")))
}

/// Non-empty `;`-separated segments of a composite cell.
fn segments(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(PAIR_SEPARATOR)
        .filter(|segment| !segment.trim().is_empty())
}

fn split_pair<'v>(
    record: &PassportRecord,
    column: &str,
    pair: &'v str,
) -> PassportResult<(&'v str, &'v str)> {
    let parts: Vec<&str> = pair.split(KEY_VALUE_SEPARATOR).collect();
    match parts.as_slice() {
        [key, value] => Ok((*key, *value)),
        _ => Err(malformed(
            record,
            format!("{column}: malformed key:value pair '{pair}'"),
        )),
    }
}

fn joined(parts: Vec<String>, separator: char) -> Option<String> {
    (!parts.is_empty()).then(|| parts.join(&separator.to_string()))
}

/// Particle written before a subtaxon name, always ending in `.`.
fn subtaxon_abbreviation(rank: Rank) -> String {
    let particle = rank.particle();
    if particle.ends_with('.') {
        particle.to_string()
    } else {
        format!("{particle}.")
    }
}

fn encode_subtaxa(record: &PassportRecord) -> Option<String> {
    let parts = Rank::SUBTAXA
        .into_iter()
        .filter_map(|rank| {
            record
                .taxonomy
                .name(rank)
                .map(|name| format!("{} {name}", subtaxon_abbreviation(rank)))
        })
        .collect();
    joined(parts, ' ')
}

fn decode_subtaxa(record: &mut PassportRecord, value: &str) -> PassportResult<()> {
    let mut parsed: Vec<(Rank, Vec<&str>)> = Vec::new();
    for token in value.split_whitespace() {
        let rank = Rank::SUBTAXA
            .into_iter()
            .find(|rank| subtaxon_abbreviation(*rank) == token);
        if let Some(rank) = rank {
            parsed.push((rank, Vec::new()));
            continue;
        }
        match parsed.last_mut() {
            Some((_, words)) => words.push(token),
            None => {
                return Err(malformed(
                    record,
                    format!("SUBTAXA: '{value}' does not start with a rank abbreviation"),
                ));
            }
        }
    }

    for (rank, words) in parsed {
        if words.is_empty() {
            return Err(malformed(record, format!("SUBTAXA: {rank} has no name")));
        }
        let name = words.join(" ");
        record.edit_taxonomy(|t| t.set_name(rank, name))?;
    }
    Ok(())
}

fn decode_subtaxon_author(record: &mut PassportRecord, value: &str) -> PassportResult<()> {
    let Some((rank, _)) = record.taxonomy.lowest_subtaxon() else {
        return Err(malformed(record, "SUBTAUTHOR requires SUBTAXA"));
    };
    record.edit_taxonomy(|t| t.set_author(rank, value))
}

fn encode_site(record: &PassportRecord) -> Option<String> {
    let location = &record.location;
    let values = [
        &location.state,
        &location.province,
        &location.island,
        &location.municipality,
        &location.other,
        &location.site,
    ];
    let parts = SITE_KEYS
        .iter()
        .zip(values)
        .filter_map(|(key, value)| value.as_ref().map(|v| format!("{key}:{v}")))
        .collect();
    joined(parts, PAIR_SEPARATOR)
}

fn decode_site(record: &mut PassportRecord, value: &str) -> PassportResult<()> {
    for pair in segments(value) {
        let (key, text) = split_pair(record, "COLLSITE", pair)?;
        let result = match key {
            "state" => record.edit_location(|l| l.set_state(text)),
            "province" => record.edit_location(|l| l.set_province(text)),
            "island" => record.edit_location(|l| l.set_island(text)),
            "municipality" => record.edit_location(|l| l.set_municipality(text)),
            "other" => record.edit_location(|l| l.set_other(text)),
            "site" => record.edit_location(|l| l.set_site(text)),
            _ => Err(malformed(record, format!("COLLSITE: unknown key '{key}'"))),
        };
        result?;
    }
    Ok(())
}

fn encode_other_numbers(record: &PassportRecord) -> Option<String> {
    let parts = record
        .other_numbers
        .iter()
        .map(|id| {
            format!(
                "{}:{}",
                id.institute_code().unwrap_or_default(),
                id.number().unwrap_or_default()
            )
        })
        .collect();
    joined(parts, PAIR_SEPARATOR)
}

fn decode_other_numbers(record: &mut PassportRecord, value: &str) -> PassportResult<()> {
    for pair in segments(value) {
        let (institute, number) = split_pair(record, "OTHERNUMB", pair)?;
        if number.trim().is_empty() {
            return Err(malformed(record, format!("OTHERNUMB: '{pair}' has no number")));
        }
        let mut identifier = Identifier::default();
        if !institute.trim().is_empty() {
            identifier.set_institute_code(institute)?;
        }
        identifier.set_number(number)?;
        record.add_other_number(identifier)?;
    }
    Ok(())
}

fn encode_remarks(record: &PassportRecord) -> Option<String> {
    let parts = record
        .remarks
        .iter()
        .map(|(key, value)| format!("{}:{value}", key.as_str()))
        .collect();
    joined(parts, PAIR_SEPARATOR)
}

fn decode_remarks(record: &mut PassportRecord, value: &str) -> PassportResult<()> {
    for pair in segments(value) {
        let (key, text) = split_pair(record, "REMARKS", pair)?;
        let Some(remark) = RemarkKey::parse(key) else {
            return Err(malformed(record, format!("REMARKS: unknown key '{key}'")));
        };
        record.set_remark(remark, text)?;
    }
    Ok(())
}

/// Encode the populated flat columns of `record`.
pub fn to_flat_row(record: &PassportRecord) -> FlatRow {
    columns()
        .into_iter()
        .filter_map(|column| (column.read)(record).map(|value| (column.name.to_string(), value)))
        .collect()
}

/// Build a record from a flat row through the field setters.
///
/// Columns outside [`COLUMNS`] are ignored.
///
/// # Errors
///
/// Returns [`PassportError::FlatRow`] for a malformed composite or numeric cell and
/// [`PassportError::Validation`] when a setter rejects a value.
pub fn from_flat_row(row: &FlatRow) -> PassportResult<PassportRecord> {
    let mut record = PassportRecord::new();
    for column in columns() {
        let cell = row
            .get(column.name)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty());
        if let Some(value) = cell {
            (column.write)(&mut record, value)?;
        }
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> PassportRecord {
        let doc = json!({
            "version": "1.0",
            "germplasmNumber": {"instituteCode": "ESP004", "germplasmNumber": "BGE001234", "germplasmPUI": "doi:10.1/BGE001234"},
            "germplasmName": "Alfalfa de Aragón",
            "cropName": "alfalfa",
            "taxonomy": {
                "genus": {"name": "Medicago"},
                "species": {"name": "sativa", "author": "L."},
                "subspecies": {"name": "falcata"},
                "variety": {"name": "varia", "author": "Martyn"}
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
            "locationOfSavedDuplicates": ["NOR051", "GBR004"]
        });
        PassportRecord::from_document(&doc, true).expect("valid passport")
    }

    #[test]
    fn every_column_is_mapped_once() {
        let mut mapped: Vec<_> = columns().iter().map(|c| c.name).collect();
        mapped.sort_unstable();
        let mut expected = COLUMNS.to_vec();
        expected.sort_unstable();
        assert_eq!(mapped, expected);
    }

    #[test]
    fn composite_columns_are_encoded() {
        let row = to_flat_row(&record());
        assert_eq!(row["COLLSITE"], "province:Zaragoza;site:2 km N of Ejea");
        assert_eq!(row["SUBTAXA"], "subsp. falcata var. varia");
        assert_eq!(row["SUBTAUTHOR"], "Martyn");
        assert_eq!(row["OTHERNUMB"], "FRA001:F-12;:LOCAL-9");
        assert_eq!(row["DUPLSITE"], "NOR051:GBR004");
        assert_eq!(
            row["REMARKS"],
            "collection:irrigated field;genebank_management:regenerated 2004"
        );
        assert_eq!(row["LATITUDE"], "42.15");
        assert_eq!(row["ELEVATION"], "350");
        assert!(!row.contains_key("BREDCODE"));
    }

    #[test]
    fn flat_row_round_trips() {
        let original = record();
        let row = to_flat_row(&original);
        let decoded = from_flat_row(&row).expect("well-formed row");
        assert_eq!(to_flat_row(&decoded), row);
        assert_eq!(decoded.other_numbers()[1].institute_code(), None);
        assert_eq!(decoded.taxonomy().author(Rank::Variety), Some("Martyn"));
    }

    #[test]
    fn cell_text_keeps_surrounding_spaces() {
        let mut original = PassportRecord::new();
        original.set_germplasm_number("BGE1").unwrap();
        original.set_crop_name(" alfalfa ").unwrap();
        original
            .edit_location(|l| l.set_site(" Sierra Nevada"))
            .unwrap();

        let row = to_flat_row(&original);
        assert_eq!(row["COLLSITE"], "site: Sierra Nevada");
        let decoded = from_flat_row(&row).unwrap();
        assert_eq!(decoded, original);
        assert_eq!(decoded.location().site(), Some(" Sierra Nevada"));
    }

    #[test]
    fn whole_number_coordinates_round_trip() {
        let doc = json!({
            "version": "1.0",
            "germplasmNumber": {"instituteCode": "ESP004", "germplasmNumber": "BGE1"},
            "collectionSite": {"latitude": 42, "longitude": -1}
        });
        let original = PassportRecord::from_document(&doc, true).unwrap();
        let row = to_flat_row(&original);
        assert_eq!(row["LATITUDE"], "42");
        assert_eq!(row["LONGITUDE"], "-1");

        let decoded = from_flat_row(&row).unwrap();
        assert_eq!(decoded.to_document().unwrap(), doc);

        let mut row = row;
        row.insert("LATITUDE".into(), "north".into());
        assert_eq!(
            from_flat_row(&row).unwrap_err().to_string(),
            "BGE1: LATITUDE: 'north' is not a number"
        );
    }

    #[test]
    fn group_abbreviation_gains_a_dot() {
        let mut record = PassportRecord::new();
        record
            .edit_taxonomy(|t| t.set_name(Rank::Group, "Acephala"))
            .unwrap();
        let row = to_flat_row(&record);
        assert_eq!(row["SUBTAXA"], "Group. Acephala");
        let decoded = from_flat_row(&row).unwrap();
        assert_eq!(decoded.taxonomy().name(Rank::Group), Some("Acephala"));
    }

    #[test]
    fn malformed_pairs_name_the_accession() {
        let mut row = FlatRow::new();
        row.insert("ACCENUMB".into(), "BGE1".into());
        row.insert("OTHERNUMB".into(), "FRA001:F:12".into());
        let err = from_flat_row(&row).unwrap_err();
        assert!(matches!(&err, PassportError::FlatRow { accession, .. } if accession == "BGE1"));
        assert_eq!(
            err.to_string(),
            "BGE1: OTHERNUMB: malformed key:value pair 'FRA001:F:12'"
        );

        row.insert("OTHERNUMB".into(), String::new());
        row.insert("COLLSITE".into(), "province".into());
        assert!(matches!(
            from_flat_row(&row),
            Err(PassportError::FlatRow { .. })
        ));
    }

    #[test]
    fn setter_rules_apply_to_rows() {
        let mut row = FlatRow::new();
        row.insert("ACCENUMB".into(), "BGE1".into());
        row.insert("SAMPSTAT".into(), "301".into());
        assert!(matches!(
            from_flat_row(&row),
            Err(PassportError::Validation(_))
        ));

        row.remove("SAMPSTAT");
        row.insert("SPAUTHOR".into(), "L.".into());
        let err = from_flat_row(&row).unwrap_err();
        assert_eq!(
            err.to_string(),
            "BGE1: species author can not be set without species name"
        );
    }

    #[test]
    fn blank_cells_are_unset() {
        let mut row = FlatRow::new();
        row.insert("ACCENUMB".into(), "BGE1".into());
        row.insert("CROPNAME".into(), "  ".into());
        row.insert("NOTACOLUMN".into(), "x".into());
        let record = from_flat_row(&row).unwrap();
        assert_eq!(record.crop_name(), None);
        assert_eq!(record.germplasm_number(), Some("BGE1"));
    }
}
