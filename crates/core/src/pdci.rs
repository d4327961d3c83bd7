//! Passport Data Completeness Index.
//!
//! Points are awarded for populated fields, with the weights of the origin-related fields
//! depending on the accession's biological status category. The accumulated points are capped
//! at 1000 and divided by 100, giving a score in `[0.0, 10.0]`.

use tracing::debug;

use crate::constants::{PDCI_MAX_POINTS, PDCI_POINTS_PER_UNIT};
use crate::passport::PassportRecord;
use crate::taxonomy::Rank;

/// Biological status category, from the first character of the status code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StatusBranch {
    Wild,
    Landrace,
    BreedingMaterial,
    Cultivar,
    Other,
}

impl StatusBranch {
    fn of(bio_status: &str) -> Self {
        match bio_status.chars().next() {
            Some('1' | '2') => StatusBranch::Wild,
            Some('3') => StatusBranch::Landrace,
            Some('4') => StatusBranch::BreedingMaterial,
            Some('5') => StatusBranch::Cultivar,
            _ => StatusBranch::Other,
        }
    }
}

/// The inputs the index reads from a record.
///
/// The three descriptions have no field in the passport document and are always `None`; the
/// formula still accounts for them.
struct ScoringView<'a> {
    record: &'a PassportRecord,
    donor_institute_description: Option<&'a str>,
    collecting_institute_description: Option<&'a str>,
    duplication_site_description: Option<&'a str>,
}

impl<'a> ScoringView<'a> {
    fn new(record: &'a PassportRecord) -> Self {
        Self {
            record,
            donor_institute_description: None,
            collecting_institute_description: None,
            duplication_site_description: None,
        }
    }

    fn has_country(&self) -> bool {
        self.record.location.country.is_some()
    }

    fn has_coordinates(&self) -> bool {
        self.record.location.has_coordinates()
    }

    /// Any of the place names that make up the collecting site description.
    fn has_site_description(&self) -> bool {
        let location = &self.record.location;
        [
            &location.state,
            &location.province,
            &location.island,
            &location.municipality,
            &location.other,
            &location.site,
        ]
        .iter()
        .any(|part| part.is_some())
    }

    fn has_breeder_description_only(&self) -> bool {
        self.record.breeder_institute_description.is_some()
            && self.record.breeder_institute_code.is_none()
    }

    fn taxonomy_points(&self) -> u32 {
        let taxonomy = &self.record.taxonomy;
        let mut points = 0;
        if taxonomy.get(Rank::Genus).is_none() {
            return points;
        }
        points += 120;

        let Some(species) = taxonomy.get(Rank::Species) else {
            return points;
        };
        points += 80;
        if species.author().is_some() {
            points += 5;
        }

        if let Some((_, subtaxon)) = taxonomy.lowest_subtaxon() {
            points += 40;
            if subtaxon.author().is_some() {
                points += 5;
            }
        }
        points
    }

    fn common_points(&self) -> u32 {
        let record = self.record;
        let donor = &record.donor;
        let mut points = self.taxonomy_points();

        if record.crop_name.is_some() {
            points += 45;
        }
        if record.acquisition_date.is_some() {
            points += 10;
        }
        if record.bio_status.is_some() {
            points += 80;
        }
        if donor.institute_code.is_some() {
            points += 40;
        }
        if donor.number.is_some() {
            if donor.institute_code.is_some() || self.donor_institute_description.is_some() {
                points += 40;
            } else {
                points += 20;
            }
        }
        if !record.other_numbers.is_empty() {
            points += 35;
        }
        if self.duplication_site_description.is_some() {
            points += 30;
        }
        if record.germplasm_storage_type.is_some() {
            points += 15;
        }
        if self.donor_institute_description.is_some() && donor.institute_code.is_none() {
            points += 20;
        }
        if record.save_dup_sites.is_none() && self.duplication_site_description.is_some() {
            points += 15;
        }
        if record.accession.url.is_some() {
            points += 40;
        }
        if record.mls_status.is_some() {
            points += 15;
        }
        points
    }

    /// Coordinates score `with_coordinates` plus `site_bonus` when a site is also described;
    /// a described site alone scores `site_only`.
    fn georeference_points(&self, with_coordinates: u32, site_bonus: u32, site_only: u32) -> u32 {
        let described = self.has_site_description();
        if self.has_coordinates() {
            with_coordinates + if described { site_bonus } else { 0 }
        } else if described {
            site_only
        } else {
            0
        }
    }

    fn collecting_institute_points(&self, institute: u32, description: u32) -> u32 {
        if self.record.collection.institute_code.is_some() {
            institute
        } else if self.collecting_institute_description.is_some() {
            description
        } else {
            0
        }
    }

    fn branch_points(&self, branch: StatusBranch) -> u32 {
        let record = self.record;
        let location = &record.location;
        let award = |present: bool, points: u32| if present { points } else { 0 };

        match branch {
            StatusBranch::Wild => {
                award(self.has_country(), 80)
                    + self.georeference_points(120, 20, 70)
                    + award(location.altitude.is_some(), 20)
                    + award(record.collection_date.is_some(), 30)
                    + award(record.collection_source.is_some(), 30)
                    + award(record.collection.number.is_some(), 60)
                    + self.collecting_institute_points(40, 20)
            }
            StatusBranch::Landrace => {
                award(self.has_country(), 80)
                    + self.georeference_points(80, 15, 45)
                    + award(location.altitude.is_some(), 15)
                    + award(record.collection_date.is_some(), 30)
                    + award(record.ancest.is_some(), 10)
                    + award(record.collection_source.is_some(), 50)
                    + award(record.germplasm_name.is_some(), 50)
                    + award(record.collection.number.is_some(), 40)
                    + self.collecting_institute_points(30, 15)
            }
            StatusBranch::BreedingMaterial => {
                award(self.has_country(), 40)
                    + award(record.breeder_institute_code.is_some(), 110)
                    + award(record.ancest.is_some(), 150)
                    + award(record.collection_source.is_some(), 20)
                    + award(record.germplasm_name.is_some(), 80)
                    + award(self.has_breeder_description_only(), 55)
            }
            StatusBranch::Cultivar => {
                award(self.has_country(), 40)
                    + award(record.breeder_institute_code.is_some(), 80)
                    + award(record.ancest.is_some(), 100)
                    + award(record.collection_source.is_some(), 20)
                    + award(record.germplasm_name.is_some(), 160)
                    + award(self.has_breeder_description_only(), 40)
            }
            StatusBranch::Other => {
                award(self.has_country(), 40)
                    + self.georeference_points(30, 10, 20)
                    + award(location.altitude.is_some(), 5)
                    + award(record.collection_date.is_some(), 10)
                    + award(record.breeder_institute_code.is_some(), 10)
                    + award(record.ancest.is_some(), 40)
                    + award(record.collection_source.is_some(), 25)
                    + award(record.germplasm_name.is_some(), 40)
                    + award(record.collection.number.is_some(), 20)
                    + self.collecting_institute_points(20, 10)
                    + award(self.has_breeder_description_only(), 40)
            }
        }
    }

    fn points(&self) -> u32 {
        let mut points = self.common_points();
        if let Some(status) = self.record.bio_status.as_deref() {
            let branch = StatusBranch::of(status);
            let branch_points = self.branch_points(branch);
            debug!(?branch, branch_points, "pdci status branch");
            points += branch_points;
        }
        points.min(PDCI_MAX_POINTS)
    }
}

/// Compute the PDCI of `record`, a score in `[0.0, 10.0]` with two decimals.
///
/// Total over every record, including an empty one (`0.0`).
pub fn calculate_pdci(record: &PassportRecord) -> f64 {
    let points = ScoringView::new(record).points();
    f64::from(points) / PDCI_POINTS_PER_UNIT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::Identifier;
    use serde_json::json;

    fn landrace() -> PassportRecord {
        let doc = json!({
            "version": "1.0",
            "germplasmNumber": {"instituteCode": "ESP004", "germplasmNumber": "BGE001234"},
            "germplasmName": "Alfalfa de Aragón",
            "cropName": "alfalfa",
            "taxonomy": {
                "genus": {"name": "Medicago"},
                "species": {"name": "sativa", "author": "L."}
            },
            "collectionNumber": {"germplasmNumber": "C-3"},
            "collectionSite": {
                "countryOfOriginCode": "ESP",
                "site": "2 km N of Ejea",
                "latitude": 42.15,
                "longitude": -1.13
            },
            "collectionDate": "198605--",
            "biologicalStatusOfAccessionCode": "300"
        });
        PassportRecord::from_document(&doc, true).expect("valid passport")
    }

    #[test]
    fn empty_record_scores_zero() {
        assert_eq!(calculate_pdci(&PassportRecord::new()), 0.0);
    }

    #[test]
    fn landrace_example_scores_six_point_two_five() {
        assert_eq!(landrace().pdci(), 6.25);
    }

    #[test]
    fn status_branch_adds_points() {
        let with_status = landrace();
        let mut without_status = with_status.clone();
        without_status.bio_status = None;
        assert!(calculate_pdci(&with_status) > calculate_pdci(&without_status));
        assert_eq!(calculate_pdci(&without_status), 2.5);
    }

    #[test]
    fn setter_order_does_not_matter() {
        let mut a = PassportRecord::new();
        a.set_crop_name("maize").unwrap();
        a.set_bio_status("500").unwrap();
        a.set_germplasm_name("B73").unwrap();
        a.set_mls_status("N").unwrap();

        let mut b = PassportRecord::new();
        b.set_mls_status("N").unwrap();
        b.set_germplasm_name("B73").unwrap();
        b.set_bio_status("500").unwrap();
        b.set_crop_name("maize").unwrap();

        assert_eq!(calculate_pdci(&a), calculate_pdci(&b));
        // 45 + 80 + 15 + cultivar name 160
        assert_eq!(calculate_pdci(&a), 3.0);
    }

    #[test]
    fn donor_number_alone_scores_less() {
        let mut record = PassportRecord::new();
        record.edit_donor(|d| d.set_number("D-1")).unwrap();
        assert_eq!(calculate_pdci(&record), 0.2);
        record.edit_donor(|d| d.set_institute_code("ESP027")).unwrap();
        assert_eq!(calculate_pdci(&record), 0.8);
    }

    #[test]
    fn subtaxa_need_species() {
        let mut record = PassportRecord::new();
        record
            .edit_taxonomy(|t| {
                t.set_name(Rank::Genus, "Medicago")?;
                t.set_name(Rank::Variety, "varia")?;
                t.set_author(Rank::Variety, "Martyn")
            })
            .unwrap();
        assert_eq!(calculate_pdci(&record), 1.2);
        record
            .edit_taxonomy(|t| t.set_name(Rank::Species, "sativa"))
            .unwrap();
        assert_eq!(calculate_pdci(&record), 2.45);
    }

    #[test]
    fn unknown_status_uses_conservative_weights() {
        let mut record = landrace();
        record.bio_status = Some("999".to_string());
        // 330 common + country 40, coordinates 30 + 10, date 10, name 40, number 20
        assert_eq!(calculate_pdci(&record), 4.8);
    }

    #[test]
    fn score_stays_within_bounds() {
        let mut record = landrace();
        record.set_url("https://example.org/BGE001234").unwrap();
        record.set_mls_status("Y").unwrap();
        record.set_acquisition_date("19860512").unwrap();
        record.set_germplasm_storage_type("13").unwrap();
        record.set_ancest("local population").unwrap();
        record.set_collection_source("21").unwrap();
        record
            .add_other_number(Identifier::new("FRA001", "F-12").unwrap())
            .unwrap();
        record
            .edit_location(|l| {
                l.set_altitude(350);
                Ok(())
            })
            .unwrap();
        let score = calculate_pdci(&record);
        assert!((0.0..=10.0).contains(&score));
    }
}
