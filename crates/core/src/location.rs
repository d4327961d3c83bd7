//! Collection site of an accession.

use std::fmt;

use passport_schema::codes;
use passport_schema::v1_0::wire;
use passport_types::{NonEmptyText, Reconciled};
use serde_json::Number;

use crate::{PassportError, PassportResult};

/// Where the accession was collected.
///
/// Coordinates and altitude are [`Reconciled`]: a merged record whose sources disagree carries
/// the annotated description instead of a number. Coordinates keep the number as written, so an
/// integral `42` stays `42`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Location {
    pub(crate) country: Option<String>,
    pub(crate) state: Option<String>,
    pub(crate) province: Option<String>,
    pub(crate) municipality: Option<String>,
    pub(crate) island: Option<String>,
    pub(crate) site: Option<String>,
    pub(crate) other: Option<String>,
    pub(crate) latitude: Option<Reconciled<Number>>,
    pub(crate) longitude: Option<Reconciled<Number>>,
    pub(crate) altitude: Option<Reconciled<i64>>,
    pub(crate) georef_method: Option<String>,
    pub(crate) coord_uncertainty: Option<String>,
    pub(crate) coord_spatial_reference: Option<String>,
}

macro_rules! text_accessors {
    ($($field:ident => $setter:ident),* $(,)?) => {
        $(
            pub fn $field(&self) -> Option<&str> {
                self.$field.as_deref()
            }

            pub fn $setter(&mut self, value: impl Into<String>) -> PassportResult<()> {
                let value = NonEmptyText::new(value).map_err(|e| {
                    PassportError::validation("", format!("{}: {e}", stringify!($field)))
                })?;
                self.$field = Some(value.into_inner());
                Ok(())
            }
        )*
    };
}

impl Location {
    text_accessors! {
        state => set_state,
        province => set_province,
        municipality => set_municipality,
        island => set_island,
        site => set_site,
        other => set_other,
        georef_method => set_georef_method,
        coord_uncertainty => set_coord_uncertainty,
        coord_spatial_reference => set_coord_spatial_reference,
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    /// Set the ISO 3166-1 alpha-3 (or historic) country code.
    pub fn set_country(&mut self, code: impl Into<String>) -> PassportResult<()> {
        let code = code.into();
        if codes::country_name(&code).is_none() {
            return Err(PassportError::validation(
                "",
                format!("'{code}' is not a valid country code"),
            ));
        }
        self.country = Some(code);
        Ok(())
    }

    /// Country name resolved from the code table.
    pub fn country_name(&self) -> Option<&'static str> {
        self.country.as_deref().and_then(codes::country_name)
    }

    pub fn latitude(&self) -> Option<&Reconciled<Number>> {
        self.latitude.as_ref()
    }

    pub fn longitude(&self) -> Option<&Reconciled<Number>> {
        self.longitude.as_ref()
    }

    pub fn altitude(&self) -> Option<&Reconciled<i64>> {
        self.altitude.as_ref()
    }

    /// Latitude in decimal degrees, or `None` while unset or disputed.
    pub fn latitude_degrees(&self) -> Option<f64> {
        self.latitude.as_ref()?.value()?.as_f64()
    }

    pub fn longitude_degrees(&self) -> Option<f64> {
        self.longitude.as_ref()?.value()?.as_f64()
    }

    pub fn set_latitude(&mut self, value: Number) {
        self.latitude = Some(Reconciled::Value(value));
    }

    pub fn set_longitude(&mut self, value: Number) {
        self.longitude = Some(Reconciled::Value(value));
    }

    pub fn set_altitude(&mut self, value: i64) {
        self.altitude = Some(Reconciled::Value(value));
    }

    /// Both coordinates are present.
    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    pub fn is_empty(&self) -> bool {
        *self == Location::default()
    }

    pub(crate) fn from_wire(wire: wire::CollectionSite) -> Self {
        Self {
            country: wire.country_of_origin_code,
            state: wire.state,
            province: wire.province,
            municipality: wire.municipality,
            island: wire.island,
            site: wire.site,
            other: wire.other_location,
            latitude: wire.latitude,
            longitude: wire.longitude,
            altitude: wire.altitude,
            georef_method: wire.georef_method,
            coord_uncertainty: wire.coord_uncertainty,
            coord_spatial_reference: wire.coord_spatial_reference,
        }
    }

    pub(crate) fn to_wire_if_populated(&self) -> Option<wire::CollectionSite> {
        if self.is_empty() {
            return None;
        }
        Some(wire::CollectionSite {
            country_of_origin_code: self.country.clone(),
            state: self.state.clone(),
            province: self.province.clone(),
            municipality: self.municipality.clone(),
            island: self.island.clone(),
            site: self.site.clone(),
            other_location: self.other.clone(),
            latitude: self.latitude.clone(),
            longitude: self.longitude.clone(),
            altitude: self.altitude.clone(),
            georef_method: self.georef_method.clone(),
            coord_uncertainty: self.coord_uncertainty.clone(),
            coord_spatial_reference: self.coord_spatial_reference.clone(),
        })
    }
}

/// Renders populated place names coarsest first, then `(lat, long)` and altitude,
/// e.g. `ESP, Zaragoza, 2 km N of Ejea (42.15, -1.13) 350 m`.
impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let places = [
            &self.country,
            &self.state,
            &self.province,
            &self.municipality,
            &self.island,
            &self.site,
            &self.other,
        ];
        let mut parts = vec![places
            .into_iter()
            .filter_map(|p| p.as_deref())
            .collect::<Vec<_>>()
            .join(", ")];

        if let (Some(lat), Some(long)) = (&self.latitude, &self.longitude) {
            parts.push(format!("({lat}, {long})"));
        }
        if let Some(altitude) = &self.altitude {
            parts.push(format!("{altitude} m"));
        }
        parts.retain(|p| !p.is_empty());
        f.write_str(&parts.join(" "))
    }
}
