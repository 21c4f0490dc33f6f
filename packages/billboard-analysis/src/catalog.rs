//! Static catalog of surveyed billboard sites in the Muscat area.
//!
//! Built once on first access and never mutated, so concurrent readers need
//! no synchronization.

use std::sync::LazyLock;

use crate::error::{AnalysisError, Result};
use crate::types::location::{
    BillboardLocation, BoardFormat, Directionality, Lighting, Ownership,
};

static CATALOG: LazyLock<Vec<BillboardLocation>> = LazyLock::new(|| {
    vec![
        BillboardLocation::new("sq-qurum-01", "Sultan Qaboos Street Unipole")
            .with_road("Sultan Qaboos Street", "Qurum")
            .with_format(BoardFormat::Unipole)
            .with_size(12.0, 4.0)
            .with_distance(35.0)
            .with_speed_limit("100–120")
            .with_directionality(Directionality::Bidirectional)
            .with_lighting(Lighting::Illuminated)
            .with_ownership(Ownership::Private)
            .with_rental_rate(2800.0),
        BillboardLocation::new("sq-khuwair-02", "Al Khuwair Mega Board")
            .with_road("Sultan Qaboos Street", "Al Khuwair")
            .with_format(BoardFormat::Mega)
            .with_size(18.0, 6.0)
            .with_distance(60.0)
            .with_speed_limit("100–120")
            .with_directionality(Directionality::OneWay)
            .with_lighting(Lighting::Digital)
            .with_ownership(Ownership::Private)
            .with_rental_rate(4500.0),
        BillboardLocation::new("mex-bousher-03", "Muscat Expressway Bousher Exit")
            .with_road("Muscat Expressway", "Bousher")
            .with_format(BoardFormat::Unipole)
            .with_size(14.0, 5.0)
            .with_distance(80.0)
            .with_speed_limit("120")
            .with_directionality(Directionality::Bidirectional)
            .with_lighting(Lighting::Illuminated)
            .with_ownership(Ownership::Government)
            .with_rental_rate(3200.0),
        BillboardLocation::new("airport-seeb-04", "Airport Heights Approach")
            .with_road("Airport Road", "Seeb")
            .with_format(BoardFormat::Billboard)
            .with_size(12.0, 4.0)
            .with_distance(45.0)
            .with_speed_limit("80–100")
            .with_directionality(Directionality::OneWay)
            .with_lighting(Lighting::Backlit)
            .with_ownership(Ownership::Private),
        BillboardLocation::new("ruwi-hs-05", "Ruwi High Street Wall")
            .with_road("Ruwi High Street", "Ruwi")
            .with_format(BoardFormat::Wall)
            .with_size(8.0, 3.0)
            .with_distance(15.0)
            .with_speed_limit("40–60")
            .with_directionality(Directionality::OneWay)
            .with_lighting(Lighting::Backlit)
            .with_ownership(Ownership::Municipality)
            .with_rental_rate(900.0),
        BillboardLocation::new("mouj-06", "Al Mouj Digital Screen")
            .with_road("Al Mouj Street", "Al Mouj")
            .with_format(BoardFormat::Digital)
            .with_size(10.0, 3.5)
            .with_distance(25.0)
            .with_speed_limit("60–80")
            .with_directionality(Directionality::Bidirectional)
            .with_lighting(Lighting::Digital)
            .with_ownership(Ownership::Private)
            .with_rental_rate(2200.0),
        BillboardLocation::new("nizwa-hwy-07", "Bidbid Interchange Mega")
            .with_road("Muscat–Nizwa Highway", "Bidbid")
            .with_format(BoardFormat::Mega)
            .with_size(20.0, 6.0)
            .with_distance(130.0)
            .with_speed_limit("120")
            .with_directionality(Directionality::OneWay)
            .with_lighting(Lighting::Unlit)
            .with_ownership(Ownership::Government)
            .with_rental_rate(1500.0),
        BillboardLocation::new("mutrah-08", "Mutrah Corniche Panel")
            .with_road("Mutrah Corniche", "Mutrah")
            .with_format(BoardFormat::Billboard)
            .with_size(6.0, 3.0)
            .with_distance(20.0)
            .with_speed_limit("40")
            .with_directionality(Directionality::OneWay)
            .with_lighting(Lighting::Illuminated)
            .with_ownership(Ownership::Municipality),
    ]
});

/// Read-only access to the static site catalog.
pub struct BillboardCatalog;

impl BillboardCatalog {
    /// Every cataloged site, in survey order.
    pub fn all() -> &'static [BillboardLocation] {
        CATALOG.as_slice()
    }

    /// Look a site up by id.
    pub fn lookup(id: &str) -> Result<&'static BillboardLocation> {
        CATALOG
            .iter()
            .find(|loc| loc.id.eq_ignore_ascii_case(id.trim()))
            .ok_or_else(|| AnalysisError::LocationNotFound { id: id.to_string() })
    }

    /// Sites on a road (case-insensitive).
    pub fn on_road(road: &str) -> Vec<&'static BillboardLocation> {
        CATALOG
            .iter()
            .filter(|loc| loc.road.eq_ignore_ascii_case(road))
            .collect()
    }

    /// Sites in a district (case-insensitive).
    pub fn in_district(district: &str) -> Vec<&'static BillboardLocation> {
        CATALOG
            .iter()
            .filter(|loc| loc.district.eq_ignore_ascii_case(district))
            .collect()
    }

    /// Other sites competing for the same traffic: same road or same district.
    pub fn competitors_of(location: &BillboardLocation) -> Vec<&'static BillboardLocation> {
        CATALOG
            .iter()
            .filter(|other| other.id != location.id)
            .filter(|other| {
                (!location.road.is_empty() && other.road.eq_ignore_ascii_case(&location.road))
                    || (!location.district.is_empty()
                        && other.district.eq_ignore_ascii_case(&location.district))
            })
            .collect()
    }
}
