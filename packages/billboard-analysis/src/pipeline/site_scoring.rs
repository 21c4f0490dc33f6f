//! Weighted scoring of candidate billboard sites.
//!
//! Synchronous and deterministic; independent of the vision model.

use serde::{Deserialize, Serialize};

use crate::types::location::{
    BillboardLocation, BoardFormat, Directionality, Lighting, Ownership, RoadCategory,
};
use crate::types::result::clamp_score;
use crate::types::score::LocationScore;

/// Monthly rent assumed when a site has none on record.
pub const DEFAULT_RENTAL_OMR: f64 = 2000.0;

/// Market CPM benchmark in rials per thousand impressions.
pub const BENCHMARK_CPM_OMR: f64 = 1.2;

/// Face area that earns the full size score.
const BASELINE_AREA_M2: f64 = 70.0;

const ROI_MIN: u32 = 20;
const ROI_MAX: u32 = 95;
const COMPOSITE_MIN: u32 = 20;
const COMPOSITE_MAX: u32 = 100;

/// Districts with premium commercial footfall.
const PRIME_DISTRICTS: &[&str] = &["Qurum", "Al Khuwair", "Al Mouj", "Bousher", "Seeb"];
const CORE_DISTRICTS: &[&str] = &["Ruwi", "Mutrah", "Muttrah", "Wadi Kabir"];

/// Vehicles per day by road category, one direction.
pub fn daily_traffic(category: RoadCategory) -> f64 {
    match category {
        RoadCategory::Urban => 25_000.0,
        RoadCategory::Arterial => 45_000.0,
        RoadCategory::Highway => 70_000.0,
        RoadCategory::Expressway => 90_000.0,
    }
}

/// Share of passing vehicles that register the board at this speed.
pub fn exposure_factor(speed_kmh: f64) -> f64 {
    if speed_kmh <= 50.0 {
        1.0
    } else if speed_kmh <= 80.0 {
        0.9
    } else if speed_kmh <= 100.0 {
        0.8
    } else {
        0.7
    }
}

fn direction_factor(directionality: Directionality) -> f64 {
    match directionality {
        Directionality::Bidirectional => 2.0,
        Directionality::OneWay => 1.0,
    }
}

/// Rent on record, or the default when missing or unusable.
pub fn effective_rental_omr(location: &BillboardLocation) -> f64 {
    location
        .rental_rate_omr_month
        .filter(|r| r.is_finite() && *r >= 0.0)
        .unwrap_or(DEFAULT_RENTAL_OMR)
}

/// Estimated daily impressions.
pub fn daily_impressions(location: &BillboardLocation) -> f64 {
    let speed = location.average_speed_kmh();
    daily_traffic(RoadCategory::from_speed(speed))
        * exposure_factor(speed)
        * direction_factor(location.directionality)
}

/// Cost per thousand impressions over a 30-day month.
pub fn cpm_omr(location: &BillboardLocation) -> f64 {
    let monthly_thousands = daily_impressions(location) * 30.0 / 1000.0;
    effective_rental_omr(location) / monthly_thousands
}

/// Score a site.
pub fn score_location(location: &BillboardLocation) -> LocationScore {
    let speed = location.average_speed_kmh();
    let distance = finite_or(location.distance_from_road_m, 0.0);
    let rental = effective_rental_omr(location);

    let speed_score = (30.0 - (speed - 30.0) * 0.3).clamp(0.0, 30.0);
    let distance_score = (25.0 - (distance - 20.0) * 0.2).clamp(0.0, 25.0);
    let size_score = (location.area_m2() / BASELINE_AREA_M2 * 20.0).clamp(0.0, 20.0);
    let cost_score = (25.0 - (rental - 1000.0) * 0.01).clamp(0.0, 25.0);
    let total_score = (speed_score + distance_score + size_score + cost_score).round() as u32;

    let cpm = cpm_omr(location);

    LocationScore {
        speed_score,
        distance_score,
        size_score,
        cost_score,
        total_score,
        roi_score: roi_score(cpm),
        readability_score: readability_score(location),
        suitability_score: suitability_score(location),
        daily_impressions: daily_impressions(location).round() as u64,
        cpm_omr: cpm,
    }
}

/// Map a CPM onto 20–95 against the market benchmark.
pub fn roi_score(cpm: f64) -> u32 {
    if !cpm.is_finite() || cpm <= 0.0 {
        return ROI_MAX;
    }
    clamp_score((BENCHMARK_CPM_OMR / cpm) * 85.0, ROI_MIN, ROI_MAX)
}

fn readability_score(location: &BillboardLocation) -> u32 {
    let speed = location.average_speed_kmh();
    let distance = finite_or(location.distance_from_road_m, 0.0);
    let mut score = 50.0;

    score += match speed {
        s if s <= 50.0 => 20.0,
        s if s <= 80.0 => 10.0,
        s if s <= 100.0 => 0.0,
        _ => -10.0,
    };
    score += match distance {
        d if d <= 30.0 => 15.0,
        d if d <= 60.0 => 8.0,
        d if d <= 100.0 => 0.0,
        _ => -10.0,
    };
    score += match location.lighting {
        Lighting::Digital => 10.0,
        Lighting::Illuminated | Lighting::Backlit => 5.0,
        Lighting::Unlit => -5.0,
    };
    score += match location.board_type {
        BoardFormat::Mega => 8.0,
        BoardFormat::Unipole | BoardFormat::Digital => 5.0,
        BoardFormat::Gantry => 3.0,
        BoardFormat::Billboard => 0.0,
        BoardFormat::Wall => -3.0,
    };

    clamp_score(score, COMPOSITE_MIN, COMPOSITE_MAX)
}

fn suitability_score(location: &BillboardLocation) -> u32 {
    let mut score = 40.0;

    let in_list = |list: &[&str]| list.iter().any(|d| d.eq_ignore_ascii_case(&location.district));
    if in_list(PRIME_DISTRICTS) {
        score += 15.0;
    } else if in_list(CORE_DISTRICTS) {
        score += 8.0;
    }

    score += match location.ownership {
        Ownership::Government => 10.0,
        Ownership::Municipality => 5.0,
        Ownership::Private => 0.0,
    };
    if location.directionality == Directionality::Bidirectional {
        score += 10.0;
    }
    score += match location.lighting {
        Lighting::Digital => 10.0,
        Lighting::Illuminated | Lighting::Backlit => 5.0,
        Lighting::Unlit => 0.0,
    };
    if matches!(location.board_type, BoardFormat::Digital | BoardFormat::Mega) {
        score += 5.0;
    }
    if location.average_speed_kmh() <= 80.0 {
        score += 5.0;
    }
    if finite_or(location.distance_from_road_m, 0.0) <= 50.0 {
        score += 5.0;
    }

    clamp_score(score, COMPOSITE_MIN, COMPOSITE_MAX)
}

fn finite_or(value: f64, default: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        default
    }
}

/// A scored site in a recommendation list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedLocation {
    pub location_id: String,
    pub name: String,
    pub score: LocationScore,
}

/// Rank sites best first: total score, then ROI, then id.
pub fn rank_locations<'a>(
    locations: impl IntoIterator<Item = &'a BillboardLocation>,
) -> Vec<RankedLocation> {
    let mut ranked: Vec<RankedLocation> = locations
        .into_iter()
        .map(|loc| RankedLocation {
            location_id: loc.id.clone(),
            name: loc.name.clone(),
            score: score_location(loc),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .total_score
            .cmp(&a.score.total_score)
            .then(b.score.roi_score.cmp(&a.score.roi_score))
            .then(a.location_id.cmp(&b.location_id))
    });
    ranked
}
