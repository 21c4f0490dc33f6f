//! Per-request analysis context derived from a billboard location.

use serde::{Deserialize, Serialize};

use crate::catalog::BillboardCatalog;
use crate::pipeline::geometry::{
    BoardGeometry, GeometryThresholds, DEFAULT_BOARD_HEIGHT_M, DEFAULT_BOARD_WIDTH_M,
    DEFAULT_VIEWING_DISTANCE_M,
};
use crate::pipeline::site_scoring::{cpm_omr, daily_impressions, effective_rental_omr};
use crate::types::location::{BillboardLocation, Directionality, Lighting, RoadCategory};

const KMH_PER_MPH: f64 = 1.609_344;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedProfile {
    pub kmh: f64,
    pub mph: f64,
    pub road_category: RoadCategory,
}

impl SpeedProfile {
    pub fn from_kmh(kmh: f64) -> Self {
        Self {
            kmh,
            mph: kmh / KMH_PER_MPH,
            road_category: RoadCategory::from_speed(kmh),
        }
    }
}

/// How much roadside clutter sits between driver and board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstructionLevel {
    Clear,
    Partial,
    Significant,
}

impl ObstructionLevel {
    /// Setback from the road is the best proxy the survey data carries.
    pub fn from_setback(distance_from_road_m: f64) -> Self {
        if distance_from_road_m <= 30.0 {
            Self::Clear
        } else if distance_from_road_m <= 80.0 {
            Self::Partial
        } else {
            Self::Significant
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityFactors {
    pub lighting: Lighting,
    pub traffic_flow: Directionality,
    pub obstruction: ObstructionLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessIntel {
    pub rental_rate_omr: f64,
    pub monthly_impressions: u64,
    pub cpm_omr: f64,
    pub competitors: Vec<String>,
}

/// Everything the prompt and the mappers need to know about the site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisContext {
    pub location_label: String,
    pub district: Option<String>,
    pub viewing_distance_m: f64,
    pub geometry: BoardGeometry,
    pub speed: SpeedProfile,
    pub visibility: VisibilityFactors,
    pub business: BusinessIntel,

    /// False when built from defaults rather than catalog metadata.
    pub from_metadata: bool,
}

impl AnalysisContext {
    /// Build from catalog metadata. `distance_override` wins over the
    /// location's own setback when present and positive.
    pub fn from_location(location: &BillboardLocation, distance_override: Option<f64>) -> Self {
        let viewing_distance_m = distance_override
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(location.distance_from_road_m);
        let geometry = BoardGeometry::for_location(location, viewing_distance_m).sanitized();

        let competitors = BillboardCatalog::competitors_of(location)
            .into_iter()
            .map(|c| c.label())
            .collect();

        Self {
            location_label: location.label(),
            district: Some(location.district.clone()).filter(|d| !d.is_empty()),
            viewing_distance_m: geometry.distance_m,
            geometry,
            speed: SpeedProfile::from_kmh(geometry.speed_kmh),
            visibility: VisibilityFactors {
                lighting: location.lighting,
                traffic_flow: location.directionality,
                obstruction: ObstructionLevel::from_setback(location.distance_from_road_m),
            },
            business: BusinessIntel {
                rental_rate_omr: effective_rental_omr(location),
                monthly_impressions: (daily_impressions(location) * 30.0).round() as u64,
                cpm_omr: cpm_omr(location),
                competitors,
            },
            from_metadata: true,
        }
    }

    /// Build for a free-text location with no catalog metadata.
    pub fn defaults(location_label: impl Into<String>, distance_m: Option<f64>) -> Self {
        let label = location_label.into();
        let distance = distance_m
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(DEFAULT_VIEWING_DISTANCE_M);
        let synthetic = BillboardLocation::new("adhoc", label.clone())
            .with_size(DEFAULT_BOARD_WIDTH_M, DEFAULT_BOARD_HEIGHT_M)
            .with_distance(distance);

        let mut context = Self::from_location(&synthetic, Some(distance));
        context.location_label = label;
        context.business.competitors.clear();
        context.from_metadata = false;
        context
    }

    pub fn thresholds(&self) -> GeometryThresholds {
        GeometryThresholds::compute(&self.geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_catalog_location() {
        let loc = BillboardCatalog::lookup("sq-qurum-01").unwrap();
        let ctx = AnalysisContext::from_location(loc, None);

        assert_eq!(ctx.viewing_distance_m, 35.0);
        assert_eq!(ctx.speed.kmh, 110.0);
        assert!((ctx.speed.mph - 68.35).abs() < 0.01);
        assert_eq!(ctx.speed.road_category, RoadCategory::Expressway);
        assert_eq!(ctx.visibility.obstruction, ObstructionLevel::Partial);
        assert_eq!(ctx.business.rental_rate_omr, 2800.0);
        assert_eq!(ctx.business.competitors, vec!["Al Khuwair Mega Board, Al Khuwair"]);
        assert!(ctx.from_metadata);
    }

    #[test]
    fn test_distance_override_wins() {
        let loc = BillboardCatalog::lookup("sq-qurum-01").unwrap();
        assert_eq!(AnalysisContext::from_location(loc, Some(150.0)).viewing_distance_m, 150.0);
        assert_eq!(AnalysisContext::from_location(loc, Some(-1.0)).viewing_distance_m, 35.0);
    }

    #[test]
    fn test_defaults_use_documented_geometry() {
        let ctx = AnalysisContext::defaults("Somewhere in Sohar", None);
        assert_eq!(ctx.location_label, "Somewhere in Sohar");
        assert_eq!(ctx.viewing_distance_m, DEFAULT_VIEWING_DISTANCE_M);
        assert_eq!(ctx.geometry.height_m, DEFAULT_BOARD_HEIGHT_M);
        assert_eq!(ctx.speed.kmh, 80.0);
        assert!(ctx.business.competitors.is_empty());
        assert!(!ctx.from_metadata);
    }

    #[test]
    fn test_missing_rental_in_context_uses_default() {
        let loc = BillboardCatalog::lookup("airport-seeb-04").unwrap();
        let ctx = AnalysisContext::from_location(loc, None);
        assert_eq!(ctx.business.rental_rate_omr, 2000.0);
        assert!(ctx.business.cpm_omr.is_finite());
    }
}
