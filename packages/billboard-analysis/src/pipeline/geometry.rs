//! Legibility thresholds from board geometry and traffic speed.
//!
//! Pure arithmetic. Non-positive or non-finite inputs are replaced by
//! documented defaults instead of producing errors.

use serde::{Deserialize, Serialize};

use crate::types::location::{BillboardLocation, DEFAULT_SPEED_KMH};

pub const DEFAULT_BOARD_HEIGHT_M: f64 = 5.0;
pub const DEFAULT_BOARD_WIDTH_M: f64 = 12.0;
pub const DEFAULT_VIEWING_DISTANCE_M: f64 = 100.0;

/// Letter height per unit of (distance / board height), before speed penalty.
const FONT_HEIGHT_COEFFICIENT: f64 = 0.15;

/// Reading rate used to bound the word count.
const WORDS_PER_SECOND: f64 = 2.5;

const MIN_WORD_COUNT: u32 = 3;
const INCHES_PER_METER: f64 = 39.37;

/// Pixel height of the reference canvas the board face is rendered on.
const REFERENCE_CANVAS_HEIGHT_PX: f64 = 1080.0;

/// WCAG AA body-text contrast, the floor for slow, close boards.
const BASE_CONTRAST_RATIO: f64 = 4.5;

/// Physical inputs to the legibility model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoardGeometry {
    pub distance_m: f64,
    pub width_m: f64,
    pub height_m: f64,
    pub speed_kmh: f64,
}

impl BoardGeometry {
    pub fn new(distance_m: f64, width_m: f64, height_m: f64, speed_kmh: f64) -> Self {
        Self {
            distance_m,
            width_m,
            height_m,
            speed_kmh,
        }
    }

    /// Geometry of a catalog board viewed from `distance_m`.
    pub fn for_location(location: &BillboardLocation, distance_m: f64) -> Self {
        Self::new(
            distance_m,
            location.width_m,
            location.height_m,
            location.average_speed_kmh(),
        )
    }

    /// Replace unusable values with the documented defaults.
    pub fn sanitized(&self) -> Self {
        Self {
            distance_m: or_default(self.distance_m, DEFAULT_VIEWING_DISTANCE_M),
            width_m: or_default(self.width_m, DEFAULT_BOARD_WIDTH_M),
            height_m: or_default(self.height_m, DEFAULT_BOARD_HEIGHT_M),
            speed_kmh: or_default(self.speed_kmh, DEFAULT_SPEED_KMH),
        }
    }
}

impl Default for BoardGeometry {
    fn default() -> Self {
        Self::new(
            DEFAULT_VIEWING_DISTANCE_M,
            DEFAULT_BOARD_WIDTH_M,
            DEFAULT_BOARD_HEIGHT_M,
            DEFAULT_SPEED_KMH,
        )
    }
}

fn or_default(value: f64, default: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        default
    }
}

/// Speed penalty: faster traffic needs proportionally larger text.
pub fn speed_factor(speed_kmh: f64) -> f64 {
    if speed_kmh <= 50.0 {
        1.0
    } else if speed_kmh <= 80.0 {
        1.3
    } else if speed_kmh <= 100.0 {
        1.6
    } else {
        2.0
    }
}

/// Minimum letter height in meters.
pub fn minimum_font_height_m(distance_m: f64, height_m: f64, speed_kmh: f64) -> f64 {
    let g = BoardGeometry::new(distance_m, DEFAULT_BOARD_WIDTH_M, height_m, speed_kmh).sanitized();
    (g.distance_m / g.height_m) * speed_factor(g.speed_kmh) * FONT_HEIGHT_COEFFICIENT
}

/// Seconds the board stays in the driver's forward cone.
pub fn viewing_time_seconds(width_m: f64, speed_kmh: f64) -> f64 {
    let g = BoardGeometry::new(DEFAULT_VIEWING_DISTANCE_M, width_m, DEFAULT_BOARD_HEIGHT_M, speed_kmh)
        .sanitized();
    (g.width_m * 2.0) / (g.speed_kmh / 3.6)
}

/// Reading-rate bound on copy length; never below three words.
pub fn max_word_count(viewing_time_s: f64) -> u32 {
    if !viewing_time_s.is_finite() || viewing_time_s <= 0.0 {
        return MIN_WORD_COUNT;
    }
    let words = (viewing_time_s * WORDS_PER_SECOND).floor();
    (words.min(u32::MAX as f64) as u32).max(MIN_WORD_COUNT)
}

/// Contrast ratio required at this speed and distance.
pub fn required_contrast_ratio(distance_m: f64, speed_kmh: f64) -> f64 {
    let g = BoardGeometry::new(distance_m, DEFAULT_BOARD_WIDTH_M, DEFAULT_BOARD_HEIGHT_M, speed_kmh)
        .sanitized();
    BASE_CONTRAST_RATIO
        + 1.5 * (speed_factor(g.speed_kmh) - 1.0)
        + (g.distance_m / 150.0).min(1.0)
}

/// Legibility thresholds for one board at one viewing distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometryThresholds {
    pub speed_factor: f64,
    pub min_font_height_m: f64,
    pub min_font_height_in: f64,
    pub min_font_height_px: f64,
    pub max_word_count: u32,
    pub required_contrast_ratio: f64,
    pub viewing_time_seconds: f64,
}

impl GeometryThresholds {
    pub fn compute(geometry: &BoardGeometry) -> Self {
        let g = geometry.sanitized();
        let font_m = minimum_font_height_m(g.distance_m, g.height_m, g.speed_kmh);
        let viewing_time = viewing_time_seconds(g.width_m, g.speed_kmh);

        Self {
            speed_factor: speed_factor(g.speed_kmh),
            min_font_height_m: font_m,
            min_font_height_in: font_m * INCHES_PER_METER,
            min_font_height_px: font_m / g.height_m * REFERENCE_CANVAS_HEIGHT_PX,
            max_word_count: max_word_count(viewing_time),
            required_contrast_ratio: required_contrast_ratio(g.distance_m, g.speed_kmh),
            viewing_time_seconds: viewing_time,
        }
    }
}
