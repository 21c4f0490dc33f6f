//! Billboard reference data.

use serde::{Deserialize, Serialize};

/// Speed assumed when a posted limit is missing or unreadable.
pub const DEFAULT_SPEED_KMH: f64 = 80.0;

/// Physical format of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardFormat {
    Unipole,
    Billboard,
    Mega,
    Gantry,
    Digital,
    Wall,
}

/// Whether the board faces one or both carriageways.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Directionality {
    OneWay,
    Bidirectional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lighting {
    Unlit,
    Illuminated,
    Backlit,
    Digital,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ownership {
    Government,
    Municipality,
    Private,
}

/// Road-type classification driving legibility and traffic assumptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadCategory {
    Urban,
    Arterial,
    Highway,
    Expressway,
}

impl RoadCategory {
    /// Classify by travel speed using the same bands as the speed factor.
    pub fn from_speed(speed_kmh: f64) -> Self {
        if speed_kmh <= 50.0 {
            Self::Urban
        } else if speed_kmh <= 80.0 {
            Self::Arterial
        } else if speed_kmh <= 100.0 {
            Self::Highway
        } else {
            Self::Expressway
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Urban => "urban street",
            Self::Arterial => "arterial road",
            Self::Highway => "highway",
            Self::Expressway => "expressway",
        }
    }
}

/// A physical billboard site. Immutable reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillboardLocation {
    pub id: String,
    pub name: String,
    pub road: String,
    pub district: String,
    pub board_type: BoardFormat,
    pub width_m: f64,
    pub height_m: f64,
    pub distance_from_road_m: f64,

    /// Posted limit as printed on site surveys, e.g. "100–120" or "60".
    pub speed_limit: String,

    pub directionality: Directionality,
    pub lighting: Lighting,
    pub ownership: Ownership,

    /// Monthly rental in Omani rials, when known.
    #[serde(default)]
    pub rental_rate_omr_month: Option<f64>,
}

impl BillboardLocation {
    /// Create a location with neutral defaults; refine with the `with_*` setters.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            road: String::new(),
            district: String::new(),
            board_type: BoardFormat::Billboard,
            width_m: 12.0,
            height_m: 4.0,
            distance_from_road_m: 50.0,
            speed_limit: "80".to_string(),
            directionality: Directionality::OneWay,
            lighting: Lighting::Illuminated,
            ownership: Ownership::Private,
            rental_rate_omr_month: None,
        }
    }

    pub fn with_road(mut self, road: impl Into<String>, district: impl Into<String>) -> Self {
        self.road = road.into();
        self.district = district.into();
        self
    }

    pub fn with_format(mut self, board_type: BoardFormat) -> Self {
        self.board_type = board_type;
        self
    }

    pub fn with_size(mut self, width_m: f64, height_m: f64) -> Self {
        self.width_m = width_m;
        self.height_m = height_m;
        self
    }

    pub fn with_distance(mut self, distance_from_road_m: f64) -> Self {
        self.distance_from_road_m = distance_from_road_m;
        self
    }

    pub fn with_speed_limit(mut self, speed_limit: impl Into<String>) -> Self {
        self.speed_limit = speed_limit.into();
        self
    }

    pub fn with_directionality(mut self, directionality: Directionality) -> Self {
        self.directionality = directionality;
        self
    }

    pub fn with_lighting(mut self, lighting: Lighting) -> Self {
        self.lighting = lighting;
        self
    }

    pub fn with_ownership(mut self, ownership: Ownership) -> Self {
        self.ownership = ownership;
        self
    }

    pub fn with_rental_rate(mut self, omr_per_month: f64) -> Self {
        self.rental_rate_omr_month = Some(omr_per_month);
        self
    }

    /// Face area in square meters.
    pub fn area_m2(&self) -> f64 {
        self.width_m.max(0.0) * self.height_m.max(0.0)
    }

    /// Midpoint of the posted speed range.
    pub fn average_speed_kmh(&self) -> f64 {
        parse_speed_range(&self.speed_limit).unwrap_or(DEFAULT_SPEED_KMH)
    }

    pub fn road_category(&self) -> RoadCategory {
        RoadCategory::from_speed(self.average_speed_kmh())
    }

    /// Human-readable label used in prompts and fallback hashing.
    pub fn label(&self) -> String {
        if self.district.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.district)
        }
    }
}

/// Parse a posted speed such as "100–120", "60-80", "80 to 100" or "120"
/// into its midpoint. Returns `None` when no positive number is present.
pub fn parse_speed_range(raw: &str) -> Option<f64> {
    let numbers: Vec<f64> = raw
        .split(|c: char| !(c.is_ascii_digit() || c == '.'))
        .filter_map(|part| part.parse::<f64>().ok())
        .filter(|n| n.is_finite() && *n > 0.0)
        .collect();

    match numbers.as_slice() {
        [] => None,
        [single] => Some(*single),
        [low, high, ..] => Some((low + high) / 2.0),
    }
}
