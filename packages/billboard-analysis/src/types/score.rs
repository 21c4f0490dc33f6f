//! Site scoring output.

use serde::{Deserialize, Serialize};

/// Weighted score of a candidate billboard site.
///
/// `total_score` is always `round(speed + distance + size + cost)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationScore {
    /// 0–30; slower traffic reads more.
    pub speed_score: f64,
    /// 0–25; closer boards read more.
    pub distance_score: f64,
    /// 0–20; normalized against a 70 m² face.
    pub size_score: f64,
    /// 0–25; cheaper rent scores higher.
    pub cost_score: f64,
    /// 0–100.
    pub total_score: u32,

    /// 20–95.
    pub roi_score: u32,
    /// 20–100.
    pub readability_score: u32,
    /// 20–100.
    pub suitability_score: u32,

    pub daily_impressions: u64,
    pub cpm_omr: f64,
}

impl LocationScore {
    pub fn sub_score_sum(&self) -> f64 {
        self.speed_score + self.distance_score + self.size_score + self.cost_score
    }
}
