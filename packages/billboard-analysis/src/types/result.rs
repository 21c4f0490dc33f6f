//! The numeric output contract handed to UI and report collaborators.

use serde::{Deserialize, Serialize};

pub const OVERALL_MIN: u32 = 20;
pub const OVERALL_MAX: u32 = 100;
pub const CATEGORY_MIN: u32 = 5;
pub const CATEGORY_MAX: u32 = 25;
pub const CURVE_MIN: u32 = 20;
pub const CURVE_MAX: u32 = 95;

/// Round and clamp a raw score into `[min, max]`. Non-finite input maps to `min`.
pub fn clamp_score(raw: f64, min: u32, max: u32) -> u32 {
    if !raw.is_finite() {
        return min;
    }
    raw.round().clamp(min as f64, max as f64) as u32
}

/// Final analysis of one billboard creative.
///
/// Constructed through [`AnalysisResult::new`], which clamps every numeric
/// field to its documented range. Deserialization clamps the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "AnalysisResultWire")]
pub struct AnalysisResult {
    /// 20–100.
    pub overall_score: u32,
    pub category_scores: CategoryScores,
    pub distance_readability: DistanceCurve,
    pub issues: IssueLists,
    pub detailed_analysis: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compliance_notes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regional_notes: Vec<String>,
    pub provenance: Provenance,

    /// Present whenever the result did not come from a clean model answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_note: Option<String>,
}

/// Unchecked wire form; only reachable through `From`, which clamps.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisResultWire {
    overall_score: u32,
    category_scores: CategoryScores,
    distance_readability: DistanceCurve,
    issues: IssueLists,
    detailed_analysis: String,
    #[serde(default)]
    compliance_notes: Vec<String>,
    #[serde(default)]
    regional_notes: Vec<String>,
    provenance: Provenance,
    #[serde(default)]
    api_note: Option<String>,
}

impl From<AnalysisResultWire> for AnalysisResult {
    fn from(wire: AnalysisResultWire) -> Self {
        Self {
            overall_score: wire.overall_score.clamp(OVERALL_MIN, OVERALL_MAX),
            category_scores: wire.category_scores.clamped(),
            distance_readability: wire.distance_readability.clamped(),
            issues: wire.issues,
            detailed_analysis: wire.detailed_analysis,
            compliance_notes: wire.compliance_notes,
            regional_notes: wire.regional_notes,
            provenance: wire.provenance,
            api_note: wire.api_note,
        }
    }
}

impl AnalysisResult {
    pub fn new(
        overall_score: f64,
        category_scores: CategoryScores,
        distance_readability: DistanceCurve,
        issues: IssueLists,
        detailed_analysis: impl Into<String>,
        provenance: Provenance,
    ) -> Self {
        Self {
            overall_score: clamp_score(overall_score, OVERALL_MIN, OVERALL_MAX),
            category_scores: category_scores.clamped(),
            distance_readability: distance_readability.clamped(),
            issues,
            detailed_analysis: detailed_analysis.into(),
            compliance_notes: Vec::new(),
            regional_notes: Vec::new(),
            provenance,
            api_note: None,
        }
    }

    pub fn with_compliance_notes(mut self, notes: Vec<String>) -> Self {
        self.compliance_notes = notes;
        self
    }

    pub fn with_regional_notes(mut self, notes: Vec<String>) -> Self {
        self.regional_notes = notes;
        self
    }

    pub fn with_api_note(mut self, note: impl Into<String>) -> Self {
        self.api_note = Some(note.into());
        self
    }

    /// Whether the scores came from a model answer rather than synthesis.
    pub fn is_model_derived(&self) -> bool {
        !matches!(self.provenance, Provenance::Fallback)
    }
}

/// Where the numbers came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// A validated structured model response.
    Model,
    /// Best-effort extraction from an unstructured model response.
    Salvaged,
    /// Deterministic synthesis without a usable model response.
    Fallback,
}

/// Four category scores, 5–25 each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub font: u32,
    pub contrast: u32,
    pub layout: u32,
    pub cta: u32,
}

impl CategoryScores {
    pub fn from_raw(font: f64, contrast: f64, layout: f64, cta: f64) -> Self {
        let clamp = |v: f64| clamp_score(v, CATEGORY_MIN, CATEGORY_MAX);
        Self {
            font: clamp(font),
            contrast: clamp(contrast),
            layout: clamp(layout),
            cta: clamp(cta),
        }
    }

    fn clamped(self) -> Self {
        let clamp = |v: u32| v.clamp(CATEGORY_MIN, CATEGORY_MAX);
        Self {
            font: clamp(self.font),
            contrast: clamp(self.contrast),
            layout: clamp(self.layout),
            cta: clamp(self.cta),
        }
    }

    pub fn total(&self) -> u32 {
        self.font + self.contrast + self.layout + self.cta
    }
}

/// Readability at 50 m, 100 m and 150 m, 20–95 each, non-increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceCurve {
    pub at_50m: u32,
    pub at_100m: u32,
    pub at_150m: u32,
}

impl DistanceCurve {
    pub fn from_raw(at_50m: f64, at_100m: f64, at_150m: f64) -> Self {
        let clamp = |v: f64| clamp_score(v, CURVE_MIN, CURVE_MAX);
        Self {
            at_50m: clamp(at_50m),
            at_100m: clamp(at_100m),
            at_150m: clamp(at_150m),
        }
        .clamped()
    }

    /// Derive the curve from an overall score: +10 close up, −15 far away.
    pub fn from_overall(overall: f64) -> Self {
        Self::from_raw(overall + 10.0, overall, overall - 15.0)
    }

    fn clamped(self) -> Self {
        let clamp = |v: u32| v.clamp(CURVE_MIN, CURVE_MAX);
        let at_50m = clamp(self.at_50m);
        let at_100m = clamp(self.at_100m).min(at_50m);
        let at_150m = clamp(self.at_150m).min(at_100m);
        Self {
            at_50m,
            at_100m,
            at_150m,
        }
    }
}

/// Whether issue lists came from the model or were synthesized.
///
/// An empty critical list with `Model` origin means the model reported none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueOrigin {
    Model,
    Synthesized,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub issue: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_impact: Option<String>,
}

impl Issue {
    pub fn new(issue: impl Into<String>) -> Self {
        Self {
            issue: issue.into(),
            action: None,
            expected_impact: None,
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_expected_impact(mut self, impact: impl Into<String>) -> Self {
        self.expected_impact = Some(impact.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueLists {
    pub critical: Vec<Issue>,
    pub minor: Vec<Issue>,
    pub quick_wins: Vec<Issue>,
    pub origin: IssueOrigin,
}

impl IssueLists {
    pub fn empty(origin: IssueOrigin) -> Self {
        Self {
            critical: Vec::new(),
            minor: Vec::new(),
            quick_wins: Vec::new(),
            origin,
        }
    }

    pub fn len(&self) -> usize {
        self.critical.len() + self.minor.len() + self.quick_wins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_score_handles_nan() {
        assert_eq!(clamp_score(f64::NAN, 20, 100), 20);
        assert_eq!(clamp_score(f64::INFINITY, 20, 100), 20);
        assert_eq!(clamp_score(150.0, 20, 100), 100);
        assert_eq!(clamp_score(54.5, 20, 100), 55);
    }

    #[test]
    fn test_curve_from_overall() {
        let curve = DistanceCurve::from_overall(60.0);
        assert_eq!(curve.at_50m, 70);
        assert_eq!(curve.at_100m, 60);
        assert_eq!(curve.at_150m, 45);

        let high = DistanceCurve::from_overall(100.0);
        assert_eq!(high.at_50m, 95);
        assert_eq!(high.at_100m, 95);
        assert_eq!(high.at_150m, 85);
    }

    #[test]
    fn test_curve_is_monotonic_even_for_odd_input() {
        let curve = DistanceCurve::from_raw(40.0, 80.0, 90.0);
        assert_eq!(curve.at_50m, 40);
        assert_eq!(curve.at_100m, 40);
        assert_eq!(curve.at_150m, 40);
    }

    #[test]
    fn test_result_serializes_api_note_in_camel_case() {
        let result = AnalysisResult::new(
            10.0,
            CategoryScores::from_raw(1.0, 30.0, 12.0, 12.0),
            DistanceCurve::from_overall(10.0),
            IssueLists::empty(IssueOrigin::Synthesized),
            "text",
            Provenance::Fallback,
        )
        .with_api_note("fallback");

        assert_eq!(result.overall_score, 20);
        assert_eq!(result.category_scores.font, 5);
        assert_eq!(result.category_scores.contrast, 25);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["apiNote"], "fallback");
        assert_eq!(json["overallScore"], 20);
        assert_eq!(json["distanceReadability"]["at50m"], 20);
        assert!(json.get("complianceNotes").is_none());
    }

    #[test]
    fn test_deserialized_result_is_clamped() {
        let result: AnalysisResult = serde_json::from_value(serde_json::json!({
            "overallScore": 400,
            "categoryScores": {"font": 0, "contrast": 90, "layout": 12, "cta": 12},
            "distanceReadability": {"at50m": 10, "at100m": 99, "at150m": 50},
            "issues": {"critical": [], "minor": [], "quickWins": [], "origin": "model"},
            "detailedAnalysis": "edited",
            "provenance": "model"
        }))
        .unwrap();

        assert_eq!(result.overall_score, OVERALL_MAX);
        assert_eq!(result.category_scores.font, CATEGORY_MIN);
        assert_eq!(result.category_scores.contrast, CATEGORY_MAX);
        assert_eq!(result.distance_readability.at_50m, CURVE_MIN);
        assert_eq!(result.distance_readability.at_100m, CURVE_MIN);
    }
}
