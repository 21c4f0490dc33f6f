//! The untrusted model response (wire schema).
//!
//! Every field is optional. Models routinely drop sections, quote numbers,
//! or invent casing, so numeric fields accept `6.5`, `"6.5"` and `"6.5/10"`
//! and priorities are matched case-insensitively.

use serde::{Deserialize, Deserializer, Serialize};

/// A parsed model response awaiting validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisCandidate {
    #[serde(default)]
    pub text_content: Option<TextContent>,

    #[serde(default)]
    pub visual_analysis: Option<VisualAnalysis>,

    #[serde(default)]
    pub arabic_analysis: Option<ArabicAnalysis>,

    #[serde(default)]
    pub readability_metrics: Option<ReadabilityMetrics>,

    #[serde(default)]
    pub assessment: Option<Assessment>,

    #[serde(default)]
    pub distance_scores: Option<DistanceScores>,

    #[serde(default)]
    pub recommendations: Vec<Recommendation>,

    // Legacy flat fields from the older free-text contract.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub overall_score: Option<f64>,

    #[serde(default)]
    pub analysis: Option<String>,

    #[serde(default)]
    pub detected_text: Option<String>,
}

impl AnalysisCandidate {
    /// Overall score on the 0–10 scale, structured field first.
    pub fn overall_score(&self) -> Option<f64> {
        self.assessment
            .as_ref()
            .and_then(|a| a.overall_score)
            .or(self.overall_score)
            .filter(|s| s.is_finite())
            .map(to_ten_scale)
    }

    /// Whether structured text content carries anything.
    pub fn has_text_content(&self) -> bool {
        self.text_content.as_ref().is_some_and(|t| !t.is_empty())
    }

    /// Whether any legacy free-text field carries anything.
    pub fn has_legacy_text(&self) -> bool {
        let filled = |s: &Option<String>| s.as_deref().is_some_and(|s| !s.trim().is_empty());
        filled(&self.analysis) || filled(&self.detected_text)
    }

    pub fn critical_issues(&self) -> &[String] {
        self.assessment
            .as_ref()
            .map(|a| a.critical_issues.as_slice())
            .unwrap_or(&[])
    }

    pub fn cta(&self) -> Option<&str> {
        self.text_content
            .as_ref()
            .and_then(|t| t.cta.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub cta: Option<String>,
    #[serde(default)]
    pub all_text_elements: Vec<String>,
}

impl TextContent {
    pub fn is_empty(&self) -> bool {
        let blank = |s: &Option<String>| s.as_deref().map_or(true, |s| s.trim().is_empty());
        blank(&self.headline)
            && blank(&self.body)
            && blank(&self.cta)
            && self.all_text_elements.iter().all(|s| s.trim().is_empty())
    }

    /// Words across every detected text element, or headline/body/cta when
    /// the element list is empty.
    pub fn word_count(&self) -> usize {
        let count = |s: &str| s.split_whitespace().count();
        if !self.all_text_elements.is_empty() {
            return self.all_text_elements.iter().map(|s| count(s.as_str())).sum();
        }
        [&self.headline, &self.body, &self.cta]
            .into_iter()
            .flatten()
            .map(|s| count(s.as_str()))
            .sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualAnalysis {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub headline_font_inches: Option<f64>,

    /// Often returned as `"4.5:1"`; see [`VisualAnalysis::contrast_ratio`].
    #[serde(default)]
    pub contrast_ratio: Option<serde_json::Value>,

    /// 0 (clean) to 10 (cluttered).
    #[serde(default, deserialize_with = "lenient_f64")]
    pub clutter_score: Option<f64>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl VisualAnalysis {
    /// Contrast ratio as a number, reading `4.5`, `"4.5"` or `"4.5:1"`.
    pub fn contrast_ratio(&self) -> Option<f64> {
        self.contrast_ratio.as_ref().and_then(value_to_f64)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArabicAnalysis {
    #[serde(default)]
    pub arabic_detected: Option<bool>,
    #[serde(default)]
    pub arabic_is_primary: Option<bool>,
    #[serde(default)]
    pub ordinance_compliant: Option<bool>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadabilityMetrics {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub word_count: Option<u32>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub viewing_time_seconds: Option<f64>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub max_recommended_words: Option<u32>,
    #[serde(default)]
    pub compliant: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub overall_score: Option<f64>,
    #[serde(default)]
    pub critical_issues: Vec<String>,
    #[serde(default)]
    pub scores_breakdown: Option<ScoresBreakdown>,
}

/// Per-category scores on the model's 0–10 scale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoresBreakdown {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub font: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub contrast: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub layout: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub cta: Option<f64>,
}

/// Model-supplied readability at three distances, 0–10 scale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DistanceScores {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub at_50m: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub at_100m: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub at_150m: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Case-insensitive; unknown labels fall back to `Medium`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" | "critical" | "urgent" => Self::High,
            "low" | "minor" | "quick" | "quick win" | "quick_win" => Self::Low,
            _ => Self::Medium,
        }
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Priority::parse).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub issue: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub expected_impact: Option<String>,
}

/// Bring a model score onto the 0–10 scale. Values in (10, 100] are read
/// as the model slipping onto a 0–100 scale.
pub fn to_ten_scale(value: f64) -> f64 {
    if value > 10.0 && value <= 100.0 {
        value / 10.0
    } else {
        value
    }
}

/// Read a number from a JSON number or a string such as `"6.5/10"` or `"4.5:1"`.
pub(crate) fn value_to_f64(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => leading_number(s),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn leading_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    let end = trimmed
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || *c == '.' || *c == '-'))
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_f64))
}

fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(value_to_f64)
        .filter(|n| *n >= 0.0)
        .map(|n| n.round().min(u32::MAX as f64) as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_response_parses() {
        let json = r#"{
            "text_content": {"headline": "Fly Direct", "body": "Daily to Salalah", "cta": "Book now", "all_text_elements": ["Fly Direct", "Daily to Salalah", "Book now"]},
            "visual_analysis": {"headline_font_inches": "48", "contrast_ratio": "7.2:1", "clutter_score": 3, "dominant_colors": ["blue"]},
            "arabic_analysis": {"arabic_detected": true, "arabic_is_primary": true, "ordinance_compliant": true},
            "readability_metrics": {"word_count": 7, "viewing_time_seconds": 4.3, "max_recommended_words": 10, "compliant": true},
            "assessment": {"overall_score": "6.5/10", "critical_issues": ["Logo too small"]},
            "recommendations": [{"priority": "high", "issue": "Logo", "action": "Enlarge", "expected_impact": "+1"}]
        }"#;

        let candidate: AnalysisCandidate = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.overall_score(), Some(6.5));
        assert!(candidate.has_text_content());
        assert_eq!(candidate.cta(), Some("Book now"));

        let visual = candidate.visual_analysis.as_ref().unwrap();
        assert_eq!(visual.contrast_ratio(), Some(7.2));
        assert_eq!(visual.headline_font_inches, Some(48.0));
        assert!(visual.extra.contains_key("dominant_colors"));

        assert_eq!(candidate.recommendations[0].priority, Priority::High);
        assert_eq!(candidate.text_content.unwrap().word_count(), 7);
    }

    #[test]
    fn test_legacy_score_used_when_assessment_missing() {
        let candidate: AnalysisCandidate =
            serde_json::from_str(r#"{"overall_score": 5, "analysis": "Busy layout"}"#).unwrap();
        assert_eq!(candidate.overall_score(), Some(5.0));
        assert!(candidate.has_legacy_text());
        assert!(!candidate.has_text_content());
    }

    #[test]
    fn test_null_and_unknown_priority() {
        let recs: Vec<Recommendation> = serde_json::from_str(
            r#"[{"priority": null, "issue": "a"}, {"priority": "Whenever", "issue": "b"}, {"priority": "LOW"}]"#,
        )
        .unwrap();
        assert_eq!(recs[0].priority, Priority::Medium);
        assert_eq!(recs[1].priority, Priority::Medium);
        assert_eq!(recs[2].priority, Priority::Low);
    }

    #[test]
    fn test_blank_text_content_counts_as_absent() {
        let candidate: AnalysisCandidate = serde_json::from_str(
            r#"{"text_content": {"headline": " ", "all_text_elements": []}}"#,
        )
        .unwrap();
        assert!(!candidate.has_text_content());
    }

    #[test]
    fn test_non_numeric_score_is_absent() {
        let candidate: AnalysisCandidate =
            serde_json::from_str(r#"{"assessment": {"overall_score": "excellent"}}"#).unwrap();
        assert_eq!(candidate.overall_score(), None);
    }

    #[test]
    fn test_percent_scale_score_is_rescaled() {
        let candidate: AnalysisCandidate =
            serde_json::from_str(r#"{"assessment": {"overall_score": 62}}"#).unwrap();
        assert_eq!(candidate.overall_score(), Some(6.2));
        assert_eq!(to_ten_scale(10.0), 10.0);
        assert_eq!(to_ten_scale(250.0), 250.0);
    }
}
