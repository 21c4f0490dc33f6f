//! Map a validated 0–10 model response onto the result schema.
//!
//! The ceilings announced in the prompt are applied here again; the model
//! does not always honor them.

use std::collections::HashSet;

use crate::pipeline::geometry::GeometryThresholds;
use crate::pipeline::prompts::{CEILING_ARABIC_SECONDARY, CEILING_NO_ARABIC, CEILING_WORD_LIMIT};
use crate::types::candidate::{to_ten_scale, AnalysisCandidate, Priority};
use crate::types::context::{AnalysisContext, ObstructionLevel};
use crate::types::location::Lighting;
use crate::types::result::{
    AnalysisResult, CategoryScores, DistanceCurve, Issue, IssueLists, IssueOrigin, Provenance,
};

/// Model score used when a salvaged response somehow lacks one.
const NEUTRAL_SCORE: f64 = 5.0;

/// 0–10 model scale to the 0–25 category scale.
const CATEGORY_SCALE: f64 = 2.5;

const SALVAGED_NOTE: &str =
    "Scores were read from an unstructured model response and are approximate.";

/// A score ceiling and the rule that imposed it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ceiling {
    pub limit: f64,
    pub rule: &'static str,
}

/// The strictest ceiling the candidate triggers, if any.
pub fn applicable_ceiling(
    candidate: &AnalysisCandidate,
    thresholds: &GeometryThresholds,
) -> Option<Ceiling> {
    let mut ceilings = Vec::new();

    if let Some(arabic) = &candidate.arabic_analysis {
        if arabic.arabic_detected == Some(false) {
            ceilings.push(Ceiling {
                limit: CEILING_NO_ARABIC,
                rule: "no Arabic text",
            });
        } else if arabic.arabic_is_primary == Some(false) {
            ceilings.push(Ceiling {
                limit: CEILING_ARABIC_SECONDARY,
                rule: "Arabic is not the primary script",
            });
        }
    }

    if word_count(candidate).is_some_and(|w| w > thresholds.max_word_count as usize) {
        ceilings.push(Ceiling {
            limit: CEILING_WORD_LIMIT,
            rule: "word count over the limit",
        });
    }

    ceilings
        .into_iter()
        .min_by(|a, b| a.limit.total_cmp(&b.limit))
}

/// Reported word count, else counted from the detected text.
fn word_count(candidate: &AnalysisCandidate) -> Option<usize> {
    candidate
        .readability_metrics
        .as_ref()
        .and_then(|m| m.word_count)
        .map(|w| w as usize)
        .or_else(|| {
            candidate
                .text_content
                .as_ref()
                .filter(|t| !t.is_empty())
                .map(|t| t.word_count())
        })
}

/// Maps candidates for one request context.
#[derive(Debug, Clone)]
pub struct ScoreMapper<'a> {
    context: &'a AnalysisContext,
    thresholds: GeometryThresholds,
}

impl<'a> ScoreMapper<'a> {
    pub fn new(context: &'a AnalysisContext) -> Self {
        Self {
            context,
            thresholds: context.thresholds(),
        }
    }

    pub fn thresholds(&self) -> &GeometryThresholds {
        &self.thresholds
    }

    /// Produce the final result. Never fails; every number is clamped.
    pub fn map(&self, candidate: &AnalysisCandidate, provenance: Provenance) -> AnalysisResult {
        let reported = candidate
            .overall_score()
            .unwrap_or(NEUTRAL_SCORE)
            .clamp(0.0, 10.0);
        let ceiling = applicable_ceiling(candidate, &self.thresholds);
        let score = match ceiling {
            Some(c) => reported.min(c.limit),
            None => reported,
        };

        let result = AnalysisResult::new(
            score * 10.0,
            self.category_scores(candidate, score, ceiling),
            self.distance_curve(candidate, score * 10.0),
            self.issues(candidate),
            self.detailed_analysis(candidate, reported, ceiling),
            provenance,
        )
        .with_compliance_notes(compliance_notes(candidate, &self.thresholds))
        .with_regional_notes(regional_notes(self.context));

        if provenance == Provenance::Salvaged {
            result.with_api_note(SALVAGED_NOTE)
        } else {
            result
        }
    }

    fn category_scores(
        &self,
        candidate: &AnalysisCandidate,
        score: f64,
        ceiling: Option<Ceiling>,
    ) -> CategoryScores {
        let t = &self.thresholds;
        let breakdown = candidate
            .assessment
            .as_ref()
            .and_then(|a| a.scores_breakdown.as_ref());
        let cap = ceiling.map_or(10.0, |c| c.limit);
        let base = |part: Option<f64>| {
            part.filter(|v| v.is_finite())
                .map(|v| to_ten_scale(v).clamp(0.0, cap))
                .unwrap_or(score)
                * CATEGORY_SCALE
        };

        let visual = candidate.visual_analysis.as_ref();

        let font_nudge = match visual.and_then(|v| v.headline_font_inches) {
            Some(inches) if inches >= t.min_font_height_in => 3.0,
            Some(inches) if inches < t.min_font_height_in * 0.5 => -5.0,
            Some(_) => -3.0,
            None => 0.0,
        };

        let contrast_nudge = match visual.and_then(|v| v.contrast_ratio()) {
            Some(ratio) if ratio >= t.required_contrast_ratio => 3.0,
            Some(ratio) if ratio < t.required_contrast_ratio - 2.0 => -5.0,
            Some(_) => -3.0,
            None => 0.0,
        };

        let word_nudge = match word_count(candidate) {
            Some(words) if words <= t.max_word_count as usize => 3.0,
            Some(_) => -5.0,
            None => 0.0,
        };
        let clutter_nudge = match visual.and_then(|v| v.clutter_score) {
            Some(c) if c >= 7.0 => -3.0,
            Some(c) if c <= 3.0 => 2.0,
            _ => 0.0,
        };

        let cta_nudge = if candidate.cta().is_some() {
            2.0
        } else if candidate.has_text_content() {
            -5.0
        } else {
            0.0
        };

        CategoryScores::from_raw(
            base(breakdown.and_then(|b| b.font)) + font_nudge,
            base(breakdown.and_then(|b| b.contrast)) + contrast_nudge,
            base(breakdown.and_then(|b| b.layout)) + word_nudge + clutter_nudge,
            base(breakdown.and_then(|b| b.cta)) + cta_nudge,
        )
    }

    fn distance_curve(&self, candidate: &AnalysisCandidate, overall: f64) -> DistanceCurve {
        let model = candidate
            .distance_scores
            .as_ref()
            .and_then(|d| Some((d.at_50m?, d.at_100m?, d.at_150m?)));

        match model {
            Some((near, mid, far)) => DistanceCurve::from_raw(
                to_ten_scale(near) * 10.0,
                to_ten_scale(mid) * 10.0,
                to_ten_scale(far) * 10.0,
            ),
            None => DistanceCurve::from_overall(overall),
        }
    }

    fn issues(&self, candidate: &AnalysisCandidate) -> IssueLists {
        if candidate.recommendations.is_empty() && candidate.critical_issues().is_empty() {
            return synthesized_issues(self.context, &self.thresholds);
        }

        let mut lists = IssueLists::empty(IssueOrigin::Model);
        let mut seen = HashSet::new();

        for text in candidate.critical_issues() {
            let text = text.trim();
            if !text.is_empty() && seen.insert(text.to_lowercase()) {
                lists.critical.push(Issue::new(text));
            }
        }

        for rec in &candidate.recommendations {
            let Some(text) = rec
                .issue
                .as_deref()
                .or(rec.action.as_deref())
                .map(str::trim)
                .filter(|s| !s.is_empty())
            else {
                continue;
            };
            if !seen.insert(text.to_lowercase()) {
                continue;
            }

            let mut issue = Issue::new(text);
            if let Some(action) = rec.action.as_deref().filter(|a| a.trim() != text) {
                issue = issue.with_action(action);
            }
            if let Some(impact) = rec.expected_impact.as_deref() {
                issue = issue.with_expected_impact(impact);
            }

            match rec.priority {
                Priority::High => lists.critical.push(issue),
                Priority::Medium => lists.minor.push(issue),
                Priority::Low => lists.quick_wins.push(issue),
            }
        }

        lists
    }

    fn detailed_analysis(
        &self,
        candidate: &AnalysisCandidate,
        reported: f64,
        ceiling: Option<Ceiling>,
    ) -> String {
        let t = &self.thresholds;
        let mut parts = Vec::new();

        if let Some(text) = candidate.text_content.as_ref().filter(|t| !t.is_empty()) {
            let mut seen = Vec::new();
            if let Some(h) = text.headline.as_deref().filter(|s| !s.trim().is_empty()) {
                seen.push(format!("headline \"{}\"", h.trim()));
            }
            if let Some(b) = text.body.as_deref().filter(|s| !s.trim().is_empty()) {
                seen.push(format!("body \"{}\"", b.trim()));
            }
            if let Some(c) = candidate.cta() {
                seen.push(format!("call to action \"{}\"", c));
            }
            if !seen.is_empty() {
                parts.push(format!("Detected text: {}.", seen.join(", ")));
            }
        }

        for legacy in [&candidate.detected_text, &candidate.analysis] {
            if let Some(text) = legacy.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
                parts.push(text.to_string());
            }
        }

        let words = match word_count(candidate) {
            Some(w) => format!("{} words against", w),
            None => "Word count not reported;".to_string(),
        };
        parts.push(format!(
            "{} a limit of {} for a {:.1} s viewing window at {:.0} km/h.",
            words, t.max_word_count, t.viewing_time_seconds, self.context.speed.kmh
        ));
        parts.push(format!(
            "At {:.0} m letters need to be at least {:.2} m ({:.0} in) tall and contrast at least {:.1}:1.",
            self.context.viewing_distance_m,
            t.min_font_height_m,
            t.min_font_height_in,
            t.required_contrast_ratio
        ));

        match ceiling {
            Some(c) if reported > c.limit => parts.push(format!(
                "Model score {:.1}/10 capped at {:.1} ({}).",
                reported, c.limit, c.rule
            )),
            _ => parts.push(format!("Model score {:.1}/10.", reported)),
        }

        parts.join("\n\n")
    }
}

fn compliance_notes(candidate: &AnalysisCandidate, thresholds: &GeometryThresholds) -> Vec<String> {
    let mut notes = Vec::new();

    if let Some(arabic) = &candidate.arabic_analysis {
        if arabic.arabic_detected == Some(false) {
            notes.push(
                "No Arabic text detected; roadside advertising in Oman must carry Arabic."
                    .to_string(),
            );
        } else if arabic.arabic_is_primary == Some(false) {
            notes.push("Arabic is present but not the dominant script.".to_string());
        }
        if arabic.ordinance_compliant == Some(false) {
            notes.push("Reported as non-compliant with the advertising ordinance.".to_string());
        }
        if let Some(extra) = arabic.notes.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            notes.push(extra.to_string());
        }
    }

    if word_count(candidate).is_some_and(|w| w > thresholds.max_word_count as usize) {
        notes.push(format!(
            "Copy exceeds the {}-word limit for this site.",
            thresholds.max_word_count
        ));
    }

    notes
}

/// Notes about the site itself, independent of the creative.
pub(crate) fn regional_notes(context: &AnalysisContext) -> Vec<String> {
    let mut notes = vec![format!(
        "{} traffic at {:.0} km/h ({:.0} mph).",
        capitalize(context.speed.road_category.label()),
        context.speed.kmh,
        context.speed.mph
    )];

    if let Some(district) = &context.district {
        notes.push(format!("District: {}.", district));
    }

    match context.visibility.lighting {
        Lighting::Unlit => notes.push("Unlit board: no night-time visibility.".to_string()),
        Lighting::Digital => {
            notes.push("Digital face: keep each slot legible on its own.".to_string())
        }
        Lighting::Illuminated | Lighting::Backlit => {}
    }

    if context.visibility.obstruction == ObstructionLevel::Significant {
        notes.push("Board is set well back from the road; expect partial obstruction.".to_string());
    }

    notes
}

/// Threshold-driven issue lists for when the model gave none.
pub(crate) fn synthesized_issues(
    context: &AnalysisContext,
    thresholds: &GeometryThresholds,
) -> IssueLists {
    let mut lists = IssueLists::empty(IssueOrigin::Synthesized);

    lists.critical.push(
        Issue::new(format!(
            "Letters must be at least {:.2} m ({:.0} in) tall to read at {:.0} m",
            thresholds.min_font_height_m, thresholds.min_font_height_in, context.viewing_distance_m
        ))
        .with_action("Check the headline cap height against the minimum"),
    );
    if context.speed.kmh > 100.0 {
        lists.critical.push(Issue::new(format!(
            "Only {:.1} s of viewing time at {:.0} km/h",
            thresholds.viewing_time_seconds, context.speed.kmh
        )));
    }

    lists.minor.push(
        Issue::new(format!("Keep copy to {} words or fewer", thresholds.max_word_count))
            .with_expected_impact("Copy can be read in one glance"),
    );
    lists.minor.push(Issue::new(format!(
        "Contrast must reach {:.1}:1 between text and background",
        thresholds.required_contrast_ratio
    )));

    lists.quick_wins.push(
        Issue::new("Make Arabic the primary script")
            .with_action("Lead with the Arabic headline; set English secondary"),
    );
    lists
        .quick_wins
        .push(Issue::new("Use a single bold call to action"));

    lists
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BillboardCatalog;

    fn parse(json: &str) -> AnalysisCandidate {
        serde_json::from_str(json).unwrap()
    }

    fn context() -> AnalysisContext {
        AnalysisContext::defaults("Sultan Qaboos", Some(100.0))
    }

    #[test]
    fn test_no_arabic_ceiling_enforced() {
        let ctx = context();
        let candidate = parse(
            r#"{"text_content": {"headline": "Big Sale"},
                "arabic_analysis": {"arabic_detected": false},
                "assessment": {"overall_score": 9.0}}"#,
        );
        let result = ScoreMapper::new(&ctx).map(&candidate, Provenance::Model);

        assert_eq!(result.overall_score, 45);
        assert!(result.detailed_analysis.contains("capped at 4.5"));
        assert!(result.compliance_notes[0].contains("No Arabic text"));
    }

    #[test]
    fn test_strictest_ceiling_wins() {
        let ctx = context();
        let candidate = parse(
            r#"{"arabic_analysis": {"arabic_detected": true, "arabic_is_primary": false},
                "readability_metrics": {"word_count": 40, "viewing_time_seconds": 1.0},
                "assessment": {"overall_score": 8.0}, "analysis": "busy"}"#,
        );
        let ceiling = applicable_ceiling(&candidate, &ctx.thresholds()).unwrap();
        assert_eq!(ceiling.limit, CEILING_ARABIC_SECONDARY);
        assert_eq!(ScoreMapper::new(&ctx).map(&candidate, Provenance::Model).overall_score, 60);
    }

    #[test]
    fn test_category_scores_stay_in_range() {
        let ctx = context();
        let candidate = parse(
            r#"{"text_content": {"headline": "Visit Nizwa", "cta": "Book now"},
                "visual_analysis": {"headline_font_inches": 200, "contrast_ratio": "12:1", "clutter_score": 1},
                "readability_metrics": {"word_count": 4, "viewing_time_seconds": 1.0},
                "assessment": {"overall_score": 10, "scores_breakdown": {"font": 10, "contrast": 10, "layout": 10, "cta": 10}}}"#,
        );
        let result = ScoreMapper::new(&ctx).map(&candidate, Provenance::Model);

        assert_eq!(result.category_scores.font, 25);
        assert_eq!(result.category_scores.contrast, 25);
        assert!(result.category_scores.total() <= 100);
    }

    #[test]
    fn test_ceiling_caps_model_breakdown() {
        let ctx = context();
        let candidate = parse(
            r#"{"text_content": {"headline": "Big Sale"},
                "arabic_analysis": {"arabic_detected": false},
                "assessment": {"overall_score": 9.0,
                    "scores_breakdown": {"font": 10, "contrast": 10, "layout": 10, "cta": 10}}}"#,
        );
        let result = ScoreMapper::new(&ctx).map(&candidate, Provenance::Model);

        assert_eq!(result.overall_score, 45);
        assert_eq!(result.category_scores.font, 11);
        assert_eq!(result.category_scores.contrast, 11);
        assert!(result.category_scores.total() <= 50);
    }

    #[test]
    fn test_percent_scale_scores_are_rescaled() {
        let ctx = context();
        let candidate = parse(
            r#"{"analysis": "x",
                "assessment": {"overall_score": 62, "scores_breakdown": {"font": 80}},
                "distance_scores": {"at_50m": 70, "at_100m": 60, "at_150m": 40}}"#,
        );
        let result = ScoreMapper::new(&ctx).map(&candidate, Provenance::Model);

        assert_eq!(result.overall_score, 62);
        assert_eq!(result.category_scores.font, 20);
        let curve = result.distance_readability;
        assert_eq!((curve.at_50m, curve.at_100m, curve.at_150m), (70, 60, 40));
    }

    #[test]
    fn test_low_contrast_nudges_down() {
        let ctx = context();
        let good = parse(
            r#"{"analysis": "x", "visual_analysis": {"contrast_ratio": "9:1"},
                "assessment": {"overall_score": 5}}"#,
        );
        let bad = parse(
            r#"{"analysis": "x", "visual_analysis": {"contrast_ratio": "2:1"},
                "assessment": {"overall_score": 5}}"#,
        );
        let mapper = ScoreMapper::new(&ctx);
        let good = mapper.map(&good, Provenance::Model).category_scores.contrast;
        let bad = mapper.map(&bad, Provenance::Model).category_scores.contrast;
        assert_eq!(good, 16);
        assert_eq!(bad, 8);
    }

    #[test]
    fn test_model_distance_scores_used_and_monotonic() {
        let ctx = context();
        let candidate = parse(
            r#"{"analysis": "x", "assessment": {"overall_score": 5},
                "distance_scores": {"at_50m": 8, "at_100m": 9, "at_150m": "3.5"}}"#,
        );
        let curve = ScoreMapper::new(&ctx)
            .map(&candidate, Provenance::Model)
            .distance_readability;
        assert_eq!((curve.at_50m, curve.at_100m, curve.at_150m), (80, 80, 35));
    }

    #[test]
    fn test_issue_mapping_and_dedup() {
        let ctx = context();
        let candidate = parse(
            r#"{"analysis": "x", "assessment": {"overall_score": 5,
                    "critical_issues": ["No Arabic text"]},
                "recommendations": [
                    {"priority": "HIGH", "issue": "no arabic text", "action": "Add Arabic"},
                    {"priority": "medium", "issue": "Tighten copy"},
                    {"priority": "Low", "action": "Bolder CTA", "expected_impact": "+10% recall"},
                    {"priority": "LOW"}
                ]}"#,
        );
        let issues = ScoreMapper::new(&ctx)
            .map(&candidate, Provenance::Model)
            .issues;

        assert_eq!(issues.origin, IssueOrigin::Model);
        assert_eq!(issues.critical.len(), 1);
        assert_eq!(issues.minor[0].issue, "Tighten copy");
        assert_eq!(issues.quick_wins[0].issue, "Bolder CTA");
        assert_eq!(issues.quick_wins[0].action, None);
        assert_eq!(
            issues.quick_wins[0].expected_impact.as_deref(),
            Some("+10% recall")
        );
    }

    #[test]
    fn test_explicitly_empty_critical_list_is_model_origin() {
        let ctx = context();
        let candidate = parse(
            r#"{"analysis": "x", "assessment": {"overall_score": 8, "critical_issues": []},
                "recommendations": [{"priority": "LOW", "issue": "Slightly larger logo"}]}"#,
        );
        let issues = ScoreMapper::new(&ctx)
            .map(&candidate, Provenance::Model)
            .issues;
        assert_eq!(issues.origin, IssueOrigin::Model);
        assert!(issues.critical.is_empty());
    }

    #[test]
    fn test_placeholders_when_model_gave_nothing() {
        let loc = BillboardCatalog::lookup("nizwa-hwy-07").unwrap();
        let ctx = AnalysisContext::from_location(loc, Some(150.0));
        let candidate = parse(r#"{"analysis": "x", "assessment": {"overall_score": 5}}"#);
        let issues = ScoreMapper::new(&ctx)
            .map(&candidate, Provenance::Model)
            .issues;

        assert_eq!(issues.origin, IssueOrigin::Synthesized);
        assert_eq!(issues.critical.len(), 2);
        assert!(!issues.minor.is_empty());
        assert!(!issues.quick_wins.is_empty());
    }

    #[test]
    fn test_salvaged_result_is_flagged() {
        let ctx = context();
        let candidate = parse(r#"{"analysis": "x", "overall_score": 6}"#);
        let result = ScoreMapper::new(&ctx).map(&candidate, Provenance::Salvaged);
        assert_eq!(result.provenance, Provenance::Salvaged);
        assert!(result.api_note.is_some());
        assert!(result.is_model_derived());
    }

    #[test]
    fn test_regional_notes_from_context() {
        let ctx = context();
        let notes = regional_notes(&ctx);
        assert_eq!(notes[0], "Arterial road traffic at 80 km/h (50 mph).");
    }
}
