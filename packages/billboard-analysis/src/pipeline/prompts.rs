//! Prompts for the vision model.
//!
//! The system prompt is a fixed contract. The context prompt always states
//! the numeric thresholds computed for this board; the score ceilings it
//! announces are enforced again by the score mapper.

use std::fmt::Write;

use crate::pipeline::geometry::GeometryThresholds;
use crate::types::context::AnalysisContext;

/// Minimum share of the text area that must be Arabic script.
pub const ARABIC_DOMINANCE_RATIO: f64 = 0.5;

/// Overall-score ceiling (0–10) when no Arabic text is present.
pub const CEILING_NO_ARABIC: f64 = 4.5;

/// Overall-score ceiling (0–10) when Arabic is present but not primary.
pub const CEILING_ARABIC_SECONDARY: f64 = 6.0;

/// Overall-score ceiling (0–10) when copy exceeds the word limit.
pub const CEILING_WORD_LIMIT: f64 = 6.5;

/// Fixed analysis contract sent as the system message.
pub const SYSTEM_PROMPT: &str = r#"You are an outdoor-advertising legibility auditor reviewing a billboard creative for drivers in Oman.

Judge ONLY what is visible in the supplied image. Quote the actual text you read. Never reuse example values.

Scoring scale: every score is 0-10 with one decimal. 10 = instantly legible at speed, 0 = unreadable.
Use the full range. A score must follow from the measurements you report, not from habit.

Regulatory context: Omani municipal advertising rules require Arabic text on every roadside board, and Arabic must be the primary (dominant) script.

Return ONLY one JSON object, no markdown, with this shape:
{
  "text_content": {"headline": "...", "body": "...", "cta": "...", "all_text_elements": ["..."]},
  "visual_analysis": {"headline_font_inches": <number>, "contrast_ratio": "<n>:1", "clutter_score": <0-10, 10 = cluttered>},
  "arabic_analysis": {"arabic_detected": <bool>, "arabic_is_primary": <bool>, "ordinance_compliant": <bool>, "notes": "..."},
  "readability_metrics": {"word_count": <int>, "viewing_time_seconds": <number>, "max_recommended_words": <int>, "compliant": <bool>},
  "assessment": {"overall_score": <0-10>, "critical_issues": ["..."], "scores_breakdown": {"font": <0-10>, "contrast": <0-10>, "layout": <0-10>, "cta": <0-10>}},
  "distance_scores": {"at_50m": <0-10>, "at_100m": <0-10>, "at_150m": <0-10>},
  "recommendations": [{"priority": "HIGH|MEDIUM|LOW", "issue": "...", "action": "...", "expected_impact": "..."}]
}"#;

/// System and user prompt for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Build the prompt pair for a request.
pub fn build_prompts(context: &AnalysisContext, image_name: &str) -> PromptPair {
    PromptPair {
        system: SYSTEM_PROMPT.to_string(),
        user: format_context_prompt(context, &context.thresholds(), image_name),
    }
}

/// Per-request context block. Deterministic for identical inputs.
pub fn format_context_prompt(
    context: &AnalysisContext,
    thresholds: &GeometryThresholds,
    image_name: &str,
) -> String {
    let mut out = String::new();
    let g = &context.geometry;

    // Writing to a String cannot fail.
    let _ = writeln!(out, "Billboard creative: {}", image_name);
    let _ = writeln!(out, "Location: {}", context.location_label);
    let _ = writeln!(
        out,
        "Board: {:.1} m wide x {:.1} m high, viewed from {:.0} m",
        g.width_m, g.height_m, context.viewing_distance_m
    );
    let _ = writeln!(
        out,
        "Traffic: {:.0} km/h ({:.0} mph) on a {}",
        context.speed.kmh,
        context.speed.mph,
        context.speed.road_category.label()
    );
    let _ = writeln!(
        out,
        "Visibility: lighting {:?}, traffic flow {:?}, obstruction {:?}",
        context.visibility.lighting, context.visibility.traffic_flow, context.visibility.obstruction
    );

    out.push_str("\nLEGIBILITY THRESHOLDS (computed for this board, apply them exactly):\n");
    let _ = writeln!(
        out,
        "- Minimum letter height: {:.2} m ({:.0} inches, {:.0} px on a 1080 px face)",
        thresholds.min_font_height_m, thresholds.min_font_height_in, thresholds.min_font_height_px
    );
    let _ = writeln!(
        out,
        "- Viewing window: {:.1} seconds",
        thresholds.viewing_time_seconds
    );
    let _ = writeln!(out, "- Maximum word count: {} words", thresholds.max_word_count);
    let _ = writeln!(
        out,
        "- Minimum contrast ratio: {:.1}:1",
        thresholds.required_contrast_ratio
    );

    out.push_str("\nCOMPLIANCE RULES:\n");
    let _ = writeln!(
        out,
        "- Arabic script must cover at least {:.0}% of the text area.",
        ARABIC_DOMINANCE_RATIO * 100.0
    );

    out.push_str("\nSCORE CEILINGS (overall_score, 0-10):\n");
    let _ = writeln!(
        out,
        "- If Arabic text is absent, overall_score <= {:.1}",
        CEILING_NO_ARABIC
    );
    let _ = writeln!(
        out,
        "- If Arabic is present but not primary, overall_score <= {:.1}",
        CEILING_ARABIC_SECONDARY
    );
    let _ = writeln!(
        out,
        "- If word count exceeds {} words, overall_score <= {:.1}",
        thresholds.max_word_count, CEILING_WORD_LIMIT
    );

    if context.from_metadata {
        let b = &context.business;
        out.push_str("\nMARKET CONTEXT:\n");
        let _ = writeln!(
            out,
            "- Rent {:.0} OMR/month, about {} impressions/month, CPM {:.2} OMR",
            b.rental_rate_omr, b.monthly_impressions, b.cpm_omr
        );
        if !b.competitors.is_empty() {
            let _ = writeln!(out, "- Competing boards nearby: {}", b.competitors.join("; "));
        }
    }

    out.push_str("\nAnalyze the attached image against these thresholds and return the JSON object.");
    out
}

/// Correction appended to the user prompt after a rejected attempt.
pub fn format_retry_note(reason: &str) -> String {
    format!(
        "\n\nYour previous response could not be used: {}.\n\
         Look at the image again, report the text you actually see, derive the scores from your \
         measurements, and return ONLY the JSON object.",
        reason
    )
}
