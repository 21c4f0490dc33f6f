//! Reading model output: strict JSON first, pattern salvage as a last resort.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::candidate::{
    to_ten_scale, AnalysisCandidate, Assessment, Priority, Recommendation,
};

/// Longest free-text analysis kept from a salvaged response.
const MAX_SALVAGED_TEXT: usize = 4000;

static SCORE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"(?i)overall[ _-]?score"?\s*[:=\-]?\s*"?(\d{1,3}(?:\.\d+)?)"#,
        r"(\d{1,2}(?:\.\d+)?)\s*/\s*10\b",
        r"(?i)\bscore\s*(?:of|is|:)?\s*(\d{1,3}(?:\.\d+)?)",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

static BULLET: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*•]|\d{1,2}[.)])\s+(.+?)\s*$").ok());

/// Strip markdown code fences around a response.
pub fn strip_code_fences(raw: &str) -> &str {
    raw.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```JSON")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Parse the outermost `{ … }` span of a response into a candidate.
pub fn parse_candidate(raw: &str) -> Result<AnalysisCandidate, String> {
    let text = strip_code_fences(raw);
    let start = text.find('{').ok_or_else(|| "no JSON object found".to_string())?;
    let end = text
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| "unterminated JSON object".to_string())?;

    serde_json::from_str(&text[start..=end]).map_err(|e| format!("malformed JSON: {}", e))
}

/// Pull an overall score (0–10) out of free text.
///
/// Values in (10, 100] are read as percentages.
pub fn salvage_score(text: &str) -> Option<f64> {
    SCORE_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures_iter(text)
            .filter_map(|c| c.get(1)?.as_str().parse::<f64>().ok())
            .find_map(normalize_score)
    })
}

fn normalize_score(value: f64) -> Option<f64> {
    (value.is_finite() && (0.0..=100.0).contains(&value)).then(|| to_ten_scale(value))
}

fn heading_priority(line: &str) -> Option<Priority> {
    let trimmed = line.trim();
    let is_heading = trimmed.len() < 80
        && (trimmed.ends_with(':')
            || trimmed.starts_with('#')
            || (trimmed.starts_with("**") && trimmed.ends_with("**")));
    if !is_heading {
        return None;
    }

    let lower = trimmed.to_lowercase();
    if lower.contains("critical") || lower.contains("issue") || lower.contains("problem") {
        Some(Priority::High)
    } else if lower.contains("quick") || lower.contains("tip") {
        Some(Priority::Low)
    } else {
        Some(Priority::Medium)
    }
}

/// Bullet lines grouped under the nearest preceding heading.
pub fn salvage_recommendations(text: &str) -> Vec<Recommendation> {
    let Some(bullet) = BULLET.as_ref() else {
        return Vec::new();
    };

    let mut section = Priority::Medium;
    let mut out = Vec::new();

    for line in text.lines() {
        if let Some(caps) = bullet.captures(line) {
            let item = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let item = item.trim_matches(|c| c == '*' || c == '"' || c == ',').trim();
            if !item.is_empty() {
                out.push(Recommendation {
                    priority: section,
                    issue: Some(item.to_string()),
                    ..Default::default()
                });
            }
        } else if let Some(priority) = heading_priority(line) {
            section = priority;
        }
    }

    out
}

/// Build a degraded candidate from unstructured text. `None` if no score.
pub fn salvage_candidate(raw: &str) -> Option<AnalysisCandidate> {
    let text = strip_code_fences(raw);
    let score = salvage_score(text)?;

    let analysis: String = text.chars().take(MAX_SALVAGED_TEXT).collect();

    Some(AnalysisCandidate {
        assessment: Some(Assessment {
            overall_score: Some(score),
            ..Default::default()
        }),
        recommendations: salvage_recommendations(text),
        analysis: Some(analysis).filter(|a| !a.trim().is_empty()),
        ..Default::default()
    })
}

/// Salvage the newest free-text response. Well-formed JSON is skipped: the
/// validator already judged it, and reading its score back would undo that.
pub fn salvage_unstructured(responses: &[String]) -> Option<AnalysisCandidate> {
    responses
        .iter()
        .rev()
        .filter(|raw| parse_candidate(raw).is_err())
        .find_map(|raw| salvage_candidate(raw))
}
