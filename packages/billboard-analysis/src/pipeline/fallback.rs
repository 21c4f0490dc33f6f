//! Deterministic fallback scoring for when no model answer is usable.
//!
//! Seeded by the request identity (file name + location), so the same
//! upload to the same site always gets the same numbers.

use crate::error::FallbackCause;
use crate::pipeline::scoring::{regional_notes, synthesized_issues};
use crate::types::context::AnalysisContext;
use crate::types::result::{AnalysisResult, CategoryScores, DistanceCurve, Provenance};

const BASE_SCORE: u32 = 45;
const BASE_SPAN: u32 = 35;
const FAR_DISTANCE_M: f64 = 120.0;
const FAR_DISTANCE_PENALTY: f64 = 8.0;
const FAST_SPEED_KMH: f64 = 100.0;
const FAST_SPEED_PENALTY: f64 = 10.0;
const FALLBACK_MIN: f64 = 25.0;
const FALLBACK_MAX: f64 = 90.0;
const CATEGORY_JITTER: i32 = 3;

/// Polynomial rolling hash, `h = h * 31 + unit` over UTF-16 code units,
/// wrapping at 32 bits.
pub fn identity_hash(s: &str) -> u32 {
    s.encode_utf16()
        .fold(0u32, |h, unit| h.wrapping_mul(31).wrapping_add(unit as u32))
}

/// SplitMix64 generator. Small, fast and fully reproducible from its seed.
#[derive(Debug, Clone)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform-ish integer in `[low, high]`. Returns `low` for an empty range.
    pub fn range_inclusive(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        let span = (high as i64 - low as i64 + 1) as u64;
        (low as i64 + (self.next_u64() % span) as i64) as i32
    }
}

/// Identity and site context for one fallback.
#[derive(Debug, Clone)]
pub struct FallbackRequest<'a> {
    pub file_name: &'a str,
    pub location: &'a str,
    pub context: &'a AnalysisContext,
    pub cause: FallbackCause,
}

impl FallbackRequest<'_> {
    pub fn seed(&self) -> u32 {
        identity_hash(&format!("{}{}", self.file_name, self.location))
    }
}

/// Base score before category jitter, on the 0–100 scale.
pub fn fallback_base_score(hash: u32, context: &AnalysisContext) -> f64 {
    let mut base = (BASE_SCORE + hash % BASE_SPAN) as f64;
    if context.viewing_distance_m > FAR_DISTANCE_M {
        base -= FAR_DISTANCE_PENALTY;
    }
    if context.speed.kmh > FAST_SPEED_KMH {
        base -= FAST_SPEED_PENALTY;
    }
    base.clamp(FALLBACK_MIN, FALLBACK_MAX)
}

/// Build a complete, clamped result without any model input.
pub fn synthesize_fallback(request: &FallbackRequest<'_>) -> AnalysisResult {
    let context = request.context;
    let thresholds = context.thresholds();
    let hash = request.seed();
    let base = fallback_base_score(hash, context);

    let mut rng = SeededRng::new(hash as u64);
    let quarter = base / 4.0;
    let mut jittered = || quarter + rng.range_inclusive(-CATEGORY_JITTER, CATEGORY_JITTER) as f64;
    let categories = CategoryScores::from_raw(jittered(), jittered(), jittered(), jittered());

    let detailed = format!(
        "Automated image analysis was unavailable, so these scores are estimated from the \
         site alone.\n\n\
         At {:.0} m and {:.0} km/h letters need to be at least {:.2} m ({:.0} in) tall, copy \
         should stay within {} words for a {:.1} s viewing window, and contrast should reach \
         {:.1}:1.",
        context.viewing_distance_m,
        context.speed.kmh,
        thresholds.min_font_height_m,
        thresholds.min_font_height_in,
        thresholds.max_word_count,
        thresholds.viewing_time_seconds,
        thresholds.required_contrast_ratio
    );

    AnalysisResult::new(
        base,
        categories,
        DistanceCurve::from_overall(base),
        synthesized_issues(context, &thresholds),
        detailed,
        Provenance::Fallback,
    )
    .with_compliance_notes(vec![
        "Arabic script compliance could not be verified without reading the image.".to_string(),
    ])
    .with_regional_notes(regional_notes(context))
    .with_api_note(format!("Fallback analysis: {}", request.cause))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::types::result::IssueOrigin;
    use proptest::prelude::*;

    fn network_down() -> FallbackCause {
        FallbackCause::Transport(TransportError::Network("connection refused".into()))
    }

    #[test]
    fn test_identity_hash_known_values() {
        assert_eq!(identity_hash(""), 0);
        assert_eq!(identity_hash("a"), 97);
        assert_eq!(identity_hash("hello"), 99_162_322);
        // Surrogate pair hashed as two code units.
        assert_eq!(identity_hash("😀"), 1_772_899);
        assert_eq!(identity_hash("ad.jpgSultan Qaboos"), 592_741_460);
    }

    #[test]
    fn test_splitmix_reference_output() {
        let mut rng = SeededRng::new(0);
        assert_eq!(rng.next_u64(), 0xE220_A839_7B1D_CDAF);
    }

    #[test]
    fn test_range_inclusive_bounds() {
        let mut rng = SeededRng::new(42);
        for _ in 0..1000 {
            let v = rng.range_inclusive(-3, 3);
            assert!((-3..=3).contains(&v));
        }
        assert_eq!(rng.range_inclusive(5, 5), 5);
        assert_eq!(rng.range_inclusive(5, 1), 5);
    }

    #[test]
    fn test_fallback_is_stable_for_same_identity() {
        let ctx = AnalysisContext::defaults("Sultan Qaboos", None);
        let request = FallbackRequest {
            file_name: "ad.jpg",
            location: "Sultan Qaboos",
            context: &ctx,
            cause: network_down(),
        };

        let a = synthesize_fallback(&request);
        let b = synthesize_fallback(&request);
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
        // 45 + 592_741_460 % 35
        assert_eq!(a.overall_score, 55);
    }

    #[test]
    fn test_fallback_penalties() {
        let far_fast = AnalysisContext::from_location(
            &crate::types::location::BillboardLocation::new("x", "X")
                .with_speed_limit("120")
                .with_distance(150.0),
            None,
        );
        assert_eq!(fallback_base_score(0, &far_fast), 27.0);
        assert_eq!(fallback_base_score(34, &far_fast), 61.0);
    }

    #[test]
    fn test_fallback_is_tagged() {
        let ctx = AnalysisContext::defaults("Sultan Qaboos", None);
        let result = synthesize_fallback(&FallbackRequest {
            file_name: "ad.jpg",
            location: "Sultan Qaboos",
            context: &ctx,
            cause: network_down(),
        });

        assert_eq!(result.provenance, Provenance::Fallback);
        assert!(!result.is_model_derived());
        assert_eq!(result.issues.origin, IssueOrigin::Synthesized);
        let note = result.api_note.unwrap();
        assert!(note.starts_with("Fallback analysis"));
        assert!(note.contains("connection refused"));
    }

    proptest! {
        #[test]
        fn fallback_always_in_range(
            file in ".{0,40}",
            location in ".{0,40}",
            distance in prop::option::of(-50.0f64..400.0),
        ) {
            let ctx = AnalysisContext::defaults(location.clone(), distance);
            let result = synthesize_fallback(&FallbackRequest {
                file_name: &file,
                location: &location,
                context: &ctx,
                cause: network_down(),
            });

            prop_assert!((25..=90).contains(&result.overall_score));
            for c in [result.category_scores.font, result.category_scores.contrast,
                      result.category_scores.layout, result.category_scores.cta] {
                prop_assert!((5..=25).contains(&c));
            }
            let curve = result.distance_readability;
            prop_assert!(curve.at_50m >= curve.at_100m && curve.at_100m >= curve.at_150m);
            prop_assert!((20..=95).contains(&curve.at_150m));
        }
    }
}
