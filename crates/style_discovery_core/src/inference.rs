//! crates/style_discovery_core/src/inference.rs
//!
//! The preference inference engine: turns a finished list of timed swipe
//! decisions into a weighted style profile.
//!
//! Fast likes say more about taste than slow ones, so every liked decision
//! contributes a weight chosen by its response-time bucket to each style it
//! carries. Styles are ranked by accumulated weight; equal weights keep the
//! catalog's declaration order.

use std::collections::{HashMap, HashSet};

use crate::domain::{Confidence, StyleCategory, Summary, SwipeDecision};
use crate::narrative;

/// Likes faster than this are instinctive.
pub const INSTINCTIVE_BELOW_MS: u64 = 1_200;
/// Likes slower than this are deliberate.
pub const DELIBERATE_ABOVE_MS: u64 = 2_500;

pub const INSTINCTIVE_WEIGHT: f64 = 3.0;
pub const CONFIDENT_WEIGHT: f64 = 1.5;
pub const DELIBERATE_WEIGHT: f64 = 0.8;

/// Average response time at which speed alone drives decisiveness to zero.
const RESPONSE_TIME_SCALE_MS: f64 = 6_000.0;
const UNDO_PENALTY: f64 = 0.15;
const MIN_DECISIVENESS: f64 = 0.1;
const MAX_DECISIVENESS: f64 = 1.0;

const PRIMARY_SLOTS: usize = 2;
const SECONDARY_SLOTS: usize = 2;

/// Accumulated weight of one catalog style.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleWeight {
    pub category_id: String,
    pub name: String,
    pub weight: f64,
}

/// Weight a liked decision contributes, by response time.
pub fn response_weight(response_time_ms: u64) -> f64 {
    if response_time_ms < INSTINCTIVE_BELOW_MS {
        INSTINCTIVE_WEIGHT
    } else if response_time_ms > DELIBERATE_ABOVE_MS {
        DELIBERATE_WEIGHT
    } else {
        CONFIDENT_WEIGHT
    }
}

/// Mean response time over every decision; 0 for an empty list.
pub fn average_response_time(decisions: &[SwipeDecision]) -> f64 {
    let total: u64 = decisions.iter().map(|d| d.response_time_ms).sum();
    total as f64 / decisions.len().max(1) as f64
}

/// Number of decisions that were re-made after an undo.
pub fn undo_count(decisions: &[SwipeDecision]) -> usize {
    decisions.iter().filter(|d| d.undo_used).count()
}

pub fn decisiveness(average_response_ms: f64, undo_count: usize) -> f64 {
    let raw = 1.0
        - average_response_ms / RESPONSE_TIME_SCALE_MS
        - UNDO_PENALTY * undo_count as f64;
    // NaN cannot reach here: the average is computed with a guarded divisor.
    raw.clamp(MIN_DECISIVENESS, MAX_DECISIVENESS)
}

impl Confidence {
    pub fn from_decisiveness(decisiveness: f64) -> Self {
        if decisiveness < 0.45 {
            Confidence::Low
        } else if decisiveness < 0.75 {
            Confidence::Moderate
        } else {
            Confidence::High
        }
    }
}

/// Ranks catalog styles by the weight liked decisions gave them.
///
/// Style ids without a catalog entry are dropped. Ties keep catalog order,
/// and a display name appears at most once.
pub fn rank_styles(decisions: &[SwipeDecision], categories: &[StyleCategory]) -> Vec<StyleWeight> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for decision in decisions.iter().filter(|d| d.is_like()) {
        let weight = response_weight(decision.response_time_ms);
        for category_id in &decision.style_categories {
            *totals.entry(category_id.as_str()).or_insert(0.0) += weight;
        }
    }

    let mut ranked: Vec<StyleWeight> = categories
        .iter()
        .filter_map(|c| {
            totals.get(c.id.as_str()).map(|&weight| StyleWeight {
                category_id: c.id.clone(),
                name: c.name.clone(),
                weight,
            })
        })
        .collect();

    // `sort_by` is stable, which is what preserves catalog order on ties.
    ranked.sort_by(|a, b| b.weight.total_cmp(&a.weight));

    let mut seen_ids = HashSet::new();
    let mut seen_names = HashSet::new();
    ranked.retain(|s| seen_ids.insert(s.category_id.clone()) && seen_names.insert(s.name.clone()));
    ranked
}

/// Infers the style summary for a finished session.
pub fn analyze(decisions: &[SwipeDecision], categories: &[StyleCategory]) -> Summary {
    let average = average_response_time(decisions);

    if !decisions.iter().any(SwipeDecision::is_like) {
        return Summary {
            primary_styles: Vec::new(),
            secondary_styles: Vec::new(),
            narrative: narrative::EXPLORATORY.to_string(),
            confidence: Confidence::Low,
            decisiveness: 0.0,
            average_response_time: average,
        };
    }

    let mut names = rank_styles(decisions, categories)
        .into_iter()
        .map(|s| s.name);
    let primary_styles: Vec<String> = names.by_ref().take(PRIMARY_SLOTS).collect();
    let secondary_styles: Vec<String> = names.take(SECONDARY_SLOTS).collect();

    let decisiveness = decisiveness(average, undo_count(decisions));
    let confidence = Confidence::from_decisiveness(decisiveness);
    let narrative = narrative::compose(&primary_styles, &secondary_styles, decisiveness);

    Summary {
        primary_styles,
        secondary_styles,
        narrative,
        confidence,
        decisiveness,
        average_response_time: average,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{default_categories, RoomType, SwipeDirection};

    fn decision(direction: SwipeDirection, ms: u64, styles: &[&str]) -> SwipeDecision {
        SwipeDecision {
            image_id: format!("img-{ms}"),
            direction,
            response_time_ms: ms,
            undo_used: false,
            room_type: RoomType::LivingRoom,
            style_categories: styles.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn like(ms: u64, styles: &[&str]) -> SwipeDecision {
        decision(SwipeDirection::Like, ms, styles)
    }

    fn reject(ms: u64, styles: &[&str]) -> SwipeDecision {
        decision(SwipeDirection::Reject, ms, styles)
    }

    fn weight_of(ranked: &[StyleWeight], id: &str) -> f64 {
        ranked
            .iter()
            .find(|s| s.category_id == id)
            .map(|s| s.weight)
            .unwrap_or(0.0)
    }

    #[test]
    fn weight_buckets() {
        assert_eq!(response_weight(0), 3.0);
        assert_eq!(response_weight(1_199), 3.0);
        assert_eq!(response_weight(1_200), 1.5);
        assert_eq!(response_weight(2_500), 1.5);
        assert_eq!(response_weight(2_501), 0.8);
    }

    #[test]
    fn weights_accumulate_per_style() {
        let decisions = vec![
            like(500, &["1"]),
            like(2_000, &["1", "2"]),
            like(3_000, &["2"]),
            reject(100, &["3"]),
        ];
        let ranked = rank_styles(&decisions, &default_categories());

        assert!((weight_of(&ranked, "1") - 4.5).abs() < 1e-9);
        assert!((weight_of(&ranked, "2") - 2.3).abs() < 1e-9);
        // Rejected decisions never contribute.
        assert_eq!(weight_of(&ranked, "3"), 0.0);
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn ties_follow_catalog_order() {
        let catalog = default_categories();
        // "5" is liked first but "2" is declared earlier in the catalog.
        let decisions = vec![like(500, &["5"]), like(500, &["2"])];
        let ranked = rank_styles(&decisions, &catalog);
        let names: Vec<_> = ranked.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Scandinavian", "Contemporary Modern"]);
    }

    #[test]
    fn unknown_category_ids_are_dropped() {
        let decisions = vec![like(500, &["ghost", "3"]), like(500, &["ghost"])];
        let summary = analyze(&decisions, &default_categories());
        assert_eq!(summary.primary_styles, vec!["Japandi"]);
        assert!(summary.secondary_styles.is_empty());
    }

    #[test]
    fn no_likes_gives_degenerate_summary() {
        let decisions: Vec<_> = (0..5).map(|i| reject(1_000 + i * 100, &["1"])).collect();
        let summary = analyze(&decisions, &default_categories());

        assert!(summary.primary_styles.is_empty());
        assert!(summary.secondary_styles.is_empty());
        assert_eq!(summary.confidence, Confidence::Low);
        assert_eq!(summary.decisiveness, 0.0);
        assert_eq!(summary.narrative, narrative::EXPLORATORY);
        assert!((summary.average_response_time - 1_200.0).abs() < 1e-9);
    }

    #[test]
    fn empty_session_does_not_divide_by_zero() {
        let summary = analyze(&[], &default_categories());
        assert_eq!(summary.average_response_time, 0.0);
        assert_eq!(summary.decisiveness, 0.0);
    }

    #[test]
    fn five_fast_minimalist_likes() {
        let decisions: Vec<_> = (0..5).map(|_| like(800, &["1"])).collect();
        let summary = analyze(&decisions, &default_categories());

        assert_eq!(summary.primary_styles, vec!["Minimalist"]);
        assert!(summary.secondary_styles.is_empty());
        assert!((summary.decisiveness - (1.0 - 800.0 / 6_000.0)).abs() < 1e-9);
        assert_eq!(summary.confidence, Confidence::High);
        assert!(summary.narrative.contains("a definitive preference for Minimalist design"));
    }

    #[test]
    fn one_undo_costs_exactly_fifteen_hundredths() {
        let mut decisions = vec![
            like(900, &["1"]),
            reject(900, &["2"]),
            like(900, &["3"]),
            reject(900, &["4"]),
            like(900, &["5"]),
        ];
        let clean = analyze(&decisions, &default_categories());
        decisions[2].undo_used = true;
        let undone = analyze(&decisions, &default_categories());

        assert!((clean.decisiveness - undone.decisiveness - 0.15).abs() < 1e-9);
    }

    #[test]
    fn decisiveness_is_clamped() {
        assert_eq!(decisiveness(0.0, 0), 1.0);
        assert_eq!(decisiveness(60_000.0, 0), 0.1);
        assert_eq!(decisiveness(0.0, 20), 0.1);

        let slow: Vec<_> = (0..3).map(|_| like(30_000, &["1"])).collect();
        let summary = analyze(&slow, &default_categories());
        assert_eq!(summary.decisiveness, 0.1);
        assert_eq!(summary.confidence, Confidence::Low);
    }

    #[test]
    fn confidence_bands() {
        assert_eq!(Confidence::from_decisiveness(0.1), Confidence::Low);
        assert_eq!(Confidence::from_decisiveness(0.449), Confidence::Low);
        assert_eq!(Confidence::from_decisiveness(0.45), Confidence::Moderate);
        assert_eq!(Confidence::from_decisiveness(0.749), Confidence::Moderate);
        assert_eq!(Confidence::from_decisiveness(0.75), Confidence::High);
    }

    #[test]
    fn primary_and_secondary_are_bounded_and_distinct() {
        let decisions = vec![
            like(500, &["1", "2", "3"]),
            like(2_000, &["4", "5", "6"]),
            like(3_000, &["7", "8", "9", "10"]),
            like(500, &["1"]),
        ];
        let summary = analyze(&decisions, &default_categories());

        assert_eq!(summary.primary_styles, vec!["Minimalist", "Scandinavian"]);
        assert_eq!(summary.secondary_styles, vec!["Japandi", "Timeless Classic"]);

        let mut all = summary.primary_styles.clone();
        all.extend(summary.secondary_styles.clone());
        let unique: HashSet<_> = all.iter().collect();
        assert_eq!(unique.len(), all.len());
    }

    #[test]
    fn duplicate_catalog_names_are_listed_once() {
        let catalog = vec![
            StyleCategory::new("a", "Coastal"),
            StyleCategory::new("b", "Coastal"),
            StyleCategory::new("c", "Rustic"),
        ];
        let decisions = vec![like(500, &["a", "b", "c"])];
        let summary = analyze(&decisions, &catalog);
        assert_eq!(summary.primary_styles, vec!["Coastal", "Rustic"]);
    }

    #[test]
    fn generated_sessions_respect_summary_bounds() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut catalog = default_categories();
        catalog.push(StyleCategory::new("11", "Minimalist"));
        let mut style_ids: Vec<String> = catalog.iter().map(|c| c.id.clone()).collect();
        style_ids.push("unknown".to_string());

        let mut rng = StdRng::seed_from_u64(2024);
        for _ in 0..500 {
            let len = rng.gen_range(1..=40);
            let mut decisions = Vec::with_capacity(len);
            for i in 0..len {
                let mut styles = Vec::new();
                for id in &style_ids {
                    if rng.gen_bool(0.25) {
                        styles.push(id.clone());
                    }
                }
                decisions.push(SwipeDecision {
                    image_id: format!("img-{i}"),
                    direction: if rng.gen_bool(0.5) {
                        SwipeDirection::Like
                    } else {
                        SwipeDirection::Reject
                    },
                    response_time_ms: rng.gen_range(0..12_000),
                    undo_used: rng.gen_bool(0.1),
                    room_type: RoomType::ALL[rng.gen_range(0..RoomType::ALL.len())],
                    style_categories: styles,
                });
            }

            let summary = analyze(&decisions, &catalog);

            assert!(summary.primary_styles.len() <= PRIMARY_SLOTS);
            assert!(summary.secondary_styles.len() <= SECONDARY_SLOTS);
            if summary.primary_styles.len() < PRIMARY_SLOTS {
                assert!(summary.secondary_styles.is_empty());
            }
            let mut all = summary.primary_styles.clone();
            all.extend(summary.secondary_styles.clone());
            let unique: HashSet<_> = all.iter().collect();
            assert_eq!(unique.len(), all.len(), "duplicate style in {:?}", all);

            if decisions.iter().any(SwipeDecision::is_like) {
                assert!(
                    (0.1..=1.0).contains(&summary.decisiveness),
                    "decisiveness {} out of range",
                    summary.decisiveness
                );
                assert!(summary.decisiveness.is_finite());
            } else {
                assert_eq!(summary.decisiveness, 0.0);
                assert_eq!(summary.confidence, Confidence::Low);
                assert!(all.is_empty());
            }
        }
    }
}
