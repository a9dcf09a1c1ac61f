//! crates/style_discovery_core/src/analytics.rs
//!
//! Studio-wide figures aggregated over the session log and the image library.

use serde::Serialize;

use crate::domain::{Image, SessionResult, StyleCategory};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleShare {
    pub category_id: String,
    pub name: String,
    /// Library images tagged with this style, active or not.
    pub image_count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudioAnalytics {
    pub total_sessions: usize,
    /// Mean of the per-session average response times, in milliseconds.
    pub average_decision_time: f64,
    pub average_decisiveness: f64,
    pub library_size: usize,
    /// Library size against the minimum pool size, capped at 100 percent.
    pub library_fill: f64,
    pub style_distribution: Vec<StyleShare>,
}

impl StudioAnalytics {
    pub fn compute(
        sessions: &[SessionResult],
        library: &[Image],
        categories: &[StyleCategory],
        min_required: usize,
    ) -> Self {
        let total_sessions = sessions.len();
        let mean = |value: fn(&SessionResult) -> f64| {
            if total_sessions == 0 {
                0.0
            } else {
                sessions.iter().map(value).sum::<f64>() / total_sessions as f64
            }
        };

        let library_size = library.len();
        let library_fill = if min_required == 0 {
            100.0
        } else {
            (library_size as f64 / min_required as f64 * 100.0).min(100.0)
        };

        let style_distribution = categories
            .iter()
            .map(|category| {
                let image_count = library
                    .iter()
                    .filter(|img| img.carries_style(&category.id))
                    .count();
                let percentage = if library_size == 0 {
                    0.0
                } else {
                    image_count as f64 / library_size as f64 * 100.0
                };
                StyleShare {
                    category_id: category.id.clone(),
                    name: category.name.clone(),
                    image_count,
                    percentage,
                }
            })
            .collect();

        Self {
            total_sessions,
            average_decision_time: mean(|s| s.summary.average_response_time),
            average_decisiveness: mean(|s| s.summary.decisiveness),
            library_size,
            library_fill,
            style_distribution,
        }
    }
}
