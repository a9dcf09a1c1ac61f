//! crates/style_discovery_core/src/report.rs
//!
//! View-model for the summary screen and its export. Rendering lives outside
//! the engine; this only derives the values a renderer needs from a finished
//! `SessionResult`.

use serde::Serialize;

use crate::domain::{Image, SessionResult};

/// Rounded average below which the client is described as intuitive.
const INTUITIVE_BELOW_MS: u64 = 1_500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TimingLabel {
    #[serde(rename = "Intuitive Selection")]
    IntuitiveSelection,
    #[serde(rename = "Deliberate Consideration")]
    DeliberateConsideration,
}

impl TimingLabel {
    pub fn for_average(average_ms: u64) -> Self {
        if average_ms < INTUITIVE_BELOW_MS {
            TimingLabel::IntuitiveSelection
        } else {
            TimingLabel::DeliberateConsideration
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    /// Liked image ids in the order they were decided.
    pub liked_image_ids: Vec<String>,
    /// Liked images still present in the library, in library order.
    pub preferred_images: Vec<Image>,
    pub average_response_ms: u64,
    pub timing_label: TimingLabel,
    pub export_file_name: String,
}

impl SummaryReport {
    pub fn build(result: &SessionResult, library: &[Image]) -> Self {
        let liked_image_ids: Vec<String> = result
            .decisions
            .iter()
            .filter(|d| d.is_like())
            .map(|d| d.image_id.clone())
            .collect();

        let preferred_images = library
            .iter()
            .filter(|img| liked_image_ids.contains(&img.id))
            .cloned()
            .collect();

        let average_response_ms = result.summary.average_response_time.max(0.0).round() as u64;

        Self {
            liked_image_ids,
            preferred_images,
            average_response_ms,
            timing_label: TimingLabel::for_average(average_response_ms),
            export_file_name: export_file_name(result),
        }
    }
}

/// `Imprint_DNA_<client>_<date>.pdf`, with `Export` standing in for a missing client.
pub fn export_file_name(result: &SessionResult) -> String {
    let client = result
        .client_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or("Export");
    format!("Imprint_DNA_{}_{}.pdf", client, result.date.format("%Y-%m-%d"))
}
