//! crates/style_discovery_core/src/domain.rs
//!
//! Defines the pure, core data structures for the discovery engine.
//! These structs carry serde derives so the storage adapters can persist them
//! as documents, but they know nothing about any particular store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Shortest session a studio may configure.
pub const MIN_SESSION_LENGTH: usize = 5;
/// Longest session a studio may configure.
pub const MAX_SESSION_LENGTH: usize = 40;
pub const DEFAULT_SESSION_LENGTH: usize = 10;
pub const DEFAULT_MIN_REQUIRED_IMAGES: usize = 5;

/// The room an interior image depicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomType {
    #[serde(rename = "Living Room")]
    LivingRoom,
    Bedroom,
    Kitchen,
    Bathroom,
    Dining,
    #[serde(rename = "Home Office")]
    HomeOffice,
}

impl RoomType {
    pub const ALL: [RoomType; 6] = [
        RoomType::LivingRoom,
        RoomType::Bedroom,
        RoomType::Kitchen,
        RoomType::Bathroom,
        RoomType::Dining,
        RoomType::HomeOffice,
    ];
}

/// A curated interior image from the studio library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: String,
    /// Opaque payload reference; the engine never dereferences it.
    pub url: String,
    pub room_type: RoomType,
    pub style_categories: Vec<String>,
    pub created_at: DateTime<Utc>,
    /// Records written before the flag existed have no value and count as active.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Image {
    pub fn new(
        id: impl Into<String>,
        url: impl Into<String>,
        room_type: RoomType,
        style_categories: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            room_type,
            style_categories,
            created_at: Utc::now(),
            active: true,
        }
    }

    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn carries_style(&self, category_id: &str) -> bool {
        self.style_categories.iter().any(|c| c == category_id)
    }
}

/// A named style the studio tags its images with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleCategory {
    pub id: String,
    pub name: String,
}

impl StyleCategory {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// The catalog a fresh studio starts with.
pub fn default_categories() -> Vec<StyleCategory> {
    [
        ("1", "Minimalist"),
        ("2", "Scandinavian"),
        ("3", "Japandi"),
        ("4", "Timeless Classic"),
        ("5", "Contemporary Modern"),
        ("6", "Vintage"),
        ("7", "Industrial"),
        ("8", "Bohemian"),
        ("9", "Decorative"),
        ("10", "Luxury Glamour"),
    ]
    .into_iter()
    .map(|(id, name)| StyleCategory::new(id, name))
    .collect()
}

/// Studio-level configuration consumed by a discovery session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudioSettings {
    pub logo: Option<String>,
    pub session_length: usize,
    #[serde(default = "default_min_required_images")]
    pub min_required_images: usize,
    pub categories: Vec<StyleCategory>,
}

fn default_min_required_images() -> usize {
    DEFAULT_MIN_REQUIRED_IMAGES
}

impl Default for StudioSettings {
    fn default() -> Self {
        Self {
            logo: None,
            session_length: DEFAULT_SESSION_LENGTH,
            min_required_images: DEFAULT_MIN_REQUIRED_IMAGES,
            categories: default_categories(),
        }
    }
}

impl StudioSettings {
    /// The configured session length forced into the supported range.
    pub fn target_length(&self) -> usize {
        self.session_length
            .clamp(MIN_SESSION_LENGTH, MAX_SESSION_LENGTH)
    }
}

/// Which way a card was swiped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwipeDirection {
    #[serde(alias = "right")]
    Like,
    #[serde(alias = "left")]
    Reject,
}

/// One recorded judgement. Created once per forward swipe and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwipeDecision {
    pub image_id: String,
    pub direction: SwipeDirection,
    pub response_time_ms: u64,
    pub undo_used: bool,
    // Captured at decision time so later catalog edits do not rewrite history.
    pub room_type: RoomType,
    pub style_categories: Vec<String>,
}

impl SwipeDecision {
    pub fn is_like(&self) -> bool {
        self.direction == SwipeDirection::Like
    }
}

/// Coarse bucketing of decisiveness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Moderate,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Moderate => "moderate",
            Confidence::High => "high",
        }
    }
}

/// The inferred style profile of a completed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub primary_styles: Vec<String>,
    pub secondary_styles: Vec<String>,
    pub narrative: String,
    pub confidence: Confidence,
    pub decisiveness: f64,
    pub average_response_time: f64,
}

/// The immutable report of one finished discovery session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub client_name: Option<String>,
    pub decisions: Vec<SwipeDecision>,
    pub summary: Summary,
}
