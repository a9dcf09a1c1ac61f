//! crates/style_discovery_core/src/readiness.rs
//!
//! Whether the active pool is large enough to open a discovery session. The
//! session controller itself never refuses to start; hosts consult this first.

use serde::Serialize;

use crate::domain::Image;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PoolReadiness {
    pub pool_size: usize,
    pub min_required: usize,
    pub is_ready: bool,
    /// Fill level towards `min_required`, in percent (0..=100).
    pub progress: f64,
    /// Active images still missing before a session may start.
    pub remaining: usize,
}

impl PoolReadiness {
    pub fn assess(library: &[Image], min_required: usize) -> Self {
        let pool_size = library.iter().filter(|img| img.active).count();
        let progress = if min_required == 0 {
            100.0
        } else {
            (pool_size as f64 / min_required as f64 * 100.0).min(100.0)
        };

        Self {
            pool_size,
            min_required,
            is_ready: pool_size >= min_required,
            progress,
            remaining: min_required.saturating_sub(pool_size),
        }
    }
}
