use serde::{Deserialize, Serialize};

use crate::workflows::catalog::ListingId;

/// Preferences a ranking is computed against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreference {
    pub budget_min: f64,
    pub budget_max: f64,
    pub group_size: u32,
    /// Free-text keyword; empty means no preference.
    #[serde(default)]
    pub preferred_environment: String,
}

impl UserPreference {
    pub(crate) fn environment_keyword(&self) -> String {
        self.preferred_environment.trim().to_lowercase()
    }
}

/// Per-term contributions behind one listing's rank.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub listing_id: ListingId,
    pub environment: f64,
    pub price_proximity: f64,
    pub rating: f64,
    pub total: f64,
}
