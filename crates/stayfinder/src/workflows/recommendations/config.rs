use serde::{Deserialize, Serialize};

/// Maximum points each scoring term can contribute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub price: f64,
    pub environment: f64,
    pub rating: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            price: 40.0,
            environment: 30.0,
            rating: 30.0,
        }
    }
}

impl ScoringWeights {
    pub fn total(&self) -> f64 {
        self.price + self.environment + self.rating
    }
}
