mod config;
mod domain;
mod rules;

pub use config::ScoringWeights;
pub use domain::{ScoreBreakdown, UserPreference};

use tracing::{debug, info};

use crate::workflows::catalog::{Listing, RawListing};

/// Ranks listings against a user's budget, group size, and environment preference.
///
/// Scoring is a pure function of its inputs; the engine holds only the weights.
#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    weights: ScoringWeights,
}

impl RecommendationEngine {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Up to `top_n` listings that fit the budget and group, best first.
    pub fn recommend<'a>(
        &self,
        preference: &UserPreference,
        listings: &'a [Listing],
        top_n: usize,
    ) -> Vec<&'a Listing> {
        self.rank(preference, listings, top_n)
            .into_iter()
            .map(|(listing, _)| listing)
            .collect()
    }

    /// Same ranking as [`recommend`](Self::recommend), with the per-term scores.
    pub fn explain(
        &self,
        preference: &UserPreference,
        listings: &[Listing],
        top_n: usize,
    ) -> Vec<ScoreBreakdown> {
        self.rank(preference, listings, top_n)
            .into_iter()
            .map(|(_, breakdown)| breakdown)
            .collect()
    }

    /// Rank unvalidated rows. Rows are sanitized first; a row without a usable
    /// `listing_id` is dropped, since nothing could book it afterwards.
    pub fn recommend_raw(
        &self,
        preference: &UserPreference,
        rows: &[RawListing],
        top_n: usize,
    ) -> Vec<Listing> {
        let listings: Vec<Listing> = rows.iter().filter_map(|row| row.sanitize(None)).collect();

        self.recommend(preference, &listings, top_n)
            .into_iter()
            .cloned()
            .collect()
    }

    fn rank<'a>(
        &self,
        preference: &UserPreference,
        listings: &'a [Listing],
        top_n: usize,
    ) -> Vec<(&'a Listing, ScoreBreakdown)> {
        if listings.is_empty() {
            debug!("no listings to rank");
            return Vec::new();
        }

        let keyword = preference.environment_keyword();
        let mut scored: Vec<(&Listing, ScoreBreakdown)> = listings
            .iter()
            .filter(|listing| rules::passes_hard_filter(preference, listing))
            .map(|listing| {
                let breakdown = rules::score_listing(preference, &keyword, listing, &self.weights);
                (listing, breakdown)
            })
            .collect();

        if scored.is_empty() {
            info!(
                budget_min = preference.budget_min,
                budget_max = preference.budget_max,
                group_size = preference.group_size,
                "no listings match the budget and group size"
            );
            return scored;
        }

        scored.sort_by(|(a, a_score), (b, b_score)| {
            b_score
                .total
                .total_cmp(&a_score.total)
                .then_with(|| b.rating.total_cmp(&a.rating))
        });
        scored.truncate(top_n);
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::catalog::ListingId;

    fn listing(id: u64, price: f64, accommodates: u32, rating: f64, tags: &str) -> Listing {
        Listing {
            id: ListingId(id),
            name: format!("listing-{id}"),
            location: "Ontario".to_string(),
            property_type: "Entire home".to_string(),
            accommodates,
            amenities: String::new(),
            price,
            min_nights: 1,
            max_nights: 30,
            rating,
            tags: tags.to_string(),
        }
    }

    fn beach_lover() -> UserPreference {
        UserPreference {
            budget_min: 100.0,
            budget_max: 200.0,
            group_size: 2,
            preferred_environment: "Beach".to_string(),
        }
    }

    #[test]
    fn environment_match_outranks_identical_listing_without_it() {
        let listings = vec![
            listing(2, 150.0, 2, 5.0, "quiet,forest"),
            listing(1, 150.0, 2, 5.0, "sunny beach,family"),
        ];
        let engine = RecommendationEngine::default();

        let ranked = engine.recommend(&beach_lover(), &listings, 2);
        let ids: Vec<_> = ranked.iter().map(|listing| listing.id).collect();
        assert_eq!(ids, vec![ListingId(1), ListingId(2)]);

        let scores = engine.explain(&beach_lover(), &listings, 2);
        assert!((scores[0].total - 100.0).abs() < 1e-9);
        assert!((scores[1].total - 70.0).abs() < 1e-9);
        assert_eq!(scores[1].environment, 0.0);
    }

    #[test]
    fn hard_filter_drops_over_budget_and_undersized() {
        let listings = vec![
            listing(1, 250.0, 4, 5.0, "beach"),
            listing(2, 150.0, 1, 5.0, "beach"),
            listing(3, 180.0, 3, 3.0, ""),
        ];
        let ranked = RecommendationEngine::default().recommend(&beach_lover(), &listings, 5);
        let ids: Vec<_> = ranked.iter().map(|listing| listing.id).collect();
        assert_eq!(ids, vec![ListingId(3)]);
    }

    #[test]
    fn ties_on_score_break_by_rating() {
        let weights = ScoringWeights {
            price: 40.0,
            environment: 30.0,
            rating: 0.0,
        };
        let listings = vec![
            listing(1, 150.0, 2, 3.5, "beach"),
            listing(2, 150.0, 2, 4.9, "beach"),
        ];
        let ranked = RecommendationEngine::new(weights).recommend(&beach_lover(), &listings, 2);
        assert_eq!(ranked[0].id, ListingId(2));
    }

    #[test]
    fn empty_inputs_and_large_top_n() {
        let engine = RecommendationEngine::default();
        assert!(engine.recommend(&beach_lover(), &[], 3).is_empty());

        let listings = vec![listing(1, 120.0, 2, 4.0, ""), listing(2, 160.0, 2, 4.0, "")];
        assert_eq!(engine.recommend(&beach_lover(), &listings, 10).len(), 2);
        assert!(engine.recommend(&beach_lover(), &listings, 0).is_empty());

        let mut inverted = beach_lover();
        inverted.budget_min = 300.0;
        assert!(engine.recommend(&inverted, &listings, 10).is_empty());
    }

    #[test]
    fn recommend_is_deterministic() {
        let listings: Vec<_> = (0..20)
            .map(|id| listing(id, 100.0 + id as f64 * 5.0, 2, 3.0 + (id % 5) as f64 * 0.4, "beach"))
            .collect();
        let engine = RecommendationEngine::default();
        let first = engine.recommend(&beach_lover(), &listings, 7);
        let second = engine.recommend(&beach_lover(), &listings, 7);
        assert_eq!(first, second);
    }

    #[test]
    fn recommend_raw_sanitizes_rows_before_ranking() {
        let rows = vec![
            RawListing {
                listing_id: Some("9".to_string()),
                price: Some("150".to_string()),
                accommodates: Some("2".to_string()),
                review_rating: Some("unknown".to_string()),
                tags: Some("Beach front".to_string()),
                ..RawListing::default()
            },
            RawListing {
                listing_id: Some("not-an-id".to_string()),
                price: Some("150".to_string()),
                accommodates: Some("4".to_string()),
                ..RawListing::default()
            },
            RawListing {
                price: Some("150".to_string()),
                accommodates: Some("2".to_string()),
                tags: Some("beach".to_string()),
                ..RawListing::default()
            },
        ];

        let ranked = RecommendationEngine::default().recommend_raw(&beach_lover(), &rows, 5);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].id, ListingId(9));
        assert_eq!(ranked[0].rating, crate::workflows::catalog::NEUTRAL_RATING);
    }
}
