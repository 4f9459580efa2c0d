use crate::workflows::catalog::Listing;

use super::config::ScoringWeights;
use super::domain::{ScoreBreakdown, UserPreference};

/// Budget and capacity are non-negotiable.
///
/// An inverted budget (`budget_min > budget_max`) admits nothing.
pub(crate) fn passes_hard_filter(preference: &UserPreference, listing: &Listing) -> bool {
    listing.price >= preference.budget_min
        && listing.price <= preference.budget_max
        && listing.accommodates >= preference.group_size
}

pub(crate) fn environment_term(keyword: &str, listing: &Listing, weight: f64) -> f64 {
    if listing.mentions(keyword) {
        weight
    } else {
        0.0
    }
}

/// Full credit at the budget midpoint, falling linearly to zero at the budget edges.
pub(crate) fn price_proximity_term(preference: &UserPreference, price: f64, weight: f64) -> f64 {
    let (min, max) = (preference.budget_min, preference.budget_max);
    let mid = (min + max) / 2.0;
    let half_range = if max > min {
        (max - min) / 2.0
    } else {
        mid.max(1.0)
    };

    let proximity = (1.0 - (price - mid).abs() / half_range).clamp(0.0, 1.0);
    proximity * weight
}

pub(crate) fn rating_term(rating: f64, weight: f64) -> f64 {
    (rating / 5.0).clamp(0.0, 1.0) * weight
}

pub(crate) fn score_listing(
    preference: &UserPreference,
    keyword: &str,
    listing: &Listing,
    weights: &ScoringWeights,
) -> ScoreBreakdown {
    let environment = environment_term(keyword, listing, weights.environment);
    let price_proximity = price_proximity_term(preference, listing.price, weights.price);
    let rating = rating_term(listing.rating, weights.rating);

    ScoreBreakdown {
        listing_id: listing.id,
        environment,
        price_proximity,
        rating,
        total: environment + price_proximity + rating,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preference(min: f64, max: f64) -> UserPreference {
        UserPreference {
            budget_min: min,
            budget_max: max,
            group_size: 2,
            preferred_environment: "beach".to_string(),
        }
    }

    #[test]
    fn proximity_peaks_at_midpoint_and_zeroes_at_edges() {
        let pref = preference(100.0, 200.0);
        assert_eq!(price_proximity_term(&pref, 150.0, 40.0), 40.0);
        assert_eq!(price_proximity_term(&pref, 125.0, 40.0), 20.0);
        assert_eq!(price_proximity_term(&pref, 100.0, 40.0), 0.0);
        assert_eq!(price_proximity_term(&pref, 260.0, 40.0), 0.0);
    }

    #[test]
    fn zero_width_budget_uses_midpoint_as_half_range() {
        let pref = preference(150.0, 150.0);
        assert_eq!(price_proximity_term(&pref, 150.0, 40.0), 40.0);
        assert_eq!(price_proximity_term(&pref, 75.0, 40.0), 20.0);

        let free = preference(0.0, 0.0);
        assert_eq!(price_proximity_term(&free, 0.0, 40.0), 40.0);
        assert!(price_proximity_term(&free, 0.5, 40.0).is_finite());
    }

    #[test]
    fn rating_term_is_clamped() {
        assert_eq!(rating_term(5.0, 30.0), 30.0);
        assert_eq!(rating_term(2.5, 30.0), 15.0);
        assert_eq!(rating_term(7.5, 30.0), 30.0);
        assert_eq!(rating_term(-1.0, 30.0), 0.0);
    }

    #[test]
    fn inverted_budget_filters_everything() {
        let pref = preference(200.0, 100.0);
        let listing = Listing {
            id: crate::workflows::catalog::ListingId(1),
            name: "Any".to_string(),
            location: String::new(),
            property_type: String::new(),
            accommodates: 4,
            amenities: String::new(),
            price: 150.0,
            min_nights: 1,
            max_nights: 30,
            rating: 4.0,
            tags: String::new(),
        };
        assert!(!passes_hard_filter(&pref, &listing));
        assert!(passes_hard_filter(&preference(100.0, 200.0), &listing));
    }
}
