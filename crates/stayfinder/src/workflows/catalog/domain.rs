use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Stable identifier of a listing within a catalog snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(pub u64);

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub const DEFAULT_PRICE: f64 = 0.0;
pub const NEUTRAL_RATING: f64 = 3.0;
pub const DEFAULT_CAPACITY: u32 = 1;
pub const DEFAULT_MIN_NIGHTS: u32 = 1;
pub const DEFAULT_MAX_NIGHTS: u32 = 365;

/// Sanitized catalog row. Immutable once a snapshot is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    #[serde(rename = "listing_id")]
    pub id: ListingId,
    pub name: String,
    pub location: String,
    pub property_type: String,
    pub accommodates: u32,
    pub amenities: String,
    pub price: f64,
    pub min_nights: u32,
    pub max_nights: u32,
    #[serde(rename = "review_rating")]
    pub rating: f64,
    pub tags: String,
}

impl Listing {
    /// Tags, location, and property type joined into one lowercase string.
    pub fn descriptive_text(&self) -> String {
        [&self.tags, &self.location, &self.property_type]
            .iter()
            .map(|field| field.trim())
            .filter(|field| !field.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    /// Case-insensitive keyword match against [`descriptive_text`](Self::descriptive_text).
    ///
    /// `keyword` must already be lowercase; an empty keyword never matches.
    pub fn mentions(&self, keyword: &str) -> bool {
        !keyword.is_empty() && self.descriptive_text().contains(keyword)
    }

    /// Browse-time environment match: tags and location only.
    pub fn located_in(&self, keyword: &str) -> bool {
        !keyword.is_empty()
            && [&self.tags, &self.location]
                .iter()
                .any(|field| field.to_lowercase().contains(keyword))
    }
}

/// Unvalidated row as it arrives from a flat file or a generated payload.
///
/// Every cell is kept as text so a single malformed value never rejects the row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawListing {
    #[serde(default)]
    pub listing_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub accommodates: Option<String>,
    #[serde(default)]
    pub amenities: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub min_nights: Option<String>,
    #[serde(default)]
    pub max_nights: Option<String>,
    #[serde(default)]
    pub review_rating: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
}

impl RawListing {
    /// Build a raw row from a JSON object, accepting numbers or strings for every cell.
    pub fn from_json(object: &serde_json::Map<String, serde_json::Value>) -> Self {
        let cell = |key: &str| object.get(key).and_then(json_cell);
        Self {
            listing_id: cell("listing_id"),
            name: cell("name"),
            location: cell("location"),
            property_type: cell("property_type"),
            accommodates: cell("accommodates"),
            amenities: cell("amenities"),
            price: cell("price"),
            min_nights: cell("min_nights"),
            max_nights: cell("max_nights"),
            review_rating: cell("review_rating"),
            tags: cell("tags"),
        }
    }

    /// The row's own identifier, when its `listing_id` cell holds a usable number.
    pub fn explicit_id(&self) -> Option<ListingId> {
        self.listing_id
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .and_then(parse_count)
            .map(ListingId)
    }

    /// Coerce the row into a [`Listing`], substituting defaults for unparseable cells.
    ///
    /// The row's own `listing_id` wins; `fallback_id` is used only when the cell is
    /// absent. Rows whose id is present but unusable, or absent without a fallback,
    /// are dropped because nothing could reference them later.
    pub fn sanitize(&self, fallback_id: Option<ListingId>) -> Option<Listing> {
        let id = match self.listing_id.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => match parse_count(raw) {
                Some(value) => ListingId(value),
                None => {
                    debug!(listing_id = raw, "dropping listing with unusable identifier");
                    return None;
                }
            },
            _ => fallback_id?,
        };

        let price = self
            .price
            .as_deref()
            .and_then(parse_amount)
            .filter(|price| *price >= 0.0)
            .unwrap_or_else(|| {
                debug!(%id, raw = ?self.price, "price unparseable, defaulting");
                DEFAULT_PRICE
            });
        let rating = self
            .review_rating
            .as_deref()
            .and_then(parse_amount)
            .unwrap_or_else(|| {
                debug!(%id, raw = ?self.review_rating, "rating unparseable, using neutral rating");
                NEUTRAL_RATING
            });
        let accommodates = self
            .accommodates
            .as_deref()
            .and_then(parse_count)
            .and_then(|value| u32::try_from(value).ok())
            .unwrap_or(DEFAULT_CAPACITY);
        let nights = |raw: &Option<String>, default: u32| {
            raw.as_deref()
                .and_then(parse_count)
                .and_then(|value| u32::try_from(value).ok())
                .unwrap_or(default)
        };

        Some(Listing {
            id,
            name: text(&self.name),
            location: text(&self.location),
            property_type: text(&self.property_type),
            accommodates,
            amenities: text(&self.amenities),
            price,
            min_nights: nights(&self.min_nights, DEFAULT_MIN_NIGHTS),
            max_nights: nights(&self.max_nights, DEFAULT_MAX_NIGHTS),
            rating,
            tags: text(&self.tags),
        })
    }
}

fn json_cell(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn text(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().trim_start_matches('$').replace(',', "");
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Whole, non-negative numbers; spreadsheet exports often render them as `4.0`.
fn parse_count(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<u64>() {
        return Some(value);
    }

    let value = raw.parse::<f64>().ok()?;
    (value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64)
        .then_some(value as u64)
}
