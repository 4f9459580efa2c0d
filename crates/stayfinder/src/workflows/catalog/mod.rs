mod domain;
mod parser;
pub mod synthetic;

pub use domain::{
    Listing, ListingId, RawListing, DEFAULT_CAPACITY, DEFAULT_MAX_NIGHTS, DEFAULT_MIN_NIGHTS,
    DEFAULT_PRICE, NEUTRAL_RATING,
};

use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::storage;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("listings file access failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid listings CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("no usable listings in generated output: {0}")]
    Synthetic(String),
}

/// Immutable, ordered view of the catalog as of one load.
///
/// Refreshing the catalog produces a new snapshot; existing snapshots are never patched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogSnapshot {
    listings: Vec<Listing>,
}

impl CatalogSnapshot {
    /// Build a snapshot, keeping the first listing seen for each identifier.
    pub fn from_listings(listings: Vec<Listing>) -> Self {
        let mut seen = HashSet::with_capacity(listings.len());
        let listings = listings
            .into_iter()
            .filter(|listing| {
                let fresh = seen.insert(listing.id);
                if !fresh {
                    warn!(listing_id = %listing.id, "duplicate listing id ignored");
                }
                fresh
            })
            .collect();

        Self { listings }
    }

    /// Sanitize raw rows. Rows without a `listing_id` cell are numbered in order,
    /// starting after the highest explicit id so they never shadow a later row.
    pub fn from_raw<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = RawListing>,
    {
        let rows: Vec<RawListing> = rows.into_iter().collect();
        let mut next_fallback = next_free_id(rows.iter().filter_map(RawListing::explicit_id));
        let mut listings = Vec::with_capacity(rows.len());

        for row in rows {
            let fallback = next_fallback.map(ListingId);
            if let Some(listing) = row.sanitize(fallback) {
                if Some(listing.id) == fallback {
                    next_fallback = listing.id.0.checked_add(1);
                }
                listings.push(listing);
            }
        }
        Self::from_listings(listings)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let snapshot = Self::from_reader(file)?;
        info!(path = %path.display(), listings = snapshot.len(), "catalog loaded");
        Ok(snapshot)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let rows = parser::parse_rows(reader)?;
        Ok(Self::from_raw(rows))
    }

    /// Write the snapshot back out in the same CSV shape it is loaded from.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), CatalogError> {
        parser::write_rows(writer, &self.listings)?;
        Ok(())
    }

    /// Replace the CSV at `path` atomically.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CatalogError> {
        let path = path.as_ref();
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        storage::write_atomic(path, &buffer)?;
        info!(path = %path.display(), listings = self.len(), "catalog saved");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn find(&self, id: ListingId) -> Option<&Listing> {
        self.listings.iter().find(|listing| listing.id == id)
    }

    pub fn contains(&self, id: ListingId) -> bool {
        self.find(id).is_some()
    }

    pub fn filter(&self, filter: &ListingFilter) -> Vec<&Listing> {
        let keyword = filter
            .environment
            .as_deref()
            .map(|value| value.trim().to_lowercase())
            .filter(|value| !value.is_empty());

        self.listings
            .iter()
            .filter(|listing| keyword.as_deref().map_or(true, |kw| listing.located_in(kw)))
            .filter(|listing| filter.min_price.map_or(true, |min| listing.price >= min))
            .filter(|listing| filter.max_price.map_or(true, |max| listing.price <= max))
            .filter(|listing| {
                filter
                    .min_accommodates
                    .map_or(true, |min| listing.accommodates >= min)
            })
            .collect()
    }

    pub fn sorted(&self, key: SortKey, ascending: bool) -> Vec<&Listing> {
        sort_listings(self.listings.iter().collect(), key, ascending)
    }

    /// New snapshot with `additions` appended under fresh ids after the current maximum.
    ///
    /// Ids carried by the additions are ignored so they can never collide with catalog rows.
    pub fn merged_with<I>(&self, additions: I) -> Self
    where
        I: IntoIterator<Item = RawListing>,
    {
        let mut next_id = next_free_id(self.listings.iter().map(|listing| listing.id));
        let mut listings = self.listings.clone();
        let before = listings.len();

        for mut row in additions {
            let Some(id) = next_id else {
                warn!("listing id space exhausted; generated listing skipped");
                continue;
            };
            row.listing_id = None;
            if let Some(listing) = row.sanitize(Some(ListingId(id))) {
                listings.push(listing);
                next_id = id.checked_add(1);
            }
        }

        info!(
            added = listings.len() - before,
            total = listings.len(),
            "catalog snapshot merged"
        );
        Self { listings }
    }
}

/// First id above every id in `ids`; `None` once the id space is used up.
fn next_free_id<I>(ids: I) -> Option<u64>
where
    I: IntoIterator<Item = ListingId>,
{
    match ids.into_iter().map(|id| id.0).max() {
        Some(max) => max.checked_add(1),
        None => Some(0),
    }
}

/// Criteria for browsing the catalog; unset fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ListingFilter {
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub min_accommodates: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Price,
    #[serde(alias = "review_rating")]
    Rating,
    Accommodates,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "price" => Ok(Self::Price),
            "rating" | "review_rating" => Ok(Self::Rating),
            "accommodates" => Ok(Self::Accommodates),
            other => Err(format!(
                "unknown sort key '{other}', expected price, rating, or accommodates"
            )),
        }
    }
}

pub fn sort_listings(mut listings: Vec<&Listing>, key: SortKey, ascending: bool) -> Vec<&Listing> {
    listings.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Price => a.price.total_cmp(&b.price),
            SortKey::Rating => a.rating.total_cmp(&b.rating),
            SortKey::Accommodates => a.accommodates.cmp(&b.accommodates),
        };
        if ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });
    listings
}
