//! Per-user bookmarked listings.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Deserialize;
use tracing::debug;

use crate::storage;
use crate::workflows::catalog::ListingId;
use crate::workflows::profiles::UserId;

#[derive(Debug, thiserror::Error)]
pub enum FavoritesError {
    #[error("failed to access favorites store {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("favorites store {path} is not valid JSON: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
}

type FavoritesMap = BTreeMap<UserId, Vec<ListingId>>;

/// Older files stored ids as either numbers or strings, sometimes as a flat list of pairs.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredFavorites {
    ByUser(BTreeMap<String, Vec<StoredListingId>>),
    Pairs(Vec<StoredPair>),
}

#[derive(Deserialize)]
struct StoredPair {
    user_id: String,
    listing_id: StoredListingId,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredListingId {
    Number(u64),
    Text(String),
}

impl StoredListingId {
    fn normalize(&self) -> Option<ListingId> {
        match self {
            StoredListingId::Number(value) => Some(ListingId(*value)),
            StoredListingId::Text(text) => text.trim().parse().ok().map(ListingId),
        }
    }
}

impl StoredFavorites {
    fn into_map(self) -> FavoritesMap {
        let mut map = FavoritesMap::new();
        let mut push = |user: String, listing: &StoredListingId| {
            let Some(listing) = listing.normalize() else {
                debug!(user_id = %user, "skipping unreadable favorite");
                return;
            };
            let entry = map.entry(UserId(user)).or_default();
            if !entry.contains(&listing) {
                entry.push(listing);
            }
        };

        match self {
            StoredFavorites::ByUser(by_user) => {
                for (user, listings) in by_user {
                    for listing in &listings {
                        push(user.clone(), listing);
                    }
                }
            }
            StoredFavorites::Pairs(pairs) => {
                for pair in pairs {
                    push(pair.user_id, &pair.listing_id);
                }
            }
        }

        map.retain(|_, listings| !listings.is_empty());
        map
    }
}

/// File-backed favorites keyed by user, preserving the order listings were added.
pub struct FavoritesStore {
    path: PathBuf,
    favorites: Mutex<FavoritesMap>,
}

impl FavoritesStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FavoritesError> {
        let path = path.as_ref().to_path_buf();
        let favorites = match storage::read_optional(&path).map_err(|source| FavoritesError::Io {
            path: path.clone(),
            source,
        })? {
            Some(bytes) if !storage::is_blank(&bytes) => {
                serde_json::from_slice::<StoredFavorites>(&bytes)
                    .map_err(|source| FavoritesError::Corrupt {
                        path: path.clone(),
                        source,
                    })?
                    .into_map()
            }
            _ => FavoritesMap::new(),
        };

        Ok(Self {
            path,
            favorites: Mutex::new(favorites),
        })
    }

    pub fn for_user(&self, user_id: &UserId) -> Vec<ListingId> {
        self.lock().get(user_id).cloned().unwrap_or_default()
    }

    /// Returns `false` when the listing was already a favorite.
    pub fn add(&self, user_id: &UserId, listing_id: ListingId) -> Result<bool, FavoritesError> {
        let mut favorites = self.lock();
        if favorites
            .get(user_id)
            .is_some_and(|listings| listings.contains(&listing_id))
        {
            return Ok(false);
        }

        let mut next = favorites.clone();
        next.entry(user_id.clone()).or_default().push(listing_id);
        self.commit(&mut favorites, next)?;
        Ok(true)
    }

    /// Returns `false` when the listing was not a favorite.
    pub fn remove(&self, user_id: &UserId, listing_id: ListingId) -> Result<bool, FavoritesError> {
        let mut favorites = self.lock();
        let mut next = favorites.clone();
        let Some(listings) = next.get_mut(user_id) else {
            return Ok(false);
        };
        let before = listings.len();
        listings.retain(|id| *id != listing_id);
        if listings.len() == before {
            return Ok(false);
        }
        if listings.is_empty() {
            next.remove(user_id);
        }

        self.commit(&mut favorites, next)?;
        Ok(true)
    }

    fn commit(
        &self,
        current: &mut MutexGuard<'_, FavoritesMap>,
        next: FavoritesMap,
    ) -> Result<(), FavoritesError> {
        let bytes = serde_json::to_vec_pretty(&next).map_err(|source| FavoritesError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        storage::write_atomic(&self.path, &bytes).map_err(|source| FavoritesError::Io {
            path: self.path.clone(),
            source,
        })?;
        **current = next;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, FavoritesMap> {
        self.favorites.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_idempotent_and_remove_drops_empty_users() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("favorites.json");
        let store = FavoritesStore::open(&path).expect("open");
        let user = UserId::from("usr-000001");

        assert!(store.add(&user, ListingId(4)).expect("add"));
        assert!(!store.add(&user, ListingId(4)).expect("duplicate add"));
        assert!(store.add(&user, ListingId(2)).expect("add"));
        assert_eq!(store.for_user(&user), vec![ListingId(4), ListingId(2)]);

        assert!(store.remove(&user, ListingId(4)).expect("remove"));
        assert!(!store.remove(&user, ListingId(4)).expect("second remove"));
        assert!(store.remove(&user, ListingId(2)).expect("remove"));

        let on_disk: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).expect("read")).expect("json");
        assert_eq!(on_disk, serde_json::json!({}));
    }

    #[test]
    fn legacy_formats_are_normalized() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("favorites.json");

        std::fs::write(&path, r#"{"usr-000001": [3, "7", "oops", 3]}"#).expect("seed");
        let store = FavoritesStore::open(&path).expect("open map");
        assert_eq!(
            store.for_user(&UserId::from("usr-000001")),
            vec![ListingId(3), ListingId(7)]
        );

        std::fs::write(
            &path,
            r#"[{"user_id": "a", "listing_id": "5"}, {"user_id": "a", "listing_id": 6}]"#,
        )
        .expect("seed pairs");
        let store = FavoritesStore::open(&path).expect("open pairs");
        assert_eq!(
            store.for_user(&UserId::from("a")),
            vec![ListingId(5), ListingId(6)]
        );
    }
}
