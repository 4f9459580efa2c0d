//! User preference records backed by a JSON file.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::storage;
use crate::workflows::recommendations::UserPreference;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub name: String,
    pub group_size: u32,
    #[serde(default)]
    pub preferred_environment: String,
    pub budget_min: f64,
    pub budget_max: f64,
}

impl UserProfile {
    pub fn preference(&self) -> UserPreference {
        UserPreference {
            budget_min: self.budget_min,
            budget_max: self.budget_max,
            group_size: self.group_size,
            preferred_environment: self.preferred_environment.clone(),
        }
    }

    /// A budget whose minimum exceeds its maximum; such profiles never match any listing.
    pub fn has_inverted_budget(&self) -> bool {
        self.budget_min > self.budget_max
    }
}

/// Fields accepted when creating a profile.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewProfile {
    pub name: String,
    pub group_size: u32,
    #[serde(default)]
    pub preferred_environment: String,
    pub budget_min: f64,
    pub budget_max: f64,
}

/// Partial edit; unset fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub group_size: Option<u32>,
    pub preferred_environment: Option<String>,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("failed to access profile store {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("profile store {path} is not valid JSON: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("user {0} not found")]
    NotFound(UserId),
    #[error("group size must be at least 1")]
    InvalidGroupSize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ProfileDocument {
    next_user_seq: u64,
    users: Vec<UserProfile>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredProfiles {
    Current(ProfileDocument),
    Legacy(Vec<UserProfile>),
}

const USER_ID_PREFIX: &str = "usr-";

impl ProfileDocument {
    fn from_legacy(users: Vec<UserProfile>) -> Self {
        let next_user_seq = users
            .iter()
            .filter_map(|user| user.user_id.0.strip_prefix(USER_ID_PREFIX))
            .filter_map(|seq| seq.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        Self {
            next_user_seq,
            users,
        }
    }
}

/// File-backed profile store; every edit rewrites the file atomically.
pub struct ProfileStore {
    path: PathBuf,
    document: Mutex<ProfileDocument>,
}

impl ProfileStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ProfileError> {
        let path = path.as_ref().to_path_buf();
        let io_err = |source| ProfileError::Io {
            path: path.clone(),
            source,
        };

        let document = match storage::read_optional(&path).map_err(io_err)? {
            Some(bytes) if !storage::is_blank(&bytes) => {
                match serde_json::from_slice::<StoredProfiles>(&bytes) {
                    Ok(StoredProfiles::Current(document)) => document,
                    Ok(StoredProfiles::Legacy(users)) => ProfileDocument::from_legacy(users),
                    Err(source) => return Err(ProfileError::Corrupt { path, source }),
                }
            }
            _ => ProfileDocument {
                next_user_seq: 1,
                users: Vec::new(),
            },
        };

        info!(path = %path.display(), users = document.users.len(), "profile store opened");
        Ok(Self {
            path,
            document: Mutex::new(document),
        })
    }

    pub fn list(&self) -> Vec<UserProfile> {
        self.lock().users.clone()
    }

    pub fn find(&self, user_id: &UserId) -> Option<UserProfile> {
        self.lock()
            .users
            .iter()
            .find(|user| &user.user_id == user_id)
            .cloned()
    }

    pub fn create(&self, new: NewProfile) -> Result<UserProfile, ProfileError> {
        if new.group_size == 0 {
            return Err(ProfileError::InvalidGroupSize);
        }

        let mut document = self.lock();
        let profile = UserProfile {
            user_id: UserId(format!("{USER_ID_PREFIX}{:06}", document.next_user_seq)),
            name: new.name.trim().to_string(),
            group_size: new.group_size,
            preferred_environment: normalize_environment(&new.preferred_environment),
            budget_min: new.budget_min,
            budget_max: new.budget_max,
        };

        let mut next = document.clone();
        next.next_user_seq += 1;
        next.users.push(profile.clone());
        self.commit(&mut document, next)?;

        info!(user_id = %profile.user_id, "profile created");
        Ok(profile)
    }

    /// Apply a partial edit. Returns `Ok(None)` when the user does not exist.
    pub fn update(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<Option<UserProfile>, ProfileError> {
        if update.group_size == Some(0) {
            return Err(ProfileError::InvalidGroupSize);
        }

        let mut document = self.lock();
        let mut next = document.clone();
        let Some(profile) = next.users.iter_mut().find(|user| &user.user_id == user_id) else {
            return Ok(None);
        };

        if let Some(name) = update.name {
            profile.name = name.trim().to_string();
        }
        if let Some(group_size) = update.group_size {
            profile.group_size = group_size;
        }
        if let Some(environment) = update.preferred_environment {
            profile.preferred_environment = normalize_environment(&environment);
        }
        if let Some(budget_min) = update.budget_min {
            profile.budget_min = budget_min;
        }
        if let Some(budget_max) = update.budget_max {
            profile.budget_max = budget_max;
        }
        let updated = profile.clone();

        self.commit(&mut document, next)?;
        Ok(Some(updated))
    }

    /// Remove a profile, returning whether one was removed.
    pub fn delete(&self, user_id: &UserId) -> Result<bool, ProfileError> {
        let mut document = self.lock();
        let mut next = document.clone();
        let before = next.users.len();
        next.users.retain(|user| &user.user_id != user_id);
        if next.users.len() == before {
            return Ok(false);
        }

        self.commit(&mut document, next)?;
        info!(%user_id, "profile deleted");
        Ok(true)
    }

    fn commit(
        &self,
        current: &mut MutexGuard<'_, ProfileDocument>,
        next: ProfileDocument,
    ) -> Result<(), ProfileError> {
        let bytes = serde_json::to_vec_pretty(&next).map_err(|source| ProfileError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        storage::write_atomic(&self.path, &bytes).map_err(|source| ProfileError::Io {
            path: self.path.clone(),
            source,
        })?;
        **current = next;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, ProfileDocument> {
        self.document.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn normalize_environment(value: &str) -> String {
    value.trim().to_lowercase()
}
