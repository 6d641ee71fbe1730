//! Local document store: each owner's résumé collection, persisted as one
//! serialized sequence under a key namespaced by the owner.
//!
//! Persistence is whole-collection: every mutation reads the full sequence,
//! changes it, and writes the full sequence back. Reads fail soft (empty
//! collection + log); writes report their failure to the caller.

pub mod backend;
pub mod file;
pub mod redis_storage;

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::models::resume::{decode_stored, Contact, ResumeRecord, Text};
use crate::store::backend::{StorageBackend, StorageError};

pub use backend::MemoryStorage;
pub use file::FileStorage;
pub use redis_storage::RedisStorage;

const COLLECTION_KEY_PREFIX: &str = "resumes";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No authenticated owner")]
    MissingOwner,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Stored data could not be encoded or decoded: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Identity of the user a collection belongs to. Never blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OwnerKey(String);

impl OwnerKey {
    /// Fails with `MissingOwner` when no identity is present.
    pub fn parse(raw: Option<&str>) -> Result<Self, StoreError> {
        match raw.map(str::trim) {
            Some(owner) if !owner.is_empty() => Ok(Self(owner.to_string())),
            _ => Err(StoreError::MissingOwner),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn collection_key(&self) -> String {
        format!("{COLLECTION_KEY_PREFIX}:{}", self.0)
    }
}

impl fmt::Display for OwnerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Contact details known from the owner's session, copied into new records.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedContact {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl SeedContact {
    /// A blank record under a fresh id with name and email pre-filled.
    pub fn blank_record(&self) -> ResumeRecord {
        let mut record = ResumeRecord::blank(Uuid::new_v4(), Utc::now());
        record.contact = Arc::new(Contact {
            name: Text::from(self.name.as_str()),
            email: Text::from(self.email.as_str()),
            ..Contact::default()
        });
        record
    }
}

#[derive(Clone)]
pub struct DocumentStore {
    backend: Arc<dyn StorageBackend>,
}

impl DocumentStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Loads the owner's collection in stored order for display.
    ///
    /// Fails soft: an unreadable collection yields an empty one, and a record
    /// that cannot be decoded is skipped. Never use this as the read half of a
    /// write; see `read_collection`.
    pub async fn load(&self, owner: &OwnerKey) -> Vec<ResumeRecord> {
        let raw = match self.backend.get(&owner.collection_key()).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No stored resumes for owner {owner}");
                return Vec::new();
            }
            Err(e) => {
                error!("Failed to read resumes for owner {owner}: {e}");
                return Vec::new();
            }
        };

        let values = match serde_json::from_str::<Vec<Value>>(&raw) {
            Ok(values) => values,
            Err(e) => {
                error!("Failed to decode resumes for owner {owner}: {e}");
                return Vec::new();
            }
        };

        values
            .into_iter()
            .enumerate()
            .filter_map(|(i, value)| match decode_stored(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    error!("Skipping undecodable resume #{i} for owner {owner}: {e}");
                    None
                }
            })
            .collect()
    }

    /// Strict read for read-modify-write. Any backend or decode failure is
    /// returned, so a mutation never writes over data it could not read.
    pub async fn read_collection(&self, owner: &OwnerKey) -> Result<Vec<ResumeRecord>, StoreError> {
        let Some(raw) = self.backend.get(&owner.collection_key()).await? else {
            return Ok(Vec::new());
        };
        let values: Vec<Value> = serde_json::from_str(&raw)?;
        let records = values
            .into_iter()
            .map(decode_stored)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Replaces the owner's whole collection. Does not stamp `lastModified`.
    ///
    /// The collection is serialized before anything is written, and the
    /// backend replaces the value in one step, so a failure leaves the
    /// previous collection in place.
    pub async fn save(&self, owner: &OwnerKey, records: &[ResumeRecord]) -> Result<(), StoreError> {
        let payload = serde_json::to_string(records)?;
        self.backend.set(&owner.collection_key(), payload).await?;
        debug!("Saved {} resumes for owner {owner}", records.len());
        Ok(())
    }

    /// Creates a blank record seeded with the owner's name and email,
    /// appends it to the collection and persists immediately.
    pub async fn create(
        &self,
        owner: &OwnerKey,
        seed: &SeedContact,
    ) -> Result<ResumeRecord, StoreError> {
        let record = seed.blank_record();
        let mut records = self.read_collection(owner).await?;
        records.push(record.clone());
        self.save(owner, &records).await?;

        info!("Created resume {} for owner {owner}", record.id);
        Ok(record)
    }

    /// Removes the record with `id`. Unknown ids leave the collection untouched.
    pub async fn delete(&self, owner: &OwnerKey, id: Uuid) -> Result<(), StoreError> {
        let mut records = self.read_collection(owner).await?;
        let before = records.len();
        records.retain(|r| r.id != id);

        if records.len() == before {
            debug!("Delete of unknown resume {id} for owner {owner} ignored");
            return Ok(());
        }

        self.save(owner, &records).await?;
        info!("Deleted resume {id} for owner {owner}");
        Ok(())
    }

    /// Appends a copy of record `id` under a fresh id with a "(Copy)" name.
    /// Returns `None` when `id` is not in the collection.
    pub async fn duplicate(
        &self,
        owner: &OwnerKey,
        id: Uuid,
    ) -> Result<Option<ResumeRecord>, StoreError> {
        let mut records = self.read_collection(owner).await?;
        let Some(source) = records.iter().find(|r| r.id == id) else {
            debug!("Duplicate of unknown resume {id} for owner {owner}");
            return Ok(None);
        };

        let copy = source.duplicated(Uuid::new_v4(), Utc::now());
        records.push(copy.clone());
        self.save(owner, &records).await?;

        info!("Duplicated resume {id} as {} for owner {owner}", copy.id);
        Ok(Some(copy))
    }
}

/// Dashboard ordering: most recently modified first. Never persisted.
pub fn sort_for_dashboard(records: &mut [ResumeRecord]) {
    records.sort_by(|a, b| b.last_modified().cmp(&a.last_modified()));
}
