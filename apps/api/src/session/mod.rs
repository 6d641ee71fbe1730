//! Active-document session: the one résumé an owner is currently editing.
//!
//! Edits are applied in memory and stamped with a new `lastModified`; the
//! store is only written on `save`, which merges the active record back into
//! the owner's collection and persists the whole sequence.

pub mod path;

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::resume::{ResumeRecord, Text};
use crate::session::path::{FieldPath, FieldValue, PathError};
use crate::store::{DocumentStore, OwnerKey, StoreError};

/// Whether the active record already has a slot in the persisted collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentState {
    /// Opened from the collection; `save` replaces it by id.
    Persisted,
    /// Never written; `save` appends it.
    Unsaved,
}

#[derive(Debug, Clone)]
pub struct ActiveDocument {
    pub record: Arc<ResumeRecord>,
    pub state: DocumentState,
}

#[derive(Debug, Default)]
pub struct EditSession {
    collection: Vec<ResumeRecord>,
    active: Option<ActiveDocument>,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reloads the collection from the store. The active document is kept
    /// as-is; unflushed edits are not discarded.
    pub async fn refresh(&mut self, store: &DocumentStore, owner: &OwnerKey) -> &[ResumeRecord] {
        self.collection = store.load(owner).await;
        &self.collection
    }

    pub fn collection(&self) -> &[ResumeRecord] {
        &self.collection
    }

    pub fn active(&self) -> Option<&ActiveDocument> {
        self.active.as_ref()
    }

    /// Makes the record with `id` from the last-loaded collection active.
    /// A miss clears the active document.
    pub fn set_active_by_id(&mut self, id: Uuid) -> Option<&ActiveDocument> {
        self.active = self
            .collection
            .iter()
            .find(|r| r.id == id)
            .map(|record| ActiveDocument {
                record: Arc::new(record.clone()),
                state: DocumentState::Persisted,
            });
        if self.active.is_none() {
            debug!("Resume {id} not in loaded collection; session cleared");
        }
        self.active.as_ref()
    }

    /// Opens a record that has no slot in the collection yet.
    pub fn open_unsaved(&mut self, record: ResumeRecord) {
        self.active = Some(ActiveDocument {
            record: Arc::new(record),
            state: DocumentState::Unsaved,
        });
    }

    /// Applies `mutator` to the active record and stamps `lastModified`.
    /// Returns `false` when nothing is active.
    pub fn update<F>(&mut self, mutator: F) -> bool
    where
        F: FnOnce(&mut ResumeRecord),
    {
        let Some(doc) = self.active.as_mut() else {
            return false;
        };
        let record = Arc::make_mut(&mut doc.record);
        mutator(record);
        record.touch();
        true
    }

    /// Writes `value` at `field` in the active record. On error the record is
    /// left exactly as it was.
    pub fn update_field(&mut self, field: &FieldPath, value: FieldValue) -> Result<bool, PathError> {
        self.try_update(|record| path::apply(record, field, value))
    }

    /// Inserts a responsibility line at `position` (clamped to the end).
    pub fn insert_responsibility(
        &mut self,
        experience: usize,
        position: usize,
        line: &str,
    ) -> Result<bool, PathError> {
        self.try_update(|record| {
            let entries = Arc::make_mut(&mut record.experience);
            let entry = entries
                .get_mut(experience)
                .ok_or_else(|| PathError::IndexOutOfRange(experience.to_string()))?;
            let lines = Arc::make_mut(&mut Arc::make_mut(entry).responsibilities);
            lines.insert(position.min(lines.len()), Text::from(line));
            Ok(())
        })
    }

    pub fn remove_responsibility(
        &mut self,
        experience: usize,
        position: usize,
    ) -> Result<bool, PathError> {
        self.try_update(|record| {
            let entries = Arc::make_mut(&mut record.experience);
            let entry = entries
                .get_mut(experience)
                .ok_or_else(|| PathError::IndexOutOfRange(experience.to_string()))?;
            let lines = Arc::make_mut(&mut Arc::make_mut(entry).responsibilities);
            if position >= lines.len() {
                return Err(PathError::IndexOutOfRange(position.to_string()));
            }
            lines.remove(position);
            Ok(())
        })
    }

    /// Runs a fallible edit on a copy and commits it only on success.
    fn try_update<F>(&mut self, edit: F) -> Result<bool, PathError>
    where
        F: FnOnce(&mut ResumeRecord) -> Result<(), PathError>,
    {
        let Some(doc) = self.active.as_mut() else {
            return Ok(false);
        };
        let mut draft = Arc::clone(&doc.record);
        let record = Arc::make_mut(&mut draft);
        edit(record)?;
        record.touch();
        doc.record = draft;
        Ok(true)
    }

    /// Merges the active record into the store's current collection and
    /// persists the whole collection. Returns `false` when nothing is active.
    ///
    /// The collection is re-read first so records created or duplicated since
    /// the session opened are kept. On failure the document state is unchanged.
    pub async fn save(&mut self, store: &DocumentStore, owner: &OwnerKey) -> Result<bool, StoreError> {
        let Some(doc) = self.active.as_mut() else {
            return Ok(false);
        };

        let record = ResumeRecord::clone(&doc.record);
        let mut next = store.read_collection(owner).await?;
        match next.iter().position(|r| r.id == record.id) {
            Some(i) => next[i] = record,
            None => {
                if doc.state == DocumentState::Persisted {
                    warn!(
                        "Resume {} was removed from the collection while open; re-adding it",
                        record.id
                    );
                }
                next.push(record);
            }
        }

        store.save(owner, &next).await?;
        self.collection = next;
        doc.state = DocumentState::Persisted;
        info!("Saved resume {} for owner {owner}", doc.record.id);
        Ok(true)
    }

    /// Records a write made outside the session (create, duplicate) in the
    /// loaded collection, replacing any stale copy with the same id.
    pub fn track(&mut self, record: ResumeRecord) {
        match self.collection.iter_mut().find(|r| r.id == record.id) {
            Some(slot) => *slot = record,
            None => self.collection.push(record),
        }
    }

    /// Drops a deleted record from the loaded collection and clears the
    /// active document if it was the one deleted.
    pub fn forget(&mut self, id: Uuid) {
        self.collection.retain(|r| r.id != id);
        if self.active.as_ref().is_some_and(|doc| doc.record.id == id) {
            debug!("Active resume {id} deleted; session cleared");
            self.active = None;
        }
    }
}
