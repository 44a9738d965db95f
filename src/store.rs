//! Persistence for documents and their change history
use serde::Deserialize;
use sled::transaction::{ConflictableTransactionError, TransactionError};
use std::path::Path;
use std::sync::Arc;

use super::change::{Change, Update};
use super::config::StoreConfig;
use super::error::StoreError;
use super::lpa::Lpa;
use super::types::TimeStamp;

/// What the update pipeline needs from storage.
pub trait Store {
    fn get(&self, uid: &str) -> Result<Lpa, StoreError>;

    fn put(&self, lpa: &Lpa) -> Result<(), StoreError>;

    /// Writes the document together with the audit record of the update
    /// that produced it. Fails with [`StoreError::Conflict`] when the stored
    /// document's `updatedAt` is no longer `expected_updated_at`.
    fn put_changes(
        &self,
        lpa: &Lpa,
        update: &Update,
        expected_updated_at: Option<TimeStamp>,
    ) -> Result<(), StoreError>;

    /// Every applied update for `uid`, oldest first.
    fn get_changes(&self, uid: &str) -> Result<Vec<Update>, StoreError>;
}

/// The audit form of an applied [`Update`]. JSON values are kept as their
/// serialised text.
#[derive(Debug, PartialEq, Eq, minicbor::Encode, minicbor::Decode, Clone)]
pub struct AuditRecord {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub uid: String,
    #[n(2)]
    pub applied: Option<TimeStamp>,
    #[n(3)]
    pub author: String,
    #[n(4)]
    pub update_type: String,
    #[n(5)]
    pub changes: Vec<AuditChange>,
}

#[derive(Debug, PartialEq, Eq, minicbor::Encode, minicbor::Decode, Clone)]
pub struct AuditChange {
    #[n(0)]
    pub key: String,
    #[n(1)]
    pub old: String,
    #[n(2)]
    pub new: String,
}

impl From<&Update> for AuditRecord {
    fn from(update: &Update) -> Self {
        Self {
            id: update.id.clone(),
            uid: update.uid.clone(),
            applied: update.applied,
            author: update.author.clone(),
            update_type: update.update_type.clone(),
            changes: update
                .changes
                .iter()
                .map(|c| AuditChange {
                    key: c.key.clone(),
                    old: c.old.to_string(),
                    new: c.new.to_string(),
                })
                .collect(),
        }
    }
}

impl TryFrom<AuditRecord> for Update {
    type Error = serde_json::Error;

    fn try_from(record: AuditRecord) -> Result<Self, Self::Error> {
        let changes = record
            .changes
            .into_iter()
            .map(|c| {
                Ok(Change {
                    key: c.key,
                    old: serde_json::from_str(&c.old)?,
                    new: serde_json::from_str(&c.new)?,
                })
            })
            .collect::<Result<Vec<_>, serde_json::Error>>()?;

        Ok(Update {
            id: record.id,
            uid: record.uid,
            applied: record.applied,
            author: record.author,
            update_type: record.update_type,
            changes,
        })
    }
}

/// Only the part of a stored document needed for the write check.
#[derive(Deserialize)]
struct Version {
    #[serde(rename = "updatedAt", default)]
    updated_at: Option<TimeStamp>,
}

fn lpa_key(uid: &str) -> String {
    format!("lpa/{uid}")
}

fn change_prefix(uid: &str) -> String {
    format!("change/{uid}/")
}

/// Documents as JSON under `lpa/<uid>`, audit records as CBOR under
/// `change/<uid>/<update id>`. Update ids are UUIDv7 so a prefix scan yields
/// them in the order they were applied.
pub struct SledStore {
    instance: Arc<sled::Db>,
}

impl SledStore {
    pub fn new(instance: Arc<sled::Db>) -> Self {
        Self { instance }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Ok(Self::new(Arc::new(sled::open(path)?)))
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        Self::open(&config.path)
    }
}

impl Store for SledStore {
    fn get(&self, uid: &str) -> Result<Lpa, StoreError> {
        let Some(raw) = self.instance.get(lpa_key(uid))? else {
            return Err(StoreError::NotFound(uid.to_string()));
        };

        Ok(serde_json::from_slice(&raw)?)
    }

    fn put(&self, lpa: &Lpa) -> Result<(), StoreError> {
        self.instance
            .insert(lpa_key(&lpa.uid), serde_json::to_vec(lpa)?)?;
        self.instance.flush()?;

        Ok(())
    }

    fn put_changes(
        &self,
        lpa: &Lpa,
        update: &Update,
        expected_updated_at: Option<TimeStamp>,
    ) -> Result<(), StoreError> {
        let lpa_key = lpa_key(&lpa.uid);
        let change_key = format!("{}{}", change_prefix(&lpa.uid), update.id);
        let document = serde_json::to_vec(lpa)?;
        let record = minicbor::to_vec(AuditRecord::from(update))?;

        let result = self.instance.transaction(|tx| {
            let stored = match tx.get(lpa_key.as_bytes())? {
                Some(raw) => serde_json::from_slice::<Version>(&raw)
                    .map_err(|e| ConflictableTransactionError::Abort(StoreError::Json(e)))?
                    .updated_at,
                None => None,
            };

            if stored != expected_updated_at {
                return Err(ConflictableTransactionError::Abort(StoreError::Conflict(
                    lpa.uid.clone(),
                )));
            }

            tx.insert(lpa_key.as_bytes(), document.as_slice())?;
            tx.insert(change_key.as_bytes(), record.as_slice())?;
            Ok(())
        });

        match result {
            Ok(()) => {}
            Err(TransactionError::Abort(e)) => return Err(e),
            Err(TransactionError::Storage(e)) => return Err(StoreError::Sled(e)),
        }

        self.instance.flush()?;
        Ok(())
    }

    fn get_changes(&self, uid: &str) -> Result<Vec<Update>, StoreError> {
        self.instance
            .scan_prefix(change_prefix(uid))
            .values()
            .map(|raw| -> Result<Update, StoreError> {
                let raw = raw?;
                let record: AuditRecord = minicbor::decode(&raw)?;
                Ok(Update::try_from(record)?)
            })
            .collect()
    }
}
