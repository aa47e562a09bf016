//! Transfer storage.
//!
//! The wallet manager depends only on [`TransferStore`]; backends decide how
//! records are kept.

use serde::{Deserialize, Serialize};
use std::sync::RwLock;

use crate::error::StoreError;
use crate::transfer::TransferRecord;

/// Stable handle of a stored transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransferId(pub u64);

/// Trait for transfer storage operations.
pub trait TransferStore: Send + Sync {
    fn get(&self, id: TransferId) -> Result<TransferRecord, StoreError>;

    fn get_by_uids(&self, uids: &str) -> Result<Option<(TransferId, TransferRecord)>, StoreError>;

    /// Find the transfer paying `target` whose hash or uids match.
    ///
    /// A chain transaction may pay several targets under one hash, so the
    /// target is part of the identity.
    fn find_by_hash_or_uids_and_target(
        &self,
        hash: Option<&str>,
        uids: Option<&str>,
        target: &str,
    ) -> Result<Option<(TransferId, TransferRecord)>, StoreError>;

    fn insert(&self, record: TransferRecord) -> Result<TransferId, StoreError>;

    fn update(&self, id: TransferId, record: TransferRecord) -> Result<(), StoreError>;

    fn iter(&self) -> Result<Vec<(TransferId, TransferRecord)>, StoreError>;

    fn len(&self) -> Result<usize, StoreError> {
        self.iter().map(|v| v.len())
    }

    fn is_empty(&self) -> Result<bool, StoreError> {
        self.len().map(|n| n == 0)
    }
}

/// In-memory transfer store, in insertion order.
#[derive(Debug, Default)]
pub struct MemoryTransferStore {
    records: RwLock<Vec<TransferRecord>>,
}

impl MemoryTransferStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn id_at(index: usize) -> TransferId {
    TransferId(index as u64)
}

impl TransferStore for MemoryTransferStore {
    fn get(&self, id: TransferId) -> Result<TransferRecord, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        usize::try_from(id.0)
            .ok()
            .and_then(|i| records.get(i))
            .cloned()
            .ok_or(StoreError::NotFound(id.0))
    }

    fn get_by_uids(&self, uids: &str) -> Result<Option<(TransferId, TransferRecord)>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records
            .iter()
            .position(|r| r.uids.as_deref() == Some(uids))
            .map(|i| (id_at(i), records[i].clone())))
    }

    fn find_by_hash_or_uids_and_target(
        &self,
        hash: Option<&str>,
        uids: Option<&str>,
        target: &str,
    ) -> Result<Option<(TransferId, TransferRecord)>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records
            .iter()
            .position(|r| r.matches(hash, uids, target))
            .map(|i| (id_at(i), records[i].clone())))
    }

    fn insert(&self, record: TransferRecord) -> Result<TransferId, StoreError> {
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        records.push(record);
        Ok(id_at(records.len() - 1))
    }

    fn update(&self, id: TransferId, record: TransferRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        let slot = usize::try_from(id.0)
            .ok()
            .and_then(|i| records.get_mut(i))
            .ok_or(StoreError::NotFound(id.0))?;
        *slot = record;
        Ok(())
    }

    fn iter(&self) -> Result<Vec<(TransferId, TransferRecord)>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records
            .iter()
            .enumerate()
            .map(|(i, r)| (id_at(i), r.clone()))
            .collect())
    }

    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.records.read().map_err(|_| StoreError::Poisoned)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::{TransferDirection, TransferState};
    use std::collections::BTreeMap;

    fn record(hash: Option<&str>, uids: Option<&str>, target: &str) -> TransferRecord {
        TransferRecord {
            uids: uids.map(str::to_string),
            hash: hash.map(str::to_string),
            identifier: None,
            source: "src".into(),
            target: target.into(),
            amount: "1".parse().unwrap(),
            fee: None,
            currency: "btc".into(),
            direction: TransferDirection::Received,
            state: TransferState::Submitted,
            attributes: BTreeMap::new(),
        }
    }

    #[test]
    fn insert_then_get() {
        let store = MemoryTransferStore::new();
        assert!(store.is_empty().unwrap());
        let id = store.insert(record(Some("h1"), None, "t")).unwrap();
        assert_eq!(store.get(id).unwrap().hash.as_deref(), Some("h1"));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn get_missing_is_not_found() {
        let store = MemoryTransferStore::new();
        assert!(matches!(store.get(TransferId(3)), Err(StoreError::NotFound(3))));
    }

    #[test]
    fn same_hash_different_targets_are_distinct() {
        let store = MemoryTransferStore::new();
        let a = store.insert(record(Some("h"), None, "target-a")).unwrap();
        let b = store.insert(record(Some("h"), None, "unknown")).unwrap();
        let found = store
            .find_by_hash_or_uids_and_target(Some("h"), None, "unknown")
            .unwrap()
            .map(|(id, _)| id);
        assert_eq!(found, Some(b));
        assert_ne!(a, b);
    }

    #[test]
    fn lookup_by_uids() {
        let store = MemoryTransferStore::new();
        store.insert(record(None, Some("u9"), "t")).unwrap();
        assert!(store.get_by_uids("u9").unwrap().is_some());
        assert!(store.get_by_uids("u0").unwrap().is_none());
        assert!(store
            .find_by_hash_or_uids_and_target(Some("other"), Some("u9"), "t")
            .unwrap()
            .is_some());
    }

    #[test]
    fn update_replaces_record() {
        let store = MemoryTransferStore::new();
        let id = store.insert(record(Some("h"), None, "t")).unwrap();
        let mut changed = store.get(id).unwrap();
        changed.state = TransferState::Deleted;
        store.update(id, changed).unwrap();
        assert_eq!(store.get(id).unwrap().state, TransferState::Deleted);
        assert!(store.update(TransferId(5), record(None, None, "t")).is_err());
    }
}
