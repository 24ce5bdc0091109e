use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::database::models::{Engineer, EngineerFilter};
use crate::database::store::{EngineerSession, EngineerStore, StoreError};

/// In-process engineer store for development and tests.
///
/// Sessions stage their writes and apply them all at once on commit, after
/// re-checking every precondition under the write lock.
#[derive(Clone, Default)]
pub struct MemoryEngineerStore {
    records: Arc<RwLock<Vec<Engineer>>>,
}

impl MemoryEngineerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EngineerStore for MemoryEngineerStore {
    async fn find(&self, filter: &EngineerFilter) -> Result<Vec<Engineer>, StoreError> {
        let records = self.records.read().await;
        let mut found: Vec<Engineer> = records
            .iter()
            .filter(|engineer| !engineer.is_deleted() && filter.matches(engineer))
            .cloned()
            .collect();
        // Stable sort: equal timestamps keep insertion order
        found.sort_by_key(|engineer| engineer.created_at);
        Ok(found)
    }

    async fn get(&self, username: &str) -> Result<Option<Engineer>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|engineer| engineer.username == username && !engineer.is_deleted())
            .cloned())
    }

    async fn get_unscoped(&self, username: &str) -> Result<Option<Engineer>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|engineer| engineer.username == username).cloned())
    }

    async fn begin(&self) -> Result<Box<dyn EngineerSession>, StoreError> {
        Ok(Box::new(MemorySession {
            records: Arc::clone(&self.records),
            pending: Vec::new(),
        }))
    }
}

#[derive(Debug)]
enum PendingWrite {
    Insert(Engineer),
    Replace { expected_version: i64, record: Engineer },
}

pub struct MemorySession {
    records: Arc<RwLock<Vec<Engineer>>>,
    pending: Vec<PendingWrite>,
}

impl MemorySession {
    /// Latest view of a username as this session sees it: its own staged
    /// writes first, then the committed records.
    async fn current(&self, username: &str) -> Option<Engineer> {
        let staged = self.pending.iter().rev().find_map(|write| match write {
            PendingWrite::Insert(record) | PendingWrite::Replace { record, .. }
                if record.username == username =>
            {
                Some(record.clone())
            }
            _ => None,
        });
        if staged.is_some() {
            return staged;
        }

        let records = self.records.read().await;
        records.iter().find(|engineer| engineer.username == username).cloned()
    }

    async fn current_active(&self, engineer: &Engineer) -> Result<Engineer, StoreError> {
        match self.current(&engineer.username).await {
            Some(current) if !current.is_deleted() && current.version == engineer.version => {
                Ok(current)
            }
            _ => Err(StoreError::VersionMismatch {
                username: engineer.username.clone(),
                expected: engineer.version,
            }),
        }
    }
}

#[async_trait]
impl EngineerSession for MemorySession {
    async fn insert(&mut self, engineer: &mut Engineer) -> Result<(), StoreError> {
        if self.current(&engineer.username).await.is_some() {
            return Err(StoreError::Duplicate(engineer.username.clone()));
        }

        let now = Utc::now();
        engineer.created_at = now;
        engineer.updated_at = now;
        engineer.deleted_at = None;
        engineer.version = 1;
        self.pending.push(PendingWrite::Insert(engineer.clone()));
        Ok(())
    }

    async fn update(&mut self, engineer: &mut Engineer) -> Result<(), StoreError> {
        let current = self.current_active(engineer).await?;

        let mut record = engineer.clone();
        record.created_at = current.created_at;
        record.updated_at = Utc::now();
        record.version = current.version + 1;

        self.pending.push(PendingWrite::Replace {
            expected_version: current.version,
            record: record.clone(),
        });
        *engineer = record;
        Ok(())
    }

    async fn delete(&mut self, engineer: &mut Engineer) -> Result<(), StoreError> {
        let current = self.current_active(engineer).await?;

        let mut record = current.clone();
        record.deleted_at = Some(Utc::now());
        record.version = current.version + 1;

        self.pending.push(PendingWrite::Replace {
            expected_version: current.version,
            record: record.clone(),
        });
        *engineer = record;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemorySession { records, pending } = *self;
        let mut records = records.write().await;

        let mut staged = records.clone();
        for write in pending {
            match write {
                PendingWrite::Insert(record) => {
                    if staged.iter().any(|existing| existing.username == record.username) {
                        return Err(StoreError::Duplicate(record.username));
                    }
                    staged.push(record);
                }
                PendingWrite::Replace { expected_version, record } => {
                    let slot = staged.iter_mut().find(|existing| {
                        existing.username == record.username
                            && existing.version == expected_version
                            && !existing.is_deleted()
                    });
                    match slot {
                        Some(slot) => *slot = record,
                        None => {
                            return Err(StoreError::VersionMismatch {
                                username: record.username,
                                expected: expected_version,
                            })
                        }
                    }
                }
            }
        }

        *records = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}
