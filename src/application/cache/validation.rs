//! In-memory validation record store.
//!
//! Holds at most one unresolved record per correlation hash.

use alloy_primitives::B256;

use crate::domain::{AgentId, ValidationRecord};

/// Validation records created by this process.
#[derive(Debug, Default)]
pub struct ValidationStore {
    records: Vec<ValidationRecord>,
}

impl ValidationStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a freshly requested record.
    ///
    /// If an unresolved record with the same hash exists it is replaced, so a
    /// hash never has two pending entries.
    pub fn open(&mut self, record: ValidationRecord) {
        if let Some(existing) = self
            .records
            .iter_mut()
            .find(|r| r.hash == record.hash && !r.responded)
        {
            *existing = record;
        } else {
            self.records.push(record);
        }
    }

    /// Mark the pending record for `hash` as responded with `score`.
    ///
    /// Returns `false` if no pending record matches.
    pub fn respond(&mut self, hash: B256, score: u8) -> bool {
        match self
            .records
            .iter_mut()
            .find(|r| r.hash == hash && !r.responded)
        {
            Some(record) => {
                record.responded = true;
                record.score = Some(score);
                true
            }
            None => false,
        }
    }

    /// Most recent record for `hash`.
    #[must_use]
    pub fn get(&self, hash: B256) -> Option<&ValidationRecord> {
        self.records.iter().rev().find(|r| r.hash == hash)
    }

    /// Records whose server is `agent`.
    #[must_use]
    pub fn for_agent(&self, agent: AgentId) -> Vec<ValidationRecord> {
        self.records
            .iter()
            .filter(|r| r.server_agent_id == agent)
            .cloned()
            .collect()
    }

    /// Number of records awaiting a response.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.records.iter().filter(|r| !r.responded).count()
    }

    /// Total number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Return `true` if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
