//! Template persistence seam.
//!
//! The tracker only needs keyed get/put/delete and filtered lookups from its
//! document store. [`MemoryStore`] backs the CLI and tests; a database-backed
//! store plugs in behind [`TemplateStore`].

use std::collections::hash_map::Entry;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::model::{Scope, TemplateRecord};
use crate::progress::Progress;

/// Field constraints for [`TemplateStore::find`]; `None` matches anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateFilter {
    pub canvas_code: Option<String>,
    pub owner: Option<u64>,
    pub scope: Option<Scope>,
}

impl TemplateFilter {
    pub fn canvas(code: impl Into<String>) -> Self {
        Self {
            canvas_code: Some(code.into()),
            ..Self::default()
        }
    }

    #[allow(dead_code)]
    pub fn owner(mut self, owner: u64) -> Self {
        self.owner = Some(owner);
        self
    }

    #[allow(dead_code)]
    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn matches(&self, record: &TemplateRecord) -> bool {
        self.canvas_code
            .as_deref()
            .is_none_or(|code| record.canvas_code == code)
            && self.owner.is_none_or(|owner| record.owner == owner)
            && self.scope.is_none_or(|scope| record.scope == scope)
    }
}

/// Storage for template records keyed by `(name, canvas_code)`.
///
/// Every write is a single atomic check-and-set on one key, so concurrent
/// callers never overwrite each other blindly.
pub trait TemplateStore: Send + Sync {
    fn get(&self, name: &str, canvas_code: &str) -> Option<TemplateRecord>;

    /// Insert `record` unless its key is taken. Returns whether it was inserted.
    fn insert_if_absent(&self, record: TemplateRecord) -> bool;

    /// Overwrite the record with the same key. Returns `false`, writing
    /// nothing, when no such record exists.
    fn replace(&self, record: TemplateRecord) -> bool;

    /// Store `progress` on the record only if it still equals `expected`.
    fn update_progress(&self, expected: &TemplateRecord, progress: Progress) -> bool;

    /// Returns whether a record was removed.
    fn delete(&self, name: &str, canvas_code: &str) -> bool;

    fn find(&self, filter: &TemplateFilter) -> Vec<TemplateRecord>;
}

type Key = (String, String);

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<FxHashMap<Key, TemplateRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

fn key(name: &str, canvas_code: &str) -> Key {
    (name.to_owned(), canvas_code.to_owned())
}

impl TemplateStore for MemoryStore {
    fn get(&self, name: &str, canvas_code: &str) -> Option<TemplateRecord> {
        self.records.read().get(&key(name, canvas_code)).cloned()
    }

    fn insert_if_absent(&self, record: TemplateRecord) -> bool {
        match self.records.write().entry(key(&record.name, &record.canvas_code)) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
        }
    }

    fn replace(&self, record: TemplateRecord) -> bool {
        let mut records = self.records.write();
        match records.get_mut(&key(&record.name, &record.canvas_code)) {
            Some(current) => {
                *current = record;
                true
            }
            None => false,
        }
    }

    fn update_progress(&self, expected: &TemplateRecord, progress: Progress) -> bool {
        let mut records = self.records.write();
        match records.get_mut(&key(&expected.name, &expected.canvas_code)) {
            Some(current) if current == expected => {
                current.progress = progress;
                true
            }
            _ => false,
        }
    }

    fn delete(&self, name: &str, canvas_code: &str) -> bool {
        self.records.write().remove(&key(name, canvas_code)).is_some()
    }

    fn find(&self, filter: &TemplateFilter) -> Vec<TemplateRecord> {
        let mut found: Vec<_> = self
            .records
            .read()
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();
        // Hash order is arbitrary; keep listings stable.
        found.sort_by(|a, b| a.name.cmp(&b.name));
        found
    }
}
