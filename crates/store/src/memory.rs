//! In-memory record tables with optimistic versioning.
//!
//! Intended for tests/dev and as the reference persistence layer. Every row
//! carries a version that increments on each save; callers pass an
//! [`ExpectedVersion`] so a stale read-modify-write fails with a conflict
//! instead of silently clobbering a concurrent update.

use std::collections::HashMap;
use std::sync::RwLock;

use orderdesk_core::{DomainError, DomainResult, Entity, ExpectedVersion};

#[derive(Debug, Clone)]
struct Row<T> {
    record: T,
    version: u64,
}

/// One table of records keyed by typed id.
#[derive(Debug, Default)]
pub struct InMemoryTable<T: Entity> {
    rows: RwLock<HashMap<T::Id, Row<T>>>,
}

impl<T: Entity + Clone> InMemoryTable<T> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a new record at version 1. Fails if the id is already taken.
    pub fn insert(&self, record: T) -> DomainResult<()> {
        let mut rows = self.write()?;
        if rows.contains_key(&record.id()) {
            return Err(DomainError::conflict(format!(
                "record {:?} already exists",
                record.id()
            )));
        }
        rows.insert(record.id(), Row { record, version: 1 });
        Ok(())
    }

    pub fn get(&self, id: T::Id) -> DomainResult<T> {
        self.get_versioned(id).map(|(record, _)| record)
    }

    /// Fetch a record together with its current version, for a later
    /// `save(.., ExpectedVersion::Exact(version))`.
    pub fn get_versioned(&self, id: T::Id) -> DomainResult<(T, u64)> {
        let rows = self.read()?;
        rows.get(&id)
            .map(|row| (row.record.clone(), row.version))
            .ok_or(DomainError::NotFound)
    }

    /// Overwrite an existing record, checking the caller's version expectation.
    ///
    /// Returns the new version on success.
    pub fn save(&self, record: T, expected: ExpectedVersion) -> DomainResult<u64> {
        let mut rows = self.write()?;
        let row = rows.get_mut(&record.id()).ok_or(DomainError::NotFound)?;

        expected.check(row.version)?;

        row.record = record;
        row.version += 1;
        Ok(row.version)
    }

    pub fn remove(&self, id: T::Id) -> DomainResult<T> {
        let mut rows = self.write()?;
        rows.remove(&id)
            .map(|row| row.record)
            .ok_or(DomainError::NotFound)
    }

    pub fn contains(&self, id: T::Id) -> DomainResult<bool> {
        Ok(self.read()?.contains_key(&id))
    }

    /// Scan the table and return clones of every record matching `pred`.
    pub fn find<F>(&self, pred: F) -> DomainResult<Vec<T>>
    where
        F: Fn(&T) -> bool,
    {
        let rows = self.read()?;
        Ok(rows
            .values()
            .filter(|row| pred(&row.record))
            .map(|row| row.record.clone())
            .collect())
    }

    pub fn len(&self) -> DomainResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> DomainResult<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> DomainResult<std::sync::RwLockReadGuard<'_, HashMap<T::Id, Row<T>>>> {
        self.rows
            .read()
            .map_err(|_| DomainError::invariant("table lock poisoned"))
    }

    fn write(&self) -> DomainResult<std::sync::RwLockWriteGuard<'_, HashMap<T::Id, Row<T>>>> {
        self.rows
            .write()
            .map_err(|_| DomainError::invariant("table lock poisoned"))
    }
}
