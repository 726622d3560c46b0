use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use super::{Record, RecordId, Repository, RepositoryError, UserId};

/// `Mutex`-guarded vector store; ids are `<prefix>-<sequence>` and unique per store.
pub struct InMemoryRepository<T> {
    prefix: &'static str,
    sequence: AtomicU64,
    records: Mutex<Vec<Record<T>>>,
}

impl<T> InMemoryRepository<T> {
    pub fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            sequence: AtomicU64::new(1),
            records: Mutex::new(Vec::new()),
        }
    }

    fn next_id(&self) -> RecordId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        RecordId(format!("{}-{id:06}", self.prefix))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Record<T>>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
    }
}

impl<T> Repository<T> for InMemoryRepository<T>
where
    T: Clone + Send + Sync,
{
    fn insert(&self, owner: &UserId, data: T) -> Result<Record<T>, RepositoryError> {
        let record = Record {
            id: self.next_id(),
            owner: owner.clone(),
            created_at: Utc::now(),
            data,
        };
        self.lock()?.push(record.clone());
        Ok(record)
    }

    fn update(&self, owner: &UserId, id: &RecordId, data: T) -> Result<Record<T>, RepositoryError> {
        let mut guard = self.lock()?;
        let record = guard
            .iter_mut()
            .find(|record| &record.id == id && &record.owner == owner)
            .ok_or(RepositoryError::NotFound)?;
        record.data = data;
        Ok(record.clone())
    }

    fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Record<T>>, RepositoryError> {
        let guard = self.lock()?;
        // Insertion order doubles as creation order.
        Ok(guard
            .iter()
            .rev()
            .filter(|record| &record.owner == owner)
            .cloned()
            .collect())
    }

    fn delete(&self, owner: &UserId, id: &RecordId) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        let position = guard
            .iter()
            .position(|record| &record.id == id && &record.owner == owner)
            .ok_or(RepositoryError::NotFound)?;
        guard.remove(position);
        Ok(())
    }

    fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.lock()?.len())
    }

    fn list_all(&self) -> Result<Vec<Record<T>>, RepositoryError> {
        Ok(self.lock()?.iter().rev().cloned().collect())
    }

    fn remove(&self, id: &RecordId) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        let position = guard
            .iter()
            .position(|record| &record.id == id)
            .ok_or(RepositoryError::NotFound)?;
        guard.remove(position);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> UserId {
        UserId(name.to_string())
    }

    #[test]
    fn ids_are_prefixed_and_sequential() {
        let store = InMemoryRepository::new("cmp");
        let first = store.insert(&user("alice"), 1).expect("insert");
        let second = store.insert(&user("alice"), 2).expect("insert");
        assert_eq!(first.id, RecordId("cmp-000001".to_string()));
        assert_eq!(second.id, RecordId("cmp-000002".to_string()));
    }

    #[test]
    fn listing_is_owner_scoped_and_newest_first() {
        let store = InMemoryRepository::new("txn");
        store.insert(&user("alice"), "a1").expect("insert");
        store.insert(&user("bob"), "b1").expect("insert");
        store.insert(&user("alice"), "a2").expect("insert");

        let alice: Vec<&str> = store
            .list_by_owner(&user("alice"))
            .expect("list")
            .into_iter()
            .map(|record| record.data)
            .collect();
        assert_eq!(alice, vec!["a2", "a1"]);
        assert_eq!(store.count().expect("count"), 3);
    }

    #[test]
    fn other_owners_cannot_touch_a_record() {
        let store = InMemoryRepository::new("txn");
        let record = store.insert(&user("alice"), 10).expect("insert");

        let err = store.delete(&user("mallory"), &record.id).expect_err("foreign delete");
        assert!(matches!(err, RepositoryError::NotFound));
        let err = store
            .update(&user("mallory"), &record.id, 99)
            .expect_err("foreign update");
        assert!(matches!(err, RepositoryError::NotFound));

        let updated = store.update(&user("alice"), &record.id, 11).expect("update");
        assert_eq!(updated.data, 11);
        store.delete(&user("alice"), &record.id).expect("delete");
        assert_eq!(store.count().expect("count"), 0);
    }

    #[test]
    fn admin_listing_and_removal_ignore_owner() {
        let store = InMemoryRepository::new("prf");
        let first = store.insert(&user("alice"), "a").expect("insert");
        store.insert(&user("bob"), "b").expect("insert");

        let all: Vec<&str> = store
            .list_all()
            .expect("list")
            .into_iter()
            .map(|record| record.data)
            .collect();
        assert_eq!(all, vec!["b", "a"]);

        store.remove(&first.id).expect("remove");
        assert!(matches!(store.remove(&first.id), Err(RepositoryError::NotFound)));
        assert_eq!(store.count().expect("count"), 1);
    }
}
