use std::{
    collections::BTreeMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use async_trait::async_trait;

use crate::users::{
    repo_types::{FetchOutcome, NewUser, UserRecord},
    store::{StoreError, UserStore},
};

/// Process-local user store, used when no database is configured and in tests.
///
/// Ids are assigned sequentially starting after the highest seeded id. Phone
/// uniqueness is re-checked under the write lock, so concurrent inserts of
/// the same phone cannot both succeed.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    last_id: i64,
    users: BTreeMap<i64, UserRecord>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `users`, keyed by their own ids.
    pub fn with_users(users: impl IntoIterator<Item = UserRecord>) -> Self {
        let users: BTreeMap<i64, UserRecord> = users.into_iter().map(|u| (u.id, u)).collect();
        let last_id = users.keys().next_back().copied().unwrap_or(0);
        Self {
            inner: RwLock::new(Inner { last_id, users }),
        }
    }

    pub fn len(&self) -> usize {
        self.read().map(|inner| inner.users.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::unavailable("in-memory user store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::unavailable("in-memory user store lock poisoned"))
    }

    fn scan(&self, pred: impl Fn(&UserRecord) -> bool) -> Result<Vec<UserRecord>, StoreError> {
        let inner = self.read()?;
        Ok(inner.users.values().filter(|u| pred(u)).cloned().collect())
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn exists_by_id(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.read()?.users.contains_key(&id))
    }

    async fn exists_all_by_ids(&self, ids: &[i64]) -> Result<bool, StoreError> {
        let inner = self.read()?;
        Ok(ids.iter().all(|id| inner.users.contains_key(id)))
    }

    async fn exists_by_phone(&self, phone: &str) -> Result<bool, StoreError> {
        Ok(self.read()?.users.values().any(|u| u.phone == phone))
    }

    async fn fetch_by_id(&self, id: i64) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn fetch_many_by_ids(&self, ids: &[i64]) -> Vec<FetchOutcome> {
        let inner = match self.read() {
            Ok(inner) => inner,
            Err(_) => {
                return ids
                    .iter()
                    .map(|&id| FetchOutcome::Failed {
                        id,
                        error: StoreError::unavailable("in-memory user store lock poisoned"),
                    })
                    .collect()
            }
        };
        ids.iter()
            .map(|&id| match inner.users.get(&id) {
                Some(user) => FetchOutcome::Found(user.clone()),
                None => FetchOutcome::Missing(id),
            })
            .collect()
    }

    async fn scan_by_city(&self, city: &str) -> Result<Vec<UserRecord>, StoreError> {
        let needle = city.to_lowercase();
        self.scan(|u| u.city.to_lowercase().contains(&needle))
    }

    async fn scan_by_phone(&self, phone: &str) -> Result<Vec<UserRecord>, StoreError> {
        self.scan(|u| u.phone == phone)
    }

    async fn scan_by_married(&self, married: bool) -> Result<Vec<UserRecord>, StoreError> {
        self.scan(|u| u.married == married)
    }

    async fn insert(&self, user: &NewUser) -> Result<UserRecord, StoreError> {
        let mut inner = self.write()?;
        if inner.users.values().any(|u| u.phone == user.phone) {
            return Err(StoreError::DuplicatePhone {
                phone: user.phone.clone(),
            });
        }
        inner.last_id += 1;
        let record = user.clone().into_record(inner.last_id);
        inner.users.insert(record.id, record.clone());
        Ok(record)
    }
}
