use std::{collections::HashSet, sync::Arc};

use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::users::{
    repo_types::{FetchOutcome, NewUser, SearchCriteria, UserRecord},
    store::{StoreError, UserStore},
};

/// Errors surfaced by the user use cases.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("user doesn't exist")]
    NotFound,
    #[error("user with this phone is already exists")]
    Conflict,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl UserError {
    /// Stable code carried on the wire next to the message.
    pub fn code(&self) -> &'static str {
        match self {
            UserError::NotFound => "not_found",
            UserError::Conflict => "conflict",
            UserError::Store(_) => "store_failure",
        }
    }
}

/// Use-case layer between the transport adapters and the user store.
///
/// Every operation is a single check-then-act sequence against the store.
/// The check and the act are separate store calls and are not atomic; the
/// store's own uniqueness constraint on phone numbers is what closes the
/// race on [`UserUseCase::add_user`].
#[derive(Clone)]
pub struct UserUseCase {
    store: Arc<dyn UserStore>,
}

impl UserUseCase {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: i64) -> Result<UserRecord, UserError> {
        if !self.store.exists_by_id(id).await? {
            warn!(id, "user lookup for unknown id");
            return Err(UserError::NotFound);
        }
        match self.store.fetch_by_id(id).await? {
            Some(user) => Ok(user),
            None => {
                warn!(id, "user vanished between existence check and fetch");
                Err(UserError::NotFound)
            }
        }
    }

    /// All-or-nothing batch lookup: either every id resolves or the whole
    /// call fails.
    #[instrument(skip(self))]
    pub async fn get_many_by_ids(&self, ids: &[i64]) -> Result<Vec<UserRecord>, UserError> {
        if !self.store.exists_all_by_ids(ids).await? {
            warn!(count = ids.len(), "batch lookup includes unknown ids");
            return Err(UserError::NotFound);
        }

        let mut users = Vec::with_capacity(ids.len());
        for outcome in self.store.fetch_many_by_ids(ids).await {
            match outcome {
                FetchOutcome::Found(user) => users.push(user),
                FetchOutcome::Missing(id) => {
                    warn!(id, "user vanished between existence check and fetch");
                    return Err(UserError::NotFound);
                }
                FetchOutcome::Failed { id, error } => {
                    error!(id, error = %error, "batch fetch failed");
                    return Err(error.into());
                }
            }
        }
        Ok(users)
    }

    /// Union of one scan per present filter, deduplicated by id.
    ///
    /// Scans run in the order city, phone, married. A record keeps the
    /// position of the first scan that returned it. An absent marital filter
    /// skips that scan; a present one always runs, even when it is the only
    /// filter, and then returns every record with that flag.
    #[instrument(skip(self))]
    pub async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<UserRecord>, UserError> {
        let mut merged = SearchMerge::default();

        if let Some(city) = criteria.city_filter() {
            merged.extend(self.store.scan_by_city(city).await?);
        }
        if let Some(phone) = criteria.phone_filter() {
            merged.extend(self.store.scan_by_phone(phone).await?);
        }
        if let Some(married) = criteria.married {
            merged.extend(self.store.scan_by_married(married).await?);
        }

        let users = merged.into_users();
        debug!(found = users.len(), "search finished");
        Ok(users)
    }

    #[instrument(skip(self, user), fields(phone = %user.phone))]
    pub async fn add_user(&self, user: &NewUser) -> Result<UserRecord, UserError> {
        if self.store.exists_by_phone(&user.phone).await? {
            warn!("phone already registered");
            return Err(UserError::Conflict);
        }
        match self.store.insert(user).await {
            Ok(created) => {
                info!(id = created.id, "user added");
                Ok(created)
            }
            // Concurrent insert of the same phone got past the existence check.
            Err(StoreError::DuplicatePhone { .. }) => {
                warn!("phone registered concurrently");
                Err(UserError::Conflict)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// First-seen-wins accumulator for search results.
#[derive(Default)]
struct SearchMerge {
    seen: HashSet<i64>,
    users: Vec<UserRecord>,
}

impl SearchMerge {
    fn extend(&mut self, scanned: Vec<UserRecord>) {
        for user in scanned {
            if self.seen.insert(user.id) {
                self.users.push(user);
            }
        }
    }

    fn into_users(self) -> Vec<UserRecord> {
        self.users
    }
}
