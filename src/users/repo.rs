use async_trait::async_trait;
use sqlx::PgPool;

use crate::users::{
    repo_types::{FetchOutcome, NewUser, UserRecord},
    store::{StoreError, UserStore},
};

/// PostgreSQL-backed user store.
#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn exists_by_id(&self, id: i64) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)"#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;
        Ok(exists)
    }

    async fn exists_all_by_ids(&self, ids: &[i64]) -> Result<bool, StoreError> {
        for &id in ids {
            if !self.exists_by_id(id).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    async fn exists_by_phone(&self, phone: &str) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS(SELECT 1 FROM users WHERE phone = $1)"#,
        )
        .bind(phone)
        .fetch_one(&self.db)
        .await?;
        Ok(exists)
    }

    async fn fetch_by_id(&self, id: i64) -> Result<Option<UserRecord>, StoreError> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, fname, city, phone, height, married
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn fetch_many_by_ids(&self, ids: &[i64]) -> Vec<FetchOutcome> {
        let mut out = Vec::with_capacity(ids.len());
        for &id in ids {
            out.push(match self.fetch_by_id(id).await {
                Ok(Some(user)) => FetchOutcome::Found(user),
                Ok(None) => FetchOutcome::Missing(id),
                Err(error) => FetchOutcome::Failed { id, error },
            });
        }
        out
    }

    async fn scan_by_city(&self, city: &str) -> Result<Vec<UserRecord>, StoreError> {
        let rows = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, fname, city, phone, height, married
            FROM users
            WHERE city ILIKE '%' || $1 || '%' ESCAPE '\'
            ORDER BY id
            "#,
        )
        .bind(escape_like(city))
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn scan_by_phone(&self, phone: &str) -> Result<Vec<UserRecord>, StoreError> {
        let rows = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, fname, city, phone, height, married
            FROM users
            WHERE phone = $1
            ORDER BY id
            "#,
        )
        .bind(phone)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn scan_by_married(&self, married: bool) -> Result<Vec<UserRecord>, StoreError> {
        let rows = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, fname, city, phone, height, married
            FROM users
            WHERE married = $1
            ORDER BY id
            "#,
        )
        .bind(married)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn insert(&self, user: &NewUser) -> Result<UserRecord, StoreError> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (fname, city, phone, height, married)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, fname, city, phone, height, married
            "#,
        )
        .bind(&user.fname)
        .bind(&user.city)
        .bind(&user.phone)
        .bind(user.height)
        .bind(user.married)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            let unique_violation = e
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation());
            if unique_violation {
                StoreError::DuplicatePhone {
                    phone: user.phone.clone(),
                }
            } else {
                StoreError::Query(e)
            }
        })
    }
}

/// Escape LIKE wildcards so the city filter is matched literally.
fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn escape_like_neutralises_wildcards() {
        assert_eq!(escape_like("Kannur"), "Kannur");
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("c:\\dir"), "c:\\\\dir");
    }
}
