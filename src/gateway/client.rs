use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::users::{
    dto::{
        AddUserRequest, ErrorBody, SearchRequest, UserIdRequest, UserIdsRequest, UserResponse,
        UsersResponse,
    },
    repo_types::{NewUser, SearchCriteria, UserRecord},
};

/// Failures seen by the gateway when calling the record service.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("user service answered {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("user service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Outbound port the gateway uses to reach the record service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserClient: Send + Sync {
    async fn get_user_by_id(&self, id: i64) -> Result<UserRecord, ClientError>;
    async fn get_users_by_ids(&self, ids: Vec<i64>) -> Result<Vec<UserRecord>, ClientError>;
    async fn search_users(&self, search: SearchCriteria) -> Result<Vec<UserRecord>, ClientError>;
    async fn add_user(&self, user: NewUser) -> Result<UserRecord, ClientError>;
}

/// [`UserClient`] over the record service's JSON API.
#[derive(Debug, Clone)]
pub struct HttpUserClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpUserClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    async fn call<B, R>(&self, path: &str, body: &B) -> Result<R, ClientError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.client.post(&url).json(body).send().await?;
        let status = resp.status();
        debug!(%url, %status, "user service call");
        if status.is_success() {
            return Ok(resp.json::<R>().await?);
        }

        let message = match resp.json::<ErrorBody>().await {
            Ok(body) => body.message,
            Err(_) => status.to_string(),
        };
        Err(match status {
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            StatusCode::CONFLICT => ClientError::Conflict(message),
            _ => ClientError::Upstream {
                status: status.as_u16(),
                message,
            },
        })
    }
}

#[async_trait]
impl UserClient for HttpUserClient {
    async fn get_user_by_id(&self, id: i64) -> Result<UserRecord, ClientError> {
        let resp: UserResponse = self
            .call("/internal/users/get", &UserIdRequest { id })
            .await?;
        Ok(resp.user)
    }

    async fn get_users_by_ids(&self, ids: Vec<i64>) -> Result<Vec<UserRecord>, ClientError> {
        let resp: UsersResponse = self
            .call("/internal/users/batch", &UserIdsRequest { ids })
            .await?;
        Ok(resp.users)
    }

    async fn search_users(&self, search: SearchCriteria) -> Result<Vec<UserRecord>, ClientError> {
        let resp: UsersResponse = self
            .call("/internal/users/search", &SearchRequest::from(search))
            .await?;
        Ok(resp.users)
    }

    async fn add_user(&self, user: NewUser) -> Result<UserRecord, ClientError> {
        let resp: UserResponse = self
            .call("/internal/users", &AddUserRequest { user })
            .await?;
        Ok(resp.user)
    }
}
