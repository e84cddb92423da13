//! Request and response bodies of the record service's internal API.
//!
//! The gateway's client speaks the same types, so both ends stay in lockstep.

use serde::{Deserialize, Serialize};

use crate::users::repo_types::{NewUser, SearchCriteria, UserRecord};

/// Body of `POST /internal/users/get`.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserIdRequest {
    pub id: i64,
}

/// Body of `POST /internal/users/batch`.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserIdsRequest {
    pub ids: Vec<i64>,
}

/// Body of `POST /internal/users/search`. Omitted fields are absent filters.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub married: Option<bool>,
}

impl From<SearchRequest> for SearchCriteria {
    fn from(r: SearchRequest) -> Self {
        Self {
            city: r.city,
            phone: r.phone,
            married: r.married,
        }
    }
}

impl From<SearchCriteria> for SearchRequest {
    fn from(c: SearchCriteria) -> Self {
        Self {
            city: c.city,
            phone: c.phone,
            married: c.married,
        }
    }
}

/// Body of `POST /internal/users`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AddUserRequest {
    pub user: NewUser,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: UserRecord,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UsersResponse {
    pub users: Vec<UserRecord>,
}

/// Error body for every non-2xx answer.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}
