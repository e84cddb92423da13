use serde::{Deserialize, Serialize};

use crate::users::repo_types::SearchCriteria;

/// Uniform envelope for every gateway response.
#[derive(Debug, Serialize)]
pub struct ClientResponse<T: Serialize> {
    pub status_code: u16,
    pub message: String,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ClientResponse<T> {
    pub fn success(status_code: u16, message: impl Into<String>, data: T) -> Self {
        Self {
            status_code,
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }
}

impl ClientResponse<()> {
    pub fn failure(status_code: u16, message: impl Into<String>, error: impl ToString) -> Self {
        Self {
            status_code,
            message: message.into(),
            data: None,
            error: Some(error.to_string()),
        }
    }
}

/// Body of `POST /adduser`.
#[derive(Debug, Deserialize)]
pub struct AddUserBody {
    pub fname: String,
    pub city: String,
    pub phone: String,
    pub height: f32,
    pub married: bool,
}

/// Query of `GET /user`.
#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Option<String>,
}

/// Query of `GET /search`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub city: Option<String>,
    pub phone: Option<String>,
    pub married: Option<bool>,
}

impl From<SearchQuery> for SearchCriteria {
    fn from(q: SearchQuery) -> Self {
        Self {
            city: q.city,
            phone: q.phone,
            married: q.married,
        }
    }
}
