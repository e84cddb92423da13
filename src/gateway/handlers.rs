use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    gateway::{
        client::ClientError,
        dto::{AddUserBody, ClientResponse, SearchQuery, UserIdQuery},
        validation::{is_valid_phone, parse_user_ids, validate_new_user, ValidationError},
    },
    state::GatewayState,
    users::repo_types::{SearchCriteria, UserRecord},
};

type Reply<T> = (StatusCode, Json<ClientResponse<T>>);
type Rejection = Reply<()>;

pub fn read_routes() -> Router<GatewayState> {
    Router::new()
        .route("/user", get(get_user_by_id))
        .route("/users", get(get_users_by_ids))
        .route("/search", get(search_users))
}

pub fn write_routes() -> Router<GatewayState> {
    Router::new().route("/adduser", post(add_user))
}

#[instrument(skip(state, payload))]
pub async fn add_user(
    State(state): State<GatewayState>,
    payload: Result<Json<AddUserBody>, JsonRejection>,
) -> Result<Reply<UserRecord>, Rejection> {
    let Json(body) =
        payload.map_err(|e| bad_request("Details not in correct format", e.body_text()))?;
    let user =
        validate_new_user(body).map_err(|e| bad_request("Constraints not satisfied", e))?;

    let created = state
        .client
        .add_user(user)
        .await
        .map_err(|e| upstream("Could not add user", e))?;

    info!(user_id = created.id, "user added");
    Ok(reply(StatusCode::CREATED, "User added successfully", created))
}

#[instrument(skip(state))]
pub async fn get_user_by_id(
    State(state): State<GatewayState>,
    Query(q): Query<UserIdQuery>,
) -> Result<Reply<UserRecord>, Rejection> {
    let raw = q.user_id.unwrap_or_default();
    let id = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| bad_request("UserID not in right format", ValidationError::InvalidId(raw.clone())))?;

    let user = state
        .client
        .get_user_by_id(id)
        .await
        .map_err(|e| upstream("Could not get user details", e))?;
    Ok(reply(StatusCode::OK, "Successfully got user details", user))
}

/// `GET /users?user_ids=1,2&user_ids=3`
#[instrument(skip(state))]
pub async fn get_users_by_ids(
    State(state): State<GatewayState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Reply<Vec<UserRecord>>, Rejection> {
    let raw: Vec<&str> = pairs
        .iter()
        .filter(|(k, _)| k == "user_ids")
        .map(|(_, v)| v.as_str())
        .collect();
    let ids = parse_user_ids(&raw).map_err(|e| bad_request("UserIDs not in right format", e))?;

    let users = state
        .client
        .get_users_by_ids(ids)
        .await
        .map_err(|e| upstream("Could not get user details", e))?;
    Ok(reply(StatusCode::OK, "Successfully got user details", users))
}

/// `GET /search?city=..&phone=..&married=..`; every parameter is optional.
#[instrument(skip(state))]
pub async fn search_users(
    State(state): State<GatewayState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Reply<Vec<UserRecord>>, Rejection> {
    let Query(q) = query.map_err(|e| bad_request("Details not in correct format", e.body_text()))?;
    let criteria: SearchCriteria = q.into();
    if let Some(phone) = criteria.phone_filter() {
        if !is_valid_phone(phone) {
            return Err(bad_request(
                "Constraints not satisfied",
                ValidationError::InvalidPhone(phone.to_string()),
            ));
        }
    }

    let users = state
        .client
        .search_users(criteria)
        .await
        .map_err(|e| upstream("Could not search users", e))?;
    Ok(reply(StatusCode::OK, "Successfully searched users", users))
}

fn reply<T: serde::Serialize>(status: StatusCode, message: &str, data: T) -> Reply<T> {
    (
        status,
        Json(ClientResponse::success(status.as_u16(), message, data)),
    )
}

fn bad_request(message: &str, err: impl ToString) -> Rejection {
    let err = err.to_string();
    warn!(error = %err, "{}", message);
    let status = StatusCode::BAD_REQUEST;
    (
        status,
        Json(ClientResponse::failure(status.as_u16(), message, err)),
    )
}

fn upstream(message: &str, e: ClientError) -> Rejection {
    let status = match &e {
        ClientError::NotFound(_) => StatusCode::NOT_FOUND,
        ClientError::Conflict(_) => StatusCode::CONFLICT,
        ClientError::Upstream { .. } | ClientError::Transport(_) => StatusCode::BAD_GATEWAY,
    };
    if status == StatusCode::BAD_GATEWAY {
        error!(error = %e, "{}", message);
    } else {
        warn!(error = %e, "{}", message);
    }
    (
        status,
        Json(ClientResponse::failure(status.as_u16(), message, e)),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request},
    };
    use mockall::predicate::eq;
    use tower::ServiceExt;

    use super::*;
    use crate::gateway::{self, client::MockUserClient};

    fn user(id: i64) -> UserRecord {
        UserRecord {
            id,
            fname: "akhil".into(),
            city: "bangalore".into(),
            phone: "9087678564".into(),
            height: 157.9,
            married: true,
        }
    }

    async fn send(client: MockUserClient, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let app = gateway::router().with_state(GatewayState::from_client(Arc::new(client)));
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn add_user_forwards_validated_user() {
        let mut client = MockUserClient::new();
        client
            .expect_add_user()
            .withf(|u| u.fname == "Test User" && u.phone == "1234567890")
            .times(1)
            .returning(|u| Ok(u.into_record(7)));

        let (status, body) = send(
            client,
            post_json(
                "/adduser",
                serde_json::json!({
                    "fname": " Test User", "city": "Test City", "phone": "1234567890",
                    "height": 170.5, "married": false
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status_code"], 201);
        assert_eq!(body["data"]["id"], 7);
    }

    #[tokio::test]
    async fn add_user_with_bad_phone_never_reaches_service() {
        let mut client = MockUserClient::new();
        client.expect_add_user().never();

        let (status, body) = send(
            client,
            post_json(
                "/adduser",
                serde_json::json!({
                    "fname": "Test User", "city": "Test City", "phone": "12345",
                    "height": 170.5, "married": false
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "12345 phone number is not valid");
    }

    #[tokio::test]
    async fn add_user_malformed_json_is_400() {
        let mut client = MockUserClient::new();
        client.expect_add_user().never();

        let (status, body) = send(
            client,
            post_json("/adduser", serde_json::json!({ "fname": "only" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Details not in correct format");
    }

    #[tokio::test]
    async fn add_user_conflict_is_409() {
        let mut client = MockUserClient::new();
        client.expect_add_user().returning(|_| {
            Err(ClientError::Conflict(
                "user with this phone is already exists".into(),
            ))
        });

        let (status, body) = send(
            client,
            post_json(
                "/adduser",
                serde_json::json!({
                    "fname": "Test User", "city": "Test City", "phone": "1234567890",
                    "height": 170.5, "married": false
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "user with this phone is already exists");
    }

    #[tokio::test]
    async fn get_user_parses_query_id() {
        let mut client = MockUserClient::new();
        client
            .expect_get_user_by_id()
            .with(eq(1))
            .times(1)
            .returning(|id| Ok(user(id)));

        let (status, body) = send(client, get("/user?user_id=1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["fname"], "akhil");
    }

    #[tokio::test]
    async fn get_user_bad_id_is_400() {
        let mut client = MockUserClient::new();
        client.expect_get_user_by_id().never();

        let (status, body) = send(client, get("/user?user_id=abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "UserID not in right format");
    }

    #[tokio::test]
    async fn get_user_not_found_is_404() {
        let mut client = MockUserClient::new();
        client
            .expect_get_user_by_id()
            .returning(|_| Err(ClientError::NotFound("user doesn't exist".into())));

        let (status, body) = send(client, get("/user?user_id=5")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "user doesn't exist");
    }

    #[tokio::test]
    async fn get_users_collects_repeated_and_comma_separated_ids() {
        let mut client = MockUserClient::new();
        client
            .expect_get_users_by_ids()
            .with(eq(vec![1, 2, 3]))
            .times(1)
            .returning(|ids| Ok(ids.into_iter().map(user).collect()));

        let (status, body) = send(client, get("/users?user_ids=1,%202&user_ids=3")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn search_passes_absent_marital_filter_through() {
        let mut client = MockUserClient::new();
        client
            .expect_search_users()
            .withf(|c| c.city.as_deref() == Some("X") && c.married.is_none())
            .times(1)
            .returning(|_| Ok(vec![user(1)]));

        let (status, body) = send(client, get("/search?city=X")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["id"], 1);
    }

    #[tokio::test]
    async fn search_rejects_malformed_phone_and_flag() {
        let mut client = MockUserClient::new();
        client.expect_search_users().never();
        let (status, _) = send(client, get("/search?phone=12")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let mut client = MockUserClient::new();
        client.expect_search_users().never();
        let (status, _) = send(client, get("/search?married=maybe")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unreachable_service_is_502() {
        let mut client = MockUserClient::new();
        client.expect_search_users().returning(|_| {
            Err(ClientError::Upstream {
                status: 500,
                message: "user store unavailable: db down".into(),
            })
        });

        let (status, body) = send(client, get("/search?married=true")).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["status_code"], 502);
    }
}
