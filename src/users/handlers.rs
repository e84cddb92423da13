use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{error, instrument, warn};

use crate::{
    state::AppState,
    users::{
        dto::{
            AddUserRequest, ErrorBody, SearchRequest, UserIdRequest, UserIdsRequest,
            UserResponse, UsersResponse,
        },
        repo_types::SearchCriteria,
        services::UserError,
    },
};

type Rejection = (StatusCode, Json<ErrorBody>);

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/internal/users/get", post(get_user_by_id))
        .route("/internal/users/batch", post(get_users_by_ids))
        .route("/internal/users/search", post(search_users))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/internal/users", post(add_user))
}

#[instrument(skip(state))]
pub async fn get_user_by_id(
    State(state): State<AppState>,
    Json(req): Json<UserIdRequest>,
) -> Result<Json<UserResponse>, Rejection> {
    let user = state.users.get_by_id(req.id).await.map_err(reject)?;
    Ok(Json(UserResponse { user }))
}

#[instrument(skip(state))]
pub async fn get_users_by_ids(
    State(state): State<AppState>,
    Json(req): Json<UserIdsRequest>,
) -> Result<Json<UsersResponse>, Rejection> {
    let users = state.users.get_many_by_ids(&req.ids).await.map_err(reject)?;
    Ok(Json(UsersResponse { users }))
}

#[instrument(skip(state))]
pub async fn search_users(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<UsersResponse>, Rejection> {
    let criteria: SearchCriteria = req.into();
    let users = state.users.search(&criteria).await.map_err(reject)?;
    Ok(Json(UsersResponse { users }))
}

#[instrument(skip(state, req))]
pub async fn add_user(
    State(state): State<AppState>,
    Json(req): Json<AddUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), Rejection> {
    let user = state.users.add_user(&req.user).await.map_err(reject)?;
    Ok((StatusCode::CREATED, Json(UserResponse { user })))
}

fn reject(e: UserError) -> Rejection {
    let status = match &e {
        UserError::NotFound => StatusCode::NOT_FOUND,
        UserError::Conflict => StatusCode::CONFLICT,
        UserError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!(error = %e, "user request failed");
    } else {
        warn!(error = %e, "user request rejected");
    }
    (
        status,
        Json(ErrorBody {
            code: e.code().into(),
            message: e.to_string(),
        }),
    )
}
