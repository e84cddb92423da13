use crate::state::GatewayState;
use axum::Router;

pub mod client;
pub mod dto;
pub mod handlers;
pub mod validation;

pub fn router() -> Router<GatewayState> {
    Router::new()
        .merge(handlers::read_routes())
        .merge(handlers::write_routes())
}
