use crate::state::AppState;
use axum::Router;

pub mod claims;
pub mod dto;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use claims::UserIdentity;
pub use jwt::{AuthUser, JwtKeys};

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
