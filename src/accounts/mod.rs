mod dto;
pub mod handlers;
#[cfg(test)]
pub(crate) mod memory;
pub mod model;
pub mod reset;
pub mod store;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
