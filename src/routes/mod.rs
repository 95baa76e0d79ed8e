use axum::Router;

use crate::state::AppState;

pub mod doc;
pub mod health;
pub mod menu;
pub mod orders;
pub mod params;
pub mod restaurants;
pub mod tables;
pub mod users;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/users", users::router())
        .nest("/restaurants", restaurants::router())
        .nest("/tables", tables::router())
        .nest("/menu", menu::router())
        .nest("/orders", orders::router())
}
