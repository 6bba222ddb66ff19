pub mod actor_handlers;
pub mod app;
pub mod app_state;
pub mod config;
pub mod handlers;
pub mod movie_handlers;
pub mod permissions;
pub mod store;

pub use app::{cors_layer, router};
pub use app_state::AppState;
pub use common_http_errors::ApiError;
