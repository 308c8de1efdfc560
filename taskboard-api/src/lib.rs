//! HTTP surface for the task board sharing engine

pub mod api;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod server;
pub mod state;
pub mod types;

pub use api::build_router;
pub use error::{ApiError, ApiResult};
pub use extract::{Caller, USER_ID_HEADER};
pub use state::AppState;
