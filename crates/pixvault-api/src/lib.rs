//! Pixvault API Library
//!
//! HTTP handlers, middleware stack, and application setup.

mod api_doc;
mod handlers;

pub mod error;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use setup::routes::build_router;
pub use state::AppState;
