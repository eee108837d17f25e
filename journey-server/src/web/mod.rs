//! Web layer for the journey planner.
//!
//! Provides HTTP endpoints for location search and journey planning. Each
//! endpoint answers HTML for browsers and JSON for everything else.

mod dto;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
pub use templates::*;
