//! HTTP surface for the realtime item list.
//!
//! - `GET /` serves the bundled page
//! - `POST /create` appends an item
//! - `GET /items` renders the newest items as HTML
//! - `GET /sse` streams `items-update` and `time-update` events

mod error;
mod routes;
mod state;

pub use error::{ApiError, Result};
pub use routes::{build_router, escape_html, to_sse_event};
pub use state::AppState;
