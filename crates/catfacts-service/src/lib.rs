//! HTTP access layer for the cat facts store.
//!
//! Routes:
//! - `GET  /api/get_cat_facts/:topics`: `all` or comma-separated topic names
//! - `POST /api/write_new_cat_fact`: incremental create from `{"new_cat_facts": [...]}`
//! - `GET  /health`
//!
//! The layer only reads and appends stored records; it never reclassifies.

pub mod error;
pub mod handler;
pub mod server;

pub use error::ServiceError;
pub use handler::{facts_router, parse_topics, AppState};
pub use server::{run_server_with_shutdown, serve_with_shutdown};
