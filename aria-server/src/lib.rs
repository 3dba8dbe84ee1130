//! HTTP server for aria
//!
//! Exposes the completion gateway at `POST /chat`, a health probe at
//! `GET /health` and the static chat page.

pub mod handlers;
pub mod server;
pub mod state;

pub use server::{build_router, run_server};
pub use state::AppState;
