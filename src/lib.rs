//! Todo gateway: a multi-tenant todo service guarded by capability tokens.
//!
//! Re-exports modules needed by integration tests in `tests/`.

pub mod api;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod registry;
pub mod resources;
pub mod state;
pub mod store;

pub use state::AppState;
