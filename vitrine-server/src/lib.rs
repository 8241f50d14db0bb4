//! HTTP surface of the Vitrine media catalog.
//!
//! Routes are assembled in [`routes::create_router`]; configuration,
//! shared state and error mapping live under [`infra`].

pub mod handlers;
pub mod infra;
pub mod middleware;
pub mod routes;

pub use infra::app_state::AppState;
