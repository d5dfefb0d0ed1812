//! REST trading gateway.
//!
//! Thin axum layer over the matching core: JWT auth, request parsing,
//! error-to-status mapping, and the per-symbol `Exchange` state.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
