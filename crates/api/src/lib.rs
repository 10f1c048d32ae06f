//! HTTP API for the production pipeline tracker.
//!
//! Thin Axum handlers over `greenlight_db` repositories, with the
//! multi-step workflow logic (segment bootstrap, gate decisions,
//! scheduling) in [`workflow`].

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod workflow;
