//! Domain logic for the Greenlight production-pipeline tracker.
//!
//! This crate has zero internal dependencies and performs no I/O. Everything
//! here is pure computation over snapshots loaded by the caller: role and
//! status vocabularies, seat eligibility resolution, gate status derivation,
//! and the timeline scheduler.

pub mod approval;
pub mod error;
pub mod gate;
pub mod roles;
pub mod seats;
pub mod status;
pub mod timeline;
pub mod types;
