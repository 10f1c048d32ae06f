//! HTTP request handlers. Thin wrappers over the repositories and the
//! workflow facade; no business logic lives here.

pub mod person;
pub mod pool;
pub mod segment;
pub mod step;
