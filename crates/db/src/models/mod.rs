//! Entity models and DTOs, one module per table group.

pub mod approval;
pub mod person;
pub mod pool;
pub mod seat;
pub mod segment;
pub mod step;
