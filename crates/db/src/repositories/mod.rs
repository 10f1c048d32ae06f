//! Repository layer. Zero-sized structs with associated async functions
//! taking `&PgPool` as the first argument.

pub mod approval_repo;
pub mod person_repo;
pub mod pool_repo;
pub mod seat_repo;
pub mod segment_repo;
pub mod step_repo;

pub use approval_repo::ApprovalRepo;
pub use person_repo::PersonRepo;
pub use pool_repo::PoolRepo;
pub use seat_repo::SeatRepo;
pub use segment_repo::SegmentRepo;
pub use step_repo::StepRepo;
