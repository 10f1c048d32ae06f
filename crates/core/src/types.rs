/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Due dates are calendar dates. No time-of-day, no timezone conversion;
/// comparisons are date-only throughout.
pub type DueDate = chrono::NaiveDate;
