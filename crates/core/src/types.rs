/// Database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Timestamps are UTC everywhere; conversions happen at the edges.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
