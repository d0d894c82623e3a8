/// Category primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Prints are keyed by an opaque string id (UUID on the managed backend).
pub type PrintId = String;

/// Users are keyed by the auth provider's opaque subject id.
pub type UserId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
