/// Connection bootstrap and schema.
pub mod connection;

/// Record queries against the `access_parts` table.
pub mod queries;

pub use connection::Database;
