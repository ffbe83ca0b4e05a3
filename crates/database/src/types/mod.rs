//! Shared types and result types for the database layer

pub mod errors;

pub use errors::{DatabaseError, InvalidEnumValue};

pub type DatabaseResult<T> = Result<T, DatabaseError>;
