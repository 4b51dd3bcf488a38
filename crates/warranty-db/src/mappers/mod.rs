//! Entity ↔ model mappers
//!
//! Rows carry statuses as strings; conversion into entities is fallible
//! and surfaces unknown values as database errors.

mod catalog;
mod note;
mod registration;
mod ticket;
mod user;
mod warranty;

use warranty_core::DomainError;

/// Error for a status column holding a value the domain does not know
pub(crate) fn invalid_enum(column: &str, value: &str) -> DomainError {
    DomainError::DatabaseError(format!("Invalid {column} value in row: {value}"))
}
