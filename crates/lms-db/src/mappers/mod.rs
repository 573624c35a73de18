//! Mappers between database models and domain entities
//!
//! Text status columns are parsed into the closed domain enums here; an
//! unknown value means the row is corrupt and surfaces as a database error.

mod activity;
mod attendance;
mod book;
mod borrowing;
mod category;
mod library;
mod message;
mod reservation;
mod user;

use std::str::FromStr;

use lms_core::DomainError;

/// Parse a text enum column
pub(crate) fn parse_column<T>(value: &str, column: &'static str) -> Result<T, DomainError>
where
    T: FromStr<Err = DomainError>,
{
    value
        .parse()
        .map_err(|_| DomainError::DatabaseError(format!("invalid {column} value: {value}")))
}

/// Convert a list of models, failing on the first bad row
pub(crate) fn map_all<M, E>(models: Vec<M>) -> Result<Vec<E>, DomainError>
where
    E: TryFrom<M, Error = DomainError>,
{
    models.into_iter().map(E::try_from).collect()
}
