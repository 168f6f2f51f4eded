//! Row-to-entity parsing helpers.
//!
//! Every repo needs to convert `libsql::Row` (column-indexed) into typed entity
//! structs. These helpers isolate the parsing logic for timestamps, dates,
//! choice enums and hundredths-based quantities, plus the value conversions
//! going the other way.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use colmeia_core::quantity::Quantity;

use crate::error::DatabaseError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format a timestamp the way every TEXT timestamp column stores it
/// (`"2026-02-09T14:30:00Z"`).
///
/// A single fixed format keeps lexical and chronological order identical.
#[must_use]
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00Z"`) and `SQLite`'s default
/// format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse an optional TEXT column as `Option<DateTime<Utc>>`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string cannot be parsed.
pub fn parse_optional_datetime(s: Option<&str>) -> Result<Option<DateTime<Utc>>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => Ok(Some(parse_datetime(s)?)),
        _ => Ok(None),
    }
}

#[must_use]
pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse an optional `YYYY-MM-DD` column.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string is not a valid date.
pub fn parse_optional_date(s: Option<&str>) -> Result<Option<NaiveDate>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Some)
            .map_err(|e| DatabaseError::Query(format!("Failed to parse date '{s}': {e}"))),
        _ => Ok(None),
    }
}

/// Parse a TEXT column into one of the colmeia-core choice enums.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string does not match any variant.
pub fn parse_enum<T>(s: &str) -> Result<T, DatabaseError>
where
    T: FromStr,
    T::Err: Display,
{
    s.parse::<T>()
        .map_err(|e| DatabaseError::Query(format!("Failed to parse enum from '{s}': {e}")))
}

/// Parse a nullable choice column. Empty strings count as NULL.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string matches no variant.
pub fn parse_optional_enum<T>(s: Option<&str>) -> Result<Option<T>, DatabaseError>
where
    T: FromStr,
    T::Err: Display,
{
    match s {
        Some(s) if !s.is_empty() => Ok(Some(parse_enum(s)?)),
        _ => Ok(None),
    }
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`.
/// You must use `get::<Option<String>>()` for nullable columns.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Read a `0`/`1` INTEGER column as `bool`.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_bool(row: &libsql::Row, idx: i32) -> Result<bool, DatabaseError> {
    Ok(row.get::<i64>(idx)? != 0)
}

/// Read a nullable hundredths column as a [`Quantity`].
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_quantity(row: &libsql::Row, idx: i32) -> Result<Option<Quantity>, DatabaseError> {
    Ok(row.get::<Option<i64>>(idx)?.map(Quantity::from_hundredths))
}

/// Read a `SUM(...)` column, where NULL means nothing matched.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_quantity_sum(row: &libsql::Row, idx: i32) -> Result<Quantity, DatabaseError> {
    Ok(get_opt_quantity(row, idx)?.unwrap_or(Quantity::ZERO))
}

/// Read a `COUNT(*)`-style column as `u32`.
///
/// # Errors
///
/// Returns `DatabaseError::InvalidState` for negative or oversized values.
pub fn get_count(row: &libsql::Row, idx: i32) -> Result<u32, DatabaseError> {
    let raw = row.get::<i64>(idx)?;
    u32::try_from(raw).map_err(|_| DatabaseError::InvalidState(format!("count out of range: {raw}")))
}

#[must_use]
pub fn quantity_value(quantity: Option<Quantity>) -> libsql::Value {
    quantity.map_or(libsql::Value::Null, |q| libsql::Value::Integer(q.hundredths()))
}

#[must_use]
pub fn date_value(date: Option<NaiveDate>) -> libsql::Value {
    date.map_or(libsql::Value::Null, |d| format_date(&d).into())
}

#[must_use]
pub fn datetime_value(dt: Option<DateTime<Utc>>) -> libsql::Value {
    dt.map_or(libsql::Value::Null, |d| format_datetime(&d).into())
}

#[must_use]
pub fn text_value(text: Option<&str>) -> libsql::Value {
    text.map_or(libsql::Value::Null, Into::into)
}

#[must_use]
pub const fn bool_value(flag: bool) -> libsql::Value {
    libsql::Value::Integer(if flag { 1 } else { 0 })
}

/// Run a single-column existence query (`SELECT 1 ... LIMIT 1`).
///
/// # Errors
///
/// Returns `DatabaseError` if the query fails.
pub async fn exists(
    conn: &libsql::Connection,
    sql: &str,
    params: Vec<libsql::Value>,
) -> Result<bool, DatabaseError> {
    let mut rows = conn.query(sql, libsql::params_from_iter(params)).await?;
    Ok(rows.next().await?.is_some())
}

/// Run a single-row, single-integer query such as `SELECT COUNT(*) ...`.
///
/// # Errors
///
/// Returns `DatabaseError` if the query fails or returns no row.
pub async fn count(
    conn: &libsql::Connection,
    sql: &str,
    params: Vec<libsql::Value>,
) -> Result<u32, DatabaseError> {
    let mut rows = conn.query(sql, libsql::params_from_iter(params)).await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    get_count(&row, 0)
}

/// Whether `error` is SQLite rejecting a write on a unique index over
/// `target` (`table.column`).
#[must_use]
pub fn is_unique_violation(error: &libsql::Error, target: &str) -> bool {
    error
        .to_string()
        .contains(&format!("UNIQUE constraint failed: {target}"))
}
