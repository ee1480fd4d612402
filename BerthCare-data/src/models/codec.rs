//! Conversions between model fields and SQLite column values.
//!
//! Timestamps are stored as RFC 3339 text with microsecond precision and an
//! explicit `+00:00` offset so that lexical order matches chronological order.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::Row;
use serde_json::Value as JsonValue;

pub(crate) fn text(value: impl Into<String>) -> Value {
    Value::Text(value.into())
}

pub(crate) fn opt_text(value: Option<String>) -> Value {
    value.map_or(Value::Null, Value::Text)
}

pub(crate) fn integer(value: i64) -> Value {
    Value::Integer(value)
}

pub(crate) fn opt_integer(value: Option<i64>) -> Value {
    value.map_or(Value::Null, Value::Integer)
}

pub(crate) fn boolean(value: bool) -> Value {
    Value::Integer(i64::from(value))
}

pub(crate) fn timestamp(value: DateTime<Utc>) -> Value {
    Value::Text(value.to_rfc3339_opts(SecondsFormat::Micros, false))
}

pub(crate) fn opt_timestamp(value: Option<DateTime<Utc>>) -> Value {
    value.map_or(Value::Null, timestamp)
}

pub(crate) fn date(value: NaiveDate) -> Value {
    Value::Text(value.format("%Y-%m-%d").to_string())
}

pub(crate) fn time(value: NaiveTime) -> Value {
    Value::Text(value.format("%H:%M:%S").to_string())
}

pub(crate) fn json(value: &JsonValue) -> Value {
    Value::Text(value.to_string())
}

pub(crate) fn opt_json(value: Option<JsonValue>) -> Value {
    value.map_or(Value::Null, |v| json(&v))
}

pub(crate) fn string_list(values: Vec<String>) -> Value {
    json(&JsonValue::from(values))
}

pub(crate) fn read_json(row: &Row<'_>, idx: usize) -> rusqlite::Result<JsonValue> {
    let raw: String = row.get(idx)?;
    parse_json(idx, &raw)
}

pub(crate) fn read_opt_json(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<JsonValue>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|raw| parse_json(idx, &raw)).transpose()
}

pub(crate) fn read_string_list(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_json(idx: usize, raw: &str) -> rusqlite::Result<JsonValue> {
    serde_json::from_str(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
