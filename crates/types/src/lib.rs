//! SQL type codes and the tagged field value model shared across the engine.
//!
//! Type codes mirror the `java.sql.Types` alphabet the original Paradox
//! driver exposed to callers, since the cursor's typed accessors (§4.4 of
//! the engine specification) are defined in terms of it.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// SQL type code constants, matching `java.sql.Types` values.
///
/// Only the subset the Paradox column types map to is defined; the encoding
/// is otherwise arbitrary and exists so `FieldValue::sql_type_code` can be
/// compared and displayed the way a JDBC-style client would expect.
pub mod sql_types {
    pub const CHAR: i32 = 1;
    pub const NUMERIC: i32 = 2;
    pub const INTEGER: i32 = 4;
    pub const FLOAT: i32 = 6;
    pub const DOUBLE: i32 = 8;
    pub const VARCHAR: i32 = 12;
    pub const BOOLEAN: i32 = 16;
    pub const BIGINT: i32 = -5;
    pub const BINARY: i32 = -2;
    pub const DATE: i32 = 91;
    pub const TIME: i32 = 92;
    pub const TIMESTAMP: i32 = 93;
    pub const NULL: i32 = 0;
}

/// The decoded payload of a non-null field, tagged by Rust type rather than
/// by `sql_type_code` (the type code is carried alongside on `FieldValue`).
#[derive(Clone, Debug, PartialEq)]
pub enum RawValue {
    Text(String),
    Integer(i64),
    Floating(f64),
    Boolean(bool),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    Binary(Vec<u8>),
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Text(s) => write!(f, "{s}"),
            RawValue::Integer(i) => write!(f, "{i}"),
            RawValue::Floating(v) => write!(f, "{v}"),
            RawValue::Boolean(b) => write!(f, "{b}"),
            RawValue::Date(d) => write!(f, "{d}"),
            RawValue::Time(t) => write!(f, "{t}"),
            RawValue::Timestamp(t) => write!(f, "{t}"),
            RawValue::Binary(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

/// A single cell value: a SQL type code plus an optional typed payload.
///
/// Null is modeled as `value: None`, never as a sentinel payload. Equality
/// compares the type code first, then the payload (§3 of the engine
/// specification).
#[derive(Clone, Debug)]
pub struct FieldValue {
    pub sql_type_code: i32,
    pub value: Option<RawValue>,
}

impl FieldValue {
    pub fn null(sql_type_code: i32) -> Self {
        Self {
            sql_type_code,
            value: None,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self {
            sql_type_code: sql_types::VARCHAR,
            value: Some(RawValue::Text(value.into())),
        }
    }

    pub fn integer(value: i64) -> Self {
        Self {
            sql_type_code: sql_types::INTEGER,
            value: Some(RawValue::Integer(value)),
        }
    }

    pub fn floating(value: f64) -> Self {
        Self {
            sql_type_code: sql_types::DOUBLE,
            value: Some(RawValue::Floating(value)),
        }
    }

    pub fn boolean(value: bool) -> Self {
        Self {
            sql_type_code: sql_types::BOOLEAN,
            value: Some(RawValue::Boolean(value)),
        }
    }

    pub fn date(value: NaiveDate) -> Self {
        Self {
            sql_type_code: sql_types::DATE,
            value: Some(RawValue::Date(value)),
        }
    }

    pub fn time(value: NaiveTime) -> Self {
        Self {
            sql_type_code: sql_types::TIME,
            value: Some(RawValue::Time(value)),
        }
    }

    pub fn timestamp(value: NaiveDateTime) -> Self {
        Self {
            sql_type_code: sql_types::TIMESTAMP,
            value: Some(RawValue::Timestamp(value)),
        }
    }

    pub fn binary(value: Vec<u8>) -> Self {
        Self {
            sql_type_code: sql_types::BINARY,
            value: Some(RawValue::Binary(value)),
        }
    }

    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.value {
            Some(RawValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match &self.value {
            Some(RawValue::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn as_floating(&self) -> Option<f64> {
        match &self.value {
            Some(RawValue::Floating(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match &self.value {
            Some(RawValue::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match &self.value {
            Some(RawValue::Date(d)) => Some(*d),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<NaiveTime> {
        match &self.value {
            Some(RawValue::Time(t)) => Some(*t),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match &self.value {
            Some(RawValue::Timestamp(t)) => Some(*t),
            _ => None,
        }
    }

    pub fn as_binary(&self) -> Option<&[u8]> {
        match &self.value {
            Some(RawValue::Binary(b)) => Some(b.as_slice()),
            _ => None,
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        self.sql_type_code == other.sql_type_code && self.value == other.value
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(v) => write!(f, "{v}"),
            None => write!(f, "NULL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn null_is_explicit_not_sentinel() {
        let null_int = FieldValue::null(sql_types::INTEGER);
        assert!(null_int.is_null());
        assert_eq!(null_int.as_integer(), None);
    }

    #[test]
    fn equality_is_type_code_then_value() {
        let a = FieldValue::integer(5);
        let b = FieldValue::integer(5);
        let c = FieldValue {
            sql_type_code: sql_types::BIGINT,
            value: Some(RawValue::Integer(5)),
        };
        assert_eq!(a, b);
        assert_ne!(a, c, "same payload but different type code must differ");
    }

    #[test]
    fn null_values_with_same_type_code_are_equal() {
        assert_eq!(
            FieldValue::null(sql_types::VARCHAR),
            FieldValue::null(sql_types::VARCHAR)
        );
        assert_ne!(
            FieldValue::null(sql_types::VARCHAR),
            FieldValue::text("")
        );
    }

    proptest! {
        #[test]
        fn integer_round_trips_through_as_integer(v in any::<i64>()) {
            let field = FieldValue::integer(v);
            prop_assert_eq!(field.as_integer(), Some(v));
        }

        #[test]
        fn text_round_trips_through_as_text(s in ".*") {
            let field = FieldValue::text(s.clone());
            prop_assert_eq!(field.as_text(), Some(s.as_str()));
        }
    }
}
