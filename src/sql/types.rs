//! Declared column types and key value conversion
//!
//! Literal keys (compile time) and bound arguments (execution time) are both
//! converted to the column's declared type before they reach the affinity
//! function, so `5`, `5.0` and `"5"` on an INT column land in one partition.

use std::fmt;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Declared SQL column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    Boolean,
    /// 8-bit signed integer
    Byte,
    /// 16-bit signed integer
    Short,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    Float,
    Double,
    Varchar,
    Uuid,
    /// Calendar date, `YYYY-MM-DD`
    Date,
    /// Epoch milliseconds
    Timestamp,
    /// Anything the engine does not interpret; keys pass through untouched
    Other,
}

impl ColumnType {
    /// Returns the type name for explain output
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Byte => "TINYINT",
            ColumnType::Short => "SMALLINT",
            ColumnType::Int => "INT",
            ColumnType::Long => "BIGINT",
            ColumnType::Float => "REAL",
            ColumnType::Double => "DOUBLE",
            ColumnType::Varchar => "VARCHAR",
            ColumnType::Uuid => "UUID",
            ColumnType::Date => "DATE",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::Other => "OTHER",
        }
    }

    /// Returns true for fixed-width integer kinds
    pub fn is_integer(&self) -> bool {
        self.integer_range().is_some()
    }

    /// Inclusive value range of a fixed-width integer kind
    pub fn integer_range(&self) -> Option<(i64, i64)> {
        match self {
            ColumnType::Byte => Some((i8::MIN.into(), i8::MAX.into())),
            ColumnType::Short => Some((i16::MIN.into(), i16::MAX.into())),
            ColumnType::Int => Some((i32::MIN.into(), i32::MAX.into())),
            ColumnType::Long => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }

    /// Converts `value` to this type's canonical key form.
    ///
    /// Returns `None` when the value cannot represent a key of this type.
    /// SQL NULL never converts.
    pub fn convert(&self, value: &Value) -> Option<Value> {
        if value.is_null() {
            return None;
        }

        match self {
            ColumnType::Byte | ColumnType::Short | ColumnType::Int | ColumnType::Long => {
                let (min, max) = self.integer_range()?;
                let v = to_i64(value)?;
                (min..=max).contains(&v).then(|| Value::from(v))
            }
            ColumnType::Boolean => match value {
                Value::Bool(b) => Some(Value::Bool(*b)),
                Value::Number(n) => match n.as_i64() {
                    Some(0) => Some(Value::Bool(false)),
                    Some(1) => Some(Value::Bool(true)),
                    _ => None,
                },
                Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" => Some(Value::Bool(true)),
                    "false" => Some(Value::Bool(false)),
                    _ => None,
                },
                _ => None,
            },
            ColumnType::Float | ColumnType::Double => {
                let v = match value {
                    Value::Number(n) => n.as_f64()?,
                    Value::String(s) => s.trim().parse::<f64>().ok()?,
                    _ => return None,
                };
                let v = if *self == ColumnType::Float {
                    f64::from(v as f32)
                } else {
                    v
                };
                serde_json::Number::from_f64(v).map(Value::Number)
            }
            ColumnType::Varchar => match value {
                Value::String(s) => Some(Value::String(s.clone())),
                Value::Number(n) => Some(Value::String(n.to_string())),
                Value::Bool(b) => Some(Value::String(b.to_string())),
                _ => None,
            },
            ColumnType::Uuid => {
                let s = value.as_str()?;
                let id = Uuid::parse_str(s.trim()).ok()?;
                Some(Value::String(id.hyphenated().to_string()))
            }
            ColumnType::Date => {
                let s = value.as_str()?;
                let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()?;
                Some(Value::String(date.format("%Y-%m-%d").to_string()))
            }
            ColumnType::Timestamp => match value {
                Value::Number(n) => n.as_i64().map(Value::from),
                Value::String(s) => {
                    let ts = DateTime::parse_from_rfc3339(s.trim()).ok()?;
                    Some(Value::from(ts.timestamp_millis()))
                }
                _ => None,
            },
            ColumnType::Other => Some(value.clone()),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Interprets a JSON value as a whole integer.
pub(crate) fn to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                return Some(v);
            }
            let f = n.as_f64()?;
            // Only integral floats inside the i64 range.
            if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
                Some(f as i64)
            } else {
                None
            }
        }
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integer_conversion_normalizes() {
        assert_eq!(ColumnType::Int.convert(&json!(5)), Some(json!(5)));
        assert_eq!(ColumnType::Int.convert(&json!(5.0)), Some(json!(5)));
        assert_eq!(ColumnType::Int.convert(&json!(" 5 ")), Some(json!(5)));
        assert_eq!(ColumnType::Int.convert(&json!(5.5)), None);
        assert_eq!(ColumnType::Int.convert(&json!("five")), None);
    }

    #[test]
    fn test_integer_width_checked() {
        assert_eq!(ColumnType::Byte.convert(&json!(127)), Some(json!(127)));
        assert_eq!(ColumnType::Byte.convert(&json!(128)), None);
        assert_eq!(ColumnType::Short.convert(&json!(-32768)), Some(json!(-32768)));
        assert_eq!(ColumnType::Int.convert(&json!(i64::from(i32::MAX) + 1)), None);
        assert_eq!(ColumnType::Long.convert(&json!(i64::MAX)), Some(json!(i64::MAX)));
    }

    #[test]
    fn test_null_never_converts() {
        for ty in [ColumnType::Int, ColumnType::Varchar, ColumnType::Other] {
            assert_eq!(ty.convert(&Value::Null), None);
        }
    }

    #[test]
    fn test_uuid_canonical_form() {
        let converted = ColumnType::Uuid
            .convert(&json!("67E55044-10B1-426F-9247-BB680E5FE0C8"))
            .unwrap();
        assert_eq!(converted, json!("67e55044-10b1-426f-9247-bb680e5fe0c8"));
        assert_eq!(ColumnType::Uuid.convert(&json!("not-a-uuid")), None);
    }

    #[test]
    fn test_date_and_timestamp() {
        assert_eq!(
            ColumnType::Date.convert(&json!("2024-02-29")),
            Some(json!("2024-02-29"))
        );
        assert_eq!(ColumnType::Date.convert(&json!("2023-02-29")), None);
        assert_eq!(
            ColumnType::Timestamp.convert(&json!("1970-01-01T00:00:01Z")),
            Some(json!(1000))
        );
    }

    #[test]
    fn test_varchar_and_boolean() {
        assert_eq!(ColumnType::Varchar.convert(&json!(42)), Some(json!("42")));
        assert_eq!(ColumnType::Boolean.convert(&json!("TRUE")), Some(json!(true)));
        assert_eq!(ColumnType::Boolean.convert(&json!(2)), None);
    }

    #[test]
    fn test_integer_kinds() {
        assert!(ColumnType::Byte.is_integer());
        assert!(ColumnType::Long.is_integer());
        assert!(!ColumnType::Double.is_integer());
        assert!(!ColumnType::Varchar.is_integer());
    }
}
