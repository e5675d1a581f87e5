use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::SqlRecordsError;
use crate::record::Record;
use crate::types::RowValues;

/// Conversion hook applied to each value before field assignment. Returning
/// `Some` replaces the value; `None` leaves it untouched.
pub type DecodeHook = fn(&RowValues) -> Option<RowValues>;

/// Weak-typing and custom-conversion rules for row decoding.
///
/// ```rust
/// use sql_records::prelude::*;
///
/// let config = DecoderConfig::default()
///     .with_weak_typing(true)
///     .with_timestamp_format("%Y-%m-%dT%H:%M:%S");
/// # let _ = config;
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Permit string↔number and string↔bool conversions during assignment.
    pub weakly_typed: bool,
    /// chrono format used to coerce textual timestamps. When unset, the two
    /// common `YYYY-MM-DD HH:MM:SS[.SSS]` layouts are tried.
    pub timestamp_format: Option<String>,
    /// Pre-conversion hook, applied before the standard rule table.
    #[serde(skip)]
    pub decode_hook: Option<DecodeHook>,
}

impl DecoderConfig {
    #[must_use]
    pub fn with_weak_typing(mut self, on: bool) -> Self {
        self.weakly_typed = on;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = Some(format.into());
        self
    }

    #[must_use]
    pub fn with_decode_hook(mut self, hook: DecodeHook) -> Self {
        self.decode_hook = Some(hook);
        self
    }
}

fn mismatch(value: &RowValues, target: &str) -> SqlRecordsError {
    SqlRecordsError::DecodeError(format!(
        "cannot decode {} value into {target}",
        value.kind()
    ))
}

/// Conversion from a row value into one field type, honoring the configured
/// typing rules. The rule table mirrors permissive map-decoding behavior:
/// numeric kinds convert between each other unconditionally, text crosses
/// into numbers and bools only under weak typing.
pub trait FromRowValue: Sized {
    /// # Errors
    ///
    /// Returns `DecodeError` when the value cannot be coerced under the
    /// active rules.
    fn from_row_value(value: &RowValues, config: &DecoderConfig) -> Result<Self, SqlRecordsError>;
}

impl FromRowValue for i64 {
    fn from_row_value(value: &RowValues, config: &DecoderConfig) -> Result<Self, SqlRecordsError> {
        match value {
            RowValues::Int(i) => Ok(*i),
            RowValues::Float(f) => Ok(*f as i64),
            RowValues::Bool(b) if config.weakly_typed => Ok(i64::from(*b)),
            RowValues::Text(s) if config.weakly_typed => {
                s.trim().parse().map_err(|_| mismatch(value, "i64"))
            }
            RowValues::Blob(b) if config.weakly_typed => std::str::from_utf8(b)
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .ok_or_else(|| mismatch(value, "i64")),
            _ => Err(mismatch(value, "i64")),
        }
    }
}

impl FromRowValue for f64 {
    fn from_row_value(value: &RowValues, config: &DecoderConfig) -> Result<Self, SqlRecordsError> {
        match value {
            RowValues::Float(f) => Ok(*f),
            RowValues::Int(i) => Ok(*i as f64),
            RowValues::Text(s) if config.weakly_typed => {
                s.trim().parse().map_err(|_| mismatch(value, "f64"))
            }
            RowValues::Blob(b) if config.weakly_typed => std::str::from_utf8(b)
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .ok_or_else(|| mismatch(value, "f64")),
            _ => Err(mismatch(value, "f64")),
        }
    }
}

macro_rules! narrow_int_from_row_value {
    ($($ty:ty),+) => {
        $(
            impl FromRowValue for $ty {
                fn from_row_value(
                    value: &RowValues,
                    config: &DecoderConfig,
                ) -> Result<Self, SqlRecordsError> {
                    let wide = i64::from_row_value(value, config)?;
                    <$ty>::try_from(wide).map_err(|_| {
                        SqlRecordsError::DecodeError(format!(
                            "value {wide} out of range for {}",
                            stringify!($ty)
                        ))
                    })
                }
            }
        )+
    };
}

narrow_int_from_row_value!(i32, i16, u32, u64);

impl FromRowValue for f32 {
    fn from_row_value(value: &RowValues, config: &DecoderConfig) -> Result<Self, SqlRecordsError> {
        f64::from_row_value(value, config).map(|f| f as f32)
    }
}

impl FromRowValue for String {
    fn from_row_value(value: &RowValues, config: &DecoderConfig) -> Result<Self, SqlRecordsError> {
        match value {
            RowValues::Text(s) => Ok(s.clone()),
            RowValues::Blob(b) => std::str::from_utf8(b)
                .map(str::to_string)
                .map_err(|_| mismatch(value, "String")),
            RowValues::Int(i) if config.weakly_typed => Ok(i.to_string()),
            RowValues::Float(f) if config.weakly_typed => Ok(f.to_string()),
            RowValues::Bool(b) if config.weakly_typed => Ok(b.to_string()),
            RowValues::Timestamp(ts) if config.weakly_typed => {
                Ok(ts.format("%Y-%m-%d %H:%M:%S").to_string())
            }
            _ => Err(mismatch(value, "String")),
        }
    }
}

impl FromRowValue for bool {
    fn from_row_value(value: &RowValues, config: &DecoderConfig) -> Result<Self, SqlRecordsError> {
        match value {
            RowValues::Bool(b) => Ok(*b),
            RowValues::Int(0) => Ok(false),
            RowValues::Int(1) => Ok(true),
            RowValues::Text(s) if config.weakly_typed => match s.trim() {
                "true" | "t" | "1" => Ok(true),
                "false" | "f" | "0" => Ok(false),
                _ => Err(mismatch(value, "bool")),
            },
            _ => Err(mismatch(value, "bool")),
        }
    }
}

impl FromRowValue for NaiveDateTime {
    fn from_row_value(value: &RowValues, config: &DecoderConfig) -> Result<Self, SqlRecordsError> {
        match value {
            RowValues::Timestamp(ts) => Ok(*ts),
            RowValues::Text(s) => {
                if let Some(format) = &config.timestamp_format {
                    return NaiveDateTime::parse_from_str(s, format).map_err(|err| {
                        SqlRecordsError::DecodeError(format!(
                            "cannot parse `{s}` with format `{format}`: {err}"
                        ))
                    });
                }
                value.as_timestamp().ok_or_else(|| mismatch(value, "timestamp"))
            }
            RowValues::Int(secs) if config.weakly_typed => DateTime::from_timestamp(*secs, 0)
                .map(|dt| dt.naive_utc())
                .ok_or_else(|| mismatch(value, "timestamp")),
            _ => Err(mismatch(value, "timestamp")),
        }
    }
}

impl FromRowValue for Vec<u8> {
    fn from_row_value(value: &RowValues, _config: &DecoderConfig) -> Result<Self, SqlRecordsError> {
        match value {
            RowValues::Blob(b) => Ok(b.clone()),
            RowValues::Text(s) => Ok(s.clone().into_bytes()),
            _ => Err(mismatch(value, "bytes")),
        }
    }
}

impl FromRowValue for JsonValue {
    fn from_row_value(value: &RowValues, _config: &DecoderConfig) -> Result<Self, SqlRecordsError> {
        match value {
            RowValues::JSON(v) => Ok(v.clone()),
            RowValues::Text(s) => serde_json::from_str(s)
                .map_err(|err| SqlRecordsError::DecodeError(format!("invalid JSON text: {err}"))),
            _ => Err(mismatch(value, "json")),
        }
    }
}

impl<T: FromRowValue> FromRowValue for Option<T> {
    fn from_row_value(value: &RowValues, config: &DecoderConfig) -> Result<Self, SqlRecordsError> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_row_value(value, config).map(Some)
        }
    }
}

/// Resolution of a record shape's column tags against one cursor's columns.
///
/// Built once per decode operation and dropped with it; nothing is cached
/// across calls. Tags with no matching column are simply absent from the
/// slot list, as are row columns no tag names.
#[derive(Debug)]
pub(crate) struct FieldMap {
    // (declared field ordinal, row column index)
    slots: Vec<(usize, usize)>,
}

impl FieldMap {
    pub(crate) fn resolve(shape_columns: &[&str], row_columns: &[String]) -> FieldMap {
        let mut slots = Vec::with_capacity(shape_columns.len());
        for (ordinal, tag) in shape_columns.iter().enumerate() {
            if let Some(index) = row_columns.iter().position(|col| col == tag) {
                slots.push((ordinal, index));
            }
        }
        FieldMap { slots }
    }
}

/// Decode one row's values into a fresh record.
///
/// Null values are skipped so the field keeps its zero value (`None` for
/// `Option` fields). A shape with the fast-scan capability binds positionally
/// and bypasses the name mapping entirely.
pub(crate) fn decode_record<T: Record>(
    values: &[RowValues],
    map: &FieldMap,
    config: &DecoderConfig,
) -> Result<T, SqlRecordsError> {
    let mut record = T::default();

    if T::FAST_SCAN
        && let Some(result) = record.scan_fast(values, config)
    {
        result?;
        return Ok(record);
    }

    for &(ordinal, index) in &map.slots {
        let Some(value) = values.get(index) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        let converted = config.decode_hook.and_then(|hook| hook(value));
        record.assign(ordinal, converted.as_ref().unwrap_or(value), config)?;
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn strict() -> DecoderConfig {
        DecoderConfig::default()
    }

    fn weak() -> DecoderConfig {
        DecoderConfig::default().with_weak_typing(true)
    }

    #[test]
    fn numeric_kinds_convert_unconditionally() {
        assert_eq!(
            i64::from_row_value(&RowValues::Float(6.7), &strict()).unwrap(),
            6
        );
        assert_eq!(
            f64::from_row_value(&RowValues::Int(6), &strict()).unwrap(),
            6.0
        );
    }

    #[test]
    fn text_crosses_into_numbers_only_when_weak() {
        let v = RowValues::Text("45000.98".into());
        assert!(f64::from_row_value(&v, &strict()).is_err());
        assert_eq!(f64::from_row_value(&v, &weak()).unwrap(), 45000.98);

        let v = RowValues::Text("42".into());
        assert!(i64::from_row_value(&v, &strict()).is_err());
        assert_eq!(i64::from_row_value(&v, &weak()).unwrap(), 42);
    }

    #[test]
    fn numbers_render_as_text_only_when_weak() {
        let v = RowValues::Int(42);
        assert!(String::from_row_value(&v, &strict()).is_err());
        assert_eq!(String::from_row_value(&v, &weak()).unwrap(), "42");
    }

    #[test]
    fn narrow_integers_check_range() {
        assert_eq!(
            i32::from_row_value(&RowValues::Int(7), &strict()).unwrap(),
            7
        );
        assert!(i32::from_row_value(&RowValues::Int(i64::MAX), &strict()).is_err());
        assert!(u64::from_row_value(&RowValues::Int(-1), &strict()).is_err());
    }

    #[test]
    fn bool_accepts_integer_flags_strictly() {
        assert!(bool::from_row_value(&RowValues::Int(1), &strict()).unwrap());
        assert!(!bool::from_row_value(&RowValues::Int(0), &strict()).unwrap());
        assert!(bool::from_row_value(&RowValues::Int(3), &strict()).is_err());
    }

    #[test]
    fn timestamp_honors_configured_format() {
        let config = strict().with_timestamp_format("%Y-%m-%dT%H:%M:%S");
        let v = RowValues::Text("2024-05-01T08:30:00".into());
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        assert_eq!(NaiveDateTime::from_row_value(&v, &config).unwrap(), expected);

        // unparseable text under the configured format fails
        let bad = RowValues::Text("05/01/2024".into());
        assert!(NaiveDateTime::from_row_value(&bad, &config).is_err());
    }

    #[test]
    fn option_wraps_null_and_values() {
        assert_eq!(
            Option::<i64>::from_row_value(&RowValues::Null, &strict()).unwrap(),
            None
        );
        assert_eq!(
            Option::<i64>::from_row_value(&RowValues::Int(9), &strict()).unwrap(),
            Some(9)
        );
    }

    #[test]
    fn decode_hook_runs_before_rule_table() {
        fn upper(value: &RowValues) -> Option<RowValues> {
            value
                .as_text()
                .map(|s| RowValues::Text(s.to_uppercase()))
        }
        let config = strict().with_decode_hook(upper);
        let hooked = config.decode_hook.unwrap()(&RowValues::Text("bag".into()));
        assert_eq!(hooked, Some(RowValues::Text("BAG".into())));
    }
}
