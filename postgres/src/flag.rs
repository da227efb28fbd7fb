//! Normalization of routine output flags.
//!
//! Yes/no routines do not agree on an output type: some return `BOOLEAN`,
//! some return `0`/`1` integers, some a numeric text. The gateway reads
//! whatever came back into a [`RawFlag`] and converts it to `bool` here, so
//! nothing above the gateway sees the difference.

use sqlx::postgres::PgRow;
use sqlx::{Column, Row, TypeInfo};
use stayhub_core::StoreError;

/// A flag as the store returned it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawFlag {
    /// `BOOLEAN`
    Bool(bool),
    /// `SMALLINT`, `INTEGER` or `BIGINT`
    Int(i64),
    /// `REAL` or `DOUBLE PRECISION`
    Float(f64),
    /// `TEXT`/`VARCHAR` holding a number or a boolean literal
    Text(String),
}

impl RawFlag {
    /// Convert to `bool`: booleans pass through, numbers are true when
    /// non-zero.
    ///
    /// # Errors
    ///
    /// [`StoreError::Malformed`] when text is neither a number nor a boolean
    /// literal.
    pub fn normalize(&self) -> Result<bool, StoreError> {
        match self {
            Self::Bool(value) => Ok(*value),
            Self::Int(value) => Ok(*value != 0),
            Self::Float(value) => Ok(*value != 0.0),
            Self::Text(text) => {
                let text = text.trim();
                if let Ok(number) = text.parse::<f64>() {
                    return Ok(number != 0.0);
                }
                match text.to_ascii_lowercase().as_str() {
                    "t" | "true" => Ok(true),
                    "f" | "false" => Ok(false),
                    _ => Err(StoreError::Malformed(format!(
                        "flag value '{text}' is neither numeric nor boolean"
                    ))),
                }
            }
        }
    }

    /// Read the first column of a routine result.
    ///
    /// # Errors
    ///
    /// [`StoreError::Malformed`] when the column is missing or of a type that
    /// cannot carry a flag.
    pub fn from_row(row: &PgRow) -> Result<Self, StoreError> {
        let column = row
            .try_column(0)
            .map_err(|e| StoreError::Malformed(format!("Flag column missing: {e}")))?;
        let type_name = column.type_info().name().to_string();

        let decoded = match type_name.as_str() {
            "BOOL" => row.try_get::<bool, _>(0).map(Self::Bool),
            "INT2" => row.try_get::<i16, _>(0).map(|v| Self::Int(i64::from(v))),
            "INT4" => row.try_get::<i32, _>(0).map(|v| Self::Int(i64::from(v))),
            "INT8" => row.try_get::<i64, _>(0).map(Self::Int),
            "FLOAT4" => row.try_get::<f32, _>(0).map(|v| Self::Float(f64::from(v))),
            "FLOAT8" => row.try_get::<f64, _>(0).map(Self::Float),
            "TEXT" | "VARCHAR" | "BPCHAR" => row.try_get::<String, _>(0).map(Self::Text),
            other => {
                return Err(StoreError::Malformed(format!(
                    "Unsupported flag column type {other}"
                )));
            }
        };

        decoded.map_err(|e| StoreError::Malformed(format!("Failed to decode flag: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booleans_pass_through() {
        assert_eq!(RawFlag::Bool(true).normalize(), Ok(true));
        assert_eq!(RawFlag::Bool(false).normalize(), Ok(false));
    }

    #[test]
    fn numbers_are_true_when_non_zero() {
        assert_eq!(RawFlag::Int(1).normalize(), Ok(true));
        assert_eq!(RawFlag::Int(-3).normalize(), Ok(true));
        assert_eq!(RawFlag::Int(0).normalize(), Ok(false));
        assert_eq!(RawFlag::Float(0.0).normalize(), Ok(false));
        assert_eq!(RawFlag::Float(1.0).normalize(), Ok(true));
    }

    #[test]
    fn numeric_text_is_parsed() {
        assert_eq!(RawFlag::Text("1".into()).normalize(), Ok(true));
        assert_eq!(RawFlag::Text(" 0.000 ".into()).normalize(), Ok(false));
        assert_eq!(RawFlag::Text("t".into()).normalize(), Ok(true));
        assert_eq!(RawFlag::Text("FALSE".into()).normalize(), Ok(false));
    }

    #[test]
    fn garbage_text_is_malformed() {
        assert!(matches!(
            RawFlag::Text("maybe".into()).normalize(),
            Err(StoreError::Malformed(_))
        ));
    }
}
