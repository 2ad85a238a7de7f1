//! The closed set of scalar types that can live in a column.

use crate::error::{CodecError, CodecResult};
use crate::value::{ScalarKind, Value};
use chrono::{DateTime, Utc};
use url::Url;

/// A field type that maps onto a single column.
///
/// Implementations exist for `i64`, `i32`, `f64`, `String`, `Vec<u8>`,
/// `DateTime<Utc>`, `Url` and `Option<T>` of any of those. The set is closed:
/// the store type, bind form and literal form of each is fixed.
pub trait Scalar: Sized {
    /// Storage class used for the column in DDL.
    const KIND: ScalarKind;

    /// Converts the scalar to the value bound to a statement parameter.
    fn to_value(&self) -> Value;

    /// Converts a non-NULL column value back into the scalar.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::KindMismatch`] when the stored value cannot
    /// satisfy this scalar.
    fn from_non_null(value: Value) -> CodecResult<Self>;

    /// Value substituted when the column is NULL.
    ///
    /// Columns added to an existing table read as NULL for old rows; this is
    /// what they decode to.
    ///
    /// # Errors
    ///
    /// Only fails for scalars whose default has to be constructed fallibly.
    fn decode_null() -> CodecResult<Self>;

    /// Decodes a column value, checking for NULL before delegating.
    ///
    /// # Errors
    ///
    /// Propagates [`Scalar::from_non_null`] failures.
    fn decode(value: Value) -> CodecResult<Self> {
        if value.is_null() {
            Self::decode_null()
        } else {
            Self::from_non_null(value)
        }
    }

    /// Renders the scalar as literal query text.
    ///
    /// # Errors
    ///
    /// See [`Value::to_literal`].
    fn to_literal(&self) -> CodecResult<String> {
        self.to_value().to_literal()
    }
}

impl Scalar for i64 {
    const KIND: ScalarKind = ScalarKind::Integer;

    fn to_value(&self) -> Value {
        Value::Integer(*self)
    }

    fn from_non_null(value: Value) -> CodecResult<Self> {
        match value {
            Value::Integer(v) => Ok(v),
            other => Err(CodecError::kind_mismatch(Self::KIND, other.type_name())),
        }
    }

    fn decode_null() -> CodecResult<Self> {
        Ok(0)
    }
}

impl Scalar for i32 {
    const KIND: ScalarKind = ScalarKind::Integer;

    fn to_value(&self) -> Value {
        Value::Integer(i64::from(*self))
    }

    fn from_non_null(value: Value) -> CodecResult<Self> {
        let wide = i64::from_non_null(value)?;
        i32::try_from(wide)
            .map_err(|_| CodecError::kind_mismatch(Self::KIND, "out-of-range INTEGER"))
    }

    fn decode_null() -> CodecResult<Self> {
        Ok(0)
    }
}

impl Scalar for f64 {
    const KIND: ScalarKind = ScalarKind::Real;

    fn to_value(&self) -> Value {
        Value::Real(*self)
    }

    #[allow(clippy::cast_precision_loss)]
    fn from_non_null(value: Value) -> CodecResult<Self> {
        match value {
            Value::Real(v) => Ok(v),
            // REAL affinity may hand back whole numbers as integers.
            Value::Integer(v) => Ok(v as f64),
            other => Err(CodecError::kind_mismatch(Self::KIND, other.type_name())),
        }
    }

    fn decode_null() -> CodecResult<Self> {
        Ok(0.0)
    }
}

impl Scalar for String {
    const KIND: ScalarKind = ScalarKind::Text;

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_non_null(value: Value) -> CodecResult<Self> {
        match value {
            Value::Text(v) => Ok(v),
            other => Err(CodecError::kind_mismatch(Self::KIND, other.type_name())),
        }
    }

    fn decode_null() -> CodecResult<Self> {
        Ok(String::new())
    }
}

impl Scalar for Vec<u8> {
    const KIND: ScalarKind = ScalarKind::Blob;

    fn to_value(&self) -> Value {
        Value::Blob(self.clone())
    }

    fn from_non_null(value: Value) -> CodecResult<Self> {
        match value {
            Value::Blob(v) => Ok(v),
            Value::Text(v) => Ok(v.into_bytes()),
            other => Err(CodecError::kind_mismatch(Self::KIND, other.type_name())),
        }
    }

    fn decode_null() -> CodecResult<Self> {
        Ok(Vec::new())
    }
}

/// Timestamps are stored as REAL seconds since the Unix epoch.
///
/// Decoding rounds to the nearest microsecond, which is the finest
/// resolution a double holds for present-day dates.
impl Scalar for DateTime<Utc> {
    const KIND: ScalarKind = ScalarKind::Real;

    #[allow(clippy::cast_precision_loss)]
    fn to_value(&self) -> Value {
        Value::Real(self.timestamp_micros() as f64 / 1_000_000.0)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_non_null(value: Value) -> CodecResult<Self> {
        let seconds = f64::from_non_null(value)?;
        let micros = (seconds * 1_000_000.0).round();
        if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
            return Err(CodecError::invalid_timestamp(seconds));
        }
        DateTime::from_timestamp_micros(micros as i64)
            .ok_or_else(|| CodecError::invalid_timestamp(seconds))
    }

    fn decode_null() -> CodecResult<Self> {
        Ok(DateTime::<Utc>::default())
    }
}

impl Scalar for Url {
    const KIND: ScalarKind = ScalarKind::Text;

    fn to_value(&self) -> Value {
        Value::Text(self.as_str().to_string())
    }

    fn from_non_null(value: Value) -> CodecResult<Self> {
        let text = String::from_non_null(value)?;
        Url::parse(&text).map_err(|e| CodecError::InvalidUrl {
            text,
            message: e.to_string(),
        })
    }

    fn decode_null() -> CodecResult<Self> {
        Self::from_non_null(Value::Text("about:blank".to_string()))
    }
}

impl<T: Scalar> Scalar for Option<T> {
    const KIND: ScalarKind = T::KIND;

    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }

    fn from_non_null(value: Value) -> CodecResult<Self> {
        T::from_non_null(value).map(Some)
    }

    fn decode_null() -> CodecResult<Self> {
        Ok(None)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        v.to_value()
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        v.to_value()
    }
}

impl From<Url> for Value {
    fn from(v: Url) -> Self {
        Value::Text(v.into())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
