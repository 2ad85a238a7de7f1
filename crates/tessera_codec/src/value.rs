//! Dynamic stored value and store-type kinds.

use crate::error::{CodecError, CodecResult};
use std::fmt;

/// Storage class of a column.
///
/// Every scalar maps onto exactly one kind, and the kind alone decides the
/// type name used in DDL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// 64-bit signed integer.
    Integer,
    /// 64-bit float.
    Real,
    /// UTF-8 text.
    Text,
    /// Raw bytes.
    Blob,
}

impl ScalarKind {
    /// Returns the type name used in `CREATE TABLE` / `ALTER TABLE`.
    #[must_use]
    pub const fn sql_type(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Text => "TEXT",
            Self::Blob => "BLOB",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_type())
    }
}

/// A value as it is bound to a statement or read from a result column.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// Integer value.
    Integer(i64),
    /// Real value.
    Real(f64),
    /// Text value.
    Text(String),
    /// Blob value.
    Blob(Vec<u8>),
}

impl Value {
    /// Returns a short name of the value's storage class.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Integer(_) => "INTEGER",
            Self::Real(_) => "REAL",
            Self::Text(_) => "TEXT",
            Self::Blob(_) => "BLOB",
        }
    }

    /// Returns true for [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Renders the value as literal text for a generated WHERE clause.
    ///
    /// Numbers are emitted verbatim, text is single-quoted with embedded
    /// quotes doubled, and NULL becomes the `NULL` keyword.
    ///
    /// # Errors
    ///
    /// Blobs and non-finite reals have no literal form and return an error.
    pub fn to_literal(&self) -> CodecResult<String> {
        match self {
            Self::Null => Ok("NULL".to_string()),
            Self::Integer(v) => Ok(v.to_string()),
            Self::Real(v) if v.is_finite() => Ok(format!("{v:?}")),
            Self::Real(_) => Err(CodecError::NonFiniteReal),
            Self::Text(s) => Ok(quote(s, '\'')),
            Self::Blob(_) => Err(CodecError::BlobLiteral),
        }
    }
}

/// Renders `name` as a double-quoted identifier.
///
/// Embedded double quotes are doubled, so any table, column or index name
/// is usable, including reserved words such as `order` or `group`.
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    quote(name, '"')
}

fn quote(text: &str, mark: char) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push(mark);
    for ch in text.chars() {
        if ch == mark {
            out.push(mark);
        }
        out.push(ch);
    }
    out.push(mark);
    out
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Blob(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_literal_is_verbatim() {
        assert_eq!(Value::Integer(-42).to_literal().unwrap(), "-42");
    }

    #[test]
    fn real_literal_keeps_fraction() {
        assert_eq!(Value::Real(172.0).to_literal().unwrap(), "172.0");
        assert_eq!(Value::Real(0.25).to_literal().unwrap(), "0.25");
    }

    #[test]
    fn text_literal_is_quoted_and_escaped() {
        assert_eq!(Value::from("Jack").to_literal().unwrap(), "'Jack'");
        assert_eq!(Value::from("O'Hara").to_literal().unwrap(), "'O''Hara'");
    }

    #[test]
    fn null_literal() {
        assert_eq!(Value::Null.to_literal().unwrap(), "NULL");
    }

    #[test]
    fn blob_literal_is_rejected() {
        assert_eq!(
            Value::Blob(vec![1, 2]).to_literal(),
            Err(CodecError::BlobLiteral)
        );
    }

    #[test]
    fn non_finite_real_is_rejected() {
        assert_eq!(
            Value::Real(f64::NAN).to_literal(),
            Err(CodecError::NonFiniteReal)
        );
        assert_eq!(
            Value::Real(f64::INFINITY).to_literal(),
            Err(CodecError::NonFiniteReal)
        );
    }

    #[test]
    fn kind_sql_types() {
        assert_eq!(ScalarKind::Integer.sql_type(), "INTEGER");
        assert_eq!(ScalarKind::Real.sql_type(), "REAL");
        assert_eq!(ScalarKind::Text.sql_type(), "TEXT");
        assert_eq!(ScalarKind::Blob.sql_type(), "BLOB");
    }

    #[test]
    fn identifiers_are_double_quoted() {
        assert_eq!(quote_identifier("order"), "\"order\"");
        assert_eq!(quote_identifier("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    fn unquote(quoted: &str, mark: char) -> String {
        let doubled = format!("{mark}{mark}");
        quoted[1..quoted.len() - 1].replace(&doubled, &mark.to_string())
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn text_literal_recovers_text(text in ".*") {
                let literal = Value::from(text.as_str()).to_literal().unwrap();
                prop_assert!(literal.starts_with('\'') && literal.ends_with('\''));
                prop_assert_eq!(unquote(&literal, '\''), text);
            }

            #[test]
            fn identifier_recovers_name(name in ".*") {
                prop_assert_eq!(unquote(&quote_identifier(&name), '"'), name);
            }

            #[test]
            fn finite_real_literal_parses_back(v in any::<f64>().prop_filter("finite", |v| v.is_finite())) {
                let literal = Value::Real(v).to_literal().unwrap();
                prop_assert_eq!(literal.parse::<f64>().unwrap(), v);
            }
        }
    }
}
