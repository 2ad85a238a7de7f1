//! Typed condition algebra and its translation to WHERE text.

use crate::entity::FieldKey;
use tessera_codec::{quote_identifier, CodecResult, Value};

/// A predicate over the fields of one entity.
///
/// Rendering never emits a literal `NOT (...)`: negation is pushed inward,
/// flipping comparisons to their complements and applying De Morgan to
/// groups. Empty groups render to nothing and drop out of their parent.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition<K> {
    /// `key = value`, or `key IS NULL` when the value is absent.
    Equal(K, Option<Value>),
    /// `key > value`.
    GreaterThan(K, Value),
    /// `key < value`.
    LessThan(K, Value),
    /// `key >= value`.
    GreaterOrEqual(K, Value),
    /// `key <= value`.
    LessOrEqual(K, Value),
    /// `key LIKE pattern`.
    Like(K, String),
    /// Conjunction.
    All(Vec<Condition<K>>),
    /// Disjunction.
    Any(Vec<Condition<K>>),
    /// Negation.
    Not(Box<Condition<K>>),
}

impl<K: FieldKey> Condition<K> {
    /// `key = value`; a NULL value becomes `key IS NULL`.
    pub fn equal(key: K, value: impl Into<Value>) -> Self {
        let value = value.into();
        if value.is_null() {
            Self::Equal(key, None)
        } else {
            Self::Equal(key, Some(value))
        }
    }

    /// `key IS NULL`.
    pub fn is_null(key: K) -> Self {
        Self::Equal(key, None)
    }

    /// `key != value`; a NULL value becomes `key IS NOT NULL`.
    pub fn not_equal(key: K, value: impl Into<Value>) -> Self {
        Self::equal(key, value).negate()
    }

    /// `key > value`.
    pub fn greater_than(key: K, value: impl Into<Value>) -> Self {
        Self::GreaterThan(key, value.into())
    }

    /// `key < value`.
    pub fn less_than(key: K, value: impl Into<Value>) -> Self {
        Self::LessThan(key, value.into())
    }

    /// `key >= value`.
    pub fn greater_or_equal(key: K, value: impl Into<Value>) -> Self {
        Self::GreaterOrEqual(key, value.into())
    }

    /// `key <= value`.
    pub fn less_or_equal(key: K, value: impl Into<Value>) -> Self {
        Self::LessOrEqual(key, value.into())
    }

    /// `key LIKE pattern`.
    pub fn like(key: K, pattern: impl Into<String>) -> Self {
        Self::Like(key, pattern.into())
    }

    /// All of `conditions`.
    pub fn all(conditions: impl IntoIterator<Item = Self>) -> Self {
        Self::All(conditions.into_iter().collect())
    }

    /// Any of `conditions`.
    pub fn any(conditions: impl IntoIterator<Item = Self>) -> Self {
        Self::Any(conditions.into_iter().collect())
    }

    /// Both `lhs` and `rhs`.
    pub fn and(lhs: Self, rhs: Self) -> Self {
        Self::All(vec![lhs, rhs])
    }

    /// Either `lhs` or `rhs`.
    pub fn or(lhs: Self, rhs: Self) -> Self {
        Self::Any(vec![lhs, rhs])
    }

    /// Wraps this condition in [`Condition::Not`].
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Renders the condition as WHERE-clause text.
    ///
    /// Returns `None` when the condition reduces to an empty group, in which
    /// case no WHERE clause should be emitted.
    ///
    /// # Errors
    ///
    /// Fails if a compared value has no literal form (blobs, non-finite reals).
    pub fn render(&self) -> CodecResult<Option<String>> {
        let text = match self {
            Self::Equal(key, Some(value)) => binary(*key, "=", value)?,
            Self::Equal(key, None) => format!("{} IS NULL", quote_identifier(key.name())),
            Self::GreaterThan(key, value) => binary(*key, ">", value)?,
            Self::LessThan(key, value) => binary(*key, "<", value)?,
            Self::GreaterOrEqual(key, value) => binary(*key, ">=", value)?,
            Self::LessOrEqual(key, value) => binary(*key, "<=", value)?,
            Self::Like(key, pattern) => like(*key, "LIKE", pattern)?,
            Self::All(conditions) => return group(conditions, " AND ", Self::render),
            Self::Any(conditions) => return group(conditions, " OR ", Self::render),
            Self::Not(condition) => return condition.render_negated(),
        };
        Ok(Some(text))
    }

    fn render_negated(&self) -> CodecResult<Option<String>> {
        let text = match self {
            Self::Equal(key, Some(value)) => binary(*key, "!=", value)?,
            Self::Equal(key, None) => format!("{} IS NOT NULL", quote_identifier(key.name())),
            Self::GreaterThan(key, value) => binary(*key, "<=", value)?,
            Self::LessThan(key, value) => binary(*key, ">=", value)?,
            Self::GreaterOrEqual(key, value) => binary(*key, "<", value)?,
            Self::LessOrEqual(key, value) => binary(*key, ">", value)?,
            Self::Like(key, pattern) => like(*key, "NOT LIKE", pattern)?,
            Self::All(conditions) => return group(conditions, " OR ", Self::render_negated),
            Self::Any(conditions) => return group(conditions, " AND ", Self::render_negated),
            Self::Not(condition) => return condition.render(),
        };
        Ok(Some(text))
    }
}

impl<K: FieldKey> std::ops::Not for Condition<K> {
    type Output = Self;

    fn not(self) -> Self {
        self.negate()
    }
}

fn binary<K: FieldKey>(key: K, operator: &str, value: &Value) -> CodecResult<String> {
    Ok(format!(
        "{} {operator} {}",
        quote_identifier(key.name()),
        value.to_literal()?
    ))
}

fn like<K: FieldKey>(key: K, operator: &str, pattern: &str) -> CodecResult<String> {
    Ok(format!(
        "{} {operator} {}",
        quote_identifier(key.name()),
        Value::from(pattern).to_literal()?
    ))
}

// Negating a group renders each member negated under the swapped joiner,
// which is exactly rendering the De Morgan dual.
fn group<K: FieldKey>(
    conditions: &[Condition<K>],
    joiner: &str,
    render: fn(&Condition<K>) -> CodecResult<Option<String>>,
) -> CodecResult<Option<String>> {
    let mut parts = Vec::with_capacity(conditions.len());
    for condition in conditions {
        if let Some(part) = render(condition)? {
            parts.push(part);
        }
    }
    if parts.is_empty() {
        Ok(None)
    } else {
        Ok(Some(format!("({})", parts.join(joiner))))
    }
}
