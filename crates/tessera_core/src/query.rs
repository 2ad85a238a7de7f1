//! Query descriptors: filter, order and window.

use crate::condition::Condition;
use crate::entity::FieldKey;
use tessera_codec::{quote_identifier, CodecResult};

/// Sort direction applied to a list of keys.
///
/// One direction covers the whole list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Order<K> {
    /// Ascending by the given keys, in priority order.
    Ascending(Vec<K>),
    /// Descending by the given keys, in priority order.
    Descending(Vec<K>),
}

impl<K: FieldKey> Order<K> {
    fn render(&self) -> Option<String> {
        let (keys, direction) = match self {
            Self::Ascending(keys) => (keys, "ASC"),
            Self::Descending(keys) => (keys, "DESC"),
        };
        if keys.is_empty() {
            return None;
        }
        let names: Vec<String> = keys.iter().map(|key| quote_identifier(key.name())).collect();
        Some(format!("ORDER BY {} {direction}", names.join(",")))
    }
}

/// Which records to read, count or delete.
///
/// A `limit` of zero means unbounded; `offset` skips that many matching rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Query<K> {
    /// Filter; `None` matches every record.
    pub condition: Option<Condition<K>>,
    /// Sort order; `None` leaves the order unspecified.
    pub order: Option<Order<K>>,
    /// Number of matching rows to skip.
    pub offset: usize,
    /// Maximum number of rows to return, zero for no limit.
    pub limit: usize,
}

impl<K> Default for Query<K> {
    fn default() -> Self {
        Self {
            condition: None,
            order: None,
            offset: 0,
            limit: 0,
        }
    }
}

impl<K: FieldKey> Query<K> {
    /// A query matching everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the filter, replacing any previous one.
    #[must_use]
    pub fn filter(mut self, condition: Condition<K>) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Narrows the current filter with `condition`.
    #[must_use]
    pub fn and_filter(mut self, condition: Condition<K>) -> Self {
        self.condition = Some(match self.condition.take() {
            None => condition,
            Some(existing) => Condition::and(existing, condition),
        });
        self
    }

    /// Sets the sort order.
    #[must_use]
    pub fn order_by(mut self, order: Order<K>) -> Self {
        self.order = Some(order);
        self
    }

    /// Sets the number of rows to skip.
    #[must_use]
    pub const fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Sets the maximum number of rows.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// A query returning at most the first match of `condition`.
    #[must_use]
    pub fn first(condition: Condition<K>) -> Self {
        Self::new().filter(condition).limit(1)
    }

    /// Renders the ` WHERE ...` fragment, or an empty string.
    ///
    /// # Errors
    ///
    /// Fails if the condition compares against a value with no literal form.
    pub fn render_where(&self) -> CodecResult<String> {
        let rendered = match &self.condition {
            Some(condition) => condition.render()?,
            None => None,
        };
        Ok(rendered.map_or_else(String::new, |text| format!(" WHERE {text}")))
    }

    /// Renders everything after `SELECT * FROM <table>`.
    ///
    /// Fragments appear in the order WHERE, ORDER BY, LIMIT, OFFSET; each is
    /// prefixed by a single space and omitted when not set.
    ///
    /// # Errors
    ///
    /// Fails if the condition compares against a value with no literal form.
    pub fn render_suffix(&self) -> CodecResult<String> {
        let mut suffix = self.render_where()?;
        if let Some(order) = self.order.as_ref().and_then(Order::render) {
            suffix.push(' ');
            suffix.push_str(&order);
        }
        if self.limit > 0 {
            suffix.push_str(&format!(" LIMIT {}", self.limit));
        }
        if self.offset > 0 {
            // OFFSET is only valid after a LIMIT clause.
            if self.limit == 0 {
                suffix.push_str(" LIMIT -1");
            }
            suffix.push_str(&format!(" OFFSET {}", self.offset));
        }
        Ok(suffix)
    }
}

impl<K: FieldKey> From<Condition<K>> for Query<K> {
    fn from(condition: Condition<K>) -> Self {
        Self::new().filter(condition)
    }
}
