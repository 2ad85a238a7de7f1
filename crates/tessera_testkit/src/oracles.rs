//! In-memory reference implementations used to check store results.

use crate::entities::{Person, PersonKey};
use std::cmp::Ordering;
use tessera_core::{Condition, Scalar, Value};

/// Evaluates `condition` against `person` with the engine's three-valued
/// logic.
///
/// Returns `None` when the result is unknown, which happens when a
/// comparison involves NULL. Rows for which this is not `Some(true)` are
/// not selected by the engine. Empty groups are ignored the same way the
/// rendered WHERE clause ignores them, so a condition made only of empty
/// groups selects everything.
pub fn evaluate(person: &Person, condition: &Condition<PersonKey>) -> Option<bool> {
    reduce(person, condition).unwrap_or(Some(true))
}

// Outer `None` means the condition renders to nothing.
fn reduce(person: &Person, condition: &Condition<PersonKey>) -> Option<Option<bool>> {
    let result = match condition {
        Condition::Equal(key, None) => Some(field(person, *key).is_null()),
        Condition::Equal(key, Some(value)) => {
            compare(&field(person, *key), value).map(Ordering::is_eq)
        }
        Condition::GreaterThan(key, value) => {
            compare(&field(person, *key), value).map(Ordering::is_gt)
        }
        Condition::LessThan(key, value) => compare(&field(person, *key), value).map(Ordering::is_lt),
        Condition::GreaterOrEqual(key, value) => {
            compare(&field(person, *key), value).map(Ordering::is_ge)
        }
        Condition::LessOrEqual(key, value) => {
            compare(&field(person, *key), value).map(Ordering::is_le)
        }
        Condition::Like(key, pattern) => match field(person, *key) {
            Value::Null => None,
            Value::Integer(v) => Some(like(pattern, &v.to_string())),
            Value::Real(v) => Some(like(pattern, &format!("{v:?}"))),
            Value::Text(text) => Some(like(pattern, &text)),
            Value::Blob(bytes) => Some(like(pattern, &String::from_utf8_lossy(&bytes))),
        },
        Condition::All(conditions) => {
            let results = reduce_all(person, conditions)?;
            if results.contains(&Some(false)) {
                Some(false)
            } else if results.contains(&None) {
                None
            } else {
                Some(true)
            }
        }
        Condition::Any(conditions) => {
            let results = reduce_all(person, conditions)?;
            if results.contains(&Some(true)) {
                Some(true)
            } else if results.contains(&None) {
                None
            } else {
                Some(false)
            }
        }
        Condition::Not(condition) => return reduce(person, condition).map(|r| r.map(|b| !b)),
    };
    Some(result)
}

fn reduce_all(person: &Person, conditions: &[Condition<PersonKey>]) -> Option<Vec<Option<bool>>> {
    let results: Vec<Option<bool>> = conditions
        .iter()
        .filter_map(|condition| reduce(person, condition))
        .collect();
    if results.is_empty() {
        None
    } else {
        Some(results)
    }
}

/// Returns the ids of `people` that `condition` selects, in input order.
pub fn selected_ids(people: &[Person], condition: &Condition<PersonKey>) -> Vec<String> {
    people
        .iter()
        .filter(|person| evaluate(person, condition) == Some(true))
        .map(|person| person.id.clone())
        .collect()
}

/// Returns the window `offset..offset + limit` of `items`; a zero limit is
/// unbounded.
pub fn paginate<T: Clone>(items: &[T], offset: usize, limit: usize) -> Vec<T> {
    let start = offset.min(items.len());
    let end = if limit == 0 {
        items.len()
    } else {
        start.saturating_add(limit).min(items.len())
    };
    items[start..end].to_vec()
}

fn field(person: &Person, key: PersonKey) -> Value {
    match key {
        PersonKey::Id => person.id.to_value(),
        PersonKey::FirstName => person.first_name.to_value(),
        PersonKey::LastName => person.last_name.to_value(),
        PersonKey::Height => person.height.to_value(),
        PersonKey::DateOfBirth => person.date_of_birth.to_value(),
        PersonKey::HomePage => person.home_page.to_value(),
        PersonKey::AdditionalData => person.additional_data.to_value(),
    }
}

fn compare(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    match (lhs, rhs) {
        (Value::Null, _) | (_, Value::Null) => None,
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        (Value::Text(a), Value::Text(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
        (Value::Blob(a), Value::Blob(b)) => Some(a.cmp(b)),
        (a, b) => match (numeric(a), numeric(b)) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => Some(class(a).cmp(&class(b))),
        },
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(v) => Some(*v as f64),
        Value::Real(v) => Some(*v),
        _ => None,
    }
}

// Storage-class order used when comparing values of different classes.
fn class(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Integer(_) | Value::Real(_) => 1,
        Value::Text(_) => 2,
        Value::Blob(_) => 3,
    }
}

/// ASCII case-insensitive LIKE with `%` and `_` wildcards.
fn like(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().map(|c| c.to_ascii_lowercase()).collect();
    let text: Vec<char> = text.chars().map(|c| c.to_ascii_lowercase()).collect();
    like_at(&pattern, &text)
}

fn like_at(pattern: &[char], text: &[char]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some(('%', rest)) => (0..=text.len()).any(|skip| like_at(rest, &text[skip..])),
        Some(('_', rest)) => !text.is_empty() && like_at(rest, &text[1..]),
        Some((c, rest)) => text.first() == Some(c) && like_at(rest, &text[1..]),
    }
}
