//! Property-based test generators using proptest.
//!
//! Provides strategies for generating records and conditions whose
//! behaviour can be checked against the in-memory oracles.

use crate::entities::{Person, PersonKey};
use chrono::DateTime;
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;
use tessera_core::Condition;

/// First names used by generated people and conditions.
pub const FIRST_NAMES: [&str; 6] = ["Jack", "Peter", "Brandon", "Bree", "Rihanna", "O'Neil"];

/// Last names used by generated people.
pub const LAST_NAMES: [&str; 5] = ["White", "Black", "Gray", "Parker", "Whale"];

/// Like patterns used by generated conditions.
pub const NAME_PATTERNS: [&str; 5] = ["J%", "%e%", "b%", "_ack", "O'%"];

/// Strategy for generating first names.
pub fn first_name_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(FIRST_NAMES.to_vec()).prop_map(str::to_string)
}

/// Strategy for generating optional last names.
pub fn last_name_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop::sample::select(LAST_NAMES.to_vec()).prop_map(str::to_string))
}

/// Strategy for generating whole-centimetre heights.
pub fn height_strategy() -> impl Strategy<Value = f64> {
    (150i32..200).prop_map(f64::from)
}

/// Strategy for generating people.
///
/// Timestamps are whole seconds so they survive storage unchanged.
pub fn person_strategy() -> impl Strategy<Value = Person> {
    (
        first_name_strategy(),
        last_name_strategy(),
        height_strategy(),
        -2_000_000_000i64..2_000_000_000,
        prop::option::of(prop::collection::vec(any::<u8>(), 0..64)),
    )
        .prop_map(|(first, last, height, seconds, data)| {
            let mut person = Person::new(&first, last.as_deref()).with_height(height);
            person.date_of_birth = DateTime::from_timestamp(seconds, 0).unwrap_or_default();
            person.additional_data = data;
            person
        })
}

/// Strategy for generating a batch of people.
pub fn people_strategy(size: std::ops::Range<usize>) -> impl Strategy<Value = Vec<Person>> {
    prop::collection::vec(person_strategy(), size)
}

/// Strategy for generating conditions over [`Person`].
///
/// Comparisons only touch non-nullable columns and `lastName` is only
/// tested for NULL, so every generated condition is either true or false
/// for each row and its negation selects exactly the remaining rows.
pub fn condition_strategy() -> impl Strategy<Value = Condition<PersonKey>> {
    let leaf = prop_oneof![
        first_name_strategy().prop_map(|name| Condition::equal(PersonKey::FirstName, name)),
        height_strategy().prop_map(|h| Condition::equal(PersonKey::Height, h)),
        height_strategy().prop_map(|h| Condition::greater_than(PersonKey::Height, h)),
        height_strategy().prop_map(|h| Condition::less_than(PersonKey::Height, h)),
        height_strategy().prop_map(|h| Condition::greater_or_equal(PersonKey::Height, h)),
        height_strategy().prop_map(|h| Condition::less_or_equal(PersonKey::Height, h)),
        first_name_strategy().prop_map(|name| Condition::less_than(PersonKey::FirstName, name)),
        prop::sample::select(NAME_PATTERNS.to_vec())
            .prop_map(|pattern| Condition::like(PersonKey::FirstName, pattern)),
        Just(Condition::is_null(PersonKey::LastName)),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Condition::All),
            prop::collection::vec(inner.clone(), 0..4).prop_map(Condition::Any),
            inner.prop_map(|condition| !condition),
        ]
    })
}

/// Proptest configuration with a fixed number of cases.
pub fn test_config(cases: u32) -> ProptestConfig {
    ProptestConfig {
        cases,
        ..ProptestConfig::default()
    }
}
