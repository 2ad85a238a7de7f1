//! Benchmark utilities.

use rand::seq::SliceRandom;
use rand::Rng;
use tessera_core::Condition;
use tessera_testkit::{Owner, Person, PersonKey, FIRST_NAMES, LAST_NAMES};

/// Generate random blob data of the specified size.
pub fn random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

/// Generate people with names drawn from the testkit name lists.
pub fn generate_people(count: usize) -> Vec<Person> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| {
            let first = FIRST_NAMES.choose(&mut rng).copied().unwrap_or("John");
            let last = LAST_NAMES.choose(&mut rng).copied();
            let mut person = Person::new(first, last).with_height(rng.gen_range(150.0..200.0));
            person.additional_data = Some(random_data(64));
            person
        })
        .collect()
}

/// Generate owners with `dogs` dogs each.
pub fn generate_owners(count: usize, dogs: usize) -> Vec<Owner> {
    (0..count)
        .map(|i| {
            let mut owner = Owner::new(&format!("owner-{i}"));
            for d in 0..dogs {
                owner.adopt(&format!("dog-{d}"));
            }
            owner
        })
        .collect()
}

/// A nested condition of roughly `depth` levels.
pub fn nested_condition(depth: usize) -> Condition<PersonKey> {
    let mut condition = Condition::equal(PersonKey::FirstName, "Jack");
    for level in 0..depth {
        let leaf = Condition::greater_than(PersonKey::Height, 150.0 + level as f64);
        condition = if level % 2 == 0 {
            !Condition::all([condition, leaf, Condition::like(PersonKey::LastName, "Wh%")])
        } else {
            Condition::any([condition, !leaf, Condition::is_null(PersonKey::LastName)])
        };
    }
    condition
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_people_have_payload() {
        let people = generate_people(5);
        assert_eq!(people.len(), 5);
        assert!(people.iter().all(|p| p.additional_data.as_ref().map(Vec::len) == Some(64)));
    }

    #[test]
    fn nested_condition_renders() {
        let rendered = nested_condition(4).render().unwrap().unwrap();
        assert!(rendered.starts_with('('));
    }
}
