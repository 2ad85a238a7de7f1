//! Property tests for conditions, pagination and round-trips.

use proptest::prelude::*;
use tessera_core::{Condition, Order, Query, Store};
use tessera_testkit::prelude::*;

fn ids(people: Vec<Person>) -> Vec<String> {
    let mut ids: Vec<String> = people.into_iter().map(|person| person.id).collect();
    ids.sort();
    ids
}

fn stored(people: &[Person]) -> Store {
    let store = Store::in_memory();
    store.save_all(people).unwrap();
    store
}

proptest! {
    #![proptest_config(test_config(64))]

    #[test]
    fn negation_selects_the_complement(
        people in people_strategy(1..40),
        condition in condition_strategy(),
    ) {
        // a condition made only of empty groups selects everything either way
        prop_assume!(condition.render().unwrap().is_some());
        let store = stored(&people);

        let selected = ids(store.fetch(&Query::from(condition.clone())).unwrap());
        let rejected = ids(store.fetch(&Query::from(!condition.clone())).unwrap());

        let mut expected = selected_ids(&people, &condition);
        expected.sort();
        prop_assert_eq!(&selected, &expected);

        let mut union: Vec<String> = selected.iter().chain(rejected.iter()).cloned().collect();
        union.sort();
        let mut everyone: Vec<String> = people.iter().map(|person| person.id.clone()).collect();
        everyone.sort();
        prop_assert_eq!(union, everyone);
        prop_assert!(selected.iter().all(|id| !rejected.contains(id)));
    }

    #[test]
    fn double_negation_is_identity(
        people in people_strategy(1..30),
        condition in condition_strategy(),
    ) {
        let store = stored(&people);
        let plain = ids(store.fetch(&Query::from(condition.clone())).unwrap());
        let doubled = ids(store.fetch(&Query::from(!!condition)).unwrap());
        prop_assert_eq!(plain, doubled);
    }

    #[test]
    fn count_agrees_with_fetch(
        people in people_strategy(0..30),
        condition in condition_strategy(),
    ) {
        let store = stored(&people);
        let query = Query::from(condition);
        prop_assert_eq!(
            store.count::<Person>(&query).unwrap(),
            store.fetch::<Person>(&query).unwrap().len()
        );
    }

    #[test]
    fn pages_match_the_ordered_window(
        people in people_strategy(0..60),
        offset in 0usize..70,
        limit in 0usize..30,
    ) {
        let store = stored(&people);
        let mut ordered: Vec<String> = people.iter().map(|person| person.id.clone()).collect();
        ordered.sort();

        let query = Query::new()
            .order_by(Order::Ascending(vec![PersonKey::Id]))
            .offset(offset)
            .limit(limit);
        let page: Vec<String> = store
            .fetch::<Person>(&query)
            .unwrap()
            .into_iter()
            .map(|person| person.id)
            .collect();

        prop_assert_eq!(page, paginate(&ordered, offset, limit));
    }

    #[test]
    fn consecutive_pages_partition_the_result(
        people in people_strategy(0..50),
        size in 1usize..12,
    ) {
        let store = stored(&people);
        let order = Order::Ascending(vec![PersonKey::Height, PersonKey::Id]);
        let everything: Vec<Person> = store
            .fetch(&Query::new().order_by(order.clone()))
            .unwrap();

        let mut collected = Vec::new();
        let mut offset = 0;
        loop {
            let page: Vec<Person> = store
                .fetch(&Query::new().order_by(order.clone()).offset(offset).limit(size))
                .unwrap();
            prop_assert!(page.len() <= size);
            if page.is_empty() {
                break;
            }
            offset += page.len();
            collected.extend(page);
        }
        prop_assert_eq!(collected, everything);
    }

    #[test]
    fn saved_people_load_unchanged(person in person_strategy()) {
        let store = stored(std::slice::from_ref(&person));
        let query = Query::first(Condition::equal(PersonKey::Id, person.id.as_str()));
        let loaded: Option<Person> = store.fetch_first(&query).unwrap();
        prop_assert_eq!(loaded, Some(person));
    }
}
