//! Test fixtures and store helpers.
//!
//! Provides convenience functions for setting up test stores
//! and common test scenarios.

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tessera_core::{Config, Location, Store};

/// A test store with automatic cleanup.
pub struct TestStore {
    /// The store instance.
    pub store: Store,
    path: Option<PathBuf>,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestStore {
    /// Creates a new in-memory test store.
    pub fn memory() -> Self {
        Self {
            store: Store::in_memory(),
            path: None,
            _temp_dir: None,
        }
    }

    /// Creates a new file-backed test store in a temporary directory.
    ///
    /// The file itself is created by the first operation.
    pub fn file() -> Self {
        Self::file_with_config(Config::default())
    }

    /// Creates a file-backed test store with custom configuration.
    pub fn file_with_config(config: Config) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("store.db");
        Self {
            store: Store::open(Location::Path(path.clone()), config),
            path: Some(path),
            _temp_dir: Some(temp_dir),
        }
    }

    /// Returns the database path if file-backed, None if in-memory.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl std::ops::Deref for TestStore {
    type Target = Store;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// Runs a test with a temporary in-memory store.
///
/// # Example
///
/// ```rust
/// use tessera_testkit::with_temp_store;
///
/// with_temp_store(|store| {
///     assert!(store.location().is_memory());
/// });
/// ```
pub fn with_temp_store<F, R>(f: F) -> R
where
    F: FnOnce(&Store) -> R,
{
    let test_store = TestStore::memory();
    f(&test_store.store)
}

/// Runs a test with a temporary file-backed store.
pub fn with_file_store<F, R>(f: F) -> R
where
    F: FnOnce(&Store, &Path) -> R,
{
    let test_store = TestStore::file();
    let path = test_store
        .path()
        .expect("File store should have a path")
        .to_path_buf();
    f(&test_store.store, &path)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;
    use crate::entities::Person;
    use rand::distributions::Alphanumeric;
    use rand::Rng;

    /// Creates a store holding `random` people with random names plus 100
    /// each of Jack White, Jack Black, Jack Gray and Peter Parker, and one
    /// Brandon Smith.
    pub fn populated_people(random: usize) -> TestStore {
        let test_store = TestStore::memory();
        let mut rng = rand::thread_rng();

        let mut people: Vec<Person> = (0..random)
            .map(|_| {
                let first: String = (&mut rng)
                    .sample_iter(&Alphanumeric)
                    .take(12)
                    .map(char::from)
                    .collect();
                let last: String = (&mut rng)
                    .sample_iter(&Alphanumeric)
                    .take(12)
                    .map(char::from)
                    .collect();
                Person::new(&first, Some(&last)).with_height(rng.gen_range(150.0..200.0))
            })
            .collect();
        for _ in 0..100 {
            people.push(Person::new("Jack", Some("White")));
            people.push(Person::new("Jack", Some("Black")));
            people.push(Person::new("Jack", Some("Gray")));
            people.push(Person::new("Peter", Some("Parker")));
        }
        people.push(Person::new("Brandon", Some("Smith")));

        test_store
            .save_all(&people)
            .expect("Failed to save people");
        test_store
    }

    /// Creates a store with 10 each of Jack White, Jack Black, Peter Parker
    /// (190 cm) and Rihanna without a last name, plus Bree Whale (180 cm).
    pub fn mixed_people() -> TestStore {
        let test_store = TestStore::memory();
        let mut people = Vec::new();
        for _ in 0..10 {
            people.push(Person::new("Jack", Some("White")));
            people.push(Person::new("Jack", Some("Black")));
            people.push(Person::new("Peter", Some("Parker")).with_height(190.0));
            people.push(Person::new("Rihanna", None));
        }
        people.push(Person::new("Bree", Some("Whale")).with_height(180.0));

        test_store
            .save_all(&people)
            .expect("Failed to save people");
        test_store
    }
}
