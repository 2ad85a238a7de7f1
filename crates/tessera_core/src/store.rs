//! Store handle and exclusive connection access.

use crate::config::Config;
use crate::entity::Entity;
use crate::error::{CoreError, CoreResult};
use crate::persist;
use crate::query::Query;
use parking_lot::FairMutex;
use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tessera_storage::{remove_store_file, Connection, Location};

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static ACTIVE_STORES: RefCell<Vec<u64>> = const { RefCell::new(Vec::new()) };
}

/// The main store handle.
///
/// `Store` owns one physical connection and serializes every operation on
/// it: callers on different threads queue and run one at a time in arrival
/// order. A save runs as one transaction covering schema changes, its rows
/// and all enclosed collections, so no other operation observes it half
/// done.
///
/// The handle is cheap to clone; clones share the same connection.
///
/// # Opening a Store
///
/// ```rust
/// use tessera_core::{Config, Location, Store};
///
/// let store = Store::open(Location::Memory, Config::default());
/// assert!(store.location().is_memory());
/// ```
///
/// The connection is opened on first use, so opening never fails; an
/// unreachable file surfaces as an error from the first operation.
///
/// # Nested Operations
///
/// Issuing an operation on a store from inside one of its own operations
/// (for example from [`Entity::from_row`]) fails with
/// [`CoreError::ReentrantAccess`]. Use the methods on
/// [`Output`](crate::Output) to load related records instead.
///
/// The check is per thread. A callback that hands a call on the same store
/// to another thread and waits for it blocks forever, since the operation
/// in progress keeps the connection until the callback returns.
///
/// A panic inside a callback rolls back the save in progress before the
/// connection is released.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    id: u64,
    location: Location,
    config: Config,
    /// `None` until first use, and again after `close` or `delete_all`.
    slot: FairMutex<Option<Connection>>,
}

impl Store {
    /// Creates a store at `location`.
    #[must_use]
    pub fn open(location: Location, config: Config) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                id: NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed),
                location,
                config,
                slot: FairMutex::new(None),
            }),
        }
    }

    /// Creates a private in-memory store.
    ///
    /// Its data lives until [`Store::delete_all`] or until the last clone of
    /// the handle is dropped.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::open(Location::Memory, Config::default())
    }

    /// Creates a store named `name` in the user's local data directory.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::open(Location::Named(name.into()), Config::default())
    }

    /// Creates a store backed by the file at `path`.
    #[must_use]
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self::open(Location::Path(path.into()), Config::default())
    }

    /// Returns where this store lives.
    #[must_use]
    pub fn location(&self) -> &Location {
        &self.inner.location
    }

    /// Returns the store configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Saves one record; see [`Store::save_all`].
    ///
    /// # Errors
    ///
    /// See [`Store::save_all`].
    pub fn save<E: Entity>(&self, record: &E) -> CoreResult<()> {
        self.save_all(std::slice::from_ref(record))
    }

    /// Saves a record if there is one.
    ///
    /// # Errors
    ///
    /// See [`Store::save_all`].
    pub fn save_optional<E: Entity>(&self, record: Option<&E>) -> CoreResult<()> {
        match record {
            Some(record) => self.save(record),
            None => Ok(()),
        }
    }

    /// Saves `records` and everything they enclose in one transaction.
    ///
    /// The table is created or migrated to match the declared shape first.
    /// Records with a primary key replace the stored row with the same key;
    /// records without one are inserted as new rows. An empty slice does
    /// nothing at all.
    ///
    /// # Errors
    ///
    /// Any failure rolls the whole save back, including schema changes the
    /// engine can undo, and is returned unchanged.
    pub fn save_all<E: Entity>(&self, records: &[E]) -> CoreResult<()> {
        if records.is_empty() {
            return Ok(());
        }
        self.with_connection(|connection| {
            persist::transaction(connection, |connection| {
                persist::save_all(connection, records)
            })
        })?;
        tracing::trace!(entity = E::NAME, count = records.len(), "records saved");
        Ok(())
    }

    /// Loads every record matching `query`.
    ///
    /// Returns an empty list if the entity was never saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be rendered, the statement
    /// fails, or a row cannot be decoded.
    pub fn fetch<E: Entity>(&self, query: &Query<E::Key>) -> CoreResult<Vec<E>> {
        self.with_connection(|connection| persist::fetch(connection, query))
    }

    /// Loads the first record matching `query`, if any.
    ///
    /// # Errors
    ///
    /// See [`Store::fetch`].
    pub fn fetch_first<E: Entity>(&self, query: &Query<E::Key>) -> CoreResult<Option<E>> {
        self.with_connection(|connection| persist::fetch_first(connection, query))
    }

    /// Counts the records matching `query`.
    ///
    /// Returns zero if the entity was never saved.
    ///
    /// # Errors
    ///
    /// See [`Store::fetch`].
    pub fn count<E: Entity>(&self, query: &Query<E::Key>) -> CoreResult<usize> {
        self.with_connection(|connection| persist::count::<E>(connection, query))
    }

    /// Deletes the records matching `query`, returning how many were removed.
    ///
    /// Records related to a deleted one are removed as well.
    ///
    /// # Errors
    ///
    /// See [`Store::fetch`].
    pub fn delete<E: Entity>(&self, query: &Query<E::Key>) -> CoreResult<usize> {
        self.with_connection(|connection| persist::delete::<E>(connection, query))
    }

    /// Removes the whole store.
    ///
    /// The connection is closed, then the database file and its journal
    /// files are deleted; an in-memory store simply loses its data. The
    /// store stays usable and starts empty on the next operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn delete_all(&self) -> CoreResult<()> {
        let _access = Access::enter(self.inner.id)?;
        let mut slot = self.inner.slot.lock();
        if let Some(connection) = slot.take() {
            if let Err(e) = connection.close() {
                tracing::warn!(error = %e, "connection did not close cleanly");
            }
        }
        if let Some(path) = self.inner.location.resolve() {
            remove_store_file(&path)?;
        }
        tracing::info!(location = ?self.inner.location, "store deleted");
        Ok(())
    }

    /// Closes the connection without touching stored data.
    ///
    /// The next operation reopens it. Closing an in-memory store discards
    /// its contents.
    ///
    /// # Errors
    ///
    /// Returns the engine error if the handle did not close cleanly.
    pub fn close(&self) -> CoreResult<()> {
        let _access = Access::enter(self.inner.id)?;
        let connection = self.inner.slot.lock().take();
        match connection {
            Some(connection) => Ok(connection.close()?),
            None => Ok(()),
        }
    }

    /// Runs `work` with exclusive use of the connection, opening it first if
    /// needed.
    fn with_connection<T>(&self, work: impl FnOnce(&Connection) -> CoreResult<T>) -> CoreResult<T> {
        let _access = Access::enter(self.inner.id)?;
        let mut slot = self.inner.slot.lock();
        let connection = match slot.take() {
            Some(connection) => connection,
            None => Connection::open(
                &self.inner.location,
                &self.inner.config.connection_options(),
            )?,
        };
        let connection = slot.insert(connection);
        work(connection)
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("location", &self.inner.location)
            .finish_non_exhaustive()
    }
}

/// Marks a store as in use on the current thread for the guard's lifetime.
struct Access {
    id: u64,
}

impl Access {
    fn enter(id: u64) -> CoreResult<Self> {
        ACTIVE_STORES.with(|active| {
            let mut active = active.borrow_mut();
            if active.contains(&id) {
                return Err(CoreError::ReentrantAccess);
            }
            active.push(id);
            Ok(Self { id })
        })
    }
}

impl Drop for Access {
    fn drop(&mut self) {
        ACTIVE_STORES.with(|active| active.borrow_mut().retain(|id| *id != self.id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Store>();
    }

    #[test]
    fn access_guard_rejects_reentry() {
        let outer = Access::enter(u64::MAX).unwrap();
        assert!(matches!(
            Access::enter(u64::MAX),
            Err(CoreError::ReentrantAccess)
        ));
        drop(outer);
        Access::enter(u64::MAX).unwrap();
    }

    #[test]
    fn distinct_stores_nest() {
        let a = Store::in_memory();
        let b = Store::in_memory();
        let _outer = Access::enter(a.inner.id).unwrap();
        Access::enter(b.inner.id).unwrap();
    }

    #[test]
    fn clones_share_identity() {
        let store = Store::in_memory();
        let clone = store.clone();
        assert_eq!(store.inner.id, clone.inner.id);
        assert!(clone.location().is_memory());
    }

    #[test]
    fn close_before_use_is_ok() {
        let store = Store::in_memory();
        store.close().unwrap();
        store.delete_all().unwrap();
    }

    #[test]
    fn lazy_open_reports_unreachable_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(
            Location::Path(dir.path().join("absent.db")),
            Config::default().create_if_missing(false),
        );
        let err = store.with_connection(|_| Ok(())).unwrap_err();
        assert!(err.native_code().is_some());
    }
}
