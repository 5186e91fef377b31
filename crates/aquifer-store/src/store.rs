#![forbid(unsafe_code)]

//! Reactive entity collections with one-shot seeding and change notification.
//!
//! # Design
//!
//! [`EntityStore<T>`] holds the in-memory working set for one entity kind in
//! shared, reference-counted storage (`Rc<RefCell<..>>`). After every applied
//! mutation the collection is cloned once and the snapshot fanned out to all
//! live subscribers in registration order. A snapshot is always a detached
//! copy: later store mutations never show through it, and nothing a
//! subscriber does with its copy can reach the store.
//!
//! The remote database stays the source of truth; a store is the
//! process-local cache in front of it. Seeding from the remote row set
//! happens at most once per store ([`seed`](EntityStore::seed) is a one-shot
//! gate), after which UI-driven mutations keep the working set current.
//! Keeping cache and database in step is the caller's job; the store never
//! talks to the database.
//!
//! # Ordering
//!
//! The collection is kept most-recent-first: [`add`](EntityStore::add)
//! prepends, [`update`](EntityStore::update) replaces in place,
//! [`remove`](EntityStore::remove) closes the gap without reordering the
//! rest.
//!
//! # Concurrency
//!
//! Single-threaded by construction: the `Rc<RefCell<..>>` interior makes the
//! store neither `Send` nor `Sync`, so the compiler enforces the
//! single-writer model. Every operation runs to completion before the next
//! is accepted and notification is synchronous, so a slow subscriber stalls
//! the remaining fan-out. A multi-threaded adaptation would need one lock
//! per store held across the whole mutate-plus-notify sequence; this crate
//! deliberately does not provide one.
//!
//! # Failure Modes
//!
//! - **Re-entrant mutation**: mutating the store from inside a subscriber
//!   callback is unsupported. It nests the fan-out and interleaves delivery
//!   order, which indicates a design bug in the subscriber graph.
//! - **Subscriber leak**: [`Subscription`] guards stored indefinitely keep
//!   their callbacks alive. Dead weak references are pruned lazily during
//!   notification.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::id::{EntityId, IdAllocator, IdStrategy};

/// The one bound the store places on a record: a stable unique identifier,
/// plus `Clone` so the store can hand out snapshot copies.
pub trait Identifiable: Clone {
    /// The record's stable identifier.
    fn id(&self) -> &EntityId;
}

/// A subscriber callback stored as a strong `Rc` inside the guard, handed to
/// the registry as `Weak`.
type ListenerRc<T> = Rc<dyn Fn(&[T])>;
type ListenerWeak<T> = Weak<dyn Fn(&[T])>;

/// Shared interior for [`EntityStore<T>`].
struct StoreInner<T> {
    /// Most-recent-first working set.
    records: Vec<T>,
    /// One-shot gate: set the first time `seed` applies.
    seeded: bool,
    /// Counts applied mutations. Useful for dirty-checking.
    revision: u64,
    /// Subscribers as weak references. Dead entries are pruned on notify.
    listeners: Vec<ListenerWeak<T>>,
    ids: IdAllocator,
}

impl<T: Identifiable> StoreInner<T> {
    fn next_free_id(&mut self) -> EntityId {
        let records = &self.records;
        self.ids
            .next_free(|candidate| records.iter().any(|r| r.id() == candidate))
    }
}

/// A reactive collection of records of one entity kind.
///
/// Cloning an `EntityStore` creates a new handle to the **same** collection:
/// both handles see the same records and share subscribers. Construct one
/// store per entity kind at the application's composition root and pass
/// handles to consumers.
///
/// # Invariants
///
/// 1. No two records share an id at any point in time.
/// 2. `seed` applies at most once; later calls leave records, revision, and
///    subscribers untouched.
/// 3. Each applied mutation delivers exactly one snapshot to each live
///    subscriber, in registration order; calls that change nothing deliver
///    none.
/// 4. Snapshots and `all()` results are detached copies.
pub struct EntityStore<T> {
    /// Short collection label carried into log events (`"customers"`, ...).
    name: &'static str,
    inner: Rc<RefCell<StoreInner<T>>>,
}

// Manual Clone: shares the same inner state.
impl<T> Clone for EntityStore<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for EntityStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("EntityStore")
            .field("name", &self.name)
            .field("records", &inner.records.len())
            .field("seeded", &inner.seeded)
            .field("revision", &inner.revision)
            .field("subscriber_count", &inner.listeners.len())
            .finish()
    }
}

impl<T: Identifiable + 'static> EntityStore<T> {
    /// Create an empty, unseeded store that mints UUID record ids.
    ///
    /// `name` labels the collection in log events.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self::with_id_strategy(name, IdStrategy::Uuid)
    }

    /// Create an empty, unseeded store with an explicit id strategy.
    #[must_use]
    pub fn with_id_strategy(name: &'static str, strategy: IdStrategy) -> Self {
        Self {
            name,
            inner: Rc::new(RefCell::new(StoreInner {
                records: Vec::new(),
                seeded: false,
                revision: 0,
                listeners: Vec::new(),
                ids: IdAllocator::new(strategy),
            })),
        }
    }

    /// The collection label this store logs under.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    // ========================================================================
    // Seeding
    // ========================================================================

    /// Replace the collection with `rows`, once.
    ///
    /// The first call swaps in `rows`, fires the one-shot gate, and notifies
    /// subscribers; it returns `true`. Every later call is a no-op returning
    /// `false`: records, revision, and subscribers stay exactly as they
    /// were, so it is always safe to call from multiple call sites.
    ///
    /// Note the gate, not emptiness, decides: a first `seed` replaces any
    /// records added beforehand.
    pub fn seed(&self, rows: Vec<T>) -> bool {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.seeded {
                debug!(store = self.name, "seed skipped; collection already seeded");
                return false;
            }
            inner.records = rows;
            inner.seeded = true;
            inner.revision += 1;
            debug!(
                store = self.name,
                rows = inner.records.len(),
                "collection seeded"
            );
        }
        self.notify();
        true
    }

    /// Whether the one-shot seed gate has fired.
    #[must_use]
    pub fn is_seeded(&self) -> bool {
        self.inner.borrow().seeded
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Create a record, prepend it, and return it.
    ///
    /// The store allocates a fresh id, guaranteed distinct from every id
    /// currently in the collection, and hands it to `build`, which
    /// constructs the record around it. The built record lands at the front
    /// of the collection (most recent first) and subscribers are notified.
    ///
    /// `build` should be a plain constructor; calling back into the same
    /// store from inside it is unsupported.
    ///
    /// # Panics
    ///
    /// Panics if `build` returns a record carrying an id other than the one
    /// it was given. The allocator is the only id source for new records;
    /// that is what keeps ids unique by construction.
    pub fn add(&self, build: impl FnOnce(EntityId) -> T) -> T {
        let id = self.inner.borrow_mut().next_free_id();
        let record = build(id.clone());
        assert_eq!(
            record.id(),
            &id,
            "store '{}': add builder must keep the id it was given",
            self.name
        );
        {
            let mut inner = self.inner.borrow_mut();
            inner.records.insert(0, record.clone());
            inner.revision += 1;
        }
        debug!(store = self.name, id = %id, "record added");
        self.notify();
        record
    }

    /// Replace the record whose id matches `record.id()`, in place.
    ///
    /// Returns `true` and notifies subscribers when a record was replaced;
    /// the replacement keeps the original's position. A missing target is a
    /// silent no-op signalled by `false`: the collection is untouched and
    /// nothing is delivered.
    pub fn update(&self, record: T) -> bool {
        let replaced = {
            let mut inner = self.inner.borrow_mut();
            match inner.records.iter().position(|r| r.id() == record.id()) {
                Some(slot) => {
                    debug!(store = self.name, id = %record.id(), "record updated");
                    inner.records[slot] = record;
                    inner.revision += 1;
                    true
                }
                None => {
                    debug!(
                        store = self.name,
                        id = %record.id(),
                        "update target not found; collection unchanged"
                    );
                    false
                }
            }
        };
        if replaced {
            self.notify();
        }
        replaced
    }

    /// Remove the record with the matching id, preserving the order of the
    /// rest.
    ///
    /// Returns `true` and notifies subscribers when a record was removed; a
    /// missing target is a silent no-op signalled by `false`, with nothing
    /// delivered.
    pub fn remove(&self, id: &EntityId) -> bool {
        let removed = {
            let mut inner = self.inner.borrow_mut();
            match inner.records.iter().position(|r| r.id() == id) {
                Some(slot) => {
                    inner.records.remove(slot);
                    inner.revision += 1;
                    debug!(store = self.name, id = %id, "record removed");
                    true
                }
                None => {
                    debug!(
                        store = self.name,
                        id = %id,
                        "remove target not found; collection unchanged"
                    );
                    false
                }
            }
        };
        if removed {
            self.notify();
        }
        removed
    }

    /// Put a previously removed record back at `index`, clamped to the
    /// collection length. The undo half of [`remove`](Self::remove),
    /// intended for optimistic write-through flows that must restore the
    /// cache when the remote write fails.
    ///
    /// Refuses with `false` (nothing changed, nothing delivered) when a
    /// record with the same id is already present, so id uniqueness holds
    /// even for hand-built records.
    pub fn reinstate(&self, record: T, index: usize) -> bool {
        let restored = {
            let mut inner = self.inner.borrow_mut();
            if inner.records.iter().any(|r| r.id() == record.id()) {
                debug!(
                    store = self.name,
                    id = %record.id(),
                    "reinstate refused; id already present"
                );
                false
            } else {
                let slot = index.min(inner.records.len());
                debug!(store = self.name, id = %record.id(), slot, "record reinstated");
                inner.records.insert(slot, record);
                inner.revision += 1;
                true
            }
        };
        if restored {
            self.notify();
        }
        restored
    }

    // ========================================================================
    // Reading
    // ========================================================================

    /// A detached copy of the whole collection, most recent first.
    ///
    /// Never a live reference: mutating the returned vector cannot affect
    /// the store, and later store mutations cannot affect the vector.
    #[must_use]
    pub fn all(&self) -> Vec<T> {
        self.inner.borrow().records.clone()
    }

    /// A copy of the record with the given id, if present.
    #[must_use]
    pub fn get(&self, id: &EntityId) -> Option<T> {
        self.inner
            .borrow()
            .records
            .iter()
            .find(|r| r.id() == id)
            .cloned()
    }

    /// Run `f` against the live collection without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.inner.borrow().records)
    }

    /// Number of records currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().records.len()
    }

    /// Whether the collection is currently empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().records.is_empty()
    }

    /// Applied-mutation counter. Increments by exactly 1 for each seed, add,
    /// replacing update, or removing remove; no-op calls leave it alone.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.inner.borrow().revision
    }

    /// Number of registered subscribers, counting dead entries not yet
    /// pruned (pruning happens lazily during notification).
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    // ========================================================================
    // Subscription
    // ========================================================================

    /// Register a subscriber and replay the current snapshot to it at once.
    ///
    /// The listener is invoked immediately with the collection as it stands
    /// (an empty slice on a fresh store), then again after every applied
    /// mutation, in registration order relative to other subscribers.
    ///
    /// Returns a [`Subscription`] guard; dropping it (or calling
    /// [`Subscription::cancel`]) deregisters the listener.
    pub fn subscribe(&self, listener: impl Fn(&[T]) + 'static) -> Subscription {
        let strong: ListenerRc<T> = Rc::new(listener);
        self.inner.borrow_mut().listeners.push(Rc::downgrade(&strong));
        debug!(store = self.name, "subscriber registered");
        // Replay so a new subscriber never waits for the next mutation to
        // learn the current state.
        let snapshot = self.inner.borrow().records.clone();
        strong(&snapshot);
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Notify live subscribers and prune dead ones.
    fn notify(&self) {
        // Collect live callbacks first so no borrow is held during calls.
        let listeners: Vec<ListenerRc<T>> = {
            let mut inner = self.inner.borrow_mut();
            inner.listeners.retain(|w| w.strong_count() > 0);
            inner.listeners.iter().filter_map(|w| w.upgrade()).collect()
        };
        let snapshot: Vec<T> = self.inner.borrow().records.clone();
        for listener in &listeners {
            listener(&snapshot);
        }
    }
}

/// RAII guard for a registered subscriber.
///
/// Dropping the guard drops the strong reference to the callback; the weak
/// entry in the store's registry then fails to upgrade and the listener is
/// never invoked again (the entry itself is pruned on the next
/// notification). [`cancel`](Subscription::cancel) is the explicit form;
/// since it consumes the guard, deregistering twice is impossible by
/// construction.
pub struct Subscription {
    /// Type-erased strong reference keeping the callback `Rc` alive.
    _guard: Box<dyn std::any::Any>,
}

impl Subscription {
    /// Deregister the listener now instead of at the end of scope.
    pub fn cancel(self) {
        drop(self);
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
