#![forbid(unsafe_code)]

//! Composition root, hydration, and the optimistic CRUD services.
//!
//! # Design
//!
//! [`PortalState`] owns exactly one [`EntityStore`] per entity kind;
//! construct it once at startup and hand clones of the store handles to the
//! pages that need them. The hosted database stays the source of truth:
//! [`hydrate`] pulls a table's full row set into its store exactly once,
//! and the service functions ([`create_customer`] and friends) keep cache
//! and table in step from then on.
//!
//! The services are optimistic: the cache mutates first, so the UI reacts
//! immediately, then the row write goes out. A failed write rolls the cache
//! back to its pre-call state (and subscribers see the rollback as a normal
//! notification). Consistency between cache and table is entirely these
//! services' responsibility; the stores never talk to the database.
//!
//! # Failure Modes
//!
//! - A [`hydrate`] fetch failure propagates before any seeding, so the
//!   store's one-shot gate stays unfired and a later retry can still seed.
//! - A write-through failure surfaces as the service's `Err` after the
//!   rollback has already been applied.

use aquifer_domain::{BulkMeter, Customer, NewBulkMeter, NewCustomer};
use aquifer_store::{EntityId, EntityStore, IdStrategy, Identifiable};
use tracing::{debug, warn};

use crate::rows::{RemoteTable, RowError};

/// The portal's live working set: one store per entity kind.
///
/// Cloning is cheap and shares the underlying stores.
#[derive(Debug, Clone)]
pub struct PortalState {
    pub customers: EntityStore<Customer>,
    pub bulk_meters: EntityStore<BulkMeter>,
}

impl PortalState {
    /// Composition root: build the one store per entity kind, minting UUID
    /// record ids.
    #[must_use]
    pub fn new() -> Self {
        Self::with_id_strategy(IdStrategy::Uuid)
    }

    /// Build with an explicit id strategy; tests use
    /// [`IdStrategy::Sequential`] for readable fixtures.
    #[must_use]
    pub fn with_id_strategy(strategy: IdStrategy) -> Self {
        Self {
            customers: EntityStore::with_id_strategy("customers", strategy),
            bulk_meters: EntityStore::with_id_strategy("bulk_meters", strategy),
        }
    }
}

impl Default for PortalState {
    fn default() -> Self {
        Self::new()
    }
}

/// Fetch a table's full row set and seed its store, once.
///
/// Returns `Ok(true)` when this call seeded the store. An already-seeded
/// store skips the fetch entirely and returns `Ok(false)`, so every page
/// can call this on entry without re-querying the host. A fetch failure
/// propagates before any seeding: the one-shot gate stays unfired and a
/// later call can still succeed.
pub fn hydrate<T: Identifiable + 'static>(
    store: &EntityStore<T>,
    table: &impl RemoteTable<T>,
) -> Result<bool, RowError> {
    if store.is_seeded() {
        debug!(store = store.name(), "hydrate skipped; already seeded");
        return Ok(false);
    }
    let rows = table.select_all()?;
    Ok(store.seed(rows))
}

/// Cache-first insert with write-through and rollback.
fn optimistic_insert<T: Identifiable + 'static>(
    store: &EntityStore<T>,
    table: &impl RemoteTable<T>,
    build: impl FnOnce(EntityId) -> T,
) -> Result<T, RowError> {
    let record = store.add(build);
    if let Err(err) = table.insert(&record) {
        warn!(
            store = store.name(),
            id = %record.id(),
            error = %err,
            "insert write-through failed; rolling back"
        );
        store.remove(record.id());
        return Err(err);
    }
    Ok(record)
}

/// Cache-first replace with write-through and rollback. `Ok(false)` when no
/// record carries the target id; the table is not touched.
fn optimistic_replace<T: Identifiable + 'static>(
    store: &EntityStore<T>,
    table: &impl RemoteTable<T>,
    record: T,
) -> Result<bool, RowError> {
    let Some(previous) = store.get(record.id()) else {
        return Ok(false);
    };
    store.update(record.clone());
    if let Err(err) = table.update(&record) {
        warn!(
            store = store.name(),
            id = %record.id(),
            error = %err,
            "update write-through failed; rolling back"
        );
        store.update(previous);
        return Err(err);
    }
    Ok(true)
}

/// Cache-first delete with write-through and rollback. `Ok(false)` when no
/// record carries the target id; the table is not touched. Rollback puts
/// the record back at its old position.
fn optimistic_delete<T: Identifiable + 'static>(
    store: &EntityStore<T>,
    table: &impl RemoteTable<T>,
    id: &EntityId,
) -> Result<bool, RowError> {
    let found = store.with(|records| {
        records
            .iter()
            .position(|r| r.id() == id)
            .map(|slot| (slot, records[slot].clone()))
    });
    let Some((slot, previous)) = found else {
        return Ok(false);
    };
    store.remove(id);
    if let Err(err) = table.delete(id) {
        warn!(
            store = store.name(),
            id = %id,
            error = %err,
            "delete write-through failed; rolling back"
        );
        store.reinstate(previous, slot);
        return Err(err);
    }
    Ok(true)
}

/// Register a customer from the intake form: the store allocates the id,
/// the cache updates immediately, and the row goes out to `table`.
pub fn create_customer(
    state: &PortalState,
    table: &impl RemoteTable<Customer>,
    form: NewCustomer,
) -> Result<Customer, RowError> {
    optimistic_insert(&state.customers, table, |id| Customer::create(id, form))
}

/// Replace a customer record wholesale (the edit form submits the full
/// record). `Ok(false)` when the id is unknown.
pub fn amend_customer(
    state: &PortalState,
    table: &impl RemoteTable<Customer>,
    record: Customer,
) -> Result<bool, RowError> {
    optimistic_replace(&state.customers, table, record)
}

/// Delete a customer account. `Ok(false)` when the id is unknown.
pub fn delete_customer(
    state: &PortalState,
    table: &impl RemoteTable<Customer>,
    id: &EntityId,
) -> Result<bool, RowError> {
    optimistic_delete(&state.customers, table, id)
}

/// Register a bulk meter from the commissioning form.
pub fn create_bulk_meter(
    state: &PortalState,
    table: &impl RemoteTable<BulkMeter>,
    form: NewBulkMeter,
) -> Result<BulkMeter, RowError> {
    optimistic_insert(&state.bulk_meters, table, |id| BulkMeter::create(id, form))
}

/// Replace a bulk-meter record wholesale. `Ok(false)` when the id is
/// unknown.
pub fn amend_bulk_meter(
    state: &PortalState,
    table: &impl RemoteTable<BulkMeter>,
    record: BulkMeter,
) -> Result<bool, RowError> {
    optimistic_replace(&state.bulk_meters, table, record)
}

/// Decommission-and-remove a bulk meter. `Ok(false)` when the id is
/// unknown.
pub fn delete_bulk_meter(
    state: &PortalState,
    table: &impl RemoteTable<BulkMeter>,
    id: &EntityId,
) -> Result<bool, RowError> {
    optimistic_delete(&state.bulk_meters, table, id)
}
