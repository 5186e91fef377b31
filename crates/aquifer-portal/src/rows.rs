#![forbid(unsafe_code)]

//! Row-level CRUD interface to the hosted database.
//!
//! The portal keeps its working set in [`EntityStore`]s and treats the
//! hosted database as the source of truth behind them. [`RemoteTable`] is
//! the seam: one implementation per entity table, owned by whatever driver
//! actually talks to the host. The stores never call through this trait;
//! only the hydration and optimistic services in [`crate::state`] do.
//!
//! [`MemoryTable`] is the in-process implementation used by tests and local
//! development. It is strict where a real table would be lenient: updating
//! or deleting a row that is not there reports a query error, because in
//! this portal the services keep cache and table in step and a miss means
//! they have drifted.
//!
//! [`EntityStore`]: aquifer_store::EntityStore

use std::cell::{Cell, RefCell};

use aquifer_store::{EntityId, Identifiable};

/// Errors from remote row operations.
#[derive(Debug, Clone)]
pub enum RowError {
    /// The host could not be reached at all.
    Connection(String),
    /// The host rejected the statement.
    Query { table: &'static str, message: String },
    /// A returned row did not match the expected shape.
    Decode(String),
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connection(msg) => write!(f, "connection failed: {msg}"),
            Self::Query { table, message } => {
                write!(f, "query against '{table}' failed: {message}")
            }
            Self::Decode(msg) => write!(f, "row decode failed: {msg}"),
        }
    }
}

impl std::error::Error for RowError {}

/// CRUD over one remote entity table.
///
/// Implementations are synchronous from the portal's point of view; a
/// driver wrapping an async client blocks internally.
pub trait RemoteTable<T> {
    /// Fetch every row in the table.
    fn select_all(&self) -> Result<Vec<T>, RowError>;

    /// Insert one row.
    fn insert(&self, row: &T) -> Result<(), RowError>;

    /// Replace the row with the matching id. A missing target is a
    /// [`RowError::Query`]: the portal only updates rows it put there.
    fn update(&self, row: &T) -> Result<(), RowError>;

    /// Delete the row with the matching id. A missing target is a
    /// [`RowError::Query`], as for [`update`](Self::update).
    fn delete(&self, id: &EntityId) -> Result<(), RowError>;
}

/// In-process [`RemoteTable`] for tests and local development.
///
/// Holds rows in insertion order and supports a one-shot failure switch:
/// after [`poison_next`](Self::poison_next), the next operation of any kind
/// fails with [`RowError::Connection`] and the switch clears.
pub struct MemoryTable<T> {
    table: &'static str,
    rows: RefCell<Vec<T>>,
    poisoned: Cell<bool>,
}

impl<T: Identifiable> MemoryTable<T> {
    /// An empty table named `table` (the name appears in query errors).
    #[must_use]
    pub fn new(table: &'static str) -> Self {
        Self::with_rows(table, Vec::new())
    }

    /// A table pre-populated with `rows`.
    #[must_use]
    pub fn with_rows(table: &'static str, rows: Vec<T>) -> Self {
        Self {
            table,
            rows: RefCell::new(rows),
            poisoned: Cell::new(false),
        }
    }

    /// Make the next operation fail with a connection error.
    pub fn poison_next(&self) {
        self.poisoned.set(true);
    }

    /// Copy of the current row set, in table order.
    #[must_use]
    pub fn rows(&self) -> Vec<T> {
        self.rows.borrow().clone()
    }

    /// Number of rows currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.borrow().len()
    }

    /// Whether the table holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.borrow().is_empty()
    }

    fn check_poison(&self) -> Result<(), RowError> {
        if self.poisoned.replace(false) {
            return Err(RowError::Connection("simulated outage".to_owned()));
        }
        Ok(())
    }
}

impl<T: Identifiable> RemoteTable<T> for MemoryTable<T> {
    fn select_all(&self) -> Result<Vec<T>, RowError> {
        self.check_poison()?;
        Ok(self.rows.borrow().clone())
    }

    fn insert(&self, row: &T) -> Result<(), RowError> {
        self.check_poison()?;
        let mut rows = self.rows.borrow_mut();
        if rows.iter().any(|r| r.id() == row.id()) {
            return Err(RowError::Query {
                table: self.table,
                message: format!("duplicate id {}", row.id()),
            });
        }
        rows.push(row.clone());
        Ok(())
    }

    fn update(&self, row: &T) -> Result<(), RowError> {
        self.check_poison()?;
        let mut rows = self.rows.borrow_mut();
        match rows.iter().position(|r| r.id() == row.id()) {
            Some(slot) => {
                rows[slot] = row.clone();
                Ok(())
            }
            None => Err(RowError::Query {
                table: self.table,
                message: format!("no row with id {}", row.id()),
            }),
        }
    }

    fn delete(&self, id: &EntityId) -> Result<(), RowError> {
        self.check_poison()?;
        let mut rows = self.rows.borrow_mut();
        match rows.iter().position(|r| r.id() == id) {
            Some(slot) => {
                rows.remove(slot);
                Ok(())
            }
            None => Err(RowError::Query {
                table: self.table,
                message: format!("no row with id {id}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: EntityId,
        value: u32,
    }

    impl Identifiable for Row {
        fn id(&self) -> &EntityId {
            &self.id
        }
    }

    fn row(id: &str, value: u32) -> Row {
        Row {
            id: EntityId::from(id),
            value,
        }
    }

    #[test]
    fn insert_appends_in_table_order() {
        let table = MemoryTable::new("rows");
        table.insert(&row("a", 1)).unwrap();
        table.insert(&row("b", 2)).unwrap();
        assert_eq!(table.select_all().unwrap(), vec![row("a", 1), row("b", 2)]);
    }

    #[test]
    fn insert_rejects_duplicate_ids() {
        let table = MemoryTable::new("rows");
        table.insert(&row("a", 1)).unwrap();
        let err = table.insert(&row("a", 9)).unwrap_err();
        assert!(matches!(err, RowError::Query { table: "rows", .. }));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn update_replaces_the_matching_row() {
        let table = MemoryTable::with_rows("rows", vec![row("a", 1), row("b", 2)]);
        table.update(&row("a", 7)).unwrap();
        assert_eq!(table.rows(), vec![row("a", 7), row("b", 2)]);
    }

    #[test]
    fn update_of_a_missing_row_is_a_query_error() {
        let table = MemoryTable::with_rows("rows", vec![row("a", 1)]);
        let err = table.update(&row("zz", 7)).unwrap_err();
        assert!(err.to_string().contains("no row with id zz"));
    }

    #[test]
    fn delete_removes_the_matching_row() {
        let table = MemoryTable::with_rows("rows", vec![row("a", 1), row("b", 2)]);
        table.delete(&EntityId::from("a")).unwrap();
        assert_eq!(table.rows(), vec![row("b", 2)]);
    }

    #[test]
    fn delete_of_a_missing_row_is_a_query_error() {
        let table = MemoryTable::<Row>::new("rows");
        assert!(table.delete(&EntityId::from("zz")).is_err());
    }

    #[test]
    fn poison_fails_exactly_one_operation() {
        let table = MemoryTable::with_rows("rows", vec![row("a", 1)]);
        table.poison_next();
        assert!(matches!(
            table.select_all().unwrap_err(),
            RowError::Connection(_)
        ));
        // Switch cleared; the table is healthy again.
        assert_eq!(table.select_all().unwrap().len(), 1);
    }

    #[test]
    fn errors_render_their_context() {
        let connection = RowError::Connection("dns".to_owned());
        assert_eq!(connection.to_string(), "connection failed: dns");
        let query = RowError::Query {
            table: "customers",
            message: "timeout".to_owned(),
        };
        assert_eq!(query.to_string(), "query against 'customers' failed: timeout");
        let decode = RowError::Decode("bad date".to_owned());
        assert_eq!(decode.to_string(), "row decode failed: bad date");
    }
}
