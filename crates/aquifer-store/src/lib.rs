#![forbid(unsafe_code)]

//! Reactive in-process entity collections for the Aquifer billing portal.
//!
//! This crate provides:
//! - [`EntityStore`] for a shared, observable, most-recent-first collection
//!   of records of one entity kind, with one-shot seeding
//! - [`Identifiable`], the single bound a record type needs
//! - [`EntityId`] and [`IdStrategy`] for record identity and allocation
//! - [`Subscription`] for RAII deregistration of change subscribers
//!
//! Stores are single-threaded by construction (`Rc<RefCell<..>>` interior);
//! see the [`store`] module docs for the concurrency and ordering rules.

/// Record identity and collision-free id allocation.
pub mod id;
/// The reactive collection and its subscription machinery.
pub mod store;

pub use id::{EntityId, IdStrategy};
pub use store::{EntityStore, Identifiable, Subscription};
