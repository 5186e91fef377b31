#![forbid(unsafe_code)]

//! Entity types for the Aquifer billing portal.
//!
//! This crate provides:
//! - [`Customer`] and [`NewCustomer`] for individual metered accounts
//! - [`BulkMeter`] and [`NewBulkMeter`] for bulk supply points
//!
//! Every entity derives the serde codecs its remote table row uses and
//! implements [`aquifer_store::Identifiable`], so either kind drops straight
//! into an `EntityStore`.

/// Bulk supply points.
pub mod bulk_meter;
/// Individual customer accounts.
pub mod customer;

pub use bulk_meter::{BulkMeter, MeterStatus, NewBulkMeter};
pub use customer::{Customer, CustomerStatus, NewCustomer, TariffClass};
