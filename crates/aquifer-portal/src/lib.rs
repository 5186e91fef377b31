#![forbid(unsafe_code)]

//! Composition root and collaborator interfaces for the Aquifer billing
//! portal.
//!
//! This crate provides:
//! - [`PortalState`], the one-store-per-entity-kind composition root
//! - [`hydrate`] and the optimistic CRUD services ([`create_customer`],
//!   [`amend_customer`], [`delete_customer`], and the bulk-meter
//!   equivalents) keeping cache and hosted database in step
//! - [`RemoteTable`], the hosted database seam, with [`MemoryTable`] for
//!   tests and local development
//! - [`Authenticator`], the identity provider seam, with role-based
//!   page-area permissions
//! - [`DocsAssistant`] and [`MeterVision`], the AI assist seams, with
//!   [`apply_meter_reading`] as the vision flow's write path
//! - [`PortalConfig`] for `AQUIFER_*` environment configuration
//!
//! With the `json-logs` feature, [`logging::init`] installs a JSON
//! subscriber for hosted deployments.

/// AI-assisted helper flows and their seams.
pub mod assist;
/// Deployment configuration from `AQUIFER_*` variables.
pub mod config;
/// JSON log output (feature `json-logs`).
#[cfg(feature = "json-logs")]
pub mod logging;
/// Row-level CRUD interface to the hosted database.
pub mod rows;
/// Sign-in sessions and page-area permissions.
pub mod session;
/// Composition root, hydration, and the optimistic CRUD services.
pub mod state;

pub use assist::{
    AssistError, CannedDocsAssistant, CannedMeterVision, DocsAssistant, MeterReading, MeterVision,
    apply_meter_reading,
};
pub use config::{ConfigError, PortalConfig};
pub use rows::{MemoryTable, RemoteTable, RowError};
pub use session::{AuthError, Authenticator, Role, Session, StaticAuthenticator};
pub use state::{
    PortalState, amend_bulk_meter, amend_customer, create_bulk_meter, create_customer,
    delete_bulk_meter, delete_customer, hydrate,
};
