#![forbid(unsafe_code)]

//! Bulk supply points.
//!
//! A [`BulkMeter`] measures everything flowing into a zone (an estate or a
//! cluster of kiosks) ahead of the individual connections behind it.
//! Utilities reconcile the bulk figure against the sum of the individual
//! meters to find leaks and illegal taps.

use aquifer_store::{EntityId, Identifiable};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Operational status of a bulk meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeterStatus {
    /// Registering flow normally.
    Operational,
    /// Pulled for service; readings pause until it returns.
    UnderMaintenance,
    /// Retired from the network; kept for the audit trail.
    Decommissioned,
}

impl MeterStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Operational => "operational",
            Self::UnderMaintenance => "under_maintenance",
            Self::Decommissioned => "decommissioned",
        }
    }
}

/// One bulk supply point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkMeter {
    pub id: EntityId,
    /// Human label shown in the portal ("Kanyama Estate inlet").
    pub label: String,
    /// Serial stamped on the physical meter.
    pub meter_number: String,
    /// Distribution zone the meter feeds.
    pub zone: String,
    /// Nominal pipe diameter in millimetres.
    pub size_mm: u16,
    pub status: MeterStatus,
    /// Reading at the close of the previous billing cycle, in m³.
    pub previous_reading: u32,
    /// Latest reading, in m³.
    pub current_reading: u32,
    /// Individual accounts supplied behind this meter.
    pub connected_accounts: u32,
    pub commissioned_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Id-less form payload for registering a [`BulkMeter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBulkMeter {
    pub label: String,
    pub meter_number: String,
    pub zone: String,
    pub size_mm: u16,
    pub connected_accounts: u32,
    pub commissioned_on: NaiveDate,
    /// Reading on the register at commissioning, in m³.
    pub install_reading: u32,
}

impl BulkMeter {
    /// Build a full record from a freshly allocated id and the form payload.
    /// New meters start operational with a collapsed reading window.
    #[must_use]
    pub fn create(id: EntityId, form: NewBulkMeter) -> Self {
        Self {
            id,
            label: form.label,
            meter_number: form.meter_number,
            zone: form.zone,
            size_mm: form.size_mm,
            status: MeterStatus::Operational,
            previous_reading: form.install_reading,
            current_reading: form.install_reading,
            connected_accounts: form.connected_accounts,
            commissioned_on: form.commissioned_on,
            created_at: Utc::now(),
        }
    }

    /// Bulk flow this cycle, in m³. Saturates at zero across a register
    /// swap.
    #[must_use]
    pub fn consumption(&self) -> u32 {
        self.current_reading.saturating_sub(self.previous_reading)
    }

    /// Advance the reading window: the current reading becomes the previous
    /// one and `reading` takes its place.
    pub fn record_reading(&mut self, reading: u32) {
        self.previous_reading = self.current_reading;
        self.current_reading = reading;
    }

    /// Mean draw per connected account this cycle, in m³. `None` when no
    /// accounts hang off the meter.
    #[must_use]
    pub fn mean_draw_per_account(&self) -> Option<f64> {
        if self.connected_accounts == 0 {
            return None;
        }
        Some(f64::from(self.consumption()) / f64::from(self.connected_accounts))
    }
}

impl Identifiable for BulkMeter {
    fn id(&self) -> &EntityId {
        &self.id
    }
}
