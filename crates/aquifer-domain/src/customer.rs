#![forbid(unsafe_code)]

//! Individual customer accounts.
//!
//! A [`Customer`] is one metered service connection billed to one account.
//! Rows come out of the remote `customers` table verbatim; the serde names
//! below are the column names.

use aquifer_store::{EntityId, Identifiable};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Service status of a customer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerStatus {
    /// Connected and billed normally.
    Active,
    /// Temporarily cut off, usually for arrears; the account stays open.
    Suspended,
    /// Permanently cut off; kept for the audit trail.
    Disconnected,
}

impl CustomerStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Disconnected => "disconnected",
        }
    }

    /// Whether consumption on this connection is currently billable.
    #[must_use]
    pub const fn is_billable(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Tariff band applied to a connection's consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TariffClass {
    /// Household connections.
    Domestic,
    /// Shops, offices, light industry.
    Commercial,
    /// Schools, clinics, public standpipes.
    Institutional,
}

impl TariffClass {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Domestic => "domestic",
            Self::Commercial => "commercial",
            Self::Institutional => "institutional",
        }
    }

    /// Flat volumetric rate for the band, in cents per cubic metre.
    #[must_use]
    pub const fn rate_cents_per_cubic_metre(self) -> i64 {
        match self {
            Self::Domestic => 150,
            Self::Commercial => 420,
            Self::Institutional => 275,
        }
    }
}

/// One metered customer account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: EntityId,
    pub full_name: String,
    /// Billing account number, as printed on invoices.
    pub account_number: String,
    /// Serial stamped on the physical meter.
    pub meter_number: String,
    pub address: String,
    pub phone: String,
    pub status: CustomerStatus,
    pub tariff: TariffClass,
    /// Meter reading at the close of the previous billing cycle, in m³.
    pub previous_reading: u32,
    /// Latest meter reading, in m³.
    pub current_reading: u32,
    /// Unpaid balance carried forward, in cents.
    pub arrears_cents: i64,
    pub created_at: DateTime<Utc>,
}

/// Id-less form payload for creating a [`Customer`].
///
/// The store allocates the id; everything else comes from the intake form.
/// New accounts start active, with the reading window collapsed onto the
/// meter's install reading and no arrears.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub full_name: String,
    pub account_number: String,
    pub meter_number: String,
    pub address: String,
    pub phone: String,
    pub tariff: TariffClass,
    /// Reading on the meter at installation, in m³.
    pub install_reading: u32,
}

impl Customer {
    /// Build a full record from a freshly allocated id and the form payload.
    #[must_use]
    pub fn create(id: EntityId, form: NewCustomer) -> Self {
        Self {
            id,
            full_name: form.full_name,
            account_number: form.account_number,
            meter_number: form.meter_number,
            address: form.address,
            phone: form.phone,
            status: CustomerStatus::Active,
            tariff: form.tariff,
            previous_reading: form.install_reading,
            current_reading: form.install_reading,
            arrears_cents: 0,
            created_at: Utc::now(),
        }
    }

    /// Water drawn this cycle, in m³. Saturates at zero when the meter was
    /// replaced or rolled back mid-cycle.
    #[must_use]
    pub fn consumption(&self) -> u32 {
        self.current_reading.saturating_sub(self.previous_reading)
    }

    /// Charge for this cycle's consumption at the account's tariff, in cents.
    #[must_use]
    pub fn cycle_charge_cents(&self) -> i64 {
        i64::from(self.consumption()) * self.tariff.rate_cents_per_cubic_metre()
    }

    /// Advance the reading window: the current reading becomes the previous
    /// one and `reading` takes its place.
    pub fn record_reading(&mut self, reading: u32) {
        self.previous_reading = self.current_reading;
        self.current_reading = reading;
    }

    /// Whether the account carries an unpaid balance.
    #[must_use]
    pub fn in_arrears(&self) -> bool {
        self.arrears_cents > 0
    }

    /// Apply a payment against arrears, in cents. Overpayment goes to
    /// credit (negative arrears).
    pub fn settle_cents(&mut self, amount: i64) {
        self.arrears_cents -= amount;
    }
}

impl Identifiable for Customer {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> NewCustomer {
        NewCustomer {
            full_name: "Amina Okafor".to_owned(),
            account_number: "AC-20114".to_owned(),
            meter_number: "WM-88-1042".to_owned(),
            address: "14 Borehole Rd".to_owned(),
            phone: "+256 700 414 141".to_owned(),
            tariff: TariffClass::Domestic,
            install_reading: 120,
        }
    }

    #[test]
    fn create_starts_active_with_collapsed_reading_window() {
        let c = Customer::create(EntityId::from("c1"), form());
        assert_eq!(c.status, CustomerStatus::Active);
        assert_eq!(c.previous_reading, 120);
        assert_eq!(c.current_reading, 120);
        assert_eq!(c.consumption(), 0);
        assert_eq!(c.arrears_cents, 0);
        assert!(!c.in_arrears());
    }

    #[test]
    fn record_reading_advances_the_window() {
        let mut c = Customer::create(EntityId::from("c1"), form());
        c.record_reading(135);
        assert_eq!(c.previous_reading, 120);
        assert_eq!(c.current_reading, 135);
        assert_eq!(c.consumption(), 15);

        c.record_reading(141);
        assert_eq!(c.previous_reading, 135);
        assert_eq!(c.consumption(), 6);
    }

    #[test]
    fn consumption_saturates_on_meter_rollback() {
        let mut c = Customer::create(EntityId::from("c1"), form());
        // Meter swapped for a fresh unit reading lower than the old one.
        c.record_reading(3);
        assert_eq!(c.consumption(), 0);
    }

    #[test]
    fn cycle_charge_uses_the_tariff_rate() {
        let mut c = Customer::create(EntityId::from("c1"), form());
        c.record_reading(130);
        assert_eq!(c.cycle_charge_cents(), 10 * 150);

        c.tariff = TariffClass::Commercial;
        assert_eq!(c.cycle_charge_cents(), 10 * 420);
    }

    #[test]
    fn settle_reduces_arrears_and_overpayment_goes_to_credit() {
        let mut c = Customer::create(EntityId::from("c1"), form());
        c.arrears_cents = 5_000;
        c.settle_cents(3_000);
        assert_eq!(c.arrears_cents, 2_000);
        assert!(c.in_arrears());

        c.settle_cents(2_500);
        assert_eq!(c.arrears_cents, -500);
        assert!(!c.in_arrears());
    }

    #[test]
    fn status_strings_match_serde_names() {
        for status in [
            CustomerStatus::Active,
            CustomerStatus::Suspended,
            CustomerStatus::Disconnected,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn tariff_strings_match_serde_names() {
        for tariff in [
            TariffClass::Domestic,
            TariffClass::Commercial,
            TariffClass::Institutional,
        ] {
            let json = serde_json::to_string(&tariff).unwrap();
            assert_eq!(json, format!("\"{}\"", tariff.as_str()));
        }
    }

    #[test]
    fn row_decodes_from_column_names() {
        let row = r#"{
            "id": "c9",
            "full_name": "Joseph Banda",
            "account_number": "AC-20990",
            "meter_number": "WM-88-2001",
            "address": "2 Reservoir Lane",
            "phone": "+260 97 555 0101",
            "status": "suspended",
            "tariff": "commercial",
            "previous_reading": 410,
            "current_reading": 450,
            "arrears_cents": 120000,
            "created_at": "2026-03-01T08:30:00Z"
        }"#;
        let c: Customer = serde_json::from_str(row).unwrap();
        assert_eq!(c.id.as_str(), "c9");
        assert_eq!(c.status, CustomerStatus::Suspended);
        assert_eq!(c.tariff, TariffClass::Commercial);
        assert_eq!(c.consumption(), 40);
        assert!(c.in_arrears());
    }
}
