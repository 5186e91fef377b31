#![forbid(unsafe_code)]

//! AI-assisted helper flows.
//!
//! Two collaborators, both external models behind seams owned here:
//!
//! - [`DocsAssistant`] answers questions against the utility's tariff and
//!   procedure documentation (the portal's help chatbot).
//! - [`MeterVision`] turns a photo of a meter register into a
//!   [`MeterReading`], which [`apply_meter_reading`] then writes into the
//!   bulk-meter working set.
//!
//! The canned implementations here are what tests and local development
//! run against; real model clients live outside this repo.

use aquifer_store::Identifiable;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::state::PortalState;

/// Errors from the assist collaborators.
#[derive(Debug, Clone)]
pub enum AssistError {
    /// The model endpoint could not be reached or errored out.
    Unavailable(String),
    /// The input was unusable (blank question, unreadable photo).
    Rejected(String),
}

impl std::fmt::Display for AssistError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(msg) => write!(f, "assistant unavailable: {msg}"),
            Self::Rejected(msg) => write!(f, "input rejected: {msg}"),
        }
    }
}

impl std::error::Error for AssistError {}

/// Documentation chatbot seam.
pub trait DocsAssistant {
    /// Answer a free-text question against the utility's documentation.
    fn ask(&self, question: &str) -> Result<String, AssistError>;
}

/// A reading extracted from a meter photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterReading {
    /// Serial the model read off the faceplate.
    pub meter_number: String,
    /// Register value in m³.
    pub reading: u32,
    /// Model confidence in `[0, 1]`.
    pub confidence: f32,
}

/// Meter-photo reader seam.
pub trait MeterVision {
    /// Extract a reading from a photo of a meter register.
    fn read_meter(&self, image: &[u8]) -> Result<MeterReading, AssistError>;
}

/// Write path of the vision flow: record `reading` against the bulk meter
/// whose serial matches.
///
/// Returns `true` when a meter matched and its reading window advanced;
/// `false` (and a warning log) when no meter carries that serial. The
/// confidence value is information for the operator confirming the reading,
/// not a gate here; callers decide their own floor before applying.
pub fn apply_meter_reading(state: &PortalState, reading: &MeterReading) -> bool {
    let matched = state
        .bulk_meters
        .with(|meters| {
            meters
                .iter()
                .find(|m| m.meter_number == reading.meter_number)
                .cloned()
        });
    match matched {
        Some(mut meter) => {
            meter.record_reading(reading.reading);
            debug!(
                meter = %meter.id(),
                serial = %reading.meter_number,
                reading = reading.reading,
                "vision reading applied"
            );
            state.bulk_meters.update(meter)
        }
        None => {
            warn!(
                serial = %reading.meter_number,
                "vision reading matched no bulk meter"
            );
            false
        }
    }
}

/// [`DocsAssistant`] returning one fixed answer, for tests and local
/// development.
pub struct CannedDocsAssistant {
    answer: String,
}

impl CannedDocsAssistant {
    #[must_use]
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
        }
    }
}

impl DocsAssistant for CannedDocsAssistant {
    fn ask(&self, question: &str) -> Result<String, AssistError> {
        if question.trim().is_empty() {
            return Err(AssistError::Rejected("empty question".to_owned()));
        }
        Ok(self.answer.clone())
    }
}

/// [`MeterVision`] returning one fixed reading, for tests and local
/// development.
pub struct CannedMeterVision {
    reading: MeterReading,
}

impl CannedMeterVision {
    #[must_use]
    pub fn new(reading: MeterReading) -> Self {
        Self { reading }
    }
}

impl MeterVision for CannedMeterVision {
    fn read_meter(&self, image: &[u8]) -> Result<MeterReading, AssistError> {
        if image.is_empty() {
            return Err(AssistError::Rejected("empty image".to_owned()));
        }
        Ok(self.reading.clone())
    }
}
