use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::SlotStatus;
use super::{require_id, require_text, ValidationError};

/// A patient's claim on a schedule slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub appointment_id: i64,
    pub schedule_code: String,
    pub ssn: i64,
    pub employee_id: i64,
    pub start_time: String,
    pub end_time: String,
    pub status: SlotStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating or updating an appointment.
///
/// `appointment_id` is only honoured on create when the server is configured
/// to accept client-assigned ids. Older clients send it as `apointment_id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentInput {
    #[serde(default, alias = "apointment_id")]
    pub appointment_id: i64,
    #[serde(default)]
    pub schedule_code: String,
    #[serde(default)]
    pub ssn: i64,
    #[serde(default)]
    pub employee_id: i64,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub status: SlotStatus,
}

impl AppointmentInput {
    /// Check required fields. `require_client_id` enforces a non-zero
    /// caller-supplied `appointment_id`.
    pub fn validate(&self, require_client_id: bool) -> Result<(), ValidationError> {
        if require_client_id {
            require_id(self.appointment_id, "Appointment ID")?;
        }
        require_text(&self.schedule_code, "Schedule")?;
        require_text(&self.start_time, "Start Time")?;
        require_text(&self.end_time, "End Time")?;
        require_id(self.ssn, "SSN")?;
        Ok(())
    }
}
