use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::SlotStatus;
use super::{require_id, require_text, ValidationError};

/// Clinical outcome recorded against an appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Examination {
    pub examination_id: i64,
    pub appointment_id: i64,
    pub schedule_code: String,
    pub ssn: i64,
    pub employee_id: i64,
    pub anamnesis: String,
    pub diagnosis: String,
    pub prescription: String,
    pub status: SlotStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating or updating an examination.
///
/// An omitted `status` means `available` on create and "unchanged" on
/// update, so editing the clinical notes never moves the slot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExaminationInput {
    #[serde(default, alias = "apointment_id")]
    pub appointment_id: i64,
    #[serde(default)]
    pub schedule_code: String,
    #[serde(default)]
    pub ssn: i64,
    #[serde(default)]
    pub employee_id: i64,
    #[serde(default)]
    pub anamnesis: String,
    #[serde(default)]
    pub diagnosis: String,
    #[serde(default)]
    pub prescription: String,
    #[serde(default)]
    pub status: Option<SlotStatus>,
}

impl ExaminationInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_id(self.appointment_id, "Appointment ID")?;
        require_text(&self.schedule_code, "Schedule")?;
        require_id(self.ssn, "SSN")?;
        require_id(self.employee_id, "Employee ID")?;
        Ok(())
    }
}
