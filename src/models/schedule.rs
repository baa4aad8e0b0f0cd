use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::SlotStatus;
use super::{require_text, ValidationError};

/// A bookable time window, identified by its schedule code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub schedule_code: String,
    pub day: String,
    pub start_time: String,
    pub end_time: String,
    pub status: SlotStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating or fully replacing a slot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleInput {
    #[serde(default)]
    pub schedule_code: String,
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub status: SlotStatus,
}

impl ScheduleInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.schedule_code, "Schedule Code")?;
        require_text(&self.day, "Day Name")?;
        require_text(&self.start_time, "Start Time")?;
        require_text(&self.end_time, "End Time")?;
        Ok(())
    }
}
