use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{require_email, require_id, require_text, ValidationError};

/// Patient record as returned to clients. The password hash never leaves the database layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub ssn: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatientInput {
    #[serde(default)]
    pub ssn: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl PatientInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.name, "Name")?;
        require_id(self.ssn, "SSN")?;
        require_text(&self.password, "Password")?;
        require_email(&self.email)?;
        Ok(())
    }
}

/// Body of `POST /login/{user}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.password, "Password")?;
        require_email(&self.email)?;
        Ok(())
    }
}
