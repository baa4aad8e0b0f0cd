use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{require_email, require_id, require_text, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub employee_id: i64,
    pub name: String,
    pub email: String,
    pub department: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeInput {
    #[serde(default)]
    pub employee_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub department: String,
}

impl EmployeeInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text(&self.name, "Name")?;
        require_text(&self.department, "Department")?;
        require_text(&self.password, "Password")?;
        require_id(self.employee_id, "Employee ID")?;
        require_email(&self.email)?;
        Ok(())
    }
}
