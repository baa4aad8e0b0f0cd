use crate::db::DatabaseError;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern,
/// stored in SQLite as its string form.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: DatabaseError| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

str_enum!(SlotStatus {
    Available => "available",
    Booked => "booked",
    Completed => "completed",
    Cancelled => "cancelled",
});

str_enum!(UserKind {
    Patient => "patient",
    Employee => "employee",
});

impl Default for SlotStatus {
    fn default() -> Self {
        Self::Available
    }
}

impl SlotStatus {
    /// Statuses a slot may currently hold for a cascade to move it to `self`.
    ///
    /// Self-transitions are included so that re-saving an unchanged status
    /// succeeds.
    pub fn allowed_priors(&self) -> &'static [SlotStatus] {
        match self {
            Self::Available => &[Self::Available, Self::Booked],
            Self::Booked => &[Self::Available, Self::Booked],
            Self::Completed => &[Self::Booked, Self::Completed],
            Self::Cancelled => &[Self::Available, Self::Booked, Self::Cancelled],
        }
    }

    pub fn can_transition_from(&self, current: SlotStatus) -> bool {
        self.allowed_priors().contains(&current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn slot_status_parses_lowercase() {
        assert_eq!(SlotStatus::from_str("booked").unwrap(), SlotStatus::Booked);
        assert_eq!(SlotStatus::Cancelled.as_str(), "cancelled");
    }

    #[test]
    fn slot_status_serializes_snake_case() {
        let json = serde_json::to_string(&SlotStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
        let parsed: SlotStatus = serde_json::from_str("\"available\"").unwrap();
        assert_eq!(parsed, SlotStatus::Available);
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(SlotStatus::from_str("reserved").is_err());
        assert!(SlotStatus::from_str("Booked").is_err());
        assert!(UserKind::from_str("admin").is_err());
        assert!(serde_json::from_str::<SlotStatus>("\"maybe\"").is_err());
    }

    #[test]
    fn completed_requires_booked_slot() {
        assert!(SlotStatus::Completed.can_transition_from(SlotStatus::Booked));
        assert!(!SlotStatus::Completed.can_transition_from(SlotStatus::Available));
        assert!(!SlotStatus::Completed.can_transition_from(SlotStatus::Cancelled));
    }

    #[test]
    fn terminal_slots_cannot_be_rebooked() {
        assert!(!SlotStatus::Booked.can_transition_from(SlotStatus::Completed));
        assert!(!SlotStatus::Booked.can_transition_from(SlotStatus::Cancelled));
        assert!(!SlotStatus::Available.can_transition_from(SlotStatus::Completed));
    }

    #[test]
    fn self_transitions_are_allowed() {
        for status in [
            SlotStatus::Available,
            SlotStatus::Booked,
            SlotStatus::Completed,
            SlotStatus::Cancelled,
        ] {
            assert!(status.can_transition_from(status), "{status} -> {status}");
        }
    }
}
