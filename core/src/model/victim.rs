use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VictimStatus {
    #[default]
    Safe,
    Injured,
    Missing,
    Deceased,
}

impl VictimStatus {
    pub const ALL: [VictimStatus; 4] = [
        VictimStatus::Safe,
        VictimStatus::Injured,
        VictimStatus::Missing,
        VictimStatus::Deceased,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            VictimStatus::Safe => "SAFE",
            VictimStatus::Injured => "INJURED",
            VictimStatus::Missing => "MISSING",
            VictimStatus::Deceased => "DECEASED",
        }
    }
}

impl fmt::Display for VictimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A person registered in the field during the current session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Victim {
    pub id: String,
    pub full_name: String,
    pub national_id: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    pub status: VictimStatus,
    pub registered_at: DateTime<Utc>,
    /// Rescuer id.
    pub registered_by: String,
    pub disaster_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
