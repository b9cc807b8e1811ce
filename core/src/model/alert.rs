use crate::model::IncidentSeverity;
use serde::{Deserialize, Serialize};

/// Priority alert shown on the command deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherAlert {
    pub id: String,
    pub headline: String,
    pub severity: IncidentSeverity,
    pub instruction: String,
    /// Minutes since the alert was raised.
    #[serde(default)]
    pub age_minutes: u32,
}

/// One line of the field team log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamLogEntry {
    pub callsign: String,
    pub message: String,
}
