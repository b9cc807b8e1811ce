use crate::model::GeoPoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisasterType {
    Flood,
    Landslide,
    Fire,
    Typhoon,
    Earthquake,
}

impl DisasterType {
    pub fn label(&self) -> &'static str {
        match self {
            DisasterType::Flood => "FLOOD",
            DisasterType::Landslide => "LANDSLIDE",
            DisasterType::Fire => "FIRE",
            DisasterType::Typhoon => "TYPHOON",
            DisasterType::Earthquake => "EARTHQUAKE",
        }
    }
}

impl fmt::Display for DisasterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl IncidentSeverity {
    pub fn label(&self) -> &'static str {
        match self {
            IncidentSeverity::Low => "LOW",
            IncidentSeverity::Medium => "MEDIUM",
            IncidentSeverity::High => "HIGH",
            IncidentSeverity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for IncidentSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentStatus {
    Active,
    Contained,
    Resolved,
}

/// A reported disaster event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: DisasterType,
    pub severity: IncidentSeverity,
    pub location: GeoPoint,
    pub location_name: String,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    pub affected_population: u32,
    pub status: IncidentStatus,
}

impl Incident {
    pub fn is_active(&self) -> bool {
        self.status == IncidentStatus::Active
    }
}

/// Number of incidents currently in the `ACTIVE` state.
pub fn active_incident_count(incidents: &[Incident]) -> usize {
    incidents.iter().filter(|incident| incident.is_active()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::seed;

    #[test]
    fn serializes_with_original_field_names() {
        let incident = &seed::incidents()[0];
        let value = serde_json::to_value(incident).unwrap();
        assert_eq!(value["type"], "FLOOD");
        assert_eq!(value["severity"], "CRITICAL");
        assert_eq!(value["locationName"], "North River Delta");
        assert_eq!(value["affectedPopulation"], 1200);
        assert_eq!(value["status"], "ACTIVE");
    }

    #[test]
    fn counts_only_active_incidents() {
        let mut incidents = seed::incidents();
        assert_eq!(active_incident_count(&incidents), 2);
        incidents[0].status = IncidentStatus::Resolved;
        assert_eq!(active_incident_count(&incidents), 1);
        assert_eq!(active_incident_count(&[]), 0);
    }

    #[test]
    fn severity_orders_by_urgency() {
        assert!(IncidentSeverity::Critical > IncidentSeverity::High);
        assert!(IncidentSeverity::Medium > IncidentSeverity::Low);
    }
}
