//! Static seed data standing in for the live incident and sensor feed.

use crate::model::{
    DisasterType, GeoPoint, Incident, IncidentSeverity, IncidentStatus, SensorData, SensorKind,
    SensorStatus, TeamLogEntry, WeatherAlert,
};
use chrono::{DateTime, Duration, Utc};

/// Default map center, the Sector 4 river delta.
pub const OPERATIONS_CENTER: GeoPoint = GeoPoint::new(34.0522, -118.2437);

/// Officer id stamped on every registration made from this console.
pub const REGISTERING_OFFICER: &str = "OFFICER-101";

/// Incident every registration is filed against.
pub const REGISTRATION_DISASTER_ID: &str = "INC-2023-001";

/// Headline figures shown on the command deck tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationsSnapshot {
    pub rescuers_deployed: u32,
    pub victims_registered: u32,
    pub threat_level: IncidentSeverity,
}

pub const OPERATIONS_SNAPSHOT: OperationsSnapshot = OperationsSnapshot {
    rescuers_deployed: 142,
    victims_registered: 893,
    threat_level: IncidentSeverity::High,
};

pub fn incidents() -> Vec<Incident> {
    incidents_at(Utc::now())
}

/// Seed incidents with timestamps relative to `now`.
pub fn incidents_at(now: DateTime<Utc>) -> Vec<Incident> {
    vec![
        Incident {
            id: "INC-2023-001".into(),
            title: "River Bank Overflow - Sector 4".into(),
            kind: DisasterType::Flood,
            severity: IncidentSeverity::Critical,
            location: OPERATIONS_CENTER,
            location_name: "North River Delta".into(),
            timestamp: now,
            description:
                "Rapid water level rise detected by EO Sentinel-1 analysis. Evacuation ordered."
                    .into(),
            affected_population: 1200,
            status: IncidentStatus::Active,
        },
        Incident {
            id: "INC-2023-002".into(),
            title: "Hillside Instability Warning".into(),
            kind: DisasterType::Landslide,
            severity: IncidentSeverity::High,
            location: GeoPoint::new(34.1, -118.3),
            location_name: "Eastern Highlands".into(),
            timestamp: now - Duration::hours(1),
            description: "Soil moisture saturation > 90%. High probability of slope failure."
                .into(),
            affected_population: 350,
            status: IncidentStatus::Active,
        },
        Incident {
            id: "INC-2023-003".into(),
            title: "Wildfire - Dry Brush".into(),
            kind: DisasterType::Fire,
            severity: IncidentSeverity::Medium,
            location: GeoPoint::new(34.0, -118.4),
            location_name: "West Canyon".into(),
            timestamp: now - Duration::hours(2),
            description: "Detected via MODIS thermal anomalies. Crews dispatched.".into(),
            affected_population: 50,
            status: IncidentStatus::Contained,
        },
    ]
}

pub fn sensors() -> Vec<SensorData> {
    sensors_at(Utc::now())
}

pub fn sensors_at(now: DateTime<Utc>) -> Vec<SensorData> {
    vec![
        SensorData {
            id: "SENS-W-01".into(),
            kind: SensorKind::WaterLevel,
            value: 8.5,
            unit: "m".into(),
            location: OPERATIONS_CENTER,
            status: SensorStatus::Danger,
            timestamp: now,
            trend: vec![4.2, 4.5, 5.1, 6.8, 7.9, 8.2, 8.5],
        },
        SensorData {
            id: "SENS-R-01".into(),
            kind: SensorKind::Rainfall,
            value: 120.0,
            unit: "mm/h".into(),
            location: GeoPoint::new(34.1, -118.3),
            status: SensorStatus::Warning,
            timestamp: now,
            trend: vec![10.0, 15.0, 45.0, 80.0, 100.0, 115.0, 120.0],
        },
    ]
}

pub fn priority_alerts() -> Vec<WeatherAlert> {
    vec![
        WeatherAlert {
            id: "ALERT-FLOOD-04".into(),
            headline: "Flood Warning".into(),
            severity: IncidentSeverity::Critical,
            instruction:
                "Sector 4 river gauge exceeding safety levels. Prepare evacuation teams.".into(),
            age_minutes: 2,
        },
        WeatherAlert {
            id: "ALERT-SLIDE-EH".into(),
            headline: "Landslide Risk".into(),
            severity: IncidentSeverity::High,
            instruction:
                "Eastern Highlands slope saturation > 90%. Road closure recommended.".into(),
            age_minutes: 15,
        },
    ]
}

pub fn team_log() -> Vec<TeamLogEntry> {
    [
        ("Alpha-1", "Arrived at Delta point. Setting up comms."),
        ("Medic-2", "Triage center operational. Need 2 more stretchers."),
        ("Dispatch", "Copy Medic-2. Logistics inbound ETA 10m."),
    ]
    .into_iter()
    .map(|(callsign, message)| TeamLogEntry {
        callsign: callsign.into(),
        message: message.into(),
    })
    .collect()
}
