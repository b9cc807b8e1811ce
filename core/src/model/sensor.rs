use crate::model::GeoPoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SensorKind {
    WaterLevel,
    Rainfall,
    WindSpeed,
    AirQuality,
}

/// Reported by the sensor network; never recomputed locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SensorStatus {
    Normal,
    Warning,
    Danger,
}

/// A monitored measurement point and its recent history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorData {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SensorKind,
    pub value: f64,
    pub unit: String,
    pub location: GeoPoint,
    pub status: SensorStatus,
    pub timestamp: DateTime<Utc>,
    /// Oldest reading first.
    pub trend: Vec<f64>,
}

/// First sensor of the requested kind, in feed order.
pub fn find_sensor(sensors: &[SensorData], kind: SensorKind) -> Option<&SensorData> {
    sensors.iter().find(|sensor| sensor.kind == kind)
}
