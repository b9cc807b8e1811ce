//! Domain shapes shared by the store, the gateway and the views.

pub mod alert;
pub mod geo;
pub mod incident;
pub mod sensor;
pub mod victim;

pub use alert::{TeamLogEntry, WeatherAlert};
pub use geo::GeoPoint;
pub use incident::{active_incident_count, DisasterType, Incident, IncidentSeverity, IncidentStatus};
pub use sensor::{find_sensor, SensorData, SensorKind, SensorStatus};
pub use victim::{Victim, VictimStatus};
