//! Toolkit-independent view state for the console.

pub mod dashboard;
pub mod generation;
pub mod map;
pub mod registration;

pub use dashboard::{AnalysisPanel, DashboardShell, StatTile, Tab, TileTone};
pub use generation::{RequestGeneration, RequestTicket};
pub use map::{IncidentDetail, MapSettings, MapView, MapWidget, MarkerColor, MarkerSpec, TileSource};
pub use registration::{ExtractionOutcome, FormField, RegistrationForm, VictimForm};
