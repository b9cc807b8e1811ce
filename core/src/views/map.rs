//! Tactical map state: one marker per incident and a single selection.
//!
//! The map widget itself is toolkit specific and sits behind [`MapWidget`].
//! [`MapView`] owns the widget between `mount` and `unmount` and keeps the
//! incident → marker table in step with the incident list. Every sync tears
//! down all markers before building the new set, so no stale marker survives
//! a list change.

use crate::math::{Viewport, WebMercator};
use crate::model::{GeoPoint, Incident, IncidentSeverity};
use crate::store::OPERATIONS_CENTER;
use crate::telemetry::LogManager;
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl MarkerColor {
    pub const ALERT_RED: MarkerColor = MarkerColor::rgb(0xef, 0x44, 0x44);
    pub const ALERT_ORANGE: MarkerColor = MarkerColor::rgb(0xf9, 0x73, 0x16);
    pub const WARNING_YELLOW: MarkerColor = MarkerColor::rgb(0xea, 0xb3, 0x08);
    pub const SAFE_GREEN: MarkerColor = MarkerColor::rgb(0x10, 0xb9, 0x81);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn for_severity(severity: IncidentSeverity) -> Self {
        match severity {
            IncidentSeverity::Critical => Self::ALERT_RED,
            IncidentSeverity::High => Self::ALERT_ORANGE,
            IncidentSeverity::Medium => Self::WARNING_YELLOW,
            IncidentSeverity::Low => Self::SAFE_GREEN,
        }
    }

    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// What the widget needs to draw one incident marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub incident_id: String,
    pub position: GeoPoint,
    pub color: MarkerColor,
}

impl MarkerSpec {
    pub fn for_incident(incident: &Incident) -> Self {
        Self {
            incident_id: incident.id.clone(),
            position: incident.location,
            color: MarkerColor::for_severity(incident.severity),
        }
    }
}

/// Rendering side of the map. Implemented by the GUI canvas and by test doubles.
pub trait MapWidget {
    type Marker;

    fn add_marker(&mut self, spec: &MarkerSpec) -> Self::Marker;
    fn remove_marker(&mut self, marker: Self::Marker);
    fn set_view(&mut self, viewport: Viewport);
    /// Animated recenter.
    fn fly_to(&mut self, viewport: Viewport, duration: Duration);
    /// Releases everything the widget holds; called once on unmount.
    fn destroy(&mut self);

    /// Advances running animations.
    fn advance(&mut self, _elapsed: Duration) {}
}

/// Raster tile source for the basemap.
#[derive(Debug, Clone, PartialEq)]
pub struct TileSource {
    pub template: String,
    pub subdomains: String,
    pub max_zoom: u8,
}

impl TileSource {
    /// URL of the tile under `point`, with the zoom capped at `max_zoom`.
    pub fn url_at(&self, point: GeoPoint, zoom: f64) -> String {
        let z = zoom.clamp(0.0, f64::from(self.max_zoom)).floor() as u8;
        let (x, y) = WebMercator::tile_of(point, z);
        self.url(z, x, y)
    }

    pub fn url(&self, z: u8, x: u32, y: u32) -> String {
        let subdomain = self
            .subdomains
            .chars()
            .nth(((x + y) as usize) % self.subdomains.chars().count().max(1))
            .map(String::from)
            .unwrap_or_default();
        self.template
            .replace("{s}", &subdomain)
            .replace("{z}", &z.min(self.max_zoom).to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
            .replace("{r}", "")
    }
}

impl Default for TileSource {
    fn default() -> Self {
        Self {
            template: "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png".into(),
            subdomains: "abcd".into(),
            max_zoom: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    pub default_view: Viewport,
    /// Zoom used when flying to a selected incident.
    pub focus_zoom: f64,
    pub flight: Duration,
    pub tiles: TileSource,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            default_view: Viewport::new(OPERATIONS_CENTER, 10.0),
            focus_zoom: 13.0,
            flight: Duration::from_millis(1500),
            tiles: TileSource::default(),
        }
    }
}

/// Contents of the selected-incident panel.
#[derive(Debug, Clone, PartialEq)]
pub struct IncidentDetail {
    pub heading: String,
    pub title: String,
    pub location: String,
    pub description: String,
    pub severity: IncidentSeverity,
    pub severity_color: MarkerColor,
    pub affected_population: u32,
}

impl From<&Incident> for IncidentDetail {
    fn from(incident: &Incident) -> Self {
        Self {
            heading: incident.kind.label().to_string(),
            title: incident.title.clone(),
            location: format!(
                "{} • {}",
                incident.location_name,
                incident.location.display()
            ),
            description: incident.description.clone(),
            severity: incident.severity,
            severity_color: MarkerColor::for_severity(incident.severity),
            affected_population: incident.affected_population,
        }
    }
}

pub struct MapView<W: MapWidget> {
    widget: Option<W>,
    markers: BTreeMap<String, W::Marker>,
    incidents: Vec<Incident>,
    selected: Option<String>,
    settings: MapSettings,
    logger: LogManager,
}

impl<W: MapWidget> MapView<W> {
    pub fn new(settings: MapSettings, incidents: Vec<Incident>) -> Self {
        Self {
            widget: None,
            markers: BTreeMap::new(),
            incidents,
            selected: None,
            settings,
            logger: LogManager::new("map"),
        }
    }

    /// Creates the widget unless one is already mounted. Returns whether a
    /// widget was created.
    pub fn mount<F>(&mut self, create: F) -> bool
    where
        F: FnOnce(&MapSettings) -> W,
    {
        if self.widget.is_some() {
            return false;
        }
        let mut widget = create(&self.settings);
        widget.set_view(self.settings.default_view);
        self.widget = Some(widget);
        self.logger.trace("map widget mounted");
        self.sync_markers();
        true
    }

    /// Destroys the widget and forgets its markers and the selection.
    pub fn unmount(&mut self) {
        if let Some(mut widget) = self.widget.take() {
            for (_, marker) in std::mem::take(&mut self.markers) {
                widget.remove_marker(marker);
            }
            widget.destroy();
            self.logger.trace("map widget destroyed");
        }
        self.markers.clear();
        self.selected = None;
    }

    pub fn is_mounted(&self) -> bool {
        self.widget.is_some()
    }

    /// Replaces the incident list and rebuilds markers.
    pub fn set_incidents(&mut self, incidents: Vec<Incident>) {
        self.incidents = incidents;
        if let Some(id) = &self.selected {
            if !self.incidents.iter().any(|incident| &incident.id == id) {
                self.selected = None;
            }
        }
        self.sync_markers();
    }

    /// Removes every marker, then adds one per incident.
    pub fn sync_markers(&mut self) {
        let Some(widget) = self.widget.as_mut() else {
            return;
        };
        for (_, marker) in std::mem::take(&mut self.markers) {
            widget.remove_marker(marker);
        }
        for incident in &self.incidents {
            let marker = widget.add_marker(&MarkerSpec::for_incident(incident));
            if let Some(stale) = self.markers.insert(incident.id.clone(), marker) {
                // duplicate id in the feed: keep only the latest marker
                widget.remove_marker(stale);
            }
        }
        self.logger
            .trace(&format!("synced {} markers", self.markers.len()));
    }

    /// Incident ids that currently have a marker, sorted.
    pub fn marker_ids(&self) -> Vec<&str> {
        self.markers.keys().map(String::as_str).collect()
    }

    pub fn incidents(&self) -> &[Incident] {
        &self.incidents
    }

    /// Selects the incident behind a clicked marker and flies to it.
    pub fn click_marker(&mut self, incident_id: &str) -> Option<&Incident> {
        let index = self
            .incidents
            .iter()
            .position(|incident| incident.id == incident_id)?;
        let location = self.incidents[index].location;
        self.selected = Some(incident_id.to_string());
        if let Some(widget) = self.widget.as_mut() {
            widget.fly_to(
                Viewport::new(location, self.settings.focus_zoom),
                self.settings.flight,
            );
        }
        self.incidents.get(index)
    }

    /// Closes the detail panel.
    pub fn close_detail(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&Incident> {
        let id = self.selected.as_deref()?;
        self.incidents.iter().find(|incident| incident.id == id)
    }

    pub fn detail(&self) -> Option<IncidentDetail> {
        self.selected().map(IncidentDetail::from)
    }

    pub fn reset_view(&mut self) {
        let view = self.settings.default_view;
        if let Some(widget) = self.widget.as_mut() {
            widget.set_view(view);
        }
    }

    pub fn tick(&mut self, elapsed: Duration) {
        if let Some(widget) = self.widget.as_mut() {
            widget.advance(elapsed);
        }
    }

    pub fn settings(&self) -> &MapSettings {
        &self.settings
    }

    /// Read-only access for rendering.
    pub fn widget(&self) -> Option<&W> {
        self.widget.as_ref()
    }
}

impl<W: MapWidget> Drop for MapView<W> {
    fn drop(&mut self) {
        self.unmount();
    }
}
