use anyhow::Context;
use sentinelcore::gateway::config::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use sentinelcore::gateway::GatewayConfig;
use sentinelcore::math::Viewport;
use sentinelcore::model::GeoPoint;
use sentinelcore::store::OPERATIONS_CENTER;
use sentinelcore::views::{MapSettings, Tab, TileSource};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Console settings loaded from YAML. The API key is only taken from the
/// environment.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub initial_tab: String,
    pub map: MapSection,
    pub gateway: GatewaySection,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSection {
    pub center_lat: f64,
    pub center_lng: f64,
    pub zoom: f64,
    pub focus_zoom: f64,
    pub flight_ms: u64,
    pub tile_template: String,
    pub tile_subdomains: String,
    pub max_zoom: u8,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewaySection {
    pub model: String,
    pub endpoint: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            initial_tab: Tab::CommandDeck.id().into(),
            map: MapSection::default(),
            gateway: GatewaySection::default(),
        }
    }
}

impl Default for MapSection {
    fn default() -> Self {
        let tiles = TileSource::default();
        Self {
            center_lat: OPERATIONS_CENTER.lat,
            center_lng: OPERATIONS_CENTER.lng,
            zoom: 10.0,
            focus_zoom: 13.0,
            flight_ms: 1500,
            tile_template: tiles.template,
            tile_subdomains: tiles.subdomains,
            max_zoom: tiles.max_zoom,
        }
    }
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            endpoint: DEFAULT_ENDPOINT.into(),
        }
    }
}

impl ConsoleConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading console config {}", path_ref.display()))?;
        let config: ConsoleConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing console config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn initial_tab(&self) -> anyhow::Result<Tab> {
        self.initial_tab
            .parse()
            .map_err(anyhow::Error::msg)
            .context("resolving initial_tab")
    }

    pub fn map_settings(&self) -> MapSettings {
        let map = &self.map;
        MapSettings {
            default_view: Viewport::new(GeoPoint::new(map.center_lat, map.center_lng), map.zoom),
            focus_zoom: map.focus_zoom,
            flight: Duration::from_millis(map.flight_ms),
            tiles: TileSource {
                template: map.tile_template.clone(),
                subdomains: map.tile_subdomains.clone(),
                max_zoom: map.max_zoom,
            },
        }
    }

    /// Applies model and endpoint on top of an environment-derived config.
    pub fn gateway_config(&self, base: GatewayConfig) -> GatewayConfig {
        base.with_model(self.gateway.model.clone())
            .with_endpoint(self.gateway.endpoint.clone())
    }
}
