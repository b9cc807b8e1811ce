use crate::gateway::summary_text;
use crate::model::{active_incident_count, Incident};
use crate::prelude::GatewayResult;
use crate::store::OperationsSnapshot;
use crate::views::generation::{RequestGeneration, RequestTicket};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    CommandDeck,
    Operations,
    Victims,
    EoAnalysis,
    Admin,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::CommandDeck,
        Tab::Operations,
        Tab::Victims,
        Tab::EoAnalysis,
        Tab::Admin,
    ];

    /// Stable id used in config files and on the command line.
    pub fn id(&self) -> &'static str {
        match self {
            Tab::CommandDeck => "dashboard",
            Tab::Operations => "incidents",
            Tab::Victims => "victims",
            Tab::EoAnalysis => "eo-data",
            Tab::Admin => "admin",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::CommandDeck => "Command Deck",
            Tab::Operations => "Operations & Map",
            Tab::Victims => "Victim Reg",
            Tab::EoAnalysis => "EO Analysis",
            Tab::Admin => "System Admin",
        }
    }

    pub fn shows_map(&self) -> bool {
        matches!(self, Tab::CommandDeck | Tab::Operations)
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Tab::ALL
            .into_iter()
            .find(|tab| tab.id().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| format!("unknown tab '{value}'"))
    }
}

/// Which subtree the shell renders. Exactly one tab is active.
#[derive(Debug, Default)]
pub struct DashboardShell {
    active: Tab,
}

impl DashboardShell {
    pub fn new(active: Tab) -> Self {
        Self { active }
    }

    pub fn active(&self) -> Tab {
        self.active
    }

    /// Switches tabs and returns the one left behind.
    pub fn select(&mut self, tab: Tab) -> Tab {
        std::mem::replace(&mut self.active, tab)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileTone {
    Neutral,
    Info,
    Safe,
    Alert,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatTile {
    pub label: &'static str,
    pub value: String,
    pub tone: TileTone,
}

/// Command deck tiles; the active count is derived on every call.
pub fn stat_tiles(incidents: &[Incident], snapshot: &OperationsSnapshot) -> Vec<StatTile> {
    vec![
        StatTile {
            label: "Active Incidents",
            value: active_incident_count(incidents).to_string(),
            tone: TileTone::Neutral,
        },
        StatTile {
            label: "Rescuers Deployed",
            value: snapshot.rescuers_deployed.to_string(),
            tone: TileTone::Info,
        },
        StatTile {
            label: "Victims Registered",
            value: snapshot.victims_registered.to_string(),
            tone: TileTone::Safe,
        },
        StatTile {
            label: "Threat Level",
            value: snapshot.threat_level.label().to_string(),
            tone: TileTone::Alert,
        },
    ]
}

pub const ANALYSIS_INITIAL: &str = "System initializing... Waiting for EO data ingestion.";
pub const ANALYSIS_BUSY: &str = "Processing sensor fusion data... Querying Gemini 2.5...";

/// EO analysis panel: latest summary text and the refresh cycle.
#[derive(Debug)]
pub struct AnalysisPanel {
    text: String,
    running: Option<RequestTicket>,
    generation: RequestGeneration,
}

impl AnalysisPanel {
    pub fn new() -> Self {
        Self {
            text: ANALYSIS_INITIAL.to_string(),
            running: None,
            generation: RequestGeneration::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_analyzing(&self) -> bool {
        self.running.is_some()
    }

    /// Starts a refresh; `None` while one is already running.
    pub fn begin(&mut self) -> Option<RequestTicket> {
        if self.running.is_some() {
            return None;
        }
        let ticket = self.generation.issue();
        self.running = Some(ticket);
        self.text = ANALYSIS_BUSY.to_string();
        Some(ticket)
    }

    /// Applies a finished summary. Returns false for stale responses.
    pub fn finish(&mut self, ticket: RequestTicket, result: GatewayResult<String>) -> bool {
        if !self.generation.settle(ticket) {
            return false;
        }
        self.running = None;
        self.text = summary_text(&result);
        true
    }

    /// Drops the running request, e.g. when the panel is closed.
    pub fn cancel(&mut self) {
        self.generation.invalidate();
        if self.running.take().is_some() {
            self.text = ANALYSIS_INITIAL.to_string();
        }
    }
}

impl Default for AnalysisPanel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{SUMMARY_MISSING_CREDENTIAL, SUMMARY_UNAVAILABLE};
    use crate::prelude::GatewayError;
    use crate::store::{seed, OPERATIONS_SNAPSHOT};

    #[test]
    fn one_tab_active_at_a_time() {
        let mut shell = DashboardShell::default();
        assert_eq!(shell.active(), Tab::CommandDeck);
        assert_eq!(shell.select(Tab::Victims), Tab::CommandDeck);
        assert_eq!(shell.active(), Tab::Victims);
    }

    #[test]
    fn tab_ids_round_trip_through_from_str() {
        for tab in Tab::ALL {
            assert_eq!(tab.id().parse::<Tab>(), Ok(tab));
        }
        assert!("radar".parse::<Tab>().is_err());
    }

    #[test]
    fn only_deck_and_operations_show_map() {
        let map_tabs: Vec<Tab> = Tab::ALL.into_iter().filter(Tab::shows_map).collect();
        assert_eq!(map_tabs, vec![Tab::CommandDeck, Tab::Operations]);
    }

    #[test]
    fn active_tile_tracks_incident_list() {
        let mut incidents = seed::incidents();
        let tiles = stat_tiles(&incidents, &OPERATIONS_SNAPSHOT);
        assert_eq!(tiles[0].value, "2");
        assert_eq!(tiles[3].value, "HIGH");

        incidents.truncate(1);
        assert_eq!(stat_tiles(&incidents, &OPERATIONS_SNAPSHOT)[0].value, "1");
    }

    #[test]
    fn analysis_cycle_updates_text() {
        let mut panel = AnalysisPanel::new();
        assert_eq!(panel.text(), ANALYSIS_INITIAL);
        let ticket = panel.begin().unwrap();
        assert_eq!(panel.text(), ANALYSIS_BUSY);
        assert!(panel.begin().is_none());

        assert!(panel.finish(ticket, Ok("Evacuate Sector 4.".into())));
        assert_eq!(panel.text(), "Evacuate Sector 4.");
        assert!(!panel.is_analyzing());
    }

    #[test]
    fn analysis_errors_become_fallback_text() {
        let mut panel = AnalysisPanel::new();
        let ticket = panel.begin().unwrap();
        panel.finish(ticket, Err(GatewayError::MissingCredential));
        assert_eq!(panel.text(), SUMMARY_MISSING_CREDENTIAL);

        let ticket = panel.begin().unwrap();
        panel.finish(ticket, Err(GatewayError::Transport("reset".into())));
        assert_eq!(panel.text(), SUMMARY_UNAVAILABLE);
    }

    #[test]
    fn cancelled_analysis_ignores_late_response() {
        let mut panel = AnalysisPanel::new();
        let ticket = panel.begin().unwrap();
        panel.cancel();
        assert!(!panel.finish(ticket, Ok("late".into())));
        assert_eq!(panel.text(), ANALYSIS_INITIAL);
        assert!(panel.begin().is_some());
    }
}
