use anyhow::Context;
use charts::{ChartStyle, TrendChart};
use chrono::Utc;
use clap::Parser;
use config::ConsoleConfig;
use iced::{
    time,
    widget::{button, column, container, pick_list, row, scrollable, text, text_input, Canvas, Column, Container},
    Alignment, Color, Element, Length, Subscription, Task, Theme,
};
use sentinelcore::gateway::{AiGateway, ExtractedIdentity, GatewayConfig, GeminiClient, ImagePayload};
use sentinelcore::math::trend_series;
use sentinelcore::model::{
    find_sensor, Incident, IncidentSeverity, SensorData, SensorKind, TeamLogEntry, VictimStatus,
    WeatherAlert,
};
use sentinelcore::prelude::{GatewayError, GatewayResult};
use sentinelcore::store::{seed, OPERATIONS_SNAPSHOT};
use sentinelcore::views::dashboard::stat_tiles;
use sentinelcore::views::{
    AnalysisPanel, DashboardShell, ExtractionOutcome, FormField, MapSettings, MapView,
    RegistrationForm, RequestTicket, Tab, TileTone,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tactical::CanvasMap;

mod charts;
mod config;
mod tactical;

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Parser)]
#[command(author, version, about = "Sentinel disaster-response command console")]
struct Args {
    /// Load console settings from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Tab to open on start (dashboard, incidents, victims, eo-data, admin)
    #[arg(long)]
    tab: Option<Tab>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = if let Some(path) = &args.config {
        ConsoleConfig::load(path)?
    } else {
        ConsoleConfig::default()
    };
    let initial_tab = match args.tab {
        Some(tab) => tab,
        None => config.initial_tab()?,
    };

    let gateway_config = config.gateway_config(GatewayConfig::from_env());
    if !gateway_config.has_credential() {
        log::warn!("API_KEY not set; risk analysis and ID scans will report the missing key");
    }
    let boot = BootContext {
        gateway: Arc::new(AiGateway::from_config(&gateway_config)),
        settings: config.map_settings(),
        initial_tab,
    };

    iced::application(move || Console::boot(boot.clone()), Console::update, Console::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("running the console window")
}

fn application_title(state: &Console) -> String {
    format!("SENTINEL · {}", state.shell.active().label())
}

fn application_subscription(state: &Console) -> Subscription<Message> {
    let animating = state.map.widget().is_some_and(CanvasMap::is_animating);
    if animating {
        time::every(FRAME_INTERVAL).map(Message::AnimationFrame)
    } else {
        Subscription::none()
    }
}

fn application_theme(_: &Console) -> Theme {
    Theme::Dark
}

#[derive(Clone)]
struct BootContext {
    gateway: Arc<AiGateway<GeminiClient>>,
    settings: MapSettings,
    initial_tab: Tab,
}

struct Console {
    gateway: Arc<AiGateway<GeminiClient>>,
    shell: DashboardShell,
    incidents: Vec<Incident>,
    sensors: Vec<SensorData>,
    alerts: Vec<WeatherAlert>,
    team_log: Vec<TeamLogEntry>,
    map: MapView<CanvasMap>,
    analysis: AnalysisPanel,
    registration: RegistrationForm,
    scan_path: String,
    alert: Option<String>,
    status: String,
    last_frame: Option<Instant>,
}

#[derive(Debug, Clone)]
pub enum Message {
    TabSelected(Tab),
    MarkerClicked(String),
    CloseDetail,
    ResetView,
    AnimationFrame(Instant),
    RefreshAnalysis,
    AnalysisFinished(RequestTicket, GatewayResult<String>),
    FieldChanged(FormField, String),
    StatusChanged(VictimStatus),
    ScanPathChanged(String),
    ScanRequested,
    ScanFinished(RequestTicket, GatewayResult<ExtractedIdentity>),
    SaveVictim,
    DismissAlert,
}

impl Console {
    fn boot(context: BootContext) -> (Self, Task<Message>) {
        let incidents = seed::incidents();
        let mut state = Console {
            gateway: context.gateway,
            shell: DashboardShell::new(context.initial_tab),
            map: MapView::new(context.settings, incidents.clone()),
            incidents,
            sensors: seed::sensors(),
            alerts: seed::priority_alerts(),
            team_log: seed::team_log(),
            analysis: AnalysisPanel::new(),
            registration: RegistrationForm::new(),
            scan_path: String::new(),
            alert: None,
            status: "Live satellite feed: connected".into(),
            last_frame: None,
        };
        let task = state.enter(context.initial_tab);
        (state, task)
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::TabSelected(tab) => {
                let previous = state.shell.select(tab);
                if previous == tab {
                    return Task::none();
                }
                state.leave(previous);
                state.enter(tab)
            }
            Message::MarkerClicked(incident_id) => {
                if let Some(incident) = state.map.click_marker(&incident_id) {
                    state.status = format!("Tracking {}", incident.title);
                }
                state.last_frame = None;
                Task::none()
            }
            Message::CloseDetail => {
                state.map.close_detail();
                Task::none()
            }
            Message::ResetView => {
                state.map.reset_view();
                Task::none()
            }
            Message::AnimationFrame(now) => {
                let elapsed = state
                    .last_frame
                    .map(|last| now.saturating_duration_since(last))
                    .unwrap_or(FRAME_INTERVAL);
                state.last_frame = Some(now);
                state.map.tick(elapsed);
                Task::none()
            }
            Message::RefreshAnalysis => state.start_analysis(),
            Message::AnalysisFinished(ticket, result) => {
                if !state.analysis.finish(ticket, result) {
                    log::debug!("dropped stale risk analysis response");
                }
                Task::none()
            }
            Message::FieldChanged(field, value) => {
                state.registration.edit(field, value);
                Task::none()
            }
            Message::StatusChanged(status) => {
                state.registration.set_status(status);
                Task::none()
            }
            Message::ScanPathChanged(path) => {
                state.scan_path = path;
                Task::none()
            }
            Message::ScanRequested => state.start_scan(),
            Message::ScanFinished(ticket, result) => {
                match state.registration.finish_extraction(ticket, result) {
                    ExtractionOutcome::Applied => {
                        state.status = "ID scan merged into the form".into();
                    }
                    ExtractionOutcome::Failed(alert) => state.alert = Some(alert),
                    ExtractionOutcome::Discarded => {}
                }
                Task::none()
            }
            Message::SaveVictim => {
                match state.registration.save(Utc::now()) {
                    Ok(victim) => {
                        state.status = format!("Registered {} ({})", victim.full_name, victim.id);
                    }
                    Err(err) => state.alert = Some(err.to_string()),
                }
                Task::none()
            }
            Message::DismissAlert => {
                state.alert = None;
                Task::none()
            }
        }
    }

    /// Tears down whatever the previous tab owned.
    fn leave(&mut self, tab: Tab) {
        if tab.shows_map() {
            self.map.unmount();
            self.last_frame = None;
        }
        if tab == Tab::EoAnalysis {
            self.analysis.cancel();
        }
    }

    fn enter(&mut self, tab: Tab) -> Task<Message> {
        if tab.shows_map() {
            self.map.mount(CanvasMap::new);
        }
        if tab == Tab::EoAnalysis {
            return self.start_analysis();
        }
        Task::none()
    }

    fn start_analysis(&mut self) -> Task<Message> {
        let Some(ticket) = self.analysis.begin() else {
            return Task::none();
        };
        let gateway = self.gateway.clone();
        let sensors = self.sensors.clone();
        let incidents = self.incidents.clone();
        Task::perform(
            async move { gateway.analyze_risk(&sensors, &incidents).await },
            move |result| Message::AnalysisFinished(ticket, result),
        )
    }

    fn start_scan(&mut self) -> Task<Message> {
        let path = PathBuf::from(self.scan_path.trim());
        if path.as_os_str().is_empty() {
            return Task::none();
        }
        let Ok(ticket) = self.registration.begin_extraction() else {
            return Task::none();
        };
        let gateway = self.gateway.clone();
        Task::perform(
            async move {
                let image = read_image(&path).await?;
                gateway.extract_identity(&image).await
            },
            move |result| Message::ScanFinished(ticket, result),
        )
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let navigation = Tab::ALL.into_iter().fold(
            column![text("SENTINEL").size(26).color(alert_red())].spacing(8),
            |col, tab| {
                let label = button(text(tab.label()))
                    .width(Length::Fill)
                    .padding(10)
                    .on_press(Message::TabSelected(tab));
                let label = if tab == state.shell.active() {
                    label.style(button::primary)
                } else {
                    label.style(button::secondary)
                };
                col.push(label)
            },
        );
        let navigation = column![
            navigation,
            text("Ops Commander").size(14),
            text("ID: CMD-001").size(12),
        ]
        .spacing(16)
        .padding(16)
        .width(Length::Fixed(220.0));

        let content = match state.shell.active() {
            Tab::CommandDeck => state.command_deck(),
            Tab::Operations => column![
                text("Operations Map").size(26),
                state.tactical_map(520.0)
            ]
            .spacing(12)
            .into(),
            Tab::Victims => state.registration_view(),
            Tab::EoAnalysis => state.eo_view(),
            Tab::Admin => state.admin_view(),
        };

        let mut main = Column::new().spacing(12).padding(20).width(Length::Fill);
        main = main.push(
            row![
                text("National Disaster Response System").size(20),
                text("FLOOD WARNING: SECTOR 4 - EVACUATION IN PROGRESS")
                    .size(12)
                    .color(alert_red()),
            ]
            .spacing(20)
            .align_y(Alignment::Center),
        );
        if let Some(alert) = &state.alert {
            main = main.push(
                container(
                    row![
                        text(alert).color(alert_orange()),
                        button("OK").on_press(Message::DismissAlert).padding(6),
                    ]
                    .spacing(12)
                    .align_y(Alignment::Center),
                )
                .padding(10)
                .style(container::rounded_box),
            );
        }
        main = main.push(scrollable(content).height(Length::Fill));
        main = main.push(text(&state.status).size(12));

        Container::new(row![navigation, main].spacing(8))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn command_deck(&self) -> Element<'_, Message> {
        let tiles = stat_tiles(&self.incidents, &OPERATIONS_SNAPSHOT).into_iter().fold(
            row![].spacing(12),
            |row, tile| {
                let value_color = match tile.tone {
                    TileTone::Neutral => Color::WHITE,
                    TileTone::Info => tech_blue(),
                    TileTone::Safe => safe_green(),
                    TileTone::Alert => alert_red(),
                };
                row.push(
                    container(
                        column![
                            text(tile.label.to_uppercase()).size(12),
                            text(tile.value).size(30).color(value_color),
                        ]
                        .spacing(4),
                    )
                    .padding(14)
                    .width(Length::Fill)
                    .style(container::rounded_box),
                )
            },
        );

        let alerts = self.alerts.iter().fold(
            column![text("Priority Alerts").size(18)].spacing(8),
            |col, alert| {
                col.push(
                    container(
                        column![
                            row![
                                text(alert.headline.to_uppercase())
                                    .size(12)
                                    .color(severity_color(alert)),
                                text(format!("{}m ago", alert.age_minutes)).size(12),
                            ]
                            .spacing(12),
                            text(&alert.instruction).size(14),
                        ]
                        .spacing(4),
                    )
                    .padding(10)
                    .style(container::rounded_box),
                )
            },
        );

        let log = self.team_log.iter().fold(
            column![text("TEAM CHAT / LOGS").size(12)].spacing(6),
            |col, entry| {
                col.push(
                    row![
                        text(format!("{}:", entry.callsign)).size(12).color(tech_blue()),
                        text(&entry.message).size(12),
                    ]
                    .spacing(6),
                )
            },
        );

        column![
            tiles,
            row![
                column![text("Live Tactical Map").size(18), self.tactical_map(460.0)]
                    .spacing(8)
                    .width(Length::FillPortion(2)),
                column![alerts, container(log).padding(10).style(container::rounded_box)]
                    .spacing(16)
                    .width(Length::FillPortion(1)),
            ]
            .spacing(20)
            .align_y(Alignment::Start),
        ]
        .spacing(20)
        .into()
    }

    fn tactical_map(&self, height: f32) -> Element<'_, Message> {
        let Some(widget) = self.map.widget() else {
            return text("Map offline").into();
        };
        let selected = self.map.selected().map(|incident| incident.id.as_str());
        let canvas = Canvas::new(widget.canvas(selected))
            .width(Length::Fill)
            .height(Length::Fixed(height));

        let viewport = widget.viewport();
        let basemap = self.map.settings().tiles.url_at(viewport.center, viewport.zoom);
        let controls = row![
            text("LIVE SATELLITE FEED: CONNECTED").size(12),
            text(basemap).size(11),
            button("Reset View").on_press(Message::ResetView).padding(6),
        ]
        .spacing(12)
        .align_y(Alignment::Center);

        let mut layout = column![controls, canvas].spacing(8);
        if let Some(detail) = self.map.detail() {
            let severity = Color::from_rgb8(
                detail.severity_color.r,
                detail.severity_color.g,
                detail.severity_color.b,
            );
            layout = layout.push(
                container(
                    column![
                        row![
                            text(detail.heading).size(18).color(alert_red()),
                            button("×").on_press(Message::CloseDetail).padding(4),
                        ]
                        .spacing(12)
                        .align_y(Alignment::Center),
                        text(detail.title).size(14),
                        text(detail.location).size(12),
                        text(detail.description).size(14),
                        row![
                            column![
                                text("Severity").size(12),
                                text(detail.severity.label()).color(severity)
                            ],
                            column![
                                text("Affected").size(12),
                                text(detail.affected_population.to_string())
                            ],
                        ]
                        .spacing(24),
                    ]
                    .spacing(6),
                )
                .padding(14)
                .width(Length::Fixed(340.0))
                .style(container::rounded_box),
            );
        }
        layout.into()
    }

    fn eo_view(&self) -> Element<'_, Message> {
        let analysis = column![
            text("Gemini EO Predictive Analysis").size(22),
            container(text(self.analysis.text()).size(14))
                .padding(14)
                .width(Length::Fill)
                .style(container::rounded_box),
            button("Refresh Risk Model")
                .on_press_maybe((!self.analysis.is_analyzing()).then_some(Message::RefreshAnalysis))
                .padding(10),
        ]
        .spacing(12);

        let water = sensor_chart(
            &self.sensors,
            SensorKind::WaterLevel,
            "River Gauge: Sector 4",
            "CRITICAL THRESHOLD NEAR",
            tech_blue(),
            ChartStyle::Area,
        );
        let rain = sensor_chart(
            &self.sensors,
            SensorKind::Rainfall,
            "Precipitation Rate (mm/h)",
            "HEAVY RAIN WARNING",
            Color::from_rgb8(0x22, 0xd3, 0xee),
            ChartStyle::Line,
        );

        column![analysis, row![water, rain].spacing(20)]
            .spacing(24)
            .into()
    }

    fn registration_view(&self) -> Element<'_, Message> {
        let form = self.registration.form();
        let extracting = self.registration.is_extracting();
        let scan_label = if extracting {
            "Extracting Data via Gemini AI..."
        } else {
            "Scan National ID (OCR)"
        };
        let can_scan = !extracting && !self.scan_path.trim().is_empty();

        let scanner = column![
            text_input("Path to ID photo (jpg/png)", &self.scan_path)
                .on_input(Message::ScanPathChanged)
                .padding(6),
            button(scan_label)
                .on_press_maybe(can_scan.then_some(Message::ScanRequested))
                .padding(10),
        ]
        .spacing(8);

        let fields = row![
            column![
                labeled_input("Full Name", &form.full_name, FormField::FullName),
                labeled_input("National ID / NRIC", &form.national_id, FormField::NationalId),
                column![
                    text("Current Status").size(12),
                    pick_list(VictimStatus::ALL, Some(form.status), Message::StatusChanged),
                ]
                .spacing(4),
                labeled_input("Age", &form.age, FormField::Age),
            ]
            .spacing(12)
            .width(Length::Fill),
            column![
                labeled_input("Address (Extracted)", &form.address, FormField::Address),
                labeled_input("Medical/Evacuation Notes", &form.notes, FormField::Notes),
                labeled_input("Gender", &form.gender, FormField::Gender),
            ]
            .spacing(12)
            .width(Length::Fill),
        ]
        .spacing(20);

        let registration = column![
            text("New Victim Registration").size(22),
            container(scanner).padding(14).style(container::rounded_box),
            fields,
            button("Register Victim").on_press(Message::SaveVictim).padding(10),
        ]
        .spacing(16)
        .width(Length::FillPortion(2));

        let saved = self.registration.saved();
        let entries = if saved.is_empty() {
            Column::new().push(text("No records this session.").size(12))
        } else {
            saved.iter().fold(Column::new().spacing(8), |col, victim| {
                let status_color = if victim.status == VictimStatus::Safe {
                    safe_green()
                } else {
                    alert_orange()
                };
                col.push(
                    container(
                        column![
                            text(&victim.full_name).size(14),
                            text(&victim.national_id).size(12),
                            row![
                                text(victim.registered_at.format("%H:%M:%S").to_string()).size(12),
                                text(victim.status.label()).size(12).color(status_color),
                            ]
                            .spacing(12),
                        ]
                        .spacing(2),
                    )
                    .padding(8)
                    .width(Length::Fill)
                    .style(container::rounded_box),
                )
            })
        };
        let recent = column![
            text(format!("Recently Registered ({})", saved.len())).size(16),
            entries,
        ]
        .spacing(12)
        .width(Length::FillPortion(1));

        row![registration, recent]
            .spacing(24)
            .align_y(Alignment::Start)
            .into()
    }

    fn admin_view(&self) -> Element<'_, Message> {
        let stats = self.gateway.stats();
        let credential = if self.gateway.has_credential() {
            "configured"
        } else {
            "missing"
        };
        column![
            text("System Admin").size(22),
            text("Module under development").size(14),
            text(format!("AI gateway credential: {credential}")).size(14),
            text(format!(
                "Risk summaries: {} requests / {} failures",
                stats.summary_requests, stats.summary_failures
            ))
            .size(14),
            text(format!(
                "ID extractions: {} requests / {} failures",
                stats.extraction_requests, stats.extraction_failures
            ))
            .size(14),
        ]
        .spacing(10)
        .into()
    }
}

fn labeled_input<'a>(label: &'a str, value: &'a str, field: FormField) -> Element<'a, Message> {
    column![
        text(label).size(12),
        text_input(label, value)
            .on_input(move |value| Message::FieldChanged(field, value))
            .padding(6),
    ]
    .spacing(4)
    .into()
}

fn sensor_chart<'a>(
    sensors: &[SensorData],
    kind: SensorKind,
    title: &'a str,
    badge: &'a str,
    color: Color,
    style: ChartStyle,
) -> Element<'a, Message> {
    let points = find_sensor(sensors, kind)
        .map(|sensor| trend_series(&sensor.trend))
        .unwrap_or_default();
    let labels = points.iter().fold(row![].spacing(0), |row, point| {
        row.push(text(point.label.clone()).size(11).width(Length::Fill))
    });
    let chart = Canvas::new(TrendChart {
        points,
        color,
        style,
    })
    .width(Length::Fill)
    .height(Length::Fixed(240.0));

    container(
        column![
            row![
                text(title).size(16),
                text(badge).size(11).color(alert_orange()),
            ]
            .spacing(12),
            chart,
            labels,
        ]
        .spacing(8),
    )
    .padding(14)
    .width(Length::Fill)
    .style(container::rounded_box)
    .into()
}

/// Reads and encodes an ID photo; failures count as a failed extraction.
async fn read_image(path: &Path) -> GatewayResult<ImagePayload> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| GatewayError::ExtractionFailed(format!("reading {}: {e}", path.display())))?;
    let mime = ImagePayload::mime_for_extension(path.extension().and_then(|ext| ext.to_str()));
    Ok(ImagePayload::encode(mime, &bytes))
}

fn severity_color(alert: &WeatherAlert) -> Color {
    match alert.severity {
        IncidentSeverity::Critical => alert_red(),
        _ => alert_orange(),
    }
}

fn alert_red() -> Color {
    Color::from_rgb8(0xef, 0x44, 0x44)
}

fn alert_orange() -> Color {
    Color::from_rgb8(0xf9, 0x73, 0x16)
}

fn safe_green() -> Color {
    Color::from_rgb8(0x10, 0xb9, 0x81)
}

fn tech_blue() -> Color {
    Color::from_rgb8(0x3b, 0x82, 0xf6)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn console(tab: Tab) -> Console {
        let context = BootContext {
            gateway: Arc::new(AiGateway::from_config(&GatewayConfig::default())),
            settings: MapSettings::default(),
            initial_tab: tab,
        };
        Console::boot(context).0
    }

    #[test]
    fn boot_on_deck_mounts_map_with_all_markers() {
        let state = console(Tab::CommandDeck);
        assert!(state.map.is_mounted());
        assert_eq!(state.map.marker_ids().len(), state.incidents.len());
    }

    #[test]
    fn leaving_map_tabs_unmounts_widget() {
        let mut state = console(Tab::Operations);
        let _ = Console::update(&mut state, Message::TabSelected(Tab::Victims));
        assert!(!state.map.is_mounted());
        let _ = Console::update(&mut state, Message::TabSelected(Tab::CommandDeck));
        assert!(state.map.is_mounted());
        assert_eq!(state.shell.active(), Tab::CommandDeck);
    }

    #[test]
    fn marker_click_and_close_drive_selection() {
        let mut state = console(Tab::Operations);
        let _ = Console::update(&mut state, Message::MarkerClicked("INC-2023-002".into()));
        assert_eq!(state.map.selected().map(|i| i.id.as_str()), Some("INC-2023-002"));
        let _ = Console::update(&mut state, Message::CloseDetail);
        assert!(state.map.selected().is_none());
    }

    #[test]
    fn basemap_tile_tracks_map_viewport() {
        let state = console(Tab::Operations);
        let viewport = state.map.widget().unwrap().viewport();
        let url = state.map.settings().tiles.url_at(viewport.center, viewport.zoom);
        assert!(url.ends_with("/10/175/408.png"));
    }

    #[test]
    fn failed_save_raises_alert() {
        let mut state = console(Tab::Victims);
        let _ = Console::update(&mut state, Message::SaveVictim);
        assert_eq!(state.alert.as_deref(), Some("Name and ID are required"));
        let _ = Console::update(&mut state, Message::DismissAlert);
        assert!(state.alert.is_none());
    }

    #[test]
    fn stale_scan_result_is_ignored_after_success() {
        let mut state = console(Tab::Victims);
        let ticket = state.registration.begin_extraction().unwrap();
        let _ = Console::update(
            &mut state,
            Message::ScanFinished(ticket, Err(GatewayError::MissingCredential)),
        );
        assert!(state.alert.is_some());
        state.alert = None;
        let _ = Console::update(
            &mut state,
            Message::ScanFinished(ticket, Err(GatewayError::MissingCredential)),
        );
        assert!(state.alert.is_none());
    }

    #[test]
    fn leaving_eo_tab_cancels_running_analysis() {
        let mut state = console(Tab::EoAnalysis);
        assert!(state.analysis.is_analyzing());
        let _ = Console::update(&mut state, Message::TabSelected(Tab::Admin));
        assert!(!state.analysis.is_analyzing());
    }
}
