//! Canvas-backed implementation of the tactical map widget.

use crate::Message;
use iced::{
    mouse,
    widget::canvas::{self, Frame, Geometry, Path, Stroke},
    Color, Point, Rectangle, Renderer, Size, Theme,
};
use sentinelcore::math::Viewport;
use sentinelcore::views::{MapSettings, MapWidget, MarkerColor, MarkerSpec};
use std::time::Duration;

const MARKER_RADIUS: f32 = 6.0;
const RING_RADIUS: f32 = 11.0;
const GRID_SPACING: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerHandle(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedMarker {
    handle: MarkerHandle,
    pub spec: MarkerSpec,
}

#[derive(Debug, Clone)]
struct Flight {
    from: Viewport,
    to: Viewport,
    duration: Duration,
    elapsed: Duration,
}

/// Marker layer and viewport drawn by [`TacticalCanvas`].
#[derive(Debug)]
pub struct CanvasMap {
    markers: Vec<PlacedMarker>,
    next_handle: u64,
    viewport: Viewport,
    flight: Option<Flight>,
}

impl CanvasMap {
    pub fn new(settings: &MapSettings) -> Self {
        Self {
            markers: Vec::new(),
            next_handle: 0,
            viewport: settings.default_view,
            flight: None,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn markers(&self) -> &[PlacedMarker] {
        &self.markers
    }

    pub fn is_animating(&self) -> bool {
        self.flight.is_some()
    }

    /// Snapshot handed to the canvas for one frame.
    pub fn canvas(&self, selected: Option<&str>) -> TacticalCanvas {
        TacticalCanvas {
            markers: self.markers.clone(),
            viewport: self.viewport,
            selected: selected.map(String::from),
        }
    }
}

impl MapWidget for CanvasMap {
    type Marker = MarkerHandle;

    fn add_marker(&mut self, spec: &MarkerSpec) -> MarkerHandle {
        self.next_handle += 1;
        let handle = MarkerHandle(self.next_handle);
        self.markers.push(PlacedMarker {
            handle,
            spec: spec.clone(),
        });
        handle
    }

    fn remove_marker(&mut self, marker: MarkerHandle) {
        self.markers.retain(|placed| placed.handle != marker);
    }

    fn set_view(&mut self, viewport: Viewport) {
        self.flight = None;
        self.viewport = viewport;
    }

    fn fly_to(&mut self, viewport: Viewport, duration: Duration) {
        if duration.is_zero() {
            self.set_view(viewport);
            return;
        }
        self.flight = Some(Flight {
            from: self.viewport,
            to: viewport,
            duration,
            elapsed: Duration::ZERO,
        });
    }

    fn destroy(&mut self) {
        self.markers.clear();
        self.flight = None;
    }

    fn advance(&mut self, elapsed: Duration) {
        let Some(flight) = self.flight.as_mut() else {
            return;
        };
        flight.elapsed += elapsed;
        let t = (flight.elapsed.as_secs_f64() / flight.duration.as_secs_f64()).min(1.0);
        self.viewport = flight.from.lerp(&flight.to, ease_in_out(t));
        if t >= 1.0 {
            self.viewport = flight.to;
            self.flight = None;
        }
    }
}

fn ease_in_out(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

fn to_color(color: MarkerColor) -> Color {
    Color::from_rgb8(color.r, color.g, color.b)
}

#[derive(Debug, Clone)]
pub struct TacticalCanvas {
    markers: Vec<PlacedMarker>,
    viewport: Viewport,
    selected: Option<String>,
}

impl TacticalCanvas {
    fn screen_position(&self, marker: &PlacedMarker, size: Size) -> Point {
        let (x, y) = self.viewport.project(
            marker.spec.position,
            f64::from(size.width),
            f64::from(size.height),
        );
        Point::new(x as f32, y as f32)
    }

    /// Incident under `position`, topmost marker first.
    fn hit_test(&self, position: Point, size: Size) -> Option<String> {
        self.markers
            .iter()
            .rev()
            .find(|marker| self.screen_position(marker, size).distance(position) <= RING_RADIUS)
            .map(|marker| marker.spec.incident_id.clone())
    }
}

impl canvas::Program<Message> for TacticalCanvas {
    type State = ();

    fn update(
        &self,
        _state: &mut Self::State,
        event: &canvas::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        match event {
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let position = cursor.position_in(bounds)?;
                let incident_id = self.hit_test(position, bounds.size())?;
                Some(canvas::Action::publish(Message::MarkerClicked(incident_id)).and_capture())
            }
            _ => None,
        }
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.06, 0.09, 0.16),
        );

        let grid = Path::new(|builder| {
            let mut x = 0.0;
            while x <= bounds.width {
                builder.move_to(Point::new(x, 0.0));
                builder.line_to(Point::new(x, bounds.height));
                x += GRID_SPACING;
            }
            let mut y = 0.0;
            while y <= bounds.height {
                builder.move_to(Point::new(0.0, y));
                builder.line_to(Point::new(bounds.width, y));
                y += GRID_SPACING;
            }
        });
        frame.stroke(
            &grid,
            Stroke::default()
                .with_color(Color::from_rgba(0.23, 0.51, 0.96, 0.08))
                .with_width(1.0),
        );

        for marker in &self.markers {
            let center = self.screen_position(marker, bounds.size());
            let color = to_color(marker.spec.color);

            let ring = Path::new(|builder| builder.circle(center, RING_RADIUS));
            frame.stroke(&ring, Stroke::default().with_color(color).with_width(2.0));

            let dot = Path::new(|builder| builder.circle(center, MARKER_RADIUS));
            frame.fill(&dot, color);

            if self.selected.as_deref() == Some(marker.spec.incident_id.as_str()) {
                let halo = Path::new(|builder| builder.circle(center, RING_RADIUS + 4.0));
                frame.stroke(&halo, Stroke::default().with_color(Color::WHITE).with_width(1.5));
            }
        }

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        match cursor.position_in(bounds) {
            Some(position) if self.hit_test(position, bounds.size()).is_some() => {
                mouse::Interaction::Pointer
            }
            _ => mouse::Interaction::default(),
        }
    }
}
