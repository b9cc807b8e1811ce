use crate::Message;
use iced::{
    mouse,
    widget::canvas::{self, Frame, Geometry, Path, Stroke},
    Color, Point, Rectangle, Renderer, Theme,
};
use sentinelcore::math::{ChartPoint, StatsHelper};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartStyle {
    Area,
    Line,
}

/// Sensor trend plotted oldest to newest, left to right.
#[derive(Clone)]
pub struct TrendChart {
    pub points: Vec<ChartPoint>,
    pub color: Color,
    pub style: ChartStyle,
}

impl TrendChart {
    fn positions(&self, bounds: Rectangle) -> Vec<Point> {
        let values: Vec<f64> = self.points.iter().map(|p| p.value).collect();
        let Some((min, max)) = StatsHelper::bounds(&values) else {
            return Vec::new();
        };
        let range = (max - min).max(f64::EPSILON);
        let step = if self.points.len() > 1 {
            bounds.width / (self.points.len() as f32 - 1.0)
        } else {
            0.0
        };
        let padding = 8.0;
        let usable = bounds.height - 2.0 * padding;
        values
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let normalized = ((value - min) / range) as f32;
                Point::new(i as f32 * step, bounds.height - padding - normalized * usable)
            })
            .collect()
    }
}

impl canvas::Program<Message> for TrendChart {
    type State = ();

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

        let positions = self.positions(bounds);
        if positions.len() > 1 {
            let line = Path::new(|builder| {
                for (i, point) in positions.iter().enumerate() {
                    if i == 0 {
                        builder.move_to(*point);
                    } else {
                        builder.line_to(*point);
                    }
                }
            });

            if self.style == ChartStyle::Area {
                let area = Path::new(|builder| {
                    builder.move_to(Point::new(positions[0].x, bounds.height));
                    for point in &positions {
                        builder.line_to(*point);
                    }
                    builder.line_to(Point::new(positions[positions.len() - 1].x, bounds.height));
                    builder.close();
                });
                frame.fill(&area, Color { a: 0.25, ..self.color });
            }

            frame.stroke(
                &line,
                Stroke::default().with_width(2.5).with_color(self.color),
            );
        }

        if self.style == ChartStyle::Line {
            for point in &positions {
                let dot = Path::new(|builder| builder.circle(*point, 4.0));
                frame.fill(&dot, self.color);
            }
        }

        vec![frame.into_geometry()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iced::Size;
    use sentinelcore::math::trend_series;

    #[test]
    fn rising_trend_plots_left_to_right_upwards() {
        let chart = TrendChart {
            points: trend_series(&[4.2, 4.5, 5.1, 6.8, 7.9, 8.2, 8.5]),
            color: Color::WHITE,
            style: ChartStyle::Area,
        };
        let bounds = Rectangle::new(Point::ORIGIN, Size::new(600.0, 200.0));
        let positions = chart.positions(bounds);
        assert_eq!(positions.len(), 7);
        assert!(positions.windows(2).all(|w| w[0].x < w[1].x && w[0].y > w[1].y));
    }

    #[test]
    fn flat_trend_does_not_divide_by_zero() {
        let chart = TrendChart {
            points: trend_series(&[3.0, 3.0]),
            color: Color::WHITE,
            style: ChartStyle::Line,
        };
        let bounds = Rectangle::new(Point::ORIGIN, Size::new(100.0, 100.0));
        assert!(chart.positions(bounds).iter().all(|p| p.y.is_finite()));
    }
}
