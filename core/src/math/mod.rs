pub mod projection;
pub mod series;
pub mod stats;

pub use projection::{Viewport, WebMercator};
pub use series::{trend_series, ChartPoint};
pub use stats::StatsHelper;
