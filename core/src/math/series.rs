use serde::Serialize;

/// One plotted reading of a sensor trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub hours_ago: usize,
    pub value: f64,
}

/// Maps an oldest-first trend onto hourly chart points.
///
/// Input order is preserved; the newest reading is labeled `T-1h`.
pub fn trend_series(trend: &[f64]) -> Vec<ChartPoint> {
    let len = trend.len();
    trend
        .iter()
        .enumerate()
        .map(|(idx, &value)| {
            let hours_ago = len - idx;
            ChartPoint {
                label: format!("T-{hours_ago}h"),
                hours_ago,
                value,
            }
        })
        .collect()
}
