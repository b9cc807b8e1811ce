use std::sync::Mutex;

/// Gateway operation a counter belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    RiskSummary,
    IdentityExtraction,
}

/// Point-in-time copy of the gateway counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GatewayStats {
    pub summary_requests: usize,
    pub summary_failures: usize,
    pub extraction_requests: usize,
    pub extraction_failures: usize,
}

impl GatewayStats {
    pub fn total_requests(&self) -> usize {
        self.summary_requests + self.extraction_requests
    }
}

pub struct MetricsRecorder {
    inner: Mutex<GatewayStats>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(GatewayStats::default()),
        }
    }

    /// Counts one outbound request.
    pub fn record_request(&self, operation: Operation) {
        if let Ok(mut stats) = self.inner.lock() {
            match operation {
                Operation::RiskSummary => stats.summary_requests += 1,
                Operation::IdentityExtraction => stats.extraction_requests += 1,
            }
        }
    }

    pub fn record_failure(&self, operation: Operation) {
        if let Ok(mut stats) = self.inner.lock() {
            match operation {
                Operation::RiskSummary => stats.summary_failures += 1,
                Operation::IdentityExtraction => stats.extraction_failures += 1,
            }
        }
    }

    pub fn snapshot(&self) -> GatewayStats {
        self.inner.lock().map(|stats| *stats).unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_kept_per_operation() {
        let metrics = MetricsRecorder::new();
        metrics.record_request(Operation::RiskSummary);
        metrics.record_request(Operation::IdentityExtraction);
        metrics.record_failure(Operation::IdentityExtraction);

        let stats = metrics.snapshot();
        assert_eq!(stats.summary_requests, 1);
        assert_eq!(stats.summary_failures, 0);
        assert_eq!(stats.extraction_failures, 1);
        assert_eq!(stats.total_requests(), 2);
    }
}
