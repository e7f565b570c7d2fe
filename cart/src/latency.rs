use std::time::Duration;

/// Inclusive millisecond range for an artificial delay. `0..=0` disables it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LatencyWindow {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl LatencyWindow {
    pub const NONE: Self = Self { min_ms: 0, max_ms: 0 };

    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms: min_ms.max(max_ms),
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.max_ms == 0
    }

    pub fn sample(&self) -> Duration {
        if self.is_disabled() {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::random_range(self.min_ms..=self.max_ms))
    }

    pub async fn pause(&self) {
        if !self.is_disabled() {
            tokio::time::sleep(self.sample()).await;
        }
    }
}

/// Load-shaping delays applied to the read paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimulatedLatency {
    pub fetch: LatencyWindow,
    pub add_item: LatencyWindow,
}

impl SimulatedLatency {
    pub fn realistic() -> Self {
        Self {
            fetch: LatencyWindow::new(20, 70),
            add_item: LatencyWindow::new(50, 150),
        }
    }

    pub fn disabled() -> Self {
        Self {
            fetch: LatencyWindow::NONE,
            add_item: LatencyWindow::NONE,
        }
    }
}
