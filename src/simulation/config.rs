//! Tunables for map generation and stepping

use std::time::Duration;

use super::types::{SimError, SimResult};

/// Default map width in world units
pub const DEFAULT_WIDTH: i32 = 800;
/// Default map height in world units
pub const DEFAULT_HEIGHT: i32 = 600;
/// Largest per-axis distance a user moves in one step
pub const DEFAULT_MAX_MOVE: i32 = 5;
/// Chebyshev distance within which a station can serve a user
pub const DEFAULT_COVERAGE_RADIUS: i32 = 200;
/// Upper bound for a generated user's signal demand
pub const DEFAULT_MAX_SIGNAL_DEMAND: u32 = 10;
/// Pause between two simulation steps
pub const DEFAULT_STEP_INTERVAL: Duration = Duration::from_millis(50);

/// Configuration shared by the model, its maps and the stepping thread
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub width: i32,
    pub height: i32,
    /// Seed for reproducible placement and movement, entropy if unset
    pub seed: Option<u64>,
    pub max_move: i32,
    pub coverage_radius: i32,
    pub max_signal_demand: u32,
    pub step_interval: Duration,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            seed: None,
            max_move: DEFAULT_MAX_MOVE,
            coverage_radius: DEFAULT_COVERAGE_RADIUS,
            max_signal_demand: DEFAULT_MAX_SIGNAL_DEMAND,
            step_interval: DEFAULT_STEP_INTERVAL,
        }
    }
}

impl SimulationConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Reject settings a map cannot be stepped with
    pub fn validate(&self) -> SimResult<()> {
        let checks = [
            ("width", self.width),
            ("height", self.height),
            ("max_move", self.max_move),
        ];
        for (name, value) in checks {
            if value < 0 {
                return Err(SimError::InvalidArgument(format!(
                    "{} must not be negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
