use serde::{Deserialize, Serialize};

use crate::data::LevelProperties;
use crate::numbers::clamp_finite;

/// Snapshot of the mission in progress. Replaced wholesale on every update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub is_on_mission: bool,
    pub height: f64,
    pub max_height: f64,
    pub current_stamina: f64,
    pub current_slope: f64,
    pub level: LevelProperties,
}

impl GameState {
    /// Idle state parked on `level` with a full stamina bar.
    #[must_use]
    pub fn idle(level: LevelProperties, stamina: f64) -> Self {
        Self {
            is_on_mission: false,
            height: 0.0,
            max_height: 0.0,
            current_stamina: stamina.max(0.0),
            current_slope: 0.0,
            level,
        }
    }

    /// Fraction of the climb completed, in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.max_height <= 0.0 {
            return 0.0;
        }
        clamp_finite(self.height / self.max_height, 0.0, 1.0)
    }

    #[must_use]
    pub fn reached_summit(&self) -> bool {
        self.height >= self.max_height
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::idle(
            LevelProperties {
                name: String::new(),
                max_height: 0.0,
                reward_money: 0.0,
                reward_stamina: 0.0,
                required_level: 0,
                required_item_ids: None,
            },
            0.0,
        )
    }
}
