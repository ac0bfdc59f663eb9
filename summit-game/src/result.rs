//! Mission settlement results
use serde::{Deserialize, Serialize};

use crate::data::LevelProperties;
use crate::numbers::half_floor;

/// How a mission ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionOutcome {
    /// Target height reached
    Summited,
    /// Stamina ran out before the top
    Exhausted,
    /// Stopped by the player with stamina left
    Retreated,
}

impl MissionOutcome {
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Summited)
    }

    /// Classify a mission from its final height and stamina.
    #[must_use]
    pub fn classify(height: f64, max_height: f64, stamina: f64) -> Self {
        if height >= max_height {
            Self::Summited
        } else if stamina <= 0.0 {
            Self::Exhausted
        } else {
            Self::Retreated
        }
    }
}

impl std::fmt::Display for MissionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Summited => write!(f, "summited"),
            Self::Exhausted => write!(f, "exhausted"),
            Self::Retreated => write!(f, "retreated"),
        }
    }
}

/// Rewards a level grants for an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardGrant {
    pub money: f64,
    pub stamina: f64,
    /// Level index unlocked by this outcome, if any.
    pub unlocks: Option<u32>,
}

impl RewardGrant {
    /// Full rewards on success; half the stamina reward (floored) otherwise.
    #[must_use]
    pub fn for_outcome(level: &LevelProperties, outcome: MissionOutcome) -> Self {
        if outcome.is_success() {
            Self {
                money: level.reward_money.max(0.0),
                stamina: level.reward_stamina.max(0.0),
                unlocks: Some(level.required_level.saturating_add(1)),
            }
        } else {
            Self {
                money: 0.0,
                stamina: half_floor(level.reward_stamina),
                unlocks: None,
            }
        }
    }
}

/// Summary of a settled mission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionReport {
    pub level_name: String,
    pub outcome: MissionOutcome,
    pub ticks: u64,
    pub height_reached: f64,
    pub target_height: f64,
    pub stamina_left: f64,
    pub money_granted: f64,
    pub stamina_granted: f64,
    pub max_level: u32,
}

impl MissionReport {
    #[must_use]
    pub const fn completed(&self) -> bool {
        self.outcome.is_success()
    }
}
