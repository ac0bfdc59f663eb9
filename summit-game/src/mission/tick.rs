//! Per-tick mission math.
//!
//! A tick advances the climber one fixed step, samples the slope at the new
//! height, drains stamina scaled by carried weight and slope, and reports
//! whether the mission has reached a terminal condition.

use serde::{Deserialize, Serialize};

use super::MissionConfig;
use crate::numbers::clamp_finite;
use crate::player::PlayerStats;
use crate::state::GameState;
use crate::terrain::ElevationModel;

/// Values computed for a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickStep {
    pub height: f64,
    pub slope: f64,
    pub stamina_drain: f64,
    pub stamina: f64,
}

impl TickStep {
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.stamina <= 0.0
    }
}

/// What happened when the session was asked to tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TickOutcome {
    /// No mission is running; nothing changed.
    Idle,
    /// The climb continues.
    Climbing(TickStep),
    /// This tick ended the mission; the report describes the settlement.
    Finished(TickStep, crate::result::MissionReport),
}

impl TickOutcome {
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self, Self::Finished(..))
    }

    #[must_use]
    pub const fn step(&self) -> Option<&TickStep> {
        match self {
            Self::Idle => None,
            Self::Climbing(step) | Self::Finished(step, _) => Some(step),
        }
    }
}

/// Drain multiplier for a slope: uphill costs more, downhill less (floored).
#[must_use]
pub fn slope_multiplier(slope: f64, cfg: &MissionConfig) -> f64 {
    if slope > 0.0 {
        cfg.uphill_factor.mul_add(slope, 1.0)
    } else if slope < 0.0 {
        (1.0 + slope).max(cfg.downhill_floor)
    } else {
        1.0
    }
}

/// Flat-ground drain for the weight the player carries.
#[must_use]
pub fn base_consumption(player: &PlayerStats, cfg: &MissionConfig) -> f64 {
    cfg.base_drain * (1.0 + player.total_weight() / cfg.weight_divisor)
}

/// Stamina spent on a tick at `slope`.
#[must_use]
pub fn stamina_per_tick(player: &PlayerStats, slope: f64, cfg: &MissionConfig) -> f64 {
    let drain = base_consumption(player, cfg) * slope_multiplier(slope, cfg);
    if drain.is_finite() { drain.max(0.0) } else { 0.0 }
}

/// Distance the player covers per tick with their current shoes.
#[must_use]
pub fn step_distance(player: &PlayerStats, cfg: &MissionConfig) -> f64 {
    let multiplier = player.shoes.speed_multiplier;
    if multiplier.is_finite() && multiplier > 0.0 {
        cfg.step_distance * multiplier
    } else {
        cfg.step_distance
    }
}

/// Compute the next tick from the current state without mutating anything.
#[must_use]
pub fn compute_step(
    state: &GameState,
    player: &PlayerStats,
    terrain: &ElevationModel,
    cfg: &MissionConfig,
) -> TickStep {
    let height = (state.height + step_distance(player, cfg)).max(0.0);
    let slope = terrain.slope_at(height);
    let stamina_drain = stamina_per_tick(player, slope, cfg);
    let stamina = clamp_finite(
        state.current_stamina - stamina_drain,
        0.0,
        player.max_stamina.max(0.0),
    );
    TickStep {
        height,
        slope,
        stamina_drain,
        stamina,
    }
}

/// Whether `step` ends a mission whose target is `max_height`.
#[must_use]
pub fn is_terminal(step: &TickStep, max_height: f64) -> bool {
    step.is_exhausted() || step.height >= max_height
}
