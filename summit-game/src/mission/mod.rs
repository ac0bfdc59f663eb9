//! Mission simulation: configuration, per-tick math, the tick clock and the
//! session that owns the lifecycle.

pub mod clock;
pub mod observer;
#[cfg(feature = "async")]
pub mod realtime;
pub mod session;
pub mod tick;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    BASE_DRAIN_PER_TICK, DOWNHILL_DRAIN_FLOOR, STAMINA_COST, STEP_DISTANCE, TICK_PERIOD_MS,
    UPHILL_DRAIN_FACTOR, WEIGHT_DIVISOR,
};
use crate::terrain::{ProfileViewport, SlopePolicy};

pub use clock::{TickClock, TickSchedule};
pub use observer::{StateObserver, SubscriptionId};
pub use session::{AdvanceSummary, MissionError, MissionSession};
pub use tick::{TickOutcome, TickStep, slope_multiplier, stamina_per_tick};

pub(crate) const DEFAULT_MISSION_DATA: &str = include_str!("../../assets/data/mission.json");

/// Where a mission's target height comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HeightSource {
    /// The level's configured `max_height`.
    #[default]
    Level,
    /// The loaded track's highest elevation, falling back to the level.
    Terrain,
}

/// Errors raised when mission configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum MissionConfigError {
    #[error("malformed mission config: {0}")]
    Json(String),
    #[error("tick period must be at least 1ms")]
    ZeroTickPeriod,
    #[error("{field} must be finite (got {value})")]
    NonFinite { field: &'static str, value: f64 },
    #[error("{field} must be greater than {min:.2} (got {value:.2})")]
    MinViolation {
        field: &'static str,
        min: f64,
        value: f64,
    },
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.2})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
}

/// Tunable mission parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionConfig {
    #[serde(default = "MissionConfig::default_tick_period_ms")]
    pub tick_period_ms: u64,
    #[serde(default = "MissionConfig::default_step_distance")]
    pub step_distance: f64,
    #[serde(default = "MissionConfig::default_base_drain")]
    pub base_drain: f64,
    #[serde(default = "MissionConfig::default_weight_divisor")]
    pub weight_divisor: f64,
    #[serde(default = "MissionConfig::default_uphill_factor")]
    pub uphill_factor: f64,
    #[serde(default = "MissionConfig::default_downhill_floor")]
    pub downhill_floor: f64,
    #[serde(default = "MissionConfig::default_stamina_cost")]
    pub stamina_cost: f64,
    #[serde(default)]
    pub slope_policy: SlopePolicy,
    #[serde(default)]
    pub height_source: HeightSource,
    #[serde(default)]
    pub viewport: ProfileViewport,
}

impl MissionConfig {
    const fn default_tick_period_ms() -> u64 {
        TICK_PERIOD_MS
    }

    const fn default_step_distance() -> f64 {
        STEP_DISTANCE
    }

    const fn default_base_drain() -> f64 {
        BASE_DRAIN_PER_TICK
    }

    const fn default_weight_divisor() -> f64 {
        WEIGHT_DIVISOR
    }

    const fn default_uphill_factor() -> f64 {
        UPHILL_DRAIN_FACTOR
    }

    const fn default_downhill_floor() -> f64 {
        DOWNHILL_DRAIN_FLOOR
    }

    const fn default_stamina_cost() -> f64 {
        STAMINA_COST
    }

    /// Parse and validate a mission config from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value is out of range.
    pub fn from_json(json: &str) -> Result<Self, MissionConfigError> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|e| MissionConfigError::Json(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Config bundled with the crate, or the compiled defaults if it fails to parse.
    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_MISSION_DATA).unwrap_or_default()
    }

    /// Check the invariants the tick math relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), MissionConfigError> {
        if self.tick_period_ms == 0 {
            return Err(MissionConfigError::ZeroTickPeriod);
        }
        let fields = [
            ("step_distance", self.step_distance),
            ("base_drain", self.base_drain),
            ("weight_divisor", self.weight_divisor),
            ("uphill_factor", self.uphill_factor),
            ("downhill_floor", self.downhill_floor),
            ("stamina_cost", self.stamina_cost),
            ("viewport.width", self.viewport.width),
            ("viewport.height", self.viewport.height),
            ("viewport.top_margin", self.viewport.top_margin),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(MissionConfigError::NonFinite { field, value });
            }
        }
        for (field, value) in [
            ("step_distance", self.step_distance),
            ("weight_divisor", self.weight_divisor),
            ("viewport.width", self.viewport.width),
            ("viewport.height", self.viewport.height),
        ] {
            if value <= 0.0 {
                return Err(MissionConfigError::MinViolation {
                    field,
                    min: 0.0,
                    value,
                });
            }
        }
        for (field, value) in [
            ("base_drain", self.base_drain),
            ("uphill_factor", self.uphill_factor),
            ("stamina_cost", self.stamina_cost),
        ] {
            if value < 0.0 {
                return Err(MissionConfigError::RangeViolation {
                    field,
                    min: 0.0,
                    max: f64::MAX,
                    value,
                });
            }
        }
        if !(0.0..=1.0).contains(&self.downhill_floor) {
            return Err(MissionConfigError::RangeViolation {
                field: "downhill_floor",
                min: 0.0,
                max: 1.0,
                value: self.downhill_floor,
            });
        }
        if !(0.0..self.viewport.height).contains(&self.viewport.top_margin) {
            return Err(MissionConfigError::RangeViolation {
                field: "viewport.top_margin",
                min: 0.0,
                max: self.viewport.height,
                value: self.viewport.top_margin,
            });
        }
        Ok(())
    }

    #[must_use]
    pub const fn with_slope_policy(mut self, policy: SlopePolicy) -> Self {
        self.slope_policy = policy;
        self
    }

    #[must_use]
    pub const fn with_height_source(mut self, source: HeightSource) -> Self {
        self.height_source = source;
        self
    }
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: Self::default_tick_period_ms(),
            step_distance: Self::default_step_distance(),
            base_drain: Self::default_base_drain(),
            weight_divisor: Self::default_weight_divisor(),
            uphill_factor: Self::default_uphill_factor(),
            downhill_floor: Self::default_downhill_floor(),
            stamina_cost: Self::default_stamina_cost(),
            slope_policy: SlopePolicy::default(),
            height_source: HeightSource::default(),
            viewport: ProfileViewport::default(),
        }
    }
}
