//! Centralized balance and tuning constants for Summit game logic.
//!
//! These values define the deterministic math for the mission simulation.
//! `MissionConfig` reads its defaults from here, so bundled JSON only needs
//! to spell out the values it overrides.

// Tick cadence -------------------------------------------------------------
pub(crate) const TICK_PERIOD_MS: u64 = 100;
pub(crate) const STEP_DISTANCE: f64 = 0.5;

// Stamina drain ------------------------------------------------------------
pub(crate) const BASE_DRAIN_PER_TICK: f64 = 0.2;
pub(crate) const WEIGHT_DIVISOR: f64 = 100.0;
pub(crate) const UPHILL_DRAIN_FACTOR: f64 = 2.0;
pub(crate) const DOWNHILL_DRAIN_FLOOR: f64 = 0.5;

// Commerce -----------------------------------------------------------------
pub(crate) const STAMINA_COST: f64 = 5.0;
pub(crate) const STAMINA_PER_PURCHASE: f64 = 1.0;

// Player defaults ----------------------------------------------------------
pub(crate) const DEFAULT_MAX_STAMINA: f64 = 1000.0;
pub(crate) const DEFAULT_MONEY: f64 = 0.0;
pub(crate) const DEFAULT_MAX_LEVEL: u32 = 0;

// Terrain ------------------------------------------------------------------
/// Sample pairs closer than this (metres) report a flat slope when slopes are
/// normalized by horizontal distance.
pub(crate) const MIN_NORMALIZE_DISTANCE: f64 = 0.1;
pub(crate) const EARTH_RADIUS_M: f64 = 6_371_000.0;

// Elevation profile viewport -----------------------------------------------
pub(crate) const PROFILE_WIDTH: f64 = 400.0;
pub(crate) const PROFILE_HEIGHT: f64 = 200.0;
pub(crate) const PROFILE_TOP_MARGIN: f64 = 20.0;

// Logging keys -------------------------------------------------------------
pub(crate) const LOG_MISSION_START: &str = "log.mission.start";
pub(crate) const LOG_MISSION_RESTART: &str = "log.mission.restart";
pub(crate) const LOG_MISSION_STOP: &str = "log.mission.stop";
pub(crate) const LOG_TRACK_LOADED: &str = "log.track.loaded";
pub(crate) const LOG_TRACK_REJECTED: &str = "log.track.rejected";
