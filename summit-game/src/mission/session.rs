use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::clock::{TickClock, TickSchedule};
use super::observer::{ObserverRegistry, StateObserver, SubscriptionId};
use super::tick::{self, TickOutcome};
use super::{HeightSource, MissionConfig, MissionConfigError};
use crate::constants::{LOG_MISSION_RESTART, LOG_MISSION_START, LOG_MISSION_STOP};
use crate::data::{Catalog, Item, LevelProperties};
use crate::numbers::clamp_finite;
use crate::player::{PlayerStats, PurchaseOutcome};
use crate::result::{MissionOutcome, MissionReport, RewardGrant};
use crate::state::GameState;
use crate::terrain::{ElevationModel, ParseError, ProfilePath, SlopePolicy, TrackSample};

/// Reasons a gated mission start is refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MissionError {
    #[error("{level} requires level {required} (unlocked: {unlocked})")]
    LevelLocked {
        level: String,
        required: u32,
        unlocked: u32,
    },
    #[error("{level} requires items not carried: {}", .items.join(", "))]
    MissingItems { level: String, items: Vec<String> },
    #[error("a mission on {0} is already in progress")]
    MissionInProgress(String),
}

/// Ticks run by one `advance` call and the settlement, if the mission ended.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdvanceSummary {
    pub ticks_run: u64,
    pub report: Option<MissionReport>,
}

impl AdvanceSummary {
    #[must_use]
    pub const fn finished(&self) -> bool {
        self.report.is_some()
    }
}

/// Owns the mission lifecycle: the elevation model, the ephemeral game state,
/// persistent player stats and the single live tick schedule.
#[derive(Debug)]
pub struct MissionSession {
    config: MissionConfig,
    terrain: ElevationModel,
    state: GameState,
    player: PlayerStats,
    observers: ObserverRegistry,
    clock: TickClock,
    schedule: TickSchedule,
    ticks: u64,
}

impl MissionSession {
    /// Construct an idle session for `player`.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(config: MissionConfig, player: PlayerStats) -> Result<Self, MissionConfigError> {
        config.validate()?;
        let state = GameState {
            current_stamina: player.max_stamina.max(0.0),
            ..GameState::default()
        };
        Ok(Self {
            terrain: ElevationModel::new(config.slope_policy),
            clock: TickClock::new(config.tick_period_ms),
            config,
            state,
            player,
            observers: ObserverRegistry::default(),
            schedule: TickSchedule::default(),
            ticks: 0,
        })
    }

    /// Fresh player from the catalog defaults, parked on the first level.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn from_catalog(
        config: MissionConfig,
        catalog: &Catalog,
    ) -> Result<Self, MissionConfigError> {
        let mut session = Self::new(config, PlayerStats::from_catalog(catalog))?;
        if let Some(level) = catalog.levels.first() {
            session.state.level = level.clone();
        }
        Ok(session)
    }

    #[must_use]
    pub const fn config(&self) -> &MissionConfig {
        &self.config
    }

    #[must_use]
    pub const fn game_state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub const fn player_stats(&self) -> &PlayerStats {
        &self.player
    }

    #[must_use]
    pub const fn terrain(&self) -> &ElevationModel {
        &self.terrain
    }

    #[must_use]
    pub const fn is_on_mission(&self) -> bool {
        self.state.is_on_mission
    }

    /// Ticks run since the current (or last) mission started.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    #[must_use]
    pub const fn schedule(&self) -> TickSchedule {
        self.schedule
    }

    /// Consume the session, keeping only the persistent player stats.
    #[must_use]
    pub fn into_player_stats(self) -> PlayerStats {
        self.player
    }

    pub fn subscribe(&mut self, observer: Box<dyn StateObserver>) -> SubscriptionId {
        self.observers.subscribe(observer)
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.observers.len()
    }

    #[must_use]
    pub fn elevation_profile(&self) -> ProfilePath {
        self.terrain.elevation_profile(self.config.viewport)
    }

    /// Replace the elevation track.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NoPoints`] for an empty track; the model is
    /// cleared and observers are notified.
    pub fn load_track(&mut self, samples: &[TrackSample]) -> Result<(), ParseError> {
        let result = self.terrain.load(samples);
        self.publish_track_result(&result);
        result
    }

    /// Parse GPX content and replace the elevation track with it.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] for unusable GPX; the model is cleared and
    /// observers are notified.
    pub fn load_gpx(&mut self, content: &[u8]) -> Result<(), ParseError> {
        let result = self.terrain.load_gpx(content);
        self.publish_track_result(&result);
        result
    }

    fn publish_track_result(&mut self, result: &Result<(), ParseError>) {
        match result {
            Ok(()) => {
                let profile = self.elevation_profile();
                self.observers.profile(&profile);
            }
            Err(err) => self.observers.track_error(err),
        }
    }

    pub fn set_slope_policy(&mut self, policy: SlopePolicy) {
        self.config.slope_policy = policy;
        self.terrain.set_policy(policy);
    }

    /// Whether `level` can be started right now.
    #[must_use]
    pub fn is_level_available(&self, level: &LevelProperties) -> bool {
        !self.state.is_on_mission
            && self.player.has_unlocked(level)
            && self.player.missing_items(level).is_empty()
    }

    /// Start a mission only if the player meets the level's requirements.
    ///
    /// # Errors
    ///
    /// Returns a [`MissionError`] when a mission is running, the level is
    /// locked, or a required item is neither equipped nor in the inventory.
    pub fn try_start_mission(&mut self, level: &LevelProperties) -> Result<u64, MissionError> {
        if self.state.is_on_mission {
            return Err(MissionError::MissionInProgress(self.state.level.name.clone()));
        }
        if !self.player.has_unlocked(level) {
            return Err(MissionError::LevelLocked {
                level: level.name.clone(),
                required: level.required_level,
                unlocked: self.player.max_level,
            });
        }
        let missing = self.player.missing_items(level);
        if !missing.is_empty() {
            return Err(MissionError::MissingItems {
                level: level.name.clone(),
                items: missing,
            });
        }
        Ok(self.start_mission(level))
    }

    /// Start a mission on `level`, cancelling any mission in progress without
    /// settling it. Returns the new schedule generation.
    pub fn start_mission(&mut self, level: &LevelProperties) -> u64 {
        if let Some(previous) = self.schedule.cancel() {
            log::info!(
                "{LOG_MISSION_RESTART}: cancelled schedule {previous} on {}",
                self.state.level.name
            );
        }

        let max_height = self.target_height(level);
        self.state = GameState {
            is_on_mission: true,
            height: 0.0,
            max_height,
            current_stamina: clamp_finite(
                self.state.current_stamina,
                0.0,
                self.player.max_stamina.max(0.0),
            ),
            current_slope: 0.0,
            level: level.clone(),
        };
        self.ticks = 0;
        self.clock.reset();
        let generation = self.schedule.start();
        log::info!(
            "{LOG_MISSION_START}: {} target {:.1} stamina {:.1} (schedule {generation})",
            level.name,
            max_height,
            self.state.current_stamina
        );
        self.observers.game_state(&self.state);
        generation
    }

    fn target_height(&self, level: &LevelProperties) -> f64 {
        let terrain_height = self.terrain.max_height();
        let height = match self.config.height_source {
            HeightSource::Terrain if !self.terrain.is_empty() && terrain_height > 0.0 => {
                terrain_height
            }
            HeightSource::Level | HeightSource::Terrain => level.max_height,
        };
        if height.is_finite() { height.max(0.0) } else { 0.0 }
    }

    /// End the mission in progress and settle its rewards.
    ///
    /// Returns `None` from idle, leaving everything untouched.
    pub fn stop_mission(&mut self) -> Option<MissionReport> {
        if !self.state.is_on_mission {
            return None;
        }
        self.schedule.cancel();
        self.clock.reset();

        let outcome = MissionOutcome::classify(
            self.state.height,
            self.state.max_height,
            self.state.current_stamina,
        );
        let grant = RewardGrant::for_outcome(&self.state.level, outcome);
        self.player.max_stamina += grant.stamina;
        self.player.money += grant.money;
        if let Some(unlocked) = grant.unlocks {
            self.player.max_level = self.player.max_level.max(unlocked);
        }

        let report = MissionReport {
            level_name: self.state.level.name.clone(),
            outcome,
            ticks: self.ticks,
            height_reached: self.state.height,
            target_height: self.state.max_height,
            stamina_left: self.state.current_stamina,
            money_granted: grant.money,
            stamina_granted: grant.stamina,
            max_level: self.player.max_level,
        };

        self.state = GameState {
            is_on_mission: false,
            height: 0.0,
            max_height: 0.0,
            current_stamina: self.player.max_stamina.max(0.0),
            ..self.state.clone()
        };
        log::info!(
            "{LOG_MISSION_STOP}: {} {outcome} after {} ticks (+{:.0} money, +{:.0} stamina)",
            report.level_name,
            report.ticks,
            report.money_granted,
            report.stamina_granted
        );
        self.observers.game_state(&self.state);
        self.observers.player_stats(&self.player);
        Some(report)
    }

    /// Run one tick of the live schedule.
    pub fn tick(&mut self) -> TickOutcome {
        match self.schedule.live() {
            Some(generation) => self.tick_generation(generation),
            None => TickOutcome::Idle,
        }
    }

    /// Run one tick on behalf of schedule `generation`. Ticks from a
    /// cancelled or superseded generation do nothing.
    pub fn tick_generation(&mut self, generation: u64) -> TickOutcome {
        if !self.state.is_on_mission || !self.schedule.accepts(generation) {
            return TickOutcome::Idle;
        }

        let step = tick::compute_step(&self.state, &self.player, &self.terrain, &self.config);
        self.state = GameState {
            height: step.height,
            current_slope: step.slope,
            current_stamina: step.stamina,
            ..self.state.clone()
        };
        self.ticks += 1;
        log::trace!(
            "tick {}: height {:.2} slope {:.3} stamina {:.3}",
            self.ticks,
            step.height,
            step.slope,
            step.stamina
        );
        self.observers.game_state(&self.state);

        if tick::is_terminal(&step, self.state.max_height) {
            if let Some(report) = self.stop_mission() {
                return TickOutcome::Finished(step, report);
            }
        }
        TickOutcome::Climbing(step)
    }

    /// Feed elapsed wall time to the tick clock and run every due tick,
    /// stopping early when the mission ends. Idle sessions ignore time.
    pub fn advance(&mut self, elapsed: Duration) -> AdvanceSummary {
        let mut summary = AdvanceSummary::default();
        if !self.state.is_on_mission {
            return summary;
        }
        let due = self.clock.advance(elapsed);
        for _ in 0..due {
            match self.tick() {
                TickOutcome::Idle => break,
                TickOutcome::Climbing(_) => summary.ticks_run += 1,
                TickOutcome::Finished(_, report) => {
                    summary.ticks_run += 1;
                    summary.report = Some(report);
                    break;
                }
            }
        }
        summary
    }

    /// Trade money for one point of stamina cap; the current bar grows too.
    pub fn purchase_stamina(&mut self) -> PurchaseOutcome {
        let outcome = self.player.purchase_stamina(self.config.stamina_cost);
        if outcome.is_purchased() {
            self.state = GameState {
                current_stamina: clamp_finite(
                    self.state.current_stamina + crate::constants::STAMINA_PER_PURCHASE,
                    0.0,
                    self.player.max_stamina,
                ),
                ..self.state.clone()
            };
            self.observers.game_state(&self.state);
            self.observers.player_stats(&self.player);
        }
        outcome
    }

    pub fn purchase_item(&mut self, item: &Item) -> PurchaseOutcome {
        let outcome = self.player.purchase_item(item);
        if outcome.is_purchased() {
            self.observers.player_stats(&self.player);
        }
        outcome
    }

    pub fn equip_item(&mut self, item_id: &str) -> bool {
        let moved = self.player.equip_item(item_id);
        if moved {
            self.observers.player_stats(&self.player);
        }
        moved
    }

    pub fn unequip_item(&mut self, item_id: &str) -> bool {
        let moved = self.player.unequip_item(item_id);
        if moved {
            self.observers.player_stats(&self.player);
        }
        moved
    }

    /// Stamina a tick at `slope` would cost with the current gear.
    #[must_use]
    pub fn stamina_per_tick_preview(&self, slope: f64) -> f64 {
        tick::stamina_per_tick(&self.player, slope, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn ridge() -> LevelProperties {
        LevelProperties {
            name: "Rattlesnake Ridge".to_string(),
            max_height: 50.0,
            reward_money: 10.0,
            reward_stamina: 5.0,
            required_level: 0,
            required_item_ids: None,
        }
    }

    fn session() -> MissionSession {
        MissionSession::new(MissionConfig::default(), PlayerStats::default()).unwrap()
    }

    #[derive(Default)]
    struct Recorded {
        states: Vec<GameState>,
        stats: Vec<PlayerStats>,
        profiles: Vec<ProfilePath>,
        errors: Vec<ParseError>,
    }

    struct Recorder(Arc<Mutex<Recorded>>);

    impl StateObserver for Recorder {
        fn on_game_state(&mut self, state: &GameState) {
            self.0.lock().unwrap().states.push(state.clone());
        }

        fn on_player_stats(&mut self, stats: &PlayerStats) {
            self.0.lock().unwrap().stats.push(stats.clone());
        }

        fn on_profile(&mut self, profile: &ProfilePath) {
            self.0.lock().unwrap().profiles.push(profile.clone());
        }

        fn on_track_error(&mut self, error: &ParseError) {
            self.0.lock().unwrap().errors.push(error.clone());
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = MissionConfig {
            tick_period_ms: 0,
            ..MissionConfig::default()
        };
        assert!(MissionSession::new(config, PlayerStats::default()).is_err());
    }

    #[test]
    fn start_resets_progress() {
        let mut session = session();
        session.start_mission(&ridge());
        let state = session.game_state();
        assert!(state.is_on_mission);
        assert!((state.height - 0.0).abs() < f64::EPSILON);
        assert!((state.max_height - 50.0).abs() < f64::EPSILON);
        assert!((state.current_stamina - 1000.0).abs() < f64::EPSILON);
        assert_eq!(state.level.name, "Rattlesnake Ridge");
    }

    #[test]
    fn restart_cancels_previous_schedule_without_rewards() {
        let mut session = session();
        let first = session.start_mission(&ridge());
        for _ in 0..10 {
            session.tick();
        }
        let second = session.start_mission(&ridge());
        assert_ne!(first, second);
        assert!((session.game_state().height - 0.0).abs() < f64::EPSILON);
        assert_eq!(session.ticks(), 0);
        assert!((session.player_stats().money - 0.0).abs() < f64::EPSILON);
        assert!((session.player_stats().max_stamina - 1000.0).abs() < f64::EPSILON);

        assert!(matches!(session.tick_generation(first), TickOutcome::Idle));
        assert!((session.game_state().height - 0.0).abs() < f64::EPSILON);
        assert!(matches!(
            session.tick_generation(second),
            TickOutcome::Climbing(_)
        ));
        assert_eq!(session.ticks(), 1);
    }

    #[test]
    fn summit_settles_full_rewards() {
        let mut session = session();
        session.start_mission(&ridge());
        let report = loop {
            match session.tick() {
                TickOutcome::Finished(_, report) => break report,
                TickOutcome::Climbing(_) => {}
                TickOutcome::Idle => panic!("mission stopped without a report"),
            }
        };
        assert_eq!(report.outcome, MissionOutcome::Summited);
        assert_eq!(report.ticks, 100);
        let stats = session.player_stats();
        assert!((stats.money - 10.0).abs() < f64::EPSILON);
        assert!((stats.max_stamina - 1005.0).abs() < f64::EPSILON);
        assert_eq!(stats.max_level, 1);
        let state = session.game_state();
        assert!(!state.is_on_mission);
        assert!((state.current_stamina - 1005.0).abs() < f64::EPSILON);
        assert!(matches!(session.tick(), TickOutcome::Idle));
    }

    #[test]
    fn exhaustion_grants_half_stamina() {
        let mut player = PlayerStats::default();
        player.max_stamina = 1.0;
        let mut session = MissionSession::new(MissionConfig::default(), player).unwrap();
        session.start_mission(&ridge());
        let summary = session.advance(Duration::from_secs(60));
        let report = summary.report.unwrap();
        assert_eq!(report.outcome, MissionOutcome::Exhausted);
        assert!(summary.ticks_run < 100);
        assert!((session.player_stats().max_stamina - 3.0).abs() < f64::EPSILON);
        assert!((session.player_stats().money - 0.0).abs() < f64::EPSILON);
        assert_eq!(session.player_stats().max_level, 0);
    }

    #[test]
    fn manual_stop_is_a_retreat_and_idempotent() {
        let mut session = session();
        session.start_mission(&ridge());
        session.tick();
        let report = session.stop_mission().unwrap();
        assert_eq!(report.outcome, MissionOutcome::Retreated);
        let after_first = session.player_stats().clone();
        assert!(session.stop_mission().is_none());
        assert_eq!(session.player_stats(), &after_first);
        assert!((after_first.max_stamina - 1002.0).abs() < f64::EPSILON);
    }

    #[test]
    fn advance_accumulates_partial_ticks() {
        let mut session = session();
        session.start_mission(&ridge());
        assert_eq!(session.advance(Duration::from_millis(150)).ticks_run, 1);
        assert_eq!(session.advance(Duration::from_millis(50)).ticks_run, 1);
        assert_eq!(session.ticks(), 2);
    }

    #[test]
    fn idle_sessions_ignore_time() {
        let mut session = session();
        assert_eq!(session.advance(Duration::from_secs(5)), AdvanceSummary::default());
    }

    #[test]
    fn gated_start_checks_level_and_items() {
        let mut session = session();
        let mut locked = ridge();
        locked.required_level = 2;
        assert!(matches!(
            session.try_start_mission(&locked),
            Err(MissionError::LevelLocked { required: 2, .. })
        ));
        assert!(!session.is_level_available(&locked));

        let mut gated = ridge();
        gated.required_item_ids = Some(vec!["gps_0".to_string()]);
        assert_eq!(
            session.try_start_mission(&gated),
            Err(MissionError::MissingItems {
                level: "Rattlesnake Ridge".to_string(),
                items: vec!["gps_0".to_string()],
            })
        );

        assert!(session.try_start_mission(&ridge()).is_ok());
        assert!(!session.is_level_available(&ridge()));
        assert!(matches!(
            session.try_start_mission(&ridge()),
            Err(MissionError::MissionInProgress(_))
        ));
    }

    #[test]
    fn stamina_purchase_grows_current_bar() {
        let mut player = PlayerStats::default();
        player.money = 7.0;
        let mut session = MissionSession::new(MissionConfig::default(), player).unwrap();
        assert_eq!(session.purchase_stamina(), PurchaseOutcome::Purchased);
        assert!((session.player_stats().max_stamina - 1001.0).abs() < f64::EPSILON);
        assert!((session.game_state().current_stamina - 1001.0).abs() < f64::EPSILON);
        assert_eq!(session.purchase_stamina(), PurchaseOutcome::InsufficientFunds);
        assert!((session.player_stats().money - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn observers_receive_publications() {
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let mut session = session();
        let id = session.subscribe(Box::new(Recorder(Arc::clone(&recorded))));

        session
            .load_track(&[TrackSample::new(0.0, 100.0), TrackSample::new(1.0, 110.0)])
            .unwrap();
        assert_eq!(session.load_track(&[]), Err(ParseError::NoPoints));
        session.start_mission(&ridge());
        session.tick();
        session.stop_mission();

        {
            let recorded = recorded.lock().unwrap();
            assert_eq!(recorded.profiles.len(), 1);
            assert_eq!(recorded.errors, vec![ParseError::NoPoints]);
            // start, tick, stop
            assert_eq!(recorded.states.len(), 3);
            assert_eq!(recorded.stats.len(), 1);
        }

        assert!(session.unsubscribe(id));
        assert_eq!(session.subscriber_count(), 0);
        session.start_mission(&ridge());
        assert_eq!(recorded.lock().unwrap().states.len(), 3);
    }

    #[test]
    fn terrain_height_source_uses_track_peak() {
        let config = MissionConfig::default().with_height_source(HeightSource::Terrain);
        let mut session = MissionSession::new(config, PlayerStats::default()).unwrap();
        session.start_mission(&ridge());
        assert!((session.game_state().max_height - 50.0).abs() < f64::EPSILON);
        session.stop_mission();

        session
            .load_track(&[TrackSample::new(0.0, 10.0), TrackSample::new(5.0, 20.0)])
            .unwrap();
        session.start_mission(&ridge());
        assert!((session.game_state().max_height - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn preview_matches_tick_drain() {
        let session = session();
        assert!((session.stamina_per_tick_preview(0.0) - 0.204).abs() < 1e-9);
    }
}
