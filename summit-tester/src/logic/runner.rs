use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::Serialize;
use summit_game::mission::realtime::run_mission_loop;
use summit_game::{
    Catalog, LevelProperties, MissionConfig, MissionOutcome, MissionReport, MissionSession,
    PlayerStats, PurchaseOutcome,
};
use tokio::sync::watch;

use super::terrain::LoadedTrack;
use crate::util::duration_ms;

/// How missions are paced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Feed the whole tick budget to the session clock at once.
    Instant,
    /// Tick on a tokio interval at the configured period.
    Realtime,
}

#[derive(Debug, Clone)]
pub struct RunSettings {
    pub config: MissionConfig,
    pub max_ticks: u64,
    pub attempts: u32,
    pub pacing: Pacing,
    pub verbose: bool,
}

/// One attempt at one level.
#[derive(Debug, Clone, Serialize)]
pub struct MissionRecord {
    pub level: String,
    pub attempt: u32,
    pub outcome: Option<MissionOutcome>,
    pub ticks: u64,
    pub height_reached: f64,
    pub target_height: f64,
    pub stamina_left: f64,
    pub money_granted: f64,
    pub stamina_granted: f64,
    pub money_after: f64,
    pub max_stamina_after: f64,
    pub max_level_after: u32,
    pub timed_out: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
}

impl MissionRecord {
    fn settled(
        attempt: u32,
        report: &MissionReport,
        stats: &PlayerStats,
        timed_out: bool,
        elapsed: Duration,
    ) -> Self {
        Self {
            level: report.level_name.clone(),
            attempt,
            outcome: Some(report.outcome),
            ticks: report.ticks,
            height_reached: report.height_reached,
            target_height: report.target_height,
            stamina_left: report.stamina_left,
            money_granted: report.money_granted,
            stamina_granted: report.stamina_granted,
            money_after: stats.money,
            max_stamina_after: stats.max_stamina,
            max_level_after: stats.max_level,
            timed_out,
            duration_ms: duration_ms(elapsed),
            error: None,
        }
    }

    fn refused(level: &LevelProperties, attempt: u32, stats: &PlayerStats, error: String) -> Self {
        Self {
            level: level.name.clone(),
            attempt,
            outcome: None,
            ticks: 0,
            height_reached: 0.0,
            target_height: level.max_height,
            stamina_left: stats.max_stamina,
            money_granted: 0.0,
            stamina_granted: 0.0,
            money_after: stats.money,
            max_stamina_after: stats.max_stamina,
            max_level_after: stats.max_level,
            timed_out: false,
            duration_ms: 0,
            error: Some(error),
        }
    }

    #[must_use]
    pub fn summited(&self) -> bool {
        self.outcome.is_some_and(MissionOutcome::is_success)
    }
}

pub struct MissionRunner {
    catalog: Catalog,
    track: Option<LoadedTrack>,
    settings: RunSettings,
}

impl MissionRunner {
    #[must_use]
    pub const fn new(catalog: Catalog, track: Option<LoadedTrack>, settings: RunSettings) -> Self {
        Self {
            catalog,
            track,
            settings,
        }
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn fresh_session(&self) -> Result<MissionSession> {
        let mut session = MissionSession::from_catalog(self.settings.config.clone(), &self.catalog)
            .context("invalid mission config")?;
        if let Some(track) = &self.track {
            session
                .load_track(&track.samples)
                .with_context(|| format!("track {} rejected", track.label))?;
        }
        Ok(session)
    }

    /// Buy any required item the player lacks, if the wallet allows.
    fn outfit(&self, session: &mut MissionSession, level: &LevelProperties) {
        for item_id in session.player_stats().missing_items(level) {
            let Some(item) = self.catalog.find_item(&item_id).cloned() else {
                log::warn!("{} requires unknown item {item_id}", level.name);
                continue;
            };
            match session.purchase_item(&item) {
                PurchaseOutcome::Purchased => log::info!("bought {} for {}", item.id, level.name),
                other => log::warn!("could not buy {} for {}: {other:?}", item.id, level.name),
            }
        }
    }

    /// Play each level once on a fresh player, ignoring unlock requirements.
    pub async fn run_isolated(&self, levels: &[LevelProperties]) -> Result<Vec<MissionRecord>> {
        let mut records = Vec::with_capacity(levels.len());
        for level in levels {
            let mut session = self.fresh_session()?;
            self.outfit(&mut session, level);
            session.start_mission(level);
            records.push(self.drive(&mut session, 1).await);
        }
        Ok(records)
    }

    /// Play levels in order on one player, retrying each up to `attempts`
    /// times. The campaign ends at the first level that cannot be cleared.
    pub async fn run_campaign(
        &self,
        levels: &[LevelProperties],
    ) -> Result<(Vec<MissionRecord>, PlayerStats)> {
        let mut session = self.fresh_session()?;
        let mut records = Vec::new();
        'levels: for level in levels {
            self.outfit(&mut session, level);
            let attempts = self.settings.attempts.max(1);
            for attempt in 1..=attempts {
                if let Err(err) = session.try_start_mission(level) {
                    log::warn!("campaign halted: {err}");
                    records.push(MissionRecord::refused(
                        level,
                        attempt,
                        session.player_stats(),
                        err.to_string(),
                    ));
                    break 'levels;
                }
                let record = self.drive(&mut session, attempt).await;
                let cleared = record.summited();
                records.push(record);
                if cleared {
                    continue 'levels;
                }
            }
            log::warn!("campaign halted: {} not cleared in {attempts} attempts", level.name);
            break;
        }
        Ok((records, session.into_player_stats()))
    }

    async fn drive(&self, session: &mut MissionSession, attempt: u32) -> MissionRecord {
        let started = Instant::now();
        let period_ms = session.config().tick_period_ms;
        let settled = match self.settings.pacing {
            Pacing::Instant => {
                let budget = Duration::from_millis(period_ms.saturating_mul(self.settings.max_ticks));
                session.advance(budget).report
            }
            Pacing::Realtime => {
                let budget = Duration::from_millis(
                    period_ms
                        .saturating_mul(self.settings.max_ticks)
                        .saturating_add(period_ms / 2),
                );
                let (cancel_tx, cancel_rx) = watch::channel(false);
                let ctrl_c = tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        let _ = cancel_tx.send(true);
                    }
                });
                let result = tokio::time::timeout(budget, run_mission_loop(session, cancel_rx)).await;
                ctrl_c.abort();
                result.ok().flatten()
            }
        };

        let (report, timed_out) = match settled {
            Some(report) => (report, false),
            None => {
                log::warn!(
                    "{} exceeded {} ticks; stopping",
                    session.game_state().level.name,
                    self.settings.max_ticks
                );
                match session.stop_mission() {
                    Some(report) => (report, true),
                    None => {
                        return MissionRecord::refused(
                            &session.game_state().level,
                            attempt,
                            session.player_stats(),
                            "mission was not running".to_string(),
                        );
                    }
                }
            }
        };
        if self.settings.verbose {
            log::info!(
                "{} attempt {attempt}: {} in {} ticks",
                report.level_name,
                report.outcome,
                report.ticks
            );
        }
        MissionRecord::settled(
            attempt,
            &report,
            session.player_stats(),
            timed_out,
            started.elapsed(),
        )
    }
}
