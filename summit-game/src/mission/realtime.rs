//! Wall-clock mission driver on a tokio interval.
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use super::session::MissionSession;
use super::tick::TickOutcome;
use crate::result::MissionReport;

/// Tick the live mission every `tick_period_ms` until it ends or `cancel`
/// turns true. Cancelling stops the mission and settles it like a manual
/// stop. Returns `None` when no mission was running or the cancel sender was
/// dropped, in which case the mission is left in place.
pub async fn run_mission_loop(
    session: &mut MissionSession,
    mut cancel: watch::Receiver<bool>,
) -> Option<MissionReport> {
    let generation = session.schedule().live()?;
    if *cancel.borrow_and_update() {
        return session.stop_mission();
    }

    let period = Duration::from_millis(session.config().tick_period_ms.max(1));
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick of an interval completes immediately.
    interval.tick().await;

    loop {
        tokio::select! {
            biased;
            changed = cancel.changed() => {
                if changed.is_err() {
                    log::debug!("mission loop cancel channel closed");
                    return None;
                }
                if *cancel.borrow_and_update() {
                    return session.stop_mission();
                }
            }
            _ = interval.tick() => match session.tick_generation(generation) {
                TickOutcome::Climbing(_) => {}
                TickOutcome::Finished(_, report) => return Some(report),
                TickOutcome::Idle => return None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::LevelProperties;
    use crate::mission::MissionConfig;
    use crate::player::PlayerStats;
    use crate::result::MissionOutcome;

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

    #[tokio::test(start_paused = true)]
    async fn runs_until_summit() {
        let mut session = session();
        session.start_mission(&ridge());
        let (_tx, rx) = watch::channel(false);
        let started = time::Instant::now();
        let report = run_mission_loop(&mut session, rx).await.unwrap();
        assert_eq!(report.outcome, MissionOutcome::Summited);
        assert_eq!(report.ticks, 100);
        assert_eq!(started.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_and_settles() {
        let mut session = session();
        session.start_mission(&ridge());
        let (tx, rx) = watch::channel(false);
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(350)).await;
            let _ = tx.send(true);
        });
        let report = run_mission_loop(&mut session, rx).await.unwrap();
        assert_eq!(report.outcome, MissionOutcome::Retreated);
        assert_eq!(report.ticks, 3);
        assert!(!session.is_on_mission());
        assert!(matches!(session.tick(), TickOutcome::Idle));
    }

    #[tokio::test(start_paused = true)]
    async fn idle_session_returns_immediately() {
        let mut session = session();
        let (_tx, rx) = watch::channel(false);
        assert!(run_mission_loop(&mut session, rx).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn pre_cancelled_signal_stops_before_any_tick() {
        let mut session = session();
        session.start_mission(&ridge());
        let (_tx, rx) = watch::channel(true);
        let report = run_mission_loop(&mut session, rx).await.unwrap();
        assert_eq!(report.ticks, 0);
    }
}
