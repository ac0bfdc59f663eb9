//! Synchronous state publication to subscribed observers.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::player::PlayerStats;
use crate::state::GameState;
use crate::terrain::{ParseError, ProfilePath};

/// Receives every published snapshot. All methods default to no-ops.
pub trait StateObserver: Send {
    fn on_game_state(&mut self, _state: &GameState) {}

    fn on_player_stats(&mut self, _stats: &PlayerStats) {}

    /// Called after a track load succeeds.
    fn on_profile(&mut self, _profile: &ProfilePath) {}

    /// Called when a track load is rejected.
    fn on_track_error(&mut self, _error: &ParseError) {}
}

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

#[derive(Default)]
pub(crate) struct ObserverRegistry {
    next_id: u64,
    entries: Vec<(SubscriptionId, Box<dyn StateObserver>)>,
}

impl ObserverRegistry {
    pub(crate) fn subscribe(&mut self, observer: Box<dyn StateObserver>) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.entries.push((id, observer));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn game_state(&mut self, state: &GameState) {
        for (_, observer) in &mut self.entries {
            observer.on_game_state(state);
        }
    }

    pub(crate) fn player_stats(&mut self, stats: &PlayerStats) {
        for (_, observer) in &mut self.entries {
            observer.on_player_stats(stats);
        }
    }

    pub(crate) fn profile(&mut self, profile: &ProfilePath) {
        for (_, observer) in &mut self.entries {
            observer.on_profile(profile);
        }
    }

    pub(crate) fn track_error(&mut self, error: &ParseError) {
        for (_, observer) in &mut self.entries {
            observer.on_track_error(error);
        }
    }
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("next_id", &self.next_id)
            .field("subscribers", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct Counter(Arc<Mutex<u32>>);

    impl StateObserver for Counter {
        fn on_game_state(&mut self, _state: &GameState) {
            *self.0.lock().unwrap() += 1;
        }
    }

    #[test]
    fn unsubscribed_observers_stop_receiving() {
        let hits = Arc::new(Mutex::new(0));
        let mut registry = ObserverRegistry::default();
        let id = registry.subscribe(Box::new(Counter(Arc::clone(&hits))));
        registry.game_state(&GameState::default());
        assert!(registry.unsubscribe(id));
        assert!(!registry.unsubscribe(id));
        registry.game_state(&GameState::default());
        assert_eq!(*hits.lock().unwrap(), 1);
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn ids_are_unique() {
        struct Silent;
        impl StateObserver for Silent {}

        let mut registry = ObserverRegistry::default();
        let a = registry.subscribe(Box::new(Silent));
        let b = registry.subscribe(Box::new(Silent));
        assert_ne!(a, b);
        assert!(b.get() > a.get());
    }
}
