//! Connection state history, one bounded track per instance.
//!
//! Tracks keep the most recent [`MAX_HISTORY`] ticks. Stores can be saved
//! to and restored from a JSON map of instance id to state names; unknown
//! ids and unrecognized states are dropped on restore.

use std::collections::{BTreeMap, VecDeque};

use serde_json::Value;

use crate::config::InstanceId;
use crate::dashboard::types::CoarseState;

/// Ticks kept per instance.
pub const MAX_HISTORY: usize = 30;

/// Ring buffer of coarse states, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryTrack {
    ticks: VecDeque<CoarseState>,
    capacity: usize,
}

impl HistoryTrack {
    pub fn new(capacity: usize) -> Self {
        Self {
            ticks: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a tick, evicting the oldest if at capacity.
    pub fn push(&mut self, state: CoarseState) {
        if self.capacity == 0 {
            return;
        }
        while self.ticks.len() >= self.capacity {
            self.ticks.pop_front();
        }
        self.ticks.push_back(state);
    }

    pub fn iter(&self) -> impl Iterator<Item = CoarseState> + '_ {
        self.ticks.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<CoarseState> {
        self.ticks.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// History tracks of both instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryStore {
    tracks: BTreeMap<InstanceId, HistoryTrack>,
    capacity: usize,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tracks: InstanceId::ALL
                .into_iter()
                .map(|id| (id, HistoryTrack::new(capacity)))
                .collect(),
            capacity,
        }
    }

    pub fn push(&mut self, id: InstanceId, state: CoarseState) {
        self.tracks
            .entry(id)
            .or_insert_with(|| HistoryTrack::new(self.capacity))
            .push(state);
    }

    pub fn track(&self, id: InstanceId) -> Option<&HistoryTrack> {
        self.tracks.get(&id)
    }

    /// Ticks of one instance, oldest first.
    pub fn states(&self, id: InstanceId) -> Vec<CoarseState> {
        self.track(id).map(HistoryTrack::to_vec).unwrap_or_default()
    }

    /// All tracks as plain vectors.
    pub fn snapshot(&self) -> BTreeMap<InstanceId, Vec<CoarseState>> {
        self.tracks
            .iter()
            .map(|(id, track)| (*id, track.to_vec()))
            .collect()
    }

    /// Serialize to `{"1": ["connected", ...], "2": [...]}`.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Restore from JSON written by [`HistoryStore::to_json`].
    ///
    /// Input that is not a JSON object yields an empty store. Entries that
    /// are not known state names are discarded; if more than the capacity
    /// survive, the most recent ones are kept.
    pub fn restore(raw: &str) -> Self {
        let mut store = Self::new();
        let Ok(Value::Object(map)) = serde_json::from_str::<Value>(raw) else {
            tracing::debug!("Ignoring unreadable history");
            return store;
        };

        for (key, entries) in map {
            let Ok(id) = key.parse::<InstanceId>() else {
                continue;
            };
            let Value::Array(entries) = entries else {
                continue;
            };
            for state in entries
                .iter()
                .filter_map(Value::as_str)
                .filter_map(|s| s.parse::<CoarseState>().ok())
            {
                store.push(id, state);
            }
        }
        store
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_track_evicts_oldest() {
        let mut track = HistoryTrack::new(3);
        for state in [
            CoarseState::Connected,
            CoarseState::Paused,
            CoarseState::Disconnected,
            CoarseState::Unknown,
        ] {
            track.push(state);
        }
        assert_eq!(
            track.to_vec(),
            vec![
                CoarseState::Paused,
                CoarseState::Disconnected,
                CoarseState::Unknown
            ]
        );
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut track = HistoryTrack::new(0);
        track.push(CoarseState::Connected);
        assert!(track.is_empty());
    }

    #[test]
    fn test_store_tracks_are_independent() {
        let mut store = HistoryStore::new();
        store.push(InstanceId::One, CoarseState::Connected);
        store.push(InstanceId::One, CoarseState::Connected);
        store.push(InstanceId::Two, CoarseState::Unknown);

        assert_eq!(store.states(InstanceId::One).len(), 2);
        assert_eq!(store.states(InstanceId::Two), vec![CoarseState::Unknown]);
    }

    #[test]
    fn test_json_format() {
        let mut store = HistoryStore::new();
        store.push(InstanceId::One, CoarseState::Connected);
        store.push(InstanceId::Two, CoarseState::Paused);
        assert_eq!(store.to_json(), r#"{"1":["connected"],"2":["paused"]}"#);
    }

    #[test]
    fn test_restore_discards_invalid_entries() {
        let raw = r#"{
            "1": ["connected", "bogus", 7, null, "paused"],
            "2": "connected",
            "3": ["connected"]
        }"#;
        let store = HistoryStore::restore(raw);
        assert_eq!(
            store.states(InstanceId::One),
            vec![CoarseState::Connected, CoarseState::Paused]
        );
        assert!(store.states(InstanceId::Two).is_empty());
    }

    #[test]
    fn test_restore_garbage_is_empty() {
        for raw in ["", "not json", "[1,2]", "42"] {
            let store = HistoryStore::restore(raw);
            assert_eq!(store, HistoryStore::new(), "input {:?}", raw);
        }
    }

    #[test]
    fn test_restore_truncates_to_most_recent() {
        let mut entries = vec!["unknown"; 10];
        entries.extend(vec!["connected"; MAX_HISTORY]);
        let raw = serde_json::json!({ "1": entries }).to_string();

        let store = HistoryStore::restore(&raw);
        let states = store.states(InstanceId::One);
        assert_eq!(states.len(), MAX_HISTORY);
        assert!(states.iter().all(|s| *s == CoarseState::Connected));
    }

    fn any_state() -> impl Strategy<Value = CoarseState> {
        prop::sample::select(CoarseState::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_track_keeps_most_recent(states in prop::collection::vec(any_state(), 0..100)) {
            let mut store = HistoryStore::new();
            for state in &states {
                store.push(InstanceId::One, *state);
            }

            let kept = store.states(InstanceId::One);
            let expected_len = states.len().min(MAX_HISTORY);
            prop_assert_eq!(kept.len(), expected_len);
            prop_assert_eq!(&kept[..], &states[states.len() - expected_len..]);
        }

        #[test]
        fn prop_restore_preserves_saved_history(states in prop::collection::vec(any_state(), 0..60)) {
            let mut store = HistoryStore::new();
            for state in &states {
                store.push(InstanceId::Two, *state);
            }
            prop_assert_eq!(HistoryStore::restore(&store.to_json()), store);
        }
    }
}
