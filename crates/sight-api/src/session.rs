//! Per-session detection state and the session registry.
//!
//! Each camera session owns an accumulated label set, the baseline of the
//! last successful announcement, and the cooldown clock. All three are
//! guarded by one async mutex so ingest, evaluation and commit never
//! interleave for the same session, while distinct sessions share nothing.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexSet;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tokio::time::Instant;
use tracing::{debug, warn};

use sight_models::{AccumulationPolicy, DetectionLabel, LabelDiff, SessionId};

/// Maximum number of live sessions before the registry starts evicting.
const MAX_SESSIONS: usize = 10_000;

/// Per-session knobs, resolved from process defaults at creation.
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    /// Minimum gap between announcement decisions
    pub cooldown: Duration,
    /// How the accumulated set evolves across frames
    pub policy: AccumulationPolicy,
}

/// Outcome of a change evaluation.
#[derive(Debug)]
pub enum Decision {
    /// Cooldown still active; accumulation continues silently
    Queued,
    /// Cooldown elapsed but nothing differs from the baseline
    NoChange,
    /// Something changed; caller must format, synthesize, then commit
    ReadyToEmit {
        /// Added/removed labels in insertion order
        diff: LabelDiff,
        /// The accumulated set the diff was computed from; becomes the
        /// new baseline if dispatch succeeds
        snapshot: IndexSet<DetectionLabel>,
    },
}

/// Mutable state of one session.
#[derive(Debug)]
pub struct SessionState {
    accumulated: IndexSet<DetectionLabel>,
    last_announced: IndexSet<DetectionLabel>,
    last_emission: Option<Instant>,
    last_seen: Instant,
    settings: SessionSettings,
}

impl SessionState {
    fn new(settings: SessionSettings) -> Self {
        Self {
            accumulated: IndexSet::new(),
            last_announced: IndexSet::new(),
            last_emission: None,
            last_seen: Instant::now(),
            settings,
        }
    }

    /// Merge a frame's labels into the accumulated set.
    ///
    /// An empty frame is a no-op under both policies, so dropped or
    /// malformed frames never erase observations.
    pub fn ingest(&mut self, labels: impl IntoIterator<Item = DetectionLabel>) {
        let mut labels = labels.into_iter().peekable();
        if labels.peek().is_none() {
            return;
        }
        match self.settings.policy {
            AccumulationPolicy::Lifetime => self.accumulated.extend(labels),
            AccumulationPolicy::PerFrame => {
                self.accumulated = labels.collect();
            }
        }
    }

    /// Decide whether the accumulated state warrants an announcement.
    ///
    /// The cooldown gates decision frequency, not ingestion: a `Queued`
    /// result leaves every field untouched. A `NoChange` result resets
    /// the cooldown clock. `ReadyToEmit` leaves both the baseline and
    /// the clock alone; they only move on a successful commit.
    pub fn evaluate(&mut self, now: Instant) -> Decision {
        if let Some(last) = self.last_emission {
            if now.duration_since(last) < self.settings.cooldown {
                return Decision::Queued;
            }
        }

        let added: Vec<DetectionLabel> = self
            .accumulated
            .difference(&self.last_announced)
            .cloned()
            .collect();
        let removed: Vec<DetectionLabel> = self
            .last_announced
            .difference(&self.accumulated)
            .cloned()
            .collect();

        if added.is_empty() && removed.is_empty() {
            self.last_emission = Some(now);
            return Decision::NoChange;
        }

        Decision::ReadyToEmit {
            diff: LabelDiff::new(added, removed),
            snapshot: self.accumulated.clone(),
        }
    }

    /// Commit a successful announcement: install the announced snapshot
    /// as the new baseline and reset the cooldown clock, atomically
    /// (the caller holds the session lock).
    ///
    /// Labels ingested while synthesis was in flight are not part of the
    /// snapshot and therefore stay unannounced until the next diff.
    pub fn commit(&mut self, snapshot: IndexSet<DetectionLabel>, now: Instant) {
        self.last_announced = snapshot;
        self.last_emission = Some(now);
    }

    /// Record client activity for idle eviction.
    pub fn touch(&mut self, now: Instant) {
        self.last_seen = now;
    }

    /// How long since the session last saw traffic.
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.duration_since(self.last_seen)
    }

    /// Labels observed since the last reset point.
    pub fn accumulated(&self) -> &IndexSet<DetectionLabel> {
        &self.accumulated
    }

    /// Baseline of the most recent successful announcement.
    pub fn last_announced(&self) -> &IndexSet<DetectionLabel> {
        &self.last_announced
    }
}

/// One camera session: an ID plus lock-guarded state.
pub struct Session {
    pub id: SessionId,
    state: Mutex<SessionState>,
}

impl Session {
    fn new(id: SessionId, settings: SessionSettings) -> Self {
        Self {
            id,
            state: Mutex::new(SessionState::new(settings)),
        }
    }

    /// Acquire the session's critical section.
    pub async fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().await
    }
}

/// Registry of live sessions.
///
/// Lookups take the read lock; creation double-checks under the write
/// lock so concurrent first frames for the same session agree on one
/// state object.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Arc<Session>>>,
    defaults: SessionSettings,
    idle_ttl: Duration,
}

impl SessionRegistry {
    /// Create a registry with process-wide session defaults.
    pub fn new(defaults: SessionSettings, idle_ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            defaults,
            idle_ttl,
        }
    }

    /// Fetch a session, creating it with the process defaults on first
    /// ingest.
    pub async fn get_or_create(&self, id: &SessionId) -> Arc<Session> {
        {
            let sessions = self.sessions.read().await;
            if let Some(session) = sessions.get(id) {
                return Arc::clone(session);
            }
        }

        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get(id) {
            return Arc::clone(session);
        }

        Self::enforce_capacity(&mut sessions, self.idle_ttl);

        let session = Arc::new(Session::new(id.clone(), self.defaults));
        sessions.insert(id.clone(), Arc::clone(&session));
        debug!(session_id = %id, "Created session");
        session
    }

    /// Create a fresh session with explicit settings (per-session
    /// cooldown/policy overrides must be pinned before the first frame).
    pub async fn create(&self, settings: SessionSettings) -> Arc<Session> {
        let id = SessionId::new();
        let session = Arc::new(Session::new(id.clone(), settings));

        let mut sessions = self.sessions.write().await;
        Self::enforce_capacity(&mut sessions, self.idle_ttl);
        sessions.insert(id, Arc::clone(&session));
        session
    }

    /// Destroy a session's state. Returns whether it existed.
    pub async fn remove(&self, id: &SessionId) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Evict sessions idle past the TTL. Sessions whose lock is held are
    /// mid-request and skipped.
    pub async fn reap_idle(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|_, session| match session.state.try_lock() {
            Ok(state) => state.idle_for(now) < self.idle_ttl,
            Err(_) => true,
        });

        before - sessions.len()
    }

    fn enforce_capacity(sessions: &mut HashMap<SessionId, Arc<Session>>, idle_ttl: Duration) {
        if sessions.len() < MAX_SESSIONS {
            return;
        }

        let now = Instant::now();
        sessions.retain(|_, session| match session.state.try_lock() {
            Ok(state) => state.idle_for(now) < idle_ttl,
            Err(_) => true,
        });

        // Still full: drop the most idle entry rather than refusing the
        // new session.
        if sessions.len() >= MAX_SESSIONS {
            let most_idle = sessions
                .iter()
                .filter_map(|(id, session)| {
                    session
                        .state
                        .try_lock()
                        .ok()
                        .map(|state| (id.clone(), state.idle_for(now)))
                })
                .max_by_key(|(_, idle)| *idle)
                .map(|(id, _)| id);

            if let Some(id) = most_idle {
                warn!(session_id = %id, "Session capacity reached, evicting most idle");
                sessions.remove(&id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(cooldown_ms: u64, policy: AccumulationPolicy) -> SessionSettings {
        SessionSettings {
            cooldown: Duration::from_millis(cooldown_ms),
            policy,
        }
    }

    fn labels(names: &[&str]) -> Vec<DetectionLabel> {
        names.iter().map(|n| DetectionLabel::new(*n)).collect()
    }

    #[tokio::test]
    async fn test_accumulation_is_monotonic_under_lifetime_policy() {
        let mut state = SessionState::new(settings(5000, AccumulationPolicy::Lifetime));

        state.ingest(labels(&["cat"]));
        state.ingest(labels(&["dog", "cat"]));
        state.ingest(labels(&[]));

        let accumulated: Vec<&str> = state.accumulated().iter().map(|l| l.as_str()).collect();
        assert_eq!(accumulated, vec!["cat", "dog"]);
    }

    #[tokio::test]
    async fn test_per_frame_policy_replaces_set() {
        let mut state = SessionState::new(settings(5000, AccumulationPolicy::PerFrame));

        state.ingest(labels(&["cat", "dog"]));
        state.ingest(labels(&["dog"]));

        let accumulated: Vec<&str> = state.accumulated().iter().map(|l| l.as_str()).collect();
        assert_eq!(accumulated, vec!["dog"]);

        // Empty frames never erase observations.
        state.ingest(labels(&[]));
        assert_eq!(state.accumulated().len(), 1);
    }

    #[tokio::test]
    async fn test_first_evaluation_can_emit_immediately() {
        let mut state = SessionState::new(settings(5000, AccumulationPolicy::Lifetime));
        state.ingest(labels(&["cat"]));

        match state.evaluate(Instant::now()) {
            Decision::ReadyToEmit { diff, .. } => {
                assert_eq!(diff.phrase(), "I now see cat. ");
            }
            other => panic!("expected ReadyToEmit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cooldown_gates_regardless_of_diff_size() {
        let mut state = SessionState::new(settings(5000, AccumulationPolicy::Lifetime));
        let t0 = Instant::now();

        state.ingest(labels(&["cat"]));
        let Decision::ReadyToEmit { snapshot, .. } = state.evaluate(t0) else {
            panic!("expected ReadyToEmit");
        };
        state.commit(snapshot, t0);

        state.ingest(labels(&["dog", "person", "bicycle"]));
        assert!(matches!(
            state.evaluate(t0 + Duration::from_millis(4999)),
            Decision::Queued
        ));
        assert!(matches!(
            state.evaluate(t0 + Duration::from_millis(5000)),
            Decision::ReadyToEmit { .. }
        ));
    }

    #[tokio::test]
    async fn test_no_change_resets_cooldown_clock() {
        let mut state = SessionState::new(settings(5000, AccumulationPolicy::Lifetime));
        let t0 = Instant::now();

        state.ingest(labels(&["cat"]));
        let Decision::ReadyToEmit { snapshot, .. } = state.evaluate(t0) else {
            panic!("expected ReadyToEmit");
        };
        state.commit(snapshot, t0);

        // Cooldown elapsed, nothing new: clock resets without emission.
        let t1 = t0 + Duration::from_millis(6000);
        assert!(matches!(state.evaluate(t1), Decision::NoChange));

        // The reset pushes the next decision point past t1 + cooldown.
        state.ingest(labels(&["dog"]));
        assert!(matches!(
            state.evaluate(t1 + Duration::from_millis(4000)),
            Decision::Queued
        ));
        assert!(matches!(
            state.evaluate(t1 + Duration::from_millis(5000)),
            Decision::ReadyToEmit { .. }
        ));
    }

    #[tokio::test]
    async fn test_queued_and_ready_leave_state_untouched() {
        let mut state = SessionState::new(settings(5000, AccumulationPolicy::Lifetime));
        let t0 = Instant::now();

        state.ingest(labels(&["cat"]));
        let Decision::ReadyToEmit { snapshot, .. } = state.evaluate(t0) else {
            panic!("expected ReadyToEmit");
        };
        state.commit(snapshot, t0);

        state.ingest(labels(&["dog"]));
        assert!(matches!(state.evaluate(t0), Decision::Queued));
        assert_eq!(state.last_announced().len(), 1);

        // ReadyToEmit without a commit leaves baseline and clock alone,
        // so the same diff is recomputed.
        let t1 = t0 + Duration::from_millis(5000);
        for _ in 0..2 {
            match state.evaluate(t1) {
                Decision::ReadyToEmit { diff, .. } => {
                    assert_eq!(diff.added, labels(&["dog"]));
                    assert!(diff.removed.is_empty());
                }
                other => panic!("expected ReadyToEmit, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_removed_labels_announced_under_per_frame_policy() {
        let mut state = SessionState::new(settings(5000, AccumulationPolicy::PerFrame));
        let t0 = Instant::now();

        state.ingest(labels(&["cat", "dog"]));
        let Decision::ReadyToEmit { snapshot, .. } = state.evaluate(t0) else {
            panic!("expected ReadyToEmit");
        };
        state.commit(snapshot, t0);

        state.ingest(labels(&["dog"]));
        match state.evaluate(t0 + Duration::from_millis(5000)) {
            Decision::ReadyToEmit { diff, .. } => {
                assert_eq!(diff.phrase(), "I no longer see cat.");
            }
            other => panic!("expected ReadyToEmit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_commit_installs_snapshot_not_live_set() {
        let mut state = SessionState::new(settings(5000, AccumulationPolicy::Lifetime));
        let t0 = Instant::now();

        state.ingest(labels(&["cat"]));
        let Decision::ReadyToEmit { snapshot, .. } = state.evaluate(t0) else {
            panic!("expected ReadyToEmit");
        };

        // A frame lands while synthesis is in flight.
        state.ingest(labels(&["dog"]));
        state.commit(snapshot, t0);

        // "dog" was not part of the announced snapshot and surfaces in
        // the next diff.
        match state.evaluate(t0 + Duration::from_millis(5000)) {
            Decision::ReadyToEmit { diff, .. } => {
                assert_eq!(diff.added, labels(&["dog"]));
            }
            other => panic!("expected ReadyToEmit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_registry_get_or_create_is_idempotent() {
        let registry = SessionRegistry::new(
            settings(5000, AccumulationPolicy::Lifetime),
            Duration::from_secs(600),
        );
        let id = SessionId::from("cam-1");

        let a = registry.get_or_create(&id).await;
        let b = registry.get_or_create(&id).await;
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_registry_remove_destroys_state() {
        let registry = SessionRegistry::new(
            settings(5000, AccumulationPolicy::Lifetime),
            Duration::from_secs(600),
        );
        let id = SessionId::from("cam-1");

        {
            let session = registry.get_or_create(&id).await;
            session.lock().await.ingest(labels(&["cat"]));
        }
        assert!(registry.remove(&id).await);
        assert!(!registry.remove(&id).await);

        // Recreating yields fresh state.
        let session = registry.get_or_create(&id).await;
        assert!(session.lock().await.accumulated().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_registry_reaps_idle_sessions() {
        let registry = SessionRegistry::new(
            settings(5000, AccumulationPolicy::Lifetime),
            Duration::from_secs(60),
        );

        let idle = registry.get_or_create(&SessionId::from("idle")).await;
        idle.lock().await.touch(Instant::now());

        tokio::time::advance(Duration::from_secs(30)).await;
        let active = registry.get_or_create(&SessionId::from("active")).await;
        active.lock().await.touch(Instant::now());

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(registry.reap_idle().await, 1);
        assert_eq!(registry.len().await, 1);
    }
}
