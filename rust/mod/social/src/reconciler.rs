//! Optimistic like/follow toggles.
//!
//! A toggle writes the guessed value to the relation's path before the
//! mutation is sent, then settles it against the server's answer or
//! restores the pre-toggle value. At most one call per relation key is in
//! flight; a second toggle on the same key while the first is pending is
//! dropped.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use socialbook_client::SocialApi;
use socialbook_flux::StateStore;
use tracing::{debug, info, warn};

use crate::error::SessionError;
use crate::notifier::Notifier;
use crate::state::{MutationPhase, Notice, Relation, RelationKey, RelationKind, RelationState};

/// How a toggle ended.
#[derive(Debug)]
pub enum ToggleOutcome {
    /// Server answered; the relation holds its authoritative value.
    Confirmed(Relation),
    /// The call failed; the relation was restored to this value.
    RolledBack { relation: Relation, error: SessionError },
    /// Another toggle on the same key was still in flight.
    Deduplicated,
}

/// Keys with a call in flight, and the epoch at which each key last settled.
#[derive(Default)]
struct Ledger {
    pending: HashSet<RelationKey>,
    settled: HashMap<RelationKey, u64>,
    epoch: u64,
}

#[derive(Clone)]
pub struct Reconciler {
    api: Arc<dyn SocialApi>,
    store: Arc<StateStore>,
    notifier: Arc<dyn Notifier>,
    ledger: Arc<Mutex<Ledger>>,
}

impl Reconciler {
    pub fn new(api: Arc<dyn SocialApi>, store: Arc<StateStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            store,
            notifier,
            ledger: Arc::new(Mutex::new(Ledger::default())),
        }
    }

    /// Current value of a relation, if known.
    pub fn get(&self, key: &RelationKey) -> Option<RelationState> {
        self.store.read::<RelationState>(&key.path())
    }

    pub fn is_pending(&self, key: &RelationKey) -> bool {
        self.ledger().pending.contains(key)
    }

    /// Marker to take before fetching data that will be passed to
    /// [`seed_since`](Self::seed_since).
    pub fn epoch(&self) -> u64 {
        self.ledger().epoch
    }

    /// Record a server-provided value. Skipped while a toggle on `key` is in
    /// flight. Returns whether it was written.
    pub fn seed(&self, key: &RelationKey, relation: Relation) -> bool {
        self.seed_since(key, relation, u64::MAX)
    }

    /// Like [`seed`](Self::seed), for data fetched at `epoch`: a key whose
    /// toggle settled after that point already holds a newer value and is
    /// left alone.
    pub fn seed_since(&self, key: &RelationKey, relation: Relation, epoch: u64) -> bool {
        let ledger = self.ledger();
        if ledger.pending.contains(key) {
            debug!(%key, "seed skipped, toggle in flight");
            return false;
        }
        if ledger.settled.get(key).is_some_and(|&at| at > epoch) {
            debug!(%key, "seed skipped, data older than last toggle");
            return false;
        }
        // Written under the ledger lock so a toggle cannot start in between.
        self.store.set(&key.path(), RelationState::confirmed(relation));
        true
    }

    pub async fn toggle(&self, key: RelationKey) -> ToggleOutcome {
        if !self.ledger().pending.insert(key.clone()) {
            debug!(%key, "toggle already in flight");
            return ToggleOutcome::Deduplicated;
        }

        let path = key.path();
        let snapshot = self.get(&key).map(|s| s.relation).unwrap_or_default();
        let mut flight = InFlight {
            reconciler: self,
            key: &key,
            snapshot,
            settled: false,
        };
        let guess = snapshot.toggled();
        self.store.set(
            &path,
            RelationState { relation: guess, phase: MutationPhase::Applied },
        );
        debug!(%key, active = guess.active, count = guess.count, "optimistic apply");

        let result = match key.kind {
            RelationKind::Like => self.api.toggle_like(&key.target).await,
            RelationKind::Follow => self.api.toggle_follow(&key.target).await,
        };
        flight.settled = true;

        match result {
            Ok(ack) => {
                let settled = snapshot.settle(ack);
                if settled != guess {
                    info!(%key, active = settled.active, count = settled.count, "server disagreed with optimistic value");
                }
                self.store.set(&path, RelationState::confirmed(settled));
                ToggleOutcome::Confirmed(settled)
            }
            Err(e) => {
                let error = SessionError::from(e);
                warn!(%key, error = %error, "toggle failed, rolling back");
                self.store.set(
                    &path,
                    RelationState { relation: snapshot, phase: MutationPhase::RolledBack },
                );
                self.notifier.notify(Notice::new(failure_title(key.kind), error.message()));
                ToggleOutcome::RolledBack { relation: snapshot, error }
            }
        }
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Releases a key when its toggle ends, however it ends. A toggle dropped
/// before the call answered is rolled back to its snapshot.
struct InFlight<'a> {
    reconciler: &'a Reconciler,
    key: &'a RelationKey,
    snapshot: Relation,
    settled: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut ledger = self.reconciler.ledger();
        if !self.settled {
            warn!(key = %self.key, "toggle dropped before the server answered, rolling back");
            self.reconciler.store.set(
                &self.key.path(),
                RelationState { relation: self.snapshot, phase: MutationPhase::RolledBack },
            );
        }
        ledger.epoch += 1;
        let epoch = ledger.epoch;
        ledger.settled.insert(self.key.clone(), epoch);
        ledger.pending.remove(self.key);
    }
}

fn failure_title(kind: RelationKind) -> &'static str {
    match kind {
        RelationKind::Like => "Couldn't update like",
        RelationKind::Follow => "Couldn't update follow",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use socialbook_client::ToggleAck;
    use tokio::sync::Notify;

    use crate::state::NoticeList;
    use crate::testing::{FakeSessionApi, FakeSocialApi, Harness};

    fn reconciler(h: &Harness) -> Reconciler {
        Reconciler::new(h.social_api.clone(), h.store.clone(), h.notices.clone())
    }

    fn like_p1() -> RelationKey {
        RelationKey::like("alice", "p1")
    }

    #[tokio::test]
    async fn server_flag_overrides_optimistic_guess() {
        let social = FakeSocialApi::default().answering(ToggleAck { active: false, count: None });
        let h = Harness::with_social(FakeSessionApi::default(), social);
        let r = reconciler(&h);
        r.seed(&like_p1(), Relation::new(false, 3));

        let outcome = r.toggle(like_p1()).await;

        assert!(matches!(outcome, ToggleOutcome::Confirmed(rel) if rel == Relation::new(false, 3)));
        let state = r.get(&like_p1()).unwrap();
        assert_eq!(state.relation, Relation::new(false, 3));
        assert_eq!(state.phase, MutationPhase::Confirmed);
        assert!(!r.is_pending(&like_p1()));
    }

    #[tokio::test]
    async fn optimistic_value_visible_before_call_resolves() {
        let gate = Arc::new(Notify::new());
        let social = FakeSocialApi::default()
            .answering(ToggleAck { active: true, count: Some(4) })
            .gated(gate.clone());
        let h = Harness::with_social(FakeSessionApi::default(), social);
        let r = reconciler(&h);
        r.seed(&like_p1(), Relation::new(false, 3));

        let task = tokio::spawn({
            let r = r.clone();
            async move { r.toggle(like_p1()).await }
        });
        while h.social_api.like_calls() == 0 {
            tokio::task::yield_now().await;
        }

        let state = r.get(&like_p1()).unwrap();
        assert_eq!(state.relation, Relation::new(true, 4));
        assert_eq!(state.phase, MutationPhase::Applied);
        assert!(r.is_pending(&like_p1()));

        gate.notify_one();
        let outcome = task.await.unwrap();
        assert!(matches!(outcome, ToggleOutcome::Confirmed(rel) if rel == Relation::new(true, 4)));
        assert_eq!(r.get(&like_p1()).unwrap().phase, MutationPhase::Confirmed);
    }

    #[tokio::test]
    async fn rejection_rolls_back_and_notifies() {
        let social = FakeSocialApi::default().rejecting("Post not found.");
        let h = Harness::with_social(FakeSessionApi::default(), social);
        let r = reconciler(&h);
        r.seed(&like_p1(), Relation::new(false, 3));

        let outcome = r.toggle(like_p1()).await;

        match outcome {
            ToggleOutcome::RolledBack { relation, error } => {
                assert_eq!(relation, Relation::new(false, 3));
                assert!(matches!(error, SessionError::MutationRejected(_)));
            }
            other => panic!("unexpected {other:?}"),
        }
        let state = r.get(&like_p1()).unwrap();
        assert_eq!(state.relation, Relation::new(false, 3));
        assert_eq!(state.phase, MutationPhase::RolledBack);

        let notices = h.store.read::<NoticeList>(NoticeList::PATH).unwrap();
        assert_eq!(notices.items.len(), 1);
        assert_eq!(notices.items[0].title, "Couldn't update like");
        assert_eq!(notices.items[0].message, "Post not found.");
    }

    #[tokio::test]
    async fn concurrent_toggle_is_deduplicated() {
        let gate = Arc::new(Notify::new());
        let social = FakeSocialApi::default().gated(gate.clone());
        let h = Harness::with_social(FakeSessionApi::default(), social);
        let r = reconciler(&h);

        let task = tokio::spawn({
            let r = r.clone();
            async move { r.toggle(like_p1()).await }
        });
        while h.social_api.like_calls() == 0 {
            tokio::task::yield_now().await;
        }

        assert!(matches!(r.toggle(like_p1()).await, ToggleOutcome::Deduplicated));
        assert_eq!(h.social_api.like_calls(), 1);

        gate.notify_one();
        task.await.unwrap();
        assert!(!r.is_pending(&like_p1()));
    }

    #[tokio::test]
    async fn seed_does_not_clobber_in_flight_value() {
        let gate = Arc::new(Notify::new());
        let social = FakeSocialApi::default()
            .answering(ToggleAck { active: true, count: Some(1) })
            .gated(gate.clone());
        let h = Harness::with_social(FakeSessionApi::default(), social);
        let r = reconciler(&h);

        let task = tokio::spawn({
            let r = r.clone();
            async move { r.toggle(like_p1()).await }
        });
        while h.social_api.like_calls() == 0 {
            tokio::task::yield_now().await;
        }

        assert!(!r.seed(&like_p1(), Relation::new(false, 0)));
        assert_eq!(r.get(&like_p1()).unwrap().relation, Relation::new(true, 1));

        gate.notify_one();
        task.await.unwrap();
        assert!(r.seed(&like_p1(), Relation::new(false, 0)));
    }

    #[tokio::test]
    async fn dropped_toggle_releases_key_and_rolls_back() {
        let gate = Arc::new(Notify::new());
        let social = FakeSocialApi::default()
            .answering(ToggleAck { active: true, count: Some(4) })
            .gated(gate.clone());
        let h = Harness::with_social(FakeSessionApi::default(), social);
        let r = reconciler(&h);
        r.seed(&like_p1(), Relation::new(false, 3));

        let timed_out =
            tokio::time::timeout(std::time::Duration::from_millis(20), r.toggle(like_p1())).await;
        assert!(timed_out.is_err());

        assert!(!r.is_pending(&like_p1()));
        let state = r.get(&like_p1()).unwrap();
        assert_eq!(state.relation, Relation::new(false, 3));
        assert_eq!(state.phase, MutationPhase::RolledBack);

        gate.notify_one();
        let outcome = r.toggle(like_p1()).await;
        assert!(matches!(outcome, ToggleOutcome::Confirmed(rel) if rel == Relation::new(true, 4)));
    }

    #[tokio::test]
    async fn data_fetched_before_a_settle_does_not_overwrite_it() {
        let social = FakeSocialApi::default().answering(ToggleAck { active: true, count: Some(4) });
        let h = Harness::with_social(FakeSessionApi::default(), social);
        let r = reconciler(&h);
        r.seed(&like_p1(), Relation::new(false, 3));

        let before = r.epoch();
        r.toggle(like_p1()).await;

        assert!(!r.seed_since(&like_p1(), Relation::new(false, 3), before));
        assert_eq!(r.get(&like_p1()).unwrap().relation, Relation::new(true, 4));

        let after = r.epoch();
        assert!(r.seed_since(&like_p1(), Relation::new(true, 5), after));
        assert_eq!(r.get(&like_p1()).unwrap().relation, Relation::new(true, 5));
    }

    #[tokio::test]
    async fn unlike_at_zero_stays_at_zero() {
        let social = FakeSocialApi::default().rejecting("boom");
        let h = Harness::with_social(FakeSessionApi::default(), social);
        let r = reconciler(&h);
        r.seed(&like_p1(), Relation::new(true, 0));

        let task = r.toggle(like_p1()).await;
        assert!(matches!(task, ToggleOutcome::RolledBack { .. }));
        assert_eq!(r.get(&like_p1()).unwrap().relation, Relation::new(true, 0));
    }

    #[tokio::test]
    async fn follow_uses_follow_endpoint() {
        let social = FakeSocialApi::default().answering(ToggleAck { active: true, count: None });
        let h = Harness::with_social(FakeSessionApi::default(), social);
        let r = reconciler(&h);
        let key = RelationKey::follow("alice", "bob");
        r.seed(&key, Relation::new(false, 10));

        let outcome = r.toggle(key.clone()).await;

        assert!(matches!(outcome, ToggleOutcome::Confirmed(rel) if rel == Relation::new(true, 11)));
        assert_eq!(h.social_api.follow_calls(), 1);
        assert_eq!(h.social_api.like_calls(), 0);
    }
}
