// Copyright 2025 the pyra authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Lifecycle of the process's single performance-hint session.
//!
//! The manager owns an ordered set of worker thread ids and at most one
//! live session. Thread-set mutations always re-register the set with the
//! platform; whether that is an in-place update or a destroy-and-recreate
//! depends on the capability tier. Every operation on a missing session is
//! a silent no-op — reporting is best effort, never fatal.

use pyra_core::capability::CapabilityTier;
use pyra_core::hint::{PerfHintService, PerfHintSession, ThreadId, ThreadUpdate};
use pyra_core::utils::timer::Stopwatch;
use std::time::Duration;

/// Owns the hint session and its thread membership.
///
/// Session existence walks `Uninitialized → Created → Destroyed →
/// Created …`: `session` is `None` until a creation succeeds, goes back to
/// `None` when a recreation fails, and nothing in between is an error.
pub struct HintSessionManager {
    tier: CapabilityTier,
    service: Option<Box<dyn PerfHintService>>,
    session: Option<Box<dyn PerfHintSession>>,
    thread_ids: Vec<ThreadId>,
    last_target: Duration,
    span: Option<Stopwatch>,
}

impl HintSessionManager {
    /// Creates the manager and eagerly attempts the first session.
    ///
    /// The calling thread is always the first member of the thread set.
    /// A failed creation is logged and left as-is; a later thread-set
    /// mutation will retry.
    pub fn new(
        tier: CapabilityTier,
        service: Option<Box<dyn PerfHintService>>,
        default_target: Duration,
    ) -> Self {
        let mut manager = Self {
            tier,
            service,
            session: None,
            thread_ids: vec![ThreadId::current()],
            last_target: default_target,
            span: None,
        };

        if let Some(service) = manager.service.as_ref() {
            if let Some(rate) = service.preferred_update_rate() {
                log::debug!("Hint service preferred update rate: {rate:?}");
            }
            manager.session = service.create_session(&manager.thread_ids, manager.last_target);
            if manager.session.is_none() {
                log::warn!("Failed to create a perf hint session");
            }
        } else {
            log::warn!("No hint service resolved; duration reporting disabled");
        }
        manager
    }

    /// Marks the start of the performance-sensitive span.
    ///
    /// A second call while a span is open does nothing: pairing with
    /// [`end_span`](Self::end_span) is the caller's contract and is not
    /// otherwise guarded.
    pub fn begin_span(&mut self) {
        if self.span.is_none() {
            self.span = Some(Stopwatch::new());
        }
    }

    /// Ends the span and reports `(actual, target)` to the session.
    ///
    /// Without an open span or a live session this does nothing. The
    /// target is remembered so tier-driven recreations keep aiming at the
    /// last thing the caller asked for.
    pub fn end_span(&mut self, target: Duration) {
        let Some(watch) = self.span.take() else {
            return;
        };
        let actual = watch.elapsed();
        self.last_target = target;

        if let Some(session) = self.session.as_mut() {
            session.report_actual_work_duration(actual);
            session.update_target_work_duration(target);
            log::trace!(
                "Reported span: actual={}ns target={}ns",
                actual.as_nanos(),
                target.as_nanos()
            );
        }
    }

    /// Adds a worker thread to the session's thread set.
    ///
    /// The set is ordered and duplicate-free; re-adding a member changes
    /// nothing but still re-registers the set, as membership calls always
    /// do.
    pub fn add_thread_id(&mut self, tid: ThreadId) {
        if !self.thread_ids.contains(&tid) {
            self.thread_ids.push(tid);
        }
        self.register_thread_ids();
    }

    /// Removes a worker thread from the session's thread set.
    pub fn remove_thread_id(&mut self, tid: ThreadId) {
        self.thread_ids.retain(|id| *id != tid);
        self.register_thread_ids();
    }

    /// Pushes the current thread set to the platform, tier-appropriately.
    ///
    /// `Native` updates the live session in place. `NativeThermalOnly`
    /// cannot, so it always recreates. `Legacy` tries in place and falls
    /// back to recreation when the resolved handle does not support it.
    fn register_thread_ids(&mut self) {
        let applied = match self.tier {
            CapabilityTier::NativeThermalOnly => ThreadUpdate::Unsupported,
            CapabilityTier::Native | CapabilityTier::Legacy => match self.session.as_mut() {
                Some(session) => session.set_threads(&self.thread_ids),
                None => ThreadUpdate::Unsupported,
            },
        };

        if applied == ThreadUpdate::Unsupported {
            self.recreate();
        }
    }

    /// Destroys the current session and creates a fresh one over the
    /// current thread set and the last known target.
    fn recreate(&mut self) {
        // Dropping the old session closes its platform handle first.
        self.session = None;

        let Some(service) = self.service.as_ref() else {
            return;
        };
        self.session = service.create_session(&self.thread_ids, self.last_target);
        match &self.session {
            Some(_) => log::debug!(
                "Hint session recreated for {} thread(s) ({})",
                self.thread_ids.len(),
                self.tier
            ),
            None => log::warn!("Hint session recreation failed; reporting suspended"),
        }
    }

    /// The effective thread set, in registration order.
    pub fn thread_ids(&self) -> &[ThreadId] {
        &self.thread_ids
    }

    /// Whether a live session currently exists.
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// The tier this manager was built for.
    pub fn tier(&self) -> CapabilityTier {
        self.tier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::thread;

    /// What a stub session saw, shared with the test body.
    #[derive(Default)]
    struct SessionLog {
        reports: Mutex<Vec<(Duration, Duration)>>,
        threads: Mutex<Vec<ThreadId>>,
        targets: Mutex<Vec<Duration>>,
    }

    struct StubSession {
        log: Arc<SessionLog>,
        live_thread_update: bool,
    }

    impl PerfHintSession for StubSession {
        fn report_actual_work_duration(&mut self, actual: Duration) {
            self.log
                .reports
                .lock()
                .unwrap()
                .push((actual, Duration::ZERO));
        }

        fn update_target_work_duration(&mut self, target: Duration) {
            if let Some(last) = self.log.reports.lock().unwrap().last_mut() {
                last.1 = target;
            }
        }

        fn set_threads(&mut self, threads: &[ThreadId]) -> ThreadUpdate {
            if !self.live_thread_update {
                return ThreadUpdate::Unsupported;
            }
            *self.log.threads.lock().unwrap() = threads.to_vec();
            ThreadUpdate::Applied
        }
    }

    struct StubService {
        log: Arc<SessionLog>,
        live_thread_update: bool,
        creations: Arc<AtomicUsize>,
        fail_creation: bool,
    }

    impl PerfHintService for StubService {
        fn create_session(
            &self,
            threads: &[ThreadId],
            target: Duration,
        ) -> Option<Box<dyn PerfHintSession>> {
            self.creations.fetch_add(1, Ordering::SeqCst);
            if self.fail_creation {
                return None;
            }
            *self.log.threads.lock().unwrap() = threads.to_vec();
            self.log.targets.lock().unwrap().push(target);
            Some(Box::new(StubSession {
                log: Arc::clone(&self.log),
                live_thread_update: self.live_thread_update,
            }))
        }
    }

    struct Harness {
        manager: HintSessionManager,
        log: Arc<SessionLog>,
        creations: Arc<AtomicUsize>,
    }

    fn harness(tier: CapabilityTier, live: bool, fail_creation: bool) -> Harness {
        let log = Arc::new(SessionLog::default());
        let creations = Arc::new(AtomicUsize::new(0));
        let service = StubService {
            log: Arc::clone(&log),
            live_thread_update: live,
            creations: Arc::clone(&creations),
            fail_creation,
        };
        Harness {
            manager: HintSessionManager::new(
                tier,
                Some(Box::new(service)),
                Duration::from_nanos(16_666_666),
            ),
            log,
            creations,
        }
    }

    #[test]
    fn test_creation_includes_calling_thread() {
        let h = harness(CapabilityTier::Native, true, false);
        assert!(h.manager.has_session());
        assert_eq!(h.manager.thread_ids(), &[ThreadId::current()]);
        assert_eq!(h.creations.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_span_reports_actual_and_target() {
        let mut h = harness(CapabilityTier::Native, true, false);
        let target = Duration::from_nanos(16_666_666);

        h.manager.begin_span();
        thread::sleep(Duration::from_millis(5));
        h.manager.end_span(target);

        let reports = h.log.reports.lock().unwrap();
        let (actual, reported_target) = reports[0];
        assert!(actual >= Duration::from_millis(5));
        assert!(actual < Duration::from_millis(100));
        assert_eq!(reported_target, target);
    }

    #[test]
    fn test_nested_begin_keeps_first_start() {
        let mut h = harness(CapabilityTier::Native, true, false);

        h.manager.begin_span();
        thread::sleep(Duration::from_millis(5));
        h.manager.begin_span();
        h.manager.end_span(Duration::from_millis(16));

        let reports = h.log.reports.lock().unwrap();
        assert!(reports[0].0 >= Duration::from_millis(5));
    }

    #[test]
    fn test_end_without_begin_is_noop() {
        let mut h = harness(CapabilityTier::Native, true, false);
        h.manager.end_span(Duration::from_millis(16));
        assert!(h.log.reports.lock().unwrap().is_empty());
    }

    #[test]
    fn test_native_updates_threads_in_place() {
        let mut h = harness(CapabilityTier::Native, true, false);
        h.manager.add_thread_id(ThreadId(4007));

        assert!(h.log.threads.lock().unwrap().contains(&ThreadId(4007)));
        // Only the initial creation; the mutation went through set_threads.
        assert_eq!(h.creations.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_thermal_only_recreates_per_mutation() {
        let mut h = harness(CapabilityTier::NativeThermalOnly, true, false);
        h.manager.add_thread_id(ThreadId(4007));
        h.manager.remove_thread_id(ThreadId(4007));

        assert_eq!(h.creations.load(Ordering::SeqCst), 3);
        assert!(h.manager.has_session());
    }

    #[test]
    fn test_legacy_without_live_update_recreates() {
        let mut h = harness(CapabilityTier::Legacy, false, false);
        h.manager.add_thread_id(ThreadId(4009));
        assert_eq!(h.creations.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_legacy_with_live_update_mutates_in_place() {
        let mut h = harness(CapabilityTier::Legacy, true, false);
        h.manager.add_thread_id(ThreadId(4009));
        assert_eq!(h.creations.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_add_remove_round_trip_restores_set() {
        let mut h = harness(CapabilityTier::Native, true, false);
        let original = h.manager.thread_ids().to_vec();

        h.manager.add_thread_id(ThreadId(4007));
        assert!(h.manager.thread_ids().contains(&ThreadId(4007)));
        h.manager.remove_thread_id(ThreadId(4007));

        assert_eq!(h.manager.thread_ids(), original.as_slice());
    }

    #[test]
    fn test_duplicate_add_keeps_set_semantics() {
        let mut h = harness(CapabilityTier::Native, true, false);
        h.manager.add_thread_id(ThreadId(4007));
        h.manager.add_thread_id(ThreadId(4007));
        assert_eq!(h.manager.thread_ids().len(), 2);
    }

    #[test]
    fn test_failed_creation_degrades_to_noops() {
        let mut h = harness(CapabilityTier::Native, true, true);
        assert!(!h.manager.has_session());

        // None of these may panic or report anywhere.
        h.manager.begin_span();
        h.manager.end_span(Duration::from_millis(16));
        h.manager.add_thread_id(ThreadId(4005));
        h.manager.remove_thread_id(ThreadId(4005));

        assert!(h.log.reports.lock().unwrap().is_empty());
        assert!(!h.manager.has_session());
    }

    #[test]
    fn test_no_service_is_fully_inert() {
        let mut manager = HintSessionManager::new(
            CapabilityTier::Legacy,
            None,
            Duration::from_nanos(16_666_666),
        );
        assert!(!manager.has_session());
        manager.begin_span();
        manager.end_span(Duration::from_millis(16));
        manager.add_thread_id(ThreadId(4001));
        assert!(!manager.has_session());
    }

    #[test]
    fn test_recreation_reuses_last_reported_target() {
        let mut h = harness(CapabilityTier::NativeThermalOnly, true, false);
        let new_target = Duration::from_nanos(8_333_333);

        h.manager.begin_span();
        h.manager.end_span(new_target);
        h.manager.add_thread_id(ThreadId(4003));

        let targets = h.log.targets.lock().unwrap();
        assert_eq!(*targets.last().unwrap(), new_target);
    }
}
