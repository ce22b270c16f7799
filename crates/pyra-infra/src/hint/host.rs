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

//! In-process hint service for the native tiers.
//!
//! On hosts without an OS scheduler bridge this is the terminal sink for
//! duration reports: it keeps the latest report observable and logs at
//! `trace`. The two constructors model the one behavioral difference
//! between the native tiers — whether a live session can replace its
//! thread set in place.

use pyra_core::hint::{PerfHintService, PerfHintSession, ThreadId, ThreadUpdate};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// The most recent duration report a session delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSnapshot {
    /// Measured duration of the bracketed work.
    pub actual: Duration,
    /// The target the caller was aiming for.
    pub target: Duration,
}

/// Hint service backed by process-local state.
pub struct HostHintService {
    live_thread_update: bool,
    last_report: Arc<Mutex<Option<ReportSnapshot>>>,
    open_sessions: Arc<AtomicUsize>,
}

impl HostHintService {
    /// Full-capability variant: sessions replace their thread set live.
    pub fn with_live_thread_update() -> Self {
        Self::build(true)
    }

    /// Reduced variant: thread-set changes require session recreation.
    pub fn without_live_thread_update() -> Self {
        Self::build(false)
    }

    fn build(live_thread_update: bool) -> Self {
        Self {
            live_thread_update,
            last_report: Arc::new(Mutex::new(None)),
            open_sessions: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The latest report any session delivered, if one has.
    pub fn last_report(&self) -> Option<ReportSnapshot> {
        self.last_report.lock().ok().and_then(|r| *r)
    }

    /// Number of sessions currently open against this service.
    pub fn open_sessions(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }
}

impl PerfHintService for HostHintService {
    fn create_session(
        &self,
        threads: &[ThreadId],
        target: Duration,
    ) -> Option<Box<dyn PerfHintSession>> {
        self.open_sessions.fetch_add(1, Ordering::SeqCst);
        log::debug!(
            "Opening hint session: {} thread(s), target {}ns",
            threads.len(),
            target.as_nanos()
        );
        Some(Box::new(HostHintSession {
            threads: threads.to_vec(),
            target,
            live_thread_update: self.live_thread_update,
            last_report: Arc::clone(&self.last_report),
            open_sessions: Arc::clone(&self.open_sessions),
        }))
    }

    fn preferred_update_rate(&self) -> Option<Duration> {
        Some(Duration::from_millis(1))
    }
}

struct HostHintSession {
    threads: Vec<ThreadId>,
    target: Duration,
    live_thread_update: bool,
    last_report: Arc<Mutex<Option<ReportSnapshot>>>,
    open_sessions: Arc<AtomicUsize>,
}

impl PerfHintSession for HostHintSession {
    fn report_actual_work_duration(&mut self, actual: Duration) {
        log::trace!(
            "Hint report: actual={}ns target={}ns over {} thread(s)",
            actual.as_nanos(),
            self.target.as_nanos(),
            self.threads.len()
        );
        if let Ok(mut report) = self.last_report.lock() {
            *report = Some(ReportSnapshot {
                actual,
                target: self.target,
            });
        }
    }

    fn update_target_work_duration(&mut self, target: Duration) {
        self.target = target;
        if let Ok(mut report) = self.last_report.lock() {
            if let Some(snapshot) = report.as_mut() {
                snapshot.target = target;
            }
        }
    }

    fn set_threads(&mut self, threads: &[ThreadId]) -> ThreadUpdate {
        if !self.live_thread_update {
            return ThreadUpdate::Unsupported;
        }
        self.threads = threads.to_vec();
        ThreadUpdate::Applied
    }
}

impl Drop for HostHintSession {
    fn drop(&mut self) {
        self.open_sessions.fetch_sub(1, Ordering::SeqCst);
        log::debug!("Hint session closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_is_observable() {
        let service = HostHintService::with_live_thread_update();
        let mut session = service
            .create_session(&[ThreadId(1)], Duration::from_millis(16))
            .unwrap();

        session.report_actual_work_duration(Duration::from_millis(5));
        session.update_target_work_duration(Duration::from_millis(8));

        assert_eq!(
            service.last_report(),
            Some(ReportSnapshot {
                actual: Duration::from_millis(5),
                target: Duration::from_millis(8),
            })
        );
    }

    #[test]
    fn test_live_variant_applies_thread_updates() {
        let service = HostHintService::with_live_thread_update();
        let mut session = service
            .create_session(&[ThreadId(1)], Duration::from_millis(16))
            .unwrap();
        assert_eq!(
            session.set_threads(&[ThreadId(1), ThreadId(2)]),
            ThreadUpdate::Applied
        );
    }

    #[test]
    fn test_reduced_variant_rejects_thread_updates() {
        let service = HostHintService::without_live_thread_update();
        let mut session = service
            .create_session(&[ThreadId(1)], Duration::from_millis(16))
            .unwrap();
        assert_eq!(session.set_threads(&[ThreadId(2)]), ThreadUpdate::Unsupported);
    }

    #[test]
    fn test_drop_closes_session() {
        let service = HostHintService::with_live_thread_update();
        let session = service
            .create_session(&[ThreadId(1)], Duration::from_millis(16))
            .unwrap();
        assert_eq!(service.open_sessions(), 1);
        drop(session);
        assert_eq!(service.open_sessions(), 0);
    }
}
