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

//! Contracts for the performance-hint surface of the platform.
//!
//! A *hint session* is a platform-recognized handle associating a set of
//! threads with a target per-frame work duration; the OS scheduler uses the
//! reported actual-vs-target durations to steer frequency scaling. The
//! traits here are implemented per capability tier in `pyra-infra`; the
//! session manager in `pyra-control` drives them without knowing which
//! tier it got.

use std::sync::atomic::{AtomicI32, Ordering};
use std::time::Duration;

/// A platform thread identifier, as handed to the hint service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThreadId(pub i32);

static NEXT_THREAD_ID: AtomicI32 = AtomicI32::new(1);

thread_local! {
    static CURRENT_THREAD_ID: ThreadId =
        ThreadId(NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed));
}

impl ThreadId {
    /// Returns the id of the calling thread.
    ///
    /// Ids are process-unique and stable for the lifetime of the thread,
    /// which is all the hint machinery needs to key a session member.
    pub fn current() -> Self {
        CURRENT_THREAD_ID.with(|id| *id)
    }
}

impl From<i32> for ThreadId {
    fn from(raw: i32) -> Self {
        ThreadId(raw)
    }
}

impl std::fmt::Display for ThreadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of asking a live session to replace its thread set in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadUpdate {
    /// The session now tracks the new thread set.
    Applied,
    /// This session cannot mutate its thread set; the caller must destroy
    /// and recreate it.
    Unsupported,
}

/// A live performance-hint session.
///
/// Implementations release their platform handle on `Drop`, so replacing a
/// boxed session closes the old one.
pub trait PerfHintSession: Send {
    /// Reports how long the bracketed work actually took.
    fn report_actual_work_duration(&mut self, actual: Duration);

    /// Updates the per-frame duration target the scheduler aims for.
    fn update_target_work_duration(&mut self, target: Duration);

    /// Attempts to replace the session's thread set in place.
    fn set_threads(&mut self, threads: &[ThreadId]) -> ThreadUpdate;
}

/// The tier-specific entry point for creating hint sessions.
pub trait PerfHintService: Send {
    /// Creates a session for `threads` with the given duration target.
    ///
    /// Returns `None` on a transient platform failure; the caller treats
    /// the session as absent and retries on the next recreation trigger.
    fn create_session(
        &self,
        threads: &[ThreadId],
        target: Duration,
    ) -> Option<Box<dyn PerfHintSession>>;

    /// The rate at which the platform prefers duration reports, if it
    /// advertises one.
    fn preferred_update_rate(&self) -> Option<Duration> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_current_thread_id_is_stable() {
        assert_eq!(ThreadId::current(), ThreadId::current());
    }

    #[test]
    fn test_thread_ids_differ_across_threads() {
        let here = ThreadId::current();
        let there = thread::spawn(ThreadId::current).join().unwrap();
        assert_ne!(here, there);
    }

    #[test]
    fn test_thread_id_from_raw() {
        assert_eq!(ThreadId::from(7), ThreadId(7));
    }
}
