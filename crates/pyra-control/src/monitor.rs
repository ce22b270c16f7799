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

//! Rate-limited thermal polling and status-change dispatch.
//!
//! The monitor has two inputs that never meet: the control thread polls
//! headroom through [`ThermalMonitor::monitor`] at most once per interval,
//! and the platform's own notification channel pushes severity codes
//! through a [`ThermalEndpoint`] from whatever thread it likes. The latest
//! observation is shared state; the poll cadence is not.

use pyra_core::platform::{ThermalChangeListener, ThermalProbe, ThermalSample, ThermalStatus};
use std::sync::atomic::{AtomicI32, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Shared thermal observation state.
///
/// Status and headroom are atomics because [`ThermalEndpoint::notify`] may
/// race reads from the control thread; the listener slot is behind a mutex
/// so registration can overwrite it at any time.
struct ThermalState {
    status_code: AtomicI32,
    headroom_bits: AtomicU32,
    listener: Mutex<Option<ThermalChangeListener>>,
}

impl ThermalState {
    fn new() -> Self {
        Self {
            status_code: AtomicI32::new(ThermalStatus::default().code()),
            headroom_bits: AtomicU32::new(0.0_f32.to_bits()),
            listener: Mutex::new(None),
        }
    }

    fn status(&self) -> ThermalStatus {
        ThermalStatus::from_code(self.status_code.load(Ordering::Acquire))
    }

    fn headroom(&self) -> f32 {
        f32::from_bits(self.headroom_bits.load(Ordering::Acquire))
    }

    /// Swaps the status and notifies the listener with the transition.
    ///
    /// The listener fires on every notification, including `prev == next`;
    /// the platform channel decides when to speak, not us.
    fn set_status(&self, code: i32) {
        let next = ThermalStatus::from_code(code);
        let prev =
            ThermalStatus::from_code(self.status_code.swap(next.code(), Ordering::AcqRel));
        log::info!("Thermal status updated to {next} (was {prev})");

        if let Ok(slot) = self.listener.lock() {
            if let Some(listener) = slot.as_ref() {
                listener(prev, next);
            }
        }
    }
}

/// Cloneable entry point for the platform notification channel.
///
/// `notify` takes the raw integer severity code the channel delivers and
/// may be called from an arbitrary thread. The registered listener runs
/// synchronously on that same thread.
#[derive(Clone)]
pub struct ThermalEndpoint {
    state: Arc<ThermalState>,
}

impl ThermalEndpoint {
    /// Records the new severity and dispatches the change listener.
    pub fn notify(&self, severity_code: i32) {
        self.state.set_status(severity_code);
    }
}

/// Polls thermal headroom at a bounded rate and holds the latest sample.
pub struct ThermalMonitor {
    probe: Option<Box<dyn ThermalProbe>>,
    state: Arc<ThermalState>,
    poll_interval: Duration,
    forecast: Duration,
    last_poll: Instant,
    sampled_at: Option<Instant>,
}

impl ThermalMonitor {
    /// Creates a monitor over the probed headroom path.
    ///
    /// `probe` is `None` on processes where no headroom query resolved; the
    /// sample then keeps its default headroom of `0.0` forever. The poll
    /// clock starts now, so the first effective poll happens one interval
    /// from construction.
    pub fn new(probe: Option<Box<dyn ThermalProbe>>, poll_interval: Duration, forecast: Duration) -> Self {
        if probe.is_none() {
            log::warn!("No thermal probe resolved; headroom reporting disabled");
        }
        Self {
            probe,
            state: Arc::new(ThermalState::new()),
            poll_interval,
            forecast,
            last_poll: Instant::now(),
            sampled_at: None,
        }
    }

    /// Per-frame poll entry point.
    ///
    /// Returns `false` without touching the platform when called again
    /// within the poll interval. Returns `true` when a poll was attempted;
    /// a transiently failing probe still advances the poll clock, so a
    /// stuck sensor cannot turn every frame into an OS call.
    pub fn monitor(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last_poll) < self.poll_interval {
            return false;
        }
        self.last_poll = now;

        if let Some(probe) = self.probe.as_mut() {
            match probe.headroom(self.forecast) {
                Some(headroom) => {
                    let headroom = headroom.max(0.0);
                    self.state
                        .headroom_bits
                        .store(headroom.to_bits(), Ordering::Release);
                    self.sampled_at = Some(now);
                    log::trace!("Thermal headroom polled: {headroom:.3}");
                }
                None => log::warn!("Thermal headroom query failed; keeping last sample"),
            }
        }
        true
    }

    /// Last severity pushed through the notification channel. Never polls.
    pub fn status(&self) -> ThermalStatus {
        self.state.status()
    }

    /// Last polled headroom. Never polls.
    pub fn headroom(&self) -> f32 {
        self.state.headroom()
    }

    /// The full latest observation.
    pub fn sample(&self) -> ThermalSample {
        ThermalSample {
            status: self.state.status(),
            headroom: self.state.headroom(),
            sampled_at: self.sampled_at,
        }
    }

    /// The notification entry point for the platform's status channel.
    ///
    /// Registration of this endpoint with the actual channel is the
    /// embedder's job; the monitor only hands out the handle.
    pub fn endpoint(&self) -> ThermalEndpoint {
        ThermalEndpoint {
            state: Arc::clone(&self.state),
        }
    }

    /// Synchronous status update, normally reached via [`ThermalEndpoint`].
    pub fn set_thermal_status(&self, severity_code: i32) {
        self.state.set_status(severity_code);
    }

    /// Registers the single status-change listener.
    ///
    /// There is exactly one slot: registering again replaces the previous
    /// listener. The listener runs on whichever thread delivers the
    /// notification, so it must be thread-safe or hand off.
    pub fn set_listener(&self, listener: ThermalChangeListener) {
        if let Ok(mut slot) = self.state.listener.lock() {
            if slot.replace(listener).is_some() {
                log::debug!("Thermal listener replaced");
            }
        }
    }

    /// Removes the registered listener, if any.
    pub fn clear_listener(&self) {
        if let Ok(mut slot) = self.state.listener.lock() {
            slot.take();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    struct CountingProbe {
        calls: Arc<AtomicUsize>,
        value: Option<f32>,
    }

    impl ThermalProbe for CountingProbe {
        fn headroom(&mut self, _forecast: Duration) -> Option<f32> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.value
        }
    }

    fn counting_monitor(value: Option<f32>) -> (ThermalMonitor, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let probe = CountingProbe {
            calls: Arc::clone(&calls),
            value,
        };
        let monitor = ThermalMonitor::new(
            Some(Box::new(probe)),
            Duration::from_secs(1),
            Duration::from_secs(1),
        );
        (monitor, calls)
    }

    #[test]
    fn test_poll_is_rate_limited() {
        let (mut monitor, calls) = counting_monitor(Some(0.5));
        let t0 = Instant::now();

        assert!(monitor.monitor(t0 + Duration::from_secs(1)));
        assert!(!monitor.monitor(t0 + Duration::from_millis(1500)));
        assert!(!monitor.monitor(t0 + Duration::from_millis(1999)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert!(monitor.monitor(t0 + Duration::from_secs(2)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_first_interval_is_quiet() {
        let (mut monitor, calls) = counting_monitor(Some(0.5));
        assert!(!monitor.monitor(Instant::now()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_poll_updates_sample() {
        let (mut monitor, _calls) = counting_monitor(Some(0.75));
        let t0 = Instant::now();
        monitor.monitor(t0 + Duration::from_secs(1));

        assert_eq!(monitor.headroom(), 0.75);
        assert!(monitor.sample().sampled_at.is_some());
    }

    #[test]
    fn test_failed_query_keeps_last_sample_and_cadence() {
        let (mut monitor, calls) = counting_monitor(None);
        let t0 = Instant::now();

        assert!(monitor.monitor(t0 + Duration::from_secs(1)));
        assert_eq!(monitor.headroom(), 0.0);
        assert!(monitor.sample().sampled_at.is_none());

        // The failed attempt still consumed this interval.
        assert!(!monitor.monitor(t0 + Duration::from_millis(1100)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_no_probe_means_zero_headroom() {
        let mut monitor = ThermalMonitor::new(None, Duration::from_secs(1), Duration::from_secs(1));
        let t0 = Instant::now();
        monitor.monitor(t0 + Duration::from_secs(5));
        assert_eq!(monitor.headroom(), 0.0);
    }

    #[test]
    fn test_set_status_round_trips_all_codes() {
        let monitor = ThermalMonitor::new(None, Duration::from_secs(1), Duration::from_secs(1));
        for code in 0..=6 {
            monitor.set_thermal_status(code);
            assert_eq!(monitor.status(), ThermalStatus::from_code(code));
        }
    }

    #[test]
    fn test_listener_fires_once_per_notification() {
        let monitor = ThermalMonitor::new(None, Duration::from_secs(1), Duration::from_secs(1));
        let seen: Arc<Mutex<Vec<(ThermalStatus, ThermalStatus)>>> =
            Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        monitor.set_listener(Box::new(move |prev, next| {
            sink.lock().unwrap().push((prev, next));
        }));

        monitor.set_thermal_status(3);
        // Same severity again: still notified, no de-duplication.
        monitor.set_thermal_status(3);
        monitor.set_thermal_status(1);

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                (ThermalStatus::None, ThermalStatus::Severe),
                (ThermalStatus::Severe, ThermalStatus::Severe),
                (ThermalStatus::Severe, ThermalStatus::Light),
            ]
        );
    }

    #[test]
    fn test_listener_slot_is_last_writer_wins() {
        let monitor = ThermalMonitor::new(None, Duration::from_secs(1), Duration::from_secs(1));
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let count = Arc::clone(&first);
        monitor.set_listener(Box::new(move |_, _| {
            count.fetch_add(1, Ordering::SeqCst);
        }));
        let count = Arc::clone(&second);
        monitor.set_listener(Box::new(move |_, _| {
            count.fetch_add(1, Ordering::SeqCst);
        }));

        monitor.set_thermal_status(2);
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_endpoint_notifies_from_another_thread() {
        let monitor = ThermalMonitor::new(None, Duration::from_secs(1), Duration::from_secs(1));
        let endpoint = monitor.endpoint();

        thread::spawn(move || endpoint.notify(4)).join().unwrap();
        assert_eq!(monitor.status(), ThermalStatus::Critical);
    }
}
