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

//! Central facade of the performance-feedback stack.

use crate::monitor::{ThermalEndpoint, ThermalMonitor};
use crate::session::HintSessionManager;
use pyra_core::capability::{Capabilities, CapabilityTier};
use pyra_core::hint::ThreadId;
use pyra_core::platform::{ThermalChangeListener, ThermalSample, ThermalStatus};
use std::time::{Duration, Instant};

/// Configuration for the feedback service.
#[derive(Debug, Clone)]
pub struct FeedbackConfig {
    /// Minimum spacing between effective headroom polls. Calls to
    /// [`FeedbackService::monitor`] inside this window are no-ops.
    pub poll_interval: Duration,
    /// Forecast horizon passed to the headroom query.
    pub forecast: Duration,
    /// Session duration target used before the caller reports one.
    pub default_target: Duration,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            forecast: Duration::from_secs(1),
            // One 60 Hz frame.
            default_target: Duration::from_nanos(16_666_666),
        }
    }
}

/// The adaptive performance-feedback service.
///
/// One instance per process, owned by the frame/render loop. All methods
/// are meant for that control thread except the [`ThermalEndpoint`]
/// returned by [`thermal_endpoint`](Self::thermal_endpoint), which the
/// platform notification channel may drive from any thread.
///
/// Nothing here is fatal: on a process where probing resolved nothing the
/// service still constructs, answers `0.0` headroom, and turns every hint
/// operation into a no-op.
pub struct FeedbackService {
    tier: CapabilityTier,
    monitor: ThermalMonitor,
    session: HintSessionManager,
}

impl FeedbackService {
    /// Builds the service from probed capabilities with default config.
    ///
    /// This is the once-at-startup entry point; the embedder probes its
    /// platform context first and hands the result in.
    pub fn new(caps: Capabilities) -> Self {
        Self::with_config(caps, FeedbackConfig::default())
    }

    /// Builds the service with an explicit configuration.
    pub fn with_config(caps: Capabilities, config: FeedbackConfig) -> Self {
        log::info!("Feedback service starting on tier {}", caps.tier);
        Self {
            tier: caps.tier,
            monitor: ThermalMonitor::new(caps.thermal, config.poll_interval, config.forecast),
            session: HintSessionManager::new(caps.tier, caps.hint, config.default_target),
        }
    }

    /// Per-frame thermal poll; rate-limited internally.
    ///
    /// Returns `true` when a poll was actually attempted.
    pub fn monitor(&mut self, now: Instant) -> bool {
        self.monitor.monitor(now)
    }

    /// Last known thermal severity. Pure read.
    pub fn thermal_status(&self) -> ThermalStatus {
        self.monitor.status()
    }

    /// Last polled thermal headroom. Pure read.
    pub fn thermal_headroom(&self) -> f32 {
        self.monitor.headroom()
    }

    /// The latest full thermal observation.
    pub fn thermal_sample(&self) -> ThermalSample {
        self.monitor.sample()
    }

    /// Registers the single thermal-change listener (replaces any previous
    /// one; it runs on the notifying thread).
    pub fn set_thermal_listener(&self, listener: ThermalChangeListener) {
        self.monitor.set_listener(listener);
    }

    /// Handle for the platform's asynchronous severity notifications.
    pub fn thermal_endpoint(&self) -> ThermalEndpoint {
        self.monitor.endpoint()
    }

    /// Brackets the start of the frame's performance-sensitive work.
    pub fn begin_hint_span(&mut self) {
        self.session.begin_span();
    }

    /// Brackets the end of the work and reports actual-vs-target.
    pub fn end_hint_span(&mut self, target: Duration) {
        self.session.end_span(target);
    }

    /// Registers a worker thread with the hint session.
    pub fn add_thread_id(&mut self, tid: ThreadId) {
        self.session.add_thread_id(tid);
    }

    /// Withdraws a worker thread from the hint session.
    pub fn remove_thread_id(&mut self, tid: ThreadId) {
        self.session.remove_thread_id(tid);
    }

    /// The capability tier fixed at initialization.
    pub fn tier(&self) -> CapabilityTier {
        self.tier
    }

    /// The session manager, for embedders that want its accessors.
    pub fn hint_session(&self) -> &HintSessionManager {
        &self.session
    }
}
