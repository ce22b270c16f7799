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

//! Thermal state types and the probe contract.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Represents the thermal throttling severity of the device.
///
/// The integer codes are stable and follow the severity ladder of the
/// platform thermal service that feeds the asynchronous notification
/// channel. `from_code` / `code` round-trip for every variant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum ThermalStatus {
    /// No thermal mitigation is active.
    #[default]
    None,
    /// Light mitigation, not noticeable to the user.
    Light,
    /// Moderate mitigation, performance may be reduced.
    Moderate,
    /// Severe mitigation, the device is actively throttling.
    Severe,
    /// Critical mitigation, platform is shedding as much heat as it can.
    Critical,
    /// Emergency: device functionality is being curtailed.
    Emergency,
    /// The device needs to shut down imminently.
    Shutdown,
}

impl ThermalStatus {
    /// Converts a raw severity code from the platform notification channel.
    ///
    /// Out-of-range codes are clamped to the nearest legal severity rather
    /// than rejected, so a newer platform can never make this fail.
    pub fn from_code(code: i32) -> Self {
        match code {
            i32::MIN..=0 => ThermalStatus::None,
            1 => ThermalStatus::Light,
            2 => ThermalStatus::Moderate,
            3 => ThermalStatus::Severe,
            4 => ThermalStatus::Critical,
            5 => ThermalStatus::Emergency,
            _ => ThermalStatus::Shutdown,
        }
    }

    /// Returns the stable integer code for this severity.
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl std::fmt::Display for ThermalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The most recent thermal observation.
///
/// Mutated only by the thermal monitor; read by anyone through accessors.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThermalSample {
    /// Last severity pushed through the notification channel.
    pub status: ThermalStatus,
    /// Remaining thermal capacity estimate. Always `>= 0.0`; `0.0` when the
    /// headroom query is unavailable on this tier.
    pub headroom: f32,
    /// When the headroom was last polled. `None` before the first poll.
    pub sampled_at: Option<Instant>,
}

/// Callback invoked on every thermal status notification, with
/// `(previous, current)` severities.
///
/// The platform may deliver notifications on an arbitrary thread, so the
/// listener must either be thread-safe or hand off to the control thread.
pub type ThermalChangeListener = Box<dyn Fn(ThermalStatus, ThermalStatus) + Send + Sync>;

/// One bounded-latency query of the device's remaining thermal capacity.
///
/// Implementations live in `pyra-infra`; the monitor only cares that a
/// query either yields a headroom estimate for the given forecast horizon
/// or fails transiently (`None`), in which case the last sample stands.
pub trait ThermalProbe: Send {
    /// Queries the thermal headroom expected `forecast` from now.
    fn headroom(&mut self, forecast: Duration) -> Option<f32>;
}
