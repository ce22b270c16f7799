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

//! sysinfo-based implementation of the ThermalProbe trait.

use pyra_core::platform::{ThermalProbe, ThermalStatus};
use std::time::Duration;
use sysinfo::Components;

/// Temperature at which the platform is assumed to hit severe throttling.
/// Headroom is reported as the fraction of this envelope consumed.
const SEVERE_TEMP_C: f32 = 85.0;

/// A thermal probe that reads CPU temperature sensors via `sysinfo`.
pub struct SysinfoThermalProbe {
    _private: (),
}

impl SysinfoThermalProbe {
    /// Creates the probe, or `None` when the host exposes no readable CPU
    /// temperature sensor (headless VMs, most CI).
    pub fn new() -> Option<Self> {
        let probe = Self { _private: () };
        if max_cpu_temp().is_none() {
            return None;
        }
        Some(probe)
    }

    /// Maps the current temperature onto the severity ladder.
    ///
    /// Intended for embedders that drive the notification channel
    /// themselves when no platform thermal service exists to do it.
    pub fn read_status(&self) -> Option<ThermalStatus> {
        let temp = max_cpu_temp()?;
        Some(if temp > 90.0 {
            ThermalStatus::Critical
        } else if temp > 80.0 {
            ThermalStatus::Severe
        } else if temp > 70.0 {
            ThermalStatus::Moderate
        } else if temp > 60.0 {
            ThermalStatus::Light
        } else {
            ThermalStatus::None
        })
    }
}

impl ThermalProbe for SysinfoThermalProbe {
    fn headroom(&mut self, _forecast: Duration) -> Option<f32> {
        let temp = max_cpu_temp()?;
        Some((temp / SEVERE_TEMP_C).max(0.0))
    }
}

/// Hottest CPU-adjacent sensor reading, if any sensor is readable.
fn max_cpu_temp() -> Option<f32> {
    let components = Components::new_with_refreshed_list();
    let mut max_temp: Option<f32> = None;

    for component in &components {
        let label = component.label().to_lowercase();
        if label.contains("cpu") || label.contains("core") {
            if let Some(temp) = component.temperature() {
                max_temp = Some(max_temp.map_or(temp, |m| f32::max(m, temp)));
            }
        }
    }
    max_temp
}
