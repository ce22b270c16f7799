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

//! Thermal access through a handle resolved at startup.
//!
//! On the legacy tier there is no native thermal API; the embedder's
//! platform binding resolves a headroom accessor once (or fails to) and
//! registers it on the platform context. The prober wraps whatever
//! resolved into a regular [`ThermalProbe`].

use pyra_core::platform::ThermalProbe;
use std::sync::Arc;
use std::time::Duration;

/// Resolved headroom accessor, registered on the
/// [`ServiceRegistry`](pyra_core::service_registry::ServiceRegistry) by
/// the embedder's platform binding. Takes the forecast horizon.
pub struct HeadroomFn(pub Arc<dyn Fn(Duration) -> f32 + Send + Sync>);

impl HeadroomFn {
    /// Wraps a resolved accessor.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Duration) -> f32 + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }
}

/// [`ThermalProbe`] over a resolved [`HeadroomFn`].
pub struct LegacyThermalProbe {
    handle: Arc<HeadroomFn>,
}

impl LegacyThermalProbe {
    /// Builds the probe around the handle the prober resolved.
    pub fn new(handle: Arc<HeadroomFn>) -> Self {
        Self { handle }
    }
}

impl ThermalProbe for LegacyThermalProbe {
    fn headroom(&mut self, forecast: Duration) -> Option<f32> {
        let value = (self.handle.0)(forecast);
        // A non-finite answer means the underlying call misbehaved; treat
        // it as a transient failure rather than poisoning the sample.
        value.is_finite().then_some(value.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forwards_resolved_value() {
        let handle = Arc::new(HeadroomFn::new(|_| 0.62));
        let mut probe = LegacyThermalProbe::new(handle);
        assert_eq!(probe.headroom(Duration::from_secs(1)), Some(0.62));
    }

    #[test]
    fn test_clamps_negative_values() {
        let handle = Arc::new(HeadroomFn::new(|_| -1.0));
        let mut probe = LegacyThermalProbe::new(handle);
        assert_eq!(probe.headroom(Duration::from_secs(1)), Some(0.0));
    }

    #[test]
    fn test_non_finite_is_a_failed_query() {
        let handle = Arc::new(HeadroomFn::new(|_| f32::NAN));
        let mut probe = LegacyThermalProbe::new(handle);
        assert_eq!(probe.headroom(Duration::from_secs(1)), None);
    }
}
