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

//! Capability probing: inspect the platform context exactly once and
//! acquire whatever handles the selected tier needs.
//!
//! Probing never fails outward. Ambiguity degrades to the most
//! conservative tier, and a handle that does not resolve marks its
//! capability absent — the dependent operations become no-ops for the
//! process lifetime, which is strictly better than refusing to start.

use crate::hint::{HintSessionFactory, HostHintService, LegacyHintService};
use crate::thermal::{HeadroomFn, LegacyThermalProbe, SysinfoThermalProbe};
use pyra_core::capability::{Capabilities, CapabilityTier};
use pyra_core::hint::PerfHintService;
use pyra_core::platform::{PlatformContext, ThermalProbe};
use thiserror::Error;

/// First API generation with live thread-set updates on hint sessions.
pub const NATIVE_API_LEVEL: u32 = 34;
/// First API generation with a native thermal service.
pub const NATIVE_THERMAL_API_LEVEL: u32 = 30;

/// Why a handle acquisition failed. Consumed inside [`probe`]; callers
/// only ever see the degraded capability bundle.
#[derive(Debug, Error)]
enum ProbeError {
    #[error("platform handle '{0}' failed to resolve")]
    UnresolvedHandle(&'static str),
    #[error("no readable thermal sensor on this host")]
    NoThermalSensor,
}

/// Selects the capability tier for an API generation.
pub fn select_tier(api_level: u32) -> CapabilityTier {
    if api_level >= NATIVE_API_LEVEL {
        CapabilityTier::Native
    } else if api_level >= NATIVE_THERMAL_API_LEVEL {
        CapabilityTier::NativeThermalOnly
    } else {
        CapabilityTier::Legacy
    }
}

/// Probes the platform context and acquires tier-appropriate handles.
///
/// Called exactly once at startup; the returned bundle is the process's
/// capability set for its whole lifetime.
pub fn probe(ctx: &PlatformContext) -> Capabilities {
    let tier = select_tier(ctx.api_level);
    log::info!(
        "Probing platform: api_level={} -> tier {} ({} resolved handle(s))",
        ctx.api_level,
        tier,
        ctx.services.len()
    );
    if tier == CapabilityTier::Legacy && ctx.services.is_empty() {
        log::warn!("Legacy tier with an empty handle registry; running fully degraded");
    }

    let thermal = match tier {
        CapabilityTier::Native | CapabilityTier::NativeThermalOnly => acquire_native_thermal(),
        CapabilityTier::Legacy => acquire_legacy_thermal(ctx),
    };
    let hint = match tier {
        CapabilityTier::Native => {
            Some(Box::new(HostHintService::with_live_thread_update()) as Box<dyn PerfHintService>)
        }
        CapabilityTier::NativeThermalOnly => Some(Box::new(
            HostHintService::without_live_thread_update(),
        ) as Box<dyn PerfHintService>),
        CapabilityTier::Legacy => acquire_legacy_hint(ctx),
    };

    Capabilities {
        tier,
        thermal,
        hint,
    }
}

fn acquire_native_thermal() -> Option<Box<dyn ThermalProbe>> {
    match SysinfoThermalProbe::new().ok_or(ProbeError::NoThermalSensor) {
        Ok(probe) => Some(Box::new(probe)),
        Err(e) => {
            log::warn!("{e}; thermal headroom disabled");
            None
        }
    }
}

fn acquire_legacy_thermal(ctx: &PlatformContext) -> Option<Box<dyn ThermalProbe>> {
    let resolved = ctx
        .services
        .get::<HeadroomFn>()
        .ok_or(ProbeError::UnresolvedHandle("getThermalHeadroom"));
    match resolved {
        Ok(handle) => Some(Box::new(LegacyThermalProbe::new(handle))),
        Err(e) => {
            log::warn!("{e}; thermal headroom disabled");
            None
        }
    }
}

fn acquire_legacy_hint(ctx: &PlatformContext) -> Option<Box<dyn PerfHintService>> {
    let resolved = ctx
        .services
        .get::<HintSessionFactory>()
        .ok_or(ProbeError::UnresolvedHandle("createHintSession"));
    match resolved {
        Ok(factory) => Some(Box::new(LegacyHintService::new(factory))),
        Err(e) => {
            log::warn!("{e}; duration reporting disabled");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyra_core::hint::{PerfHintSession, ThreadId, ThreadUpdate};
    use std::time::Duration;

    struct NullSession;

    impl PerfHintSession for NullSession {
        fn report_actual_work_duration(&mut self, _actual: Duration) {}
        fn update_target_work_duration(&mut self, _target: Duration) {}
        fn set_threads(&mut self, _threads: &[ThreadId]) -> ThreadUpdate {
            ThreadUpdate::Applied
        }
    }

    #[test]
    fn test_tier_ladder() {
        assert_eq!(select_tier(36), CapabilityTier::Native);
        assert_eq!(select_tier(34), CapabilityTier::Native);
        assert_eq!(select_tier(33), CapabilityTier::NativeThermalOnly);
        assert_eq!(select_tier(30), CapabilityTier::NativeThermalOnly);
        assert_eq!(select_tier(29), CapabilityTier::Legacy);
        assert_eq!(select_tier(0), CapabilityTier::Legacy);
    }

    #[test]
    fn test_native_tiers_get_a_hint_service() {
        let caps = probe(&PlatformContext::new(34));
        assert_eq!(caps.tier, CapabilityTier::Native);
        assert!(caps.hint.is_some());
    }

    #[test]
    fn test_legacy_with_no_handles_degrades_silently() {
        let caps = probe(&PlatformContext::new(28));
        assert_eq!(caps.tier, CapabilityTier::Legacy);
        assert!(caps.thermal.is_none());
        assert!(caps.hint.is_none());
    }

    #[test]
    fn test_legacy_resolves_registered_handles() {
        let ctx = PlatformContext::new(28)
            .with_service(HeadroomFn::new(|_| 0.3))
            .with_service(HintSessionFactory::new(|_, _| {
                Some(Box::new(NullSession) as Box<dyn PerfHintSession>)
            }));

        let mut caps = probe(&ctx);
        assert_eq!(caps.tier, CapabilityTier::Legacy);
        assert_eq!(
            caps.thermal.as_mut().unwrap().headroom(Duration::from_secs(1)),
            Some(0.3)
        );
        assert!(caps.hint.is_some());
    }

    #[test]
    fn test_partial_resolution_keeps_what_resolved() {
        let ctx = PlatformContext::new(25).with_service(HeadroomFn::new(|_| 0.1));
        let caps = probe(&ctx);
        assert!(caps.thermal.is_some());
        assert!(caps.hint.is_none());
    }
}
