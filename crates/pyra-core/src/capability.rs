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

//! Capability tiers and the probed capability bundle.

use crate::hint::PerfHintService;
use crate::platform::ThermalProbe;
use serde::{Deserialize, Serialize};

/// Which generation of the platform feedback surface is available.
///
/// Fixed exactly once at initialization by the capability prober and never
/// re-probed; every subsequent operation dispatches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapabilityTier {
    /// Full native feedback API, including live thread-set updates on an
    /// existing hint session.
    Native,
    /// Native thermal API, but hint sessions cannot mutate their thread
    /// set — every membership change recreates the session.
    NativeThermalOnly,
    /// Everything goes through handles resolved at startup; whether a live
    /// thread-set update exists depends on what resolved.
    Legacy,
}

impl std::fmt::Display for CapabilityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Everything the capability prober acquired for the process lifetime.
///
/// A `None` slot means the capability could not be resolved: the dependent
/// operations degrade to no-ops rather than failing.
pub struct Capabilities {
    /// The selected tier.
    pub tier: CapabilityTier,
    /// Headroom query path, if one resolved.
    pub thermal: Option<Box<dyn ThermalProbe>>,
    /// Hint-session creation path, if one resolved.
    pub hint: Option<Box<dyn PerfHintService>>,
}

impl Capabilities {
    /// A bundle with no resolved capabilities: the most conservative
    /// outcome a probe can have. Everything downstream becomes a no-op.
    pub fn disabled() -> Self {
        Self {
            tier: CapabilityTier::Legacy,
            thermal: None,
            hint: None,
        }
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities")
            .field("tier", &self.tier)
            .field("thermal", &self.thermal.is_some())
            .field("hint", &self.hint.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_bundle_is_legacy_and_empty() {
        let caps = Capabilities::disabled();
        assert_eq!(caps.tier, CapabilityTier::Legacy);
        assert!(caps.thermal.is_none());
        assert!(caps.hint.is_none());
    }
}
