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

//! The platform context handed to the capability prober at startup.

use crate::service_registry::ServiceRegistry;

/// Everything the capability prober is allowed to inspect, exactly once,
/// at startup.
///
/// This is an explicit context object rather than process-global state:
/// the embedder builds it, hands it to the prober, and the resulting
/// [`Capabilities`](crate::capability::Capabilities) carry whatever handles
/// were acquired. It is never consulted again after probing.
#[derive(Debug, Default)]
pub struct PlatformContext {
    /// Platform API generation, used to pick the capability tier.
    pub api_level: u32,
    /// Service handles the embedder's platform binding managed to resolve.
    pub services: ServiceRegistry,
}

impl PlatformContext {
    /// Creates a context for the given API generation with no resolved
    /// service handles.
    pub fn new(api_level: u32) -> Self {
        Self {
            api_level,
            services: ServiceRegistry::new(),
        }
    }

    /// Registers a resolved service handle on the context.
    pub fn with_service<T: Send + Sync + 'static>(mut self, handle: T) -> Self {
        self.services.insert(handle);
        self
    }
}
