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

//! Hint sessions through a factory handle resolved at startup.
//!
//! The legacy tier reaches the hint service indirectly: the embedder's
//! platform binding resolves a session factory once and registers it on
//! the platform context. Sessions it produces decide for themselves
//! whether they support in-place thread updates; the session manager
//! reacts to the answer, not to the tier's promises.

use pyra_core::hint::{PerfHintService, PerfHintSession, ThreadId};
use std::sync::Arc;
use std::time::Duration;

/// Signature of the resolved session-creation handle.
pub type SessionFactoryFn =
    dyn Fn(&[ThreadId], Duration) -> Option<Box<dyn PerfHintSession>> + Send + Sync;

/// Resolved session factory, registered on the
/// [`ServiceRegistry`](pyra_core::service_registry::ServiceRegistry) by
/// the embedder's platform binding.
pub struct HintSessionFactory(pub Arc<SessionFactoryFn>);

impl HintSessionFactory {
    /// Wraps a resolved factory.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[ThreadId], Duration) -> Option<Box<dyn PerfHintSession>> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }
}

/// [`PerfHintService`] over a resolved [`HintSessionFactory`].
pub struct LegacyHintService {
    factory: Arc<HintSessionFactory>,
}

impl LegacyHintService {
    /// Builds the service around the handle the prober resolved.
    pub fn new(factory: Arc<HintSessionFactory>) -> Self {
        Self { factory }
    }
}

impl PerfHintService for LegacyHintService {
    fn create_session(
        &self,
        threads: &[ThreadId],
        target: Duration,
    ) -> Option<Box<dyn PerfHintSession>> {
        (self.factory.0)(threads, target)
    }
}
