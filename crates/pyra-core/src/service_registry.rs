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

//! A type-keyed directory of resolved platform service handles.
//!
//! On degraded capability tiers the platform surface is reached through
//! handles that are looked up once at initialization and cached. The
//! [`ServiceRegistry`] models that lookup: the embedder registers whatever
//! handles its platform binding could resolve, and the capability prober
//! queries them by type. A missing entry is the normal way of saying
//! "this handle failed to resolve" — it is never an error.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Type-keyed map of platform service handles.
///
/// Handles are stored as `Arc` so the prober can hand clones to the
/// backends it builds while the context object stays intact.
#[derive(Default)]
pub struct ServiceRegistry {
    handles: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl ServiceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handles: HashMap::new(),
        }
    }

    /// Registers a resolved handle, keyed by its concrete type.
    ///
    /// Registering a second handle of the same type replaces the first.
    pub fn insert<T: Send + Sync + 'static>(&mut self, handle: T) {
        if self
            .handles
            .insert(TypeId::of::<T>(), Arc::new(handle))
            .is_some()
        {
            log::debug!(
                "Service handle {} re-registered",
                std::any::type_name::<T>()
            );
        }
    }

    /// Looks up a handle by type, cloning the shared reference.
    ///
    /// Returns `None` when no handle of type `T` was resolved.
    #[must_use]
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.handles
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|arc| arc.downcast::<T>().ok())
    }

    /// Returns `true` if a handle of type `T` was resolved.
    #[must_use]
    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        self.handles.contains_key(&TypeId::of::<T>())
    }

    /// Returns the number of resolved handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns `true` if nothing resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("handles", &self.handles.len())
            .finish()
    }
}
