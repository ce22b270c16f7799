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

//! Provides abstractions over platform-specific functionalities.
//!
//! This module contains the types and traits that define a common interface
//! for observing the thermal state of the host device, independent of which
//! capability tier is actually available at runtime.

pub mod context;
pub mod thermal;

pub use context::PlatformContext;
pub use thermal::{ThermalChangeListener, ThermalProbe, ThermalSample, ThermalStatus};
