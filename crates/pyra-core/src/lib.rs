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

//! # Pyra Core
//!
//! Foundational crate containing traits, core types, and interface contracts
//! for the adaptive performance-feedback stack.

#![warn(missing_docs)]

pub mod capability;
pub mod hint;
pub mod platform;
pub mod service_registry;
pub mod utils;

pub use capability::{Capabilities, CapabilityTier};
pub use platform::{PlatformContext, ThermalSample, ThermalStatus};
pub use utils::timer::Stopwatch;
