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

//! # Pyra Infra
//!
//! Concrete implementations of the contracts `pyra-core` defines: the
//! capability prober, the sysinfo-backed thermal probe, the host hint
//! service, and the legacy resolved-handle backends.

pub mod hint;
pub mod probe;
pub mod thermal;

pub use hint::{HintSessionFactory, HostHintService, LegacyHintService};
pub use probe::probe;
pub use thermal::{HeadroomFn, LegacyThermalProbe, SysinfoThermalProbe};
