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

//! # Pyra Control
//!
//! The adaptive performance-feedback service. [`FeedbackService`] owns one
//! rate-limited [`ThermalMonitor`] and one [`HintSessionManager`] and
//! exposes the uniform per-frame API the frame loop drives, regardless of
//! which capability tier the prober selected.

pub mod monitor;
pub mod service;
pub mod session;

pub use monitor::{ThermalEndpoint, ThermalMonitor};
pub use service::{FeedbackConfig, FeedbackService};
pub use session::HintSessionManager;
