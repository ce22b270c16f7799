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

//! A minimal monotonic stopwatch.

use std::time::{Duration, Instant};

/// Measures elapsed wall-clock time from a monotonic start point.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started_at: Instant,
}

impl Stopwatch {
    /// Starts a new stopwatch immediately.
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
        }
    }

    /// Time elapsed since the stopwatch was started or last restarted.
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Elapsed time in fractional seconds.
    pub fn elapsed_secs_f64(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }

    /// Resets the start point to now.
    pub fn restart(&mut self) {
        self.started_at = Instant::now();
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_elapsed_grows() {
        let watch = Stopwatch::new();
        thread::sleep(Duration::from_millis(2));
        assert!(watch.elapsed() >= Duration::from_millis(2));
    }

    #[test]
    fn test_restart_resets() {
        let mut watch = Stopwatch::new();
        thread::sleep(Duration::from_millis(2));
        watch.restart();
        assert!(watch.elapsed() < Duration::from_millis(2));
    }
}
