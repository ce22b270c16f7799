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

// Pyra sandbox: stands in for the rendering collaborator. It owns the
// frame loop, polls the monitor once per frame, brackets the simulated
// frame work in a hint span, resizes a fake worker pool mid-run, and
// pushes severities through the notification endpoint.

use anyhow::Result;
use pyra_control::{FeedbackConfig, FeedbackService};
use pyra_core::hint::{PerfHintSession, ThreadId, ThreadUpdate};
use pyra_core::platform::PlatformContext;
use pyra_infra::{HeadroomFn, HintSessionFactory, SysinfoThermalProbe};
use std::time::{Duration, Instant};

const FRAME_TARGET: Duration = Duration::from_nanos(16_666_666);
const FRAMES: u32 = 180;

/// Minimal legacy session so the legacy tier is exercisable on a host:
/// reports go to the log and thread updates force recreation.
struct LoggingSession;

impl PerfHintSession for LoggingSession {
    fn report_actual_work_duration(&mut self, actual: Duration) {
        log::trace!("(legacy) actual={}ns", actual.as_nanos());
    }

    fn update_target_work_duration(&mut self, target: Duration) {
        log::trace!("(legacy) target={}ns", target.as_nanos());
    }

    fn set_threads(&mut self, _threads: &[ThreadId]) -> ThreadUpdate {
        ThreadUpdate::Unsupported
    }
}

fn platform_context() -> PlatformContext {
    // PYRA_API_LEVEL picks the tier; 34 (full native) by default.
    let api_level = std::env::var("PYRA_API_LEVEL")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(34);

    PlatformContext::new(api_level)
        .with_service(HeadroomFn::new(|_forecast| 0.25))
        .with_service(HintSessionFactory::new(|_threads, _target| {
            Some(Box::new(LoggingSession) as Box<dyn PerfHintSession>)
        }))
}

fn main() -> Result<()> {
    env_logger::init();

    let ctx = platform_context();
    let caps = pyra_infra::probe(&ctx);
    // The run lasts well under the default 1 s poll interval, so shorten
    // it here; several polls land inside the demo window.
    let config = FeedbackConfig {
        poll_interval: Duration::from_millis(200),
        ..FeedbackConfig::default()
    };
    let mut service = FeedbackService::with_config(caps, config);
    log::info!("Running on tier {}", service.tier());

    service.set_thermal_listener(Box::new(|prev, next| {
        log::info!("Thermal transition: {prev} -> {next}");
    }));

    // A platform binding would register this endpoint with the OS thermal
    // channel; here the loop below drives it from sensor readings.
    let endpoint = service.thermal_endpoint();
    let status_source = SysinfoThermalProbe::new();

    for frame in 0..FRAMES {
        service.monitor(Instant::now());

        service.begin_hint_span();
        simulate_frame_work();
        service.end_hint_span(FRAME_TARGET);

        // Worker pool resize halfway through the run.
        if frame == FRAMES / 2 {
            log::info!("Growing worker pool");
            service.add_thread_id(ThreadId(1001));
            service.add_thread_id(ThreadId(1002));
        }
        if frame == FRAMES / 2 + 30 {
            log::info!("Shrinking worker pool");
            service.remove_thread_id(ThreadId(1002));
        }

        if frame % 60 == 0 {
            if let Some(status) = status_source.as_ref().and_then(|s| s.read_status()) {
                endpoint.notify(status.code());
            }
            log::info!(
                "frame {frame}: status={} headroom={:.3}",
                service.thermal_status(),
                service.thermal_headroom()
            );
        }
    }

    let sample = service.thermal_sample();
    log::info!(
        "Final sample: status={} headroom={:.3}",
        sample.status,
        sample.headroom
    );
    Ok(())
}

fn simulate_frame_work() {
    std::thread::sleep(Duration::from_millis(4));
}
