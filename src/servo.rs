//! Servo loop: capture → detect → command → send, once per control period.
//!
//! The loop owns one detector, one navigator and one sink. It stops the base
//! itself on arrival, on abort and when the frame source dries up; the
//! navigator never sees those events.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use image::RgbImage;

use crate::actuator::BaseSink;
use crate::config::ControlConfig;
use crate::control::{Clock, Navigator, NavigatorState, SystemClock, VelocityCommand};
use crate::error::{DrishtiError, Result};
use crate::perception::{Detection, Detector, annotate};

/// Supplies camera frames.
pub trait FrameSource {
    /// Next frame, or `None` once the stream has ended or the camera failed.
    fn next_frame(&mut self) -> Result<Option<RgbImage>>;
}

/// Why the loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopOutcome {
    /// Target reached
    Arrived,
    /// Abort flag raised
    Aborted,
    /// Frame source returned no frame
    SourceExhausted,
    /// Configured cycle budget used up
    CycleLimit,
}

/// Summary of one run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoopReport {
    pub outcome: LoopOutcome,
    pub cycles: u64,
    pub final_state: NavigatorState,
    /// Last command computed by the navigator (before the closing stop)
    pub last_command: Option<VelocityCommand>,
}

struct FrameDump {
    dir: PathBuf,
    every: u64,
}

/// Fixed-rate visual-servoing loop.
pub struct ServoLoop<D: Detector, S: BaseSink, C: Clock + Clone = SystemClock> {
    detector: D,
    navigator: Navigator<C>,
    sink: S,
    config: ControlConfig,
    abort: Arc<AtomicBool>,
    dump: Option<FrameDump>,
}

impl<D: Detector, S: BaseSink, C: Clock + Clone> ServoLoop<D, S, C> {
    pub fn new(detector: D, navigator: Navigator<C>, sink: S, config: ControlConfig) -> Self {
        Self {
            detector,
            navigator,
            sink,
            config,
            abort: Arc::new(AtomicBool::new(false)),
            dump: None,
        }
    }

    /// Save an annotated frame every `every` cycles into `dir`.
    pub fn with_frame_dump(mut self, dir: impl Into<PathBuf>, every: u64) -> Self {
        self.dump = Some(FrameDump {
            dir: dir.into(),
            every: every.max(1),
        });
        self
    }

    /// Flag checked at the top of every cycle; set it to stop the base.
    pub fn abort_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.abort)
    }

    pub fn navigator(&self) -> &Navigator<C> {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut Navigator<C> {
        &mut self.navigator
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Run until arrival, abort, source exhaustion or the cycle limit.
    pub fn run<F: FrameSource>(&mut self, source: &mut F) -> Result<LoopReport> {
        self.config.validate()?;
        if let Some(dump) = &self.dump {
            std::fs::create_dir_all(&dump.dir)?;
        }

        let period = Duration::from_secs_f32(self.config.period_secs());
        let mut cycles = 0u64;
        let mut last_command = None;

        tracing::info!(
            "Servo loop started at {:.1}Hz{}",
            self.config.rate_hz,
            if self.config.realtime { " (realtime)" } else { "" }
        );

        let outcome = loop {
            let cycle_start = Instant::now();

            if self.abort.load(Ordering::Relaxed) {
                tracing::warn!("[ABORT] Navigation cancelled");
                break LoopOutcome::Aborted;
            }

            if let Some(max) = self.config.max_cycles
                && cycles >= max
            {
                tracing::warn!("Cycle limit {} reached before arrival", max);
                break LoopOutcome::CycleLimit;
            }

            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    tracing::warn!("Camera read error, stopping");
                    break LoopOutcome::SourceExhausted;
                }
                Err(e) => return Err(self.halt(e)),
            };

            let det = match self.detector.detect(&frame) {
                Ok(det) => det,
                Err(e) => return Err(self.halt(e)),
            };

            let command = self.navigator.compute_command(&det);
            if let Err(e) = self.sink.send(command) {
                return Err(self.halt(e));
            }
            last_command = Some(command);
            cycles += 1;

            tracing::debug!(
                "cycle {}: state={}, found={}, area={:.0}, {}",
                cycles,
                self.navigator.state(),
                det.found,
                det.area,
                command
            );

            if let Err(e) = self.dump_frame(cycles, &frame, &det) {
                return Err(self.halt(e));
            }

            if self.navigator.arrived() {
                tracing::info!("[ARRIVED] Object reached after {} cycles", cycles);
                break LoopOutcome::Arrived;
            }

            if self.config.realtime
                && let Some(rest) = period.checked_sub(cycle_start.elapsed())
            {
                std::thread::sleep(rest);
            }
        };

        self.sink.stop()?;

        Ok(LoopReport {
            outcome,
            cycles,
            final_state: self.navigator.state(),
            last_command,
        })
    }

    /// Best-effort stop before surfacing `err`.
    fn halt(&mut self, err: DrishtiError) -> DrishtiError {
        if let Err(stop_err) = self.sink.stop() {
            tracing::error!("Failed to send stop command: {}", stop_err);
        }
        err
    }

    fn dump_frame(&self, cycle: u64, frame: &RgbImage, det: &Detection) -> Result<()> {
        let Some(dump) = &self.dump else {
            return Ok(());
        };
        if cycle % dump.every != 0 {
            return Ok(());
        }
        let path = dump.dir.join(format!("frame_{:06}.png", cycle));
        annotate(frame, det).save(&path)?;
        tracing::trace!("Saved {:?}", path);
        Ok(())
    }
}
