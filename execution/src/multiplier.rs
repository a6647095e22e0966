//! Multiplier engine.
//!
//! Owns the per-round growth curve. The engine has no clock: the caller
//! invokes [`MultiplierEngine::tick`] once per tick period while a round is
//! running. Only one round may run at a time.

use crate::chart::PointSeries;
use liftoff_types::{ChartPoint, CrashPoint, Multiplier};
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    #[error("a round is already running")]
    AlreadyRunning,
}

/// Result of one engine tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Tick {
    /// The multiplier grew and the round continues.
    Advanced {
        multiplier: Multiplier,
        sample: ChartPoint,
    },
    /// The multiplier reached the crash point; the round is over.
    Crashed {
        crash_point: CrashPoint,
        multiplier: Multiplier,
        sample: ChartPoint,
    },
}

#[derive(Clone, Debug)]
pub struct MultiplierEngine {
    multiplier: Multiplier,
    crash_point: Option<CrashPoint>,
    series: PointSeries,
    running: bool,
}

impl Default for MultiplierEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiplierEngine {
    pub fn new() -> Self {
        Self {
            multiplier: Multiplier::ONE,
            crash_point: None,
            series: PointSeries::default(),
            running: false,
        }
    }

    /// Start a round that will crash at `crash_point`.
    pub fn begin(&mut self, crash_point: CrashPoint) -> Result<(), EngineError> {
        if self.running {
            return Err(EngineError::AlreadyRunning);
        }
        self.multiplier = Multiplier::ONE;
        self.crash_point = Some(crash_point);
        self.series.reset_to_origin();
        self.running = true;
        Ok(())
    }

    /// Advance one tick. Returns `None` when no round is running.
    pub fn tick(&mut self) -> Option<Tick> {
        if !self.running {
            return None;
        }
        let crash_point = self.crash_point?;

        self.multiplier = self.multiplier.advanced();
        let sample = self.series.push_sample(self.multiplier);

        if crash_point.is_reached_by(self.multiplier) {
            self.running = false;
            return Some(Tick::Crashed {
                crash_point,
                multiplier: self.multiplier,
                sample,
            });
        }
        Some(Tick::Advanced {
            multiplier: self.multiplier,
            sample,
        })
    }

    /// Stop without crashing (teardown or reset).
    pub fn halt(&mut self) {
        self.running = false;
    }

    /// Return to the idle state between rounds.
    pub fn reset(&mut self) {
        self.multiplier = Multiplier::ONE;
        self.crash_point = None;
        self.series.clear();
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn multiplier(&self) -> Multiplier {
        self.multiplier
    }

    /// The crash point, hidden while the round is still running.
    pub fn revealed_crash_point(&self) -> Option<CrashPoint> {
        if self.running {
            None
        } else {
            self.crash_point
        }
    }

    pub fn series(&self) -> &PointSeries {
        &self.series
    }

    pub fn clamp_to_viewport(&mut self, width: f64) -> bool {
        self.series.clamp_to_viewport(width)
    }
}
