pub mod constants;

use crate::player::Coins;
use constants::{
    FAST_GROWTH_STEP, MEDIUM_GROWTH_STEP, MEDIUM_GROWTH_UNTIL, MIN_CRASH_POINT, SLOW_GROWTH_STEP,
    SLOW_GROWTH_UNTIL,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of a round.
///
/// `AwaitingStart` is the only phase accepting stakes (in timed mode) and
/// `Running` the only phase accepting a cash-out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    AwaitingStart,
    Running,
    Crashed,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::AwaitingStart => "awaiting_start",
            Phase::Running => "running",
            Phase::Crashed => "crashed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Round multiplier with two decimal digits, stored in hundredths.
///
/// Keeping the value integral makes the per-tick rounding exact and
/// identical across runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Multiplier(u32);

impl Multiplier {
    pub const ONE: Self = Self(100);

    pub const fn from_hundredths(hundredths: u32) -> Self {
        Self(hundredths)
    }

    pub const fn hundredths(self) -> u32 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// Increment applied by the next tick.
    pub fn growth_step(self) -> u32 {
        if self.0 < SLOW_GROWTH_UNTIL {
            SLOW_GROWTH_STEP
        } else if self.0 < MEDIUM_GROWTH_UNTIL {
            MEDIUM_GROWTH_STEP
        } else {
            FAST_GROWTH_STEP
        }
    }

    /// Value after one tick.
    pub fn advanced(self) -> Self {
        Self(self.0.saturating_add(self.growth_step()))
    }

    /// `floor(stake * multiplier)`.
    pub fn payout(self, stake: Coins) -> Coins {
        let raw = u128::from(stake) * u128::from(self.0) / 100;
        u64::try_from(raw).unwrap_or(u64::MAX)
    }
}

impl Default for Multiplier {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Multiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}x", self.0 / 100, self.0 % 100)
    }
}

/// Multiplier at which a round ends on its own.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CrashPoint(f64);

impl CrashPoint {
    pub const MIN: Self = Self(MIN_CRASH_POINT);

    /// Returns `None` unless `value` is finite and at least 1.00.
    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && value >= MIN_CRASH_POINT).then_some(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Whether a displayed multiplier has reached this crash point.
    pub fn is_reached_by(self, multiplier: Multiplier) -> bool {
        multiplier.as_f64() >= self.0
    }
}

impl fmt::Display for CrashPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}x", self.0)
    }
}

/// One sample of the rendered curve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
}

impl ChartPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}
