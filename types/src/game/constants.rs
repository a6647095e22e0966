use std::time::Duration;

/// Seconds counted down between rounds.
pub const COUNTDOWN_SECS: u32 = 30;

/// Countdown tick period.
pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

/// Multiplier tick period while a round is running.
pub const MULTIPLIER_TICK: Duration = Duration::from_millis(100);

/// Delay between crash detection and the next countdown.
pub const RESTART_DELAY: Duration = Duration::from_secs(2);

/// Number of past crash points retained.
pub const HISTORY_CAPACITY: usize = 10;

/// Stake amount offered before the player picks one.
pub const DEFAULT_STAKE: u64 = 10;

/// Growth is +0.01 per tick below this multiplier (in hundredths).
pub const SLOW_GROWTH_UNTIL: u32 = 150;

/// Growth is +0.05 per tick below this multiplier (in hundredths), +0.10 above.
pub const MEDIUM_GROWTH_UNTIL: u32 = 500;

pub const SLOW_GROWTH_STEP: u32 = 1;
pub const MEDIUM_GROWTH_STEP: u32 = 5;
pub const FAST_GROWTH_STEP: u32 = 10;

/// Probability that a round crashes early (below 2.00x).
pub const EARLY_CRASH_PROBABILITY: f64 = 1.0 / 3.0;

/// Lower bound of every crash point.
pub const MIN_CRASH_POINT: f64 = 1.0;

/// Boundary between early and late crash draws.
pub const EARLY_CRASH_CEILING: f64 = 2.0;

/// Exclusive upper bound of late crash draws.
pub const LATE_CRASH_CEILING: f64 = 10.0;

/// Chart height; the curve starts at this vertical coordinate.
pub const CHART_BASELINE: f64 = 400.0;

/// Vertical pixels per unit of `ln(multiplier)`.
pub const CHART_LOG_SCALE: f64 = 50.0;

/// Horizontal advance per multiplier tick.
pub const CHART_X_STEP: f64 = 5.0;
