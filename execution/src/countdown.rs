//! Countdown between rounds.
//!
//! A pure state machine: `Idle -> Counting(n) -> Idle`. The session owns the
//! timer that calls [`Countdown::tick`] once per second; when the count
//! reaches zero the countdown returns to idle and reports expiry.

/// Countdown state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownState {
    Idle,
    Counting(u32),
}

/// Outcome of one countdown tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownStep {
    /// Not counting; the tick was ignored.
    Idle,
    /// Still counting, with this many seconds left.
    Remaining(u32),
    /// Reached zero; a round should begin.
    Expired,
}

#[derive(Clone, Debug)]
pub struct Countdown {
    duration_secs: u32,
    state: CountdownState,
}

impl Countdown {
    pub fn new(duration_secs: u32) -> Self {
        Self {
            duration_secs,
            state: CountdownState::Idle,
        }
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    pub fn state(&self) -> CountdownState {
        self.state
    }

    pub fn is_counting(&self) -> bool {
        matches!(self.state, CountdownState::Counting(_))
    }

    pub fn seconds_remaining(&self) -> Option<u32> {
        match self.state {
            CountdownState::Idle => None,
            CountdownState::Counting(remaining) => Some(remaining),
        }
    }

    /// (Re)start from the full duration.
    pub fn start(&mut self) {
        self.state = CountdownState::Counting(self.duration_secs);
    }

    /// Stop counting. Safe to call when idle.
    pub fn cancel(&mut self) {
        self.state = CountdownState::Idle;
    }

    pub fn tick(&mut self) -> CountdownStep {
        match self.state {
            CountdownState::Idle => CountdownStep::Idle,
            CountdownState::Counting(remaining) => {
                let remaining = remaining.saturating_sub(1);
                if remaining == 0 {
                    self.state = CountdownState::Idle;
                    CountdownStep::Expired
                } else {
                    self.state = CountdownState::Counting(remaining);
                    CountdownStep::Remaining(remaining)
                }
            }
        }
    }
}
