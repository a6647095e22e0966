//! Liftoff round execution.
//!
//! This crate contains the pure state machines behind a crash round: the
//! crash-point draw, the multiplier engine and its chart series, the crash
//! history, the between-round countdown and the wager ledger. [`Round`] is
//! the aggregate the game session drives.
//!
//! ## Determinism requirements
//! - No clocks: every timed transition is an explicit `tick` from the caller.
//! - No I/O: coin movements are returned to the caller, who mirrors them to
//!   the record store.
//! - Given the same crash point, a round produces the same multipliers and
//!   chart samples on every run.
//!
//! ## Minimal round (example)
//! ```rust
//! use liftoff_execution::{Round, RoundMode, RoundTick, WagerLedger};
//! use liftoff_types::{CrashPoint, Multiplier, PlayerId};
//!
//! let ledger = WagerLedger::new(PlayerId::from("player"), 100, 20);
//! let mut round = Round::new(ledger, RoundMode::Timed, 30, 10);
//!
//! let receipt = round.place_stake().unwrap();
//! // once the store has accepted the debit
//! round.confirm_stake(&receipt.stake);
//! round.begin(CrashPoint::new(5.0).unwrap()).unwrap();
//! while round.multiplier() < Multiplier::from_hundredths(300) {
//!     assert!(matches!(round.tick(), Some(RoundTick::Advanced(_))));
//! }
//! let settlement = round.cash_out().unwrap();
//! assert_eq!(settlement.winnings, 60);
//! assert_eq!(round.ledger().balance(), 140);
//! ```

pub mod chart;
pub mod countdown;
pub mod crash;
pub mod history;
pub mod ledger;
pub mod multiplier;
pub mod round;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

pub use chart::{curve_height, PointSeries};
pub use countdown::{Countdown, CountdownState, CountdownStep};
pub use crash::{draw_crash_point, CrashPointSource, RandomCrashPoints};
pub use history::CrashHistory;
pub use ledger::{RoundMode, Settlement, Stake, StakeError, StakeReceipt, WagerLedger};
pub use multiplier::{EngineError, MultiplierEngine, Tick};
pub use round::{Round, RoundTick};
