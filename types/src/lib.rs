//! Common types shared by the liftoff crates.
//!
//! Player records and realtime events mirror the JSON documents exchanged with
//! the hosted record store. Round types (`Phase`, `Multiplier`, `CrashPoint`,
//! `ChartPoint`) are shared between the pure execution layer and the session
//! that drives it.

pub mod api;
pub mod game;
pub mod player;

pub use api::{AuthResponse, AuthWithPassword, CoinsUpdate, ErrorBody};
pub use game::{ChartPoint, CrashPoint, Multiplier, Phase};
pub use player::{Coins, PlayerId, PlayerRecord, RecordAction, RecordEvent};
