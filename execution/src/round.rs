//! Aggregate round state.
//!
//! [`Round`] ties the engine, ledger, history and countdown together and
//! enforces the phase rules between them:
//!
//! ```text
//! AwaitingStart --begin--> Running --crash--> Crashed --finish--> AwaitingStart
//! ```
//!
//! Nothing here touches a clock or the network. The session decides when to
//! tick and mirrors ledger movements to the record store.

use crate::{
    chart::PointSeries,
    countdown::{Countdown, CountdownStep},
    history::CrashHistory,
    ledger::{RoundMode, Settlement, Stake, StakeError, StakeReceipt, WagerLedger},
    multiplier::{EngineError, MultiplierEngine, Tick},
};
use liftoff_types::{CrashPoint, Multiplier, Phase};
use tracing::{debug, info};

/// Outcome of one multiplier tick as seen by the round.
#[derive(Clone, Debug, PartialEq)]
pub enum RoundTick {
    Advanced(Multiplier),
    Crashed {
        crash_point: CrashPoint,
        /// Stake that was still open and is now lost.
        lost: Option<Stake>,
    },
}

#[derive(Clone, Debug)]
pub struct Round {
    id: u64,
    phase: Phase,
    mode: RoundMode,
    engine: MultiplierEngine,
    ledger: WagerLedger,
    history: CrashHistory,
    countdown: Countdown,
    viewport_width: Option<f64>,
}

impl Round {
    pub fn new(
        ledger: WagerLedger,
        mode: RoundMode,
        countdown_secs: u32,
        history_capacity: usize,
    ) -> Self {
        Self {
            id: 0,
            phase: Phase::AwaitingStart,
            mode,
            engine: MultiplierEngine::new(),
            ledger,
            history: CrashHistory::new(history_capacity),
            countdown: Countdown::new(countdown_secs),
            viewport_width: None,
        }
    }

    /// Id of the current (or last) round; 0 before the first round.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode(&self) -> RoundMode {
        self.mode
    }

    pub fn multiplier(&self) -> Multiplier {
        self.engine.multiplier()
    }

    pub fn revealed_crash_point(&self) -> Option<CrashPoint> {
        self.engine.revealed_crash_point()
    }

    pub fn series(&self) -> &PointSeries {
        self.engine.series()
    }

    pub fn ledger(&self) -> &WagerLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut WagerLedger {
        &mut self.ledger
    }

    pub fn history(&self) -> &CrashHistory {
        &self.history
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn viewport_width(&self) -> Option<f64> {
        self.viewport_width
    }

    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    /// Start the countdown. Only timed rounds count down, and only between
    /// rounds.
    pub fn start_countdown(&mut self) -> bool {
        if self.mode != RoundMode::Timed || self.phase != Phase::AwaitingStart {
            return false;
        }
        self.countdown.start();
        true
    }

    pub fn cancel_countdown(&mut self) {
        self.countdown.cancel();
    }

    pub fn tick_countdown(&mut self) -> CountdownStep {
        self.countdown.tick()
    }

    /// Begin the next round, returning its id.
    pub fn begin(&mut self, crash_point: CrashPoint) -> Result<u64, EngineError> {
        self.engine.begin(crash_point)?;
        self.countdown.cancel();
        self.ledger.clear_settlement();
        self.id += 1;
        self.phase = Phase::Running;
        if let Some(width) = self.viewport_width {
            self.engine.clamp_to_viewport(width);
        }
        info!(round = self.id, staked = self.ledger.stake().is_some(), "round started");
        Ok(self.id)
    }

    /// Advance the multiplier. Returns `None` unless a round is running.
    pub fn tick(&mut self) -> Option<RoundTick> {
        let tick = self.engine.tick()?;
        if let Some(width) = self.viewport_width {
            self.engine.clamp_to_viewport(width);
        }
        match tick {
            Tick::Advanced { multiplier, .. } => Some(RoundTick::Advanced(multiplier)),
            Tick::Crashed {
                crash_point,
                multiplier,
                ..
            } => {
                self.phase = Phase::Crashed;
                self.history.push(crash_point);
                let lost = self.ledger.settle_crash();
                info!(
                    round = self.id,
                    %crash_point,
                    %multiplier,
                    lost = lost.as_ref().map(|stake| stake.amount),
                    "round crashed"
                );
                Some(RoundTick::Crashed { crash_point, lost })
            }
        }
    }

    /// Place the chosen stake on the next round.
    pub fn place_stake(&mut self) -> Result<StakeReceipt, StakeError> {
        let target = match self.phase {
            Phase::Running => self.id,
            Phase::AwaitingStart | Phase::Crashed => self.id + 1,
        };
        let receipt = self.ledger.place_stake(self.phase, self.mode, target)?;
        debug!(
            round = target,
            amount = receipt.stake.amount,
            balance = receipt.balance,
            "stake placed"
        );
        Ok(receipt)
    }

    /// Record that the store accepted the debit for `stake`.
    ///
    /// Returns `false` if the stake is no longer open.
    pub fn confirm_stake(&mut self, stake: &Stake) -> bool {
        self.ledger.confirm_stake(stake)
    }

    /// Cash out the confirmed stake at the current multiplier.
    pub fn cash_out(&mut self) -> Option<Settlement> {
        let settlement = self
            .ledger
            .cash_out(self.phase, self.engine.multiplier())?;
        info!(
            round = self.id,
            multiplier = %settlement.multiplier,
            winnings = settlement.winnings,
            "cashed out"
        );
        Some(settlement)
    }

    /// Move from `Crashed` back to `AwaitingStart`, keeping the history.
    ///
    /// Returns `false` if the round is not in `Crashed` (for example because a
    /// single-bet stake already started the next one).
    pub fn finish(&mut self) -> bool {
        if self.phase != Phase::Crashed {
            return false;
        }
        self.engine.reset();
        self.ledger.clear_settlement();
        self.phase = Phase::AwaitingStart;
        true
    }

    /// Restore the initial round state, keeping player and balance.
    ///
    /// Refused while a stake is open, since its coins have already left the
    /// balance.
    pub fn reset(&mut self) -> Result<(), StakeError> {
        if self.ledger.stake().is_some() {
            return Err(StakeError::AlreadyStaked);
        }
        self.engine.reset();
        self.countdown.cancel();
        self.history.clear();
        self.ledger.clear_settlement();
        self.phase = Phase::AwaitingStart;
        Ok(())
    }

    /// Stop any running round without settling it.
    pub fn halt(&mut self) {
        self.engine.halt();
        self.countdown.cancel();
    }

    /// Record the viewport width and clamp the series to it.
    pub fn resize_viewport(&mut self, width: f64) -> bool {
        if !width.is_finite() {
            return false;
        }
        let width = width.max(0.0);
        self.viewport_width = Some(width);
        self.engine.clamp_to_viewport(width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftoff_types::{Coins, PlayerId};

    fn round(balance: Coins, stake: i64, mode: RoundMode) -> Round {
        let ledger = WagerLedger::new(PlayerId::from("p1"), balance, stake);
        Round::new(ledger, mode, 30, 10)
    }

    fn crash(value: f64) -> CrashPoint {
        CrashPoint::new(value).unwrap()
    }

    fn tick_until(round: &mut Round, target: Multiplier) {
        while round.multiplier() < target {
            match round.tick() {
                Some(RoundTick::Advanced(_)) => {}
                other => panic!("unexpected tick {other:?}"),
            }
        }
    }

    fn run_to_crash(round: &mut Round) -> RoundTick {
        loop {
            match round.tick().expect("running") {
                RoundTick::Advanced(_) => {}
                crashed => return crashed,
            }
        }
    }

    #[test]
    fn test_stake_then_cash_out_at_three() {
        let mut round = round(100, 20, RoundMode::Timed);
        let receipt = round.place_stake().unwrap();
        assert_eq!(round.ledger().balance(), 80);
        assert!(round.confirm_stake(&receipt.stake));
        assert!(round.ledger().has_stake());

        round.begin(crash(5.0)).unwrap();
        tick_until(&mut round, Multiplier::from_hundredths(300));
        let settlement = round.cash_out().unwrap();
        assert_eq!(settlement.winnings, 60);
        assert_eq!(round.ledger().balance(), 140);
        assert!(round.ledger().cashed_out());

        // second cash-out is a no-op
        assert!(round.cash_out().is_none());
        // crash settles nothing
        let RoundTick::Crashed { lost, .. } = run_to_crash(&mut round) else {
            unreachable!()
        };
        assert!(lost.is_none());
        assert_eq!(round.ledger().balance(), 140);
    }

    #[test]
    fn test_full_stake_lost_on_crash() {
        let mut round = round(50, 50, RoundMode::Timed);
        round.place_stake().unwrap();
        round.begin(crash(1.42)).unwrap();
        let tick = run_to_crash(&mut round);
        let RoundTick::Crashed { crash_point, lost } = tick else {
            unreachable!()
        };
        assert_eq!(crash_point, crash(1.42));
        assert_eq!(lost.map(|stake| stake.amount), Some(50));
        assert_eq!(round.phase(), Phase::Crashed);
        assert!(!round.ledger().has_stake());
        assert_eq!(round.ledger().balance(), 0);
        assert_eq!(round.history().latest(), Some(crash(1.42)));
    }

    #[test]
    fn test_cash_out_waits_for_confirmation() {
        let mut round = round(100, 20, RoundMode::Timed);
        let receipt = round.place_stake().unwrap();
        round.begin(crash(5.0)).unwrap();
        tick_until(&mut round, Multiplier::from_hundredths(120));
        assert!(round.cash_out().is_none());

        assert!(round.confirm_stake(&receipt.stake));
        let settlement = round.cash_out().unwrap();
        assert_eq!(settlement.winnings, 24);
        assert_eq!(round.ledger().balance(), 104);
    }

    #[test]
    fn test_stake_rejected_while_running() {
        let mut round = round(100, 10, RoundMode::Timed);
        round.begin(crash(2.0)).unwrap();
        assert_eq!(
            round.place_stake(),
            Err(StakeError::WrongPhase(Phase::Running))
        );
        assert_eq!(round.ledger().balance(), 100);
    }

    #[test]
    fn test_no_second_round_while_running() {
        let mut round = round(100, 10, RoundMode::Timed);
        assert_eq!(round.begin(crash(2.0)), Ok(1));
        assert_eq!(round.begin(crash(3.0)), Err(EngineError::AlreadyRunning));
        assert_eq!(round.id(), 1);
    }

    #[test]
    fn test_finish_keeps_history() {
        let mut round = round(100, 10, RoundMode::Timed);
        for (i, value) in [1.1, 1.2, 1.3].into_iter().enumerate() {
            round.begin(crash(value)).unwrap();
            run_to_crash(&mut round);
            assert!(round.finish());
            assert_eq!(round.phase(), Phase::AwaitingStart);
            assert_eq!(round.history().len(), i + 1);
        }
        assert_eq!(
            round.history().to_vec(),
            vec![crash(1.3), crash(1.2), crash(1.1)]
        );
        assert!(round.series().is_empty());
        assert!(!round.finish());
    }

    #[test]
    fn test_history_caps_at_ten() {
        let mut round = round(100, 10, RoundMode::Timed);
        for i in 0..15 {
            round.begin(crash(1.01 + i as f64 * 0.01)).unwrap();
            run_to_crash(&mut round);
            round.finish();
        }
        assert_eq!(round.history().len(), 10);
        assert_eq!(round.history().latest(), Some(crash(1.01 + 14.0 * 0.01)));
    }

    #[test]
    fn test_countdown_only_in_timed_mode() {
        let mut timed = round(100, 10, RoundMode::Timed);
        assert!(timed.start_countdown());
        assert_eq!(timed.countdown().seconds_remaining(), Some(30));
        timed.begin(crash(2.0)).unwrap();
        assert!(!timed.countdown().is_counting());
        assert!(!timed.start_countdown());

        let mut single = round(100, 10, RoundMode::SingleBet);
        assert!(!single.start_countdown());
    }

    #[test]
    fn test_single_bet_stake_after_crash_starts_next_round() {
        let mut round = round(100, 10, RoundMode::SingleBet);
        round.place_stake().unwrap();
        round.begin(crash(1.05)).unwrap();
        run_to_crash(&mut round);

        let receipt = round.place_stake().unwrap();
        assert_eq!(receipt.stake.round, 2);
        assert_eq!(round.begin(crash(2.0)), Ok(2));
        // the delayed finish no longer applies
        assert!(!round.finish());
        assert_eq!(round.phase(), Phase::Running);
        assert_eq!(round.ledger().stake(), Some(&receipt.stake));
    }

    #[test]
    fn test_reset_refused_with_open_stake() {
        let mut round = round(100, 10, RoundMode::Timed);
        round.begin(crash(1.05)).unwrap();
        run_to_crash(&mut round);
        round.finish();
        round.place_stake().unwrap();
        assert_eq!(round.reset(), Err(StakeError::AlreadyStaked));
        assert_eq!(round.history().len(), 1);
    }

    #[test]
    fn test_reset_clears_round_and_history() {
        let mut round = round(100, 10, RoundMode::Timed);
        round.begin(crash(1.05)).unwrap();
        run_to_crash(&mut round);
        round.reset().unwrap();
        assert_eq!(round.phase(), Phase::AwaitingStart);
        assert!(round.history().is_empty());
        assert_eq!(round.multiplier(), Multiplier::ONE);
        assert_eq!(round.ledger().balance(), 100);
        assert_eq!(round.begin(crash(4.0)), Ok(2));
    }

    #[test]
    fn test_viewport_clamp_follows_ticks() {
        let mut round = round(100, 10, RoundMode::Timed);
        assert!(!round.resize_viewport(100.0));
        round.begin(crash(9.0)).unwrap();
        for _ in 0..60 {
            round.tick();
        }
        assert_eq!(round.series().last().unwrap().x, 100.0);
        assert!(!round.resize_viewport(100.0));
        assert!(round.resize_viewport(50.0));
        assert_eq!(round.series().last().unwrap().x, 50.0);
        assert!(!round.resize_viewport(f64::NAN));
    }
}
