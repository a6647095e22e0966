//! Observable session state.
//!
//! The session publishes a full [`GameSnapshot`] after every change and,
//! separately, the bare multiplier on every tick so a renderer can redraw the
//! counter without diffing the whole snapshot.

use liftoff_execution::{Round, RoundMode};
use liftoff_types::{ChartPoint, Coins, CrashPoint, Multiplier, Phase, PlayerId};
use serde::Serialize;
use tokio::sync::watch;

/// Everything a front end needs to render the game.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GameSnapshot {
    pub player: PlayerId,
    pub balance: Coins,
    /// Id of the current (or last) round; 0 before the first one.
    pub round: u64,
    pub phase: Phase,
    pub mode: RoundMode,
    pub multiplier: Multiplier,
    /// Only set once the round has crashed.
    pub crash_point: Option<CrashPoint>,
    pub stake_amount: i64,
    /// Amount of the open stake, including one still awaiting its debit.
    pub stake: Option<Coins>,
    /// An open stake whose debit the store has confirmed.
    pub has_stake: bool,
    pub cashed_out: bool,
    pub winnings: Coins,
    pub points: Vec<ChartPoint>,
    /// Past crash points, most recent first.
    pub history: Vec<CrashPoint>,
    pub seconds_remaining: Option<u32>,
    /// False while a balance write is pending.
    pub synced: bool,
    pub error: Option<String>,
}

impl GameSnapshot {
    pub fn capture(round: &Round, synced: bool, error: Option<&str>) -> Self {
        let ledger = round.ledger();
        Self {
            player: ledger.player().clone(),
            balance: ledger.balance(),
            round: round.id(),
            phase: round.phase(),
            mode: round.mode(),
            multiplier: round.multiplier(),
            crash_point: round.revealed_crash_point(),
            stake_amount: ledger.stake_amount(),
            stake: ledger.stake().map(|stake| stake.amount),
            has_stake: ledger.has_stake(),
            cashed_out: ledger.cashed_out(),
            winnings: ledger.winnings(),
            points: round.series().points().to_vec(),
            history: round.history().to_vec(),
            seconds_remaining: round.countdown().seconds_remaining(),
            synced,
            error: error.map(str::to_string),
        }
    }
}

/// Publishing side of the session's watch channels.
pub(crate) struct Presenter {
    snapshot: watch::Sender<GameSnapshot>,
    multiplier: watch::Sender<Multiplier>,
}

impl Presenter {
    pub(crate) fn new(
        initial: GameSnapshot,
    ) -> (
        Self,
        watch::Receiver<GameSnapshot>,
        watch::Receiver<Multiplier>,
    ) {
        let (multiplier, multiplier_rx) = watch::channel(initial.multiplier);
        let (snapshot, snapshot_rx) = watch::channel(initial);
        (
            Self {
                snapshot,
                multiplier,
            },
            snapshot_rx,
            multiplier_rx,
        )
    }

    pub(crate) fn publish(&self, snapshot: GameSnapshot) {
        self.multiplier.send_if_modified(|current| {
            let changed = *current != snapshot.multiplier;
            *current = snapshot.multiplier;
            changed
        });
        self.snapshot.send_if_modified(|current| {
            let changed = *current != snapshot;
            *current = snapshot;
            changed
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftoff_execution::WagerLedger;

    fn round() -> Round {
        let ledger = WagerLedger::new(PlayerId::from("p1"), 100, 20);
        Round::new(ledger, RoundMode::Timed, 30, 10)
    }

    #[test]
    fn test_capture_hides_crash_point_while_running() {
        let mut round = round();
        let receipt = round.place_stake().unwrap();
        round.begin(CrashPoint::new(2.0).unwrap()).unwrap();
        assert!(!GameSnapshot::capture(&round, false, None).has_stake);
        round.confirm_stake(&receipt.stake);

        let snapshot = GameSnapshot::capture(&round, false, None);
        assert_eq!(snapshot.balance, 80);
        assert_eq!(snapshot.round, 1);
        assert_eq!(snapshot.phase, Phase::Running);
        assert_eq!(snapshot.crash_point, None);
        assert_eq!(snapshot.stake, Some(20));
        assert!(snapshot.has_stake);
        assert!(!snapshot.synced);
        assert_eq!(snapshot.points.len(), 1);
    }

    #[test]
    fn test_publish_skips_unchanged() {
        let round = round();
        let initial = GameSnapshot::capture(&round, true, None);
        let (presenter, mut snapshots, mut multipliers) = Presenter::new(initial.clone());
        snapshots.mark_unchanged();
        multipliers.mark_unchanged();

        presenter.publish(initial);
        assert!(!snapshots.has_changed().unwrap());

        presenter.publish(GameSnapshot::capture(&round, true, Some("boom")));
        assert!(snapshots.has_changed().unwrap());
        assert!(!multipliers.has_changed().unwrap());
        assert_eq!(snapshots.borrow_and_update().error.as_deref(), Some("boom"));
    }
}
