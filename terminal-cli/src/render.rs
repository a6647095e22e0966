//! Plain-text rendering of session snapshots.

use liftoff_game::GameSnapshot;
use liftoff_types::Phase;

/// One-line summary of the round.
pub fn status_line(snapshot: &GameSnapshot) -> String {
    let phase = match snapshot.phase {
        Phase::AwaitingStart => match snapshot.seconds_remaining {
            Some(seconds) => format!("next round in {seconds}s"),
            None => "waiting for a bet".to_string(),
        },
        Phase::Running => format!("flying at {}", snapshot.multiplier),
        Phase::Crashed => match snapshot.crash_point {
            Some(point) => format!("crashed at {point}"),
            None => "crashed".to_string(),
        },
    };
    let mut line = format!(
        "[round {}] {phase} | balance {}",
        snapshot.round, snapshot.balance
    );
    match snapshot.stake {
        Some(stake) => line.push_str(&format!(" | stake {stake} in play")),
        None => line.push_str(&format!(" | stake {}", snapshot.stake_amount)),
    }
    if snapshot.cashed_out {
        line.push_str(&format!(" | won {}", snapshot.winnings));
    }
    if !snapshot.synced {
        line.push_str(" | syncing");
    }
    line
}

pub fn history_line(snapshot: &GameSnapshot) -> String {
    if snapshot.history.is_empty() {
        return "no rounds yet".to_string();
    }
    let points: Vec<String> = snapshot
        .history
        .iter()
        .map(|point| point.to_string())
        .collect();
    format!("recent crashes: {}", points.join(" "))
}

/// Whether `next` differs from `previous` in a way worth printing.
///
/// Multiplier ticks alone are not printed.
pub fn is_notable(previous: &GameSnapshot, next: &GameSnapshot) -> bool {
    previous.round != next.round
        || previous.phase != next.phase
        || previous.balance != next.balance
        || previous.stake != next.stake
        || previous.stake_amount != next.stake_amount
        || previous.cashed_out != next.cashed_out
        || previous.error != next.error
        || previous.seconds_remaining != next.seconds_remaining
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftoff_game::RoundMode;
    use liftoff_types::{CrashPoint, Multiplier, PlayerId};

    fn snapshot() -> GameSnapshot {
        GameSnapshot {
            player: PlayerId::from("p1"),
            balance: 80,
            round: 3,
            phase: Phase::Running,
            mode: RoundMode::Timed,
            multiplier: Multiplier::from_hundredths(245),
            crash_point: None,
            stake_amount: 20,
            stake: Some(20),
            has_stake: true,
            cashed_out: false,
            winnings: 0,
            points: Vec::new(),
            history: vec![CrashPoint::new(1.42).unwrap(), CrashPoint::new(3.1).unwrap()],
            seconds_remaining: None,
            synced: true,
            error: None,
        }
    }

    #[test]
    fn test_status_line() {
        assert_eq!(
            status_line(&snapshot()),
            "[round 3] flying at 2.45x | balance 80 | stake 20 in play"
        );

        let mut crashed = snapshot();
        crashed.phase = Phase::Crashed;
        crashed.crash_point = CrashPoint::new(2.5);
        crashed.stake = None;
        crashed.cashed_out = true;
        crashed.winnings = 40;
        assert_eq!(
            status_line(&crashed),
            "[round 3] crashed at 2.50x | balance 80 | stake 20 | won 40"
        );
    }

    #[test]
    fn test_history_line() {
        assert_eq!(history_line(&snapshot()), "recent crashes: 1.42x 3.10x");
    }

    #[test]
    fn test_ticks_are_not_notable() {
        let previous = snapshot();
        let mut next = previous.clone();
        next.multiplier = Multiplier::from_hundredths(250);
        assert!(!is_notable(&previous, &next));
        next.error = Some("boom".to_string());
        assert!(is_notable(&previous, &next));
    }
}
