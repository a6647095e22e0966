//! Wager ledger.
//!
//! Validates and applies local coin movements for stakes and cash-outs. The
//! ledger is the provisional view of the balance; the session mirrors every
//! accepted movement to the record store and calls back into the ledger when
//! the store disagrees (rollback) or pushes a new value.

use liftoff_types::{Coins, Multiplier, Phase, PlayerId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// When stakes may be placed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundMode {
    /// Rounds start from the countdown; stakes only while awaiting start.
    #[default]
    Timed,
    /// No countdown; a confirmed stake starts the round, so stakes are
    /// accepted whenever no round is running.
    SingleBet,
}

impl RoundMode {
    pub fn accepts_stake_in(&self, phase: Phase) -> bool {
        match self {
            RoundMode::Timed => phase == Phase::AwaitingStart,
            RoundMode::SingleBet => phase != Phase::Running,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StakeError {
    #[error("stake must be positive (got {0})")]
    NonPositive(i64),
    #[error("stake of {amount} exceeds balance of {balance}")]
    InsufficientBalance { amount: Coins, balance: Coins },
    #[error("stakes are not accepted while {0}")]
    WrongPhase(Phase),
    #[error("a stake is already placed for this round")]
    AlreadyStaked,
}

/// Coins wagered on one round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stake {
    pub amount: Coins,
    pub player: PlayerId,
    pub round: u64,
}

/// A stake accepted locally; `balance` is the value to send to the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StakeReceipt {
    pub stake: Stake,
    pub balance: Coins,
}

/// A cash-out applied locally; `balance` is the value to send to the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub stake: Stake,
    pub multiplier: Multiplier,
    pub winnings: Coins,
    pub balance: Coins,
}

#[derive(Clone, Debug)]
pub struct WagerLedger {
    player: PlayerId,
    balance: Coins,
    stake_amount: i64,
    stake: Option<Stake>,
    confirmed: bool,
    cashed_out: bool,
    winnings: Coins,
}

impl WagerLedger {
    pub fn new(player: PlayerId, balance: Coins, stake_amount: i64) -> Self {
        Self {
            player,
            balance,
            stake_amount,
            stake: None,
            confirmed: false,
            cashed_out: false,
            winnings: 0,
        }
    }

    pub fn player(&self) -> &PlayerId {
        &self.player
    }

    pub fn balance(&self) -> Coins {
        self.balance
    }

    pub fn stake_amount(&self) -> i64 {
        self.stake_amount
    }

    /// The open stake, whether or not the store has confirmed its debit.
    pub fn stake(&self) -> Option<&Stake> {
        self.stake.as_ref()
    }

    /// Whether a stake is open and its debit has been confirmed.
    pub fn has_stake(&self) -> bool {
        self.stake.is_some() && self.confirmed
    }

    pub fn cashed_out(&self) -> bool {
        self.cashed_out
    }

    pub fn winnings(&self) -> Coins {
        self.winnings
    }

    pub fn set_stake_amount(&mut self, amount: i64) {
        self.stake_amount = amount;
    }

    /// Clamp the chosen stake to the balance, falling back to 1.
    pub fn fit_stake_to_balance(&mut self) {
        let balance = i64::try_from(self.balance).unwrap_or(i64::MAX);
        let fitted = self.stake_amount.min(balance);
        self.stake_amount = if fitted > 0 { fitted } else { 1 };
    }

    /// Overwrite the balance with an authoritative remote value.
    pub fn apply_remote_balance(&mut self, coins: Coins) {
        self.balance = coins;
    }

    /// Debit the chosen stake for `round`. State is unchanged on error.
    pub fn place_stake(
        &mut self,
        phase: Phase,
        mode: RoundMode,
        round: u64,
    ) -> Result<StakeReceipt, StakeError> {
        if !mode.accepts_stake_in(phase) {
            return Err(StakeError::WrongPhase(phase));
        }
        if self.stake.is_some() {
            return Err(StakeError::AlreadyStaked);
        }
        if self.stake_amount <= 0 {
            return Err(StakeError::NonPositive(self.stake_amount));
        }
        let amount = self.stake_amount as Coins;
        if amount > self.balance {
            return Err(StakeError::InsufficientBalance {
                amount,
                balance: self.balance,
            });
        }

        self.balance -= amount;
        let stake = Stake {
            amount,
            player: self.player.clone(),
            round,
        };
        self.stake = Some(stake.clone());
        self.confirmed = false;
        Ok(StakeReceipt {
            stake,
            balance: self.balance,
        })
    }

    /// Mark the debit of `stake` as accepted by the store. Returns `false`
    /// if it is no longer the open stake.
    pub fn confirm_stake(&mut self, stake: &Stake) -> bool {
        if self.stake.as_ref() != Some(stake) {
            return false;
        }
        self.confirmed = true;
        true
    }

    /// Undo a stake whose remote debit failed.
    ///
    /// The coins are always returned; the stake is only cleared if it is still
    /// the open stake. Unconfirmed stakes cannot be cashed out, so a refund
    /// never comes on top of winnings.
    pub fn rollback_stake(&mut self, stake: &Stake) {
        self.balance = self.balance.saturating_add(stake.amount);
        if self.stake.as_ref() == Some(stake) {
            self.stake = None;
            self.confirmed = false;
        }
    }

    /// Cash out at `multiplier`. Returns `None` (a no-op) unless a round is
    /// running and a confirmed stake is open and not yet cashed out.
    pub fn cash_out(&mut self, phase: Phase, multiplier: Multiplier) -> Option<Settlement> {
        if phase != Phase::Running || self.cashed_out || !self.confirmed {
            return None;
        }
        let stake = self.stake.take()?;
        self.confirmed = false;
        let winnings = multiplier.payout(stake.amount);
        self.balance = self.balance.saturating_add(winnings);
        self.cashed_out = true;
        self.winnings = winnings;
        Some(Settlement {
            stake,
            multiplier,
            winnings,
            balance: self.balance,
        })
    }

    /// Settle an open stake at crash: it is lost. Returns the lost stake.
    pub fn settle_crash(&mut self) -> Option<Stake> {
        self.confirmed = false;
        self.stake.take()
    }

    /// Forget the previous round's cash-out.
    ///
    /// An open stake is left alone: at this point it can only belong to the
    /// next round.
    pub fn clear_settlement(&mut self) {
        self.cashed_out = false;
        self.winnings = 0;
    }
}
