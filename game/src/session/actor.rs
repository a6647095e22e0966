use super::ingress::{Message, SessionHandle};
use crate::{
    store::{BalanceStore, Subscription},
    sync::BalanceSynchronizer,
    view::Presenter,
    GameError, GameSnapshot, SessionConfig,
};
use futures::{
    channel::{mpsc, oneshot},
    StreamExt,
};
use liftoff_execution::{
    CountdownStep, CrashPointSource, Round, RoundMode, RoundTick, Settlement, Stake, WagerLedger,
};
use liftoff_types::{Coins, PlayerId};
use std::{future::pending, pin::Pin};
use tokio::{
    task::JoinSet,
    time::{interval_at, sleep, Instant, Interval, MissedTickBehavior, Sleep},
};
use tracing::{debug, info, warn};

/// A local coin movement waiting to be mirrored to the store.
enum Mutation {
    Debit {
        stake: Stake,
        response: Option<oneshot::Sender<Result<(), GameError>>>,
    },
    Credit {
        settlement: Settlement,
    },
}

struct RefreshOutcome<E> {
    response: oneshot::Sender<bool>,
    result: Result<Coins, E>,
}

/// The game session actor.
///
/// Owns the round, its timers and the store subscription. Every command,
/// timer tick, push and store reply is handled on this one task.
pub struct Actor<S: BalanceStore, C: CrashPointSource> {
    store: S,
    config: SessionConfig,
    crash_points: C,
    round: Round,
    sync: BalanceSynchronizer<Mutation>,
    error: Option<String>,

    mailbox: mpsc::Receiver<Message>,
    presenter: Presenter,
    subscription: Option<Subscription>,
    writes: JoinSet<Result<Coins, S::Error>>,
    refreshes: JoinSet<RefreshOutcome<S::Error>>,

    multiplier_ticker: Option<Interval>,
    countdown_ticker: Option<Interval>,
    restart: Option<Pin<Box<Sleep>>>,
}

impl<S: BalanceStore, C: CrashPointSource> Actor<S, C> {
    /// Load the player's balance and open the balance subscription.
    pub async fn init(
        store: S,
        player: PlayerId,
        config: SessionConfig,
        crash_points: C,
    ) -> Result<(Self, SessionHandle), GameError> {
        config.validate()?;
        if player.is_empty() {
            return Err(GameError::Initialization("missing player id".to_string()));
        }
        if !store.is_authenticated() {
            return Err(GameError::Initialization("not signed in".to_string()));
        }
        let balance = store.get_balance(&player).await.map_err(|err| {
            warn!(%player, ?err, "failed to load balance");
            GameError::Initialization(err.to_string())
        })?;

        let mut ledger = WagerLedger::new(player.clone(), balance, config.default_stake);
        ledger.fit_stake_to_balance();
        let mut round = Round::new(
            ledger,
            config.mode,
            config.countdown_secs,
            config.history_capacity,
        );
        if let Some(width) = config.viewport_width {
            round.resize_viewport(width);
        }

        // Pushes are optional; without them external changes go unseen
        let subscription = match store.subscribe_balance(&player).await {
            Ok(subscription) => Some(subscription),
            Err(err) => {
                warn!(%player, ?err, "failed to subscribe to balance updates");
                None
            }
        };

        let (sender, mailbox) = mpsc::channel(config.mailbox_size);
        let (presenter, snapshot, multiplier) =
            Presenter::new(GameSnapshot::capture(&round, true, None));
        let handle = SessionHandle::new(sender, snapshot, multiplier);
        info!(%player, balance, mode = ?config.mode, "session initialized");

        let actor = Self {
            store,
            config,
            crash_points,
            round,
            sync: BalanceSynchronizer::new(),
            error: None,
            mailbox,
            presenter,
            subscription,
            writes: JoinSet::new(),
            refreshes: JoinSet::new(),
            multiplier_ticker: None,
            countdown_ticker: None,
            restart: None,
        };
        Ok((actor, handle))
    }

    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(mut self) {
        self.start_countdown();
        self.publish();

        loop {
            tokio::select! {
                message = self.mailbox.next() => {
                    let Some(message) = message else {
                        debug!("all session handles dropped");
                        self.teardown();
                        return;
                    };
                    if !self.handle(message) {
                        return;
                    }
                },
                Some(joined) = self.writes.join_next(), if !self.writes.is_empty() => {
                    let result = match joined {
                        Ok(result) => result.map_err(|err| err.to_string()),
                        Err(err) => {
                            warn!(?err, "balance write task failed");
                            Err(err.to_string())
                        }
                    };
                    self.on_write(result);
                },
                Some(joined) = self.refreshes.join_next(), if !self.refreshes.is_empty() => {
                    match joined {
                        Ok(outcome) => self.on_refresh(outcome),
                        Err(err) => warn!(?err, "balance refresh task failed"),
                    }
                },
                coins = next_push(&mut self.subscription) => {
                    match coins {
                        Some(coins) => self.on_push(coins),
                        None => {
                            let player = self.round.ledger().player();
                            warn!(%player, "balance subscription closed");
                            self.subscription = None;
                        }
                    }
                },
                _ = next_tick(&mut self.multiplier_ticker) => self.on_multiplier_tick(),
                _ = next_tick(&mut self.countdown_ticker) => self.on_countdown_tick(),
                _ = elapsed(&mut self.restart) => self.on_restart(),
            }
        }
    }

    /// Apply a command. Returns `false` once the session is torn down.
    fn handle(&mut self, message: Message) -> bool {
        match message {
            Message::SetStakeAmount { amount } => {
                self.round.ledger_mut().set_stake_amount(amount);
            }
            Message::PlaceStake { response } => self.place_stake(response),
            Message::CashOut { response } => {
                let winnings = self.cash_out();
                let _ = response.send(winnings);
            }
            Message::ClearError => {
                self.error = None;
            }
            Message::ResizeViewport { width } => {
                self.round.resize_viewport(width);
            }
            Message::RefreshBalance { response } => self.refresh_balance(response),
            Message::Reset { response } => {
                let _ = response.send(self.reset());
            }
            Message::Teardown { response } => {
                self.teardown();
                let _ = response.send(());
                return false;
            }
        }
        self.publish();
        true
    }

    fn publish(&self) {
        self.presenter.publish(GameSnapshot::capture(
            &self.round,
            self.sync.is_synced(),
            self.error.as_deref(),
        ));
    }

    fn set_error(&mut self, err: &GameError) {
        self.error = Some(err.to_string());
    }

    fn start_countdown(&mut self) {
        if !self.round.start_countdown() {
            return;
        }
        let period = self.config.countdown_tick();
        self.countdown_ticker = Some(ticker(period));
        debug!(
            seconds = self.round.countdown().duration_secs(),
            "countdown started"
        );
    }

    fn begin_round(&mut self) {
        let crash_point = self.crash_points.next_crash_point();
        match self.round.begin(crash_point) {
            Ok(_) => {
                self.countdown_ticker = None;
                self.restart = None;
                self.multiplier_ticker = Some(ticker(self.config.multiplier_tick()));
            }
            Err(err) => warn!(?err, "round not started"),
        }
    }

    fn on_countdown_tick(&mut self) {
        match self.round.tick_countdown() {
            CountdownStep::Idle => {
                self.countdown_ticker = None;
            }
            CountdownStep::Remaining(_) => {}
            CountdownStep::Expired => {
                self.countdown_ticker = None;
                self.begin_round();
            }
        }
        self.publish();
    }

    fn on_multiplier_tick(&mut self) {
        match self.round.tick() {
            None => {
                self.multiplier_ticker = None;
            }
            Some(RoundTick::Advanced(_)) => {}
            Some(RoundTick::Crashed { .. }) => {
                self.multiplier_ticker = None;
                self.restart = Some(Box::pin(sleep(self.config.restart_delay())));
            }
        }
        self.publish();
    }

    fn on_restart(&mut self) {
        self.restart = None;
        if self.round.finish() {
            self.start_countdown();
        }
        self.publish();
    }

    fn place_stake(&mut self, response: oneshot::Sender<Result<(), GameError>>) {
        match self.round.place_stake() {
            Ok(receipt) => self.write(Mutation::Debit {
                stake: receipt.stake,
                response: Some(response),
            }),
            Err(err) => {
                let err = GameError::from(err);
                debug!(%err, "stake rejected");
                self.set_error(&err);
                let _ = response.send(Err(err));
            }
        }
    }

    fn cash_out(&mut self) -> Option<Coins> {
        let settlement = self.round.cash_out()?;
        let winnings = settlement.winnings;
        self.write(Mutation::Credit { settlement });
        Some(winnings)
    }

    fn refresh_balance(&mut self, response: oneshot::Sender<bool>) {
        if !self.sync.is_synced() {
            debug!("balance refresh skipped while a write is pending");
            let _ = response.send(false);
            return;
        }
        let store = self.store.clone();
        let player = self.round.ledger().player().clone();
        self.refreshes.spawn(async move {
            let result = store.get_balance(&player).await;
            RefreshOutcome { response, result }
        });
    }

    fn reset(&mut self) -> Result<(), GameError> {
        if self.round.reset().is_err() {
            return Err(GameError::InternalState(
                "cannot reset while a stake is open".to_string(),
            ));
        }
        self.multiplier_ticker = None;
        self.countdown_ticker = None;
        self.restart = None;
        self.start_countdown();
        info!(player = %self.round.ledger().player(), "session reset");
        Ok(())
    }

    fn teardown(&mut self) {
        self.multiplier_ticker = None;
        self.countdown_ticker = None;
        self.restart = None;
        self.round.halt();
        if let Some(mut subscription) = self.subscription.take() {
            subscription.cancel();
        }
        // Writes already sent still reach the store
        self.writes.detach_all();
        self.refreshes.detach_all();
        self.sync.clear();
        info!(player = %self.round.ledger().player(), "session torn down");
        self.publish();
    }

    fn write(&mut self, mutation: Mutation) {
        if self.sync.enqueue(mutation) {
            self.dispatch();
        }
    }

    /// Send the current local balance on behalf of the in-flight movement.
    fn dispatch(&mut self) {
        let coins = self.round.ledger().balance();
        let store = self.store.clone();
        let player = self.round.ledger().player().clone();
        debug!(%player, coins, "syncing balance");
        self.writes.spawn(async move { store.set_balance(&player, coins).await });
    }

    fn on_write(&mut self, result: Result<Coins, String>) {
        let Some(mutation) = self.sync.complete() else {
            warn!("balance write resolved with nothing in flight");
            return;
        };
        match (mutation, result) {
            (Mutation::Debit { stake, response }, Ok(coins)) => {
                let still_open = self.round.confirm_stake(&stake);
                debug!(round = stake.round, coins, still_open, "debit accepted");
                if let Some(response) = response {
                    let _ = response.send(Ok(()));
                }
                if self.round.mode() == RoundMode::SingleBet
                    && still_open
                    && !self.round.is_running()
                {
                    self.begin_round();
                }
            }
            (Mutation::Debit { stake, response }, Err(err)) => {
                warn!(round = stake.round, amount = stake.amount, %err, "stake debit failed");
                self.round.ledger_mut().rollback_stake(&stake);
                let err = GameError::Sync(format!("Failed to place stake: {err}"));
                self.set_error(&err);
                if let Some(response) = response {
                    let _ = response.send(Err(err));
                }
            }
            (Mutation::Credit { settlement }, Ok(coins)) => {
                debug!(
                    round = settlement.stake.round,
                    winnings = settlement.winnings,
                    coins,
                    "cash-out confirmed"
                );
            }
            (Mutation::Credit { settlement }, Err(err)) => {
                warn!(
                    round = settlement.stake.round,
                    winnings = settlement.winnings,
                    %err,
                    "cash-out sync failed"
                );
                self.set_error(&GameError::Sync(format!(
                    "Coins saved locally but failed to sync with server: {err}"
                )));
            }
        }
        if !self.sync.is_synced() {
            self.dispatch();
        }
        self.publish();
    }

    fn on_refresh(&mut self, outcome: RefreshOutcome<S::Error>) {
        let RefreshOutcome { response, result } = outcome;
        let applied = match result {
            Ok(coins) if self.sync.is_synced() => {
                self.round.ledger_mut().apply_remote_balance(coins);
                debug!(coins, "balance refreshed");
                true
            }
            Ok(_) => {
                debug!("refreshed balance dropped; a write is pending");
                false
            }
            Err(err) => {
                warn!(?err, "balance refresh failed");
                false
            }
        };
        let _ = response.send(applied);
        self.publish();
    }

    fn on_push(&mut self, coins: Coins) {
        if !self.sync.is_synced() {
            debug!(coins, "ignoring remote balance while a write is pending");
            return;
        }
        if coins != self.round.ledger().balance() {
            debug!(coins, "remote balance applied");
        }
        self.round.ledger_mut().apply_remote_balance(coins);
        self.publish();
    }
}

fn ticker(period: std::time::Duration) -> Interval {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => pending().await,
    }
}

async fn elapsed(sleep: &mut Option<Pin<Box<Sleep>>>) {
    match sleep {
        Some(sleep) => sleep.as_mut().await,
        None => pending().await,
    }
}

async fn next_push(subscription: &mut Option<Subscription>) -> Option<Coins> {
    match subscription {
        Some(subscription) => subscription.recv().await,
        None => pending().await,
    }
}
