use crate::GameError;
use liftoff_execution::RoundMode;
use liftoff_types::game::constants::{
    COUNTDOWN_SECS, COUNTDOWN_TICK, DEFAULT_STAKE, HISTORY_CAPACITY, MULTIPLIER_TICK, RESTART_DELAY,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Session timing and presentation settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub countdown_secs: u32,
    pub countdown_tick_ms: u64,
    pub multiplier_tick_ms: u64,
    /// Delay between a crash and the next countdown.
    pub restart_delay_ms: u64,
    pub history_capacity: usize,
    pub default_stake: i64,
    pub mode: RoundMode,
    /// Seed for reproducible crash points. Drawn from the OS when unset.
    pub seed: Option<u64>,
    pub mailbox_size: usize,
    pub viewport_width: Option<f64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            countdown_secs: COUNTDOWN_SECS,
            countdown_tick_ms: COUNTDOWN_TICK.as_millis() as u64,
            multiplier_tick_ms: MULTIPLIER_TICK.as_millis() as u64,
            restart_delay_ms: RESTART_DELAY.as_millis() as u64,
            history_capacity: HISTORY_CAPACITY,
            default_stake: DEFAULT_STAKE as i64,
            mode: RoundMode::Timed,
            seed: None,
            mailbox_size: 64,
            viewport_width: None,
        }
    }
}

impl SessionConfig {
    /// Defaults overridden by `LIFTOFF_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            countdown_secs: read_u32("LIFTOFF_COUNTDOWN_SECS", defaults.countdown_secs),
            countdown_tick_ms: read_ms("LIFTOFF_COUNTDOWN_TICK_MS", defaults.countdown_tick_ms),
            multiplier_tick_ms: read_ms("LIFTOFF_MULTIPLIER_TICK_MS", defaults.multiplier_tick_ms),
            restart_delay_ms: read_ms("LIFTOFF_RESTART_DELAY_MS", defaults.restart_delay_ms),
            history_capacity: read_usize("LIFTOFF_HISTORY_CAPACITY", defaults.history_capacity),
            default_stake: read_i64("LIFTOFF_DEFAULT_STAKE", defaults.default_stake),
            mode: read_mode("LIFTOFF_MODE", defaults.mode),
            seed: std::env::var("LIFTOFF_SEED")
                .ok()
                .and_then(|raw| raw.parse::<u64>().ok())
                .or(defaults.seed),
            mailbox_size: read_usize("LIFTOFF_MAILBOX_SIZE", defaults.mailbox_size),
            viewport_width: std::env::var("LIFTOFF_VIEWPORT_WIDTH")
                .ok()
                .and_then(|raw| raw.parse::<f64>().ok())
                .filter(|width| width.is_finite())
                .or(defaults.viewport_width),
        }
    }

    pub fn validate(&self) -> Result<(), GameError> {
        let zero = |name: &str| -> Result<(), GameError> {
            Err(GameError::Initialization(format!("{name} must be non-zero")))
        };
        if self.countdown_secs == 0 {
            return zero("countdown_secs");
        }
        if self.countdown_tick_ms == 0 {
            return zero("countdown_tick_ms");
        }
        if self.multiplier_tick_ms == 0 {
            return zero("multiplier_tick_ms");
        }
        if self.history_capacity == 0 {
            return zero("history_capacity");
        }
        if self.mailbox_size == 0 {
            return zero("mailbox_size");
        }
        Ok(())
    }

    pub fn countdown_tick(&self) -> Duration {
        Duration::from_millis(self.countdown_tick_ms)
    }

    pub fn multiplier_tick(&self) -> Duration {
        Duration::from_millis(self.multiplier_tick_ms)
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }
}

fn read_ms(key: &str, fallback: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.parse::<u64>().ok())
        .unwrap_or(fallback)
}

fn read_u32(key: &str, fallback: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .unwrap_or(fallback)
}

fn read_i64(key: &str, fallback: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.parse::<i64>().ok())
        .unwrap_or(fallback)
}

fn read_usize(key: &str, fallback: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.parse::<usize>().ok())
        .unwrap_or(fallback)
}

fn read_mode(key: &str, fallback: RoundMode) -> RoundMode {
    match std::env::var(key).ok().as_deref().map(str::trim) {
        Some("timed") => RoundMode::Timed,
        Some("single_bet") | Some("single-bet") => RoundMode::SingleBet,
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.countdown_secs, 30);
        assert_eq!(config.countdown_tick(), Duration::from_secs(1));
        assert_eq!(config.multiplier_tick(), Duration::from_millis(100));
        assert_eq!(config.restart_delay(), Duration::from_secs(2));
        assert_eq!(config.history_capacity, 10);
        assert_eq!(config.mode, RoundMode::Timed);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"mode":"single_bet","seed":7}"#).unwrap();
        assert_eq!(config.mode, RoundMode::SingleBet);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.multiplier_tick_ms, 100);
    }

    #[test]
    fn test_validate_rejects_zero_periods() {
        let config = SessionConfig {
            multiplier_tick_ms: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(GameError::Initialization(_))
        ));

        let config = SessionConfig {
            countdown_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
