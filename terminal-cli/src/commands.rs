//! Typed commands read from stdin.

use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Choose the stake for the next round.
    Stake(i64),
    /// Place the chosen stake.
    Bet,
    CashOut,
    ClearError,
    Refresh,
    Reset,
    Width(f64),
    Status,
    History,
    Help,
    Quit,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    Unknown(String),
    MissingArgument(&'static str),
    InvalidArgument { command: &'static str, value: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => f.write_str("empty command"),
            ParseError::Unknown(name) => write!(f, "unknown command `{name}` (try `help`)"),
            ParseError::MissingArgument(usage) => write!(f, "usage: {usage}"),
            ParseError::InvalidArgument { command, value } => {
                write!(f, "invalid argument for {command}: `{value}`")
            }
        }
    }
}

impl std::error::Error for ParseError {}

pub const HELP: &str = "\
commands:
  stake <n>    choose the stake for the next round
  bet          place the chosen stake
  cash         cash out at the current multiplier
  clear        clear the last error
  refresh      reload the balance from the server
  reset        restart the round state (no open stake)
  width <px>   set the chart viewport width
  status       show the current round
  history      show recent crash points
  quit         leave the game";

impl Command {
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let mut parts = line.split_whitespace();
        let name = parts.next().ok_or(ParseError::Empty)?;
        let name = name.trim_start_matches('/').to_ascii_lowercase();
        let argument = parts.next();
        let command = match name.as_str() {
            "stake" | "amount" => {
                let value = argument.ok_or(ParseError::MissingArgument("stake <n>"))?;
                let amount = value.parse().map_err(|_| ParseError::InvalidArgument {
                    command: "stake",
                    value: value.to_string(),
                })?;
                Command::Stake(amount)
            }
            "bet" | "place" => Command::Bet,
            "cash" | "cashout" | "c" => Command::CashOut,
            "clear" => Command::ClearError,
            "refresh" => Command::Refresh,
            "reset" => Command::Reset,
            "width" => {
                let value = argument.ok_or(ParseError::MissingArgument("width <px>"))?;
                let width = value
                    .parse::<f64>()
                    .ok()
                    .filter(|width| width.is_finite() && *width >= 0.0)
                    .ok_or_else(|| ParseError::InvalidArgument {
                        command: "width",
                        value: value.to_string(),
                    })?;
                Command::Width(width)
            }
            "status" | "s" => Command::Status,
            "history" => Command::History,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            _ => return Err(ParseError::Unknown(name)),
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("stake 25"), Ok(Command::Stake(25)));
        assert_eq!(Command::parse("  /BET "), Ok(Command::Bet));
        assert_eq!(Command::parse("cash"), Ok(Command::CashOut));
        assert_eq!(Command::parse("width 640"), Ok(Command::Width(640.0)));
        assert_eq!(Command::parse("q"), Ok(Command::Quit));
    }

    #[test]
    fn test_negative_stake_reaches_session() {
        // validation belongs to the session, which reports it as an error
        assert_eq!(Command::parse("stake -5"), Ok(Command::Stake(-5)));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Command::parse("   "), Err(ParseError::Empty));
        assert_eq!(
            Command::parse("stake"),
            Err(ParseError::MissingArgument("stake <n>"))
        );
        assert!(matches!(
            Command::parse("stake lots"),
            Err(ParseError::InvalidArgument { command: "stake", .. })
        ));
        assert!(matches!(
            Command::parse("width inf"),
            Err(ParseError::InvalidArgument { command: "width", .. })
        ));
        assert_eq!(
            Command::parse("dance"),
            Err(ParseError::Unknown("dance".to_string()))
        );
    }
}
