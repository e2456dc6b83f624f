//! The line-based command language spoken by clients.

use core::str::FromStr;

use crate::common::CommandError;

/// Help text sent in response to `help`.
pub const HELP: &str = "\
Commands:
  play        join the queue for a match
  fire <ref>  fire at your opponent on your turn, e.g. fire B3
  board       show your own board
  help        show this list
  quit        leave the server
";

/// A parsed client command. Verbs are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Join matchmaking.
    Play,
    /// Fire at the opponent's board; the reference is validated by the board.
    Fire(String),
    /// Show the player's own board.
    Board,
    Help,
    /// Close the session.
    Quit,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let verb = parts.next().unwrap_or_default().to_ascii_lowercase();
        match verb.as_str() {
            "play" => Ok(Command::Play),
            "fire" => match (parts.next(), parts.next()) {
                (Some(target), None) => Ok(Command::Fire(target.to_string())),
                _ => Err(CommandError::FireUsage),
            },
            "board" => Ok(Command::Board),
            "help" => Ok(Command::Help),
            "quit" => Ok(Command::Quit),
            _ => Err(CommandError::Unknown(line.trim().to_string())),
        }
    }
}
