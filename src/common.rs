//! Common types for the server: shot results and the error taxonomy.

use core::fmt;

use crate::game::{MatchId, MatchState};
use crate::player::PlayerId;

/// Outcome of a shot at a board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireResult {
    /// The shot struck a ship segment.
    Hit,
    /// The shot landed in open water.
    Miss,
}

impl FireResult {
    pub fn is_hit(self) -> bool {
        matches!(self, FireResult::Hit)
    }
}

impl fmt::Display for FireResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FireResult::Hit => write!(f, "hit"),
            FireResult::Miss => write!(f, "miss"),
        }
    }
}

/// Reasons a grid reference such as `B3` fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GridRefError {
    #[error("reference too short")]
    TooShort,
    #[error("reference too long")]
    TooLong,
    #[error("row out of bounds")]
    RowOutOfBounds,
    #[error("invalid column number")]
    InvalidColumn,
    #[error("column number out of bounds")]
    ColumnOutOfBounds,
}

/// Errors returned by Board operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// The reference does not address a cell; nothing was changed.
    #[error("invalid reference {reference}: {source}")]
    InvalidReference {
        reference: String,
        #[source]
        source: GridRefError,
    },
    /// The addressed cell already holds a hit.
    #[error("already hit")]
    AlreadyHit,
    /// Ship placement runs off the board or overlaps another ship.
    #[error("ship of length {length} at cell {start} is out of bounds or overlaps")]
    InvalidPlacement { start: usize, length: usize },
    /// Random placement ran out of attempts.
    #[error("unable to place ship of length {length} after {attempts} attempts")]
    UnableToPlaceShip { length: usize, attempts: usize },
}

/// Contract violations on a match. None of these are caused by client input
/// alone; they abort the offending operation only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    #[error("{0} is full")]
    Full(MatchId),
    #[error("player {player} is already in {id}")]
    DuplicatePlayer { id: MatchId, player: PlayerId },
    #[error("{id} needs exactly 2 players to start, has {count}")]
    WrongPlayerCount { id: MatchId, count: usize },
    #[error("{id} is {actual:?}, expected {expected:?}")]
    InvalidState {
        id: MatchId,
        expected: MatchState,
        actual: MatchState,
    },
    #[error("player {0} is not registered")]
    UnknownPlayer(PlayerId),
    #[error(transparent)]
    Board(#[from] BoardError),
}

/// A client line that is not a valid command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    Unknown(String),
    /// `fire` without exactly one target.
    #[error("usage: fire <A-J><1-10>, e.g. fire B3")]
    FireUsage,
}
