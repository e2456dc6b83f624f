//! Two-player matches and their lifecycle.
//!
//! ```text
//! Waiting ──start──> Started ──end──> Finished
//!    │                  │
//!    └────cancel────────┴──────────> Cancelled
//! ```
//!
//! A match stores player ids only; every operation that touches players
//! borrows the registry that owns them.

use core::fmt;
use rand::Rng;

use crate::board::Board;
use crate::common::MatchError;
use crate::config::MATCH_CAPACITY;
use crate::player::{PlayerId, PlayerRegistry};

/// Identifier assigned to a match by the matchmaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatchId(u64);

impl MatchId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "match {}", self.0)
    }
}

/// Current lifecycle state of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchState {
    Waiting,
    Started,
    Cancelled,
    Finished,
}

impl MatchState {
    /// `Waiting` or `Started`.
    pub fn is_active(self) -> bool {
        matches!(self, MatchState::Waiting | MatchState::Started)
    }
}

#[derive(Debug)]
pub struct Match {
    id: MatchId,
    players: Vec<PlayerId>,
    state: MatchState,
    /// Player allowed to fire next; set only while started.
    turn: Option<PlayerId>,
}

impl Match {
    /// Create an empty match in the `Waiting` state.
    pub fn new(id: MatchId) -> Self {
        Self {
            id,
            players: Vec::with_capacity(MATCH_CAPACITY),
            state: MatchState::Waiting,
            turn: None,
        }
    }

    pub fn id(&self) -> MatchId {
        self.id
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    /// Roster in joining order.
    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.players.contains(&player)
    }

    /// Player whose shot is next. The first player to join fires first.
    pub fn turn(&self) -> Option<PlayerId> {
        self.turn
    }

    /// Hand the turn to the other player.
    pub fn pass_turn(&mut self) {
        if let Some(current) = self.turn {
            self.turn = self.opponent_of(current);
        }
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= MATCH_CAPACITY
    }

    fn expect_state(&self, expected: MatchState) -> Result<(), MatchError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(MatchError::InvalidState {
                id: self.id,
                expected,
                actual: self.state,
            })
        }
    }

    /// Append a player to a waiting match.
    pub fn add_player(&mut self, player: PlayerId) -> Result<(), MatchError> {
        self.expect_state(MatchState::Waiting)?;
        if self.contains(player) {
            return Err(MatchError::DuplicatePlayer {
                id: self.id,
                player,
            });
        }
        if self.is_full() {
            return Err(MatchError::Full(self.id));
        }
        self.players.push(player);
        Ok(())
    }

    /// Start the match: place a fresh random fleet for both players and send
    /// each of them their own board.
    ///
    /// Nothing changes unless both fleets were placed.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        registry: &mut PlayerRegistry,
        rng: &mut R,
    ) -> Result<(), MatchError> {
        self.expect_state(MatchState::Waiting)?;
        if self.players.len() != MATCH_CAPACITY {
            return Err(MatchError::WrongPlayerCount {
                id: self.id,
                count: self.players.len(),
            });
        }
        if let Some(missing) = self.players.iter().find(|id| !registry.contains(**id)) {
            return Err(MatchError::UnknownPlayer(*missing));
        }

        let mut boards = Vec::with_capacity(MATCH_CAPACITY);
        for _ in &self.players {
            let mut board = Board::new();
            board.place_fleet_randomly(rng)?;
            boards.push(board);
        }

        self.state = MatchState::Started;
        self.turn = self.players.first().copied();
        for (id, board) in self.players.iter().zip(boards) {
            if let Some(player) = registry.get_mut(*id) {
                player.replace_board(board);
                player.notify("Match started! Your fleet:");
                player.session().send_bytes(player.board().render().into_bytes());
                if self.turn == Some(*id) {
                    player.notify("You fire first");
                } else {
                    player.notify("Your opponent fires first");
                }
            }
        }
        Ok(())
    }

    /// Remove a player from the roster. Losing a player cancels a started
    /// match; a waiting match just shrinks. Returns `false` if the player
    /// was not in the roster.
    pub fn remove_player(&mut self, player: PlayerId, registry: &mut PlayerRegistry) -> bool {
        let Some(pos) = self.players.iter().position(|p| *p == player) else {
            return false;
        };
        self.players.remove(pos);
        if self.state == MatchState::Started {
            self.cancel(registry);
        }
        true
    }

    /// Cancel the match and release every remaining player. No-op for a
    /// match that already ended.
    pub fn cancel(&mut self, registry: &mut PlayerRegistry) {
        if !self.state.is_active() {
            return;
        }
        self.state = MatchState::Cancelled;
        self.turn = None;
        for id in &self.players {
            if let Some(player) = registry.get_mut(*id) {
                player.notify("Match cancelled");
                player.leave_match();
            }
        }
    }

    /// Finish a started match normally and release its players.
    pub fn end(&mut self, registry: &mut PlayerRegistry) -> Result<(), MatchError> {
        self.expect_state(MatchState::Started)?;
        self.state = MatchState::Finished;
        self.turn = None;
        for id in &self.players {
            if let Some(player) = registry.get_mut(*id) {
                player.leave_match();
            }
        }
        Ok(())
    }

    /// The other roster member, if `player` is in the roster and has one.
    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        if !self.contains(player) {
            return None;
        }
        self.players.iter().copied().find(|p| *p != player)
    }
}
