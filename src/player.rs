//! Per-connection game state and the registry of connected players.

use std::collections::HashMap;

use crate::board::Board;
use crate::game::MatchId;
use crate::session::{SessionHandle, SessionId};

/// A player is identified by its session.
pub type PlayerId = SessionId;

/// Game state attached to one connected session.
#[derive(Debug)]
pub struct Player {
    session: SessionHandle,
    board: Board,
    match_id: Option<MatchId>,
}

impl Player {
    pub fn new(session: SessionHandle) -> Self {
        Self {
            session,
            board: Board::new(),
            match_id: None,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.session.id()
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Swap in a new board, e.g. a freshly placed fleet for a new match.
    pub fn replace_board(&mut self, board: Board) {
        self.board = board;
    }

    /// `true` while the player is queued in or playing a match.
    pub fn in_match(&self) -> bool {
        self.match_id.is_some()
    }

    pub fn match_id(&self) -> Option<MatchId> {
        self.match_id
    }

    pub fn join_match(&mut self, id: MatchId) {
        self.match_id = Some(id);
    }

    pub fn leave_match(&mut self) {
        self.match_id = None;
    }

    /// Queue a newline-terminated notice for this player's client.
    pub fn notify(&self, text: impl AsRef<str>) {
        self.session.send_line(text);
    }
}

/// All connected players, keyed by id.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: HashMap<PlayerId, Player>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a player, returning any previous entry with the same id.
    pub fn insert(&mut self, player: Player) -> Option<Player> {
        self.players.insert(player.id(), player)
    }

    pub fn remove(&mut self, id: PlayerId) -> Option<Player> {
        self.players.remove(&id)
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Ids of every registered player, in ascending order.
    pub fn ids(&self) -> Vec<PlayerId> {
        let mut ids: Vec<_> = self.players.keys().copied().collect();
        ids.sort();
        ids
    }
}
