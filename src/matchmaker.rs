//! The matchmaker: sole owner of the player registry and of every match.
//!
//! Sessions never touch shared state. They send join requests over a small
//! bounded queue and everything else (registration, disconnects, shots,
//! queries) over an unbounded event queue. The matchmaker task consumes
//! both and applies each request in turn, so no locks are needed and
//! "who becomes player 2" is simply whichever join is processed first.

use std::collections::BTreeMap;

use log::{debug, error, info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tokio::sync::{mpsc, oneshot};

use crate::config::ServerConfig;
use crate::game::{Match, MatchId, MatchState};
use crate::player::{Player, PlayerId, PlayerRegistry};
use crate::session::SessionHandle;

/// Requests other than joins, processed in arrival order.
#[derive(Debug)]
pub enum Event {
    /// A new connection; acknowledged once the player is registered.
    Connected {
        session: SessionHandle,
        registered: oneshot::Sender<()>,
    },
    /// The player's connection is gone.
    Disconnected(PlayerId),
    /// The player fires at the given reference on the opponent's board.
    Fire { player: PlayerId, target: String },
    /// The player asks to see their own board.
    ShowBoard(PlayerId),
    /// Report the current matchmaking state.
    Snapshot(oneshot::Sender<Snapshot>),
}

/// A match as seen from outside the matchmaker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSummary {
    pub id: MatchId,
    pub state: MatchState,
    pub players: Vec<PlayerId>,
}

/// Point-in-time view of the matchmaker's state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Registered players in ascending id order.
    pub players: Vec<PlayerId>,
    /// In-flight matches in creation order.
    pub matches: Vec<MatchSummary>,
    pub finished: u64,
    pub cancelled: u64,
}

impl Snapshot {
    /// The match currently accepting players.
    pub fn waiting(&self) -> Option<&MatchSummary> {
        self.matches.iter().find(|m| m.state == MatchState::Waiting)
    }

    /// The in-flight match containing `player`.
    pub fn match_of(&self, player: PlayerId) -> Option<&MatchSummary> {
        self.matches.iter().find(|m| m.players.contains(&player))
    }
}

/// Sending side of the matchmaker's queues. Cheap to clone.
#[derive(Debug, Clone)]
pub struct MatchmakerHandle {
    joins: mpsc::Sender<PlayerId>,
    events: mpsc::UnboundedSender<Event>,
}

fn stopped() -> anyhow::Error {
    anyhow::anyhow!("Matchmaker is not running")
}

impl MatchmakerHandle {
    /// Register a session's player and wait until the matchmaker has done so.
    pub async fn register(&self, session: SessionHandle) -> anyhow::Result<()> {
        let (registered, ack) = oneshot::channel();
        self.events
            .send(Event::Connected {
                session,
                registered,
            })
            .map_err(|_| stopped())?;
        ack.await.map_err(|_| stopped())
    }

    /// Ask for a match. Waits while the join queue is full.
    pub async fn join(&self, player: PlayerId) -> anyhow::Result<()> {
        self.joins.send(player).await.map_err(|_| stopped())
    }

    pub fn fire(&self, player: PlayerId, target: String) -> anyhow::Result<()> {
        self.send(Event::Fire { player, target })
    }

    pub fn show_board(&self, player: PlayerId) -> anyhow::Result<()> {
        self.send(Event::ShowBoard(player))
    }

    /// Report a lost connection. Never blocks, so it is usable from `Drop`.
    pub fn disconnect(&self, player: PlayerId) {
        if self.send(Event::Disconnected(player)).is_err() {
            debug!("matchmaker gone, dropping disconnect of {}", player);
        }
    }

    pub async fn snapshot(&self) -> anyhow::Result<Snapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(Event::Snapshot(tx))?;
        rx.await.map_err(|_| stopped())
    }

    fn send(&self, event: Event) -> anyhow::Result<()> {
        self.events.send(event).map_err(|_| stopped())
    }
}

pub struct Matchmaker {
    players: PlayerRegistry,
    matches: BTreeMap<MatchId, Match>,
    next_match_id: u64,
    finished: u64,
    cancelled: u64,
    rng: SmallRng,
    joins: mpsc::Receiver<PlayerId>,
    events: mpsc::UnboundedReceiver<Event>,
}

impl Matchmaker {
    /// Create a matchmaker and the handle used to reach it.
    pub fn new(join_queue_capacity: usize, rng: SmallRng) -> (Self, MatchmakerHandle) {
        let (joins_tx, joins) = mpsc::channel(join_queue_capacity.max(1));
        let (events_tx, events) = mpsc::unbounded_channel();
        let matchmaker = Self {
            players: PlayerRegistry::new(),
            matches: BTreeMap::new(),
            next_match_id: 1,
            finished: 0,
            cancelled: 0,
            rng,
            joins,
            events,
        };
        let handle = MatchmakerHandle {
            joins: joins_tx,
            events: events_tx,
        };
        (matchmaker, handle)
    }

    /// Build from server settings, seeding the RNG if a seed is given.
    pub fn from_config(config: &ServerConfig) -> (Self, MatchmakerHandle) {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_rng(&mut rand::rng()),
        };
        Self::new(config.join_queue_capacity, rng)
    }

    /// Process requests until every handle has been dropped.
    pub async fn run(mut self) {
        info!("matchmaker started");
        loop {
            self.ensure_waiting_match();
            tokio::select! {
                Some(player) = self.joins.recv() => self.handle_join(player),
                event = self.events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
            }
        }
        info!("matchmaker stopped");
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Connected {
                session,
                registered,
            } => {
                self.handle_connect(session);
                // The session may have given up waiting; nothing to do then.
                let _ = registered.send(());
            }
            Event::Disconnected(player) => self.handle_disconnect(player),
            Event::Fire { player, target } => self.handle_fire(player, &target),
            Event::ShowBoard(player) => self.handle_show_board(player),
            Event::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    /// Id of the match accepting players, creating one if none is waiting.
    fn ensure_waiting_match(&mut self) -> MatchId {
        if let Some(id) = self
            .matches
            .values()
            .find(|m| m.state() == MatchState::Waiting)
            .map(Match::id)
        {
            return id;
        }
        let id = MatchId::new(self.next_match_id);
        self.next_match_id += 1;
        debug!("no waiting match, created {}", id);
        self.matches.insert(id, Match::new(id));
        id
    }

    fn handle_connect(&mut self, session: SessionHandle) {
        let id = session.id();
        if self.players.insert(Player::new(session)).is_some() {
            warn!("player {} registered twice, replacing the old entry", id);
        }
        info!("player {} connected ({} online)", id, self.players.len());
    }

    fn handle_join(&mut self, player_id: PlayerId) {
        let waiting = self.ensure_waiting_match();
        let Some(player) = self.players.get(player_id) else {
            warn!("join request from unknown player {}", player_id);
            return;
        };
        if player.in_match() {
            debug!("player {} is already in a match, ignoring join", player_id);
            player.notify("You are already in a match");
            return;
        }

        let Some(game) = self.matches.get_mut(&waiting) else {
            return;
        };
        if let Err(e) = game.add_player(player_id) {
            error!("cannot queue player {}: {}", player_id, e);
            return;
        }
        if let Some(player) = self.players.get_mut(player_id) {
            player.join_match(waiting);
        }
        info!("player {} joined {}", player_id, waiting);

        if !game.is_full() {
            if let Some(player) = self.players.get(player_id) {
                player.notify("Waiting for an opponent...");
            }
            return;
        }
        match game.start(&mut self.players, &mut self.rng) {
            Ok(()) => info!("{} started with players {:?}", waiting, game.players()),
            Err(e) => {
                error!("failed to start {}: {}", waiting, e);
                game.cancel(&mut self.players);
            }
        }
        self.archive_if_done(waiting);
    }

    fn handle_disconnect(&mut self, player_id: PlayerId) {
        let Some(player) = self.players.remove(player_id) else {
            debug!("disconnect for unknown player {}", player_id);
            return;
        };
        player.session().close();
        info!(
            "player {} disconnected ({} online)",
            player_id,
            self.players.len()
        );

        let Some(match_id) = player.match_id() else {
            return;
        };
        if let Some(game) = self.matches.get_mut(&match_id) {
            game.remove_player(player_id, &mut self.players);
            if game.state() == MatchState::Cancelled {
                info!("{} cancelled: player {} left", match_id, player_id);
            }
        }
        self.archive_if_done(match_id);
    }

    fn handle_fire(&mut self, player_id: PlayerId, target: &str) {
        let Some(shooter) = self.players.get(player_id) else {
            warn!("fire from unknown player {}", player_id);
            return;
        };
        let Some(game) = shooter.match_id().and_then(|id| self.matches.get_mut(&id)) else {
            shooter.notify("error: you are not in a match");
            return;
        };
        if game.state() != MatchState::Started {
            shooter.notify("error: the match has not started yet");
            return;
        }
        if game.turn() != Some(player_id) {
            shooter.notify("error: it is not your turn");
            return;
        }
        let Some(opponent_id) = game.opponent_of(player_id) else {
            shooter.notify("error: you have no opponent");
            return;
        };

        let Some(opponent) = self.players.get_mut(opponent_id) else {
            error!("{} references missing player {}", game.id(), opponent_id);
            return;
        };
        let result = opponent.board_mut().fire(target);
        let target = target.to_ascii_uppercase();
        let result = match result {
            Ok(result) => result,
            Err(e) => {
                debug!("player {} fire at {} rejected: {}", player_id, target, e);
                if let Some(shooter) = self.players.get(player_id) {
                    shooter.notify(format!("error: {}", e));
                }
                return;
            }
        };
        game.pass_turn();
        opponent.notify(format!("Opponent fired at {}: {}", target, result));
        let fleet_destroyed = opponent.board().all_sunk();
        if fleet_destroyed {
            opponent.notify("You lost!");
        }
        if let Some(shooter) = self.players.get(player_id) {
            shooter.notify(format!("{} {}", result, target));
            if fleet_destroyed {
                shooter.notify("You won!");
            }
        }

        if fleet_destroyed {
            let match_id = game.id();
            match game.end(&mut self.players) {
                Ok(()) => info!("{} finished, player {} won", match_id, player_id),
                Err(e) => error!("failed to end {}: {}", match_id, e),
            }
            self.archive_if_done(match_id);
        }
    }

    fn handle_show_board(&self, player_id: PlayerId) {
        if let Some(player) = self.players.get(player_id) {
            player.session().send(player.board().render());
        }
    }

    /// Drop a cancelled or finished match from the in-flight set.
    fn archive_if_done(&mut self, id: MatchId) {
        let state = match self.matches.get(&id) {
            Some(game) => game.state(),
            None => return,
        };
        match state {
            MatchState::Cancelled => self.cancelled += 1,
            MatchState::Finished => self.finished += 1,
            MatchState::Waiting | MatchState::Started => return,
        }
        self.matches.remove(&id);
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            players: self.players.ids(),
            matches: self
                .matches
                .values()
                .map(|m| MatchSummary {
                    id: m.id(),
                    state: m.state(),
                    players: m.players().to_vec(),
                })
                .collect(),
            finished: self.finished,
            cancelled: self.cancelled,
        }
    }
}
