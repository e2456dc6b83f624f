//! Multiplayer battleships server.
//!
//! Clients connect over TCP, speak a line-based command language, are
//! paired first-come first-served by a single matchmaker task, and play
//! two-player matches on 10x10 boards.

mod board;
mod command;
mod common;
mod config;
mod game;
mod grid;
mod logging;
pub mod matchmaker;
mod player;
pub mod server;
pub mod session;
mod ship;
pub mod transport;

pub use board::*;
pub use command::*;
pub use common::*;
pub use config::*;
pub use game::*;
pub use grid::GridRef;
pub use logging::{init_logging, LogFilter};
pub use matchmaker::{Matchmaker, MatchmakerHandle, MatchSummary, Snapshot};
pub use player::*;
pub use server::Server;
pub use session::{Outbound, SessionHandle, SessionId};
pub use ship::*;
