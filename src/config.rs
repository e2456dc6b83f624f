use std::time::Duration;

use crate::ship::ShipType;

pub const BOARD_SIZE: usize = 10;
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;
pub const NUM_SHIPS: usize = 5;
pub const FLEET: [ShipType; NUM_SHIPS] = [
    ShipType::new("Destroyer", 2),
    ShipType::new("Cruiser", 3),
    ShipType::new("Submarine", 3),
    ShipType::new("Battleship", 4),
    ShipType::new("Carrier", 5),
];

/// Total number of ship segments in a placed fleet.
pub const TOTAL_SHIP_CELLS: usize = 2 + 3 + 3 + 4 + 5;

/// Random placement attempts allowed per ship before giving up.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 10_000;

/// Players per match.
pub const MATCH_CAPACITY: usize = 2;

/// Default capacity of the matchmaker's join queue.
pub const JOIN_QUEUE_CAPACITY: usize = 2;

/// Default maximum length of a single client line, terminator excluded.
pub const MAX_LINE_LEN: usize = 256;

/// Default timeout for a single write to a client (10 seconds).
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

pub const DEFAULT_MOTD: &str = "Welcome to Battleships! Type help for a list of commands.\n";

/// Limits applied to every client connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportConfig {
    pub max_line_len: usize,
    pub write_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_line_len: MAX_LINE_LEN,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

/// Settings for a whole server process.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    /// Text sent to every client right after it connects.
    pub motd: String,
    /// Fixed RNG seed for reproducible fleet placement.
    pub seed: Option<u64>,
    pub join_queue_capacity: usize,
    pub transport: TransportConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            motd: DEFAULT_MOTD.to_string(),
            seed: None,
            join_queue_capacity: JOIN_QUEUE_CAPACITY,
            transport: TransportConfig::default(),
        }
    }
}
