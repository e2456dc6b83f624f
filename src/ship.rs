//! Ship definitions and placement geometry on the board.

use rand::Rng;

use crate::config::{BOARD_SIZE, CELL_COUNT};

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Pick either orientation with equal probability.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.random::<bool>() {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }

    /// Index distance between two consecutive cells of a ship.
    fn step(self) -> usize {
        match self {
            Orientation::Horizontal => 1,
            Orientation::Vertical => BOARD_SIZE,
        }
    }
}

/// Type of ship: name and length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipType {
    name: &'static str,
    length: usize,
}

impl ShipType {
    /// Create a new ship type.
    pub const fn new(name: &'static str, length: usize) -> Self {
        Self { name, length }
    }

    /// Ship's name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Ship's length.
    pub fn length(&self) -> usize {
        self.length
    }
}

/// A ship of `length` cells anchored at board index `start`, extending
/// right (horizontal) or down (vertical).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    start: usize,
    length: usize,
    orientation: Orientation,
}

impl Placement {
    pub const fn new(start: usize, length: usize, orientation: Orientation) -> Self {
        Self {
            start,
            length,
            orientation,
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// `true` when every cell stays on the board without wrapping onto the
    /// next row or running off the bottom edge.
    pub fn in_bounds(&self) -> bool {
        if self.start >= CELL_COUNT {
            return false;
        }
        match self.orientation {
            Orientation::Horizontal => self.start % BOARD_SIZE + self.length <= BOARD_SIZE,
            Orientation::Vertical => self.start / BOARD_SIZE + self.length <= BOARD_SIZE,
        }
    }

    /// Board indices covered by the ship, nearest to `start` first.
    /// Only meaningful for in-bounds placements.
    pub fn cells(&self) -> impl Iterator<Item = usize> {
        let start = self.start;
        let step = self.orientation.step();
        (0..self.length).map(move |i| start + i * step)
    }
}
