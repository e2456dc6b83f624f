//! Game board state: a flat grid of cells, random fleet placement, shot
//! resolution and text rendering.

use core::fmt;
use rand::Rng;

use crate::common::{BoardError, FireResult};
use crate::config::{BOARD_SIZE, CELL_COUNT, FLEET, MAX_PLACEMENT_ATTEMPTS};
use crate::grid::{row_label, GridRef};
use crate::ship::{Orientation, Placement};

/// State of one board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Ship,
    Hit,
    Miss,
}

impl Cell {
    /// Character used for the cell in rendered boards.
    pub fn symbol(self) -> char {
        match self {
            Cell::Empty => '-',
            Cell::Ship => 'S',
            Cell::Hit => '*',
            Cell::Miss => 'x',
        }
    }
}

/// A 10x10 board stored row by row.
///
/// Cells only move forward: `Empty -> Ship` while placing, `Ship -> Hit` or
/// `Empty -> Miss` while firing.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Cell; CELL_COUNT],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create an empty board (no ships placed).
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; CELL_COUNT],
        }
    }

    /// All cells, row by row.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, target: GridRef) -> Cell {
        self.cells[target.index()]
    }

    /// `true` when the placement is in bounds and every covered cell is empty.
    pub fn can_place(&self, placement: &Placement) -> bool {
        placement.in_bounds() && placement.cells().all(|i| self.cells[i] == Cell::Empty)
    }

    /// Place a single ship.
    pub fn place(&mut self, placement: Placement) -> Result<(), BoardError> {
        if !self.can_place(&placement) {
            return Err(BoardError::InvalidPlacement {
                start: placement.start(),
                length: placement.length(),
            });
        }
        for i in placement.cells() {
            self.cells[i] = Cell::Ship;
        }
        Ok(())
    }

    /// Returns a random valid placement for a ship of `length`, sampling a
    /// start cell and orientation until one fits.
    pub fn random_placement<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        length: usize,
    ) -> Result<Placement, BoardError> {
        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            let start = rng.random_range(0..CELL_COUNT);
            let placement = Placement::new(start, length, Orientation::random(rng));
            if self.can_place(&placement) {
                return Ok(placement);
            }
        }
        Err(BoardError::UnableToPlaceShip {
            length,
            attempts: MAX_PLACEMENT_ATTEMPTS,
        })
    }

    /// Place the whole fleet at random positions.
    ///
    /// The fleet is committed all at once: on error the board is unchanged.
    pub fn place_fleet_randomly<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<Vec<Placement>, BoardError> {
        let mut next = self.clone();
        let mut placements = Vec::with_capacity(FLEET.len());
        for ship in FLEET.iter() {
            let placement = next.random_placement(rng, ship.length())?;
            next.place(placement)?;
            placements.push(placement);
        }
        *self = next;
        Ok(placements)
    }

    /// Fire at a textual reference such as `B3`.
    pub fn fire(&mut self, reference: &str) -> Result<FireResult, BoardError> {
        let target = reference
            .parse::<GridRef>()
            .map_err(|source| BoardError::InvalidReference {
                reference: reference.to_string(),
                source,
            })?;
        self.fire_at(target)
    }

    /// Fire at a cell. Only cells already hit are rejected; a miss may be
    /// fired at again and reports another miss.
    pub fn fire_at(&mut self, target: GridRef) -> Result<FireResult, BoardError> {
        let cell = &mut self.cells[target.index()];
        match *cell {
            Cell::Hit => Err(BoardError::AlreadyHit),
            Cell::Ship => {
                *cell = Cell::Hit;
                Ok(FireResult::Hit)
            }
            Cell::Empty | Cell::Miss => {
                *cell = Cell::Miss;
                Ok(FireResult::Miss)
            }
        }
    }

    /// Number of ship segments not yet hit.
    pub fn ship_cells_remaining(&self) -> usize {
        self.cells.iter().filter(|c| **c == Cell::Ship).count()
    }

    /// Returns `true` once ships were placed and every segment has been hit.
    pub fn all_sunk(&self) -> bool {
        self.ship_cells_remaining() == 0 && self.cells.contains(&Cell::Hit)
    }

    /// Text grid: a header of column numbers, then one line per row.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity((BOARD_SIZE + 1) * (2 * BOARD_SIZE + 3));
        out.push(' ');
        for col in 1..=BOARD_SIZE {
            out.push(' ');
            out.push_str(&col.to_string());
        }
        out.push('\n');
        for (row, cells) in self.cells.chunks(BOARD_SIZE).enumerate() {
            out.push(row_label(row));
            for cell in cells {
                out.push(' ');
                out.push(cell.symbol());
            }
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Board {{ ships_remaining: {} }}",
            self.ship_cells_remaining()
        )?;
        f.write_str(&self.render())
    }
}
