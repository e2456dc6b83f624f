//! Grid references: a row letter `A`-`J` (either case) followed by a
//! column number `1`-`10`.

use core::fmt;
use core::str::FromStr;

use crate::common::GridRefError;
use crate::config::{BOARD_SIZE, CELL_COUNT};

/// A validated address of one board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridRef {
    row: usize,
    col: usize,
}

impl GridRef {
    /// Reference for a board index, if it lies on the board.
    pub fn from_index(index: usize) -> Option<Self> {
        (index < CELL_COUNT).then(|| Self {
            row: index / BOARD_SIZE,
            col: index % BOARD_SIZE + 1,
        })
    }

    /// Board index: `row * 10 + col - 1`.
    pub fn index(&self) -> usize {
        self.row * BOARD_SIZE + self.col - 1
    }

    /// Zero-based row (`A` is 0).
    pub fn row(&self) -> usize {
        self.row
    }

    /// One-based column.
    pub fn col(&self) -> usize {
        self.col
    }

    pub fn row_label(&self) -> char {
        row_label(self.row)
    }
}

/// Letter used for a zero-based row.
pub(crate) fn row_label(row: usize) -> char {
    char::from(b'A' + row as u8)
}

impl FromStr for GridRef {
    type Err = GridRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() < 2 {
            return Err(GridRefError::TooShort);
        }
        if bytes.len() > 3 {
            return Err(GridRefError::TooLong);
        }

        let letter = bytes[0].to_ascii_lowercase();
        if !(b'a'..b'a' + BOARD_SIZE as u8).contains(&letter) {
            return Err(GridRefError::RowOutOfBounds);
        }

        // The first byte is ASCII, so slicing after it stays on a char boundary.
        let digits = &s[1..];
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(GridRefError::InvalidColumn);
        }
        let col: usize = digits.parse().map_err(|_| GridRefError::InvalidColumn)?;
        if !(1..=BOARD_SIZE).contains(&col) {
            return Err(GridRefError::ColumnOutOfBounds);
        }

        Ok(Self {
            row: usize::from(letter - b'a'),
            col,
        })
    }
}

impl fmt::Display for GridRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row_label(), self.col)
    }
}
