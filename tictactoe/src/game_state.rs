use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use anyhow::{anyhow, bail};

use crate::Value;

pub const NUM_CELLS: usize = 9;

const FULL_BOARD: u16 = 0b111_111_111;

const WINNING_LINES: [u16; 8] = [
    0b000_000_111,
    0b000_111_000,
    0b111_000_000,
    0b001_001_001,
    0b010_010_010,
    0b100_100_100,
    0b100_010_001,
    0b001_010_100,
];

/// A 3x3 board. Bit `n` of a board is cell `n`, counted left to right, top to bottom.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct GameState {
    pub p1_turn_to_move: bool,
    pub p1_board: u16,
    pub p2_board: u16,
}

impl GameState {
    pub fn initial() -> Self {
        Self {
            p1_turn_to_move: true,
            p1_board: 0,
            p2_board: 0,
        }
    }

    pub fn player_to_move(&self) -> usize {
        if self.p1_turn_to_move {
            1
        } else {
            2
        }
    }

    pub fn place(&self, cell: usize) -> Self {
        let piece = 1 << cell;
        debug_assert!((self.p1_board | self.p2_board) & piece == 0, "cell {} is taken", cell);

        let mut p1_board = self.p1_board;
        let mut p2_board = self.p2_board;

        if self.p1_turn_to_move {
            p1_board |= piece;
        } else {
            p2_board |= piece;
        }

        Self {
            p1_turn_to_move: !self.p1_turn_to_move,
            p1_board,
            p2_board,
        }
    }

    pub fn empty_cells(&self) -> impl Iterator<Item = usize> {
        let all_pieces = self.p1_board | self.p2_board;
        (0..NUM_CELLS).filter(move |&cell| all_pieces & (1 << cell) == 0)
    }

    /// The outcome if the game is over. Only the player who just moved can have completed a line.
    pub fn is_terminal(&self) -> Option<Value> {
        let (last_mover, p1_moved_last) = if self.p1_turn_to_move {
            (self.p2_board, false)
        } else {
            (self.p1_board, true)
        };

        if WINNING_LINES.iter().any(|line| last_mover & line == *line) {
            return Some(if p1_moved_last {
                Value([1.0, 0.0])
            } else {
                Value([0.0, 1.0])
            });
        }

        if self.p1_board | self.p2_board == FULL_BOARD {
            return Some(Value([0.5, 0.5]));
        }

        None
    }

    pub fn number_of_actions(&self) -> usize {
        (self.p1_board | self.p2_board).count_ones() as usize
    }
}

impl FromStr for GameState {
    type Err = anyhow::Error;

    /// Reads nine cells of `X`, `O` or `.`, ignoring whitespace and `|` separators. The player to
    /// move is inferred from the number of marks.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut p1_board: u16 = 0;
        let mut p2_board: u16 = 0;
        let mut cell = 0;

        for c in s.chars().filter(|c| !c.is_whitespace() && *c != '|') {
            if cell >= NUM_CELLS {
                bail!("Board has more than {} cells: {}", NUM_CELLS, s);
            }

            match c {
                'X' | 'x' => p1_board |= 1 << cell,
                'O' | 'o' => p2_board |= 1 << cell,
                '.' => {}
                _ => return Err(anyhow!("Unexpected character '{}' in board: {}", c, s)),
            }

            cell += 1;
        }

        if cell != NUM_CELLS {
            bail!("Board has {} cells, expected {}: {}", cell, NUM_CELLS, s);
        }

        let p1_count = p1_board.count_ones();
        let p2_count = p2_board.count_ones();

        if p1_count != p2_count && p1_count != p2_count + 1 {
            bail!("X must have the same number of marks as O or one more: {}", s);
        }

        Ok(Self {
            p1_turn_to_move: p1_count == p2_count,
            p1_board,
            p2_board,
        })
    }
}

impl Display for GameState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for row in 0..3 {
            for col in 0..3 {
                let piece = 1 << (row * 3 + col);
                let p = if self.p1_board & piece != 0 {
                    "X"
                } else if self.p2_board & piece != 0 {
                    "O"
                } else {
                    "."
                };

                write!(f, "{}", p)?;
            }

            if row != 2 {
                write!(f, "|")?;
            }
        }

        Ok(())
    }
}
