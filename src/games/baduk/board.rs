//! Board engine capability and the default Go board.
//!
//! The protocol core only depends on [`BoardEngine`]. Capture, territory and
//! rendering rules belong to the engine; [`GoBoard`] is the implementation the
//! crate ships with.

use super::types::{Color, Placement};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use tracing::{debug, instrument};

/// Error placing a stone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum BoardError {
    /// The intersection already holds a stone.
    #[display("Intersection ({x}, {y}) is already occupied")]
    Occupied {
        /// Column.
        x: usize,
        /// Row.
        y: usize,
    },

    /// The coordinate lies outside the board.
    #[display("Intersection ({x}, {y}) is off a {size}x{size} board")]
    OutOfBounds {
        /// Column.
        x: usize,
        /// Row.
        y: usize,
        /// Board size.
        size: usize,
    },
}

impl std::error::Error for BoardError {}

/// Capability set the replay and protocol code need from a board.
pub trait BoardEngine: Sized {
    /// Creates an empty `size`x`size` board.
    fn init(size: usize) -> Self;

    /// Side length of the board.
    fn size(&self) -> usize;

    /// The stone at `(x, y)`, or `None` if empty or off the board.
    fn stone_at(&self, x: usize, y: usize) -> Option<Color>;

    /// Places a black stone.
    fn place_black(&mut self, x: usize, y: usize) -> Result<(), BoardError>;

    /// Places a white stone.
    fn place_white(&mut self, x: usize, y: usize) -> Result<(), BoardError>;

    /// Returns `(black_score, white_score)`.
    fn score(&self) -> (u32, u32);

    /// Visual form of the board.
    fn render(&self) -> String;

    /// Returns true if `(x, y)` is on the board.
    fn contains(&self, x: usize, y: usize) -> bool {
        x < self.size() && y < self.size()
    }

    /// Places a stone of the placement's color.
    fn place(&mut self, placement: Placement) -> Result<(), BoardError> {
        match placement.color {
            Color::Black => self.place_black(placement.x, placement.y),
            Color::White => self.place_white(placement.x, placement.y),
        }
    }
}

/// Go board with captures and area scoring.
///
/// A placement removes every adjacent opponent group left without
/// liberties. If the placed stone's own group then has no liberties it is
/// removed as well (self-capture), so any placement the ledger accepted onto
/// an empty intersection can be replayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GoBoard {
    size: usize,
    /// Row-major cells, `cells[y * size + x]`.
    cells: Vec<Option<Color>>,
}

impl GoBoard {
    fn idx(&self, x: usize, y: usize) -> usize {
        y * self.size + x
    }

    fn neighbors(&self, x: usize, y: usize) -> Vec<(usize, usize)> {
        let mut out = Vec::with_capacity(4);
        if x > 0 {
            out.push((x - 1, y));
        }
        if x + 1 < self.size {
            out.push((x + 1, y));
        }
        if y > 0 {
            out.push((x, y - 1));
        }
        if y + 1 < self.size {
            out.push((x, y + 1));
        }
        out
    }

    /// Flood-fills the group at `(x, y)`, returning its stones and liberty count.
    fn group(&self, x: usize, y: usize) -> (Vec<(usize, usize)>, usize) {
        let color = self.cells[self.idx(x, y)];
        let mut queue = VecDeque::from([(x, y)]);
        let mut seen = HashSet::from([(x, y)]);
        let mut liberties = HashSet::new();

        while let Some((cx, cy)) = queue.pop_front() {
            for (nx, ny) in self.neighbors(cx, cy) {
                let cell = self.cells[self.idx(nx, ny)];
                if cell.is_none() {
                    liberties.insert((nx, ny));
                } else if cell == color && seen.insert((nx, ny)) {
                    queue.push_back((nx, ny));
                }
            }
        }

        (seen.into_iter().collect(), liberties.len())
    }

    fn remove(&mut self, stones: &[(usize, usize)]) {
        for &(x, y) in stones {
            let i = self.idx(x, y);
            self.cells[i] = None;
        }
    }

    #[instrument(skip(self), fields(size = self.size))]
    fn play(&mut self, x: usize, y: usize, color: Color) -> Result<(), BoardError> {
        if !self.contains(x, y) {
            return Err(BoardError::OutOfBounds { x, y, size: self.size });
        }
        let i = self.idx(x, y);
        if self.cells[i].is_some() {
            return Err(BoardError::Occupied { x, y });
        }
        self.cells[i] = Some(color);

        let mut captured = 0;
        for (nx, ny) in self.neighbors(x, y) {
            if self.cells[self.idx(nx, ny)] == Some(color.opponent()) {
                let (stones, liberties) = self.group(nx, ny);
                if liberties == 0 {
                    captured += stones.len();
                    self.remove(&stones);
                }
            }
        }

        let (own, liberties) = self.group(x, y);
        if liberties == 0 {
            debug!(stones = own.len(), "Self-capture");
            self.remove(&own);
        }
        if captured > 0 {
            debug!(captured, "Captured opponent stones");
        }
        Ok(())
    }

    /// Number of stones of each color as `(black, white)`.
    pub fn stone_counts(&self) -> (u32, u32) {
        self.cells.iter().flatten().fold((0, 0), |(b, w), c| match c {
            Color::Black => (b + 1, w),
            Color::White => (b, w + 1),
        })
    }
}

impl BoardEngine for GoBoard {
    fn init(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
        }
    }

    fn size(&self) -> usize {
        self.size
    }

    fn stone_at(&self, x: usize, y: usize) -> Option<Color> {
        if self.contains(x, y) {
            self.cells[self.idx(x, y)]
        } else {
            None
        }
    }

    fn place_black(&mut self, x: usize, y: usize) -> Result<(), BoardError> {
        self.play(x, y, Color::Black)
    }

    fn place_white(&mut self, x: usize, y: usize) -> Result<(), BoardError> {
        self.play(x, y, Color::White)
    }

    /// Area score: stones on the board plus empty regions that touch only
    /// one color.
    fn score(&self) -> (u32, u32) {
        let (mut black, mut white) = self.stone_counts();
        let mut seen = vec![false; self.cells.len()];

        for y in 0..self.size {
            for x in 0..self.size {
                let start = self.idx(x, y);
                if self.cells[start].is_some() || seen[start] {
                    continue;
                }
                seen[start] = true;
                let mut queue = VecDeque::from([(x, y)]);
                let mut region = 0u32;
                let mut borders = HashSet::new();

                while let Some((cx, cy)) = queue.pop_front() {
                    region += 1;
                    for (nx, ny) in self.neighbors(cx, cy) {
                        let i = self.idx(nx, ny);
                        match self.cells[i] {
                            Some(color) => {
                                borders.insert(color);
                            }
                            None if !seen[i] => {
                                seen[i] = true;
                                queue.push_back((nx, ny));
                            }
                            None => {}
                        }
                    }
                }

                if borders.len() == 1 {
                    match borders.iter().next() {
                        Some(Color::Black) => black += region,
                        Some(Color::White) => white += region,
                        None => {}
                    }
                }
            }
        }

        (black, white)
    }

    fn render(&self) -> String {
        let mut out = String::from("  ");
        for x in 0..self.size {
            out.push_str(&format!("{:>3}", x));
        }
        out.push('\n');
        for y in 0..self.size {
            out.push_str(&format!("{:>2}", y));
            for x in 0..self.size {
                let symbol = match self.cells[self.idx(x, y)] {
                    Some(Color::Black) => 'X',
                    Some(Color::White) => 'O',
                    None => '.',
                };
                out.push_str(&format!("{:>3}", symbol));
            }
            out.push('\n');
        }
        out
    }
}
