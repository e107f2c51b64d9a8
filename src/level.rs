//! Rectangular tile grid and the plain-text level format.
//!
//! One text line per row, all rows the same width. `W` wall, `G` gate, `K` key,
//! `o` point, `.` empty, `P` player start, `C` ghost spawn; anything else is a wall.
//! An optional first line `"<rows> <cols>"` is accepted as a size header.

use std::fmt;

use crate::error::LevelError;
use crate::tile::{classify, Marker, Symbol, TileKind};
use crate::types::{Direction, Position};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelGrid {
    rows: usize,
    cols: usize,
    tiles: Vec<TileKind>,
}

impl LevelGrid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            tiles: vec![TileKind::Empty; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Neighbour of `pos` in `dir`, or `None` when it would leave the grid.
    pub fn step(&self, pos: Position, dir: Direction) -> Option<Position> {
        let (dr, dc) = dir.delta();
        let row = pos.row.checked_add_signed(dr as isize)?;
        let col = pos.col.checked_add_signed(dc as isize)?;
        let next = Position::new(row, col);
        self.contains(next).then_some(next)
    }

    /// Panics when `pos` is outside the grid: callers bounds-check with `step` first.
    pub fn get(&self, pos: Position) -> TileKind {
        self.tiles[self.index(pos)]
    }

    /// Panics when `pos` is outside the grid.
    pub fn set(&mut self, pos: Position, kind: TileKind) {
        let idx = self.index(pos);
        self.tiles[idx] = kind;
    }

    pub fn positions_of(&self, kind: TileKind) -> Vec<Position> {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| **tile == kind)
            .map(|(idx, _)| Position::new(idx / self.cols, idx % self.cols))
            .collect()
    }

    pub fn count(&self, kind: TileKind) -> usize {
        self.tiles.iter().filter(|tile| **tile == kind).count()
    }

    pub fn row_text(&self, row: usize) -> String {
        self.tiles[row * self.cols..(row + 1) * self.cols]
            .iter()
            .map(|tile| tile.symbol())
            .collect()
    }

    pub fn to_rows(&self) -> Vec<String> {
        (0..self.rows).map(|row| self.row_text(row)).collect()
    }

    fn index(&self, pos: Position) -> usize {
        assert!(
            self.contains(pos),
            "grid access out of bounds: {pos} in {}x{} grid",
            self.rows,
            self.cols
        );
        pos.row * self.cols + pos.col
    }
}

impl fmt::Display for LevelGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            writeln!(f, "{}", self.row_text(row))?;
        }
        Ok(())
    }
}

/// A parsed level: static tiles plus the entity markers lifted out of them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Level {
    pub grid: LevelGrid,
    player_starts: Vec<Position>,
    ghost_spawns: Vec<Position>,
}

impl Level {
    pub fn new(grid: LevelGrid, player_start: Position, ghost_spawns: Vec<Position>) -> Self {
        Self {
            grid,
            player_starts: vec![player_start],
            ghost_spawns,
        }
    }

    pub fn locate(&self, marker: Marker) -> &[Position] {
        match marker {
            Marker::PlayerStart => &self.player_starts,
            Marker::GhostSpawn => &self.ghost_spawns,
        }
    }

    /// The single player start; zero or several starts make the level unplayable.
    pub fn player_start(&self) -> Result<Position, LevelError> {
        match self.player_starts.as_slice() {
            [] => Err(LevelError::MissingPlayerStart),
            [start] => Ok(*start),
            starts => Err(LevelError::MultiplePlayerStarts(starts.len())),
        }
    }

    pub fn ghost_spawns(&self) -> &[Position] {
        &self.ghost_spawns
    }

    /// Renders back to the level format, markers included.
    pub fn to_level_text(&self, with_header: bool) -> String {
        let mut rows: Vec<Vec<char>> = self
            .grid
            .to_rows()
            .into_iter()
            .map(|row| row.chars().collect())
            .collect();
        for spawn in &self.ghost_spawns {
            rows[spawn.row][spawn.col] = Marker::GhostSpawn.symbol();
        }
        for start in &self.player_starts {
            rows[start.row][start.col] = Marker::PlayerStart.symbol();
        }

        let mut out = String::new();
        if with_header {
            out.push_str(&format!("{} {}\n", self.grid.rows(), self.grid.cols()));
        }
        for row in rows {
            out.extend(row);
            out.push('\n');
        }
        out
    }
}

pub fn parse(text: &str) -> Result<Level, LevelError> {
    let mut lines: Vec<&str> = text.lines().collect();
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }

    let declared = lines.first().and_then(|line| parse_header(line));
    if declared.is_some() {
        lines.remove(0);
    }

    let Some(first) = lines.first() else {
        return Err(LevelError::Empty);
    };
    let cols = first.chars().count();
    if cols == 0 {
        return Err(LevelError::Empty);
    }

    let rows = lines.len();
    let mut grid = LevelGrid::new(rows, cols);
    let mut player_starts = Vec::new();
    let mut ghost_spawns = Vec::new();

    for (row, line) in lines.iter().enumerate() {
        let found = line.chars().count();
        if found != cols {
            return Err(LevelError::Ragged {
                row,
                expected: cols,
                found,
            });
        }
        for (col, c) in line.chars().enumerate() {
            let pos = Position::new(row, col);
            let symbol = classify(c);
            match symbol {
                Symbol::Marker(Marker::PlayerStart) => player_starts.push(pos),
                Symbol::Marker(Marker::GhostSpawn) => ghost_spawns.push(pos),
                Symbol::Tile(_) => {}
            }
            grid.set(pos, symbol.tile());
        }
    }

    if let Some((declared_rows, declared_cols)) = declared {
        if declared_rows != rows || declared_cols != cols {
            return Err(LevelError::HeaderMismatch {
                declared_rows,
                declared_cols,
                rows,
                cols,
            });
        }
    }

    Ok(Level {
        grid,
        player_starts,
        ghost_spawns,
    })
}

fn parse_header(line: &str) -> Option<(usize, usize)> {
    let mut parts = line.split_whitespace();
    let rows = parts.next()?.parse().ok()?;
    let cols = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((rows, cols))
}
