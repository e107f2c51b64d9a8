//! Tile alphabet and the movement semantics attached to each tile.

use serde::Serialize;

/// Static contents of a grid cell. Player and ghosts are entities, not tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Wall,
    Gate,
    Key,
    Point,
    Empty,
}

/// Level-file markers that seed entities and leave an empty cell behind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    PlayerStart,
    GhostSpawn,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Symbol {
    Tile(TileKind),
    Marker(Marker),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementOutcome {
    Blocked,
    Enter,
    GhostCollision,
    KeyPickup,
    GatePassable,
    PointPickup,
}

impl TileKind {
    pub fn symbol(self) -> char {
        match self {
            Self::Wall => 'W',
            Self::Gate => 'G',
            Self::Key => 'K',
            Self::Point => 'o',
            Self::Empty => '.',
        }
    }

    pub fn is_wall(self) -> bool {
        self == Self::Wall
    }
}

impl Marker {
    pub fn symbol(self) -> char {
        match self {
            Self::PlayerStart => 'P',
            Self::GhostSpawn => 'C',
        }
    }
}

impl Symbol {
    /// Tile left in the grid once markers are lifted into entities.
    pub fn tile(self) -> TileKind {
        match self {
            Self::Tile(kind) => kind,
            Self::Marker(_) => TileKind::Empty,
        }
    }

    /// What stepping onto a cell showing this symbol does.
    pub fn outcome(self) -> MovementOutcome {
        match self {
            Self::Tile(kind) => outcome(kind),
            Self::Marker(Marker::GhostSpawn) => MovementOutcome::GhostCollision,
            Self::Marker(Marker::PlayerStart) => MovementOutcome::Enter,
        }
    }
}

/// Unknown characters fall back to `Wall`.
pub fn classify(symbol: char) -> Symbol {
    match symbol {
        'W' => Symbol::Tile(TileKind::Wall),
        'G' => Symbol::Tile(TileKind::Gate),
        'K' => Symbol::Tile(TileKind::Key),
        'o' => Symbol::Tile(TileKind::Point),
        '.' => Symbol::Tile(TileKind::Empty),
        'P' => Symbol::Marker(Marker::PlayerStart),
        'C' => Symbol::Marker(Marker::GhostSpawn),
        _ => Symbol::Tile(TileKind::Wall),
    }
}

pub fn outcome(kind: TileKind) -> MovementOutcome {
    match kind {
        TileKind::Wall => MovementOutcome::Blocked,
        TileKind::Gate => MovementOutcome::GatePassable,
        TileKind::Key => MovementOutcome::KeyPickup,
        TileKind::Point => MovementOutcome::PointPickup,
        TileKind::Empty => MovementOutcome::Enter,
    }
}
