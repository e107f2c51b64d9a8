use crate::constants::next_mouth_frame;
use crate::types::{Direction, GhostView, PlayerView, Position};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub pos: Position,
    pub facing: Direction,
    /// Sprite frame in `1..=3`.
    pub mouth_frame: u8,
}

impl Player {
    pub fn new(pos: Position) -> Self {
        Self {
            pos,
            facing: Direction::Right,
            mouth_frame: 1,
        }
    }

    pub fn advance_frame(&mut self) -> u8 {
        self.mouth_frame = next_mouth_frame(self.mouth_frame);
        self.mouth_frame
    }

    pub fn view(&self) -> PlayerView {
        PlayerView {
            row: self.pos.row,
            col: self.pos.col,
            facing: self.facing,
            mouth_frame: self.mouth_frame,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ghost {
    pub id: String,
    pub pos: Position,
    pub color_index: usize,
}

impl Ghost {
    pub fn view(&self) -> GhostView {
        GhostView {
            id: self.id.clone(),
            row: self.pos.row,
            col: self.pos.col,
            color_index: self.color_index,
        }
    }
}
