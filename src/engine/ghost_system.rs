use tracing::trace;

use super::utils::{is_cell_occupied_by_other_ghost, random_direction};
use super::*;

impl GameEngine {
    /// One random step per ghost, in spawn order.
    ///
    /// A move is accepted only onto an in-bounds, non-wall cell that no other ghost
    /// holds; rejected draws leave the ghost in place. Landing on the player ends the
    /// session as lost and skips the remaining ghosts. Returns whether that happened.
    pub(super) fn move_ghosts(&mut self, state: &mut SessionState) -> bool {
        for idx in 0..self.ghosts.len() {
            let dir = random_direction(self.rng.as_mut());
            let from = self.ghosts[idx].pos;
            let Some(candidate) = self.grid.step(from, dir) else {
                continue;
            };
            if self.grid.get(candidate).is_wall() {
                continue;
            }
            if is_cell_occupied_by_other_ghost(&self.ghosts, candidate, idx) {
                continue;
            }
            if candidate == self.player.pos {
                trace!(ghost = %self.ghosts[idx].id, %candidate, "ghost caught the player");
                state.outcome = Some(Outcome::Lost);
                return true;
            }
            self.ghosts[idx].pos = candidate;
            trace!(ghost = %self.ghosts[idx].id, %from, %candidate, "ghost moved");
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::test_support::Scripted;
    use crate::engine::GameEngine;
    use crate::level::parse;
    use crate::types::{Outcome, Position, SessionState};

    fn engine_for(text: &str, picks: &[usize]) -> GameEngine {
        let level = parse(text).expect("level should parse");
        GameEngine::new(&level, Box::new(Scripted::new(picks, 0))).expect("level should load")
    }

    #[test]
    fn ghost_does_not_enter_walls() {
        // colour, then Right into the wall
        let mut engine = engine_for("P..\nWCW", &[0, 3]);
        let mut state = SessionState::default();
        assert!(!engine.move_ghosts(&mut state));
        assert_eq!(engine.ghosts()[0].pos, Position::new(1, 1));
    }

    #[test]
    fn ghosts_never_stack() {
        // colours, then ghost_1 Right onto ghost_2, ghost_2 Down out of bounds
        let mut engine = engine_for("P...\n.CC.", &[0, 0, 3, 1]);
        let mut state = SessionState::default();
        assert!(!engine.move_ghosts(&mut state));
        assert_eq!(engine.ghosts()[0].pos, Position::new(1, 1));
        assert_eq!(engine.ghosts()[1].pos, Position::new(1, 2));
    }

    #[test]
    fn ghost_walks_over_pickups_without_consuming_them() {
        let mut engine = engine_for("P.W\nCoK", &[0, 3]);
        let mut state = SessionState::default();
        engine.move_ghosts(&mut state);
        assert_eq!(engine.ghosts()[0].pos, Position::new(1, 1));
        assert_eq!(
            engine.grid().get(Position::new(1, 1)),
            crate::tile::TileKind::Point
        );
        assert_eq!(state.score, 0);
    }

    #[test]
    fn collision_stops_remaining_ghost_moves() {
        // colours; ghost_1 Up onto the player; ghost_2 would move Left
        let mut engine = engine_for(".P.\n.C.\nC..", &[0, 0, 0, 2]);
        let mut state = SessionState::default();
        assert!(engine.move_ghosts(&mut state));
        assert_eq!(state.outcome, Some(Outcome::Lost));
        assert_eq!(engine.ghosts()[1].pos, Position::new(2, 0));
    }

    #[test]
    fn rejected_move_is_not_retried_within_the_tick() {
        // colours; ghost_1 Right onto ghost_2 (rejected), then ghost_2 Right
        let mut engine = engine_for("P...\nCC..", &[0, 0, 3, 3]);
        let mut state = SessionState::default();
        engine.move_ghosts(&mut state);
        assert_eq!(engine.ghosts()[0].pos, Position::new(1, 0));
        assert_eq!(engine.ghosts()[1].pos, Position::new(1, 2));
    }
}
