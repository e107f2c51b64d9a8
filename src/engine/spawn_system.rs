use tracing::debug;

use super::*;
use crate::constants::{ghost_color_name, GHOST_COLORS};
use crate::types::Position;

impl GameEngine {
    /// One ghost per spawn marker, in row-major marker order, each with a random colour.
    pub(super) fn spawn_ghosts(&mut self, spawns: &[Position]) {
        for spawn in spawns {
            let color_index = self.rng.pick_index(GHOST_COLORS);
            let id = self.make_id("ghost");
            debug!(%id, pos = %spawn, color = ghost_color_name(color_index), "ghost spawned");
            self.ghosts.push(Ghost {
                id,
                pos: *spawn,
                color_index,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::test_support::Scripted;
    use crate::engine::GameEngine;
    use crate::level::parse;
    use crate::types::Position;

    #[test]
    fn ghosts_spawn_in_marker_order_with_drawn_colours() {
        let level = parse("C.P\n.CC").expect("level should parse");
        let engine =
            GameEngine::new(&level, Box::new(Scripted::new(&[3, 1, 2], 0))).expect("level should load");
        let ghosts = engine.ghosts();
        assert_eq!(ghosts.len(), 3);
        assert_eq!(ghosts[0].id, "ghost_1");
        assert_eq!(ghosts[0].pos, Position::new(0, 0));
        assert_eq!(ghosts[0].color_index, 3);
        assert_eq!(ghosts[1].pos, Position::new(1, 1));
        assert_eq!(ghosts[1].color_index, 1);
        assert_eq!(ghosts[2].id, "ghost_3");
        assert_eq!(ghosts[2].color_index, 2);
    }

    #[test]
    fn level_without_ghost_markers_has_no_ghosts() {
        let level = parse("P.o").expect("level should parse");
        let engine = GameEngine::new(&level, Box::new(Scripted::still())).expect("level should load");
        assert!(engine.ghosts().is_empty());
    }

    #[test]
    fn missing_player_start_refuses_to_load() {
        let level = parse("..C").expect("level should parse");
        assert!(GameEngine::new(&level, Box::new(Scripted::still())).is_err());
    }
}
