use tracing::trace;

use super::utils::ghost_index_at;
use super::*;
use crate::tile::{outcome, TileKind};

impl GameEngine {
    /// Resolves the player's move toward `facing` against the tile catalog.
    ///
    /// A gate without the key resolves to `Blocked`.
    pub(super) fn move_player(&mut self, state: &mut SessionState) -> MovementOutcome {
        let from = self.player.pos;
        let Some(target) = self.grid.step(from, self.player.facing) else {
            return MovementOutcome::Blocked;
        };

        if ghost_index_at(&self.ghosts, target).is_some() {
            trace!(%from, %target, "player ran into a ghost");
            state.outcome = Some(Outcome::Lost);
            return MovementOutcome::GhostCollision;
        }

        let resolved = match outcome(self.grid.get(target)) {
            MovementOutcome::Blocked | MovementOutcome::GhostCollision => {
                return MovementOutcome::Blocked;
            }
            MovementOutcome::GatePassable => {
                if !state.has_key {
                    return MovementOutcome::Blocked;
                }
                trace!(%target, "player reached the gate holding the key");
                state.outcome = Some(Outcome::Won);
                return MovementOutcome::GatePassable;
            }
            MovementOutcome::PointPickup => {
                state.score += 1;
                MovementOutcome::PointPickup
            }
            MovementOutcome::KeyPickup => {
                state.has_key = true;
                MovementOutcome::KeyPickup
            }
            MovementOutcome::Enter => MovementOutcome::Enter,
        };

        self.grid.set(from, TileKind::Empty);
        self.grid.set(target, TileKind::Empty);
        self.player.pos = target;
        trace!(%from, %target, ?resolved, score = state.score, "player moved");
        resolved
    }
}
