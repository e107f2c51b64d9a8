use crate::entity::{Ghost, Player};
use crate::error::LevelError;
use crate::level::{Level, LevelGrid};
use crate::rng::RandomSource;
use crate::tile::MovementOutcome;
use crate::types::{Direction, Outcome, Phase, SessionState, Snapshot};

mod ghost_system;
mod player_system;
mod spawn_system;
mod utils;

/// What one simulation step did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepReport {
    pub player: MovementOutcome,
    pub ghost_collision: bool,
    pub outcome: Option<Outcome>,
}

/// Grid, entities and random source for one level attempt.
///
/// The scoreboard lives in `SessionState`, owned by the caller and passed into
/// `step`, so the engine itself carries no lifecycle flags.
pub struct GameEngine {
    grid: LevelGrid,
    player: Player,
    ghosts: Vec<Ghost>,
    rng: Box<dyn RandomSource>,
    tick_counter: u64,
    next_id_counter: u64,
}

impl GameEngine {
    pub fn new(level: &Level, rng: Box<dyn RandomSource>) -> Result<Self, LevelError> {
        let start = level.player_start()?;
        let mut engine = Self {
            grid: level.grid.clone(),
            player: Player::new(start),
            ghosts: Vec::new(),
            rng,
            tick_counter: 0,
            next_id_counter: 1,
        };
        engine.spawn_ghosts(level.ghost_spawns());
        Ok(engine)
    }

    pub fn grid(&self) -> &LevelGrid {
        &self.grid
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    /// Hands the random source back so a replay continues the same sequence.
    pub fn into_rng(self) -> Box<dyn RandomSource> {
        self.rng
    }

    /// Player first, then every ghost in spawn order.
    ///
    /// Does nothing once `state` carries an outcome.
    pub fn step(&mut self, state: &mut SessionState) -> StepReport {
        if state.outcome.is_some() {
            return StepReport {
                player: MovementOutcome::Blocked,
                ghost_collision: false,
                outcome: state.outcome,
            };
        }
        self.tick_counter += 1;

        let player = self.move_player(state);
        let mut ghost_collision = false;
        if state.outcome.is_none() {
            ghost_collision = self.move_ghosts(state);
        }

        StepReport {
            player,
            ghost_collision,
            outcome: state.outcome,
        }
    }

    /// Returns whether the facing actually changed.
    pub fn set_direction(&mut self, dir: Direction) -> bool {
        if self.player.facing == dir {
            return false;
        }
        self.player.facing = dir;
        true
    }

    pub fn advance_animation(&mut self) -> u8 {
        self.player.advance_frame()
    }

    pub fn build_snapshot(&self, phase: Phase, state: &SessionState) -> Snapshot {
        Snapshot {
            tick: self.tick_counter,
            phase,
            tiles: self.grid.to_rows(),
            player: self.player.view(),
            ghosts: self.ghosts.iter().map(|ghost| ghost.view()).collect(),
            score: state.score,
            has_key: state.has_key,
        }
    }

    fn make_id(&mut self, prefix: &str) -> String {
        let id = format!("{}_{}", prefix, self.next_id_counter);
        self.next_id_counter = self.next_id_counter.saturating_add(1);
        id
    }
}
