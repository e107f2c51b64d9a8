//! Lifecycle of one level attempt: `Loading -> Running <-> Paused`, `Running -> Ended`.
//!
//! The session owns the engine and the scoreboard, queues events for the
//! presentation layer, and counts a generation that periodic drivers check
//! before touching it.

use tracing::{debug, info, warn};

use crate::engine::{GameEngine, StepReport};
use crate::error::{GameResult, SessionError};
use crate::level::{parse, Level};
use crate::library::LevelSource;
use crate::rng::{make_source, RandomSource};
use crate::types::{Direction, GameEvent, Phase, SessionState, SessionSummary, Snapshot};

pub struct GameSession {
    level_name: String,
    level: Option<Level>,
    engine: Option<GameEngine>,
    spare_rng: Option<Box<dyn RandomSource>>,
    state: SessionState,
    phase: Phase,
    events: Vec<GameEvent>,
    generation: u64,
}

impl GameSession {
    pub fn new(rng: Box<dyn RandomSource>) -> Self {
        Self {
            level_name: String::new(),
            level: None,
            engine: None,
            spare_rng: Some(rng),
            state: SessionState::default(),
            phase: Phase::Loading,
            events: Vec::new(),
            generation: 0,
        }
    }

    /// Parses `text` and starts running it. On failure nothing changes.
    pub fn load(&mut self, name: &str, text: &str) -> GameResult<()> {
        self.ensure_phase(&[Phase::Loading], "load a level")?;
        let level = parse(text)?;
        if let Err(error) = level.player_start() {
            warn!(level = name, %error, "level refused");
            return Err(error.into());
        }
        let rng = self.take_rng().unwrap_or_else(|| make_source(None));
        let engine = GameEngine::new(&level, rng)?;

        info!(
            level = name,
            rows = level.grid.rows(),
            cols = level.grid.cols(),
            ghosts = engine.ghosts().len(),
            "level loaded"
        );
        self.level_name = name.to_string();
        self.level = Some(level);
        self.engine = Some(engine);
        self.state = SessionState::default();
        self.set_phase(Phase::Running);
        self.push_snapshot();
        Ok(())
    }

    pub fn load_from(&mut self, source: &dyn LevelSource, name: &str) -> GameResult<()> {
        self.ensure_phase(&[Phase::Loading], "load a level")?;
        let text = source.load_level(name)?;
        self.load(name, &text)
    }

    /// One simulation step. Does nothing unless running.
    pub fn tick(&mut self) -> Option<StepReport> {
        if self.phase != Phase::Running {
            return None;
        }
        let engine = self.engine.as_mut()?;
        let report = engine.step(&mut self.state);
        self.push_snapshot();

        if let Some(outcome) = report.outcome {
            info!(
                level = %self.level_name,
                ?outcome,
                score = self.state.score,
                ticks = self.tick_count(),
                "session ended"
            );
            self.set_phase(Phase::Ended);
            self.generation += 1;
            self.events.push(GameEvent::Outcome {
                outcome,
                final_score: self.state.score,
            });
        }
        Some(report)
    }

    /// Advances the cosmetic mouth frame. Does nothing unless running.
    pub fn animate(&mut self) -> Option<u8> {
        if self.phase != Phase::Running {
            return None;
        }
        let frame = self.engine.as_mut()?.advance_animation();
        self.events.push(GameEvent::Animated { frame });
        Some(frame)
    }

    pub fn pause(&mut self) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        self.set_phase(Phase::Paused);
        self.generation += 1;
        debug!(level = %self.level_name, "paused");
        self.events.push(GameEvent::PauseChanged { paused: true });
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.phase != Phase::Paused {
            return false;
        }
        self.set_phase(Phase::Running);
        self.generation += 1;
        debug!(level = %self.level_name, "resumed");
        self.events.push(GameEvent::PauseChanged { paused: false });
        true
    }

    /// Ignored while paused or ended. Returns whether the facing changed.
    pub fn set_direction(&mut self, dir: Direction) -> bool {
        if matches!(self.phase, Phase::Paused | Phase::Ended) {
            return false;
        }
        let Some(engine) = self.engine.as_mut() else {
            return false;
        };
        if !engine.set_direction(dir) {
            return false;
        }
        let frame = engine.player().mouth_frame;
        debug!(direction = %dir, "direction changed");
        self.events.push(GameEvent::PlayerTurned {
            direction: dir,
            frame,
        });
        true
    }

    /// Back to `Loading` with a clean scoreboard and no entities.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.ensure_phase(&[Phase::Ended, Phase::Loading], "reset")?;
        if let Some(engine) = self.engine.take() {
            self.spare_rng = Some(engine.into_rng());
        }
        self.level = None;
        self.level_name.clear();
        self.state = SessionState::default();
        self.set_phase(Phase::Loading);
        self.generation += 1;
        debug!("session reset");
        Ok(())
    }

    /// Restarts the last level from scratch after it ended.
    pub fn replay(&mut self) -> GameResult<()> {
        self.ensure_phase(&[Phase::Ended], "replay")?;
        let level = self.level.clone().ok_or(SessionError::NoLevel)?;
        let rng = self.take_rng().unwrap_or_else(|| make_source(None));
        let engine = GameEngine::new(&level, rng)?;

        debug!(level = %self.level_name, "replaying level");
        self.engine = Some(engine);
        self.state = SessionState::default();
        self.set_phase(Phase::Running);
        self.generation += 1;
        self.push_snapshot();
        Ok(())
    }

    /// Makes every outstanding driver task a no-op.
    pub fn invalidate_drivers(&mut self) {
        self.generation += 1;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn engine(&self) -> Option<&GameEngine> {
        self.engine.as_ref()
    }

    pub fn level_name(&self) -> &str {
        &self.level_name
    }

    pub fn tick_count(&self) -> u64 {
        self.engine.as_ref().map(|engine| engine.tick_count()).unwrap_or(0)
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> Option<Snapshot> {
        self.engine
            .as_ref()
            .map(|engine| engine.build_snapshot(self.phase, &self.state))
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            level: self.level_name.clone(),
            outcome: self.state.outcome,
            score: self.state.score,
            has_key: self.state.has_key,
            ticks: self.tick_count(),
        }
    }

    fn take_rng(&mut self) -> Option<Box<dyn RandomSource>> {
        match self.engine.take() {
            Some(engine) => Some(engine.into_rng()),
            None => self.spare_rng.take(),
        }
    }

    fn push_snapshot(&mut self) {
        if let Some(snapshot) = self.snapshot() {
            self.events.push(GameEvent::Tick { snapshot });
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.state.paused = phase == Phase::Paused;
        self.state.ended = phase == Phase::Ended;
    }

    fn ensure_phase(&self, allowed: &[Phase], action: &'static str) -> Result<(), SessionError> {
        if allowed.contains(&self.phase) {
            return Ok(());
        }
        warn!(phase = %self.phase, action, "rejected session transition");
        Err(SessionError::InvalidTransition {
            from: self.phase,
            action,
        })
    }
}
