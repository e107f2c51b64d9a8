//! Periodic tasks that tick a shared session in real time.
//!
//! Two tokio tasks run while the session is `Running`: the simulation tick at
//! the configured speed and the mouth animation every 100ms. Each task holds
//! the session generation it was started under and exits as soon as the
//! session reports a different one, so a stopped or paused session is never
//! advanced by a task that outlived it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, trace};

use crate::config::TickSpeed;
use crate::constants::ANIMATION_MS;
use crate::error::GameResult;
use crate::session::GameSession;
use crate::types::{Direction, GameEvent, Phase};

pub type SharedSession = Arc<Mutex<GameSession>>;

pub struct SessionDriver {
    session: SharedSession,
    events: mpsc::UnboundedSender<GameEvent>,
    speed: TickSpeed,
    tasks: Vec<JoinHandle<()>>,
}

impl SessionDriver {
    pub fn new(
        session: SharedSession,
        speed: TickSpeed,
        events: mpsc::UnboundedSender<GameEvent>,
    ) -> Self {
        Self {
            session,
            events,
            speed,
            tasks: Vec::new(),
        }
    }

    pub fn session(&self) -> SharedSession {
        self.session.clone()
    }

    pub fn speed(&self) -> TickSpeed {
        self.speed
    }

    /// True while at least one periodic task is still alive.
    pub fn is_active(&self) -> bool {
        self.tasks.iter().any(|task| !task.is_finished())
    }

    /// (Re)starts both periodic tasks if the session is running.
    pub async fn start(&mut self) -> bool {
        self.abort_tasks();
        let generation = {
            let mut guard = self.session.lock().await;
            if guard.phase() != Phase::Running {
                return false;
            }
            guard.invalidate_drivers();
            forward_events(&mut guard, &self.events);
            guard.generation()
        };

        info!(
            generation,
            tick_ms = self.speed.interval().as_millis() as u64,
            "starting session drivers"
        );
        self.tasks.push(spawn_tick_loop(
            self.session.clone(),
            self.events.clone(),
            self.speed.interval(),
            generation,
        ));
        self.tasks.push(spawn_animation_loop(
            self.session.clone(),
            self.events.clone(),
            generation,
        ));
        true
    }

    pub async fn pause(&mut self) -> bool {
        let paused = {
            let mut guard = self.session.lock().await;
            let paused = guard.pause();
            forward_events(&mut guard, &self.events);
            paused
        };
        if paused {
            self.abort_tasks();
        }
        paused
    }

    pub async fn resume(&mut self) -> bool {
        let resumed = {
            let mut guard = self.session.lock().await;
            let resumed = guard.resume();
            forward_events(&mut guard, &self.events);
            resumed
        };
        if resumed {
            self.start().await;
        }
        resumed
    }

    pub async fn set_direction(&self, dir: Direction) -> bool {
        let mut guard = self.session.lock().await;
        let changed = guard.set_direction(dir);
        forward_events(&mut guard, &self.events);
        changed
    }

    /// Applies a new tick period; a running tick loop is restarted with it.
    pub async fn set_speed(&mut self, speed: TickSpeed) {
        if speed == self.speed {
            return;
        }
        debug!(secs = speed.secs(), "tick speed changed");
        self.speed = speed;
        if self.is_active() {
            self.start().await;
        }
    }

    pub async fn replay(&mut self) -> GameResult<()> {
        {
            let mut guard = self.session.lock().await;
            guard.replay()?;
            forward_events(&mut guard, &self.events);
        }
        self.start().await;
        Ok(())
    }

    /// Invalidates and cancels every periodic task.
    pub async fn stop(&mut self) {
        self.session.lock().await.invalidate_drivers();
        self.abort_tasks();
        info!("session drivers stopped");
    }

    fn abort_tasks(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for SessionDriver {
    fn drop(&mut self) {
        self.abort_tasks();
    }
}

fn spawn_tick_loop(
    session: SharedSession,
    events: mpsc::UnboundedSender<GameEvent>,
    period: Duration,
    generation: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let mut guard = session.lock().await;
            if guard.generation() != generation {
                trace!(generation, "stale tick loop exiting");
                break;
            }
            guard.tick();
            let ended = guard.phase() == Phase::Ended;
            forward_events(&mut guard, &events);
            if ended {
                break;
            }
        }
    })
}

fn spawn_animation_loop(
    session: SharedSession,
    events: mpsc::UnboundedSender<GameEvent>,
    generation: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = Duration::from_millis(ANIMATION_MS);
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let mut guard = session.lock().await;
            if guard.generation() != generation {
                trace!(generation, "stale animation loop exiting");
                break;
            }
            guard.animate();
            forward_events(&mut guard, &events);
        }
    })
}

fn forward_events(session: &mut GameSession, events: &mpsc::UnboundedSender<GameEvent>) {
    for event in session.drain_events() {
        if events.send(event).is_err() {
            trace!("event receiver dropped");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::Scripted;
    use crate::types::Outcome;

    fn shared(text: &str) -> SharedSession {
        let mut session = GameSession::new(Box::new(Scripted::still()));
        session.load("driven", text).expect("level should load");
        Arc::new(Mutex::new(session))
    }

    async fn advance(ms: u64) {
        time::sleep(Duration::from_millis(ms)).await;
        tokio::task::yield_now().await;
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<GameEvent>) -> Vec<GameEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_at_the_configured_speed() {
        let session = shared("P.......");
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut driver = SessionDriver::new(session.clone(), TickSpeed::default(), tx);
        assert!(driver.start().await);

        advance(950).await;
        assert_eq!(session.lock().await.tick_count(), 3);

        driver.set_speed(TickSpeed::new(0.1).expect("speed")).await;
        advance(450).await;
        assert_eq!(session.lock().await.tick_count(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_stops_ticks_and_resume_restarts_them() {
        let session = shared("P.......");
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut driver = SessionDriver::new(session.clone(), TickSpeed::default(), tx);
        driver.start().await;

        advance(350).await;
        assert!(driver.pause().await);
        assert!(!driver.pause().await);
        let paused_at = session.lock().await.tick_count();
        advance(2_000).await;
        assert_eq!(session.lock().await.tick_count(), paused_at);

        assert!(driver.resume().await);
        advance(350).await;
        assert_eq!(session.lock().await.tick_count(), paused_at + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_tasks_stop_after_a_generation_change() {
        let session = shared("P.......");
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut driver = SessionDriver::new(session.clone(), TickSpeed::default(), tx);
        driver.start().await;
        advance(350).await;

        {
            let mut guard = session.lock().await;
            guard.pause();
            guard.resume();
        }
        let before = session.lock().await.tick_count();
        advance(1_000).await;
        assert_eq!(session.lock().await.tick_count(), before);
        assert!(!driver.is_active());

        driver.start().await;
        advance(350).await;
        assert_eq!(session.lock().await.tick_count(), before + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn drivers_finish_when_the_session_ends() {
        let session = shared("PKG");
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut driver = SessionDriver::new(session.clone(), TickSpeed::default(), tx);
        driver.start().await;

        advance(700).await;
        assert_eq!(session.lock().await.phase(), Phase::Ended);
        advance(300).await;
        assert!(!driver.is_active());

        let events = drain(&mut rx);
        let outcome = events
            .iter()
            .find_map(|event| match event {
                GameEvent::Outcome { outcome, .. } => Some(*outcome),
                _ => None,
            });
        assert_eq!(outcome, Some(Outcome::Won));
    }

    #[tokio::test(start_paused = true)]
    async fn animation_cycles_every_hundred_milliseconds() {
        let session = shared("PWWW");
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut driver = SessionDriver::new(session.clone(), TickSpeed::new(1.0).expect("speed"), tx);
        driver.start().await;

        advance(350).await;
        let frames: Vec<u8> = drain(&mut rx)
            .into_iter()
            .filter_map(|event| match event {
                GameEvent::Animated { frame } => Some(frame),
                _ => None,
            })
            .collect();
        assert_eq!(frames, vec![2, 3, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn start_refuses_a_session_that_is_not_running() {
        let session = Arc::new(Mutex::new(GameSession::new(Box::new(Scripted::still()))));
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut driver = SessionDriver::new(session, TickSpeed::default(), tx);
        assert!(!driver.start().await);
        assert!(!driver.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn direction_changes_are_forwarded() {
        let session = shared("P.\n..");
        let (tx, mut rx) = mpsc::unbounded_channel();
        let driver = SessionDriver::new(session, TickSpeed::default(), tx);
        assert!(driver.set_direction(Direction::Down).await);
        assert!(drain(&mut rx).iter().any(|event| matches!(
            event,
            GameEvent::PlayerTurned {
                direction: Direction::Down,
                ..
            }
        )));
    }
}
