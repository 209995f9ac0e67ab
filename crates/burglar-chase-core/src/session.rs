//! Game session state machine, timer and sound cues.

use tracing::info;

use crate::catch_items::CatchProgress;
use crate::loading::LoadProgress;

/// Seconds between the last catch and the finish sound.
pub const FINISH_CUE_DELAY: f32 = 0.5;

/// Top-level game state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GameState {
    /// Assets are still loading.
    #[default]
    Loading,
    /// Title or pause screen; nothing simulates.
    Paused,
    /// Driving.
    Running,
    /// Every burglar caught.
    GameOver,
}

/// Sounds the session wants played.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionCue {
    StartSiren,
    StopSiren,
    /// A burglar was caught.
    Point,
    /// Played shortly after game over.
    Finish,
}

/// Elapsed running time.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GameTimer {
    elapsed: f32,
    running: bool,
}

impl GameTimer {
    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Zero the clock and start it.
    pub fn restart(&mut self) {
        self.elapsed = 0.0;
        self.start();
    }

    /// Accumulate `dt` seconds if running.
    pub fn tick(&mut self, dt: f32) {
        if self.running {
            self.elapsed += dt;
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Elapsed time as `MM:SS`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn format(&self) -> String {
        let total = self.elapsed.max(0.0).floor() as u64;
        format!("{:02}:{:02}", total / 60, total % 60)
    }
}

/// The running game: state, timer and pending cues.
#[derive(Clone, Debug, Default)]
pub struct GameSession {
    state: GameState,
    timer: GameTimer,
    last_resolved: Option<usize>,
    progress: CatchProgress,
    finish_countdown: Option<f32>,
    cues: Vec<SessionCue>,
}

impl GameSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn timer(&self) -> &GameTimer {
        &self.timer
    }

    /// Last progress reported by the burglars.
    pub fn progress(&self) -> CatchProgress {
        self.progress
    }

    /// Whether physics and burglars should advance.
    pub fn is_simulating(&self) -> bool {
        self.state == GameState::Running
    }

    fn enter(&mut self, next: GameState) {
        let previous = self.state;
        if previous == next {
            return;
        }
        info!("Game state {previous:?} -> {next:?}");
        self.state = next;

        match next {
            GameState::Running => {
                self.timer.start();
                self.cues.push(SessionCue::StartSiren);
            }
            GameState::Paused | GameState::GameOver => {
                self.timer.stop();
                if previous == GameState::Running {
                    self.cues.push(SessionCue::StopSiren);
                }
            }
            GameState::Loading => {}
        }
    }

    /// Leave the loading screen once every asset has settled.
    pub fn observe_loading(&mut self, progress: &LoadProgress) {
        if self.state == GameState::Loading && progress.is_complete() {
            self.enter(GameState::Paused);
        }
    }

    /// Start or resume from the title/pause screen.
    pub fn start(&mut self) {
        if self.state == GameState::Paused {
            self.enter(GameState::Running);
        }
    }

    /// Pause a running game. Has no effect elsewhere.
    pub fn pause(&mut self) {
        if self.state == GameState::Running {
            self.enter(GameState::Paused);
        }
    }

    /// Record the per-tick catch progress.
    ///
    /// Cues a point sound when the caught count changes to a non-zero value
    /// and ends the game once every burglar is caught.
    pub fn observe_progress(&mut self, progress: CatchProgress) {
        self.progress = progress;
        if self.last_resolved == Some(progress.resolved) {
            return;
        }
        self.last_resolved = Some(progress.resolved);

        if progress.resolved > 0 {
            self.cues.push(SessionCue::Point);
        }
        if progress.is_complete() && self.state == GameState::Running {
            info!("All {} burglars caught in {}", progress.total, self.timer.format());
            self.finish_countdown = Some(FINISH_CUE_DELAY);
            self.enter(GameState::GameOver);
        }
    }

    /// Start over. The caller resets the world (burglars, car, camera).
    pub fn restart(&mut self) {
        if self.state == GameState::Loading {
            return;
        }
        self.timer.restart();
        self.last_resolved = None;
        self.progress.resolved = 0;
        self.finish_countdown = None;
        // Force the Running entry cues even if we were already running.
        if self.state == GameState::Running {
            self.state = GameState::Paused;
            self.cues.push(SessionCue::StopSiren);
        }
        self.enter(GameState::Running);
    }

    /// Advance clocks by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        self.timer.tick(dt);
        if let Some(remaining) = self.finish_countdown.as_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.finish_countdown = None;
                self.cues.push(SessionCue::Finish);
            }
        }
    }

    /// Take the cues raised since the last call.
    pub fn drain_cues(&mut self) -> Vec<SessionCue> {
        std::mem::take(&mut self.cues)
    }
}
