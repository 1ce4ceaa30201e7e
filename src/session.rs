//! The frame loop wired to its collaborators.
//!
//! A [`Session`] owns the [`Game`] plus the render surface, audio and timer
//! capabilities. Whoever drives it (the browser glue in `web`, or a test)
//! forwards spawn ticks, clicks and display refreshes, and keeps requesting
//! frames for as long as [`Session::frame`] answers [`FrameRequest::Schedule`].

use log::{info, warn};
use rand::Rng;

use crate::config::Sound;
use crate::entity::Vec2;
use crate::error::Result;
use crate::game::Game;
use crate::platform::{Audio, Playback, Surface, Timers};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameRequest {
    /// Ask the display scheduler for another frame.
    Schedule,
    /// Game over: cancel any pending frame and stop.
    Halt,
}

pub struct Session<S: Surface, A: Audio, T: Timers> {
    game: Game,
    surface: S,
    audio: A,
    timers: T,
    environment: Option<A::Handle>,
}

impl<S: Surface, A: Audio, T: Timers> Session<S, A, T> {
    pub fn new(game: Game, surface: S, audio: A, timers: T) -> Self {
        Self {
            game,
            surface,
            audio,
            timers,
            environment: None,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Start the looping environment track. Fails if the audio collaborator
    /// cannot produce a handle.
    pub fn start(&mut self) -> Result<()> {
        let source = self.game.config().sound_source(Sound::Environment).to_owned();
        let handle = self.audio.load(Sound::Environment, &source)?;
        handle.play();
        self.environment = Some(handle);
        let (w, h) = self.game.size();
        info!("session started on a {w}x{h} screen");
        Ok(())
    }

    /// Spawn-timer callback. The new enemy is drawn right away.
    pub fn spawn_tick<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if let Some(enemy) = self.game.spawn_enemy(rng) {
            self.surface.fill_circle(enemy);
        }
    }

    /// Pointer click at client coordinates. Returns whether a bullet was fired.
    pub fn click(&mut self, x: f64, y: f64) -> bool {
        if self.game.fire(Vec2::new(x, y)).is_none() {
            return false;
        }
        let delay = self.game.config().shoot_cue_ms;
        self.cue(Sound::Shoot, delay);
        true
    }

    /// Display-refresh callback.
    pub fn frame(&mut self) -> FrameRequest {
        let report = self.game.step(&mut self.surface);
        if report.game_over {
            let delay = self.game.config().game_over_cue_ms;
            self.cue(Sound::GameOver, delay);
        }
        if self.game.is_over() {
            FrameRequest::Halt
        } else {
            FrameRequest::Schedule
        }
    }

    /// Stop the environment track and hand back the final game state.
    pub fn teardown(mut self) -> Game {
        if let Some(track) = self.environment.take() {
            track.stop();
        }
        info!("session torn down after {} frames", self.game.frame());
        self.game
    }

    /// Play a one-off cue and schedule its stop. Audio is best effort once the
    /// session is running.
    fn cue(&mut self, sound: Sound, stop_after_ms: u32) {
        let source = self.game.config().sound_source(sound).to_owned();
        let handle = match self.audio.load(sound, &source) {
            Ok(handle) => handle,
            Err(err) => {
                warn!("could not load {sound:?} cue: {err}");
                return;
            }
        };
        handle.play();
        if let Err(err) = self.timers.after(stop_after_ms, Box::new(move || handle.stop())) {
            warn!("could not schedule stop for {sound:?} cue: {err}");
        }
    }
}
