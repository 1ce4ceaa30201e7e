//! Collaborator interfaces the core talks to. The browser implementations live
//! in `web`; tests supply recording fakes.

use crate::config::Sound;
use crate::entity::Circle;
use crate::error::Result;

/// Something the loop can paint onto.
pub trait Surface {
    /// Fill the whole `width` x `height` area with a (usually translucent) color.
    fn tint(&mut self, color: &str, width: f64, height: f64);
    fn fill_circle(&mut self, circle: &Circle);
}

/// A loaded sound clip.
pub trait Playback {
    fn play(&self);
    fn stop(&self);
}

/// Builds a fresh playback handle per cue.
pub trait Audio {
    type Handle: Playback + 'static;

    fn load(&mut self, sound: Sound, source: &str) -> Result<Self::Handle>;
}

/// Fire-and-forget deferred work (audio stops).
pub trait Timers {
    fn after(&mut self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Result<()>;
}
