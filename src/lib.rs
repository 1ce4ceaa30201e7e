//! Canvas Shooter core crate.
//!
//! A stationary turret at the bottom of the screen shoots at enemies that spawn
//! along the top edge and drift toward it. The simulation (`game`) and the
//! frame loop (`session`) only talk to collaborator traits (`platform`), so
//! they run natively under `cargo test`; `web` supplies the browser versions
//! and the wasm exports below start and stop a game on the page.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod entity;
pub mod error;
pub mod game;
pub mod platform;
pub mod session;
pub mod web;

pub use config::{GameConfig, Sound};
pub use entity::{Circle, Kind, Vec2};
pub use error::GameError;
pub use game::{FrameReport, Game, GameStatus};
pub use session::{FrameRequest, Session};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    let level = if cfg!(debug_assertions) {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    // A second init (e.g. hot reload) keeps the first logger.
    let _ = console_log::init_with_level(level);
}

// -----------------------------------------------------------------------------
// Entrypoints
// -----------------------------------------------------------------------------

/// Start a game with the classic settings on `#canvas` (created if absent).
#[wasm_bindgen]
pub fn start_game() -> std::result::Result<(), JsValue> {
    web::start(GameConfig::default()).map_err(JsValue::from)
}

/// Start a game with settings from a JSON object; omitted fields keep their
/// defaults.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_game_with_config(json: &str) -> std::result::Result<(), JsValue> {
    let config = GameConfig::from_json(json)?;
    web::start(config).map_err(JsValue::from)
}

/// Stop the frame loop and spawn timer and release audio.
#[wasm_bindgen]
pub fn stop_game() {
    web::stop();
}
