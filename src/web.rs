//! Browser bindings: canvas surface, `<audio>` cues, `setTimeout` timers and
//! the event wiring (spawn interval, click listener, animation frames).

use std::cell::{Cell, RefCell};
use std::f64::consts::TAU;
use std::rc::Rc;

use log::{info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlAudioElement, HtmlCanvasElement, MouseEvent, Window,
    window,
};

use crate::config::{GameConfig, Sound};
use crate::entity::Circle;
use crate::error::{GameError, Result};
use crate::game::Game;
use crate::platform::{Audio, Playback, Surface, Timers};
use crate::session::{FrameRequest, Session};

const CANVAS_ID: &str = "canvas";

// --- Collaborators -----------------------------------------------------------

pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }
}

impl Surface for CanvasSurface {
    fn tint(&mut self, color: &str, width: f64, height: f64) {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(0.0, 0.0, width, height);
    }

    fn fill_circle(&mut self, circle: &Circle) {
        self.ctx.begin_path();
        if self
            .ctx
            .arc(circle.pos.x, circle.pos.y, circle.radius(), 0.0, TAU)
            .is_err()
        {
            return;
        }
        self.ctx.set_fill_style_str(&circle.color);
        self.ctx.fill();
    }
}

/// A hidden, looping `<audio>` element. One-shot: `stop` detaches it.
pub struct AudioCue(HtmlAudioElement);

impl Playback for AudioCue {
    fn play(&self) {
        // Autoplay policies may reject until the first user gesture.
        if let Err(err) = self.0.play() {
            warn!("audio play rejected: {err:?}");
        }
    }

    fn stop(&self) {
        if let Err(err) = self.0.pause() {
            warn!("audio pause failed: {err:?}");
        }
        self.0.remove();
    }
}

pub struct DomAudio {
    document: Document,
}

impl Audio for DomAudio {
    type Handle = AudioCue;

    fn load(&mut self, sound: Sound, source: &str) -> Result<AudioCue> {
        let el = HtmlAudioElement::new_with_src(source)?;
        el.set_loop(true);
        el.set_attribute("controls", "none")?;
        el.set_attribute("style", "display:none;")?;
        el.set_attribute("data-cue", &format!("{sound:?}"))?;
        let body = self
            .document
            .body()
            .ok_or(GameError::MissingCollaborator("document body"))?;
        body.append_child(&el)?;
        Ok(AudioCue(el))
    }
}

pub struct WindowTimers {
    window: Window,
}

impl Timers for WindowTimers {
    fn after(&mut self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Result<()> {
        let callback = Closure::once_into_js(move || task());
        self.window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref(),
                i32::try_from(delay_ms).unwrap_or(i32::MAX),
            )?;
        Ok(())
    }
}

type WebSession = Session<CanvasSurface, DomAudio, WindowTimers>;

// --- Runtime state -----------------------------------------------------------

thread_local! {
    static SESSION: RefCell<Option<WebSession>> = const { RefCell::new(None) };
    /// Id of the pending `requestAnimationFrame`, if any.
    static PENDING_FRAME: Cell<Option<i32>> = const { Cell::new(None) };
    /// Self-requesting frame closure; cleared on stop to break its Rc cycle.
    static FRAME_LOOP: RefCell<Option<FrameCallback>> = const { RefCell::new(None) };
    static SPAWNER: RefCell<Option<(i32, Closure<dyn FnMut()>)>> = const { RefCell::new(None) };
    static LISTENING: Cell<bool> = const { Cell::new(false) };
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Run `wiring`; if it fails, undo a partial start with `rollback`.
fn or_rollback(wiring: impl FnOnce() -> Result<()>, rollback: impl FnOnce()) -> Result<()> {
    wiring().inspect_err(|err| {
        warn!("startup failed, rolling back: {err}");
        rollback();
    })
}

fn browser_window() -> Result<Window> {
    window().ok_or(GameError::MissingCollaborator("window"))
}

/// Reuse `#canvas` or create one, sized to the window.
fn canvas(win: &Window, doc: &Document) -> Result<HtmlCanvasElement> {
    let canvas: HtmlCanvasElement = match doc.get_element_by_id(CANVAS_ID) {
        Some(el) => el
            .dyn_into()
            .map_err(|_| GameError::MissingCollaborator("canvas element"))?,
        None => {
            let c: HtmlCanvasElement = doc
                .create_element("canvas")?
                .dyn_into()
                .map_err(|_| GameError::MissingCollaborator("canvas element"))?;
            c.set_id(CANVAS_ID);
            doc.body()
                .ok_or(GameError::MissingCollaborator("document body"))?
                .append_child(&c)?;
            c
        }
    };
    let width = win.inner_width()?.as_f64().unwrap_or(0.0);
    let height = win.inner_height()?.as_f64().unwrap_or(0.0);
    canvas.set_width(width as u32);
    canvas.set_height(height as u32);
    Ok(canvas)
}

/// Build a session from `config` and start the spawn timer, click listener
/// and frame loop. A running session is torn down first.
pub fn start(config: GameConfig) -> Result<()> {
    stop();

    let win = browser_window()?;
    let doc = win
        .document()
        .ok_or(GameError::MissingCollaborator("document"))?;
    let canvas = canvas(&win, &doc)?;
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or(GameError::MissingCollaborator("2d context"))?
        .dyn_into()
        .map_err(|_| GameError::MissingCollaborator("2d context"))?;

    let spawn_ms = config.spawn_interval_ms;
    let game = Game::new(config, f64::from(canvas.width()), f64::from(canvas.height()))?;
    let mut session = Session::new(
        game,
        CanvasSurface::new(ctx),
        DomAudio { document: doc.clone() },
        WindowTimers { window: win.clone() },
    );
    session.start()?;
    SESSION.with(|s| s.replace(Some(session)));

    or_rollback(
        || {
            listen_for_clicks(&doc)?;
            start_spawner(&win, spawn_ms)?;
            start_frame_loop(&win)
        },
        stop,
    )?;
    info!("canvas shooter running");
    Ok(())
}

/// Cancel the pending frame and spawn timer, free their closures and release
/// the session.
pub fn stop() {
    let spawner = SPAWNER.with(|s| s.borrow_mut().take());
    if let Some(win) = window() {
        if let Some(id) = PENDING_FRAME.with(Cell::take) {
            let _ = win.cancel_animation_frame(id);
        }
        if let Some((id, _)) = &spawner {
            win.clear_interval_with_handle(*id);
        }
    }
    drop(spawner);
    if let Some(frame_loop) = FRAME_LOOP.with(|f| f.borrow_mut().take()) {
        frame_loop.borrow_mut().take();
    }
    if let Some(session) = SESSION.with(|s| s.borrow_mut().take()) {
        session.teardown();
    }
}

fn listen_for_clicks(doc: &Document) -> Result<()> {
    // One listener for the page lifetime; it reads whichever session is current.
    if LISTENING.with(Cell::get) {
        return Ok(());
    }
    let closure = Closure::wrap(Box::new(move |evt: MouseEvent| {
        SESSION.with(|cell| {
            if let Some(session) = cell.borrow_mut().as_mut() {
                session.click(f64::from(evt.client_x()), f64::from(evt.client_y()));
            }
        });
    }) as Box<dyn FnMut(_)>);
    doc.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    LISTENING.with(|l| l.set(true));
    Ok(())
}

fn start_spawner(win: &Window, interval_ms: u32) -> Result<()> {
    let closure = Closure::wrap(Box::new(move || {
        let mut rng = rand::thread_rng();
        SESSION.with(|cell| {
            if let Some(session) = cell.borrow_mut().as_mut() {
                session.spawn_tick(&mut rng);
            }
        });
    }) as Box<dyn FnMut()>);
    let id = win.set_interval_with_callback_and_timeout_and_arguments_0(
        closure.as_ref().unchecked_ref(),
        i32::try_from(interval_ms).unwrap_or(i32::MAX),
    )?;
    SPAWNER.with(|s| s.replace(Some((id, closure))));
    Ok(())
}

fn start_frame_loop(win: &Window) -> Result<()> {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |_ts: f64| {
        PENDING_FRAME.with(|p| p.set(None));
        // Request the next frame up front; game over cancels it below.
        if let (Some(w), Some(cb)) = (window(), f.borrow().as_ref()) {
            match w.request_animation_frame(cb.as_ref().unchecked_ref()) {
                Ok(id) => PENDING_FRAME.with(|p| p.set(Some(id))),
                Err(err) => warn!("requestAnimationFrame failed: {err:?}"),
            }
        }
        let request = SESSION.with(|cell| {
            cell.borrow_mut()
                .as_mut()
                .map_or(FrameRequest::Halt, WebSession::frame)
        });
        if request == FrameRequest::Halt {
            if let (Some(w), Some(id)) = (window(), PENDING_FRAME.with(Cell::take)) {
                let _ = w.cancel_animation_frame(id);
            }
        }
    }) as Box<dyn FnMut(f64)>));

    let id = match g.borrow().as_ref() {
        Some(cb) => win.request_animation_frame(cb.as_ref().unchecked_ref())?,
        None => return Err(GameError::MissingCollaborator("frame callback")),
    };
    PENDING_FRAME.with(|p| p.set(Some(id)));
    FRAME_LOOP.with(|l| l.replace(Some(g)));
    Ok(())
}
