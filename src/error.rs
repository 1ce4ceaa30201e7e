//! Error taxonomy shared by the simulation core and the browser bindings.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GameError {
    /// Entity radius must be finite and strictly positive.
    #[error("invalid radius {0}: must be finite and > 0")]
    InvalidRadius(f64),

    #[error("invalid screen bounds {width}x{height}")]
    InvalidBounds { width: f64, height: f64 },

    #[error("invalid config field `{field}`: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },

    /// A browser collaborator (window, document, canvas, 2d context) is absent.
    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    #[error("javascript error: {0}")]
    Js(String),

    #[error("config parse error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, GameError>;

impl From<JsValue> for GameError {
    fn from(value: JsValue) -> Self {
        GameError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<GameError> for JsValue {
    fn from(err: GameError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

#[cfg(feature = "serde_json")]
impl From<serde_json::Error> for GameError {
    fn from(err: serde_json::Error) -> Self {
        GameError::Config(err.to_string())
    }
}
