//! Tunable game constants. `Default` reproduces the classic browser game.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Named sound resources the core asks the audio collaborator for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sound {
    Environment,
    Shoot,
    GameOver,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    pub player_radius: f64,
    pub player_color: String,
    /// Distance between the player's centre and the bottom edge.
    pub player_bottom_offset: f64,

    pub enemy_radius: f64,
    pub enemy_color: String,
    pub enemy_speed: f64,
    pub spawn_interval_ms: u32,

    pub bullet_radius: f64,
    pub bullet_color: String,
    pub bullet_speed: f64,

    /// Translucent overlay painted each frame; the alpha leaves motion trails.
    pub overlay_color: String,
    /// Boundary gap below which two circles count as touching.
    pub collision_tolerance: f64,
    /// Bullets further than this outside the screen are dropped.
    pub cull_margin: f64,
    pub accept_input_after_game_over: bool,

    pub shoot_cue_ms: u32,
    pub game_over_cue_ms: u32,
    pub environment_sound: String,
    pub shoot_sound: String,
    pub game_over_sound: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_radius: 20.0,
            player_color: "#EDF7F6".into(),
            player_bottom_offset: 50.0,
            enemy_radius: 30.0,
            enemy_color: "pink".into(),
            enemy_speed: 1.0,
            spawn_interval_ms: 1000,
            bullet_radius: 5.0,
            bullet_color: "#F19953".into(),
            bullet_speed: 1.0,
            overlay_color: "rgba(38,96,164, 0.4)".into(),
            collision_tolerance: 1.0,
            cull_margin: 50.0,
            accept_input_after_game_over: false,
            shoot_cue_ms: 1000,
            game_over_cue_ms: 3000,
            environment_sound: "./media/environment.wav".into(),
            shoot_sound: "./media/shoot.wav".into(),
            game_over_sound: "./media/game-over.wav".into(),
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<()> {
        for radius in [self.player_radius, self.enemy_radius, self.bullet_radius] {
            if !(radius.is_finite() && radius > 0.0) {
                return Err(GameError::InvalidRadius(radius));
            }
        }
        positive("enemy_speed", self.enemy_speed)?;
        positive("bullet_speed", self.bullet_speed)?;
        positive("collision_tolerance", self.collision_tolerance)?;
        if !(self.cull_margin.is_finite() && self.cull_margin >= 0.0) {
            return Err(GameError::InvalidConfig {
                field: "cull_margin",
                reason: "must be finite and >= 0",
            });
        }
        if !self.player_bottom_offset.is_finite() {
            return Err(GameError::InvalidConfig {
                field: "player_bottom_offset",
                reason: "must be finite",
            });
        }
        if self.spawn_interval_ms == 0 {
            return Err(GameError::InvalidConfig {
                field: "spawn_interval_ms",
                reason: "must be > 0",
            });
        }
        Ok(())
    }

    pub fn sound_source(&self, sound: Sound) -> &str {
        match sound {
            Sound::Environment => &self.environment_sound,
            Sound::Shoot => &self.shoot_sound,
            Sound::GameOver => &self.game_over_sound,
        }
    }

    /// Parse a (possibly partial) JSON object; missing fields take defaults.
    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

fn positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GameError::InvalidConfig {
            field,
            reason: "must be finite and > 0",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_non_positive_radius() {
        let cfg = GameConfig {
            enemy_radius: 0.0,
            ..GameConfig::default()
        };
        assert_eq!(cfg.validate(), Err(GameError::InvalidRadius(0.0)));
    }

    #[test]
    fn rejects_zero_spawn_interval() {
        let cfg = GameConfig {
            spawn_interval_ms: 0,
            ..GameConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(GameError::InvalidConfig { field: "spawn_interval_ms", .. })
        ));
    }

    #[test]
    fn rejects_negative_cull_margin() {
        let cfg = GameConfig {
            cull_margin: -1.0,
            ..GameConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn sound_sources_map_to_media_files() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.sound_source(Sound::Shoot), "./media/shoot.wav");
        assert_eq!(cfg.sound_source(Sound::GameOver), "./media/game-over.wav");
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = GameConfig::from_json(r#"{ "enemy_speed": 2.5 }"#).unwrap();
        assert_eq!(cfg.enemy_speed, 2.5);
        assert_eq!(cfg.enemy_radius, 30.0);
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn invalid_json_values_are_rejected() {
        assert!(GameConfig::from_json(r#"{ "bullet_radius": -5 }"#).is_err());
        assert!(matches!(
            GameConfig::from_json("not json"),
            Err(GameError::Config(_))
        ));
    }
}
