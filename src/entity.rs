//! Circle entities and the geometry shared by player, bullets and enemies.

use crate::error::{GameError, Result};

// --- Vectors -----------------------------------------------------------------

/// Position or per-frame displacement in canvas units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Vec2) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Heading from `from` to `to` scaled to `speed`. Coincident points head
    /// along +x, which is what atan2(0, 0) yields.
    pub fn aim(from: Vec2, to: Vec2, speed: f64) -> Vec2 {
        let angle = (to.y - from.y).atan2(to.x - from.x);
        Vec2::new(angle.cos() * speed, angle.sin() * speed)
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

// --- Circles -----------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Player,
    Bullet,
    Enemy,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Circle {
    pub kind: Kind,
    pub pos: Vec2,
    radius: f64,
    /// CSS color string handed to the render surface as-is.
    pub color: String,
    /// `None` for the stationary player.
    pub velocity: Option<Vec2>,
}

impl Circle {
    pub fn new(
        kind: Kind,
        pos: Vec2,
        radius: f64,
        color: impl Into<String>,
        velocity: Option<Vec2>,
    ) -> Result<Self> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(GameError::InvalidRadius(radius));
        }
        Ok(Self {
            kind,
            pos,
            radius,
            color: color.into(),
            velocity,
        })
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// One frame of linear motion. No-op for entities without velocity.
    pub fn advance(&mut self) {
        if let Some(v) = self.velocity {
            self.pos += v;
        }
    }

    /// Gap between the two boundaries (negative when overlapping).
    pub fn gap(&self, other: &Circle) -> f64 {
        self.pos.distance(other.pos) - self.radius - other.radius
    }

    pub fn collides(&self, other: &Circle, tolerance: f64) -> bool {
        self.gap(other) < tolerance
    }

    /// True once the circle's centre is further than `margin` outside the
    /// `width` x `height` screen.
    pub fn is_outside(&self, width: f64, height: f64, margin: f64) -> bool {
        self.pos.x < -margin
            || self.pos.y < -margin
            || self.pos.x > width + margin
            || self.pos.y > height + margin
    }
}
