//! Simulation state: the player, the bullet and enemy collections, and the
//! running / game-over flag. Spawning, firing and the per-frame step all
//! mutate this struct; rendering goes through a [`Surface`].

use log::{debug, info, trace};
use rand::Rng;

use crate::config::GameConfig;
use crate::entity::{Circle, Kind, Vec2};
use crate::error::{GameError, Result};
use crate::platform::Surface;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Running,
    /// Terminal. A new `Game` is needed to play again.
    GameOver,
}

/// What happened during one call to [`Game::step`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub destroyed: usize,
    pub culled: usize,
    /// Set only on the frame that performed the Running -> GameOver transition.
    pub game_over: bool,
}

#[derive(Clone, Debug)]
pub struct Game {
    config: GameConfig,
    width: f64,
    height: f64,
    player: Circle,
    /// Validated shapes that spawned enemies and fired bullets are cloned from.
    enemy_shape: Circle,
    bullet_shape: Circle,
    bullets: Vec<Circle>,
    enemies: Vec<Circle>,
    status: GameStatus,
    frame: u64,
}

impl Game {
    /// New game on a `width` x `height` screen with the player centred
    /// `player_bottom_offset` above the bottom edge.
    pub fn new(config: GameConfig, width: f64, height: f64) -> Result<Self> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(GameError::InvalidBounds { width, height });
        }
        config.validate()?;
        let player = Circle::new(
            Kind::Player,
            Vec2::new(width / 2.0, height - config.player_bottom_offset),
            config.player_radius,
            config.player_color.clone(),
            None,
        )?;
        let enemy_shape = Circle::new(
            Kind::Enemy,
            Vec2::ZERO,
            config.enemy_radius,
            config.enemy_color.clone(),
            None,
        )?;
        let bullet_shape = Circle::new(
            Kind::Bullet,
            Vec2::ZERO,
            config.bullet_radius,
            config.bullet_color.clone(),
            None,
        )?;
        Ok(Self {
            config,
            width,
            height,
            player,
            enemy_shape,
            bullet_shape,
            bullets: Vec::new(),
            enemies: Vec::new(),
            status: GameStatus::Running,
            frame: 0,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn player(&self) -> &Circle {
        &self.player
    }

    pub fn bullets(&self) -> &[Circle] {
        &self.bullets
    }

    pub fn enemies(&self) -> &[Circle] {
        &self.enemies
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status == GameStatus::GameOver
    }

    /// Frames stepped while running.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    // --- Spawner -------------------------------------------------------------

    /// One spawn-timer tick: an enemy at a random x on the top edge.
    pub fn spawn_enemy<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<&Circle> {
        if self.is_over() {
            return None;
        }
        let x = rng.gen_range(0.0..self.width);
        self.spawn_enemy_at(x)
    }

    /// Spawn at a fixed x on the top edge, aimed at the player. `None` once
    /// the game is over.
    pub fn spawn_enemy_at(&mut self, x: f64) -> Option<&Circle> {
        if self.is_over() {
            return None;
        }
        let pos = Vec2::new(x, 0.0);
        let velocity = Vec2::aim(pos, self.player.pos, self.config.enemy_speed);
        let mut enemy = self.enemy_shape.clone();
        enemy.pos = pos;
        enemy.velocity = Some(velocity);
        debug!("enemy spawned at x={x:.1} heading ({:.3}, {:.3})", velocity.x, velocity.y);
        self.enemies.push(enemy);
        self.enemies.last()
    }

    // --- Input ---------------------------------------------------------------

    /// Fire a bullet from the player toward `target`. Ignored after game over
    /// unless the config says otherwise.
    pub fn fire(&mut self, target: Vec2) -> Option<&Circle> {
        if self.is_over() && !self.config.accept_input_after_game_over {
            debug!("click at ({:.1}, {:.1}) ignored: game over", target.x, target.y);
            return None;
        }
        let velocity = Vec2::aim(self.player.pos, target, self.config.bullet_speed);
        let mut bullet = self.bullet_shape.clone();
        bullet.pos = self.player.pos;
        bullet.velocity = Some(velocity);
        debug!("bullet fired toward ({:.1}, {:.1})", target.x, target.y);
        self.bullets.push(bullet);
        self.bullets.last()
    }

    // --- Frame ---------------------------------------------------------------

    /// Advance, draw and resolve collisions for one frame. A no-op once the
    /// game is over.
    pub fn step<S: Surface + ?Sized>(&mut self, surface: &mut S) -> FrameReport {
        let mut report = FrameReport::default();
        if self.is_over() {
            return report;
        }
        self.frame += 1;
        let tolerance = self.config.collision_tolerance;

        surface.tint(&self.config.overlay_color, self.width, self.height);
        surface.fill_circle(&self.player);

        for bullet in &mut self.bullets {
            bullet.advance();
            surface.fill_circle(bullet);
        }

        // Hits are only marked here; removal happens after the pass so every
        // enemy is visited exactly once.
        let mut hit = vec![false; self.enemies.len()];
        for (idx, enemy) in self.enemies.iter_mut().enumerate() {
            enemy.advance();
            surface.fill_circle(enemy);

            if self.status == GameStatus::Running && self.player.collides(enemy, tolerance) {
                self.status = GameStatus::GameOver;
                report.game_over = true;
                info!("game over on frame {}: enemy reached the player", self.frame);
            }

            if self.bullets.iter().any(|b| b.collides(enemy, tolerance)) {
                trace!("enemy {idx} hit at ({:.1}, {:.1})", enemy.pos.x, enemy.pos.y);
                hit[idx] = true;
            }
        }

        let alive = self.enemies.len();
        let mut flags = hit.into_iter();
        self.enemies.retain(|_| !flags.next().unwrap_or(false));
        report.destroyed = alive - self.enemies.len();

        let (width, height, margin) = (self.width, self.height, self.config.cull_margin);
        let before = self.bullets.len();
        self.bullets.retain(|b| !b.is_outside(width, height, margin));
        report.culled = before - self.bullets.len();

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[derive(Default)]
    struct Recorder {
        tints: usize,
        circles: Vec<(Kind, Vec2)>,
    }

    impl Surface for Recorder {
        fn tint(&mut self, _color: &str, _width: f64, _height: f64) {
            self.tints += 1;
        }
        fn fill_circle(&mut self, circle: &Circle) {
            self.circles.push((circle.kind, circle.pos));
        }
    }

    fn game() -> Game {
        Game::new(GameConfig::default(), 800.0, 600.0).unwrap()
    }

    fn push_enemy(g: &mut Game, x: f64, y: f64, v: Vec2) {
        let e = Circle::new(Kind::Enemy, Vec2::new(x, y), 30.0, "pink", Some(v)).unwrap();
        g.enemies.push(e);
    }

    fn push_bullet(g: &mut Game, x: f64, y: f64) {
        let b = Circle::new(Kind::Bullet, Vec2::new(x, y), 5.0, "#F19953", Some(Vec2::ZERO))
            .unwrap();
        g.bullets.push(b);
    }

    #[test]
    fn new_places_player_bottom_centre() {
        let g = game();
        assert_eq!(g.player().pos, Vec2::new(400.0, 550.0));
        assert_eq!(g.player().radius(), 20.0);
        assert_eq!(g.status(), GameStatus::Running);
        assert!(g.bullets().is_empty() && g.enemies().is_empty());
    }

    #[test]
    fn new_rejects_bad_bounds() {
        assert!(matches!(
            Game::new(GameConfig::default(), 0.0, 600.0),
            Err(GameError::InvalidBounds { .. })
        ));
        assert!(Game::new(GameConfig::default(), 800.0, f64::INFINITY).is_err());
    }

    #[test]
    fn new_rejects_bad_enemy_or_bullet_radius() {
        for config in [
            GameConfig {
                enemy_radius: f64::NAN,
                ..GameConfig::default()
            },
            GameConfig {
                bullet_radius: -1.0,
                ..GameConfig::default()
            },
        ] {
            assert!(matches!(
                Game::new(config, 800.0, 600.0),
                Err(GameError::InvalidRadius(_))
            ));
        }
    }

    #[test]
    fn running_game_always_spawns_and_fires_configured_shapes() {
        let mut g = Game::new(
            GameConfig {
                enemy_radius: 0.25,
                enemy_color: "teal".into(),
                bullet_radius: 1e6,
                bullet_color: "red".into(),
                ..GameConfig::default()
            },
            800.0,
            600.0,
        )
        .unwrap();
        let e = g.spawn_enemy_at(0.0).expect("running game spawns");
        assert_eq!((e.kind, e.radius(), e.color.as_str()), (Kind::Enemy, 0.25, "teal"));
        assert_eq!(e.pos, Vec2::new(0.0, 0.0));
        let b = g.fire(Vec2::new(400.0, 0.0)).expect("running game fires").clone();
        assert_eq!((b.kind, b.radius(), b.color.as_str()), (Kind::Bullet, 1e6, "red"));
        assert_eq!(b.pos, g.player().pos);
        let v = b.velocity.unwrap();
        assert!(v.x.abs() < 1e-12 && (v.y + 1.0).abs() < 1e-12);
    }

    #[test]
    fn spawned_enemies_start_on_top_edge() {
        let mut g = game();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let e = g.spawn_enemy(&mut rng).unwrap();
            assert_eq!(e.pos.y, 0.0);
            assert!((0.0..800.0).contains(&e.pos.x));
            assert_eq!(e.radius(), 30.0);
            let v = e.velocity.unwrap();
            assert!((v.x.hypot(v.y) - 1.0).abs() < 1e-12);
        }
        assert_eq!(g.enemies().len(), 200);
    }

    #[test]
    fn spawn_stops_after_game_over() {
        let mut g = game();
        g.status = GameStatus::GameOver;
        let mut rng = StdRng::seed_from_u64(1);
        assert!(g.spawn_enemy(&mut rng).is_none());
        assert!(g.spawn_enemy_at(10.0).is_none());
        assert!(g.enemies().is_empty());
    }

    #[test]
    fn fire_aims_from_player() {
        let mut g = game();
        let b = g.fire(Vec2::new(450.0, 500.0)).unwrap();
        assert_eq!(b.pos, Vec2::new(400.0, 550.0));
        let v = b.velocity.unwrap();
        assert!((v.x - 0.7071).abs() < 1e-4);
        assert!((v.y + 0.7071).abs() < 1e-4);
    }

    #[test]
    fn fire_after_game_over_is_ignored_by_default() {
        let mut g = game();
        g.status = GameStatus::GameOver;
        assert!(g.fire(Vec2::new(0.0, 0.0)).is_none());
        assert!(g.bullets().is_empty());

        let mut lenient = Game::new(
            GameConfig {
                accept_input_after_game_over: true,
                ..GameConfig::default()
            },
            800.0,
            600.0,
        )
        .unwrap();
        lenient.status = GameStatus::GameOver;
        assert!(lenient.fire(Vec2::new(0.0, 0.0)).is_some());
    }

    #[test]
    fn step_draws_overlay_player_bullets_then_enemies() {
        let mut g = game();
        push_bullet(&mut g, 100.0, 100.0);
        push_enemy(&mut g, 700.0, 50.0, Vec2::new(0.0, 1.0));
        let mut r = Recorder::default();
        g.step(&mut r);
        assert_eq!(r.tints, 1);
        let kinds: Vec<Kind> = r.circles.iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, vec![Kind::Player, Kind::Bullet, Kind::Enemy]);
        // enemy drawn after moving
        assert_eq!(r.circles[2].1, Vec2::new(700.0, 51.0));
    }

    #[test]
    fn overlapping_bullet_destroys_enemy_but_survives() {
        let mut g = game();
        push_enemy(&mut g, 200.0, 200.0, Vec2::ZERO);
        push_bullet(&mut g, 200.0, 200.0);
        let report = g.step(&mut Recorder::default());
        assert_eq!(report.destroyed, 1);
        assert!(g.enemies().is_empty());
        assert_eq!(g.bullets().len(), 1);
    }

    #[test]
    fn removal_mid_frame_visits_every_enemy_once() {
        let mut g = game();
        // first two are hit by the same bullet, the third is far away
        push_enemy(&mut g, 100.0, 100.0, Vec2::new(1.0, 0.0));
        push_enemy(&mut g, 110.0, 100.0, Vec2::new(1.0, 0.0));
        push_enemy(&mut g, 600.0, 100.0, Vec2::new(0.0, 2.0));
        push_enemy(&mut g, 700.0, 100.0, Vec2::new(0.0, 3.0));
        push_bullet(&mut g, 105.0, 100.0);

        let mut r = Recorder::default();
        let report = g.step(&mut r);

        assert_eq!(report.destroyed, 2);
        let enemies_drawn = r.circles.iter().filter(|(k, _)| *k == Kind::Enemy).count();
        assert_eq!(enemies_drawn, 4);
        assert_eq!(g.enemies().len(), 2);
        assert_eq!(g.enemies()[0].pos, Vec2::new(600.0, 102.0));
        assert_eq!(g.enemies()[1].pos, Vec2::new(700.0, 103.0));
    }

    #[test]
    fn player_contact_ends_game_once() {
        let mut g = game();
        push_enemy(&mut g, 400.0, 500.0, Vec2::ZERO);
        push_enemy(&mut g, 410.0, 500.0, Vec2::ZERO);
        let report = g.step(&mut Recorder::default());
        assert!(report.game_over);
        assert!(g.is_over());
        assert_eq!(g.frame(), 1);

        let mut r = Recorder::default();
        let again = g.step(&mut r);
        assert_eq!(again, FrameReport::default());
        assert_eq!(r.tints, 0);
        assert_eq!(g.frame(), 1);
    }

    #[test]
    fn enemy_destroyed_while_touching_player_still_ends_game() {
        let mut g = game();
        push_enemy(&mut g, 400.0, 520.0, Vec2::ZERO);
        push_bullet(&mut g, 400.0, 520.0);
        let report = g.step(&mut Recorder::default());
        assert!(report.game_over);
        assert_eq!(report.destroyed, 1);
    }

    #[test]
    fn offscreen_bullets_are_culled() {
        let mut g = game();
        g.fire(Vec2::new(400.0, 0.0));
        let mut frames = 0;
        while !g.bullets().is_empty() {
            g.step(&mut Recorder::default());
            frames += 1;
            assert!(frames < 1000, "bullet never culled");
        }
        // 550 to reach y=0, then 50 of margin, culled once strictly beyond it
        assert_eq!(frames, 601);
    }
}
