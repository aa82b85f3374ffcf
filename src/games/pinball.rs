//! Pinball table
//!
//! Box walls, angled guide rails, round bumpers and two flippers. The ball
//! starts in the shooter lane; `action` fires the plunger. Draining past the
//! flippers costs a ball.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::{Arcade, GameKind, handle_pause};
use crate::approach;
use crate::settings::Tuning;
use crate::sim::{
    Aabb, EventQueue, GameEvent, GamePhase, Particles, RunStats, TickInput, bounce, circle_aabb,
    circle_circle, circle_segment,
};

pub const TABLE_WIDTH: f32 = 320.0;
pub const TABLE_HEIGHT: f32 = 480.0;
pub const BALL_RADIUS: f32 = 6.0;
/// Gravity along the table slope
pub const GRAVITY: f32 = 500.0;
pub const MAX_BALL_SPEED: f32 = 1000.0;
pub const PLUNGER_SPEED: f32 = 900.0;

pub const BUMPER_RADIUS: f32 = 16.0;
/// Speed a bumper kicks the ball away at
pub const BUMPER_KICK: f32 = 350.0;
pub const BUMPER_POINTS: u32 = 100;

pub const FLIPPER_LENGTH: f32 = 56.0;
pub const FLIPPER_HALF_THICKNESS: f32 = 4.0;
/// Radians per second
pub const FLIPPER_UP_SPEED: f32 = 18.0;
pub const FLIPPER_DOWN_SPEED: f32 = 10.0;
/// Angle swing from rest to fully raised
const FLIPPER_REST: f32 = 0.5;
const FLIPPER_RAISED: f32 = -0.4;

/// Left edge of the shooter lane
pub const LANE_LEFT: f32 = 292.0;
pub const PLUNGER_POS: Vec2 = Vec2::new(302.0, 464.0);

/// Substeps per tick keep a full-speed ball under half its radius per step
const SUBSTEPS: u32 = 8;
const WALL_RESTITUTION: f32 = 0.5;
const RAIL_RESTITUTION: f32 = 0.6;
const FLIPPER_RESTITUTION: f32 = 0.3;
/// Below this speed a ball in the shooter lane is waiting for the plunger
const LANE_REST_SPEED: f32 = 5.0;

/// A flipper pivoting at one end
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flipper {
    pub pivot: Vec2,
    pub length: f32,
    /// Direction angle (y-down, radians) at rest and fully raised
    pub rest_angle: f32,
    pub raised_angle: f32,
    pub angle: f32,
    /// Angular velocity over the last substep
    pub omega: f32,
}

impl Flipper {
    pub fn left() -> Self {
        Self::new(Vec2::new(90.0, 420.0), FLIPPER_REST, FLIPPER_RAISED)
    }

    pub fn right() -> Self {
        use std::f32::consts::PI;
        Self::new(
            Vec2::new(230.0, 420.0),
            PI - FLIPPER_REST,
            PI - FLIPPER_RAISED,
        )
    }

    fn new(pivot: Vec2, rest_angle: f32, raised_angle: f32) -> Self {
        Self {
            pivot,
            length: FLIPPER_LENGTH,
            rest_angle,
            raised_angle,
            angle: rest_angle,
            omega: 0.0,
        }
    }

    pub fn tip(&self) -> Vec2 {
        self.pivot + Vec2::from_angle(self.angle) * self.length
    }

    pub fn is_raised(&self) -> bool {
        (self.angle - self.raised_angle).abs() < 1e-4
    }

    /// Rotate toward raised (held) or rest over `h` seconds
    fn swing(&mut self, held: bool, h: f32) {
        let (target, speed) = if held {
            (self.raised_angle, FLIPPER_UP_SPEED)
        } else {
            (self.rest_angle, FLIPPER_DOWN_SPEED)
        };
        let prev = self.angle;
        self.angle = approach(self.angle, target, speed * h);
        self.omega = (self.angle - prev) / h;
    }

    /// Velocity of the flipper surface at `point`
    pub fn surface_velocity(&self, point: Vec2) -> Vec2 {
        let r = point - self.pivot;
        Vec2::new(-r.y, r.x) * self.omega
    }
}

/// Static table geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub walls: Vec<Aabb>,
    /// Angled guide rails (zero-thickness segments)
    pub rails: Vec<(Vec2, Vec2)>,
    pub bumpers: Vec<Vec2>,
}

impl Default for Table {
    fn default() -> Self {
        let w = TABLE_WIDTH;
        let h = TABLE_HEIGHT;
        Self {
            walls: vec![
                Aabb::new(Vec2::new(-20.0, -20.0), Vec2::new(8.0, h)),
                Aabb::new(Vec2::new(w - 8.0, -20.0), Vec2::new(w + 20.0, h)),
                Aabb::new(Vec2::new(-20.0, -20.0), Vec2::new(w + 20.0, 8.0)),
                // Shooter lane divider and floor
                Aabb::new(Vec2::new(288.0, 120.0), Vec2::new(LANE_LEFT, h)),
                Aabb::new(Vec2::new(LANE_LEFT, 470.0), Vec2::new(w - 8.0, h + 20.0)),
            ],
            rails: vec![
                // Top corners turn the ball back into the playfield
                (Vec2::new(250.0, 8.0), Vec2::new(w - 8.0, 70.0)),
                (Vec2::new(8.0, 70.0), Vec2::new(70.0, 8.0)),
                // Inlanes feeding the flippers
                (Vec2::new(8.0, 370.0), Vec2::new(88.0, 418.0)),
                (Vec2::new(232.0, 418.0), Vec2::new(288.0, 378.0)),
            ],
            bumpers: vec![
                Vec2::new(110.0, 150.0),
                Vec2::new(210.0, 150.0),
                Vec2::new(160.0, 220.0),
            ],
        }
    }
}

/// The ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinballBall {
    pub pos: Vec2,
    pub vel: Vec2,
}

/// Complete pinball state
pub struct Pinball {
    pub table: Table,
    pub ball: PinballBall,
    pub left_flipper: Flipper,
    pub right_flipper: Flipper,
    pub phase: GamePhase,
    pub stats: RunStats,
    resume_phase: GamePhase,
    tuning: Tuning,
    rng: Pcg32,
    particles: Particles,
    events: EventQueue,
}

impl Pinball {
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self {
            table: Table::default(),
            ball: PinballBall {
                pos: PLUNGER_POS,
                vel: Vec2::ZERO,
            },
            left_flipper: Flipper::left(),
            right_flipper: Flipper::right(),
            phase: GamePhase::Ready,
            stats: RunStats::new(tuning.lives),
            resume_phase: GamePhase::Ready,
            tuning,
            rng: Pcg32::seed_from_u64(seed),
            particles: Particles::with_cap(tuning.max_particles),
            events: EventQueue::default(),
        }
    }

    /// Ball sitting in the shooter lane
    pub fn ball_in_lane(&self) -> bool {
        self.ball.pos.x > LANE_LEFT && self.ball.pos.y > 120.0
    }

    fn launch(&mut self) {
        self.ball.vel = Vec2::new(0.0, -PLUNGER_SPEED);
        log::debug!("Plunger launch");
    }

    fn step(&mut self, input: &TickInput, h: f32) {
        self.left_flipper.swing(input.left, h);
        self.right_flipper.swing(input.right, h);

        let ball = &mut self.ball;
        ball.vel.y += GRAVITY * self.tuning.gravity * h;
        ball.pos += ball.vel * h;

        let mut bounced = false;
        for wall in &self.table.walls {
            if let Some(c) = circle_aabb(ball.pos, BALL_RADIUS, wall) {
                ball.pos += c.push_out();
                ball.vel = bounce(ball.vel, c.normal, WALL_RESTITUTION);
                bounced = true;
            }
        }
        for &(a, b) in &self.table.rails {
            if let Some(c) = circle_segment(ball.pos, BALL_RADIUS, a, b) {
                ball.pos += c.push_out();
                ball.vel = bounce(ball.vel, c.normal, RAIL_RESTITUTION);
                bounced = true;
            }
        }

        for flipper in [&self.left_flipper, &self.right_flipper] {
            let radius = BALL_RADIUS + FLIPPER_HALF_THICKNESS;
            let Some(c) = circle_segment(ball.pos, radius, flipper.pivot, flipper.tip()) else {
                continue;
            };
            ball.pos += c.push_out();
            let surface = flipper.surface_velocity(c.point);
            let relative = bounce(ball.vel - surface, c.normal, FLIPPER_RESTITUTION);
            ball.vel = relative + surface;
            bounced = true;
        }

        let mut hits = Vec::new();
        for &bumper in &self.table.bumpers {
            if let Some(c) = circle_circle(ball.pos, BALL_RADIUS, bumper, BUMPER_RADIUS) {
                ball.pos += c.push_out();
                ball.vel = c.normal * BUMPER_KICK;
                hits.push(c.point);
            }
        }

        ball.vel = ball.vel.clamp_length_max(MAX_BALL_SPEED);

        if bounced {
            self.events.push(GameEvent::Bounce);
        }
        for point in hits {
            self.events.push(GameEvent::Hit);
            self.stats.award(BUMPER_POINTS, &mut self.events);
            self.particles.burst(&mut self.rng, point, 8, 90.0, 0xffe040);
        }
    }

    fn drained(&self) -> bool {
        self.ball.pos.y - BALL_RADIUS > TABLE_HEIGHT
    }

    fn lose_ball(&mut self) {
        log::debug!("Ball drained at x {:.0}", self.ball.pos.x);
        if self.stats.lose_life(&mut self.events) {
            self.phase = GamePhase::GameOver;
            self.events.push(GameEvent::GameOver);
            log::info!("Pinball game over with score {}", self.stats.score);
            return;
        }
        self.ball = PinballBall {
            pos: PLUNGER_POS,
            vel: Vec2::ZERO,
        };
        self.phase = GamePhase::Ready;
    }
}

/// Advance the table by one fixed timestep
fn tick(game: &mut Pinball, input: &TickInput, dt: f32) {
    if !handle_pause(&mut game.phase, &mut game.resume_phase, input) {
        return;
    }
    let input = if input.autoplay {
        game.autoplay_input()
    } else {
        input.clone()
    };

    game.particles.update(dt, Vec2::ZERO);

    match game.phase {
        GamePhase::Ready => {
            if !input.action {
                return;
            }
            game.phase = GamePhase::Playing;
            game.launch();
        }
        GamePhase::Playing => {
            let resting = game.ball_in_lane() && game.ball.vel.length() < LANE_REST_SPEED;
            if resting && input.action {
                game.launch();
            }
        }
        _ => return,
    }

    game.stats.ticks += 1;
    let h = dt / SUBSTEPS as f32;
    for _ in 0..SUBSTEPS {
        game.step(&input, h);
    }

    if game.drained() {
        game.lose_ball();
    }
}

/// Demo AI: flip whichever side the falling ball is over, fire the plunger
fn autoplay(game: &Pinball) -> TickInput {
    let ball = &game.ball;
    let waiting = game.phase == GamePhase::Ready
        || (game.ball_in_lane() && ball.vel.length() < LANE_REST_SPEED);
    let near_flippers = ball.pos.y > 380.0 && ball.vel.y > 0.0 && !game.ball_in_lane();
    let mid = TABLE_WIDTH * 0.5;
    TickInput {
        action: waiting,
        left: near_flippers && ball.pos.x < mid,
        right: near_flippers && ball.pos.x >= mid,
        ..Default::default()
    }
}

impl Arcade for Pinball {
    fn kind(&self) -> GameKind {
        GameKind::Pinball
    }

    fn tick(&mut self, input: &TickInput, dt: f32) {
        tick(self, input, dt);
    }

    fn phase(&self) -> GamePhase {
        self.phase
    }

    fn stats(&self) -> RunStats {
        self.stats
    }

    fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain()
    }

    fn autoplay_input(&self) -> TickInput {
        autoplay(self)
    }

    fn particles(&self) -> &Particles {
        &self.particles
    }
}
