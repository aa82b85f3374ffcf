//! Shoot-the-hoop basketball
//!
//! Aim with the pointer (direction = angle, distance = power) or the arrow
//! keys, shoot with action. Makes from beyond the arc are worth three, and
//! consecutive makes add a streak bonus. The round ends when the clock runs
//! out with no ball in the air.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::{Arcade, GameKind, handle_pause};
use crate::settings::Tuning;
use crate::sim::{
    Aabb, EventQueue, GameEvent, GamePhase, Particles, RunStats, TickInput, bounce, circle_aabb,
    circle_circle,
};

pub const COURT_WIDTH: f32 = 480.0;
pub const FLOOR_Y: f32 = 300.0;
/// Height the ball is released from
pub const RELEASE_Y: f32 = FLOOR_Y - 40.0;
pub const BALL_RADIUS: f32 = 8.0;
pub const GRAVITY: f32 = 600.0;

pub const RIM_Y: f32 = 140.0;
pub const RIM_FRONT: Vec2 = Vec2::new(392.0, RIM_Y);
pub const RIM_BACK: Vec2 = Vec2::new(432.0, RIM_Y);
pub const RIM_RADIUS: f32 = 2.5;
pub const BACKBOARD: Aabb = Aabb {
    min: Vec2::new(436.0, 80.0),
    max: Vec2::new(442.0, 150.0),
};
pub const HOOP_CENTER: Vec2 = Vec2::new((RIM_FRONT.x + RIM_BACK.x) * 0.5, RIM_Y);

/// Shooting positions (x) along the release line
pub const SHOT_SPOTS: [f32; 4] = [120.0, 180.0, 240.0, 300.0];
/// Horizontal distance to the hoop beyond which a make is worth three
pub const THREE_POINT_DISTANCE: f32 = 200.0;

pub const MIN_POWER: f32 = 150.0;
pub const MAX_POWER: f32 = 700.0;
pub const MIN_ANGLE: f32 = 0.1;
pub const MAX_ANGLE: f32 = 1.5;
/// Launch speed per pixel of pointer distance
pub const POWER_PER_PX: f32 = 4.0;
/// Key aiming rates (per second)
pub const POWER_RATE: f32 = 300.0;
pub const ANGLE_RATE: f32 = 1.2;

const SUBSTEPS: u32 = 4;
const FLOOR_RESTITUTION: f32 = 0.6;
const WALL_RESTITUTION: f32 = 0.6;
const BOARD_RESTITUTION: f32 = 0.5;
const RIM_RESTITUTION: f32 = 0.55;
/// Speed below which a ball on the floor is dead
const SETTLE_SPEED: f32 = 30.0;
const SHOT_MAX_TICKS: u32 = 240;
const ROUND_TICKS: u32 = 60 * 60;
const MAX_STREAK_BONUS: u32 = 3;

/// The ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub in_flight: bool,
    pub flight_ticks: u32,
    /// Went through the hoop this shot
    pub scored: bool,
    pub touched_floor: bool,
}

impl Ball {
    fn held_at(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            in_flight: false,
            flight_ticks: 0,
            scored: false,
            touched_floor: false,
        }
    }
}

/// Points a make from this spot is worth
pub fn spot_points(spot_x: f32) -> u32 {
    if (HOOP_CENTER.x - spot_x).abs() > THREE_POINT_DISTANCE {
        3
    } else {
        2
    }
}

/// Launch speed that carries a ball from `from` through `to` at `angle`
/// (radians above horizontal), ignoring collisions
pub fn launch_speed_for(from: Vec2, to: Vec2, angle: f32, gravity: f32) -> Option<f32> {
    let dx = to.x - from.x;
    let rise = from.y - to.y; // y-down
    let cos = angle.cos();
    let denom = 2.0 * cos * cos * (dx * angle.tan() - rise);
    if dx <= 0.0 || denom <= 0.0 {
        return None;
    }
    Some((gravity * dx * dx / denom).sqrt())
}

/// Complete basketball state
pub struct Basketball {
    pub ball: Ball,
    /// Radians above horizontal
    pub aim_angle: f32,
    pub aim_power: f32,
    pub spot_index: usize,
    /// Consecutive makes
    pub streak: u32,
    pub makes: u32,
    pub attempts: u32,
    pub time_left_ticks: u32,
    pub phase: GamePhase,
    pub stats: RunStats,
    resume_phase: GamePhase,
    tuning: Tuning,
    rng: Pcg32,
    particles: Particles,
    events: EventQueue,
}

impl Basketball {
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let spot_index = rng.random_range(0..SHOT_SPOTS.len());
        Self {
            ball: Ball::held_at(Self::spot_pos(spot_index)),
            aim_angle: 0.9,
            aim_power: 450.0,
            spot_index,
            streak: 0,
            makes: 0,
            attempts: 0,
            time_left_ticks: (ROUND_TICKS as f32 * tuning.round_time) as u32,
            phase: GamePhase::Ready,
            stats: RunStats::new(1),
            resume_phase: GamePhase::Ready,
            tuning,
            rng,
            particles: Particles::with_cap(tuning.max_particles),
            events: EventQueue::default(),
        }
    }

    pub fn spot_pos(index: usize) -> Vec2 {
        Vec2::new(SHOT_SPOTS[index % SHOT_SPOTS.len()], RELEASE_Y)
    }

    /// Move the held ball to a shooting spot
    pub fn set_spot(&mut self, index: usize) {
        self.spot_index = index % SHOT_SPOTS.len();
        self.ball = Ball::held_at(Self::spot_pos(self.spot_index));
    }

    fn gravity(&self) -> f32 {
        GRAVITY * self.tuning.gravity
    }

    /// Launch velocity for the current aim
    pub fn aim_velocity(&self) -> Vec2 {
        Vec2::new(self.aim_angle.cos(), -self.aim_angle.sin()) * self.aim_power
    }

    fn apply_aim(&mut self, input: &TickInput, dt: f32) {
        if let Some(pointer) = input.pointer {
            let d = pointer - self.ball.pos;
            if d.length_squared() > 1.0 {
                self.aim_angle = (-d.y).atan2(d.x);
                self.aim_power = d.length() * POWER_PER_PX;
            }
        }
        self.aim_power -= input.axis_y() * POWER_RATE * dt;
        self.aim_angle += input.axis_x() * ANGLE_RATE * dt;
        self.aim_angle = self.aim_angle.clamp(MIN_ANGLE, MAX_ANGLE);
        self.aim_power = self.aim_power.clamp(MIN_POWER, MAX_POWER);
    }

    fn shoot(&mut self) {
        self.ball.vel = self.aim_velocity();
        self.ball.in_flight = true;
        self.attempts += 1;
        log::debug!(
            "Shot {} from spot {} (angle {:.2}, power {:.0})",
            self.attempts,
            self.spot_index,
            self.aim_angle,
            self.aim_power
        );
    }

    /// One physics substep of the ball in flight
    fn step_ball(&mut self, h: f32) {
        let prev = self.ball.pos;
        self.ball.vel.y += self.gravity() * h;
        self.ball.pos += self.ball.vel * h;

        // Through the hoop: crossing the rim line downward between the rims
        let inner_left = RIM_FRONT.x + RIM_RADIUS;
        let inner_right = RIM_BACK.x - RIM_RADIUS;
        if !self.ball.scored
            && self.ball.vel.y > 0.0
            && prev.y < RIM_Y
            && self.ball.pos.y >= RIM_Y
            && (inner_left..=inner_right).contains(&self.ball.pos.x)
        {
            self.score_make();
        }

        let mut bounced = false;
        for rim in [RIM_FRONT, RIM_BACK] {
            if let Some(c) = circle_circle(self.ball.pos, BALL_RADIUS, rim, RIM_RADIUS) {
                self.ball.pos += c.push_out();
                self.ball.vel = bounce(self.ball.vel, c.normal, RIM_RESTITUTION);
                bounced = true;
            }
        }
        if let Some(c) = circle_aabb(self.ball.pos, BALL_RADIUS, &BACKBOARD) {
            self.ball.pos += c.push_out();
            self.ball.vel = bounce(self.ball.vel, c.normal, BOARD_RESTITUTION);
            bounced = true;
        }

        if self.ball.pos.x < BALL_RADIUS {
            self.ball.pos.x = BALL_RADIUS;
            self.ball.vel = bounce(self.ball.vel, Vec2::X, WALL_RESTITUTION);
            bounced = true;
        } else if self.ball.pos.x > COURT_WIDTH - BALL_RADIUS {
            self.ball.pos.x = COURT_WIDTH - BALL_RADIUS;
            self.ball.vel = bounce(self.ball.vel, Vec2::NEG_X, WALL_RESTITUTION);
            bounced = true;
        }

        if self.ball.pos.y > FLOOR_Y - BALL_RADIUS {
            self.ball.pos.y = FLOOR_Y - BALL_RADIUS;
            self.ball.vel = bounce(self.ball.vel, Vec2::NEG_Y, FLOOR_RESTITUTION);
            self.ball.vel.x *= 0.85;
            self.ball.touched_floor = true;
            bounced = true;
        }

        if bounced {
            self.events.push(GameEvent::Bounce);
        }
    }

    fn score_make(&mut self) {
        self.ball.scored = true;
        self.streak += 1;
        self.makes += 1;
        let base = spot_points(Self::spot_pos(self.spot_index).x);
        let points = base + (self.streak - 1).min(MAX_STREAK_BONUS);
        self.stats.award(points, &mut self.events);
        self.particles.burst(&mut self.rng, HOOP_CENTER, 16, 120.0, 0xff8c00);
        log::debug!("Make! {} points (streak {})", points, self.streak);
    }

    fn shot_finished(&self) -> bool {
        let b = &self.ball;
        let resting = b.touched_floor && b.vel.length() < SETTLE_SPEED;
        resting || (b.scored && b.touched_floor) || b.flight_ticks >= SHOT_MAX_TICKS
    }

    fn next_shot(&mut self) {
        if !self.ball.scored {
            self.streak = 0;
        }
        let spot = self.rng.random_range(0..SHOT_SPOTS.len());
        self.set_spot(spot);
    }
}

/// Advance the basketball game by one fixed timestep
fn tick(game: &mut Basketball, input: &TickInput, dt: f32) {
    if !handle_pause(&mut game.phase, &mut game.resume_phase, input) {
        return;
    }
    let input = if input.autoplay {
        game.autoplay_input()
    } else {
        input.clone()
    };

    game.particles.update(dt, Vec2::new(0.0, GRAVITY * 0.3));

    match game.phase {
        GamePhase::Ready => {
            game.apply_aim(&input, dt);
            if !input.action {
                return;
            }
            game.phase = GamePhase::Playing;
            game.shoot();
            return;
        }
        GamePhase::Playing => {}
        _ => return,
    }

    game.stats.ticks += 1;
    game.time_left_ticks = game.time_left_ticks.saturating_sub(1);

    if !game.ball.in_flight {
        if game.time_left_ticks == 0 {
            game.phase = GamePhase::GameOver;
            game.events.push(GameEvent::GameOver);
            log::info!(
                "Basketball over: {} points, {}/{} made",
                game.stats.score,
                game.makes,
                game.attempts
            );
            return;
        }
        game.apply_aim(&input, dt);
        if input.action {
            game.shoot();
        }
        return;
    }

    let h = dt / SUBSTEPS as f32;
    for _ in 0..SUBSTEPS {
        game.step_ball(h);
    }
    game.ball.flight_ticks += 1;

    if game.shot_finished() {
        game.next_shot();
    }
}

/// Demo AI: a steep arc straight at the hoop center
fn autoplay(game: &Basketball) -> TickInput {
    if game.ball.in_flight || game.phase.is_frozen() {
        return TickInput::default();
    }
    const ANGLE: f32 = 1.3;
    let from = game.ball.pos;
    let Some(speed) = launch_speed_for(from, HOOP_CENTER, ANGLE, game.gravity()) else {
        return TickInput::default();
    };
    let pointer = from + Vec2::new(ANGLE.cos(), -ANGLE.sin()) * (speed / POWER_PER_PX);
    TickInput {
        pointer: Some(pointer),
        action: true,
        ..Default::default()
    }
}

impl Arcade for Basketball {
    fn kind(&self) -> GameKind {
        GameKind::Basketball
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
