//! Fixed timestep platformer update
//!
//! Order per tick: player movement, enemy patrol, then overlap queries
//! (coins, exit, enemies, spikes, lasers) against the resolved positions.

use glam::Vec2;

use super::consts::*;
use super::{Platformer, PlatformTile};
use crate::approach;
use crate::games::handle_pause;
use crate::sim::{Aabb, GameEvent, GamePhase, TickInput, TileGrid, ground_probe, move_and_collide};

fn is_one_way(t: PlatformTile) -> bool {
    t == PlatformTile::OneWay
}

/// Advance the platformer by one fixed timestep
pub(super) fn tick(game: &mut Platformer, input: &TickInput, dt: f32) {
    if !handle_pause(&mut game.phase, &mut game.resume_phase, input) {
        return;
    }
    let input = if input.autoplay {
        autoplay_input(game)
    } else {
        input.clone()
    };

    game.particles.update(dt, Vec2::new(0.0, GRAVITY * 0.5));

    match game.phase {
        GamePhase::Ready => {
            let started = input.jump || input.action || input.axis_x() != 0.0;
            if !started {
                return;
            }
            game.phase = GamePhase::Playing;
        }
        GamePhase::LevelComplete => {
            if input.jump || input.action {
                match game.advance_level() {
                    Ok(()) => game.phase = GamePhase::Playing,
                    Err(e) => {
                        log::warn!("Could not load next level: {e}");
                        game.phase = GamePhase::GameOver;
                    }
                }
            }
            return;
        }
        GamePhase::Playing => {}
        GamePhase::Paused | GamePhase::GameOver => return,
    }

    game.stats.ticks += 1;
    let fall_speed = update_player(game, &input, dt);
    update_enemies(game, dt);
    resolve_overlaps(game, fall_speed);
}

/// Run, jump, gravity and tile collision. Returns the vertical speed the
/// player had before collision (positive = falling).
fn update_player(game: &mut Platformer, input: &TickInput, dt: f32) -> f32 {
    let grid = &game.level.grid;
    let p = &mut game.player;

    if p.on_ground {
        p.coyote_ticks = COYOTE_TICKS;
    } else {
        p.coyote_ticks = p.coyote_ticks.saturating_sub(1);
    }
    if input.jump {
        p.jump_buffer_ticks = JUMP_BUFFER_TICKS;
    } else {
        p.jump_buffer_ticks = p.jump_buffer_ticks.saturating_sub(1);
    }
    p.invuln_ticks = p.invuln_ticks.saturating_sub(1);

    let axis = input.axis_x();
    if axis != 0.0 {
        p.facing = axis;
        p.vel.x = approach(p.vel.x, axis * RUN_SPEED, RUN_ACCEL * dt);
    } else {
        p.vel.x = approach(p.vel.x, 0.0, FRICTION * dt);
    }

    if p.jump_buffer_ticks > 0 && p.coyote_ticks > 0 {
        p.vel.y = -JUMP_SPEED;
        p.jump_buffer_ticks = 0;
        p.coyote_ticks = 0;
        p.on_ground = false;
    }

    let gravity = GRAVITY * game.tuning.gravity;
    p.vel.y = (p.vel.y + gravity * dt).min(MAX_FALL);
    let fall_speed = p.vel.y;

    let moved = move_and_collide(grid, p.aabb, p.vel * dt, is_one_way);
    if moved.hit_left || moved.hit_right {
        p.vel.x = 0.0;
    }
    if moved.on_ground || moved.hit_ceiling {
        p.vel.y = 0.0;
    }
    p.aabb = moved.aabb;
    p.on_ground = moved.on_ground || (p.vel.y >= 0.0 && ground_probe(grid, &p.aabb, is_one_way));

    fall_speed
}

/// True when the tile just past the enemy's leading foot would not hold it
fn at_ledge(grid: &TileGrid<PlatformTile>, aabb: &Aabb, dir: f32) -> bool {
    let front_x = if dir > 0.0 {
        aabb.max.x + 1.0
    } else {
        aabb.min.x - 1.0
    };
    let (cx, cy) = grid.cell_at(Vec2::new(front_x, aabb.max.y + 1.0));
    !grid.is_solid_cell(cx, cy) && grid.get(cx, cy) != Some(PlatformTile::OneWay)
}

fn update_enemies(game: &mut Platformer, dt: f32) {
    let grid = &game.level.grid;
    let gravity = GRAVITY * game.tuning.gravity;
    let speed = ENEMY_SPEED * game.tuning.enemy_speed;

    for e in game.enemies.iter_mut().filter(|e| e.alive) {
        e.vel.x = e.dir * speed;
        e.vel.y = (e.vel.y + gravity * dt).min(MAX_FALL);

        let moved = move_and_collide(grid, e.aabb, e.vel * dt, is_one_way);
        e.aabb = moved.aabb;
        if moved.on_ground || moved.hit_ceiling {
            e.vel.y = 0.0;
        }
        if moved.hit_left || moved.hit_right || (moved.on_ground && at_ledge(grid, &e.aabb, e.dir))
        {
            e.dir = -e.dir;
        }
    }
}

/// Overlap queries against the player's resolved box
fn resolve_overlaps(game: &mut Platformer, fall_speed: f32) {
    let pbox = game.player.aabb;

    // Coins
    let coins: Vec<(i32, i32)> = game
        .level
        .grid
        .cells_overlapping(&pbox)
        .filter(|&(cx, cy)| game.level.grid.get(cx, cy) == Some(PlatformTile::Coin))
        .collect();
    for (cx, cy) in coins {
        game.level.grid.set(cx, cy, PlatformTile::Empty);
        game.coins_collected += 1;
        game.stats.award(COIN_POINTS, &mut game.events);
        game.events.push(GameEvent::Collected);
        let at = game.level.grid.cell_center(cx, cy);
        game.particles.burst(&mut game.rng, at, 8, 80.0, 0xffd700);
    }

    // Exit
    if game
        .level
        .grid
        .any_overlapping(&pbox, |t| t == PlatformTile::Exit)
        .is_some()
    {
        game.stats.award(EXIT_POINTS, &mut game.events);
        game.phase = GamePhase::LevelComplete;
        game.events.push(GameEvent::LevelComplete);
        log::info!(
            "Platformer level {} complete ({}/{} coins)",
            game.stats.level,
            game.coins_collected,
            game.level.coins_total
        );
        return;
    }

    // Enemies: landing on the upper half stomps, anything else hurts
    let vulnerable = game.player.invuln_ticks == 0;
    let mut hurt = false;
    for e in game.enemies.iter_mut().filter(|e| e.alive) {
        if !pbox.overlaps(&e.aabb) {
            continue;
        }
        let stomp = fall_speed > 0.0 && pbox.max.y <= e.aabb.min.y + e.aabb.height() * 0.5;
        if stomp {
            e.alive = false;
            game.player.vel.y = -STOMP_BOUNCE;
            game.stats.award(STOMP_POINTS, &mut game.events);
            game.events.push(GameEvent::Hit);
            game.particles.burst(&mut game.rng, e.aabb.center(), 12, 100.0, 0x8040ff);
        } else if vulnerable {
            hurt = true;
        }
    }
    if hurt {
        game.kill_player();
        return;
    }
    if !vulnerable {
        return;
    }

    // Spikes
    let grid = &game.level.grid;
    let spiked = grid.cells_overlapping(&pbox).any(|(cx, cy)| {
        grid.get(cx, cy) == Some(PlatformTile::Spike)
            && pbox.overlaps(&game.level.spike_hitbox(cx, cy))
    });
    if spiked {
        game.kill_player();
        return;
    }

    // Lasers
    let ticks = game.stats.ticks;
    let lasered = game
        .level
        .lasers
        .iter()
        .any(|l| l.is_on(ticks) && pbox.overlaps(&l.beam));
    if lasered {
        game.kill_player();
    }
}

/// Simple demo AI: head for the exit, hop over whatever is in the way
pub(super) fn autoplay_input(game: &Platformer) -> TickInput {
    match game.phase {
        GamePhase::Ready | GamePhase::LevelComplete => {
            return TickInput {
                action: true,
                ..Default::default()
            };
        }
        GamePhase::Playing => {}
        _ => return TickInput::default(),
    }

    let grid = &game.level.grid;
    let p = &game.player;
    let center = p.aabb.center();
    let target = grid
        .find_first(PlatformTile::Exit)
        .map(|(cx, cy)| grid.cell_center(cx, cy))
        .unwrap_or(center);

    let dx = target.x - center.x;
    let dir = if dx.abs() < 2.0 { 0.0 } else { dx.signum() };
    let probe_dir = if dir == 0.0 { p.facing } else { dir };
    let ahead = p.aabb.translated(Vec2::new(probe_dir * TILE_SIZE * 0.75, 0.0));

    // Wait for a laser in front of us to switch off
    let ticks = game.stats.ticks + 1;
    let laser_ahead = game
        .level
        .lasers
        .iter()
        .any(|l| l.is_on(ticks) && ahead.expanded(4.0).overlaps(&l.beam));
    if laser_ahead && p.on_ground {
        return TickInput::default();
    }

    let wall_ahead = !grid.solid_rects_overlapping(&ahead.expanded(-1.0)).is_empty();
    let spike_ahead = grid
        .cells_overlapping(&ahead.translated(Vec2::new(0.0, 2.0)))
        .any(|(cx, cy)| grid.get(cx, cy) == Some(PlatformTile::Spike));
    let enemy_ahead = game
        .enemies
        .iter()
        .any(|e| e.alive && ahead.expanded(TILE_SIZE).overlaps(&e.aabb));
    let target_above = dx.abs() < TILE_SIZE * 2.0 && target.y < center.y - TILE_SIZE * 0.5;

    let jump = p.on_ground && (wall_ahead || spike_ahead || enemy_ahead || target_above);

    TickInput {
        left: dir < 0.0,
        right: dir > 0.0,
        jump,
        ..Default::default()
    }
}
