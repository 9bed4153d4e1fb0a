//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically. One call is
//! one 60 Hz frame; velocities are in pixels per tick.

use glam::Vec2;
use rand::Rng;

use super::catalog::{ChallengeEffect, tier_damage, zone_for_depth};
use super::collision::{circle_block_collision, elastic_exchange, pickaxe_damage, projectile_damage, resolve_block_contact};
use super::explosion::{ExplosionTier, explode_tier};
use super::grid::cell_of;
use super::progression::Award;
use super::state::{Body, BodyKind, GamePhase, GameState, Notification, ScheduledSpawn, TimedEffect};
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pause toggle
    pub pause: bool,
    /// Horizontal velocity added to the pickaxe (arrow keys)
    pub nudge: f32,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    if input.pause {
        state.toggle_pause();
    }
    if state.phase == GamePhase::Paused {
        return;
    }

    state.time_ticks += 1;
    state.elapsed_ms += TICK_MS;
    state.pickaxe.vel.x += input.nudge;

    update_camera(state);
    update_terrain(state);
    integrate(state);
    resolve_boundaries(state);
    collide_with_grid(state);
    collide_bodies(state);
    apply_magnet(state);
    sweep_blocks(state);
    sweep_bodies(state);
    update_depth(state);
    update_challenges(state);
    update_timers(state);
}

fn update_camera(state: &mut GameState) {
    let target = state.pickaxe.pos.y - state.viewport.y / 3.0;
    state.camera.y += (target - state.camera.y) * CAMERA_SMOOTHING;

    let shake = state.camera.shake;
    state.camera.shake_offset = if shake > 0.0 {
        Vec2::new(
            (state.rng.random::<f32>() - 0.5) * shake,
            (state.rng.random::<f32>() - 0.5) * shake,
        )
    } else {
        Vec2::ZERO
    };
    state.camera.shake *= SHAKE_DECAY;
    if state.camera.shake < 0.01 {
        state.camera.shake = 0.0;
    }
}

/// Generate ahead of the camera and prune far above it
fn update_terrain(state: &mut GameState) {
    let camera_bottom = state.camera.y + state.viewport.y;
    let next_row = state.grid.deepest_row().map_or(0, |row| row + 1);
    if (next_row as f32) * BLOCK_SIZE < camera_bottom + LOOKAHEAD_PX {
        for row in next_row..next_row + ROW_BATCH {
            state.generate_row(row);
        }
    }

    // Rows whose bottom edge is above this line are dropped
    let prune_line = state.camera.y - PRUNE_DISTANCE_PX;
    if prune_line > 0.0 {
        let keep_from = (prune_line / BLOCK_SIZE).ceil() as i32 - 1;
        let pruned = state.grid.prune_above(keep_from);
        if pruned > 0 {
            log::trace!("Pruned {} blocks above row {}", pruned, keep_from);
        }
    }
}

fn integrate_body(body: &mut Body, gravity: f32, time_scale: f32) {
    body.vel.y += gravity * time_scale;
    body.vel.x *= FRICTION;
    body.pos += body.vel * time_scale;
    body.rotation += body.v_rotation * time_scale;
}

fn integrate(state: &mut GameState) {
    let gravity = state.effective_gravity();
    let time_scale = state.effective_time_scale();

    integrate_body(&mut state.pickaxe, gravity, time_scale);
    for body in &mut state.bodies {
        integrate_body(body, gravity, time_scale);
    }

    for debris in &mut state.debris {
        debris.pos += debris.vel * time_scale;
        debris.vel.y += gravity * time_scale;
        debris.life -= 0.02;
    }
    state.debris.retain(|d| d.life > 0.0);
}

fn clamp_to_walls(body: &mut Body, radius: f32, width_px: f32) {
    if body.pos.x < radius {
        body.pos.x = radius;
        body.vel.x = body.vel.x.abs() * WALL_RESTITUTION;
    } else if body.pos.x > width_px - radius {
        body.pos.x = width_px - radius;
        body.vel.x = -body.vel.x.abs() * WALL_RESTITUTION;
    }
}

fn resolve_boundaries(state: &mut GameState) {
    let width_px = state.world_width_px();
    let radius = state.pickaxe_radius();
    clamp_to_walls(&mut state.pickaxe, radius, width_px);
    for body in &mut state.bodies {
        let radius = body.radius;
        clamp_to_walls(body, radius, width_px);
    }
}

/// Push a body out of its neighbourhood and return the contacts made
/// as `(cell, contact point, speed at impact)` for non-bedrock blocks
fn contact_blocks(state: &mut GameState, body_index: Option<usize>, radius: f32) -> Vec<(glam::IVec2, Vec2, f32)> {
    let GameState {
        grid,
        pickaxe,
        bodies,
        ..
    } = state;
    let Some(body) = (match body_index {
        None => Some(pickaxe),
        Some(i) => bodies.get_mut(i),
    }) else {
        return Vec::new();
    };

    let mut contacts = Vec::new();
    for cell in grid.neighborhood(cell_of(body.pos)) {
        let Some(block) = grid.get(cell) else {
            continue;
        };
        let hit = circle_block_collision(body.pos, radius, Vec2::new(block.x, block.y));
        if !hit.hit {
            continue;
        }
        let speed = body.vel.length();
        let (pos, vel) = resolve_block_contact(body.pos, body.vel, &hit);
        body.pos = pos;
        body.vel = vel;
        if !block.block_type.is_indestructible() {
            contacts.push((cell, hit.point, speed));
        }
    }
    contacts
}

fn collide_with_grid(state: &mut GameState) {
    let mut bursts: Vec<(Vec2, u32)> = Vec::new();

    // Pickaxe
    let radius = state.pickaxe_radius();
    let drill = state.effects.is_active(TimedEffect::Drill);
    let frozen = state.effects.is_active(TimedEffect::Freeze);
    let broken = state.pickaxe.hp <= 0.0;
    let base = tier_damage(&state.resources.pickaxe_tier);
    for (cell, point, speed) in contact_blocks(state, None, radius) {
        let damage = pickaxe_damage(base, speed, drill, broken, frozen);
        if damage <= 0.0 {
            continue;
        }
        if let Some(block) = state.grid.get_mut(cell) {
            block.apply_damage(damage);
            if drill {
                block.apply_damage(damage);
            }
            bursts.push((point, block.block_type.def().color));
        }
    }

    // Projectiles
    for index in 0..state.bodies.len() {
        let kind = state.bodies[index].kind;
        let radius = state.bodies[index].radius;
        for (cell, point, speed) in contact_blocks(state, Some(index), radius) {
            if let Some(block) = state.grid.get_mut(cell) {
                block.apply_damage(projectile_damage(kind, speed));
                bursts.push((point, block.block_type.def().color));
            }
            if kind.wears_on_contact() {
                state.bodies[index].hp -= 1.0;
            }
        }
    }

    for (point, color) in bursts {
        state.spawn_debris(point, color, 5);
    }
}

/// Elastic exchange between the pickaxe and every non-mega projectile
fn collide_bodies(state: &mut GameState) {
    let pickaxe_radius = state.pickaxe_radius();
    let GameState { pickaxe, bodies, .. } = state;
    let mut movable: Vec<&mut Body> = bodies.iter_mut().filter(|b| b.kind != BodyKind::MegaTnt).collect();

    for body in movable.iter_mut() {
        if let Some((pa, va, pb, vb)) =
            elastic_exchange(pickaxe.pos, pickaxe.vel, pickaxe_radius, body.pos, body.vel, body.radius)
        {
            pickaxe.pos = pa;
            pickaxe.vel = va;
            body.pos = pb;
            body.vel = vb;
        }
    }

    for i in 0..movable.len() {
        let (head, tail) = movable.split_at_mut(i + 1);
        let a = &mut head[i];
        for b in tail.iter_mut() {
            if let Some((pa, va, pb, vb)) = elastic_exchange(a.pos, a.vel, a.radius, b.pos, b.vel, b.radius) {
                a.pos = pa;
                a.vel = va;
                b.pos = pb;
                b.vel = vb;
            }
        }
    }
}

fn magnet_pull(target: Vec2, pos: Vec2) -> Option<Vec2> {
    let offset = target - pos;
    let distance = offset.length();
    if distance >= MAGNET_RADIUS || distance < 1e-4 {
        return None;
    }
    Some(offset / distance * (MAGNET_STRENGTH / distance.max(20.0)))
}

fn apply_magnet(state: &mut GameState) {
    if !state.effects.is_active(TimedEffect::Magnet) {
        return;
    }
    let target = state.pickaxe.pos;
    for debris in &mut state.debris {
        if let Some(pull) = magnet_pull(target, debris.pos) {
            debris.vel += pull;
        }
    }
    for body in &mut state.bodies {
        if let Some(pull) = magnet_pull(target, body.pos) {
            body.vel += pull;
        }
    }
}

/// Remove destroyed blocks and award them
fn sweep_blocks(state: &mut GameState) {
    let mut cells = state.grid.destroyed_cells();
    cells.sort_by_key(|c| (c.y, c.x));
    for cell in cells {
        let Some(block) = state.grid.remove(cell) else {
            continue;
        };
        let award = state.resources.award_block(block.block_type, block.value, &mut state.rng);
        if let Award::Money(amount) = award {
            log::debug!("Loot crate opened: ${}", amount);
        }
        if let Some(id) = state.resources.unlock_find(block.block_type) {
            let text = format!("First {} found!", block.block_type.def().name);
            log::info!("Achievement unlocked: {}", id);
            state.notifications.push(Notification::Achievement { id, text });
        }
    }
}

/// Detonate expired fuses, pop spent avatars, drop bodies below the view
fn sweep_bodies(state: &mut GameState) {
    let now = state.now_ms();
    let floor = state.camera.y + state.viewport.y;
    let mut detonations = Vec::new();

    state.bodies.retain(|body| {
        if body.fuse_expired(now) {
            let tier = match body.kind {
                BodyKind::MegaTnt => ExplosionTier::Mega,
                _ => ExplosionTier::Regular,
            };
            detonations.push((body.pos, tier));
            return false;
        }
        if body.hp <= 0.0 {
            if body.kind == BodyKind::DonorAvatar {
                detonations.push((body.pos, ExplosionTier::Mini));
            }
            return false;
        }
        body.pos.y - body.radius <= floor
    });

    for (pos, tier) in detonations {
        explode_tier(state, pos, tier);
    }
}

fn update_depth(state: &mut GameState) {
    let depth = ((state.pickaxe.pos.y / BLOCK_SIZE).floor() as i32).max(0);
    state.resources.depth = depth;

    let zone = zone_for_depth(depth);
    if zone.id != state.resources.current_zone {
        state.resources.current_zone = zone.id;
        log::info!("Entered {}", zone.name);
        state.notifications.push(Notification::ZoneEntered {
            zone: zone.id,
            name: zone.name.to_string(),
        });
    }
}

/// Once per simulated second: count challenges down and run storms
fn update_challenges(state: &mut GameState) {
    state.challenge_clock_ms += TICK_MS;
    while state.challenge_clock_ms >= 1000.0 {
        state.challenge_clock_ms -= 1000.0;
        if state.challenges.is_empty() {
            continue;
        }

        let storms = state
            .challenges
            .iter()
            .filter(|c| c.effect == ChallengeEffect::TntStorm)
            .count();
        for _ in 0..storms {
            state.spawn_body(BodyKind::Tnt, None, None);
        }

        for challenge in &mut state.challenges {
            challenge.remaining_secs = challenge.remaining_secs.saturating_sub(1);
        }
        let (ended, running): (Vec<_>, Vec<_>) = state
            .challenges
            .drain(..)
            .partition(|c| c.remaining_secs == 0);
        state.challenges = running;
        for challenge in ended {
            log::info!("Challenge ended: {}", challenge.name);
            state.notifications.push(Notification::ChallengeEnded { name: challenge.name });
        }
    }
}

fn update_timers(state: &mut GameState) {
    let now = state.now_ms();
    for effect in state.effects.expire(now) {
        if effect == TimedEffect::GodMode {
            state.size_multiplier = 1.0;
        }
        log::debug!("{:?} expired", effect);
    }
    for spawn in state.spawn_timeline.drain_due(now) {
        let kind = match spawn {
            ScheduledSpawn::Ball => BodyKind::Ball,
            ScheduledSpawn::Tnt => BodyKind::Tnt,
        };
        state.spawn_body(kind, None, None);
    }
}

/// Ticks needed to cover `ms` of engine time
pub fn ticks_for_ms(ms: u64) -> u64 {
    (ms as f64 / TICK_MS).ceil() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::catalog::{BlockType, ChallengeId, ZoneId};
    use crate::sim::state::{Block, Debris};
    use glam::IVec2;

    fn run(state: &mut GameState, ticks: u64) {
        let input = TickInput::default();
        for _ in 0..ticks {
            tick(state, &input);
        }
    }

    #[test]
    fn test_tick_pause() {
        let mut state = GameState::new(12345, 800.0, 600.0);
        let paused = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &paused);
        assert_eq!(state.phase, GamePhase::Paused);
        let y = state.pickaxe.pos.y;
        run(&mut state, 30);
        assert_eq!(state.pickaxe.pos.y, y);
        assert_eq!(state.now_ms(), 0);

        tick(&mut state, &paused);
        assert_eq!(state.phase, GamePhase::Active);
        assert!(state.now_ms() > 0);
    }

    #[test]
    fn test_determinism() {
        let mut a = GameState::new(99999, 800.0, 600.0);
        let mut b = GameState::new(99999, 800.0, 600.0);
        for _ in 0..3 {
            a.spawn_body(BodyKind::Ball, None, None);
            b.spawn_body(BodyKind::Ball, None, None);
        }
        run(&mut a, 600);
        run(&mut b, 600);
        assert_eq!(a.pickaxe.pos, b.pickaxe.pos);
        assert_eq!(a.grid.len(), b.grid.len());
        assert_eq!(a.resources.score, b.resources.score);
    }

    #[test]
    fn test_pickaxe_digs_down() {
        let mut state = GameState::new(4, 800.0, 600.0);
        run(&mut state, 60 * 20);
        assert!(state.resources.score > 0);
        assert!(state.resources.depth > 0);
        assert!(state.resources.inventory.values().sum::<u64>() > 0);
    }

    #[test]
    fn test_tnt_detonates_after_fuse() {
        let mut state = GameState::new(5, 800.0, 600.0);
        // hold everything still so the fuse is the only way out
        state.effects.activate(TimedEffect::Freeze, 0, 60_000);
        state.pickaxe.vel = Vec2::ZERO;
        let id = state.spawn_body(BodyKind::Tnt, Some(Vec2::new(200.0, -500.0)), None);
        if let Some(body) = state.bodies.iter_mut().find(|b| b.id == id) {
            body.vel = Vec2::ZERO;
        }
        run(&mut state, ticks_for_ms(TNT_FUSE_MS) - 2);
        assert!(state.bodies.iter().any(|b| b.kind == BodyKind::Tnt));
        run(&mut state, 3);
        assert!(!state.bodies.iter().any(|b| b.kind == BodyKind::Tnt));
        assert!(state.camera.shake > 0.0);
    }

    #[test]
    fn test_bedrock_survives_everything() {
        let mut state = GameState::new(6, 800.0, 600.0);
        state.effects.activate(TimedEffect::Drill, 0, 60_000);
        run(&mut state, 600);
        let rows = state.grid.deepest_row().unwrap_or(0);
        let top = rows - 10;
        for row in top..=rows {
            let blocks = state.grid.row(row);
            assert_eq!(blocks.first().map(|b| b.block_type), Some(BlockType::Bedrock));
            assert_eq!(blocks.last().map(|b| b.block_type), Some(BlockType::Bedrock));
        }
    }

    #[test]
    fn test_zone_transition_fires_once() {
        let mut state = GameState::new(7, 800.0, 600.0);
        state.pickaxe.pos.y = 1000.0 * BLOCK_SIZE + 5.0;
        state.pickaxe.vel = Vec2::ZERO;
        update_depth(&mut state);
        update_depth(&mut state);
        let entered: Vec<_> = state
            .drain_notifications()
            .into_iter()
            .filter(|n| matches!(n, Notification::ZoneEntered { .. }))
            .collect();
        assert_eq!(entered.len(), 1);
        assert_eq!(state.resources.current_zone, ZoneId::Underworld);
    }

    #[test]
    fn test_challenge_counts_down_and_ends() {
        let mut state = GameState::new(8, 800.0, 600.0);
        state.start_challenge(ChallengeId::TntStorm);
        run(&mut state, ticks_for_ms(1000) + 1);
        assert_eq!(state.challenges[0].remaining_secs, 14);
        assert!(state.bodies.iter().any(|b| b.kind == BodyKind::Tnt));
        run(&mut state, ticks_for_ms(15_000));
        assert!(state.challenges.is_empty());
    }

    #[test]
    fn test_god_mode_expiry_resets_size() {
        let mut state = GameState::new(9, 800.0, 600.0);
        state.effects.activate(TimedEffect::GodMode, 0, 100);
        state.size_multiplier = 3.0;
        run(&mut state, ticks_for_ms(200));
        assert!(!state.effects.is_active(TimedEffect::GodMode));
        assert_eq!(state.size_multiplier, 1.0);
    }

    #[test]
    fn test_freeze_stops_gravity() {
        let mut state = GameState::new(10, 800.0, 600.0);
        state.pickaxe.pos.y = -400.0;
        state.pickaxe.vel = Vec2::ZERO;
        state.effects.activate(TimedEffect::Freeze, 0, 10_000);
        run(&mut state, 30);
        assert_eq!(state.pickaxe.vel.y, 0.0);
        assert_eq!(state.pickaxe.pos.y, -400.0);
    }

    #[test]
    fn test_ball_damages_block_and_wears() {
        let mut state = GameState::new(21, 800.0, 600.0);
        for x in 4..=6 {
            for y in 8..=9 {
                state.grid.remove(IVec2::new(x, y));
            }
        }
        state.grid.insert(Block::new(IVec2::new(5, 10), BlockType::Stone, 1.0));
        let id = state.spawn_body(BodyKind::Ball, Some(Vec2::new(220.0, 395.0)), None);
        if let Some(ball) = state.bodies.iter_mut().find(|b| b.id == id) {
            ball.vel = Vec2::new(0.0, 3.0);
        }

        collide_with_grid(&mut state);

        let block_hp = state.grid.get(IVec2::new(5, 10)).map(|b| b.hp);
        assert_eq!(block_hp, Some(20.0 - (5.0 + 2.0 * 3.0)));
        let ball = state.bodies.iter().find(|b| b.id == id);
        assert_eq!(ball.map(|b| b.hp), Some(BALL_HP - 1.0));
        // Pushed out of the block and no longer moving into it
        assert!(ball.is_some_and(|b| b.pos.y <= 390.0 + 1e-3 && b.vel.y <= 0.0));
    }

    fn debris_at(pos: Vec2) -> Debris {
        Debris {
            pos,
            vel: Vec2::ZERO,
            color: 0,
            life: 1.0,
            size: 2.0,
        }
    }

    #[test]
    fn test_magnet_pulls_nearby_debris() {
        let mut state = GameState::new(22, 800.0, 600.0);
        let center = state.pickaxe.pos;
        state.debris.push(debris_at(center + Vec2::new(100.0, 0.0)));
        state.debris.push(debris_at(center + Vec2::new(0.0, -400.0)));

        apply_magnet(&mut state);
        assert!(state.debris.iter().all(|d| d.vel == Vec2::ZERO));

        state.effects.activate(TimedEffect::Magnet, 0, 10_000);
        apply_magnet(&mut state);
        let near = state.debris[0].vel;
        assert!(near.x < 0.0);
        assert!((near.length() - MAGNET_STRENGTH / 100.0).abs() < 1e-4);
        assert_eq!(state.debris[1].vel, Vec2::ZERO);
    }
}
