//! Radial explosions
//!
//! Shared by TNT, Mega TNT and donor avatar pops. Block damage falls off
//! linearly; knockback is constant within the radius.

use glam::Vec2;

use super::collision::explosion_falloff;
use super::grid::cell_center;
use super::state::{GameState, TimedEffect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplosionTier {
    Mini,
    Regular,
    Mega,
}

impl ExplosionTier {
    pub fn radius(self) -> f32 {
        match self {
            ExplosionTier::Mini => 40.0,
            ExplosionTier::Regular => 60.0,
            ExplosionTier::Mega => 150.0,
        }
    }

    pub fn peak_damage(self) -> f32 {
        match self {
            ExplosionTier::Mini => 50.0,
            ExplosionTier::Regular => 150.0,
            ExplosionTier::Mega => 5000.0,
        }
    }

    pub fn shake(self) -> f32 {
        match self {
            ExplosionTier::Mini => 2.0,
            ExplosionTier::Regular => 5.0,
            ExplosionTier::Mega => 20.0,
        }
    }

    /// Impulse magnitude applied to bodies inside the radius
    pub fn knockback(self) -> f32 {
        match self {
            ExplosionTier::Mini => 4.0,
            ExplosionTier::Regular => 8.0,
            ExplosionTier::Mega => 20.0,
        }
    }

    /// Hp removed from bodies inside the radius
    pub fn body_damage(self) -> f32 {
        match self {
            ExplosionTier::Mini => 5.0,
            ExplosionTier::Regular => 20.0,
            ExplosionTier::Mega => 100.0,
        }
    }

    fn debris_count(self) -> usize {
        match self {
            ExplosionTier::Mini => 8,
            ExplosionTier::Regular => 20,
            ExplosionTier::Mega => 60,
        }
    }
}

/// Detonate at `center` with the tier's radius and peak damage
pub fn explode_tier(state: &mut GameState, center: Vec2, tier: ExplosionTier) {
    explode(state, center, tier.radius(), tier.peak_damage(), tier);
}

/// Damage blocks and push bodies within `radius` of `center`
///
/// Blocks are only damaged here; the sweep in the tick loop removes and
/// awards them, so overlapping explosions in one tick stack.
pub fn explode(state: &mut GameState, center: Vec2, radius: f32, peak_damage: f32, tier: ExplosionTier) {
    for cell in state.grid.cells_within(center, radius) {
        let distance = cell_center(cell).distance(center);
        let damage = explosion_falloff(peak_damage, distance, radius);
        if let Some(block) = state.grid.get_mut(cell) {
            block.apply_damage(damage);
        }
    }

    let knockback = tier.knockback();
    let body_damage = tier.body_damage();
    for body in &mut state.bodies {
        let offset = body.pos - center;
        let distance = offset.length();
        if distance >= radius || distance < 1e-4 {
            continue;
        }
        body.vel += offset / distance * knockback;
        body.hp -= body_damage;
    }

    let offset = state.pickaxe.pos - center;
    let distance = offset.length();
    if distance < radius {
        let direction = if distance < 1e-4 { Vec2::NEG_Y } else { offset / distance };
        state.pickaxe.vel += direction * knockback;
        if !state.effects.is_active(TimedEffect::GodMode) {
            state.pickaxe.hp = (state.pickaxe.hp - body_damage).max(0.0);
        }
    }

    state.camera.shake += tier.shake();
    state.spawn_debris(center, 0xff4400, tier.debris_count());
    log::debug!("Explosion {:?} at ({:.0}, {:.0})", tier, center.x, center.y);
}
