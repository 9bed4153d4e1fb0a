//! Collision detection and response for circles against grid cells
//!
//! Pure functions over positions and velocities. The tick loop looks up the
//! candidate cells and applies the results.

use glam::Vec2;

use super::state::BodyKind;
use crate::consts::{BLOCK_SIZE, CONTACT_PUSHBACK, DRILL_DAMAGE_MULTIPLIER};

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Closest point on the block to the circle centre
    pub point: Vec2,
    /// Unit normal from the block toward the circle centre
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Circle against an axis-aligned block with top-left corner `block_min`
pub fn circle_block_collision(pos: Vec2, radius: f32, block_min: Vec2) -> CollisionResult {
    let block_max = block_min + Vec2::splat(BLOCK_SIZE);
    let closest = pos.clamp(block_min, block_max);
    let delta = pos - closest;
    let distance = delta.length();

    if distance >= radius {
        return CollisionResult::miss();
    }

    if distance > 1e-4 {
        return CollisionResult {
            hit: true,
            point: closest,
            normal: delta / distance,
            penetration: radius - distance,
        };
    }

    // Centre inside the block: exit through the nearest face
    let to_min = pos - block_min;
    let to_max = block_max - pos;
    let exits = [
        (to_min.x, Vec2::NEG_X),
        (to_max.x, Vec2::X),
        (to_min.y, Vec2::NEG_Y),
        (to_max.y, Vec2::Y),
    ];
    let (depth, normal) = exits
        .into_iter()
        .fold((f32::MAX, Vec2::NEG_Y), |best, exit| if exit.0 < best.0 { exit } else { best });
    CollisionResult {
        hit: true,
        point: pos,
        normal,
        penetration: depth + radius,
    }
}

/// Push a body out of a block: remove penetration, strip the inward velocity
/// component and add push-back along the normal
pub fn resolve_block_contact(pos: Vec2, vel: Vec2, hit: &CollisionResult) -> (Vec2, Vec2) {
    let speed = vel.length();
    let pos = pos + hit.normal * hit.penetration;
    let inward = vel.dot(hit.normal);
    let vel = if inward < 0.0 { vel - hit.normal * inward } else { vel };
    (pos, vel + hit.normal * speed * CONTACT_PUSHBACK)
}

/// Reflect velocity off a surface with given normal
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Equal-mass elastic collision between two circles
///
/// Returns new `(pos_a, vel_a, pos_b, vel_b)` when the circles overlap.
/// Normal velocity components are exchanged only while approaching; each
/// circle is pushed back by half the overlap.
pub fn elastic_exchange(
    pos_a: Vec2,
    vel_a: Vec2,
    radius_a: f32,
    pos_b: Vec2,
    vel_b: Vec2,
    radius_b: f32,
) -> Option<(Vec2, Vec2, Vec2, Vec2)> {
    let delta = pos_b - pos_a;
    let distance = delta.length();
    let min_distance = radius_a + radius_b;
    if distance >= min_distance || distance < 1e-4 {
        return None;
    }

    let normal = delta / distance;
    let half_overlap = (min_distance - distance) / 2.0;
    let pos_a = pos_a - normal * half_overlap;
    let pos_b = pos_b + normal * half_overlap;

    let va_n = vel_a.dot(normal);
    let vb_n = vel_b.dot(normal);
    if va_n - vb_n <= 0.0 {
        return Some((pos_a, vel_a, pos_b, vel_b));
    }
    let vel_a = vel_a + normal * (vb_n - va_n);
    let vel_b = vel_b + normal * (va_n - vb_n);
    Some((pos_a, vel_a, pos_b, vel_b))
}

/// Pickaxe contact damage
pub fn pickaxe_damage(tier_damage: f32, speed: f32, drill: bool, broken: bool, frozen: bool) -> f32 {
    if frozen {
        return 0.0;
    }
    let mut damage = tier_damage * (0.5 + speed / 10.0).clamp(0.5, 3.0);
    if drill {
        damage *= DRILL_DAMAGE_MULTIPLIER;
    }
    if broken {
        damage *= 0.5;
    }
    damage
}

/// Contact damage dealt by a projectile
pub fn projectile_damage(kind: BodyKind, speed: f32) -> f32 {
    match kind {
        BodyKind::Ball => 5.0 + 2.0 * speed,
        BodyKind::DonorAvatar => 10.0 + 2.0 * speed,
        BodyKind::Tnt => 2.0 + speed,
        BodyKind::MegaTnt => 5.0 + 2.0 * speed,
        BodyKind::Pickaxe => 0.0,
    }
}

/// Linear explosion falloff: `peak` at the centre, zero at and beyond `radius`
#[inline]
pub fn explosion_falloff(peak: f32, distance: f32, radius: f32) -> f32 {
    if radius <= 0.0 || distance >= radius {
        0.0
    } else {
        peak * (1.0 - distance / radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_circle_block_hit_from_above() {
        let result = circle_block_collision(Vec2::new(20.0, -5.0), 10.0, Vec2::ZERO);
        assert!(result.hit);
        assert!((result.normal - Vec2::NEG_Y).length() < 1e-5);
        assert!((result.penetration - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_circle_block_miss() {
        let result = circle_block_collision(Vec2::new(20.0, -15.0), 10.0, Vec2::ZERO);
        assert!(!result.hit);
    }

    #[test]
    fn test_centre_inside_block_exits_nearest_face() {
        let result = circle_block_collision(Vec2::new(38.0, 20.0), 10.0, Vec2::ZERO);
        assert!(result.hit);
        assert_eq!(result.normal, Vec2::X);
        assert!((result.penetration - 12.0).abs() < 1e-5);
    }

    #[test]
    fn test_contact_strips_inward_velocity() {
        let hit = circle_block_collision(Vec2::new(20.0, -5.0), 10.0, Vec2::ZERO);
        let (pos, vel) = resolve_block_contact(Vec2::new(20.0, -5.0), Vec2::new(0.0, 4.0), &hit);
        assert!((pos.y - -10.0).abs() < 1e-5);
        // inward 4 removed, push-back 4 * 0.5 outward
        assert!((vel.y - -2.0).abs() < 1e-5);
    }

    #[test]
    fn test_pickaxe_damage_modifiers() {
        assert_eq!(pickaxe_damage(10.0, 0.0, false, false, false), 5.0);
        assert_eq!(pickaxe_damage(10.0, 100.0, false, false, false), 30.0);
        assert_eq!(pickaxe_damage(10.0, 5.0, true, false, false), 50.0);
        assert_eq!(pickaxe_damage(10.0, 5.0, false, true, false), 5.0);
        assert_eq!(pickaxe_damage(10.0, 5.0, true, false, true), 0.0);
    }

    #[test]
    fn test_explosion_falloff() {
        assert_eq!(explosion_falloff(150.0, 0.0, 60.0), 150.0);
        assert!(explosion_falloff(150.0, 59.999, 60.0) < 0.01);
        assert_eq!(explosion_falloff(150.0, 60.0, 60.0), 0.0);
        assert_eq!(explosion_falloff(150.0, 80.0, 60.0), 0.0);
        assert_eq!(explosion_falloff(150.0, 30.0, 60.0), 75.0);
    }

    #[test]
    fn test_separating_bodies_keep_velocity() {
        let result = elastic_exchange(
            Vec2::ZERO,
            Vec2::new(-1.0, 0.0),
            10.0,
            Vec2::new(15.0, 0.0),
            Vec2::new(1.0, 0.0),
            10.0,
        );
        let (_, va, _, vb) = result.expect("overlapping");
        assert_eq!(va, Vec2::new(-1.0, 0.0));
        assert_eq!(vb, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_projectile_damage_by_kind() {
        assert_eq!(projectile_damage(BodyKind::Ball, 2.0), 9.0);
        assert_eq!(projectile_damage(BodyKind::DonorAvatar, 2.0), 14.0);
        assert_eq!(projectile_damage(BodyKind::Tnt, 2.0), 4.0);
        assert_eq!(projectile_damage(BodyKind::MegaTnt, 0.0), 5.0);
        assert_eq!(projectile_damage(BodyKind::Pickaxe, 9.0), 0.0);
        assert!(BodyKind::Ball.wears_on_contact());
        assert!(BodyKind::DonorAvatar.wears_on_contact());
        assert!(!BodyKind::Tnt.wears_on_contact());
    }

    proptest! {
        #[test]
        fn prop_elastic_exchange_conserves_momentum(
            ax in -50.0f32..50.0, ay in -50.0f32..50.0,
            dx in -19.0f32..19.0, dy in -19.0f32..19.0,
            vax in -20.0f32..20.0, vay in -20.0f32..20.0,
            vbx in -20.0f32..20.0, vby in -20.0f32..20.0,
        ) {
            let pos_a = Vec2::new(ax, ay);
            let pos_b = pos_a + Vec2::new(dx, dy);
            let vel_a = Vec2::new(vax, vay);
            let vel_b = Vec2::new(vbx, vby);
            if let Some((_, va, _, vb)) = elastic_exchange(pos_a, vel_a, 10.0, pos_b, vel_b, 10.0) {
                let before = vel_a + vel_b;
                let after = va + vb;
                prop_assert!((before - after).length() < 1e-3);
            }
        }
    }
}
