//! Game state and core simulation types
//!
//! One owned `GameState` holds the whole round: grid, bodies, camera, timers
//! and the progression snapshot. Timed effects are deadlines polled by the
//! tick loop rather than callbacks.

use std::collections::BTreeMap;

use glam::{IVec2, Vec2};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::catalog::{BlockType, ChallengeEffect, ChallengeId, ZoneId, challenge_def};
use super::grid::{BlockGrid, cell_of};
use super::progression::ResourceState;
use super::schedule::Timeline;
use super::worldgen;
use crate::consts::*;

/// Round phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Active,
    /// Physics and timers frozen; state stays readable
    Paused,
}

/// A grid cell of the mineable world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// World pixels, multiple of BLOCK_SIZE
    pub x: f32,
    pub y: f32,
    pub block_type: BlockType,
    pub hp: f32,
    pub max_hp: f32,
    pub id: String,
    /// Money value for loot crates
    #[serde(default)]
    pub value: Option<u64>,
    /// Cosmetic shade: 0 normal, 1 darker, 2 lighter
    #[serde(default)]
    pub variant: u8,
}

impl Block {
    pub fn new(cell: IVec2, block_type: BlockType, hp_multiplier: f32) -> Self {
        let hp = block_type.def().hp * hp_multiplier;
        Self {
            x: cell.x as f32 * BLOCK_SIZE,
            y: cell.y as f32 * BLOCK_SIZE,
            block_type,
            hp,
            max_hp: hp,
            id: format!("{}-{}", cell.x, cell.y),
            value: None,
            variant: 0,
        }
    }

    pub fn loot_crate(cell: IVec2, value: u64) -> Self {
        let mut block = Self::new(cell, BlockType::LootCrate, 1.0);
        block.hp = LOOT_CRATE_HP;
        block.max_hp = LOOT_CRATE_HP;
        block.value = Some(value);
        block
    }

    pub fn cell(&self) -> IVec2 {
        IVec2::new(
            (self.x / BLOCK_SIZE).round() as i32,
            (self.y / BLOCK_SIZE).round() as i32,
        )
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + BLOCK_SIZE / 2.0, self.y + BLOCK_SIZE / 2.0)
    }

    /// Subtract damage; indestructible blocks discard it
    pub fn apply_damage(&mut self, amount: f32) {
        if !self.block_type.is_indestructible() {
            self.hp -= amount;
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.hp <= 0.0 && !self.block_type.is_indestructible()
    }
}

/// Physics body kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// The player tool (exactly one)
    Pickaxe,
    Ball,
    Tnt,
    MegaTnt,
    DonorAvatar,
}

impl BodyKind {
    pub fn is_explosive(self) -> bool {
        matches!(self, BodyKind::Tnt | BodyKind::MegaTnt)
    }

    /// Consumable bodies lose hp on every block contact
    pub fn wears_on_contact(self) -> bool {
        matches!(self, BodyKind::Ball | BodyKind::DonorAvatar)
    }

    pub fn fuse_ms(self) -> Option<u64> {
        match self {
            BodyKind::Tnt => Some(TNT_FUSE_MS),
            BodyKind::MegaTnt => Some(MEGA_TNT_FUSE_MS),
            _ => None,
        }
    }
}

/// A free-floating physics body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub id: u32,
    pub kind: BodyKind,
    pub pos: Vec2,
    /// Pixels per tick
    pub vel: Vec2,
    pub radius: f32,
    pub rotation: f32,
    pub v_rotation: f32,
    pub hp: f32,
    pub max_hp: f32,
    /// Engine time at spawn (drives TNT fuses)
    #[serde(default)]
    pub spawn_ms: Option<u64>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Body {
    pub fn pickaxe(id: u32, x: f32) -> Self {
        Self {
            id,
            kind: BodyKind::Pickaxe,
            pos: Vec2::new(x, 0.0),
            vel: Vec2::new(2.0, 0.0),
            radius: PICKAXE_RADIUS,
            rotation: 0.0,
            v_rotation: 0.1,
            hp: PICKAXE_HP,
            max_hp: PICKAXE_HP,
            spawn_ms: None,
            label: None,
            image_url: None,
        }
    }

    /// Fuse has burned down at `now_ms`
    pub fn fuse_expired(&self, now_ms: u64) -> bool {
        match (self.kind.fuse_ms(), self.spawn_ms) {
            (Some(fuse), Some(spawned)) => now_ms >= spawned + fuse,
            _ => false,
        }
    }
}

/// Decorative particle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debris {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 0xRRGGBB
    pub color: u32,
    /// 1.0 at spawn, removed at 0
    pub life: f32,
    pub size: f32,
}

/// A running challenge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveChallenge {
    pub id: ChallengeId,
    pub name: String,
    pub description: String,
    pub duration_secs: u32,
    pub effect: ChallengeEffect,
    pub remaining_secs: u32,
}

/// Timed boolean effects, each with an expiry deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimedEffect {
    Magnet,
    Drill,
    Freeze,
    GodMode,
    FeatherFall,
    HeavyWeight,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimedEffects {
    expiries: BTreeMap<TimedEffect, u64>,
}

impl TimedEffects {
    /// Activate (or extend) an effect until `now_ms + duration_ms`
    pub fn activate(&mut self, effect: TimedEffect, now_ms: u64, duration_ms: u64) {
        let until = now_ms + duration_ms;
        let entry = self.expiries.entry(effect).or_insert(until);
        *entry = (*entry).max(until);
    }

    pub fn is_active(&self, effect: TimedEffect) -> bool {
        self.expiries.contains_key(&effect)
    }

    pub fn expires_at(&self, effect: TimedEffect) -> Option<u64> {
        self.expiries.get(&effect).copied()
    }

    /// Remove and return every effect whose deadline has passed
    pub fn expire(&mut self, now_ms: u64) -> Vec<TimedEffect> {
        let expired: Vec<_> = self
            .expiries
            .iter()
            .filter(|(_, until)| **until <= now_ms)
            .map(|(effect, _)| *effect)
            .collect();
        for effect in &expired {
            self.expiries.remove(effect);
        }
        expired
    }

    pub fn clear(&mut self) {
        self.expiries.clear();
    }

    pub fn active(&self) -> impl Iterator<Item = TimedEffect> + '_ {
        self.expiries.keys().copied()
    }
}

/// Camera state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Camera {
    /// Top edge of the view in world pixels
    pub y: f32,
    /// Shake magnitude, decays geometrically
    pub shake: f32,
    /// Jitter to apply to the draw origin this frame
    pub shake_offset: Vec2,
}

/// One-shot notifications for the host (toasts, banners)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Notification {
    ZoneEntered { zone: ZoneId, name: String },
    Achievement { id: String, text: String },
    ChallengeStarted { name: String },
    ChallengeEnded { name: String },
    RoundReset,
}

/// Deferred spawn from an ability sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledSpawn {
    Ball,
    Tnt,
}

fn default_rng() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

/// Complete game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub seed: u64,
    #[serde(skip, default = "default_rng")]
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub time_ticks: u64,
    /// Engine clock; frozen while paused
    pub elapsed_ms: f64,
    pub round_started_ms: u64,
    pub viewport: Vec2,
    /// World width in blocks
    pub world_width: usize,
    /// Config gravity scalar
    pub gravity: f32,
    pub grid: BlockGrid,
    pub pickaxe: Body,
    /// Every non-pickaxe body
    pub bodies: Vec<Body>,
    #[serde(skip)]
    pub debris: Vec<Debris>,
    pub camera: Camera,
    /// SET_SPEED factor
    pub time_scale: f32,
    /// RESIZE_PICKAXE factor
    pub size_multiplier: f32,
    pub challenges: Vec<ActiveChallenge>,
    /// Accumulates toward the next once-per-second challenge tick
    pub challenge_clock_ms: f64,
    pub effects: TimedEffects,
    #[serde(skip)]
    pub spawn_timeline: Timeline<ScheduledSpawn>,
    pub resources: ResourceState,
    #[serde(skip)]
    pub notifications: Vec<Notification>,
    next_id: u32,
}

impl GameState {
    /// Create a game state for a viewport (pixels) with the given seed
    pub fn new(seed: u64, viewport_width: f32, viewport_height: f32) -> Self {
        Self::with_resources(seed, viewport_width, viewport_height, ResourceState::default())
    }

    /// Create a game state resuming saved progression
    pub fn with_resources(
        seed: u64,
        viewport_width: f32,
        viewport_height: f32,
        mut resources: ResourceState,
    ) -> Self {
        resources.sanitize();
        resources.reset_for_new_round();
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Active,
            time_ticks: 0,
            elapsed_ms: 0.0,
            round_started_ms: 0,
            viewport: Vec2::new(viewport_width, viewport_height),
            world_width: world_width_for(viewport_width),
            gravity: 1.0,
            grid: BlockGrid::new(),
            pickaxe: Body::pickaxe(0, 0.0),
            bodies: Vec::new(),
            debris: Vec::new(),
            camera: Camera::default(),
            time_scale: 1.0,
            size_multiplier: 1.0,
            challenges: Vec::new(),
            challenge_clock_ms: 0.0,
            effects: TimedEffects::default(),
            spawn_timeline: Timeline::new(),
            resources,
            notifications: Vec::new(),
            next_id: 1,
        };
        state.start_round();
        state
    }

    /// Engine clock in whole milliseconds
    pub fn now_ms(&self) -> u64 {
        self.elapsed_ms as u64
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn world_width_px(&self) -> f32 {
        self.world_width as f32 * BLOCK_SIZE
    }

    /// Fresh world for the current viewport; progression is untouched
    fn start_round(&mut self) {
        self.world_width = world_width_for(self.viewport.x);
        self.grid.clear();
        self.bodies.clear();
        self.debris.clear();
        self.camera = Camera::default();
        self.time_scale = 1.0;
        self.size_multiplier = 1.0;
        self.challenges.clear();
        self.challenge_clock_ms = 0.0;
        self.effects.clear();
        self.spawn_timeline.clear();
        self.round_started_ms = self.now_ms();

        let pickaxe_id = if self.pickaxe.id == 0 {
            self.next_entity_id()
        } else {
            self.pickaxe.id
        };
        self.pickaxe = Body::pickaxe(pickaxe_id, self.world_width_px() / 2.0);

        for row in 0..INITIAL_ROWS {
            self.generate_row(row);
        }
        log::info!("Round started. Width: {} blocks", self.world_width);
    }

    /// Reset the round, preserving money/tier/multipliers/abilities
    pub fn reset_round(&mut self) {
        self.resources.reset_for_new_round();
        self.phase = GamePhase::Active;
        self.start_round();
        self.notifications.push(Notification::RoundReset);
    }

    /// Change the viewport; world width applies from the next round
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height);
    }

    pub fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            GamePhase::Active => GamePhase::Paused,
            GamePhase::Paused => GamePhase::Active,
        };
    }

    pub fn has_challenge(&self, effect: ChallengeEffect) -> bool {
        self.challenges.iter().any(|c| c.effect == effect)
    }

    /// Generate and insert one row at `row_index`
    pub fn generate_row(&mut self, row_index: i32) {
        let gold_rush = self.has_challenge(ChallengeEffect::GoldRush);
        let luck = self.resources.luck_multiplier;
        let row = worldgen::generate_row(row_index, gold_rush, luck, self.world_width, &mut self.rng);
        self.grid.insert_row(row_index, row);
    }

    /// Effective gravity this tick
    pub fn effective_gravity(&self) -> f32 {
        if self.effects.is_active(TimedEffect::Freeze) {
            return 0.0;
        }
        let base = GRAVITY * self.gravity;
        if self.has_challenge(ChallengeEffect::GravityLow) || self.effects.is_active(TimedEffect::FeatherFall) {
            base * 0.5
        } else if self.effects.is_active(TimedEffect::HeavyWeight) {
            base * 2.0
        } else {
            base
        }
    }

    /// Effective time scale this tick
    pub fn effective_time_scale(&self) -> f32 {
        if self.effects.is_active(TimedEffect::Freeze) {
            self.time_scale * FREEZE_TIME_DILATION
        } else {
            self.time_scale
        }
    }

    /// Pickaxe collision radius including the size multiplier
    pub fn pickaxe_radius(&self) -> f32 {
        self.pickaxe.radius * self.size_multiplier
    }

    /// Spawn a projectile; position defaults to a random column above the camera
    pub fn spawn_body(&mut self, kind: BodyKind, pos: Option<Vec2>, label: Option<String>) -> u32 {
        let width_px = self.world_width_px();
        let pos = pos.unwrap_or_else(|| {
            let x = self.rng.random::<f32>() * (width_px - 100.0).max(1.0) + 50.0;
            Vec2::new(x, self.camera.y - 100.0)
        });
        let (radius, hp) = match kind {
            BodyKind::MegaTnt => (MEGA_TNT_RADIUS, 1.0),
            BodyKind::Ball => (BODY_RADIUS, BALL_HP),
            BodyKind::DonorAvatar => (AVATAR_RADIUS, AVATAR_HP),
            _ => (BODY_RADIUS, 1.0),
        };
        let vel = Vec2::new((self.rng.random::<f32>() - 0.5) * 5.0, self.rng.random::<f32>() * 5.0);
        let v_rotation = (self.rng.random::<f32>() - 0.5) * 0.2;
        let id = self.next_entity_id();
        let spawn_ms = self.now_ms();
        self.bodies.push(Body {
            id,
            kind,
            pos,
            vel,
            radius,
            rotation: 0.0,
            v_rotation,
            hp,
            max_hp: hp,
            spawn_ms: Some(spawn_ms),
            label,
            image_url: None,
        });
        id
    }

    /// Spawn a donor avatar carrying a profile image
    pub fn spawn_donor_avatar(&mut self, user: &str, image_url: &str) -> u32 {
        let id = self.spawn_body(BodyKind::DonorAvatar, None, Some(user.to_string()));
        if let Some(body) = self.bodies.iter_mut().find(|b| b.id == id) {
            body.image_url = Some(image_url.to_string());
        }
        log::info!("Donor avatar spawned for {}", user);
        id
    }

    /// Place a loot crate a few cells above the pickaxe (interior columns only)
    pub fn spawn_loot_crate(&mut self, value: u64) {
        let above = cell_of(self.pickaxe.pos - Vec2::new(0.0, 100.0));
        let max_x = self.world_width as i32 - 2;
        let cell = IVec2::new(above.x.clamp(1, max_x.max(1)), above.y);
        self.grid.insert(Block::loot_crate(cell, value));
    }

    /// Burst of debris at a point
    pub fn spawn_debris(&mut self, pos: Vec2, color: u32, count: usize) {
        for _ in 0..count {
            if self.debris.len() >= MAX_DEBRIS {
                self.debris.remove(0);
            }
            let vel = Vec2::new(
                (self.rng.random::<f32>() - 0.5) * 10.0,
                (self.rng.random::<f32>() - 0.5) * 10.0,
            );
            let size = self.rng.random::<f32>() * 5.0 + 2.0;
            self.debris.push(Debris {
                pos,
                vel,
                color,
                life: 1.0,
                size,
            });
        }
    }

    /// Start a challenge from the catalog
    pub fn start_challenge(&mut self, id: ChallengeId) {
        let def = challenge_def(id);
        self.challenges.push(ActiveChallenge {
            id,
            name: def.name.to_string(),
            description: def.description.to_string(),
            duration_secs: def.duration_secs,
            effect: def.effect,
            remaining_secs: def.duration_secs,
        });
        self.notifications.push(Notification::ChallengeStarted {
            name: def.name.to_string(),
        });
        log::info!("Challenge started: {}", def.name);
    }

    /// Take every pending notification
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }
}

/// Blocks across a viewport, never narrower than MIN_WORLD_WIDTH
pub fn world_width_for(viewport_width: f32) -> usize {
    let blocks = (viewport_width / BLOCK_SIZE).ceil();
    if blocks.is_finite() && blocks as usize > MIN_WORLD_WIDTH {
        blocks as usize
    } else {
        MIN_WORLD_WIDTH
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_has_initial_rows_and_pickaxe() {
        let state = GameState::new(7, 800.0, 600.0);
        assert_eq!(state.world_width, 20);
        assert_eq!(state.grid.len(), 20 * INITIAL_ROWS as usize);
        assert_eq!(state.grid.deepest_row(), Some(INITIAL_ROWS - 1));
        assert_eq!(state.pickaxe.kind, BodyKind::Pickaxe);
        assert_eq!(state.pickaxe.pos.x, 400.0);
    }

    #[test]
    fn test_world_width_minimum() {
        assert_eq!(world_width_for(100.0), MIN_WORLD_WIDTH);
        assert_eq!(world_width_for(0.0), MIN_WORLD_WIDTH);
        assert_eq!(world_width_for(1921.0), 49);
    }

    #[test]
    fn test_timed_effects_extend_and_expire() {
        let mut effects = TimedEffects::default();
        effects.activate(TimedEffect::Drill, 0, 5000);
        effects.activate(TimedEffect::Drill, 1000, 2000);
        assert_eq!(effects.expires_at(TimedEffect::Drill), Some(5000));
        assert!(effects.expire(4999).is_empty());
        assert_eq!(effects.expire(5000), vec![TimedEffect::Drill]);
        assert!(!effects.is_active(TimedEffect::Drill));
    }

    #[test]
    fn test_gravity_modifiers() {
        let mut state = GameState::new(1, 800.0, 600.0);
        assert_eq!(state.effective_gravity(), GRAVITY);
        state.effects.activate(TimedEffect::HeavyWeight, 0, 1000);
        assert_eq!(state.effective_gravity(), GRAVITY * 2.0);
        state.start_challenge(ChallengeId::GravLow);
        assert_eq!(state.effective_gravity(), GRAVITY * 0.5);
        state.effects.activate(TimedEffect::Freeze, 0, 1000);
        assert_eq!(state.effective_gravity(), 0.0);
        assert_eq!(state.effective_time_scale(), FREEZE_TIME_DILATION);
    }

    #[test]
    fn test_loot_crate_lands_in_interior_column() {
        let mut state = GameState::new(3, 800.0, 600.0);
        state.pickaxe.pos = Vec2::new(5.0, 400.0);
        state.spawn_loot_crate(1234);
        let crate_block = state
            .grid
            .iter()
            .find(|b| b.block_type == BlockType::LootCrate)
            .cloned();
        let crate_block = crate_block.expect("crate placed");
        assert_eq!(crate_block.cell().x, 1);
        assert_eq!(crate_block.value, Some(1234));
    }
}
