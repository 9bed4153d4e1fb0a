//! Ability registry and executor
//!
//! Each ability id maps to a static `AbilityDef` carrying an effect
//! descriptor. `use_ability` gates on ownership and cooldown, then hands the
//! descriptor to `run_effect`, the only place effects are interpreted.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::catalog::BlockType;
use super::grid::cell_of;
use super::state::{BodyKind, GameState, ScheduledSpawn, TimedEffect};

/// Every purchasable ability
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityId {
    // Passive
    Luck,
    Efficiency,
    Fortune,

    // Active
    TntBundle,
    Magnet,
    Drill,
    Freeze,
    Nuke,
    DashLeft,
    DashRight,
    Jump,
    Dynamite,
    Repel,
    BallScatter,
    MiniDrill,
    FeatherFall,
    HeavyWeight,
    LootDrop,
    BlackHole,
    AntimatterBomb,
    OrbitalLaser,
    MidasTouch,
    GodMode,
}

/// Multiplier a passive adds per purchase
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PassiveBoost {
    Luck(f32),
    Money(f32),
    Fortune(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Effect descriptor interpreted by `run_effect`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AbilityEffect {
    /// `count` spawns, `interval_ms` apart (0 = all at once)
    SpawnSequence {
        spawn: ScheduledSpawn,
        count: u32,
        interval_ms: u64,
    },
    SpawnMegaTnt { label: &'static str },
    /// Crate above the pickaxe plus a ball
    LootDrop { value: u64 },
    TimedFlag { effect: TimedEffect, duration_ms: u64 },
    /// Overwrite one pickaxe velocity component
    Impulse { axis: Axis, velocity: f32 },
    /// Randomise debris velocity in `[-speed/2, speed/2]`
    Repel { speed: f32 },
    /// Remove blocks in radius, adding each to inventory
    Absorb { radius: f32, shake: f32 },
    /// Delete blocks in radius with no reward
    Annihilate { radius: f32, shake: f32 },
    /// Delete the pickaxe's whole column
    ClearColumn,
    Transmute {
        from: &'static [BlockType],
        to: BlockType,
    },
    /// Invulnerability plus a size multiplier, reset on expiry
    GodMode { duration_ms: u64, size: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AbilityKind {
    Passive(PassiveBoost),
    Active(AbilityEffect),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbilityDef {
    pub id: AbilityId,
    pub name: &'static str,
    pub description: &'static str,
    pub price: u64,
    pub cooldown_secs: u64,
    pub kind: AbilityKind,
}

const fn active(
    id: AbilityId,
    name: &'static str,
    description: &'static str,
    price: u64,
    cooldown_secs: u64,
    effect: AbilityEffect,
) -> AbilityDef {
    AbilityDef {
        id,
        name,
        description,
        price,
        cooldown_secs,
        kind: AbilityKind::Active(effect),
    }
}

const fn passive(id: AbilityId, name: &'static str, description: &'static str, price: u64, boost: PassiveBoost) -> AbilityDef {
    AbilityDef {
        id,
        name,
        description,
        price,
        cooldown_secs: 0,
        kind: AbilityKind::Passive(boost),
    }
}

impl AbilityId {
    pub const ALL: [AbilityId; 23] = [
        AbilityId::Luck,
        AbilityId::Efficiency,
        AbilityId::Fortune,
        AbilityId::TntBundle,
        AbilityId::Magnet,
        AbilityId::Drill,
        AbilityId::Freeze,
        AbilityId::Nuke,
        AbilityId::DashLeft,
        AbilityId::DashRight,
        AbilityId::Jump,
        AbilityId::Dynamite,
        AbilityId::Repel,
        AbilityId::BallScatter,
        AbilityId::MiniDrill,
        AbilityId::FeatherFall,
        AbilityId::HeavyWeight,
        AbilityId::LootDrop,
        AbilityId::BlackHole,
        AbilityId::AntimatterBomb,
        AbilityId::OrbitalLaser,
        AbilityId::MidasTouch,
        AbilityId::GodMode,
    ];

    pub fn def(self) -> AbilityDef {
        use AbilityEffect::*;
        use AbilityId::*;
        match self {
            Luck => passive(self, "Mining Luck", "+10% Ore Chance (Stacks)", 5000, PassiveBoost::Luck(0.1)),
            Efficiency => passive(self, "Efficiency", "+20% Sell Value (Stacks)", 10_000, PassiveBoost::Money(0.2)),
            Fortune => passive(self, "Fortune", "+25% Drop Amount (Stacks)", 12_000, PassiveBoost::Fortune(0.25)),

            TntBundle => active(
                self,
                "TNT Bundle",
                "Drop 5 TNTs",
                2000,
                30,
                SpawnSequence {
                    spawn: ScheduledSpawn::Tnt,
                    count: 5,
                    interval_ms: 200,
                },
            ),
            Magnet => active(
                self,
                "Loot Magnet",
                "Pull all loose blocks for 10s",
                8000,
                60,
                TimedFlag {
                    effect: TimedEffect::Magnet,
                    duration_ms: 10_000,
                },
            ),
            Drill => active(
                self,
                "Giga Drill",
                "Shred blocks on contact for 5s",
                15_000,
                120,
                TimedFlag {
                    effect: TimedEffect::Drill,
                    duration_ms: 5000,
                },
            ),
            Freeze => active(
                self,
                "Time Freeze",
                "Slow down physics for 10s",
                20_000,
                90,
                TimedFlag {
                    effect: TimedEffect::Freeze,
                    duration_ms: 10_000,
                },
            ),
            Nuke => active(self, "Tactical Nuke", "Spawn a Mega TNT", 50_000, 300, SpawnMegaTnt { label: "PLAYER" }),
            DashLeft => active(
                self,
                "Dash Left",
                "Launch the pickaxe left",
                1000,
                5,
                Impulse {
                    axis: Axis::X,
                    velocity: -20.0,
                },
            ),
            DashRight => active(
                self,
                "Dash Right",
                "Launch the pickaxe right",
                1000,
                5,
                Impulse {
                    axis: Axis::X,
                    velocity: 20.0,
                },
            ),
            Jump => active(
                self,
                "Jump",
                "Bounce the pickaxe upward",
                1500,
                5,
                Impulse {
                    axis: Axis::Y,
                    velocity: -20.0,
                },
            ),
            Dynamite => active(
                self,
                "Dynamite",
                "Drop a single TNT",
                1500,
                10,
                SpawnSequence {
                    spawn: ScheduledSpawn::Tnt,
                    count: 1,
                    interval_ms: 0,
                },
            ),
            Repel => active(self, "Repel", "Scatter all debris", 2500, 15, AbilityEffect::Repel { speed: 30.0 }),
            BallScatter => active(
                self,
                "Ball Scatter",
                "Drop 5 balls",
                3000,
                20,
                SpawnSequence {
                    spawn: ScheduledSpawn::Ball,
                    count: 5,
                    interval_ms: 0,
                },
            ),
            MiniDrill => active(
                self,
                "Mini Drill",
                "Shred blocks on contact for 2s",
                4000,
                30,
                TimedFlag {
                    effect: TimedEffect::Drill,
                    duration_ms: 2000,
                },
            ),
            FeatherFall => active(
                self,
                "Feather Fall",
                "Halve gravity for 5s",
                4000,
                30,
                TimedFlag {
                    effect: TimedEffect::FeatherFall,
                    duration_ms: 5000,
                },
            ),
            HeavyWeight => active(
                self,
                "Heavy Weight",
                "Double gravity for 5s",
                4000,
                30,
                TimedFlag {
                    effect: TimedEffect::HeavyWeight,
                    duration_ms: 5000,
                },
            ),
            LootDrop => active(self, "Loot Drop", "Drop a loot crate", 6000, 60, AbilityEffect::LootDrop { value: 5000 }),
            BlackHole => active(
                self,
                "Black Hole",
                "Absorb every block nearby",
                100_000,
                180,
                Absorb {
                    radius: 300.0,
                    shake: 20.0,
                },
            ),
            AntimatterBomb => active(
                self,
                "Antimatter Bomb",
                "Erase a huge area",
                250_000,
                300,
                Annihilate {
                    radius: 500.0,
                    shake: 100.0,
                },
            ),
            OrbitalLaser => active(self, "Orbital Laser", "Clear the column below", 150_000, 120, ClearColumn),
            MidasTouch => active(
                self,
                "Midas Touch",
                "Turn stone and iron into gold",
                500_000,
                600,
                Transmute {
                    from: &[BlockType::Stone, BlockType::Iron],
                    to: BlockType::Gold,
                },
            ),
            GodMode => active(
                self,
                "God Mode",
                "Invulnerable and huge for 20s",
                1_000_000,
                600,
                AbilityEffect::GodMode {
                    duration_ms: 20_000,
                    size: 3.0,
                },
            ),
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(s.to_string())).ok()
    }
}

/// Use an owned, ready ability; returns whether it fired
pub fn use_ability(state: &mut GameState, id: AbilityId) -> bool {
    let now = state.now_ms();
    if !state.resources.ability_ready(id, now) {
        log::debug!("Ability {:?} not owned or cooling down", id);
        return false;
    }
    let def = id.def();
    let AbilityKind::Active(effect) = def.kind else {
        return false;
    };
    run_effect(state, effect);
    state
        .resources
        .ability_cooldowns
        .insert(id, now + def.cooldown_secs * 1000);
    log::debug!("Ability {} used", def.name);
    true
}

/// Interpret an effect descriptor against the world
pub fn run_effect(state: &mut GameState, effect: AbilityEffect) {
    let now = state.now_ms();
    match effect {
        AbilityEffect::SpawnSequence {
            spawn,
            count,
            interval_ms,
        } => {
            for i in 0..count as u64 {
                state.spawn_timeline.schedule(now + i * interval_ms, spawn);
            }
        }
        AbilityEffect::SpawnMegaTnt { label } => {
            state.spawn_body(BodyKind::MegaTnt, None, Some(label.to_string()));
        }
        AbilityEffect::LootDrop { value } => {
            state.spawn_loot_crate(value);
            state.spawn_body(BodyKind::Ball, None, None);
        }
        AbilityEffect::TimedFlag { effect, duration_ms } => {
            state.effects.activate(effect, now, duration_ms);
        }
        AbilityEffect::Impulse { axis, velocity } => match axis {
            Axis::X => state.pickaxe.vel.x = velocity,
            Axis::Y => state.pickaxe.vel.y = velocity,
        },
        AbilityEffect::Repel { speed } => {
            for i in 0..state.debris.len() {
                let vel = Vec2::new(
                    (state.rng.random::<f32>() - 0.5) * speed,
                    (state.rng.random::<f32>() - 0.5) * speed,
                );
                state.debris[i].vel = vel;
            }
        }
        AbilityEffect::Absorb { radius, shake } => {
            let center = state.pickaxe.pos;
            for cell in state.grid.cells_within(center, radius) {
                let Some(block) = state.grid.get(cell) else {
                    continue;
                };
                if block.block_type.is_indestructible() {
                    continue;
                }
                if let Some(block) = state.grid.remove(cell) {
                    *state.resources.inventory.entry(block.block_type).or_insert(0) += 1;
                    state.spawn_debris(block.center(), 0x000000, 5);
                }
            }
            state.camera.shake = shake;
        }
        AbilityEffect::Annihilate { radius, shake } => {
            let center = state.pickaxe.pos;
            state.camera.shake = shake;
            state.spawn_debris(center, 0xffffff, 20);
            for cell in state.grid.cells_within(center, radius) {
                if state.grid.get(cell).is_some_and(|b| !b.block_type.is_indestructible()) {
                    state.grid.remove(cell);
                }
            }
        }
        AbilityEffect::ClearColumn => {
            let column = cell_of(state.pickaxe.pos).x;
            let cells: Vec<_> = state
                .grid
                .iter()
                .filter(|b| b.cell().x == column && !b.block_type.is_indestructible())
                .map(|b| b.cell())
                .collect();
            for cell in cells {
                state.grid.remove(cell);
            }
            let beam = state.pickaxe.pos + Vec2::new(0.0, 200.0);
            state.spawn_debris(beam, 0xff0000, 20);
        }
        AbilityEffect::Transmute { from, to } => {
            for block in state.grid.iter_mut() {
                if from.contains(&block.block_type) {
                    block.block_type = to;
                }
            }
        }
        AbilityEffect::GodMode { duration_ms, size } => {
            state.effects.activate(TimedEffect::GodMode, now, duration_ms);
            state.size_multiplier = size;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::GameState;

    fn state_with(id: AbilityId) -> GameState {
        let mut state = GameState::new(11, 800.0, 600.0);
        state.resources.owned_abilities.insert(id);
        state
    }

    #[test]
    fn test_unowned_ability_is_noop() {
        let mut state = GameState::new(11, 800.0, 600.0);
        assert!(!use_ability(&mut state, AbilityId::Nuke));
        assert!(state.bodies.is_empty());
        assert!(state.resources.ability_cooldowns.is_empty());
    }

    #[test]
    fn test_cooling_ability_is_noop() {
        let mut state = state_with(AbilityId::Nuke);
        state.resources.ability_cooldowns.insert(AbilityId::Nuke, 10_000);
        assert!(!use_ability(&mut state, AbilityId::Nuke));
        assert!(state.bodies.is_empty());
        assert_eq!(state.resources.ability_cooldowns[&AbilityId::Nuke], 10_000);
    }

    #[test]
    fn test_ready_nuke_spawns_and_writes_cooldown() {
        let mut state = state_with(AbilityId::Nuke);
        state.elapsed_ms = 2500.0;
        assert!(use_ability(&mut state, AbilityId::Nuke));
        assert_eq!(state.bodies.len(), 1);
        assert_eq!(state.bodies[0].kind, BodyKind::MegaTnt);
        assert_eq!(state.bodies[0].label.as_deref(), Some("PLAYER"));
        assert_eq!(state.resources.ability_cooldowns[&AbilityId::Nuke], 2500 + 300_000);
    }

    #[test]
    fn test_tnt_bundle_schedules_staggered_spawns() {
        let mut state = state_with(AbilityId::TntBundle);
        use_ability(&mut state, AbilityId::TntBundle);
        assert_eq!(state.spawn_timeline.len(), 5);
        assert_eq!(state.spawn_timeline.drain_due(400).len(), 3);
    }

    #[test]
    fn test_midas_touch_transmutes_stone() {
        let mut state = state_with(AbilityId::MidasTouch);
        assert!(state.grid.iter().any(|b| b.block_type == BlockType::Stone));
        use_ability(&mut state, AbilityId::MidasTouch);
        assert!(!state.grid.iter().any(|b| matches!(b.block_type, BlockType::Stone | BlockType::Iron)));
    }

    #[test]
    fn test_destructive_abilities_spare_bedrock() {
        let mut state = state_with(AbilityId::AntimatterBomb);
        let bedrock_before = state.grid.iter().filter(|b| b.block_type == BlockType::Bedrock).count();
        use_ability(&mut state, AbilityId::AntimatterBomb);
        let bedrock_after = state.grid.iter().filter(|b| b.block_type == BlockType::Bedrock).count();
        assert_eq!(bedrock_before, bedrock_after);
        assert_eq!(state.camera.shake, 100.0);
    }

    #[test]
    fn test_god_mode_sets_size_and_flag() {
        let mut state = state_with(AbilityId::GodMode);
        use_ability(&mut state, AbilityId::GodMode);
        assert!(state.effects.is_active(TimedEffect::GodMode));
        assert_eq!(state.size_multiplier, 3.0);
    }

    #[test]
    fn test_ids_round_trip_through_names() {
        for id in AbilityId::ALL {
            let name = serde_json::to_value(id).ok().and_then(|v| v.as_str().map(str::to_string));
            assert_eq!(name.as_deref().and_then(AbilityId::from_name), Some(id));
        }
        assert_eq!(AbilityId::from_name("black_hole"), Some(AbilityId::BlackHole));
    }
}
