//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Engine clock only (no wall time)
//! - No rendering or platform dependencies

pub mod abilities;
pub mod catalog;
pub mod collision;
pub mod events;
pub mod explosion;
pub mod grid;
pub mod progression;
pub mod schedule;
pub mod state;
pub mod tick;
pub mod worldgen;

pub use abilities::{AbilityDef, AbilityEffect, AbilityId, AbilityKind, PassiveBoost, use_ability};
pub use catalog::{BlockType, ChallengeId, ZoneId, tier_damage, zone_for_depth};
pub use collision::{CollisionResult, circle_block_collision, elastic_exchange, explosion_falloff};
pub use events::{ActionKind, EventEnvelope, GameEvent, LootDrop, PickaxeSize, Speed, apply_event};
pub use explosion::{ExplosionTier, explode, explode_tier};
pub use grid::BlockGrid;
pub use progression::ResourceState;
pub use schedule::Timeline;
pub use state::{Block, Body, BodyKind, GamePhase, GameState, Notification, TimedEffect};
pub use tick::{TickInput, tick};
pub use worldgen::generate_row;
