//! Typed game events and the reducer that applies them
//!
//! Every producer (chat parser, chaos scheduler, donations, keyboard) speaks
//! `GameEvent`. `apply_event` is the single entry point into the engine.

use serde::{Deserialize, Serialize};

use super::abilities::{AbilityId, use_ability};
use super::catalog::{ChallengeId, tier_by_id};
use super::state::{BodyKind, GameState};
use crate::consts::{LOOT_CRATE_VALUE, MAX_BALLS_PER_EVENT, PICKAXE_HP};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speed {
    Fast,
    Slow,
    Normal,
}

impl Speed {
    pub fn factor(self) -> f32 {
        match self {
            Speed::Fast => 2.0,
            Speed::Slow => 0.3,
            Speed::Normal => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickaxeSize {
    Big,
    Small,
    Normal,
}

impl PickaxeSize {
    pub fn factor(self) -> f32 {
        match self {
            PickaxeSize::Big => 2.0,
            PickaxeSize::Small => 0.5,
            PickaxeSize::Normal => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LootDrop {
    /// Single crate of the given value
    Crate { value: u64 },
    /// Crate plus the gold rush challenge
    GoldRush,
}

/// Closed set of engine actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameEvent {
    SpawnBalls(u32),
    SpawnTnt,
    #[serde(rename = "SPAWN_MEGATNT")]
    SpawnMegaTnt(String),
    SetSpeed(Speed),
    ResizePickaxe(PickaxeSize),
    ChangeMaterial(String),
    Commentary(String),
    HealPickaxe,
    ResetGame,
    TriggerChallenge(ChallengeId),
    SpawnLoot(LootDrop),
    ActivateMagnet,
    ActivateDrill,
    ActivateFreeze,
    /// Donation with a profile image
    SpawnDonorAvatar { user: String, image_url: String },
}

/// Event kind used for queue bucketing and the disabled list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    SpawnBalls,
    SpawnTnt,
    #[serde(rename = "SPAWN_MEGATNT")]
    SpawnMegaTnt,
    SetSpeed,
    ResizePickaxe,
    ChangeMaterial,
    Commentary,
    HealPickaxe,
    ResetGame,
    TriggerChallenge,
    SpawnLoot,
    ActivateMagnet,
    ActivateDrill,
    ActivateFreeze,
    SpawnDonorAvatar,
}

impl ActionKind {
    pub fn from_name(s: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(s.trim().to_ascii_uppercase())).ok()
    }
}

impl GameEvent {
    pub fn kind(&self) -> ActionKind {
        match self {
            GameEvent::SpawnBalls(_) => ActionKind::SpawnBalls,
            GameEvent::SpawnTnt => ActionKind::SpawnTnt,
            GameEvent::SpawnMegaTnt(_) => ActionKind::SpawnMegaTnt,
            GameEvent::SetSpeed(_) => ActionKind::SetSpeed,
            GameEvent::ResizePickaxe(_) => ActionKind::ResizePickaxe,
            GameEvent::ChangeMaterial(_) => ActionKind::ChangeMaterial,
            GameEvent::Commentary(_) => ActionKind::Commentary,
            GameEvent::HealPickaxe => ActionKind::HealPickaxe,
            GameEvent::ResetGame => ActionKind::ResetGame,
            GameEvent::TriggerChallenge(_) => ActionKind::TriggerChallenge,
            GameEvent::SpawnLoot(_) => ActionKind::SpawnLoot,
            GameEvent::ActivateMagnet => ActionKind::ActivateMagnet,
            GameEvent::ActivateDrill => ActionKind::ActivateDrill,
            GameEvent::ActivateFreeze => ActionKind::ActivateFreeze,
            GameEvent::SpawnDonorAvatar { .. } => ActionKind::SpawnDonorAvatar,
        }
    }

    /// Build an event from its stringly wire form (`action`, optional `data`)
    ///
    /// Unknown actions and unusable payloads yield `None`; spawn counts that
    /// fail to parse default to 1.
    pub fn from_wire(action: &str, data: Option<&str>) -> Option<Self> {
        let data = data.map(str::trim).filter(|d| !d.is_empty());
        let event = match ActionKind::from_name(action)? {
            ActionKind::SpawnBalls => {
                let count = data.and_then(|d| d.parse::<u32>().ok()).unwrap_or(1);
                GameEvent::SpawnBalls(count.clamp(1, MAX_BALLS_PER_EVENT))
            }
            ActionKind::SpawnTnt => GameEvent::SpawnTnt,
            ActionKind::SpawnMegaTnt => GameEvent::SpawnMegaTnt(data.unwrap_or("CHAT").to_string()),
            ActionKind::SetSpeed => GameEvent::SetSpeed(match data {
                Some("fast") => Speed::Fast,
                Some("slow") => Speed::Slow,
                _ => Speed::Normal,
            }),
            ActionKind::ResizePickaxe => GameEvent::ResizePickaxe(match data {
                Some("big") => PickaxeSize::Big,
                Some("small") => PickaxeSize::Small,
                _ => PickaxeSize::Normal,
            }),
            ActionKind::ChangeMaterial => GameEvent::ChangeMaterial(data?.to_string()),
            ActionKind::Commentary => GameEvent::Commentary(data?.to_string()),
            ActionKind::HealPickaxe => GameEvent::HealPickaxe,
            ActionKind::ResetGame => GameEvent::ResetGame,
            ActionKind::TriggerChallenge => GameEvent::TriggerChallenge(ChallengeId::from_name(data?)?),
            ActionKind::SpawnLoot => GameEvent::SpawnLoot(match data {
                Some("gold_rush") => LootDrop::GoldRush,
                Some(value) => LootDrop::Crate {
                    value: value.parse().unwrap_or(LOOT_CRATE_VALUE),
                },
                None => LootDrop::Crate {
                    value: LOOT_CRATE_VALUE,
                },
            }),
            ActionKind::ActivateMagnet => GameEvent::ActivateMagnet,
            ActionKind::ActivateDrill => GameEvent::ActivateDrill,
            ActionKind::ActivateFreeze => GameEvent::ActivateFreeze,
            ActionKind::SpawnDonorAvatar => return None,
        };
        Some(event)
    }
}

/// An event plus optional provenance ("chat: !tnt", "chaos: speed")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event: GameEvent,
    #[serde(default)]
    pub reason: Option<String>,
}

impl EventEnvelope {
    pub fn new(event: GameEvent) -> Self {
        Self { event, reason: None }
    }

    pub fn with_reason(event: GameEvent, reason: impl Into<String>) -> Self {
        Self {
            event,
            reason: Some(reason.into()),
        }
    }
}

/// Apply one event to the engine
pub fn apply_event(state: &mut GameState, event: &GameEvent) {
    match event {
        GameEvent::SpawnBalls(count) => {
            for _ in 0..(*count).clamp(1, MAX_BALLS_PER_EVENT) {
                state.spawn_body(BodyKind::Ball, None, None);
            }
        }
        GameEvent::SpawnTnt => {
            state.spawn_body(BodyKind::Tnt, None, None);
        }
        GameEvent::SpawnMegaTnt(label) => {
            state.spawn_body(BodyKind::MegaTnt, None, Some(label.clone()));
        }
        GameEvent::SetSpeed(speed) => state.time_scale = speed.factor(),
        GameEvent::ResizePickaxe(size) => state.size_multiplier = size.factor(),
        GameEvent::ChangeMaterial(tier) => {
            if tier_by_id(tier).is_some() {
                state.resources.pickaxe_tier = tier.clone();
            } else {
                log::debug!("Unknown pickaxe tier {}", tier);
            }
        }
        // Commentary is a host-side toast
        GameEvent::Commentary(_) => {}
        GameEvent::HealPickaxe => state.pickaxe.hp = PICKAXE_HP,
        GameEvent::ResetGame => state.reset_round(),
        GameEvent::TriggerChallenge(id) => state.start_challenge(*id),
        GameEvent::SpawnLoot(drop) => match drop {
            LootDrop::Crate { value } => state.spawn_loot_crate(*value),
            LootDrop::GoldRush => {
                state.spawn_loot_crate(LOOT_CRATE_VALUE);
                state.start_challenge(ChallengeId::GoldRush);
            }
        },
        // Same gate as the hotkeys: owned and off cooldown
        GameEvent::ActivateMagnet => {
            use_ability(state, AbilityId::Magnet);
        }
        GameEvent::ActivateDrill => {
            use_ability(state, AbilityId::Drill);
        }
        GameEvent::ActivateFreeze => {
            use_ability(state, AbilityId::Freeze);
        }
        GameEvent::SpawnDonorAvatar { user, image_url } => {
            state.spawn_donor_avatar(user, image_url);
        }
    }
}
