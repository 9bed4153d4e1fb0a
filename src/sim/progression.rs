//! Resource/progression snapshot and its transitions
//!
//! `ResourceState` is what the UI reads and what gets saved between sessions.
//! Money, tier, multipliers, abilities, locks and achievements survive a round
//! reset; inventory, score, depth and cooldowns do not.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::abilities::{AbilityId, AbilityKind, PassiveBoost};
use super::catalog::{BlockType, DEFAULT_TIER, ZoneId, tier_by_id};
use crate::consts::MAX_LUCK_MULTIPLIER;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceState {
    pub inventory: BTreeMap<BlockType, u64>,
    pub money: u64,
    pub score: u64,
    pub depth: i32,
    pub pickaxe_tier: String,
    pub current_zone: ZoneId,
    pub luck_multiplier: f32,
    pub money_multiplier: f32,
    pub fortune_multiplier: f32,
    pub owned_abilities: BTreeSet<AbilityId>,
    /// Ability -> engine time (ms) when it is ready again
    pub ability_cooldowns: BTreeMap<AbilityId, u64>,
    /// Types exempt from bulk sell
    pub locked_items: BTreeSet<BlockType>,
    pub unlocked_achievements: BTreeSet<String>,
}

impl Default for ResourceState {
    fn default() -> Self {
        Self {
            inventory: BTreeMap::new(),
            money: 0,
            score: 0,
            depth: 0,
            pickaxe_tier: DEFAULT_TIER.to_string(),
            current_zone: ZoneId::Overworld,
            luck_multiplier: 1.0,
            money_multiplier: 1.0,
            fortune_multiplier: 1.0,
            owned_abilities: BTreeSet::new(),
            ability_cooldowns: BTreeMap::new(),
            locked_items: BTreeSet::new(),
            unlocked_achievements: BTreeSet::new(),
        }
    }
}

/// Result of awarding a destroyed block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Award {
    /// Loot crate converted straight to money
    Money(u64),
    /// Added to inventory
    Items(u64),
}

impl ResourceState {
    /// Start a new round, keeping persistent progression
    pub fn reset_for_new_round(&mut self) {
        self.inventory.clear();
        self.score = 0;
        self.depth = 0;
        self.current_zone = ZoneId::Overworld;
        self.ability_cooldowns.clear();
    }

    /// Clamp multipliers back into their valid range (used after loading)
    pub fn sanitize(&mut self) {
        self.luck_multiplier = self.luck_multiplier.clamp(1.0, MAX_LUCK_MULTIPLIER);
        self.money_multiplier = self.money_multiplier.max(1.0);
        self.fortune_multiplier = self.fortune_multiplier.max(1.0);
        if tier_by_id(&self.pickaxe_tier).is_none() {
            self.pickaxe_tier = DEFAULT_TIER.to_string();
        }
    }

    pub fn count(&self, block: BlockType) -> u64 {
        self.inventory.get(&block).copied().unwrap_or(0)
    }

    /// Award a destroyed block: score always, then money for crates or
    /// inventory (fortune-scaled) for everything else
    pub fn award_block<R: Rng>(&mut self, block: BlockType, crate_value: Option<u64>, rng: &mut R) -> Award {
        self.score += block.def().value;
        if block == BlockType::LootCrate {
            let value = crate_value.unwrap_or(block.def().value);
            let money = (value as f64 * self.money_multiplier as f64).floor() as u64;
            self.money += money;
            return Award::Money(money);
        }

        let fortune = self.fortune_multiplier.max(1.0);
        let mut count = fortune.floor() as u64;
        if rng.random::<f32>() < fortune.fract() {
            count += 1;
        }
        let count = count.max(1);
        *self.inventory.entry(block).or_insert(0) += count;
        Award::Items(count)
    }

    /// Unlock `first_<type>` for a rare find; returns the new id
    pub fn unlock_find(&mut self, block: BlockType) -> Option<String> {
        if !block.is_rare() {
            return None;
        }
        let id = format!("first_{}", block.def().name.to_lowercase().replace(' ', "_"));
        if self.unlocked_achievements.insert(id.clone()) {
            Some(id)
        } else {
            None
        }
    }

    /// Value of everything sellable, after the money multiplier
    pub fn sell_value(&self) -> u64 {
        let total: u64 = self
            .inventory
            .iter()
            .filter(|(block, _)| !self.locked_items.contains(block))
            .map(|(block, count)| block.def().price * count)
            .sum();
        (total as f64 * self.money_multiplier as f64).floor() as u64
    }

    /// Sell every unlocked, priced item; returns money earned
    pub fn sell_all(&mut self) -> u64 {
        let total = self.sell_value();
        if total == 0 {
            return 0;
        }
        for (block, count) in self.inventory.iter_mut() {
            if !self.locked_items.contains(block) && block.def().price > 0 {
                *count = 0;
            }
        }
        self.money += total;
        log::info!("Sold inventory for ${}", total);
        total
    }

    /// Toggle bulk-sell protection for a type; returns whether it is now locked
    pub fn toggle_lock(&mut self, block: BlockType) -> bool {
        if !self.locked_items.remove(&block) {
            self.locked_items.insert(block);
            true
        } else {
            false
        }
    }

    /// Buy a pickaxe tier at its catalog price
    pub fn buy_tier(&mut self, tier_id: &str) -> bool {
        let Some(tier) = tier_by_id(tier_id) else {
            return false;
        };
        if (self.money as f64) < tier.price {
            return false;
        }
        self.money = self.money.saturating_sub(tier.price as u64);
        self.pickaxe_tier = tier.id.to_string();
        true
    }

    /// Buy an ability: passives stack their multiplier, actives are owned once
    pub fn buy_ability(&mut self, id: AbilityId) -> bool {
        let def = id.def();
        if self.money < def.price {
            return false;
        }
        match def.kind {
            AbilityKind::Passive(boost) => {
                match boost {
                    PassiveBoost::Luck(step) => {
                        if self.luck_multiplier >= MAX_LUCK_MULTIPLIER {
                            return false;
                        }
                        self.luck_multiplier = (self.luck_multiplier + step).min(MAX_LUCK_MULTIPLIER);
                    }
                    PassiveBoost::Money(step) => self.money_multiplier += step,
                    PassiveBoost::Fortune(step) => self.fortune_multiplier += step,
                }
            }
            AbilityKind::Active(_) => {
                if !self.owned_abilities.insert(id) {
                    return false;
                }
            }
        }
        self.money -= def.price;
        true
    }

    /// Whether an owned ability may fire at `now_ms`
    pub fn ability_ready(&self, id: AbilityId, now_ms: u64) -> bool {
        self.owned_abilities.contains(&id)
            && now_ms >= self.ability_cooldowns.get(&id).copied().unwrap_or(0)
    }
}
