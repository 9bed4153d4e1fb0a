//! Static game data: block definitions, zones, pickaxe tiers, challenges
//!
//! Everything here is read-only. Values are balance data, not logic.

use serde::{Deserialize, Serialize};

/// Block types, grouped by zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockType {
    // Overworld
    Stone,
    Coal,
    Copper,
    Iron,
    Gold,
    Redstone,
    Lapis,
    Quartz,
    Diamond,
    Netherite,
    Cobalt,
    Titanium,
    Tungsten,
    Mithril,
    Adamantite,
    Orichalcum,
    Palladium,

    // Underworld
    Ashstone,
    Brimstone,
    SulfurOre,
    ScoriaIron,
    MagmaGold,
    Infernium,
    HellforgedIron,
    ObsidianOre,
    Pyroclast,
    Bloodstone,
    Demonite,
    SoulOre,
    BlackNetherite,
    AbyssalAlloy,
    Understeel,

    // Void
    VoidShard,
    FracturedObsidian,
    Nullstone,
    EchoCrystal,
    RiftOre,
    PhaseAlloy,
    SingularityFragment,
    DarkMatter,
    Antimatter,
    EventHorizonCore,
    ParadoxOre,
    CollapseCrystal,
    EntropyAlloy,
    RealityFragment,
    AbsoluteVoidCrystal,
    VoidSteel,
    PrimordialVoid,
    OriginMatter,

    Bedrock,
    LootCrate,
}

/// Per-type balance data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockDef {
    pub name: &'static str,
    /// 0xRRGGBB
    pub color: u32,
    pub hp: f32,
    /// Score awarded when mined
    pub value: u64,
    /// Sell price per unit
    pub price: u64,
}

const fn def(name: &'static str, color: u32, hp: f32, value: u64, price: u64) -> BlockDef {
    BlockDef {
        name,
        color,
        hp,
        value,
        price,
    }
}

impl BlockType {
    /// Parse the wire name (`"DIAMOND"`, case-insensitive)
    pub fn from_name(s: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(s.trim().to_ascii_uppercase())).ok()
    }

    pub fn def(self) -> BlockDef {
        use BlockType::*;
        match self {
            Bedrock => def("Bedrock", 0x000000, 999_999.0, 0, 0),
            LootCrate => def("Loot Crate", 0x10b981, 10.0, 5000, 0),

            Stone => def("Stone", 0x475569, 20.0, 1, 1),
            Coal => def("Coal", 0x1e293b, 30.0, 5, 2),
            Copper => def("Copper", 0xd97706, 45.0, 10, 5),
            Iron => def("Iron", 0x94a3b8, 60.0, 15, 10),
            Quartz => def("Quartz", 0xf8fafc, 50.0, 15, 12),
            Gold => def("Gold", 0xfbbf24, 80.0, 25, 25),
            Redstone => def("Redstone", 0xef4444, 70.0, 20, 15),
            Lapis => def("Lapis Lazuli", 0x1d4ed8, 70.0, 20, 18),
            Palladium => def("Palladium", 0xf97316, 220.0, 180, 100),
            Diamond => def("Diamond", 0x06b6d4, 150.0, 100, 200),
            Cobalt => def("Cobalt", 0x3b82f6, 180.0, 120, 220),
            Titanium => def("Titanium", 0xcbd5e1, 250.0, 200, 300),
            Mithril => def("Mithril", 0x22d3ee, 400.0, 350, 500),
            Orichalcum => def("Orichalcum", 0xec4899, 450.0, 400, 600),
            Adamantite => def("Adamantite", 0xdc2626, 500.0, 450, 700),
            Tungsten => def("Tungsten", 0x64748b, 350.0, 300, 400),
            Netherite => def("Netherite", 0x3f3f46, 300.0, 250, 1000),

            Ashstone => def("Ashstone", 0x292524, 100.0, 10, 15),
            Brimstone => def("Brimstone", 0x451a03, 120.0, 15, 20),
            SulfurOre => def("Sulfur", 0xfde047, 130.0, 40, 50),
            ScoriaIron => def("Scoria Iron", 0x78350f, 150.0, 50, 75),
            MagmaGold => def("Magma Gold", 0xb45309, 180.0, 75, 150),
            Infernium => def("Infernium", 0xf59e0b, 500.0, 500, 1500),
            HellforgedIron => def("Hellforged Iron", 0x7f1d1d, 300.0, 250, 600),
            ObsidianOre => def("Obsidian", 0x020617, 600.0, 100, 500),
            Pyroclast => def("Pyroclast", 0xc2410c, 200.0, 150, 400),
            Bloodstone => def("Bloodstone", 0x991b1b, 250.0, 200, 550),
            Demonite => def("Demonite", 0x4c0519, 600.0, 600, 2000),
            SoulOre => def("Soul Ore", 0xa0dae8, 350.0, 300, 900),
            BlackNetherite => def("Black Netherite", 0x09090b, 800.0, 800, 3000),
            AbyssalAlloy => def("Abyssal Alloy", 0x1e1b4b, 900.0, 900, 3500),
            Understeel => def("Understeel", 0x374151, 550.0, 450, 1200),

            VoidShard => def("Void Shard", 0x000000, 500.0, 500, 200),
            FracturedObsidian => def("Fractured Obsidian", 0x171717, 1000.0, 200, 400),
            Nullstone => def("Nullstone", 0x262626, 800.0, 100, 500),
            EchoCrystal => def("Echo Crystal", 0x0d9488, 1200.0, 1000, 2500),
            RiftOre => def("Rift Ore", 0x6d28d9, 1500.0, 1500, 4000),
            PhaseAlloy => def("Phase Alloy", 0x8b5cf6, 1800.0, 1800, 5000),
            SingularityFragment => def("Singularity Fragment", 0xdb2777, 2500.0, 2500, 7500),
            DarkMatter => def("Dark Matter", 0x18181b, 3000.0, 3000, 10_000),
            Antimatter => def("Antimatter", 0xffffff, 4000.0, 4000, 15_000),
            EventHorizonCore => def("Event Horizon Core", 0x000000, 10_000.0, 10_000, 50_000),
            ParadoxOre => def("Paradox Ore", 0xf43f5e, 2200.0, 2200, 6000),
            CollapseCrystal => def("Collapse Crystal", 0x6366f1, 2800.0, 2800, 8000),
            EntropyAlloy => def("Entropy Alloy", 0xa855f7, 3500.0, 3500, 11_000),
            RealityFragment => def("Reality Fragment", 0x38bdf8, 4500.0, 4500, 13_000),
            AbsoluteVoidCrystal => def("Absolute Void", 0x111827, 6000.0, 6000, 20_000),
            VoidSteel => def("Void Steel", 0x334155, 2000.0, 1500, 5500),
            PrimordialVoid => def("Primordial Void", 0x0f172a, 5000.0, 5000, 18_000),
            OriginMatter => def("Origin Matter", 0xfacc15, 9000.0, 9000, 30_000),
        }
    }

    /// Bedrock can never be damaged or removed
    pub fn is_indestructible(self) -> bool {
        self == BlockType::Bedrock
    }

    /// Rare finds unlock an achievement the first time they are mined
    pub fn is_rare(self) -> bool {
        self.def().value >= 100 && self != BlockType::LootCrate
    }
}

/// Zone identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ZoneId {
    #[default]
    Overworld,
    Underworld,
    Void,
}

/// One entry of a zone's ore table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OreChance {
    pub block: BlockType,
    pub chance: f32,
}

const fn ore(block: BlockType, chance: f32) -> OreChance {
    OreChance { block, chance }
}

/// Depth-keyed region config
#[derive(Debug, Clone, Copy)]
pub struct Zone {
    pub id: ZoneId,
    pub name: &'static str,
    /// First depth (in blocks) belonging to this zone
    pub start_depth: i32,
    pub color: u32,
    pub base_block: BlockType,
    /// Tested in declared order with cumulative probability
    pub ore_table: &'static [OreChance],
}

/// Zones sorted by ascending start depth
pub const ZONES: [Zone; 3] = [
    Zone {
        id: ZoneId::Overworld,
        name: "OVERWORLD ZONE",
        start_depth: 0,
        color: 0x0ea5e9,
        base_block: BlockType::Stone,
        ore_table: &[
            ore(BlockType::Coal, 0.04),
            ore(BlockType::Copper, 0.035),
            ore(BlockType::Iron, 0.03),
            ore(BlockType::Quartz, 0.02),
            ore(BlockType::Gold, 0.015),
            ore(BlockType::Redstone, 0.015),
            ore(BlockType::Lapis, 0.01),
            ore(BlockType::Palladium, 0.008),
            ore(BlockType::Diamond, 0.005),
            ore(BlockType::Cobalt, 0.005),
            ore(BlockType::Titanium, 0.004),
            ore(BlockType::Mithril, 0.003),
            ore(BlockType::Orichalcum, 0.003),
            ore(BlockType::Adamantite, 0.002),
            ore(BlockType::Tungsten, 0.001),
            ore(BlockType::Netherite, 0.0005),
        ],
    },
    Zone {
        id: ZoneId::Underworld,
        name: "UNDERWORLD ZONE",
        start_depth: 1000,
        color: 0xef4444,
        base_block: BlockType::Ashstone,
        ore_table: &[
            ore(BlockType::Brimstone, 0.06),
            ore(BlockType::SulfurOre, 0.05),
            ore(BlockType::ScoriaIron, 0.04),
            ore(BlockType::Pyroclast, 0.03),
            ore(BlockType::MagmaGold, 0.025),
            ore(BlockType::Bloodstone, 0.02),
            ore(BlockType::HellforgedIron, 0.015),
            ore(BlockType::Understeel, 0.01),
            ore(BlockType::SoulOre, 0.008),
            ore(BlockType::ObsidianOre, 0.005),
            ore(BlockType::Infernium, 0.003),
            ore(BlockType::Demonite, 0.002),
            ore(BlockType::AbyssalAlloy, 0.001),
            ore(BlockType::BlackNetherite, 0.0005),
        ],
    },
    Zone {
        id: ZoneId::Void,
        name: "VOID ZONE",
        start_depth: 2000,
        color: 0xa855f7,
        base_block: BlockType::VoidShard,
        ore_table: &[
            ore(BlockType::FracturedObsidian, 0.06),
            ore(BlockType::Nullstone, 0.05),
            ore(BlockType::EchoCrystal, 0.04),
            ore(BlockType::VoidSteel, 0.03),
            ore(BlockType::RiftOre, 0.025),
            ore(BlockType::PhaseAlloy, 0.02),
            ore(BlockType::ParadoxOre, 0.015),
            ore(BlockType::CollapseCrystal, 0.01),
            ore(BlockType::SingularityFragment, 0.008),
            ore(BlockType::EntropyAlloy, 0.005),
            ore(BlockType::RealityFragment, 0.004),
            ore(BlockType::DarkMatter, 0.003),
            ore(BlockType::PrimordialVoid, 0.002),
            ore(BlockType::AbsoluteVoidCrystal, 0.001),
            ore(BlockType::Antimatter, 0.0005),
            ore(BlockType::OriginMatter, 0.0001),
            ore(BlockType::EventHorizonCore, 0.00001),
        ],
    },
];

/// Active zone for a depth: highest threshold with `start_depth <= depth`
pub fn zone_for_depth(depth: i32) -> &'static Zone {
    ZONES
        .iter()
        .rev()
        .find(|zone| depth >= zone.start_depth)
        .unwrap_or(&ZONES[0])
}

pub fn zone_by_id(id: ZoneId) -> &'static Zone {
    ZONES.iter().find(|z| z.id == id).unwrap_or(&ZONES[0])
}

/// Pickaxe tier stats
#[derive(Debug, Clone, Copy)]
pub struct PickaxeTier {
    pub id: &'static str,
    pub name: &'static str,
    pub damage: f32,
    pub color: u32,
    /// The top of the ladder outgrows `u64`, so tier prices are floats
    pub price: f64,
}

const fn tier(id: &'static str, name: &'static str, damage: f32, color: u32, price: f64) -> PickaxeTier {
    PickaxeTier {
        id,
        name,
        damage,
        color,
        price,
    }
}

/// Tiers in purchase order
pub const PICKAXE_TIERS: &[PickaxeTier] = &[
    tier("wood", "Wooden Pickaxe", 10.0, 0x854d0e, 0.0),
    tier("stone", "Stone Pickaxe", 25.0, 0x94a3b8, 200.0),
    tier("copper", "Copper Pickaxe", 45.0, 0xf59e0b, 1000.0),
    tier("iron", "Iron Pickaxe", 70.0, 0xe2e8f0, 5000.0),
    tier("gold", "Golden Pickaxe", 120.0, 0xfacc15, 15_000.0),
    tier("diamond", "Diamond Pickaxe", 250.0, 0x06b6d4, 50_000.0),
    tier("netherite", "Netherite Pickaxe", 500.0, 0x3f3f46, 150_000.0),
    tier("obsidian", "Obsidian Pickaxe", 800.0, 0x1f2937, 400_000.0),
    tier("emerald", "Emerald Pickaxe", 1000.0, 0x10b981, 750_000.0),
    tier("void", "Void Pickaxe", 1500.0, 0xa855f7, 1_500_000.0),
    tier("cosmic", "Cosmic Pickaxe", 5000.0, 0xec4899, 10_000_000.0),
    tier("amethyst", "Amethyst Pickaxe", 7000.0, 0x9333ea, 25_000_000.0),
    tier("ruby", "Ruby Pickaxe", 9500.0, 0xdc2626, 50_000_000.0),
    tier("sapphire", "Sapphire Pickaxe", 12_000.0, 0x2563eb, 80_000_000.0),
    tier("topaz", "Topaz Pickaxe", 15_000.0, 0xea580c, 120_000_000.0),
    tier("onyx", "Onyx Pickaxe", 20_000.0, 0x020617, 200_000_000.0),
    tier("plasma", "Plasma Pickaxe", 28_000.0, 0xf0abfc, 350_000_000.0),
    tier("quantum", "Quantum Pickaxe", 40_000.0, 0x22d3ee, 600_000_000.0),
    tier("galactic", "Galactic Pickaxe", 55_000.0, 0x4f46e5, 1_000_000_000.0),
    tier("nebula", "Nebula Pickaxe", 75_000.0, 0xc026d3, 2_000_000_000.0),
    tier("supernova", "Supernova Pickaxe", 100_000.0, 0xfacc15, 5_000_000_000.0),
    tier("blackhole", "Singularity Pickaxe", 150_000.0, 0x000000, 10_000_000_000.0),
    tier("infinity", "Infinity Pickaxe", 250_000.0, 0xf43f5e, 25_000_000_000.0),
    tier("divine", "Divine Pickaxe", 400_000.0, 0xfef3c7, 60_000_000_000.0),
    tier("omega", "Omega Pickaxe", 700_000.0, 0xbe123c, 150_000_000_000.0),
    tier("alpha", "Alpha Pickaxe", 1_000_000.0, 0x3b82f6, 300_000_000_000.0),
    tier("cyber", "Cybernetic Pickaxe", 1_500_000.0, 0x0affff, 750_000_000_000.0),
    tier("mecha", "Mecha Pickaxe", 2_200_000.0, 0x64748b, 1_500_000_000_000.0),
    tier("steampunk", "Aether Pickaxe", 3_500_000.0, 0xb45309, 3_000_000_000_000.0),
    tier("glitch", "Glitch Pickaxe", 5_000_000.0, 0x16a34a, 6_000_000_000_000.0),
    tier("pixel", "Pixel Pickaxe", 8_000_000.0, 0x8b5cf6, 12_000_000_000_000.0),
    tier("stellar", "Stellar Pickaxe", 12_000_000.0, 0xe879f9, 25_000_000_000_000.0),
    tier("universal", "Universal Pickaxe", 20_000_000.0, 0x38bdf8, 50_000_000_000_000.0),
    tier("multiverse", "Multiverse Pickaxe", 50_000_000.0, 0xffffff, 100_000_000_000_000.0),
    tier("finality", "The Finality", 999_999_999.0, 0xef4444, 999_999_999_999_999.0),
    tier("sun_shatterer", "Sun Shatterer", 1_500_000_000.0, 0xf97316, 2_000_000_000_000_000.0),
    tier("moon_cleaver", "Moon Cleaver", 2_200_000_000.0, 0x94a3b8, 4_000_000_000_000_000.0),
    tier("star_forged", "Star Forged", 3_500_000_000.0, 0xfde047, 8_000_000_000_000_000.0),
    tier("void_walker", "Void Walker", 5_000_000_000.0, 0x4c1d95, 16_000_000_000_000_000.0),
    tier("time_bender", "Time Bender", 8_000_000_000.0, 0x10b981, 32_000_000_000_000_000.0),
    tier("reality_slicer", "Reality Slicer", 12_000_000_000.0, 0xec4899, 64_000_000_000_000_000.0),
    tier("dimension_breaker", "Dimension Breaker", 20_000_000_000.0, 0x06b6d4, 128_000_000_000_000_000.0),
    tier("quantum_destabilizer", "Quantum Destabilizer", 35_000_000_000.0, 0x22d3ee, 256_000_000_000_000_000.0),
    tier("matter_dissolver", "Matter Dissolver", 60_000_000_000.0, 0xd946ef, 512_000_000_000_000_000.0),
    tier("entropy_weaver", "Entropy Weaver", 100_000_000_000.0, 0x6366f1, 1.0e18),
    tier("chaos_bringer", "Chaos Bringer", 200_000_000_000.0, 0xdc2626, 2.0e18),
    tier("order_keeper", "Order Keeper", 400_000_000_000.0, 0xffffff, 4.0e18),
    tier("celestial_judgement", "Celestial Judgement", 800_000_000_000.0, 0xfacc15, 8.0e18),
    tier("infernal_fury", "Infernal Fury", 1_600_000_000_000.0, 0x7f1d1d, 1.6e19),
    tier("abyssal_scream", "Abyssal Scream", 3_200_000_000_000.0, 0x020617, 3.2e19),
    tier("eldritch_horror", "Eldritch Horror", 6_400_000_000_000.0, 0x14b8a6, 6.4e19),
    tier("cosmic_truth", "Cosmic Truth", 12_800_000_000_000.0, 0x8b5cf6, 1.28e20),
    tier("mathematical_constant", "Math Constant", 25_600_000_000_000.0, 0x3b82f6, 2.56e20),
    tier("developers_debugger", "The Debugger", 999_999_999_999_999.0, 0x10b981, 9.999_999_999_999_99e20),
    tier("the_end", "THE END", 10_000_000_000_000_000.0, 0x000000, 1.0e22),
    tier("cyber_prime", "Cyber Prime", 15_000_000_000_000_000.0, 0x22d3ee, 2.0e22),
    tier("neo_tokyo", "Neo Tokyo", 20_000_000_000_000_000.0, 0xf472b6, 4.0e22),
    tier("chrome_heart", "Chrome Heart", 25_000_000_000_000_000.0, 0x94a3b8, 8.0e22),
    tier("data_miner", "Data Miner", 32_000_000_000_000_000.0, 0x4ade80, 1.6e23),
    tier("firewall_breach", "Firewall Breach", 40_000_000_000_000_000.0, 0xef4444, 3.2e23),
    tier("zero_day", "Zero Day", 50_000_000_000_000_000.0, 0xa855f7, 6.4e23),
    tier("logic_bomb", "Logic Bomb", 65_000_000_000_000_000.0, 0xfbbf24, 1.28e24),
    tier("mainframe_melter", "Mainframe Melter", 80_000_000_000_000_000.0, 0xef4444, 2.56e24),
    tier("system_override", "System Override", 100_000_000_000_000_000.0, 0x3b82f6, 5.12e24),
    tier("root_access", "Root Access", 125_000_000_000_000_000.0, 0x10b981, 1.024e25),
    tier("elemental_fury", "Elemental Fury", 160_000_000_000_000_000.0, 0xf59e0b, 2.048e25),
    tier("storm_bringer", "Storm Bringer", 200_000_000_000_000_000.0, 0x0ea5e9, 4.096e25),
    tier("earth_shaker", "Earth Shaker", 250_000_000_000_000_000.0, 0x78350f, 8.192e25),
    tier("wind_whisper", "Wind Whisper", 320_000_000_000_000_000.0, 0xf1f5f9, 1.6384e26),
    tier("flame_warden", "Flame Warden", 400_000_000_000_000_000.0, 0xb91c1c, 3.2768e26),
    tier("tidal_wave", "Tidal Wave", 500_000_000_000_000_000.0, 0x1e40af, 6.5536e26),
    tier("abstract_thought", "Abstract Thought", 750_000_000_000_000_000.0, 0xdb2777, 1.31072e27),
    tier("surreal_dream", "Surreal Dream", 1_000_000_000_000_000_000.0, 0x8b5cf6, 2.62144e27),
    tier("lucid_nightmare", "Lucid Nightmare", 1_500_000_000_000_000_000.0, 0x4c1d95, 5.24288e27),
    tier("waking_life", "Waking Life", 2_000_000_000_000_000_000.0, 0xffffff, 1.048576e28),
];

pub const DEFAULT_TIER: &str = "wood";

pub fn tier_by_id(id: &str) -> Option<&'static PickaxeTier> {
    PICKAXE_TIERS.iter().find(|t| t.id == id)
}

/// Damage for a tier id, falling back to the starting tier
pub fn tier_damage(id: &str) -> f32 {
    tier_by_id(id).unwrap_or(&PICKAXE_TIERS[0]).damage
}

/// Challenge identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeId {
    GravLow,
    TntStorm,
    GoldRush,
}

impl ChallengeId {
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "grav_low" => Some(ChallengeId::GravLow),
            "tnt_storm" => Some(ChallengeId::TntStorm),
            "gold_rush" => Some(ChallengeId::GoldRush),
            _ => None,
        }
    }
}

/// What a running challenge does to the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChallengeEffect {
    /// Gravity halved
    GravityLow,
    /// One TNT per second
    TntStorm,
    /// Ore table replaced by gold bands
    GoldRush,
}

#[derive(Debug, Clone, Copy)]
pub struct ChallengeDef {
    pub id: ChallengeId,
    pub name: &'static str,
    pub description: &'static str,
    pub duration_secs: u32,
    pub effect: ChallengeEffect,
}

pub const CHALLENGES: [ChallengeDef; 3] = [
    ChallengeDef {
        id: ChallengeId::GravLow,
        name: "Moon Gravity",
        description: "Gravity is reduced by 50%",
        duration_secs: 30,
        effect: ChallengeEffect::GravityLow,
    },
    ChallengeDef {
        id: ChallengeId::TntStorm,
        name: "TNT Storm",
        description: "It's raining explosives!",
        duration_secs: 15,
        effect: ChallengeEffect::TntStorm,
    },
    ChallengeDef {
        id: ChallengeId::GoldRush,
        name: "Gold Rush",
        description: "Every block might be gold!",
        duration_secs: 20,
        effect: ChallengeEffect::GoldRush,
    },
];

pub fn challenge_def(id: ChallengeId) -> &'static ChallengeDef {
    match id {
        ChallengeId::GravLow => &CHALLENGES[0],
        ChallengeId::TntStorm => &CHALLENGES[1],
        ChallengeId::GoldRush => &CHALLENGES[2],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MAX_LUCK_MULTIPLIER;

    #[test]
    fn test_zone_for_depth_thresholds() {
        assert_eq!(zone_for_depth(0).id, ZoneId::Overworld);
        assert_eq!(zone_for_depth(999).id, ZoneId::Overworld);
        assert_eq!(zone_for_depth(1000).id, ZoneId::Underworld);
        assert_eq!(zone_for_depth(1999).id, ZoneId::Underworld);
        assert_eq!(zone_for_depth(2000).id, ZoneId::Void);
        assert_eq!(zone_for_depth(1_000_000).id, ZoneId::Void);
        assert_eq!(zone_for_depth(-5).id, ZoneId::Overworld);
    }

    #[test]
    fn test_ore_tables_stay_below_one_at_max_luck() {
        for zone in &ZONES {
            let total: f32 = zone.ore_table.iter().map(|o| o.chance * MAX_LUCK_MULTIPLIER).sum();
            assert!(total < 1.0, "{} sums to {}", zone.name, total);
        }
    }

    #[test]
    fn test_tier_lookup() {
        assert_eq!(tier_damage("diamond"), 250.0);
        assert_eq!(tier_damage("no-such-tier"), 10.0);
        assert!(tier_by_id("netherite").is_some());
    }

    #[test]
    fn test_block_type_from_wire_name() {
        assert_eq!(BlockType::from_name("diamond"), Some(BlockType::Diamond));
        assert_eq!(BlockType::from_name("LOOT_CRATE"), Some(BlockType::LootCrate));
        assert_eq!(BlockType::from_name("cheese"), None);
    }
}
