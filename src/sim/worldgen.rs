//! Procedural row generation
//!
//! Rows are generated on demand as the camera descends. Shape (width, bedrock
//! walls, hp scaling) is fixed by depth; block types are rolled.

use glam::IVec2;
use rand::Rng;

use super::catalog::{BlockType, Zone, zone_for_depth};
use super::state::Block;
use crate::consts::MAX_LUCK_MULTIPLIER;

/// Block hp multiplier at a depth
#[inline]
pub fn hp_scale(row_index: i32) -> f32 {
    1.0 + row_index.max(0) as f32 * 0.002
}

/// Generate one row of `width` blocks at `row_index`
pub fn generate_row<R: Rng>(row_index: i32, gold_rush: bool, luck: f32, width: usize, rng: &mut R) -> Vec<Block> {
    let zone = zone_for_depth(row_index);
    let scale = hp_scale(row_index);
    let luck = luck.clamp(1.0, MAX_LUCK_MULTIPLIER);
    let last = width.saturating_sub(1);

    (0..width)
        .map(|column| {
            let cell = IVec2::new(column as i32, row_index);
            if column == 0 || column == last {
                return Block::new(cell, BlockType::Bedrock, scale);
            }
            let (block_type, variant) = if gold_rush {
                (roll_gold_rush(zone, rng), 0)
            } else {
                roll_ore(zone, luck, rng)
            };
            let mut block = Block::new(cell, block_type, scale);
            block.variant = variant;
            block
        })
        .collect()
}

fn roll_gold_rush<R: Rng>(zone: &Zone, rng: &mut R) -> BlockType {
    let roll = rng.random::<f32>();
    if roll < 0.20 {
        BlockType::Gold
    } else if roll < 0.25 {
        BlockType::MagmaGold
    } else {
        zone.base_block
    }
}

/// Walk the ore table with cumulative luck-scaled chances; fall back to the
/// zone base block with a cosmetic variant
fn roll_ore<R: Rng>(zone: &Zone, luck: f32, rng: &mut R) -> (BlockType, u8) {
    let roll = rng.random::<f32>();
    let mut cumulative = 0.0;
    for ore in zone.ore_table {
        cumulative += ore.chance * luck;
        if roll < cumulative {
            return (ore.block, 0);
        }
    }
    let shade = rng.random::<f32>();
    let variant = if shade < 0.4 {
        0
    } else if shade < 0.7 {
        1
    } else {
        2
    };
    (zone.base_block, variant)
}
