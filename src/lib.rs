//! Chaos Dig - A chat-driven side-scrolling mining arcade game
//!
//! Core modules:
//! - `sim`: Simulation (world generation, physics, collisions, abilities)
//! - `command`: Chat parsing, per-kind event queues, chaos scheduler
//! - `game`: Host loop tying the pipeline to the simulation
//! - `platform`: Browser/native platform abstraction
//! - `persistence`: LocalStorage JSON save/load
//! - `config`: Round configuration
//! - `sessions`: Session history and leaderboard

pub mod command;
pub mod config;
pub mod game;
pub mod persistence;
pub mod platform;
pub mod sessions;
pub mod sim;

pub use config::{GameConfig, Keybinds, Platform};
pub use game::Game;
pub use sessions::{GameSession, SessionHistory};

/// Game configuration constants
pub mod consts {
    /// Milliseconds per simulation tick (60 Hz, one tick per display frame)
    pub const TICK_MS: f64 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Grid cell size in world pixels
    pub const BLOCK_SIZE: f32 = 40.0;
    /// Minimum world width in blocks
    pub const MIN_WORLD_WIDTH: usize = 14;
    /// Rows generated when a round starts
    pub const INITIAL_ROWS: i32 = 20;
    /// Rows generated per terrain batch
    pub const ROW_BATCH: i32 = 5;
    /// Terrain must extend this far below the camera's bottom edge
    pub const LOOKAHEAD_PX: f32 = 500.0;
    /// Rows this far above the camera are pruned
    pub const PRUNE_DISTANCE_PX: f32 = 800.0;

    /// Base gravity (pixels/tick²), scaled by config
    pub const GRAVITY: f32 = 0.5;
    /// Horizontal velocity decay per tick
    pub const FRICTION: f32 = 0.99;
    /// Wall bounce restitution
    pub const WALL_RESTITUTION: f32 = 0.8;
    /// Push-back impulse per unit of speed on block contact
    pub const CONTACT_PUSHBACK: f32 = 0.5;

    /// Pickaxe defaults
    pub const PICKAXE_RADIUS: f32 = 20.0;
    pub const PICKAXE_HP: f32 = 1000.0;
    /// Projectile defaults
    pub const BODY_RADIUS: f32 = 10.0;
    pub const MEGA_TNT_RADIUS: f32 = 40.0;
    pub const BALL_HP: f32 = 30.0;
    pub const AVATAR_HP: f32 = 60.0;
    pub const AVATAR_RADIUS: f32 = 24.0;

    /// Fuse durations
    pub const TNT_FUSE_MS: u64 = 3000;
    pub const MEGA_TNT_FUSE_MS: u64 = 5000;

    /// Camera smoothing factor and shake decay
    pub const CAMERA_SMOOTHING: f32 = 0.1;
    pub const SHAKE_DECAY: f32 = 0.9;

    /// Magnet behavior
    pub const MAGNET_RADIUS: f32 = 300.0;
    pub const MAGNET_STRENGTH: f32 = 20.0;
    /// Drill damage multiplier on pickaxe contact
    pub const DRILL_DAMAGE_MULTIPLIER: f32 = 5.0;
    /// Freeze slows time to this fraction
    pub const FREEZE_TIME_DILATION: f32 = 0.25;

    /// Luck multiplier cap (ore tables stay below 1.0 cumulative here)
    pub const MAX_LUCK_MULTIPLIER: f32 = 3.0;

    /// Loot crate defaults
    pub const LOOT_CRATE_VALUE: u64 = 5000;
    pub const LOOT_CRATE_HP: f32 = 10.0;

    /// Maximum balls spawned by one event
    pub const MAX_BALLS_PER_EVENT: u32 = 50;
    /// Maximum debris particles kept alive
    pub const MAX_DEBRIS: usize = 512;
}
