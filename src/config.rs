//! Game configuration
//!
//! Persisted separately from progress in LocalStorage. Read-only to the
//! engine for the length of a round.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, CONFIG_KEY};
use crate::sim::ActionKind;

/// Chat source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Platform {
    Twitch,
    Youtube,
    #[default]
    Offline,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitch => "TWITCH",
            Platform::Youtube => "YOUTUBE",
            Platform::Offline => "OFFLINE",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "twitch" => Some(Platform::Twitch),
            "youtube" | "yt" => Some(Platform::Youtube),
            "offline" => Some(Platform::Offline),
            _ => None,
        }
    }
}

/// What a key press asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    SpawnBall,
    SpawnTnt,
    MegaTnt,
    Restart,
    Pause,
    /// Owned ability slot (0-3)
    Ability(usize),
    NudgeLeft,
    NudgeRight,
    // UI toggles handled by the host
    Settings,
    Leaderboard,
    Shop,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Keybinds {
    pub spawn_ball: String,
    pub spawn_tnt: String,
    pub mega_tnt: String,
    pub restart: String,
    pub settings: String,
    pub leaderboard: String,
    pub pause: String,
    pub shop: String,
    pub ability1: String,
    pub ability2: String,
    pub ability3: String,
    pub ability4: String,
}

impl Default for Keybinds {
    fn default() -> Self {
        Self {
            spawn_ball: "b".into(),
            spawn_tnt: "t".into(),
            mega_tnt: "m".into(),
            restart: "p".into(),
            settings: "l".into(),
            leaderboard: "tab".into(),
            pause: "v".into(),
            shop: "s".into(),
            ability1: "1".into(),
            ability2: "2".into(),
            ability3: "3".into(),
            ability4: "4".into(),
        }
    }
}

impl Keybinds {
    /// Map a key (as reported by the browser) to an action
    pub fn action_for(&self, key: &str) -> Option<KeyAction> {
        let key = key.to_lowercase();
        match key.as_str() {
            "arrowleft" => return Some(KeyAction::NudgeLeft),
            "arrowright" => return Some(KeyAction::NudgeRight),
            _ => {}
        }
        let table = [
            (&self.spawn_ball, KeyAction::SpawnBall),
            (&self.spawn_tnt, KeyAction::SpawnTnt),
            (&self.mega_tnt, KeyAction::MegaTnt),
            (&self.restart, KeyAction::Restart),
            (&self.pause, KeyAction::Pause),
            (&self.ability1, KeyAction::Ability(0)),
            (&self.ability2, KeyAction::Ability(1)),
            (&self.ability3, KeyAction::Ability(2)),
            (&self.ability4, KeyAction::Ability(3)),
            (&self.settings, KeyAction::Settings),
            (&self.leaderboard, KeyAction::Leaderboard),
            (&self.shop, KeyAction::Shop),
        ];
        table
            .into_iter()
            .find(|(bound, _)| bound.to_lowercase() == key)
            .map(|(_, action)| action)
    }
}

/// Round configuration. Intervals and durations are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameConfig {
    pub platform: Platform,
    /// Twitch channel or YouTube channel id (connector-side)
    pub channel_id: String,
    /// Gravity scalar applied to the base gravity
    pub gravity: f32,
    /// Chat drives the game; otherwise the chaos scheduler does
    pub chat_control: bool,
    pub disabled_commands: Vec<ActionKind>,
    pub keybinds: Keybinds,

    // === Chaos bounds ===
    pub tnt_spawn_interval_min: f64,
    pub tnt_spawn_interval_max: f64,
    pub fast_slow_interval_min: f64,
    pub fast_slow_interval_max: f64,
    pub fast_slow_duration: f64,
    pub random_pickaxe_interval_min: f64,
    pub random_pickaxe_interval_max: f64,
    pub pickaxe_enlarge_interval_min: f64,
    pub pickaxe_enlarge_interval_max: f64,
    pub pickaxe_enlarge_duration: f64,

    // === Host timers ===
    pub save_progress_interval: f64,
    #[serde(alias = "queuesPopInterval")]
    pub queue_pop_interval: f64,
    pub chat_poll_interval: f64,

    /// Donations at or above this amount drop a Mega TNT
    pub donation_mega_threshold: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            platform: Platform::Offline,
            channel_id: String::new(),
            gravity: 1.0,
            // Chaos mode by default
            chat_control: false,
            disabled_commands: Vec::new(),
            keybinds: Keybinds::default(),

            tnt_spawn_interval_min: 5.0,
            tnt_spawn_interval_max: 30.0,
            fast_slow_interval_min: 5.0,
            fast_slow_interval_max: 30.0,
            fast_slow_duration: 5.0,
            random_pickaxe_interval_min: 5.0,
            random_pickaxe_interval_max: 30.0,
            pickaxe_enlarge_interval_min: 5.0,
            pickaxe_enlarge_interval_max: 30.0,
            pickaxe_enlarge_duration: 5.0,

            save_progress_interval: 30.0,
            queue_pop_interval: 5.0,
            chat_poll_interval: 3.0,

            donation_mega_threshold: 10.0,
        }
    }
}

impl GameConfig {
    /// Merge partial JSON over the defaults
    pub fn from_json(json: &str) -> Option<Self> {
        persistence::decode::<Self>(CONFIG_KEY, json).map(Self::sanitized)
    }

    /// Swap inverted bounds and floor timers so no schedule can spin
    pub fn sanitized(mut self) -> Self {
        fn order(min: &mut f64, max: &mut f64) {
            *min = min.max(0.1);
            *max = max.max(0.1);
            if *min > *max {
                std::mem::swap(min, max);
            }
        }
        order(&mut self.tnt_spawn_interval_min, &mut self.tnt_spawn_interval_max);
        order(&mut self.fast_slow_interval_min, &mut self.fast_slow_interval_max);
        order(&mut self.random_pickaxe_interval_min, &mut self.random_pickaxe_interval_max);
        order(&mut self.pickaxe_enlarge_interval_min, &mut self.pickaxe_enlarge_interval_max);
        self.fast_slow_duration = self.fast_slow_duration.max(0.0);
        self.pickaxe_enlarge_duration = self.pickaxe_enlarge_duration.max(0.0);
        self.save_progress_interval = self.save_progress_interval.max(1.0);
        self.queue_pop_interval = self.queue_pop_interval.max(0.1);
        self.chat_poll_interval = self.chat_poll_interval.max(0.1);
        if !self.gravity.is_finite() || self.gravity < 0.0 {
            self.gravity = 1.0;
        }
        self
    }

    pub fn is_disabled(&self, kind: ActionKind) -> bool {
        self.disabled_commands.contains(&kind)
    }

    /// Load config from storage, falling back to defaults
    pub fn load() -> Self {
        match persistence::load_json::<Self>(CONFIG_KEY) {
            Some(config) => {
                log::info!("Loaded config from storage");
                config.sanitized()
            }
            None => {
                log::info!("Using default config");
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        if persistence::save_json(CONFIG_KEY, self) {
            log::info!("Config saved");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_merges_over_defaults() {
        let config = GameConfig::from_json(r#"{"chatControl": true, "queuesPopInterval": 2, "disabledCommands": ["SPAWN_TNT"]}"#);
        let config = config.unwrap_or_default();
        assert!(config.chat_control);
        assert_eq!(config.queue_pop_interval, 2.0);
        assert_eq!(config.tnt_spawn_interval_max, 30.0);
        assert!(config.is_disabled(ActionKind::SpawnTnt));
        assert!(!config.is_disabled(ActionKind::SpawnBalls));
    }

    #[test]
    fn test_inverted_bounds_are_swapped() {
        let config = GameConfig {
            tnt_spawn_interval_min: 40.0,
            tnt_spawn_interval_max: 10.0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(config.tnt_spawn_interval_min, 10.0);
        assert_eq!(config.tnt_spawn_interval_max, 40.0);
    }

    #[test]
    fn test_keybind_lookup() {
        let binds = Keybinds::default();
        assert_eq!(binds.action_for("T"), Some(KeyAction::SpawnTnt));
        assert_eq!(binds.action_for("Tab"), Some(KeyAction::Leaderboard));
        assert_eq!(binds.action_for("3"), Some(KeyAction::Ability(2)));
        assert_eq!(binds.action_for("ArrowLeft"), Some(KeyAction::NudgeLeft));
        assert_eq!(binds.action_for("z"), None);
    }

    #[test]
    fn test_platform_from_name() {
        assert_eq!(Platform::from_name("Twitch"), Some(Platform::Twitch));
        assert_eq!(Platform::from_name("yt"), Some(Platform::Youtube));
        assert_eq!(Platform::from_name("kick"), None);
    }
}
