//! JS-facing game handle
//!
//! The page owns the canvas, chat connectors and DOM; it drives `frame`
//! from requestAnimationFrame and renders from `snapshot_json`.

use wasm_bindgen::prelude::*;

use crate::command::ChatMessage;
use crate::config::GameConfig;
use crate::game::Game;
use crate::sim::{AbilityId, BlockType, GameEvent};

#[wasm_bindgen]
pub struct WebGame {
    game: Game,
    last_time: f64,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32, seed: Option<u64>) -> WebGame {
        console_error_panic_hook::set_once();
        // Second construction on the same page keeps the first logger
        let _ = console_log::init_with_level(log::Level::Info);

        let seed = seed.unwrap_or_else(|| js_sys::Date::now() as u64);
        log::info!("Chaos Dig starting with seed: {}", seed);
        WebGame {
            game: Game::load(seed, width, height),
            last_time: 0.0,
        }
    }

    /// requestAnimationFrame callback; returns the ticks run
    pub fn frame(&mut self, now_ms: f64) -> u32 {
        let dt = if self.last_time > 0.0 { now_ms - self.last_time } else { 0.0 };
        self.last_time = now_ms;
        self.game.advance_frame(dt)
    }

    /// Feed one chat message (`ChatMessage` JSON)
    pub fn push_chat(&mut self, json: &str) -> bool {
        match serde_json::from_str::<ChatMessage>(json) {
            Ok(message) => {
                self.game.push_chat(message);
                true
            }
            Err(e) => {
                log::warn!("Ignoring malformed chat message: {}", e);
                false
            }
        }
    }

    /// Returns the UI toggle the key maps to ("settings", "leaderboard",
    /// "shop") or nothing
    pub fn key_down(&mut self, key: &str) -> Option<String> {
        use crate::config::KeyAction;
        match self.game.handle_key(key)? {
            KeyAction::Settings => Some("settings".into()),
            KeyAction::Leaderboard => Some("leaderboard".into()),
            KeyAction::Shop => Some("shop".into()),
            _ => None,
        }
    }

    pub fn use_ability(&mut self, id: &str) -> bool {
        AbilityId::from_name(id).is_some_and(|id| self.game.use_ability(id))
    }

    /// Apply a wire-form event directly
    pub fn event(&mut self, action: &str, data: Option<String>) -> bool {
        match GameEvent::from_wire(action, data.as_deref()) {
            Some(event) => {
                self.game.apply(event);
                true
            }
            None => false,
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.game.state.set_viewport(width, height);
    }

    pub fn restart(&mut self) {
        self.game.reset();
    }

    pub fn sell_all(&mut self) -> f64 {
        self.game.sell_all() as f64
    }

    pub fn buy_tier(&mut self, tier_id: &str) -> bool {
        self.game.buy_tier(tier_id)
    }

    pub fn buy_ability(&mut self, id: &str) -> bool {
        AbilityId::from_name(id).is_some_and(|id| self.game.buy_ability(id))
    }

    pub fn toggle_lock(&mut self, block: &str) -> bool {
        BlockType::from_name(block).is_some_and(|block| self.game.toggle_lock(block))
    }

    /// Replace the config (partial JSON merges over defaults)
    pub fn set_config(&mut self, json: &str) -> bool {
        match GameConfig::from_json(json) {
            Some(config) => {
                self.game.reconfigure(config);
                true
            }
            None => false,
        }
    }

    pub fn config_json(&self) -> String {
        serde_json::to_string(self.game.config()).unwrap_or_default()
    }

    pub fn snapshot_json(&self) -> String {
        self.game.snapshot_json()
    }

    pub fn leaderboard_json(&self) -> String {
        serde_json::to_string(&self.game.history().leaderboard()).unwrap_or_default()
    }

    pub fn chat_json(&self) -> String {
        let log: Vec<_> = self.game.chat_log().collect();
        serde_json::to_string(&log).unwrap_or_default()
    }

    /// Toasts and notifications since the last call
    pub fn drain_messages_json(&mut self) -> String {
        let messages = serde_json::json!({
            "toasts": self.game.drain_toasts(),
            "notifications": self.game.drain_notifications(),
        });
        messages.to_string()
    }
}
