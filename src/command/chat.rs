//! Chat messages and donation routing
//!
//! Connectors (Twitch IRC, YouTube polling) live in the host; they hand the
//! core `ChatMessage` values.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::sim::{ChallengeId, GameEvent, LootDrop};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatSource {
    Twitch,
    Youtube,
    Offline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub user: String,
    pub message: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub platform: Option<ChatSource>,
    #[serde(default)]
    pub is_donation: bool,
    #[serde(default)]
    pub donation_amount: Option<f64>,
    #[serde(default)]
    pub profile_url: Option<String>,
}

impl ChatMessage {
    pub fn new(user: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            message: message.into(),
            color: None,
            platform: None,
            is_donation: false,
            donation_amount: None,
            profile_url: None,
        }
    }

    pub fn donation(user: impl Into<String>, amount: f64, profile_url: Option<String>) -> Self {
        Self {
            is_donation: true,
            donation_amount: Some(amount),
            profile_url,
            ..Self::new(user, "")
        }
    }
}

/// Events a donation produces (empty for ordinary messages)
pub fn donation_events(message: &ChatMessage, mega_threshold: f64) -> Vec<GameEvent> {
    if !message.is_donation {
        return Vec::new();
    }
    if let Some(url) = message.profile_url.as_deref().filter(|u| !u.is_empty()) {
        return vec![GameEvent::SpawnDonorAvatar {
            user: message.user.clone(),
            image_url: url.to_string(),
        }];
    }

    let amount = message.donation_amount.unwrap_or(0.0).max(0.0);
    if amount >= mega_threshold {
        vec![
            GameEvent::SpawnMegaTnt(message.user.clone()),
            GameEvent::TriggerChallenge(ChallengeId::GoldRush),
        ]
    } else {
        vec![GameEvent::SpawnLoot(LootDrop::Crate {
            value: (amount * 1000.0).floor() as u64,
        })]
    }
}

const OFFLINE_USERS: &[&str] = &["MinerSteve", "DigDug", "Notch", "Herobrine", "Terrarian", "User123"];
const OFFLINE_MESSAGES: &[&str] = &[
    "tnt", "ball", "fast", "slow", "big", "diamond", "netherite", "iron", "gold", "wow", "nice", "!drop", "balls",
    "magnet", "nuke", "drill",
];

/// Fake chat line for offline mode
pub fn offline_message<R: Rng>(rng: &mut R) -> ChatMessage {
    let user = OFFLINE_USERS[rng.random_range(0..OFFLINE_USERS.len())];
    let message = OFFLINE_MESSAGES[rng.random_range(0..OFFLINE_MESSAGES.len())];
    ChatMessage {
        color: Some("#4ade80".to_string()),
        platform: Some(ChatSource::Offline),
        ..ChatMessage::new(user, message)
    }
}

/// Delay before the next offline message, 2-5 s
pub fn offline_delay_ms<R: Rng>(rng: &mut R) -> u64 {
    rng.random_range(2000..5000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_avatar_donation() {
        let msg = ChatMessage::donation("ana", 1.0, Some("https://img/ana.png".into()));
        let events = donation_events(&msg, 10.0);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], GameEvent::SpawnDonorAvatar { user, .. } if user == "ana"));
    }

    #[test]
    fn test_large_donation_drops_mega_and_gold_rush() {
        let msg = ChatMessage::donation("big_spender", 25.0, None);
        assert_eq!(
            donation_events(&msg, 10.0),
            vec![
                GameEvent::SpawnMegaTnt("big_spender".into()),
                GameEvent::TriggerChallenge(ChallengeId::GoldRush),
            ]
        );
    }

    #[test]
    fn test_small_donation_is_a_crate() {
        let msg = ChatMessage::donation("kind", 2.5, None);
        assert_eq!(
            donation_events(&msg, 10.0),
            vec![GameEvent::SpawnLoot(LootDrop::Crate { value: 2500 })]
        );
        assert!(donation_events(&ChatMessage::new("a", "tnt"), 10.0).is_empty());
    }

    #[test]
    fn test_offline_messages_come_from_pool() {
        let mut rng = Pcg32::seed_from_u64(9);
        for _ in 0..20 {
            let msg = offline_message(&mut rng);
            assert!(OFFLINE_USERS.contains(&msg.user.as_str()));
            assert!(OFFLINE_MESSAGES.contains(&msg.message.as_str()));
        }
    }

    #[test]
    fn test_chat_message_json_shape() {
        let json = r#"{"user":"u","message":"!tnt","isDonation":true,"donationAmount":3,"platform":"twitch"}"#;
        let msg: Option<ChatMessage> = serde_json::from_str(json).ok();
        let msg = msg.unwrap_or_else(|| ChatMessage::new("", ""));
        assert!(msg.is_donation);
        assert_eq!(msg.donation_amount, Some(3.0));
        assert_eq!(msg.platform, Some(ChatSource::Twitch));
    }
}
