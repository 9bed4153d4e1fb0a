//! Chat text to game events
//!
//! Exact-match command table with two deliberate random rolls: the rare
//! restart and the idle commentary line.

use rand::Rng;

use crate::sim::{ChallengeId, GameEvent, LootDrop, PickaxeSize, Speed};

/// Chance that a restart message actually resets the round
pub const RESTART_CHANCE: f64 = 0.005;
/// Chance of a commentary line when nothing matched
pub const COMMENTARY_CHANCE: f64 = 0.05;

pub const HYPE_COMMENTS: &[&str] = &[
    "Digging straight down!",
    "Chat is controlling physics!",
    "MegaTNT inbound?",
    "Netherite detected?",
    "Maximum chaos enabled!",
    "Giga Drill Breaker!",
    "We're rich!",
    "Physics engine crying rn",
];

/// Fixed event for an exact command key (without the `!` marker)
pub fn command_event(key: &str) -> Option<GameEvent> {
    let event = match key {
        "tnt" | "bomb" | "boom" => GameEvent::SpawnTnt,
        "ball" => GameEvent::SpawnBalls(1),
        "balls" => GameEvent::SpawnBalls(5),
        "drop" => GameEvent::SpawnBalls(3),
        "spam" => GameEvent::SpawnBalls(10),
        "loot" | "money" => GameEvent::SpawnLoot(LootDrop::Crate {
            value: crate::consts::LOOT_CRATE_VALUE,
        }),
        "rich" => GameEvent::SpawnLoot(LootDrop::GoldRush),

        "nuke" => GameEvent::SpawnMegaTnt("Chat Nuke".to_string()),
        "magnet" => GameEvent::ActivateMagnet,
        "drill" => GameEvent::ActivateDrill,
        "freeze" | "stop" | "ice" => GameEvent::ActivateFreeze,

        "fast" | "speed" => GameEvent::SetSpeed(Speed::Fast),
        "slow" => GameEvent::SetSpeed(Speed::Slow),
        "normal" => GameEvent::SetSpeed(Speed::Normal),

        "big" | "giant" => GameEvent::ResizePickaxe(PickaxeSize::Big),
        // "small" restores the default size; "tiny" shrinks
        "small" | "reset" => GameEvent::ResizePickaxe(PickaxeSize::Normal),
        "tiny" => GameEvent::ResizePickaxe(PickaxeSize::Small),

        "heal" | "fix" | "repair" => GameEvent::HealPickaxe,
        "fly" | "moon" => GameEvent::TriggerChallenge(ChallengeId::GravLow),

        "wood" | "stone" | "copper" | "iron" | "gold" | "diamond" | "netherite" => {
            GameEvent::ChangeMaterial(key.to_string())
        }
        _ => return None,
    };
    Some(event)
}

#[derive(Debug, Clone)]
pub struct CommandParser {
    pub restart_chance: f64,
    pub commentary_chance: f64,
}

impl Default for CommandParser {
    fn default() -> Self {
        Self {
            restart_chance: RESTART_CHANCE,
            commentary_chance: COMMENTARY_CHANCE,
        }
    }
}

impl CommandParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a batch of chat lines (oldest first) into at most one event
    ///
    /// The newest matching command wins; commands are never combined.
    pub fn parse_batch<S: AsRef<str>, R: Rng>(&self, messages: &[S], rng: &mut R) -> Option<GameEvent> {
        if messages.is_empty() {
            return None;
        }

        for message in messages.iter().rev() {
            let message = message.as_ref().trim().to_lowercase();

            if message == "restart" || message == "!restart" {
                if rng.random_bool(self.restart_chance.clamp(0.0, 1.0)) {
                    return Some(GameEvent::ResetGame);
                }
                // Missed the roll: keep looking at older messages
                continue;
            }

            let key = message.strip_prefix('!').unwrap_or(&message);
            if let Some(event) = command_event(key) {
                return Some(event);
            }

            if message.contains("rain") {
                return Some(GameEvent::SpawnTnt);
            }
        }

        if rng.random_bool(self.commentary_chance.clamp(0.0, 1.0)) {
            let line = HYPE_COMMENTS[rng.random_range(0..HYPE_COMMENTS.len())];
            return Some(GameEvent::Commentary(line.to_string()));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn quiet() -> CommandParser {
        CommandParser {
            restart_chance: 0.0,
            commentary_chance: 0.0,
        }
    }

    #[test]
    fn test_newest_command_wins() {
        let mut rng = Pcg32::seed_from_u64(1);
        let parser = quiet();
        assert_eq!(parser.parse_batch(&["hello", "!tnt"], &mut rng), Some(GameEvent::SpawnTnt));
        assert_eq!(
            parser.parse_batch(&["!tnt", "  BALLS "], &mut rng),
            Some(GameEvent::SpawnBalls(5))
        );
    }

    #[test]
    fn test_empty_batch_is_none() {
        let mut rng = Pcg32::seed_from_u64(2);
        let always = CommandParser {
            restart_chance: 1.0,
            commentary_chance: 1.0,
        };
        let empty: [&str; 0] = [];
        assert_eq!(always.parse_batch(&empty, &mut rng), None);
    }

    #[test]
    fn test_restart_roll() {
        let mut rng = Pcg32::seed_from_u64(3);
        let forced = CommandParser {
            restart_chance: 1.0,
            commentary_chance: 0.0,
        };
        assert_eq!(forced.parse_batch(&["tnt", "!restart"], &mut rng), Some(GameEvent::ResetGame));

        // Failed roll falls through to the older command
        assert_eq!(quiet().parse_batch(&["tnt", "!restart"], &mut rng), Some(GameEvent::SpawnTnt));
    }

    #[test]
    fn test_rain_substring_after_exact() {
        let mut rng = Pcg32::seed_from_u64(4);
        assert_eq!(
            quiet().parse_batch(&["make it rain!!"], &mut rng),
            Some(GameEvent::SpawnTnt)
        );
        assert_eq!(
            quiet().parse_batch(&["!magnet", "drain"], &mut rng),
            Some(GameEvent::SpawnTnt)
        );
        assert_eq!(
            quiet().parse_batch(&["drain", "!magnet"], &mut rng),
            Some(GameEvent::ActivateMagnet)
        );
    }

    #[test]
    fn test_commentary_fallback() {
        let mut rng = Pcg32::seed_from_u64(5);
        let chatty = CommandParser {
            restart_chance: 0.0,
            commentary_chance: 1.0,
        };
        match chatty.parse_batch(&["wow", "nice"], &mut rng) {
            Some(GameEvent::Commentary(line)) => assert!(HYPE_COMMENTS.contains(&line.as_str())),
            other => panic!("expected commentary, got {:?}", other),
        }
        assert_eq!(quiet().parse_batch(&["wow", "nice"], &mut rng), None);
    }

    #[test]
    fn test_material_and_size_table() {
        assert_eq!(command_event("diamond"), Some(GameEvent::ChangeMaterial("diamond".into())));
        assert_eq!(command_event("tiny"), Some(GameEvent::ResizePickaxe(PickaxeSize::Small)));
        assert_eq!(command_event("moon"), Some(GameEvent::TriggerChallenge(ChallengeId::GravLow)));
        assert_eq!(command_event("emerald"), None);
    }
}
