//! Session history and leaderboard
//!
//! Persisted to LocalStorage, keeps the most recent 100 rounds and derives
//! the top 10 from them.

use serde::{Deserialize, Serialize};

use crate::config::Platform;
use crate::persistence::{self, HISTORY_KEY};

/// Maximum number of sessions kept
pub const MAX_SESSIONS: usize = 100;
/// Leaderboard length
pub const LEADERBOARD_SIZE: usize = 10;
/// Rounds must beat this score to be recorded
pub const MIN_RECORDED_SCORE: u64 = 100;

/// One finished round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    pub id: String,
    /// ISO-8601 timestamp
    pub date: String,
    pub score: u64,
    pub depth: i32,
    /// Round length in seconds
    #[serde(rename = "duration")]
    pub duration_secs: u64,
    pub platform: Platform,
}

/// Most recent sessions, newest first
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct SessionHistory {
    pub sessions: Vec<GameSession>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self {
            sessions: Vec::new(),
        }
    }

    /// Whether a round's score is worth recording
    pub fn qualifies(score: u64) -> bool {
        score > MIN_RECORDED_SCORE
    }

    /// Record a session at the front; returns false if it did not qualify
    pub fn record(&mut self, session: GameSession) -> bool {
        if !Self::qualifies(session.score) {
            return false;
        }
        log::info!("Session recorded: score {}, depth {}", session.score, session.depth);
        self.sessions.insert(0, session);
        self.sessions.truncate(MAX_SESSIONS);
        true
    }

    /// Top sessions by score (stable for ties)
    pub fn leaderboard(&self) -> Vec<&GameSession> {
        let mut top: Vec<_> = self.sessions.iter().collect();
        top.sort_by(|a, b| b.score.cmp(&a.score));
        top.truncate(LEADERBOARD_SIZE);
        top
    }

    /// 1-indexed rank a score would have among the history
    pub fn rank(&self, score: u64) -> usize {
        self.sessions.iter().filter(|s| s.score > score).count() + 1
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.sessions.iter().map(|s| s.score).max()
    }

    /// Load history from storage
    pub fn load() -> Self {
        match persistence::load_json::<Self>(HISTORY_KEY) {
            Some(history) => {
                log::info!("Loaded {} sessions", history.sessions.len());
                history
            }
            None => {
                log::info!("No session history found, starting fresh");
                Self::new()
            }
        }
    }

    pub fn save(&self) {
        if persistence::save_json(HISTORY_KEY, self) {
            log::info!("Session history saved ({} entries)", self.sessions.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(score: u64) -> GameSession {
        GameSession {
            id: format!("s{}", score),
            date: "2026-01-01T00:00:00.000Z".into(),
            score,
            depth: 10,
            duration_secs: 60,
            platform: Platform::Offline,
        }
    }

    #[test]
    fn test_low_scores_not_recorded() {
        let mut history = SessionHistory::new();
        assert!(!history.record(session(100)));
        assert!(history.record(session(101)));
        assert_eq!(history.sessions.len(), 1);
    }

    #[test]
    fn test_history_capped_newest_first() {
        let mut history = SessionHistory::new();
        for score in 200..(200 + MAX_SESSIONS as u64 + 5) {
            history.record(session(score));
        }
        assert_eq!(history.sessions.len(), MAX_SESSIONS);
        assert_eq!(history.sessions[0].score, 200 + MAX_SESSIONS as u64 + 4);
    }

    #[test]
    fn test_leaderboard_and_rank() {
        let mut history = SessionHistory::new();
        for score in [500, 150, 900, 300] {
            history.record(session(score));
        }
        let top: Vec<u64> = history.leaderboard().iter().map(|s| s.score).collect();
        assert_eq!(top, vec![900, 500, 300, 150]);
        assert_eq!(history.rank(1000), 1);
        assert_eq!(history.rank(400), 3);
        assert_eq!(history.rank(10), 5);
    }

    #[test]
    fn test_history_json_is_a_plain_list() {
        let mut history = SessionHistory::new();
        history.record(session(250));
        let json = serde_json::to_string(&history).unwrap_or_default();
        assert!(json.starts_with('['));
        assert!(json.contains("\"duration\":60"));
    }
}
