//! Chaos scheduler
//!
//! Synthesises events on randomised per-category timers when chat control is
//! off. Category re-arms and effect reverts share one timeline.

use rand::Rng;

use crate::config::GameConfig;
use crate::sim::{EventEnvelope, GameEvent, PickaxeSize, Speed, Timeline};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChaosCategory {
    Tnt,
    Speed,
    Size,
    Random,
}

impl ChaosCategory {
    pub const ALL: [ChaosCategory; 4] = [
        ChaosCategory::Tnt,
        ChaosCategory::Speed,
        ChaosCategory::Size,
        ChaosCategory::Random,
    ];

    fn label(self) -> &'static str {
        match self {
            ChaosCategory::Tnt => "chaos: tnt",
            ChaosCategory::Speed => "chaos: speed",
            ChaosCategory::Size => "chaos: size",
            ChaosCategory::Random => "chaos: random",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ChaosEntry {
    Fire(ChaosCategory),
    Revert(GameEvent),
}

/// Per-category `[min, max]` bounds and revert durations, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChaosBounds {
    pub tnt: (u64, u64),
    pub speed: (u64, u64),
    pub size: (u64, u64),
    pub random: (u64, u64),
    pub speed_duration_ms: u64,
    pub size_duration_ms: u64,
}

fn secs_to_ms(secs: f64) -> u64 {
    (secs.max(0.0) * 1000.0) as u64
}

impl ChaosBounds {
    pub fn from_config(config: &GameConfig) -> Self {
        let bounds = |min: f64, max: f64| {
            let (min, max) = (secs_to_ms(min), secs_to_ms(max));
            (min.min(max), min.max(max))
        };
        Self {
            tnt: bounds(config.tnt_spawn_interval_min, config.tnt_spawn_interval_max),
            speed: bounds(config.fast_slow_interval_min, config.fast_slow_interval_max),
            size: bounds(config.pickaxe_enlarge_interval_min, config.pickaxe_enlarge_interval_max),
            random: bounds(config.random_pickaxe_interval_min, config.random_pickaxe_interval_max),
            speed_duration_ms: secs_to_ms(config.fast_slow_duration),
            size_duration_ms: secs_to_ms(config.pickaxe_enlarge_duration),
        }
    }

    fn interval(&self, category: ChaosCategory) -> (u64, u64) {
        match category {
            ChaosCategory::Tnt => self.tnt,
            ChaosCategory::Speed => self.speed,
            ChaosCategory::Size => self.size,
            ChaosCategory::Random => self.random,
        }
    }
}

#[derive(Debug)]
pub struct ChaosScheduler {
    bounds: ChaosBounds,
    timeline: Timeline<ChaosEntry>,
}

impl ChaosScheduler {
    pub fn new(bounds: ChaosBounds) -> Self {
        Self {
            bounds,
            timeline: Timeline::new(),
        }
    }

    /// Arm every category from `now_ms`, dropping anything pending
    pub fn start<R: Rng>(&mut self, now_ms: u64, rng: &mut R) {
        self.timeline.clear();
        for category in ChaosCategory::ALL {
            self.arm(category, now_ms, rng);
        }
        log::info!("Chaos engine started");
    }

    fn arm<R: Rng>(&mut self, category: ChaosCategory, now_ms: u64, rng: &mut R) {
        let (min, max) = self.bounds.interval(category);
        let delay = if max > min { rng.random_range(min..=max) } else { min };
        self.timeline.schedule(now_ms + delay.max(1), ChaosEntry::Fire(category));
    }

    /// Fire everything due at `now_ms`, re-arming each category fired
    pub fn poll<R: Rng>(&mut self, now_ms: u64, rng: &mut R) -> Vec<EventEnvelope> {
        let mut events = Vec::new();
        while let Some(entry) = self.timeline.pop_due(now_ms) {
            match entry {
                ChaosEntry::Fire(category) => {
                    events.push(self.fire(category, now_ms, rng));
                    self.arm(category, now_ms, rng);
                }
                ChaosEntry::Revert(event) => {
                    events.push(EventEnvelope::with_reason(event, "chaos: revert"));
                }
            }
        }
        events
    }

    fn fire<R: Rng>(&mut self, category: ChaosCategory, now_ms: u64, rng: &mut R) -> EventEnvelope {
        let event = match category {
            ChaosCategory::Tnt => GameEvent::SpawnTnt,
            ChaosCategory::Speed => {
                let speed = if rng.random_bool(0.5) { Speed::Fast } else { Speed::Slow };
                self.timeline.schedule(
                    now_ms + self.bounds.speed_duration_ms,
                    ChaosEntry::Revert(GameEvent::SetSpeed(Speed::Normal)),
                );
                GameEvent::SetSpeed(speed)
            }
            ChaosCategory::Size => {
                let size = if rng.random_bool(0.5) { PickaxeSize::Big } else { PickaxeSize::Small };
                self.timeline.schedule(
                    now_ms + self.bounds.size_duration_ms,
                    ChaosEntry::Revert(GameEvent::ResizePickaxe(PickaxeSize::Normal)),
                );
                GameEvent::ResizePickaxe(size)
            }
            ChaosCategory::Random => match rng.random_range(0..3) {
                0 => GameEvent::ActivateMagnet,
                1 => GameEvent::ActivateDrill,
                _ => GameEvent::ActivateFreeze,
            },
        };
        log::debug!("{} -> {:?}", category.label(), event);
        EventEnvelope::with_reason(event, category.label())
    }

    pub fn pending(&self) -> usize {
        self.timeline.len()
    }

    /// Next fire time, if anything is armed
    pub fn next_fire_ms(&self) -> Option<u64> {
        self.timeline.peek_time()
    }

    pub fn clear(&mut self) {
        self.timeline.clear();
    }
}
