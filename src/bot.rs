//! Autoclicker finite-state machine.
//!
//! The bot is driven purely by `f64` epoch-millisecond timestamps handed in
//! by the caller, so tests run it on a virtual clock. Parameters are resolved
//! once at activation and snapshotted for the whole run; buying an upgrade
//! mid-run only affects the next activation.

use crate::config::ProgressionTables;
use crate::log;
use crate::save::BotUpgrades;

/// Un-upgraded bot: one click every 233 ms for 10 s, then a 3 minute refill.
pub const DEFAULT_CLICK_SPEED_MS: f64 = 233.0;
pub const DEFAULT_DURATION_MS: f64 = 10_000.0;
pub const DEFAULT_REFILL_MS: f64 = 180_000.0;

// Fallbacks for a tier pointing past the table.
const FALLBACK_CLICK_SPEED_MS: f64 = 100.0;
const FALLBACK_DURATION_MS: f64 = 30_000.0;
const FALLBACK_REFILL_MS: f64 = 60_000.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BotParams {
    pub click_speed_ms: f64,
    pub duration_ms: f64,
    pub refill_ms: f64,
}

impl BotParams {
    pub fn default_tier() -> Self {
        Self {
            click_speed_ms: DEFAULT_CLICK_SPEED_MS,
            duration_ms: DEFAULT_DURATION_MS,
            refill_ms: DEFAULT_REFILL_MS,
        }
    }
}

/// Resolve run parameters from the owned tiers. Tier 0 is the default bot;
/// tier n reads table entry n-1. The click speed table is in milliseconds,
/// duration and refill in seconds.
pub fn resolve_params(tables: &ProgressionTables, tiers: &BotUpgrades) -> BotParams {
    let table = &tables.botclicker_table;

    let click_speed_ms = if tiers.clickspeed == 0 {
        DEFAULT_CLICK_SPEED_MS
    } else {
        match table.clickspeed.get(tiers.clickspeed as usize - 1) {
            Some(entry) => entry.value,
            None => {
                log::warn(&format!(
                    "no clickspeed entry for tier {}, using fallback",
                    tiers.clickspeed
                ));
                FALLBACK_CLICK_SPEED_MS
            }
        }
    };

    let duration_ms = if tiers.duration == 0 {
        DEFAULT_DURATION_MS
    } else {
        match table.duration.get(tiers.duration as usize - 1) {
            Some(entry) => entry.value * 1_000.0,
            None => {
                log::warn(&format!(
                    "no duration entry for tier {}, using fallback",
                    tiers.duration
                ));
                FALLBACK_DURATION_MS
            }
        }
    };

    let refill_ms = if tiers.refilltime == 0 {
        DEFAULT_REFILL_MS
    } else {
        match table.refilltime.get(tiers.refilltime as usize - 1) {
            Some(entry) => entry.value * 1_000.0,
            None => {
                log::warn(&format!(
                    "no refilltime entry for tier {}, using fallback",
                    tiers.refilltime
                ));
                FALLBACK_REFILL_MS
            }
        }
    };

    BotParams { click_speed_ms, duration_ms, refill_ms }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BotPhase {
    Idle,
    Active { ends_at: f64, next_fire: f64 },
    Refilling { ends_at: f64 },
}

/// What one `advance` call produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BotAdvance {
    /// Simulated clicks due since the last advance.
    pub fires: u32,
    /// The active run ended this advance.
    pub finished: bool,
    /// The refill completed this advance.
    pub refilled: bool,
}

#[derive(Clone, Debug)]
pub struct BotClicker {
    pub phase: BotPhase,
    /// Points earned by the current (or just-finished) run.
    pub session_score: u64,
    params: BotParams,
}

impl BotClicker {
    pub fn new() -> Self {
        Self {
            phase: BotPhase::Idle,
            session_score: 0,
            params: BotParams::default_tier(),
        }
    }

    pub fn params(&self) -> BotParams {
        self.params
    }

    /// Idle and past the cooldown gate.
    pub fn can_activate(&self, now_ms: f64, next_auto_time: f64) -> bool {
        matches!(self.phase, BotPhase::Idle) && now_ms >= next_auto_time
    }

    /// Start a run with a fresh parameter snapshot. Rejected outside `Idle`.
    pub fn activate(&mut self, params: BotParams, now_ms: f64) -> bool {
        if !matches!(self.phase, BotPhase::Idle) {
            return false;
        }
        self.params = params;
        self.session_score = 0;
        self.phase = BotPhase::Active {
            ends_at: now_ms + params.duration_ms,
            next_fire: now_ms + params.click_speed_ms,
        };
        true
    }

    pub fn add_session_score(&mut self, points: u64) {
        self.session_score += points;
    }

    /// Drive the FSM up to `now_ms`. Active runs always complete; there is no
    /// cancellation path. When `finished` is set the caller owes a
    /// `nextAutoTime = now + refill` write and the auto-score record check.
    pub fn advance(&mut self, now_ms: f64) -> BotAdvance {
        let mut out = BotAdvance::default();
        match self.phase {
            BotPhase::Idle => {}
            BotPhase::Active { ends_at, mut next_fire } => {
                while next_fire <= now_ms && next_fire <= ends_at {
                    out.fires += 1;
                    next_fire += self.params.click_speed_ms;
                }
                if now_ms >= ends_at {
                    out.finished = true;
                    self.phase = BotPhase::Refilling {
                        ends_at: ends_at + self.params.refill_ms,
                    };
                } else {
                    self.phase = BotPhase::Active { ends_at, next_fire };
                }
            }
            BotPhase::Refilling { ends_at } => {
                if now_ms >= ends_at {
                    self.phase = BotPhase::Idle;
                    out.refilled = true;
                }
            }
        }
        out
    }

    /// Milliseconds until the current phase ends, for the UI countdown.
    pub fn remaining_ms(&self, now_ms: f64) -> Option<f64> {
        match self.phase {
            BotPhase::Idle => None,
            BotPhase::Active { ends_at, .. } | BotPhase::Refilling { ends_at } => {
                Some((ends_at - now_ms).max(0.0))
            }
        }
    }
}

impl Default for BotClicker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_tables;

    fn tiers(clickspeed: u32, duration: u32, refilltime: u32) -> BotUpgrades {
        BotUpgrades { clickspeed, duration, refilltime }
    }

    #[test]
    fn tier_zero_resolves_the_exact_defaults() {
        let tables = load_tables().unwrap();
        let params = resolve_params(&tables, &tiers(0, 0, 0));
        assert_eq!(params.click_speed_ms, 233.0);
        assert_eq!(params.duration_ms, 10_000.0);
        assert_eq!(params.refill_ms, 180_000.0);
    }

    #[test]
    fn upgraded_tiers_read_the_table_with_unit_conversion() {
        let tables = load_tables().unwrap();
        let params = resolve_params(&tables, &tiers(2, 1, 5));
        assert_eq!(params.click_speed_ms, 166.0);
        assert_eq!(params.duration_ms, 15_000.0);
        assert_eq!(params.refill_ms, 30_000.0);
    }

    #[test]
    fn tiers_past_the_table_use_the_fallbacks() {
        let tables = load_tables().unwrap();
        let params = resolve_params(&tables, &tiers(99, 99, 99));
        assert_eq!(params.click_speed_ms, 100.0);
        assert_eq!(params.duration_ms, 30_000.0);
        assert_eq!(params.refill_ms, 60_000.0);
    }

    #[test]
    fn activation_is_gated_on_idle_and_cooldown() {
        let mut bot = BotClicker::new();
        assert!(!bot.can_activate(500.0, 1_000.0));
        assert!(bot.can_activate(1_000.0, 1_000.0));
        assert!(bot.activate(BotParams::default_tier(), 1_000.0));
        // Already running.
        assert!(!bot.can_activate(2_000.0, 1_000.0));
        assert!(!bot.activate(BotParams::default_tier(), 2_000.0));
    }

    #[test]
    fn active_run_fires_on_the_click_cadence() {
        let mut bot = BotClicker::new();
        let params = BotParams {
            click_speed_ms: 100.0,
            duration_ms: 1_000.0,
            refill_ms: 5_000.0,
        };
        bot.activate(params, 0.0);
        // Fires at 100, 200, 300 ms.
        assert_eq!(bot.advance(350.0).fires, 3);
        // Nothing new at the same instant.
        assert_eq!(bot.advance(350.0).fires, 0);
        // 400..=1000 ms: seven more.
        let adv = bot.advance(1_000.0);
        assert_eq!(adv.fires, 7);
        assert!(adv.finished);
        assert!(matches!(bot.phase, BotPhase::Refilling { .. }));
    }

    #[test]
    fn run_end_schedules_refill_from_the_run_end_not_the_tick() {
        let mut bot = BotClicker::new();
        let params = BotParams {
            click_speed_ms: 100.0,
            duration_ms: 1_000.0,
            refill_ms: 5_000.0,
        };
        bot.activate(params, 0.0);
        // Advance well past the end in one late tick.
        assert!(bot.advance(1_300.0).finished);
        match bot.phase {
            BotPhase::Refilling { ends_at } => assert_eq!(ends_at, 6_000.0),
            other => panic!("expected refilling, got {other:?}"),
        }
    }

    #[test]
    fn refill_expiry_returns_to_idle() {
        let mut bot = BotClicker::new();
        bot.phase = BotPhase::Refilling { ends_at: 2_000.0 };
        assert_eq!(bot.advance(1_999.0), BotAdvance::default());
        let adv = bot.advance(2_000.0);
        assert!(adv.refilled);
        assert_eq!(bot.phase, BotPhase::Idle);
    }

    #[test]
    fn session_score_resets_on_activation() {
        let mut bot = BotClicker::new();
        bot.add_session_score(40);
        assert!(bot.activate(BotParams::default_tier(), 0.0));
        assert_eq!(bot.session_score, 0);
        bot.add_session_score(7);
        bot.add_session_score(5);
        assert_eq!(bot.session_score, 12);
    }

    #[test]
    fn remaining_time_counts_down_and_floors_at_zero() {
        let mut bot = BotClicker::new();
        assert_eq!(bot.remaining_ms(0.0), None);
        bot.activate(BotParams::default_tier(), 0.0);
        assert_eq!(bot.remaining_ms(4_000.0), Some(6_000.0));
        assert_eq!(bot.remaining_ms(99_000.0), Some(0.0));
    }
}
