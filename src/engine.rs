//! The game engine: one context object owning the progression tables, the
//! save store and the transient session state. All gameplay mutation funnels
//! through here; render reads the state and input calls the operations.

use crate::bot::{self, BotPhase};
use crate::config::ProgressionTables;
use crate::level;
use crate::log;
use crate::save::SaveStore;
use crate::scoring::{self, HitResult};
use crate::state::{CircleInstance, GameState};
use crate::time::TICKS_PER_SEC;
use crate::upgrade::{self, PurchaseError, UpgradeAxis};

/// Who produced a click. Only matters for the manual-CPS record and the bot
/// session score; points and click counters treat both the same.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickSource {
    Manual,
    Bot,
}

pub struct Engine {
    pub tables: ProgressionTables,
    pub store: SaveStore,
    pub state: GameState,
    ticks_into_window: u32,
}

impl Engine {
    /// Build the engine over an already-loaded store: derive the level from
    /// cumulative score and bring the circle population up to the level's
    /// size.
    pub fn new(tables: ProgressionTables, store: SaveStore, seed: u32) -> Self {
        let cumulative = store.data().map(|d| d.cumulative_score()).unwrap_or(0);
        let mut engine = Engine {
            state: GameState::new(seed),
            tables,
            store,
            ticks_into_window: 0,
        };
        engine.state.level = level::level_for_total(&engine.tables, cumulative);
        engine.sync_population();
        engine
    }

    /// Resolve a click on a live circle: roll the crit, award the points,
    /// pop the score text, replace the circle. Returns `None` when the id is
    /// stale (already hit this frame).
    pub fn circle_hit(&mut self, id: u32, source: ClickSource) -> Option<HitResult> {
        let idx = self.state.circle_index(id)?;
        let circle = self.state.circles[idx].clone();
        let levels = self.store.data()?.circle_upgrades(circle.ty);

        let roll = self.state.next_unit();
        let hit = scoring::resolve_hit(&self.tables, circle.ty, &levels, roll);

        self.store.increment_circle_click(circle.ty);
        self.award(hit.points, source);

        let text = if hit.critical {
            format!("+{}!", hit.points)
        } else {
            format!("+{}", hit.points)
        };
        self.state
            .spawn_popup(text, circle.col, circle.row, circle.ty.color(), hit.critical);

        self.state.circles.remove(idx);
        self.sync_population();
        Some(hit)
    }

    /// Credit points to the unspent score, feed the per-second window and
    /// step the level across any thresholds this award crossed.
    pub fn award(&mut self, points: u64, source: ClickSource) {
        let Some(data) = self.store.data() else {
            return;
        };
        let single = data.single_score + points;
        self.store.set_single_score(single);

        self.state.window_total_clicks += 1;
        if source == ClickSource::Manual {
            self.state.window_manual_clicks += 1;
        } else {
            self.state.bot.add_session_score(points);
        }
        self.state.window_points += points;

        let cumulative = self
            .store
            .data()
            .map(|d| d.cumulative_score())
            .unwrap_or(0);
        let new_level = level::advance_level(&self.tables, self.state.level, cumulative);
        if new_level != self.state.level {
            log::info(&format!("level up: {} -> {new_level}", self.state.level));
            self.state.level = new_level;
            self.sync_population();
        }
    }

    pub fn purchase(&mut self, axis: UpgradeAxis, now_ms: f64) -> Result<f64, PurchaseError> {
        upgrade::purchase(&mut self.store, &self.tables, axis, now_ms)
    }

    /// Start a bot run if the bot is idle and the refill gate has passed.
    pub fn press_auto(&mut self, now_ms: f64) -> bool {
        let Some(data) = self.store.data() else {
            return false;
        };
        if !self.state.bot.can_activate(now_ms, data.next_auto_time) {
            return false;
        }
        let params = bot::resolve_params(&self.tables, &data.upgrade_level.botclicker);
        self.state.bot.activate(params, now_ms)
    }

    /// Fixed-timestep advance: popup decay, bot clicks, CPS/SPS window and
    /// the once-a-second autosave.
    pub fn tick(&mut self, delta_ticks: u32, now_ms: f64) {
        if delta_ticks == 0 {
            return;
        }
        self.state.anim_frame = self.state.anim_frame.wrapping_add(delta_ticks);
        self.state.decay_popups(delta_ticks);

        let adv = self.state.bot.advance(now_ms);
        for _ in 0..adv.fires {
            if self.state.circles.is_empty() {
                break;
            }
            let pick = self.state.next_random() as usize % self.state.circles.len();
            let id = self.state.circles[pick].id;
            self.circle_hit(id, ClickSource::Bot);
        }
        if adv.finished {
            let session = self.state.bot.session_score;
            if self.store.record_auto_score(session) {
                log::info(&format!("new best bot run: {session}"));
            }
            if let BotPhase::Refilling { ends_at } = self.state.bot.phase {
                self.store.set_next_auto_time(ends_at);
            }
        }

        self.ticks_into_window += delta_ticks;
        if self.ticks_into_window >= TICKS_PER_SEC {
            self.close_window(now_ms);
        }
    }

    /// Close the per-second window: publish the CPS/SPS readout, update the
    /// lifetime records and autosave.
    fn close_window(&mut self, now_ms: f64) {
        let secs = self.ticks_into_window as f64 / TICKS_PER_SEC as f64;
        let manual_cps = self.state.window_manual_clicks as f64 / secs;
        let total_cps = self.state.window_total_clicks as f64 / secs;
        let sps = self.state.window_points as f64 / secs;

        // The record counts human clicks only; the readout counts everything.
        self.store.record_manual_cps(manual_cps);
        self.store.record_sps(sps);
        self.state.display_cps = total_cps;
        self.state.display_sps = sps;

        self.state.window_manual_clicks = 0;
        self.state.window_total_clicks = 0;
        self.state.window_points = 0;
        self.ticks_into_window = 0;

        self.store.save(now_ms);
    }

    /// Bring the live circle count to the level's `max-popup`: drop the
    /// newest extras on a shrink, spawn fresh circles on a grow.
    pub fn sync_population(&mut self) {
        let target = self
            .tables
            .level(self.state.level)
            .map(|e| e.max_popup)
            .unwrap_or(0);
        self.state.circles.truncate(target);
        while self.state.circles.len() < target {
            self.spawn_circle();
        }
    }

    fn spawn_circle(&mut self) {
        let Some(entry) = self.tables.level(self.state.level) else {
            return;
        };
        let roll = self.state.next_unit();
        let ty = level::choose_spawn_type(entry, roll);

        let width = ty.width();
        let max_col = self.state.playfield_cols.saturating_sub(width).max(1);
        let max_row = self.state.playfield_rows.max(1);

        // A few placement attempts to avoid stacking; give up and overlap
        // rather than loop forever on a crowded small field.
        let mut col = 0;
        let mut row = 0;
        for _ in 0..8 {
            col = (self.state.next_random() % max_col as u32) as u16;
            row = (self.state.next_random() % max_row as u32) as u16;
            let clear = self
                .state
                .circles
                .iter()
                .all(|c| c.row != row || col + width <= c.col || c.col + c.ty.width() <= col);
            if clear {
                break;
            }
        }

        let id = self.state.alloc_circle_id();
        self.state.circles.push(CircleInstance { id, ty, col, row });
    }

    /// Adopt the rendered playfield size and pull any stranded circles back
    /// inside the new bounds.
    pub fn set_playfield_size(&mut self, cols: u16, rows: u16) {
        let cols = cols.max(12);
        let rows = rows.max(4);
        if cols == self.state.playfield_cols && rows == self.state.playfield_rows {
            return;
        }
        self.state.playfield_cols = cols;
        self.state.playfield_rows = rows;
        for c in &mut self.state.circles {
            let max_col = cols.saturating_sub(c.ty.width());
            c.col = c.col.min(max_col);
            c.row = c.row.min(rows - 1);
        }
    }

    /// Wipe the save and restart progression from scratch.
    pub fn reset_save(&mut self, now_ms: f64) {
        if self.store.reset(now_ms) {
            let cumulative = self.store.data().map(|d| d.cumulative_score()).unwrap_or(0);
            self.state.level = level::level_for_total(&self.tables, cumulative);
            self.state.circles.clear();
            self.state.popups.clear();
            self.sync_population();
        }
    }
}
