//! Persistent save data and the store that owns it.
//!
//! The schema is closed: every struct uses `deny_unknown_fields` and all
//! mutation goes through typed primitives, so a misspelled field can neither
//! be written nor read back. Foreign or stale JSON fails deserialization and
//! is replaced by the bundled template with a console warning.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::log;
use crate::state::CircleType;
use crate::upgrade::{BotAxis, CircleAxis, UpgradeAxis};

/// localStorage key for the save record.
pub const STORAGE_KEY: &str = "circle_clicker_save";

/// Bundled template used when no persisted save exists.
const SAVE_TEMPLATE: &str = include_str!("../res/save_template.json");

/// Maximum profile name length in characters.
pub const MAX_NAME_LEN: usize = 20;

// ── Schema ─────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CircleUpgrades {
    /// Tier 0 = no upgrade; tier n>0 indexes table entry n-1.
    pub critical_chance: u32,
    pub score: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BotUpgrades {
    pub clickspeed: u32,
    pub duration: u32,
    pub refilltime: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpgradeLevels {
    pub circle: BTreeMap<CircleType, CircleUpgrades>,
    pub botclicker: BotUpgrades,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Statistics {
    /// Seconds played on this save since it was created or reset.
    pub playtime: f64,
    pub total_play_time: f64,
    pub total_clicks: BTreeMap<CircleType, u64>,
    pub highest_manual_clicks_per_second: f64,
    pub highest_score_per_second: f64,
    pub highest_single_auto_score: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub sound: bool,
    pub background: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SaveData {
    pub name: String,
    /// Current unspent score.
    pub single_score: u64,
    /// Score banked from previous sessions.
    pub total_score: u64,
    /// Epoch ms when the bot may next activate.
    pub next_auto_time: f64,
    pub upgrade_level: UpgradeLevels,
    pub statistics: Statistics,
    pub settings: Settings,
}

impl SaveData {
    /// Cumulative score used for level derivation.
    pub fn cumulative_score(&self) -> u64 {
        self.total_score + self.single_score
    }

    pub fn circle_upgrades(&self, ty: CircleType) -> CircleUpgrades {
        self.upgrade_level
            .circle
            .get(&ty)
            .cloned()
            .unwrap_or(CircleUpgrades { critical_chance: 0, score: 0 })
    }
}

// ── Storage backends ───────────────────────────────────────────

/// Where the serialized save lives. localStorage in the browser, a shared
/// cell in tests.
pub trait SaveBackend {
    fn read(&self) -> Option<String>;
    fn write(&self, json: &str);
    fn clear(&self);
}

/// In-memory backend. Cloning shares the underlying cell, which lets tests
/// load a "fresh process" store against the same persisted bytes.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    cell: Rc<RefCell<Option<String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SaveBackend for MemoryBackend {
    fn read(&self) -> Option<String> {
        self.cell.borrow().clone()
    }

    fn write(&self, json: &str) {
        *self.cell.borrow_mut() = Some(json.to_string());
    }

    fn clear(&self) {
        *self.cell.borrow_mut() = None;
    }
}

/// Browser localStorage backend.
#[cfg(target_arch = "wasm32")]
pub struct LocalStorageBackend;

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

#[cfg(target_arch = "wasm32")]
impl SaveBackend for LocalStorageBackend {
    fn read(&self) -> Option<String> {
        local_storage()?.get_item(STORAGE_KEY).ok()?
    }

    fn write(&self, json: &str) {
        if let Some(storage) = local_storage() {
            if let Err(e) = storage.set_item(STORAGE_KEY, json) {
                log::warn(&format!("failed to persist save: {e:?}"));
            }
        }
    }

    fn clear(&self) {
        if let Some(storage) = local_storage() {
            let _ = storage.remove_item(STORAGE_KEY);
        }
    }
}

// ── Store ──────────────────────────────────────────────────────

/// Single owner of the persisted state. All writes go through the typed
/// primitives below; everything else reads through [`SaveStore::data`].
pub struct SaveStore {
    data: Option<SaveData>,
    backend: Box<dyn SaveBackend>,
    /// Epoch ms of the last load/save, for session playtime accounting.
    session_start_ms: f64,
    /// Invoked after every successful `save()` so the statistics display can
    /// refresh.
    refresh_hook: Option<Box<dyn Fn(&Statistics)>>,
}

impl SaveStore {
    pub fn new(backend: Box<dyn SaveBackend>) -> Self {
        Self {
            data: None,
            backend,
            session_start_ms: 0.0,
            refresh_hook: None,
        }
    }

    pub fn set_refresh_hook(&mut self, hook: Box<dyn Fn(&Statistics)>) {
        self.refresh_hook = Some(hook);
    }

    /// Load persisted state, falling back to the bundled template (persisted
    /// immediately) when none exists or it fails the closed-schema parse.
    /// Resets the session start marker. Returns false only when the template
    /// itself is unusable; the store then stays empty and callers must cope.
    pub fn load(&mut self, now_ms: f64) -> bool {
        self.session_start_ms = now_ms;

        if let Some(json) = self.backend.read() {
            match serde_json::from_str::<SaveData>(&json) {
                Ok(data) => {
                    self.data = Some(data);
                    log::info("save loaded from storage");
                    return true;
                }
                Err(e) => {
                    log::warn(&format!("discarding unreadable save: {e}"));
                    self.backend.clear();
                }
            }
        }

        match serde_json::from_str::<SaveData>(SAVE_TEMPLATE) {
            Ok(data) => {
                self.persist(&data);
                self.data = Some(data);
                log::info("new save created from template");
                true
            }
            Err(e) => {
                log::error(&format!("save template is unusable: {e}"));
                self.data = None;
                false
            }
        }
    }

    /// Accumulate session playtime, persist, reset the session marker and
    /// notify the statistics display. No-op on an empty store. Idempotent:
    /// saving twice at the same timestamp adds zero extra playtime.
    pub fn save(&mut self, now_ms: f64) {
        let Some(data) = self.data.as_mut() else {
            return;
        };

        let elapsed = ((now_ms - self.session_start_ms) / 1000.0).max(0.0);
        data.statistics.playtime += elapsed;
        data.statistics.total_play_time += elapsed;
        self.session_start_ms = now_ms;

        match serde_json::to_string(data) {
            Ok(json) => self.backend.write(&json),
            Err(e) => log::warn(&format!("failed to serialize save: {e}")),
        }

        if let Some(hook) = &self.refresh_hook {
            hook(&data.statistics);
        }
    }

    /// Wipe storage and re-initialize from the template (full reset).
    pub fn reset(&mut self, now_ms: f64) -> bool {
        self.backend.clear();
        self.data = None;
        self.load(now_ms)
    }

    pub fn is_loaded(&self) -> bool {
        self.data.is_some()
    }

    /// Live state, read-only. `None` until a successful `load()`.
    pub fn data(&self) -> Option<&SaveData> {
        self.data.as_ref()
    }

    fn persist(&self, data: &SaveData) {
        match serde_json::to_string(data) {
            Ok(json) => self.backend.write(&json),
            Err(e) => log::warn(&format!("failed to serialize save: {e}")),
        }
    }

    // ── Typed update primitives ────────────────────────────────

    pub fn set_single_score(&mut self, score: u64) {
        if let Some(data) = self.data.as_mut() {
            data.single_score = score;
        }
    }

    /// Spend from the unspent score. Rejects without mutation when the
    /// balance is short.
    pub fn debit_score(&mut self, cost: u64) -> bool {
        match self.data.as_mut() {
            Some(data) if data.single_score >= cost => {
                data.single_score -= cost;
                true
            }
            _ => false,
        }
    }

    pub fn set_next_auto_time(&mut self, epoch_ms: f64) {
        if let Some(data) = self.data.as_mut() {
            data.next_auto_time = epoch_ms;
        }
    }

    /// Trimmed and capped at [`MAX_NAME_LEN`] characters. A name that is
    /// empty after trimming is ignored.
    pub fn set_name(&mut self, name: &str) {
        if let Some(data) = self.data.as_mut() {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return;
            }
            data.name = trimmed.chars().take(MAX_NAME_LEN).collect();
        }
    }

    pub fn set_sound(&mut self, on: bool) {
        if let Some(data) = self.data.as_mut() {
            data.settings.sound = on;
        }
    }

    pub fn set_background(&mut self, background: String) {
        if let Some(data) = self.data.as_mut() {
            data.settings.background = background;
        }
    }

    /// Bump the tier of one upgrade axis by one.
    pub fn increment_upgrade(&mut self, axis: UpgradeAxis) {
        let Some(data) = self.data.as_mut() else {
            return;
        };
        match axis {
            UpgradeAxis::Circle(ty, circle_axis) => {
                let Some(levels) = data.upgrade_level.circle.get_mut(&ty) else {
                    log::warn(&format!("no upgrade slot for circle type {}", ty.label()));
                    return;
                };
                match circle_axis {
                    CircleAxis::CriticalChance => levels.critical_chance += 1,
                    CircleAxis::Score => levels.score += 1,
                }
            }
            UpgradeAxis::Bot(bot_axis) => {
                let bot = &mut data.upgrade_level.botclicker;
                match bot_axis {
                    BotAxis::ClickSpeed => bot.clickspeed += 1,
                    BotAxis::Duration => bot.duration += 1,
                    BotAxis::RefillTime => bot.refilltime += 1,
                }
            }
        }
    }

    /// Per-type click counter. Silent no-op when the template never defined
    /// the key.
    pub fn increment_circle_click(&mut self, ty: CircleType) {
        if let Some(data) = self.data.as_mut() {
            if let Some(count) = data.statistics.total_clicks.get_mut(&ty) {
                *count += 1;
            }
        }
    }

    /// Update the manual clicks-per-second record. Returns true on a new
    /// record.
    pub fn record_manual_cps(&mut self, cps: f64) -> bool {
        match self.data.as_mut() {
            Some(data) if cps > data.statistics.highest_manual_clicks_per_second => {
                data.statistics.highest_manual_clicks_per_second = cps;
                true
            }
            _ => false,
        }
    }

    pub fn record_sps(&mut self, sps: f64) -> bool {
        match self.data.as_mut() {
            Some(data) if sps > data.statistics.highest_score_per_second => {
                data.statistics.highest_score_per_second = sps;
                true
            }
            _ => false,
        }
    }

    pub fn record_auto_score(&mut self, session_score: u64) -> bool {
        match self.data.as_mut() {
            Some(data) if session_score > data.statistics.highest_single_auto_score => {
                data.statistics.highest_single_auto_score = session_score;
                true
            }
            _ => false,
        }
    }
}
