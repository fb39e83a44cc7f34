//! Transient game state: circle types, live circle instances, score popups,
//! per-second window counters. Nothing in here is persisted; the durable
//! state lives in [`crate::save::SaveData`].

use serde::{Deserialize, Serialize};

use ratzilla::ratatui::style::Color;

use crate::bot::BotClicker;

/// The seven circle kinds. Serialized as `"c1"` .. `"c64"` in both the save
/// file and the progression tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CircleType {
    C1,
    C2,
    C4,
    C8,
    C16,
    C32,
    C64,
}

impl CircleType {
    /// All circle types in ascending value order.
    pub fn all() -> &'static [CircleType] {
        &[
            CircleType::C1,
            CircleType::C2,
            CircleType::C4,
            CircleType::C8,
            CircleType::C16,
            CircleType::C32,
            CircleType::C64,
        ]
    }

    /// Intrinsic points for an un-upgraded hit: the numeric suffix of the
    /// type identifier.
    pub fn base_points(&self) -> u64 {
        match self {
            CircleType::C1 => 1,
            CircleType::C2 => 2,
            CircleType::C4 => 4,
            CircleType::C8 => 8,
            CircleType::C16 => 16,
            CircleType::C32 => 32,
            CircleType::C64 => 64,
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            CircleType::C1 => "c1",
            CircleType::C2 => "c2",
            CircleType::C4 => "c4",
            CircleType::C8 => "c8",
            CircleType::C16 => "c16",
            CircleType::C32 => "c32",
            CircleType::C64 => "c64",
        }
    }

    /// Render width in terminal cells. Higher-value circles are smaller,
    /// so a crowded field stays readable.
    pub fn width(&self) -> u16 {
        match self {
            CircleType::C1 => 11,
            CircleType::C2 => 10,
            CircleType::C4 => 9,
            CircleType::C8 => 8,
            CircleType::C16 => 7,
            CircleType::C32 => 6,
            CircleType::C64 => 5,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            CircleType::C1 => Color::Gray,
            CircleType::C2 => Color::Green,
            CircleType::C4 => Color::Blue,
            CircleType::C8 => Color::Magenta,
            CircleType::C16 => Color::Yellow,
            CircleType::C32 => Color::LightRed,
            CircleType::C64 => Color::Red,
        }
    }

    pub fn index(&self) -> usize {
        CircleType::all().iter().position(|t| t == self).unwrap_or(0)
    }
}

/// A live circle on the playfield. Created on spawn, removed on hit or on a
/// level-driven population shrink.
#[derive(Clone, Debug)]
pub struct CircleInstance {
    pub id: u32,
    pub ty: CircleType,
    /// Top-left cell within the playfield, in playfield-local coordinates.
    pub col: u16,
    pub row: u16,
}

/// A floating score popup ("+8", "+16!" on criticals).
#[derive(Clone, Debug)]
pub struct Popup {
    pub text: String,
    pub col: u16,
    pub row: u16,
    pub color: Color,
    pub critical: bool,
    /// Remaining lifetime in ticks; counts down to despawn.
    pub life: u32,
    pub max_life: u32,
}

/// Which panel the side area shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Panel {
    Circles,
    Bot,
    Stats,
    Settings,
}

/// Transient session state owned by the engine.
pub struct GameState {
    /// Derived player level, recomputed from cumulative score. Never stored.
    pub level: u32,
    pub circles: Vec<CircleInstance>,
    next_circle_id: u32,
    pub popups: Vec<Popup>,

    /// Playfield size in cells (cols, rows); render updates it each frame so
    /// spawns land inside the visible area.
    pub playfield_cols: u16,
    pub playfield_rows: u16,

    /// Per-second window counters, reset every second by the engine.
    pub window_manual_clicks: u32,
    pub window_total_clicks: u32,
    pub window_points: u64,
    /// Last closed window values, for the CPS/SPS readout.
    pub display_cps: f64,
    pub display_sps: f64,

    pub bot: BotClicker,

    pub panel: Panel,
    /// Pending name edit in the settings panel; `None` when not renaming.
    pub rename_buffer: Option<String>,
    pub anim_frame: u32,
    /// xorshift32 state for all in-game randomness.
    rng_state: u32,
}

impl GameState {
    pub fn new(seed: u32) -> Self {
        Self {
            level: 1,
            circles: Vec::new(),
            next_circle_id: 0,
            popups: Vec::new(),
            playfield_cols: 48,
            playfield_rows: 18,
            window_manual_clicks: 0,
            window_total_clicks: 0,
            window_points: 0,
            display_cps: 0.0,
            display_sps: 0.0,
            bot: BotClicker::new(),
            panel: Panel::Circles,
            rename_buffer: None,
            anim_frame: 0,
            rng_state: if seed == 0 { 0x9e37_79b9 } else { seed },
        }
    }

    /// xorshift32: fast, deterministic, good enough for spawn jitter and
    /// critical rolls.
    pub fn next_random(&mut self) -> u32 {
        let mut x = self.rng_state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng_state = x;
        x
    }

    /// Uniform sample in `[0, 1)`.
    pub fn next_unit(&mut self) -> f64 {
        self.next_random() as f64 / (u32::MAX as f64 + 1.0)
    }

    pub fn alloc_circle_id(&mut self) -> u32 {
        let id = self.next_circle_id;
        self.next_circle_id = self.next_circle_id.wrapping_add(1);
        id
    }

    pub fn circle_index(&self, id: u32) -> Option<usize> {
        self.circles.iter().position(|c| c.id == id)
    }

    pub fn spawn_popup(&mut self, text: String, col: u16, row: u16, color: Color, critical: bool) {
        let life = if critical { 12 } else { 8 };
        self.popups.push(Popup {
            text,
            col,
            row,
            color,
            critical,
            life,
            max_life: life,
        });
    }

    /// Age popups by `delta_ticks` and drop the expired ones.
    pub fn decay_popups(&mut self, delta_ticks: u32) {
        for p in &mut self.popups {
            p.life = p.life.saturating_sub(delta_ticks);
        }
        self.popups.retain(|p| p.life > 0);
    }
}
