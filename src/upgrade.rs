//! Upgrade resolution and purchasing.
//!
//! Every purchasable thing is addressed by a structured axis: a circle type
//! paired with one of its two upgrade tracks, or one of the three bot tracks.
//! Tier 0 means "never bought"; tier n indexes table entry n-1.

use crate::config::{ProgressionTables, Tier};
use crate::save::{SaveData, SaveStore};
use crate::state::CircleType;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CircleAxis {
    CriticalChance,
    Score,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BotAxis {
    ClickSpeed,
    Duration,
    RefillTime,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpgradeAxis {
    Circle(CircleType, CircleAxis),
    Bot(BotAxis),
}

impl UpgradeAxis {
    pub fn label(&self) -> String {
        match self {
            UpgradeAxis::Circle(ty, CircleAxis::CriticalChance) => {
                format!("{} crit chance", ty.label())
            }
            UpgradeAxis::Circle(ty, CircleAxis::Score) => format!("{} score", ty.label()),
            UpgradeAxis::Bot(BotAxis::ClickSpeed) => "bot click speed".to_string(),
            UpgradeAxis::Bot(BotAxis::Duration) => "bot duration".to_string(),
            UpgradeAxis::Bot(BotAxis::RefillTime) => "bot refill time".to_string(),
        }
    }
}

/// What buying an axis next would get you.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NextUpgrade {
    /// Every table entry already bought.
    Maxed,
    Tier { cost: u64, value: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PurchaseError {
    Maxed,
    InsufficientFunds,
    /// Store not loaded or the axis has no table.
    Unavailable,
}

/// Current owned tier for an axis.
pub fn owned_tier(save: &SaveData, axis: UpgradeAxis) -> u32 {
    match axis {
        UpgradeAxis::Circle(ty, circle_axis) => {
            let levels = save.circle_upgrades(ty);
            match circle_axis {
                CircleAxis::CriticalChance => levels.critical_chance,
                CircleAxis::Score => levels.score,
            }
        }
        UpgradeAxis::Bot(bot_axis) => {
            let bot = &save.upgrade_level.botclicker;
            match bot_axis {
                BotAxis::ClickSpeed => bot.clickspeed,
                BotAxis::Duration => bot.duration,
                BotAxis::RefillTime => bot.refilltime,
            }
        }
    }
}

fn axis_table<'a>(tables: &'a ProgressionTables, axis: UpgradeAxis) -> Option<&'a [Tier]> {
    match axis {
        UpgradeAxis::Circle(ty, circle_axis) => {
            let table = tables.circle(ty)?;
            Some(match circle_axis {
                CircleAxis::CriticalChance => table.critical_chance.as_slice(),
                CircleAxis::Score => table.score.as_slice(),
            })
        }
        UpgradeAxis::Bot(bot_axis) => {
            let table = &tables.botclicker_table;
            Some(match bot_axis {
                BotAxis::ClickSpeed => table.clickspeed.as_slice(),
                BotAxis::Duration => table.duration.as_slice(),
                BotAxis::RefillTime => table.refilltime.as_slice(),
            })
        }
    }
}

/// Resolve the next tier for an axis: `Maxed` once the owned tier reaches the
/// table length, otherwise the cost and value of the entry at the owned tier.
pub fn next_upgrade(
    tables: &ProgressionTables,
    save: &SaveData,
    axis: UpgradeAxis,
) -> Option<NextUpgrade> {
    let table = axis_table(tables, axis)?;
    let tier = owned_tier(save, axis) as usize;
    Some(match table.get(tier) {
        None => NextUpgrade::Maxed,
        Some(entry) => NextUpgrade::Tier {
            cost: entry.cost,
            value: entry.value,
        },
    })
}

/// Buy the next tier of an axis: debit the cost, bump the tier, persist.
/// Rejected purchases leave the save untouched.
pub fn purchase(
    store: &mut SaveStore,
    tables: &ProgressionTables,
    axis: UpgradeAxis,
    now_ms: f64,
) -> Result<f64, PurchaseError> {
    let save = store.data().ok_or(PurchaseError::Unavailable)?;
    let cost;
    let value;
    match next_upgrade(tables, save, axis).ok_or(PurchaseError::Unavailable)? {
        NextUpgrade::Maxed => return Err(PurchaseError::Maxed),
        NextUpgrade::Tier { cost: c, value: v } => {
            cost = c;
            value = v;
        }
    }

    if !store.debit_score(cost) {
        return Err(PurchaseError::InsufficientFunds);
    }
    store.increment_upgrade(axis);
    store.save(now_ms);
    Ok(value)
}
