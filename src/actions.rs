//! Semantic action IDs for click targets.
//!
//! Registered during render, dispatched by the mouse handler in `main`.

use crate::state::CircleType;
use crate::upgrade::{BotAxis, CircleAxis, UpgradeAxis};

// ── Core ───────────────────────────────────────────────────────
/// The "start bot" button.
pub const AUTO_BUTTON: u16 = 1;

// ── Panel tabs ─────────────────────────────────────────────────
pub const TAB_CIRCLES: u16 = 10;
pub const TAB_BOT: u16 = 11;
pub const TAB_STATS: u16 = 12;
pub const TAB_SETTINGS: u16 = 13;

// ── Playfield circles (base + index into the live circle list) ──
pub const CIRCLE_TARGET_BASE: u16 = 100;

// ── Circle upgrades (base + type index * 2 + axis) ──────────────
pub const BUY_CIRCLE_BASE: u16 = 200;

// ── Bot upgrades (base + 0 clickspeed / 1 duration / 2 refill) ──
pub const BUY_BOT_BASE: u16 = 300;

// ── Settings rows ───────────────────────────────────────────────
pub const SETTINGS_TOGGLE_SOUND: u16 = 400;
pub const SETTINGS_CYCLE_BACKGROUND: u16 = 401;
pub const SETTINGS_RENAME: u16 = 402;
pub const SETTINGS_RESET: u16 = 403;

/// Action ID for buying a circle upgrade axis.
pub fn buy_circle_action(ty: CircleType, axis: CircleAxis) -> u16 {
    let axis_bit = match axis {
        CircleAxis::CriticalChance => 0,
        CircleAxis::Score => 1,
    };
    BUY_CIRCLE_BASE + ty.index() as u16 * 2 + axis_bit
}

/// Inverse of [`buy_circle_action`] plus the bot range: decode a buy action
/// ID back into an upgrade axis.
pub fn decode_buy_action(action: u16) -> Option<UpgradeAxis> {
    if (BUY_BOT_BASE..BUY_BOT_BASE + 3).contains(&action) {
        let axis = match action - BUY_BOT_BASE {
            0 => BotAxis::ClickSpeed,
            1 => BotAxis::Duration,
            _ => BotAxis::RefillTime,
        };
        return Some(UpgradeAxis::Bot(axis));
    }
    let types = CircleType::all();
    let span = types.len() as u16 * 2;
    if (BUY_CIRCLE_BASE..BUY_CIRCLE_BASE + span).contains(&action) {
        let offset = action - BUY_CIRCLE_BASE;
        let ty = types[(offset / 2) as usize];
        let axis = if offset % 2 == 0 {
            CircleAxis::CriticalChance
        } else {
            CircleAxis::Score
        };
        return Some(UpgradeAxis::Circle(ty, axis));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_buy_actions_round_trip() {
        for &ty in CircleType::all() {
            for axis in [CircleAxis::CriticalChance, CircleAxis::Score] {
                let action = buy_circle_action(ty, axis);
                assert_eq!(decode_buy_action(action), Some(UpgradeAxis::Circle(ty, axis)));
            }
        }
    }

    #[test]
    fn bot_buy_actions_decode() {
        assert_eq!(
            decode_buy_action(BUY_BOT_BASE),
            Some(UpgradeAxis::Bot(BotAxis::ClickSpeed))
        );
        assert_eq!(
            decode_buy_action(BUY_BOT_BASE + 2),
            Some(UpgradeAxis::Bot(BotAxis::RefillTime))
        );
    }

    #[test]
    fn unrelated_actions_do_not_decode() {
        assert_eq!(decode_buy_action(AUTO_BUTTON), None);
        assert_eq!(decode_buy_action(TAB_STATS), None);
        assert_eq!(decode_buy_action(CIRCLE_TARGET_BASE), None);
        assert_eq!(decode_buy_action(BUY_BOT_BASE + 3), None);
    }

    #[test]
    fn buy_ranges_do_not_collide() {
        let span = CircleType::all().len() as u16 * 2;
        assert!(BUY_CIRCLE_BASE + span <= BUY_BOT_BASE);
        assert!(CIRCLE_TARGET_BASE + 64 <= BUY_CIRCLE_BASE);
    }
}
