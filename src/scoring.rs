//! Point resolution for a single circle hit.

use crate::config::ProgressionTables;
use crate::log;
use crate::save::CircleUpgrades;
use crate::state::CircleType;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HitResult {
    pub points: u64,
    pub critical: bool,
}

/// Points a hit on `ty` is worth at the given score tier. Tier 0 is the
/// type's intrinsic value; a tier pointing past the table falls back to the
/// intrinsic value with a warning.
pub fn base_points(tables: &ProgressionTables, ty: CircleType, tier: u32) -> u64 {
    if tier == 0 {
        return ty.base_points();
    }
    match tables
        .circle(ty)
        .and_then(|t| t.score.get(tier as usize - 1))
    {
        Some(entry) => entry.value as u64,
        None => {
            log::warn(&format!(
                "no score entry for {} tier {tier}, using intrinsic value",
                ty.label()
            ));
            ty.base_points()
        }
    }
}

/// Critical probability at the given crit tier. Tier 0 and missing entries
/// resolve to 0.0 (the latter with a warning).
pub fn critical_chance(tables: &ProgressionTables, ty: CircleType, tier: u32) -> f64 {
    if tier == 0 {
        return 0.0;
    }
    match tables
        .circle(ty)
        .and_then(|t| t.critical_chance.get(tier as usize - 1))
    {
        Some(entry) => entry.value,
        None => {
            log::warn(&format!(
                "no crit entry for {} tier {tier}, treating as 0",
                ty.label()
            ));
            0.0
        }
    }
}

/// Resolve one hit. `roll` is a `[0,1)` uniform sample supplied by the
/// caller; a hit is critical iff `roll < chance` (strict), and criticals
/// double the base points exactly.
pub fn resolve_hit(
    tables: &ProgressionTables,
    ty: CircleType,
    levels: &CircleUpgrades,
    roll: f64,
) -> HitResult {
    let base = base_points(tables, ty, levels.score);
    let critical = roll < critical_chance(tables, ty, levels.critical_chance);
    HitResult {
        points: if critical { base * 2 } else { base },
        critical,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_tables;

    fn tables() -> ProgressionTables {
        load_tables().unwrap()
    }

    fn levels(critical_chance: u32, score: u32) -> CircleUpgrades {
        CircleUpgrades { critical_chance, score }
    }

    #[test]
    fn tier_zero_scores_the_intrinsic_value() {
        let tables = tables();
        assert_eq!(base_points(&tables, CircleType::C1, 0), 1);
        assert_eq!(base_points(&tables, CircleType::C16, 0), 16);
        assert_eq!(base_points(&tables, CircleType::C64, 0), 64);
    }

    #[test]
    fn upgraded_tiers_read_the_score_table() {
        let tables = tables();
        assert_eq!(base_points(&tables, CircleType::C1, 1), 2);
        assert_eq!(base_points(&tables, CircleType::C1, 5), 12);
        assert_eq!(base_points(&tables, CircleType::C8, 3), 40);
    }

    #[test]
    fn tier_past_the_table_falls_back_to_intrinsic() {
        let tables = tables();
        assert_eq!(base_points(&tables, CircleType::C2, 99), 2);
    }

    #[test]
    fn crit_chance_is_zero_at_tier_zero_and_past_the_table() {
        let tables = tables();
        assert_eq!(critical_chance(&tables, CircleType::C4, 0), 0.0);
        assert_eq!(critical_chance(&tables, CircleType::C4, 99), 0.0);
        assert!((critical_chance(&tables, CircleType::C4, 2) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn forced_low_roll_crits_and_doubles_exactly() {
        let tables = tables();
        let hit = resolve_hit(&tables, CircleType::C4, &levels(1, 0), 0.0);
        assert!(hit.critical);
        assert_eq!(hit.points, 8);
    }

    #[test]
    fn forced_high_roll_never_crits() {
        let tables = tables();
        let hit = resolve_hit(&tables, CircleType::C4, &levels(5, 2), 0.999);
        assert!(!hit.critical);
        assert_eq!(hit.points, 12);
    }

    #[test]
    fn zero_chance_rejects_even_a_zero_roll() {
        let tables = tables();
        // roll < chance is strict: 0.0 < 0.0 is false.
        let hit = resolve_hit(&tables, CircleType::C1, &levels(0, 0), 0.0);
        assert!(!hit.critical);
        assert_eq!(hit.points, 1);
    }

    #[test]
    fn upgrades_compose_crit_and_score_tiers() {
        let tables = tables();
        let hit = resolve_hit(&tables, CircleType::C32, &levels(3, 4), 0.1);
        // crit tier 3 = 0.15 chance, roll 0.1 crits; score tier 4 = 256.
        assert!(hit.critical);
        assert_eq!(hit.points, 512);
    }
}
