//! Progression tables: level thresholds, per-circle upgrade tiers and bot
//! tiers. Bundled as a JSON resource, parsed and validated once at startup,
//! immutable for the rest of the session.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use crate::state::CircleType;

/// Bundled configuration resource.
const TABLES_JSON: &str = include_str!("../res/circle_table.json");

/// Fatal-at-startup configuration failures. Once the game is running no error
/// in this crate is fatal; this one prevents it from starting at all.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse progression tables: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid progression tables: {0}")]
    Invalid(String),
}

/// One purchasable tier of an upgrade axis. `value` semantics depend on the
/// axis: points for score tiers, probability for critical tiers, milliseconds
/// for clickspeed, seconds for duration/refilltime.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Tier {
    pub cost: u64,
    pub value: f64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelEntry {
    /// Cumulative score required to hold this level.
    pub max: u64,
    /// Concurrently spawned circles at this level.
    #[serde(rename = "max-popup")]
    pub max_popup: usize,
    /// Spawnable types, parallel to `popup_type_rate`.
    pub available_type: Vec<CircleType>,
    pub popup_type_rate: Vec<f64>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CircleTable {
    pub critical_chance: Vec<Tier>,
    pub score: Vec<Tier>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BotTable {
    pub clickspeed: Vec<Tier>,
    pub duration: Vec<Tier>,
    pub refilltime: Vec<Tier>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProgressionTables {
    pub level_table: BTreeMap<u32, LevelEntry>,
    pub circle_table: BTreeMap<CircleType, CircleTable>,
    pub botclicker_table: BotTable,
}

impl ProgressionTables {
    pub fn level(&self, n: u32) -> Option<&LevelEntry> {
        self.level_table.get(&n)
    }

    pub fn circle(&self, ty: CircleType) -> Option<&CircleTable> {
        self.circle_table.get(&ty)
    }

    /// Highest defined level number.
    pub fn max_level(&self) -> u32 {
        self.level_table.keys().next_back().copied().unwrap_or(1)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if !self.level_table.contains_key(&1) {
            return invalid("level_table must define level 1".into());
        }

        let mut prev_max: Option<u64> = None;
        for (n, entry) in &self.level_table {
            if let Some(prev) = prev_max {
                if entry.max <= prev {
                    return invalid(format!("level {n}: threshold must exceed level {}", n - 1));
                }
            }
            prev_max = Some(entry.max);

            if entry.available_type.is_empty() {
                return invalid(format!("level {n}: available_type is empty"));
            }
            if entry.available_type.len() != entry.popup_type_rate.len() {
                return invalid(format!(
                    "level {n}: popup_type_rate length {} does not match available_type length {}",
                    entry.popup_type_rate.len(),
                    entry.available_type.len()
                ));
            }
            if entry.popup_type_rate.iter().any(|r| *r < 0.0) {
                return invalid(format!("level {n}: negative popup_type_rate"));
            }
            if entry.max_popup == 0 {
                return invalid(format!("level {n}: max-popup must be at least 1"));
            }
        }

        for (ty, table) in &self.circle_table {
            check_ascending_costs(&table.critical_chance)
                .map_err(|e| ConfigError::Invalid(format!("{} critical_chance: {e}", ty.label())))?;
            check_ascending_costs(&table.score)
                .map_err(|e| ConfigError::Invalid(format!("{} score: {e}", ty.label())))?;
        }
        for (name, axis) in [
            ("clickspeed", &self.botclicker_table.clickspeed),
            ("duration", &self.botclicker_table.duration),
            ("refilltime", &self.botclicker_table.refilltime),
        ] {
            check_ascending_costs(axis)
                .map_err(|e| ConfigError::Invalid(format!("botclicker {name}: {e}")))?;
        }

        Ok(())
    }
}

fn check_ascending_costs(tiers: &[Tier]) -> Result<(), String> {
    for pair in tiers.windows(2) {
        if pair[1].cost <= pair[0].cost {
            return Err(format!(
                "tier costs must be strictly ascending ({} then {})",
                pair[0].cost, pair[1].cost
            ));
        }
    }
    Ok(())
}

/// Parse and validate the bundled tables. Failure here gates game start.
pub fn load_tables() -> Result<ProgressionTables, ConfigError> {
    parse_tables(TABLES_JSON)
}

fn parse_tables(json: &str) -> Result<ProgressionTables, ConfigError> {
    let tables: ProgressionTables = serde_json::from_str(json)?;
    tables.validate()?;
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_tables_parse_and_validate() {
        let tables = load_tables().expect("bundled tables must be valid");
        assert!(tables.level(1).is_some());
        assert_eq!(tables.level(1).unwrap().max, 0);
        assert!(tables.max_level() >= 2);
        // Every circle type has an upgrade table.
        for ty in CircleType::all() {
            assert!(tables.circle(*ty).is_some(), "missing table for {}", ty.label());
        }
    }

    #[test]
    fn every_level_references_known_types_only() {
        let tables = load_tables().unwrap();
        for entry in tables.level_table.values() {
            for ty in &entry.available_type {
                assert!(CircleType::all().contains(ty));
            }
        }
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = parse_tables("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = parse_tables(
            r#"{ "level_table": {}, "circle_table": {}, "botclicker_table":
                 { "clickspeed": [], "duration": [], "refilltime": [] },
               "extra_table": {} }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_level_one_is_invalid() {
        let err = parse_tables(
            r#"{ "level_table": { "2": { "max": 100, "max-popup": 3,
                 "available_type": ["c1"], "popup_type_rate": [1.0] } },
               "circle_table": {},
               "botclicker_table": { "clickspeed": [], "duration": [], "refilltime": [] } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn non_ascending_thresholds_are_invalid() {
        let err = parse_tables(
            r#"{ "level_table": {
                 "1": { "max": 0, "max-popup": 3, "available_type": ["c1"], "popup_type_rate": [1.0] },
                 "2": { "max": 0, "max-popup": 4, "available_type": ["c1"], "popup_type_rate": [1.0] } },
               "circle_table": {},
               "botclicker_table": { "clickspeed": [], "duration": [], "refilltime": [] } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rate_length_mismatch_is_invalid() {
        let err = parse_tables(
            r#"{ "level_table": {
                 "1": { "max": 0, "max-popup": 3, "available_type": ["c1", "c2"], "popup_type_rate": [1.0] } },
               "circle_table": {},
               "botclicker_table": { "clickspeed": [], "duration": [], "refilltime": [] } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn non_ascending_tier_costs_are_invalid() {
        let err = parse_tables(
            r#"{ "level_table": {
                 "1": { "max": 0, "max-popup": 3, "available_type": ["c1"], "popup_type_rate": [1.0] } },
               "circle_table": {
                 "c1": { "critical_chance": [ { "cost": 100, "value": 0.05 },
                                              { "cost": 100, "value": 0.1 } ],
                         "score": [] } },
               "botclicker_table": { "clickspeed": [], "duration": [], "refilltime": [] } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn bundled_tier_lists_ascend_in_cost_and_tier() {
        let tables = load_tables().unwrap();
        for table in tables.circle_table.values() {
            assert!(!table.score.is_empty());
            assert!(!table.critical_chance.is_empty());
        }
        // Duration values grow with tier; clickspeed values shrink (faster).
        let bot = &tables.botclicker_table;
        assert!(bot.duration.windows(2).all(|w| w[1].value > w[0].value));
        assert!(bot.clickspeed.windows(2).all(|w| w[1].value < w[0].value));
    }
}
