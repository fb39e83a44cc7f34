//! Long-run progression simulator.
//! Run with: cargo test simulate_session -- --nocapture

#[cfg(test)]
mod tests {
    use crate::config::load_tables;
    use crate::engine::{ClickSource, Engine};
    use crate::level;
    use crate::save::{MemoryBackend, SaveStore};
    use crate::state::CircleType;
    use crate::upgrade::{self, BotAxis, CircleAxis, NextUpgrade, UpgradeAxis};

    fn all_axes() -> Vec<UpgradeAxis> {
        let mut axes: Vec<UpgradeAxis> = Vec::new();
        for &ty in CircleType::all() {
            axes.push(UpgradeAxis::Circle(ty, CircleAxis::CriticalChance));
            axes.push(UpgradeAxis::Circle(ty, CircleAxis::Score));
        }
        axes.push(UpgradeAxis::Bot(BotAxis::ClickSpeed));
        axes.push(UpgradeAxis::Bot(BotAxis::Duration));
        axes.push(UpgradeAxis::Bot(BotAxis::RefillTime));
        axes
    }

    /// Cheapest next tier we can buy while keeping half the balance. Spending
    /// lowers cumulative score, so an all-in buyer would pin itself below the
    /// level thresholds forever.
    fn find_purchase(engine: &Engine) -> Option<UpgradeAxis> {
        let data = engine.store.data()?;
        let mut best: Option<(u64, UpgradeAxis)> = None;
        for axis in all_axes() {
            if let Some(NextUpgrade::Tier { cost, .. }) =
                upgrade::next_upgrade(&engine.tables, data, axis)
            {
                if cost * 2 <= data.single_score
                    && best.as_ref().map_or(true, |(bc, _)| cost < *bc)
                {
                    best = Some((cost, axis));
                }
            }
        }
        best.map(|(_, axis)| axis)
    }

    #[test]
    fn simulate_session() {
        let tables = load_tables().unwrap();
        let backend = MemoryBackend::new();
        let mut store = SaveStore::new(Box::new(backend.clone()));
        assert!(store.load(0.0));
        let mut engine = Engine::new(tables, store, 0xC1C1);

        let mut now = 0.0_f64;
        let mut last_level = engine.state.level;
        let mut purchases = 0u32;

        // One simulated hour at 10 ticks/sec: a player clicking 5 times a
        // second, starting the bot whenever it is ready, buying greedily.
        for step in 0..36_000u32 {
            now += 100.0;

            if step % 2 == 0 {
                if let Some(c) = engine.state.circles.first() {
                    let id = c.id;
                    engine.circle_hit(id, ClickSource::Manual);
                }
            }
            engine.press_auto(now);
            if let Some(axis) = find_purchase(&engine) {
                engine.purchase(axis, now).unwrap();
                purchases += 1;
            }
            engine.tick(1, now);

            let level = engine.state.level;
            assert!(level >= last_level, "level regressed at step {step}");
            last_level = level;

            let cumulative = engine.store.data().unwrap().cumulative_score();
            let progress = level::progress_percent(&engine.tables, level, cumulative);
            assert!(
                (0.0..=100.0).contains(&progress),
                "progress {progress} out of bounds at step {step}"
            );

            let expected = engine.tables.level(level).unwrap().max_popup;
            assert_eq!(engine.state.circles.len(), expected);
        }

        println!(
            "after 1h: level {} cumulative {} purchases {}",
            engine.state.level,
            engine.store.data().unwrap().cumulative_score(),
            purchases
        );
        assert!(
            engine.state.level >= 4,
            "simulated hour stalled at level {}",
            engine.state.level
        );
        assert!(purchases > 0, "balance never allowed a purchase");
        let stats = &engine.store.data().unwrap().statistics;
        assert!(stats.highest_single_auto_score > 0);
        assert!(stats.highest_score_per_second > 0.0);

        // Mid-run persistence: a fresh process over the same storage sees
        // the identical save.
        engine.store.save(now);
        let snapshot = engine.store.data().unwrap().clone();
        let mut reloaded = SaveStore::new(Box::new(backend));
        assert!(reloaded.load(now));
        assert_eq!(*reloaded.data().unwrap(), snapshot);
    }
}
