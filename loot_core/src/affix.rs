//! Affix rolling: weighted choice without replacement on stat

use crate::config::AffixConfig;
use crate::item::Affix;
use crate::rng::{roll_int, weighted_choice};
use crate::types::round2;
use rand::Rng;

/// Highest tier unlocked at a level: one tier per ten levels, capped at 3
pub fn max_tier_for_level(level: u32) -> u32 {
    (level / 10 + 1).min(3)
}

/// Scale an affix's base value by level and rarity, rounded to 2 decimals
pub fn scale_affix_value(value: f64, level: u32, rarity_multiplier: f64) -> f64 {
    let level_factor = 1.0 + level.saturating_sub(1) as f64 * 0.05;
    round2(value * level_factor * rarity_multiplier)
}

/// Roll a set of affixes from a themed pool
///
/// The count is uniform in `count_range` (inclusive). Each draw is a weighted
/// choice over the remaining candidates; once a stat has been chosen every
/// other candidate carrying that stat is removed, so no two affixes on one
/// item share a stat. Rolling stops early when the pool runs dry.
pub fn roll_affixes<R: Rng + ?Sized>(
    pool: &[AffixConfig],
    level: u32,
    rarity_multiplier: f64,
    count_range: (u32, u32),
    rng: &mut R,
) -> Vec<Affix> {
    let (min, max) = count_range;
    let count = roll_int(rng, min, max);

    let max_tier = max_tier_for_level(level);
    let mut candidates: Vec<&AffixConfig> = pool.iter().filter(|a| a.tier <= max_tier).collect();

    let mut rolled = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let chosen = match weighted_choice(rng, &candidates, |a| a.weight) {
            Some(affix) => *affix,
            None => break,
        };

        rolled.push(Affix {
            name: chosen.name.clone(),
            stat: chosen.stat,
            value: scale_affix_value(chosen.value, level, rarity_multiplier),
            tier: chosen.tier,
        });
        candidates.retain(|a| a.stat != chosen.stat);
    }

    rolled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::builtin_config;
    use crate::rng::ScriptedRng;
    use crate::types::Stat;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn entry(name: &str, stat: Stat, value: f64, tier: u32, weight: f64) -> AffixConfig {
        AffixConfig {
            name: name.to_string(),
            stat,
            value,
            tier,
            weight,
        }
    }

    #[test]
    fn test_max_tier_for_level() {
        assert_eq!(max_tier_for_level(1), 1);
        assert_eq!(max_tier_for_level(9), 1);
        assert_eq!(max_tier_for_level(10), 2);
        assert_eq!(max_tier_for_level(20), 3);
        assert_eq!(max_tier_for_level(99), 3);
    }

    #[test]
    fn test_scale_affix_value() {
        // level 1: no level scaling
        assert_eq!(scale_affix_value(2.0, 1, 1.0), 2.0);
        // level 11: 1 + 10 * 0.05 = 1.5, rare 1.5 => 2 * 2.25 = 4.5
        assert_eq!(scale_affix_value(2.0, 11, 1.5), 4.5);
        assert_eq!(scale_affix_value(0.013, 1, 1.0), 0.01);
    }

    #[test]
    fn test_no_duplicate_stats() {
        let pool = vec![
            entry("a", Stat::Damage, 1.0, 1, 100.0),
            entry("b", Stat::Damage, 2.0, 1, 100.0),
            entry("c", Stat::Armor, 1.0, 1, 1.0),
        ];
        // Ask for more affixes than there are distinct stats
        let mut rng = ScriptedRng::constant(0.0);
        let affixes = roll_affixes(&pool, 1, 1.0, (3, 3), &mut rng);
        assert_eq!(affixes.len(), 2);
        assert_eq!(affixes[0].stat, Stat::Damage);
        assert_eq!(affixes[1].stat, Stat::Armor);
    }

    #[test]
    fn test_tier_filter_excludes_high_tiers_at_low_level() {
        let pool = vec![
            entry("low", Stat::Damage, 1.0, 1, 1.0),
            entry("high", Stat::Armor, 1.0, 3, 1000.0),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..50 {
            let affixes = roll_affixes(&pool, 5, 1.0, (1, 2), &mut rng);
            assert!(affixes.iter().all(|a| a.tier == 1));
        }
    }

    #[test]
    fn test_empty_pool_rolls_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(roll_affixes(&[], 50, 3.0, (4, 5), &mut rng).is_empty());
    }

    #[test]
    fn test_builtin_pools_never_repeat_stats() {
        let config = builtin_config();
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        for level in [1, 15, 40, 80] {
            for _ in 0..200 {
                let affixes = roll_affixes(&config.affixes.weapon, level, 3.0, (4, 5), &mut rng);
                let stats: HashSet<_> = affixes.iter().map(|a| a.stat).collect();
                assert_eq!(stats.len(), affixes.len());
            }
        }
    }
}
