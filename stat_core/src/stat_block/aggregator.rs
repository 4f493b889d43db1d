//! StatAccumulator - Collects equipment and passive contributions before
//! applying them to the derived stats

use crate::config::AttributeConstants;
use crate::player::DerivedStats;
use crate::types::Attribute;
use loot_core::{EquipmentStats, Stat};

/// Accumulates stat contributions from every [`StatSource`](crate::source::StatSource)
///
/// Backed by the ordered stat map, so the totals are summed in the same order
/// on every pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatAccumulator {
    totals: EquipmentStats,
}

impl StatAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, stat: Stat, value: f64) {
        if stat == Stat::Unknown {
            tracing::debug!(value, "unknown stat contribution ignored");
        } else if value.is_finite() {
            self.totals.add(stat, value);
        } else {
            tracing::warn!(%stat, value, "non-finite stat contribution ignored");
        }
    }

    /// Add a stat map; the resistance sub-map is not part of aggregation
    pub fn add_stats(&mut self, stats: &EquipmentStats) {
        for (stat, value) in stats.iter() {
            self.add(stat, value);
        }
    }

    pub fn get(&self, stat: Stat) -> f64 {
        self.totals.get(stat)
    }

    pub fn totals(&self) -> &EquipmentStats {
        &self.totals
    }

    pub fn into_totals(self) -> EquipmentStats {
        self.totals
    }

    /// Attribute points granted by gear and passives
    pub fn attribute_points(&self) -> impl Iterator<Item = (Attribute, f64)> + '_ {
        Attribute::all()
            .iter()
            .map(move |attribute| (*attribute, self.get(attribute.stat())))
            .filter(|(_, points)| *points != 0.0)
    }

    /// Add flat and percent totals onto their derived fields
    ///
    /// Stats without a derived field (elemental damage, resistances, find
    /// bonuses) stay in the totals only.
    pub fn apply_to(&self, stats: &mut DerivedStats) {
        stats.dps += self.get(Stat::Damage);
        stats.armor += self.get(Stat::Armor);
        stats.max_hp += self.get(Stat::Health);
        stats.max_mana += self.get(Stat::Mana);
        stats.crit_chance += self.get(Stat::CritChance);
        stats.dodge_chance += self.get(Stat::DodgeChance);
        stats.block_chance += self.get(Stat::BlockChance);
        stats.life_steal += self.get(Stat::LifeSteal);
        stats.attack_speed += self.get(Stat::AttackSpeed);
        stats.health_regen += self.get(Stat::HealthRegen);
        stats.mana_regen += self.get(Stat::ManaRegen);
        stats.projectile_speed += self.get(Stat::ProjectileSpeed);
    }
}

/// Add `points` of an attribute to the derived stats
///
/// Strength raises both `base_dps` and `dps` so the two stay in step whether
/// this runs before or after gear damage is added.
pub fn apply_attribute(stats: &mut DerivedStats, attribute: Attribute, points: f64, coeffs: &AttributeConstants) {
    match attribute {
        Attribute::Strength => {
            stats.base_dps += points * coeffs.strength_dps;
            stats.dps += points * coeffs.strength_dps;
            stats.max_hp += points * coeffs.strength_hp;
        }
        Attribute::Dexterity => {
            stats.crit_chance += points * coeffs.dexterity_crit;
            stats.dodge_chance += points * coeffs.dexterity_dodge;
        }
        Attribute::Intelligence => {
            stats.max_mana += points * coeffs.intelligence_mana;
            stats.mana_regen += points * coeffs.intelligence_mana_regen;
        }
        Attribute::Vitality => {
            stats.max_hp += points * coeffs.vitality_hp;
            stats.health_regen += points * coeffs.vitality_health_regen;
        }
        Attribute::Luck => {
            stats.crit_chance += points * coeffs.luck_crit;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_to_maps_stats_onto_fields() {
        let mut acc = StatAccumulator::new();
        acc.add(Stat::Damage, 5.0);
        acc.add(Stat::Health, 20.0);
        acc.add(Stat::CritChance, 0.1);
        acc.add(Stat::FireResistance, 0.3);

        let mut stats = DerivedStats::default();
        acc.apply_to(&mut stats);
        assert_eq!(stats.dps, 7.0);
        assert_eq!(stats.base_dps, 2.0);
        assert_eq!(stats.max_hp, 140.0);
        assert_eq!(stats.crit_chance, 0.1);
        assert_eq!(acc.get(Stat::FireResistance), 0.3);
    }

    #[test]
    fn test_non_finite_contribution_dropped() {
        let mut acc = StatAccumulator::new();
        acc.add(Stat::Armor, f64::NAN);
        acc.add(Stat::Armor, f64::INFINITY);
        assert!(!acc.totals().contains(Stat::Armor));
    }

    #[test]
    fn test_unknown_stat_contribution_dropped() {
        let mut acc = StatAccumulator::new();
        acc.add(Stat::Unknown, 12.0);
        acc.add(Stat::Damage, 1.0);
        assert!(!acc.totals().contains(Stat::Unknown));
        assert_eq!(acc.get(Stat::Damage), 1.0);
    }

    #[test]
    fn test_attribute_points_skip_zero() {
        let mut acc = StatAccumulator::new();
        acc.add(Stat::Strength, 3.0);
        acc.add(Stat::Damage, 1.0);
        let points: Vec<_> = acc.attribute_points().collect();
        assert_eq!(points, vec![(Attribute::Strength, 3.0)]);
    }

    #[test]
    fn test_apply_attribute_strength() {
        let mut stats = DerivedStats::default();
        apply_attribute(&mut stats, Attribute::Strength, 4.0, &AttributeConstants::default());
        assert_eq!(stats.base_dps, 4.0);
        assert_eq!(stats.dps, 4.0);
        assert_eq!(stats.max_hp, 128.0);
    }
}
