//! Equipment and stone generation

use crate::affix::roll_affixes;
use crate::config::{builtin_config, BaseTypeConfig, Config, StoneTypeConfig};
use crate::item::{Affix, Equipment, Sockets, Stone};
use crate::rng::{chance, cumulative_pick, pick, weighted_choice};
use crate::types::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

/// Stat scaling with item level: +10% per level above 1
pub fn level_multiplier(level: u32) -> f64 {
    1.0 + level.saturating_sub(1) as f64 * 0.1
}

/// Builds equipment and stones from a content configuration
#[derive(Debug, Clone, Copy)]
pub struct Generator<'c> {
    config: &'c Config,
}

impl Generator<'static> {
    /// A generator over the built-in sample content
    pub fn builtin() -> Self {
        Generator::new(builtin_config())
    }
}

impl<'c> Generator<'c> {
    pub fn new(config: &'c Config) -> Self {
        Generator { config }
    }

    pub fn config(&self) -> &'c Config {
        self.config
    }

    /// Generate a piece of equipment dropped at `level`
    pub fn generate_equipment<R: Rng + ?Sized>(
        &self,
        level: u32,
        from_boss: bool,
        rng: &mut R,
    ) -> Equipment {
        let level = level.max(1);
        let rarity = self.roll_rarity(level, from_boss, rng);
        let category = self.roll_category(level, rng);

        let bases = self.config.bases_in(category);
        let fallback;
        let base = match pick(rng, &bases) {
            Some(base) => *base,
            None => {
                tracing::warn!(%category, "no base types for category, using placeholder");
                fallback = placeholder_base(category);
                &fallback
            }
        };

        let damage_type = match category {
            ItemCategory::Weapon => Some(roll_damage_type(rarity, rng)),
            _ => None,
        };

        let rarity_multiplier = rarity.stat_multiplier();
        let base_stats = base
            .base_stats()
            .scaled(level_multiplier(level) * rarity_multiplier);

        let affixes = roll_affixes(
            self.config.affixes.for_category(category),
            level,
            rarity_multiplier,
            rarity.affix_count_range(),
            rng,
        );

        let prefix = damage_type.and_then(|dt| pick(rng, self.config.names.prefixes_for(dt)));
        let name = compose_name(
            prefix.map(|s| s.as_str()),
            &base.name,
            &affixes,
            &rarity.to_string(),
            level,
        );

        let capacity = rarity.socket_capacity();
        let sockets = (capacity > 0).then(|| Sockets::with_capacity(capacity));
        let value = gold_value(&base_stats, &affixes, level, rarity_multiplier, 0.0);

        Equipment {
            id: new_id("eq", rng),
            name,
            base_type: base.id.clone(),
            slot: base.slot,
            category,
            rarity,
            level,
            base_stats,
            affixes,
            damage_type,
            requirements: Some(requirements_for(category, level)),
            sockets,
            value,
        }
    }

    /// Generate a stone dropped at `level`
    pub fn generate_stone<R: Rng + ?Sized>(&self, level: u32, from_boss: bool, rng: &mut R) -> Stone {
        let level = level.max(1);
        let rolls = &self.config.rolls;
        let thresholds = rolls.stone.thresholds(level, rolls.level_cap, from_boss);
        let rarity = cumulative_pick(rng, &thresholds, StoneRarity::Common);

        let fallback;
        let stone_type = match pick(rng, &self.config.stone_types) {
            Some(stone_type) => stone_type,
            None => {
                tracing::warn!("no stone types configured, using placeholder");
                fallback = placeholder_stone();
                &fallback
            }
        };

        let rarity_multiplier = rarity.stat_multiplier();
        let base_stats = stone_type
            .base_stats()
            .scaled(level_multiplier(level) * rarity_multiplier);
        let affixes = roll_affixes(
            &self.config.affixes.stone,
            level,
            rarity_multiplier,
            rarity.affix_count_range(),
            rng,
        );

        let name = compose_name(None, &stone_type.name, &affixes, &rarity.to_string(), level);
        let base_value = stone_type.base_value * level_multiplier(level) * rarity_multiplier;
        let value = gold_value(&base_stats, &affixes, level, rarity_multiplier, base_value);

        Stone {
            id: new_id("st", rng),
            name,
            stone_type: stone_type.id.clone(),
            rarity,
            level,
            base_stats,
            affixes,
            socket_types: stone_type.socket_types.clone(),
            value,
        }
    }

    /// Deterministic equipment generation from a seed
    pub fn generate_equipment_seeded(&self, level: u32, from_boss: bool, seed: u64) -> Equipment {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.generate_equipment(level, from_boss, &mut rng)
    }

    /// Deterministic stone generation from a seed
    pub fn generate_stone_seeded(&self, level: u32, from_boss: bool, seed: u64) -> Stone {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.generate_stone(level, from_boss, &mut rng)
    }

    /// Roll an equipment rarity by cumulative thresholds; leftover mass is Common
    pub fn roll_rarity<R: Rng + ?Sized>(&self, level: u32, from_boss: bool, rng: &mut R) -> Rarity {
        let rolls = &self.config.rolls;
        let thresholds = rolls.equipment.thresholds(level, rolls.level_cap, from_boss);
        cumulative_pick(rng, &thresholds, Rarity::Common)
    }

    fn roll_category<R: Rng + ?Sized>(&self, level: u32, rng: &mut R) -> ItemCategory {
        let rolls = &self.config.rolls;
        let weights = rolls.categories.weights(level, rolls.level_cap);
        weighted_choice(rng, &weights, |(_, w)| *w)
            .map(|(category, _)| *category)
            .unwrap_or(ItemCategory::Weapon)
    }
}

/// Damage element for a weapon: elemental with the rarity's chance, the
/// element itself uniform
fn roll_damage_type<R: Rng + ?Sized>(rarity: Rarity, rng: &mut R) -> DamageType {
    if chance(rng, rarity.elemental_chance()) {
        pick(rng, DamageType::elements())
            .copied()
            .unwrap_or(DamageType::Physical)
    } else {
        DamageType::Physical
    }
}

/// "[prefix] base [suffix] (Rarity Lv N)"; the suffix comes from the
/// highest-tier affix
fn compose_name(prefix: Option<&str>, base: &str, affixes: &[Affix], rarity: &str, level: u32) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(3);
    if let Some(prefix) = prefix {
        parts.push(prefix);
    }
    parts.push(base);

    if let Some(affix) = Affix::highest_tier(affixes) {
        parts.push(&affix.name);
    }

    format!("{} ({} Lv {})", parts.join(" "), rarity, level)
}

/// Gold value: weighted stat sum scaled by level and rarity, at least 1
pub fn gold_value(
    base_stats: &EquipmentStats,
    affixes: &[Affix],
    level: u32,
    rarity_multiplier: f64,
    flat: f64,
) -> u64 {
    let base: f64 = base_stats
        .iter()
        .map(|(stat, value)| value.abs() * stat.value_weight())
        .sum::<f64>()
        + base_stats
            .resistance
            .values()
            .map(|value| value.abs() * Stat::FireResistance.value_weight())
            .sum::<f64>();

    let rolled: f64 = affixes
        .iter()
        .map(|a| {
            let tier_bonus = 1.0 + 0.25 * a.tier.saturating_sub(1) as f64;
            a.value.abs() * a.stat.value_weight() * tier_bonus
        })
        .sum();

    let raw = (base + rolled) * (1.0 + level as f64 * 0.1) * rarity_multiplier + flat.max(0.0);
    // `as` saturates and maps NaN to 0
    (raw.floor() as u64).max(1)
}

fn requirements_for(category: ItemCategory, level: u32) -> Requirements {
    match category {
        ItemCategory::Weapon => Requirements {
            level,
            strength: 10 + level / 2,
            ..Requirements::default()
        },
        ItemCategory::Armor => Requirements {
            level,
            strength: 8 + level / 3,
            ..Requirements::default()
        },
        ItemCategory::Accessory => Requirements {
            level,
            ..Requirements::default()
        },
    }
}

fn new_id<R: Rng + ?Sized>(prefix: &str, rng: &mut R) -> String {
    format!("{}-{:016x}", prefix, rng.gen::<u64>())
}

fn placeholder_base(category: ItemCategory) -> BaseTypeConfig {
    let slot = match category {
        ItemCategory::Weapon => EquipmentSlot::Weapon,
        ItemCategory::Armor => EquipmentSlot::Chest,
        ItemCategory::Accessory => EquipmentSlot::Ring,
    };
    BaseTypeConfig {
        id: "unknown".to_string(),
        name: "Relic".to_string(),
        slot,
        stats: BTreeMap::new(),
        resistance: BTreeMap::new(),
    }
}

fn placeholder_stone() -> StoneTypeConfig {
    StoneTypeConfig {
        id: "unknown".to_string(),
        name: "Pebble".to_string(),
        stats: BTreeMap::new(),
        socket_types: EquipmentSlot::all().to_vec(),
        base_value: 1.0,
    }
}
