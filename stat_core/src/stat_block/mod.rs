//! Stat aggregation: player inputs in, derived stats out
//!
//! Every pass starts from the baseline and re-derives everything, so running
//! it twice gives the same player as running it once.

mod aggregator;

pub use aggregator::{apply_attribute, StatAccumulator};

use crate::config::{constants, ClampConstants, GameConstants};
use crate::passive::PassiveTree;
use crate::player::{DerivedStats, Player};
use crate::source::{GearSource, PassiveTreeSource, StatSource};
use crate::types::{Attribute, LegacySkills};
use loot_core::{EquipmentStats, LegacyItem, LegacyKey};

/// Recompute a player's derived stats using the global constants
pub fn calculate_player_stats(player: &Player, tree: &PassiveTree) -> Player {
    calculate_player_stats_with(player, tree, constants())
}

pub fn calculate_player_stats_with(player: &Player, tree: &PassiveTree, constants: &GameConstants) -> Player {
    let (stats, totals) = derive_stats_with(player, tree, constants);
    let mut next = player.clone();
    next.hp = clamp_resource(player.hp, stats.max_hp);
    next.mana = clamp_resource(player.mana, stats.max_mana);
    next.stats = stats;
    next.calculated_stats = totals;
    next
}

/// Derived stats plus the equipment+passive totals, using the global constants
pub fn derive_stats(player: &Player, tree: &PassiveTree) -> (DerivedStats, EquipmentStats) {
    derive_stats_with(player, tree, constants())
}

pub fn derive_stats_with(
    player: &Player,
    tree: &PassiveTree,
    constants: &GameConstants,
) -> (DerivedStats, EquipmentStats) {
    let coeffs = &constants.attributes;
    let mut stats = DerivedStats::baseline(constants);

    for attribute in Attribute::all() {
        let delta = player.attributes.over_baseline(*attribute);
        if delta != 0 {
            apply_attribute(&mut stats, *attribute, f64::from(delta), coeffs);
        }
    }

    if let Some(skills) = player.legacy_skills {
        apply_legacy_skills(&mut stats, &skills, constants);
    }

    let gear = GearSource::new(&player.equipment, &player.stones);
    let passives = PassiveTreeSource::new(tree, &player.passive_tree);
    let mut sources: [&dyn StatSource; 2] = [&gear, &passives];
    sources.sort_by_key(|source| source.priority());

    let mut acc = StatAccumulator::new();
    for source in sources {
        source.apply(&mut acc);
    }
    acc.apply_to(&mut stats);

    // Gear and tree attribute points cascade like base attributes, with no
    // baseline to subtract
    for (attribute, points) in acc.attribute_points() {
        apply_attribute(&mut stats, attribute, points, coeffs);
    }

    if let Some(ref weapon) = player.legacy_weapon {
        apply_legacy_weapon(&mut stats, weapon);
    }

    clamp_stats(&mut stats, &constants.clamps);

    tracing::debug!(
        dps = stats.dps,
        max_hp = stats.max_hp,
        crit = stats.crit_chance,
        dodge = stats.dodge_chance,
        items = player.equipment.len(),
        "player stats derived"
    );

    (stats, acc.into_totals())
}

fn apply_legacy_skills(stats: &mut DerivedStats, skills: &LegacySkills, constants: &GameConstants) {
    let coeffs = &constants.attributes;
    apply_attribute(stats, Attribute::Strength, f64::from(skills.strength), coeffs);
    stats.crit_chance += f64::from(skills.precision) * coeffs.dexterity_crit;
    stats.dodge_chance += f64::from(skills.agility) * coeffs.dexterity_dodge;
    apply_attribute(stats, Attribute::Vitality, f64::from(skills.resilience), coeffs);
}

fn apply_legacy_weapon(stats: &mut DerivedStats, weapon: &LegacyItem) {
    if weapon.power.is_finite() {
        stats.dps += weapon.power;
    }
    for extra in weapon.extras.iter().filter(|e| e.value.is_finite()) {
        let field = match extra.key {
            LegacyKey::Hp => &mut stats.max_hp,
            LegacyKey::Dps => &mut stats.dps,
            LegacyKey::CritChance => &mut stats.crit_chance,
            LegacyKey::DodgeChance => &mut stats.dodge_chance,
            LegacyKey::LifeSteal => &mut stats.life_steal,
            LegacyKey::Armor => &mut stats.armor,
            LegacyKey::ProjectileSpeed => &mut stats.projectile_speed,
            LegacyKey::Unknown => continue,
        };
        *field += extra.value;
    }
}

/// Clamp into [0, max]; NaN becomes 0
fn clamp_chance(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.max(0.0).min(max)
    }
}

fn clamp_resource(current: f64, max: f64) -> f64 {
    if current.is_nan() {
        max
    } else {
        current.min(max)
    }
}

fn clamp_stats(stats: &mut DerivedStats, clamps: &ClampConstants) {
    stats.crit_chance = clamp_chance(stats.crit_chance, clamps.max_crit_chance);
    stats.dodge_chance = clamp_chance(stats.dodge_chance, clamps.max_dodge_chance);
    stats.block_chance = clamp_chance(stats.block_chance, clamps.max_block_chance);
    stats.life_steal = clamp_chance(stats.life_steal, clamps.max_life_steal);
}
