//! Dodge and crit chance tables

use crate::config::CombatConstants;
use crate::player::Player;
use crate::types::{Enemy, EnemyType};
use loot_core::{DamageType, Rarity};

/// What combat needs to know about the player's weapon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WeaponProfile {
    pub rarity: Rarity,
    pub damage_type: DamageType,
}

impl WeaponProfile {
    /// The equipped weapon, else the legacy weapon, else a common physical one
    pub fn of(player: &Player) -> Self {
        if let Some(weapon) = player.weapon() {
            return WeaponProfile {
                rarity: weapon.rarity,
                damage_type: weapon.damage_type.unwrap_or_default(),
            };
        }
        if let Some(ref legacy) = player.legacy_weapon {
            return WeaponProfile {
                rarity: legacy.rarity,
                damage_type: legacy.damage_type.unwrap_or_default(),
            };
        }
        WeaponProfile::default()
    }
}

/// Type base plus a level bonus capped at `level_cap`
pub fn enemy_dodge_chance(enemy: &Enemy, combat: &CombatConstants) -> f64 {
    let table = &combat.enemy_dodge;
    let base = match enemy.enemy_type {
        EnemyType::Melee => table.melee,
        EnemyType::Ranged => table.ranged,
        EnemyType::Caster => table.caster,
        EnemyType::Other => table.other,
    };
    base + (f64::from(enemy.level) * table.per_level).min(table.level_cap)
}

/// Weapon-rarity dodge plus the legacy agility skill
pub fn player_dodge_chance(player: &Player, weapon: &WeaponProfile, combat: &CombatConstants) -> f64 {
    let agility = player.legacy_skills.map_or(0, |skills| skills.agility);
    combat.weapon_dodge.get(weapon.rarity) + f64::from(agility) * combat.agility_dodge_per_level
}

/// Weapon-rarity crit, with a bonus for lightning weapons
pub fn player_crit_chance(weapon: &WeaponProfile, combat: &CombatConstants) -> f64 {
    let bonus = if weapon.damage_type == DamageType::Lightning {
        combat.lightning_crit_bonus
    } else {
        0.0
    };
    combat.weapon_crit.get(weapon.rarity) + bonus
}
