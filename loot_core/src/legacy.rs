//! Flattened item shape for consumers predating the multi-slot system

use crate::item::Equipment;
use crate::types::{round2, DamageType, Rarity, Stat};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stat keys understood by the legacy single-weapon slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LegacyKey {
    Hp,
    Dps,
    CritChance,
    DodgeChance,
    LifeSteal,
    Armor,
    ProjectileSpeed,
    /// Keys written by newer or foreign saves; contribute nothing
    #[serde(other)]
    Unknown,
}

impl LegacyKey {
    /// Legacy key for a stat; `Damage` has none because it is folded into
    /// `power`
    pub fn for_stat(stat: Stat) -> Option<LegacyKey> {
        match stat {
            Stat::Health => Some(LegacyKey::Hp),
            Stat::CritChance => Some(LegacyKey::CritChance),
            Stat::DodgeChance => Some(LegacyKey::DodgeChance),
            Stat::LifeSteal => Some(LegacyKey::LifeSteal),
            Stat::Armor => Some(LegacyKey::Armor),
            Stat::ProjectileSpeed => Some(LegacyKey::ProjectileSpeed),
            _ => None,
        }
    }
}

impl fmt::Display for LegacyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LegacyKey::Hp => "hp",
            LegacyKey::Dps => "dps",
            LegacyKey::CritChance => "critChance",
            LegacyKey::DodgeChance => "dodgeChance",
            LegacyKey::LifeSteal => "lifeSteal",
            LegacyKey::Armor => "armor",
            LegacyKey::ProjectileSpeed => "projectileSpeed",
            LegacyKey::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyExtra {
    pub key: LegacyKey,
    pub value: f64,
}

/// The old single-weapon item: one `power` scalar plus keyed extras
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub power: f64,
    #[serde(default)]
    pub extras: Vec<LegacyExtra>,
    #[serde(default, rename = "type")]
    pub damage_type: Option<DamageType>,
}

/// Flatten an equipment piece for legacy consumers
///
/// `power` is the base damage plus damage affixes. Every other stat with a
/// legacy key becomes one extra (base and affix values summed); stats without
/// one are dropped.
pub fn to_legacy(equipment: &Equipment) -> LegacyItem {
    let total = equipment.total_stats();
    let power = round2(total.get(Stat::Damage));

    let extras = total
        .iter()
        .filter_map(|(stat, value)| {
            LegacyKey::for_stat(stat).map(|key| LegacyExtra {
                key,
                value: round2(value),
            })
        })
        .collect();

    LegacyItem {
        id: equipment.id.clone(),
        name: equipment.name.clone(),
        rarity: equipment.rarity,
        level: equipment.level,
        power,
        extras,
        damage_type: equipment.damage_type,
    }
}

impl From<&Equipment> for LegacyItem {
    fn from(equipment: &Equipment) -> Self {
        to_legacy(equipment)
    }
}
