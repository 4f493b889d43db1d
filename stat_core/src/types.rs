//! Core types specific to the player and enemies

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the five primary attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Strength,
    Dexterity,
    Intelligence,
    Vitality,
    Luck,
}

impl Attribute {
    pub fn all() -> &'static [Attribute] {
        &[
            Attribute::Strength,
            Attribute::Dexterity,
            Attribute::Intelligence,
            Attribute::Vitality,
            Attribute::Luck,
        ]
    }

    /// The stat that carries points of this attribute on gear and passives
    pub fn stat(&self) -> loot_core::Stat {
        match self {
            Attribute::Strength => loot_core::Stat::Strength,
            Attribute::Dexterity => loot_core::Stat::Dexterity,
            Attribute::Intelligence => loot_core::Stat::Intelligence,
            Attribute::Vitality => loot_core::Stat::Vitality,
            Attribute::Luck => loot_core::Stat::Luck,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Attribute::Strength => "Strength",
            Attribute::Dexterity => "Dexterity",
            Attribute::Intelligence => "Intelligence",
            Attribute::Vitality => "Vitality",
            Attribute::Luck => "Luck",
        };
        write!(f, "{}", s)
    }
}

/// Base attributes; only raised by spending attribute points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attributes {
    pub strength: i32,
    pub dexterity: i32,
    pub intelligence: i32,
    pub vitality: i32,
    pub luck: i32,
}

impl Attributes {
    /// Starting values; derived bonuses count points above these
    pub const BASELINE: Attributes = Attributes {
        strength: 10,
        dexterity: 10,
        intelligence: 10,
        vitality: 10,
        luck: 5,
    };

    pub fn get(&self, attribute: Attribute) -> i32 {
        match attribute {
            Attribute::Strength => self.strength,
            Attribute::Dexterity => self.dexterity,
            Attribute::Intelligence => self.intelligence,
            Attribute::Vitality => self.vitality,
            Attribute::Luck => self.luck,
        }
    }

    pub(crate) fn get_mut(&mut self, attribute: Attribute) -> &mut i32 {
        match attribute {
            Attribute::Strength => &mut self.strength,
            Attribute::Dexterity => &mut self.dexterity,
            Attribute::Intelligence => &mut self.intelligence,
            Attribute::Vitality => &mut self.vitality,
            Attribute::Luck => &mut self.luck,
        }
    }

    /// Points above the baseline, per attribute
    pub fn over_baseline(&self, attribute: Attribute) -> i32 {
        self.get(attribute).saturating_sub(Attributes::BASELINE.get(attribute))
    }
}

impl Default for Attributes {
    fn default() -> Self {
        Attributes::BASELINE
    }
}

/// Skill levels from saves predating attributes; flat bonuses per level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacySkills {
    pub strength: u32,
    pub precision: u32,
    pub agility: u32,
    pub resilience: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyType {
    #[default]
    Melee,
    Ranged,
    Caster,
    /// Any type this core has no table entry for
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialAbility {
    /// Hits harder when low on health
    Berserker,
    /// Chance of an amplified hit
    Precise,
    /// Abilities this core does not model
    #[serde(other)]
    Unknown,
}

impl fmt::Display for SpecialAbility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SpecialAbility::Berserker => "berserker",
            SpecialAbility::Precise => "precise",
            SpecialAbility::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// An opponent for one combat exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: String,
    pub name: String,
    #[serde(default, rename = "type")]
    pub enemy_type: EnemyType,
    #[serde(default = "default_level")]
    pub level: u32,
    pub hp: f64,
    pub max_hp: f64,
    #[serde(default)]
    pub special_ability: Option<SpecialAbility>,
}

fn default_level() -> u32 {
    1
}

impl Enemy {
    pub fn new(id: impl Into<String>, name: impl Into<String>, enemy_type: EnemyType, level: u32, max_hp: f64) -> Self {
        Enemy {
            id: id.into(),
            name: name.into(),
            enemy_type,
            level,
            hp: max_hp,
            max_hp,
            special_ability: None,
        }
    }

    pub fn with_ability(mut self, ability: SpecialAbility) -> Self {
        self.special_ability = Some(ability);
        self
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    /// Current hp as a fraction of max; 0 when max is not positive
    pub fn hp_fraction(&self) -> f64 {
        if self.max_hp > 0.0 {
            self.hp / self.max_hp
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_baseline() {
        let attrs = Attributes::default();
        assert_eq!(attrs, Attributes::BASELINE);
        for attribute in Attribute::all() {
            assert_eq!(attrs.over_baseline(*attribute), 0);
        }
        assert_eq!(attrs.luck, 5);
    }

    #[test]
    fn test_over_baseline_saturates() {
        let attrs = Attributes {
            strength: i32::MIN,
            luck: i32::MAX,
            ..Attributes::BASELINE
        };
        assert_eq!(attrs.over_baseline(Attribute::Strength), i32::MIN);
        assert_eq!(attrs.over_baseline(Attribute::Luck), i32::MAX - 5);
        assert_eq!(attrs.over_baseline(Attribute::Vitality), 0);
    }

    #[test]
    fn test_unknown_enemy_fields_fall_back() {
        let enemy: Enemy = serde_json::from_str(
            r#"{"id":"e1","name":"Wisp","type":"spirit","hp":10,"max_hp":10,"special_ability":"teleport"}"#,
        )
        .unwrap();
        assert_eq!(enemy.enemy_type, EnemyType::Other);
        assert_eq!(enemy.special_ability, Some(SpecialAbility::Unknown));
        assert_eq!(enemy.level, 1);
    }

    #[test]
    fn test_hp_fraction() {
        let mut enemy = Enemy::new("e", "Goblin", EnemyType::Melee, 3, 40.0);
        enemy.hp = 10.0;
        assert!((enemy.hp_fraction() - 0.25).abs() < 1e-12);
        enemy.max_hp = 0.0;
        assert_eq!(enemy.hp_fraction(), 0.0);
    }
}
