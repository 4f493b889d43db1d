//! Game constants configuration

use loot_core::{DamageType, Rarity};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

use super::ConfigError;

/// Global game constants instance
static GAME_CONSTANTS: OnceLock<GameConstants> = OnceLock::new();

/// Initialize the global game constants from a TOML file
///
/// Returns error if already initialized or if loading fails.
pub fn init_constants(path: &Path) -> Result<(), ConfigError> {
    let constants = GameConstants::load_from_path(path)?;
    GAME_CONSTANTS
        .set(constants)
        .map_err(|_| ConfigError::ValidationError("GameConstants already initialized".to_string()))
}

/// Initialize the global game constants with default values
pub fn init_constants_default() -> Result<(), ConfigError> {
    GAME_CONSTANTS
        .set(GameConstants::default())
        .map_err(|_| ConfigError::ValidationError("GameConstants already initialized".to_string()))
}

/// Get a reference to the global game constants
///
/// Falls back to (and installs) the defaults when nothing was initialized.
pub fn constants() -> &'static GameConstants {
    GAME_CONSTANTS.get_or_init(GameConstants::default)
}

/// Check if constants have been initialized
pub fn constants_initialized() -> bool {
    GAME_CONSTANTS.get().is_some()
}

/// Ensure constants are initialized with defaults (idempotent, useful for tests)
pub fn ensure_constants_initialized() {
    GAME_CONSTANTS.get_or_init(GameConstants::default);
}

/// Tunable game constants
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameConstants {
    #[serde(default)]
    pub baseline: BaselineConstants,
    #[serde(default)]
    pub attributes: AttributeConstants,
    #[serde(default)]
    pub clamps: ClampConstants,
    #[serde(default)]
    pub combat: CombatConstants,
}

impl GameConstants {
    /// Load constants from a TOML file
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let constants: GameConstants = super::load_toml(path)?;
        constants.validate()?;
        Ok(constants)
    }

    /// Parse constants from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let constants: GameConstants = super::parse_toml(content)?;
        constants.validate()?;
        Ok(constants)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let clamps = &self.clamps;
        for (name, value) in [
            ("clamps.max_crit_chance", clamps.max_crit_chance),
            ("clamps.max_dodge_chance", clamps.max_dodge_chance),
            ("clamps.max_block_chance", clamps.max_block_chance),
            ("clamps.max_life_steal", clamps.max_life_steal),
            ("combat.variance", self.combat.variance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if self.combat.crit_multiplier < 1.0 {
            return Err(ConfigError::ValidationError(format!(
                "combat.crit_multiplier must be >= 1, got {}",
                self.combat.crit_multiplier
            )));
        }
        Ok(())
    }
}

/// Derived stats of a player with no attributes, gear or passives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineConstants {
    pub base_dps: f64,
    pub max_hp: f64,
    pub max_mana: f64,
    pub attack_speed: f64,
    pub projectile_speed: f64,
}

impl Default for BaselineConstants {
    fn default() -> Self {
        BaselineConstants {
            base_dps: 2.0,
            max_hp: 120.0,
            max_mana: 50.0,
            attack_speed: 1.0,
            projectile_speed: 1.0,
        }
    }
}

/// Per-point attribute contributions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeConstants {
    pub strength_dps: f64,
    pub strength_hp: f64,
    pub dexterity_crit: f64,
    pub dexterity_dodge: f64,
    pub intelligence_mana: f64,
    pub intelligence_mana_regen: f64,
    pub vitality_hp: f64,
    pub vitality_health_regen: f64,
    pub luck_crit: f64,
}

impl Default for AttributeConstants {
    fn default() -> Self {
        AttributeConstants {
            strength_dps: 0.5,
            strength_hp: 2.0,
            dexterity_crit: 0.005,
            dexterity_dodge: 0.003,
            intelligence_mana: 3.0,
            intelligence_mana_regen: 0.2,
            vitality_hp: 3.0,
            vitality_health_regen: 0.1,
            luck_crit: 0.005,
        }
    }
}

/// Upper bounds applied at the end of aggregation; lower bounds are 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClampConstants {
    pub max_crit_chance: f64,
    pub max_dodge_chance: f64,
    pub max_block_chance: f64,
    pub max_life_steal: f64,
}

impl Default for ClampConstants {
    fn default() -> Self {
        ClampConstants {
            max_crit_chance: 1.0,
            max_dodge_chance: 0.95,
            max_block_chance: 0.75,
            max_life_steal: 1.0,
        }
    }
}

/// One value per equipment rarity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RarityTable {
    pub common: f64,
    pub uncommon: f64,
    pub rare: f64,
    pub epic: f64,
    pub legendary: f64,
}

impl RarityTable {
    pub fn get(&self, rarity: Rarity) -> f64 {
        match rarity {
            Rarity::Common => self.common,
            Rarity::Uncommon => self.uncommon,
            Rarity::Rare => self.rare,
            Rarity::Epic => self.epic,
            Rarity::Legendary => self.legendary,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementEffect {
    pub damage_multiplier: f64,
    pub status_chance: f64,
}

/// Post-hit adjustments per weapon element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementalConstants {
    pub fire: ElementEffect,
    pub ice: ElementEffect,
    pub lightning: ElementEffect,
    pub poison: ElementEffect,
}

impl ElementalConstants {
    /// Effect of an element; physical hits are unchanged
    pub fn get(&self, damage_type: DamageType) -> Option<&ElementEffect> {
        match damage_type {
            DamageType::Physical => None,
            DamageType::Fire => Some(&self.fire),
            DamageType::Ice => Some(&self.ice),
            DamageType::Lightning => Some(&self.lightning),
            DamageType::Poison => Some(&self.poison),
        }
    }
}

impl Default for ElementalConstants {
    fn default() -> Self {
        ElementalConstants {
            fire: ElementEffect {
                damage_multiplier: 1.10,
                status_chance: 0.15,
            },
            ice: ElementEffect {
                damage_multiplier: 1.0,
                status_chance: 0.20,
            },
            lightning: ElementEffect {
                damage_multiplier: 1.05,
                status_chance: 0.10,
            },
            poison: ElementEffect {
                damage_multiplier: 0.80,
                status_chance: 0.25,
            },
        }
    }
}

/// Enemy dodge: type base plus `min(level * per_level, level_cap)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyDodgeConstants {
    pub melee: f64,
    pub ranged: f64,
    pub caster: f64,
    pub other: f64,
    pub per_level: f64,
    pub level_cap: f64,
}

impl Default for EnemyDodgeConstants {
    fn default() -> Self {
        EnemyDodgeConstants {
            melee: 0.02,
            ranged: 0.05,
            caster: 0.03,
            other: 0.02,
            per_level: 0.002,
            level_cap: 0.08,
        }
    }
}

/// Enemy damage: `max(minimum, type base + level * per_level)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyDamageConstants {
    pub melee: f64,
    pub ranged: f64,
    pub other: f64,
    pub per_level: f64,
    pub minimum: f64,
    /// Berserker enemies below this hp fraction hit harder
    pub berserker_threshold: f64,
    pub berserker_multiplier: f64,
    pub precise_chance: f64,
    pub precise_multiplier: f64,
}

impl Default for EnemyDamageConstants {
    fn default() -> Self {
        EnemyDamageConstants {
            melee: 0.9,
            ranged: 0.75,
            other: 1.0,
            per_level: 0.5,
            minimum: 0.5,
            berserker_threshold: 0.3,
            berserker_multiplier: 1.5,
            precise_chance: 0.15,
            precise_multiplier: 1.3,
        }
    }
}

/// Soft death: hp restored to a fraction of max, a small gold penalty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviveConstants {
    pub hp_fraction: f64,
    pub gold_per_level: u64,
    pub max_gold_loss: u64,
}

impl Default for ReviveConstants {
    fn default() -> Self {
        ReviveConstants {
            hp_fraction: 0.6,
            gold_per_level: 2,
            max_gold_loss: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConstants {
    /// Half-width of the uniform damage spread (0.15 = ±15%)
    pub variance: f64,
    pub crit_multiplier: f64,
    /// Player crit chance by equipped weapon rarity
    pub weapon_crit: RarityTable,
    pub lightning_crit_bonus: f64,
    /// Player dodge chance by equipped weapon rarity
    pub weapon_dodge: RarityTable,
    pub agility_dodge_per_level: f64,
    pub elemental: ElementalConstants,
    pub enemy_dodge: EnemyDodgeConstants,
    pub enemy_damage: EnemyDamageConstants,
    pub revive: ReviveConstants,
}

impl Default for CombatConstants {
    fn default() -> Self {
        CombatConstants {
            variance: 0.15,
            crit_multiplier: 1.8,
            weapon_crit: RarityTable {
                common: 0.05,
                uncommon: 0.07,
                rare: 0.10,
                epic: 0.13,
                legendary: 0.18,
            },
            lightning_crit_bonus: 0.05,
            weapon_dodge: RarityTable {
                common: 0.02,
                uncommon: 0.03,
                rare: 0.04,
                epic: 0.06,
                legendary: 0.08,
            },
            agility_dodge_per_level: 0.01,
            elemental: ElementalConstants::default(),
            enemy_dodge: EnemyDodgeConstants::default(),
            enemy_damage: EnemyDamageConstants::default(),
            revive: ReviveConstants::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = include_str!("../../config/constants.toml");

    #[test]
    fn test_default_constants() {
        let constants = GameConstants::default();
        assert!((constants.baseline.base_dps - 2.0).abs() < f64::EPSILON);
        assert!((constants.baseline.max_hp - 120.0).abs() < f64::EPSILON);
        assert!((constants.combat.crit_multiplier - 1.8).abs() < f64::EPSILON);
        assert!((constants.combat.weapon_crit.get(Rarity::Legendary) - 0.18).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sample_file_matches_defaults() {
        let constants = GameConstants::from_toml_str(SAMPLE).unwrap();
        assert_eq!(constants, GameConstants::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let toml = r#"
[baseline]
max_hp = 200

[combat.revive]
max_gold_loss = 25
"#;

        let constants = GameConstants::from_toml_str(toml).unwrap();
        assert!((constants.baseline.max_hp - 200.0).abs() < f64::EPSILON);
        assert!((constants.baseline.max_mana - 50.0).abs() < f64::EPSILON);
        assert_eq!(constants.combat.revive.max_gold_loss, 25);
        assert_eq!(constants.combat.revive.gold_per_level, 2);
    }

    #[test]
    fn test_rejects_out_of_range_clamp() {
        let result = GameConstants::from_toml_str("[clamps]\nmax_dodge_chance = 1.5\n");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_load_from_path() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let constants = GameConstants::load_from_path(file.path()).unwrap();
        assert!((constants.attributes.vitality_hp - 3.0).abs() < f64::EPSILON);

        let missing = GameConstants::load_from_path(Path::new("/nonexistent/constants.toml"));
        assert!(matches!(missing, Err(ConfigError::IoError(_))));
    }

    #[test]
    fn test_constants_fall_back_to_defaults() {
        ensure_constants_initialized();
        assert!(constants_initialized());
        assert!(constants().baseline.max_hp > 0.0);
    }
}
