//! Content tables: base types, affix pools, stone types, name lists, roll tables
//!
//! Content is data; this module only defines its shape, loads it from TOML
//! and validates the invariants generation relies on.

use crate::types::{DamageType, EquipmentSlot, EquipmentStats, ItemCategory, Rarity, Stat, StoneRarity};
use crate::ConfigError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static BUILTIN: OnceLock<Config> = OnceLock::new();

const BUILTIN_BASES: &str = include_str!("../config/bases.toml");
const BUILTIN_AFFIXES: &str = include_str!("../config/affixes.toml");
const BUILTIN_STONES: &str = include_str!("../config/stones.toml");
const BUILTIN_NAMES: &str = include_str!("../config/names.toml");
const BUILTIN_ROLLS: &str = include_str!("../config/rolls.toml");

/// The sample content tables shipped with the crate, parsed once
pub fn builtin_config() -> &'static Config {
    BUILTIN.get_or_init(|| {
        Config::parse(
            BUILTIN_BASES,
            BUILTIN_AFFIXES,
            BUILTIN_STONES,
            BUILTIN_NAMES,
            BUILTIN_ROLLS,
        )
        .expect("built-in content tables are valid")
    })
}

/// Complete generator configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub base_types: Vec<BaseTypeConfig>,
    pub stone_types: Vec<StoneTypeConfig>,
    pub affixes: AffixPools,
    pub names: NameConfig,
    pub rolls: RollConfig,
}

/// A concrete equipment type (e.g. "Longsword")
#[derive(Debug, Clone, Deserialize)]
pub struct BaseTypeConfig {
    pub id: String,
    pub name: String,
    pub slot: EquipmentSlot,
    #[serde(default)]
    pub stats: BTreeMap<Stat, f64>,
    #[serde(default)]
    pub resistance: BTreeMap<DamageType, f64>,
}

impl BaseTypeConfig {
    pub fn category(&self) -> ItemCategory {
        self.slot.category()
    }

    pub fn base_stats(&self) -> EquipmentStats {
        EquipmentStats {
            stats: self.stats.clone(),
            resistance: self.resistance.clone(),
        }
    }
}

/// A stone base (e.g. "Ruby")
#[derive(Debug, Clone, Deserialize)]
pub struct StoneTypeConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub stats: BTreeMap<Stat, f64>,
    /// Equipment slots that may host this stone
    pub socket_types: Vec<EquipmentSlot>,
    /// Gold value of a common, level-1 stone
    #[serde(default = "default_stone_value")]
    pub base_value: f64,
}

fn default_stone_value() -> f64 {
    10.0
}

impl StoneTypeConfig {
    pub fn base_stats(&self) -> EquipmentStats {
        EquipmentStats {
            stats: self.stats.clone(),
            resistance: BTreeMap::new(),
        }
    }
}

/// One entry of an affix pool
#[derive(Debug, Clone, Deserialize)]
pub struct AffixConfig {
    /// Display name, used as the item name suffix ("of the Bear")
    pub name: String,
    pub stat: Stat,
    /// Unscaled value
    pub value: f64,
    pub tier: u32,
    pub weight: f64,
}

/// Themed affix pools
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AffixPools {
    #[serde(default)]
    pub weapon: Vec<AffixConfig>,
    #[serde(default)]
    pub armor: Vec<AffixConfig>,
    #[serde(default)]
    pub accessory: Vec<AffixConfig>,
    #[serde(default)]
    pub stone: Vec<AffixConfig>,
}

impl AffixPools {
    pub fn for_category(&self, category: ItemCategory) -> &[AffixConfig] {
        match category {
            ItemCategory::Weapon => &self.weapon,
            ItemCategory::Armor => &self.armor,
            ItemCategory::Accessory => &self.accessory,
        }
    }

    fn all(&self) -> impl Iterator<Item = &AffixConfig> {
        self.weapon
            .iter()
            .chain(self.armor.iter())
            .chain(self.accessory.iter())
            .chain(self.stone.iter())
    }
}

/// Themed word lists for item names
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NameConfig {
    #[serde(default)]
    pub fire: Vec<String>,
    #[serde(default)]
    pub ice: Vec<String>,
    #[serde(default)]
    pub lightning: Vec<String>,
    #[serde(default)]
    pub poison: Vec<String>,
}

impl NameConfig {
    /// Prefix words for an element; physical has none
    pub fn prefixes_for(&self, damage_type: DamageType) -> &[String] {
        match damage_type {
            DamageType::Physical => &[],
            DamageType::Fire => &self.fire,
            DamageType::Ice => &self.ice,
            DamageType::Lightning => &self.lightning,
            DamageType::Poison => &self.poison,
        }
    }
}

/// Probability of one tier: `base + per_level * min(level, level_cap)`
#[derive(Debug, Clone, Deserialize)]
pub struct RarityChance<T> {
    pub rarity: T,
    pub base: f64,
    #[serde(default)]
    pub per_level: f64,
}

/// Boss and normal rarity branches
///
/// Entries are walked in listed order; mass left over falls to the lowest tier.
#[derive(Debug, Clone, Deserialize)]
pub struct RarityTable<T> {
    pub normal: Vec<RarityChance<T>>,
    pub boss: Vec<RarityChance<T>>,
}

impl<T: Copy> RarityTable<T> {
    /// Per-tier probabilities for a kill at `level`
    pub fn thresholds(&self, level: u32, level_cap: u32, from_boss: bool) -> Vec<(T, f64)> {
        let effective = level.min(level_cap) as f64;
        let branch = if from_boss { &self.boss } else { &self.normal };
        branch
            .iter()
            .map(|chance| (chance.rarity, chance.base + chance.per_level * effective))
            .collect()
    }

    fn max_branch_sum(&self, level_cap: u32) -> f64 {
        [1, level_cap]
            .into_iter()
            .flat_map(|level| {
                [true, false].into_iter().map(move |boss| (level, boss))
            })
            .map(|(level, boss)| {
                self.thresholds(level, level_cap, boss)
                    .iter()
                    .map(|(_, p)| p.max(0.0))
                    .sum::<f64>()
            })
            .fold(0.0, f64::max)
    }
}

/// Category weights: `accessory` grows by `accessory_per_level` per level
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryWeights {
    pub weapon: f64,
    pub armor: f64,
    pub accessory: f64,
    #[serde(default)]
    pub accessory_per_level: f64,
}

impl CategoryWeights {
    pub fn weights(&self, level: u32, level_cap: u32) -> [(ItemCategory, f64); 3] {
        let effective = level.min(level_cap) as f64;
        [
            (ItemCategory::Weapon, self.weapon),
            (ItemCategory::Armor, self.armor),
            (
                ItemCategory::Accessory,
                self.accessory + self.accessory_per_level * effective,
            ),
        ]
    }
}

/// Rarity and category roll tables
#[derive(Debug, Clone, Deserialize)]
pub struct RollConfig {
    /// Level beyond which roll tables stop shifting
    pub level_cap: u32,
    pub equipment: RarityTable<Rarity>,
    pub stone: RarityTable<StoneRarity>,
    pub categories: CategoryWeights,
}

#[derive(Debug, Deserialize)]
struct BasesFile {
    #[serde(default)]
    base_types: Vec<BaseTypeConfig>,
}

#[derive(Debug, Deserialize)]
struct StonesFile {
    #[serde(default)]
    stone_types: Vec<StoneTypeConfig>,
}

impl Config {
    /// Load `bases.toml`, `affixes.toml`, `stones.toml`, `names.toml` and
    /// `rolls.toml` from a directory
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let read = |name: &str| -> Result<(String, PathBuf), ConfigError> {
            let path = dir.join(name);
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
                error: e,
                path: Some(path.clone()),
            })?;
            Ok((content, path))
        };

        let (bases, bases_path) = read("bases.toml")?;
        let (affixes, affixes_path) = read("affixes.toml")?;
        let (stones, stones_path) = read("stones.toml")?;
        let (names, names_path) = read("names.toml")?;
        let (rolls, rolls_path) = read("rolls.toml")?;

        let config = Config {
            base_types: parse_file::<BasesFile>(&bases, &bases_path)?.base_types,
            affixes: parse_file(&affixes, &affixes_path)?,
            stone_types: parse_file::<StonesFile>(&stones, &stones_path)?.stone_types,
            names: parse_file(&names, &names_path)?,
            rolls: parse_file(&rolls, &rolls_path)?,
        };
        config.validate(dir)?;
        Ok(config)
    }

    /// Parse the five content files from strings
    pub fn parse(
        bases: &str,
        affixes: &str,
        stones: &str,
        names: &str,
        rolls: &str,
    ) -> Result<Self, ConfigError> {
        let config = Config {
            base_types: parse_file::<BasesFile>(bases, Path::new("bases.toml"))?.base_types,
            affixes: parse_file(affixes, Path::new("affixes.toml"))?,
            stone_types: parse_file::<StonesFile>(stones, Path::new("stones.toml"))?.stone_types,
            names: parse_file(names, Path::new("names.toml"))?,
            rolls: parse_file(rolls, Path::new("rolls.toml"))?,
        };
        config.validate(Path::new("<inline>"))?;
        Ok(config)
    }

    /// Base types of a category, in file order
    pub fn bases_in(&self, category: ItemCategory) -> Vec<&BaseTypeConfig> {
        self.base_types
            .iter()
            .filter(|base| base.category() == category)
            .collect()
    }

    pub fn base_type(&self, id: &str) -> Option<&BaseTypeConfig> {
        self.base_types.iter().find(|base| base.id == id)
    }

    pub fn stone_type(&self, id: &str) -> Option<&StoneTypeConfig> {
        self.stone_types.iter().find(|stone| stone.id == id)
    }

    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let fail = |message: String| ConfigError::Validation {
            message,
            path: path.to_path_buf(),
        };

        for category in ItemCategory::all() {
            if self.bases_in(*category).is_empty() {
                return Err(fail(format!("no base types for category {}", category)));
            }
        }
        if self.stone_types.is_empty() {
            return Err(fail("no stone types defined".to_string()));
        }
        if let Some(stone) = self.stone_types.iter().find(|s| s.socket_types.is_empty()) {
            return Err(fail(format!("stone type '{}' fits no socket", stone.id)));
        }
        if let Some(affix) = self.affixes.all().find(|a| a.stat == Stat::Unknown) {
            return Err(fail(format!("affix '{}' names an unknown stat", affix.name)));
        }
        if let Some(affix) = self.affixes.all().find(|a| a.weight < 0.0 || a.tier == 0) {
            return Err(fail(format!(
                "affix '{}' needs a tier >= 1 and a non-negative weight",
                affix.name
            )));
        }

        let cap = self.rolls.level_cap;
        let equipment_sum = self.rolls.equipment.max_branch_sum(cap);
        if equipment_sum > 1.0 + 1e-9 {
            return Err(fail(format!(
                "equipment rarity probabilities sum to {:.4} (> 1)",
                equipment_sum
            )));
        }
        let stone_sum = self.rolls.stone.max_branch_sum(cap);
        if stone_sum > 1.0 + 1e-9 {
            return Err(fail(format!(
                "stone rarity probabilities sum to {:.4} (> 1)",
                stone_sum
            )));
        }

        Ok(())
    }
}

fn parse_file<T: DeserializeOwned>(content: &str, path: &Path) -> Result<T, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::Parse {
        error: e,
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_config_parses() {
        let config = builtin_config();
        assert!(!config.bases_in(ItemCategory::Weapon).is_empty());
        assert!(!config.bases_in(ItemCategory::Armor).is_empty());
        assert!(!config.bases_in(ItemCategory::Accessory).is_empty());
        assert!(!config.affixes.stone.is_empty());
        assert!(!config.names.prefixes_for(DamageType::Fire).is_empty());
    }

    #[test]
    fn test_builtin_rarity_branches_sum_below_one() {
        let rolls = &builtin_config().rolls;
        for level in [1, 25, 50, 100, 1000] {
            for boss in [true, false] {
                let sum: f64 = rolls
                    .equipment
                    .thresholds(level, rolls.level_cap, boss)
                    .iter()
                    .map(|(_, p)| p)
                    .sum();
                assert!(sum <= 1.0, "level {} boss {} sum {}", level, boss, sum);
            }
        }
    }

    #[test]
    fn test_boss_branch_favours_rare_tiers() {
        let rolls = &builtin_config().rolls;
        let normal = rolls.equipment.thresholds(10, rolls.level_cap, false);
        let boss = rolls.equipment.thresholds(10, rolls.level_cap, true);
        let legendary = |t: &[(Rarity, f64)]| {
            t.iter()
                .find(|(r, _)| *r == Rarity::Legendary)
                .map(|(_, p)| *p)
                .unwrap_or(0.0)
        };
        assert!(legendary(&boss) > legendary(&normal));
    }

    #[test]
    fn test_rejects_overfull_rarity_table() {
        let rolls = r#"
level_cap = 10

[[equipment.normal]]
rarity = "legendary"
base = 0.6

[[equipment.normal]]
rarity = "epic"
base = 0.6

[[equipment.boss]]
rarity = "legendary"
base = 0.1

[[stone.normal]]
rarity = "divine"
base = 0.1

[[stone.boss]]
rarity = "divine"
base = 0.1

[categories]
weapon = 1
armor = 1
accessory = 1
"#;
        let result = Config::parse(BUILTIN_BASES, BUILTIN_AFFIXES, BUILTIN_STONES, BUILTIN_NAMES, rolls);
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_rejects_missing_category() {
        let bases = r#"
[[base_types]]
id = "stick"
name = "Stick"
slot = "weapon"
stats = { damage = 1.0 }
"#;
        let result = Config::parse(bases, BUILTIN_AFFIXES, BUILTIN_STONES, BUILTIN_NAMES, BUILTIN_ROLLS);
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_rejects_affix_with_unknown_stat() {
        let affixes = format!(
            "{}\n[[weapon]]\nname = \"of Sorcery\"\nstat = \"spellPower\"\nvalue = 3.0\ntier = 1\nweight = 10\n",
            BUILTIN_AFFIXES
        );
        let result = Config::parse(BUILTIN_BASES, &affixes, BUILTIN_STONES, BUILTIN_NAMES, BUILTIN_ROLLS);
        match result {
            Err(ConfigError::Validation { message, .. }) => assert!(message.contains("of Sorcery")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_from_dir() {
        let dir = TempDir::new().unwrap();
        for (name, content) in [
            ("bases.toml", BUILTIN_BASES),
            ("affixes.toml", BUILTIN_AFFIXES),
            ("stones.toml", BUILTIN_STONES),
            ("names.toml", BUILTIN_NAMES),
            ("rolls.toml", BUILTIN_ROLLS),
        ] {
            let mut file = std::fs::File::create(dir.path().join(name)).unwrap();
            file.write_all(content.as_bytes()).unwrap();
        }

        let config = Config::load_from_dir(dir.path()).unwrap();
        assert_eq!(config.base_types.len(), builtin_config().base_types.len());
    }

    #[test]
    fn test_load_from_dir_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = Config::load_from_dir(dir.path());
        match result {
            Err(ConfigError::Io { path, .. }) => {
                assert_eq!(path, Some(dir.path().join("bases.toml")));
            }
            other => panic!("expected Io error, got {:?}", other),
        }
    }
}
