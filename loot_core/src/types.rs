use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Equipment rarity tier
///
/// Deserialization is lossy: an unknown name reads as `Common`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// All tiers, lowest first
    pub fn all() -> &'static [Rarity] {
        &[
            Rarity::Common,
            Rarity::Uncommon,
            Rarity::Rare,
            Rarity::Epic,
            Rarity::Legendary,
        ]
    }

    /// Multiplier applied to base stats and affix values
    pub fn stat_multiplier(&self) -> f64 {
        match self {
            Rarity::Common => 1.0,
            Rarity::Uncommon => 1.2,
            Rarity::Rare => 1.5,
            Rarity::Epic => 2.0,
            Rarity::Legendary => 3.0,
        }
    }

    /// Inclusive affix count range
    pub fn affix_count_range(&self) -> (u32, u32) {
        match self {
            Rarity::Common => (0, 1),
            Rarity::Uncommon => (1, 2),
            Rarity::Rare => (2, 3),
            Rarity::Epic => (3, 4),
            Rarity::Legendary => (4, 5),
        }
    }

    pub fn socket_capacity(&self) -> usize {
        match self {
            Rarity::Common => 0,
            Rarity::Uncommon | Rarity::Rare => 1,
            Rarity::Epic => 2,
            Rarity::Legendary => 3,
        }
    }

    /// Chance that a weapon of this rarity rolls an elemental damage type
    pub fn elemental_chance(&self) -> f64 {
        match self {
            Rarity::Common => 0.10,
            Rarity::Uncommon => 0.25,
            Rarity::Rare => 0.45,
            Rarity::Epic => 0.70,
            Rarity::Legendary => 0.90,
        }
    }

    /// Parse a rarity name, falling back to Common for unknown names
    pub fn from_name_lossy(name: &str) -> Rarity {
        match name.trim().to_ascii_lowercase().as_str() {
            "common" => Rarity::Common,
            "uncommon" => Rarity::Uncommon,
            "rare" => Rarity::Rare,
            "epic" => Rarity::Epic,
            "legendary" => Rarity::Legendary,
            other => {
                tracing::warn!(rarity = other, "unknown rarity, treating as common");
                Rarity::Common
            }
        }
    }
}

impl From<String> for Rarity {
    fn from(name: String) -> Self {
        Rarity::from_name_lossy(&name)
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rarity::Common => write!(f, "Common"),
            Rarity::Uncommon => write!(f, "Uncommon"),
            Rarity::Rare => write!(f, "Rare"),
            Rarity::Epic => write!(f, "Epic"),
            Rarity::Legendary => write!(f, "Legendary"),
        }
    }
}

/// Stone rarity tier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum StoneRarity {
    #[default]
    Common,
    Rare,
    Mythical,
    Divine,
}

impl StoneRarity {
    pub fn all() -> &'static [StoneRarity] {
        &[
            StoneRarity::Common,
            StoneRarity::Rare,
            StoneRarity::Mythical,
            StoneRarity::Divine,
        ]
    }

    pub fn stat_multiplier(&self) -> f64 {
        match self {
            StoneRarity::Common => 1.0,
            StoneRarity::Rare => 1.5,
            StoneRarity::Mythical => 2.2,
            StoneRarity::Divine => 3.0,
        }
    }

    pub fn affix_count_range(&self) -> (u32, u32) {
        match self {
            StoneRarity::Common => (0, 1),
            StoneRarity::Rare => (1, 1),
            StoneRarity::Mythical => (1, 2),
            StoneRarity::Divine => (2, 3),
        }
    }

    pub fn from_name_lossy(name: &str) -> StoneRarity {
        match name.trim().to_ascii_lowercase().as_str() {
            "common" => StoneRarity::Common,
            "rare" => StoneRarity::Rare,
            "mythical" => StoneRarity::Mythical,
            "divine" => StoneRarity::Divine,
            other => {
                tracing::warn!(rarity = other, "unknown stone rarity, treating as common");
                StoneRarity::Common
            }
        }
    }
}

impl From<String> for StoneRarity {
    fn from(name: String) -> Self {
        StoneRarity::from_name_lossy(&name)
    }
}

impl fmt::Display for StoneRarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoneRarity::Common => write!(f, "Common"),
            StoneRarity::Rare => write!(f, "Rare"),
            StoneRarity::Mythical => write!(f, "Mythical"),
            StoneRarity::Divine => write!(f, "Divine"),
        }
    }
}

/// Broad equipment category; each has its own affix pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    Weapon,
    Armor,
    Accessory,
}

impl ItemCategory {
    pub fn all() -> &'static [ItemCategory] {
        &[ItemCategory::Weapon, ItemCategory::Armor, ItemCategory::Accessory]
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemCategory::Weapon => write!(f, "Weapon"),
            ItemCategory::Armor => write!(f, "Armor"),
            ItemCategory::Accessory => write!(f, "Accessory"),
        }
    }
}

/// Equipment slot on the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentSlot {
    Weapon,
    Helmet,
    Chest,
    Gloves,
    Legs,
    Boots,
    Shield,
    Ring,
    Amulet,
    Belt,
}

impl EquipmentSlot {
    pub fn all() -> &'static [EquipmentSlot] {
        &[
            EquipmentSlot::Weapon,
            EquipmentSlot::Helmet,
            EquipmentSlot::Chest,
            EquipmentSlot::Gloves,
            EquipmentSlot::Legs,
            EquipmentSlot::Boots,
            EquipmentSlot::Shield,
            EquipmentSlot::Ring,
            EquipmentSlot::Amulet,
            EquipmentSlot::Belt,
        ]
    }

    pub fn category(&self) -> ItemCategory {
        match self {
            EquipmentSlot::Weapon => ItemCategory::Weapon,
            EquipmentSlot::Helmet
            | EquipmentSlot::Chest
            | EquipmentSlot::Gloves
            | EquipmentSlot::Legs
            | EquipmentSlot::Boots
            | EquipmentSlot::Shield => ItemCategory::Armor,
            EquipmentSlot::Ring | EquipmentSlot::Amulet | EquipmentSlot::Belt => {
                ItemCategory::Accessory
            }
        }
    }
}

impl fmt::Display for EquipmentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EquipmentSlot::Weapon => "weapon",
            EquipmentSlot::Helmet => "helmet",
            EquipmentSlot::Chest => "chest",
            EquipmentSlot::Gloves => "gloves",
            EquipmentSlot::Legs => "legs",
            EquipmentSlot::Boots => "boots",
            EquipmentSlot::Shield => "shield",
            EquipmentSlot::Ring => "ring",
            EquipmentSlot::Amulet => "amulet",
            EquipmentSlot::Belt => "belt",
        };
        write!(f, "{}", s)
    }
}

/// Damage element of a weapon hit
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    #[default]
    Physical,
    Fire,
    Ice,
    Lightning,
    Poison,
}

impl DamageType {
    /// The non-physical damage types
    pub fn elements() -> &'static [DamageType] {
        &[
            DamageType::Fire,
            DamageType::Ice,
            DamageType::Lightning,
            DamageType::Poison,
        ]
    }

    pub fn is_elemental(&self) -> bool {
        !matches!(self, DamageType::Physical)
    }
}

impl fmt::Display for DamageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DamageType::Physical => write!(f, "Physical"),
            DamageType::Fire => write!(f, "Fire"),
            DamageType::Ice => write!(f, "Ice"),
            DamageType::Lightning => write!(f, "Lightning"),
            DamageType::Poison => write!(f, "Poison"),
        }
    }
}

/// Status effects an elemental hit can attach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusEffect {
    Burning,
    Frozen,
    Stunned,
    Poisoned,
}

impl fmt::Display for StatusEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusEffect::Burning => write!(f, "burning"),
            StatusEffect::Frozen => write!(f, "frozen"),
            StatusEffect::Stunned => write!(f, "stunned"),
            StatusEffect::Poisoned => write!(f, "poisoned"),
        }
    }
}

/// Stat names carried by equipment, stones, passive nodes and the aggregate
///
/// Percentage-like stats are stored as fractions in [0, 1]. Names this build
/// does not know read as `Unknown`, which carries no weight and is skipped by
/// [`EquipmentStats::iter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stat {
    // Offense
    Damage,
    CritChance,
    CritDamage,
    AttackSpeed,
    ProjectileSpeed,
    LifeSteal,
    FireDamage,
    IceDamage,
    LightningDamage,
    PoisonDamage,
    // Defense
    Armor,
    Health,
    Mana,
    DodgeChance,
    BlockChance,
    HealthRegen,
    ManaRegen,
    FireResistance,
    IceResistance,
    LightningResistance,
    PoisonResistance,
    // Attributes
    Strength,
    Dexterity,
    Intelligence,
    Vitality,
    Luck,
    // Utility
    GoldFind,
    MagicFind,
    ExperienceBonus,
    MovementSpeed,
    #[serde(other)]
    Unknown,
}

impl Stat {
    /// Whether the stat is stored as a fraction and presented as a percentage
    pub fn is_percentage(&self) -> bool {
        matches!(
            self,
            Stat::CritChance
                | Stat::CritDamage
                | Stat::DodgeChance
                | Stat::BlockChance
                | Stat::LifeSteal
                | Stat::FireResistance
                | Stat::IceResistance
                | Stat::LightningResistance
                | Stat::PoisonResistance
                | Stat::GoldFind
                | Stat::MagicFind
                | Stat::ExperienceBonus
                | Stat::MovementSpeed
        )
    }

    /// Gold weight of one unit of this stat
    pub fn value_weight(&self) -> f64 {
        match self {
            Stat::Damage => 4.0,
            Stat::CritChance | Stat::DodgeChance => 150.0,
            Stat::CritDamage => 40.0,
            Stat::AttackSpeed => 60.0,
            Stat::ProjectileSpeed => 20.0,
            Stat::LifeSteal => 200.0,
            Stat::FireDamage | Stat::IceDamage | Stat::LightningDamage | Stat::PoisonDamage => 3.0,
            Stat::Armor => 2.0,
            Stat::Health => 0.5,
            Stat::Mana => 0.4,
            Stat::BlockChance => 120.0,
            Stat::HealthRegen | Stat::ManaRegen => 8.0,
            Stat::FireResistance
            | Stat::IceResistance
            | Stat::LightningResistance
            | Stat::PoisonResistance => 60.0,
            Stat::Strength | Stat::Dexterity | Stat::Intelligence | Stat::Vitality | Stat::Luck => {
                3.0
            }
            Stat::GoldFind => 50.0,
            Stat::MagicFind => 80.0,
            Stat::ExperienceBonus => 60.0,
            Stat::MovementSpeed => 40.0,
            Stat::Unknown => 0.0,
        }
    }

    /// Human-readable stat name
    pub fn display_name(&self) -> &'static str {
        match self {
            Stat::Damage => "Damage",
            Stat::CritChance => "Critical Chance",
            Stat::CritDamage => "Critical Damage",
            Stat::AttackSpeed => "Attack Speed",
            Stat::ProjectileSpeed => "Projectile Speed",
            Stat::LifeSteal => "Life Steal",
            Stat::FireDamage => "Fire Damage",
            Stat::IceDamage => "Ice Damage",
            Stat::LightningDamage => "Lightning Damage",
            Stat::PoisonDamage => "Poison Damage",
            Stat::Armor => "Armor",
            Stat::Health => "Health",
            Stat::Mana => "Mana",
            Stat::DodgeChance => "Dodge Chance",
            Stat::BlockChance => "Block Chance",
            Stat::HealthRegen => "Health Regeneration",
            Stat::ManaRegen => "Mana Regeneration",
            Stat::FireResistance => "Fire Resistance",
            Stat::IceResistance => "Ice Resistance",
            Stat::LightningResistance => "Lightning Resistance",
            Stat::PoisonResistance => "Poison Resistance",
            Stat::Strength => "Strength",
            Stat::Dexterity => "Dexterity",
            Stat::Intelligence => "Intelligence",
            Stat::Vitality => "Vitality",
            Stat::Luck => "Luck",
            Stat::GoldFind => "Gold Find",
            Stat::MagicFind => "Magic Find",
            Stat::ExperienceBonus => "Experience Bonus",
            Stat::MovementSpeed => "Movement Speed",
            Stat::Unknown => "Unknown",
        }
    }

    /// Format a stored value for presentation (fractions become percentages)
    pub fn display_value(&self, value: f64) -> String {
        if self.is_percentage() {
            format!("+{:.1}% {}", value * 100.0, self.display_name())
        } else {
            format!("+{} {}", value, self.display_name())
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Sparse stat map shared by item base stats, stones, passive nodes and the
/// aggregated player bonus
///
/// Ordered so that every sum over it runs in the same order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquipmentStats {
    #[serde(default)]
    pub stats: BTreeMap<Stat, f64>,
    /// Per-element resistances on armour bases; not part of stat aggregation
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub resistance: BTreeMap<DamageType, f64>,
}

impl EquipmentStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a stat, 0 when absent
    pub fn get(&self, stat: Stat) -> f64 {
        self.stats.get(&stat).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, stat: Stat, value: f64) {
        self.stats.insert(stat, value);
    }

    /// Add to a stat
    pub fn add(&mut self, stat: Stat, value: f64) {
        *self.stats.entry(stat).or_insert(0.0) += value;
    }

    pub fn with(mut self, stat: Stat, value: f64) -> Self {
        self.add(stat, value);
        self
    }

    pub fn contains(&self, stat: Stat) -> bool {
        self.stats.contains_key(&stat)
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty() && self.resistance.is_empty()
    }

    /// Known stats and their values
    pub fn iter(&self) -> impl Iterator<Item = (Stat, f64)> + '_ {
        self.stats
            .iter()
            .filter(|(stat, _)| **stat != Stat::Unknown)
            .map(|(stat, value)| (*stat, *value))
    }

    /// Add every stat of `other` into this map (resistances excluded)
    pub fn merge(&mut self, other: &EquipmentStats) {
        for (stat, value) in other.iter() {
            self.add(stat, value);
        }
    }

    /// Multiply every value, including resistances, and round to 2 decimals
    pub fn scaled(&self, factor: f64) -> EquipmentStats {
        EquipmentStats {
            stats: self
                .stats
                .iter()
                .map(|(stat, value)| (*stat, round2(value * factor)))
                .collect(),
            resistance: self
                .resistance
                .iter()
                .map(|(dt, value)| (*dt, round2(value * factor)))
                .collect(),
        }
    }
}

/// Round to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Attribute requirements for equipping an item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Requirements {
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub strength: u32,
    #[serde(default)]
    pub dexterity: u32,
    #[serde(default)]
    pub intelligence: u32,
}

impl Requirements {
    pub fn is_empty(&self) -> bool {
        self.level == 0 && self.strength == 0 && self.dexterity == 0 && self.intelligence == 0
    }
}
