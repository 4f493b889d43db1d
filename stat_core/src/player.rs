//! The player aggregate and its load-time migration

use crate::config::GameConstants;
use crate::passive::PassiveTreeState;
use crate::types::{Attribute, Attributes, LegacySkills};
use loot_core::{Equipment, EquipmentSlot, EquipmentStats, LegacyItem, Stone};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Output of the stat aggregation pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DerivedStats {
    pub base_dps: f64,
    pub dps: f64,
    pub max_hp: f64,
    pub max_mana: f64,
    pub armor: f64,
    pub crit_chance: f64,
    pub dodge_chance: f64,
    pub block_chance: f64,
    pub life_steal: f64,
    pub health_regen: f64,
    pub mana_regen: f64,
    pub attack_speed: f64,
    pub projectile_speed: f64,
}

impl DerivedStats {
    /// Stats of a player with nothing but baseline attributes
    pub fn baseline(constants: &GameConstants) -> Self {
        let b = &constants.baseline;
        DerivedStats {
            base_dps: b.base_dps,
            dps: b.base_dps,
            max_hp: b.max_hp,
            max_mana: b.max_mana,
            armor: 0.0,
            crit_chance: 0.0,
            dodge_chance: 0.0,
            block_chance: 0.0,
            life_steal: 0.0,
            health_regen: 0.0,
            mana_regen: 0.0,
            attack_speed: b.attack_speed,
            projectile_speed: b.projectile_speed,
        }
    }
}

impl Default for DerivedStats {
    fn default() -> Self {
        DerivedStats::baseline(&GameConstants::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub level: u32,
    pub gold: u64,
    pub hp: f64,
    pub mana: f64,
    pub attributes: Attributes,
    /// Unspent attribute points
    #[serde(default)]
    pub attribute_points: u32,
    #[serde(default)]
    pub legacy_skills: Option<LegacySkills>,
    #[serde(default)]
    pub equipment: BTreeMap<EquipmentSlot, Equipment>,
    /// Stone inventory; embedded stones stay here and are referenced by id
    #[serde(default)]
    pub stones: Vec<Stone>,
    #[serde(default)]
    pub passive_tree: PassiveTreeState,
    /// Single weapon from saves predating equipment slots
    #[serde(default)]
    pub legacy_weapon: Option<LegacyItem>,
    #[serde(default)]
    pub stats: DerivedStats,
    /// Equipment and passive totals from the last aggregation
    #[serde(default)]
    pub calculated_stats: EquipmentStats,
}

impl Default for Player {
    fn default() -> Self {
        Player::new()
    }
}

impl Player {
    /// A level-1 player at full health with baseline attributes
    pub fn new() -> Self {
        let stats = DerivedStats::default();
        Player {
            level: 1,
            gold: 0,
            hp: stats.max_hp,
            mana: stats.max_mana,
            attributes: Attributes::default(),
            attribute_points: 0,
            legacy_skills: None,
            equipment: BTreeMap::new(),
            stones: Vec::new(),
            passive_tree: PassiveTreeState::default(),
            legacy_weapon: None,
            stats,
            calculated_stats: EquipmentStats::new(),
        }
    }

    /// Spend one unspent point on an attribute; false when none are left or
    /// the attribute is already at its ceiling
    pub fn spend_attribute_point(&mut self, attribute: Attribute) -> bool {
        if self.attribute_points == 0 {
            return false;
        }
        let value = self.attributes.get_mut(attribute);
        let raised = value.saturating_add(1);
        if raised == *value {
            return false;
        }
        *value = raised;
        self.attribute_points -= 1;
        true
    }

    /// Put an item into its slot, returning what was there
    pub fn equip(&mut self, item: Equipment) -> Option<Equipment> {
        self.equipment.insert(item.slot, item)
    }

    pub fn unequip(&mut self, slot: EquipmentSlot) -> Option<Equipment> {
        self.equipment.remove(&slot)
    }

    pub fn weapon(&self) -> Option<&Equipment> {
        self.equipment.get(&EquipmentSlot::Weapon)
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }
}

/// Loosely-typed player data as handed over by a UI or an older save
///
/// Converting it into a [`Player`] normalizes everything the aggregation
/// pipeline would otherwise trip over: non-numeric gold becomes 0, a
/// malformed equipment map becomes empty, individual malformed slots and
/// stones are dropped, and the legacy `equipped` field becomes
/// [`Player::legacy_weapon`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct PlayerRecord(Value);

impl PlayerRecord {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text).map(PlayerRecord)
    }

    pub fn from_value(value: Value) -> Self {
        PlayerRecord(value)
    }

    pub fn into_player(self) -> Player {
        let mut player = Player::new();
        let record = match self.0 {
            Value::Object(map) => map,
            other => {
                tracing::warn!(kind = %value_kind(&other), "player record is not an object, using defaults");
                return player;
            }
        };

        if let Some(level) = record.get("level").and_then(Value::as_u64) {
            player.level = level.clamp(1, u32::MAX as u64) as u32;
        }
        player.gold = migrate_gold(record.get("gold"));

        if let Some(attributes) = typed::<Attributes>(record.get("attributes"), "attributes") {
            player.attributes = attributes;
        }
        if let Some(points) = record.get("attribute_points").and_then(Value::as_u64) {
            player.attribute_points = points.min(u32::MAX as u64) as u32;
        }
        player.legacy_skills = typed(record.get("legacy_skills"), "legacy_skills");
        if let Some(state) = typed::<PassiveTreeState>(record.get("passive_tree"), "passive_tree") {
            player.passive_tree = state;
        }

        player.equipment = migrate_equipment(record.get("equipment"));
        player.stones = migrate_stones(record.get("stones"));

        player.legacy_weapon = typed(record.get("legacy_weapon"), "legacy_weapon")
            .or_else(|| typed(record.get("equipped"), "equipped"));

        // Missing hp/mana mean a fresh character; aggregation clamps later
        if let Some(hp) = record.get("hp").and_then(Value::as_f64) {
            player.hp = hp;
        }
        if let Some(mana) = record.get("mana").and_then(Value::as_f64) {
            player.mana = mana;
        }

        player
    }
}

impl From<PlayerRecord> for Player {
    fn from(record: PlayerRecord) -> Self {
        record.into_player()
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Deserialize an optional field, dropping it with a warning when malformed
fn typed<T: serde::de::DeserializeOwned>(value: Option<&Value>, field: &str) -> Option<T> {
    match value {
        None | Some(Value::Null) => None,
        Some(value) => match serde_json::from_value(value.clone()) {
            Ok(parsed) => Some(parsed),
            Err(error) => {
                tracing::warn!(field, %error, "malformed player field dropped");
                None
            }
        },
    }
}

fn migrate_gold(value: Option<&Value>) -> u64 {
    let gold = value.and_then(Value::as_f64).filter(|g| g.is_finite() && *g >= 0.0);
    match gold {
        Some(gold) => gold.floor() as u64,
        None => {
            if value.is_some() {
                tracing::warn!("gold is not a valid number, resetting to 0");
            }
            0
        }
    }
}

fn migrate_equipment(value: Option<&Value>) -> BTreeMap<EquipmentSlot, Equipment> {
    let mut equipment = BTreeMap::new();
    let map = match value {
        None | Some(Value::Null) => return equipment,
        Some(Value::Object(map)) => map,
        Some(other) => {
            tracing::warn!(kind = %value_kind(other), "equipment is not a map, resetting to empty");
            return equipment;
        }
    };

    for (key, item) in map {
        if item.is_null() {
            continue;
        }
        let slot = match serde_json::from_value::<EquipmentSlot>(Value::String(key.clone())) {
            Ok(slot) => slot,
            Err(_) => {
                tracing::warn!(slot = %key, "unknown equipment slot dropped");
                continue;
            }
        };
        match serde_json::from_value::<Equipment>(item.clone()) {
            Ok(parsed) if parsed.slot == slot => {
                equipment.insert(slot, parsed);
            }
            Ok(parsed) => {
                tracing::warn!(slot = %key, item_slot = %parsed.slot, "item in the wrong slot dropped");
            }
            Err(error) => {
                tracing::warn!(slot = %key, %error, "malformed equipment dropped");
            }
        }
    }
    equipment
}

fn migrate_stones(value: Option<&Value>) -> Vec<Stone> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match serde_json::from_value::<Stone>(item.clone()) {
                Ok(stone) => Some(stone),
                Err(error) => {
                    tracing::warn!(%error, "malformed stone dropped");
                    None
                }
            })
            .collect(),
        None | Some(Value::Null) => Vec::new(),
        Some(other) => {
            tracing::warn!(kind = %value_kind(other), "stones is not a list, resetting to empty");
            Vec::new()
        }
    }
}
