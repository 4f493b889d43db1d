use crate::types::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a stone in the player's inventory
pub type StoneId = String;

/// A rolled stat modifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Affix {
    /// Display name ("of the Bear")
    pub name: String,
    pub stat: Stat,
    /// Level- and rarity-scaled value
    pub value: f64,
    pub tier: u32,
}

impl Affix {
    pub fn display(&self) -> String {
        format!("{} (T{})", self.stat.display_value(self.value), self.tier)
    }

    /// The affix with the highest tier; the first one wins ties
    pub fn highest_tier(affixes: &[Affix]) -> Option<&Affix> {
        affixes.iter().fold(None, |best: Option<&Affix>, affix| match best {
            Some(b) if b.tier >= affix.tier => Some(b),
            _ => Some(affix),
        })
    }
}

impl fmt::Display for Affix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Fixed-capacity socket set; each socket holds a stone id or nothing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sockets(Vec<Option<StoneId>>);

impl Sockets {
    /// A socket set with `capacity` empty sockets
    pub fn with_capacity(capacity: usize) -> Self {
        Sockets(vec![None; capacity])
    }

    pub fn capacity(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, index: usize) -> Option<&StoneId> {
        self.0.get(index).and_then(|s| s.as_ref())
    }

    pub fn first_empty(&self) -> Option<usize> {
        self.0.iter().position(|s| s.is_none())
    }

    pub fn is_full(&self) -> bool {
        self.first_empty().is_none()
    }

    pub fn contains(&self, stone_id: &str) -> bool {
        self.stone_ids().any(|id| id == stone_id)
    }

    /// Ids of the stones currently embedded, in socket order
    pub fn stone_ids(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|s| s.as_deref())
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> Option<&mut Option<StoneId>> {
        self.0.get_mut(index)
    }
}

/// A generated piece of equipment
///
/// Immutable after generation except for socket contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: String,
    pub name: String,
    /// Base type id (e.g. "longsword")
    pub base_type: String,
    pub slot: EquipmentSlot,
    pub category: ItemCategory,
    pub rarity: Rarity,
    pub level: u32,
    pub base_stats: EquipmentStats,
    #[serde(default)]
    pub affixes: Vec<Affix>,
    #[serde(default)]
    pub damage_type: Option<DamageType>,
    #[serde(default)]
    pub requirements: Option<Requirements>,
    #[serde(default)]
    pub sockets: Option<Sockets>,
    /// Gold value
    pub value: u64,
}

impl Equipment {
    /// Base stats plus affixes (stones and the resistance map excluded)
    pub fn total_stats(&self) -> EquipmentStats {
        let mut total = EquipmentStats::new();
        total.merge(&self.base_stats);
        for affix in &self.affixes {
            total.add(affix.stat, affix.value);
        }
        total
    }

    pub fn socketed_stone_ids(&self) -> impl Iterator<Item = &str> {
        self.sockets.iter().flat_map(|s| s.stone_ids())
    }
}

impl fmt::Display for Equipment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "══ {} ══", self.name)?;
        writeln!(f, "{} {} ({})", self.rarity, self.category, self.base_type)?;

        if let Some(dt) = self.damage_type {
            writeln!(f, "  {} damage", dt)?;
        }

        if !self.base_stats.stats.is_empty() {
            writeln!(f)?;
            writeln!(f, "Base")?;
            for (stat, value) in self.base_stats.iter() {
                writeln!(f, "  {}", stat.display_value(value))?;
            }
            for (dt, value) in &self.base_stats.resistance {
                writeln!(f, "  +{:.1}% {} Resistance", value * 100.0, dt)?;
            }
        }

        if !self.affixes.is_empty() {
            writeln!(f)?;
            writeln!(f, "Affixes")?;
            for affix in &self.affixes {
                writeln!(f, "  {}", affix)?;
            }
        }

        if let Some(ref sockets) = self.sockets {
            writeln!(f)?;
            writeln!(
                f,
                "Sockets: {}/{}",
                sockets.stone_ids().count(),
                sockets.capacity()
            )?;
        }

        if let Some(ref reqs) = self.requirements {
            if !reqs.is_empty() {
                let mut parts = Vec::new();
                if reqs.level > 0 {
                    parts.push(format!("Level {}", reqs.level));
                }
                if reqs.strength > 0 {
                    parts.push(format!("{} Str", reqs.strength));
                }
                if reqs.dexterity > 0 {
                    parts.push(format!("{} Dex", reqs.dexterity));
                }
                if reqs.intelligence > 0 {
                    parts.push(format!("{} Int", reqs.intelligence));
                }
                writeln!(f)?;
                writeln!(f, "Requires: {}", parts.join(", "))?;
            }
        }

        write!(f, "Value: {} gold", self.value)
    }
}

/// A generated stone that can be embedded into equipment sockets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stone {
    pub id: StoneId,
    pub name: String,
    /// Stone type id (e.g. "ruby")
    pub stone_type: String,
    pub rarity: StoneRarity,
    pub level: u32,
    pub base_stats: EquipmentStats,
    #[serde(default)]
    pub affixes: Vec<Affix>,
    /// Equipment slots that may host this stone
    pub socket_types: Vec<EquipmentSlot>,
    pub value: u64,
}

impl Stone {
    pub fn fits(&self, slot: EquipmentSlot) -> bool {
        self.socket_types.contains(&slot)
    }

    /// Base stats plus affixes
    pub fn total_stats(&self) -> EquipmentStats {
        let mut total = EquipmentStats::new();
        total.merge(&self.base_stats);
        for affix in &self.affixes {
            total.add(affix.stat, affix.value);
        }
        total
    }
}

impl fmt::Display for Stone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "◆ {} ◆", self.name)?;
        writeln!(f, "{} stone ({})", self.rarity, self.stone_type)?;
        for (stat, value) in self.base_stats.iter() {
            writeln!(f, "  {}", stat.display_value(value))?;
        }
        for affix in &self.affixes {
            writeln!(f, "  {}", affix)?;
        }
        write!(f, "Value: {} gold", self.value)
    }
}
