use crate::config::{CountConfig, EntryConfig, TableFileConfig};
use crate::drop::Drop;
use crate::RollError;
use rand::Rng;

/// Nested tables deeper than this are treated as a reference cycle
const MAX_DEPTH: u32 = 10;

/// A drop table with weighted roll counts and entries
#[derive(Debug, Clone)]
pub struct DropTable {
    pub id: String,
    rolls: Vec<RollOption>,
    entries: Vec<Entry>,
}

#[derive(Debug, Clone)]
struct RollOption {
    count: u32,
    weight: u32,
}

#[derive(Debug, Clone)]
struct Entry {
    entry_type: EntryType,
    weight: u32,
    rarity_bonus: u32,
    min_level: Option<u32>,
    max_level: Option<u32>,
}

#[derive(Debug, Clone)]
enum EntryType {
    NoDrop,
    Equipment,
    Stone,
    Gold { count: CountRange, per_level: f64 },
    Table { id: String },
}

#[derive(Debug, Clone, Copy)]
struct CountRange {
    min: u32,
    max: u32,
}

impl DropTable {
    /// Parse a drop table from config
    pub fn from_config(config: TableFileConfig) -> Result<Self, RollError> {
        let rolls: Vec<RollOption> = if config.table.rolls.is_empty() {
            // Default to 1 roll if none specified
            vec![RollOption {
                count: 1,
                weight: 1,
            }]
        } else {
            config
                .table
                .rolls
                .into_iter()
                .map(|r| RollOption {
                    count: r.count,
                    weight: r.weight,
                })
                .collect()
        };

        let entries: Vec<Entry> = config
            .entries
            .into_iter()
            .map(Entry::from_config)
            .collect::<Result<_, _>>()?;

        Ok(DropTable {
            id: config.table.id,
            rolls,
            entries,
        })
    }

    /// Roll this table and return the drops
    ///
    /// `rarity_mult` scales each entry's `rarity_bonus` weight; `gold_mult`
    /// scales gold amounts, with the fractional part as a chance of one more.
    pub fn roll<R: Rng + ?Sized>(
        &self,
        rarity_mult: f64,
        gold_mult: f64,
        level: u32,
        rng: &mut R,
        registry: &crate::DropTableRegistry,
        depth: u32,
    ) -> Result<Vec<Drop>, RollError> {
        if depth > MAX_DEPTH {
            return Err(RollError::CycleDetected(self.id.clone()));
        }

        let roll_count = self.select_roll_count(rng);

        let valid_entries: Vec<&Entry> = self
            .entries
            .iter()
            .filter(|e| e.level_valid(level))
            .collect();

        let mut drops = Vec::new();
        if valid_entries.is_empty() {
            return Ok(drops);
        }

        for _ in 0..roll_count {
            let selected = loot_core::rng::weighted_choice(rng, &valid_entries, |e| {
                e.weight as f64 + e.rarity_bonus as f64 * rarity_mult
            });
            let entry = match selected {
                Some(entry) => *entry,
                None => continue,
            };
            if entry.weight == 0 && entry.rarity_bonus == 0 {
                continue;
            }

            match &entry.entry_type {
                EntryType::NoDrop => continue,
                EntryType::Equipment => drops.push(Drop::Equipment),
                EntryType::Stone => drops.push(Drop::Stone),
                EntryType::Gold { count, per_level } => {
                    let base = rng.gen_range(count.min..=count.max)
                        + (per_level * level as f64).floor() as u32;
                    let amount = apply_quantity_mult(base, gold_mult, rng);
                    if amount > 0 {
                        drops.push(Drop::Gold { amount });
                    }
                }
                EntryType::Table { id } => {
                    let nested_table = registry
                        .get(id)
                        .ok_or_else(|| RollError::UnknownTable(id.clone()))?;
                    let nested_drops =
                        nested_table.roll(rarity_mult, gold_mult, level, rng, registry, depth + 1)?;
                    drops.extend(nested_drops);
                }
            }
        }

        tracing::debug!(table = %self.id, level, drops = drops.len(), "table rolled");
        Ok(drops)
    }

    fn select_roll_count<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        let total_weight: u32 = self.rolls.iter().map(|r| r.weight).sum();
        if total_weight == 0 {
            return 1;
        }

        let mut roll = rng.gen_range(0..total_weight);
        for option in &self.rolls {
            if roll < option.weight {
                return option.count;
            }
            roll -= option.weight;
        }

        self.rolls.last().map(|r| r.count).unwrap_or(1)
    }

    /// Ids of tables this one references
    pub fn nested_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|e| match &e.entry_type {
            EntryType::Table { id } => Some(id.as_str()),
            _ => None,
        })
    }
}

impl Entry {
    fn from_config(config: EntryConfig) -> Result<Self, RollError> {
        let entry_type = match config.entry_type.as_str() {
            "no_drop" => EntryType::NoDrop,
            "equipment" => EntryType::Equipment,
            "stone" => EntryType::Stone,
            "gold" => {
                let count = config.count.unwrap_or(CountConfig::Single(1));
                let (min, max) = (count.min(), count.max());
                EntryType::Gold {
                    count: CountRange {
                        min: min.min(max),
                        max: min.max(max),
                    },
                    per_level: config.per_level.max(0.0),
                }
            }
            "table" => EntryType::Table {
                id: config.id.unwrap_or_default(),
            },
            _ => {
                return Err(RollError::InvalidEntryType(config.entry_type));
            }
        };

        Ok(Entry {
            entry_type,
            weight: config.weight,
            rarity_bonus: config.rarity_bonus,
            min_level: config.min_level,
            max_level: config.max_level,
        })
    }

    fn level_valid(&self, level: u32) -> bool {
        if let Some(min) = self.min_level {
            if level < min {
                return false;
            }
        }
        if let Some(max) = self.max_level {
            if level > max {
                return false;
            }
        }
        true
    }
}

/// Apply quantity multiplier with fractional chance for extra
fn apply_quantity_mult<R: Rng + ?Sized>(base: u32, mult: f64, rng: &mut R) -> u32 {
    let scaled = base as f64 * mult.max(0.0);
    let guaranteed = scaled.floor() as u32;
    let fraction = scaled.fract();

    if rng.gen::<f64>() < fraction {
        guaranteed + 1
    } else {
        guaranteed
    }
}
