//! StatSource - Trait and implementations for stat providers

use crate::passive::{calculate_passive_tree_stats, PassiveTree, PassiveTreeState};
use crate::stat_block::StatAccumulator;
use loot_core::{Equipment, EquipmentSlot, Stone};
use std::collections::{BTreeMap, HashMap};

/// Trait for anything that contributes stats to the equipment+passive totals
pub trait StatSource: Send + Sync {
    /// Unique identifier for this source
    fn id(&self) -> &str;

    /// Priority for application order (higher = applied later)
    ///
    /// Gear applies at 0, the passive tree at 100.
    fn priority(&self) -> i32 {
        0
    }

    /// Apply this source's stats to the accumulator
    fn apply(&self, stats: &mut StatAccumulator);
}

/// Equipped items and the stones socketed into them
pub struct GearSource<'a> {
    equipment: &'a BTreeMap<EquipmentSlot, Equipment>,
    stones: HashMap<&'a str, &'a Stone>,
}

impl<'a> GearSource<'a> {
    /// Index the stone inventory once so each item is summed in one pass
    pub fn new(equipment: &'a BTreeMap<EquipmentSlot, Equipment>, stones: &'a [Stone]) -> Self {
        let stones = stones.iter().map(|s| (s.id.as_str(), s)).collect();
        GearSource { equipment, stones }
    }

    fn apply_item(&self, item: &Equipment, stats: &mut StatAccumulator) {
        stats.add_stats(&item.base_stats);
        for affix in &item.affixes {
            stats.add(affix.stat, affix.value);
        }
        for stone_id in item.socketed_stone_ids() {
            match self.stones.get(stone_id) {
                Some(stone) => {
                    stats.add_stats(&stone.base_stats);
                    for affix in &stone.affixes {
                        stats.add(affix.stat, affix.value);
                    }
                }
                None => {
                    tracing::warn!(stone = stone_id, item = %item.id, "socketed stone not in inventory, skipping");
                }
            }
        }
    }
}

impl StatSource for GearSource<'_> {
    fn id(&self) -> &str {
        "gear"
    }

    fn apply(&self, stats: &mut StatAccumulator) {
        for item in self.equipment.values() {
            self.apply_item(item, stats);
        }
    }
}

/// Allocated passive tree nodes
pub struct PassiveTreeSource<'a> {
    tree: &'a PassiveTree,
    state: &'a PassiveTreeState,
}

impl<'a> PassiveTreeSource<'a> {
    pub fn new(tree: &'a PassiveTree, state: &'a PassiveTreeState) -> Self {
        PassiveTreeSource { tree, state }
    }
}

impl StatSource for PassiveTreeSource<'_> {
    fn id(&self) -> &str {
        "passive_tree"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn apply(&self, stats: &mut StatAccumulator) {
        stats.add_stats(&calculate_passive_tree_stats(self.tree, self.state));
    }
}
