//! Passive tree: topology, allocation state and evaluation
//!
//! The tree is static reference data loaded once; a player's progress through
//! it is a [`PassiveTreeState`]. Allocation is monotonic: points are never
//! reclaimed.

use crate::config::{self, ConfigError};
use loot_core::{EquipmentStats, Stat};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

static BUILTIN_TREE: OnceLock<PassiveTree> = OnceLock::new();

const BUILTIN_TREE_TOML: &str = include_str!("../../config/passive_tree.toml");

/// The sample tree shipped with the crate, parsed once
pub fn builtin_passive_tree() -> &'static PassiveTree {
    BUILTIN_TREE.get_or_init(|| {
        PassiveTree::from_toml_str(BUILTIN_TREE_TOML).expect("built-in passive tree is valid")
    })
}

/// How a skill modifier combines with the skill's own value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierType {
    Flat,
    Percent,
}

/// A skill-specific adjustment granted by a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillModifier {
    pub skill_id: String,
    /// Skill property being modified ("damage", "area", "mana_cost", ...)
    pub property: String,
    pub value: f64,
    #[serde(rename = "type")]
    pub modifier_type: ModifierType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassiveNode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_cost")]
    pub cost: u32,
    #[serde(default = "default_max_rank")]
    pub max_rank: u32,
    /// Every listed node needs rank > 0 before this one can be taken
    #[serde(default)]
    pub requirements: Vec<String>,
    /// Flat stats per rank
    #[serde(default)]
    pub stats: BTreeMap<Stat, f64>,
    #[serde(default)]
    pub skill_modifiers: Vec<SkillModifier>,
}

fn default_cost() -> u32 {
    1
}

fn default_max_rank() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct TreeFile {
    #[serde(default)]
    nodes: Vec<PassiveNode>,
}

/// Static passive tree topology, keyed by node id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassiveTree {
    nodes: BTreeMap<String, PassiveNode>,
}

impl PassiveTree {
    /// Build a tree from nodes, validating ids and requirements
    pub fn from_nodes(nodes: Vec<PassiveNode>) -> Result<Self, ConfigError> {
        let mut map = BTreeMap::new();
        for node in nodes {
            if node.max_rank == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "passive node '{}' has max_rank 0",
                    node.id
                )));
            }
            if node.stats.contains_key(&Stat::Unknown) {
                return Err(ConfigError::ValidationError(format!(
                    "passive node '{}' grants an unknown stat",
                    node.id
                )));
            }
            if let Some(previous) = map.insert(node.id.clone(), node) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate passive node '{}'",
                    previous.id
                )));
            }
        }

        let tree = PassiveTree { nodes: map };
        for node in tree.nodes.values() {
            if let Some(missing) = node.requirements.iter().find(|r| !tree.nodes.contains_key(*r)) {
                return Err(ConfigError::ValidationError(format!(
                    "passive node '{}' requires unknown node '{}'",
                    node.id, missing
                )));
            }
        }
        Ok(tree)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: TreeFile = config::parse_toml(content)?;
        Self::from_nodes(file.nodes)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let file: TreeFile = config::load_toml(path)?;
        Self::from_nodes(file.nodes)
    }

    pub fn node(&self, id: &str) -> Option<&PassiveNode> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &PassiveNode> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes without requirements
    pub fn roots(&self) -> impl Iterator<Item = &PassiveNode> {
        self.nodes.values().filter(|n| n.requirements.is_empty())
    }
}

/// A player's allocation progress
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassiveTreeState {
    pub allocated_nodes: BTreeMap<String, u32>,
    pub available_points: u32,
}

impl PassiveTreeState {
    pub fn new(available_points: u32) -> Self {
        PassiveTreeState {
            allocated_nodes: BTreeMap::new(),
            available_points,
        }
    }

    pub fn rank(&self, id: &str) -> u32 {
        self.allocated_nodes.get(id).copied().unwrap_or(0)
    }
}

/// Allocated nodes with their ranks, skipping ids the tree does not know
fn allocated<'t>(
    tree: &'t PassiveTree,
    state: &'t PassiveTreeState,
) -> impl Iterator<Item = (&'t PassiveNode, u32)> + 't {
    state
        .allocated_nodes
        .iter()
        .filter(|(_, rank)| **rank > 0)
        .filter_map(move |(id, rank)| match tree.node(id) {
            Some(node) => Some((node, *rank)),
            None => {
                tracing::warn!(node = %id, "allocated passive node not in tree, skipping");
                None
            }
        })
}

/// Sum `stat × rank` over allocated nodes
pub fn calculate_passive_tree_stats(tree: &PassiveTree, state: &PassiveTreeState) -> EquipmentStats {
    let mut totals = EquipmentStats::new();
    for (node, rank) in allocated(tree, state) {
        for (stat, value) in &node.stats {
            totals.add(*stat, value * rank as f64);
        }
    }
    totals
}

/// Collect skill modifiers from allocated nodes, values scaled by rank
pub fn get_skill_modifiers_from_tree(tree: &PassiveTree, state: &PassiveTreeState) -> Vec<SkillModifier> {
    allocated(tree, state)
        .flat_map(|(node, rank)| {
            node.skill_modifiers.iter().map(move |m| SkillModifier {
                value: m.value * rank as f64,
                ..m.clone()
            })
        })
        .collect()
}

/// Whether `node_id` can take one more rank
pub fn can_allocate_node(tree: &PassiveTree, state: &PassiveTreeState, node_id: &str) -> bool {
    let node = match tree.node(node_id) {
        Some(node) => node,
        None => return false,
    };

    state.rank(node_id) < node.max_rank
        && state.available_points >= node.cost
        && node.requirements.iter().all(|r| state.rank(r) > 0)
}

/// Allocate one rank of `node_id`
///
/// Returns the state unchanged when [`can_allocate_node`] is false.
pub fn allocate_node(tree: &PassiveTree, state: &PassiveTreeState, node_id: &str) -> PassiveTreeState {
    let mut next = state.clone();
    if !can_allocate_node(tree, state, node_id) {
        return next;
    }
    let cost = tree.node(node_id).map(|n| n.cost).unwrap_or(0);

    *next.allocated_nodes.entry(node_id.to_string()).or_insert(0) += 1;
    next.available_points -= cost;
    next
}
