//! Prelude module for convenient imports
//!
//! ```rust
//! use stat_core::prelude::*;
//! ```

// Core types
pub use crate::player::{DerivedStats, Player, PlayerRecord};
pub use crate::types::{Attribute, Attributes, Enemy, EnemyType, SpecialAbility};

// Aggregation
pub use crate::stat_block::{calculate_player_stats, derive_stats};

// Passive tree
pub use crate::passive::{allocate_node, builtin_passive_tree, can_allocate_node, PassiveTree, PassiveTreeState};

// Combat
pub use crate::combat::{simulate_combat_tick, simulate_combat_tick_with_rng, CombatResult};

// Config
pub use crate::config::{init_constants, init_constants_default};

// Sources (for advanced use)
pub use crate::source::StatSource;

// Re-exports from loot_core
pub use loot_core::{DamageType, Stat, StatusEffect};
