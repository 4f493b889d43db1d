//! stat_core - Player stat aggregation and combat resolution
//!
//! This library provides:
//! - Player: attributes, gear, stones and passive allocations
//! - Stat aggregation: a pure pass from those inputs to derived stats
//! - Passive tree: allocation and per-node stat totals
//! - Combat resolution: one attack-and-retaliation exchange per tick
//!
//! # Quick Start
//!
//! ```rust
//! use stat_core::prelude::*;
//! use loot_core::{EquipmentSlot, Generator};
//!
//! let mut player = Player::new();
//! let mut sword = Generator::builtin().generate_equipment_seeded(5, false, 7);
//! sword.slot = EquipmentSlot::Weapon;
//! player.equip(sword);
//!
//! let player = calculate_player_stats(&player, builtin_passive_tree());
//! let goblin = Enemy::new("goblin-1", "Goblin", EnemyType::Melee, 3, 40.0);
//! let result = simulate_combat_tick(&player, &goblin);
//! println!("{}", result.message);
//! ```

pub mod combat;
pub mod config;
pub mod damage;
pub mod defense;
pub mod passive;
pub mod player;
pub mod prelude;
pub mod source;
pub mod stat_block;
pub mod types;

// Core API - what most users need
pub use combat::{simulate_combat_tick, simulate_combat_tick_with_rng, CombatResult};
pub use player::{DerivedStats, Player, PlayerRecord};
pub use stat_block::{calculate_player_stats, derive_stats};
pub use types::{Attribute, Attributes, Enemy, EnemyType, LegacySkills, SpecialAbility};

// Passive tree
pub use passive::{
    allocate_node, builtin_passive_tree, calculate_passive_tree_stats, can_allocate_node,
    get_skill_modifiers_from_tree, PassiveTree, PassiveTreeState,
};

// Configuration
pub use config::{constants, init_constants, init_constants_default, GameConstants};

// Advanced: Custom stat sources
pub use source::StatSource;

// Re-export commonly needed loot_core types
pub use loot_core::{DamageType, EquipmentSlot, EquipmentStats, Stat, StatusEffect};
