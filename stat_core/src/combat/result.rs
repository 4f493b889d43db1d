//! Combat result types

use crate::player::Player;
use crate::types::Enemy;
use loot_core::{DamageType, StatusEffect};
use serde::{Deserialize, Serialize};

/// Snapshot of one combat exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatResult {
    /// Player after the exchange
    pub player: Player,
    /// Enemy after the exchange
    pub enemy: Enemy,
    pub enemy_defeated: bool,
    /// Human-readable log line
    pub message: String,

    /// The player's attack landed
    pub player_hit: bool,
    pub enemy_dodged: bool,
    pub player_dodged: bool,
    pub critical: bool,
    pub damage_dealt: u32,
    pub damage_taken: u32,
    pub damage_type: DamageType,
    pub status_effect: Option<StatusEffect>,

    /// Player dropped to 0 hp and was revived
    pub player_revived: bool,
    pub gold_lost: u64,
}
