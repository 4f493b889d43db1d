//! Defense system - dodge and crit chances

mod evasion;

pub use evasion::{enemy_dodge_chance, player_crit_chance, player_dodge_chance, WeaponProfile};
