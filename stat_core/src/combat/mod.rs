//! Combat resolution - player versus enemy exchanges

mod resolution;
mod result;

pub use resolution::{simulate_combat_tick, simulate_combat_tick_with, simulate_combat_tick_with_rng};
pub use result::CombatResult;
