//! Turning a kill into concrete loot

use crate::drop::Drop;
use crate::registry::DropTableRegistry;
use crate::RollError;
use loot_core::{Equipment, Generator, Stone};
use rand::Rng;

/// Table rolled for ordinary kills
pub const NORMAL_TABLE: &str = "normal";
/// Table rolled for boss kills
pub const BOSS_TABLE: &str = "boss";

/// Circumstances of the kill
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LootContext {
    pub level: u32,
    pub from_boss: bool,
    /// Fraction; 0.5 makes `rarity_bonus` weights count 1.5 times
    pub magic_find: f64,
    /// Fraction; 0.5 means 50% more gold
    pub gold_find: f64,
}

impl LootContext {
    pub fn new(level: u32, from_boss: bool) -> Self {
        LootContext {
            level,
            from_boss,
            magic_find: 0.0,
            gold_find: 0.0,
        }
    }

    pub fn with_magic_find(mut self, magic_find: f64) -> Self {
        self.magic_find = magic_find;
        self
    }

    pub fn with_gold_find(mut self, gold_find: f64) -> Self {
        self.gold_find = gold_find;
        self
    }
}

/// Realized drops of one kill
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Loot {
    pub equipment: Vec<Equipment>,
    pub stones: Vec<Stone>,
    pub gold: u64,
}

impl Loot {
    pub fn is_empty(&self) -> bool {
        self.equipment.is_empty() && self.stones.is_empty() && self.gold == 0
    }
}

/// Roll the `boss` or `normal` table and generate each drop
pub fn generate_loot<R: Rng + ?Sized>(
    registry: &DropTableRegistry,
    generator: &Generator<'_>,
    ctx: LootContext,
    rng: &mut R,
) -> Result<Loot, RollError> {
    let table = if ctx.from_boss { BOSS_TABLE } else { NORMAL_TABLE };
    let rarity_mult = 1.0 + finite_or_zero(ctx.magic_find).max(0.0);
    let gold_mult = 1.0 + finite_or_zero(ctx.gold_find).max(0.0);
    let level = ctx.level.max(1);

    let drops = registry.roll(table, rarity_mult, gold_mult, level, rng)?;

    let mut loot = Loot::default();
    for drop in drops {
        match drop {
            Drop::Equipment => loot
                .equipment
                .push(generator.generate_equipment(level, ctx.from_boss, rng)),
            Drop::Stone => loot
                .stones
                .push(generator.generate_stone(level, ctx.from_boss, rng)),
            Drop::Gold { amount } => loot.gold = loot.gold.saturating_add(amount as u64),
        }
    }

    tracing::debug!(
        table,
        level,
        equipment = loot.equipment.len(),
        stones = loot.stones.len(),
        gold = loot.gold,
        "loot generated"
    );
    Ok(loot)
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
