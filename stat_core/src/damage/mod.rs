//! Damage helpers shared by both sides of a combat exchange

mod calculation;

pub use calculation::{
    apply_crit, apply_elemental, calculate_damage_variance, calculate_damage_variance_with,
    status_for, ElementalOutcome,
};

use crate::config::EnemyDamageConstants;
use crate::types::{Enemy, EnemyType};

/// Enemy damage before variance: `max(minimum, type base + level × per_level)`
///
/// Casters and unknown types use the `other` base.
pub fn enemy_base_damage(enemy: &Enemy, table: &EnemyDamageConstants) -> f64 {
    let base = match enemy.enemy_type {
        EnemyType::Melee => table.melee,
        EnemyType::Ranged => table.ranged,
        EnemyType::Caster | EnemyType::Other => table.other,
    };
    (base + f64::from(enemy.level) * table.per_level).max(table.minimum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enemy_base_damage() {
        let table = EnemyDamageConstants::default();
        let goblin = Enemy::new("g", "Goblin", EnemyType::Melee, 4, 30.0);
        assert_eq!(enemy_base_damage(&goblin, &table), 2.9);

        let archer = Enemy::new("a", "Archer", EnemyType::Ranged, 0, 30.0);
        assert_eq!(enemy_base_damage(&archer, &table), 0.75);

        let shaman = Enemy::new("s", "Shaman", EnemyType::Caster, 2, 30.0);
        assert_eq!(enemy_base_damage(&shaman, &table), 2.0);

        let mut low = EnemyDamageConstants::default();
        low.melee = 0.1;
        low.per_level = 0.0;
        assert_eq!(enemy_base_damage(&goblin, &low), 0.5);
    }
}
