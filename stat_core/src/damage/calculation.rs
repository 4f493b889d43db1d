//! Damage calculation - variance, crits and elemental post-processing

use crate::config::{constants, ElementalConstants};
use loot_core::{DamageType, StatusEffect};
use rand::Rng;

/// Floor of a uniform draw in `[damage × 0.85, damage × 1.15)`
pub fn calculate_damage_variance<R: Rng + ?Sized>(damage: f64, rng: &mut R) -> f64 {
    calculate_damage_variance_with(damage, constants().combat.variance, rng)
}

/// Floor of a uniform draw in `[damage × (1 - variance), damage × (1 + variance))`
///
/// Always consumes one draw. Non-finite or negative damage yields 0.
pub fn calculate_damage_variance_with<R: Rng + ?Sized>(damage: f64, variance: f64, rng: &mut R) -> f64 {
    let draw = rng.gen::<f64>();
    if !damage.is_finite() || damage <= 0.0 {
        return 0.0;
    }
    let low = damage * (1.0 - variance);
    let high = damage * (1.0 + variance);
    (low + draw * (high - low)).floor().max(0.0)
}

/// Multiply and floor
pub fn apply_crit(damage: f64, multiplier: f64) -> f64 {
    (damage * multiplier).floor()
}

/// Damage after the weapon element, and the status it attached
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementalOutcome {
    pub damage: f64,
    pub status: Option<StatusEffect>,
}

/// Status an element can attach; physical attaches none
pub fn status_for(damage_type: DamageType) -> Option<StatusEffect> {
    match damage_type {
        DamageType::Physical => None,
        DamageType::Fire => Some(StatusEffect::Burning),
        DamageType::Ice => Some(StatusEffect::Frozen),
        DamageType::Lightning => Some(StatusEffect::Stunned),
        DamageType::Poison => Some(StatusEffect::Poisoned),
    }
}

/// Scale a hit by its element and roll the element's status
///
/// Physical hits pass through without consuming a draw. At most one status
/// attaches per hit.
pub fn apply_elemental<R: Rng + ?Sized>(
    damage: f64,
    damage_type: DamageType,
    table: &ElementalConstants,
    rng: &mut R,
) -> ElementalOutcome {
    let effect = match table.get(damage_type) {
        Some(effect) => effect,
        None => return ElementalOutcome { damage, status: None },
    };

    let damage = (damage * effect.damage_multiplier).floor();
    let status = if rng.gen::<f64>() < effect.status_chance {
        status_for(damage_type)
    } else {
        None
    };
    ElementalOutcome { damage, status }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loot_core::rng::ScriptedRng;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_variance_edges() {
        assert_eq!(calculate_damage_variance_with(10.0, 0.15, &mut ScriptedRng::constant(0.0)), 8.0);
        assert_eq!(calculate_damage_variance_with(10.0, 0.15, &mut ScriptedRng::constant(0.5)), 10.0);
        assert_eq!(calculate_damage_variance_with(10.0, 0.15, &mut ScriptedRng::constant(0.999_999)), 11.0);
    }

    #[test]
    fn test_variance_degenerate_input() {
        let mut rng = ScriptedRng::constant(0.5);
        assert_eq!(calculate_damage_variance_with(f64::NAN, 0.15, &mut rng), 0.0);
        assert_eq!(calculate_damage_variance_with(-4.0, 0.15, &mut rng), 0.0);
        assert_eq!(rng.consumed(), 2);
    }

    #[test]
    fn test_apply_crit_floors() {
        assert_eq!(apply_crit(11.0, 1.8), 19.0);
        assert_eq!(apply_crit(1.0, 1.8), 1.0);
    }

    #[test]
    fn test_elemental_table() {
        let table = ElementalConstants::default();

        let fire = apply_elemental(20.0, DamageType::Fire, &table, &mut ScriptedRng::constant(0.1));
        assert_eq!(fire, ElementalOutcome { damage: 22.0, status: Some(StatusEffect::Burning) });

        let ice = apply_elemental(20.0, DamageType::Ice, &table, &mut ScriptedRng::constant(0.5));
        assert_eq!(ice, ElementalOutcome { damage: 20.0, status: None });

        let poison = apply_elemental(10.0, DamageType::Poison, &table, &mut ScriptedRng::constant(0.2));
        assert_eq!(poison, ElementalOutcome { damage: 8.0, status: Some(StatusEffect::Poisoned) });

        let mut rng = ScriptedRng::constant(0.0);
        let physical = apply_elemental(7.0, DamageType::Physical, &table, &mut rng);
        assert_eq!(physical, ElementalOutcome { damage: 7.0, status: None });
        assert_eq!(rng.consumed(), 0);
    }

    proptest! {
        #[test]
        fn prop_variance_bounds_for_dps_10(seed in any::<u64>()) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            for _ in 0..64 {
                let damage = calculate_damage_variance(10.0, &mut rng);
                prop_assert!((8.0..=11.0).contains(&damage));
            }
        }
    }
}
