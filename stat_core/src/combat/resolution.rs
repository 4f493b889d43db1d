//! Combat tick resolution - one player attack and the enemy's answer

use super::result::CombatResult;
use crate::config::{constants, CombatConstants, GameConstants};
use crate::damage::{apply_crit, apply_elemental, calculate_damage_variance_with, enemy_base_damage};
use crate::defense::{enemy_dodge_chance, player_crit_chance, player_dodge_chance, WeaponProfile};
use crate::player::Player;
use crate::types::{Enemy, SpecialAbility};
use loot_core::DamageType;
use rand::Rng;

/// Resolve one combat tick with the thread RNG
pub fn simulate_combat_tick(player: &Player, enemy: &Enemy) -> CombatResult {
    let mut rng = rand::thread_rng();
    simulate_combat_tick_with_rng(player, enemy, &mut rng)
}

/// Resolve one combat tick with a provided RNG (for deterministic testing)
pub fn simulate_combat_tick_with_rng<R: Rng + ?Sized>(player: &Player, enemy: &Enemy, rng: &mut R) -> CombatResult {
    simulate_combat_tick_with(player, enemy, constants(), rng)
}

/// Resolve one combat tick against explicit constants
///
/// Draw order: enemy dodge; on a hit, damage variance, crit, then the
/// element's status roll (elemental weapons only); if the enemy survives a
/// hit, the player's dodge; on retaliation, enemy damage variance and the
/// precise roll (precise enemies only).
pub fn simulate_combat_tick_with<R: Rng + ?Sized>(
    player: &Player,
    enemy: &Enemy,
    constants: &GameConstants,
    rng: &mut R,
) -> CombatResult {
    let combat = &constants.combat;
    let mut player = player.clone();
    let mut enemy = enemy.clone();
    let weapon = WeaponProfile::of(&player);
    let enemy_dodge = enemy_dodge_chance(&enemy, combat);
    let player_dodge = player_dodge_chance(&player, &weapon, combat);

    let mut result = Outcome {
        damage_type: weapon.damage_type,
        ..Outcome::default()
    };
    let mut fragments = Vec::new();

    if rng.gen::<f64>() < enemy_dodge {
        result.enemy_dodged = true;
        tracing::trace!(enemy = %enemy.id, chance = enemy_dodge, "enemy dodged");
        fragments.push(format!("{} dodged your attack.", enemy.name));
    } else {
        let dealt = player_attack(&player, &enemy, &weapon, combat, rng, &mut result);
        enemy.hp = (enemy.hp - dealt).max(0.0);
        result.player_hit = true;
        result.damage_dealt = dealt as u32;

        if !enemy.is_alive() {
            result.enemy_defeated = true;
            tracing::trace!(enemy = %enemy.id, damage = dealt, "final blow");
            fragments.push(format!("Final blow! You hit {} for {} damage.", enemy.name, result.damage_dealt));
            annotate_attack(&result, &enemy, &mut fragments);
            fragments.push(format!("{} is defeated.", enemy.name));
            return result.finish(player, enemy, fragments);
        }

        tracing::trace!(enemy = %enemy.id, damage = dealt, remaining = enemy.hp, "player hit");
        fragments.push(format!("You hit {} for {} damage.", enemy.name, result.damage_dealt));
        annotate_attack(&result, &enemy, &mut fragments);
    }

    // Only a landed attack opens the player to a dodge roll
    if result.player_hit && rng.gen::<f64>() < player_dodge {
        result.player_dodged = true;
        tracing::trace!(chance = player_dodge, "player dodged");
        fragments.push(format!("You dodged {}'s attack.", enemy.name));
        return result.finish(player, enemy, fragments);
    }

    let (taken, ability) = enemy_attack(&enemy, combat, rng);
    player.hp -= taken;
    result.damage_taken = taken as u32;
    tracing::trace!(enemy = %enemy.id, damage = taken, hp = player.hp, "enemy retaliated");
    fragments.push(format!("{} hits you for {} damage.", enemy.name, result.damage_taken));
    if let Some(note) = ability {
        fragments.push(note);
    }

    if !player.is_alive() {
        let gold_lost = revive(&mut player, combat);
        result.player_revived = true;
        result.gold_lost = gold_lost;
        tracing::trace!(hp = player.hp, gold_lost, "player revived");
        fragments.push(format!(
            "You were knocked out and revived with {} HP, losing {} gold.",
            player.hp, gold_lost
        ));
    }

    result.finish(player, enemy, fragments)
}

/// Flags gathered while resolving, before the snapshot is built
#[derive(Debug, Default)]
struct Outcome {
    enemy_defeated: bool,
    player_hit: bool,
    enemy_dodged: bool,
    player_dodged: bool,
    critical: bool,
    damage_dealt: u32,
    damage_taken: u32,
    damage_type: DamageType,
    status_effect: Option<loot_core::StatusEffect>,
    player_revived: bool,
    gold_lost: u64,
}

impl Outcome {
    fn finish(self, player: Player, enemy: Enemy, fragments: Vec<String>) -> CombatResult {
        CombatResult {
            player,
            enemy,
            enemy_defeated: self.enemy_defeated,
            message: fragments.join(" "),
            player_hit: self.player_hit,
            enemy_dodged: self.enemy_dodged,
            player_dodged: self.player_dodged,
            critical: self.critical,
            damage_dealt: self.damage_dealt,
            damage_taken: self.damage_taken,
            damage_type: self.damage_type,
            status_effect: self.status_effect,
            player_revived: self.player_revived,
            gold_lost: self.gold_lost,
        }
    }
}

/// Damage of a landed player hit; at least 1
fn player_attack<R: Rng + ?Sized>(
    player: &Player,
    enemy: &Enemy,
    weapon: &WeaponProfile,
    combat: &CombatConstants,
    rng: &mut R,
    result: &mut Outcome,
) -> f64 {
    let base = player.stats.dps.floor().max(1.0);
    let mut damage = calculate_damage_variance_with(base, combat.variance, rng);

    if rng.gen::<f64>() < player_crit_chance(weapon, combat) {
        result.critical = true;
        damage = apply_crit(damage, combat.crit_multiplier);
        tracing::trace!(damage, "critical hit");
    }

    let elemental = apply_elemental(damage, weapon.damage_type, &combat.elemental, rng);
    if let Some(status) = elemental.status {
        tracing::trace!(enemy = %enemy.id, %status, "status applied");
    }
    result.status_effect = elemental.status;
    elemental.damage.max(1.0)
}

fn annotate_attack(result: &Outcome, enemy: &Enemy, fragments: &mut Vec<String>) {
    if result.critical {
        fragments.push("Critical hit!".to_string());
    }
    if result.damage_type.is_elemental() {
        fragments.push(format!("{} damage.", result.damage_type));
    }
    if let Some(status) = result.status_effect {
        fragments.push(format!("{} is {}!", enemy.name, status));
    }
}

/// Retaliation damage and the ability note, if an ability fired
fn enemy_attack<R: Rng + ?Sized>(enemy: &Enemy, combat: &CombatConstants, rng: &mut R) -> (f64, Option<String>) {
    let table = &combat.enemy_damage;
    let mut damage = calculate_damage_variance_with(enemy_base_damage(enemy, table), combat.variance, rng);

    let note = match enemy.special_ability {
        Some(SpecialAbility::Berserker) if enemy.hp_fraction() < table.berserker_threshold => {
            damage = (damage * table.berserker_multiplier).floor();
            Some(format!("{} goes berserk!", enemy.name))
        }
        Some(SpecialAbility::Precise) if rng.gen::<f64>() < table.precise_chance => {
            damage = (damage * table.precise_multiplier).floor();
            Some(format!("{} lands a precise strike!", enemy.name))
        }
        _ => None,
    };
    (damage, note)
}

/// Soft revive; returns the gold lost
fn revive(player: &mut Player, combat: &CombatConstants) -> u64 {
    let revive = &combat.revive;
    player.hp = (player.stats.max_hp * revive.hp_fraction).floor().max(1.0);
    let loss = u64::from(player.level)
        .saturating_mul(revive.gold_per_level)
        .min(revive.max_gold_loss);
    let lost = loss.min(player.gold);
    player.gold -= lost;
    lost
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EnemyType, LegacySkills};
    use loot_core::rng::ScriptedRng;
    use loot_core::{EquipmentSlot, Generator, Rarity, StatusEffect};
    use proptest::prelude::*;

    fn fighter(dps: f64) -> Player {
        let mut player = Player::new();
        player.stats.dps = dps;
        player
    }

    fn tick(player: &Player, enemy: &Enemy, draws: Vec<f64>) -> CombatResult {
        simulate_combat_tick_with(player, enemy, &GameConstants::default(), &mut ScriptedRng::new(draws))
    }

    #[test]
    fn test_hit_then_retaliation() {
        let player = fighter(10.0);
        let enemy = Enemy::new("g", "Goblin", EnemyType::Melee, 1, 100.0);
        // no dodge, variance mid, no crit, no player dodge, enemy variance mid
        let result = tick(&player, &enemy, vec![0.5, 0.5, 0.9, 0.5, 0.5]);
        assert!(result.player_hit);
        assert_eq!(result.damage_dealt, 10);
        assert_eq!(result.enemy.hp, 90.0);
        // 0.9 + 0.5 = 1.4 -> floor 1
        assert_eq!(result.damage_taken, 1);
        assert_eq!(result.player.hp, 119.0);
        assert!(!result.enemy_defeated);
        assert_eq!(result.message, "You hit Goblin for 10 damage. Goblin hits you for 1 damage.");
    }

    #[test]
    fn test_critical_hit() {
        let player = fighter(10.0);
        let enemy = Enemy::new("g", "Goblin", EnemyType::Melee, 1, 100.0);
        let result = tick(&player, &enemy, vec![0.5, 0.5, 0.0, 0.99, 0.5]);
        assert!(result.critical);
        assert_eq!(result.damage_dealt, 18);
        assert!(result.message.contains("Critical hit!"));
    }

    #[test]
    fn test_enemy_dodge_still_retaliates() {
        let player = fighter(10.0);
        let enemy = Enemy::new("g", "Goblin", EnemyType::Melee, 1, 100.0);
        let mut rng = ScriptedRng::new(vec![0.0, 0.5]);
        let result = simulate_combat_tick_with(&player, &enemy, &GameConstants::default(), &mut rng);
        assert!(result.enemy_dodged);
        assert!(!result.player_hit);
        assert_eq!(result.damage_dealt, 0);
        assert_eq!(result.enemy.hp, 100.0);
        assert_eq!(result.damage_taken, 1);
        assert_eq!(rng.consumed(), 2);
        assert!(result.message.starts_with("Goblin dodged your attack."));
    }

    #[test]
    fn test_player_dodge() {
        let mut player = fighter(10.0);
        player.legacy_skills = Some(LegacySkills { agility: 10, ..Default::default() });
        let enemy = Enemy::new("g", "Goblin", EnemyType::Melee, 30, 100.0);
        let result = tick(&player, &enemy, vec![0.5, 0.5, 0.9, 0.1]);
        assert!(result.player_dodged);
        assert_eq!(result.damage_taken, 0);
        assert_eq!(result.player.hp, player.hp);
        assert!(result.message.ends_with("You dodged Goblin's attack."));
    }

    #[test]
    fn test_elemental_status_and_message_order() {
        let mut player = fighter(10.0);
        let mut weapon = Generator::builtin().generate_equipment_seeded(5, false, 11);
        weapon.slot = EquipmentSlot::Weapon;
        weapon.rarity = Rarity::Common;
        weapon.damage_type = Some(DamageType::Fire);
        player.equip(weapon);
        let enemy = Enemy::new("g", "Goblin", EnemyType::Melee, 1, 100.0);

        // hit, variance, crit, burning, no player dodge, retaliation
        let result = tick(&player, &enemy, vec![0.5, 0.5, 0.0, 0.1, 0.99, 0.5]);
        assert_eq!(result.damage_type, DamageType::Fire);
        assert_eq!(result.status_effect, Some(StatusEffect::Burning));
        // 10 -> crit 18 -> fire 19
        assert_eq!(result.damage_dealt, 19);

        let message = &result.message;
        let attack = message.find("You hit").unwrap();
        let crit = message.find("Critical hit!").unwrap();
        let status = message.find("is burning!").unwrap();
        let retaliation = message.find("hits you").unwrap();
        assert!(attack < crit && crit < status && status < retaliation);
    }

    #[test]
    fn test_final_blow_skips_retaliation() {
        let player = fighter(50.0);
        let enemy = Enemy::new("g", "Goblin", EnemyType::Melee, 1, 20.0);
        let mut rng = ScriptedRng::new(vec![0.5, 0.5, 0.9]);
        let result = simulate_combat_tick_with(&player, &enemy, &GameConstants::default(), &mut rng);
        assert!(result.enemy_defeated);
        assert_eq!(result.enemy.hp, 0.0);
        assert_eq!(result.damage_taken, 0);
        assert_eq!(result.player, player);
        assert!(result.message.starts_with("Final blow!"));
        assert_eq!(rng.consumed(), 3);
    }

    #[test]
    fn test_berserker_below_threshold() {
        let player = fighter(1.0);
        let calm = Enemy::new("o", "Orc", EnemyType::Melee, 19, 100.0).with_ability(SpecialAbility::Berserker);
        let mut raging = calm.clone();
        raging.hp = 10.0;

        let calm = tick(&player, &calm, vec![0.0, 0.5]);
        let raging = tick(&player, &raging, vec![0.0, 0.5]);
        assert_eq!(calm.damage_taken, 10);
        assert_eq!(raging.damage_taken, 15);
        assert!(raging.message.ends_with("Orc goes berserk!"));
        assert!(!calm.message.contains("berserk"));
    }

    #[test]
    fn test_precise_strike() {
        let player = fighter(1.0);
        let enemy = Enemy::new("a", "Archer", EnemyType::Melee, 19, 100.0).with_ability(SpecialAbility::Precise);
        assert_eq!(tick(&player, &enemy, vec![0.0, 0.5, 0.1]).damage_taken, 13);
        assert_eq!(tick(&player, &enemy, vec![0.0, 0.5, 0.9]).damage_taken, 10);
    }

    #[test]
    fn test_unknown_ability_has_no_effect() {
        let player = fighter(1.0);
        let enemy = Enemy::new("w", "Wisp", EnemyType::Melee, 19, 100.0).with_ability(SpecialAbility::Unknown);
        assert_eq!(tick(&player, &enemy, vec![0.0, 0.5]).damage_taken, 10);
    }

    #[test]
    fn test_thread_rng_entry_point() {
        let player = fighter(5.0);
        let enemy = Enemy::new("g", "Goblin", EnemyType::Ranged, 2, 30.0);
        let result = simulate_combat_tick(&player, &enemy);
        assert!(result.enemy.hp <= enemy.hp);
        assert!(result.player.hp >= 1.0 || result.player_revived);
    }

    proptest! {
        #[test]
        fn prop_one_hp_enemy_always_falls(
            dps in 0.01f64..500.0,
            level in 1u32..100,
            kind in prop::sample::select(vec![EnemyType::Melee, EnemyType::Ranged, EnemyType::Caster]),
            draws in prop::collection::vec(0.0f64..1.0, 3),
        ) {
            let mut enemy = Enemy::new("e", "Target", kind, level, 50.0);
            enemy.hp = 1.0;
            let mut script = vec![0.999];
            script.extend(draws);
            let result = tick(&fighter(dps), &enemy, script);
            prop_assert!(result.enemy_defeated);
        }

        #[test]
        fn prop_revive_floor(
            max_hp in 1.0f64..2000.0,
            gold in 0u64..100,
            level in 1u32..20,
        ) {
            let mut player = fighter(1.0);
            player.stats.max_hp = max_hp;
            player.hp = 1.0;
            player.gold = gold;
            player.level = level;
            let enemy = Enemy::new("d", "Dragon", EnemyType::Melee, 60, 1000.0);

            let result = tick(&player, &enemy, vec![0.0, 0.0]);
            prop_assert!(result.player_revived);
            prop_assert_eq!(result.player.hp, (max_hp * 0.6).floor().max(1.0));
            let loss = (u64::from(level) * 2).min(10);
            prop_assert_eq!(result.player.gold, gold.saturating_sub(loss));
            prop_assert_eq!(result.gold_lost, gold.min(loss));
        }
    }
}
