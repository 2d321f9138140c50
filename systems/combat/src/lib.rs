#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure combat resolution over the rock-paper-scissors relation.

use rps_tactics_core::{AgentSnapshot, Command, CombatOutcome, Weapon};

/// Resolves two weapons under the standard rock-paper-scissors relation.
#[must_use]
pub fn resolve(attacker: Weapon, defender: Weapon) -> CombatOutcome {
    if attacker == defender {
        CombatOutcome::Draw
    } else if attacker.beats(defender) {
        CombatOutcome::AttackerWins
    } else {
        CombatOutcome::DefenderWins
    }
}

/// Translates a resolved combat round into the damage command it implies.
///
/// The loser takes the winner's fixed damage; a draw implies no command at
/// all. Life bookkeeping and death detection stay with the world.
#[must_use]
pub fn damage_command(attacker: &AgentSnapshot, defender: &AgentSnapshot) -> Option<Command> {
    match resolve(attacker.weapon, defender.weapon) {
        CombatOutcome::Draw => None,
        CombatOutcome::AttackerWins => Some(Command::ApplyDamage {
            target: defender.id,
            amount: attacker.damage,
        }),
        CombatOutcome::DefenderWins => Some(Command::ApplyDamage {
            target: attacker.id,
            amount: defender.damage,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{damage_command, resolve};
    use proptest::prelude::*;
    use rps_tactics_core::{
        AgentId, AgentKind, AgentSnapshot, Command, CombatOutcome, TileCoord, Weapon,
    };
    use std::time::Duration;

    fn snapshot(id: u32, weapon: Weapon, damage: i32) -> AgentSnapshot {
        AgentSnapshot {
            id: AgentId::new(id),
            kind: AgentKind::Enemy,
            tile: TileCoord::new(0, 0),
            weapon,
            life: 100,
            max_life: 100,
            damage,
            movement_range: 3,
            next_hop: None,
            ready_for_step: false,
            accumulated: Duration::ZERO,
        }
    }

    #[test]
    fn scissors_cut_paper() {
        assert_eq!(
            resolve(Weapon::Scissors, Weapon::Paper),
            CombatOutcome::AttackerWins
        );
    }

    #[test]
    fn loser_takes_the_winners_damage() {
        let attacker = snapshot(1, Weapon::Scissors, 40);
        let defender = snapshot(2, Weapon::Paper, 70);

        assert_eq!(
            damage_command(&attacker, &defender),
            Some(Command::ApplyDamage {
                target: AgentId::new(2),
                amount: 40,
            })
        );

        let reversed = damage_command(&defender, &attacker);
        assert_eq!(
            reversed,
            Some(Command::ApplyDamage {
                target: AgentId::new(2),
                amount: 40,
            })
        );
    }

    #[test]
    fn draws_imply_no_damage() {
        let attacker = snapshot(1, Weapon::Rock, 40);
        let defender = snapshot(2, Weapon::Rock, 70);
        assert_eq!(damage_command(&attacker, &defender), None);
    }

    fn weapon_strategy() -> impl Strategy<Value = Weapon> {
        prop_oneof![
            Just(Weapon::Rock),
            Just(Weapon::Paper),
            Just(Weapon::Scissors),
        ]
    }

    proptest! {
        #[test]
        fn resolution_is_antisymmetric(a in weapon_strategy(), b in weapon_strategy()) {
            let forward = resolve(a, b);
            let backward = resolve(b, a);
            let expected = match forward {
                CombatOutcome::Draw => CombatOutcome::Draw,
                CombatOutcome::AttackerWins => CombatOutcome::DefenderWins,
                CombatOutcome::DefenderWins => CombatOutcome::AttackerWins,
            };
            prop_assert_eq!(backward, expected);
        }

        #[test]
        fn equal_weapons_always_draw(a in weapon_strategy()) {
            prop_assert_eq!(resolve(a, a), CombatOutcome::Draw);
        }
    }
}
