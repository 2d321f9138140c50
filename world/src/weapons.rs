//! Weapon-cycle permutations and the movement-driven rotation rule.

use rand::seq::SliceRandom;
use rand::Rng;

use rps_tactics_core::{GridDelta, Weapon, WeaponCompass};

/// Pair of cyclic weapon permutations indexed by movement axis.
///
/// Both sequences are drawn once per session; an agent's weapon advances
/// along whichever sequence matches the axis of its last completed step.
#[derive(Clone, Debug)]
pub(crate) struct WeaponCycle {
    horizontal: [Weapon; 3],
    vertical: [Weapon; 3],
}

impl WeaponCycle {
    /// Draws fresh permutations from the session RNG.
    pub(crate) fn shuffled<R: Rng>(rng: &mut R) -> Self {
        let mut horizontal = Weapon::ALL;
        horizontal.shuffle(rng);
        let mut vertical = Weapon::ALL;
        vertical.shuffle(rng);
        Self {
            horizontal,
            vertical,
        }
    }

    /// Advances a weapon along the axis of the provided movement delta.
    ///
    /// The vertical axis takes precedence when both components are nonzero;
    /// a zero delta leaves the weapon unchanged.
    pub(crate) fn rotate(&self, weapon: Weapon, delta: GridDelta) -> Weapon {
        if delta.dy() != 0 {
            advance(&self.vertical, weapon, delta.dy())
        } else if delta.dx() != 0 {
            advance(&self.horizontal, weapon, delta.dx())
        } else {
            weapon
        }
    }

    /// Weapons reachable by a single step in each direction, for display.
    ///
    /// Both axes are indexed from the weapon's position in the vertical
    /// sequence.
    pub(crate) fn compass(&self, weapon: Weapon) -> WeaponCompass {
        let index = position(&self.vertical, weapon);
        WeaponCompass {
            up: self.vertical[step(index, 1)],
            down: self.vertical[step(index, -1)],
            left: self.horizontal[step(index, -1)],
            right: self.horizontal[step(index, 1)],
        }
    }
}

fn advance(sequence: &[Weapon; 3], weapon: Weapon, amount: i32) -> Weapon {
    sequence[step(position(sequence, weapon), amount)]
}

fn position(sequence: &[Weapon; 3], weapon: Weapon) -> usize {
    // Sequences are permutations of every weapon kind, so the lookup
    // always succeeds.
    sequence.iter().position(|&entry| entry == weapon).unwrap_or(0)
}

fn step(index: usize, amount: i32) -> usize {
    (index as i32 + amount).rem_euclid(3) as usize
}

#[cfg(test)]
mod tests {
    use super::WeaponCycle;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rps_tactics_core::{GridDelta, Weapon};

    fn fixed_cycle() -> WeaponCycle {
        WeaponCycle {
            horizontal: [Weapon::Scissors, Weapon::Rock, Weapon::Paper],
            vertical: [Weapon::Rock, Weapon::Paper, Weapon::Scissors],
        }
    }

    #[test]
    fn vertical_step_advances_the_vertical_sequence() {
        let cycle = fixed_cycle();
        assert_eq!(
            cycle.rotate(Weapon::Rock, GridDelta::new(0, 1)),
            Weapon::Paper
        );
        assert_eq!(
            cycle.rotate(Weapon::Rock, GridDelta::new(0, -1)),
            Weapon::Scissors
        );
    }

    #[test]
    fn horizontal_step_advances_the_horizontal_sequence() {
        let cycle = fixed_cycle();
        assert_eq!(
            cycle.rotate(Weapon::Rock, GridDelta::new(1, 0)),
            Weapon::Paper
        );
        assert_eq!(
            cycle.rotate(Weapon::Rock, GridDelta::new(-1, 0)),
            Weapon::Scissors
        );
    }

    #[test]
    fn vertical_axis_wins_on_mixed_deltas() {
        let cycle = fixed_cycle();
        assert_eq!(
            cycle.rotate(Weapon::Rock, GridDelta::new(1, 1)),
            cycle.rotate(Weapon::Rock, GridDelta::new(0, 1))
        );
    }

    #[test]
    fn zero_delta_is_a_no_op() {
        let cycle = fixed_cycle();
        for weapon in Weapon::ALL {
            assert_eq!(cycle.rotate(weapon, GridDelta::ZERO), weapon);
        }
    }

    #[test]
    fn compass_reads_both_axes_from_the_vertical_index() {
        let cycle = fixed_cycle();
        let compass = cycle.compass(Weapon::Paper);

        // Paper sits at vertical index 1; both axes are read from there.
        assert_eq!(compass.up, Weapon::Scissors);
        assert_eq!(compass.down, Weapon::Rock);
        assert_eq!(compass.right, Weapon::Paper);
        assert_eq!(compass.left, Weapon::Scissors);
    }

    #[test]
    fn shuffled_sequences_are_permutations() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let cycle = WeaponCycle::shuffled(&mut rng);

        for weapon in Weapon::ALL {
            assert!(cycle.horizontal.contains(&weapon));
            assert!(cycle.vertical.contains(&weapon));
        }
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
        fn three_steps_return_to_the_start(
            seed in any::<u64>(),
            weapon in weapon_strategy(),
            vertical in any::<bool>(),
            forward in any::<bool>(),
        ) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let cycle = WeaponCycle::shuffled(&mut rng);
            let amount = if forward { 1 } else { -1 };
            let delta = if vertical {
                GridDelta::new(0, amount)
            } else {
                GridDelta::new(amount, 0)
            };

            let mut current = weapon;
            for _ in 0..3 {
                current = cycle.rotate(current, delta);
            }
            prop_assert_eq!(current, weapon);
        }
    }
}
