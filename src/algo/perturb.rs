use crate::core::{Instance, Move, Schedule};
use rand::Rng;

/// Applies `strength` random moves to the schedule.
/// Inapplicable draws are discarded and drawn again; nothing is scored in between.
pub fn perturb(instance: &Instance, schedule: &mut Schedule, strength: usize, rng: &mut impl Rng) {
    for _ in 0..strength {
        let mv = loop {
            let mv = Move::random(instance, schedule, rng);
            if mv.can_apply(instance, schedule) {
                break mv;
            }
        };

        log::trace!("Perturbing with {mv}");
        let _ = mv.apply(instance, schedule);
    }
}
