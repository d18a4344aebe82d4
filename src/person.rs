use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::grid::{Coord, Grid};

/// Added to the base transmission probability for people with a comorbidity.
pub const COMORBIDITY_RISK: f64 = 0.25;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PersonId(pub usize);

/// A single mobile person. Infection only ever goes from susceptible to infected.
#[derive(Clone, Debug, PartialEq)]
pub struct Person {
    id: PersonId,
    position: Coord,
    is_infected: bool,
    has_comorbidity: bool,
    moving_probability: f64,
    newly_infected: bool,
}

impl Person {
    /// Creates a person who has not been placed on a grid yet; [`Person::place`] sets the
    /// position.
    #[must_use]
    pub fn new(
        id: PersonId,
        is_infected: bool,
        has_comorbidity: bool,
        moving_probability: f64,
    ) -> Self {
        Person {
            id,
            position: Coord::new(0, 0),
            is_infected,
            has_comorbidity,
            moving_probability,
            newly_infected: false,
        }
    }

    #[must_use]
    pub fn id(&self) -> PersonId {
        self.id
    }

    #[must_use]
    pub fn position(&self) -> Coord {
        self.position
    }

    #[must_use]
    pub fn is_infected(&self) -> bool {
        self.is_infected
    }

    #[must_use]
    pub fn has_comorbidity(&self) -> bool {
        self.has_comorbidity
    }

    #[must_use]
    pub fn newly_infected(&self) -> bool {
        self.newly_infected
    }

    pub fn place(&mut self, grid: &mut Grid, coord: Coord) {
        self.position = grid.place(self.id, coord);
    }

    /// With probability `moving_probability` steps to one of the four neighboring cells, chosen
    /// uniformly. The gate draw is always taken; the choice draw only when the gate passes.
    pub fn move_on<R: Rng + ?Sized>(&mut self, grid: &mut Grid, rng: &mut R) {
        if rng.random::<f64>() < self.moving_probability {
            let neighbors = grid.neighbors(self.position);
            let target = neighbors[rng.random_range(0..neighbors.len())];
            self.position = grid.move_person(self.id, self.position, target);
        }
    }

    /// The probability this person is infected by an exposure of strength `base_probability`.
    #[must_use]
    pub fn infection_probability(&self, base_probability: f64) -> f64 {
        let p = if self.has_comorbidity {
            base_probability + COMORBIDITY_RISK
        } else {
            base_probability
        };
        p.min(1.0)
    }

    /// Exposes this person to an infection risk of `base_probability`. Returns false without
    /// drawing if the person is already infected; otherwise draws once and, on success, marks
    /// the person as newly infected. The infection takes effect at [`Person::commit_infection`].
    pub fn attempt_infection<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        base_probability: f64,
    ) -> bool {
        if self.is_infected {
            return false;
        }
        let p = self.infection_probability(base_probability);
        if rng.random::<f64>() < p {
            self.newly_infected = true;
            return true;
        }
        false
    }

    pub(crate) fn reset_newly_infected(&mut self) {
        self.newly_infected = false;
    }

    pub(crate) fn commit_infection(&mut self) {
        if self.newly_infected {
            self.is_infected = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn comorbidity_raises_infection_probability() {
        let healthy = Person::new(PersonId(0), false, false, 0.0);
        let comorbid = Person::new(PersonId(1), false, true, 0.0);
        assert_eq!(healthy.infection_probability(0.5), 0.5);
        assert_eq!(comorbid.infection_probability(0.5), 0.75);
        assert_eq!(comorbid.infection_probability(0.25), 0.5);
        assert_eq!(comorbid.infection_probability(0.9), 1.0);
    }

    #[test]
    fn infected_people_cannot_be_reinfected() {
        let mut rng = SmallRng::seed_from_u64(0);
        let mut person = Person::new(PersonId(0), true, false, 0.0);
        let before = rng.clone();
        assert!(!person.attempt_infection(&mut rng, 1.0));
        assert!(!person.newly_infected());
        // No draw was taken
        assert_eq!(rng.random::<u64>(), before.clone().random::<u64>());
    }

    #[test]
    fn certain_exposure_marks_newly_infected_until_commit() {
        let mut rng = SmallRng::seed_from_u64(0);
        let mut person = Person::new(PersonId(0), false, false, 0.0);
        assert!(person.attempt_infection(&mut rng, 1.0));
        assert!(person.newly_infected());
        assert!(!person.is_infected());

        person.commit_infection();
        assert!(person.is_infected());

        person.reset_newly_infected();
        assert!(!person.newly_infected());
        assert!(person.is_infected());
    }

    #[test]
    fn zero_exposure_never_infects() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut person = Person::new(PersonId(0), false, false, 0.0);
        for _ in 0..1000 {
            assert!(!person.attempt_infection(&mut rng, 0.0));
        }
    }

    fn infection_frequency(has_comorbidity: bool, base_probability: f64) -> f64 {
        let mut rng = SmallRng::seed_from_u64(42);
        let trials = 50_000;
        let mut infections = 0;
        for _ in 0..trials {
            let mut person = Person::new(PersonId(0), false, has_comorbidity, 0.0);
            if person.attempt_infection(&mut rng, base_probability) {
                infections += 1;
            }
        }
        f64::from(infections) / f64::from(trials)
    }

    #[test]
    fn contact_exposure_matches_expected_rates() {
        assert_relative_eq!(infection_frequency(false, 0.5), 0.5, max_relative = 0.02);
        assert_relative_eq!(infection_frequency(true, 0.5), 0.75, max_relative = 0.02);
    }

    #[test]
    fn stationary_person_stays_put() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut grid = Grid::new(4, 4);
        let mut person = Person::new(PersonId(0), false, false, 0.0);
        person.place(&mut grid, Coord::new(2, 2));
        for _ in 0..100 {
            person.move_on(&mut grid, &mut rng);
        }
        assert_eq!(person.position(), Coord::new(2, 2));
        assert_eq!(grid.agents_at(Coord::new(2, 2)), &[PersonId(0)]);
    }

    #[test]
    fn gate_draw_is_taken_even_when_staying_put() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut expected = rng.clone();
        let mut grid = Grid::new(4, 4);
        let mut person = Person::new(PersonId(0), false, false, 0.0);
        person.place(&mut grid, Coord::new(1, 1));

        person.move_on(&mut grid, &mut rng);
        let _ = expected.random::<f64>();
        assert_eq!(rng.random::<u64>(), expected.random::<u64>());
    }

    #[test]
    fn moving_person_steps_to_a_neighbor() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut grid = Grid::new(4, 4);
        let mut person = Person::new(PersonId(0), false, false, 1.0);
        person.place(&mut grid, Coord::new(0, 0));
        for _ in 0..100 {
            let before = person.position();
            person.move_on(&mut grid, &mut rng);
            assert!(grid.neighbors(before).contains(&person.position()));
            assert_eq!(grid.agents_at(person.position()), &[PersonId(0)]);
            assert!(grid.agents_at(before).is_empty());
        }
    }
}
