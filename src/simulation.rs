//! The simulation state and the tick that advances it.
//!
//! A [`Simulation`] owns the grid, the people, the hazard field, the transmission counters and
//! the random number generator. [`Simulation::step`] runs one tick in a fixed order:
//!
//! 1. clear every person's `newly_infected` flag;
//! 2. let every person move, in an order reshuffled each tick;
//! 3. direct contact: susceptible people sharing a cell with an infected person are exposed;
//! 4. age the hazard field, dropping expired contamination;
//! 5. infected people contaminate their cell and its four neighbors;
//! 6. susceptible people standing on contaminated cells are exposed;
//! 7. promote the newly infected to infected;
//! 8. send the counters to the metrics sink;
//! 9. stop once everyone is infected.
//!
//! Every random draw comes from the simulation's single generator in that order, so two
//! simulations built from the same parameters and seed stay identical tick for tick.
use log::{debug, info, trace};
use rand::Rng;

use crate::error::GridSpreadError;
use crate::grid::{Coord, Grid};
use crate::hazard::HazardField;
use crate::parameters::Parameters;
use crate::person::{Person, PersonId};
use crate::random::{rng_from_seed, shuffled_indices, SmallRng};
use crate::report::{MetricsSink, TickCounts};
use crate::snapshot::{AgentView, SimulationSnapshot};

/// Base probability of infection for a susceptible person sharing a cell with an infected one.
pub const CONTACT_PROBABILITY: f64 = 0.5;

pub struct Simulation<R: Rng = SmallRng> {
    grid: Grid,
    people: Vec<Person>,
    hazard: HazardField,
    rng: R,
    seed: Option<u64>,
    tick: usize,
    interaction_infections: usize,
    location_infections: usize,
    running: bool,
}

impl Simulation<SmallRng> {
    /// Builds a simulation from `parameters`, seeding a [`SmallRng`] from `parameters.seed` (or
    /// from the operating system when there is none).
    ///
    /// # Errors
    /// Returns `GridSpreadError::ParameterError` if the parameters are invalid.
    pub fn new(parameters: &Parameters) -> Result<Self, GridSpreadError> {
        parameters.validate()?;
        let (rng, seed) = rng_from_seed(parameters.seed);
        let mut simulation = Self::with_rng(parameters, rng)?;
        simulation.seed = Some(seed);
        Ok(simulation)
    }
}

impl<R: Rng> Simulation<R> {
    /// Builds a simulation from `parameters`, drawing from `rng`. `parameters.seed` is ignored.
    ///
    /// Setup draws, in order: one shuffle of the person indices (the first `initial_infected`
    /// are infected, the next `comorbid_count` have a comorbidity), then an x and a y
    /// coordinate for each person in id order.
    ///
    /// # Errors
    /// Returns `GridSpreadError::ParameterError` if the parameters are invalid.
    pub fn with_rng(parameters: &Parameters, mut rng: R) -> Result<Self, GridSpreadError> {
        parameters.validate()?;
        let population = parameters.population_size;

        let order = shuffled_indices(population, &mut rng);
        let (infected_ids, rest) = order.split_at(parameters.initial_infected);
        let comorbid_ids = &rest[..parameters.comorbid_count];
        let mut is_infected = vec![false; population];
        let mut has_comorbidity = vec![false; population];
        for &index in infected_ids {
            is_infected[index] = true;
        }
        for &index in comorbid_ids {
            has_comorbidity[index] = true;
        }

        let mut grid = Grid::new(parameters.width, parameters.height);
        let mut people = Vec::with_capacity(population);
        for index in 0..population {
            let mut person = Person::new(
                PersonId(index),
                is_infected[index],
                has_comorbidity[index],
                parameters.moving_probability,
            );
            let x = rng.random_range(0..parameters.width);
            let y = rng.random_range(0..parameters.height);
            person.place(&mut grid, Coord::new(x, y));
            people.push(person);
        }

        debug!(
            "created {} people on a {}x{} grid ({} infected, {} comorbid)",
            population,
            parameters.width,
            parameters.height,
            parameters.initial_infected,
            parameters.comorbid_count
        );
        Ok(Self::from_population(grid, people, rng))
    }

    /// Builds a simulation from people who have already been placed on `grid`.
    ///
    /// # Panics
    /// Panics if the people are not numbered `0..n` in order, or if a person is not in the grid
    /// cell matching their position.
    pub fn from_population(grid: Grid, people: Vec<Person>, rng: R) -> Self {
        for (index, person) in people.iter().enumerate() {
            assert_eq!(person.id(), PersonId(index), "people must be numbered in order");
            assert!(
                grid.agents_at(person.position()).contains(&person.id()),
                "{:?} is not on the grid at {:?}",
                person.id(),
                person.position()
            );
        }
        let hazard = HazardField::new(grid.width(), grid.height());
        let running = !people.iter().all(Person::is_infected);
        if !running {
            info!("everyone is infected at construction; the simulation will not run");
        }
        Simulation {
            grid,
            people,
            hazard,
            rng,
            seed: None,
            tick: 0,
            interaction_infections: 0,
            location_infections: 0,
            running,
        }
    }

    /// Runs one tick and reports its counters to `sink`. Once the simulation has stopped this
    /// does nothing: no random draws, no state changes and nothing sent to `sink`.
    pub fn step(&mut self, sink: &mut impl MetricsSink) {
        if !self.running {
            debug!("tick requested after everyone was infected; nothing to do");
            return;
        }
        self.tick += 1;
        trace!("starting tick {}", self.tick);

        for person in &mut self.people {
            person.reset_newly_infected();
        }
        self.activate_people();
        self.direct_contact_transmission();
        let expired = self.hazard.age();
        trace!("{expired} hazard cells expired");
        self.regenerate_hazard();
        self.location_transmission();
        for person in &mut self.people {
            person.commit_infection();
        }

        let counts = self.counts();
        debug!(
            "tick {}: {} infected, {} susceptible, {} contact / {} location infections",
            counts.tick,
            counts.infected,
            counts.susceptible,
            counts.interaction_infections,
            counts.location_infections
        );
        sink.record(&counts);

        if counts.susceptible == 0 {
            info!("everyone is infected after {} ticks", self.tick);
            self.running = false;
        }
    }

    /// Steps until everyone is infected or `max_ticks` ticks have run in this call. Returns the
    /// number of ticks run.
    pub fn run(&mut self, max_ticks: usize, sink: &mut impl MetricsSink) -> usize {
        let mut ticks = 0;
        while self.running && ticks < max_ticks {
            self.step(sink);
            ticks += 1;
        }
        ticks
    }

    fn activate_people(&mut self) {
        let order = shuffled_indices(self.people.len(), &mut self.rng);
        for index in order {
            self.people[index].move_on(&mut self.grid, &mut self.rng);
        }
    }

    fn direct_contact_transmission(&mut self) {
        for (_, occupants) in self.grid.cells() {
            let has_infected = occupants
                .iter()
                .any(|id| self.people[id.0].is_infected());
            if !has_infected {
                continue;
            }
            for id in occupants {
                let person = &mut self.people[id.0];
                if person.is_infected() {
                    continue;
                }
                if person.attempt_infection(&mut self.rng, CONTACT_PROBABILITY) {
                    trace!("{id:?} infected by contact at {:?}", person.position());
                    self.interaction_infections += 1;
                }
            }
        }
    }

    // Status is read before this tick's infections are committed, so people infected during
    // this tick do not contaminate anything until the next one.
    fn regenerate_hazard(&mut self) {
        for person in self.people.iter().filter(|person| person.is_infected()) {
            self.hazard.contaminate_around(&self.grid, person.position());
        }
    }

    fn location_transmission(&mut self) {
        for person in &mut self.people {
            if person.is_infected() || person.newly_infected() {
                continue;
            }
            let Some(cell) = self.hazard.get(person.position()) else {
                continue;
            };
            let probability = cell.probability;
            if person.attempt_infection(&mut self.rng, probability) {
                trace!(
                    "{:?} infected by contamination at {:?}",
                    person.id(),
                    person.position()
                );
                self.location_infections += 1;
            }
        }
    }

    #[must_use]
    pub fn counts(&self) -> TickCounts {
        let infected = self.infected_count();
        TickCounts {
            tick: self.tick,
            interaction_infections: self.interaction_infections,
            location_infections: self.location_infections,
            infected,
            susceptible: self.people.len() - infected,
        }
    }

    #[must_use]
    pub fn infected_count(&self) -> usize {
        self.people.iter().filter(|person| person.is_infected()).count()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Ticks run so far.
    #[must_use]
    pub fn tick(&self) -> usize {
        self.tick
    }

    #[must_use]
    pub fn interaction_infections(&self) -> usize {
        self.interaction_infections
    }

    #[must_use]
    pub fn location_infections(&self) -> usize {
        self.location_infections
    }

    /// The seed the generator was created from, when the simulation seeded it itself.
    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn hazard(&self) -> &HazardField {
        &self.hazard
    }

    #[must_use]
    pub fn people(&self) -> &[Person] {
        &self.people
    }

    #[must_use]
    pub fn person(&self, id: PersonId) -> Option<&Person> {
        self.people.get(id.0)
    }

    /// What a renderer needs to draw each person.
    pub fn agent_views(&self) -> impl Iterator<Item = AgentView> + '_ {
        self.people.iter().map(AgentView::from)
    }

    #[must_use]
    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot::capture(self)
    }
}
