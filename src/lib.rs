//! An agent-based model of SI (no recovery) disease spread on a toroidal grid.
//!
//! People wander a discrete 2-D torus. Infection travels two ways:
//! * direct contact between people who share a cell during a tick, and
//! * environmental contamination: every infected person leaves a short-lived hazard on their
//!   cell and its four Von Neumann neighbors, and susceptible people who stand on a hazardous
//!   cell may be infected by it.
//!
//! People with a comorbidity are more likely to be infected by either route. Once infected,
//! a person stays infected; the simulation stops when everyone is.
//!
//! The central object is the [`Simulation`], which owns all state and a single seeded random
//! number generator and advances one tick at a time with [`Simulation::step`]. A run is
//! reproduced exactly by reusing its seed:
//!
//! ```rust
//! use ixa_grid_spread::{ParametersBuilder, Simulation, TickHistory};
//!
//! let parameters = ParametersBuilder::default()
//!     .population_size(50)
//!     .seed(42)
//!     .build()
//!     .unwrap();
//! let mut simulation = Simulation::new(&parameters).unwrap();
//! let mut history = TickHistory::new();
//! simulation.run(100, &mut history);
//! assert_eq!(history.rows().len(), simulation.tick());
//! ```
//!
//! Per-tick counters go to a [`MetricsSink`]: [`TickHistory`] keeps them in memory and
//! [`CsvReport`] writes them to a file. Renderers read [`Simulation::agent_views`] and the
//! hazard overlay, or a serializable [`SimulationSnapshot`].
pub mod error;
pub mod grid;
pub mod hazard;
pub mod log;
pub mod parameters;
pub mod person;
pub mod random;
pub mod report;
pub mod runner;
pub mod simulation;
pub mod snapshot;

pub use error::GridSpreadError;
pub use grid::{Coord, Grid};
pub use hazard::{HazardCell, HazardField};
pub use parameters::{Parameters, ParametersBuilder};
pub use person::{Person, PersonId};
pub use report::{CsvReport, MetricsSink, NullSink, TickCounts, TickHistory};
pub use simulation::Simulation;
pub use snapshot::{AgentView, SimulationSnapshot};

// Re-export for users who inject their own generator
pub use rand;
