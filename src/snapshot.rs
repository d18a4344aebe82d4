//! Read-only views of a simulation for renderers and for saving the final state of a run.
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GridSpreadError;
use crate::grid::Coord;
use crate::person::{Person, PersonId};
use crate::simulation::Simulation;

/// The state a renderer needs to draw a person: where they are, whether they are infected, and
/// whether they have a comorbidity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentView {
    pub id: PersonId,
    pub position: Coord,
    pub is_infected: bool,
    pub has_comorbidity: bool,
}

impl From<&Person> for AgentView {
    fn from(person: &Person) -> Self {
        AgentView {
            id: person.id(),
            position: person.position(),
            is_infected: person.is_infected(),
            has_comorbidity: person.has_comorbidity(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HazardEntry {
    pub position: Coord,
    pub remaining_ticks: u32,
    pub probability: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    pub tick: usize,
    pub running: bool,
    pub seed: Option<u64>,
    pub width: usize,
    pub height: usize,
    pub interaction_infections: usize,
    pub location_infections: usize,
    pub agents: Vec<AgentView>,
    pub hazard: Vec<HazardEntry>,
    /// Row-major hazard intensity, one value per cell.
    pub overlay: Vec<f64>,
}

impl SimulationSnapshot {
    pub(crate) fn capture<R: Rng>(simulation: &Simulation<R>) -> Self {
        let grid = simulation.grid();
        let hazard = simulation.hazard();
        SimulationSnapshot {
            tick: simulation.tick(),
            running: simulation.is_running(),
            seed: simulation.seed(),
            width: grid.width(),
            height: grid.height(),
            interaction_infections: simulation.interaction_infections(),
            location_infections: simulation.location_infections(),
            agents: simulation.agent_views().collect(),
            hazard: hazard
                .entries()
                .map(|(position, cell)| HazardEntry {
                    position,
                    remaining_ticks: cell.remaining_ticks,
                    probability: cell.probability,
                })
                .collect(),
            overlay: hazard.overlay().to_vec(),
        }
    }

    /// Writes the snapshot to `path` as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns a `GridSpreadError` if the file cannot be created or written.
    pub fn write_json(&self, path: &Path) -> Result<(), GridSpreadError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Reads a snapshot written by [`SimulationSnapshot::write_json`].
    ///
    /// # Errors
    /// Returns a `GridSpreadError` if the file cannot be read or parsed.
    pub fn read_json(path: &Path) -> Result<Self, GridSpreadError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }
}
