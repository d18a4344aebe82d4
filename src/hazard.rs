//! The hazard field: decaying environmental contamination left behind by infected people.
//!
//! Contamination is stored sparsely, one [`HazardCell`] per contaminated coordinate. A dense
//! intensity overlay mirrors the probability of every cell (0.0 where there is no entry) so that
//! a renderer can read the whole field as a plain slice without touching the map.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::grid::{Coord, Grid};

/// Number of ticks a freshly contaminated cell stays hazardous.
pub const HAZARD_LIFETIME: u32 = 2;
/// Probability written to the cell an infected person occupies.
pub const OCCUPIED_CELL_PROBABILITY: f64 = 0.5;
/// Probability written to each Von Neumann neighbor of an infected person's cell.
pub const NEIGHBOR_CELL_PROBABILITY: f64 = 0.25;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HazardCell {
    pub remaining_ticks: u32,
    pub probability: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HazardField {
    width: usize,
    height: usize,
    cells: IndexMap<Coord, HazardCell>,
    overlay: Vec<f64>,
}

impl HazardField {
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        HazardField {
            width,
            height,
            cells: IndexMap::new(),
            overlay: vec![0.0; width * height],
        }
    }

    // Wraps the same way as `Grid::index_of`.
    fn index_of(&self, coord: Coord) -> usize {
        (coord.y % self.height) * self.width + coord.x % self.width
    }

    #[must_use]
    pub fn get(&self, coord: Coord) -> Option<&HazardCell> {
        self.cells.get(&coord)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Contaminated cells in the order they were first contaminated.
    pub fn entries(&self) -> impl Iterator<Item = (Coord, &HazardCell)> + '_ {
        self.cells.iter().map(|(coord, cell)| (*coord, cell))
    }

    /// Row-major intensity overlay; the value at `y * width + x` is the probability stored at
    /// `(x, y)`, or 0.0.
    #[must_use]
    pub fn overlay(&self) -> &[f64] {
        &self.overlay
    }

    #[must_use]
    pub fn intensity_at(&self, coord: Coord) -> f64 {
        self.overlay[self.index_of(coord)]
    }

    /// Sets the entry at `coord`, replacing whatever was there. There is no max-merge: a weaker
    /// write replaces a stronger one.
    pub fn mark(&mut self, coord: Coord, probability: f64) {
        debug_assert!(coord.x < self.width && coord.y < self.height);
        self.cells.insert(
            coord,
            HazardCell {
                remaining_ticks: HAZARD_LIFETIME,
                probability,
            },
        );
        let index = self.index_of(coord);
        self.overlay[index] = probability;
    }

    /// Contaminates the cell of an infected person and its four neighbors, in that order.
    pub fn contaminate_around(&mut self, grid: &Grid, coord: Coord) {
        self.mark(coord, OCCUPIED_CELL_PROBABILITY);
        for neighbor in grid.neighbors(coord) {
            self.mark(neighbor, NEIGHBOR_CELL_PROBABILITY);
        }
    }

    /// Ages every entry by one tick and drops the ones that run out, clearing their overlay.
    /// Returns the number of entries removed.
    pub fn age(&mut self) -> usize {
        let before = self.cells.len();
        let width = self.width;
        let overlay = &mut self.overlay;
        self.cells.retain(|coord, cell| {
            cell.remaining_ticks = cell.remaining_ticks.saturating_sub(1);
            if cell.remaining_ticks == 0 {
                overlay[coord.y * width + coord.x] = 0.0;
                false
            } else {
                true
            }
        });
        before - self.cells.len()
    }
}
