//! A toroidal 2-D grid of cells, each holding any number of people.
//!
//! All coordinate arithmetic wraps on both axes, so every coordinate handed out by the grid is in
//! bounds. Occupants of a cell are kept in insertion order, which makes iteration over a cell
//! deterministic.
use serde::{Deserialize, Serialize};

use crate::person::PersonId;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    #[must_use]
    pub fn new(x: usize, y: usize) -> Self {
        Coord { x, y }
    }
}

impl From<(usize, usize)> for Coord {
    fn from((x, y): (usize, usize)) -> Self {
        Coord { x, y }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    // Row-major: the cell at (x, y) is stored at `y * width + x`.
    cells: Vec<Vec<PersonId>>,
}

impl Grid {
    /// Creates an empty grid.
    ///
    /// # Panics
    /// Panics if either dimension is zero. Dimensions are validated with the rest of the
    /// [`Parameters`](crate::parameters::Parameters) before a grid is built.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        assert!(
            width > 0 && height > 0,
            "grid dimensions must be positive, got {width}x{height}"
        );
        Grid {
            width,
            height,
            cells: vec![Vec::new(); width * height],
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn contains(&self, coord: Coord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    fn wrap_coord(&self, coord: Coord) -> Coord {
        Coord {
            x: coord.x % self.width,
            y: coord.y % self.height,
        }
    }

    /// Index of `coord` (wrapped) into the row-major cell storage.
    #[must_use]
    pub fn index_of(&self, coord: Coord) -> usize {
        let coord = self.wrap_coord(coord);
        coord.y * self.width + coord.x
    }

    /// The four Von Neumann neighbors in the order north, west, east, south. Each one is wrapped
    /// independently, so on grids one cell wide or tall neighbors repeat or equal `coord` itself.
    #[must_use]
    pub fn neighbors(&self, coord: Coord) -> [Coord; 4] {
        let Coord { x, y } = self.wrap_coord(coord);
        let west = (x + self.width - 1) % self.width;
        let east = (x + 1) % self.width;
        let north = (y + self.height - 1) % self.height;
        let south = (y + 1) % self.height;
        [
            Coord::new(x, north),
            Coord::new(west, y),
            Coord::new(east, y),
            Coord::new(x, south),
        ]
    }

    /// Adds `person` to the cell at `coord` (wrapped) and returns the cell it landed in.
    pub fn place(&mut self, person: PersonId, coord: Coord) -> Coord {
        let coord = self.wrap_coord(coord);
        let index = self.index_of(coord);
        self.cells[index].push(person);
        coord
    }

    /// Moves `person` out of `from` and into `to` (wrapped), returning the new cell.
    ///
    /// # Panics
    /// Panics if `person` is not in `from`; that means grid membership and the person's own
    /// position have diverged.
    pub fn move_person(&mut self, person: PersonId, from: Coord, to: Coord) -> Coord {
        let from_index = self.index_of(from);
        let occupants = &mut self.cells[from_index];
        let slot = occupants
            .iter()
            .position(|occupant| *occupant == person)
            .unwrap_or_else(|| panic!("{person:?} is not in cell {from:?}"));
        occupants.remove(slot);
        self.place(person, to)
    }

    #[must_use]
    pub fn agents_at(&self, coord: Coord) -> &[PersonId] {
        &self.cells[self.index_of(coord)]
    }

    /// Every cell with its occupants, x outer and y inner.
    pub fn cells(&self) -> impl Iterator<Item = (Coord, &[PersonId])> + '_ {
        (0..self.width).flat_map(move |x| {
            (0..self.height).map(move |y| {
                let coord = Coord::new(x, y);
                (coord, self.agents_at(coord))
            })
        })
    }
}
