//! # Structured staggered grid
//!
//! Velocities live on the upper cell faces (u on the east face,
//! v on the north face, w on the top face), the pressure lives
//! in the cell centre.
pub mod coordinates;
pub mod index;
pub use coordinates::{Coordinates, GridSpacing, Spacing, Stretched, Uniform};
pub use index::{column, create_state_mtx, create_state_vec, ind2sub, sub2ind};

use crate::types::{Direction, DOF};

/// Cell extents and coordinates of a structured grid
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    /// Number of cells in x-direction
    pub nx: usize,
    /// Number of cells in y-direction
    pub ny: usize,
    /// Number of cells in z-direction
    pub nz: usize,
    /// Coordinates \[x, y, z\]
    coords: [Coordinates; 3],
}

impl Grid {
    /// Grid from its coordinate vectors
    pub fn new(x: Coordinates, y: Coordinates, z: Coordinates) -> Self {
        Self {
            nx: x.n(),
            ny: y.n(),
            nz: z.n(),
            coords: [x, y, z],
        }
    }

    /// Uniform grid on the unit cube
    ///
    /// # Example
    ///```
    /// use fvmflow::grid::Grid;
    /// let grid = Grid::unit_cube(4, 4, 1);
    /// assert_eq!(grid.n(), 64);
    ///```
    pub fn unit_cube(nx: usize, ny: usize, nz: usize) -> Self {
        Self::new(
            Coordinates::uniform(0., 1., nx),
            Coordinates::uniform(0., 1., ny),
            Coordinates::uniform(0., 1., nz),
        )
    }

    /// Cell extents \[nx, ny, nz\]
    pub fn shape(&self) -> [usize; 3] {
        [self.nx, self.ny, self.nz]
    }

    /// Number of cells along `dir`
    pub fn extent(&self, dir: Direction) -> usize {
        self.shape()[dir.index()]
    }

    /// Coordinates along `dir`
    pub fn coords(&self, dir: Direction) -> &Coordinates {
        &self.coords[dir.index()]
    }

    /// Total number of unknowns
    pub fn n(&self) -> usize {
        self.nx * self.ny * self.nz * DOF
    }

    /// Flat index of unknown `var` in cell `(i, j, k)`
    pub fn sub2ind(&self, i: usize, j: usize, k: usize, var: usize) -> usize {
        sub2ind(self.nx, self.ny, DOF, i, j, k, var)
    }

    /// Control volume of cell `(i, j, k)` around unknown `var`.
    ///
    /// Velocity control volumes are shifted half a cell in
    /// their own direction.
    pub fn volume(&self, pos: [isize; 3], var: usize) -> f64 {
        Direction::ALL
            .iter()
            .map(|dir| {
                let c = self.coords(*dir);
                let p = pos[dir.index()];
                if dir.index() == var {
                    c.staggered_width(p)
                } else {
                    c.cell_width(p)
                }
            })
            .product()
    }

    /// Visit every cell `(i, j, k)` in storage order
    pub fn for_each_cell<F: FnMut([usize; 3])>(&self, mut f: F) {
        for k in 0..self.nz {
            for j in 0..self.ny {
                for i in 0..self.nx {
                    f([i, j, k]);
                }
            }
        }
    }
}
