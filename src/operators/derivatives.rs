//! # Linear finite volume operators
//!
//! Diffusion, pressure gradient and divergence on a staggered,
//! possibly non-uniform grid. All terms are integrated over the
//! control volume of the unknown they belong to, so a derivative
//! along one axis is scaled by the area of the orthogonal face.
//!
//! Every operator is a three point stencil along one axis. The
//! x-, y- and z-variants share one procedure which picks the
//! coordinates of the requested axis.
use crate::atom::Atom;
use crate::grid::Grid;
use crate::types::{Direction, PRESSURE};

/// Area of the face orthogonal to `dir` in cell `pos`.
///
/// The width along `staggered` is measured between cell centres,
/// since the control volume of that velocity component is shifted
/// half a cell in its own direction.
pub(crate) fn orthogonal_area(grid: &Grid, pos: [isize; 3], dir: Direction, staggered: Option<Direction>) -> f64 {
    dir.others()
        .iter()
        .map(|other| {
            let c = grid.coords(*other);
            let p = pos[other.index()];
            if staggered == Some(*other) {
                c.staggered_width(p)
            } else {
                c.cell_width(p)
            }
        })
        .product()
}

/// Build stencils of the linear terms
///
/// # Example
///```
/// use fvmflow::grid::Grid;
/// use fvmflow::operators::Derivatives;
/// use fvmflow::types::Direction;
/// let grid = Grid::unit_cube(4, 4, 1);
/// let derivatives = Derivatives::new(&grid);
/// let u_xx = derivatives.diffusion(Direction::X, Direction::X);
/// let sum: f64 = u_xx.stencil([1, 1, 0], 0, 0).sum();
/// assert!(sum.abs() < 1e-12);
///```
#[derive(Debug, Clone)]
pub struct Derivatives<'a> {
    grid: &'a Grid,
}

impl<'a> Derivatives<'a> {
    /// Operators on `grid`
    pub fn new(grid: &'a Grid) -> Self {
        Self { grid }
    }

    fn empty(&self) -> Atom {
        Atom::zeros(self.grid.nx, self.grid.ny, self.grid.nz)
    }

    /// Second derivative of velocity component `var` along `dir`
    pub fn diffusion(&self, var: Direction, dir: Direction) -> Atom {
        let mut atom = self.empty();
        let c = self.grid.coords(dir);
        let d = var.index();
        self.grid.for_each_cell(|cell| {
            let pos = signed(cell);
            let p = pos[dir.index()];
            let (dist_prev, dist_next, staggered) = if var == dir {
                // distance between the faces i-1, i and i+1
                (c.cell_width(p), c.cell_width(p + 1), None)
            } else {
                // distance between the cell centres
                (c.staggered_width(p - 1), c.staggered_width(p), Some(var))
            };
            let area = orthogonal_area(self.grid, pos, dir, staggered);
            let prev = area / dist_prev;
            let next = area / dist_next;
            atom.add_line(cell, d, d, dir, [prev, -prev - next, next]);
        });
        atom
    }

    /// Sum of all nine diffusion terms
    pub fn laplacian(&self) -> Atom {
        let mut atom = self.empty();
        for var in Direction::ALL.iter() {
            for dir in Direction::ALL.iter() {
                atom += &self.diffusion(*var, *dir);
            }
        }
        atom
    }

    /// Pressure gradient along `dir` in the momentum equation of
    /// the same direction (forward difference)
    pub fn pressure_gradient(&self, dir: Direction) -> Atom {
        let mut atom = self.empty();
        let d = dir.index();
        self.grid.for_each_cell(|cell| {
            let area = orthogonal_area(self.grid, signed(cell), dir, None);
            atom.add_line(cell, d, PRESSURE, dir, [0., -area, area]);
        });
        atom
    }

    /// Sum of the pressure gradients in all directions
    pub fn gradient(&self) -> Atom {
        let mut atom = self.empty();
        for dir in Direction::ALL.iter() {
            atom += &self.pressure_gradient(*dir);
        }
        atom
    }

    /// Derivative of velocity component `dir` along `dir` in the
    /// continuity equation (backward difference)
    pub fn divergence_component(&self, dir: Direction) -> Atom {
        let mut atom = self.empty();
        let d = dir.index();
        self.grid.for_each_cell(|cell| {
            let area = orthogonal_area(self.grid, signed(cell), dir, None);
            atom.add_line(cell, PRESSURE, d, dir, [-area, area, 0.]);
        });
        atom
    }

    /// Velocity divergence u_x + v_y + w_z
    pub fn divergence(&self) -> Atom {
        let mut atom = self.empty();
        for dir in Direction::ALL.iter() {
            atom += &self.divergence_component(*dir);
        }
        atom
    }
}

/// Named shortcuts of the axis-parameterized operators
macro_rules! named_operator {
    ($name: ident, $op: ident, $($arg: expr),*) => {
        #[doc = concat!("Shortcut for `", stringify!($op), "(", stringify!($($arg),*), ")`")]
        pub fn $name(&self) -> Atom {
            self.$op($($arg),*)
        }
    };
}

impl<'a> Derivatives<'a> {
    named_operator!(u_xx, diffusion, Direction::X, Direction::X);
    named_operator!(u_yy, diffusion, Direction::X, Direction::Y);
    named_operator!(u_zz, diffusion, Direction::X, Direction::Z);
    named_operator!(v_xx, diffusion, Direction::Y, Direction::X);
    named_operator!(v_yy, diffusion, Direction::Y, Direction::Y);
    named_operator!(v_zz, diffusion, Direction::Y, Direction::Z);
    named_operator!(w_xx, diffusion, Direction::Z, Direction::X);
    named_operator!(w_yy, diffusion, Direction::Z, Direction::Y);
    named_operator!(w_zz, diffusion, Direction::Z, Direction::Z);
    named_operator!(p_x, pressure_gradient, Direction::X);
    named_operator!(p_y, pressure_gradient, Direction::Y);
    named_operator!(p_z, pressure_gradient, Direction::Z);
    named_operator!(u_x, divergence_component, Direction::X);
    named_operator!(v_y, divergence_component, Direction::Y);
    named_operator!(w_z, divergence_component, Direction::Z);
}

#[allow(clippy::cast_possible_wrap)]
pub(crate) fn signed(cell: [usize; 3]) -> [isize; 3] {
    [cell[0] as isize, cell[1] as isize, cell[2] as isize]
}
