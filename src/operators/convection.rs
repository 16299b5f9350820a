//! # Convective term
//!
//! The nonlinear term `d(u_a u_b)/da` is linearized in two stages.
//!
//! First a bilinear coefficient table `[nx, ny, nz, 6, 3, 2]` is set
//! up once per grid:
//! - `table[b][a]` (rows `0..3`) are the weights of the two point
//!   average of velocity `b` along direction `a`
//! - `table[3 + a][b]` (rows `3..6`) are the weights of the two point
//!   difference of the averaged fluxes of velocity `b` along `a`
//!
//! Entries which would reach across a wall are zeroed.
//!
//! Second, the current state is frozen into face averages and for
//! every pair of velocity components two atoms are produced: the
//! flux atom (advecting velocity frozen) and the part of the Jacobian
//! that stems from the perturbation of the advecting velocity.
use super::derivatives::{orthogonal_area, signed};
use crate::atom::{Atom, CENTER};
use crate::grid::{create_state_mtx, Grid};
use crate::types::{Direction, DOF};
use ndarray::{s, Array1, Array4, Array5, Array6};

/// Weights with a smaller magnitude are not used for averaging
const AVERAGE_TOL: f64 = 1e-15;

/// Bilinear coefficients of the convective term on one grid
///
/// # Example
///```
/// use fvmflow::grid::{create_state_mtx, Grid};
/// use fvmflow::operators::ConvectiveTerm;
/// use ndarray::Array1;
/// let grid = Grid::unit_cube(4, 4, 1);
/// let convection = ConvectiveTerm::new(&grid);
/// // Fluid at rest does not convect
/// let state = create_state_mtx(&Array1::<f64>::zeros(grid.n()), 4, 4, 1, 4);
/// let (jac, flux) = convection.apply(&state);
/// assert!(jac.max_abs() < 1e-14 && flux.max_abs() < 1e-14);
///```
#[derive(Debug, Clone)]
pub struct ConvectiveTerm<'a> {
    grid: &'a Grid,
    table: Array6<f64>,
}

impl<'a> ConvectiveTerm<'a> {
    /// Set up the coefficient table of `grid`
    pub fn new(grid: &'a Grid) -> Self {
        let (nx, ny, nz) = (grid.nx, grid.ny, grid.nz);
        let mut table = Array6::<f64>::zeros((nx, ny, nz, 6, 3, 2));
        grid.for_each_cell(|cell| {
            let [i, j, k] = cell;
            let pos = signed(cell);
            for a in Direction::ALL.iter() {
                for b in Direction::ALL.iter() {
                    let (ai, bi) = (a.index(), b.index());
                    table[[i, j, k, bi, ai, 0]] = 0.5;
                    table[[i, j, k, bi, ai, 1]] = 0.5;
                    let staggered = if a == b { None } else { Some(*b) };
                    let area = orthogonal_area(grid, pos, *a, staggered);
                    table[[i, j, k, 3 + ai, bi, 0]] = -area;
                    table[[i, j, k, 3 + ai, bi, 1]] = area;
                }
            }
        });
        let mut convection = Self { grid, table };
        for dir in Direction::ALL.iter() {
            convection.dirichlet_high(*dir);
            convection.dirichlet_low(*dir);
        }
        convection
    }

    /// Coefficient table `[nx, ny, nz, 6, 3, 2]`
    pub fn table(&self) -> &Array6<f64> {
        &self.table
    }

    /// Zero the weights at the upper wall normal to `dir`
    fn dirichlet_high(&mut self, dir: Direction) {
        let a = dir.index();
        let last = self.grid.extent(dir) - 1;
        let [nx, ny, nz] = self.grid.shape();
        let table = &mut self.table;
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    if [i, j, k][a] != last {
                        continue;
                    }
                    let mut t = table.slice_mut(s![i, j, k, .., .., ..]);
                    t.slice_mut(s![3 + a, a, ..]).fill(0.);
                    for b in (0..3).filter(|b| *b != a) {
                        t.slice_mut(s![b, a, ..]).fill(0.);
                        t.slice_mut(s![a, b, ..]).fill(0.);
                        t[[3 + a, b, 1]] = 0.;
                    }
                    t[[a, a, 1]] = 0.;
                }
            }
        }
    }

    /// Zero the weights at the lower wall normal to `dir`
    fn dirichlet_low(&mut self, dir: Direction) {
        let a = dir.index();
        let [nx, ny, nz] = self.grid.shape();
        let table = &mut self.table;
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    if [i, j, k][a] != 0 {
                        continue;
                    }
                    table[[i, j, k, a, a, 0]] = 0.;
                    for b in (0..3).filter(|b| *b != a) {
                        table[[i, j, k, 3 + a, b, 0]] = 0.;
                    }
                }
            }
        }
    }

    /// Neighbour of `cell` shifted by `delta` along `dir`, if inside
    fn neighbour(&self, cell: [usize; 3], dir: Direction, delta: isize) -> Option<[usize; 3]> {
        let a = dir.index();
        let p = cell[a] as isize + delta;
        if p < 0 || p >= self.grid.extent(dir) as isize {
            return None;
        }
        let mut nb = cell;
        nb[a] = p as usize;
        Some(nb)
    }

    /// Face averages `[nx, ny, nz, var, dir]` of the velocities in
    /// `state` of shape `[nx, ny, nz, dof]`
    pub fn averages(&self, state: &Array4<f64>) -> Array5<f64> {
        let [nx, ny, nz] = self.grid.shape();
        assert_eq!(
            state.dim(),
            (nx, ny, nz, DOF),
            "State does not match the grid"
        );
        let mut averages = Array5::<f64>::zeros((nx, ny, nz, 3, 3));
        self.grid.for_each_cell(|cell| {
            let [i, j, k] = cell;
            for a in Direction::ALL.iter() {
                for b in Direction::ALL.iter() {
                    let (ai, bi) = (a.index(), b.index());
                    // Velocity along its own direction is averaged backward
                    let shift = if a == b { 1 } else { 0 };
                    let mut sum = 0.;
                    for d in 0..2 {
                        let coef = self.table[[i, j, k, bi, ai, d]];
                        if coef.abs() <= AVERAGE_TOL {
                            continue;
                        }
                        if let Some([p, q, r]) = self.neighbour(cell, *a, d as isize - shift) {
                            sum += coef * state[[p, q, r, bi]];
                        }
                    }
                    averages[[i, j, k, bi, ai]] = sum;
                }
            }
        });
        averages
    }

    /// Jacobian and flux atoms from frozen face `averages`.
    ///
    /// The Jacobian already contains the flux, see [`convection`].
    pub fn atoms(&self, averages: &Array5<f64>) -> (Atom, Atom) {
        let mut jac = Atom::zeros(self.grid.nx, self.grid.ny, self.grid.nz);
        let mut flux = jac.clone();
        self.grid.for_each_cell(|cell| {
            let [i, j, k] = cell;
            for a in Direction::ALL.iter() {
                let ai = a.index();
                let last = self.grid.extent(*a) - 1;
                for b in Direction::ALL.iter() {
                    let bi = b.index();
                    // Forward average and backward difference, unless
                    // the velocity is differentiated along itself
                    let bw = if a == b { 0 } else { 1 };
                    for d1 in 0..2 {
                        let deriv = self.table[[i, j, k, 3 + ai, bi, d1]];
                        if deriv.abs() <= AVERAGE_TOL {
                            continue;
                        }
                        let mut c2 = cell;
                        c2[ai] = (cell[ai] + d1).saturating_sub(bw).min(last);
                        let [p, q, r] = c2;

                        let coef1 = averages[[p, q, r, ai, bi]] * deriv;
                        for d2 in 0..2 {
                            let coef2 = self.table[[p, q, r, bi, ai, d2]];
                            let mut offset = CENTER;
                            offset[ai] = d1 + d2;
                            *flux.get_mut(cell, bi, bi, offset) -= coef1 * coef2;
                        }

                        let coef1 = averages[[p, q, r, bi, ai]] * deriv;
                        for d2 in 0..2 {
                            let coef2 = self.table[[p, q, r, ai, bi, d2]];
                            let mut offset = CENTER;
                            offset[ai] = 1 + d1 - bw;
                            offset[bi] = offset[bi] + d2 + bw - 1;
                            *jac.get_mut(cell, bi, ai, offset) -= coef1 * coef2;
                        }
                    }
                }
            }
        });
        jac += &flux;
        (jac, flux)
    }

    /// Jacobian and flux atoms at `state` of shape `[nx, ny, nz, dof]`
    pub fn apply(&self, state: &Array4<f64>) -> (Atom, Atom) {
        self.atoms(&self.averages(state))
    }
}

/// Linearized convection at the flat `state`.
///
/// Returns `(jacobian, flux)`. `flux` applied to the state is the
/// discrete convective term, `jacobian` is its derivative with respect
/// to the state (the sum of the flux and the linearization in the
/// advecting velocity).
pub fn convection(grid: &Grid, state: &Array1<f64>) -> (Atom, Atom) {
    let state = create_state_mtx(state, grid.nx, grid.ny, grid.nz, DOF);
    ConvectiveTerm::new(grid).apply(&state)
}
