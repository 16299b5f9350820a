//! # Discretization of a lid driven cavity
//!
//! Collects the operators of the incompressible Navier-Stokes
//! equations on one grid:
//! ```text
//! M du/dt = F(u),  F(u) = A(u) u + f
//! ```
//! where `A(u)` is the linear part plus convection with the walls
//! folded in and `f` is the lid forcing. The Jacobian is `dF/du`.
//!
//! # Example
//!```
//! use fvmflow::discretization::Discretization;
//! use fvmflow::parameters::Parameters;
//! use ndarray::Array1;
//! let mut params = Parameters::default();
//! params.set("Reynolds Number", 100.);
//! let discretization = Discretization::new(params, 4, 4, 1);
//! let state = Array1::<f64>::zeros(discretization.grid().n());
//! let jac = discretization.jacobian(&state);
//! let rhs = discretization.rhs(&state);
//! assert_eq!(jac.nrows(), rhs.len());
//!```
use crate::assembly::{self, assemble, CrsMatrix};
use crate::atom::Atom;
use crate::boundary_conditions::BoundaryConditions;
use crate::grid::Grid;
use crate::operators::{ConvectiveTerm, Derivatives};
use crate::parameters::Parameters;
use crate::types::{Direction, DOF};
use ndarray::{Array1, ArrayBase, Data, Ix1};

/// Operators of a lid driven cavity
#[derive(Debug, Clone)]
pub struct Discretization {
    params: Parameters,
    grid: Grid,
    /// Sum of all diffusion atoms, without viscosity
    laplacian: Atom,
    gradient: Atom,
    divergence: Atom,
}

impl Discretization {
    /// Discretization on `nx` x `ny` x `nz` cells
    ///
    /// # Panics
    /// If one of the extents is zero
    pub fn new(params: Parameters, nx: usize, ny: usize, nz: usize) -> Self {
        let grid = Self::build_grid(&params, nx, ny, nz);
        let (laplacian, gradient, divergence) = Self::build_linear(&grid);
        log::debug!(
            "Discretization on {}x{}x{} cells with {} unknowns",
            nx,
            ny,
            nz,
            grid.n()
        );
        Self {
            params,
            grid,
            laplacian,
            gradient,
            divergence,
        }
    }

    fn build_grid(params: &Parameters, nx: usize, ny: usize, nz: usize) -> Grid {
        Grid::new(
            params.coordinates(Direction::X, nx),
            params.coordinates(Direction::Y, ny),
            params.coordinates(Direction::Z, nz),
        )
    }

    fn build_linear(grid: &Grid) -> (Atom, Atom, Atom) {
        let derivatives = Derivatives::new(grid);
        (
            derivatives.laplacian(),
            derivatives.gradient(),
            derivatives.divergence(),
        )
    }

    /// Underlying grid
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Current parameters
    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    /// Set parameter `name`, see [`Parameters::set`].
    ///
    /// Grid parameters rebuild the coordinates and linear operators.
    pub fn set_parameter(&mut self, name: &str, value: f64) {
        self.params.set(name, value);
        if name.starts_with("Grid") || name.ends_with("min") || name.ends_with("max") {
            let [nx, ny, nz] = self.grid.shape();
            self.grid = Self::build_grid(&self.params, nx, ny, nz);
            let (laplacian, gradient, divergence) = Self::build_linear(&self.grid);
            self.laplacian = laplacian;
            self.gradient = gradient;
            self.divergence = divergence;
        }
    }

    /// Viscous term, pressure gradient and continuity:
    /// `1/Re * laplacian - grad p + div u`
    pub fn linear_part(&self) -> Atom {
        self.params.viscosity() * &self.laplacian - &self.gradient + &self.divergence
    }

    /// Convection at `state`, `(jacobian, flux)`. Both vanish for
    /// Stokes flow.
    pub fn nonlinear_part<S>(&self, state: &ArrayBase<S, Ix1>) -> (Atom, Atom)
    where
        S: Data<Elem = f64>,
    {
        let [nx, ny, nz] = self.grid.shape();
        if self.params.is_stokes() {
            let zero = Atom::zeros(nx, ny, nz);
            return (zero.clone(), zero);
        }
        let state = crate::grid::create_state_mtx(state, nx, ny, nz, DOF);
        ConvectiveTerm::new(&self.grid).apply(&state)
    }

    /// Fold the walls into `atom` and return the lid forcing
    pub fn boundaries(&self, atom: &mut Atom) -> Array1<f64> {
        let lid_face = self.params.lid_face(self.grid.nz);
        BoundaryConditions::new(&self.grid, Some(lid_face), self.params.lid_velocity).forcing(atom)
    }

    /// Right hand side `F(u) = A(u) u + f`
    pub fn rhs<S>(&self, state: &ArrayBase<S, Ix1>) -> Array1<f64>
    where
        S: Data<Elem = f64>,
    {
        let (_, flux) = self.nonlinear_part(state);
        let mut atom = self.linear_part() + flux;
        let frc = self.boundaries(&mut atom);
        frc - assembly::rhs(state, &atom)
    }

    /// Jacobian of `F` at `state`, i.e. `rhs(u + du) = rhs(u) + J du`
    pub fn jacobian<S>(&self, state: &ArrayBase<S, Ix1>) -> CrsMatrix
    where
        S: Data<Elem = f64>,
    {
        let (jac, _) = self.nonlinear_part(state);
        let mut atom = self.linear_part() + jac;
        self.boundaries(&mut atom);
        assemble(&atom)
    }

    /// Diagonal mass matrix with the control volume of every velocity.
    ///
    /// Rows of the pressure and of velocities on a wall are empty.
    pub fn mass_matrix(&self) -> CrsMatrix {
        let n = self.grid.n();
        let shape = self.grid.shape();
        let mut co_a = Vec::<f64>::new();
        let mut jco_a = Vec::<usize>::new();
        let mut beg_a = Vec::<usize>::with_capacity(n + 1);
        beg_a.push(0);
        self.grid.for_each_cell(|cell| {
            let [i, j, k] = cell;
            for var in 0..DOF {
                let on_wall = var < 3 && cell[var] == shape[var] - 1;
                if var < 3 && !on_wall {
                    let pos = [i as isize, j as isize, k as isize];
                    co_a.push(self.grid.volume(pos, var));
                    jco_a.push(self.grid.sub2ind(i, j, k, var));
                }
                beg_a.push(co_a.len());
            }
        });
        CrsMatrix {
            co_a: Array1::from(co_a),
            jco_a: Array1::from(jco_a),
            beg_a: Array1::from(beg_a),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::{norm_l2, random_state};
    use crate::types::PRESSURE;

    fn approx_eq(result: &Array1<f64>, expected: &Array1<f64>) {
        let dif = 1e-8;
        for (a, b) in expected.iter().zip(result.iter()) {
            if (a - b).abs() > dif {
                panic!("Large difference of values, got {} expected {}.", b, a)
            }
        }
    }

    fn discretization(re: f64, nx: usize, ny: usize, nz: usize) -> Discretization {
        let mut params = Parameters::default();
        params.set("Reynolds Number", re);
        Discretization::new(params, nx, ny, nz)
    }

    #[test]
    fn test_reynolds_scaling() {
        let d1 = discretization(1., 3, 3, 3);
        let d10 = discretization(10., 3, 3, 3);
        let (a1, a10) = (d1.linear_part(), d10.linear_part());
        for var in 0..3 {
            let expected = 0.1 * a1.block(var, var);
            assert!(a10.block(var, var).max_abs_diff(&expected) < 1e-14);
            assert!(a10.block(var, PRESSURE).max_abs_diff(&a1.block(var, PRESSURE)) < 1e-15);
            assert!(a10.block(PRESSURE, var).max_abs_diff(&a1.block(PRESSURE, var)) < 1e-15);
        }
    }

    #[test]
    fn test_stokes_is_linear() {
        let d = discretization(0., 4, 4, 1);
        let x = random_state(d.grid().n(), 1.);
        let (jac, flux) = d.nonlinear_part(&x);
        assert!(jac.max_abs() < 1e-15 && flux.max_abs() < 1e-15);
        let zero = Array1::<f64>::zeros(d.grid().n());
        let mat = d.jacobian(&x);
        assert_eq!(mat, d.jacobian(&zero));
        // rhs(x) = rhs(0) + J x
        let expected = d.rhs(&zero) + mat.matvec(&x);
        approx_eq(&d.rhs(&x), &expected);
    }

    fn check_jacobian(d: &Discretization) {
        let n = d.grid().n();
        let u = random_state(n, 1.);
        let du = random_state(n, 1.);
        let eps = 1e-3;
        let up = &u + &(eps * &du);
        let um = &u - &(eps * &du);
        let fd = (d.rhs(&up) - d.rhs(&um)) / (2. * eps);
        let expected = d.jacobian(&u).matvec(&du);
        approx_eq(&fd, &expected);
        assert!(norm_l2(&expected) > 0.);
    }

    #[test]
    fn test_jacobian_2d() {
        check_jacobian(&discretization(100., 4, 4, 1));
    }

    #[test]
    fn test_jacobian_3d_stretched() {
        let mut d = discretization(10., 3, 4, 3);
        d.set_parameter("Grid Stretching", 1.);
        d.set_parameter("Grid Stretching Factor", 1.3);
        check_jacobian(&d);
    }

    #[test]
    fn test_lid_drives_flow() {
        let d = discretization(1., 4, 4, 1);
        let zero = Array1::<f64>::zeros(d.grid().n());
        let rhs = d.rhs(&zero);
        // Fluid at rest is only forced below the lid, in the direction
        // the lid moves
        for i in 0..3 {
            assert!((rhs[d.grid().sub2ind(i, 3, 0, 0)] - 2.).abs() < 1e-12);
        }
        assert!((norm_l2(&rhs) - 12f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_viscous_decay() {
        let mut d = discretization(0., 6, 6, 1);
        d.set_parameter("Lid Velocity", 0.);
        let mut u = Array1::<f64>::zeros(d.grid().n());
        let idx = d.grid().sub2ind(2, 2, 0, 0);
        u[idx] = 1.;
        // M du/dt = F(u) damps a single velocity bump
        let rhs = d.rhs(&u);
        assert!(rhs[idx] < 0.);
        let mass = d.mass_matrix();
        assert!(mass.get(idx, idx) > 0.);
        let jac = d.jacobian(&u);
        assert!(jac.get(idx, idx) < 0.);
        assert!((jac.matvec(&u)[idx] - rhs[idx]).abs() < 1e-12);
    }

    #[test]
    fn test_mass_matrix() {
        let d = discretization(1., 4, 4, 1);
        let mass = d.mass_matrix();
        let grid = d.grid();
        assert_eq!(mass.nrows(), grid.n());
        // u and v off the walls, w sits on the top wall
        assert_eq!(mass.nnz(), 24);
        assert!((mass.get(grid.sub2ind(1, 2, 0, 0), grid.sub2ind(1, 2, 0, 0)) - 1. / 16.).abs() < 1e-14);
        assert!(mass.get(grid.sub2ind(3, 2, 0, 0), grid.sub2ind(3, 2, 0, 0)).abs() < 1e-14);
        let p = grid.sub2ind(1, 1, 0, PRESSURE);
        assert_eq!(mass.beg_a[p], mass.beg_a[p + 1]);
        let dense = mass.to_dense();
        for row in 0..grid.n() {
            for col in (0..grid.n()).filter(|c| *c != row) {
                assert!(dense[[row, col]].abs() < 1e-15);
            }
        }
    }

    #[test]
    fn test_set_grid_parameter() {
        let mut d = discretization(1., 4, 4, 1);
        let before = d.linear_part();
        d.set_parameter("xmax", 2.);
        assert!((d.grid().coords(Direction::X).end() - 2.).abs() < 1e-14);
        assert!(d.linear_part().max_abs_diff(&before) > 0.);
        d.set_parameter("Reynolds Number", 2.);
        assert!((d.parameters().reynolds_number - 2.).abs() < 1e-14);
    }
}
