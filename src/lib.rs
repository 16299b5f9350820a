//! # `fvmflow`: Finite volume stencils for incompressible flow
//!
//! # Details
//!
//! This library discretizes the incompressible Navier-Stokes equations
//! with a second order finite volume method on a staggered, structured
//! grid, and assembles the result into sparse matrices or residuals
//! which can be handed to an external (non)linear solver.
//!
//! The unknowns of each cell are the velocities `u`, `v`, `w` on the
//! upper cell faces and the pressure `p` in the cell centre.
//!
//! All local couplings are stored in an [`atom::Atom`]: the coefficients
//! of each equation of a cell with respect to each unknown of the 27
//! surrounding cells. The pipeline is
//!
//! 1. coordinates, see [`grid::Coordinates`]
//! 2. linear operators, see [`operators::Derivatives`]
//! 3. convection, see [`operators::ConvectiveTerm`]
//! 4. walls and the moving lid, see [`boundary_conditions`]
//! 5. sparse matrix or residual, see [`assembly`]
//!
//! [`discretization::Discretization`] wraps all steps for a lid
//! driven cavity.
//!
//! # Example
//! Jacobian of a 2-D lid driven cavity
//! ```
//! use fvmflow::discretization::Discretization;
//! use fvmflow::functions::random_state;
//! use fvmflow::parameters::Parameters;
//!
//! let (nx, ny, nz) = (8, 8, 1);
//! let mut params = Parameters::default();
//! params.set("Reynolds Number", 100.);
//! let discretization = Discretization::new(params, nx, ny, nz);
//! let state = random_state(discretization.grid().n(), 1e-2);
//! let jac = discretization.jacobian(&state);
//! let rhs = discretization.rhs(&state);
//! assert_eq!(jac.nrows(), rhs.len());
//! ```
//!
//! ## Documentation
//!
//! Download and run:
//!
//! `cargo doc --open`
#![warn(missing_docs)]
#![allow(clippy::unnecessary_cast)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_arguments)]
#[macro_use]
extern crate enum_dispatch;
pub mod assembly;
pub mod atom;
pub mod boundary_conditions;
pub mod discretization;
pub mod functions;
pub mod grid;
pub mod operators;
pub mod parameters;
pub mod types;
