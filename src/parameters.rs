//! # Physical and grid parameters
//!
//! Parameters can be set by field or by name. Names follow the
//! conventions of continuation drivers, e.g. `"Reynolds Number"`.
//!
//! # Example
//!```
//! use fvmflow::parameters::Parameters;
//! let mut params = Parameters::default();
//! params.set("Reynolds Number", 100.);
//! assert!((params.reynolds_number - 100.).abs() < 1e-14);
//! assert!((params.get("Lid Velocity") - 1.).abs() < 1e-14);
//!```
use crate::boundary_conditions::LidFace;
use crate::grid::{Coordinates, GridSpacing, Stretched, Uniform};
use crate::types::Direction;
use std::collections::HashMap;

/// Parameters of a lid driven cavity
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    /// Reynolds number, zero means Stokes flow
    pub reynolds_number: f64,
    /// Velocity of the lid in x-direction
    pub lid_velocity: f64,
    /// Use stretched coordinates
    pub grid_stretching: bool,
    /// Ratio of neighbouring cell widths of a stretched grid
    pub grid_stretching_factor: f64,
    /// Domain bounds \[\[xmin, xmax\], \[ymin, ymax\], \[zmin, zmax\]\]
    pub bounds: [[f64; 2]; 3],
    /// Face of the lid, inferred from the grid if `None`
    pub lid_face: Option<LidFace>,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            reynolds_number: 1.,
            lid_velocity: 1.,
            grid_stretching: false,
            grid_stretching_factor: 1.5,
            bounds: [[0., 1.]; 3],
            lid_face: None,
        }
    }
}

/// Names accepted by [`Parameters::get`] and [`Parameters::set`]
pub const NAMES: [&str; 10] = [
    "Reynolds Number",
    "Lid Velocity",
    "Grid Stretching",
    "Grid Stretching Factor",
    "xmin",
    "xmax",
    "ymin",
    "ymax",
    "zmin",
    "zmax",
];

impl Parameters {
    /// Value of parameter `name`. Flags read 0 or 1.
    ///
    /// # Panics
    /// If `name` is unknown
    pub fn get(&self, name: &str) -> f64 {
        match name {
            "Reynolds Number" => self.reynolds_number,
            "Lid Velocity" => self.lid_velocity,
            "Grid Stretching" => {
                if self.grid_stretching {
                    1.
                } else {
                    0.
                }
            }
            "Grid Stretching Factor" => self.grid_stretching_factor,
            _ => {
                let (dir, side) = Self::bound(name);
                self.bounds[dir.index()][side]
            }
        }
    }

    /// Set parameter `name` to `value`. Flags are set by nonzero values.
    ///
    /// # Panics
    /// If `name` is unknown or `value` is invalid for it
    pub fn set(&mut self, name: &str, value: f64) {
        match name {
            "Reynolds Number" => {
                assert!(
                    value >= 0.,
                    "Reynolds number must not be negative, got {}",
                    value
                );
                self.reynolds_number = value;
            }
            "Lid Velocity" => self.lid_velocity = value,
            "Grid Stretching" => self.grid_stretching = value != 0.,
            "Grid Stretching Factor" => {
                assert!(
                    value > 0.,
                    "Grid stretching factor must be positive, got {}",
                    value
                );
                self.grid_stretching_factor = value;
            }
            _ => {
                let (dir, side) = Self::bound(name);
                self.bounds[dir.index()][side] = value;
            }
        }
        log::debug!("Set parameter {} to {}", name, value);
    }

    fn bound(name: &str) -> (Direction, usize) {
        match name {
            "xmin" => (Direction::X, 0),
            "xmax" => (Direction::X, 1),
            "ymin" => (Direction::Y, 0),
            "ymax" => (Direction::Y, 1),
            "zmin" => (Direction::Z, 0),
            "zmax" => (Direction::Z, 1),
            _ => panic!("Parameter {} not recognized!", name),
        }
    }

    /// All named parameters
    pub fn to_map(&self) -> HashMap<&'static str, f64> {
        NAMES.iter().map(|name| (*name, self.get(name))).collect()
    }

    /// Spacing of the coordinates
    pub fn spacing(&self) -> GridSpacing {
        if self.grid_stretching {
            Stretched {
                factor: self.grid_stretching_factor,
            }
            .into()
        } else {
            Uniform.into()
        }
    }

    /// Coordinates of `n` cells along `dir`
    pub fn coordinates(&self, dir: Direction, n: usize) -> Coordinates {
        let [start, end] = self.bounds[dir.index()];
        Coordinates::new(start, end, n, &self.spacing())
    }

    /// Face of the lid on a grid with `nz` cells in z-direction
    pub fn lid_face(&self, nz: usize) -> LidFace {
        self.lid_face.unwrap_or_else(|| LidFace::from_extent(nz))
    }

    /// Scale of the viscous term, one for Stokes flow
    pub fn viscosity(&self) -> f64 {
        if self.is_stokes() {
            1.
        } else {
            1. / self.reynolds_number
        }
    }

    /// Convection is switched off
    pub fn is_stokes(&self) -> bool {
        self.reynolds_number == 0.
    }
}
