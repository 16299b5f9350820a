//! # No-slip walls with a moving lid
//!
//! All six faces of the box are walls. The velocity normal to a wall
//! vanishes, the tangential velocity equals the wall velocity, which is
//! zero everywhere except for the lid, which moves in x-direction.
//!
//! Tangential velocities live half a cell away from the wall, the value
//! outside the wall is eliminated with `u_ghost = -u + 2 * U` and the
//! known part `2 * U` moves to the forcing vector.
//!
//! # Example
//!```
//! use fvmflow::boundary_conditions::{BoundaryConditions, LidFace};
//! use fvmflow::grid::Grid;
//! use fvmflow::operators::Derivatives;
//! use ndarray::Array1;
//! let grid = Grid::unit_cube(4, 4, 1);
//! let mut atom = Derivatives::new(&grid).laplacian();
//! let mut frc = Array1::<f64>::zeros(grid.n());
//! let bc = BoundaryConditions::new(&grid, Some(LidFace::North), 1.);
//! bc.apply(&mut atom, &mut frc);
//! assert!(atom.is_enforced());
//! assert!((frc[grid.sub2ind(1, 3, 0, 0)] - 2.).abs() < 1e-12);
//!```
use crate::atom::{offset_from_index, offset_index, Atom, CENTER, STENCIL};
use crate::grid::Grid;
use crate::types::{Direction, DOF};
use ndarray::Array1;
use std::fmt;

/// Face of the box shaped domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    /// x = xmax
    East,
    /// x = xmin
    West,
    /// y = ymax
    North,
    /// y = ymin
    South,
    /// z = zmax
    Top,
    /// z = zmin
    Bottom,
}

impl Face {
    /// All faces in the order in which walls are enforced
    pub const ALL: [Face; 6] = [
        Face::East,
        Face::West,
        Face::North,
        Face::South,
        Face::Top,
        Face::Bottom,
    ];

    /// Wall normal direction
    pub fn direction(self) -> Direction {
        match self {
            Face::East | Face::West => Direction::X,
            Face::North | Face::South => Direction::Y,
            Face::Top | Face::Bottom => Direction::Z,
        }
    }

    /// Face at the upper end of its direction
    pub fn is_high(self) -> bool {
        matches!(self, Face::East | Face::North | Face::Top)
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Face::East => "east",
            Face::West => "west",
            Face::North => "north",
            Face::South => "south",
            Face::Top => "top",
            Face::Bottom => "bottom",
        };
        write!(f, "{}", name)
    }
}

/// Face that moves with the lid velocity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LidFace {
    /// Lid at y = ymax, for flat (2D) problems
    North,
    /// Lid at z = zmax
    Top,
}

impl LidFace {
    /// The lid is the north face for grids with a single cell in
    /// z-direction and the top face otherwise
    pub fn from_extent(nz: usize) -> Self {
        if nz <= 1 {
            LidFace::North
        } else {
            LidFace::Top
        }
    }

    /// Domain face of the lid
    pub fn face(self) -> Face {
        match self {
            LidFace::North => Face::North,
            LidFace::Top => Face::Top,
        }
    }
}

/// Dirichlet conditions of a lid driven cavity
#[derive(Debug, Clone)]
pub struct BoundaryConditions<'a> {
    grid: &'a Grid,
    lid_face: LidFace,
    lid_velocity: f64,
}

impl<'a> BoundaryConditions<'a> {
    /// Walls of `grid`. Without `lid_face` the lid is inferred from
    /// the extent in z-direction, see [`LidFace::from_extent`].
    pub fn new(grid: &'a Grid, lid_face: Option<LidFace>, lid_velocity: f64) -> Self {
        let lid_face = lid_face.unwrap_or_else(|| LidFace::from_extent(grid.nz));
        Self {
            grid,
            lid_face,
            lid_velocity,
        }
    }

    /// Face of the lid
    pub fn lid_face(&self) -> LidFace {
        self.lid_face
    }

    /// Fold the walls into `atom` and add the lid forcing to `frc`.
    ///
    /// Faces are treated in the order of [`Face::ALL`]. The forcing is
    /// accumulated, so the caller owns and resets `frc`.
    ///
    /// # Panics
    /// If the atom does not belong to the grid, `frc` has the wrong
    /// length or the conditions were already applied to `atom`.
    pub fn apply(&self, atom: &mut Atom, frc: &mut Array1<f64>) {
        assert_eq!(
            atom.shape(),
            self.grid.shape(),
            "Atom does not belong to this grid"
        );
        assert_eq!(frc.len(), self.grid.n(), "Forcing vector has wrong length");
        assert!(
            !atom.is_enforced(),
            "Boundary conditions were already applied to this atom!"
        );
        for face in Face::ALL.iter() {
            self.dirichlet(*face, atom, frc);
        }
        atom.set_enforced();
    }

    /// Apply the walls to `atom` and return the lid forcing
    pub fn forcing(&self, atom: &mut Atom) -> Array1<f64> {
        let mut frc = Array1::<f64>::zeros(self.grid.n());
        self.apply(atom, &mut frc);
        frc
    }

    fn dirichlet(&self, face: Face, atom: &mut Atom, frc: &mut Array1<f64>) {
        let a = face.direction().index();
        let n = self.grid.extent(face.direction());
        let plane = if face.is_high() { n - 1 } else { 0 };
        // Stencil position beyond the wall
        let outer = if face.is_high() { 2 } else { 0 };
        let lid = face == self.lid_face.face();
        self.grid.for_each_cell(|cell| {
            if cell[a] != plane {
                return;
            }
            let data = atom.data_mut();
            let [i, j, k] = cell;
            // Tangential velocities: ghost = -inner + 2 * U
            for d1 in 0..DOF {
                for b in (0..3).filter(|b| *b != a) {
                    for s in 0..STENCIL {
                        let off = offset_from_index(s);
                        if off[a] == 1 {
                            let mut ghost = off;
                            ghost[a] = outer;
                            let g = data[[i, j, k, d1, b, offset_index(ghost)]];
                            data[[i, j, k, d1, b, s]] -= g;
                        }
                    }
                }
            }
            if face.is_high() {
                // The normal velocity on the wall is zero
                for d1 in 0..DOF {
                    for s in (0..STENCIL).filter(|s| offset_from_index(*s)[a] == 1) {
                        data[[i, j, k, d1, a, s]] = 0.;
                    }
                }
                if lid {
                    for d1 in (0..3).filter(|d1| *d1 != a) {
                        let coef: f64 = (0..STENCIL)
                            .filter(|s| offset_from_index(*s)[a] == outer)
                            .map(|s| data[[i, j, k, d1, 0, s]])
                            .sum();
                        frc[self.grid.sub2ind(i, j, k, d1)] += 2. * self.lid_velocity * coef;
                    }
                }
                for d2 in 0..DOF {
                    for s in 0..STENCIL {
                        data[[i, j, k, a, d2, s]] = 0.;
                    }
                }
            }
            for d1 in 0..DOF {
                for d2 in 0..DOF {
                    for s in (0..STENCIL).filter(|s| offset_from_index(*s)[a] == outer) {
                        data[[i, j, k, d1, d2, s]] = 0.;
                    }
                }
            }
            if face.is_high() {
                data[[i, j, k, a, a, offset_index(CENTER)]] = -1.;
            }
        });
        // The wall velocity is no unknown of the neighbouring cell
        if face.is_high() && n >= 2 {
            self.grid.for_each_cell(|cell| {
                if cell[a] != n - 2 {
                    return;
                }
                for s in (0..STENCIL).filter(|s| offset_from_index(*s)[a] == 2) {
                    *atom.get_mut(cell, a, a, offset_from_index(s)) = 0.;
                }
            });
        }
        log::trace!("Applied dirichlet condition at the {} face", face);
    }
}

/// Apply the walls of `grid` to `atom` and return the forcing
pub fn boundaries(grid: &Grid, atom: &mut Atom, lid_face: Option<LidFace>, lid_velocity: f64) -> Array1<f64> {
    BoundaryConditions::new(grid, lid_face, lid_velocity).forcing(atom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::Derivatives;

    fn linear_atom(grid: &Grid) -> Atom {
        let derivatives = Derivatives::new(grid);
        derivatives.laplacian() - derivatives.gradient() + derivatives.divergence()
    }

    /// No coefficient may couple to a cell outside of the grid
    fn assert_no_ghosts(grid: &Grid, atom: &Atom) {
        let shape = grid.shape();
        grid.for_each_cell(|cell| {
            for d1 in 0..DOF {
                for d2 in 0..DOF {
                    for s in 0..STENCIL {
                        let off = offset_from_index(s);
                        let outside = (0..3).any(|a| {
                            let p = cell[a] as isize + off[a] as isize - 1;
                            p < 0 || p >= shape[a] as isize
                        });
                        if outside {
                            assert!(
                                atom.get(cell, d1, d2, off).abs() < 1e-14,
                                "ghost reference at {:?} {} {} {:?}",
                                cell,
                                d1,
                                d2,
                                off
                            );
                        }
                    }
                }
            }
        });
    }

    #[test]
    fn test_lid_from_extent() {
        assert_eq!(LidFace::from_extent(1), LidFace::North);
        assert_eq!(LidFace::from_extent(4), LidFace::Top);
        let grid = Grid::unit_cube(2, 2, 1);
        assert_eq!(BoundaryConditions::new(&grid, None, 1.).lid_face(), LidFace::North);
        let bc = BoundaryConditions::new(&grid, Some(LidFace::Top), 1.);
        assert_eq!(bc.lid_face(), LidFace::Top);
    }

    #[test]
    fn test_lid_forcing_north() {
        let grid = Grid::unit_cube(4, 4, 1);
        let mut atom = linear_atom(&grid);
        let fresh = atom.clone();
        let bc = BoundaryConditions::new(&grid, None, 1.);
        let frc = bc.forcing(&mut atom);
        for i in 0..3 {
            let coef = fresh.get([i, 3, 0], 0, 0, [1, 2, 1]);
            assert!((coef - 1.).abs() < 1e-12);
            let f = frc[grid.sub2ind(i, 3, 0, 0)];
            assert!((f - 2. * coef).abs() < 1e-12, "got {} expected {}", f, 2. * coef);
        }
        // u vanishes at the east wall
        assert!(frc[grid.sub2ind(3, 3, 0, 0)].abs() < 1e-12);
        let total: f64 = frc.iter().map(|v| v.abs()).sum();
        assert!((total - 6.).abs() < 1e-12);
    }

    #[test]
    fn test_lid_velocity_scales_forcing() {
        let grid = Grid::unit_cube(4, 4, 1);
        let mut atom = linear_atom(&grid);
        let frc = boundaries(&grid, &mut atom, None, -0.5);
        assert!((frc[grid.sub2ind(1, 3, 0, 0)] + 1.).abs() < 1e-12);
    }

    #[test]
    fn test_forcing_accumulates() {
        let grid = Grid::unit_cube(4, 4, 1);
        let bc = BoundaryConditions::new(&grid, Some(LidFace::North), 1.);
        let mut frc = Array1::<f64>::zeros(grid.n());
        let mut first = linear_atom(&grid);
        let mut second = linear_atom(&grid);
        bc.apply(&mut first, &mut frc);
        bc.apply(&mut second, &mut frc);
        assert!((frc[grid.sub2ind(1, 3, 0, 0)] - 4.).abs() < 1e-12);
        assert!(first.max_abs_diff(&second) < 1e-15);
    }

    #[test]
    #[should_panic]
    fn test_apply_twice_panics() {
        let grid = Grid::unit_cube(4, 4, 1);
        let bc = BoundaryConditions::new(&grid, None, 1.);
        let mut atom = linear_atom(&grid);
        let mut frc = Array1::<f64>::zeros(grid.n());
        bc.apply(&mut atom, &mut frc);
        bc.apply(&mut atom, &mut frc);
    }

    #[test]
    fn test_lid_forcing_top() {
        let grid = Grid::unit_cube(3, 3, 3);
        let mut atom = linear_atom(&grid);
        let fresh = atom.clone();
        let frc = boundaries(&grid, &mut atom, None, 1.);
        for j in 0..2 {
            for i in 0..2 {
                let coef = fresh.get([i, j, 2], 0, 0, [1, 1, 2]);
                assert!(coef > 0.);
                assert!((frc[grid.sub2ind(i, j, 2, 0)] - 2. * coef).abs() < 1e-12);
                // v is not driven by the lid
                assert!(frc[grid.sub2ind(i, j, 2, 1)].abs() < 1e-12);
            }
        }
        // Nothing at the north face
        assert!(frc[grid.sub2ind(1, 2, 0, 0)].abs() < 1e-12);
    }

    #[test]
    fn test_walls_remove_ghosts() {
        for grid in [Grid::unit_cube(4, 4, 1), Grid::unit_cube(3, 3, 3)].iter() {
            let mut atom = linear_atom(grid);
            boundaries(grid, &mut atom, None, 1.);
            assert_no_ghosts(grid, &atom);
            // Normal velocity on the high walls is fixed
            let shape = grid.shape();
            grid.for_each_cell(|cell| {
                for a in 0..3 {
                    if cell[a] == shape[a] - 1 {
                        assert!((atom.get(cell, a, a, CENTER) + 1.).abs() < 1e-14);
                        assert!((atom.stencil(cell, a, a).sum() + 1.).abs() < 1e-14);
                    }
                }
            });
        }
    }
}
