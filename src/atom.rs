//! # Atoms: local stencil coefficients of every cell
//!
//! An atom couples the equation of unknown `d1` in cell `(i, j, k)`
//! to unknown `d2` in the 27 cells around it. Logically it is the
//! 8-dimensional array `[i, j, k, d1, d2, dx, dy, dz]`, where
//! `dx, dy, dz` in `{0, 1, 2}` encode the offsets `{-1, 0, +1}`.
//! The three offsets are stored in one axis of length 27 with `dx`
//! fastest, see [`offset_index`].
use crate::types::{Direction, DOF};
use ndarray::{s, Array6, ArrayView1, ArrayViewMut1};
use std::ops::{Add, AddAssign, Index, IndexMut, Mul, Neg, Sub, SubAssign};

/// Number of neighbours in a stencil (including the cell itself)
pub const STENCIL: usize = 27;

/// Offset of the cell itself
pub const CENTER: [usize; 3] = [1, 1, 1];

/// Storage position of the offset `[dx, dy, dz]`
pub fn offset_index(offset: [usize; 3]) -> usize {
    offset[0] + 3 * offset[1] + 9 * offset[2]
}

/// Offset `[dx, dy, dz]` stored at position `s`, inverse
/// of [`offset_index`]
pub fn offset_from_index(s: usize) -> [usize; 3] {
    [s % 3, (s / 3) % 3, s / 9]
}

/// Offset along `dir` only
pub fn axis_offset(dir: Direction, value: usize) -> [usize; 3] {
    let mut offset = CENTER;
    offset[dir.index()] = value;
    offset
}

/// Stencil coefficients of all cells of a grid
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Coefficients \[nx, ny, nz, dof, dof, 27\]
    data: Array6<f64>,
    /// Boundary conditions were folded into the stencils
    enforced: bool,
}

impl Atom {
    /// Atom with all coefficients zero
    ///
    /// # Panics
    /// If one of the extents is zero
    pub fn zeros(nx: usize, ny: usize, nz: usize) -> Self {
        assert!(
            nx > 0 && ny > 0 && nz > 0,
            "Atom extents must be positive, got {}x{}x{}",
            nx,
            ny,
            nz
        );
        Self {
            data: Array6::zeros((nx, ny, nz, DOF, DOF, STENCIL)),
            enforced: false,
        }
    }

    /// Cell extents \[nx, ny, nz\]
    pub fn shape(&self) -> [usize; 3] {
        let sh = self.data.shape();
        [sh[0], sh[1], sh[2]]
    }

    /// Raw coefficients \[nx, ny, nz, dof, dof, 27\]
    pub fn data(&self) -> &Array6<f64> {
        &self.data
    }

    /// Mutable raw coefficients
    pub fn data_mut(&mut self) -> &mut Array6<f64> {
        &mut self.data
    }

    /// Coefficient at `[i, j, k, d1, d2]` and `offset`
    pub fn get(&self, cell: [usize; 3], d1: usize, d2: usize, offset: [usize; 3]) -> f64 {
        self.data[[cell[0], cell[1], cell[2], d1, d2, offset_index(offset)]]
    }

    /// Mutable coefficient at `[i, j, k, d1, d2]` and `offset`
    pub fn get_mut(&mut self, cell: [usize; 3], d1: usize, d2: usize, offset: [usize; 3]) -> &mut f64 {
        &mut self.data[[cell[0], cell[1], cell[2], d1, d2, offset_index(offset)]]
    }

    /// All 27 coefficients coupling `d1` to `d2` in `cell`
    pub fn stencil(&self, cell: [usize; 3], d1: usize, d2: usize) -> ArrayView1<f64> {
        self.data.slice(s![cell[0], cell[1], cell[2], d1, d2, ..])
    }

    /// Mutable view of all 27 coefficients coupling `d1` to `d2` in `cell`
    pub fn stencil_mut(&mut self, cell: [usize; 3], d1: usize, d2: usize) -> ArrayViewMut1<f64> {
        self.data.slice_mut(s![cell[0], cell[1], cell[2], d1, d2, ..])
    }

    /// Add a three point stencil along `dir` (offsets -1, 0, +1)
    pub fn add_line(&mut self, cell: [usize; 3], d1: usize, d2: usize, dir: Direction, coefs: [f64; 3]) {
        for (o, c) in coefs.iter().enumerate() {
            *self.get_mut(cell, d1, d2, axis_offset(dir, o)) += c;
        }
    }

    /// Copy of the `d1`, `d2` block, all other blocks are zero
    pub fn block(&self, d1: usize, d2: usize) -> Self {
        let [nx, ny, nz] = self.shape();
        let mut block = Self::zeros(nx, ny, nz);
        block
            .data
            .slice_mut(s![.., .., .., d1, d2, ..])
            .assign(&self.data.slice(s![.., .., .., d1, d2, ..]));
        block
    }

    /// Largest absolute coefficient
    pub fn max_abs(&self) -> f64 {
        self.data.iter().fold(0., |m, v| m.max(v.abs()))
    }

    /// Largest absolute difference to `other`
    ///
    /// # Panics
    /// If the atoms belong to different grids
    pub fn max_abs_diff(&self, other: &Atom) -> f64 {
        self.check_shape(other);
        self.data
            .iter()
            .zip(other.data.iter())
            .fold(0., |m, (a, b)| m.max((a - b).abs()))
    }

    /// Boundary conditions were applied to this atom
    pub fn is_enforced(&self) -> bool {
        self.enforced
    }

    pub(crate) fn set_enforced(&mut self) {
        self.enforced = true;
    }

    fn check_shape(&self, other: &Atom) {
        assert_eq!(
            self.shape(),
            other.shape(),
            "Atoms of different grids cannot be combined"
        );
    }
}

impl Index<[usize; 8]> for Atom {
    type Output = f64;

    fn index(&self, idx: [usize; 8]) -> &f64 {
        let [i, j, k, d1, d2, x, y, z] = idx;
        &self.data[[i, j, k, d1, d2, offset_index([x, y, z])]]
    }
}

impl IndexMut<[usize; 8]> for Atom {
    fn index_mut(&mut self, idx: [usize; 8]) -> &mut f64 {
        let [i, j, k, d1, d2, x, y, z] = idx;
        &mut self.data[[i, j, k, d1, d2, offset_index([x, y, z])]]
    }
}

impl AddAssign<&Atom> for Atom {
    fn add_assign(&mut self, rhs: &Atom) {
        self.check_shape(rhs);
        self.data += &rhs.data;
        self.enforced |= rhs.enforced;
    }
}

impl SubAssign<&Atom> for Atom {
    fn sub_assign(&mut self, rhs: &Atom) {
        self.check_shape(rhs);
        self.data -= &rhs.data;
        self.enforced |= rhs.enforced;
    }
}

impl Add<&Atom> for Atom {
    type Output = Atom;

    fn add(mut self, rhs: &Atom) -> Atom {
        self += rhs;
        self
    }
}

impl Add for Atom {
    type Output = Atom;

    fn add(self, rhs: Atom) -> Atom {
        self + &rhs
    }
}

impl Sub<&Atom> for Atom {
    type Output = Atom;

    fn sub(mut self, rhs: &Atom) -> Atom {
        self -= rhs;
        self
    }
}

impl Sub for Atom {
    type Output = Atom;

    fn sub(self, rhs: Atom) -> Atom {
        self - &rhs
    }
}

impl Mul<f64> for Atom {
    type Output = Atom;

    fn mul(mut self, rhs: f64) -> Atom {
        self.data *= rhs;
        self
    }
}

impl Mul<Atom> for f64 {
    type Output = Atom;

    fn mul(self, rhs: Atom) -> Atom {
        rhs * self
    }
}

impl Mul<&Atom> for f64 {
    type Output = Atom;

    fn mul(self, rhs: &Atom) -> Atom {
        rhs.clone() * self
    }
}

impl Neg for Atom {
    type Output = Atom;

    fn neg(self) -> Atom {
        self * -1.
    }
}
