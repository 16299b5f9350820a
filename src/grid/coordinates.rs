//! # One dimensional cell coordinates
//!
//! A coordinate vector of a grid with `n` cells stores the upper face
//! of every cell, `x[0..n]`, together with two entries on either side:
//!
//! - `x[-1]` is the lower domain boundary
//! - `x[-2]`, `x[n]` and `x[n+1]` are ghost faces, mirrored about
//!   the nearest domain boundary
//!
//! With signed indexing the stencils can always access `i-2..=i+1`
//! for `i` in `0..n` without bound checks.
use ndarray::Array1;
use std::ops::Index;

/// Number of ghost faces on each side
pub const GHOSTS: usize = 2;

/// Generate the `n` upper cell faces between `start` and `end`.
#[enum_dispatch]
pub trait Spacing {
    /// Upper faces of `n` cells, the last one is `end`
    fn faces(&self, start: f64, end: f64, n: usize) -> Array1<f64>;
}

/// Equidistant cells
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Uniform;

impl Spacing for Uniform {
    fn faces(&self, start: f64, end: f64, n: usize) -> Array1<f64> {
        let dx = (end - start) / n as f64;
        let mut faces = Array1::from_shape_fn(n, |i| start + (i + 1) as f64 * dx);
        faces[n - 1] = end;
        faces
    }
}

/// Cell widths grow geometrically with `factor` from `start` to `end`.
///
/// A factor of one yields the [`Uniform`] grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stretched {
    /// Ratio of neighbouring cell widths
    pub factor: f64,
}

impl Spacing for Stretched {
    fn faces(&self, start: f64, end: f64, n: usize) -> Array1<f64> {
        assert!(
            self.factor > 0.,
            "Grid stretching factor must be positive, got {}",
            self.factor
        );
        if (self.factor - 1.).abs() < f64::EPSILON {
            return Uniform.faces(start, end, n);
        }
        // The smallest cell must stay well above rounding of the largest
        let spread = (n as f64 - 1.) * self.factor.ln().abs();
        assert!(
            spread < -(1e3 * f64::EPSILON).ln(),
            "Grid stretching factor {} is too strong for {} cells",
            self.factor,
            n
        );
        // Widths relative to the largest cell
        let largest = if self.factor > 1. { n - 1 } else { 0 };
        let widths = Array1::from_shape_fn(n, |i| self.factor.powi(i as i32 - largest as i32));
        let scale = (end - start) / widths.sum();
        let mut faces = Array1::<f64>::zeros(n);
        let mut face = start;
        for (f, w) in faces.iter_mut().zip(widths.iter()) {
            face += w * scale;
            *f = face;
        }
        faces[n - 1] = end;
        faces
    }
}

/// Available grid spacings
#[enum_dispatch(Spacing)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridSpacing {
    /// Equidistant
    Uniform,
    /// Geometric stretching
    Stretched,
}

/// Cell coordinates with ghost faces, see module documentation.
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinates {
    /// Number of cells
    n: usize,
    /// Faces `x[-2..=n+1]`
    data: Array1<f64>,
}

impl Coordinates {
    /// Coordinates of `n` cells between `start` and `end`
    ///
    /// # Panics
    /// If `n == 0` or `end <= start`
    ///
    /// # Example
    ///```
    /// use fvmflow::grid::{Coordinates, Uniform};
    /// let x = Coordinates::new(0., 1., 4, &Uniform.into());
    /// assert!((x[0] - 0.25).abs() < 1e-14);
    /// assert!((x[-1]).abs() < 1e-14);
    /// assert!((x[-2] + 0.25).abs() < 1e-14);
    /// assert!((x[5] - 1.5).abs() < 1e-14);
    ///```
    pub fn new(start: f64, end: f64, n: usize, spacing: &GridSpacing) -> Self {
        assert!(n > 0, "Coordinates need at least one cell");
        assert!(
            end > start,
            "Coordinate range is empty: start {} end {}",
            start,
            end
        );
        Self::from_faces(start, &spacing.faces(start, end, n))
    }

    /// Coordinates from the lower boundary and the `n` upper cell faces
    ///
    /// # Panics
    /// If `faces` is empty or not strictly increasing
    pub fn from_faces(start: f64, faces: &Array1<f64>) -> Self {
        let n = faces.len();
        assert!(n > 0, "Coordinates need at least one cell");
        let mut prev = start;
        for f in faces.iter() {
            assert!(*f > prev, "Cell faces must be strictly increasing");
            prev = *f;
        }
        let end = faces[n - 1];
        let mut data = Array1::<f64>::zeros(n + 2 * GHOSTS);
        data[1] = start;
        for (i, f) in faces.iter().enumerate() {
            data[i + GHOSTS] = *f;
        }
        data[0] = 2. * start - data[GHOSTS];
        // x[n] and x[n+1] mirror x[n-2] and x[n-3]
        data[n + GHOSTS] = 2. * end - data[n];
        data[n + GHOSTS + 1] = 2. * end - data[n - 1];
        Self { n, data }
    }

    /// Uniform coordinates
    pub fn uniform(start: f64, end: f64, n: usize) -> Self {
        Self::new(start, end, n, &Uniform.into())
    }

    /// Stretched coordinates
    pub fn stretched(start: f64, end: f64, n: usize, factor: f64) -> Self {
        Self::new(start, end, n, &Stretched { factor }.into())
    }

    /// Number of cells
    pub fn n(&self) -> usize {
        self.n
    }

    /// Lower domain boundary
    pub fn start(&self) -> f64 {
        self[-1]
    }

    /// Upper domain boundary
    pub fn end(&self) -> f64 {
        self[self.n as isize - 1]
    }

    /// Width of cell `i`
    pub fn cell_width(&self, i: isize) -> f64 {
        self[i] - self[i - 1]
    }

    /// Distance between the centres of cell `i` and `i+1`,
    /// i.e. the width of the control volume around face `i`
    pub fn staggered_width(&self, i: isize) -> f64 {
        (self[i + 1] - self[i - 1]) / 2.
    }

    /// All `n+4` entries, starting at `x[-2]`
    pub fn as_array(&self) -> &Array1<f64> {
        &self.data
    }
}

impl Index<isize> for Coordinates {
    type Output = f64;

    fn index(&self, i: isize) -> &f64 {
        let pos = i + GHOSTS as isize;
        assert!(
            pos >= 0 && (pos as usize) < self.data.len(),
            "Coordinate index {} out of range -2..={}",
            i,
            self.n + 1
        );
        &self.data[pos as usize]
    }
}
