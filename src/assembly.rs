//! # Assembly of atoms
//!
//! An atom with boundary conditions applied is turned either into a
//! sparse matrix in compressed row storage or directly into the
//! action of that matrix on a state.
//!
//! The two are consistent: `rhs(x, atom) == -(assemble(atom) * x)`.
use crate::atom::{offset_from_index, Atom, STENCIL};
use crate::grid::{column, create_state_mtx, create_state_vec, sub2ind};
use crate::types::DOF;
use ndarray::{s, Array1, Array2, Array4, ArrayBase, Data, Ix1, Zip};

/// Coefficients with a smaller magnitude are dropped from the matrix
pub const PRUNE_TOL: f64 = 1e-14;

/// Sparse matrix in compressed row storage
#[derive(Debug, Clone, PartialEq)]
pub struct CrsMatrix {
    /// Values
    pub co_a: Array1<f64>,
    /// Column of each value
    pub jco_a: Array1<usize>,
    /// Start of each row in `co_a`, the last entry is the number of values
    pub beg_a: Array1<usize>,
}

impl CrsMatrix {
    /// Number of rows
    pub fn nrows(&self) -> usize {
        self.beg_a.len() - 1
    }

    /// Number of stored values
    pub fn nnz(&self) -> usize {
        self.beg_a[self.nrows()]
    }

    /// Value at `row`, `col` (zero if not stored)
    pub fn get(&self, row: usize, col: usize) -> f64 {
        (self.beg_a[row]..self.beg_a[row + 1])
            .find(|idx| self.jco_a[*idx] == col)
            .map_or(0., |idx| self.co_a[idx])
    }

    /// Matrix vector product
    ///
    /// # Panics
    /// If the length of `x` does not match the number of rows
    pub fn matvec<S>(&self, x: &ArrayBase<S, Ix1>) -> Array1<f64>
    where
        S: Data<Elem = f64>,
    {
        let n = self.nrows();
        assert_eq!(x.len(), n, "Vector does not match the matrix");
        Array1::from_shape_fn(n, |row| {
            (self.beg_a[row]..self.beg_a[row + 1])
                .map(|idx| self.co_a[idx] * x[self.jco_a[idx]])
                .sum()
        })
    }

    /// Dense copy, for small problems and debugging
    pub fn to_dense(&self) -> Array2<f64> {
        let n = self.nrows();
        let mut dense = Array2::<f64>::zeros((n, n));
        for row in 0..n {
            for idx in self.beg_a[row]..self.beg_a[row + 1] {
                dense[[row, self.jco_a[idx]]] += self.co_a[idx];
            }
        }
        dense
    }
}

/// Assemble the sparse matrix of `atom`.
///
/// Rows are ordered like the flat state, see [`sub2ind`]. Within a row
/// the values follow the order in which nonzero stencil positions are
/// found in the atom (`dz`, `dy`, `dx`, then the unknown).
///
/// # Panics
/// If a value couples to a cell outside of the grid, i.e. the
/// boundary conditions were not applied.
///
/// # Example
///```
/// use fvmflow::assembly::assemble;
/// use fvmflow::boundary_conditions::boundaries;
/// use fvmflow::grid::Grid;
/// use fvmflow::operators::Derivatives;
/// let grid = Grid::unit_cube(4, 4, 1);
/// let mut atom = Derivatives::new(&grid).divergence();
/// boundaries(&grid, &mut atom, None, 1.);
/// let mat = assemble(&atom);
/// assert_eq!(mat.nrows(), grid.n());
///```
pub fn assemble(atom: &Atom) -> CrsMatrix {
    let [nx, ny, nz] = atom.shape();
    let n = nx * ny * nz * DOF;
    let data = atom.data();

    // Stencil positions and unknowns which are in use anywhere
    let mut configs: Vec<(usize, usize)> = Vec::new();
    for s in 0..STENCIL {
        for d2 in 0..DOF {
            if data
                .slice(s![.., .., .., .., d2, s])
                .iter()
                .any(|v| *v != 0.)
            {
                configs.push((d2, s));
            }
        }
    }

    let mut co_a = Vec::<f64>::new();
    let mut jco_a = Vec::<usize>::new();
    let mut beg_a = Vec::<usize>::with_capacity(n + 1);
    beg_a.push(0);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                for d1 in 0..DOF {
                    let row = sub2ind(nx, ny, DOF, i, j, k, d1);
                    for (d2, s) in configs.iter() {
                        let value = data[[i, j, k, d1, *d2, *s]];
                        if value.abs() <= PRUNE_TOL {
                            continue;
                        }
                        let offset = offset_from_index(*s);
                        let outside = [i, j, k]
                            .iter()
                            .zip([nx, ny, nz].iter())
                            .zip(offset.iter())
                            .any(|((p, n), o)| p + o == 0 || p + o > *n);
                        if outside {
                            panic!(
                                "Cell ({}, {}, {}) couples to a cell outside the grid \
                                 (offset {:?}), apply the boundary conditions first!",
                                i, j, k, offset
                            );
                        }
                        let col = column(row, d1, *d2, offset, nx, ny, DOF);
                        jco_a.push(col as usize);
                        co_a.push(value);
                    }
                    beg_a.push(co_a.len());
                }
            }
        }
    }
    log::debug!(
        "Assembled {} rows with {} nonzeros from {} stencil positions",
        n,
        co_a.len(),
        configs.len()
    );
    CrsMatrix {
        co_a: Array1::from(co_a),
        jco_a: Array1::from(jco_a),
        beg_a: Array1::from(beg_a),
    }
}

/// Apply `atom` to `state` without assembling the matrix and return
/// the negated result, `-(A * state)`.
///
/// Neighbours outside of the grid read zero.
///
/// # Panics
/// If the length of `state` does not match the atom
pub fn rhs<S>(state: &ArrayBase<S, Ix1>, atom: &Atom) -> Array1<f64>
where
    S: Data<Elem = f64>,
{
    let [nx, ny, nz] = atom.shape();
    let state = create_state_mtx(state, nx, ny, nz, DOF);
    let mut padded = Array4::<f64>::zeros((nx + 2, ny + 2, nz + 2, DOF));
    padded
        .slice_mut(s![1..=nx, 1..=ny, 1..=nz, ..])
        .assign(&state);

    let data = atom.data();
    let mut out = Array4::<f64>::zeros((nx, ny, nz, DOF));
    for s in 0..STENCIL {
        let [x, y, z] = offset_from_index(s);
        for d1 in 0..DOF {
            for d2 in 0..DOF {
                Zip::from(out.slice_mut(s![.., .., .., d1]))
                    .and(data.slice(s![.., .., .., d1, d2, s]))
                    .and(padded.slice(s![x..x + nx, y..y + ny, z..z + nz, d2]))
                    .for_each(|o, &a, &u| *o -= a * u);
            }
        }
    }
    create_state_vec(&out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::{offset_index, CENTER};
    use crate::boundary_conditions::boundaries;
    use crate::functions::random_state;
    use crate::grid::{Coordinates, Grid};
    use crate::operators::{convection, Derivatives};

    fn approx_eq(result: &Array1<f64>, expected: &Array1<f64>) {
        let dif = 1e-10;
        for (a, b) in expected.iter().zip(result.iter()) {
            if (a - b).abs() > dif {
                panic!("Large difference of values, got {} expected {}.", b, a)
            }
        }
    }

    fn full_atom(grid: &Grid, state: &Array1<f64>) -> Atom {
        let derivatives = Derivatives::new(grid);
        let (jac, _) = convection(grid, state);
        let mut atom = derivatives.laplacian() - derivatives.gradient() + derivatives.divergence() + jac;
        boundaries(grid, &mut atom, None, 1.);
        atom
    }

    fn check_consistency(grid: &Grid) {
        let state = random_state(grid.n(), 1.);
        let atom = full_atom(grid, &state);
        let mat = assemble(&atom);
        let x = random_state(grid.n(), 1.);
        let expected = -mat.matvec(&x);
        approx_eq(&rhs(&x, &atom), &expected);
    }

    #[test]
    fn test_rhs_matches_matrix_2d() {
        check_consistency(&Grid::unit_cube(4, 4, 1));
    }

    #[test]
    fn test_rhs_matches_matrix_3d() {
        check_consistency(&Grid::unit_cube(3, 3, 3));
    }

    #[test]
    fn test_rhs_matches_matrix_stretched() {
        let grid = Grid::new(
            Coordinates::stretched(0., 1., 5, 1.5),
            Coordinates::stretched(-1., 1., 4, 0.7),
            Coordinates::uniform(0., 1., 2),
        );
        check_consistency(&grid);
    }

    #[test]
    fn test_row_pointers() {
        let grid = Grid::unit_cube(4, 4, 1);
        let state = random_state(grid.n(), 1.);
        let mat = assemble(&full_atom(&grid, &state));
        assert_eq!(mat.beg_a.len(), grid.n() + 1);
        assert_eq!(mat.beg_a[0], 0);
        for w in mat.beg_a.windows(2) {
            assert!(w[0] <= w[1]);
        }
        assert_eq!(mat.nnz(), mat.co_a.len());
        assert_eq!(mat.nnz(), mat.jco_a.len());
        for col in mat.jco_a.iter() {
            assert!(*col < grid.n());
        }
        for v in mat.co_a.iter() {
            assert!(v.abs() > PRUNE_TOL);
        }
    }

    #[test]
    fn test_assemble_laplacian_entries() {
        let grid = Grid::unit_cube(3, 3, 3);
        let mut atom = Derivatives::new(&grid).laplacian();
        boundaries(&grid, &mut atom, None, 0.);
        let mat = assemble(&atom);
        let row = grid.sub2ind(1, 1, 1, 2);
        // Center of a wall velocity row is the identity
        let wall = grid.sub2ind(1, 1, 2, 2);
        assert!((mat.get(wall, wall) + 1.).abs() < 1e-14);
        // Neighbour in x-direction
        let col = grid.sub2ind(0, 1, 1, 2);
        assert!((mat.get(row, col) - atom.get([1, 1, 1], 2, 2, [0, 1, 1])).abs() < 1e-14);
        let dense = mat.to_dense();
        assert!((dense[[row, col]] - mat.get(row, col)).abs() < 1e-14);
        // Pressure rows are empty
        assert_eq!(mat.beg_a[row + 1], mat.beg_a[row + 2]);
    }

    #[test]
    fn test_row_entry_order() {
        let grid = Grid::unit_cube(3, 3, 3);
        let state = random_state(grid.n(), 1.);
        let atom = full_atom(&grid, &state);
        let mat = assemble(&atom);
        let (nx, ny) = (grid.nx, grid.ny);
        for (cell, d1) in [([1, 1, 1], 0), ([0, 2, 1], 1), ([2, 0, 0], 3)].iter() {
            let [i, j, k] = *cell;
            let row = grid.sub2ind(i, j, k, *d1);
            // Stencil position first (dz, dy, dx), then the unknown
            let mut expected = Vec::new();
            for s in 0..STENCIL {
                for d2 in 0..DOF {
                    let value = atom.data()[[i, j, k, *d1, d2, s]];
                    if value.abs() > PRUNE_TOL {
                        let col = column(row, *d1, d2, offset_from_index(s), nx, ny, DOF);
                        expected.push(col as usize);
                    }
                }
            }
            let found = mat.jco_a.slice(s![mat.beg_a[row]..mat.beg_a[row + 1]]).to_vec();
            assert!(!found.is_empty());
            assert_eq!(found, expected);
            // With the unknown index fastest this is ascending
            for w in found.windows(2) {
                assert!(w[0] < w[1]);
            }
        }
    }

    #[test]
    fn test_tiny_values() {
        let grid = Grid::unit_cube(4, 4, 1);
        let mut atom = Derivatives::new(&grid).laplacian();
        boundaries(&grid, &mut atom, None, 0.);
        // u couples to v of the same cell with a negligible value
        atom.stencil_mut([1, 1, 0], 0, 1)[offset_index(CENTER)] = 1e-15;
        let mat = assemble(&atom);
        let row = grid.sub2ind(1, 1, 0, 0);
        let col = grid.sub2ind(1, 1, 0, 1);
        let cols = mat.jco_a.slice(s![mat.beg_a[row]..mat.beg_a[row + 1]]);
        assert!(cols.iter().all(|c| *c != col));
        let mut x = Array1::<f64>::zeros(grid.n());
        x[col] = 1.;
        // The matrix misses the value, the direct evaluation does not
        assert!(mat.matvec(&x)[row].abs() < 1e-30);
        assert!((rhs(&x, &atom)[row] + 1e-15).abs() < 1e-30);
    }

    #[test]
    #[should_panic]
    fn test_assemble_without_boundaries() {
        let grid = Grid::unit_cube(4, 4, 1);
        assemble(&Derivatives::new(&grid).laplacian());
    }
}
