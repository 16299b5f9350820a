//! Index arithmetic of the flat state vector.
//!
//! Unknowns are stored with the unknown index fastest, followed by
//! `i`, `j` and `k`:
//! `index = d + i*dof + j*dof*nx + k*dof*nx*ny`.
use ndarray::{Array1, Array4, ArrayBase, Data, Ix1, Ix4};

/// Flat index of unknown `var` in cell `(i, j, k)`
pub fn sub2ind(nx: usize, ny: usize, dof: usize, i: usize, j: usize, k: usize, var: usize) -> usize {
    ((k * ny + j) * nx + i) * dof + var
}

/// Cell `(i, j, k)` and unknown of a flat index
pub fn ind2sub(nx: usize, ny: usize, nz: usize, dof: usize, idx: usize) -> (usize, usize, usize, usize) {
    let mut rem = idx;
    let var = rem % dof;
    rem /= dof;
    let i = rem % nx;
    rem /= nx;
    let j = rem % ny;
    rem /= ny;
    let k = rem % nz;
    (i, j, k, var)
}

/// Column of unknown `d2` at relative position `offset - 1` in
/// the equation of unknown `d1` that is stored in `row`.
///
/// This is the single place where stencil offsets are translated
/// to positions in the flat state vector.
#[allow(clippy::cast_possible_wrap)]
pub fn column(row: usize, d1: usize, d2: usize, offset: [usize; 3], nx: usize, ny: usize, dof: usize) -> isize {
    let [x, y, z] = offset;
    row as isize
        + (x as isize - 1) * dof as isize
        + (y as isize - 1) * (nx * dof) as isize
        + (z as isize - 1) * (nx * ny * dof) as isize
        + d2 as isize
        - d1 as isize
}

/// Put a flat state vector into the shape `[nx, ny, nz, dof]`
///
/// # Panics
/// If the length of `state` does not match the grid
pub fn create_state_mtx<S>(state: &ArrayBase<S, Ix1>, nx: usize, ny: usize, nz: usize, dof: usize) -> Array4<f64>
where
    S: Data<Elem = f64>,
{
    assert_eq!(
        state.len(),
        nx * ny * nz * dof,
        "State vector does not match a {}x{}x{} grid with {} unknowns per cell",
        nx,
        ny,
        nz,
        dof
    );
    // Memory order of the flat vector is the reversed axis order
    let mut mtx = Array4::<f64>::zeros((nx, ny, nz, dof));
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                for d in 0..dof {
                    mtx[[i, j, k, d]] = state[sub2ind(nx, ny, dof, i, j, k, d)];
                }
            }
        }
    }
    mtx
}

/// Flatten a state of shape `[nx, ny, nz, dof]`, inverse of
/// [`create_state_mtx`]
pub fn create_state_vec<S>(mtx: &ArrayBase<S, Ix4>) -> Array1<f64>
where
    S: Data<Elem = f64>,
{
    let (nx, ny, nz, dof) = mtx.dim();
    let mut state = Array1::<f64>::zeros(nx * ny * nz * dof);
    for ((i, j, k, d), v) in mtx.indexed_iter() {
        state[sub2ind(nx, ny, dof, i, j, k, d)] = *v;
    }
    state
}
