//! Some useful functions on flat state vectors
use ndarray::{Array1, ArrayBase, Data, Ix1};

/// Return l2 norm of a state
pub fn norm_l2<S: Data<Elem = f64>>(array: &ArrayBase<S, Ix1>) -> f64 {
    array.iter().map(|x| x.powi(2)).sum::<f64>().sqrt()
}

/// Return random state of length `n` with values in [-c, c]
pub fn random_state(n: usize, c: f64) -> Array1<f64> {
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;
    Array1::random(n, Uniform::new(-c, c))
}
