//! # Finite volume operators
//!
//! Every operator returns a fresh [`Atom`](crate::atom::Atom), callers
//! combine them additively.
pub mod convection;
pub mod derivatives;
pub use convection::{convection, ConvectiveTerm};
pub use derivatives::Derivatives;
