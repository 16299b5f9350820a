//! Types shared by the operators, boundary conditions and assembly
use std::fmt;

/// Number of unknowns per cell: u, v, w and pressure
pub const DOF: usize = 4;

/// Position of the pressure in the unknowns of a cell
pub const PRESSURE: usize = 3;

/// Cartesian direction.
///
/// A direction also names the velocity component normal to the
/// cell faces it crosses, i.e. `X` is u, `Y` is v and `Z` is w.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// x-direction (velocity u)
    X,
    /// y-direction (velocity v)
    Y,
    /// z-direction (velocity w)
    Z,
}

impl Direction {
    /// All directions in storage order
    pub const ALL: [Direction; 3] = [Direction::X, Direction::Y, Direction::Z];

    /// Position in `[x, y, z]` arrays, and the unknown index of the
    /// velocity component along this direction
    pub fn index(self) -> usize {
        match self {
            Direction::X => 0,
            Direction::Y => 1,
            Direction::Z => 2,
        }
    }

    /// Direction from its position in `[x, y, z]`
    ///
    /// # Panics
    /// If `index > 2`
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Direction::X,
            1 => Direction::Y,
            2 => Direction::Z,
            _ => panic!("Direction index {} out of range 0..3!", index),
        }
    }

    /// The two remaining directions, in storage order
    pub fn others(self) -> [Direction; 2] {
        match self {
            Direction::X => [Direction::Y, Direction::Z],
            Direction::Y => [Direction::X, Direction::Z],
            Direction::Z => [Direction::X, Direction::Y],
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::X => "x",
            Direction::Y => "y",
            Direction::Z => "z",
        };
        write!(f, "{}", name)
    }
}
