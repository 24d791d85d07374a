//! Various unsorted geometrical and logical operators.

pub use self::arena::{Arena, Index};
pub use self::basis::orthonormal_basis;
pub use self::center::center;
pub use self::sorted_pair::SortedPair;

mod arena;
mod basis;
mod center;
pub mod hashmap;
mod sorted_pair;
