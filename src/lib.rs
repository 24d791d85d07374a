/*!
stemcut
========

**stemcut** severs articulated plant structures (a crown, a stem, and the
leaves or petals hanging from it) along arbitrary planes while they live inside
a rigid-body simulation.

A cut splits the stem geometry, decides which piece stays in the player's grip,
rewires every constraint that referenced the pre-cut body, holds the kept piece
with a compliant spring anchor, and releases the falling pieces. The whole
transaction runs synchronously inside one fixed physics step, with the
solver's automatic joint breaking suppressed while the structure is rewired.

```
use stemcut::cut::{CutEngine, CutParams};
use stemcut::dynamics::PhysicsWorld;
use stemcut::structure::PlantBuilder;
use stemcut::math::{Point, Vector};

let mut world = PhysicsWorld::new();
let plant = PlantBuilder::new(Point::new(0.0, 2.0, 0.0))
    .stem(0.05, 1.0)
    .build(&mut world);
let mut engine = CutEngine::new(plant, CutParams::default());

let result = engine.request_cut(
    &mut world,
    &Point::new(0.0, 1.0, 0.0),
    &Vector::y_axis(),
);
assert!(!result.aborted);
assert_eq!(result.severed.len(), 1);
```
*/

#![deny(non_camel_case_types)]
#![deny(unused_parens)]
#![deny(non_upper_case_globals)]
#![warn(unused_results)]
#![warn(missing_docs)]
#![warn(unused_imports)]
#![allow(missing_copy_implementations)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::module_inception)]
#![warn(unused_qualifications)]

#[cfg(feature = "serde-serialize")]
#[macro_use]
extern crate serde;
#[macro_use]
extern crate approx;
extern crate num_traits as num;

pub extern crate nalgebra as na;

pub mod cut;
pub mod dynamics;
pub mod geometry;
pub mod structure;
pub mod utils;

mod real {
    /// The scalar type used throughout this crate.
    #[cfg(feature = "f64")]
    pub use f64 as Real;

    /// The scalar type used throughout this crate.
    #[cfg(not(feature = "f64"))]
    pub use f32 as Real;
}

/// Compilation flags dependent aliases for mathematical types.
pub mod math {
    pub use super::real::*;
    pub use na::{Isometry3, Point3, Translation3, UnitQuaternion, UnitVector3, Vector3};

    /// The default tolerance used for geometric operations.
    pub const DEFAULT_EPSILON: Real = Real::EPSILON;

    /// The dimension of the space.
    pub const DIM: usize = 3;

    /// The point type.
    pub use Point3 as Point;

    /// The vector type.
    pub use Vector3 as Vector;

    /// The unit vector type.
    pub use UnitVector3 as UnitVector;

    /// The transformation matrix type.
    pub use Isometry3 as Isometry;

    /// The rotation type.
    pub type Rotation<N> = UnitQuaternion<N>;

    /// The translation type.
    pub use Translation3 as Translation;
}
