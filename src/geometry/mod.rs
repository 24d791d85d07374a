//! Collision geometry of plant parts and the plane-split primitive.
//!
//! The cutting engine treats splitting as a black box behind the
//! [`GeometrySplitter`] trait; [`PlaneSplitter`] is the reference
//! implementation for closed triangle meshes.

pub use self::cut_mesh::CutMesh;
pub use self::mass::{signed_volume_and_center_of_mass, volume_and_center_of_mass};
pub use self::plane_splitter::PlaneSplitter;
pub use self::point_triangle::project_point_on_triangle;
pub use self::split::{Fragment, GeometrySplitter};

mod cut_mesh;
mod mass;
mod plane_splitter;
mod point_triangle;
mod split;
