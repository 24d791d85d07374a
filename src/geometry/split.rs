use crate::geometry::CutMesh;
use crate::math::{Point, Real, UnitVector};

/// One closed piece produced by splitting a mesh with a plane.
#[derive(Clone, Debug)]
pub struct Fragment {
    /// The closed geometry of the piece, including its cross-section face.
    pub mesh: CutMesh,
    /// The center of mass of `mesh`, in the same local space as `mesh`.
    pub centroid: Point<Real>,
}

impl Fragment {
    /// Wraps a mesh, computing its centroid.
    pub fn new(mesh: CutMesh) -> Self {
        let centroid = mesh.center_of_mass();
        Self { mesh, centroid }
    }
}

/// The geometry-cutting primitive: splits a mesh into closed fragments.
///
/// The plane and the mesh are expressed in the same local space. Splitting
/// must be deterministic. An implementation signals that the plane missed the
/// geometry by returning fewer than two fragments.
pub trait GeometrySplitter {
    /// Splits `mesh` by the plane passing through `plane_point` with normal
    /// `plane_normal`.
    fn split(
        &self,
        plane_point: &Point<Real>,
        plane_normal: &UnitVector<Real>,
        mesh: &CutMesh,
    ) -> Vec<Fragment>;
}
