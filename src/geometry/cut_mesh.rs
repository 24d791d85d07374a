use crate::geometry::{project_point_on_triangle, volume_and_center_of_mass};
use crate::math::{Isometry, Point, Real, UnitVector, Vector};
use ordered_float::OrderedFloat;

/// A closed triangle mesh used both as the visual and the collision geometry
/// of a plant part.
///
/// Triangles are expected to be oriented with outward normals.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct CutMesh {
    vertices: Vec<Point<Real>>,
    indices: Vec<[u32; 3]>,
}

impl CutMesh {
    /// Creates a mesh from its vertex and index buffers.
    pub fn new(vertices: Vec<Point<Real>>, indices: Vec<[u32; 3]>) -> Self {
        Self { vertices, indices }
    }

    /// A box centered at the origin.
    pub fn cuboid(half_extents: &Vector<Real>) -> Self {
        let (hx, hy, hz) = (half_extents.x, half_extents.y, half_extents.z);
        let vertices = vec![
            Point::new(-hx, -hy, hz),
            Point::new(-hx, -hy, -hz),
            Point::new(hx, -hy, -hz),
            Point::new(hx, -hy, hz),
            Point::new(-hx, hy, hz),
            Point::new(-hx, hy, -hz),
            Point::new(hx, hy, -hz),
            Point::new(hx, hy, hz),
        ];
        let indices = vec![
            [4, 5, 0],
            [5, 1, 0],
            [5, 6, 1],
            [6, 2, 1],
            [6, 7, 3],
            [2, 6, 3],
            [7, 4, 0],
            [3, 7, 0],
            [0, 1, 2],
            [3, 0, 2],
            [7, 6, 5],
            [4, 7, 5],
        ];

        Self { vertices, indices }
    }

    /// A box spanning `[0, length]` along the local `y` axis, with a square
    /// cross-section of half-width `radius`.
    pub fn stem(radius: Real, length: Real) -> Self {
        Self::cuboid(&Vector::new(radius, length / 2.0, radius))
            .translated(&Vector::new(0.0, length / 2.0, 0.0))
    }

    /// The vertex buffer.
    pub fn vertices(&self) -> &[Point<Real>] {
        &self.vertices
    }

    /// The index buffer.
    pub fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }

    /// Does this mesh have no triangle?
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Returns a copy of this mesh with all vertices moved by `shift`.
    pub fn translated(mut self, shift: &Vector<Real>) -> Self {
        self.vertices.iter_mut().for_each(|p| *p += *shift);
        self
    }

    /// The enclosed volume.
    pub fn volume(&self) -> Real {
        volume_and_center_of_mass(&self.vertices, &self.indices).0
    }

    /// The center of mass, assuming a uniform density.
    pub fn center_of_mass(&self) -> Point<Real> {
        volume_and_center_of_mass(&self.vertices, &self.indices).1
    }

    /// The closest point of the mesh surface to `pt`, in the mesh local space.
    ///
    /// Returns `None` for an empty mesh.
    pub fn project_local_point(&self, pt: &Point<Real>) -> Option<Point<Real>> {
        self.indices
            .iter()
            .map(|idx| {
                project_point_on_triangle(
                    pt,
                    &self.vertices[idx[0] as usize],
                    &self.vertices[idx[1] as usize],
                    &self.vertices[idx[2] as usize],
                )
            })
            .min_by_key(|proj| OrderedFloat(na::distance_squared(proj, pt)))
    }

    /// The closest point of the mesh surface, placed at `pos`, to the
    /// world-space point `pt`. The result is expressed in world space.
    pub fn project_point(&self, pos: &Isometry<Real>, pt: &Point<Real>) -> Option<Point<Real>> {
        let local_pt = pos.inverse_transform_point(pt);
        self.project_local_point(&local_pt).map(|p| pos * p)
    }

    /// Tests if `pt`, in the mesh local space, is inside of this mesh,
    /// assuming this mesh is convex.
    ///
    /// Points on the boundary are inside. An empty mesh contains nothing.
    pub fn contains_local_point(&self, pt: &Point<Real>) -> bool {
        if self.indices.is_empty() {
            return false;
        }

        self.indices.iter().all(|idx| {
            let a = self.vertices[idx[0] as usize];
            let b = self.vertices[idx[1] as usize];
            let c = self.vertices[idx[2] as usize];
            // Outward normal, zero for degenerate triangles.
            let n = (b - a).cross(&(c - a));
            n.dot(&(pt - a)) <= 0.0
        })
    }

    /// Tests if the world-space point `pt` is inside of this mesh placed at
    /// `pos`, assuming this mesh is convex.
    pub fn contains_point(&self, pos: &Isometry<Real>, pt: &Point<Real>) -> bool {
        self.contains_local_point(&pos.inverse_transform_point(pt))
    }

    /// The signed extremal distances of the vertices to the plane with
    /// normal `normal` passing through `point`, both in local space.
    ///
    /// Returns `None` for a mesh without vertices.
    pub fn local_plane_span(
        &self,
        point: &Point<Real>,
        normal: &UnitVector<Real>,
    ) -> Option<(Real, Real)> {
        let mut dists = self.vertices.iter().map(|v| normal.dot(&(v - point)));
        let first = dists.next()?;
        Some(dists.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }

    /// Does the plane cross this mesh, with at least `epsilon` of material on
    /// each side?
    pub fn is_crossed_by_local_plane(
        &self,
        point: &Point<Real>,
        normal: &UnitVector<Real>,
        epsilon: Real,
    ) -> bool {
        self.local_plane_span(point, normal)
            .map(|(lo, hi)| lo < -epsilon && hi > epsilon)
            .unwrap_or(false)
    }
}
