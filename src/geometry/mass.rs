use crate::math::{Point, Real};
use crate::utils;
use num::Zero;

/// Computes the signed volume and the center of mass of a closed triangle mesh.
///
/// The volume is positive when the triangles are oriented with outward normals.
/// If the mesh encloses no volume, the returned center is the average of the
/// vertices (or the origin for an empty mesh).
pub fn signed_volume_and_center_of_mass(
    vertices: &[Point<Real>],
    indices: &[[u32; 3]],
) -> (Real, Point<Real>) {
    let geometric_center = utils::center(vertices).unwrap_or_else(Point::origin);

    let mut res = Point::origin();
    let mut vol = 0.0;

    for t in indices {
        let p2 = vertices[t[0] as usize] - geometric_center;
        let p3 = vertices[t[1] as usize] - geometric_center;
        let p4 = vertices[t[2] as usize] - geometric_center;

        // Tetrahedron formed by the geometric center and the triangle.
        let volume = p2.dot(&p3.cross(&p4)) / 6.0;
        let center = (p2 + p3 + p4) / 4.0;

        res += center * volume;
        vol += volume;
    }

    if vol.is_zero() {
        (vol, geometric_center)
    } else {
        (vol, geometric_center + res.coords / vol)
    }
}

/// Same as [`signed_volume_and_center_of_mass`] but returns an unsigned volume.
pub fn volume_and_center_of_mass(
    vertices: &[Point<Real>],
    indices: &[[u32; 3]],
) -> (Real, Point<Real>) {
    let (vol, com) = signed_volume_and_center_of_mass(vertices, indices);
    (vol.abs(), com)
}
