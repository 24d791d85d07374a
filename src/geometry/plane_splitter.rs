use crate::geometry::{CutMesh, Fragment, GeometrySplitter};
use crate::math::{Point, Real, UnitVector, Vector};
use crate::utils::{self, hashmap::HashMap, SortedPair};
use ordered_float::OrderedFloat;

const ON_PLANE: u8 = 0;
const NEGATIVE: u8 = 1;
const POSITIVE: u8 = 2;
const CROSSING_EDGE: u8 = NEGATIVE + POSITIVE;

/// Splits closed triangle meshes in two along a plane and closes each half
/// with a cross-section cap.
///
/// The cap is a triangle fan around the centroid of the cross-section, which
/// is exact for convex cross-sections (the stems, leaves and petals of a
/// plant). The negative half-space piece is returned first.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlaneSplitter {
    /// Vertices closer than this to the plane are considered on the plane.
    pub epsilon: Real,
}

impl Default for PlaneSplitter {
    fn default() -> Self {
        Self { epsilon: 1.0e-5 }
    }
}

impl PlaneSplitter {
    /// A splitter with the given on-plane tolerance.
    pub fn new(epsilon: Real) -> Self {
        Self { epsilon }
    }
}

impl GeometrySplitter for PlaneSplitter {
    fn split(
        &self,
        plane_point: &Point<Real>,
        plane_normal: &UnitVector<Real>,
        mesh: &CutMesh,
    ) -> Vec<Fragment> {
        let bias = plane_normal.dot(&plane_point.coords);
        let vertices = mesh.vertices();

        // 1. Partition the vertices.
        let mut colors = vec![ON_PLANE; vertices.len()];
        let mut found_negative = false;
        let mut found_positive = false;

        for (i, pt) in vertices.iter().enumerate() {
            let dist_to_plane = plane_normal.dot(&pt.coords) - bias;
            if dist_to_plane < -self.epsilon {
                found_negative = true;
                colors[i] = NEGATIVE;
            } else if dist_to_plane > self.epsilon {
                found_positive = true;
                colors[i] = POSITIVE;
            }
        }

        if !found_negative || !found_positive {
            log::debug!("Split plane does not cross the mesh.");
            return if mesh.is_empty() {
                vec![]
            } else {
                vec![Fragment::new(mesh.clone())]
            };
        }

        // 2. Split the triangles crossing the plane.
        let mut intersections_found: HashMap<SortedPair<u32>, u32> = HashMap::default();
        let mut new_indices = mesh.indices().to_vec();
        let mut new_vertices = vertices.to_vec();
        let mut k = 0;

        while k != new_indices.len() {
            let mut ic = 0;
            while ic < 3 {
                let idx = new_indices[k];
                let ia = (ic + 1) % 3;
                let ib = (ic + 2) % 3;
                let idx_a = idx[ia];
                let idx_b = idx[ib];
                let idx_c = idx[ic];

                if colors[idx_a as usize] + colors[idx_b as usize] == CROSSING_EDGE {
                    let intersection_idx = *intersections_found
                        .entry(SortedPair::new(idx_a, idx_b))
                        .or_insert_with(|| {
                            let a = new_vertices[idx_a as usize];
                            let b = new_vertices[idx_b as usize];
                            let da = plane_normal.dot(&a.coords) - bias;
                            let db = plane_normal.dot(&b.coords) - bias;
                            // `da` and `db` have opposite signs and are both
                            // farther than `epsilon` from zero.
                            let t = da / (da - db);
                            new_vertices.push(a + (b - a) * t);
                            colors.push(ON_PLANE);
                            (new_vertices.len() - 1) as u32
                        });

                    // The new triangles are arranged such that a second
                    // crossing of `new_indices[k]` can only involve `ic == 2`.
                    new_indices[k] = [idx_c, idx_a, intersection_idx];
                    new_indices.push([idx_b, idx_c, intersection_idx]);
                    ic = 2;
                    continue;
                }

                ic += 1;
            }

            k += 1;
        }

        // 3. Partition the new triangles into two meshes.
        let mut vertices_lhs = vec![];
        let mut vertices_rhs = vec![];
        let mut indices_lhs = vec![];
        let mut indices_rhs = vec![];
        let mut section_lhs = vec![];
        let mut section_rhs = vec![];
        let mut remap = Vec::with_capacity(new_vertices.len());

        for (i, pt) in new_vertices.iter().enumerate() {
            match colors[i] {
                ON_PLANE => {
                    section_lhs.push(vertices_lhs.len() as u32);
                    section_rhs.push(vertices_rhs.len() as u32);
                    remap.push((vertices_lhs.len() as u32, vertices_rhs.len() as u32));
                    vertices_lhs.push(*pt);
                    vertices_rhs.push(*pt);
                }
                NEGATIVE => {
                    remap.push((vertices_lhs.len() as u32, u32::MAX));
                    vertices_lhs.push(*pt);
                }
                _ => {
                    remap.push((u32::MAX, vertices_rhs.len() as u32));
                    vertices_rhs.push(*pt);
                }
            }
        }

        for idx in new_indices {
            let idx = [idx[0] as usize, idx[1] as usize, idx[2] as usize];
            let tri_colors = [colors[idx[0]], colors[idx[1]], colors[idx[2]]];
            let tri_remap = [remap[idx[0]], remap[idx[1]], remap[idx[2]]];

            if tri_colors.contains(&NEGATIVE) {
                indices_lhs.push([tri_remap[0].0, tri_remap[1].0, tri_remap[2].0]);
            } else if tri_colors.contains(&POSITIVE) {
                indices_rhs.push([tri_remap[0].1, tri_remap[1].1, tri_remap[2].1]);
            }
            // Triangles lying entirely on the plane are replaced by the caps.
        }

        // 4. Close both halves.
        let normal = plane_normal.into_inner();
        push_cap(&mut vertices_lhs, &mut indices_lhs, &section_lhs, &normal);
        push_cap(&mut vertices_rhs, &mut indices_rhs, &section_rhs, &-normal);

        vec![
            Fragment::new(CutMesh::new(vertices_lhs, indices_lhs)),
            Fragment::new(CutMesh::new(vertices_rhs, indices_rhs)),
        ]
    }
}

/// Closes a half-mesh with a fan over its cross-section, oriented along
/// `outward`.
fn push_cap(
    vertices: &mut Vec<Point<Real>>,
    indices: &mut Vec<[u32; 3]>,
    section: &[u32],
    outward: &Vector<Real>,
) {
    if section.len() < 3 {
        return;
    }

    let section_pts: Vec<_> = section.iter().map(|i| vertices[*i as usize]).collect();
    let Some(center) = utils::center(&section_pts) else {
        return;
    };
    let [u, v] = utils::orthonormal_basis(outward);

    let mut ring: Vec<_> = section.to_vec();
    ring.sort_by_key(|i| {
        let d = vertices[*i as usize] - center;
        OrderedFloat(d.dot(&v).atan2(d.dot(&u)))
    });

    let center_id = vertices.len() as u32;
    vertices.push(center);

    // Counter-clockwise around `outward` gives outward-facing triangles.
    for k in 0..ring.len() {
        let a = ring[k];
        let b = ring[(k + 1) % ring.len()];
        indices.push([center_id, a, b]);
    }
}

#[cfg(test)]
mod test {
    use super::PlaneSplitter;
    use crate::geometry::{CutMesh, GeometrySplitter};
    use crate::math::{Point, Vector};

    #[test]
    fn split_stem_in_two_closed_pieces() {
        let stem = CutMesh::stem(0.1, 2.0);
        let fragments =
            PlaneSplitter::default().split(&Point::new(0.0, 0.5, 0.0), &Vector::y_axis(), &stem);

        assert_eq!(fragments.len(), 2);
        let (lower, upper) = (&fragments[0], &fragments[1]);
        assert_relative_eq!(lower.mesh.volume(), 0.2 * 0.2 * 0.5, epsilon = 1.0e-4);
        assert_relative_eq!(upper.mesh.volume(), 0.2 * 0.2 * 1.5, epsilon = 1.0e-4);
        assert_relative_eq!(lower.centroid, Point::new(0.0, 0.25, 0.0), epsilon = 1.0e-4);
        assert_relative_eq!(upper.centroid, Point::new(0.0, 1.25, 0.0), epsilon = 1.0e-4);
    }

    #[test]
    fn caps_are_outward_facing() {
        let stem = CutMesh::stem(0.1, 1.0);
        let fragments =
            PlaneSplitter::default().split(&Point::new(0.0, 0.3, 0.0), &Vector::y_axis(), &stem);

        // A badly oriented cap would reduce, or flip the sign of, the volume.
        for fragment in &fragments {
            let (vol, _) = crate::geometry::signed_volume_and_center_of_mass(
                fragment.mesh.vertices(),
                fragment.mesh.indices(),
            );
            assert!(vol > 0.0);
        }
    }

    #[test]
    fn plane_missing_the_mesh_yields_one_fragment() {
        let stem = CutMesh::stem(0.1, 1.0);
        let fragments =
            PlaneSplitter::default().split(&Point::new(0.0, 3.0, 0.0), &Vector::y_axis(), &stem);
        assert_eq!(fragments.len(), 1);
        assert!(PlaneSplitter::default()
            .split(&Point::origin(), &Vector::y_axis(), &CutMesh::default())
            .is_empty());
    }

    #[test]
    fn oblique_split_preserves_volume() {
        let mesh = CutMesh::cuboid(&Vector::new(0.5, 0.5, 0.5));
        let normal = Vector::new(1.0, 1.0, 0.3).normalize();
        let fragments = PlaneSplitter::default().split(
            &Point::new(0.1, 0.0, 0.0),
            &na::Unit::new_unchecked(normal),
            &mesh,
        );
        assert_eq!(fragments.len(), 2);
        let total: f64 = fragments.iter().map(|f| f.mesh.volume() as f64).sum();
        assert_relative_eq!(total, 1.0, epsilon = 1.0e-3);
    }
}
