use crate::math::{Isometry, Point, Real, UnitVector};

/// A cut plane, expressed both in the local space of the body being cut and
/// in world space.
///
/// The mesh is split in local space while the held-piece classification and
/// the anchoring work in world space.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct CutPlane {
    /// A point of the plane, in the body's local space.
    pub local_point: Point<Real>,
    /// The plane normal, in the body's local space.
    pub local_normal: UnitVector<Real>,
    /// A point of the plane, in world space.
    pub world_point: Point<Real>,
    /// The plane normal, in world space.
    pub world_normal: UnitVector<Real>,
}

impl CutPlane {
    /// The plane passing through the world-space `point` with normal `normal`,
    /// relative to a body placed at `body_pos`.
    pub fn from_world(
        body_pos: &Isometry<Real>,
        point: &Point<Real>,
        normal: &UnitVector<Real>,
    ) -> Self {
        Self {
            local_point: body_pos.inverse_transform_point(point),
            local_normal: UnitVector::new_unchecked(body_pos.inverse_transform_vector(normal)),
            world_point: *point,
            world_normal: *normal,
        }
    }

    /// The signed distance from the world-space point `pt` to this plane.
    pub fn signed_distance(&self, pt: &Point<Real>) -> Real {
        self.world_normal.dot(&(pt - self.world_point))
    }
}

#[cfg(test)]
mod test {
    use super::CutPlane;
    use crate::math::{Isometry, Point, Real, Vector};

    #[test]
    fn local_plane_follows_the_body_pose() {
        let pos = Isometry::new(
            Vector::new(0.0, 1.0, 0.0),
            Vector::z() * (core::f64::consts::FRAC_PI_2 as Real),
        );
        let plane = CutPlane::from_world(&pos, &Point::new(0.0, 1.5, 0.0), &Vector::y_axis());

        // The body is rotated by 90 degrees around `z`: local `x` is world `y`.
        assert_relative_eq!(plane.local_point, Point::new(0.5, 0.0, 0.0), epsilon = 1.0e-5);
        assert_relative_eq!(
            plane.local_normal.into_inner(),
            Vector::new(1.0, 0.0, 0.0),
            epsilon = 1.0e-5
        );
        assert_relative_eq!(plane.signed_distance(&Point::new(3.0, 2.0, 0.0)), 0.5);
    }
}
