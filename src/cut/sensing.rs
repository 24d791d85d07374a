use crate::dynamics::PhysicsWorld;
use crate::math::{Point, Real, UnitVector};
use crate::structure::PartKind;

/// The dominant material touched by a cut, used only to pick feedback.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum TouchedMaterial {
    /// Nothing within reach.
    None,
    /// Something that is not part of a plant.
    Generic,
    /// A petal.
    Petal,
    /// A leaf.
    Leaf,
    /// A stem.
    Stem,
}

impl TouchedMaterial {
    fn of(kind: Option<PartKind>) -> Self {
        match kind {
            Some(PartKind::Stem) => TouchedMaterial::Stem,
            Some(PartKind::Leaf) => TouchedMaterial::Leaf,
            Some(PartKind::Petal) => TouchedMaterial::Petal,
            Some(PartKind::Crown) | None => TouchedMaterial::Generic,
        }
    }
}

/// Classifies the material touched by the cut plane through `point` with
/// normal `normal`.
///
/// The sensing volume is the slab of half-thickness `half_thickness` around
/// the plane, bounded to the ball of radius `radius` around `point`. Stem wins
/// over leaf, which wins over petal, which wins over anything else. Disabled
/// bodies and bodies without geometry are ignored.
pub fn sense_material(
    world: &PhysicsWorld,
    point: &Point<Real>,
    normal: &UnitVector<Real>,
    radius: Real,
    half_thickness: Real,
) -> TouchedMaterial {
    world
        .bodies
        .iter()
        .filter(|(_, body)| body.is_enabled() && !body.mesh().is_empty())
        .filter(|(handle, _)| {
            world
                .body_plane_span(*handle, point, normal)
                .is_some_and(|(lo, hi)| lo <= half_thickness && hi >= -half_thickness)
        })
        .filter(|(handle, _)| {
            world
                .distance_to_body(*handle, point)
                .is_some_and(|d| d <= radius)
        })
        .map(|(_, body)| TouchedMaterial::of(body.part().map(|p| p.kind)))
        .max()
        .unwrap_or(TouchedMaterial::None)
}
