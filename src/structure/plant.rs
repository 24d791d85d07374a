use crate::dynamics::{
    BodyHandle, BodyMode, BreakThresholds, ConstraintKind, ConstraintRole, JointAxes,
    PhysicalBody, PhysicalConstraint, PhysicsWorld, SixDofParams, SpringDrive, WorldError,
};
use crate::geometry::CutMesh;
use crate::math::{Isometry, Point, Real, UnitVector, Vector};
use crate::structure::{AttachmentState, PartClassification, PartCondition, PartKind};

/// One plant instance living in a [`PhysicsWorld`].
///
/// Only the crown handle is authoritative. The stem, leaf and petal handles
/// are the ones created at authoring time and become stale as soon as a
/// destructive cut replaces the bodies they refer to.
#[derive(Clone, Debug)]
pub struct Plant {
    crown: BodyHandle,
    up: UnitVector<Real>,
    stem_segments: Vec<BodyHandle>,
    leaves: Vec<BodyHandle>,
    petals: Vec<BodyHandle>,
}

impl Plant {
    /// A plant rooted at `crown`, whose structural "up" direction is `up`.
    pub fn new(crown: BodyHandle, up: UnitVector<Real>) -> Self {
        Self {
            crown,
            up,
            stem_segments: vec![],
            leaves: vec![],
            petals: vec![],
        }
    }

    /// The root of the structure.
    pub fn crown(&self) -> BodyHandle {
        self.crown
    }

    /// The structural "up" direction, from the stem tip toward the crown.
    pub fn up(&self) -> &UnitVector<Real> {
        &self.up
    }

    /// The stem segments created at authoring time, crown side first.
    pub fn stem_segments(&self) -> &[BodyHandle] {
        &self.stem_segments
    }

    /// The leaves created at authoring time.
    pub fn leaves(&self) -> &[BodyHandle] {
        &self.leaves
    }

    /// The petals created at authoring time.
    pub fn petals(&self) -> &[BodyHandle] {
        &self.petals
    }

    /// The world-space reference point of the crown (its center of mass).
    pub fn crown_position(&self, world: &PhysicsWorld) -> Option<Point<Real>> {
        world
            .bodies
            .get(self.crown)
            .map(|crown| crown.world_center_of_mass())
    }

    /// Marks a leaf or petal as withered and scales the break thresholds of
    /// its attachment constraints by `factor`.
    pub fn wither(
        &self,
        world: &mut PhysicsWorld,
        part: BodyHandle,
        factor: Real,
    ) -> Result<(), WorldError> {
        if let Some(class) = world.body_mut(part)?.part_mut() {
            class.condition = PartCondition::Withered;
        }

        for handle in world.constraints.attached_to(part).to_vec() {
            if let Some(constraint) = world.constraints.get_mut(handle) {
                if constraint.role == ConstraintRole::Attachment && constraint.body1() == part {
                    constraint.thresholds.force *= factor;
                    constraint.thresholds.torque *= factor;
                }
            }
        }

        Ok(())
    }

    /// Tears a part off for good: its attachment constraints are removed, it
    /// falls freely, and no automatic rebinding will ever consider it again.
    pub fn detach_permanently(
        &self,
        world: &mut PhysicsWorld,
        part: BodyHandle,
    ) -> Result<(), WorldError> {
        let body = world.body_mut(part)?;
        if let Some(class) = body.part_mut() {
            class.attachment = AttachmentState::PermanentlyDetached;
        }
        let _ = body.set_mode(BodyMode::Dynamic);
        let _ = body.set_gravity_enabled(true);
        let _ = body.wake_up();

        for handle in world.constraints.attached_to(part).to_vec() {
            let owned_attachment = world
                .constraints
                .get(handle)
                .map(|c| c.role == ConstraintRole::Attachment && c.body1() == part)
                .unwrap_or(false);
            if owned_attachment {
                let _ = world.remove_constraint(handle);
            }
        }

        log::debug!("Part {part:?} permanently detached.");
        Ok(())
    }
}

/// Authors a plant: a crown with a straight stem hanging below it, and
/// leaves or petals attached along the stem.
///
/// The stem grows along `-y` from the bottom of the crown.
#[derive(Clone, Debug)]
pub struct PlantBuilder {
    crown_position: Point<Real>,
    crown_half_extents: Vector<Real>,
    crown_mode: BodyMode,
    stem_radius: Real,
    stem_length: Real,
    stem_segments: usize,
    foliage: Vec<(PartKind, Real)>,
    foliage_half_extents: Vector<Real>,
    density: Real,
    crown_thresholds: BreakThresholds,
    stem_thresholds: BreakThresholds,
    attachment_thresholds: BreakThresholds,
}

impl PlantBuilder {
    /// A plant with its crown centered at `crown_position`.
    pub fn new(crown_position: Point<Real>) -> Self {
        Self {
            crown_position,
            crown_half_extents: Vector::new(0.15, 0.1, 0.15),
            crown_mode: BodyMode::Kinematic,
            stem_radius: 0.05,
            stem_length: 1.0,
            stem_segments: 1,
            foliage: vec![],
            foliage_half_extents: Vector::new(0.1, 0.01, 0.05),
            density: 500.0,
            crown_thresholds: BreakThresholds::new(500.0, 250.0),
            stem_thresholds: BreakThresholds::new(200.0, 100.0),
            attachment_thresholds: BreakThresholds::new(40.0, 20.0),
        }
    }

    /// Sets the crown half extents.
    pub fn crown_size(mut self, half_extents: Vector<Real>) -> Self {
        self.crown_half_extents = half_extents;
        self
    }

    /// Sets whether the crown is kinematic (held) or dynamic.
    pub fn crown_mode(mut self, mode: BodyMode) -> Self {
        self.crown_mode = mode;
        self
    }

    /// Sets the stem half-width and total length.
    pub fn stem(mut self, radius: Real, length: Real) -> Self {
        self.stem_radius = radius;
        self.stem_length = length;
        self
    }

    /// Splits the stem into `n` welded segments of equal length.
    pub fn stem_segments(mut self, n: usize) -> Self {
        self.stem_segments = n.max(1);
        self
    }

    /// Attaches a leaf at `depth` below the bottom of the crown.
    pub fn leaf(mut self, depth: Real) -> Self {
        self.foliage.push((PartKind::Leaf, depth));
        self
    }

    /// Attaches a petal at `depth` below the bottom of the crown.
    pub fn petal(mut self, depth: Real) -> Self {
        self.foliage.push((PartKind::Petal, depth));
        self
    }

    /// Sets the break thresholds of the leaf and petal attachments.
    pub fn attachment_thresholds(mut self, thresholds: BreakThresholds) -> Self {
        self.attachment_thresholds = thresholds;
        self
    }

    /// Sets the break thresholds of the joints between stem segments.
    pub fn stem_thresholds(mut self, thresholds: BreakThresholds) -> Self {
        self.stem_thresholds = thresholds;
        self
    }

    /// Creates the bodies and constraints of the plant.
    pub fn build(self, world: &mut PhysicsWorld) -> Plant {
        let crown_mesh = CutMesh::cuboid(&self.crown_half_extents);
        let crown_mass = crown_mesh.volume() * self.density;
        let crown = world.insert_body(
            PhysicalBody::new(
                Isometry::translation(
                    self.crown_position.x,
                    self.crown_position.y,
                    self.crown_position.z,
                ),
                crown_mesh,
                crown_mass,
            )
            .with_mode(self.crown_mode)
            .with_gravity(self.crown_mode == BodyMode::Dynamic)
            .with_part(PartClassification::new(PartKind::Crown)),
        );

        let mut plant = Plant::new(crown, Vector::y_axis());
        let stem_top = self.crown_position.y - self.crown_half_extents.y;
        let segment_length = self.stem_length / self.stem_segments as Real;

        // Stem segments, from the crown downward. Each one spans
        // `[0, segment_length]` along its local `y` axis.
        let mut parent = crown;
        for i in 0..self.stem_segments {
            let bottom = stem_top - (i + 1) as Real * segment_length;
            let mesh = CutMesh::stem(self.stem_radius, segment_length);
            let mass = mesh.volume() * self.density;
            let segment = world.insert_body(
                PhysicalBody::new(
                    Isometry::translation(self.crown_position.x, bottom, self.crown_position.z),
                    mesh,
                    mass,
                )
                .with_part(PartClassification::new(PartKind::Stem)),
            );

            let (role, thresholds, parent_anchor) = if parent == crown {
                (
                    ConstraintRole::CrownRegion,
                    self.crown_thresholds,
                    Point::new(0.0, -self.crown_half_extents.y, 0.0),
                )
            } else {
                (ConstraintRole::StemInternal, self.stem_thresholds, Point::origin())
            };

            let joint = PhysicalConstraint::new(
                segment,
                Some(parent),
                ConstraintKind::FixedWeld,
                role,
            )
            .with_anchors(Point::new(0.0, segment_length, 0.0), parent_anchor)
            .with_thresholds(thresholds);
            if let Err(err) = world.insert_constraint(joint) {
                log::error!("Failed to weld stem segment {i}: {err}");
            }

            plant.stem_segments.push(segment);
            parent = segment;
        }

        // Leaves and petals, alternating sides.
        for (k, (kind, depth)) in self.foliage.iter().enumerate() {
            let depth = depth.clamp(0.0, self.stem_length);
            let segment_id = ((depth / segment_length) as usize).min(self.stem_segments - 1);
            let segment = plant.stem_segments[segment_id];
            let side: Real = if k % 2 == 0 { 1.0 } else { -1.0 };
            let y = stem_top - depth;
            let hx = self.foliage_half_extents.x;

            let mesh = CutMesh::cuboid(&self.foliage_half_extents);
            let mass = mesh.volume() * self.density;
            let part = world.insert_body(
                PhysicalBody::new(
                    Isometry::translation(
                        self.crown_position.x + side * (self.stem_radius + hx),
                        y,
                        self.crown_position.z,
                    ),
                    mesh,
                    mass,
                )
                .with_part(PartClassification::new(*kind)),
            );

            let segment_bottom = stem_top - (segment_id + 1) as Real * segment_length;
            let drive = SixDofParams {
                locked_axes: JointAxes::LIN_AXES,
                angular_drive: SpringDrive::new(5.0, 0.5),
                ..SixDofParams::default()
            };
            let attachment = PhysicalConstraint::new(
                part,
                Some(segment),
                ConstraintKind::SixDof(drive),
                ConstraintRole::Attachment,
            )
            .with_anchors(
                Point::new(-side * hx, 0.0, 0.0),
                Point::new(side * self.stem_radius, y - segment_bottom, 0.0),
            )
            .with_thresholds(self.attachment_thresholds);
            if let Err(err) = world.insert_constraint(attachment) {
                log::error!("Failed to attach {kind:?} {k}: {err}");
            }

            match kind {
                PartKind::Petal => plant.petals.push(part),
                _ => plant.leaves.push(part),
            }
        }

        plant
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn stem_hangs_below_the_crown() {
        let mut world = PhysicsWorld::new();
        let plant = PlantBuilder::new(Point::new(0.0, 2.0, 0.0))
            .stem(0.05, 1.0)
            .stem_segments(2)
            .leaf(0.75)
            .build(&mut world);

        let top = world.body(plant.stem_segments()[0]).unwrap();
        let bottom = world.body(plant.stem_segments()[1]).unwrap();
        assert_relative_eq!(top.position().translation.vector.y, 1.4, epsilon = 1.0e-5);
        assert_relative_eq!(bottom.position().translation.vector.y, 0.9, epsilon = 1.0e-5);

        // The leaf at depth 0.75 hangs from the second segment.
        let leaf = plant.leaves()[0];
        let attachment = world.constraints.attached_to(leaf)[0];
        assert_eq!(
            world.constraint(attachment).unwrap().body2(),
            Some(plant.stem_segments()[1])
        );
        let anchor = world
            .world_anchor(attachment, crate::dynamics::Endpoint::Second)
            .unwrap();
        assert_relative_eq!(anchor.y, 1.9 - 0.75, epsilon = 1.0e-5);
    }

    #[test]
    fn withering_weakens_the_attachment() {
        let mut world = PhysicsWorld::new();
        let plant = PlantBuilder::new(Point::new(0.0, 2.0, 0.0))
            .leaf(0.5)
            .build(&mut world);
        let leaf = plant.leaves()[0];
        plant.wither(&mut world, leaf, 0.25).unwrap();

        let attachment = world.constraints.attached_to(leaf)[0];
        assert_relative_eq!(world.constraint(attachment).unwrap().thresholds.force, 10.0);
        assert_eq!(
            world.body(leaf).unwrap().part().unwrap().condition,
            PartCondition::Withered
        );
    }

    #[test]
    fn permanent_detachment_drops_the_leaf() {
        let mut world = PhysicsWorld::new();
        let plant = PlantBuilder::new(Point::new(0.0, 2.0, 0.0))
            .leaf(0.5)
            .build(&mut world);
        let leaf = plant.leaves()[0];
        plant.detach_permanently(&mut world, leaf).unwrap();

        assert!(world.constraints.attached_to(leaf).is_empty());
        let body = world.body(leaf).unwrap();
        assert!(body.part().unwrap().is_permanently_detached());
        assert!(body.is_gravity_enabled());
    }
}
