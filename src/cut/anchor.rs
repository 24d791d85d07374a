use crate::cut::AnchorParams;
use crate::dynamics::{
    BodyHandle, BodyMode, ConstraintHandle, ConstraintKind, ConstraintRole, JointAxes,
    PhysicalBody, PhysicalConstraint, PhysicsWorld, SixDofParams, SpringDrive, WorldError,
};
use crate::math::{Isometry, Point, Real, Translation};
use indexmap::IndexMap;

/// Where an anchor pulls its held body, possibly relative to a moving body.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct AnchorTarget {
    /// The body the target moves with, or `None` for a world-fixed target.
    pub reference: Option<BodyHandle>,
    /// The target, in the local space of `reference` (or in world space).
    pub local_point: Point<Real>,
}

impl AnchorTarget {
    /// The target expressed relative to `reference`, placed at `world_point`.
    pub fn new(world: &PhysicsWorld, reference: Option<BodyHandle>, world_point: &Point<Real>) -> Self {
        match reference.and_then(|r| world.bodies.get(r).map(|b| (r, b))) {
            Some((reference, body)) => Self {
                reference: Some(reference),
                local_point: body.position().inverse_transform_point(world_point),
            },
            None => Self {
                reference: None,
                local_point: *world_point,
            },
        }
    }

    /// The current world-space target.
    ///
    /// Falls back to the stored point if the reference body is gone.
    pub fn world_point(&self, world: &PhysicsWorld) -> Point<Real> {
        self.reference
            .and_then(|r| world.bodies.get(r))
            .map(|body| body.position() * self.local_point)
            .unwrap_or(self.local_point)
    }
}

/// The anchor owned for one held body.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AnchorState {
    /// The kinematic body the spring pulls toward.
    pub anchor_body: BodyHandle,
    /// The spring constraint. Its first body is the held body.
    pub constraint: ConstraintHandle,
    /// The target the anchor body is snapped to every step.
    pub target: AnchorTarget,
    /// Incremented every time an anchor is (re)created.
    pub version: u32,
}

/// Holds cut pieces near a target with a spring/damper instead of freezing
/// them.
///
/// At most one anchor exists per held body. The anchor body and constraint
/// are tracked here, so re-anchoring never has to scan the constraints of the
/// held body, which other systems may share.
#[derive(Clone, Debug, Default)]
pub struct AnchorSystem {
    params: AnchorParams,
    anchors: IndexMap<BodyHandle, AnchorState>,
    next_version: u32,
}

impl AnchorSystem {
    /// An anchor system creating springs configured by `params`.
    pub fn new(params: AnchorParams) -> Self {
        Self {
            params,
            anchors: IndexMap::new(),
            next_version: 0,
        }
    }

    /// The spring configuration.
    pub fn params(&self) -> &AnchorParams {
        &self.params
    }

    /// The number of anchored bodies.
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// Is no body anchored?
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Is `body` anchored?
    pub fn is_anchored(&self, body: BodyHandle) -> bool {
        self.anchors.contains_key(&body)
    }

    /// The anchor of `body`.
    pub fn anchor_of(&self, body: BodyHandle) -> Option<&AnchorState> {
        self.anchors.get(&body)
    }

    /// Iterates through the anchored bodies and their anchors.
    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &AnchorState)> {
        self.anchors.iter().map(|(b, s)| (*b, s))
    }

    /// The current world-space target of the anchor of `body`.
    pub fn target_point(&self, world: &PhysicsWorld, body: BodyHandle) -> Option<Point<Real>> {
        self.anchors.get(&body).map(|s| s.target.world_point(world))
    }

    /// Anchors `body` toward `world_point`, which then moves with `reference`.
    ///
    /// Any anchor previously owned for `body` is destroyed first, unless it
    /// already targets the same point, in which case nothing changes. The
    /// spring attaches at the point of the body surface closest to the
    /// target.
    pub fn anchor(
        &mut self,
        world: &mut PhysicsWorld,
        body: BodyHandle,
        world_point: &Point<Real>,
        reference: Option<BodyHandle>,
    ) -> Result<ConstraintHandle, WorldError> {
        let _ = world.body(body)?;

        if let Some(state) = self.anchors.get(&body) {
            let alive = world.constraints.contains(state.constraint)
                && world.bodies.contains(state.anchor_body);
            let current = state.target.world_point(world);
            if alive
                && state.target.reference == reference
                && relative_eq!(current, *world_point, epsilon = 1.0e-5)
            {
                return Ok(state.constraint);
            }
        }

        let _ = self.release_owned(world, body);

        let held = world.body(body)?;
        let surface_point = world
            .project_point_on_body(body, world_point)?
            .unwrap_or_else(|| held.world_center_of_mass());
        let local_anchor1 = held.position().inverse_transform_point(&surface_point);

        let anchor_body = world.insert_body(PhysicalBody::kinematic_marker(Isometry::translation(
            world_point.x,
            world_point.y,
            world_point.z,
        )));

        let mut limited_axes = JointAxes::empty();
        if self.params.linear_limit.is_finite() {
            limited_axes |= JointAxes::LIN_AXES;
        }
        let params = SixDofParams {
            locked_axes: JointAxes::ANG_AXES - self.params.free_angular_axes,
            limited_axes,
            linear_limit: self.params.linear_limit,
            linear_drive: SpringDrive::new(self.params.linear_stiffness, self.params.linear_damping),
            angular_drive: SpringDrive::new(0.0, self.params.angular_damping),
        };
        let constraint = match world.insert_constraint(
            PhysicalConstraint::new(
                body,
                Some(anchor_body),
                ConstraintKind::SixDof(params),
                ConstraintRole::Anchor,
            )
            .with_anchors(local_anchor1, Point::origin()),
        ) {
            Ok(constraint) => constraint,
            Err(err) => {
                let _ = world.remove_body(anchor_body);
                return Err(err);
            }
        };

        let held = world.body_mut(body)?;
        let _ = held.set_mode(BodyMode::Dynamic);
        let _ = held.set_gravity_enabled(false);
        let _ = held.set_locked_axes(JointAxes::empty());
        let _ = held.wake_up();

        self.next_version = self.next_version.wrapping_add(1);
        let state = AnchorState {
            anchor_body,
            constraint,
            target: AnchorTarget::new(world, reference, world_point),
            version: self.next_version,
        };
        let _ = self.anchors.insert(body, state);
        log::debug!("Anchored {body:?} at {world_point:?} (version {}).", state.version);

        Ok(constraint)
    }

    /// Destroys the anchor of `body` and lets it fall again.
    ///
    /// Returns `false` if `body` was not anchored.
    pub fn release(&mut self, world: &mut PhysicsWorld, body: BodyHandle) -> bool {
        if !self.release_owned(world, body) {
            return false;
        }

        if let Some(held) = world.bodies.get_mut(body) {
            if !held.is_kinematic() {
                let _ = held.set_gravity_enabled(true);
                let _ = held.wake_up();
            }
        }

        log::debug!("Released the anchor of {body:?}.");
        true
    }

    /// Snaps every anchor body to the current position of its target.
    ///
    /// Must run once per fixed physics step, before the solver. Anchors
    /// whose held body or constraint disappeared are discarded.
    pub fn fixed_step(&mut self, world: &mut PhysicsWorld) {
        let mut stale = vec![];

        for (body, state) in &self.anchors {
            if !world.bodies.contains(*body) || !world.constraints.contains(state.constraint) {
                stale.push(*body);
                continue;
            }

            let target = state.target.world_point(world);
            if let Some(anchor_body) = world.bodies.get_mut(state.anchor_body) {
                let mut pos = *anchor_body.position();
                pos.translation = Translation::from(target.coords);
                anchor_body.set_position(pos);
            }
        }

        for body in stale {
            log::warn!("Discarding the stale anchor of {body:?}.");
            let _ = self.release_owned(world, body);
        }
    }

    fn release_owned(&mut self, world: &mut PhysicsWorld, body: BodyHandle) -> bool {
        let Some(state) = self.anchors.shift_remove(&body) else {
            return false;
        };
        let _ = world.remove_constraint(state.constraint);
        let _ = world.remove_body(state.anchor_body);
        true
    }
}
