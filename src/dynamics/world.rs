use crate::dynamics::{
    BodyHandle, BodySet, ConstraintHandle, ConstraintSet, Endpoint, PhysicalBody,
    PhysicalConstraint,
};
use crate::math::{Point, Real, UnitVector, Vector};

/// A registry lookup failed because the handle is stale.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum WorldError {
    /// The body was removed (or never existed).
    #[error("the body {0:?} does not exist.")]
    BodyNotFound(BodyHandle),
    /// The constraint was removed (or never existed).
    #[error("the constraint {0:?} does not exist.")]
    ConstraintNotFound(ConstraintHandle),
}

/// The load a constraint sustained during one solver step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ConstraintLoad {
    /// The loaded constraint.
    pub constraint: ConstraintHandle,
    /// The magnitude of the constraint force.
    pub force: Real,
    /// The magnitude of the constraint torque.
    pub torque: Real,
}

/// The bodies and constraints shared with the rigid-body solver.
#[derive(Clone, Debug)]
pub struct PhysicsWorld {
    /// All bodies.
    pub bodies: BodySet,
    /// All constraints.
    pub constraints: ConstraintSet,
    /// The gravity vector applied to gravity-enabled dynamic bodies.
    pub gravity: Vector<Real>,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    /// An empty world with a standard downward gravity.
    pub fn new() -> Self {
        Self {
            bodies: BodySet::new(),
            constraints: ConstraintSet::new(),
            gravity: Vector::new(0.0, -9.81, 0.0),
        }
    }

    /// Inserts a body.
    pub fn insert_body(&mut self, body: PhysicalBody) -> BodyHandle {
        self.bodies.insert(body)
    }

    /// Removes a body together with every constraint attached to it.
    pub fn remove_body(&mut self, handle: BodyHandle) -> Option<PhysicalBody> {
        let attached = self.constraints.attached_to(handle).to_vec();
        for constraint in attached {
            let _ = self.constraints.remove(constraint);
        }
        self.bodies.remove(handle)
    }

    /// Inserts a constraint after checking that its endpoints exist.
    pub fn insert_constraint(
        &mut self,
        constraint: PhysicalConstraint,
    ) -> Result<ConstraintHandle, WorldError> {
        let _ = self.body(constraint.body1())?;
        if let Some(body2) = constraint.body2() {
            let _ = self.body(body2)?;
        }
        Ok(self.constraints.insert(constraint))
    }

    /// Removes a constraint.
    pub fn remove_constraint(&mut self, handle: ConstraintHandle) -> Option<PhysicalConstraint> {
        self.constraints.remove(handle)
    }

    /// The body identified by `handle`.
    pub fn body(&self, handle: BodyHandle) -> Result<&PhysicalBody, WorldError> {
        self.bodies
            .get(handle)
            .ok_or(WorldError::BodyNotFound(handle))
    }

    /// Mutable access to the body identified by `handle`.
    pub fn body_mut(&mut self, handle: BodyHandle) -> Result<&mut PhysicalBody, WorldError> {
        self.bodies
            .get_mut(handle)
            .ok_or(WorldError::BodyNotFound(handle))
    }

    /// The constraint identified by `handle`.
    pub fn constraint(&self, handle: ConstraintHandle) -> Result<&PhysicalConstraint, WorldError> {
        self.constraints
            .get(handle)
            .ok_or(WorldError::ConstraintNotFound(handle))
    }

    /// The world-space position of one end of a constraint.
    pub fn world_anchor(
        &self,
        handle: ConstraintHandle,
        endpoint: Endpoint,
    ) -> Result<Point<Real>, WorldError> {
        let constraint = self.constraint(handle)?;
        let local = constraint.local_anchor(endpoint);
        match constraint.body(endpoint) {
            Some(body) => Ok(self.body(body)?.position() * local),
            None => Ok(local),
        }
    }

    /// The point of the collision surface of `body` closest to the world-space
    /// point `pt`, expressed in world space.
    pub fn project_point_on_body(
        &self,
        body: BodyHandle,
        pt: &Point<Real>,
    ) -> Result<Option<Point<Real>>, WorldError> {
        let body = self.body(body)?;
        Ok(body.mesh().project_point(body.position(), pt))
    }

    /// The distance between the world-space point `pt` and the solid `body`.
    ///
    /// Zero if `pt` is inside of `body`. `None` if `body` does not exist or
    /// has no geometry.
    pub fn distance_to_body(&self, body: BodyHandle, pt: &Point<Real>) -> Option<Real> {
        let body = self.bodies.get(body)?;
        let proj = body.mesh().project_point(body.position(), pt)?;
        if body.mesh().contains_point(body.position(), pt) {
            Some(0.0)
        } else {
            Some(na::distance(&proj, pt))
        }
    }

    /// The signed extremal distances of the vertices of `body` to the
    /// world-space plane, or `None` if `body` does not exist or has no
    /// geometry.
    pub fn body_plane_span(
        &self,
        body: BodyHandle,
        point: &Point<Real>,
        normal: &UnitVector<Real>,
    ) -> Option<(Real, Real)> {
        let body = self.bodies.get(body)?;
        let pos = body.position();
        let local_point = pos.inverse_transform_point(point);
        let local_normal = UnitVector::new_unchecked(pos.inverse_transform_vector(normal));
        body.mesh().local_plane_span(&local_point, &local_normal)
    }

    /// Does the world-space plane cross the geometry of `body`?
    pub fn body_straddles_plane(
        &self,
        body: BodyHandle,
        point: &Point<Real>,
        normal: &UnitVector<Real>,
        epsilon: Real,
    ) -> bool {
        let Ok(body) = self.body(body) else {
            return false;
        };
        let pos = body.position();
        let local_point = pos.inverse_transform_point(point);
        let local_normal = UnitVector::new_unchecked(pos.inverse_transform_vector(normal));
        body.mesh()
            .is_crossed_by_local_plane(&local_point, &local_normal, epsilon)
    }

    /// Applies the loads reported by the solver for one step, destroying every
    /// constraint whose break thresholds are exceeded.
    ///
    /// Returns the destroyed constraints.
    pub fn apply_constraint_loads(&mut self, loads: &[ConstraintLoad]) -> Vec<ConstraintHandle> {
        let mut broken = vec![];

        for load in loads {
            let Some(constraint) = self.constraints.get(load.constraint) else {
                continue;
            };

            if constraint
                .thresholds
                .is_exceeded_by(load.force, load.torque)
            {
                log::debug!(
                    "Constraint {:?} broke under force {} and torque {}.",
                    load.constraint,
                    load.force,
                    load.torque
                );
                let _ = self.constraints.remove(load.constraint);
                broken.push(load.constraint);
            }
        }

        broken
    }
}
