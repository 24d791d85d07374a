use crate::dynamics::{BodyHandle, JointAxes};
use crate::math::{Point, Real, UnitVector};
use crate::utils::hashmap::HashMap;
use crate::utils::{Arena, Index};
use smallvec::SmallVec;

/// The stable handle of a [`PhysicalConstraint`] inside a [`ConstraintSet`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ConstraintHandle(pub(crate) Index);

/// A linear spring/damper drive.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SpringDrive {
    /// The spring stiffness.
    pub stiffness: Real,
    /// The damping coefficient.
    pub damping: Real,
}

impl SpringDrive {
    /// A drive with the given stiffness and damping.
    pub fn new(stiffness: Real, damping: Real) -> Self {
        Self { stiffness, damping }
    }

    /// A drive applying no force.
    pub fn free() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Parameters of a 6-DOF constraint.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SixDofParams {
    /// Axes with no relative motion allowed.
    pub locked_axes: JointAxes,
    /// Axes with a bounded relative motion (see `linear_limit`).
    pub limited_axes: JointAxes,
    /// The maximum travel along the limited linear axes.
    pub linear_limit: Real,
    /// The drive pulling the linear axes back to their rest position.
    pub linear_drive: SpringDrive,
    /// The drive pulling the angular axes back to their rest orientation.
    pub angular_drive: SpringDrive,
}

impl Default for SixDofParams {
    fn default() -> Self {
        Self {
            locked_axes: JointAxes::empty(),
            limited_axes: JointAxes::empty(),
            linear_limit: Real::INFINITY,
            linear_drive: SpringDrive::free(),
            angular_drive: SpringDrive::free(),
        }
    }
}

/// The type of a constraint.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum ConstraintKind {
    /// A rigid weld removing all relative motion.
    FixedWeld,
    /// A revolute joint around `axis`, expressed in the first body's local space.
    Hinge {
        /// The rotation axis.
        axis: UnitVector<Real>,
    },
    /// A configurable joint with per-axis freedom, limits and drives.
    SixDof(SixDofParams),
    /// A rope-like constraint keeping the anchors within `max_distance`.
    CustomTether {
        /// The maximum distance between both anchors.
        max_distance: Real,
    },
}

/// What a constraint means for the plant structure.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum ConstraintRole {
    /// Joint between two pieces of stem.
    StemInternal,
    /// Attaches a leaf or a petal (the first body) to the structure.
    Attachment,
    /// Joint inside the crown region.
    CrownRegion,
    /// A compliant anchor owned by the anchor subsystem.
    Anchor,
    /// Anything else.
    Other,
}

impl ConstraintRole {
    /// Protected constraints may be redirected but never destroyed by the
    /// severing pass.
    pub fn is_protected(self) -> bool {
        matches!(self, ConstraintRole::Attachment | ConstraintRole::CrownRegion)
    }

    /// Does this constraint belong to the plant structure graph?
    pub fn is_structural(self) -> bool {
        !matches!(self, ConstraintRole::Anchor)
    }
}

/// Force and torque magnitudes above which the solver destroys a constraint.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct BreakThresholds {
    /// The break force.
    pub force: Real,
    /// The break torque.
    pub torque: Real,
}

impl BreakThresholds {
    /// Thresholds that are never exceeded.
    pub const UNBREAKABLE: Self = Self {
        force: Real::INFINITY,
        torque: Real::INFINITY,
    };

    /// Thresholds with the given force and torque.
    pub fn new(force: Real, torque: Real) -> Self {
        Self { force, torque }
    }

    /// Can this constraint never break?
    pub fn is_unbreakable(&self) -> bool {
        self.force == Real::INFINITY && self.torque == Real::INFINITY
    }

    /// Does the given load break a constraint with these thresholds?
    pub fn is_exceeded_by(&self, force: Real, torque: Real) -> bool {
        force > self.force || torque > self.torque
    }
}

impl Default for BreakThresholds {
    fn default() -> Self {
        Self::UNBREAKABLE
    }
}

/// Identifies one end of a constraint.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// The first body: the owner of the constraint.
    First,
    /// The second body: the connected body.
    Second,
}

/// A typed edge between two bodies, or between a body and the fixed world.
///
/// The first body owns the constraint (a leaf for a leaf attachment). The
/// second body is the connected body, or `None` for the fixed world frame.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct PhysicalConstraint {
    body1: BodyHandle,
    body2: Option<BodyHandle>,
    /// The attachment point, in the first body's local space.
    pub local_anchor1: Point<Real>,
    /// The attachment point, in the second body's local space (or world
    /// space if there is no second body).
    pub local_anchor2: Point<Real>,
    /// The constraint type.
    pub kind: ConstraintKind,
    /// The structural role.
    pub role: ConstraintRole,
    /// The break thresholds.
    pub thresholds: BreakThresholds,
    /// Do both bodies keep colliding with each other?
    pub contacts_enabled: bool,
}

impl PhysicalConstraint {
    /// A new constraint between `body1` and `body2`.
    pub fn new(
        body1: BodyHandle,
        body2: Option<BodyHandle>,
        kind: ConstraintKind,
        role: ConstraintRole,
    ) -> Self {
        Self {
            body1,
            body2,
            local_anchor1: Point::origin(),
            local_anchor2: Point::origin(),
            kind,
            role,
            thresholds: BreakThresholds::UNBREAKABLE,
            contacts_enabled: false,
        }
    }

    /// Builder: sets both local anchors.
    pub fn with_anchors(mut self, local_anchor1: Point<Real>, local_anchor2: Point<Real>) -> Self {
        self.local_anchor1 = local_anchor1;
        self.local_anchor2 = local_anchor2;
        self
    }

    /// Builder: sets the break thresholds.
    pub fn with_thresholds(mut self, thresholds: BreakThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// The owning body.
    pub fn body1(&self) -> BodyHandle {
        self.body1
    }

    /// The connected body.
    pub fn body2(&self) -> Option<BodyHandle> {
        self.body2
    }

    /// The body at the given end.
    pub fn body(&self, endpoint: Endpoint) -> Option<BodyHandle> {
        match endpoint {
            Endpoint::First => Some(self.body1),
            Endpoint::Second => self.body2,
        }
    }

    /// The local anchor at the given end.
    pub fn local_anchor(&self, endpoint: Endpoint) -> Point<Real> {
        match endpoint {
            Endpoint::First => self.local_anchor1,
            Endpoint::Second => self.local_anchor2,
        }
    }

    /// The body at the other end from `body`, if `body` is an endpoint.
    ///
    /// The outer option is `None` if `body` is not attached to this
    /// constraint; the inner one is `None` for the fixed world frame.
    pub fn other(&self, body: BodyHandle) -> Option<Option<BodyHandle>> {
        if self.body1 == body {
            Some(self.body2)
        } else if self.body2 == Some(body) {
            Some(Some(self.body1))
        } else {
            None
        }
    }

    /// Does this constraint touch `body`?
    pub fn touches(&self, body: BodyHandle) -> bool {
        self.body1 == body || self.body2 == Some(body)
    }
}

/// The registry of all constraints, with a per-body adjacency index.
#[derive(Clone, Debug, Default)]
pub struct ConstraintSet {
    constraints: Arena<PhysicalConstraint>,
    attached: HashMap<BodyHandle, SmallVec<[ConstraintHandle; 4]>>,
}

impl ConstraintSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of constraints.
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Is this set empty?
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Inserts a constraint. Endpoints are not validated; see
    /// [`PhysicsWorld::insert_constraint`](crate::dynamics::PhysicsWorld::insert_constraint).
    pub(crate) fn insert(&mut self, constraint: PhysicalConstraint) -> ConstraintHandle {
        let body1 = constraint.body1;
        let body2 = constraint.body2;
        let handle = ConstraintHandle(self.constraints.insert(constraint));
        self.link(body1, handle);
        if let Some(body2) = body2 {
            if body2 != body1 {
                self.link(body2, handle);
            }
        }
        handle
    }

    /// Removes a constraint.
    pub fn remove(&mut self, handle: ConstraintHandle) -> Option<PhysicalConstraint> {
        let constraint = self.constraints.remove(handle.0)?;
        self.unlink(constraint.body1, handle);
        if let Some(body2) = constraint.body2 {
            self.unlink(body2, handle);
        }
        Some(constraint)
    }

    /// Is `handle` a live constraint?
    pub fn contains(&self, handle: ConstraintHandle) -> bool {
        self.constraints.contains(handle.0)
    }

    /// The constraint identified by `handle`.
    pub fn get(&self, handle: ConstraintHandle) -> Option<&PhysicalConstraint> {
        self.constraints.get(handle.0)
    }

    /// Mutable access to the constraint identified by `handle`.
    ///
    /// Endpoints can only be changed through [`ConstraintSet::repoint`] so
    /// that the adjacency index stays consistent.
    pub fn get_mut(&mut self, handle: ConstraintHandle) -> Option<&mut PhysicalConstraint> {
        self.constraints.get_mut(handle.0)
    }

    /// Iterates through all constraints.
    pub fn iter(&self) -> impl Iterator<Item = (ConstraintHandle, &PhysicalConstraint)> {
        self.constraints
            .iter()
            .map(|(h, c)| (ConstraintHandle(h), c))
    }

    /// The constraints attached to `body`, at either end.
    pub fn attached_to(&self, body: BodyHandle) -> &[ConstraintHandle] {
        self.attached.get(&body).map(|l| &l[..]).unwrap_or(&[])
    }

    /// Changes the body (and its local anchor) at one end of a constraint.
    ///
    /// Returns the previous body at that end, or `None` if `handle` is stale.
    /// Setting the first end to `None` is not allowed and is ignored.
    pub fn repoint(
        &mut self,
        handle: ConstraintHandle,
        endpoint: Endpoint,
        body: Option<BodyHandle>,
        local_anchor: Point<Real>,
    ) -> Option<Option<BodyHandle>> {
        let constraint = self.constraints.get_mut(handle.0)?;
        let previous = match endpoint {
            Endpoint::First => {
                let Some(body) = body else {
                    log::error!("Refusing to remove the owning body of constraint {handle:?}.");
                    return Some(Some(constraint.body1));
                };
                constraint.local_anchor1 = local_anchor;
                Some(core::mem::replace(&mut constraint.body1, body))
            }
            Endpoint::Second => {
                constraint.local_anchor2 = local_anchor;
                core::mem::replace(&mut constraint.body2, body)
            }
        };

        let (body1, body2) = (constraint.body1, constraint.body2);
        if previous != body {
            if let Some(previous) = previous {
                if !(body1 == previous || body2 == Some(previous)) {
                    self.unlink(previous, handle);
                }
            }
            if let Some(body) = body {
                self.link(body, handle);
            }
        }

        Some(previous)
    }

    fn link(&mut self, body: BodyHandle, handle: ConstraintHandle) {
        let list = self.attached.entry(body).or_default();
        if !list.contains(&handle) {
            list.push(handle);
        }
    }

    fn unlink(&mut self, body: BodyHandle, handle: ConstraintHandle) {
        if let Some(list) = self.attached.get_mut(&body) {
            list.retain(|h| *h != handle);
            if list.is_empty() {
                let _ = self.attached.remove(&body);
            }
        }
    }
}
