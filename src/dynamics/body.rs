use crate::dynamics::JointAxes;
use crate::geometry::CutMesh;
use crate::math::{Isometry, Point, Real};
use crate::structure::PartClassification;
use crate::utils::{Arena, Index};

/// The stable handle of a [`PhysicalBody`] inside a [`BodySet`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct BodyHandle(pub(crate) Index);

/// How the solver moves a body.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum BodyMode {
    /// Moved by forces, gravity and constraints.
    Dynamic,
    /// Moved only by the user; constraints cannot push it.
    Kinematic,
}

/// A simulated rigid object.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct PhysicalBody {
    position: Isometry<Real>,
    mesh: CutMesh,
    mass: Real,
    mode: BodyMode,
    gravity_enabled: bool,
    collision_enabled: bool,
    enabled: bool,
    sleeping: bool,
    cosmetic: bool,
    locked_axes: JointAxes,
    part: Option<PartClassification>,
}

impl PhysicalBody {
    /// A dynamic, gravity-affected, colliding body.
    pub fn new(position: Isometry<Real>, mesh: CutMesh, mass: Real) -> Self {
        Self {
            position,
            mesh,
            mass,
            mode: BodyMode::Dynamic,
            gravity_enabled: true,
            collision_enabled: true,
            enabled: true,
            sleeping: false,
            cosmetic: false,
            locked_axes: JointAxes::empty(),
            part: None,
        }
    }

    /// A kinematic body with no gravity, no collision and no geometry.
    ///
    /// This is what constraints are attached to when they must pull toward a
    /// point in space.
    pub fn kinematic_marker(position: Isometry<Real>) -> Self {
        let mut body = Self::new(position, CutMesh::default(), 0.0);
        body.mode = BodyMode::Kinematic;
        body.gravity_enabled = false;
        body.collision_enabled = false;
        body
    }

    /// Builder: sets the plant-part classification of this body.
    pub fn with_part(mut self, part: PartClassification) -> Self {
        self.part = Some(part);
        self
    }

    /// Builder: sets the motion mode of this body.
    pub fn with_mode(mut self, mode: BodyMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builder: enables or disables gravity.
    pub fn with_gravity(mut self, enabled: bool) -> Self {
        self.gravity_enabled = enabled;
        self
    }

    /// Builder: flags this body as cosmetic (not part of any plant structure).
    pub fn with_cosmetic(mut self, cosmetic: bool) -> Self {
        self.cosmetic = cosmetic;
        self
    }

    /// The world-space pose of this body.
    pub fn position(&self) -> &Isometry<Real> {
        &self.position
    }

    /// Sets the world-space pose of this body.
    pub fn set_position(&mut self, position: Isometry<Real>) {
        self.position = position;
    }

    /// The collision geometry, in local space.
    pub fn mesh(&self) -> &CutMesh {
        &self.mesh
    }

    /// Replaces the collision geometry.
    pub fn set_mesh(&mut self, mesh: CutMesh) {
        self.mesh = mesh;
    }

    /// The mass of this body.
    pub fn mass(&self) -> Real {
        self.mass
    }

    /// Sets the mass of this body.
    pub fn set_mass(&mut self, mass: Real) {
        self.mass = mass;
    }

    /// The motion mode.
    pub fn mode(&self) -> BodyMode {
        self.mode
    }

    /// Is this body kinematic?
    pub fn is_kinematic(&self) -> bool {
        self.mode == BodyMode::Kinematic
    }

    /// Is this body dynamic?
    pub fn is_dynamic(&self) -> bool {
        self.mode == BodyMode::Dynamic
    }

    /// Sets the motion mode. Returns `true` if it changed.
    pub fn set_mode(&mut self, mode: BodyMode) -> bool {
        let changed = self.mode != mode;
        self.mode = mode;
        changed
    }

    /// Is gravity applied to this body?
    pub fn is_gravity_enabled(&self) -> bool {
        self.gravity_enabled
    }

    /// Enables or disables gravity. Returns `true` if it changed.
    pub fn set_gravity_enabled(&mut self, enabled: bool) -> bool {
        let changed = self.gravity_enabled != enabled;
        self.gravity_enabled = enabled;
        changed
    }

    /// Does this body generate contacts?
    pub fn is_collision_enabled(&self) -> bool {
        self.collision_enabled
    }

    /// Enables or disables contacts.
    pub fn set_collision_enabled(&mut self, enabled: bool) {
        self.collision_enabled = enabled;
    }

    /// Does this body take part in the simulation at all?
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Adds or removes this body from the simulation, keeping it in the registry.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Is this body asleep?
    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// Wakes this body up. Returns `true` if it was asleep.
    pub fn wake_up(&mut self) -> bool {
        core::mem::replace(&mut self.sleeping, false)
    }

    /// Puts this body to sleep.
    pub fn sleep(&mut self) {
        self.sleeping = true;
    }

    /// Is this a cosmetic-only body?
    pub fn is_cosmetic(&self) -> bool {
        self.cosmetic
    }

    /// The degrees of freedom this body is locked along.
    pub fn locked_axes(&self) -> JointAxes {
        self.locked_axes
    }

    /// Locks the given degrees of freedom. Returns `true` if it changed.
    pub fn set_locked_axes(&mut self, axes: JointAxes) -> bool {
        let changed = self.locked_axes != axes;
        self.locked_axes = axes;
        changed
    }

    /// The plant-part classification, if this body belongs to a plant.
    pub fn part(&self) -> Option<&PartClassification> {
        self.part.as_ref()
    }

    /// Mutable access to the plant-part classification.
    pub fn part_mut(&mut self) -> Option<&mut PartClassification> {
        self.part.as_mut()
    }

    /// Sets the plant-part classification.
    pub fn set_part(&mut self, part: Option<PartClassification>) {
        self.part = part;
    }

    /// The world-space center of mass.
    pub fn world_center_of_mass(&self) -> Point<Real> {
        self.position * self.mesh.center_of_mass()
    }
}

/// The registry of all bodies.
#[derive(Clone, Debug, Default)]
pub struct BodySet {
    bodies: Arena<PhysicalBody>,
}

impl BodySet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of bodies.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Is this set empty?
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Inserts a body.
    pub fn insert(&mut self, body: PhysicalBody) -> BodyHandle {
        BodyHandle(self.bodies.insert(body))
    }

    /// Removes a body. Constraints are not touched; see [`PhysicsWorld::remove_body`].
    ///
    /// [`PhysicsWorld::remove_body`]: crate::dynamics::PhysicsWorld::remove_body
    pub(crate) fn remove(&mut self, handle: BodyHandle) -> Option<PhysicalBody> {
        self.bodies.remove(handle.0)
    }

    /// Is `handle` a live body?
    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains(handle.0)
    }

    /// The body identified by `handle`.
    pub fn get(&self, handle: BodyHandle) -> Option<&PhysicalBody> {
        self.bodies.get(handle.0)
    }

    /// Mutable access to the body identified by `handle`.
    pub fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut PhysicalBody> {
        self.bodies.get_mut(handle.0)
    }

    /// Iterates through all bodies.
    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &PhysicalBody)> {
        self.bodies.iter().map(|(h, b)| (BodyHandle(h), b))
    }
}
