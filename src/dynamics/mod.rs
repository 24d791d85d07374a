//! Rigid bodies, constraints, and the registries owning them.
//!
//! These registries mirror the state of the external rigid-body solver: the
//! solver integrates them, the cutting engine restructures them. Every
//! element is addressed through a generational handle so that lookups on
//! removed elements return an explicit not-found result.

pub use self::axes::JointAxes;
pub use self::body::{BodyHandle, BodyMode, BodySet, PhysicalBody};
pub use self::constraint::{
    BreakThresholds, ConstraintHandle, ConstraintKind, ConstraintRole, ConstraintSet, Endpoint,
    PhysicalConstraint, SixDofParams, SpringDrive,
};
pub use self::world::{ConstraintLoad, PhysicsWorld, WorldError};

mod axes;
mod body;
mod constraint;
mod world;
