//! Cutting plants and rebinding what remains.
//!
//! A cut runs as one synchronous transaction inside a fixed physics step:
//! split the target body, suppress automatic constraint breaking, pick the
//! held piece and rewire the constraints, (re)anchor the held piece, restore
//! the break thresholds, then release the falling pieces.

pub use self::anchor::{AnchorState, AnchorSystem, AnchorTarget};
pub use self::despawn::{DespawnPolicy, DespawnQueue};
pub use self::engine::{CutEngine, CutResult};
pub use self::error::{CutAbort, CutRejection, RebindError};
pub use self::feedback::{FeedbackSink, NullFeedback};
pub use self::gravity_hold::GravityHolds;
pub use self::params::{
    AnchorParams, ClipPair, CutParams, FeedbackParams, SplitMode, TriggerParams, VisibleRegion,
};
pub use self::plane::CutPlane;
pub use self::rebind::{HeldSelection, RebindReport, Rebinder};
pub use self::sensing::{sense_material, TouchedMaterial};
pub use self::strategy::{
    DestructiveSplit, FragmentBody, NonDestructiveSplit, SplitOutcome, SplitStrategy,
};
pub use self::suppression::{BreakSuppression, SuppressionReport};
pub use self::trigger::{CutTrigger, PressEvent, ToolState};

mod anchor;
mod despawn;
mod engine;
mod error;
mod feedback;
mod gravity_hold;
mod params;
mod plane;
mod rebind;
mod sensing;
mod strategy;
mod suppression;
mod trigger;

/// A timestamp or duration, in seconds.
pub type Time = f64;
