use crate::dynamics::{BodyHandle, ConstraintHandle};

/// Why a cut was aborted. An aborted cut leaves the world unchanged.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum CutAbort {
    /// No stem body lies near the cut plane.
    #[error("no cuttable body near the cut plane.")]
    NoTarget,
    /// The target body no longer exists.
    #[error("the target body {0:?} does not exist.")]
    TargetMissing(BodyHandle),
    /// The split primitive returned fewer than two fragments.
    #[error("the split produced {fragments} fragment(s), at least 2 are required.")]
    DegenerateSplit {
        /// The number of fragments produced.
        fragments: usize,
    },
    /// None of the fragments could be selected as the held piece.
    #[error("no fragment qualifies as the held piece.")]
    NoHeldCandidate,
}

/// Why the trigger refused a cut press.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum CutRejection {
    /// The tool is not armed yet.
    #[error("the cutting tool is not armed.")]
    NotArmed,
    /// The pointer is over a UI surface.
    #[error("the pointer is over a UI surface.")]
    PointerOverUi,
}

/// A rebinding step that could not be applied.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum RebindError {
    /// Attempt to destroy a protected constraint.
    #[error("refusing to sever the protected constraint {0:?}.")]
    ProtectedConstraint(ConstraintHandle),
    /// The constraint was destroyed while rebinding.
    #[error("the constraint {0:?} no longer exists.")]
    MissingConstraint(ConstraintHandle),
    /// The body was destroyed while rebinding.
    #[error("the body {0:?} no longer exists.")]
    MissingBody(BodyHandle),
}
