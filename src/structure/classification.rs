/// The kind of plant part a body represents.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum PartKind {
    /// A piece of stem.
    Stem,
    /// A leaf.
    Leaf,
    /// A petal.
    Petal,
    /// The crown, root of the structure.
    Crown,
}

/// The health of a plant part.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum PartCondition {
    /// A healthy part.
    Normal,
    /// A withered part, easier to tear off.
    Withered,
}

/// Whether a part is still held by the structure.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum AttachmentState {
    /// Attached to the structure.
    Attached,
    /// Fell off, but may still be considered by the rebinding logic.
    Detached,
    /// Excluded from all automatic rebinding and protection logic.
    PermanentlyDetached,
}

/// The tags carried by every body belonging to a plant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct PartClassification {
    /// The part kind.
    pub kind: PartKind,
    /// The part health.
    pub condition: PartCondition,
    /// The attachment state.
    pub attachment: AttachmentState,
}

impl PartClassification {
    /// A healthy, attached part of the given kind.
    pub fn new(kind: PartKind) -> Self {
        Self {
            kind,
            condition: PartCondition::Normal,
            attachment: AttachmentState::Attached,
        }
    }

    /// Is this part excluded from automatic rebinding?
    pub fn is_permanently_detached(&self) -> bool {
        self.attachment == AttachmentState::PermanentlyDetached
    }

    /// Is this a leaf or a petal?
    pub fn is_foliage(&self) -> bool {
        matches!(self.kind, PartKind::Leaf | PartKind::Petal)
    }
}
