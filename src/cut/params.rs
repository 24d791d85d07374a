use crate::cut::{Time, TouchedMaterial};
use crate::dynamics::JointAxes;
use crate::math::{Point, Real, UnitVector, Vector};

/// Timing and geometry of the cutting tool.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct TriggerParams {
    /// Time between equipping the tool and accepting the first cut.
    pub arm_delay: Time,
    /// If `true`, the cut input must be seen released once after equipping
    /// before a press is accepted.
    pub require_release: bool,
    /// The blade normal, in the local space of the tool.
    pub blade_normal: UnitVector<Real>,
}

impl Default for TriggerParams {
    fn default() -> Self {
        Self {
            arm_delay: 0.25,
            require_release: true,
            blade_normal: Vector::y_axis(),
        }
    }
}

/// Stiffness and freedom of the compliant anchor holding a cut piece.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct AnchorParams {
    /// If `false`, an unparented held piece is welded to the crown instead.
    pub enabled: bool,
    /// Stiffness of the linear spring pulling toward the target.
    pub linear_stiffness: Real,
    /// Damping of the linear spring.
    pub linear_damping: Real,
    /// Maximum distance between the anchored point and the target.
    pub linear_limit: Real,
    /// Damping applied to the free rotational axes.
    pub angular_damping: Real,
    /// Rotational axes left free. The others are locked.
    pub free_angular_axes: JointAxes,
}

impl Default for AnchorParams {
    fn default() -> Self {
        Self {
            enabled: true,
            linear_stiffness: 800.0,
            linear_damping: 40.0,
            linear_limit: 0.05,
            angular_damping: 2.0,
            free_angular_axes: JointAxes::ANG_AXES,
        }
    }
}

/// Which split strategy a cut uses.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum SplitMode {
    /// Replace the target with one new body per fragment.
    #[default]
    Destructive,
    /// Keep the target body and spawn cosmetic bodies for the cut-off pieces.
    NonDestructive,
}

/// A pair of sound clips played one after the other.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ClipPair {
    /// Played immediately.
    pub first: String,
    /// Played after the inter-clip delay.
    pub second: String,
}

impl ClipPair {
    /// A new clip pair.
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }
}

/// Audio and fluid feedback emitted after a cut.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct FeedbackParams {
    /// Clips played when cutting a stem.
    pub stem: Option<ClipPair>,
    /// Clips played when cutting near a leaf.
    pub leaf: Option<ClipPair>,
    /// Clips played when cutting near a petal.
    pub petal: Option<ClipPair>,
    /// Clips played when cutting anything else.
    pub generic: Option<ClipPair>,
    /// Delay between both clips of a pair.
    pub inter_clip_delay: Real,
    /// Intensity of the sap emission. Zero disables it.
    pub fluid_intensity: Real,
}

impl Default for FeedbackParams {
    fn default() -> Self {
        Self {
            stem: Some(ClipPair::new("cut_stem_a", "cut_stem_b")),
            leaf: Some(ClipPair::new("cut_leaf_a", "cut_leaf_b")),
            petal: Some(ClipPair::new("cut_petal_a", "cut_petal_b")),
            generic: Some(ClipPair::new("cut_generic_a", "cut_generic_b")),
            inter_clip_delay: 0.08,
            fluid_intensity: 1.0,
        }
    }
}

impl FeedbackParams {
    /// The clips to play for a touched material.
    pub fn clips(&self, material: TouchedMaterial) -> Option<&ClipPair> {
        match material {
            TouchedMaterial::Stem => self.stem.as_ref(),
            TouchedMaterial::Leaf => self.leaf.as_ref(),
            TouchedMaterial::Petal => self.petal.as_ref(),
            TouchedMaterial::Generic => self.generic.as_ref(),
            TouchedMaterial::None => None,
        }
    }
}

/// An axis-aligned world-space box outside of which severed pieces are
/// despawned.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct VisibleRegion {
    /// The corner with the smallest coordinates.
    pub mins: Point<Real>,
    /// The corner with the largest coordinates.
    pub maxs: Point<Real>,
}

impl VisibleRegion {
    /// A region from its two corners.
    pub fn new(mins: Point<Real>, maxs: Point<Real>) -> Self {
        Self { mins, maxs }
    }

    /// Does this region contain `pt`?
    pub fn contains_point(&self, pt: &Point<Real>) -> bool {
        (0..3).all(|i| pt[i] >= self.mins[i] && pt[i] <= self.maxs[i])
    }
}

/// Configuration of a [`CutEngine`](crate::cut::CutEngine).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct CutParams {
    /// Tool arming.
    pub trigger: TriggerParams,
    /// Compliant anchor.
    pub anchor: AnchorParams,
    /// Split strategy.
    pub split_mode: SplitMode,
    /// Destroy unprotected constraints left spanning the held and severed
    /// sides.
    pub sever_cross_chunk: bool,
    /// Distance along the cut normal by which cosmetic pieces are pushed away
    /// from the kept piece.
    pub cosmetic_offset: Real,
    /// Radius around the cut point used for target picking and material
    /// sensing.
    pub sensing_radius: Real,
    /// Half-thickness of the slab around the cut plane used for material
    /// sensing.
    pub sensing_half_thickness: Real,
    /// Lifetime of severed pieces.
    pub severed_lifetime: Time,
    /// Severed pieces leaving this region are despawned early.
    pub visible_region: Option<VisibleRegion>,
    /// Duration of the gravity hold on redirected leaves and petals. Zero
    /// disables it.
    pub redirect_gravity_hold: Time,
    /// Geometric tolerance.
    pub epsilon: Real,
    /// Audio and fluid feedback.
    pub feedback: FeedbackParams,
}

impl Default for CutParams {
    fn default() -> Self {
        Self {
            trigger: TriggerParams::default(),
            anchor: AnchorParams::default(),
            split_mode: SplitMode::Destructive,
            sever_cross_chunk: true,
            cosmetic_offset: 0.002,
            sensing_radius: 0.1,
            sensing_half_thickness: 0.02,
            severed_lifetime: 10.0,
            visible_region: None,
            redirect_gravity_hold: 0.5,
            epsilon: 1.0e-4,
            feedback: FeedbackParams::default(),
        }
    }
}
