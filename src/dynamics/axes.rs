#[derive(Copy, Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
/// A set of translational and rotational degrees of freedom.
///
/// Used both for the axes a body is locked along and for the axes a 6-DOF
/// constraint restricts.
pub struct JointAxes(u8);

bitflags::bitflags! {
    impl JointAxes: u8 {
        /// Translation along the `x` axis.
        const LIN_X = 1 << 0;
        /// Translation along the `y` axis.
        const LIN_Y = 1 << 1;
        /// Translation along the `z` axis.
        const LIN_Z = 1 << 2;
        /// Rotation around the `x` axis.
        const ANG_X = 1 << 3;
        /// Rotation around the `y` axis.
        const ANG_Y = 1 << 4;
        /// Rotation around the `z` axis.
        const ANG_Z = 1 << 5;
        /// All translational axes.
        const LIN_AXES = Self::LIN_X.bits() | Self::LIN_Y.bits() | Self::LIN_Z.bits();
        /// All rotational axes.
        const ANG_AXES = Self::ANG_X.bits() | Self::ANG_Y.bits() | Self::ANG_Z.bits();
    }
}
