use crate::cut::{ClipPair, FeedbackParams, TouchedMaterial};
use crate::math::{Point, Real, UnitVector};

/// Receives the audio and particle feedback of a cut.
///
/// Feedback never influences the structural outcome of a cut.
pub trait FeedbackSink {
    /// Plays `clips.first`, then `clips.second` after `delay` seconds.
    fn play_clip_pair(&mut self, clips: &ClipPair, delay: Real);

    /// Emits sap at `point`, toward `direction`.
    fn emit_fluid(&mut self, intensity: Real, point: &Point<Real>, direction: &UnitVector<Real>);
}

/// A sink ignoring all feedback.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullFeedback;

impl FeedbackSink for NullFeedback {
    fn play_clip_pair(&mut self, _: &ClipPair, _: Real) {}
    fn emit_fluid(&mut self, _: Real, _: &Point<Real>, _: &UnitVector<Real>) {}
}

/// Sends the feedback for a cut touching `material`.
pub(crate) fn emit(
    sink: &mut dyn FeedbackSink,
    params: &FeedbackParams,
    material: TouchedMaterial,
    point: &Point<Real>,
    normal: &UnitVector<Real>,
) {
    if let Some(clips) = params.clips(material) {
        sink.play_clip_pair(clips, params.inter_clip_delay);
    }

    let sappy = matches!(
        material,
        TouchedMaterial::Stem | TouchedMaterial::Leaf | TouchedMaterial::Petal
    );
    if sappy && params.fluid_intensity > 0.0 {
        sink.emit_fluid(params.fluid_intensity, point, normal);
    }
}
