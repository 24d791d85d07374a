use crate::cut::feedback;
use crate::cut::{
    sense_material, AnchorSystem, BreakSuppression, CutAbort, CutParams, CutPlane, CutRejection,
    CutTrigger, DespawnQueue, DestructiveSplit, FeedbackSink, GravityHolds, NonDestructiveSplit,
    PressEvent, RebindReport, Rebinder, SplitMode, SplitStrategy, Time, TouchedMaterial,
};
use crate::dynamics::{BodyHandle, PhysicsWorld};
use crate::geometry::{GeometrySplitter, PlaneSplitter};
use crate::math::{Point, Real, UnitVector};
use crate::structure::{PartKind, Plant, StructureGraph};
use ordered_float::OrderedFloat;

/// The outcome of one cut.
#[derive(Clone, Debug, Default)]
pub struct CutResult {
    /// The piece that stays attached to the crown.
    pub held: Option<BodyHandle>,
    /// The fragments released to free fall.
    pub severed: Vec<BodyHandle>,
    /// The other plant bodies that fell with them.
    pub released: Vec<BodyHandle>,
    /// Was the cut aborted? An aborted cut changes nothing.
    pub aborted: bool,
    /// Why the cut was aborted.
    pub abort: Option<CutAbort>,
    /// The material the cut touched.
    pub material: Option<TouchedMaterial>,
    /// The details of the rebinding pass.
    pub report: Option<RebindReport>,
}

impl CutResult {
    fn aborted(reason: CutAbort) -> Self {
        Self {
            aborted: true,
            abort: Some(reason),
            ..Self::default()
        }
    }
}

/// Cuts one plant and keeps what remains of it coherent.
///
/// Call [`CutEngine::update`] once per visual frame and
/// [`CutEngine::fixed_step`] once per physics step, before the solver.
pub struct CutEngine {
    plant: Plant,
    params: CutParams,
    trigger: CutTrigger,
    splitter: Box<dyn GeometrySplitter>,
    anchors: AnchorSystem,
    suppression: BreakSuppression,
    despawn: DespawnQueue,
    gravity_holds: GravityHolds,
    time: Time,
}

impl CutEngine {
    /// An engine cutting `plant`, with the default plane splitter.
    pub fn new(plant: Plant, params: CutParams) -> Self {
        Self {
            plant,
            trigger: CutTrigger::new(params.trigger),
            splitter: Box::new(PlaneSplitter::new(params.epsilon * 0.1)),
            anchors: AnchorSystem::new(params.anchor),
            suppression: BreakSuppression::new(),
            despawn: DespawnQueue::new(),
            gravity_holds: GravityHolds::new(),
            time: 0.0,
            params,
        }
    }

    /// Replaces the geometry-cutting primitive.
    pub fn with_splitter(mut self, splitter: impl GeometrySplitter + 'static) -> Self {
        self.splitter = Box::new(splitter);
        self
    }

    /// The plant being cut.
    pub fn plant(&self) -> &Plant {
        &self.plant
    }

    /// The configuration.
    pub fn params(&self) -> &CutParams {
        &self.params
    }

    /// The anchors of the held pieces.
    pub fn anchors(&self) -> &AnchorSystem {
        &self.anchors
    }

    /// The severed pieces waiting for removal.
    pub fn despawn_queue(&self) -> &DespawnQueue {
        &self.despawn
    }

    /// The pending gravity holds.
    pub fn gravity_holds(&self) -> &GravityHolds {
        &self.gravity_holds
    }

    /// The physics time, advanced by [`CutEngine::fixed_step`].
    pub fn time(&self) -> Time {
        self.time
    }

    /// The cutting tool trigger.
    pub fn trigger(&self) -> &CutTrigger {
        &self.trigger
    }

    /// Are cut presses accepted?
    pub fn is_armed(&self) -> bool {
        self.trigger.is_armed()
    }

    /// Handles the tool being equipped (`armed`) or put away.
    pub fn set_tool_armed(&mut self, armed: bool, now: Time, input_held: bool) {
        self.trigger.set_tool_armed(armed, now, input_held);
    }

    /// Observes the cut input. Called once per visual frame.
    pub fn update(&mut self, now: Time, input_held: bool) {
        self.trigger.update(now, input_held);
    }

    /// Per physics step work: snaps the anchors to their targets, restores
    /// expired gravity holds, and despawns expired severed pieces.
    pub fn fixed_step(&mut self, world: &mut PhysicsWorld, dt: Time) {
        self.time += dt;
        self.anchors.fixed_step(world);
        let _ = self.gravity_holds.process(world, self.time);
        let _ = self.despawn.process(world, self.time);
    }

    /// Handles a cut press: the trigger gate, the cut itself, then feedback.
    pub fn attempt_cut(
        &mut self,
        world: &mut PhysicsWorld,
        press: &PressEvent,
        feedback: &mut dyn FeedbackSink,
    ) -> Result<CutResult, CutRejection> {
        let (point, normal) = self.trigger.accept_press(press)?;
        let mut result = self.request_cut(world, &point, &normal);

        if !result.aborted {
            let material = sense_material(
                world,
                &point,
                &normal,
                self.params.sensing_radius,
                self.params.sensing_half_thickness,
            );
            feedback::emit(feedback, &self.params.feedback, material, &point, &normal);
            result.material = Some(material);
        }

        Ok(result)
    }

    /// Cuts the plant along the world-space plane through `point` with
    /// normal `normal`.
    ///
    /// The whole transaction (split, suppression, rebinding, anchoring,
    /// restoration) completes before returning. An aborted cut leaves the
    /// world unchanged.
    pub fn request_cut(
        &mut self,
        world: &mut PhysicsWorld,
        point: &Point<Real>,
        normal: &UnitVector<Real>,
    ) -> CutResult {
        let crown = self.plant.crown();
        let graph = StructureGraph::from_root(world, crown);

        let Some(target) = self.pick_target(world, &graph, point, normal) else {
            log::debug!("Cut at {point:?} touched no stem.");
            return CutResult::aborted(CutAbort::NoTarget);
        };
        let Ok(target_body) = world.body(target) else {
            return CutResult::aborted(CutAbort::TargetMissing(target));
        };

        let plane = CutPlane::from_world(target_body.position(), point, normal);
        let reference = self.plant.crown_position(world).unwrap_or(*point);
        let strategy: Box<dyn SplitStrategy> = match self.params.split_mode {
            SplitMode::Destructive => Box::new(DestructiveSplit),
            SplitMode::NonDestructive => {
                Box::new(NonDestructiveSplit::new(self.params.cosmetic_offset))
            }
        };

        let mut split = match strategy.split(world, &*self.splitter, target, &plane, &reference) {
            Ok(split) => split,
            Err(reason) => return CutResult::aborted(reason),
        };

        self.suppression.begin();
        let _ = self.suppression.suppress_root(world, crown);

        let rebinder = Rebinder::new(&self.params);
        let report = match rebinder.rebind(world, &mut self.anchors, &self.plant, &graph, &split) {
            Ok(report) => report,
            Err(reason) => {
                split.revert(world);
                let _ = self.suppression.end(world);
                log::warn!("Cut of {target:?} aborted: {reason}");
                return CutResult::aborted(reason);
            }
        };

        // Pieces that fell may have been held by an earlier cut.
        let mut stale_anchors: Vec<BodyHandle> =
            report.severed.iter().chain(&report.released).copied().collect();
        if split.retired.is_some() {
            stale_anchors.push(target);
        }
        for body in stale_anchors {
            let _ = self.anchors.release(world, body);
        }

        if self.params.anchor.enabled && report.welded.is_none() {
            if let Err(err) = self.anchors.anchor(world, report.held, point, Some(crown)) {
                log::warn!("Could not anchor the held piece {:?}: {err}", report.held);
            }
        }

        self.hold_redirected(world, &report);

        split.finalize(world);
        let _ = self.suppression.end(world);

        for body in report.severed.iter().chain(&report.released) {
            self.despawn.register(
                *body,
                self.time,
                self.params.severed_lifetime,
                self.params.visible_region,
            );
        }

        log::debug!(
            "Cut {target:?}: held {:?}, {} severed, {} released.",
            report.held,
            report.severed.len(),
            report.released.len()
        );

        CutResult {
            held: Some(report.held),
            severed: report.severed.clone(),
            released: report.released.clone(),
            aborted: false,
            abort: None,
            material: None,
            report: Some(report),
        }
    }

    /// Holds gravity off on the kept bodies whose attachment was redirected.
    fn hold_redirected(&mut self, world: &mut PhysicsWorld, report: &RebindReport) {
        if self.params.redirect_gravity_hold <= 0.0 {
            return;
        }

        for handle in &report.redirected {
            let Ok(constraint) = world.constraint(*handle) else {
                continue;
            };
            let owner = constraint.body1();
            // Falling bodies keep their gravity.
            if !report.kept.contains(&owner)
                || report.severed.contains(&owner)
                || report.released.contains(&owner)
            {
                log::debug!("{owner:?} fell with the severed side; no gravity hold.");
                continue;
            }
            self.gravity_holds
                .hold(world, owner, self.time, self.params.redirect_gravity_hold);
        }
    }

    /// The stem body of the plant closest to `point`, among the ones the
    /// plane crosses if any.
    fn pick_target(
        &self,
        world: &PhysicsWorld,
        graph: &StructureGraph,
        point: &Point<Real>,
        normal: &UnitVector<Real>,
    ) -> Option<BodyHandle> {
        let candidates: Vec<(BodyHandle, Real)> = graph
            .bodies()
            .filter(|b| {
                world.bodies.get(*b).is_some_and(|body| {
                    body.is_enabled()
                        && !body.is_cosmetic()
                        && body.part().is_some_and(|p| p.kind == PartKind::Stem)
                })
            })
            .filter_map(|b| world.distance_to_body(b, point).map(|d| (b, d)))
            .filter(|(_, d)| *d <= self.params.sensing_radius)
            .collect();

        let straddling: Vec<(BodyHandle, Real)> = candidates
            .iter()
            .copied()
            .filter(|(b, _)| world.body_straddles_plane(*b, point, normal, self.params.epsilon))
            .collect();
        let pool = if straddling.is_empty() {
            &candidates
        } else {
            &straddling
        };

        pool.iter()
            .min_by_key(|(b, d)| (OrderedFloat(*d), *b))
            .map(|(b, _)| *b)
    }
}
