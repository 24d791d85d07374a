use crate::cut::{AnchorSystem, CutAbort, CutParams, RebindError, SplitOutcome};
use crate::dynamics::{
    BodyHandle, BodyMode, ConstraintHandle, ConstraintKind, ConstraintRole, Endpoint, JointAxes,
    PhysicalBody, PhysicalConstraint, PhysicsWorld,
};
use crate::math::{Point, Real, UnitVector};
use crate::structure::{reachable_from, Plant, StructureGraph};
use ordered_float::OrderedFloat;
use std::collections::{BTreeSet, VecDeque};

/// How the held piece was chosen.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HeldSelection {
    /// The split strategy marked the piece it kept.
    Marker,
    /// The only fragment still connected to the crown.
    Connected,
    /// The fragment whose center of mass is closest to the crown.
    Proximity,
    /// The highest fragment along the structure's up axis.
    Highest,
}

/// Everything a [`Rebinder`] pass changed.
#[derive(Clone, Debug)]
pub struct RebindReport {
    /// The held piece.
    pub held: BodyHandle,
    /// How the held piece was chosen.
    pub selection: HeldSelection,
    /// Bodies connected to the crown after rebinding.
    pub kept: BTreeSet<BodyHandle>,
    /// Fragments released to free fall.
    pub severed: Vec<BodyHandle>,
    /// Other plant bodies that fell with the severed fragments.
    pub released: Vec<BodyHandle>,
    /// Constraints moved from the cut body to one of its fragments.
    pub resolved: Vec<ConstraintHandle>,
    /// Protected constraints redirected to the held piece.
    pub redirected: Vec<ConstraintHandle>,
    /// Constraints destroyed because they spanned the held and severed sides.
    pub severed_constraints: Vec<ConstraintHandle>,
    /// Fragments classified as severed but still connected to the crown.
    pub corrected: Vec<BodyHandle>,
    /// The weld created when an unconnected held piece cannot be anchored.
    pub welded: Option<ConstraintHandle>,
    /// Refused operations.
    pub refused: Vec<RebindError>,
    /// Elements destroyed while rebinding, skipped.
    pub skipped: Vec<RebindError>,
    /// The number of individual changes applied to bodies and constraints.
    pub mutations: usize,
}

impl RebindReport {
    /// Did this pass change anything?
    pub fn is_noop(&self) -> bool {
        self.mutations == 0
    }
}

#[derive(Default)]
struct Resolution {
    resolved: Vec<ConstraintHandle>,
    // Bodies below a preserved target whose joint to it ended on the severed side.
    detached: Vec<BodyHandle>,
    skipped: Vec<RebindError>,
    mutations: usize,
}

/// Reclassifies a plant after one of its bodies was split.
///
/// The pass is deterministic and idempotent: running it again with the same
/// split and the same structure snapshot changes nothing.
#[derive(Copy, Clone, Debug)]
pub struct Rebinder {
    /// Destroy unprotected constraints spanning the held and severed sides.
    pub sever_cross_chunk: bool,
    /// Anchor unconnected held pieces. If `false` they are welded to the
    /// crown.
    pub anchoring: bool,
    /// Geometric tolerance used for tie-breaks.
    pub epsilon: Real,
}

impl Default for Rebinder {
    fn default() -> Self {
        Self::new(&CutParams::default())
    }
}

impl Rebinder {
    /// A rebinder configured from the cut parameters.
    pub fn new(params: &CutParams) -> Self {
        Self {
            sever_cross_chunk: params.sever_cross_chunk,
            anchoring: params.anchor.enabled,
            epsilon: params.epsilon,
        }
    }

    /// Rebinds the plant after `split`.
    ///
    /// `graph` is the structure as it was before the split. Fails, without
    /// mutating anything, only if no fragment of the split still exists.
    pub fn rebind(
        &self,
        world: &mut PhysicsWorld,
        anchors: &mut AnchorSystem,
        plant: &Plant,
        graph: &StructureGraph,
        split: &SplitOutcome,
    ) -> Result<RebindReport, CutAbort> {
        let crown = plant.crown();
        let candidates: Vec<BodyHandle> = split
            .bodies()
            .filter(|b| world.bodies.contains(*b))
            .collect();

        if candidates.is_empty() {
            log::warn!("No fragment of {:?} left to hold; aborting.", split.target);
            return Err(CutAbort::NoHeldCandidate);
        }

        let edges: Vec<ConstraintHandle> = graph.edges().map(|e| e.constraint).collect();
        let resolution = self.resolve_endpoints(world, graph, &edges, split);

        // Step 1: pick the held piece.
        let reference = plant.crown_position(world);
        let (held, selection) = self
            .select_held(world, crown, &candidates, split, reference.as_ref(), plant.up())
            .ok_or(CutAbort::NoHeldCandidate)?;
        log::debug!("Held piece {held:?} selected by {selection:?}.");

        let detached = resolution.detached;
        let mut report = RebindReport {
            held,
            selection,
            kept: BTreeSet::new(),
            severed: vec![],
            released: vec![],
            resolved: resolution.resolved,
            redirected: vec![],
            severed_constraints: vec![],
            corrected: vec![],
            welded: None,
            refused: vec![],
            skipped: resolution.skipped,
            mutations: resolution.mutations,
        };

        // Step 2: immobilize it before rewriting anything else.
        self.immobilize_held(world, anchors, crown, held, split, reference.as_ref(), &mut report);

        // Step 3: redirect protected constraints left on the severed side.
        let severed_fragments: Vec<BodyHandle> =
            candidates.iter().copied().filter(|b| *b != held).collect();
        let mut seeds = severed_fragments.clone();
        seeds.extend(
            detached
                .iter()
                .copied()
                .filter(|b| *b != held && *b != crown && !severed_fragments.contains(b)),
        );
        let side = collect_severed_side(world, &seeds, &[held, crown]);
        self.redirect_protected(world, &edges, held, &side, &mut report);

        // Step 4: cut stray joints across both sides.
        if self.sever_cross_chunk {
            let side = collect_severed_side(world, &seeds, &[held, crown]);
            self.sever_crossing(world, &edges, &side, &mut report);
        }

        // Step 5: release what actually fell.
        report.kept = reachable_from(world, crown, |_| true);
        self.activate_falling(world, graph, split, &severed_fragments, &mut report);

        if !report.skipped.is_empty() {
            log::warn!(
                "Rebinding completed partially: {} element(s) skipped.",
                report.skipped.len()
            );
        }

        Ok(report)
    }

    /// Moves every constraint endpoint still on the split target to the
    /// fragment closest to its anchor.
    ///
    /// If the target keeps its identity, so do all of its constraints.
    /// Protected ones are only re-seated on its new surface when needed, and
    /// the bodies hanging below it from a joint now seated on a severed piece
    /// are reported as detached.
    fn resolve_endpoints(
        &self,
        world: &mut PhysicsWorld,
        graph: &StructureGraph,
        edges: &[ConstraintHandle],
        split: &SplitOutcome,
    ) -> Resolution {
        let target = split.target;
        let to_crown = graph.parent(target).map(|(_, constraint)| constraint);
        let mut resolution = Resolution::default();

        for handle in edges {
            let Some(constraint) = world.constraints.get(*handle) else {
                log::warn!("Constraint {handle:?} vanished before rebinding; skipped.");
                resolution
                    .skipped
                    .push(RebindError::MissingConstraint(*handle));
                continue;
            };
            let protected = constraint.role.is_protected();
            let other = constraint.other(target).flatten();

            for endpoint in [Endpoint::First, Endpoint::Second] {
                let Some(body) = world.constraints.get(*handle).and_then(|c| c.body(endpoint))
                else {
                    continue;
                };
                if body != target {
                    continue;
                }

                let Ok(anchor) = world.world_anchor(*handle, endpoint) else {
                    resolution.skipped.push(RebindError::MissingBody(target));
                    continue;
                };
                let Some(nearest) = nearest_fragment(world, split, &anchor, self.epsilon) else {
                    continue;
                };

                let (new_body, local_anchor) = if split.identity_preserved {
                    if nearest == target || Some(*handle) == to_crown {
                        continue;
                    }
                    if !protected {
                        if let Some(other) = other.filter(|b| !resolution.detached.contains(b)) {
                            log::debug!("{other:?} hangs from a severed part of {target:?}.");
                            resolution.detached.push(other);
                        }
                        continue;
                    }
                    // Re-seat on the surface the target kept.
                    let Ok(Some(surface)) = world.project_point_on_body(target, &anchor) else {
                        continue;
                    };
                    let Ok(target_body) = world.body(target) else {
                        continue;
                    };
                    (target, target_body.position().inverse_transform_point(&surface))
                } else {
                    let Ok(nearest_body) = world.body(nearest) else {
                        continue;
                    };
                    (nearest, nearest_body.position().inverse_transform_point(&anchor))
                };

                if world
                    .constraints
                    .repoint(*handle, endpoint, Some(new_body), local_anchor)
                    .is_some()
                {
                    log::debug!("Constraint {handle:?} rebound from {target:?} to {new_body:?}.");
                    if resolution.resolved.last() != Some(handle) {
                        resolution.resolved.push(*handle);
                    }
                    resolution.mutations += 1;
                }
            }
        }

        resolution
    }

    /// Held-piece selection, first matching tier wins:
    /// marker, crown connectivity, proximity of the center of mass to the
    /// crown, then height along `up`. Remaining ties go to the lowest handle.
    fn select_held(
        &self,
        world: &PhysicsWorld,
        crown: BodyHandle,
        candidates: &[BodyHandle],
        split: &SplitOutcome,
        reference: Option<&Point<Real>>,
        up: &UnitVector<Real>,
    ) -> Option<(BodyHandle, HeldSelection)> {
        let connected = reachable_from(world, crown, |_| true);

        if let Some(marker) = split.kept_marker {
            if candidates.contains(&marker) && connected.contains(&marker) {
                return Some((marker, HeldSelection::Marker));
            }
            log::warn!("Kept marker {marker:?} does not reach the crown; ignoring it.");
        }
        let linked: Vec<BodyHandle> = candidates
            .iter()
            .copied()
            .filter(|b| connected.contains(b))
            .collect();
        let pool = match linked.len() {
            1 => return Some((linked[0], HeldSelection::Connected)),
            0 => candidates.to_vec(),
            _ => linked,
        };

        let centers: Vec<(BodyHandle, Point<Real>)> = pool
            .iter()
            .filter_map(|b| world.bodies.get(*b).map(|body| (*b, body.world_center_of_mass())))
            .collect();

        let mut tied = centers.clone();
        if let Some(reference) = reference {
            tied = closest_within(&centers, self.epsilon, |c| na::distance(c, reference));
            if tied.len() == 1 {
                return Some((tied[0].0, HeldSelection::Proximity));
            }
        }

        let highest = closest_within(&tied, self.epsilon, |c| -up.dot(&c.coords));
        let best = match reference {
            Some(reference) => highest
                .iter()
                .min_by_key(|(b, c)| (OrderedFloat(na::distance(c, reference)), *b)),
            None => highest.iter().min_by_key(|(b, _)| *b),
        };

        best.map(|(b, _)| (*b, HeldSelection::Highest))
    }

    fn immobilize_held(
        &self,
        world: &mut PhysicsWorld,
        anchors: &mut AnchorSystem,
        crown: BodyHandle,
        held: BodyHandle,
        split: &SplitOutcome,
        reference: Option<&Point<Real>>,
        report: &mut RebindReport,
    ) {
        let connected = reachable_from(world, crown, |_| true).contains(&held);
        let Ok(body) = world.body_mut(held) else {
            report.skipped.push(RebindError::MissingBody(held));
            return;
        };

        if connected {
            // Stays dynamic so that its attachments keep registering forces.
            report.mutations += body.set_mode(BodyMode::Dynamic) as usize;
            report.mutations += body.set_gravity_enabled(false) as usize;
            return;
        }

        report.mutations += body.set_mode(BodyMode::Kinematic) as usize;
        report.mutations += body.set_gravity_enabled(false) as usize;
        report.mutations += body.set_locked_axes(JointAxes::all()) as usize;

        if self.anchoring {
            let version = anchors.anchor_of(held).map(|s| s.version);
            match anchors.anchor(world, held, &split.plane.world_point, Some(crown)) {
                Ok(_) => {
                    if anchors.anchor_of(held).map(|s| s.version) != version {
                        report.mutations += 1;
                    }
                }
                Err(err) => log::warn!("Could not anchor the held piece: {err}"),
            }
            return;
        }

        // Last resort: weld it to the crown.
        let (Ok(held_body), Ok(crown_body)) = (world.body(held), world.body(crown)) else {
            report.skipped.push(RebindError::MissingBody(crown));
            return;
        };
        let pivot = reference
            .and_then(|r| world.project_point_on_body(held, r).ok().flatten())
            .unwrap_or_else(|| held_body.world_center_of_mass());
        let weld = PhysicalConstraint::new(
            held,
            Some(crown),
            ConstraintKind::FixedWeld,
            ConstraintRole::CrownRegion,
        )
        .with_anchors(
            held_body.position().inverse_transform_point(&pivot),
            crown_body.position().inverse_transform_point(&pivot),
        );

        match world.insert_constraint(weld) {
            Ok(handle) => {
                log::debug!("Welded the held piece {held:?} to the crown.");
                report.welded = Some(handle);
                report.mutations += 1;
            }
            Err(err) => log::warn!("Could not weld the held piece: {err}"),
        }
    }

    fn redirect_protected(
        &self,
        world: &mut PhysicsWorld,
        edges: &[ConstraintHandle],
        held: BodyHandle,
        severed_side: &BTreeSet<BodyHandle>,
        report: &mut RebindReport,
    ) {
        for handle in edges {
            let Some(constraint) = world.constraints.get(*handle) else {
                continue;
            };
            if !constraint.role.is_protected() {
                continue;
            }

            let owner = constraint.body1();
            let Some(counterpart) = constraint.body2() else {
                continue;
            };
            if owner == held || !severed_side.contains(&counterpart) {
                continue;
            }

            match world.body(owner) {
                Ok(body) if body.part().is_some_and(|p| p.is_permanently_detached()) => continue,
                Ok(_) => {}
                Err(_) => {
                    report.skipped.push(RebindError::MissingBody(owner));
                    continue;
                }
            }

            let Ok(anchor) = world.world_anchor(*handle, Endpoint::First) else {
                continue;
            };
            let Ok(held_body) = world.body(held) else {
                report.skipped.push(RebindError::MissingBody(held));
                return;
            };
            let surface = world
                .project_point_on_body(held, &anchor)
                .ok()
                .flatten()
                .unwrap_or_else(|| held_body.world_center_of_mass());
            let local_anchor = held_body.position().inverse_transform_point(&surface);

            if world
                .constraints
                .repoint(*handle, Endpoint::Second, Some(held), local_anchor)
                .is_some()
            {
                log::debug!("Protected constraint {handle:?} redirected to {held:?}.");
                report.redirected.push(*handle);
                report.mutations += 1;
            }
        }
    }

    fn sever_crossing(
        &self,
        world: &mut PhysicsWorld,
        edges: &[ConstraintHandle],
        severed_side: &BTreeSet<BodyHandle>,
        report: &mut RebindReport,
    ) {
        for handle in edges {
            let Some(constraint) = world.constraints.get(*handle) else {
                continue;
            };
            let Some(body2) = constraint.body2() else {
                continue;
            };
            if !constraint.role.is_structural()
                || severed_side.contains(&constraint.body1()) == severed_side.contains(&body2)
            {
                continue;
            }

            match Self::sever_constraint(world, *handle) {
                Ok(()) => {
                    report.severed_constraints.push(*handle);
                    report.mutations += 1;
                }
                Err(err) => report.refused.push(err),
            }
        }
    }

    /// Destroys an unprotected constraint, disconnecting it first so that its
    /// removal registers no impulse.
    ///
    /// Protected constraints are refused.
    pub fn sever_constraint(
        world: &mut PhysicsWorld,
        handle: ConstraintHandle,
    ) -> Result<(), RebindError> {
        let constraint = world
            .constraints
            .get(handle)
            .ok_or(RebindError::MissingConstraint(handle))?;

        if constraint.role.is_protected() {
            log::error!(
                "Refusing to sever the protected {:?} constraint {handle:?}.",
                constraint.role
            );
            return Err(RebindError::ProtectedConstraint(handle));
        }

        let world_anchor = world
            .world_anchor(handle, Endpoint::Second)
            .map_err(|_| RebindError::MissingConstraint(handle))?;
        if let Some(constraint) = world.constraints.get_mut(handle) {
            constraint.contacts_enabled = false;
        }
        if world
            .constraints
            .repoint(handle, Endpoint::Second, None, world_anchor)
            .is_none()
        {
            log::warn!("Constraint {handle:?} vanished while being disconnected.");
        }
        if world.remove_constraint(handle).is_none() {
            log::warn!("Constraint {handle:?} vanished before its removal.");
            return Ok(());
        }

        log::debug!("Severed constraint {handle:?}.");
        Ok(())
    }

    fn activate_falling(
        &self,
        world: &mut PhysicsWorld,
        graph: &StructureGraph,
        split: &SplitOutcome,
        severed_fragments: &[BodyHandle],
        report: &mut RebindReport,
    ) {
        for fragment in severed_fragments {
            let Ok(body) = world.body_mut(*fragment) else {
                report.skipped.push(RebindError::MissingBody(*fragment));
                continue;
            };

            if report.kept.contains(fragment) {
                log::warn!("Fragment {fragment:?} is still attached; keeping it held.");
                report.mutations += body.set_mode(BodyMode::Dynamic) as usize;
                report.mutations += body.set_gravity_enabled(false) as usize;
                report.corrected.push(*fragment);
                continue;
            }

            report.mutations += release(body);
            report.severed.push(*fragment);
        }

        for handle in graph.bodies() {
            if handle == graph.root()
                || split.contains(handle)
                || split.retired == Some(handle)
                || report.kept.contains(&handle)
            {
                continue;
            }

            let Ok(body) = world.body_mut(handle) else {
                // Destructive splits remove the target once rebinding is done.
                if handle != split.target {
                    report.skipped.push(RebindError::MissingBody(handle));
                }
                continue;
            };
            report.mutations += release(body);
            report.released.push(handle);
        }
    }
}

fn release(body: &mut PhysicalBody) -> usize {
    body.set_mode(BodyMode::Dynamic) as usize
        + body.set_gravity_enabled(true) as usize
        + body.set_locked_axes(JointAxes::empty()) as usize
        + body.wake_up() as usize
}

/// The fragment closest to `pt`, at distance zero if `pt` is inside of it.
/// Ties go to the split target, then to the lowest handle.
fn nearest_fragment(
    world: &PhysicsWorld,
    split: &SplitOutcome,
    pt: &Point<Real>,
    epsilon: Real,
) -> Option<BodyHandle> {
    let distances: Vec<(BodyHandle, Real)> = split
        .bodies()
        .filter_map(|b| world.distance_to_body(b, pt).map(|d| (b, d)))
        .collect();
    let min = distances
        .iter()
        .map(|(_, d)| OrderedFloat(*d))
        .min()?
        .into_inner();

    distances
        .iter()
        .filter(|(_, d)| *d <= min + epsilon)
        .map(|(b, _)| *b)
        .min_by_key(|b| (*b != split.target, *b))
}

/// The entries whose cost is within `epsilon` of the smallest one.
fn closest_within(
    entries: &[(BodyHandle, Point<Real>)],
    epsilon: Real,
    cost: impl Fn(&Point<Real>) -> Real,
) -> Vec<(BodyHandle, Point<Real>)> {
    let Some(min) = entries.iter().map(|(_, c)| OrderedFloat(cost(c))).min() else {
        return vec![];
    };
    entries
        .iter()
        .filter(|(_, c)| cost(c) <= min.into_inner() + epsilon)
        .copied()
        .collect()
}

/// The bodies reachable from the severed fragments without going through
/// the `blocked` bodies.
fn collect_severed_side(
    world: &PhysicsWorld,
    seeds: &[BodyHandle],
    blocked: &[BodyHandle],
) -> BTreeSet<BodyHandle> {
    let mut reached: BTreeSet<BodyHandle> = seeds.iter().copied().collect();
    let mut queue: VecDeque<BodyHandle> = seeds.iter().copied().collect();

    while let Some(body) = queue.pop_front() {
        for handle in world.constraints.attached_to(body) {
            let Some(constraint) = world.constraints.get(*handle) else {
                continue;
            };
            if !constraint.role.is_structural() {
                continue;
            }
            let Some(Some(other)) = constraint.other(body) else {
                continue;
            };
            if blocked.contains(&other) || !world.bodies.contains(other) {
                continue;
            }
            if reached.insert(other) {
                queue.push_back(other);
            }
        }
    }

    reached
}
