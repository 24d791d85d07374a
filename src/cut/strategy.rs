use crate::cut::{CutAbort, CutPlane};
use crate::dynamics::{BodyHandle, BodyMode, PhysicalBody, PhysicsWorld};
use crate::geometry::{CutMesh, Fragment, GeometrySplitter};
use crate::math::{Point, Real, Translation};
use ordered_float::OrderedFloat;

/// One body resulting from a split.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FragmentBody {
    /// The body carrying the fragment geometry.
    pub body: BodyHandle,
    /// The fragment center of mass, in world space.
    pub world_centroid: Point<Real>,
    /// Is this a cosmetic-only piece?
    pub cosmetic: bool,
}

/// The bodies produced by a [`SplitStrategy`], and what is needed to undo
/// or finish the split.
#[derive(Clone, Debug)]
pub struct SplitOutcome {
    /// The body that was cut.
    pub target: BodyHandle,
    /// The plane the target was cut with.
    pub plane: CutPlane,
    /// One body per fragment. When the target identity is preserved, the
    /// target is the first element.
    pub fragments: Vec<FragmentBody>,
    /// The fragment body the strategy already knows is held.
    pub kept_marker: Option<BodyHandle>,
    /// Does the target keep its identity (and its constraints)?
    pub identity_preserved: bool,
    /// The target body, disabled and due for removal once rebinding is done.
    pub retired: Option<BodyHandle>,
    original: Option<(CutMesh, Real)>,
}

impl SplitOutcome {
    /// The fragment bodies.
    pub fn bodies(&self) -> impl Iterator<Item = BodyHandle> + '_ {
        self.fragments.iter().map(|f| f.body)
    }

    /// Is `body` one of the fragment bodies?
    pub fn contains(&self, body: BodyHandle) -> bool {
        self.fragments.iter().any(|f| f.body == body)
    }

    /// Removes the retired target, if any.
    ///
    /// Constraints still attached to it are removed as well, so this must run
    /// after rebinding.
    pub fn finalize(&mut self, world: &mut PhysicsWorld) {
        if let Some(retired) = self.retired.take() {
            let leftovers = world.constraints.attached_to(retired).len();
            if leftovers != 0 {
                log::warn!("Removing {retired:?} with {leftovers} constraint(s) still attached.");
            }
            let _ = world.remove_body(retired);
        }
    }

    /// Undoes the split: new bodies are removed and the target is restored.
    pub fn revert(self, world: &mut PhysicsWorld) {
        for fragment in &self.fragments {
            if fragment.body != self.target {
                let _ = world.remove_body(fragment.body);
            }
        }

        if let Some(target) = world.bodies.get_mut(self.target) {
            if let Some((mesh, mass)) = self.original {
                target.set_mesh(mesh);
                target.set_mass(mass);
            }
            target.set_enabled(true);
            target.set_collision_enabled(true);
        }

        log::debug!("Reverted the split of {:?}.", self.target);
    }
}

/// Turns one cut plane and one body into kept and severed bodies.
pub trait SplitStrategy {
    /// Splits `target` along `plane`.
    ///
    /// `reference` is the crown position, used by strategies that decide the
    /// kept fragment themselves. Nothing is mutated if the split fails.
    fn split(
        &self,
        world: &mut PhysicsWorld,
        splitter: &dyn GeometrySplitter,
        target: BodyHandle,
        plane: &CutPlane,
        reference: &Point<Real>,
    ) -> Result<SplitOutcome, CutAbort>;
}

/// Discards the target and creates one new body per fragment.
///
/// No body keeps the target identity: every constraint referencing the target
/// has to be rebound.
#[derive(Copy, Clone, Debug, Default)]
pub struct DestructiveSplit;

/// Keeps the target body and its constraints, swapping its geometry with the
/// fragment closest to the crown. The other fragments become cosmetic bodies
/// pushed slightly away along the cut normal.
#[derive(Copy, Clone, Debug, Default)]
pub struct NonDestructiveSplit {
    /// The distance cosmetic bodies are pushed along the cut normal.
    pub cosmetic_offset: Real,
}

impl NonDestructiveSplit {
    /// A strategy pushing cosmetic bodies by `cosmetic_offset`.
    pub fn new(cosmetic_offset: Real) -> Self {
        Self { cosmetic_offset }
    }
}

fn split_target(
    world: &PhysicsWorld,
    splitter: &dyn GeometrySplitter,
    target: BodyHandle,
    plane: &CutPlane,
) -> Result<(PhysicalBody, Vec<Fragment>), CutAbort> {
    let body = world
        .bodies
        .get(target)
        .ok_or(CutAbort::TargetMissing(target))?;
    let fragments = splitter.split(&plane.local_point, &plane.local_normal, body.mesh());

    if fragments.len() < 2 {
        log::warn!(
            "Split of {target:?} produced {} fragment(s); aborting the cut.",
            fragments.len()
        );
        return Err(CutAbort::DegenerateSplit {
            fragments: fragments.len(),
        });
    }

    Ok((body.clone(), fragments))
}

/// Splits `mass` proportionally to the fragment volumes.
fn fragment_masses(mass: Real, fragments: &[Fragment]) -> Vec<Real> {
    let volumes: Vec<Real> = fragments.iter().map(|f| f.mesh.volume().abs()).collect();
    let total: Real = volumes.iter().sum();

    if total <= Real::EPSILON {
        let share = mass / fragments.len() as Real;
        return vec![share; fragments.len()];
    }

    volumes.iter().map(|v| mass * v / total).collect()
}

fn fragment_body(source: &PhysicalBody, fragment: Fragment, mass: Real) -> PhysicalBody {
    let mut body = PhysicalBody::new(*source.position(), fragment.mesh, mass)
        .with_mode(source.mode())
        .with_gravity(source.is_gravity_enabled());
    body.set_part(source.part().copied());
    body
}

impl SplitStrategy for DestructiveSplit {
    fn split(
        &self,
        world: &mut PhysicsWorld,
        splitter: &dyn GeometrySplitter,
        target: BodyHandle,
        plane: &CutPlane,
        _reference: &Point<Real>,
    ) -> Result<SplitOutcome, CutAbort> {
        let (source, fragments) = split_target(world, splitter, target, plane)?;
        let masses = fragment_masses(source.mass(), &fragments);
        let mut bodies = Vec::with_capacity(fragments.len());

        for (fragment, mass) in fragments.into_iter().zip(masses) {
            let world_centroid = source.position() * fragment.centroid;
            let body = world.insert_body(fragment_body(&source, fragment, mass));
            bodies.push(FragmentBody {
                body,
                world_centroid,
                cosmetic: false,
            });
        }

        // The target stays in the world, inert, until its constraints are
        // rebound.
        if let Some(target) = world.bodies.get_mut(target) {
            target.set_enabled(false);
            target.set_collision_enabled(false);
        }

        log::debug!(
            "Destructive split of {target:?} into {} bodies.",
            bodies.len()
        );

        Ok(SplitOutcome {
            target,
            plane: *plane,
            fragments: bodies,
            kept_marker: None,
            identity_preserved: false,
            retired: Some(target),
            original: None,
        })
    }
}

impl SplitStrategy for NonDestructiveSplit {
    fn split(
        &self,
        world: &mut PhysicsWorld,
        splitter: &dyn GeometrySplitter,
        target: BodyHandle,
        plane: &CutPlane,
        reference: &Point<Real>,
    ) -> Result<SplitOutcome, CutAbort> {
        let (source, fragments) = split_target(world, splitter, target, plane)?;
        let masses = fragment_masses(source.mass(), &fragments);
        let pos = *source.position();

        let kept_id = fragments
            .iter()
            .enumerate()
            .min_by_key(|(_, f)| OrderedFloat(na::distance_squared(&(pos * f.centroid), reference)))
            .map(|(i, _)| i)
            .unwrap_or(0);
        let kept_side = plane.signed_distance(&(pos * fragments[kept_id].centroid));

        let mut bodies = Vec::with_capacity(fragments.len());
        let mut cosmetics = vec![];

        for (i, (fragment, mass)) in fragments.into_iter().zip(masses).enumerate() {
            let world_centroid = pos * fragment.centroid;

            if i == kept_id {
                if let Some(body) = world.bodies.get_mut(target) {
                    body.set_mesh(fragment.mesh);
                    body.set_mass(mass);
                }
                bodies.push(FragmentBody {
                    body: target,
                    world_centroid,
                    cosmetic: false,
                });
                continue;
            }

            // Push the piece away from the kept side.
            let sign: Real = if kept_side > 0.0 { -1.0 } else { 1.0 };
            let shift = plane.world_normal.into_inner() * (sign * self.cosmetic_offset);

            let mut body = fragment_body(&source, fragment, mass).with_cosmetic(true);
            let mut cosmetic_pos = pos;
            cosmetic_pos.append_translation_mut(&Translation::from(shift));
            body.set_position(cosmetic_pos);
            let _ = body.set_mode(BodyMode::Dynamic);
            let _ = body.set_gravity_enabled(true);

            let handle = world.insert_body(body);
            cosmetics.push(FragmentBody {
                body: handle,
                world_centroid: world_centroid + shift,
                cosmetic: true,
            });
        }

        bodies.extend(cosmetics);
        log::debug!(
            "Non-destructive split of {target:?}: {} cosmetic bodies.",
            bodies.len() - 1
        );

        Ok(SplitOutcome {
            target,
            plane: *plane,
            fragments: bodies,
            kept_marker: Some(target),
            identity_preserved: true,
            retired: None,
            original: Some((source.mesh().clone(), source.mass())),
        })
    }
}
