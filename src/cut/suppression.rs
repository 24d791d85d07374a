use crate::dynamics::{BodyHandle, BreakThresholds, ConstraintHandle, PhysicsWorld};
use crate::structure::reachable_from;
use indexmap::IndexMap;

/// The outcome of closing a [`BreakSuppression`] transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SuppressionReport {
    /// Constraints whose thresholds were restored.
    pub restored: Vec<ConstraintHandle>,
    /// Constraints destroyed while the transaction was open.
    pub dropped: Vec<ConstraintHandle>,
}

/// Makes constraints unbreakable for the duration of a restructuring pass,
/// then restores their exact break thresholds.
///
/// Several roots can be suppressed within one transaction. A constraint is
/// snapshotted once, the first time it is reached, so that its restored value
/// is the one it had before the transaction opened.
#[derive(Debug, Default)]
pub struct BreakSuppression {
    snapshot: IndexMap<ConstraintHandle, BreakThresholds>,
    open: bool,
}

impl BreakSuppression {
    /// A closed transaction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Is a transaction open?
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The number of snapshotted constraints.
    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    /// Was nothing snapshotted yet?
    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    /// The thresholds `constraint` had before it was suppressed.
    pub fn snapshotted(&self, constraint: ConstraintHandle) -> Option<&BreakThresholds> {
        self.snapshot.get(&constraint)
    }

    /// Opens a transaction.
    pub fn begin(&mut self) {
        if self.open {
            log::warn!("Break suppression already open; accumulating.");
        }
        self.open = true;
    }

    /// Suppresses every constraint attached to a body reachable from `root`.
    ///
    /// Returns the number of newly snapshotted constraints.
    pub fn suppress_root(&mut self, world: &mut PhysicsWorld, root: BodyHandle) -> usize {
        if !self.open {
            log::warn!("Suppressing {root:?} outside of a transaction; opening one.");
            self.open = true;
        }

        let bodies = reachable_from(world, root, |_| true);
        let mut added = 0;

        for body in bodies {
            for handle in world.constraints.attached_to(body).to_vec() {
                added += self.suppress_constraint(world, handle) as usize;
            }
        }

        log::debug!("Suppressed {added} constraints reachable from {root:?}.");
        added
    }

    /// Suppresses one constraint. Returns `true` if it was newly snapshotted.
    pub fn suppress_constraint(&mut self, world: &mut PhysicsWorld, handle: ConstraintHandle) -> bool {
        let Some(constraint) = world.constraints.get_mut(handle) else {
            return false;
        };

        if self.snapshot.contains_key(&handle) {
            return false;
        }

        let _ = self.snapshot.insert(handle, constraint.thresholds);
        constraint.thresholds = BreakThresholds::UNBREAKABLE;
        true
    }

    /// Restores every snapshotted threshold and closes the transaction.
    ///
    /// Constraints destroyed in the meantime are dropped from the snapshot.
    pub fn end(&mut self, world: &mut PhysicsWorld) -> SuppressionReport {
        let mut report = SuppressionReport::default();

        for (handle, thresholds) in self.snapshot.drain(..) {
            match world.constraints.get_mut(handle) {
                Some(constraint) => {
                    constraint.thresholds = thresholds;
                    report.restored.push(handle);
                }
                None => report.dropped.push(handle),
            }
        }

        self.open = false;
        log::debug!(
            "Break suppression closed: {} restored, {} dropped.",
            report.restored.len(),
            report.dropped.len()
        );
        report
    }
}

impl Drop for BreakSuppression {
    fn drop(&mut self) {
        if self.open && !self.snapshot.is_empty() {
            log::error!(
                "Break suppression dropped while open: {} constraints left unbreakable.",
                self.snapshot.len()
            );
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dynamics::ConstraintLoad;
    use crate::math::Point;
    use crate::structure::PlantBuilder;

    #[test]
    fn thresholds_round_trip() {
        let mut world = PhysicsWorld::new();
        let plant = PlantBuilder::new(Point::new(0.0, 2.0, 0.0))
            .stem_segments(2)
            .leaf(0.3)
            .build(&mut world);
        let before: Vec<_> = world
            .constraints
            .iter()
            .map(|(h, c)| (h, c.thresholds))
            .collect();

        let mut suppression = BreakSuppression::new();
        suppression.begin();
        assert_eq!(suppression.suppress_root(&mut world, plant.crown()), before.len());
        assert!(world
            .constraints
            .iter()
            .all(|(_, c)| c.thresholds.is_unbreakable()));

        // Huge loads do not break anything while suppressed.
        let loads: Vec<_> = before
            .iter()
            .map(|(h, _)| ConstraintLoad {
                constraint: *h,
                force: 1.0e9,
                torque: 1.0e9,
            })
            .collect();
        assert!(world.apply_constraint_loads(&loads).is_empty());

        let report = suppression.end(&mut world);
        assert_eq!(report.restored.len(), before.len());
        for (handle, thresholds) in before {
            assert_eq!(world.constraint(handle).unwrap().thresholds, thresholds);
        }
        assert!(!suppression.is_open());
    }

    #[test]
    fn destroyed_constraints_are_dropped() {
        let mut world = PhysicsWorld::new();
        let plant = PlantBuilder::new(Point::new(0.0, 2.0, 0.0))
            .leaf(0.3)
            .build(&mut world);
        let leaf = plant.leaves()[0];
        let attachment = world.constraints.attached_to(leaf)[0];

        let mut suppression = BreakSuppression::new();
        suppression.begin();
        let _ = suppression.suppress_root(&mut world, plant.crown());
        let _ = world.remove_constraint(attachment);
        let report = suppression.end(&mut world);

        assert_eq!(report.dropped, vec![attachment]);
        assert!(suppression.is_empty());
    }

    #[test]
    fn first_snapshot_wins_across_roots() {
        let mut world = PhysicsWorld::new();
        let a = PlantBuilder::new(Point::new(0.0, 2.0, 0.0)).build(&mut world);
        let b = PlantBuilder::new(Point::new(3.0, 2.0, 0.0)).build(&mut world);
        let joint = world.constraints.attached_to(a.crown())[0];
        let original = world.constraint(joint).unwrap().thresholds;

        let mut suppression = BreakSuppression::new();
        suppression.begin();
        assert_eq!(suppression.suppress_root(&mut world, a.crown()), 1);
        // Reaching the same constraint again does not overwrite the snapshot.
        assert_eq!(suppression.suppress_root(&mut world, a.crown()), 0);
        assert_eq!(suppression.suppress_root(&mut world, b.crown()), 1);
        assert_eq!(suppression.snapshotted(joint), Some(&original));

        let _ = suppression.end(&mut world);
        assert_eq!(world.constraint(joint).unwrap().thresholds, original);
    }
}
