use std::collections::HashMap;

use stemcut::cut::{CutEngine, CutParams, SplitMode};
use stemcut::dynamics::{BreakThresholds, ConstraintHandle, ConstraintRole, PhysicsWorld};
use stemcut::math::{Point, Vector};
use stemcut::structure::{Plant, PlantBuilder};

fn leafy_plant(world: &mut PhysicsWorld) -> Plant {
    PlantBuilder::new(Point::new(0.0, 2.0, 0.0))
        .stem(0.05, 1.2)
        .stem_segments(3)
        .leaf(0.1)
        .leaf(0.5)
        .petal(0.7)
        .leaf(1.0)
        .build(world)
}

fn num_protected(world: &PhysicsWorld) -> usize {
    world
        .constraints
        .iter()
        .filter(|(_, c)| c.role.is_protected())
        .count()
}

fn thresholds(world: &PhysicsWorld) -> HashMap<ConstraintHandle, BreakThresholds> {
    world
        .constraints
        .iter()
        .map(|(h, c)| (h, c.thresholds))
        .collect()
}

#[test]
fn cuts_preserve_protected_constraints() {
    for mode in [SplitMode::Destructive, SplitMode::NonDestructive] {
        for y in [1.75, 1.3, 0.95] {
            let mut world = PhysicsWorld::new();
            let plant = leafy_plant(&mut world);
            let before = num_protected(&world);
            let params = CutParams {
                split_mode: mode,
                ..CutParams::default()
            };
            let mut engine = CutEngine::new(plant, params);

            let result = engine.request_cut(&mut world, &Point::new(0.0, y, 0.0), &Vector::y_axis());

            assert!(!result.aborted, "{mode:?} at {y}: {:?}", result.abort);
            assert_eq!(num_protected(&world), before, "{mode:?} at {y}");
        }
    }
}

#[test]
fn every_attachment_hangs_from_the_kept_structure() {
    for mode in [SplitMode::Destructive, SplitMode::NonDestructive] {
        let mut world = PhysicsWorld::new();
        let plant = leafy_plant(&mut world);
        let foliage: Vec<_> = plant.leaves().iter().chain(plant.petals()).copied().collect();
        let params = CutParams {
            split_mode: mode,
            ..CutParams::default()
        };
        let mut engine = CutEngine::new(plant, params);

        // Cut through the middle segment: the bottom segment falls.
        let result = engine.request_cut(&mut world, &Point::new(0.0, 1.3, 0.0), &Vector::y_axis());
        let report = result.report.unwrap();
        assert_eq!(result.released.len(), 1, "{mode:?}");

        for part in foliage {
            assert!(report.kept.contains(&part), "{mode:?}: {part:?} fell");
            let attachments: Vec<_> = world
                .constraints
                .attached_to(part)
                .iter()
                .filter(|h| world.constraint(**h).unwrap().role == ConstraintRole::Attachment)
                .copied()
                .collect();
            assert_eq!(attachments.len(), 1);

            let counterpart = world.constraint(attachments[0]).unwrap().body2().unwrap();
            assert!(report.kept.contains(&counterpart), "{mode:?}: {part:?}");
            assert!(!result.severed.contains(&counterpart));
            assert!(!result.released.contains(&counterpart));
        }
    }
}

#[test]
fn break_thresholds_are_restored_after_the_cut() {
    let mut world = PhysicsWorld::new();
    let plant = leafy_plant(&mut world);
    let before = thresholds(&world);
    let mut engine = CutEngine::new(plant, CutParams::default());

    let result = engine.request_cut(&mut world, &Point::new(0.0, 1.6, 0.0), &Vector::y_axis());
    assert!(!result.aborted);

    let mut survivors = 0;
    for (handle, thresholds) in &before {
        if let Ok(constraint) = world.constraint(*handle) {
            assert_eq!(&constraint.thresholds, thresholds, "{handle:?}");
            survivors += 1;
        }
    }
    assert_eq!(survivors, before.len());
}

#[test]
fn held_piece_is_the_only_fragment_left_unreleased() {
    let mut world = PhysicsWorld::new();
    let plant = leafy_plant(&mut world);
    let mut engine = CutEngine::new(plant, CutParams::default());

    let result = engine.request_cut(&mut world, &Point::new(0.0, 1.6, 0.0), &Vector::y_axis());
    let report = result.report.unwrap();
    let held = result.held.unwrap();

    assert_eq!(report.severed.len(), 1);
    assert!(!report.severed.contains(&held));
    assert!(!world.body(held).unwrap().is_gravity_enabled());
    for body in report.severed.iter().chain(&report.released) {
        let body = world.body(*body).unwrap();
        assert!(body.is_dynamic());
        assert!(body.is_gravity_enabled());
        assert!(!body.is_sleeping());
    }
}

#[test]
fn repeating_a_cut_changes_nothing() {
    let mut world = PhysicsWorld::new();
    let plant = leafy_plant(&mut world);
    let mut engine = CutEngine::new(plant, CutParams::default());
    let point = Point::new(0.0, 1.6, 0.0);

    let first = engine.request_cut(&mut world, &point, &Vector::y_axis());
    assert!(!first.aborted);
    let num_bodies = world.bodies.len();
    let num_constraints = world.constraints.len();
    let num_anchors = engine.anchors().len();

    // The held piece ends exactly on the plane: nothing is left to cut.
    let second = engine.request_cut(&mut world, &point, &Vector::y_axis());
    assert!(second.aborted);
    assert_eq!(world.bodies.len(), num_bodies);
    assert_eq!(world.constraints.len(), num_constraints);
    assert_eq!(engine.anchors().len(), num_anchors);
    assert!(engine.anchors().is_anchored(first.held.unwrap()));
}
