use stemcut::cut::{CutEngine, CutParams, CutResult, SplitMode};
use stemcut::dynamics::{ConstraintRole, PhysicsWorld};
use stemcut::math::{Point, Real, UnitVector, Vector};
use stemcut::structure::{reachable_from, PlantBuilder, StructureGraph};

fn engine(world: &mut PhysicsWorld, mode: SplitMode) -> CutEngine {
    let plant = PlantBuilder::new(Point::new(0.0, 2.0, 0.0))
        .stem(0.05, 1.0)
        .stem_segments(3)
        .leaf(0.15)
        .petal(0.45)
        .leaf(0.85)
        .build(world);
    let params = CutParams {
        split_mode: mode,
        ..CutParams::default()
    };
    CutEngine::new(plant, params)
}

fn num_protected(world: &PhysicsWorld) -> usize {
    world
        .constraints
        .iter()
        .filter(|(_, c)| c.role.is_protected())
        .count()
}

/// Checks what every successful cut must leave behind.
fn check_cut(world: &PhysicsWorld, engine: &CutEngine, result: &CutResult, protected: usize) {
    let crown = engine.plant().crown();
    let held = result.held.unwrap();
    let report = result.report.as_ref().unwrap();
    let connected = reachable_from(world, crown, |_| true);

    // One held piece, still hanging from the crown.
    assert!(connected.contains(&held), "{held:?} is cut off from the crown");
    assert!(report.kept.contains(&held));
    // Two fragments: one held, one severed.
    assert_eq!(result.severed.len(), 1, "{report:?}");
    assert!(report.corrected.is_empty(), "{report:?}");
    assert_eq!(num_protected(world), protected);

    for (handle, constraint) in world.constraints.iter() {
        if constraint.role == ConstraintRole::Attachment {
            let counterpart = constraint.body2().unwrap();
            assert!(connected.contains(&counterpart), "{handle:?}");
            assert!(!result.released.contains(&counterpart), "{handle:?}");
            assert!(!result.severed.contains(&counterpart), "{handle:?}");
        }
    }

    for body in result.severed.iter().chain(&result.released) {
        assert!(!connected.contains(body), "{body:?}");
        let body = world.body(*body).unwrap();
        assert!(body.is_dynamic());
        assert!(body.is_gravity_enabled());
    }
}

#[test]
fn sequential_oblique_cuts_across_joints() {
    let cuts = [
        (
            Point::new(0.0, 1.2456, 0.0),
            UnitVector::new_normalize(Vector::new(0.387, 0.825, -0.412)),
        ),
        (
            Point::new(0.0, 1.5995, 0.0),
            UnitVector::new_normalize(Vector::new(-0.288, 0.879, -0.380)),
        ),
    ];

    for mode in [SplitMode::NonDestructive, SplitMode::Destructive] {
        let mut world = PhysicsWorld::new();
        let mut engine = engine(&mut world, mode);
        let protected = num_protected(&world);

        for (point, normal) in &cuts {
            let result = engine.request_cut(&mut world, point, normal);
            assert!(!result.aborted, "{mode:?} at {point:?}: {:?}", result.abort);
            // Each cut lands on a stem segment and drops the ones below it.
            assert_eq!(result.released.len(), 1, "{mode:?} at {point:?}");
            check_cut(&world, &engine, &result, protected);
        }
    }
}

#[test]
fn non_destructive_cut_keeps_the_joint_to_the_crown() {
    let mut world = PhysicsWorld::new();
    let mut engine = engine(&mut world, SplitMode::NonDestructive);
    let protected = num_protected(&world);
    let segments = engine.plant().stem_segments().to_vec();
    let graph = StructureGraph::from_root(&world, engine.plant().crown());
    let (_, to_crown) = graph.parent(segments[1]).unwrap();

    // Just below the top of the middle segment, tilted so that the seat of
    // the joint above it ends up under the plane.
    let result = engine.request_cut(
        &mut world,
        &Point::new(0.04, 1.56, 0.0),
        &UnitVector::new_normalize(Vector::new(0.5, 1.0, 0.0)),
    );

    assert!(!result.aborted, "{:?}", result.abort);
    assert_eq!(result.held, Some(segments[1]));
    let joint = world.constraint(to_crown).unwrap();
    assert!(joint.touches(segments[1]));
    assert!(joint.touches(segments[0]));
    assert_eq!(result.released, vec![segments[2]]);
    check_cut(&world, &engine, &result, protected);
}

#[test]
fn random_oblique_cut_sequences() {
    let mut rng = oorandom::Rand32::new(7);

    for i in 0..30 {
        let mode = if i % 2 == 0 {
            SplitMode::NonDestructive
        } else {
            SplitMode::Destructive
        };
        let mut world = PhysicsWorld::new();
        let mut engine = engine(&mut world, mode);
        let protected = num_protected(&world);

        for _ in 0..3 {
            // The stem spans [0.9, 1.9].
            let y = 1.0 + rng.rand_float() as Real * 0.8;
            let tilt_x = rng.rand_float() as Real - 0.5;
            let tilt_z = rng.rand_float() as Real - 0.5;
            let point = Point::new(0.0, y, 0.0);
            let normal = UnitVector::new_normalize(Vector::new(tilt_x, 1.0, tilt_z));

            let num_bodies = world.bodies.len();
            let num_constraints = world.constraints.len();
            let result = engine.request_cut(&mut world, &point, &normal);

            if result.aborted {
                // Only cuts below what is left of the stem miss.
                assert_eq!(world.bodies.len(), num_bodies);
                assert_eq!(world.constraints.len(), num_constraints);
                continue;
            }

            check_cut(&world, &engine, &result, protected);
        }
    }
}
