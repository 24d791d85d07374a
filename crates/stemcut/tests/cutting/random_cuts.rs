use stemcut::cut::{CutEngine, CutParams, SplitMode};
use stemcut::dynamics::{ConstraintRole, PhysicsWorld};
use stemcut::math::{Point, Real, Vector};
use stemcut::structure::PlantBuilder;

#[test]
fn random_cut_heights_keep_the_plant_coherent() {
    let mut rng = oorandom::Rand32::new(42);

    for i in 0..40 {
        let segments = 1 + i % 3;
        let mut world = PhysicsWorld::new();
        let plant = PlantBuilder::new(Point::new(0.0, 2.0, 0.0))
            .stem(0.05, 1.0)
            .stem_segments(segments)
            .leaf(0.15)
            .petal(0.45)
            .leaf(0.85)
            .build(&mut world);
        let crown = plant.crown();
        let num_bodies = world.bodies.len();
        let num_protected = count_protected(&world);
        let mode = if i % 2 == 0 {
            SplitMode::Destructive
        } else {
            SplitMode::NonDestructive
        };
        let params = CutParams {
            split_mode: mode,
            ..CutParams::default()
        };
        let mut engine = CutEngine::new(plant, params);

        // The stem spans [0.9, 1.9].
        let y = 0.92 + rng.rand_float() as Real * 0.96;
        let segment_length = 1.0 / segments as Real;
        let near_joint =
            (1..segments).any(|k| (y - (1.9 - k as Real * segment_length)).abs() < 1.0e-3);
        if near_joint {
            continue;
        }

        let result = engine.request_cut(&mut world, &Point::new(0.0, y, 0.0), &Vector::y_axis());
        assert!(!result.aborted, "{mode:?} at {y}: {:?}", result.abort);
        assert!(world.bodies.len() > num_bodies);

        let held = result.held.unwrap();
        let report = result.report.as_ref().unwrap();
        assert_eq!(result.severed.len(), 1, "{mode:?} at {y}");
        assert!(report.kept.contains(&held));
        assert!(report.kept.contains(&crown));
        assert_eq!(count_protected(&world), num_protected, "{mode:?} at {y}");

        let held_center = world.body(held).unwrap().world_center_of_mass();
        let severed_center = world.body(result.severed[0]).unwrap().world_center_of_mass();
        assert!(held_center.y > y && severed_center.y < y, "{mode:?} at {y}");
        assert!(
            na::distance(&held_center, &Point::new(0.0, 2.0, 0.0))
                < na::distance(&severed_center, &Point::new(0.0, 2.0, 0.0))
        );

        for (handle, constraint) in world.constraints.iter() {
            if constraint.role == ConstraintRole::Attachment {
                let counterpart = constraint.body2().unwrap();
                assert!(report.kept.contains(&counterpart), "{handle:?} at {y}");
            }
        }
        for body in report.severed.iter().chain(&report.released) {
            assert!(world.body(*body).unwrap().is_gravity_enabled());
        }
    }
}

fn count_protected(world: &PhysicsWorld) -> usize {
    world
        .constraints
        .iter()
        .filter(|(_, c)| c.role.is_protected())
        .count()
}
