use approx::assert_relative_eq;
use stemcut::cut::{CutAbort, CutEngine, CutParams, SplitMode};
use stemcut::dynamics::{Endpoint, PhysicsWorld};
use stemcut::math::{Point, Vector};
use stemcut::structure::{PlantBuilder, StructureGraph};

#[test]
fn straight_stem_cut_mid_length() {
    let mut world = PhysicsWorld::new();
    let plant = PlantBuilder::new(Point::new(0.0, 2.0, 0.0))
        .stem(0.05, 1.0)
        .build(&mut world);
    let crown = plant.crown();
    let mut engine = CutEngine::new(plant, CutParams::default());

    let cut_point = Point::new(0.0, 1.4, 0.0);
    let result = engine.request_cut(&mut world, &cut_point, &Vector::y_axis());

    assert!(!result.aborted);
    assert_eq!(result.severed.len(), 1);
    assert!(result.released.is_empty());

    let held = result.held.unwrap();
    let held_body = world.body(held).unwrap();
    assert!(!held_body.is_gravity_enabled());
    assert!(held_body.world_center_of_mass().y > 1.4);
    assert!(engine.anchors().is_anchored(held));
    assert_relative_eq!(
        engine.anchors().target_point(&world, held).unwrap(),
        cut_point,
        epsilon = 1.0e-5
    );

    let severed = world.body(result.severed[0]).unwrap();
    assert!(severed.is_dynamic());
    assert!(severed.is_gravity_enabled());
    assert!(severed.world_center_of_mass().y < 1.4);

    // The crown joint now holds the upper piece.
    let graph = StructureGraph::from_root(&world, crown);
    assert!(graph.contains(held));
    assert!(!graph.contains(result.severed[0]));
}

#[test]
fn leaf_above_the_cut_stays_on_the_held_side() {
    let mut world = PhysicsWorld::new();
    let plant = PlantBuilder::new(Point::new(0.0, 2.0, 0.0))
        .leaf(0.2)
        .build(&mut world);
    let leaf = plant.leaves()[0];
    let attachment = world.constraints.attached_to(leaf)[0];
    let anchor_before = world.world_anchor(attachment, Endpoint::Second).unwrap();
    let mut engine = CutEngine::new(plant, CutParams::default());

    let result = engine.request_cut(&mut world, &Point::new(0.0, 1.2, 0.0), &Vector::y_axis());
    let report = result.report.unwrap();

    let constraint = world.constraint(attachment).unwrap();
    assert_eq!(constraint.body2(), result.held);
    assert!(!report.redirected.contains(&attachment));
    assert!(report.kept.contains(&leaf));
    assert!(!engine.gravity_holds().is_held(leaf));
    assert_relative_eq!(
        world.world_anchor(attachment, Endpoint::Second).unwrap(),
        anchor_before,
        epsilon = 1.0e-5
    );
}

#[test]
fn leaf_above_the_non_destructive_cut_is_untouched() {
    let mut world = PhysicsWorld::new();
    let plant = PlantBuilder::new(Point::new(0.0, 2.0, 0.0))
        .leaf(0.2)
        .build(&mut world);
    let leaf = plant.leaves()[0];
    let target = plant.stem_segments()[0];
    let attachment = world.constraints.attached_to(leaf)[0];
    let before = world.constraint(attachment).unwrap().clone();
    let params = CutParams {
        split_mode: SplitMode::NonDestructive,
        ..CutParams::default()
    };
    let mut engine = CutEngine::new(plant, params);

    let result = engine.request_cut(&mut world, &Point::new(0.0, 1.2, 0.0), &Vector::y_axis());

    assert_eq!(result.held, Some(target));
    assert_eq!(world.constraint(attachment).unwrap(), &before);
}

#[test]
fn leaf_below_the_cut_is_redirected_to_the_held_piece() {
    let mut world = PhysicsWorld::new();
    let plant = PlantBuilder::new(Point::new(0.0, 2.0, 0.0))
        .leaf(0.8)
        .build(&mut world);
    let leaf = plant.leaves()[0];
    let attachment = world.constraints.attached_to(leaf)[0];
    let mut engine = CutEngine::new(plant, CutParams::default());

    let result = engine.request_cut(&mut world, &Point::new(0.0, 1.5, 0.0), &Vector::y_axis());
    let report = result.report.as_ref().unwrap();

    let constraint = world.constraint(attachment).unwrap();
    assert_eq!(constraint.body1(), leaf);
    assert_eq!(constraint.body2(), result.held);
    assert!(!result.severed.contains(&leaf));
    assert!(!result.released.contains(&leaf));
    assert_eq!(report.redirected, vec![attachment]);

    // Re-seated on the cut face of the held piece.
    let seat = world.world_anchor(attachment, Endpoint::Second).unwrap();
    assert_relative_eq!(seat.y, 1.5, epsilon = 1.0e-4);

    // The leaf settles without gravity for a moment.
    assert!(engine.gravity_holds().is_held(leaf));
    assert!(!world.body(leaf).unwrap().is_gravity_enabled());
    for _ in 0..31 {
        engine.fixed_step(&mut world, 1.0 / 60.0);
    }
    assert!(world.body(leaf).unwrap().is_gravity_enabled());
}

#[test]
fn plane_missing_the_stem_aborts_without_changes() {
    let mut world = PhysicsWorld::new();
    let plant = PlantBuilder::new(Point::new(0.0, 2.0, 0.0))
        .leaf(0.5)
        .build(&mut world);
    let crown = plant.crown();
    let mut engine = CutEngine::new(plant, CutParams::default());

    let num_bodies = world.bodies.len();
    let num_constraints = world.constraints.len();
    let graph = StructureGraph::from_root(&world, crown);

    // A vertical plane running beside the stem.
    let result = engine.request_cut(&mut world, &Point::new(0.08, 1.5, 0.0), &Vector::x_axis());

    assert!(result.aborted);
    assert_eq!(result.abort, Some(CutAbort::DegenerateSplit { fragments: 1 }));
    assert!(result.held.is_none());
    assert_eq!(world.bodies.len(), num_bodies);
    assert_eq!(world.constraints.len(), num_constraints);

    let after = StructureGraph::from_root(&world, crown);
    assert_eq!(after.num_bodies(), graph.num_bodies());
    assert_eq!(after.num_edges(), graph.num_edges());
    assert!(engine.anchors().is_empty());
    assert!(engine.despawn_queue().is_empty());
}

#[test]
fn cut_far_from_the_plant_has_no_target() {
    let mut world = PhysicsWorld::new();
    let plant = PlantBuilder::new(Point::new(0.0, 2.0, 0.0)).build(&mut world);
    let mut engine = CutEngine::new(plant, CutParams::default());
    let num_bodies = world.bodies.len();

    let result = engine.request_cut(&mut world, &Point::new(3.0, 1.5, 0.0), &Vector::y_axis());

    assert!(result.aborted);
    assert_eq!(result.abort, Some(CutAbort::NoTarget));
    assert_eq!(world.bodies.len(), num_bodies);
}
