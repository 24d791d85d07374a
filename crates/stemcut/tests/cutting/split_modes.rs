use approx::assert_relative_eq;
use stemcut::cut::{CutEngine, CutParams, CutResult, HeldSelection, SplitMode};
use stemcut::dynamics::{BodyHandle, PhysicsWorld};
use stemcut::math::{Point, Real, Vector};
use stemcut::structure::PlantBuilder;

/// Cuts a single-segment plant at height `y`. Also returns the stem handle
/// and the body count before the cut.
fn cut_plant(mode: SplitMode, y: Real) -> (PhysicsWorld, BodyHandle, usize, CutResult) {
    let mut world = PhysicsWorld::new();
    let plant = PlantBuilder::new(Point::new(0.0, 2.0, 0.0)).build(&mut world);
    let target = plant.stem_segments()[0];
    let num_bodies = world.bodies.len();
    let params = CutParams {
        split_mode: mode,
        ..CutParams::default()
    };
    let mut engine = CutEngine::new(plant, params);
    let result = engine.request_cut(&mut world, &Point::new(0.0, y, 0.0), &Vector::y_axis());
    (world, target, num_bodies, result)
}

#[test]
fn destructive_split_replaces_the_target() {
    let (world, target, num_bodies, result) = cut_plant(SplitMode::Destructive, 1.3);

    assert!(!result.aborted);
    assert!(world.body(target).is_err());
    assert_ne!(result.held, Some(target));
    assert_eq!(result.report.unwrap().selection, HeldSelection::Connected);
    // Two fragments and the anchor marker replace the target.
    assert_eq!(world.bodies.len(), num_bodies + 2);
}

#[test]
fn non_destructive_split_keeps_the_target() {
    let (world, target, num_bodies, result) = cut_plant(SplitMode::NonDestructive, 1.3);

    assert!(!result.aborted);
    assert_eq!(result.held, Some(target));
    assert_eq!(result.report.unwrap().selection, HeldSelection::Marker);

    let cosmetic = world.body(result.severed[0]).unwrap();
    assert!(cosmetic.is_cosmetic());
    assert!(cosmetic.is_gravity_enabled());
    assert!(cosmetic.world_center_of_mass().y < 1.3);

    // The target shrank to the part above the cut.
    let kept = world.body(target).unwrap();
    assert!(kept.world_center_of_mass().y > 1.3);
    assert!(kept.mass() > cosmetic.mass());
    // One cosmetic piece and the anchor marker.
    assert_eq!(world.bodies.len(), num_bodies + 2);
}

#[test]
fn both_modes_split_the_mass_the_same_way() {
    let (world_a, _, _, destructive) = cut_plant(SplitMode::Destructive, 1.5);
    let (world_b, _, _, non_destructive) = cut_plant(SplitMode::NonDestructive, 1.5);

    let held_a = world_a.body(destructive.held.unwrap()).unwrap().mass();
    let held_b = world_b.body(non_destructive.held.unwrap()).unwrap().mass();
    let severed_a = world_a.body(destructive.severed[0]).unwrap().mass();
    let severed_b = world_b.body(non_destructive.severed[0]).unwrap().mass();

    assert_relative_eq!(held_a, held_b, epsilon = 1.0e-4);
    assert_relative_eq!(severed_a, severed_b, epsilon = 1.0e-4);
    assert_relative_eq!(held_a / severed_a, 4.0 / 6.0, epsilon = 1.0e-3);
}
