use stemcut::cut::{CutEngine, CutParams, CutRejection, NullFeedback, PressEvent, Time};
use stemcut::dynamics::PhysicsWorld;
use stemcut::math::{Isometry, Point};
use stemcut::structure::PlantBuilder;

fn press_at(time: Time) -> PressEvent {
    PressEvent {
        time,
        tool_pose: Isometry::translation(0.0, 1.4, 0.0),
        pointer_over_ui: false,
    }
}

#[test]
fn equip_press_does_not_cut() {
    let mut world = PhysicsWorld::new();
    let plant = PlantBuilder::new(Point::new(0.0, 2.0, 0.0)).build(&mut world);
    let mut engine = CutEngine::new(plant, CutParams::default());
    let num_bodies = world.bodies.len();

    // The press that equips the tool is still held down.
    engine.set_tool_armed(true, 0.0, true);
    assert_eq!(
        engine
            .attempt_cut(&mut world, &press_at(0.0), &mut NullFeedback)
            .err(),
        Some(CutRejection::NotArmed)
    );

    // Holding past the arm delay is not enough.
    engine.update(0.1, true);
    engine.update(0.4, true);
    assert!(!engine.is_armed());
    assert!(engine
        .attempt_cut(&mut world, &press_at(0.4), &mut NullFeedback)
        .is_err());
    assert_eq!(world.bodies.len(), num_bodies);

    // Releasing once arms the tool.
    engine.update(0.5, false);
    assert!(engine.is_armed());
    let result = engine
        .attempt_cut(&mut world, &press_at(0.6), &mut NullFeedback)
        .unwrap();
    assert!(!result.aborted);
    assert_eq!(result.severed.len(), 1);
}

#[test]
fn ui_presses_and_unequipped_tools_never_cut() {
    let mut world = PhysicsWorld::new();
    let plant = PlantBuilder::new(Point::new(0.0, 2.0, 0.0)).build(&mut world);
    let mut engine = CutEngine::new(plant, CutParams::default());

    engine.set_tool_armed(true, 0.0, false);
    engine.update(0.3, false);
    assert!(engine.is_armed());

    let over_ui = PressEvent {
        pointer_over_ui: true,
        ..press_at(0.3)
    };
    assert_eq!(
        engine
            .attempt_cut(&mut world, &over_ui, &mut NullFeedback)
            .err(),
        Some(CutRejection::PointerOverUi)
    );

    engine.set_tool_armed(false, 0.4, false);
    assert_eq!(
        engine
            .attempt_cut(&mut world, &press_at(0.5), &mut NullFeedback)
            .err(),
        Some(CutRejection::NotArmed)
    );
    assert!(engine.despawn_queue().is_empty());
}
