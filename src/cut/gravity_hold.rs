use crate::cut::Time;
use crate::dynamics::{BodyHandle, PhysicsWorld};
use indexmap::IndexMap;

/// Temporarily disables gravity on bodies, typically leaves that were just
/// redirected, so that they settle on their new attachment.
///
/// Gravity is restored at the deadline only if the body is not kinematic at
/// that time.
#[derive(Clone, Debug, Default)]
pub struct GravityHolds {
    deadlines: IndexMap<BodyHandle, Time>,
}

impl GravityHolds {
    /// No holds.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of held bodies.
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    /// Is no body held?
    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    /// Is gravity currently held off for `body`?
    pub fn is_held(&self, body: BodyHandle) -> bool {
        self.deadlines.contains_key(&body)
    }

    /// Disables gravity on `body` until `now + duration`.
    ///
    /// Holding a body again extends its deadline.
    pub fn hold(&mut self, world: &mut PhysicsWorld, body: BodyHandle, now: Time, duration: Time) {
        let Some(b) = world.bodies.get_mut(body) else {
            return;
        };
        let _ = b.set_gravity_enabled(false);

        let deadline = now + duration;
        let entry = self.deadlines.entry(body).or_insert(deadline);
        *entry = entry.max(deadline);
    }

    /// Restores gravity on every body whose hold expired. Returns the bodies
    /// whose gravity was restored.
    pub fn process(&mut self, world: &mut PhysicsWorld, now: Time) -> Vec<BodyHandle> {
        let mut restored = vec![];

        self.deadlines.retain(|body, deadline| {
            if now < *deadline {
                return true;
            }

            match world.bodies.get_mut(*body) {
                Some(b) if !b.is_kinematic() => {
                    let _ = b.set_gravity_enabled(true);
                    restored.push(*body);
                }
                Some(_) => log::debug!("{body:?} became kinematic; gravity stays off."),
                None => {}
            }
            false
        });

        restored
    }
}
