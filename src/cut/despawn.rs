use crate::cut::{Time, VisibleRegion};
use crate::dynamics::{BodyHandle, PhysicsWorld};
use indexmap::IndexMap;

/// When a severed body is removed from the world.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DespawnPolicy {
    /// The body is removed at this time.
    pub deadline: Time,
    /// The body is removed as soon as its center of mass leaves this region.
    pub visible_region: Option<VisibleRegion>,
}

/// Finite lifetimes of severed pieces.
#[derive(Clone, Debug, Default)]
pub struct DespawnQueue {
    entries: IndexMap<BodyHandle, DespawnPolicy>,
}

impl DespawnQueue {
    /// An empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of bodies waiting for removal.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Is the queue empty?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The policy registered for `body`.
    pub fn policy(&self, body: BodyHandle) -> Option<&DespawnPolicy> {
        self.entries.get(&body)
    }

    /// Schedules the removal of `body` after `lifetime`.
    ///
    /// Registering a body twice keeps the earliest deadline.
    pub fn register(
        &mut self,
        body: BodyHandle,
        now: Time,
        lifetime: Time,
        visible_region: Option<VisibleRegion>,
    ) {
        let deadline = now + lifetime;
        let entry = self.entries.entry(body).or_insert(DespawnPolicy {
            deadline,
            visible_region,
        });
        entry.deadline = entry.deadline.min(deadline);
    }

    /// Forgets `body` without removing it.
    pub fn cancel(&mut self, body: BodyHandle) -> bool {
        self.entries.shift_remove(&body).is_some()
    }

    /// Removes every expired body from the world and returns them.
    pub fn process(&mut self, world: &mut PhysicsWorld, now: Time) -> Vec<BodyHandle> {
        let mut removed = vec![];

        self.entries.retain(|body, policy| {
            let Some(b) = world.bodies.get(*body) else {
                return false;
            };
            let outside = policy
                .visible_region
                .is_some_and(|region| !region.contains_point(&b.world_center_of_mass()));

            if now >= policy.deadline || outside {
                removed.push(*body);
                false
            } else {
                true
            }
        });

        for body in &removed {
            let _ = world.remove_body(*body);
        }
        if !removed.is_empty() {
            log::debug!("Despawned {} severed bodies.", removed.len());
        }

        removed
    }
}
