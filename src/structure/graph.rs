use crate::dynamics::{BodyHandle, ConstraintHandle, ConstraintRole, PhysicsWorld};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// One constraint of a [`StructureGraph`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GraphEdge {
    /// The constraint.
    pub constraint: ConstraintHandle,
    /// The owning body of the constraint.
    pub body1: BodyHandle,
    /// The connected body of the constraint.
    pub body2: BodyHandle,
    /// The structural role of the constraint.
    pub role: ConstraintRole,
}

/// The constraints of one plant, as reached by a traversal starting at its
/// crown.
///
/// This is a snapshot: it is recomputed whenever needed rather than kept in
/// sync with the world.
#[derive(Clone, Debug)]
pub struct StructureGraph {
    root: BodyHandle,
    bodies: BTreeSet<BodyHandle>,
    edges: BTreeMap<ConstraintHandle, GraphEdge>,
    parents: BTreeMap<BodyHandle, (BodyHandle, ConstraintHandle)>,
}

impl StructureGraph {
    /// Traverses the structural constraints of `world` breadth-first, starting
    /// at `root`.
    ///
    /// Anchor constraints and constraints to the fixed world frame are not
    /// part of the structure.
    pub fn from_root(world: &PhysicsWorld, root: BodyHandle) -> Self {
        let mut bodies = BTreeSet::new();
        let mut edges = BTreeMap::new();
        let mut parents = BTreeMap::new();
        let mut queue = VecDeque::new();

        if world.bodies.contains(root) {
            let _ = bodies.insert(root);
            queue.push_back(root);
        }

        while let Some(body) = queue.pop_front() {
            for handle in world.constraints.attached_to(body) {
                let Some(constraint) = world.constraints.get(*handle) else {
                    continue;
                };
                if !constraint.role.is_structural() {
                    continue;
                }
                let (Some(Some(other)), Some(body2)) = (constraint.other(body), constraint.body2())
                else {
                    continue;
                };
                if !world.bodies.contains(other) {
                    continue;
                }

                let _ = edges.entry(*handle).or_insert(GraphEdge {
                    constraint: *handle,
                    body1: constraint.body1(),
                    body2,
                    role: constraint.role,
                });

                if bodies.insert(other) {
                    let _ = parents.insert(other, (body, *handle));
                    queue.push_back(other);
                }
            }
        }

        Self {
            root,
            bodies,
            edges,
            parents,
        }
    }

    /// The crown this graph was traversed from.
    pub fn root(&self) -> BodyHandle {
        self.root
    }

    /// All bodies reached from the root, in handle order.
    pub fn bodies(&self) -> impl Iterator<Item = BodyHandle> + '_ {
        self.bodies.iter().copied()
    }

    /// The number of bodies reached from the root.
    pub fn num_bodies(&self) -> usize {
        self.bodies.len()
    }

    /// Was `body` reached from the root?
    pub fn contains(&self, body: BodyHandle) -> bool {
        self.bodies.contains(&body)
    }

    /// All edges, in constraint-handle order.
    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> + '_ {
        self.edges.values()
    }

    /// The number of edges.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// The edge for `constraint`, if it is part of this graph.
    pub fn edge(&self, constraint: ConstraintHandle) -> Option<&GraphEdge> {
        self.edges.get(&constraint)
    }

    /// The body through which `body` was first reached, and the constraint
    /// linking them. `None` for the root or unreached bodies.
    pub fn parent(&self, body: BodyHandle) -> Option<(BodyHandle, ConstraintHandle)> {
        self.parents.get(&body).copied()
    }

    /// Is `body` directly attached to the root by one constraint?
    pub fn is_parented_to_root(&self, body: BodyHandle) -> bool {
        self.parents
            .get(&body)
            .map(|(parent, _)| *parent == self.root)
            .unwrap_or(false)
    }

    /// A connected graph is a tree if it has exactly one edge fewer than
    /// bodies.
    pub fn is_tree(&self) -> bool {
        self.edges.len() + 1 == self.bodies.len()
    }

    /// The number of protected constraints (leaf/petal attachments and crown
    /// region joints).
    pub fn num_protected(&self) -> usize {
        self.edges.values().filter(|e| e.role.is_protected()).count()
    }
}

/// The set of bodies reachable from `root` through structural constraints
/// accepted by `follow`.
pub fn reachable_from(
    world: &PhysicsWorld,
    root: BodyHandle,
    mut follow: impl FnMut(ConstraintHandle) -> bool,
) -> BTreeSet<BodyHandle> {
    let mut reached = BTreeSet::new();
    let mut queue = VecDeque::new();

    if world.bodies.contains(root) {
        let _ = reached.insert(root);
        queue.push_back(root);
    }

    while let Some(body) = queue.pop_front() {
        for handle in world.constraints.attached_to(body) {
            let Some(constraint) = world.constraints.get(*handle) else {
                continue;
            };
            if !constraint.role.is_structural() || !follow(*handle) {
                continue;
            }
            if let Some(Some(other)) = constraint.other(body) {
                if world.bodies.contains(other) && reached.insert(other) {
                    queue.push_back(other);
                }
            }
        }
    }

    reached
}
