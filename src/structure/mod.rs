//! Plants as articulated structures: part tags, authoring, and the rooted
//! constraint graph recomputed whenever a cut needs it.

pub use self::classification::{AttachmentState, PartClassification, PartCondition, PartKind};
pub use self::graph::{reachable_from, GraphEdge, StructureGraph};
pub use self::plant::{Plant, PlantBuilder};

mod classification;
mod graph;
mod plant;
