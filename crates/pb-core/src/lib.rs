pub mod decorate;
pub mod id;
pub mod length;
pub mod model;
pub mod style;
pub mod tree;

pub use decorate::{DecoratedNode, decorate, decorate_tree, effective_locked, is_hidden_for_viewport};
pub use id::ComponentId;
pub use length::{Length, Unit, UnitContext};
pub use model::*;
pub use style::{PlacementIntent, StyleDescriptor, compute_block_style};
pub use tree::Location;
