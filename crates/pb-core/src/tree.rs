//! Structural operations on the component tree.
//!
//! All functions work on a `Vec<Component>` list (the page roots or a
//! container's children) and recurse through `children`. Mutating helpers
//! return `false`/`None` when the target does not exist and leave the tree
//! untouched in that case.

use crate::id::ComponentId;
use crate::model::Component;
use serde::{Deserialize, Serialize};

/// A slot in the tree: position `index` inside `parent_id`'s children, or
/// inside the root list when `parent_id` is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default)]
    pub parent_id: Option<ComponentId>,
    pub index: usize,
}

/// Find a component anywhere in the tree.
pub fn find(nodes: &[Component], id: ComponentId) -> Option<&Component> {
    for node in nodes {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = node.children.as_deref().and_then(|kids| find(kids, id)) {
            return Some(found);
        }
    }
    None
}

pub fn find_mut(nodes: &mut [Component], id: ComponentId) -> Option<&mut Component> {
    for node in nodes {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = node.children.as_deref_mut().and_then(|kids| find_mut(kids, id)) {
            return Some(found);
        }
    }
    None
}

/// Location of `id`: its parent (if any) and index among its siblings.
pub fn find_location(nodes: &[Component], id: ComponentId) -> Option<Location> {
    fn walk(nodes: &[Component], id: ComponentId, parent_id: Option<ComponentId>) -> Option<Location> {
        for (index, node) in nodes.iter().enumerate() {
            if node.id == id {
                return Some(Location { parent_id, index });
            }
            if let Some(loc) = node
                .children
                .as_deref()
                .and_then(|kids| walk(kids, id, Some(node.id)))
            {
                return Some(loc);
            }
        }
        None
    }
    walk(nodes, id, None)
}

/// The sibling list identified by `parent_id`.
pub fn sibling_list(nodes: &[Component], parent_id: Option<ComponentId>) -> Option<&[Component]> {
    match parent_id {
        None => Some(nodes),
        Some(pid) => find(nodes, pid).map(Component::children),
    }
}

/// Mutable sibling list identified by `parent_id`. A container without a
/// `children` list gets an empty one.
pub fn sibling_list_mut(
    nodes: &mut Vec<Component>,
    parent_id: Option<ComponentId>,
) -> Option<&mut Vec<Component>> {
    match parent_id {
        None => Some(nodes),
        Some(pid) => find_mut(nodes, pid).map(|p| p.children.get_or_insert_with(Vec::new)),
    }
}

/// Remove `id` from the tree, returning it.
pub fn remove(nodes: &mut Vec<Component>, id: ComponentId) -> Option<Component> {
    let loc = find_location(nodes, id)?;
    let list = sibling_list_mut(nodes, loc.parent_id)?;
    Some(list.remove(loc.index))
}

/// Insert `component` at `at`. The index is clamped to the list length.
pub fn insert(nodes: &mut Vec<Component>, at: Location, component: Component) -> bool {
    let Some(list) = sibling_list_mut(nodes, at.parent_id) else {
        return false;
    };
    let index = at.index.min(list.len());
    list.insert(index, component);
    true
}

/// Move the component at `from` to `to`. Moving a node into its own
/// subtree, or into a container that does not exist, is rejected.
pub fn move_node(nodes: &mut Vec<Component>, from: Location, to: Location) -> bool {
    let Some(moving) = sibling_list(nodes, from.parent_id).and_then(|l| l.get(from.index)) else {
        return false;
    };
    if let Some(target_parent) = to.parent_id
        && (target_parent == moving.id
            || find(moving.children(), target_parent).is_some()
            || find(nodes, target_parent).is_none())
    {
        return false;
    }
    let Some(source) = sibling_list_mut(nodes, from.parent_id) else {
        return false;
    };
    let moving = source.remove(from.index);
    match sibling_list_mut(nodes, to.parent_id) {
        Some(target) => {
            let index = to.index.min(target.len());
            target.insert(index, moving);
            true
        }
        None => false,
    }
}

/// Every ID in the tree, depth-first.
pub fn collect_ids(nodes: &[Component]) -> Vec<ComponentId> {
    let mut out = Vec::new();
    fn walk(nodes: &[Component], out: &mut Vec<ComponentId>) {
        for node in nodes {
            out.push(node.id);
            walk(node.children(), out);
        }
    }
    walk(nodes, &mut out);
    out
}

/// Deep copy of `component` where the node and all its descendants get
/// freshly generated IDs (prefixed with their lowercased type).
pub fn with_fresh_ids(component: &Component) -> Component {
    let mut copy = component.clone();
    fn reassign(node: &mut Component) {
        node.id = ComponentId::with_prefix(&node.kind.to_lowercase());
        if let Some(kids) = node.children.as_mut() {
            kids.iter_mut().for_each(reassign);
        }
    }
    reassign(&mut copy);
    copy
}

/// Give container types that require a `children` list an empty one.
pub fn ensure_container_children(nodes: &mut [Component]) {
    for node in nodes {
        if matches!(node.kind.as_str(), "Section" | "MultiColumn") && node.children.is_none() {
            node.children = Some(Vec::new());
        }
        if let Some(kids) = node.children.as_mut() {
            ensure_container_children(kids);
        }
    }
}
