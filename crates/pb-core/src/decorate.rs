//! Viewport decoration: projects editor-only metadata onto the page tree.
//!
//! Decoration is a pure function of `(tree, editor map, viewport)`. It never
//! mutates its input and never strips data: a component without an editor
//! entry comes back with its own values untouched.

use crate::id::ComponentId;
use crate::model::{Component, EditorMap, StackStrategy, Viewport};

/// A component with its editor overrides applied for one viewport.
///
/// Same shape as `Component`, so hosts render it with the same code.
pub type DecoratedNode = Component;

/// Apply the editor entry for `node.id` to a single node.
///
/// `name`, `locked` and `zIndex` are overlaid only when the entry sets them.
/// `hidden` is true when either the entry hides the node in `viewport` or the
/// node's own static flag is set. Children are copied as-is; use
/// [`decorate_tree`] to decorate a whole subtree.
pub fn decorate(node: &Component, editor: &EditorMap, viewport: Viewport) -> DecoratedNode {
    overlay(node, editor, viewport, node.children.clone())
}

/// Decorate every node of `nodes`, recursing into children.
pub fn decorate_tree(nodes: &[Component], editor: &EditorMap, viewport: Viewport) -> Vec<DecoratedNode> {
    nodes
        .iter()
        .map(|node| {
            let children = node
                .children
                .as_ref()
                .map(|kids| decorate_tree(kids, editor, viewport));
            overlay(node, editor, viewport, children)
        })
        .collect()
}

fn overlay(
    node: &Component,
    editor: &EditorMap,
    viewport: Viewport,
    children: Option<Vec<Component>>,
) -> DecoratedNode {
    let mut out = Component {
        id: node.id,
        kind: node.kind.clone(),
        children,
        name: node.name.clone(),
        hidden: node.hidden,
        locked: node.locked,
        layout: node.layout.clone(),
        extra: node.extra.clone(),
    };

    let Some(flags) = editor.get(&node.id) else {
        return out;
    };

    if let Some(name) = &flags.name {
        out.name = Some(name.clone());
    }
    if let Some(locked) = flags.locked {
        out.locked = Some(locked);
    }
    if let Some(z) = flags.z_index {
        out.layout.z_index = Some(z);
    }
    if flags.is_hidden_in(viewport) {
        out.hidden = Some(true);
    }
    out
}

/// Whether component `id` should be suppressed in `viewport`.
pub fn is_hidden_for_viewport(
    id: ComponentId,
    editor: &EditorMap,
    static_hidden: Option<bool>,
    viewport: Viewport,
) -> bool {
    static_hidden == Some(true) || editor.get(&id).is_some_and(|f| f.is_hidden_in(viewport))
}

/// Whether interaction with `node` is blocked. The editor flag wins over the
/// component's own `locked` attribute.
pub fn effective_locked(node: &Component, editor: &EditorMap) -> bool {
    editor
        .get(&node.id)
        .and_then(|f| f.locked)
        .or(node.locked)
        .unwrap_or(false)
}

/// The subset of `nodes` that is visible in `viewport`, in order.
pub fn visible_children<'a>(
    nodes: &'a [Component],
    editor: &EditorMap,
    viewport: Viewport,
) -> Vec<&'a Component> {
    nodes
        .iter()
        .filter(|c| !is_hidden_for_viewport(c.id, editor, c.hidden, viewport))
        .collect()
}

/// Children of `parent` in the order its stacking strategy dictates for
/// `viewport`. `custom` sorts by each child's `order<Viewport>` flag; children
/// without an order keep their relative position after the ordered ones.
pub fn arrange_children<'a>(
    parent: &'a Component,
    editor: &EditorMap,
    viewport: Viewport,
) -> Vec<&'a Component> {
    let mut kids: Vec<&Component> = parent.children().iter().collect();
    let strategy = editor
        .get(&parent.id)
        .map(|f| f.stack_for(viewport))
        .unwrap_or_default();
    match strategy {
        StackStrategy::Default => {}
        StackStrategy::Reverse => kids.reverse(),
        StackStrategy::Custom => {
            // Stable sort: ties keep document order.
            kids.sort_by_key(|c| {
                editor
                    .get(&c.id)
                    .and_then(|f| f.order_for(viewport))
                    .map_or((1, 0), |o| (0, o))
            });
        }
    }
    kids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EditorFlags;
    use pretty_assertions::assert_eq;
    use smallvec::smallvec;

    fn id(s: &str) -> ComponentId {
        ComponentId::intern(s)
    }

    #[test]
    fn overlays_only_set_fields() {
        let mut node = Component::new(id("deco_a"), "Text");
        node.name = Some("Original".into());
        node.locked = Some(true);
        node.layout.z_index = Some(3);

        let mut editor = EditorMap::new();
        editor.insert(
            id("deco_a"),
            EditorFlags {
                z_index: Some(10),
                ..Default::default()
            },
        );

        let out = decorate(&node, &editor, Viewport::Desktop);
        assert_eq!(out.name.as_deref(), Some("Original"));
        assert_eq!(out.locked, Some(true));
        assert_eq!(out.layout.z_index, Some(10));
        assert_eq!(out.hidden, None);
    }

    #[test]
    fn hidden_resolves_per_viewport() {
        let node = Component::new(id("deco_hidden"), "Image");
        let mut editor = EditorMap::new();
        editor.insert(
            id("deco_hidden"),
            EditorFlags {
                hidden: Some(smallvec![Viewport::Mobile]),
                ..Default::default()
            },
        );

        assert_eq!(decorate(&node, &editor, Viewport::Mobile).hidden, Some(true));
        assert_ne!(decorate(&node, &editor, Viewport::Desktop).hidden, Some(true));
    }

    #[test]
    fn static_hidden_applies_everywhere() {
        let mut node = Component::new(id("deco_static"), "Image");
        node.hidden = Some(true);
        for vp in Viewport::ALL {
            assert_eq!(decorate(&node, &EditorMap::new(), vp).hidden, Some(true));
        }
    }

    #[test]
    fn tree_decoration_is_pure_and_recursive() {
        let tree = vec![
            Component::new(id("deco_root"), "Section")
                .with_children(vec![Component::new(id("deco_leaf"), "Text")]),
        ];
        let before = tree.clone();
        let mut editor = EditorMap::new();
        editor.insert(
            id("deco_leaf"),
            EditorFlags {
                name: Some("Leaf".into()),
                ..Default::default()
            },
        );

        let first = decorate_tree(&tree, &editor, Viewport::Tablet);
        let second = decorate_tree(&tree, &editor, Viewport::Tablet);
        assert_eq!(tree, before);
        assert_eq!(first, second);
        assert_eq!(first[0].children()[0].name.as_deref(), Some("Leaf"));
    }

    #[test]
    fn custom_stack_sorts_by_order() {
        let parent = Component::new(id("stack_parent"), "MultiColumn").with_children(vec![
            Component::new(id("stack_a"), "Text"),
            Component::new(id("stack_b"), "Text"),
            Component::new(id("stack_c"), "Text"),
        ]);
        let mut editor = EditorMap::new();
        editor.insert(
            id("stack_parent"),
            EditorFlags {
                stack_mobile: Some(StackStrategy::Custom),
                ..Default::default()
            },
        );
        editor.insert(
            id("stack_c"),
            EditorFlags {
                order_mobile: Some(0),
                ..Default::default()
            },
        );
        editor.insert(
            id("stack_a"),
            EditorFlags {
                order_mobile: Some(1),
                ..Default::default()
            },
        );

        let order: Vec<&str> = arrange_children(&parent, &editor, Viewport::Mobile)
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(order, vec!["stack_c", "stack_a", "stack_b"]);

        let desktop: Vec<&str> = arrange_children(&parent, &editor, Viewport::Desktop)
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(desktop, vec!["stack_a", "stack_b", "stack_c"]);
    }

    #[test]
    fn editor_lock_overrides_component() {
        let mut node = Component::new(id("lock_me"), "Text");
        node.locked = Some(true);
        let mut editor = EditorMap::new();
        assert!(effective_locked(&node, &editor));
        editor.insert(
            id("lock_me"),
            EditorFlags {
                locked: Some(false),
                ..Default::default()
            },
        );
        assert!(!effective_locked(&node, &editor));
    }
}
