use pb_core::model::{DockX, DockY, EditorFlags, Position, ResponsiveBehavior};
use pb_core::tree;
use pb_core::{
    Component, ComponentId, CssValue, EditorMap, PlacementIntent, Viewport, compute_block_style,
    decorate_tree,
};
use pretty_assertions::assert_eq;
use smallvec::smallvec;

fn page() -> Vec<Component> {
    let json = r#"[
        {
            "id": "it_hero",
            "type": "Section",
            "children": [
                {
                    "id": "it_logo",
                    "type": "Image",
                    "src": "/logo.svg",
                    "position": "absolute",
                    "dockX": "center",
                    "dockY": "center",
                    "width": "200px",
                    "height": 100,
                    "responsiveBehavior": "scale-proportional"
                },
                { "id": "it_caption", "type": "Text", "text": "Welcome", "hidden": true }
            ]
        },
        { "id": "it_footer", "type": "Footer" }
    ]"#;
    serde_json::from_str(json).unwrap()
}

#[test]
fn decorated_tree_renders_per_viewport() {
    let tree = page();
    let mut editor = EditorMap::new();
    editor.insert(
        ComponentId::intern("it_logo"),
        EditorFlags {
            name: Some("Logo".into()),
            hidden: Some(smallvec![Viewport::Mobile]),
            ..Default::default()
        },
    );

    let desktop = decorate_tree(&tree, &editor, Viewport::Desktop);
    let mobile = decorate_tree(&tree, &editor, Viewport::Mobile);

    let logo_desktop = tree::find(&desktop, ComponentId::intern("it_logo")).unwrap();
    let logo_mobile = tree::find(&mobile, ComponentId::intern("it_logo")).unwrap();
    assert_eq!(logo_desktop.name.as_deref(), Some("Logo"));
    assert_ne!(logo_desktop.hidden, Some(true));
    assert_eq!(logo_mobile.hidden, Some(true));

    // Static flag applies in every viewport; unknown fields survive.
    let caption = tree::find(&desktop, ComponentId::intern("it_caption")).unwrap();
    assert_eq!(caption.hidden, Some(true));
    assert_eq!(caption.extra["text"], "Welcome");

    assert_eq!(tree, page());
}

#[test]
fn decorated_node_compiles_to_centered_proportional_block() {
    let tree = page();
    let editor = EditorMap::new();
    let decorated = decorate_tree(&tree, &editor, Viewport::Tablet);
    let logo = tree::find(&decorated, ComponentId::intern("it_logo")).unwrap();

    let intent = PlacementIntent::for_component(logo, &editor, Viewport::Tablet);
    assert_eq!(intent.position, Some(Position::Absolute));
    assert_eq!(intent.dock_x, Some(DockX::Center));
    assert_eq!(intent.dock_y, Some(DockY::Center));
    assert_eq!(
        intent.responsive_behavior,
        Some(ResponsiveBehavior::ScaleProportional)
    );

    let style = compute_block_style(&intent);
    assert_eq!(style.aspect_ratio.as_deref(), Some("200 / 100"));
    assert_eq!(style.width, Some(CssValue::from("100%")));
    assert_eq!(style.height, None);
    assert_eq!(style.margin_left, Some(CssValue::from("auto")));
    assert_eq!(style.margin_bottom, Some(CssValue::from("auto")));

    let json = serde_json::to_value(&style).unwrap();
    assert_eq!(json["left"], 0.0);
    assert_eq!(json["marginTop"], "auto");
    assert!(json.get("height").is_none());
}
