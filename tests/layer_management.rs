use egui::{Color32, Pos2, Vec2};
use sticker_canvas::{DrawingSurface, Element, PointerSample, SurfaceConfig, ToolOptions};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn create_test_surface() -> DrawingSurface {
    init_logger();
    DrawingSurface::new("layers", Vec2::new(200.0, 100.0), SurfaceConfig::default()).unwrap()
}

fn draw_line(surface: &mut DrawingSurface, from: Pos2, to: Pos2) -> bool {
    surface.pointer_down(PointerSample::new(from));
    surface.pointer_move(PointerSample::new(to));
    surface.pointer_up(PointerSample::new(to))
}

#[test]
fn test_two_added_layers_make_three() {
    let mut surface = create_test_surface();
    surface.add_layer();
    surface.add_layer();

    let layers = surface.layers();
    assert_eq!(layers.len(), 3);
    assert_eq!(surface.document().active_index(), 2);
    assert!(layers[2].active);
    assert!(!layers[0].active && !layers[1].active);
}

#[test]
fn test_newest_layer_is_always_active() {
    let mut surface = create_test_surface();
    // The seeded layer is the first one, so N additions end on index N
    for n in 1..=12 {
        assert_eq!(surface.add_layer(), Some(n));
        assert_eq!(surface.document().active_index(), n);
    }
}

#[test]
fn test_new_layer_defaults() {
    let mut surface = create_test_surface();
    surface.add_layer();

    let layer = &surface.layers()[1];
    assert_eq!(layer.name, "Layer 2");
    assert!(layer.visible);
    assert!(!layer.locked);
    assert_eq!(layer.opacity, 1.0);
    assert_ne!(layer.id, surface.layers()[0].id);
}

#[test]
fn test_select_layer_out_of_range_is_noop() {
    let mut surface = create_test_surface();
    surface.add_layer();
    let depth = surface.history_depth();

    assert!(surface.select_layer(0));
    assert_eq!(surface.document().active_index(), 0);

    assert!(!surface.select_layer(7));
    assert_eq!(surface.document().active_index(), 0);
    // Navigation is not recorded
    assert_eq!(surface.history_depth(), depth);
}

#[test]
fn test_visibility_propagates_to_objects() {
    let mut surface = create_test_surface();
    surface.select_tool("pencil", ToolOptions::default());
    draw_line(&mut surface, Pos2::new(10.0, 10.0), Pos2::new(90.0, 10.0));

    assert_eq!(surface.toggle_visibility(0), Some(false));
    let layer = surface.document().active_layer();
    assert!(layer.objects.iter().all(|object| !object.is_visible()));
    assert_eq!(layer.objects.len(), 1);

    assert_eq!(surface.toggle_visibility(0), Some(true));
    assert!(surface.document().active_layer().objects[0].is_visible());
}

#[test]
fn test_opacity_clamps() {
    let mut surface = create_test_surface();
    surface.select_tool("rectangle", ToolOptions::default());
    draw_line(&mut surface, Pos2::new(10.0, 10.0), Pos2::new(50.0, 50.0));

    assert_eq!(surface.set_layer_opacity(0, 1.5), Some(1.0));
    assert_eq!(surface.layers()[0].opacity, 1.0);

    assert_eq!(surface.set_layer_opacity(0, -0.2), Some(0.0));
    assert_eq!(surface.layers()[0].opacity, 0.0);

    // Layer opacity overwrites the object's own opacity
    surface.set_layer_opacity(0, 0.4);
    assert_eq!(surface.document().active_layer().objects[0].opacity(), 0.4);

    assert_eq!(surface.set_layer_opacity(3, 0.5), None);
}

#[test]
fn test_locked_layer_rejects_drawing() {
    let mut surface = create_test_surface();
    surface.select_tool("marker", ToolOptions::default());
    draw_line(&mut surface, Pos2::new(10.0, 10.0), Pos2::new(90.0, 10.0));
    assert_eq!(surface.toggle_lock(0), Some(true));
    let depth = surface.history_depth();

    assert!(!draw_line(&mut surface, Pos2::new(10.0, 40.0), Pos2::new(90.0, 40.0)));
    assert_eq!(surface.document().active_layer().objects.len(), 1);

    surface.select_tool("triangle", ToolOptions::default());
    assert!(!draw_line(&mut surface, Pos2::new(10.0, 40.0), Pos2::new(90.0, 90.0)));
    assert_eq!(surface.document().active_layer().objects.len(), 1);

    // Hiding a locked layer leaves its objects alone
    surface.toggle_visibility(0);
    assert_eq!(surface.document().active_layer().objects.len(), 1);

    assert_eq!(surface.history_depth(), depth + 1);
    assert_eq!(surface.active_subscriptions(), 0);
}

#[test]
fn test_remove_layer_reclamps_active_index() {
    let mut surface = create_test_surface();
    surface.add_layer();
    surface.add_layer();
    assert_eq!(surface.document().active_index(), 2);

    assert!(surface.remove_layer(2));
    assert_eq!(surface.document().active_index(), 1);

    assert!(surface.remove_layer(0));
    assert_eq!(surface.document().active_index(), 0);
    assert_eq!(surface.layers().len(), 1);

    // Exactly one active layer must remain
    assert!(!surface.remove_layer(0));
    assert_eq!(surface.layers().len(), 1);
}

#[test]
fn test_objects_land_in_active_layer() {
    let mut surface = create_test_surface();
    surface.add_layer();
    surface.set_color(Color32::RED);
    surface.select_tool("oil", ToolOptions::default());
    draw_line(&mut surface, Pos2::new(10.0, 10.0), Pos2::new(90.0, 10.0));

    let layers = surface.layers();
    assert_eq!(layers[0].object_count, 0);
    assert_eq!(layers[1].object_count, 1);
}
