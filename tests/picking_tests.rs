use desklet_engine::{
    find_clicked_icon, zoom_for_rotation, Desklet, DeskletConfig, DeskletManager, DeskletRenderer,
    Icon, IconSlot, Position, RasterCanvas, TextureId,
};

struct GpuOnly;

impl DeskletRenderer for GpuOnly {
    fn render_raster(&mut self, _canvas: &mut RasterCanvas, _desklet: &Desklet) {}

    fn has_gpu(&self) -> bool {
        true
    }
}

fn desklet_with_icon(icon: Icon) -> (DeskletManager, desklet_engine::DeskletId) {
    let mut manager = DeskletManager::new(DeskletConfig::default());
    let id = manager.create(icon, None);
    let d = manager.desklet_mut(id).unwrap();
    d.width = 100.0;
    d.height = 100.0;
    (manager, id)
}

fn centered_icon() -> Icon {
    let mut icon = Icon::new("main", 20.0, 20.0);
    icon.draw_x = 40.0;
    icon.draw_y = 40.0;
    icon
}

#[test]
fn click_inside_the_icon_resolves_to_primary() {
    let (mut manager, id) = desklet_with_icon(centered_icon());
    let d = manager.desklet_mut(id).unwrap();
    d.mouse = Position { x: 50.0, y: 50.0 };
    assert_eq!(find_clicked_icon(d, false), Some(IconSlot::Primary));
    assert_eq!(d.mouse_2d, Position { x: 50.0, y: 50.0 });
}

#[test]
fn click_outside_resolves_to_nothing() {
    let (mut manager, id) = desklet_with_icon(centered_icon());
    let d = manager.desklet_mut(id).unwrap();
    d.mouse = Position { x: 10.0, y: 10.0 };
    assert_eq!(find_clicked_icon(d, false), None);
}

#[test]
fn secondary_icons_are_tested_after_the_primary() {
    let (mut manager, id) = desklet_with_icon(centered_icon());
    let d = manager.desklet_mut(id).unwrap();
    let mut sub = Icon::new("sub", 10.0, 10.0);
    sub.draw_x = 80.0;
    sub.draw_y = 10.0;
    d.icons.push(sub);
    d.mouse = Position { x: 85.0, y: 15.0 };
    assert_eq!(find_clicked_icon(d, false), Some(IconSlot::Secondary(0)));
}

#[test]
fn picking_requires_a_primary_icon() {
    let (mut manager, id) = desklet_with_icon(centered_icon());
    let d = manager.desklet_mut(id).unwrap();
    d.icon = None;
    let mut sub = Icon::new("sub", 10.0, 10.0);
    sub.draw_x = 40.0;
    sub.draw_y = 40.0;
    d.icons.push(sub);
    d.mouse = Position { x: 45.0, y: 45.0 };

    // Secondary icons are not reachable while no primary icon is bound.
    assert_eq!(find_clicked_icon(d, false), None);
}

#[test]
fn picking_inverts_the_rotation() {
    let (mut manager, id) = desklet_with_icon(centered_icon());
    let d = manager.desklet_mut(id).unwrap();
    let theta = 0.5f32;
    d.set_rotation(theta);

    // Forward-map a point inside the icon (its center sits 20px right of the
    // desklet center) and click where it lands on screen.
    let zoom = zoom_for_rotation(100.0, 100.0, theta);
    let r = 20.0 * zoom;
    d.mouse = Position {
        x: 50.0 + r * (-theta).cos(),
        y: 50.0 - r * (-theta).sin(),
    };
    let mut icon = centered_icon();
    icon.draw_x = 60.0;
    d.icon = Some(icon);

    assert_eq!(find_clicked_icon(d, false), Some(IconSlot::Primary));
    let back = d.mouse_2d;
    assert!((back.x - 70.0).abs() < 1e-3, "x={}", back.x);
    assert!((back.y - 50.0).abs() < 1e-3, "y={}", back.y);
}

#[test]
fn gpu_picking_reads_the_selection_buffer() {
    let mut icon = centered_icon();
    icon.texture = Some(TextureId(7));
    let (mut manager, id) = desklet_with_icon(icon);
    let d = manager.desklet_mut(id).unwrap();
    d.renderer = Some(Box::new(GpuOnly));
    d.mouse = Position { x: 50.0, y: 50.0 };

    assert_eq!(find_clicked_icon(d, true), Some(IconSlot::Primary));
    // Plain icon quads resolve to a slot; picked_object stays reserved for
    // bounding-box callbacks.
    assert_eq!(d.picked_object, 0);
}

#[test]
fn gpu_picking_misses_outside_the_icon() {
    let mut icon = centered_icon();
    icon.texture = Some(TextureId(7));
    let (mut manager, id) = desklet_with_icon(icon);
    let d = manager.desklet_mut(id).unwrap();
    d.renderer = Some(Box::new(GpuOnly));
    d.mouse = Position { x: 5.0, y: 5.0 };

    assert_eq!(find_clicked_icon(d, true), None);
    assert_eq!(d.picked_object, 0);
}

#[test]
fn bounding_box_override_reports_the_primary_icon() {
    let mut icon = centered_icon();
    icon.texture = Some(TextureId(7));
    let (mut manager, id) = desklet_with_icon(icon);
    let d = manager.desklet_mut(id).unwrap();
    d.renderer = Some(Box::new(GpuOnly));
    d.bounding_box_override = Some(Box::new(|frame, desklet| {
        frame.load_name(42);
        frame.quad(0.0, 0.0, desklet.width, desklet.height);
    }));
    d.mouse = Position { x: 50.0, y: 50.0 };

    assert_eq!(find_clicked_icon(d, true), Some(IconSlot::Primary));
    assert_eq!(d.picked_object, 42);
}
