use std::f32::consts::PI;

use desklet_engine::{
    Color, DataRenderer, DeskletConfig, DeskletManager, GraphAttributes, GraphKind, Icon,
    RasterCanvas, SourceData,
};

fn manager() -> DeskletManager {
    let _ = env_logger::builder().is_test(true).try_init();
    DeskletManager::new(DeskletConfig::default())
}

#[test]
fn newest_desklet_comes_first() {
    let mut m = manager();
    let a = m.create(Icon::new("a", 16.0, 16.0), None);
    let b = m.create(Icon::new("b", 16.0, 16.0), None);
    assert_eq!(m.len(), 2);
    assert_eq!(m.find(|_| true).unwrap().id, b);
    assert!(m.desklet(a).is_some());
}

#[test]
fn destroy_removes_the_desklet() {
    let mut m = manager();
    let id = m.create(Icon::new("a", 16.0, 16.0), None);
    assert!(m.destroy(id));
    assert!(!m.destroy(id));
    assert!(m.is_empty());
    assert!(!m.is_animating(id));
}

#[test]
fn desklets_resolve_by_native_window() {
    let mut m = manager();
    let id = m.create(Icon::new("a", 16.0, 16.0), None);
    m.desklet_mut(id).unwrap().native_window = Some(77);
    assert_eq!(m.desklet_by_window(77).unwrap().id, id);
    assert!(m.desklet_by_window(78).is_none());
}

#[test]
fn icons_iterate_over_every_desklet() {
    let mut m = manager();
    let id = m.create(Icon::new("a", 16.0, 16.0), None);
    m.desklet_mut(id)
        .unwrap()
        .icons
        .push(Icon::new("sub", 8.0, 8.0));
    m.create(Icon::new("b", 16.0, 16.0), None);

    let mut names = Vec::new();
    m.for_each_icon(|icon, _| names.push(icon.name.clone()));
    names.sort();
    assert_eq!(names, vec!["a", "b", "sub"]);
}

#[test]
fn rotation_wraps_into_a_half_turn() {
    let mut m = manager();
    let id = m.create(Icon::new("a", 16.0, 16.0), None);
    let d = m.desklet_mut(id).unwrap();
    d.set_rotation(PI + 0.2);
    assert!((d.rotation() - (-PI + 0.2)).abs() < 1e-5);
    d.set_rotation(-PI - 0.2);
    assert!((d.rotation() - (PI - 0.2)).abs() < 1e-5);
    d.set_rotation(0.3);
    assert!((d.rotation() - 0.3).abs() < 1e-6);
}

#[test]
fn startup_grace_window_reports_not_ready() {
    let mut m = manager();
    assert!(!m.is_ready());
}

#[test]
fn render_notification_reaches_the_data_renderer() {
    let mut m = manager();
    let id = m.create(Icon::new("a", 16.0, 16.0), None);
    {
        let d = m.desklet_mut(id).unwrap();
        d.width = 90.0;
        d.height = 90.0;

        let mut renderer = DataRenderer::new_graph(
            SourceData::new(1, 4, 0.0, 1.0),
            GraphAttributes {
                kind: GraphKind::Plain,
                low_colors: vec![Color::rgb(0.0, 1.0, 0.0)],
                high_colors: vec![Color::rgb(0.0, 1.0, 0.0)],
                background_color: Color::TRANSPARENT,
                ..GraphAttributes::default()
            },
        );
        renderer.load(90.0, 90.0, None).unwrap();
        renderer.push_values(&[1.0]);
        renderer.push_values(&[1.0]);
        d.renderer = Some(Box::new(renderer));
    }

    let mut canvas = RasterCanvas::new(90, 90).unwrap();
    m.render_raster(id, &mut canvas);
    let filled = canvas.pixmap().pixel(70, 45).map(|p| p.alpha()).unwrap_or(0);
    assert!(filled > 0);
}

#[test]
fn reload_with_same_config_keeps_buttons() {
    let mut m = manager();
    m.create(Icon::new("a", 16.0, 16.0), None);
    m.reload(DeskletConfig::default());
    let mut changed = DeskletConfig::default();
    changed.button_size = 24;
    m.reload(changed);
    assert_eq!(m.config().button_size, 24);
}
