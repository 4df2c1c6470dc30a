use desklet_engine::data_renderer::MAX_SUB_PLOTS;
use desklet_engine::{Color, DataRenderer, GraphAttributes, GraphKind, RasterCanvas, SourceData};

fn solid_red(kind: GraphKind, nb_series: usize) -> GraphAttributes {
    GraphAttributes {
        kind,
        low_colors: vec![Color::rgb(1.0, 0.0, 0.0); nb_series],
        high_colors: vec![Color::rgb(1.0, 0.0, 0.0); nb_series],
        background_color: Color::TRANSPARENT,
        ..GraphAttributes::default()
    }
}

fn alpha_at(canvas: &RasterCanvas, x: u32, y: u32) -> u8 {
    canvas.pixmap().pixel(x, y).map(|p| p.alpha()).unwrap_or(0)
}

#[test]
fn bar_graph_draws_the_newest_sample_at_the_right() {
    let mut renderer =
        DataRenderer::new_graph(SourceData::new(1, 2, 0.0, 1.0), solid_red(GraphKind::Bar, 1));
    renderer.load(90.0, 90.0, None).unwrap();
    renderer.push_values(&[1.0]);

    let mut canvas = RasterCanvas::new(90, 90).unwrap();
    renderer.render_raster(&mut canvas);

    // Full-height bar on the right edge of the plot area; the empty history
    // slot on the left stays blank.
    assert!(alpha_at(&canvas, 80, 45) > 0);
    assert_eq!(alpha_at(&canvas, 20, 30), 0);
}

#[test]
fn plain_graph_fills_under_the_curve() {
    let mut renderer = DataRenderer::new_graph(
        SourceData::new(1, 4, 0.0, 1.0),
        solid_red(GraphKind::Plain, 1),
    );
    renderer.load(90.0, 90.0, None).unwrap();
    for _ in 0..4 {
        renderer.push_values(&[1.0]);
    }

    let mut canvas = RasterCanvas::new(90, 90).unwrap();
    renderer.render_raster(&mut canvas);
    assert!(alpha_at(&canvas, 45, 45) > 0);
}

#[test]
fn background_panel_covers_the_drawing_area() {
    let mut attr = solid_red(GraphKind::Line, 1);
    attr.background_color = Color::new(0.0, 0.0, 0.0, 0.5);
    let mut renderer = DataRenderer::new_graph(SourceData::new(1, 4, 0.0, 1.0), attr);
    renderer.load(90.0, 90.0, None).unwrap();

    let mut canvas = RasterCanvas::new(90, 90).unwrap();
    renderer.render_raster(&mut canvas);
    assert!(alpha_at(&canvas, 45, 45) > 0);
}

#[test]
fn extra_series_beyond_the_sub_plot_cap_still_load() {
    let mut renderer = DataRenderer::new_graph(
        SourceData::new(7, 4, 0.0, 1.0),
        solid_red(GraphKind::Line, 7),
    );
    renderer.load(120.0, 120.0, None).unwrap();
    renderer.push_values(&[0.2, 0.4, 0.6, 0.8, 1.0, 0.5, 0.3]);

    assert_eq!(renderer.common.rank, 1);
    assert_eq!(renderer.common.nb_sub_plots(), 7);
    assert_eq!(MAX_SUB_PLOTS, 4);

    // Only the first four plots are drawn; rendering must not panic on the
    // overflowing series.
    let mut canvas = RasterCanvas::new(120, 120).unwrap();
    renderer.render_raster(&mut canvas);
}

#[test]
fn axis_guides_land_inside_the_sub_plot_quadrants() {
    let mut renderer = DataRenderer::new_graph(
        SourceData::new(2, 4, 0.0, 1.0),
        solid_red(GraphKind::Circle, 2),
    );
    renderer.load(90.0, 90.0, None).unwrap();

    let mut canvas = RasterCanvas::new(90, 90).unwrap();
    renderer.render_raster(&mut canvas);

    // The first plot scales the drawing area by 2/3 into the top-left, so its
    // radius tick runs rightward from the scaled center (30, 30).
    assert!(alpha_at(&canvas, 45, 30) > 0);
    // A full-width band layout would have drawn a circle apex here.
    assert_eq!(alpha_at(&canvas, 45, 9), 0);
}

#[test]
fn mixed_series_share_a_single_plot() {
    let mut attr = solid_red(GraphKind::Line, 4);
    attr.mix_graphs = true;
    let mut renderer = DataRenderer::new_graph(SourceData::new(4, 4, 0.0, 1.0), attr);
    renderer.load(90.0, 90.0, None).unwrap();

    assert_eq!(renderer.common.rank, 4);
    assert_eq!(renderer.common.nb_sub_plots(), 1);
}

#[test]
fn stacked_plots_stack_their_text_zones() {
    let mut renderer = DataRenderer::new_graph(
        SourceData::new(2, 4, 0.0, 1.0),
        solid_red(GraphKind::Line, 2),
    );
    renderer.load(90.0, 90.0, None).unwrap();

    let zones = &renderer.common.text_zones;
    assert_eq!(zones.len(), 2);
    assert!(zones[0].y_center > zones[1].y_center);
}
