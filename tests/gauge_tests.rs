use std::fs;
use std::path::Path;

use desklet_engine::data_renderer::gauge::needle_angle;
use desklet_engine::data_renderer::{Gauge, GaugeTheme, RendererCommon, SourceData};

const THEME_XML: &str = r#"<gauge>
  <name>Turbo</name>
  <version>2</version>
  <file key="background">bg.svg</file>
  <file key="foreground">fg.svg</file>
  <indicator>
    <posX>0,25</posX>
    <posY>-0.5</posY>
    <posStart>-120</posStart>
    <posStop>120</posStop>
    <text_zone>
      <x_center>0.1</x_center>
      <y_center>-0,3</y_center>
      <width>0.5</width>
      <height>0.2</height>
      <red>1</red>
    </text_zone>
  </indicator>
  <indicator>
    <posStart>0</posStart>
    <posStop>90</posStop>
    <direction>-1</direction>
    <text_zone>
      <x_center>0.2</x_center>
      <width>0.4</width>
      <height>0.2</height>
    </text_zone>
  </indicator>
</gauge>"#;

#[test]
fn theme_parse_normalizes_coordinates() {
    let theme = GaugeTheme::parse(THEME_XML, Path::new("/nonexistent")).unwrap();
    assert_eq!(theme.name, "Turbo");
    assert_eq!(theme.indicators.len(), 2);

    // Version 2 doubles the pivots and keeps zone centers as written.
    let first = &theme.indicators[0];
    assert!((first.pos_x - 0.5).abs() < 1e-6);
    assert!((first.pos_y - (-1.0)).abs() < 1e-6);
    assert!((first.text_zone.x_center - 0.1).abs() < 1e-6);
    assert!((first.text_zone.y_center - (-0.3)).abs() < 1e-6);
    assert_eq!(first.text_zone.color.r, 1.0);
    assert_eq!(first.text_zone.color.a, 1.0);
}

#[test]
fn rank_defaults_to_the_indicator_count() {
    let theme = GaugeTheme::parse(THEME_XML, Path::new("/nonexistent")).unwrap();
    assert_eq!(theme.rank, 2);
}

#[test]
fn theme_without_indicators_is_rejected() {
    let xml = "<gauge><name>empty</name></gauge>";
    assert!(GaugeTheme::parse(xml, Path::new("/nonexistent")).is_err());
}

#[test]
fn non_gauge_document_is_rejected() {
    assert!(GaugeTheme::parse("<graph/>", Path::new("/nonexistent")).is_err());
}

#[test]
fn needle_sweep_is_linear_in_the_value() {
    let theme = GaugeTheme::parse(THEME_XML, Path::new("/nonexistent")).unwrap();
    let first = &theme.indicators[0];
    assert_eq!(needle_angle(first, 0.0), -120.0);
    assert_eq!(needle_angle(first, 0.5), 0.0);
    assert_eq!(needle_angle(first, 1.0), 120.0);

    let second = &theme.indicators[1];
    assert_eq!(needle_angle(second, 1.0), -90.0);
}

#[test]
fn series_bind_to_indicators_round_robin() {
    let theme = GaugeTheme::parse(THEME_XML, Path::new("/nonexistent")).unwrap();
    let mut gauge = Gauge::new(theme);
    let mut common = RendererCommon::new(SourceData::new(5, 1, 0.0, 1.0));
    common.width = 64.0;
    common.height = 64.0;
    gauge.load(&mut common, None).unwrap();

    assert_eq!(common.rank, 2);
    assert_eq!(common.text_zones.len(), 5);
    let xs: Vec<f32> = common.text_zones.iter().map(|z| z.x_center).collect();
    assert_eq!(xs, vec![0.1, 0.2, 0.1, 0.2, 0.1]);
}

#[test]
fn zero_size_load_is_rejected() {
    let theme = GaugeTheme::parse(THEME_XML, Path::new("/nonexistent")).unwrap();
    let mut gauge = Gauge::new(theme);
    let mut common = RendererCommon::new(SourceData::new(1, 1, 0.0, 1.0));
    assert!(gauge.load(&mut common, None).is_err());
}

#[test]
fn needle_geometry_defaults_derive_from_the_artwork() {
    let dir = std::env::temp_dir().join("gauge-needle-defaults");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("needle.svg"),
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100"><rect width="100" height="12"/></svg>"#,
    )
    .unwrap();
    fs::write(
        dir.join("theme.xml"),
        r#"<gauge>
          <name>needle-only</name>
          <indicator>
            <posStart>0</posStart>
            <posStop>180</posStop>
            <file key="needle">needle.svg</file>
          </indicator>
        </gauge>"#,
    )
    .unwrap();

    let theme = GaugeTheme::from_dir(&dir).unwrap();
    let ind = &theme.indicators[0];
    assert!(ind.needle.is_some());
    assert_eq!(ind.needle_real_height, 12.0);
    assert_eq!(ind.needle_offset_y, 6.0);
    assert_eq!(ind.needle_real_width, 100.0);
    assert_eq!(ind.needle_offset_x, 10.0);

    let _ = fs::remove_dir_all(&dir);
}
