//! Graph renderer: rolling history curves drawn over a precomputed rounded
//! background. Per-series gradients are built once at load time; the frame
//! path only replays them.

use anyhow::{bail, Result};
use log::debug;
use tiny_skia::{
    FillRule, GradientStop, LinearGradient, LineJoin, Paint, PathBuilder, Pixmap, Point,
    RadialGradient, Shader, SpreadMode, Stroke, Transform,
};

use crate::gpu::{GpuFrame, TextureCache, TextureId};
use crate::raster::RasterCanvas;
use crate::utils::Color;

use super::{sub_plot_frame, OverlayZone, RendererCommon, MAX_SUB_PLOTS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphKind {
    Line,
    Plain,
    Bar,
    Circle,
    CirclePlain,
}

impl GraphKind {
    fn is_circle(self) -> bool {
        matches!(self, GraphKind::Circle | GraphKind::CirclePlain)
    }
}

#[derive(Debug, Clone)]
pub struct GraphAttributes {
    pub kind: GraphKind,
    /// Curve colors per series; the gradient runs low to high.
    pub low_colors: Vec<Color>,
    pub high_colors: Vec<Color>,
    pub background_color: Color,
    pub axis_color: Color,
    /// Corner radius floor; the effective radius also depends on the size.
    pub radius: f32,
    /// Draw all series over one shared plot instead of one plot per series.
    pub mix_graphs: bool,
}

impl Default for GraphAttributes {
    fn default() -> Self {
        Self {
            kind: GraphKind::Line,
            low_colors: Vec::new(),
            high_colors: Vec::new(),
            background_color: Color::new(0.0, 0.0, 0.0, 0.5),
            axis_color: Color::rgb(0.5, 0.5, 0.5),
            radius: 0.0,
            mix_graphs: false,
        }
    }
}

impl GraphAttributes {
    fn low(&self, i: usize) -> Color {
        self.low_colors.get(i).copied().unwrap_or(Color::rgb(0.0, 0.0, 0.0))
    }

    fn high(&self, i: usize) -> Color {
        self.high_colors.get(i).copied().unwrap_or(Color::rgb(0.0, 0.0, 0.0))
    }
}

pub struct Graph {
    attr: GraphAttributes,
    radius: f32,
    margin: f32,
    gradients: Vec<Option<Shader<'static>>>,
    background: Option<Pixmap>,
    background_texture: Option<TextureId>,
}

impl Graph {
    pub fn new(attr: GraphAttributes) -> Self {
        Self {
            attr,
            radius: 0.0,
            margin: 0.0,
            gradients: Vec::new(),
            background: None,
            background_texture: None,
        }
    }

    pub fn load(
        &mut self,
        common: &mut RendererCommon,
        textures: Option<&mut TextureCache>,
    ) -> Result<()> {
        let (w, h) = (common.width, common.height);
        if w <= 0.0 || h <= 0.0 {
            bail!("graph loaded with a zero-sized drawing area");
        }
        let nb = common.data.nb_series();
        debug!("loading graph for {} series at {}x{}", nb, w, h);
        common.rank = if self.attr.mix_graphs { nb.max(1) } else { 1 };

        self.radius = self.attr.radius.max(w.min(h) / 3.0);
        self.margin = self.radius * (1.0 - std::f32::consts::SQRT_2 / 2.0);

        self.gradients = (0..nb)
            .map(|i| self.build_gradient(w, h, self.attr.low(i), self.attr.high(i)))
            .collect();

        let nb_drawings = if common.rank > 0 { nb / common.rank } else { 0 };
        let background = self.build_background(w, h, nb_drawings);
        if let (Some(cache), Some(pixmap)) = (textures, background.as_ref()) {
            if let Some(old) = self.background_texture.take() {
                cache.delete(old);
            }
            self.background_texture = Some(cache.create_from_pixmap(pixmap));
        }
        self.background = background;

        self.set_overlay_zones(common, nb_drawings);
        Ok(())
    }

    /// Gradient along the value axis, or `None` when both ends share a color
    /// and a solid fill is cheaper.
    fn build_gradient(&self, w: f32, h: f32, low: Color, high: Color) -> Option<Shader<'static>> {
        if low.r == high.r && low.g == high.g && low.b == high.b {
            return None;
        }
        let m = self.margin;
        let fw = w - 2.0 * m;
        let fh = h - 2.0 * m;
        let stops = vec![
            GradientStop::new(0.0, Color::new(low.r, low.g, low.b, 1.0).to_skia()),
            GradientStop::new(1.0, Color::new(high.r, high.g, high.b, 1.0).to_skia()),
        ];
        if self.attr.kind.is_circle() {
            let radius = fw.min(fh) / 2.0;
            let center = Point::from_xy(fw / 2.0, m + radius);
            RadialGradient::new(center, center, radius, stops, SpreadMode::Pad, Transform::identity())
        } else {
            LinearGradient::new(
                Point::from_xy(0.0, m + fh),
                Point::from_xy(0.0, m),
                stops,
                SpreadMode::Pad,
                Transform::identity(),
            )
        }
    }

    /// Rounded-rectangle panel plus the value-axis guides, one set of guides
    /// per plot, drawn in the same quadrant frame the series use.
    fn build_background(&self, w: f32, h: f32, nb_plots: usize) -> Option<Pixmap> {
        let mut canvas = RasterCanvas::new(w as u32, h as u32)?;
        let r = self.radius;
        let m = self.margin;

        let mut paint = Paint {
            anti_alias: true,
            ..Paint::default()
        };
        paint.set_color(self.attr.background_color.to_skia());

        // Thick round-joined stroke of the inset rectangle gives the rounded
        // contour, the inner rectangle fills the middle.
        let mut pb = PathBuilder::new();
        pb.move_to(0.5 * r, 0.5 * r);
        pb.line_to(0.5 * r + (w - r), 0.5 * r);
        pb.line_to(0.5 * r + (w - r), 0.5 * r + (h - r));
        pb.line_to(0.5 * r, 0.5 * r + (h - r));
        pb.close();
        if let Some(path) = pb.finish() {
            canvas.stroke_path(
                &path,
                &paint,
                &Stroke {
                    width: r,
                    line_join: LineJoin::Round,
                    ..Stroke::default()
                },
            );
        }
        if let Some(rect) = tiny_skia::Rect::from_xywh(r, r, w - 2.0 * r, h - 2.0 * r) {
            let path = PathBuilder::from_rect(rect);
            canvas.fill_path(&path, &paint, FillRule::Winding);
        }

        let mut axis = Paint {
            anti_alias: true,
            ..Paint::default()
        };
        axis.set_color(Color::new(self.attr.axis_color.r, self.attr.axis_color.g, self.attr.axis_color.b, 1.0).to_skia());
        let thin = Stroke {
            width: 1.0,
            ..Stroke::default()
        };

        let fw = w - 2.0 * m;
        let fh = h - 2.0 * m;
        let n = nb_plots.min(MAX_SUB_PLOTS);
        for plot in 0..n {
            canvas.save();
            if n > 1 {
                let (fx, fy, s) = sub_plot_frame(plot, n);
                canvas.translate(fx * w, fy * h);
                canvas.scale(s, s);
            }
            let mut pb = PathBuilder::new();
            if self.attr.kind.is_circle() {
                // Same center and radius the series circles use.
                let r_guide = 0.5 * fw.min(fh);
                let (cx, cy) = (m + fw / 2.0, m + fh / 2.0);
                pb.push_circle(cx, cy, r_guide);
                pb.move_to(cx, cy);
                pb.line_to(cx + r_guide, cy);
            } else {
                pb.move_to(m, m);
                pb.line_to(m, h - m);
                pb.line_to(w - m, h - m);
            }
            if let Some(path) = pb.finish() {
                canvas.stroke_path(&path, &axis, &thin);
            }
            canvas.restore();
        }
        Some(canvas.into_pixmap())
    }

    /// Places the per-series label and value text zones around the plots, in
    /// coordinates relative to the drawing-area center.
    fn set_overlay_zones(&self, common: &mut RendererCommon, nb_drawings: usize) {
        let nb = common.data.nb_series();
        let (w, h) = (common.width, common.height);
        common.text_zones.clear();
        common.label_zones.clear();
        common.emblem_zones.clear();
        if nb_drawings == 0 {
            return;
        }

        let m = self.margin;
        let one_h = (h - 2.0 * m) / nb_drawings as f32;
        let one_w = (w - 2.0 * m) / nb_drawings as f32;
        let text_w = 48.0f32.min(w / 2.0);
        let text_h = 16.0f32.min(one_h / 1.5);
        let label_w = 48.0f32.min(w / 2.0);
        let label_h = 16.0f32.min(one_h / 2.0);
        let gap = one_h / 8.0;

        let text_color = if self.attr.background_color.a > 0.2 && self.attr.background_color.a < 0.7
        {
            Color::new(
                self.attr.background_color.r,
                self.attr.background_color.g,
                self.attr.background_color.b,
                1.0,
            )
        } else {
            let low = self.attr.low(0);
            Color::new(guess_channel(low.r, self.attr.high(0).r), guess_channel(low.g, self.attr.high(0).g), guess_channel(low.b, self.attr.high(0).b), 1.0)
        };

        for i in 0..nb {
            let mut label = OverlayZone {
                color: Color::new(self.attr.axis_color.r, self.attr.axis_color.g, self.attr.axis_color.b, 1.0),
                ..OverlayZone::default()
            };
            if label_h > 8.0 {
                if self.attr.mix_graphs {
                    label.x_center = (m + i as f32 * one_w + label_w / 2.0) / w - 0.5;
                    label.y_center = (h - m - label_h / 2.0) / h - 0.5;
                } else {
                    label.x_center = (m + label_w / 2.0) / w - 0.5;
                    label.y_center = 0.5 - (m + gap + i as f32 * one_h + label_h / 2.0) / h;
                }
                label.width = label_w / w;
                label.height = label_h / h;
            }
            common.label_zones.push(label);

            let mut text = OverlayZone {
                color: text_color,
                ..OverlayZone::default()
            };
            if self.attr.mix_graphs {
                text.x_center = (m + i as f32 * one_w + text_w / 2.0) / w - 0.5;
                text.y_center = (m + gap + text_h / 2.0) / h - 0.5;
            } else {
                text.x_center = 0.0;
                text.y_center = 0.5 - (m + (i + 1) as f32 * one_h - text_h / 2.0 - gap) / h;
            }
            text.width = text_w / w;
            text.height = text_h / h;
            common.text_zones.push(text);
        }
    }

    pub fn render_raster(&mut self, common: &RendererCommon, canvas: &mut RasterCanvas) {
        if let Some(bg) = &self.background {
            canvas.paint_pixmap(bg.as_ref(), 0.0, 0.0, 1.0);
        }
        if common.rank == 0 || common.data.nb_series() == 0 {
            return;
        }

        let n = common.nb_sub_plots().min(MAX_SUB_PLOTS);
        let mut offset = 0;
        for plot in 0..n {
            canvas.save();
            if n > 1 {
                let (fx, fy, s) = sub_plot_frame(plot, n);
                canvas.translate(fx * common.width, fy * common.height);
                canvas.scale(s, s);
            }
            let end = (offset + common.rank).min(common.data.nb_series());
            for i in offset..end {
                self.draw_series(common, canvas, i);
            }
            canvas.restore();
            offset += common.rank;
        }
    }

    fn draw_series(&self, common: &RendererCommon, canvas: &mut RasterCanvas, i: usize) {
        let m = self.margin;
        let fw = common.width - 2.0 * m;
        let fh = common.height - 2.0 * m;
        let series = &common.data.series[i];
        let memory = series.memory();
        if memory < 2 {
            return;
        }

        let mut paint = Paint {
            anti_alias: true,
            ..Paint::default()
        };
        match self.gradients.get(i).and_then(|g| g.as_ref()) {
            Some(shader) => paint.shader = shader.clone(),
            None => {
                let c = self.attr.low(i);
                paint.set_color(Color::new(c.r, c.g, c.b, 1.0).to_skia());
            }
        }

        match self.attr.kind {
            GraphKind::Line | GraphKind::Plain => {
                let n = (memory - 1) as f32;
                let mut pb = PathBuilder::new();
                pb.move_to(m + fw, m + (1.0 - series.normalized(0)) * fh);
                for t in 1..memory {
                    pb.line_to(
                        m + (n - t as f32) * fw / n,
                        m + (1.0 - series.normalized(t)) * fh,
                    );
                }
                if self.attr.kind == GraphKind::Plain {
                    pb.line_to(m, m + fh);
                    pb.line_to(m + fw, m + fh);
                    pb.close();
                }
                if let Some(path) = pb.finish() {
                    if self.attr.kind == GraphKind::Plain {
                        canvas.fill_path(&path, &paint, FillRule::Winding);
                    }
                    canvas.stroke_path(
                        &path,
                        &paint,
                        &Stroke {
                            width: 1.0,
                            line_join: LineJoin::Round,
                            ..Stroke::default()
                        },
                    );
                }
            }
            GraphKind::Bar => {
                let bar_width = fw / memory as f32 / 4.0;
                let n = (memory - 1) as f32;
                let mut pb = PathBuilder::new();
                for t in 0..memory {
                    let x = m + (n - t as f32) * fw / n;
                    pb.move_to(x, m + fh);
                    pb.line_to(x, m + fh - series.normalized(t) * fh);
                }
                if let Some(path) = pb.finish() {
                    canvas.stroke_path(
                        &path,
                        &paint,
                        &Stroke {
                            width: bar_width,
                            ..Stroke::default()
                        },
                    );
                }
            }
            GraphKind::Circle | GraphKind::CirclePlain => {
                // Newest sample at the top, history clockwise around the dial;
                // each sample spans one angular slot.
                let radius = fw.min(fh) / 2.0;
                let cx = m + fw / 2.0;
                let cy = m + fh / 2.0;
                let point = |t: f32, v: f32| {
                    let angle = -2.0 * std::f32::consts::PI * (t / memory as f32);
                    (cx + radius * v * angle.cos(), cy + radius * v * angle.sin())
                };
                let mut pb = PathBuilder::new();
                let v0 = series.normalized(0);
                let (x, y) = point(-0.5, v0);
                pb.move_to(x, y);
                let (x, y) = point(0.5, v0);
                pb.line_to(x, y);
                for t in 1..memory {
                    let v = series.normalized(t);
                    let (x, y) = point(t as f32 - 0.5, v);
                    pb.line_to(x, y);
                    let (x, y) = point(t as f32 + 0.5, v);
                    pb.line_to(x, y);
                }
                if self.attr.kind == GraphKind::CirclePlain {
                    pb.close();
                }
                if let Some(path) = pb.finish() {
                    if self.attr.kind == GraphKind::CirclePlain {
                        canvas.fill_path(&path, &paint, FillRule::Winding);
                    }
                    canvas.stroke_path(
                        &path,
                        &paint,
                        &Stroke {
                            width: 1.0,
                            line_join: LineJoin::Round,
                            ..Stroke::default()
                        },
                    );
                }
            }
        }
    }

    /// The GPU path only replays the background panel; the curves stay on
    /// the raster path.
    pub fn render_gpu(&mut self, common: &RendererCommon, frame: &mut GpuFrame) {
        if let Some(texture) = self.background_texture {
            frame.set_alpha(1.0);
            frame.draw_texture_at_size(texture, common.width, common.height);
        }
    }

    pub fn unload(&mut self, common: &mut RendererCommon, textures: Option<&mut TextureCache>) {
        self.background = None;
        if let Some(old) = self.background_texture.take() {
            if let Some(cache) = textures {
                cache.delete(old);
            }
        }
        self.gradients.clear();
        common.text_zones.clear();
        common.label_zones.clear();
        common.emblem_zones.clear();
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }
}

/// Text color channel guessed from the curve color: pushed half a unit away
/// from mid-gray so it stays readable over the plot.
fn guess_channel(low: f32, high: f32) -> f32 {
    const DC: f32 = 0.5;
    if (low < high && low > DC) || low > 1.0 - DC {
        low - DC
    } else {
        low + DC
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_renderer::SourceData;

    fn sized_common(nb: usize, memory: usize) -> RendererCommon {
        let mut c = RendererCommon::new(SourceData::new(nb, memory, 0.0, 1.0));
        c.width = 90.0;
        c.height = 90.0;
        c
    }

    #[test]
    fn mixed_graphs_share_one_plot() {
        let mut common = sized_common(4, 8);
        let mut graph = Graph::new(GraphAttributes {
            mix_graphs: true,
            ..GraphAttributes::default()
        });
        graph.load(&mut common, None).unwrap();
        assert_eq!(common.rank, 4);
        assert_eq!(common.nb_sub_plots(), 1);
    }

    #[test]
    fn radius_has_a_size_dependent_floor() {
        let mut common = sized_common(1, 8);
        let mut graph = Graph::new(GraphAttributes::default());
        graph.load(&mut common, None).unwrap();
        assert_eq!(graph.radius(), 30.0);
        let expected_margin = 30.0 * (1.0 - std::f32::consts::SQRT_2 / 2.0);
        assert!((graph.margin() - expected_margin).abs() < 1e-5);
    }

    #[test]
    fn zero_size_is_rejected() {
        let mut common = RendererCommon::new(SourceData::new(1, 8, 0.0, 1.0));
        let mut graph = Graph::new(GraphAttributes::default());
        assert!(graph.load(&mut common, None).is_err());
    }
}
