//! Data renderers: pluggable widgets that turn a rolling window of measured
//! values into desklet content. The shared part owns the value history and
//! the overlay zones; gauges and graphs only differ in how they paint.

pub mod gauge;
pub mod graph;

use anyhow::Result;

use crate::desklet::{Desklet, DeskletRenderer};
use crate::gpu::{GpuFrame, TextureCache};
use crate::raster::RasterCanvas;
use crate::utils::Color;

pub use gauge::{Gauge, GaugeTheme};
pub use graph::{Graph, GraphAttributes, GraphKind};

/// Ring buffer of one measured series, newest value at age 0.
#[derive(Debug, Clone)]
pub struct SeriesBuffer {
    values: Vec<f32>,
    head: usize,
    len: usize,
    pub min: f32,
    pub max: f32,
}

impl SeriesBuffer {
    pub fn new(memory: usize, min: f32, max: f32) -> Self {
        Self {
            values: vec![0.0; memory.max(1)],
            head: 0,
            len: 0,
            min,
            max,
        }
    }

    pub fn push(&mut self, value: f32) {
        self.head = (self.head + 1) % self.values.len();
        self.values[self.head] = value;
        self.len = (self.len + 1).min(self.values.len());
    }

    /// Raw value `age` steps back; 0 is the newest. Out-of-window ages read
    /// as the series minimum.
    pub fn value(&self, age: usize) -> f32 {
        if age >= self.len {
            return self.min;
        }
        let n = self.values.len();
        self.values[(self.head + n - age % n) % n]
    }

    /// Value mapped into [0,1] by the series bounds.
    pub fn normalized(&self, age: usize) -> f32 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((self.value(age) - self.min) / span).clamp(0.0, 1.0)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn memory(&self) -> usize {
        self.values.len()
    }
}

/// Value history for every series a renderer displays.
#[derive(Debug, Clone)]
pub struct SourceData {
    pub memory_size: usize,
    pub series: Vec<SeriesBuffer>,
}

impl SourceData {
    pub fn new(nb_series: usize, memory_size: usize, min: f32, max: f32) -> Self {
        Self {
            memory_size,
            series: (0..nb_series)
                .map(|_| SeriesBuffer::new(memory_size, min, max))
                .collect(),
        }
    }

    /// Appends one sample per series; extra values are ignored, missing ones
    /// leave their series untouched.
    pub fn push(&mut self, values: &[f32]) {
        for (series, &value) in self.series.iter_mut().zip(values) {
            series.push(value);
        }
    }

    pub fn nb_series(&self) -> usize {
        self.series.len()
    }
}

/// Overlay area a renderer exposes for text or a label, in coordinates
/// relative to the drawing area center ([-0.5, 0.5] on both axes).
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlayZone {
    pub x_center: f32,
    pub y_center: f32,
    pub width: f32,
    pub height: f32,
    pub color: Color,
}

impl OverlayZone {
    pub fn is_set(&self) -> bool {
        self.width != 0.0 && self.height != 0.0
    }
}

/// Overlay area for a logo/emblem image.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmblemZone {
    pub x_center: f32,
    pub y_center: f32,
    pub width: f32,
    pub height: f32,
    pub alpha: f32,
}

/// State shared by every renderer kind.
pub struct RendererCommon {
    pub width: f32,
    pub height: f32,
    /// Series drawn together on one sub-plot.
    pub rank: usize,
    pub data: SourceData,
    pub text_zones: Vec<OverlayZone>,
    pub label_zones: Vec<OverlayZone>,
    pub emblem_zones: Vec<EmblemZone>,
    /// Whether GPU textures are maintained alongside the rasters.
    pub gpu: bool,
    /// Values shown on screen, trailing the measured ones while an update
    /// animation runs. Empty until `update_displayed` is first called.
    displayed: Vec<f32>,
}

impl RendererCommon {
    pub fn new(data: SourceData) -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            rank: 1,
            data,
            text_zones: Vec::new(),
            label_zones: Vec::new(),
            emblem_zones: Vec::new(),
            gpu: false,
            displayed: Vec::new(),
        }
    }

    /// Number of sub-plots needed to show every series `rank` at a time.
    pub fn nb_sub_plots(&self) -> usize {
        if self.rank == 0 {
            return 0;
        }
        self.data.nb_series().div_ceil(self.rank)
    }

    /// The value currently shown for series `i`: the smoothed one while an
    /// update animation runs, the measured one otherwise.
    pub fn displayed_value(&self, i: usize) -> f32 {
        match self.displayed.get(i) {
            Some(&v) => v,
            None => self.data.series.get(i).map_or(0.0, |s| s.normalized(0)),
        }
    }

    /// One easing step of the displayed values toward the measured ones.
    /// Returns true while at least one value is still moving.
    pub fn update_displayed(&mut self, fraction: f32) -> bool {
        if self.displayed.len() != self.data.nb_series() {
            self.displayed = self.data.series.iter().map(|s| s.normalized(0)).collect();
            return false;
        }
        let mut moving = false;
        for (d, s) in self.displayed.iter_mut().zip(&self.data.series) {
            let target = s.normalized(0);
            *d += (target - *d) * fraction.clamp(0.0, 1.0);
            if (target - *d).abs() < 0.005 {
                *d = target;
            } else {
                moving = true;
            }
        }
        moving
    }
}

/// At most this many sub-plots are drawn; extra series are dropped.
pub const MAX_SUB_PLOTS: usize = 4;

/// Placement of sub-plot `i` when `n` share the drawing area, as
/// (x, y, scale) fractions of the full size. The first plot takes the
/// top-left two thirds, the rest one third each in the remaining corners.
pub(crate) fn sub_plot_frame(i: usize, n: usize) -> (f32, f32, f32) {
    if n <= 1 {
        return (0.0, 0.0, 1.0);
    }
    match i {
        0 => (0.0, 0.0, 2.0 / 3.0),
        1 => (2.0 / 3.0, 2.0 / 3.0, 1.0 / 3.0),
        2 => (2.0 / 3.0, 0.0, 1.0 / 3.0),
        _ => (0.0, 2.0 / 3.0, 1.0 / 3.0),
    }
}

enum Kind {
    Gauge(Gauge),
    Graph(Graph),
}

/// A complete data renderer: shared state plus one concrete painting kind.
pub struct DataRenderer {
    pub common: RendererCommon,
    kind: Kind,
}

impl DataRenderer {
    pub fn new_gauge(data: SourceData, theme: GaugeTheme) -> Self {
        Self {
            common: RendererCommon::new(data),
            kind: Kind::Gauge(Gauge::new(theme)),
        }
    }

    pub fn new_graph(data: SourceData, attributes: GraphAttributes) -> Self {
        Self {
            common: RendererCommon::new(data),
            kind: Kind::Graph(Graph::new(attributes)),
        }
    }

    /// Sizes the renderer and builds every size-dependent resource.
    pub fn load(
        &mut self,
        width: f32,
        height: f32,
        mut textures: Option<&mut TextureCache>,
    ) -> Result<()> {
        self.common.width = width;
        self.common.height = height;
        self.common.gpu = textures.is_some();
        match &mut self.kind {
            Kind::Gauge(g) => g.load(&mut self.common, textures.as_deref_mut()),
            Kind::Graph(g) => g.load(&mut self.common, textures.as_deref_mut()),
        }
    }

    pub fn push_values(&mut self, values: &[f32]) {
        self.common.data.push(values);
    }

    pub fn render_raster(&mut self, canvas: &mut RasterCanvas) {
        match &mut self.kind {
            Kind::Gauge(g) => g.render_raster(&self.common, canvas),
            Kind::Graph(g) => g.render_raster(&self.common, canvas),
        }
    }

    pub fn render_gpu(&mut self, frame: &mut GpuFrame) {
        match &mut self.kind {
            Kind::Gauge(g) => g.render_gpu(&self.common, frame),
            Kind::Graph(g) => g.render_gpu(&self.common, frame),
        }
    }

    pub fn reload(
        &mut self,
        width: f32,
        height: f32,
        textures: Option<&mut TextureCache>,
    ) -> Result<()> {
        self.unload_kind(None);
        self.load(width, height, textures)
    }

    pub fn unload(&mut self, textures: Option<&mut TextureCache>) {
        self.unload_kind(textures);
    }

    fn unload_kind(&mut self, mut textures: Option<&mut TextureCache>) {
        match &mut self.kind {
            Kind::Gauge(g) => g.unload(&mut self.common, textures.as_deref_mut()),
            Kind::Graph(g) => g.unload(&mut self.common, textures.as_deref_mut()),
        }
    }

    pub fn has_gpu(&self) -> bool {
        self.common.gpu
    }
}

impl DeskletRenderer for DataRenderer {
    fn render_raster(&mut self, canvas: &mut RasterCanvas, _desklet: &Desklet) {
        DataRenderer::render_raster(self, canvas);
    }

    fn render_gpu(&mut self, frame: &mut GpuFrame, _desklet: &Desklet) {
        DataRenderer::render_gpu(self, frame);
    }

    fn has_gpu(&self) -> bool {
        DataRenderer::has_gpu(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_buffer_ages_backwards() {
        let mut s = SeriesBuffer::new(4, 0.0, 10.0);
        s.push(1.0);
        s.push(2.0);
        s.push(3.0);
        assert_eq!(s.value(0), 3.0);
        assert_eq!(s.value(1), 2.0);
        assert_eq!(s.value(2), 1.0);
        assert_eq!(s.value(3), 0.0);
    }

    #[test]
    fn normalization_clamps_to_bounds() {
        let mut s = SeriesBuffer::new(2, 0.0, 2.0);
        s.push(1.0);
        assert_eq!(s.normalized(0), 0.5);
        s.push(5.0);
        assert_eq!(s.normalized(0), 1.0);
    }

    #[test]
    fn displayed_values_ease_toward_the_target() {
        let mut c = RendererCommon::new(SourceData::new(1, 2, 0.0, 1.0));
        c.data.push(&[1.0]);
        assert_eq!(c.displayed_value(0), 1.0);

        c.update_displayed(0.5);
        c.data.push(&[0.0]);
        assert!(c.update_displayed(0.5));
        assert_eq!(c.displayed_value(0), 0.5);
        while c.update_displayed(0.5) {}
        assert_eq!(c.displayed_value(0), 0.0);
    }

    #[test]
    fn sub_plots_follow_rank() {
        let mut c = RendererCommon::new(SourceData::new(5, 1, 0.0, 1.0));
        c.rank = 2;
        assert_eq!(c.nb_sub_plots(), 3);
        c.rank = 1;
        assert_eq!(c.nb_sub_plots(), 5);
    }
}
