//! Software rendering surface: a tiny-skia pixmap plus a saved/restored
//! transform stack, so drawing code can be written the same way on both the
//! raster and GPU paths.

use tiny_skia::{
    FillRule, Paint, Path, Pixmap, PixmapPaint, PixmapRef, Stroke, Transform,
};

use crate::utils::Color;

pub struct RasterCanvas {
    pixmap: Pixmap,
    transform: Transform,
    stack: Vec<Transform>,
}

impl RasterCanvas {
    pub fn new(width: u32, height: u32) -> Option<Self> {
        let mut pixmap = Pixmap::new(width, height)?;
        pixmap.fill(Color::TRANSPARENT.to_skia());
        Some(Self {
            pixmap,
            transform: Transform::identity(),
            stack: Vec::new(),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn save(&mut self) {
        self.stack.push(self.transform);
    }

    pub fn restore(&mut self) {
        if let Some(t) = self.stack.pop() {
            self.transform = t;
        }
    }

    pub fn translate(&mut self, tx: f32, ty: f32) {
        self.transform = self.transform.pre_translate(tx, ty);
    }

    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.transform = self.transform.pre_scale(sx, sy);
    }

    pub fn rotate(&mut self, radians: f32) {
        self.transform = self
            .transform
            .pre_concat(Transform::from_rotate(radians.to_degrees()));
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Paints `src` with its top-left corner at (x, y) in the current frame.
    pub fn paint_pixmap(&mut self, src: PixmapRef, x: f32, y: f32, opacity: f32) {
        if opacity <= 0.0 {
            return;
        }
        let paint = PixmapPaint {
            opacity: opacity.min(1.0),
            ..PixmapPaint::default()
        };
        let ts = self.transform.pre_translate(x, y);
        self.pixmap.draw_pixmap(0, 0, src, &paint, ts, None);
    }

    pub fn fill_path(&mut self, path: &Path, paint: &Paint, rule: FillRule) {
        self.pixmap.fill_path(path, paint, rule, self.transform, None);
    }

    pub fn stroke_path(&mut self, path: &Path, paint: &Paint, stroke: &Stroke) {
        self.pixmap.stroke_path(path, paint, stroke, self.transform, None);
    }

    /// Rasterizes an SVG tree under the current transform composed with an
    /// extra local transform.
    pub fn render_svg(&mut self, tree: &resvg::usvg::Tree, local: Transform) {
        let ts = self.transform.pre_concat(local);
        resvg::render(tree, ts, &mut self.pixmap.as_mut());
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn into_pixmap(self) -> Pixmap {
        self.pixmap
    }
}
