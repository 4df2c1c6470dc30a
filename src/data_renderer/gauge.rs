//! Gauge renderer: a themed dial where each value drives either a rotating
//! needle or a sequence of image frames. Themes are directories holding a
//! `theme.xml` manifest plus the SVG assets it references.

use std::f32::consts::PI;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::{debug, warn};
use roxmltree::{Document, Node};
use tiny_skia::Transform;

use crate::gpu::TextureCache;
use crate::image::RenderableImage;
use crate::raster::RasterCanvas;

use super::{sub_plot_frame, EmblemZone, OverlayZone, RendererCommon, MAX_SUB_PLOTS};

/// Decimal parser tolerant of locales that write a comma separator.
fn str2double(s: &str) -> f32 {
    s.trim().replace(',', ".").parse().unwrap_or(0.0)
}

/// One value slot of a theme: a needle pivoting over the dial, or a stack of
/// frames indexed by the value.
pub struct GaugeIndicator {
    /// Pivot, relative to the dial center in [-1, 1].
    pub pos_x: f32,
    pub pos_y: f32,
    /// Needle angles in degrees at value 0 and 1.
    pub pos_start: f32,
    pub pos_stop: f32,
    /// Negative flips the sweep direction.
    pub direction: f32,
    pub frames: Vec<RenderableImage>,
    pub needle: Option<RenderableImage>,
    pub needle_real_width: f32,
    pub needle_real_height: f32,
    pub needle_offset_x: f32,
    pub needle_offset_y: f32,
    pub needle_scale: f32,
    pub needle_width: f32,
    pub needle_height: f32,
    pub text_zone: OverlayZone,
    pub label_zone: OverlayZone,
    pub emblem: EmblemZone,
}

impl Default for GaugeIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl GaugeIndicator {
    pub fn new() -> Self {
        Self {
            pos_x: 0.0,
            pos_y: 0.0,
            pos_start: 0.0,
            pos_stop: 0.0,
            direction: 1.0,
            frames: Vec::new(),
            needle: None,
            needle_real_width: 0.0,
            needle_real_height: 0.0,
            needle_offset_x: 0.0,
            needle_offset_y: 0.0,
            needle_scale: 1.0,
            needle_width: 0.0,
            needle_height: 0.0,
            text_zone: OverlayZone::default(),
            label_zone: OverlayZone::default(),
            emblem: EmblemZone::default(),
        }
    }
}

/// A parsed gauge theme; images are decoded but not yet sized.
pub struct GaugeTheme {
    pub name: String,
    pub rank: usize,
    pub background: Option<RenderableImage>,
    pub foreground: Option<RenderableImage>,
    pub indicators: Vec<GaugeIndicator>,
}

impl GaugeTheme {
    pub fn from_dir(dir: &Path) -> Result<GaugeTheme> {
        let manifest = dir.join("theme.xml");
        let text = fs::read_to_string(&manifest)
            .with_context(|| format!("reading {}", manifest.display()))?;
        Self::parse(&text, dir)
    }

    /// Parses a `theme.xml` document; asset paths are resolved against `dir`.
    /// A missing asset degrades to the image staying absent, like any other
    /// optional decoration.
    pub fn parse(xml: &str, dir: &Path) -> Result<GaugeTheme> {
        let doc = Document::parse(xml).context("parsing gauge theme")?;
        let root = doc.root_element();
        if !root.has_tag_name("gauge") {
            bail!("not a gauge theme: root element is <{}>", root.tag_name().name());
        }

        let mut theme = GaugeTheme {
            name: String::new(),
            rank: 0,
            background: None,
            foreground: None,
            indicators: Vec::new(),
        };
        // Pre-v2 themes store zone centers in [-1, 1] and pivots in [-0.5, 0.5];
        // both are normalized here to pivots in [-1, 1] and zones in [-0.5, 0.5].
        let mut ratio_xy = 1.0;
        let mut ratio_text = 2.0;

        for node in root.children().filter(Node::is_element) {
            match node.tag_name().name() {
                "name" => theme.name = text_of(&node).to_string(),
                "rank" => theme.rank = text_of(&node).parse().unwrap_or(0),
                "version" => {
                    if text_of(&node).parse::<u32>().unwrap_or(1) == 2 {
                        ratio_text = 1.0;
                        ratio_xy = 2.0;
                    }
                }
                "file" => match node.attribute("key") {
                    Some("background") => theme.background = open_asset(dir, text_of(&node)),
                    Some("foreground") => theme.foreground = open_asset(dir, text_of(&node)),
                    _ => {}
                },
                "indicator" => {
                    if theme.rank == 0 {
                        theme.rank = root
                            .children()
                            .filter(|n| n.has_tag_name("indicator"))
                            .count();
                    }
                    theme
                        .indicators
                        .push(parse_indicator(&node, dir, ratio_xy, ratio_text));
                }
                _ => {}
            }
        }

        if theme.rank == 0 || theme.indicators.is_empty() {
            bail!("gauge theme '{}' declares no indicator", theme.name);
        }
        Ok(theme)
    }
}

fn text_of<'a>(node: &'a Node) -> &'a str {
    node.text().unwrap_or("").trim()
}

fn open_asset(dir: &Path, file: &str) -> Option<RenderableImage> {
    let path = dir.join(file);
    match RenderableImage::from_path(&path) {
        Ok(img) => Some(img),
        Err(e) => {
            warn!("gauge asset {}: {e:#}", path.display());
            None
        }
    }
}

fn parse_indicator(node: &Node, dir: &Path, ratio_xy: f32, ratio_text: f32) -> GaugeIndicator {
    let mut ind = GaugeIndicator::new();
    let mut nb_images: usize = 0;

    for sub in node.children().filter(Node::is_element) {
        let content = text_of(&sub);
        match sub.tag_name().name() {
            "text" => {}
            "posX" => ind.pos_x = str2double(content) * ratio_xy,
            "posY" => ind.pos_y = str2double(content) * ratio_xy,
            "direction" => ind.direction = str2double(content),
            "posStart" => ind.pos_start = str2double(content),
            "posStop" => ind.pos_stop = str2double(content),
            "nb images" => nb_images = content.parse().unwrap_or(0),
            "offset_x" => ind.needle_offset_x = content.parse().unwrap_or(0.0),
            "width" => ind.needle_real_width = content.parse().unwrap_or(0.0),
            "height" => {
                ind.needle_real_height = content.parse().unwrap_or(0.0);
                ind.needle_offset_y = 0.5 * ind.needle_real_height;
            }
            "text_zone" => ind.text_zone = parse_zone(&sub, ratio_text),
            "label_zone" => ind.label_zone = parse_zone(&sub, 1.0),
            "logo_zone" => ind.emblem = parse_emblem(&sub),
            "file" => match sub.attribute("key") {
                Some("needle") if ind.needle.is_none() => {
                    ind.needle = open_asset(dir, content);
                }
                Some("image") => {
                    if nb_images == 0 || ind.frames.len() < nb_images {
                        if let Some(img) = open_asset(dir, content) {
                            ind.frames.push(img);
                        }
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }

    if let Some(needle) = &ind.needle {
        // Needle geometry defaults derived from the SVG's natural size; the
        // artwork lays the needle out horizontally.
        let natural = needle.natural_size();
        if ind.needle_real_height == 0.0 {
            ind.needle_real_height = 0.12 * natural.height;
            ind.needle_offset_y = ind.needle_real_height / 2.0;
        }
        if ind.needle_real_width == 0.0 {
            ind.needle_real_width = natural.height;
            ind.needle_offset_x = 10.0;
        }
    }
    ind
}

fn parse_zone(node: &Node, ratio_text: f32) -> OverlayZone {
    let mut zone = OverlayZone {
        color: crate::utils::Color::new(0.0, 0.0, 0.0, 1.0),
        ..OverlayZone::default()
    };
    for sub in node.children().filter(Node::is_element) {
        let v = str2double(text_of(&sub));
        match sub.tag_name().name() {
            "x_center" => zone.x_center = v / ratio_text,
            "y_center" => zone.y_center = v / ratio_text,
            "width" => zone.width = v,
            "height" => zone.height = v,
            "red" => zone.color.r = v,
            "green" => zone.color.g = v,
            "blue" => zone.color.b = v,
            "alpha" => zone.color.a = v,
            _ => {}
        }
    }
    zone
}

fn parse_emblem(node: &Node) -> EmblemZone {
    let mut emblem = EmblemZone {
        alpha: 1.0,
        ..EmblemZone::default()
    };
    for sub in node.children().filter(Node::is_element) {
        let v = str2double(text_of(&sub));
        match sub.tag_name().name() {
            "x_center" => emblem.x_center = v,
            "y_center" => emblem.y_center = v,
            "width" => emblem.width = v,
            "height" => emblem.height = v,
            "alpha" => emblem.alpha = v,
            _ => {}
        }
    }
    emblem
}

pub struct Gauge {
    theme: GaugeTheme,
}

impl Gauge {
    pub fn new(theme: GaugeTheme) -> Self {
        Self { theme }
    }

    pub fn theme(&self) -> &GaugeTheme {
        &self.theme
    }

    /// Sizes every theme asset for the drawing area and binds the indicator
    /// overlay zones onto the series, round-robin when there are more series
    /// than indicators.
    pub fn load(
        &mut self,
        common: &mut RendererCommon,
        mut textures: Option<&mut TextureCache>,
    ) -> Result<()> {
        let (w, h) = (common.width as u32, common.height as u32);
        if w == 0 || h == 0 {
            bail!("gauge loaded with a zero-sized drawing area");
        }
        debug!("loading gauge theme '{}' at {}x{}", self.theme.name, w, h);
        common.rank = self.theme.rank;

        if let Some(bg) = self.theme.background.as_mut() {
            bg.load_at_size(w, h, textures.as_deref_mut());
        }
        if let Some(fg) = self.theme.foreground.as_mut() {
            fg.load_at_size(w, h, textures.as_deref_mut());
        }
        for ind in &mut self.theme.indicators {
            // The frame images can wait until drawn on the raster path, but
            // textures must exist before the first GPU frame.
            if textures.is_some() {
                for frame in &mut ind.frames {
                    frame.load_at_size(w, h, textures.as_deref_mut());
                }
            }
            size_needle(ind, common.width, common.height, textures.as_deref_mut());
        }

        let nb = common.data.nb_series();
        common.text_zones.clear();
        common.label_zones.clear();
        common.emblem_zones.clear();
        for i in 0..nb {
            let ind = &self.theme.indicators[i % self.theme.indicators.len()];
            common.text_zones.push(ind.text_zone);
            common.label_zones.push(ind.label_zone);
            common.emblem_zones.push(ind.emblem);
        }
        Ok(())
    }

    pub fn render_raster(&mut self, common: &RendererCommon, canvas: &mut RasterCanvas) {
        let n = common.nb_sub_plots().min(MAX_SUB_PLOTS);
        let mut offset = 0;
        for plot in 0..n {
            canvas.save();
            if n > 1 {
                let (fx, fy, s) = sub_plot_frame(plot, n);
                canvas.translate(fx * common.width, fy * common.height);
                canvas.scale(s, s);
            }
            self.draw_one_raster(common, canvas, offset);
            canvas.restore();
            offset += common.rank;
        }
    }

    fn draw_one_raster(&mut self, common: &RendererCommon, canvas: &mut RasterCanvas, offset: usize) {
        if let Some(pixmap) = self.theme.background.as_ref().and_then(|i| i.pixmap()) {
            canvas.paint_pixmap(pixmap.as_ref(), 0.0, 0.0, 1.0);
        }

        let bg_natural = self
            .theme
            .background
            .as_ref()
            .map(|bg| bg.natural_size());
        let count = self
            .theme
            .indicators
            .len()
            .min(common.data.nb_series().saturating_sub(offset));
        for slot in 0..count {
            let value = common.data.series[offset + slot].normalized(0);
            let ind = &mut self.theme.indicators[slot];
            if ind.needle.is_some() {
                draw_needle_raster(ind, bg_natural, common.width, common.height, value, canvas);
            } else {
                draw_frame_raster(ind, common.width as u32, common.height as u32, value, canvas);
            }
        }

        if let Some(pixmap) = self.theme.foreground.as_ref().and_then(|i| i.pixmap()) {
            canvas.paint_pixmap(pixmap.as_ref(), 0.0, 0.0, 1.0);
        }
    }

    pub fn render_gpu(&mut self, common: &RendererCommon, frame: &mut crate::gpu::GpuFrame) {
        let n = common.nb_sub_plots().min(MAX_SUB_PLOTS);
        let (w, h) = (common.width, common.height);
        let mut offset = 0;
        for plot in 0..n {
            if n > 1 {
                frame.push_matrix();
                // Same quadrants as the raster path, expressed from the center.
                let (tx, ty, s) = match plot {
                    0 => (-w / 6.0, h / 6.0, 2.0 / 3.0),
                    1 => (w / 3.0, -h / 3.0, 1.0 / 3.0),
                    2 => (w / 3.0, h / 3.0, 1.0 / 3.0),
                    _ => (-w / 3.0, -h / 3.0, 1.0 / 3.0),
                };
                frame.translate(tx, ty, 0.0);
                frame.scale(s, s, 1.0);
            }
            self.draw_one_gpu(common, frame, offset);
            if n > 1 {
                frame.pop_matrix();
            }
            offset += common.rank;
        }
    }

    fn draw_one_gpu(&mut self, common: &RendererCommon, frame: &mut crate::gpu::GpuFrame, offset: usize) {
        let (w, h) = (common.width, common.height);
        frame.set_alpha(1.0);
        if let Some(texture) = self.theme.background.as_ref().and_then(|i| i.texture()) {
            frame.draw_texture_at_size(texture, w, h);
        }

        let count = self
            .theme
            .indicators
            .len()
            .min(common.data.nb_series().saturating_sub(offset));
        for slot in 0..count {
            let value = common.displayed_value(offset + slot);
            let ind = &self.theme.indicators[slot];
            if ind.needle.is_some() {
                draw_needle_gpu(ind, w, h, value, frame);
            } else {
                let Some(img) = frame_for_value(&ind.frames, value) else {
                    continue;
                };
                if let Some(texture) = img.texture() {
                    frame.draw_texture_at_size(texture, w, h);
                }
            }
        }

        if let Some(texture) = self.theme.foreground.as_ref().and_then(|i| i.texture()) {
            frame.draw_texture_at_size(texture, w, h);
        }
    }

    pub fn unload(&mut self, common: &mut RendererCommon, mut textures: Option<&mut TextureCache>) {
        for slot in [&mut self.theme.background, &mut self.theme.foreground] {
            if let Some(img) = slot {
                img.unload(textures.as_deref_mut());
            }
        }
        for ind in &mut self.theme.indicators {
            for img in &mut ind.frames {
                img.unload(textures.as_deref_mut());
            }
            if let Some(needle) = ind.needle.as_mut() {
                needle.unload(textures.as_deref_mut());
            }
        }
        common.text_zones.clear();
        common.label_zones.clear();
        common.emblem_zones.clear();
    }
}

/// Needle sweep angle in degrees for a normalized value.
pub fn needle_angle(ind: &GaugeIndicator, value: f32) -> f32 {
    let angle = ind.pos_start + value * (ind.pos_stop - ind.pos_start);
    if ind.direction < 0.0 {
        -angle
    } else {
        angle
    }
}

fn size_needle(
    ind: &mut GaugeIndicator,
    width: f32,
    height: f32,
    textures: Option<&mut TextureCache>,
) {
    let Some(needle) = ind.needle.as_mut() else {
        return;
    };
    let natural = needle.natural_size();
    // The artwork is horizontal, so its width rules the scale.
    ind.needle_scale = width.min(height) / natural.width;
    ind.needle_width = ind.needle_real_width * ind.needle_scale;
    ind.needle_height = ind.needle_real_height * ind.needle_scale;

    let Some(cache) = textures else {
        return;
    };
    let Some(tree) = needle.svg_tree() else {
        return;
    };
    let (nw, nh) = (ind.needle_width as u32, ind.needle_height as u32);
    let Some(mut canvas) = RasterCanvas::new(nw.max(1), nh.max(1)) else {
        return;
    };
    canvas.scale(ind.needle_scale, ind.needle_scale);
    canvas.translate(ind.needle_offset_x, ind.needle_offset_y);
    canvas.render_svg(tree, Transform::identity());
    let pixmap = canvas.into_pixmap();
    needle.set_rendered(pixmap, Some(cache));
}

fn draw_needle_raster(
    ind: &GaugeIndicator,
    bg_natural: Option<crate::utils::Size>,
    width: f32,
    height: f32,
    value: f32,
    canvas: &mut RasterCanvas,
) {
    let Some(needle) = &ind.needle else {
        return;
    };
    let Some(tree) = needle.svg_tree() else {
        return;
    };
    let natural = needle.natural_size();
    let dial = bg_natural.unwrap_or(natural);
    let half_x = dial.width / 2.0 * (1.0 + ind.pos_x);
    let half_y = dial.height / 2.0 * (1.0 - ind.pos_y);
    let angle = needle_angle(ind, value) * PI / 180.0;

    canvas.save();
    canvas.scale(width / natural.width, height / natural.height);
    canvas.translate(half_x, half_y);
    canvas.rotate(-PI / 2.0 + angle);
    canvas.render_svg(tree, Transform::identity());
    canvas.restore();
}

fn draw_needle_gpu(ind: &GaugeIndicator, width: f32, height: f32, value: f32, frame: &mut crate::gpu::GpuFrame) {
    let Some(texture) = ind.needle.as_ref().and_then(|n| n.texture()) else {
        return;
    };
    let angle = needle_angle(ind, value);
    let half_x = width / 2.0 * ind.pos_x;
    let half_y = height / 2.0 * ind.pos_y;

    frame.push_matrix();
    frame.translate(half_x, half_y, 0.0);
    frame.rotate_z((90.0 - angle).to_radians());
    frame.translate(
        ind.needle_width / 2.0 - ind.needle_scale * ind.needle_offset_x,
        0.0,
        0.0,
    );
    frame.draw_texture_at_size(texture, ind.needle_width, ind.needle_height);
    frame.pop_matrix();
}

/// Frame index for a normalized value, rounded to the nearest image.
fn frame_for_value(frames: &[RenderableImage], value: f32) -> Option<&RenderableImage> {
    if frames.is_empty() {
        return None;
    }
    let index = (value * (frames.len() - 1) as f32 + 0.5) as usize;
    frames.get(index.min(frames.len() - 1))
}

fn draw_frame_raster(
    ind: &mut GaugeIndicator,
    width: u32,
    height: u32,
    value: f32,
    canvas: &mut RasterCanvas,
) {
    if ind.frames.is_empty() {
        return;
    }
    let index = ((value * (ind.frames.len() - 1) as f32 + 0.5) as usize).min(ind.frames.len() - 1);
    let img = &mut ind.frames[index];
    if img.pixmap().is_none() {
        img.load_at_size(width, height, None);
    }
    if let Some(pixmap) = img.pixmap() {
        canvas.paint_pixmap(pixmap.as_ref(), 0.0, 0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_decimals_parse() {
        assert_eq!(str2double("-3,5"), -3.5);
        assert_eq!(str2double(" 0.25 "), 0.25);
        assert_eq!(str2double("junk"), 0.0);
    }

    #[test]
    fn needle_angle_follows_direction() {
        let mut ind = GaugeIndicator::new();
        ind.pos_start = -120.0;
        ind.pos_stop = 120.0;
        assert_eq!(needle_angle(&ind, 0.5), 0.0);
        assert_eq!(needle_angle(&ind, 1.0), 120.0);
        ind.direction = -1.0;
        assert_eq!(needle_angle(&ind, 1.0), -120.0);
    }
}
