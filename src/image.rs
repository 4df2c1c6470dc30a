//! Renderable images: one owned value holding the decoded source, the raster
//! surface at the current target size and the matching GPU texture. The
//! raster and the texture are regenerated together on every resize or
//! reload, so the texture can never go stale relative to the raster.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use log::debug;
use resvg::usvg::{Options, Tree};
use tiny_skia::{IntSize, Pixmap, Transform};

use crate::gpu::{TextureCache, TextureId};
use crate::utils::Size;

pub enum ImageSource {
    Svg(Tree),
    Raster(Pixmap),
}

pub struct RenderableImage {
    source: ImageSource,
    natural: Size,
    pixmap: Option<Pixmap>,
    texture: Option<TextureId>,
}

impl RenderableImage {
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let is_svg = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("svg"))
            .unwrap_or(false);

        let (source, natural) = if is_svg {
            let opt = Options::default();
            let tree = Tree::from_data(&data, &opt)
                .map_err(|e| anyhow!("parsing {}: {e}", path.display()))?;
            let size = Size {
                width: tree.size().width(),
                height: tree.size().height(),
            };
            (ImageSource::Svg(tree), size)
        } else {
            let decoded = image::load_from_memory(&data)
                .with_context(|| format!("decoding {}", path.display()))?
                .to_rgba8();
            let (w, h) = decoded.dimensions();
            let pixmap = premultiplied_pixmap(decoded.into_raw(), w, h)
                .ok_or_else(|| anyhow!("empty image {}", path.display()))?;
            let size = Size {
                width: w as f32,
                height: h as f32,
            };
            (ImageSource::Raster(pixmap), size)
        };

        Ok(Self {
            source,
            natural,
            pixmap: None,
            texture: None,
        })
    }

    pub fn natural_size(&self) -> Size {
        self.natural
    }

    pub fn svg_tree(&self) -> Option<&Tree> {
        match &self.source {
            ImageSource::Svg(tree) => Some(tree),
            ImageSource::Raster(_) => None,
        }
    }

    /// Rasterizes the source at `width` x `height` and, when a texture cache
    /// is supplied, re-creates the GPU texture from the fresh raster in the
    /// same step.
    pub fn load_at_size(
        &mut self,
        width: u32,
        height: u32,
        textures: Option<&mut TextureCache>,
    ) {
        debug!("loading image at {}x{}", width, height);
        if width == 0 || height == 0 {
            return;
        }
        let pixmap = match &self.source {
            ImageSource::Svg(tree) => {
                let mut pixmap = match Pixmap::new(width, height) {
                    Some(p) => p,
                    None => return,
                };
                let ts = Transform::from_scale(
                    width as f32 / self.natural.width,
                    height as f32 / self.natural.height,
                );
                resvg::render(tree, ts, &mut pixmap.as_mut());
                pixmap
            }
            ImageSource::Raster(src) => {
                let mut pixmap = match Pixmap::new(width, height) {
                    Some(p) => p,
                    None => return,
                };
                let ts = Transform::from_scale(
                    width as f32 / self.natural.width,
                    height as f32 / self.natural.height,
                );
                pixmap.draw_pixmap(
                    0,
                    0,
                    src.as_ref(),
                    &tiny_skia::PixmapPaint::default(),
                    ts,
                    None,
                );
                pixmap
            }
        };

        if let Some(cache) = textures {
            if let Some(old) = self.texture.take() {
                cache.delete(old);
            }
            self.texture = Some(cache.create_from_pixmap(&pixmap));
        }
        self.pixmap = Some(pixmap);
    }

    /// Replaces raster and texture with an externally produced pixmap,
    /// keeping the two-sided regeneration invariant.
    pub fn set_rendered(&mut self, pixmap: Pixmap, textures: Option<&mut TextureCache>) {
        if let Some(cache) = textures {
            if let Some(old) = self.texture.take() {
                cache.delete(old);
            }
            self.texture = Some(cache.create_from_pixmap(&pixmap));
        }
        self.pixmap = Some(pixmap);
    }

    pub fn unload(&mut self, textures: Option<&mut TextureCache>) {
        self.pixmap = None;
        if let Some(old) = self.texture.take() {
            if let Some(cache) = textures {
                cache.delete(old);
            }
        }
    }

    pub fn pixmap(&self) -> Option<&Pixmap> {
        self.pixmap.as_ref()
    }

    pub fn texture(&self) -> Option<TextureId> {
        self.texture
    }
}

fn premultiplied_pixmap(mut rgba: Vec<u8>, width: u32, height: u32) -> Option<Pixmap> {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        px[0] = (px[0] as u16 * a / 255) as u8;
        px[1] = (px[1] as u16 * a / 255) as u8;
        px[2] = (px[2] as u16 * a / 255) as u8;
    }
    Pixmap::from_vec(rgba, IntSize::from_wh(width, height)?)
}
