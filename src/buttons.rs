//! The four decoration buttons shared by every desklet. Loaded once on first
//! desklet creation, reloaded or unloaded as a unit when the configuration
//! changes; read-only for all drawing code afterwards.

use std::path::Path;

use log::warn;

use crate::config::DeskletConfig;
use crate::gpu::TextureCache;
use crate::image::RenderableImage;

const DEFAULT_ROTATE: &str = "data/icons/rotate-desklet.svg";
const DEFAULT_RETACH: &str = "data/icons/retach-desklet.svg";
const DEFAULT_DEPTH_ROTATE: &str = "data/icons/depth-rotate-desklet.svg";
const DEFAULT_NO_INPUT: &str = "data/icons/no-input-desklet.png";

#[derive(Default)]
pub struct DeskletButtons {
    pub rotate: Option<RenderableImage>,
    pub retach: Option<RenderableImage>,
    pub depth_rotate: Option<RenderableImage>,
    pub no_input: Option<RenderableImage>,
}

impl DeskletButtons {
    pub fn load(config: &DeskletConfig, mut textures: Option<&mut TextureCache>) -> Self {
        let size = config.button_size;
        Self {
            rotate: load_one(
                config.rotate_image.as_deref(),
                Path::new(DEFAULT_ROTATE),
                size,
                textures.as_deref_mut(),
            ),
            retach: load_one(
                config.retach_image.as_deref(),
                Path::new(DEFAULT_RETACH),
                size,
                textures.as_deref_mut(),
            ),
            depth_rotate: load_one(
                config.depth_rotate_image.as_deref(),
                Path::new(DEFAULT_DEPTH_ROTATE),
                size,
                textures.as_deref_mut(),
            ),
            no_input: load_one(
                config.no_input_image.as_deref(),
                Path::new(DEFAULT_NO_INPUT),
                size,
                textures.as_deref_mut(),
            ),
        }
    }

    pub fn unload(&mut self, mut textures: Option<&mut TextureCache>) {
        for slot in [
            &mut self.rotate,
            &mut self.retach,
            &mut self.depth_rotate,
            &mut self.no_input,
        ] {
            if let Some(img) = slot {
                img.unload(textures.as_deref_mut());
            }
            *slot = None;
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.rotate.is_some()
            || self.retach.is_some()
            || self.depth_rotate.is_some()
            || self.no_input.is_some()
    }
}

fn load_one(
    override_path: Option<&Path>,
    fallback: &Path,
    size: u32,
    mut textures: Option<&mut TextureCache>,
) -> Option<RenderableImage> {
    let mut image = None;
    if let Some(path) = override_path {
        image = try_load(path, size, textures.as_deref_mut());
    }
    if image.is_none() {
        image = try_load(fallback, size, textures);
    }
    image
}

fn try_load(
    path: &Path,
    size: u32,
    textures: Option<&mut TextureCache>,
) -> Option<RenderableImage> {
    match RenderableImage::from_path(path) {
        Ok(mut img) => {
            img.load_at_size(size, size, textures);
            Some(img)
        }
        Err(e) => {
            warn!("could not load desklet button {}: {e:#}", path.display());
            None
        }
    }
}

/// Alpha applied to the no-input button: it stays visible while the desklet
/// ignores input, on top of the shared fade value.
pub fn no_input_button_alpha(no_input: bool, buttons_alpha: f32) -> f32 {
    if no_input {
        0.4 + 0.6 * buttons_alpha
    } else {
        buttons_alpha
    }
}
