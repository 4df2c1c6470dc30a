//! Desklet decoration configuration block. Parsing of the surrounding
//! configuration file is owned by the embedding application; this is the
//! deserialized slice the desklet manager consumes.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

fn default_theme() -> String {
    "dark".to_string()
}

fn default_button_size() -> u32 {
    16
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DeskletConfig {
    #[serde(default = "default_theme")]
    pub decoration_theme: String,
    #[serde(default = "default_button_size")]
    pub button_size: u32,
    #[serde(default)]
    pub rotate_image: Option<PathBuf>,
    #[serde(default)]
    pub retach_image: Option<PathBuf>,
    #[serde(default)]
    pub depth_rotate_image: Option<PathBuf>,
    #[serde(default)]
    pub no_input_image: Option<PathBuf>,
    /// Used when `decoration_theme` selects the user-custom decoration.
    #[serde(default)]
    pub custom: Option<CustomDecoration>,
}

impl Default for DeskletConfig {
    fn default() -> Self {
        Self {
            decoration_theme: default_theme(),
            button_size: default_button_size(),
            rotate_image: None,
            retach_image: None,
            depth_rotate_image: None,
            no_input_image: None,
            custom: None,
        }
    }
}

impl DeskletConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("parsing desklet configuration")
    }

    /// True when a reload of the shared button images is needed.
    pub fn buttons_differ(&self, other: &DeskletConfig) -> bool {
        self.rotate_image != other.rotate_image
            || self.retach_image != other.retach_image
            || self.depth_rotate_image != other.depth_rotate_image
            || self.no_input_image != other.no_input_image
            || self.button_size != other.button_size
    }
}

fn default_alpha() -> f32 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CustomDecoration {
    #[serde(default)]
    pub background_image: Option<PathBuf>,
    #[serde(default)]
    pub foreground_image: Option<PathBuf>,
    #[serde(default = "default_alpha")]
    pub background_alpha: f32,
    #[serde(default = "default_alpha")]
    pub foreground_alpha: f32,
    #[serde(default)]
    pub left_margin: i32,
    #[serde(default)]
    pub top_margin: i32,
    #[serde(default)]
    pub right_margin: i32,
    #[serde(default)]
    pub bottom_margin: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_empty_document() {
        let cfg = DeskletConfig::from_json("{}").unwrap();
        assert_eq!(cfg.decoration_theme, "dark");
        assert_eq!(cfg.button_size, 16);
        assert!(cfg.rotate_image.is_none());
    }

    #[test]
    fn button_override_triggers_reload() {
        let a = DeskletConfig::default();
        let mut b = DeskletConfig::default();
        assert!(!a.buttons_differ(&b));
        b.rotate_image = Some(PathBuf::from("rotate.svg"));
        assert!(a.buttons_differ(&b));
    }
}
