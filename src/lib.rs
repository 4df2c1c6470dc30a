//! Desklet engine: a registry of free-floating widget windows plus the
//! rendering machinery behind them. Desklets draw through either a software
//! raster canvas or a recorded GPU frame, decorate themselves with themed
//! images and corner buttons, and host pluggable data renderers (gauges,
//! graphs) for live values.

pub mod anim;
pub mod buttons;
pub mod config;
pub mod data_renderer;
pub mod desklet;
pub mod events;
pub mod geometry;
pub mod gpu;
pub mod image;
pub mod picking;
pub mod raster;
pub mod utils;

pub use buttons::DeskletButtons;
pub use config::{CustomDecoration, DeskletConfig};
pub use data_renderer::{DataRenderer, GaugeTheme, GraphAttributes, GraphKind, SourceData};
pub use desklet::{
    Desklet, DeskletAttributes, DeskletId, DeskletManager, DeskletRenderer, DeskletVisibility,
    Icon, IconSlot, Margins,
};
pub use events::{Bus, EventCtx, EventKind, Propagation, RenderTarget};
pub use geometry::{desklet_matrix, zoom_for_rotation, DeskletTransform, Mat4, ANGLE_MIN};
pub use gpu::{GpuFrame, TextureCache, TextureId};
pub use image::RenderableImage;
pub use picking::find_clicked_icon;
pub use raster::RasterCanvas;
pub use utils::{Color, PointerInfo, Position, Rectangle, Size};
