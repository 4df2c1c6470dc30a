//! Desklet objects, their pluggable renderers, the process-wide registry and
//! the chrome drawing for both backends.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use log::debug;
use uuid::Uuid;

use crate::anim;
use crate::buttons::{no_input_button_alpha, DeskletButtons};
use crate::config::DeskletConfig;
use crate::events::{Bus, EventCtx, EventKind, Propagation, RenderTarget};
use crate::geometry::{self, DeskletTransform, ANGLE_MIN};
use crate::gpu::{GpuFrame, TextureCache};
use crate::image::RenderableImage;
use crate::raster::RasterCanvas;
use crate::utils::Position;

/// One icon hosted by a desklet; `draw_x`/`draw_y` are its top-left corner in
/// desklet-local coordinates.
#[derive(Debug, Clone)]
pub struct Icon {
    pub name: String,
    pub draw_x: f32,
    pub draw_y: f32,
    pub width: f32,
    pub height: f32,
    pub scale: f32,
    pub texture: Option<crate::gpu::TextureId>,
}

impl Icon {
    pub fn new(name: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            name: name.into(),
            draw_x: 0.0,
            draw_y: 0.0,
            width,
            height,
            scale: 1.0,
            texture: None,
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.draw_x < x
            && self.draw_x + self.width * self.scale > x
            && self.draw_y < y
            && self.draw_y + self.height * self.scale > y
    }
}

/// Which icon of a desklet a picking query resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconSlot {
    Primary,
    Secondary(usize),
}

/// Pluggable content renderer. The desklet draws its own chrome (decorations,
/// buttons, rotation); the renderer only fills the margin-inset content area.
pub trait DeskletRenderer {
    fn render_raster(&mut self, canvas: &mut RasterCanvas, desklet: &Desklet);

    fn render_gpu(&mut self, _frame: &mut GpuFrame, _desklet: &Desklet) {}

    /// Whether `render_gpu` actually draws; also selects GPU picking.
    fn has_gpu(&self) -> bool {
        false
    }

    /// Draws the renderer's own bounding geometry for selection mode.
    /// Returns false when the renderer has none, in which case picking falls
    /// back to per-icon quads.
    fn render_bounding_box(&mut self, _frame: &mut GpuFrame, _desklet: &Desklet) -> bool {
        false
    }
}

/// Desklet-level bounding-box callback; outranks the renderer's own.
pub type BoundingBoxFn = Box<dyn Fn(&mut GpuFrame, &Desklet)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeskletId(pub Uuid);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeskletVisibility {
    #[default]
    Normal,
    KeepAbove,
    KeepBelow,
    OnWidgetLayer,
    ReserveSpace,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Margins {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Margins {
    pub fn any(&self) -> bool {
        self.left != 0.0 || self.top != 0.0 || self.right != 0.0 || self.bottom != 0.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeskletAttributes {
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub visibility: Option<DeskletVisibility>,
    pub decoration_theme: Option<String>,
    pub position_locked: bool,
}

pub struct Desklet {
    pub id: DeskletId,
    pub native_window: Option<u64>,
    pub icon: Option<Icon>,
    pub icons: Vec<Icon>,
    pub width: f32,
    pub height: f32,
    rotation: f32,
    pub depth_rotation_x: f32,
    pub depth_rotation_y: f32,
    pub ratio: f32,
    pub buttons_alpha: f32,
    pub rotating: bool,
    pub rotating_x: bool,
    pub rotating_y: bool,
    pub growing_up: bool,
    pub buttons_apparition: bool,
    pub no_input: bool,
    pub allow_no_clickable: bool,
    pub allow_minimize: bool,
    pub inside_cursor: bool,
    pub position_locked: bool,
    pub visibility: DeskletVisibility,
    pub keep_below: bool,
    pub decoration_theme: Option<String>,
    pub background: Option<RenderableImage>,
    pub foreground: Option<RenderableImage>,
    pub background_alpha: f32,
    pub foreground_alpha: f32,
    pub margins: Margins,
    pub mouse: Position,
    pub mouse_2d: Position,
    pub picked_object: u32,
    pub renderer: Option<Box<dyn DeskletRenderer>>,
    pub bounding_box_override: Option<BoundingBoxFn>,
}

impl Desklet {
    fn new(icon: Option<Icon>) -> Self {
        Self {
            id: DeskletId(Uuid::new_v4()),
            native_window: None,
            icon,
            icons: Vec::new(),
            width: 0.0,
            height: 0.0,
            rotation: 0.0,
            depth_rotation_x: 0.0,
            depth_rotation_y: 0.0,
            ratio: 1.0,
            buttons_alpha: 0.0,
            rotating: false,
            rotating_x: false,
            rotating_y: false,
            growing_up: false,
            buttons_apparition: false,
            no_input: false,
            allow_no_clickable: false,
            allow_minimize: false,
            inside_cursor: false,
            position_locked: false,
            visibility: DeskletVisibility::default(),
            keep_below: false,
            decoration_theme: None,
            background: None,
            foreground: None,
            background_alpha: 1.0,
            foreground_alpha: 1.0,
            margins: Margins::default(),
            mouse: Position::default(),
            mouse_2d: Position::default(),
            picked_object: 0,
            renderer: None,
            bounding_box_override: None,
        }
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Stores the in-plane angle wrapped into (-pi, pi].
    pub fn set_rotation(&mut self, radians: f32) {
        use std::f32::consts::PI;
        let mut a = radians % (2.0 * PI);
        if a > PI {
            a -= 2.0 * PI;
        } else if a <= -PI {
            a += 2.0 * PI;
        }
        self.rotation = a;
    }

    /// A desklet is free when the user may grab, rotate or retach it.
    pub fn is_free(&self) -> bool {
        !self.position_locked
    }

    pub fn icon(&self, slot: IconSlot) -> Option<&Icon> {
        match slot {
            IconSlot::Primary => self.icon.as_ref(),
            IconSlot::Secondary(i) => self.icons.get(i),
        }
    }

    pub fn transform(&self) -> DeskletTransform {
        DeskletTransform {
            width: self.width,
            height: self.height,
            ratio: self.ratio,
            rotation: self.rotation,
            depth_rotation_x: self.depth_rotation_x,
            depth_rotation_y: self.depth_rotation_y,
        }
    }

    fn apply_attributes(&mut self, attrs: &DeskletAttributes) {
        if let Some(w) = attrs.width {
            self.width = w;
        }
        if let Some(h) = attrs.height {
            self.height = h;
        }
        if let Some(v) = attrs.visibility {
            self.visibility = v;
        }
        if attrs.decoration_theme.is_some() {
            self.decoration_theme = attrs.decoration_theme.clone();
        }
        self.position_locked = attrs.position_locked;
    }
}

/// Owns every live desklet, the shared button images and the notification
/// bus. Single-threaded: all mutation happens on the UI/event thread.
pub struct DeskletManager {
    desklets: Vec<Desklet>,
    pub bus: Bus,
    pub textures: TextureCache,
    buttons: Option<DeskletButtons>,
    config: DeskletConfig,
    startup: Instant,
    ready: bool,
    animating: HashSet<DeskletId>,
    pub gpu_active: bool,
    pub has_main_dock: bool,
}

const STARTUP_GRACE: Duration = Duration::from_secs(5);

impl DeskletManager {
    pub fn new(config: DeskletConfig) -> Self {
        let mut bus = Bus::new();
        bus.subscribe(
            EventKind::Update,
            Box::new(anim::on_update),
            true,
        );
        bus.subscribe(
            EventKind::EnterDesklet,
            Box::new(anim::on_enter_leave),
            true,
        );
        bus.subscribe(
            EventKind::LeaveDesklet,
            Box::new(anim::on_enter_leave),
            true,
        );
        bus.subscribe(
            EventKind::Render,
            Box::new(|desklet, ctx| {
                let buttons = ctx.buttons;
                let button_size = ctx.button_size;
                let has_main_dock = ctx.has_main_dock;
                match ctx.render.take() {
                    Some(RenderTarget::Raster(canvas)) => {
                        render_desklet_raster(desklet, canvas, buttons, button_size, has_main_dock)
                    }
                    Some(RenderTarget::Gpu(frame)) => {
                        render_desklet_gpu(desklet, frame, buttons, button_size, has_main_dock)
                    }
                    None => {}
                }
                Propagation::Continue
            }),
            true,
        );

        Self {
            desklets: Vec::new(),
            bus,
            textures: TextureCache::new(),
            buttons: None,
            config,
            startup: Instant::now(),
            ready: false,
            animating: HashSet::new(),
            gpu_active: false,
            has_main_dock: true,
        }
    }

    /// False during a fixed grace window after startup, then true forever;
    /// lets callers ignore the geometry-configure noise window managers emit
    /// while they place windows.
    pub fn is_ready(&mut self) -> bool {
        if !self.ready {
            self.ready = self.startup.elapsed() >= STARTUP_GRACE;
        }
        self.ready
    }

    pub fn create(&mut self, icon: Icon, attrs: Option<&DeskletAttributes>) -> DeskletId {
        let mut desklet = Desklet::new(Some(icon));
        if let Some(attrs) = attrs {
            desklet.apply_attributes(attrs);
        }

        if self.buttons.as_ref().map_or(true, |b| !b.is_loaded()) {
            self.load_buttons();
        }

        let id = desklet.id;
        // Most-recently-created first.
        self.desklets.insert(0, desklet);

        let Self { desklets, bus, .. } = self;
        let mut ctx = EventCtx::default();
        bus.dispatch(EventKind::NewDesklet, &mut desklets[0], &mut ctx);
        id
    }

    /// Releases the desklet's resources and removes it from the registry and
    /// from the pending animation set. Icons are handed back untouched.
    pub fn destroy(&mut self, id: DeskletId) -> bool {
        self.animating.remove(&id);
        let Some(index) = self.desklets.iter().position(|d| d.id == id) else {
            return false;
        };
        let mut desklet = self.desklets.remove(index);
        if let Some(bg) = desklet.background.as_mut() {
            bg.unload(Some(&mut self.textures));
        }
        if let Some(fg) = desklet.foreground.as_mut() {
            fg.unload(Some(&mut self.textures));
        }
        debug!("desklet {:?} destroyed", id);
        true
    }

    pub fn desklet(&self, id: DeskletId) -> Option<&Desklet> {
        self.desklets.iter().find(|d| d.id == id)
    }

    pub fn desklet_mut(&mut self, id: DeskletId) -> Option<&mut Desklet> {
        self.desklets.iter_mut().find(|d| d.id == id)
    }

    /// Iterates in registry order and returns the first desklet matching the
    /// predicate.
    pub fn find(&self, predicate: impl Fn(&Desklet) -> bool) -> Option<&Desklet> {
        self.desklets.iter().find(|d| predicate(d))
    }

    pub fn desklet_by_window(&self, window: u64) -> Option<&Desklet> {
        self.find(|d| d.native_window == Some(window))
    }

    pub fn for_each_icon(&self, mut f: impl FnMut(&Icon, &Desklet)) {
        for desklet in &self.desklets {
            if let Some(icon) = &desklet.icon {
                f(icon, desklet);
            }
            for icon in &desklet.icons {
                f(icon, desklet);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.desklets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.desklets.is_empty()
    }

    pub fn is_animating(&self, id: DeskletId) -> bool {
        self.animating.contains(&id)
    }

    /// One animation frame for `id`. Returns true while the desklet wants
    /// further frames; the desklet leaves the animation set otherwise.
    pub fn tick(&mut self, id: DeskletId) -> bool {
        let Self {
            desklets,
            bus,
            animating,
            ..
        } = self;
        let Some(desklet) = desklets.iter_mut().find(|d| d.id == id) else {
            animating.remove(&id);
            return false;
        };
        let mut ctx = EventCtx::default();
        bus.dispatch(EventKind::Update, desklet, &mut ctx);
        if !ctx.continue_animation {
            animating.remove(&id);
        }
        ctx.continue_animation
    }

    pub fn pointer_enter(&mut self, id: DeskletId) {
        self.pointer_crossing(id, true, EventKind::EnterDesklet);
    }

    pub fn pointer_leave(&mut self, id: DeskletId) {
        self.pointer_crossing(id, false, EventKind::LeaveDesklet);
    }

    fn pointer_crossing(&mut self, id: DeskletId, inside: bool, kind: EventKind) {
        let Self {
            desklets,
            bus,
            animating,
            ..
        } = self;
        let Some(desklet) = desklets.iter_mut().find(|d| d.id == id) else {
            return;
        };
        desklet.inside_cursor = inside;
        let mut ctx = EventCtx::default();
        bus.dispatch(kind, desklet, &mut ctx);
        if ctx.start_animation {
            animating.insert(id);
        }
    }

    pub fn render_raster(&mut self, id: DeskletId, canvas: &mut RasterCanvas) {
        let Self {
            desklets,
            bus,
            buttons,
            config,
            has_main_dock,
            ..
        } = self;
        let Some(desklet) = desklets.iter_mut().find(|d| d.id == id) else {
            return;
        };
        let mut ctx = EventCtx {
            render: Some(RenderTarget::Raster(canvas)),
            buttons: buttons.as_ref(),
            button_size: config.button_size as f32,
            has_main_dock: *has_main_dock,
            ..EventCtx::default()
        };
        bus.dispatch(EventKind::Render, desklet, &mut ctx);
    }

    pub fn render_gpu(&mut self, id: DeskletId, frame: &mut GpuFrame) {
        let Self {
            desklets,
            bus,
            buttons,
            config,
            has_main_dock,
            ..
        } = self;
        let Some(desklet) = desklets.iter_mut().find(|d| d.id == id) else {
            return;
        };
        let mut ctx = EventCtx {
            render: Some(RenderTarget::Gpu(frame)),
            buttons: buttons.as_ref(),
            button_size: config.button_size as f32,
            has_main_dock: *has_main_dock,
            ..EventCtx::default()
        };
        bus.dispatch(EventKind::Render, desklet, &mut ctx);
    }

    pub fn buttons(&self) -> Option<&DeskletButtons> {
        self.buttons.as_ref()
    }

    pub fn config(&self) -> &DeskletConfig {
        &self.config
    }

    fn load_buttons(&mut self) {
        let textures = if self.gpu_active {
            Some(&mut self.textures)
        } else {
            None
        };
        self.buttons = Some(DeskletButtons::load(&self.config, textures));
    }

    pub fn unload_buttons(&mut self) {
        if let Some(buttons) = self.buttons.as_mut() {
            buttons.unload(Some(&mut self.textures));
        }
        self.buttons = None;
    }

    /// Applies a configuration change: the button set is reloaded only when a
    /// button path changed, decorations only when the theme name changed.
    pub fn reload(&mut self, new_config: DeskletConfig) {
        let buttons_changed = self.config.buttons_differ(&new_config);
        let theme_changed = self.config.decoration_theme != new_config.decoration_theme;
        self.config = new_config;
        if buttons_changed {
            self.unload_buttons();
            self.load_buttons();
        }
        if theme_changed {
            self.reload_decorations(true);
        }
    }

    /// Reloads desklet decorations: either every desklet following the
    /// default theme, or every desklet whose decorations were skipped while
    /// its size was still unknown.
    pub fn reload_decorations(&mut self, default_theme_only: bool) {
        let ids: Vec<DeskletId> = self
            .desklets
            .iter()
            .filter(|d| {
                if default_theme_only {
                    d.decoration_theme
                        .as_deref()
                        .map_or(true, |t| t == "default")
                } else {
                    d.background.is_none() && d.foreground.is_none() && d.width > 0.0
                }
            })
            .map(|d| d.id)
            .collect();
        for id in ids {
            self.load_decorations(id);
        }
    }

    /// Loads the configured custom decoration onto one desklet at its current
    /// size; a missing file degrades to the image staying absent.
    pub fn load_decorations(&mut self, id: DeskletId) {
        let custom = match &self.config.custom {
            Some(c) => c.clone(),
            None => return,
        };
        let gpu = self.gpu_active;
        let Self {
            desklets, textures, ..
        } = self;
        let Some(desklet) = desklets.iter_mut().find(|d| d.id == id) else {
            return;
        };
        if desklet.width <= 0.0 || desklet.height <= 0.0 {
            return;
        }
        let (w, h) = (desklet.width as u32, desklet.height as u32);

        desklet.margins = Margins {
            left: custom.left_margin as f32,
            top: custom.top_margin as f32,
            right: custom.right_margin as f32,
            bottom: custom.bottom_margin as f32,
        };
        desklet.background_alpha = custom.background_alpha;
        desklet.foreground_alpha = custom.foreground_alpha;

        for (path, slot) in [
            (custom.background_image.as_ref(), &mut desklet.background),
            (custom.foreground_image.as_ref(), &mut desklet.foreground),
        ] {
            *slot = None;
            if let Some(path) = path {
                if let Ok(mut img) = RenderableImage::from_path(path) {
                    img.load_at_size(w, h, if gpu { Some(&mut *textures) } else { None });
                    *slot = Some(img);
                }
            }
        }
    }

    /// Brings desklets to the visible layer; widget-layer desklets only when
    /// asked for.
    pub fn set_all_visible(&mut self, on_widget_layer_too: bool) {
        for desklet in &mut self.desklets {
            let on_widget_layer = desklet.visibility == DeskletVisibility::OnWidgetLayer;
            if on_widget_layer_too || !on_widget_layer {
                desklet.keep_below = false;
            }
        }
    }

    pub fn set_visibility_to_default(&mut self) {
        for desklet in &mut self.desklets {
            desklet.keep_below = desklet.visibility == DeskletVisibility::KeepBelow;
            desklet.allow_minimize = false;
        }
    }
}

/// Raster frame: ratio shrink, rotation block, background, margin-inset
/// content, foreground, then the corner buttons in the outer un-rotated
/// frame (unless the desklet is mid-rotation, in which case they follow).
pub fn render_desklet_raster(
    desklet: &mut Desklet,
    canvas: &mut RasterCanvas,
    buttons: Option<&DeskletButtons>,
    button_size: f32,
    has_main_dock: bool,
) {
    let w = desklet.width;
    let h = desklet.height;
    canvas.save();

    if desklet.ratio != 1.0 {
        canvas.translate(w * (1.0 - desklet.ratio) / 2.0, h * (1.0 - desklet.ratio) / 2.0);
        canvas.scale(desklet.ratio, desklet.ratio);
    }

    if desklet.rotation().abs() > ANGLE_MIN {
        let zoom = geometry::zoom_for_rotation(w, h, desklet.rotation());
        canvas.translate(0.5 * w, 0.5 * h);
        canvas.rotate(desklet.rotation());
        canvas.scale(zoom, zoom);
        canvas.translate(-0.5 * w, -0.5 * h);
    }

    if let Some(bg) = &desklet.background {
        if let Some(pixmap) = bg.pixmap() {
            canvas.paint_pixmap(pixmap.as_ref(), 0.0, 0.0, desklet.background_alpha);
        }
    }

    canvas.save();
    if desklet.margins.any() {
        let m = desklet.margins;
        canvas.translate(m.left, m.top);
        canvas.scale(
            1.0 - (m.left + m.right) / w,
            1.0 - (m.top + m.bottom) / h,
        );
    }
    let mut renderer = desklet.renderer.take();
    if let Some(r) = renderer.as_mut() {
        r.render_raster(canvas, desklet);
    }
    desklet.renderer = renderer;
    canvas.restore();

    if let Some(fg) = &desklet.foreground {
        if let Some(pixmap) = fg.pixmap() {
            canvas.paint_pixmap(pixmap.as_ref(), 0.0, 0.0, desklet.foreground_alpha);
        }
    }

    if !desklet.rotating {
        // Buttons sit in the corners of the outer frame.
        canvas.restore();
        canvas.save();
    }
    if let Some(buttons) = buttons {
        if (desklet.inside_cursor || desklet.rotating || desklet.buttons_alpha != 0.0)
            && desklet.is_free()
        {
            if let Some(pixmap) = buttons.rotate.as_ref().and_then(|b| b.pixmap()) {
                canvas.paint_pixmap(pixmap.as_ref(), 0.0, 0.0, desklet.buttons_alpha);
            }
            if has_main_dock {
                if let Some(pixmap) = buttons.retach.as_ref().and_then(|b| b.pixmap()) {
                    canvas.paint_pixmap(pixmap.as_ref(), w - button_size, 0.0, desklet.buttons_alpha);
                }
            }
        }
        if (desklet.inside_cursor || desklet.no_input || desklet.buttons_alpha != 0.0)
            && desklet.allow_no_clickable
        {
            if let Some(pixmap) = buttons.no_input.as_ref().and_then(|b| b.pixmap()) {
                let alpha = no_input_button_alpha(desklet.no_input, desklet.buttons_alpha);
                canvas.paint_pixmap(pixmap.as_ref(), w - button_size, h - button_size, alpha);
            }
        }
    }
    canvas.restore();
}

/// GPU frame: same scene as immediate-mode commands, with the perspective
/// depth push and the two depth-rotation axes on top of the 2D transform.
pub fn render_desklet_gpu(
    desklet: &mut Desklet,
    frame: &mut GpuFrame,
    buttons: Option<&DeskletButtons>,
    button_size: f32,
    has_main_dock: bool,
) {
    let w = desklet.width;
    let h = desklet.height;
    frame.push_matrix();
    frame.apply(&geometry::desklet_matrix(&desklet.transform()));

    frame.set_alpha(1.0);
    if let Some(texture) = desklet.background.as_ref().and_then(|bg| bg.texture()) {
        frame.draw_texture_at_size(texture, w, h);
    }

    frame.push_matrix();
    if desklet.margins.any() {
        let m = desklet.margins;
        frame.translate((m.left - m.right) / 2.0, (m.bottom - m.top) / 2.0, 0.0);
        frame.scale(
            1.0 - (m.left + m.right) / w,
            1.0 - (m.top + m.bottom) / h,
            1.0,
        );
    }
    let mut renderer = desklet.renderer.take();
    if let Some(r) = renderer.as_mut() {
        frame.set_alpha(1.0);
        r.render_gpu(frame, desklet);
    }
    desklet.renderer = renderer;
    frame.pop_matrix();

    frame.set_alpha(1.0);
    if let Some(texture) = desklet.foreground.as_ref().and_then(|fg| fg.texture()) {
        frame.draw_texture_at_size(texture, w, h);
    }

    if !desklet.rotating && !desklet.rotating_x && !desklet.rotating_y {
        // Buttons stay at the un-tilted depth when no rotation is underway.
        frame.pop_matrix();
        frame.push_matrix();
        frame.translate(0.0, 0.0, -h * 3.0f32.sqrt() / 2.0);
    }

    if let Some(buttons) = buttons {
        let s = button_size;
        if (desklet.inside_cursor
            || desklet.buttons_alpha != 0.0
            || desklet.rotating
            || desklet.rotating_x
            || desklet.rotating_y)
            && desklet.is_free()
        {
            frame.set_alpha(desklet.buttons_alpha.sqrt());
            if let Some(texture) = buttons.rotate.as_ref().and_then(|b| b.texture()) {
                frame.push_matrix();
                frame.translate(-w / 2.0 + s / 2.0, h / 2.0 - s / 2.0, 0.0);
                frame.draw_texture_at_size(texture, s, s);
                frame.pop_matrix();
            }
            if has_main_dock {
                if let Some(texture) = buttons.retach.as_ref().and_then(|b| b.texture()) {
                    frame.push_matrix();
                    frame.translate(w / 2.0 - s / 2.0, h / 2.0 - s / 2.0, 0.0);
                    frame.draw_texture_at_size(texture, s, s);
                    frame.pop_matrix();
                }
            }
            if let Some(texture) = buttons.depth_rotate.as_ref().and_then(|b| b.texture()) {
                frame.push_matrix();
                frame.translate(0.0, h / 2.0 - s / 2.0, 0.0);
                frame.draw_texture_at_size(texture, s, s);
                frame.pop_matrix();

                frame.push_matrix();
                frame.rotate_z(std::f32::consts::FRAC_PI_2);
                frame.translate(0.0, w / 2.0 - s / 2.0, 0.0);
                frame.draw_texture_at_size(texture, s, s);
                frame.pop_matrix();
            }
        }
        if (desklet.inside_cursor || desklet.buttons_alpha != 0.0 || desklet.no_input)
            && desklet.allow_no_clickable
        {
            if let Some(texture) = buttons.no_input.as_ref().and_then(|b| b.texture()) {
                frame.set_alpha(no_input_button_alpha(desklet.no_input, desklet.buttons_alpha));
                frame.push_matrix();
                frame.translate(w / 2.0 - s / 2.0, -h / 2.0 + s / 2.0, 0.0);
                frame.draw_texture_at_size(texture, s, s);
                frame.pop_matrix();
            }
        }
    }

    frame.pop_matrix();
}
