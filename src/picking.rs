//! Cursor-to-icon resolution. Desklets with a GPU renderer are picked with a
//! selection pass over the recorded scene; everything else inverts the 2D
//! transform analytically.

use crate::desklet::{Desklet, IconSlot};
use crate::geometry::{self, Mat4, ANGLE_MIN};
use crate::gpu::GpuFrame;
use crate::utils::Position;

/// Resolves `desklet.mouse` to an icon, if any. Also refreshes
/// `desklet.mouse_2d` (analytic path) or `desklet.picked_object` (GPU path).
pub fn find_clicked_icon(desklet: &mut Desklet, gpu_active: bool) -> Option<IconSlot> {
    let gpu_pick = gpu_active
        && desklet
            .renderer
            .as_ref()
            .map_or(false, |r| r.has_gpu());
    if gpu_pick {
        find_icon_gpu(desklet)
    } else {
        find_icon_analytic(desklet)
    }
}

/// Maps the cursor back through zoom and rotation into the un-rotated desklet
/// frame, then tests icon boxes, primary icon first. A desklet without a
/// primary icon is still settling; nothing on it is clickable yet.
fn find_icon_analytic(desklet: &mut Desklet) -> Option<IconSlot> {
    if desklet.icon.is_none() {
        return None;
    }
    let w = desklet.width;
    let h = desklet.height;
    let mut x = desklet.mouse.x - w / 2.0;
    let mut y = h / 2.0 - desklet.mouse.y;

    if desklet.rotation().abs() > ANGLE_MIN {
        let zoom = geometry::zoom_for_rotation(w, h, desklet.rotation());
        let mut r = (x * x + y * y).sqrt();
        let t = y.atan2(x) + desklet.rotation();
        if zoom != 0.0 {
            r /= zoom;
        }
        x = r * t.cos();
        y = r * t.sin();
    }

    let x = x + w / 2.0;
    let y = h / 2.0 - y;
    desklet.mouse_2d = Position { x, y };

    if let Some(icon) = &desklet.icon {
        if icon.contains(x, y) {
            return Some(IconSlot::Primary);
        }
    }
    desklet
        .icons
        .iter()
        .position(|icon| icon.contains(x, y))
        .map(IconSlot::Secondary)
}

/// Replays the desklet transform into a selection frame, records named quads
/// and keeps the nearest hit under the cursor.
///
/// A desklet-level bounding-box callback outranks the renderer's own; when
/// one handled the pass, the hit name lands in `picked_object` and the
/// primary icon stands in as the result.
fn find_icon_gpu(desklet: &mut Desklet) -> Option<IconSlot> {
    let w = desklet.width;
    let h = desklet.height;
    if w <= 0.0 || h <= 0.0 {
        return None;
    }

    let mut frame = GpuFrame::new(Mat4::perspective(60.0, w / h, 1.0, 4.0 * h));
    frame.begin_selection(desklet.mouse.x, h - desklet.mouse.y, w, h);
    frame.apply(&geometry::desklet_matrix(&desklet.transform()));

    if desklet.margins.any() {
        let m = desklet.margins;
        frame.translate((m.left - m.right) / 2.0, (m.bottom - m.top) / 2.0, 0.0);
        frame.scale(
            1.0 - (m.left + m.right) / w,
            1.0 - (m.top + m.bottom) / h,
            1.0,
        );
    }

    let bbox_override = desklet.bounding_box_override.take();
    let mut renderer = desklet.renderer.take();
    let mut desklet_bbox = false;
    if let Some(bb) = &bbox_override {
        bb(&mut frame, desklet);
        desklet_bbox = true;
    } else if !renderer
        .as_mut()
        .map_or(false, |r| r.render_bounding_box(&mut frame, desklet))
    {
        frame.push_matrix();
        frame.translate(-w / 2.0, -h / 2.0, 0.0);
        if let Some(icon) = &desklet.icon {
            record_icon_quad(&mut frame, icon, h);
        }
        for icon in &desklet.icons {
            record_icon_quad(&mut frame, icon, h);
        }
        frame.pop_matrix();
    }
    desklet.renderer = renderer;
    desklet.bounding_box_override = bbox_override;

    let hit = frame.nearest_hit();
    if desklet_bbox {
        // Only the callback's names land in picked_object; plain icon quads
        // resolve to a slot instead.
        desklet.picked_object = hit.unwrap_or(0);
    }
    let name = hit?;

    if desklet_bbox {
        // The callback owns the name space; the desklet itself was hit.
        return if desklet.icon.is_some() {
            Some(IconSlot::Primary)
        } else {
            None
        };
    }

    if let Some(icon) = &desklet.icon {
        if icon.texture.map(|t| t.0) == Some(name) {
            return Some(IconSlot::Primary);
        }
    }
    desklet
        .icons
        .iter()
        .position(|icon| icon.texture.map(|t| t.0) == Some(name))
        .map(IconSlot::Secondary)
}

fn record_icon_quad(frame: &mut GpuFrame, icon: &crate::desklet::Icon, desklet_height: f32) {
    let Some(texture) = icon.texture else {
        return;
    };
    let sw = icon.width * icon.scale;
    let sh = icon.height * icon.scale;
    frame.load_name(texture.0);
    frame.quad(
        icon.draw_x + sw / 2.0,
        desklet_height - icon.draw_y - sh / 2.0,
        sw,
        sh,
    );
}
