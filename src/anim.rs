//! Per-frame desklet animation: button fade and grow-in. Both sub-machines
//! are self-terminating; the tick reports through `EventCtx` whether another
//! frame is wanted.

use crate::desklet::Desklet;
use crate::events::{EventCtx, Propagation};

pub const BUTTONS_ALPHA_STEP: f32 = 0.1;
pub const GROW_UP_STEP: f32 = 0.04;
pub const GROW_UP_MAX: f32 = 1.1;

/// Entering or leaving the desklet both arm the fade; the direction
/// self-corrects on the next tick from the current inside/outside state.
pub fn on_enter_leave(desklet: &mut Desklet, ctx: &mut EventCtx) -> Propagation {
    desklet.buttons_apparition = true;
    ctx.start_animation = true;
    Propagation::Continue
}

pub fn on_update(desklet: &mut Desklet, ctx: &mut EventCtx) -> Propagation {
    if !desklet.buttons_apparition && !desklet.growing_up {
        return Propagation::Continue;
    }

    if desklet.buttons_apparition {
        desklet.buttons_alpha += if desklet.inside_cursor {
            BUTTONS_ALPHA_STEP
        } else {
            -BUTTONS_ALPHA_STEP
        };

        if desklet.buttons_alpha <= 0.0 || desklet.buttons_alpha >= 1.0 {
            desklet.buttons_apparition = false;
            desklet.buttons_alpha = desklet.buttons_alpha.clamp(0.0, 1.0);
        } else {
            ctx.continue_animation = true;
        }
    }

    if desklet.growing_up {
        desklet.ratio += GROW_UP_STEP;

        if desklet.ratio >= GROW_UP_MAX {
            // The overshoot is not eased back, it snaps to rest.
            desklet.ratio = 1.0;
            desklet.growing_up = false;
        } else {
            ctx.continue_animation = true;
        }
    }

    ctx.redraw_requested = true;
    Propagation::Continue
}
