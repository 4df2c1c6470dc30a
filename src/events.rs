//! Typed notification bus.
//!
//! Subscribers are kept per event kind in dispatch order; `run_first`
//! subscribers are prepended. Any handler can stop propagation for the
//! current dispatch. Ownership of subscriber lists is explicit: a handler
//! stays registered until `unsubscribe` is called with its id.

use crate::buttons::DeskletButtons;
use crate::desklet::Desklet;
use crate::gpu::GpuFrame;
use crate::raster::RasterCanvas;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    NewDesklet,
    Update,
    EnterDesklet,
    LeaveDesklet,
    Render,
}

const NB_EVENT_KINDS: usize = 5;

impl EventKind {
    fn index(self) -> usize {
        match self {
            EventKind::NewDesklet => 0,
            EventKind::Update => 1,
            EventKind::EnterDesklet => 2,
            EventKind::LeaveDesklet => 3,
            EventKind::Render => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Continue,
    Stop,
}

/// Rendering destination for `EventKind::Render`; the raster and GPU variants
/// of the notification are distinguished by which target is present.
pub enum RenderTarget<'a> {
    Raster(&'a mut RasterCanvas),
    Gpu(&'a mut GpuFrame),
}

/// Per-dispatch scratch state handlers read and write.
#[derive(Default)]
pub struct EventCtx<'a> {
    pub render: Option<RenderTarget<'a>>,
    pub buttons: Option<&'a DeskletButtons>,
    pub button_size: f32,
    pub has_main_dock: bool,
    /// Set by enter/leave handlers to request that the animation loop starts.
    pub start_animation: bool,
    /// Set by update handlers that still have frames to run.
    pub continue_animation: bool,
    pub redraw_requested: bool,
}

pub type Handler = Box<dyn FnMut(&mut Desklet, &mut EventCtx) -> Propagation>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

struct Entry {
    id: SubscriptionId,
    handler: Handler,
}

#[derive(Default)]
pub struct Bus {
    lists: [Vec<Entry>; NB_EVENT_KINDS],
    next_id: u64,
}

impl Bus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, kind: EventKind, handler: Handler, run_first: bool) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        let entry = Entry { id, handler };
        let list = &mut self.lists[kind.index()];
        if run_first {
            list.insert(0, entry);
        } else {
            list.push(entry);
        }
        id
    }

    pub fn unsubscribe(&mut self, kind: EventKind, id: SubscriptionId) {
        self.lists[kind.index()].retain(|e| e.id != id);
    }

    /// Runs the subscribers for `kind` in order. Returns `true` when every
    /// handler let the event pass, `false` when one stopped propagation.
    pub fn dispatch(&mut self, kind: EventKind, desklet: &mut Desklet, ctx: &mut EventCtx) -> bool {
        for entry in self.lists[kind.index()].iter_mut() {
            if (entry.handler)(desklet, ctx) == Propagation::Stop {
                return false;
            }
        }
        true
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.lists[kind.index()].len()
    }
}
