//! Redraw coalescing.
//!
//! Any number of redraw requests between two display refreshes produce
//! one draw. The first request arms the scheduler and tells the host to
//! schedule a frame; later requests are absorbed until the frame fires.

#[derive(Debug, Default)]
pub struct RedrawScheduler {
    /// Dirty flag: set by a request, cleared when the frame draws.
    pending: bool,
    frames: u64,
}

impl RedrawScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the canvas dirty. Returns true when the host must schedule a
    /// frame callback (the scheduler was idle).
    pub fn request(&mut self) -> bool {
        if self.pending {
            return false;
        }
        self.pending = true;
        log::trace!("redraw: frame scheduled");
        true
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Frame callback: run `draw` if a redraw is pending, then re-arm.
    /// Returns whether `draw` ran.
    pub fn frame(&mut self, draw: impl FnOnce()) -> bool {
        if !self.pending {
            return false;
        }
        self.pending = false;
        self.frames += 1;
        draw();
        true
    }

    /// Number of frames drawn so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}
