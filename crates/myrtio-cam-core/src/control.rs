//! Device-wide control flags.
//!
//! Lives for the whole device uptime and is observed from every task.
//! Uses relaxed atomics: the flags are user-intent toggles, and a stale
//! read on one of them is harmless. Updates are advisory, not linearizable.

use core::sync::atomic::{AtomicBool, Ordering};

pub struct ControlState {
    flashlight: AtomicBool,
    streamlight: AtomicBool,
    stream_fast: AtomicBool,
    night_mode: AtomicBool,
    reset_requested: AtomicBool,
    streaming: AtomicBool,
}

impl ControlState {
    pub const fn new() -> Self {
        Self {
            flashlight: AtomicBool::new(false),
            streamlight: AtomicBool::new(false),
            stream_fast: AtomicBool::new(false),
            night_mode: AtomicBool::new(false),
            reset_requested: AtomicBool::new(false),
            streaming: AtomicBool::new(false),
        }
    }

    pub fn flashlight(&self) -> bool {
        self.flashlight.load(Ordering::Relaxed)
    }

    pub fn set_flashlight(&self, on: bool) {
        self.flashlight.store(on, Ordering::Relaxed);
    }

    pub fn streamlight(&self) -> bool {
        self.streamlight.load(Ordering::Relaxed)
    }

    pub fn set_streamlight(&self, on: bool) {
        self.streamlight.store(on, Ordering::Relaxed);
    }

    pub fn stream_fast(&self) -> bool {
        self.stream_fast.load(Ordering::Relaxed)
    }

    pub fn set_stream_fast(&self, fast: bool) {
        self.stream_fast.store(fast, Ordering::Relaxed);
    }

    pub fn night_mode(&self) -> bool {
        self.night_mode.load(Ordering::Relaxed)
    }

    pub fn set_night_mode(&self, on: bool) {
        self.night_mode.store(on, Ordering::Relaxed);
    }

    pub fn reset_requested(&self) -> bool {
        self.reset_requested.load(Ordering::Relaxed)
    }

    pub fn request_reset(&self) {
        self.reset_requested.store(true, Ordering::Relaxed);
    }

    /// True exactly for the duration of an active multipart session.
    pub fn streaming(&self) -> bool {
        self.streaming.load(Ordering::Relaxed)
    }

    pub fn set_streaming(&self, active: bool) {
        self.streaming.store(active, Ordering::Relaxed);
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self::new()
    }
}
