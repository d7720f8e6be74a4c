//! Unrecoverable-failure signalling.
//!
//! The core never restarts the device itself. Components that hit an
//! unrecoverable condition raise the signal here; the firmware runs one
//! task that waits on it and performs the actual reset.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartReason {
    /// `/control?var=esp32reset` was received.
    UserRequest,
    /// The frame source could not produce a frame during streaming.
    CaptureFailure,
    /// The wireless link was lost and reconnect attempts are exhausted.
    LinkLost,
}

pub struct RestartSignal {
    inner: Signal<CriticalSectionRawMutex, RestartReason>,
}

impl RestartSignal {
    pub const fn new() -> Self {
        Self {
            inner: Signal::new(),
        }
    }

    /// Raise the signal. The first reason wins; later ones are irrelevant
    /// since the device is going down anyway.
    pub fn request(&self, reason: RestartReason) {
        if !self.inner.signaled() {
            self.inner.signal(reason);
        }
    }

    pub async fn wait(&self) -> RestartReason {
        self.inner.wait().await
    }

    pub fn pending(&self) -> bool {
        self.inner.signaled()
    }

    pub fn take(&self) -> Option<RestartReason> {
        self.inner.try_take()
    }
}

impl Default for RestartSignal {
    fn default() -> Self {
        Self::new()
    }
}
