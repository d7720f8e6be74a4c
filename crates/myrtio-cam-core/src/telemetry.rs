//! Frame-rate and uptime sampling.
//!
//! Counters are bumped from the streaming and capture paths; a fixed
//! one-second tick snapshots them into the published FPS fields and resets
//! them. Pure sampler, no control effect.

use core::fmt::Write;
use core::sync::atomic::{AtomicI32, AtomicU32, Ordering};

use heapless::String;

pub const FRAMERATE_LINE_SIZE: usize = 128;

/// Snapshot of the last completed telemetry period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetrySnapshot {
    pub net_fps: u32,
    pub hw_fps: u32,
    pub i2s_fps: u32,
    pub dma_errors: u32,
    pub jpg_errors: u32,
    pub uptime_secs: u32,
    pub signal_strength: i32,
}

pub struct Telemetry {
    net_frames: AtomicU32,
    hw_frames: AtomicU32,
    i2s_frames: AtomicU32,
    net_fps: AtomicU32,
    hw_fps: AtomicU32,
    i2s_fps: AtomicU32,
    dma_errors: AtomicU32,
    jpg_errors: AtomicU32,
    uptime_secs: AtomicU32,
    signal_strength: AtomicI32,
}

impl Telemetry {
    pub const fn new() -> Self {
        Self {
            net_frames: AtomicU32::new(0),
            hw_frames: AtomicU32::new(0),
            i2s_frames: AtomicU32::new(0),
            net_fps: AtomicU32::new(0),
            hw_fps: AtomicU32::new(0),
            i2s_fps: AtomicU32::new(0),
            dma_errors: AtomicU32::new(0),
            jpg_errors: AtomicU32::new(0),
            uptime_secs: AtomicU32::new(0),
            signal_strength: AtomicI32::new(0),
        }
    }

    pub fn count_net_frame(&self) {
        self.net_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count_hw_frame(&self) {
        self.hw_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count_i2s_frame(&self) {
        self.i2s_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count_dma_error(&self) {
        self.dma_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count_jpg_error(&self) {
        self.jpg_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Reset the error counters, done after a frame-size change for
    /// readability of the control page.
    pub fn clear_errors(&self) {
        self.dma_errors.store(0, Ordering::Relaxed);
        self.jpg_errors.store(0, Ordering::Relaxed);
    }

    /// Record the most recent link signal strength.
    pub fn record_signal_strength(&self, rssi: i8) {
        self.signal_strength.store(i32::from(rssi), Ordering::Relaxed);
    }

    /// Close the current period: publish the frame counters as FPS values,
    /// reset them and advance uptime. Called once per second.
    pub fn tick(&self) {
        let net = self.net_frames.swap(0, Ordering::Relaxed);
        let hw = self.hw_frames.swap(0, Ordering::Relaxed);
        let i2s = self.i2s_frames.swap(0, Ordering::Relaxed);
        self.net_fps.store(net, Ordering::Relaxed);
        self.hw_fps.store(hw, Ordering::Relaxed);
        self.i2s_fps.store(i2s, Ordering::Relaxed);
        self.uptime_secs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            net_fps: self.net_fps.load(Ordering::Relaxed),
            hw_fps: self.hw_fps.load(Ordering::Relaxed),
            i2s_fps: self.i2s_fps.load(Ordering::Relaxed),
            dma_errors: self.dma_errors.load(Ordering::Relaxed),
            jpg_errors: self.jpg_errors.load(Ordering::Relaxed),
            uptime_secs: self.uptime_secs.load(Ordering::Relaxed),
            signal_strength: self.signal_strength.load(Ordering::Relaxed),
        }
    }

    /// The `/getstatus?var=framerate` line consumed by the control page.
    pub fn framerate_line(&self) -> String<FRAMERATE_LINE_SIZE> {
        let snap = self.snapshot();
        let mut line = String::new();
        let _ = write!(
            line,
            "- NetFPS:{} CamFPS:{} I2sFPS:{} - QUEerrors:{} JPGerrors:{} - UpTime(hrs):{} - Rssi:{}",
            snap.net_fps,
            snap.hw_fps,
            snap.i2s_fps,
            snap.dma_errors,
            snap.jpg_errors,
            snap.uptime_secs / 3600,
            snap.signal_strength,
        );
        line
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new()
    }
}
