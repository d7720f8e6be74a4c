//! Shared test doubles for the host-side test suite.

#![allow(dead_code)]

use core::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::string::String;
use std::vec::Vec;

use myrtio_cam_core::camera::{
    CameraError, CaptureError, Flashlight, Frame, FrameSource, Sensor, SensorStatus,
};
use myrtio_cam_core::connectivity::{LinkError, LinkLayer, LinkState};
use myrtio_cam_core::context::DeviceContext;
use myrtio_cam_core::credentials::{BlobStore, RecordKey, StorageError};

// -----------------------------------------------------------------------------
// Camera double: scripted sensor plus canned frames
// -----------------------------------------------------------------------------

pub struct MockCamera {
    pub calls: Vec<(&'static str, i32)>,
    pub registers: Vec<(u16, u16)>,
    pub sensor_status: Option<SensorStatus>,
    pub frames: Vec<Vec<u8>>,
    pub fail_capture_after: usize,
    pub acquires: usize,
    next_frame: usize,
}

impl MockCamera {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            registers: Vec::new(),
            sensor_status: Some(SensorStatus::default()),
            frames: Vec::new(),
            fail_capture_after: usize::MAX,
            acquires: 0,
            next_frame: 0,
        }
    }

    pub fn with_frames(frames: Vec<Vec<u8>>) -> Self {
        let mut camera = Self::new();
        camera.frames = frames;
        camera
    }

    pub fn register(&self, reg: u16) -> Option<u16> {
        self.registers
            .iter()
            .find(|(r, _)| *r == reg)
            .map(|(_, v)| *v)
    }

    fn store_register(&mut self, reg: u16, value: u16) {
        if let Some(slot) = self.registers.iter_mut().find(|(r, _)| *r == reg) {
            slot.1 = value;
        } else {
            self.registers.push((reg, value));
        }
    }

    fn record(&mut self, name: &'static str, value: i32) -> Result<(), CameraError> {
        self.calls.push((name, value));
        Ok(())
    }
}

macro_rules! recording_ops {
    ($($method:ident => $name:literal),* $(,)?) => {
        $(
            fn $method(&mut self, value: i32) -> Result<(), CameraError> {
                self.record($name, value)
            }
        )*
    };
}

impl Sensor for MockCamera {
    recording_ops!(
        set_framesize => "framesize",
        set_quality => "quality",
        set_brightness => "brightness",
        set_contrast => "contrast",
        set_saturation => "saturation",
        set_special_effect => "special_effect",
        set_whitebal_auto => "awb",
        set_wb_mode => "wb_mode",
        set_awb_gain => "awb_gain",
        set_exposure_auto => "aec",
        set_aec_value => "aec_value",
        set_ae_level => "ae_level",
        set_aec2 => "aec2",
        set_agc_auto => "agc",
        set_agc_gain => "agc_gain",
        set_gain_ceiling => "gainceiling",
        set_raw_gamma => "raw_gma",
        set_lens_correction => "lenc",
        set_hmirror => "hmirror",
        set_vflip => "vflip",
        set_colorbar => "colorbar",
        set_white_pixel_correction => "wpc",
        set_downsample => "dcw",
        set_black_pixel_correction => "bpc",
    );

    fn set_register(&mut self, reg: u16, mask: u16, value: u16) -> Result<u16, CameraError> {
        let old = self.register(reg).unwrap_or(0);
        self.store_register(reg, (old & !mask) | (value & mask));
        Ok(old)
    }

    fn get_register(&mut self, reg: u16, mask: u16) -> Result<u16, CameraError> {
        Ok(self.register(reg).unwrap_or(0) & mask)
    }

    fn status(&self) -> Result<SensorStatus, CameraError> {
        self.sensor_status.ok_or(CameraError::Unsupported)
    }
}

impl FrameSource for MockCamera {
    async fn acquire(&mut self) -> Result<Frame<'_>, CaptureError> {
        self.acquires += 1;
        if self.acquires > self.fail_capture_after || self.frames.is_empty() {
            return Err(CaptureError);
        }
        let index = self.next_frame % self.frames.len();
        self.next_frame += 1;
        Ok(Frame {
            data: &self.frames[index],
        })
    }
}

// -----------------------------------------------------------------------------
// Light double
// -----------------------------------------------------------------------------

#[derive(Default)]
pub struct MockLight {
    pub on: Cell<bool>,
    pub switches: Cell<u32>,
}

impl Flashlight for MockLight {
    fn set_on(&self, on: bool) {
        if on != self.on.get() {
            self.switches.set(self.switches.get() + 1);
        }
        self.on.set(on);
    }
}

pub type TestContext = DeviceContext<MockCamera, MockLight>;

pub fn test_context(camera: MockCamera) -> TestContext {
    DeviceContext::new(camera, MockLight::default())
}

// -----------------------------------------------------------------------------
// Transport doubles
// -----------------------------------------------------------------------------

/// Collects written bytes; optionally fails after a number of writes.
pub struct MockWriter {
    pub data: Vec<u8>,
    pub remaining_writes: usize,
}

impl MockWriter {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            remaining_writes: usize::MAX,
        }
    }

    pub fn failing_after(writes: usize) -> Self {
        Self {
            data: Vec::new(),
            remaining_writes: writes,
        }
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }
}

impl embedded_io_async::ErrorType for MockWriter {
    type Error = embedded_io::ErrorKind;
}

impl embedded_io_async::Write for MockWriter {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.remaining_writes == 0 {
            return Err(embedded_io::ErrorKind::BrokenPipe);
        }
        self.remaining_writes -= 1;
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }
}

/// Replays canned byte chunks, then reports EOF.
pub struct ChunkReader {
    chunks: VecDeque<Vec<u8>>,
}

impl ChunkReader {
    pub fn new(chunks: &[&[u8]]) -> Self {
        Self {
            chunks: chunks.iter().map(|c| c.to_vec()).collect(),
        }
    }
}

impl embedded_io_async::ErrorType for ChunkReader {
    type Error = embedded_io::ErrorKind;
}

impl embedded_io_async::Read for ChunkReader {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        match self.chunks.pop_front() {
            Some(chunk) => {
                buf[..chunk.len()].copy_from_slice(&chunk);
                Ok(chunk.len())
            }
            None => Ok(0),
        }
    }
}

// -----------------------------------------------------------------------------
// Storage double
// -----------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryBlobStore {
    pub record: Option<Vec<u8>>,
    pub writes: usize,
    pub fail_writes: bool,
}

impl MemoryBlobStore {
    pub fn with_record(data: &[u8]) -> Self {
        Self {
            record: Some(data.to_vec()),
            ..Self::default()
        }
    }
}

impl BlobStore for MemoryBlobStore {
    async fn read_record(
        &mut self,
        _key: &RecordKey,
        buf: &mut [u8],
    ) -> Result<Option<usize>, StorageError> {
        match &self.record {
            None => Ok(None),
            Some(record) => {
                let wanted = record.len().min(buf.len());
                buf[..wanted].copy_from_slice(&record[..wanted]);
                Ok(Some(record.len()))
            }
        }
    }

    async fn write_record(&mut self, _key: &RecordKey, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Driver);
        }
        self.record = Some(data.to_vec());
        self.writes += 1;
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Link double
// -----------------------------------------------------------------------------

/// Accepts exactly one SSID; every other credential pair reads as bad.
/// An optional state script overrides the derived state, one poll at a time.
pub struct FakeLink {
    pub good_ssid: Option<&'static str>,
    pub applied: Vec<(String, String)>,
    pub rssi: i8,
    script: RefCell<VecDeque<LinkState>>,
    connected_to_good: Cell<bool>,
}

impl FakeLink {
    pub fn new(good_ssid: Option<&'static str>) -> Self {
        Self {
            good_ssid,
            applied: Vec::new(),
            rssi: -55,
            script: RefCell::new(VecDeque::new()),
            connected_to_good: Cell::new(false),
        }
    }

    pub fn push_states(&mut self, states: &[LinkState]) {
        self.script.borrow_mut().extend(states.iter().copied());
    }
}

impl LinkLayer for FakeLink {
    async fn apply_credentials(&mut self, ssid: &str, password: &str) -> Result<(), LinkError> {
        self.applied.push((ssid.into(), password.into()));
        self.connected_to_good.set(Some(ssid) == self.good_ssid);
        Ok(())
    }

    fn state(&self) -> LinkState {
        if let Some(state) = self.script.borrow_mut().pop_front() {
            return state;
        }
        if self.connected_to_good.get() {
            LinkState::Online
        } else {
            LinkState::BadCredentials
        }
    }

    fn signal_strength(&self) -> i8 {
        self.rssi
    }
}
