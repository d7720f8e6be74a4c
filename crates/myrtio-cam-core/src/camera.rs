//! Camera capability interface and frame hand-off contract.
//!
//! The register-level sensor driver and the capture pipeline are external
//! collaborators; this module defines the traits the rest of the firmware
//! programs against. Every `Sensor` operation defaults to `Unsupported` so
//! a concrete sensor binding only overrides what its silicon provides.

use embassy_time::{Duration, Timer};
use serde::Serialize;

use crate::control::ControlState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraError {
    /// The operation is not implemented by this sensor variant.
    Unsupported,
    /// The sensor accepted the operation but reported a failure.
    Failed,
}

/// Sensor clock divider register, shared by the stream-speed and night-mode
/// transitions (OV2640 bank 1, CLKRC).
pub const CLOCK_DIVIDER_REG: u16 = 0x111;
const CLOCK_DIVIDER_MASK: u16 = 0x3f;
const CLOCK_DIVIDER_FAST: u16 = 0x00;
const CLOCK_DIVIDER_SLOW: u16 = 0x02;

const NIGHT_MODE_REG: u16 = 0x10f;
const FRAME_CONTROL_REG: u16 = 0x103;

const CLOCK_SETTLE: Duration = Duration::from_millis(200);
const NIGHT_MODE_SETTLE: Duration = Duration::from_millis(1000);

/// Current sensor settings, serialized verbatim as the `/status` body.
/// Field names match the keys the control page expects.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct SensorStatus {
    pub framesize: i32,
    pub quality: i32,
    pub brightness: i32,
    pub contrast: i32,
    pub saturation: i32,
    pub sharpness: i32,
    pub special_effect: i32,
    pub wb_mode: i32,
    pub awb: i32,
    pub awb_gain: i32,
    pub aec: i32,
    pub aec2: i32,
    pub ae_level: i32,
    pub aec_value: i32,
    pub agc: i32,
    pub agc_gain: i32,
    pub gainceiling: i32,
    pub bpc: i32,
    pub wpc: i32,
    pub raw_gma: i32,
    pub lenc: i32,
    pub hmirror: i32,
    pub dcw: i32,
    pub colorbar: i32,
}

macro_rules! unsupported_op {
    ($($name:ident),* $(,)?) => {
        $(
            fn $name(&mut self, value: i32) -> Result<(), CameraError> {
                let _ = value;
                Err(CameraError::Unsupported)
            }
        )*
    };
}

/// Image-quality control operations, polymorphic across sensor variants.
pub trait Sensor {
    unsupported_op!(
        set_framesize,
        set_quality,
        set_brightness,
        set_contrast,
        set_saturation,
        set_special_effect,
        set_whitebal_auto,
        set_wb_mode,
        set_awb_gain,
        set_exposure_auto,
        set_aec_value,
        set_ae_level,
        set_aec2,
        set_agc_auto,
        set_agc_gain,
        set_gain_ceiling,
        set_raw_gamma,
        set_lens_correction,
        set_hmirror,
        set_vflip,
        set_colorbar,
        set_white_pixel_correction,
        set_downsample,
        set_black_pixel_correction,
    );

    /// Generic register write, masked. Returns the previous value.
    fn set_register(&mut self, reg: u16, mask: u16, value: u16) -> Result<u16, CameraError> {
        let _ = (reg, mask, value);
        Err(CameraError::Unsupported)
    }

    /// Generic masked register read.
    fn get_register(&mut self, reg: u16, mask: u16) -> Result<u16, CameraError> {
        let _ = (reg, mask);
        Err(CameraError::Unsupported)
    }

    /// Current value of every capability, for `/status`.
    fn status(&self) -> Result<SensorStatus, CameraError> {
        Err(CameraError::Unsupported)
    }
}

/// One encoded image, borrowed read-only from the frame source.
///
/// The borrow ties the frame to the source: a second `acquire` cannot be
/// issued until the previous frame has been dropped, which is exactly the
/// single-outstanding-buffer rule the capture pipeline requires.
pub struct Frame<'a> {
    pub data: &'a [u8],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureError;

/// Produces frames. Implementations release the previously returned buffer
/// back to the pipeline on every call before acquiring a new one.
#[allow(async_fn_in_trait)]
pub trait FrameSource {
    async fn acquire(&mut self) -> Result<Frame<'_>, CaptureError>;
}

/// The high-power LED used as flashlight and streaming light.
///
/// Takes `&self`: implementations sit behind their own interior mutability
/// so the light can be driven while a frame borrow is still alive.
pub trait Flashlight {
    fn set_on(&self, on: bool);
}

/// Acquire a frame that reflects the current light conditions.
///
/// The first frame out of the pipeline was exposed under the previous light
/// settings and is discarded.
pub async fn fresh_frame<S: FrameSource>(source: &mut S) -> Result<Frame<'_>, CaptureError> {
    let _ = source.acquire().await;
    source.acquire().await
}

/// Switch the sensor clock divider between full and reduced speed.
///
/// Reduced speed lengthens exposure (better low-light response) and caps
/// the frame rate, keeping the network load down when several cameras
/// share one access point.
pub fn set_stream_speed<S: Sensor + ?Sized>(
    sensor: &mut S,
    state: &ControlState,
    fast: bool,
) -> Result<(), CameraError> {
    let divider = if fast {
        CLOCK_DIVIDER_FAST
    } else {
        CLOCK_DIVIDER_SLOW
    };
    sensor.set_register(CLOCK_DIVIDER_REG, CLOCK_DIVIDER_MASK, divider)?;
    state.set_stream_fast(fast);
    Ok(())
}

/// Enable or disable extended-exposure night mode.
///
/// Register values are OV2640-specific; the enable sequence permits dummy
/// frames so exposure can span several frame times. Leaving night mode
/// returns the clock to full speed, which `ControlState` must reflect.
pub async fn set_night_mode<S: Sensor + ?Sized>(
    sensor: &mut S,
    state: &ControlState,
    on: bool,
) -> Result<(), CameraError> {
    sensor.set_register(CLOCK_DIVIDER_REG, 0xff, 0x00)?;
    Timer::after(CLOCK_SETTLE).await;

    if on {
        sensor.set_register(NIGHT_MODE_REG, 0xff, 0x4b)?;
        sensor.set_register(FRAME_CONTROL_REG, 0xff, 0xcf)?;
        state.set_night_mode(true);
    } else {
        sensor.set_register(FRAME_CONTROL_REG, 0xff, 0x0a)?;
        sensor.set_register(NIGHT_MODE_REG, 0xff, 0x43)?;
        // the change latches on the rising edge of bit 3
        sensor.set_register(NIGHT_MODE_REG, 0xff, 0x4b)?;
        Timer::after(NIGHT_MODE_SETTLE).await;
        sensor.set_register(NIGHT_MODE_REG, 0xff, 0x43)?;
        state.set_night_mode(false);
        state.set_stream_fast(true);
    }
    Ok(())
}
