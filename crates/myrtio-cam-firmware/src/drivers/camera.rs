//! OV2640 binding over the vendor capture driver.

use core::ffi::c_int;
use core::ptr::NonNull;

use log::info;
use myrtio_cam_core::camera::{CameraError, CaptureError, Frame, FrameSource, Sensor, SensorStatus};

use super::esp_camera as sys;
use crate::config::BOOT_FRAMESIZE;

/// AI-Thinker board wiring, 20 MHz XCLK, JPEG output. Initialized at UXGA
/// so the driver allocates frame buffers for the largest size up front.
const CAMERA_CONFIG: sys::camera_config_t = sys::camera_config_t {
    pin_pwdn: 32,
    pin_reset: -1,
    pin_xclk: 0,
    pin_sccb_sda: 26,
    pin_sccb_scl: 27,

    pin_d7: 35,
    pin_d6: 34,
    pin_d5: 39,
    pin_d4: 36,
    pin_d3: 21,
    pin_d2: 19,
    pin_d1: 18,
    pin_d0: 5,
    pin_vsync: 25,
    pin_href: 23,
    pin_pclk: 22,

    xclk_freq_hz: 20_000_000,
    ledc_timer: 0,
    ledc_channel: 0,

    pixel_format: sys::PIXFORMAT_JPEG,
    frame_size: sys::FRAMESIZE_UXGA,

    jpeg_quality: 10,
    fb_count: 2,
};

/// The one OV2640 camera on the board.
///
/// Owns the vendor driver instance; at most one frame buffer is checked
/// out at a time and is returned before the next acquisition.
pub struct Ov2640Camera {
    sensor: NonNull<sys::sensor_t>,
    checked_out: Option<NonNull<sys::camera_fb_t>>,
}

// Safety: the camera lives behind the device mutex; the vendor driver is
// never entered from two tasks at once.
unsafe impl Send for Ov2640Camera {}

impl Ov2640Camera {
    /// Bring up the capture driver and drop to the boot frame size.
    pub fn init() -> Result<Self, CameraError> {
        // Safety: CAMERA_CONFIG outlives the call; the driver copies it.
        let err = unsafe { sys::esp_camera_init(&CAMERA_CONFIG) };
        if err != sys::ESP_OK {
            return Err(CameraError::Failed);
        }
        // Safety: after a successful init the driver owns a live sensor.
        let sensor =
            NonNull::new(unsafe { sys::esp_camera_sensor_get() }).ok_or(CameraError::Failed)?;

        let mut camera = Self {
            sensor,
            checked_out: None,
        };
        camera.set_framesize(BOOT_FRAMESIZE)?;
        info!("camera: sensor ready");
        Ok(camera)
    }

    fn call(
        &mut self,
        op: Option<sys::sensor_set_fn>,
        value: i32,
    ) -> Result<(), CameraError> {
        let Some(op) = op else {
            return Err(CameraError::Unsupported);
        };
        // Safety: the sensor pointer is valid for the driver's lifetime and
        // this is the only task inside the driver (see Send impl).
        let rc = unsafe { op(self.sensor.as_ptr(), value as c_int) };
        if rc == 0 { Ok(()) } else { Err(CameraError::Failed) }
    }

    fn raw(&self) -> &sys::sensor_t {
        // Safety: valid for the driver's lifetime, no concurrent mutation.
        unsafe { self.sensor.as_ref() }
    }
}

impl Drop for Ov2640Camera {
    fn drop(&mut self) {
        if let Some(fb) = self.checked_out.take() {
            // Safety: fb came from the driver and was not yet returned.
            unsafe { sys::esp_camera_fb_return(fb.as_ptr()) };
        }
    }
}

macro_rules! sensor_ops {
    ($($method:ident => $field:ident),* $(,)?) => {
        $(
            fn $method(&mut self, value: i32) -> Result<(), CameraError> {
                let op = self.raw().$field;
                self.call(op, value)
            }
        )*
    };
}

impl Sensor for Ov2640Camera {
    sensor_ops!(
        set_framesize => set_framesize,
        set_quality => set_quality,
        set_brightness => set_brightness,
        set_contrast => set_contrast,
        set_saturation => set_saturation,
        set_special_effect => set_special_effect,
        set_whitebal_auto => set_whitebal,
        set_wb_mode => set_wb_mode,
        set_awb_gain => set_awb_gain,
        set_exposure_auto => set_exposure_ctrl,
        set_aec_value => set_aec_value,
        set_ae_level => set_ae_level,
        set_aec2 => set_aec2,
        set_agc_auto => set_gain_ctrl,
        set_agc_gain => set_agc_gain,
        set_gain_ceiling => set_gainceiling,
        set_raw_gamma => set_raw_gma,
        set_lens_correction => set_lenc,
        set_hmirror => set_hmirror,
        set_vflip => set_vflip,
        set_colorbar => set_colorbar,
        set_white_pixel_correction => set_wpc,
        set_downsample => set_dcw,
        set_black_pixel_correction => set_bpc,
    );

    fn set_register(&mut self, reg: u16, mask: u16, value: u16) -> Result<u16, CameraError> {
        let get = self.raw().get_reg.ok_or(CameraError::Unsupported)?;
        let set = self.raw().set_reg.ok_or(CameraError::Unsupported)?;
        // Safety: see `call`.
        let previous = unsafe { get(self.sensor.as_ptr(), c_int::from(reg), c_int::from(mask)) };
        if previous < 0 {
            return Err(CameraError::Failed);
        }
        let rc = unsafe {
            set(
                self.sensor.as_ptr(),
                c_int::from(reg),
                c_int::from(mask),
                c_int::from(value),
            )
        };
        if rc < 0 {
            return Err(CameraError::Failed);
        }
        u16::try_from(previous).map_err(|_| CameraError::Failed)
    }

    fn get_register(&mut self, reg: u16, mask: u16) -> Result<u16, CameraError> {
        let get = self.raw().get_reg.ok_or(CameraError::Unsupported)?;
        // Safety: see `call`.
        let value = unsafe { get(self.sensor.as_ptr(), c_int::from(reg), c_int::from(mask)) };
        if value < 0 {
            return Err(CameraError::Failed);
        }
        u16::try_from(value).map_err(|_| CameraError::Failed)
    }

    fn status(&self) -> Result<SensorStatus, CameraError> {
        let status = &self.raw().status;
        Ok(SensorStatus {
            framesize: status.framesize,
            quality: i32::from(status.quality),
            brightness: i32::from(status.brightness),
            contrast: i32::from(status.contrast),
            saturation: i32::from(status.saturation),
            sharpness: i32::from(status.sharpness),
            special_effect: i32::from(status.special_effect),
            wb_mode: i32::from(status.wb_mode),
            awb: i32::from(status.awb),
            awb_gain: i32::from(status.awb_gain),
            aec: i32::from(status.aec),
            aec2: i32::from(status.aec2),
            ae_level: i32::from(status.ae_level),
            aec_value: i32::from(status.aec_value),
            agc: i32::from(status.agc),
            agc_gain: i32::from(status.agc_gain),
            gainceiling: i32::from(status.gainceiling),
            bpc: i32::from(status.bpc),
            wpc: i32::from(status.wpc),
            raw_gma: i32::from(status.raw_gma),
            lenc: i32::from(status.lenc),
            hmirror: i32::from(status.hmirror),
            dcw: i32::from(status.dcw),
            colorbar: i32::from(status.colorbar),
        })
    }
}

impl FrameSource for Ov2640Camera {
    async fn acquire(&mut self) -> Result<Frame<'_>, CaptureError> {
        if let Some(previous) = self.checked_out.take() {
            // Safety: previous came from the driver and is handed back
            // exactly once.
            unsafe { sys::esp_camera_fb_return(previous.as_ptr()) };
        }

        // Safety: the driver blocks until a buffer is ready or returns null.
        let fb = NonNull::new(unsafe { sys::esp_camera_fb_get() }).ok_or(CaptureError)?;
        self.checked_out = Some(fb);

        // Safety: buf/len describe driver-owned memory that stays valid
        // until the buffer is returned, which the borrow on self prevents.
        let fb = unsafe { fb.as_ref() };
        let data = unsafe { core::slice::from_raw_parts(fb.buf, fb.len) };
        Ok(Frame { data })
    }
}
