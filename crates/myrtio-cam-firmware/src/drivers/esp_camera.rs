//! Hand-written bindings to the `esp32-camera` vendor driver.
//!
//! The driver is a C component linked into the final image; struct layouts
//! here mirror its public headers. Only the parts the firmware touches are
//! declared.

#![allow(non_camel_case_types)]
#![allow(dead_code)]

use core::ffi::{c_int, c_long};

pub(crate) type esp_err_t = c_int;

pub(crate) const ESP_OK: esp_err_t = 0;

pub(crate) const PIXFORMAT_JPEG: c_int = 4;

pub(crate) const FRAMESIZE_VGA: c_int = 8;
pub(crate) const FRAMESIZE_UXGA: c_int = 13;

#[repr(C)]
pub(crate) struct camera_config_t {
    pub pin_pwdn: c_int,
    pub pin_reset: c_int,
    pub pin_xclk: c_int,
    pub pin_sccb_sda: c_int,
    pub pin_sccb_scl: c_int,

    pub pin_d7: c_int,
    pub pin_d6: c_int,
    pub pin_d5: c_int,
    pub pin_d4: c_int,
    pub pin_d3: c_int,
    pub pin_d2: c_int,
    pub pin_d1: c_int,
    pub pin_d0: c_int,
    pub pin_vsync: c_int,
    pub pin_href: c_int,
    pub pin_pclk: c_int,

    pub xclk_freq_hz: c_int,
    pub ledc_timer: c_int,
    pub ledc_channel: c_int,

    pub pixel_format: c_int,
    pub frame_size: c_int,

    pub jpeg_quality: c_int,
    pub fb_count: usize,
}

#[repr(C)]
pub(crate) struct timeval {
    pub tv_sec: c_long,
    pub tv_usec: c_long,
}

/// One frame buffer owned by the driver. `buf` stays valid until the
/// buffer is handed back with [`esp_camera_fb_return`].
#[repr(C)]
pub(crate) struct camera_fb_t {
    pub buf: *mut u8,
    pub len: usize,
    pub width: usize,
    pub height: usize,
    pub format: c_int,
    pub timestamp: timeval,
}

#[repr(C)]
pub(crate) struct sensor_id_t {
    pub pid: u16,
    pub ver: u8,
    pub midh: u8,
    pub midl: u8,
}

/// Mirror of the driver's `camera_status_t`.
#[repr(C)]
pub(crate) struct camera_status_t {
    pub framesize: c_int,
    pub scale: bool,
    pub binning: bool,
    pub quality: u8,
    pub brightness: i8,
    pub contrast: i8,
    pub saturation: i8,
    pub sharpness: i8,
    pub denoise: u8,
    pub special_effect: u8,
    pub wb_mode: u8,
    pub awb: u8,
    pub awb_gain: u8,
    pub aec: u8,
    pub aec2: u8,
    pub ae_level: i8,
    pub aec_value: u16,
    pub agc: u8,
    pub agc_gain: u8,
    pub gainceiling: u8,
    pub bpc: u8,
    pub wpc: u8,
    pub raw_gma: u8,
    pub lenc: u8,
    pub hmirror: u8,
    pub vflip: u8,
    pub dcw: u8,
    pub colorbar: u8,
}

pub(crate) type sensor_set_fn = unsafe extern "C" fn(*mut sensor_t, c_int) -> c_int;

/// Mirror of the driver's `sensor_t`. Absent capabilities are null
/// function pointers, hence the `Option`s.
#[repr(C)]
pub(crate) struct sensor_t {
    pub id: sensor_id_t,
    pub slv_addr: u8,
    pub pixformat: c_int,
    pub status: camera_status_t,
    pub xclk_freq_hz: c_int,

    pub init_status: Option<unsafe extern "C" fn(*mut sensor_t) -> c_int>,
    pub reset: Option<unsafe extern "C" fn(*mut sensor_t) -> c_int>,
    pub set_pixformat: Option<sensor_set_fn>,
    pub set_framesize: Option<sensor_set_fn>,
    pub set_contrast: Option<sensor_set_fn>,
    pub set_brightness: Option<sensor_set_fn>,
    pub set_saturation: Option<sensor_set_fn>,
    pub set_sharpness: Option<sensor_set_fn>,
    pub set_denoise: Option<sensor_set_fn>,
    pub set_gainceiling: Option<sensor_set_fn>,
    pub set_quality: Option<sensor_set_fn>,
    pub set_colorbar: Option<sensor_set_fn>,
    pub set_whitebal: Option<sensor_set_fn>,
    pub set_gain_ctrl: Option<sensor_set_fn>,
    pub set_exposure_ctrl: Option<sensor_set_fn>,
    pub set_hmirror: Option<sensor_set_fn>,
    pub set_vflip: Option<sensor_set_fn>,
    pub set_aec2: Option<sensor_set_fn>,
    pub set_awb_gain: Option<sensor_set_fn>,
    pub set_agc_gain: Option<sensor_set_fn>,
    pub set_aec_value: Option<sensor_set_fn>,
    pub set_special_effect: Option<sensor_set_fn>,
    pub set_wb_mode: Option<sensor_set_fn>,
    pub set_ae_level: Option<sensor_set_fn>,
    pub set_dcw: Option<sensor_set_fn>,
    pub set_bpc: Option<sensor_set_fn>,
    pub set_wpc: Option<sensor_set_fn>,
    pub set_raw_gma: Option<sensor_set_fn>,
    pub set_lenc: Option<sensor_set_fn>,
    pub get_reg: Option<unsafe extern "C" fn(*mut sensor_t, c_int, c_int) -> c_int>,
    pub set_reg: Option<unsafe extern "C" fn(*mut sensor_t, c_int, c_int, c_int) -> c_int>,
}

unsafe extern "C" {
    pub(crate) fn esp_camera_init(config: *const camera_config_t) -> esp_err_t;
    pub(crate) fn esp_camera_fb_get() -> *mut camera_fb_t;
    pub(crate) fn esp_camera_fb_return(fb: *mut camera_fb_t);
    pub(crate) fn esp_camera_sensor_get() -> *mut sensor_t;
}
