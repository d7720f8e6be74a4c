#![no_std]

//! Hardware-independent core of the ESP32-CAM network camera.
//!
//! Everything device-shaped is a trait: the sensor and frame source
//! ([`camera`]), the flash LED, the wifi link ([`connectivity`]) and the
//! settings store ([`credentials`]). The firmware crate binds those to the
//! real hardware; host tests bind them to mocks.

pub mod camera;
pub mod connectivity;
pub mod context;
pub mod control;
pub mod credentials;
pub mod http;
pub mod restart;
pub mod router;
pub mod server;
pub mod stream;
pub mod telemetry;
