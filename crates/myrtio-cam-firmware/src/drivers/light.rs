//! Board LEDs.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use esp_hal::gpio::{Level, Output};
use myrtio_cam_core::camera::Flashlight;

/// The high-power LED on GPIO4, shared between the flashlight and the
/// streaming-light paths. Interior mutability so it can be switched while
/// the camera is checked out.
pub struct FlashLed {
    pin: Mutex<CriticalSectionRawMutex, RefCell<Output<'static>>>,
}

impl FlashLed {
    pub fn new(pin: Output<'static>) -> Self {
        Self {
            pin: Mutex::new(RefCell::new(pin)),
        }
    }
}

impl Flashlight for FlashLed {
    fn set_on(&self, on: bool) {
        self.pin.lock(|pin| {
            pin.borrow_mut()
                .set_level(if on { Level::High } else { Level::Low });
        });
    }
}

/// The on-board status LED, active low. Lit during boot, turned off once
/// the device is online.
pub struct StatusLed {
    pin: Output<'static>,
}

impl StatusLed {
    pub fn new(pin: Output<'static>) -> Self {
        Self { pin }
    }

    pub fn set_busy(&mut self, busy: bool) {
        self.pin
            .set_level(if busy { Level::Low } else { Level::High });
    }
}
