//! Device-wide context shared by every task.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;

use crate::control::ControlState;
use crate::restart::RestartSignal;
use crate::telemetry::Telemetry;

/// The one owned object every component borrows.
///
/// `camera` is behind a real mutex: the still-capture path and the
/// streaming engine both refuse to run while the other is active, but the
/// single-outstanding-buffer contract of the capture pipeline is too
/// important to leave to a usage policy alone.
pub struct DeviceContext<C, L> {
    pub camera: Mutex<CriticalSectionRawMutex, C>,
    pub light: L,
    pub state: ControlState,
    pub telemetry: Telemetry,
    pub restart: RestartSignal,
}

impl<C, L> DeviceContext<C, L> {
    pub const fn new(camera: C, light: L) -> Self {
        Self {
            camera: Mutex::new(camera),
            light,
            state: ControlState::new(),
            telemetry: Telemetry::new(),
            restart: RestartSignal::new(),
        }
    }
}
