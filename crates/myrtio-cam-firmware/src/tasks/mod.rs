mod net;
mod restart;
mod server;
mod telemetry;

use myrtio_cam_core::context::DeviceContext;

use crate::drivers::{FlashLed, Ov2640Camera};

/// The concrete device context this firmware wires together.
pub type CamContext = DeviceContext<Ov2640Camera, FlashLed>;

pub use net::{connectivity_task, network_runner_task};
pub use restart::restart_task;
pub use server::{control_server_task, stream_server_task};
pub use telemetry::telemetry_task;
