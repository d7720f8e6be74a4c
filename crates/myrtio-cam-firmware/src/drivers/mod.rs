mod camera;
mod esp_camera;
mod light;
mod link;
mod storage;

pub use camera::Ov2640Camera;
pub use light::{FlashLed, StatusLed};
pub use link::{EspWifiLink, init_network_stack, wait_for_connection};
pub use storage::FlashBlobStore;
