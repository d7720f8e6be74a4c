//! Board-level configuration for the AI-Thinker ESP32-CAM module.

use myrtio_cam_core::connectivity::FallbackCredential;

pub const HOSTNAME: &str = "esp32cam";

/// Flash partition reserved for device settings.
pub const SETTINGS_PARTITION_OFFSET: u32 = 0x31_0000;

/// Network to fall back to when no stored credential works. `None` means
/// startup fails hard without a populated credential table.
pub const FALLBACK_NETWORK: Option<FallbackCredential> = None;

/// Boot-time frame size (VGA). The driver is initialized at UXGA so it
/// grabs the largest frame buffers it will ever need, then dropped here.
pub const BOOT_FRAMESIZE: i32 = 8;
