use embassy_time::{Duration, Timer};
use log::error;

use super::CamContext;

/// Waits for the restart signal, then resets the chip.
///
/// The grace period lets in-flight responses and log output drain before
/// the reset hits.
#[embassy_executor::task]
pub async fn restart_task(ctx: &'static CamContext) {
    let reason = ctx.restart.wait().await;
    error!("restart: {:?}, resetting", reason);
    Timer::after(Duration::from_secs(1)).await;
    esp_hal::system::software_reset()
}
