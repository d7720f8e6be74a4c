use embassy_net::Runner;
use esp_radio::wifi::WifiDevice;
use myrtio_cam_core::connectivity::ConnectivityManager;

use super::CamContext;
use crate::drivers::{EspWifiLink, FlashBlobStore};

/// Background task for running the network stack
#[embassy_executor::task]
pub async fn network_runner_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await;
}

/// Watches the established link; raises the restart signal when the
/// reconnect budget runs out.
#[embassy_executor::task]
pub async fn connectivity_task(
    manager: ConnectivityManager<EspWifiLink, FlashBlobStore>,
    ctx: &'static CamContext,
) {
    manager.supervise(&ctx.restart, &ctx.telemetry).await;
}
