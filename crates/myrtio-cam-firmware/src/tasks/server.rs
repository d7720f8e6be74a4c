use embassy_net::Stack;
use myrtio_cam_core::router::ServerConfig;
use myrtio_cam_core::server;
use static_cell::make_static;

use super::CamContext;

const CONTROL_RX_SIZE: usize = 1024;
const CONTROL_TX_SIZE: usize = 2048;
const STREAM_RX_SIZE: usize = 512;
/// Streaming pushes whole JPEG frames; a big TX window keeps the radio fed.
const STREAM_TX_SIZE: usize = 8192;

#[embassy_executor::task]
pub async fn control_server_task(
    ctx: &'static CamContext,
    cfg: &'static ServerConfig,
    stack: Stack<'static>,
) {
    let rx_buffer = make_static!([0u8; CONTROL_RX_SIZE]);
    let tx_buffer = make_static!([0u8; CONTROL_TX_SIZE]);
    server::serve_control(ctx, cfg, stack, rx_buffer, tx_buffer).await
}

#[embassy_executor::task]
pub async fn stream_server_task(
    ctx: &'static CamContext,
    cfg: &'static ServerConfig,
    stack: Stack<'static>,
) {
    let rx_buffer = make_static!([0u8; STREAM_RX_SIZE]);
    let tx_buffer = make_static!([0u8; STREAM_TX_SIZE]);
    server::serve_stream(ctx, cfg, stack, rx_buffer, tx_buffer).await
}
