//! TCP accept loops for the two service ports.
//!
//! Each port runs a single-socket accept loop: one client at a time, which
//! matches the single frame buffer underneath. The control port keeps a
//! connection open across requests; the stream port hands each connection
//! to the streaming engine and takes the next client when it ends.

use embassy_net::{Stack, tcp::TcpSocket};
use embassy_time::Duration;
use log::{info, warn};

use crate::camera::{Flashlight, FrameSource, Sensor};
use crate::context::DeviceContext;
use crate::http::{Error, Response, ResponseHeaders, read_request, send_response};
use crate::router::{self, ServerConfig};

/// Request lines fit comfortably; anything larger is a bad client.
pub const REQUEST_BUFFER_SIZE: usize = 512;

const CONTROL_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Accept loop for the control port.
pub async fn serve_control<C, L>(
    ctx: &DeviceContext<C, L>,
    cfg: &ServerConfig,
    stack: Stack<'static>,
    rx_buffer: &mut [u8],
    tx_buffer: &mut [u8],
) -> !
where
    C: Sensor + FrameSource,
    L: Flashlight,
{
    loop {
        let mut socket = TcpSocket::new(stack, rx_buffer, tx_buffer);
        // An abandoned control connection must not hold the port forever.
        socket.set_timeout(Some(CONTROL_IDLE_TIMEOUT));

        if socket.accept(cfg.control_port).await.is_err() {
            continue;
        }
        info!("control: client connected");
        serve_control_connection(ctx, cfg, &mut socket).await;
        socket.close();
        info!("control: client gone");
    }
}

/// Accept loop for the stream port. One accepted connection is one
/// streaming session; no timeout, a stream may run for days.
pub async fn serve_stream<C, L>(
    ctx: &DeviceContext<C, L>,
    cfg: &ServerConfig,
    stack: Stack<'static>,
    rx_buffer: &mut [u8],
    tx_buffer: &mut [u8],
) -> !
where
    C: FrameSource,
    L: Flashlight,
{
    loop {
        let mut socket = TcpSocket::new(stack, rx_buffer, tx_buffer);
        if socket.accept(cfg.stream_port).await.is_err() {
            continue;
        }

        let mut request_buf = [0u8; REQUEST_BUFFER_SIZE];
        match read_request(&mut socket, &mut request_buf).await {
            Ok(Some(request)) => {
                if let Err(error) = router::handle_stream_request(ctx, &request, &mut socket).await
                {
                    warn!("stream: connection error: {:?}", error);
                }
            }
            Ok(None) => {}
            Err(Error::Parse) => {
                let _ = send_response(
                    &mut socket,
                    &Response::basic(ResponseHeaders::bad_request()),
                )
                .await;
            }
            Err(_) => {}
        }
        socket.close();
    }
}

/// Serve requests on one control connection until the peer goes away.
///
/// A garbled request line gets a 400 but does not end the connection; a
/// transport error or clean EOF does.
async fn serve_control_connection<C, L>(
    ctx: &DeviceContext<C, L>,
    cfg: &ServerConfig,
    socket: &mut TcpSocket<'_>,
) where
    C: Sensor + FrameSource,
    L: Flashlight,
{
    let mut request_buf = [0u8; REQUEST_BUFFER_SIZE];
    loop {
        match read_request(socket, &mut request_buf).await {
            Ok(Some(request)) => {
                if let Err(error) =
                    router::handle_control_request(ctx, cfg, &request, socket).await
                {
                    warn!("control: connection error: {:?}", error);
                    return;
                }
            }
            Ok(None) => return,
            Err(Error::Parse) => {
                if send_response(socket, &Response::basic(ResponseHeaders::bad_request()))
                    .await
                    .is_err()
                {
                    return;
                }
            }
            Err(_) => return,
        }
    }
}
