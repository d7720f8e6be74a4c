//! Continuous multipart JPEG streaming.
//!
//! One session serves one client: announce the multipart content type,
//! then deliver boundary-framed frames until the peer disconnects or the
//! transport fails. Frame-rate throttling happens at the sensor clock
//! (see `camera::set_stream_speed`), not here; TCP flow control does the
//! rest.

use core::fmt::Write as _;

use embedded_io_async::Write;
use heapless::String;
use log::{error, info};

use crate::camera::{Flashlight, FrameSource};
use crate::context::DeviceContext;
use crate::http::HttpResult;
use crate::restart::RestartReason;

/// Multipart boundary token. Fixed: deployed stream consumers match on it.
pub const BOUNDARY: &str = "ESP32CAM_ServerPush";

const PART_HEADER_SIZE: usize = 128;

fn announcement() -> String<PART_HEADER_SIZE> {
    let mut out = String::new();
    let _ = write!(
        out,
        "HTTP/1.1 200 OK\r\nContent-Type: multipart/x-mixed-replace;boundary={}\r\nAccess-Control-Allow-Origin: *\r\n\r\n",
        BOUNDARY
    );
    out
}

fn part_header(length: usize) -> String<PART_HEADER_SIZE> {
    let mut out = String::new();
    let _ = write!(
        out,
        "\r\n--{}\r\nContent-Type:image/jpeg\r\nContent-Length:{}\r\n\r\n",
        BOUNDARY, length
    );
    out
}

/// Run one streaming session until disconnect or failure.
///
/// `ControlState::streaming` is true exactly while the session is active;
/// the capture endpoints check it before touching the frame source. A
/// failed frame acquisition is not repaired in place: the capture
/// pipeline's state is suspect, so the restart signal is raised and the
/// session ends.
pub async fn run_session<C, L, W>(ctx: &DeviceContext<C, L>, conn: &mut W) -> HttpResult
where
    C: FrameSource,
    L: Flashlight,
    W: Write,
{
    info!("stream: session start");
    if conn.write_all(announcement().as_bytes()).await.is_err() {
        return Ok(());
    }

    ctx.state.set_streaming(true);

    loop {
        ctx.light.set_on(ctx.state.streamlight());

        let mut camera = ctx.camera.lock().await;
        let Ok(frame) = camera.acquire().await else {
            error!("stream: frame capture failed, requesting restart");
            ctx.restart.request(RestartReason::CaptureFailure);
            break;
        };

        let header = part_header(frame.data.len());
        if conn.write_all(header.as_bytes()).await.is_err() {
            break;
        }
        if conn.write_all(frame.data).await.is_err() {
            break;
        }
        if conn.flush().await.is_err() {
            break;
        }
        ctx.telemetry.count_net_frame();
    }

    ctx.state.set_streaming(false);
    ctx.light.set_on(false);
    info!("stream: session end");

    Ok(())
}
