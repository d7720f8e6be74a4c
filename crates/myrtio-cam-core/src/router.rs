//! Control-port request routing.
//!
//! Every endpoint answers best-effort: the control page cannot handle
//! error statuses, so unknown paths and unsupported capabilities are
//! answered with an empty 200 and at most a log line. The only non-200
//! answers are 400 for a garbled request line and 501 for non-GET methods.

use core::fmt::Write as _;

use embassy_time::{Duration, Timer};
use embedded_io_async::Write;
use heapless::String;
use log::{info, warn};

use crate::camera::{self, CameraError, Flashlight, FrameSource, Sensor, SensorStatus, fresh_frame};
use crate::context::DeviceContext;
use crate::control::ControlState;
use crate::http::{
    Body, ContentEncoding, ContentHeaders, ContentType, Disposition, HttpMethod, HttpResult,
    RequestLine, Response, ResponseHeaders, int_param, query_param, send_response,
    response::TEXT_BODY_SIZE,
};
use crate::restart::RestartReason;
use crate::stream;
use crate::telemetry::Telemetry;

/// Static server parameters, fixed at boot.
pub struct ServerConfig {
    pub control_port: u16,
    pub stream_port: u16,
    /// Gzip-compressed home page, served as-is.
    pub home_page: &'static [u8],
    /// How long the flashlight burns before a lit capture, letting the
    /// sensor exposure settle to the new light level.
    pub flash_settle: Duration,
}

impl ServerConfig {
    pub const fn new(home_page: &'static [u8]) -> Self {
        Self {
            control_port: 80,
            stream_port: 81,
            home_page,
            flash_settle: Duration::from_millis(400),
        }
    }
}

/// Serve one control-port request.
///
/// A requested reset is only raised after the response has been fully
/// sent, so the client always sees its answer.
pub async fn handle_control_request<C, L, W>(
    ctx: &DeviceContext<C, L>,
    cfg: &ServerConfig,
    req: &RequestLine<'_>,
    conn: &mut W,
) -> HttpResult
where
    C: Sensor + FrameSource,
    L: Flashlight,
    W: Write,
{
    match (req.method, req.path()) {
        (HttpMethod::Get, "/capture") => {
            serve_frame(ctx, cfg, conn, Disposition::Inline("capture.jpg")).await?;
        }
        (HttpMethod::Get, "/download") => {
            serve_frame(ctx, cfg, conn, Disposition::Attachment("frame.jpg")).await?;
        }
        _ => {
            let response = route_control(ctx, cfg, req).await;
            send_response(conn, &response).await?;
        }
    }

    if ctx.state.reset_requested() {
        ctx.restart.request(RestartReason::UserRequest);
    }
    Ok(())
}

/// Serve one stream-port request.
pub async fn handle_stream_request<C, L, W>(
    ctx: &DeviceContext<C, L>,
    req: &RequestLine<'_>,
    conn: &mut W,
) -> HttpResult
where
    C: FrameSource,
    L: Flashlight,
    W: Write,
{
    if req.method != HttpMethod::Get {
        return send_response(conn, &Response::basic(ResponseHeaders::not_implemented())).await;
    }
    if req.path().starts_with("/stream") {
        stream::run_session(ctx, conn).await
    } else {
        info!("stream: unknown request {}", req.target);
        send_response(conn, &empty_ok()).await
    }
}

/// Route everything that does not touch the frame source.
async fn route_control<C: Sensor, L>(
    ctx: &DeviceContext<C, L>,
    cfg: &ServerConfig,
    req: &RequestLine<'_>,
) -> Response<'static> {
    if req.method != HttpMethod::Get {
        return Response::basic(ResponseHeaders::not_implemented());
    }

    match req.path() {
        "/" | "/index.html" => {
            let content = ContentHeaders::new(ContentType::TextHtml)
                .with_encoding(ContentEncoding::Gzip)
                .with_length(cfg.home_page.len());
            Response::new(
                ResponseHeaders::success().with_content(content),
                Body::Bytes(cfg.home_page),
            )
        }
        "/status" => {
            let body = {
                let camera = ctx.camera.lock().await;
                match camera.status() {
                    Ok(status) => status_body(&status, &ctx.state),
                    Err(_) => String::new(),
                }
            };
            text_response(ContentType::Json, body)
        }
        "/control" => {
            control_endpoint(ctx, req.query()).await;
            Response::new(empty_ok_headers(), Body::Empty)
        }
        "/reg" => {
            register_write(ctx, req.query()).await;
            Response::new(empty_ok_headers(), Body::Empty)
        }
        "/greg" => {
            let value = register_read(ctx, req.query()).await;
            let mut body = String::new();
            let _ = write!(body, "{}", value);
            text_response(ContentType::Json, body)
        }
        "/getstatus" => {
            let mut body = String::new();
            match query_param(req.query(), "var") {
                Some("framerate") => {
                    let _ = body.push_str(ctx.telemetry.framerate_line().as_str());
                }
                other => {
                    info!("getstatus: unknown variable {:?}", other);
                    let _ = body.push_str("-1");
                }
            }
            text_response(ContentType::TextHtml, body)
        }
        path => {
            // The page never expects an error status, not even for paths
            // this firmware has never heard of.
            info!("control: unknown request {}", path);
            Response::new(empty_ok_headers(), Body::Empty)
        }
    }
}

/// `/capture` and `/download`: one fresh still frame.
///
/// Refused with an empty body while a stream session owns the frame
/// source; a capture failure on this path also degrades to an empty body
/// rather than tearing anything down.
async fn serve_frame<C, L, W>(
    ctx: &DeviceContext<C, L>,
    cfg: &ServerConfig,
    conn: &mut W,
    disposition: Disposition,
) -> HttpResult
where
    C: FrameSource,
    L: Flashlight,
    W: Write,
{
    if ctx.state.streaming() {
        return send_response(conn, &Response::new(frame_headers(0, disposition), Body::Empty))
            .await;
    }

    let mut camera = ctx.camera.lock().await;
    if ctx.state.flashlight() {
        ctx.light.set_on(true);
        Timer::after(cfg.flash_settle).await;
    }
    let result = fresh_frame(&mut *camera).await;
    ctx.light.set_on(false);

    match result {
        Ok(frame) => {
            let headers = frame_headers(frame.data.len(), disposition);
            send_response(conn, &Response::new(headers, Body::Bytes(frame.data))).await
        }
        Err(_) => {
            warn!("capture: no frame available");
            send_response(conn, &Response::new(frame_headers(0, disposition), Body::Empty)).await
        }
    }
}

/// `/control?var=NAME&val=N`.
async fn control_endpoint<C: Sensor, L>(ctx: &DeviceContext<C, L>, query: &str) {
    let Some(var) = query_param(query, "var") else {
        return;
    };
    let value = int_param(query, "val").unwrap_or(0);
    info!("control: {} = {}", var, value);

    // Server-local names first; everything else goes to the sensor.
    match var {
        "flashlight" => ctx.state.set_flashlight(value != 0),
        "streamlight" => ctx.state.set_streamlight(value != 0),
        "streamspeed" => {
            let mut camera = ctx.camera.lock().await;
            if camera::set_stream_speed(&mut *camera, &ctx.state, value != 0).is_err() {
                warn!("control: stream speed change failed");
            }
        }
        "nightmode" => {
            let mut camera = ctx.camera.lock().await;
            if camera::set_night_mode(&mut *camera, &ctx.state, value != 0)
                .await
                .is_err()
            {
                warn!("control: night mode change failed");
            }
        }
        "esp32reset" => ctx.state.request_reset(),
        name => {
            let mut camera = ctx.camera.lock().await;
            apply_capability(&ctx.state, &ctx.telemetry, &mut *camera, name, value);
        }
    }
}

/// The fixed name-to-capability table.
fn apply_capability<S: Sensor + ?Sized>(
    state: &ControlState,
    telemetry: &Telemetry,
    sensor: &mut S,
    name: &str,
    value: i32,
) {
    let result = match name {
        "framesize" => {
            // A frame-size change implies full clock speed and day mode,
            // and stale error counts stop being meaningful.
            state.set_stream_fast(true);
            state.set_night_mode(false);
            telemetry.clear_errors();
            sensor.set_framesize(value)
        }
        "quality" => sensor.set_quality(value),
        "brightness" => sensor.set_brightness(value),
        "contrast" => sensor.set_contrast(value),
        "saturation" => sensor.set_saturation(value),
        "special_effect" => sensor.set_special_effect(value),
        "awb" => sensor.set_whitebal_auto(value),
        "wb_mode" => sensor.set_wb_mode(value),
        "awb_gain" => sensor.set_awb_gain(value),
        "aec" => sensor.set_exposure_auto(value),
        "aec_value" => sensor.set_aec_value(value),
        "ae_level" => sensor.set_ae_level(value),
        "aec2" => sensor.set_aec2(value),
        "agc" => sensor.set_agc_auto(value),
        "agc_gain" => sensor.set_agc_gain(value),
        "gainceiling" => sensor.set_gain_ceiling(value),
        "raw_gma" => sensor.set_raw_gamma(value),
        "lenc" => sensor.set_lens_correction(value),
        "hmirror" => sensor.set_hmirror(value),
        "vflip" => sensor.set_vflip(value),
        "colorbar" => sensor.set_colorbar(value),
        "wpc" => sensor.set_white_pixel_correction(value),
        "dcw" => sensor.set_downsample(value),
        "bpc" => sensor.set_black_pixel_correction(value),
        _ => {
            // Unknown names stay a silent success: the page ships controls
            // for sensors this firmware does not carry.
            info!("control: unknown variable {}", name);
            return;
        }
    };

    match result {
        Ok(()) => {}
        Err(CameraError::Unsupported) => warn!("control: {} not supported by this sensor", name),
        Err(CameraError::Failed) => warn!("control: {} rejected by sensor", name),
    }
}

/// `/reg?reg=R&mask=M&val=V`.
async fn register_write<C: Sensor, L>(ctx: &DeviceContext<C, L>, query: &str) {
    let reg = u16_param(query, "reg");
    let mask = u16_param(query, "mask");
    let value = u16_param(query, "val");
    info!("register: write {:#x} mask {:#x} value {:#x}", reg, mask, value);

    let mut camera = ctx.camera.lock().await;
    if camera.set_register(reg, mask, value).is_err() {
        warn!("register: write not supported");
    }
}

/// `/greg?reg=R&mask=M`. Unsupported reads report zero, as the page expects.
async fn register_read<C: Sensor, L>(ctx: &DeviceContext<C, L>, query: &str) -> u16 {
    let reg = u16_param(query, "reg");
    let mask = u16_param(query, "mask");
    info!("register: read {:#x} mask {:#x}", reg, mask);

    let mut camera = ctx.camera.lock().await;
    camera.get_register(reg, mask).unwrap_or(0)
}

/// Out-of-range register parameters clamp to zero rather than erroring;
/// the page validates its own inputs.
fn u16_param(query: &str, key: &str) -> u16 {
    int_param(query, key)
        .and_then(|v| u16::try_from(v).ok())
        .unwrap_or(0)
}

/// Sensor capability values plus the server-local flags, one JSON object.
fn status_body(status: &SensorStatus, state: &ControlState) -> String<TEXT_BODY_SIZE> {
    let mut body = String::new();
    let Ok(sensor_json) = serde_json_core::to_string::<SensorStatus, TEXT_BODY_SIZE>(status)
    else {
        return String::new();
    };
    let sensor_json = sensor_json.as_str();
    // splice the local flags into the sensor object before the closing brace
    let _ = body.push_str(&sensor_json[..sensor_json.len() - 1]);
    let _ = write!(
        body,
        ",\"nightmode\":{},\"streamspeed\":{},\"flashlight\":{},\"streamlight\":{}}}",
        u8::from(state.night_mode()),
        u8::from(state.stream_fast()),
        u8::from(state.flashlight()),
        u8::from(state.streamlight()),
    );
    body
}

fn empty_ok_headers() -> ResponseHeaders {
    ResponseHeaders::success()
        .with_content(ContentHeaders::new(ContentType::TextHtml).with_length(0))
        .with_cors()
}

fn empty_ok() -> Response<'static> {
    Response::new(empty_ok_headers(), Body::Empty)
}

fn text_response(content_type: ContentType, body: String<TEXT_BODY_SIZE>) -> Response<'static> {
    let headers = ResponseHeaders::success()
        .with_content(ContentHeaders::new(content_type).with_length(body.len()))
        .with_cors();
    Response::new(headers, Body::Text(body))
}

fn frame_headers(length: usize, disposition: Disposition) -> ResponseHeaders {
    ResponseHeaders::success()
        .with_content(
            ContentHeaders::new(ContentType::ImageJpeg)
                .with_length(length)
                .with_disposition(disposition),
        )
        .with_cors()
}
