use embedded_io_async::Write;
use heapless::String;

use super::{Error, HttpResult, ResponseHeaders, headers::TargetWriter as _};

const HEADER_BUFFER_SIZE: usize = 256;

/// Capacity of in-place text bodies. Sized for the sensor status object,
/// the largest text payload the control server produces.
pub const TEXT_BODY_SIZE: usize = 640;

/// Response body source.
pub enum Body<'a> {
    Empty,
    Bytes(&'a [u8]),
    Text(String<TEXT_BODY_SIZE>),
}

impl Body<'_> {
    pub fn len(&self) -> usize {
        match self {
            Body::Empty => 0,
            Body::Bytes(bytes) => bytes.len(),
            Body::Text(text) => text.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn as_bytes(&self) -> &[u8] {
        match self {
            Body::Empty => &[],
            Body::Bytes(bytes) => bytes,
            Body::Text(text) => text.as_bytes(),
        }
    }
}

/// One complete response, built by the router and sent in a single step.
pub struct Response<'a> {
    pub headers: ResponseHeaders,
    pub body: Body<'a>,
}

impl<'a> Response<'a> {
    pub const fn new(headers: ResponseHeaders, body: Body<'a>) -> Self {
        Self { headers, body }
    }

    /// A bare status line with no headers and no body.
    pub const fn basic(headers: ResponseHeaders) -> Self {
        Self {
            headers,
            body: Body::Empty,
        }
    }
}

/// Serialize the headers and write the full response to the connection.
pub async fn send_response<W: Write>(conn: &mut W, response: &Response<'_>) -> HttpResult {
    let mut header_buf = String::<HEADER_BUFFER_SIZE>::new();
    response.headers.write_to(&mut header_buf)?;

    conn.write_all(header_buf.as_bytes())
        .await
        .map_err(|_| Error::Closed)?;
    if !response.body.is_empty() {
        conn.write_all(response.body.as_bytes())
            .await
            .map_err(|_| Error::Closed)?;
    }
    conn.flush().await.map_err(|_| Error::Closed)?;

    Ok(())
}
