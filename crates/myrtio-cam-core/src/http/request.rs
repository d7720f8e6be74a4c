use embedded_io_async::Read;

use super::Error;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
    Trace,
    Connect,
}

impl HttpMethod {
    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "DELETE" => HttpMethod::Delete,
            "PATCH" => HttpMethod::Patch,
            "OPTIONS" => HttpMethod::Options,
            "HEAD" => HttpMethod::Head,
            "TRACE" => HttpMethod::Trace,
            "CONNECT" => HttpMethod::Connect,
            _ => return None,
        })
    }
}

/// One parsed request line.
///
/// Header lines after the request line are read off the socket and ignored;
/// no endpoint of this server consumes them.
#[derive(Debug)]
pub struct RequestLine<'a> {
    pub method: HttpMethod,
    pub target: &'a str,
}

impl<'a> RequestLine<'a> {
    /// The target without its query string.
    pub fn path(&self) -> &'a str {
        match self.target.split_once('?') {
            Some((path, _)) => path,
            None => self.target,
        }
    }

    /// The query string, if any.
    pub fn query(&self) -> &'a str {
        match self.target.split_once('?') {
            Some((_, query)) => query,
            None => "",
        }
    }
}

/// Parse the request line `METHOD SP TARGET SP VERSION CRLF`.
fn parse_request_line(header_str: &str) -> Option<RequestLine<'_>> {
    let line_end = header_str.find("\r\n").unwrap_or(header_str.len());
    let first_line = &header_str[..line_end];
    let mut parts = first_line.split_whitespace();
    let method = parts.next().and_then(HttpMethod::parse)?;
    let target = parts.next()?;

    Some(RequestLine { method, target })
}

/// Read one request from the connection and parse its request line.
///
/// Reads until the end-of-headers marker or until the buffer is full.
/// Returns `Ok(None)` when the peer closed the connection before sending
/// anything, `Error::Parse` for a garbled request line and `Error::Closed`
/// for transport failures.
pub async fn read_request<'b, R: Read>(
    reader: &mut R,
    buf: &'b mut [u8],
) -> Result<Option<RequestLine<'b>>, Error> {
    let mut len = 0;
    loop {
        let n = reader.read(&mut buf[len..]).await.map_err(|_| Error::Closed)?;
        if n == 0 {
            if len == 0 {
                return Ok(None);
            }
            break;
        }
        len += n;
        if buf[..len].windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
        if len >= buf.len() {
            break;
        }
    }

    let line_end = buf[..len]
        .windows(2)
        .position(|w| w == b"\r\n")
        .unwrap_or(len);
    let line = core::str::from_utf8(&buf[..line_end]).map_err(|_| Error::Parse)?;
    parse_request_line(line).map(Some).ok_or(Error::Parse)
}

/// Look up one key in a `key=value&key=value` query string.
pub fn query_param<'a>(query: &'a str, key: &str) -> Option<&'a str> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

/// Look up one integer-valued key in a query string.
pub fn int_param(query: &str, key: &str) -> Option<i32> {
    query_param(query, key)?.parse().ok()
}
