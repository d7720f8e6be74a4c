pub mod headers;
pub mod request;
pub mod response;

pub use headers::{ContentEncoding, ContentHeaders, ContentType, Disposition, ResponseHeaders};
pub use request::{HttpMethod, RequestLine, int_param, query_param, read_request};
pub use response::{Body, Response, send_response};

#[derive(Debug)]
pub enum Error {
    /// Peer closed the connection or the transport failed mid-transfer.
    Closed,
    /// The request line could not be parsed.
    Parse,
    FormatHeaders,
}

impl From<core::fmt::Error> for Error {
    fn from(_error: core::fmt::Error) -> Self {
        Error::FormatHeaders
    }
}

pub type HttpResult = Result<(), Error>;
