use core::fmt::Write;

pub type StatusCode = u16;

fn reason_phrase(code: StatusCode) -> &'static str {
    match code {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        _ => "Unknown",
    }
}

/// HTTP Content Encoding.
#[derive(Debug)]
pub enum ContentEncoding {
    Gzip,
}

impl ContentEncoding {
    fn as_str(&self) -> &'static str {
        match self {
            ContentEncoding::Gzip => "gzip",
        }
    }
}

/// HTTP Content Type.
#[derive(Debug)]
pub enum ContentType {
    Json,
    TextHtml,
    ImageJpeg,
}

impl ContentType {
    fn as_str(&self) -> &'static str {
        match self {
            ContentType::Json => "application/json",
            ContentType::TextHtml => "text/html",
            ContentType::ImageJpeg => "image/jpeg",
        }
    }
}

/// Content disposition for still-image responses.
#[derive(Debug)]
pub enum Disposition {
    Inline(&'static str),
    Attachment(&'static str),
}

pub(crate) trait TargetWriter {
    fn write_to(&self, writer: &mut impl Write) -> Result<(), core::fmt::Error>;
}

/// HTTP Content Headers.
pub struct ContentHeaders {
    content_type: ContentType,
    content_encoding: Option<ContentEncoding>,
    content_length: Option<usize>,
    disposition: Option<Disposition>,
}

impl ContentHeaders {
    /// Create new content headers with a content type.
    pub const fn new(content_type: ContentType) -> Self {
        Self {
            content_type,
            content_encoding: None,
            content_length: None,
            disposition: None,
        }
    }

    /// Set the content encoding.
    #[must_use]
    pub const fn with_encoding(mut self, encoding: ContentEncoding) -> Self {
        self.content_encoding = Some(encoding);
        self
    }

    /// Set the content length.
    #[must_use]
    pub const fn with_length(mut self, length: usize) -> Self {
        self.content_length = Some(length);
        self
    }

    /// Set the content disposition.
    #[must_use]
    pub const fn with_disposition(mut self, disposition: Disposition) -> Self {
        self.disposition = Some(disposition);
        self
    }
}

impl TargetWriter for ContentHeaders {
    fn write_to(&self, writer: &mut impl Write) -> Result<(), core::fmt::Error> {
        write!(writer, "Content-Type: {}\r\n", self.content_type.as_str())?;
        if let Some(content_encoding) = &self.content_encoding {
            write!(writer, "Content-Encoding: {}\r\n", content_encoding.as_str())?;
        }
        if let Some(content_length) = self.content_length {
            write!(writer, "Content-Length: {}\r\n", content_length)?;
        }
        match &self.disposition {
            Some(Disposition::Inline(filename)) => {
                write!(writer, "Content-Disposition: inline; filename={}\r\n", filename)?;
            }
            Some(Disposition::Attachment(filename)) => {
                write!(
                    writer,
                    "Content-Disposition: attachment; filename=\"{}\"\r\n",
                    filename
                )?;
            }
            None => {}
        }
        Ok(())
    }
}

/// Response Headers.
///
/// The permissive CORS header is required by the camera control page, which
/// is frequently embedded into dashboards served from another origin.
pub struct ResponseHeaders {
    status: StatusCode,
    cors: bool,
    content: Option<ContentHeaders>,
}

impl ResponseHeaders {
    /// Create empty response headers with a status code.
    pub const fn from_code(code: StatusCode) -> Self {
        Self {
            status: code,
            cors: false,
            content: None,
        }
    }

    /// Set the success status code.
    pub const fn success() -> Self {
        Self::from_code(200)
    }

    /// Set the bad request status code.
    pub const fn bad_request() -> Self {
        Self::from_code(400)
    }

    /// Set the not implemented status code.
    pub const fn not_implemented() -> Self {
        Self::from_code(501)
    }

    /// Set the content headers.
    #[must_use]
    pub const fn with_content(mut self, content: ContentHeaders) -> Self {
        self.content = Some(content);
        self
    }

    /// Allow any origin to read the response.
    #[must_use]
    pub const fn with_cors(mut self) -> Self {
        self.cors = true;
        self
    }
}

impl TargetWriter for ResponseHeaders {
    fn write_to(&self, writer: &mut impl Write) -> Result<(), core::fmt::Error> {
        let reason = reason_phrase(self.status);
        write!(writer, "HTTP/1.1 {} {}\r\n", self.status, reason)?;
        if let Some(content) = &self.content {
            content.write_to(writer)?;
        }
        if self.cors {
            write!(writer, "Access-Control-Allow-Origin: *\r\n")?;
        }
        write!(writer, "\r\n")?;
        Ok(())
    }
}
