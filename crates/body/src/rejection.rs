//! Mapping of interceptor failures onto HTTP error responses.

use bytes::Bytes;
use http::{Response, StatusCode};
use http_body_util::Full;
use std::error::Error;
use thiserror::Error;
use xml_tree::XmlError;

/// Type-erased body error, as produced by `http-body` combinators.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Why a matching-type request was rejected instead of handed downstream.
///
/// Unsupported content types are not represented here: they are a silent
/// pass-through, not an error.
#[derive(Debug, Error)]
pub enum Rejection {
    /// The body exceeded the configured buffer limit; no partial body is
    /// retained.
    #[error("request body exceeds the configured limit of {max_size} bytes")]
    BodyTooLarge { max_size: usize },

    /// The body is not a well-formed XML document. The converter diagnostic
    /// (with position where available) becomes the response body.
    #[error("malformed xml body: {source}")]
    MalformedXml {
        #[from]
        source: XmlError,
    },

    /// The body is not valid UTF-8 text.
    #[error("request body is not valid utf-8 text")]
    InvalidEncoding,

    /// The body stream failed before arriving completely (reset, timeout).
    /// Not a client error; surfaced as a framework-level failure.
    #[error("failed to read request body: {source}")]
    StreamRead { source: BoxError },
}

impl Rejection {
    pub fn body_too_large(max_size: usize) -> Self {
        Self::BodyTooLarge { max_size }
    }

    pub fn stream_read(source: BoxError) -> Self {
        Self::StreamRead { source }
    }

    /// The HTTP status this rejection maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::MalformedXml { .. } | Self::InvalidEncoding => StatusCode::BAD_REQUEST,
            Self::StreamRead { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Builds the error response carrying the diagnostic as plain text.
    pub fn into_response(self) -> Response<Full<Bytes>> {
        let status = self.status();
        let mut response = Response::new(Full::new(Bytes::from(self.to_string())));
        *response.status_mut() = status;
        if let Ok(content_type) = mime::TEXT_PLAIN_UTF_8.as_ref().parse() {
            response.headers_mut().insert(http::header::CONTENT_TYPE, content_type);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::Rejection;
    use http::StatusCode;
    use xml_tree::XmlError;

    #[test]
    fn statuses_follow_the_error_taxonomy() {
        assert_eq!(Rejection::body_too_large(1024).status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(Rejection::from(XmlError::EmptyDocument).status(), StatusCode::BAD_REQUEST);
        assert_eq!(Rejection::InvalidEncoding.status(), StatusCode::BAD_REQUEST);
        let read_failed = Rejection::stream_read("connection reset".into());
        assert_eq!(read_failed.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn response_carries_the_parser_diagnostic() {
        let rejection = Rejection::from(XmlError::syntax(4, "unexpected token"));
        let message = rejection.to_string();
        let response = rejection.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(message.contains("byte 4"), "{message}");
    }
}
