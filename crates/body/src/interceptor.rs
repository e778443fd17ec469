//! The body interceptor: request classification and body transformation.
//!
//! Per request the interceptor moves through three states: before the type
//! check (idle), then either a terminal pass-through, or body consumption
//! ending in a parsed request or a rejection. The outcome is returned as an
//! explicit [`Intercept`] value rather than through implicit chaining, so
//! the contract is observable without a running server; [`intercept`]
//! drives the outcome into a downstream continuation.
//!
//! [`intercept`]: XmlBodyInterceptor::intercept

use crate::config::XmlBodyConfig;
use crate::convert::{TreeConverter, XmlConverter};
use crate::rejection::{BoxError, Rejection};
use bytes::Bytes;
use http::{HeaderMap, Request, Response, header};
use http_body::{Body, Frame, SizeHint};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use pin_project_lite::pin_project;
use std::fmt;
use std::ops::Deref;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tracing::{debug, error, trace, warn};
use xml_tree::XmlValue;

/// The parsed body attached to a request's extensions.
///
/// Retrieved downstream with [`XmlBody::of`]. The value is `Arc`-shared, so
/// cloning the extension is cheap and the structure lives exactly as long
/// as the request that carried it.
#[derive(Debug, Clone)]
pub struct XmlBody(Arc<XmlValue>);

impl XmlBody {
    fn new(value: XmlValue) -> Self {
        Self(Arc::new(value))
    }

    /// The parsed structure.
    pub fn value(&self) -> &XmlValue {
        &self.0
    }

    /// Looks up the parsed body on a request, if the interceptor attached
    /// one.
    pub fn of<B>(req: &Request<B>) -> Option<&Self> {
        req.extensions().get::<Self>()
    }
}

impl Deref for XmlBody {
    type Target = XmlValue;

    fn deref(&self) -> &XmlValue {
        &self.0
    }
}

/// Outcome of applying the interceptor to one request.
pub enum Intercept<B> {
    /// Content type outside the configured set: the request is handed back
    /// untouched and its body was never polled.
    PassThrough(Request<B>),
    /// Body collected and parsed; the [`XmlBody`] extension is set and the
    /// collected bytes are re-attached as the request body.
    Parsed(Request<Full<Bytes>>),
    /// The continuation must not run; the rejection maps to an HTTP error.
    Rejected(Rejection),
}

impl<B> fmt::Debug for Intercept<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PassThrough(_) => f.write_str("Intercept::PassThrough"),
            Self::Parsed(_) => f.write_str("Intercept::Parsed"),
            Self::Rejected(rejection) => write!(f, "Intercept::Rejected({rejection})"),
        }
    }
}

pin_project! {
    /// Unifies the two success paths of [`Intercept`] into one body type for
    /// the downstream continuation: the untouched original stream, or the
    /// buffered bytes of a parsed body.
    #[project = InterceptedBodyProj]
    pub enum InterceptedBody<B> {
        Original { #[pin] inner: B },
        Buffered { #[pin] inner: Full<Bytes> },
    }
}

impl<B> Body for InterceptedBody<B>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    type Data = Bytes;
    type Error = BoxError;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, BoxError>>> {
        match self.project() {
            InterceptedBodyProj::Original { inner } => {
                inner.poll_frame(cx).map(|frame| frame.map(|result| result.map_err(Into::into)))
            }
            InterceptedBodyProj::Buffered { inner } => {
                inner.poll_frame(cx).map(|frame| frame.map(|result| result.map_err(|never| match never {})))
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        match self {
            Self::Original { inner } => inner.is_end_stream(),
            Self::Buffered { inner } => inner.is_end_stream(),
        }
    }

    fn size_hint(&self) -> SizeHint {
        match self {
            Self::Original { inner } => inner.size_hint(),
            Self::Buffered { inner } => inner.size_hint(),
        }
    }
}

impl<B> fmt::Debug for InterceptedBody<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Original { .. } => f.write_str("InterceptedBody::Original"),
            Self::Buffered { .. } => f.write_str("InterceptedBody::Buffered"),
        }
    }
}

/// The body interceptor.
///
/// Holds only the immutable configuration and a shared converter, so one
/// instance is safe for any number of simultaneously in-flight requests.
pub struct XmlBodyInterceptor {
    config: XmlBodyConfig,
    converter: Arc<dyn XmlConverter>,
}

impl XmlBodyInterceptor {
    /// Builds an interceptor backed by the default `xml-tree` converter.
    pub fn new(config: XmlBodyConfig) -> Self {
        Self::with_converter(config, TreeConverter)
    }

    /// Builds an interceptor with an injected converter implementation.
    pub fn with_converter<C: XmlConverter + 'static>(config: XmlBodyConfig, converter: C) -> Self {
        Self { config, converter: Arc::new(converter) }
    }

    pub fn config(&self) -> &XmlBodyConfig {
        &self.config
    }

    /// Whether a request with these headers would be consumed.
    pub fn matches(&self, headers: &HeaderMap) -> bool {
        self.config.matcher.matches(headers.get(header::CONTENT_TYPE))
    }

    /// Classifies the request and, when it matches, consumes and parses the
    /// body.
    ///
    /// This is the whole per-request pipeline: headers are never mutated,
    /// the body is consumed at most once and never buffered beyond the
    /// configured maximum, and the only await point is body collection, so
    /// dropping the returned future releases any partial buffer.
    pub async fn apply<B>(&self, req: Request<B>) -> Intercept<B>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<BoxError>,
    {
        if !self.matches(req.headers()) {
            trace!("content type not in the configured set, passing through");
            return Intercept::PassThrough(req);
        }

        let (mut parts, body) = req.into_parts();

        let max_size = self.config.max_body_size;
        let bytes = match Limited::new(body, max_size).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(cause) if cause.is::<LengthLimitError>() => {
                warn!(max_size, "request body exceeded the buffer limit");
                return Intercept::Rejected(Rejection::body_too_large(max_size));
            }
            Err(cause) => {
                error!(cause = %cause, "request body stream failed");
                return Intercept::Rejected(Rejection::stream_read(cause));
            }
        };
        debug!(size = bytes.len(), "collected xml request body");

        let Ok(text) = std::str::from_utf8(&bytes) else {
            warn!("request body is not valid utf-8");
            return Intercept::Rejected(Rejection::InvalidEncoding);
        };

        let value = if text.trim().is_empty() {
            if !self.config.tolerate_empty {
                warn!("empty body with a matching content type");
                return Intercept::Rejected(Rejection::from(xml_tree::XmlError::EmptyDocument));
            }
            XmlValue::empty_map()
        } else {
            match self.converter.convert(text, &self.config.xml) {
                Ok(value) => value,
                Err(cause) => {
                    warn!(cause = %cause, "rejecting malformed xml body");
                    return Intercept::Rejected(Rejection::from(cause));
                }
            }
        };

        parts.extensions.insert(XmlBody::new(value));
        Intercept::Parsed(Request::from_parts(parts, Full::new(bytes)))
    }

    /// Applies the interceptor and drives the outcome into `next`.
    ///
    /// Pass-through and parsed requests reach the continuation (their
    /// bodies unified as [`InterceptedBody`]); rejections are turned into
    /// the mapped error response without the continuation ever running.
    pub async fn intercept<B, F, Fut>(&self, req: Request<B>, next: F) -> Response<Full<Bytes>>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<BoxError>,
        F: FnOnce(Request<InterceptedBody<B>>) -> Fut,
        Fut: Future<Output = Response<Full<Bytes>>>,
    {
        match self.apply(req).await {
            Intercept::PassThrough(req) => {
                next(req.map(|inner| InterceptedBody::Original { inner })).await
            }
            Intercept::Parsed(req) => next(req.map(|inner| InterceptedBody::Buffered { inner })).await,
            Intercept::Rejected(rejection) => rejection.into_response(),
        }
    }
}

impl fmt::Debug for XmlBodyInterceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlBodyInterceptor").field("config", &self.config).finish_non_exhaustive()
    }
}
