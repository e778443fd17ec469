//! An XML request body interceptor for `http` ecosystem stacks
//!
//! The interceptor inspects each inbound request: when the declared content
//! type is in a configurable set of XML media types it collects the body
//! (bounded by a size limit), converts it into a structured
//! [`XmlValue`](xml_tree::XmlValue) and attaches the result to the request;
//! otherwise the request passes through untouched. Parse failures map to
//! client error responses carrying the parser diagnostic.
//!
//! The per-request pipeline is exposed as an explicit three-state outcome
//! ([`Intercept`]): pass-through, parsed, or rejected. That keeps the
//! contract testable without a running server, while
//! [`XmlBodyInterceptor::intercept`] offers the conventional
//! middleware shape around a downstream continuation.
//!
//! # Example
//!
//! ```no_run
//! use bytes::Bytes;
//! use http::{Request, Response, StatusCode};
//! use http_body_util::Full;
//! use xml_body::{XmlBody, XmlBodyConfig, XmlBodyInterceptor};
//! use xml_tree::ParseOptions;
//!
//! # async fn handle(req: Request<Full<Bytes>>) -> Response<Full<Bytes>> {
//! let interceptor = XmlBodyInterceptor::new(
//!     XmlBodyConfig::builder()
//!         .xml(ParseOptions::new().explicit_array(false))
//!         .max_body_size(64 * 1024)
//!         .build(),
//! );
//!
//! interceptor
//!     .intercept(req, |req| async move {
//!         match XmlBody::of(&req) {
//!             Some(body) => {
//!                 let json = serde_json::to_string(body.value()).unwrap();
//!                 Response::new(Full::new(Bytes::from(json)))
//!             }
//!             None => Response::builder()
//!                 .status(StatusCode::NO_CONTENT)
//!                 .body(Full::new(Bytes::new()))
//!                 .unwrap(),
//!         }
//!     })
//!     .await
//! # }
//! ```

mod config;
mod convert;
mod interceptor;
mod matcher;
mod rejection;

pub use config::{DEFAULT_MAX_BODY_SIZE, XmlBodyConfig, XmlBodyConfigBuilder};
pub use convert::{TreeConverter, XmlConverter};
pub use interceptor::{Intercept, InterceptedBody, XmlBody, XmlBodyInterceptor};
pub use matcher::{ContentTypeMatcher, DEFAULT_CONTENT_TYPES};
pub use rejection::{BoxError, Rejection};
