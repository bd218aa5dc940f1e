//! Request correlation middleware.
//!
//! A client may send its own `trace-id` (the till app does, so retries of
//! one sale share an id). Anything that is not a UUID is ignored and a fresh
//! id generated. The id is scoped for the handler, attached to the request
//! span, and echoed back in the response header.

use std::task::{Context, Poll};
use std::time::Instant;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::domain::TraceId;

/// Header carrying the trace id in both directions.
pub const TRACE_ID_HEADER: &str = "trace-id";

/// Wrap an `App` with `.wrap(Trace)`.
///
/// ```
/// use actix_web::App;
/// use fournil::Trace;
///
/// let _app = App::new().wrap(Trace);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Trace;

impl<S, B> Transform<S, ServiceRequest> for Trace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceService { inner: service }))
    }
}

pub struct TraceService<S> {
    inner: S,
}

fn inbound_trace_id(req: &ServiceRequest) -> Option<TraceId> {
    let raw = req.headers().get(TRACE_ID_HEADER)?.to_str().ok()?;
    raw.parse()
        .inspect_err(|_| debug!(header = raw, "ignoring malformed inbound trace id"))
        .ok()
}

impl<S, B> Service<ServiceRequest> for TraceService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let trace_id = inbound_trace_id(&req).unwrap_or_else(TraceId::generate);
        let span = info_span!(
            "request",
            method = %req.method(),
            path = %req.path(),
            %trace_id,
        );
        let started = Instant::now();
        let pending = self.inner.call(req);

        let work = async move {
            let mut response = pending.await?;
            let status = response.status();
            let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            if status.is_server_error() {
                warn!(status = status.as_u16(), elapsed_ms, "request failed");
            } else {
                info!(status = status.as_u16(), elapsed_ms, "request served");
            }
            // A UUID's text form is always a valid header value.
            if let Ok(value) = HeaderValue::from_str(&trace_id.to_string()) {
                response
                    .headers_mut()
                    .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
            }
            Ok(response)
        };
        Box::pin(TraceId::scope(trace_id, work.instrument(span)))
    }
}
