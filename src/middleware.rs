use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Header;
use rocket::request::Request;
use rocket::{Data, Response};
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

const MAX_INBOUND_ID_LEN: usize = 128;

/// Correlation id for one request. Reused from an inbound `X-Request-Id`
/// when the caller sends a sane one, otherwise freshly generated.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn new() -> Self {
        RequestId(Uuid::new_v4().to_string())
    }

    fn from_inbound(value: &str) -> Option<Self> {
        let value = value.trim();
        let sane = !value.is_empty()
            && value.len() <= MAX_INBOUND_ID_LEN
            && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        sane.then(|| RequestId(value.to_string()))
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
struct RequestTrace {
    id: RequestId,
    started: Instant,
}

fn cached_trace<'r>(request: &'r Request<'_>) -> &'r Option<RequestTrace> {
    request.local_cache(|| None::<RequestTrace>)
}

/// Request id stored by [`RequestLogger`], if it ran for this request.
pub fn request_id_of(request: &Request<'_>) -> Option<String> {
    cached_trace(request).as_ref().map(|trace| trace.id.0.clone())
}

/// Tags each request with a [`RequestId`], echoes it back in the response
/// headers and logs the request with its latency.
pub struct RequestLogger;

#[rocket::async_trait]
impl Fairing for RequestLogger {
    fn info(&self) -> Info {
        Info {
            name: "Request Logger",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _: &mut Data<'_>) {
        let id = request
            .headers()
            .get_one(REQUEST_ID_HEADER)
            .and_then(RequestId::from_inbound)
            .unwrap_or_default();

        info!(request_id = %id.0, method = %request.method(), uri = %request.uri(), "incoming request");

        let trace = RequestTrace { id, started: Instant::now() };
        request.local_cache(|| Some(trace));
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let (request_id, elapsed_ms) = match cached_trace(request) {
            Some(trace) => (trace.id.0.clone(), trace.started.elapsed().as_millis() as u64),
            None => ("unknown".to_string(), 0u64),
        };

        response.set_header(Header::new(REQUEST_ID_HEADER, request_id.clone()));
        response.set_header(Header::new("X-Content-Type-Options", "nosniff"));
        response.set_header(Header::new("Cache-Control", "no-store"));

        let status = response.status();
        if status.class().is_server_error() || status.class().is_client_error() {
            warn!(
                request_id = %request_id,
                method = %request.method(),
                uri = %request.uri(),
                status = status.code,
                elapsed_ms,
                "request failed"
            );
        } else {
            info!(
                request_id = %request_id,
                method = %request.method(),
                uri = %request.uri(),
                status = status.code,
                elapsed_ms,
                "request served"
            );
        }
    }
}
