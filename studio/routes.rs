use std::io::Cursor;
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::state::SharedState;
use crate::handlers;

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

pub fn json_response(status: u16, body: &serde_json::Value) -> Response<Cursor<Vec<u8>>> {
    let bytes = body.to_string().into_bytes();
    let len = bytes.len();
    Response::new(
        StatusCode(status),
        vec![Header::from_bytes(b"Content-Type", b"application/json").unwrap()],
        Cursor::new(bytes),
        Some(len),
        None,
    )
}

/// `{"error": "<message>"}` with the given status.
pub fn json_error(status: u16, message: impl std::fmt::Display) -> Response<Cursor<Vec<u8>>> {
    json_response(status, &serde_json::json!({ "error": message.to_string() }))
}

pub fn no_content() -> Response<Cursor<Vec<u8>>> {
    Response::new(StatusCode(204), Vec::new(), Cursor::new(Vec::new()), Some(0), None)
}

pub fn not_found() -> Response<Cursor<Vec<u8>>> {
    let body = b"404 Not Found".to_vec();
    let len = body.len();
    Response::new(
        StatusCode(404),
        vec![Header::from_bytes(b"Content-Type", b"text/plain").unwrap()],
        Cursor::new(body),
        Some(len),
        None,
    )
}

// ---------------------------------------------------------------------------
// Request dispatcher
// ---------------------------------------------------------------------------

/// Dispatches incoming requests to the appropriate handler.
///
/// The SSE handler takes ownership of the request to stream frames; every
/// other handler returns a response that is sent here.
pub fn dispatch(request: Request, state: SharedState) {
    let method = request.method().clone();
    let url    = request.url().to_owned();
    let path   = url.split('?').next().unwrap_or("").to_owned();

    // SSE — long-lived; handler takes ownership and drives the stream loop.
    if method == Method::Get && path == "/train/events" {
        handlers::train_sse::handle(request, state);
        return;
    }

    let response = match (method, path.as_str()) {
        (Method::Get,  "/") | (Method::Get, "/train/status") => handlers::train::handle_status(state),
        (Method::Post, "/train/start") => handlers::train::handle_start(state),
        (Method::Post, "/train/stop")  => handlers::train::handle_stop(state),

        (Method::Get, "/train/snapshots") => handlers::graphs::handle_snapshots(state),
        (Method::Get, "/train/labels")    => handlers::graphs::handle_labels(state),
        (Method::Get, p) if p.starts_with("/train/graph/") => {
            let kind = p.trim_start_matches("/train/graph/").to_owned();
            handlers::graphs::handle_graph(&kind, state)
        }

        _ => not_found(),
    };

    let _ = request.respond(response);
}
