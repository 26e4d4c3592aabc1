use std::io::Write;

// ---------------------------------------------------------------------------
// SSE frame helpers
// ---------------------------------------------------------------------------

/// Response head written before the first frame. tiny_http's `into_writer`
/// hands us the raw stream, so the status line and headers go out by hand.
pub const SSE_RESPONSE_HEAD: &str = "HTTP/1.1 200 OK\r\n\
                                     Content-Type: text/event-stream\r\n\
                                     Cache-Control: no-cache\r\n\
                                     Connection: keep-alive\r\n\
                                     X-Accel-Buffering: no\r\n\
                                     \r\n";

/// Formats a named SSE event with a JSON data payload.
///
/// Output format (SSE wire format):
/// ```text
/// event: <name>\n
/// data: <json>\n
/// \n
/// ```
pub fn format_sse_event(event_name: &str, json_data: &str) -> String {
    format!("event: {}\ndata: {}\n\n", event_name, json_data)
}

/// Keep-alive comment; ignored by EventSource clients.
pub const SSE_KEEPALIVE: &str = ": ping\n\n";

/// Writes all bytes and flushes, returning `Err` on any I/O failure
/// (usually a disconnected client).
pub fn write_frame<W: Write>(w: &mut W, frame: &str) -> std::io::Result<()> {
    w.write_all(frame.as_bytes())?;
    w.flush()
}
