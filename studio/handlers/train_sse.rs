use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use log::debug;
use tiny_http::Request;

use ferrite_jobs::TaskUpdate;

use crate::state::SharedState;
use crate::util::sse::{format_sse_event, write_frame, SSE_KEEPALIVE, SSE_RESPONSE_HEAD};

/// `GET /train/events` — Server-Sent Events handler.
///
/// On connect the current combined and learning-rate graphs are replayed so
/// a late subscriber starts with a full chart. Afterwards every task update
/// for this job is forwarded as an SSE frame named after its kind
/// (`progress`, `combined_graph`, `lr_graph`). A `: ping` comment goes out
/// every 500 ms of silence; once training is no longer running a final
/// `done` frame carries the status and the stream closes.
pub fn handle(request: Request, state: SharedState) {
    let mut writer = request.into_writer();
    if write_frame(&mut writer, SSE_RESPONSE_HEAD).is_err() {
        return;
    }

    // Replay what has been recorded so far.
    let (room, replay, events) = {
        let st = state.lock().unwrap();
        let mut replay = Vec::new();
        if let Some(task) = st.task.as_ref() {
            if let Some(data) = task.combined_graph_data() {
                replay.push(TaskUpdate::CombinedGraph { task: task.html_id(), data });
            }
            if let Some(data) = task.lr_graph_data() {
                replay.push(TaskUpdate::LrGraph { task: task.html_id(), data });
            }
        }
        (st.config.job_id.clone(), replay, st.events.clone())
    };
    for update in &replay {
        if send_update(&mut writer, update).is_err() {
            return;
        }
    }

    loop {
        let result = {
            let rx = events.lock().unwrap();
            rx.recv_timeout(Duration::from_millis(500))
        };

        match result {
            Ok(event) => {
                if event.room != room {
                    continue;
                }
                if send_update(&mut writer, &event.update).is_err() {
                    debug!("SSE client disconnected");
                    return;
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                let status = {
                    let st = state.lock().unwrap();
                    if st.is_running() { None } else { Some(st.training.label()) }
                };
                let frame = match status {
                    None        => SSE_KEEPALIVE.to_owned(),
                    Some(label) => format_sse_event("done", &serde_json::json!({ "status": label }).to_string()),
                };
                if write_frame(&mut writer, &frame).is_err() || status.is_some() {
                    return;
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                let _ = write_frame(&mut writer, &format_sse_event("done", "{}"));
                return;
            }
        }
    }
}

fn send_update<W: std::io::Write>(writer: &mut W, update: &TaskUpdate) -> std::io::Result<()> {
    let json = serde_json::to_string(update)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    write_frame(writer, &format_sse_event(update.kind(), &json))
}
