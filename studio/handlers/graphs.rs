use std::io::Cursor;
use tiny_http::Response;

use ferrite_jobs::TaskError;

use crate::routes::{json_error, json_response, no_content};
use crate::state::SharedState;

// ---------------------------------------------------------------------------
// GET /train/graph/{combined,loss,accuracy,lr}
// ---------------------------------------------------------------------------

/// Serves one graph payload. `204 No Content` when there is nothing to plot.
pub fn handle_graph(kind: &str, state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let st = state.lock().unwrap();
    let task = match st.task.as_ref() {
        Some(t) => t,
        None    => return no_content(),
    };

    let data = match kind {
        "combined" => task.combined_graph_data(),
        "loss"     => task.loss_graph_data(),
        "accuracy" => task.accuracy_graph_data(),
        "lr"       => task.lr_graph_data(),
        _          => return crate::routes::not_found(),
    };

    match data.map(serde_json::to_value) {
        None           => no_content(),
        Some(Ok(json)) => json_response(200, &json),
        Some(Err(e))   => json_error(500, e),
    }
}

// ---------------------------------------------------------------------------
// GET /train/snapshots
// ---------------------------------------------------------------------------

pub fn handle_snapshots(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let st = state.lock().unwrap();
    let list = st.task.as_ref().map(|t| t.snapshot_list()).unwrap_or_default();
    drop(st);

    match serde_json::to_value(&list) {
        Ok(json) => json_response(200, &json),
        Err(e)   => json_error(500, e),
    }
}

// ---------------------------------------------------------------------------
// GET /train/labels
// ---------------------------------------------------------------------------

pub fn handle_labels(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut st = state.lock().unwrap();
    let task = match st.task.as_mut() {
        Some(t) => t,
        None    => return json_error(404, "no training task"),
    };

    match task.get_labels() {
        Ok(labels) => json_response(200, &serde_json::json!(labels)),
        Err(e @ TaskError::Precondition(_)) => json_error(412, e),
        Err(e) => json_error(500, e),
    }
}
