/// ferrite-jobs Studio
///
/// Browser-facing server for one training job: a synthetic backend reports
/// epoch metrics into a `TrainTask`, live updates stream over SSE and graph
/// payloads are served as JSON. The task is saved when training ends and
/// restored on the next start.
///
/// Run with:
///   RUST_LOG=info cargo run --bin studio --release
/// Then:
///   curl -X POST http://127.0.0.1:7878/train/start
///   curl -N http://127.0.0.1:7878/train/events
///
/// Routes:
///   GET  /train/status          job and task summary
///   POST /train/start           start a run (clears the job directory)
///   POST /train/stop            stop after the current step
///   GET  /train/events          SSE stream of task updates
///   GET  /train/graph/{kind}    combined | loss | accuracy | lr
///   GET  /train/snapshots       snapshot picker entries, newest first
///   GET  /train/labels          dataset labels (needs DATASET_DIR/LABELS_FILE)

mod backend;
mod config;
mod handlers;
mod routes;
mod state;
mod util;

use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use log::{error, info, warn};
use tiny_http::Server;

use ferrite_jobs::task::FileSnapshotBackend;
use ferrite_jobs::{ChannelNotifier, TrainTask};

use config::StudioConfig;
use state::StudioState;

fn main() -> ExitCode {
    env_logger::init();

    let config = match StudioConfig::from_env() {
        Ok(c)  => c,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let addr = config.addr();
    let server = match Server::http(&addr) {
        Ok(s)  => s,
        Err(e) => {
            error!("failed to bind {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    let mut studio = StudioState::new(config);
    restore_task(&mut studio);
    let shared_state = Arc::new(Mutex::new(studio));

    info!("studio listening on http://{}", addr);

    // Each request is dispatched on its own thread so the SSE handler
    // (which blocks for the entire training duration) does not stall
    // regular requests.
    for request in server.incoming_requests() {
        let state_clone = shared_state.clone();
        std::thread::spawn(move || {
            routes::dispatch(request, state_clone);
        });
    }

    ExitCode::SUCCESS
}

/// Reloads the task saved by a previous run, if any, and reattaches the
/// runtime-only pieces (notifier, dataset).
fn restore_task(studio: &mut StudioState) {
    let path = studio.config.task_path();
    if !path.exists() {
        return;
    }

    match TrainTask::load_json(&path, FileSnapshotBackend) {
        Ok(mut task) => {
            task.set_notifier(ChannelNotifier::new(studio.events_tx.clone()));
            if let Some(ds) = studio.dataset() {
                task.attach_dataset(ds);
            }
            studio.task = Some(task);
        }
        Err(e) => warn!("ignoring unreadable task record {}: {}", path.display(), e),
    }
}
