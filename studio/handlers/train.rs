use std::sync::{Arc, atomic::{AtomicBool, Ordering}};
use std::thread;
use std::io::Cursor;

use log::{error, info};
use serde_json::json;
use tiny_http::Response;

use ferrite_jobs::task::FileSnapshotBackend;
use ferrite_jobs::util::print_time_diff;
use ferrite_jobs::{ChannelNotifier, TaskConfig, TrainTask};

use crate::backend::SyntheticRun;
use crate::routes::{json_error, json_response};
use crate::state::{SharedState, TrainingStatus};

// ---------------------------------------------------------------------------
// GET /train/status
// ---------------------------------------------------------------------------

pub fn handle_status(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let st = state.lock().unwrap();

    let task_json = st.task.as_ref().map(|t| json!({
        "task":          t.html_id(),
        "current_epoch": t.current_epoch,
        "train_epochs":  t.config.train_epochs,
        "percentage":    (100.0 * t.progress).round(),
        "eta":           print_time_diff(t.est_done()),
        "snapshots":     t.snapshots.len(),
    }));
    let mut body = json!({
        "job_id": st.config.job_id,
        "status": st.training.label(),
        "task":   task_json,
    });
    match &st.training {
        TrainingStatus::Done { task_path, was_stopped } => {
            body["task_path"]   = json!(task_path);
            body["was_stopped"] = json!(was_stopped);
        }
        TrainingStatus::Failed { reason } => {
            body["reason"] = json!(reason);
        }
        _ => {}
    }
    drop(st);

    json_response(200, &body)
}

// ---------------------------------------------------------------------------
// POST /train/start
// ---------------------------------------------------------------------------

pub fn handle_start(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut st = state.lock().unwrap();

    // If already running, don't start another.
    if st.is_running() {
        drop(st);
        return json_error(409, "training is already running");
    }

    let cfg = st.config.clone();
    let job_dir = cfg.job_dir();

    // A new run starts from an empty job directory.
    if job_dir.exists() {
        if let Err(e) = std::fs::remove_dir_all(&job_dir) {
            drop(st);
            return json_error(500, format!("could not clear {}: {}", job_dir.display(), e));
        }
    }
    if let Err(e) = std::fs::create_dir_all(&job_dir) {
        drop(st);
        return json_error(500, format!("could not create {}: {}", job_dir.display(), e));
    }

    let config = TaskConfig::new(cfg.train_epochs, cfg.snapshot_interval, cfg.learning_rate);
    let task = match TrainTask::new(cfg.job_id.clone(), "train", job_dir, config) {
        Ok(t)  => t,
        Err(e) => {
            drop(st);
            return json_error(400, e);
        }
    };
    let mut task = task
        .with_backend(FileSnapshotBackend)
        .with_notifier(ChannelNotifier::new(st.events_tx.clone()));
    if let Some(ds) = st.dataset() {
        task.attach_dataset(ds);
    }

    let stop_flag = Arc::new(AtomicBool::new(false));
    st.task     = Some(task);
    st.training = TrainingStatus::Running { stop_flag: stop_flag.clone() };
    drop(st);

    let job_id = cfg.job_id.clone();
    info!("starting training for job {}", job_id);

    // Spawn background training thread.
    let state_clone = state.clone();
    thread::spawn(move || {
        let run    = SyntheticRun::new(cfg.learning_rate);
        let result = run.run(&state_clone, &stop_flag);

        let mut st = state_clone.lock().unwrap();
        let task_path = cfg.task_path();
        let saved = match (&result, st.task.as_ref()) {
            (Ok(()), Some(task)) => task.save_json(&task_path),
            _ => Ok(()),
        };

        st.training = match (result, saved) {
            (Ok(()), Ok(())) => {
                let was_stopped = stop_flag.load(Ordering::Relaxed);
                info!("training finished; task saved to {}", task_path.display());
                TrainingStatus::Done {
                    task_path: task_path.display().to_string(),
                    was_stopped,
                }
            }
            (Err(e), _) | (_, Err(e)) => {
                error!("training failed: {}", e);
                TrainingStatus::Failed { reason: e.to_string() }
            }
        };
    });

    json_response(202, &json!({ "status": "running", "job_id": job_id }))
}

// ---------------------------------------------------------------------------
// POST /train/stop
// ---------------------------------------------------------------------------

pub fn handle_stop(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let st = state.lock().unwrap();
    let stopping = if let TrainingStatus::Running { stop_flag, .. } = &st.training {
        stop_flag.store(true, Ordering::Relaxed);
        true
    } else {
        false
    };
    drop(st);

    if stopping {
        json_response(202, &json!({ "status": "stopping" }))
    } else {
        json_error(409, "training is not running")
    }
}
