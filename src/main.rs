// Prints a summary of a saved training task.
// Run with:
//   cargo run --bin ferrite-jobs -- jobs/<job_id>/task.json
use std::process::ExitCode;

use ferrite_jobs::task::FileSnapshotBackend;
use ferrite_jobs::TrainTask;

fn main() -> ExitCode {
    env_logger::init();

    let path = match std::env::args().nth(1) {
        Some(p) => p,
        None    => {
            eprintln!("usage: ferrite-jobs <task.json>");
            return ExitCode::FAILURE;
        }
    };

    let task = match TrainTask::load_json(&path, FileSnapshotBackend) {
        Ok(t)  => t,
        Err(e) => {
            eprintln!("failed to load {}: {}", path, e);
            return ExitCode::FAILURE;
        }
    };

    println!("{} (job {})", task.html_id(), task.job_id);
    println!(
        "epoch {} of {} ({:.0}%)",
        task.current_epoch,
        task.config.train_epochs,
        task.progress * 100.0
    );

    let snapshots = task.snapshot_list();
    if snapshots.is_empty() {
        println!("no snapshots");
    } else {
        for s in &snapshots {
            println!("  {}", s.label);
        }
    }

    match task.combined_graph_data() {
        Some(data) => match serde_json::to_string_pretty(&data) {
            Ok(json) => println!("{}", json),
            Err(e)   => {
                eprintln!("could not render graph: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => println!("no metrics recorded"),
    }

    ExitCode::SUCCESS
}
