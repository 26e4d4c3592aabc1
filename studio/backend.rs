use std::sync::{Arc, atomic::{AtomicBool, Ordering}};
use std::time::Duration;

use log::{debug, info};
use rand::Rng;

use ferrite_jobs::task::FileSnapshotBackend;
use ferrite_jobs::Result;

use crate::state::SharedState;

/// Progress reports per epoch.
const STEPS_PER_EPOCH: usize = 4;
/// Wall-clock pause between reports.
const STEP_DELAY: Duration = Duration::from_millis(150);
/// Learning rate is divided by 10 every this many epochs.
const LR_STEP_EPOCHS: f64 = 10.0;

/// Stand-in for a real training backend: produces a noisy, decaying loss
/// curve and a rising accuracy curve so the recorder and graphs can be
/// exercised end to end.
pub struct SyntheticRun {
    base_lr: f64,
    decay:   f64,
}

impl SyntheticRun {
    pub fn new(base_lr: f64) -> Self {
        let decay = rand::thread_rng().gen_range(0.08..0.2);
        SyntheticRun { base_lr, decay }
    }

    fn learning_rate(&self, epoch: f64) -> f64 {
        self.base_lr * 0.1f64.powi((epoch / LR_STEP_EPOCHS).floor() as i32)
    }

    fn train_loss(&self, epoch: f64) -> f64 {
        let noise: f64 = rand::thread_rng().gen_range(-0.05..0.05);
        (2.3 * (-self.decay * epoch).exp() + 0.05 + noise).max(0.0)
    }

    fn val_metrics(&self, epoch: f64) -> (f64, f64) {
        let mut rng = rand::thread_rng();
        let loss = 2.3 * (-self.decay * 0.9 * epoch).exp() + 0.1 + rng.gen_range(-0.03..0.03);
        let acc  = 1.0 - 0.9 * (-self.decay * epoch).exp() + rng.gen_range(-0.02..0.02);
        (loss.max(0.0), acc.clamp(0.0, 1.0))
    }

    /// Drives the task in `state` until every epoch ran or `stop_flag` is set.
    pub fn run(&self, state: &SharedState, stop_flag: &Arc<AtomicBool>) -> Result<()> {
        let (total_epochs, snapshot_interval) = {
            let st = state.lock().unwrap();
            (st.config.train_epochs, st.config.snapshot_interval)
        };
        let total_steps = (total_epochs * STEPS_PER_EPOCH as f64).ceil() as usize;

        for step in 1..=total_steps {
            if stop_flag.load(Ordering::Relaxed) {
                info!("training stopped at step {}", step);
                break;
            }
            std::thread::sleep(STEP_DELAY);

            let epoch = step as f64 / STEPS_PER_EPOCH as f64;
            let mut st = state.lock().unwrap();
            let task = match st.task.as_mut() {
                Some(t) => t,
                None    => break,
            };

            task.advance_epoch(epoch)?;
            task.record_train_output("loss", "SoftmaxWithLoss", self.train_loss(epoch))?;
            task.record_train_output("learning_rate", "LearningRate", self.learning_rate(epoch))?;

            if step % STEPS_PER_EPOCH != 0 {
                continue;
            }
            let (val_loss, val_acc) = self.val_metrics(epoch);
            task.record_val_output("loss", "SoftmaxWithLoss", val_loss)?;
            task.record_val_output("accuracy", "Accuracy", val_acc)?;

            if snapshot_interval > 0.0 && epoch % snapshot_interval == 0.0 {
                let path = FileSnapshotBackend::snapshot_path(&task.job_dir, epoch);
                let file = std::fs::File::create(&path)?;
                serde_json::to_writer(file, &serde_json::json!({ "epoch": epoch, "val_loss": val_loss }))?;
                task.detect_snapshots()?;
                debug!("wrote snapshot {}", path.display());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn learning_rate_steps_down() {
        let run = SyntheticRun::new(0.1);
        assert_eq!(run.learning_rate(0.5), 0.1);
        assert!((run.learning_rate(10.0) - 0.01).abs() < 1e-12);
        assert!((run.learning_rate(25.0) - 0.001).abs() < 1e-12);
    }

    #[test]
    fn metrics_stay_in_range() {
        let run = SyntheticRun::new(0.01);
        for e in 0..50 {
            let (loss, acc) = run.val_metrics(e as f64);
            assert!(loss >= 0.0);
            assert!((0.0..=1.0).contains(&acc));
            assert!(run.train_loss(e as f64) >= 0.0);
        }
    }
}
