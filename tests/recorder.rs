use ferrite_jobs::series::{EPOCH, LEARNING_RATE};
use ferrite_jobs::{RowValue, SeriesTable, TaskConfig, TaskError, TrainTask};

use RowValue::{Missing, Multi, Scalar};

fn task() -> TrainTask {
    TrainTask::new("job", "1", "unused", TaskConfig::new(10.0, 1.0, 0.01)).unwrap()
}

fn data<'a>(table: &'a SeriesTable, name: &str) -> &'a [RowValue] {
    &table.get(name).unwrap().data
}

#[test]
fn repeated_reports_in_one_epoch_accumulate() {
    let mut t = task();
    t.advance_epoch(0.0).unwrap();
    for _ in 0..3 {
        t.record_train_output("loss", "SoftmaxWithLoss", 0.9).unwrap();
    }
    assert_eq!(data(&t.train_outputs, "loss"), &[Multi(vec![0.9, 0.9, 0.9])]);
}

#[test]
fn second_value_promotes_to_pair_third_appends() {
    let mut table = SeriesTable::new();
    table.append("loss", "SoftmaxWithLoss", 1.0, 0.0).unwrap();
    table.append("loss", "SoftmaxWithLoss", 2.0, 0.0).unwrap();
    assert_eq!(data(&table, "loss"), &[Multi(vec![1.0, 2.0])]);
    table.append("loss", "SoftmaxWithLoss", 3.0, 0.0).unwrap();
    assert_eq!(data(&table, "loss"), &[Multi(vec![1.0, 2.0, 3.0])]);
}

#[test]
fn skipped_epochs_are_backfilled_with_missing() {
    let mut table = SeriesTable::new();
    table.append("loss", "SoftmaxWithLoss", 1.0, 0.0).unwrap();
    table.append("accuracy", "Accuracy", 0.1, 0.0).unwrap();
    table.append("loss", "SoftmaxWithLoss", 0.9, 1.0).unwrap();
    table.append("loss", "SoftmaxWithLoss", 0.8, 2.0).unwrap();
    table.append("loss", "SoftmaxWithLoss", 0.7, 3.0).unwrap();

    let complete = table.append("accuracy", "Accuracy", 0.4, 3.0).unwrap();
    assert!(complete);
    assert_eq!(
        data(&table, "accuracy"),
        &[Scalar(0.1), Missing, Missing, Scalar(0.4)]
    );
    assert_eq!(
        data(&table, EPOCH),
        &[Scalar(0.0), Scalar(1.0), Scalar(2.0), Scalar(3.0)]
    );
}

#[test]
fn late_series_gets_leading_gaps() {
    let mut table = SeriesTable::new();
    table.append("loss", "SoftmaxWithLoss", 1.0, 0.0).unwrap();
    table.append("loss", "SoftmaxWithLoss", 0.9, 1.0).unwrap();
    table.append("top5", "Accuracy", 0.5, 1.0).unwrap();
    assert_eq!(data(&table, "top5"), &[Missing, Scalar(0.5)]);
}

#[test]
fn out_of_order_update_is_an_error() {
    let mut t = task();
    t.record_train_output("loss", "SoftmaxWithLoss", 1.0).unwrap();
    // Make the loss series run ahead of the epoch series.
    let mut table = t.train_outputs.clone();
    let mut loss = table.get("loss").unwrap().clone();
    loss.data.push(Scalar(0.5));
    table.insert("loss", loss);
    t.train_outputs = table;

    let err = t.record_train_output("loss", "SoftmaxWithLoss", 0.4).unwrap_err();
    assert!(matches!(err, TaskError::OutOfOrderUpdate { name_len: 2, epoch_len: 1, .. }));
}

/// Drives a table through a mixed sequence of reports with a non-decreasing
/// epoch and checks the length bound and the completeness flag after every
/// call.
#[test]
fn lengths_never_exceed_epoch_series() {
    let schedule: &[(f64, &str, &str)] = &[
        (0.0, "loss", "SoftmaxWithLoss"),
        (0.0, "accuracy", "Accuracy"),
        (0.0, "loss", "SoftmaxWithLoss"),
        (0.5, LEARNING_RATE, "LearningRate"),
        (1.0, "loss", "SoftmaxWithLoss"),
        (1.0, "loss2", "EuclideanLoss"),
        (1.0, "accuracy", "Accuracy"),
        (3.0, "accuracy", "Accuracy"),
        (3.0, LEARNING_RATE, "LearningRate"),
        (3.0, "loss", "SoftmaxWithLoss"),
        (3.0, "loss2", "EuclideanLoss"),
        (4.0, "loss2", "EuclideanLoss"),
    ];

    let mut table = SeriesTable::new();
    for (i, (epoch, name, kind)) in schedule.iter().enumerate() {
        let complete = table.append(*name, *kind, i as f64, *epoch).unwrap();

        let epoch_len = table.epoch_len();
        let mut all_equal = true;
        for (n, s) in table.iter() {
            if n == EPOCH || n == LEARNING_RATE {
                continue;
            }
            assert!(s.len() <= epoch_len, "{} has {} rows for {} epochs", n, s.len(), epoch_len);
            all_equal &= s.len() == epoch_len;
        }
        assert_eq!(complete, all_equal, "step {}", i);
    }
}

#[test]
fn validation_outputs_are_independent() {
    let mut t = task();
    t.record_train_output("loss", "SoftmaxWithLoss", 1.0).unwrap();
    t.advance_epoch(1.0).unwrap();
    assert!(t.record_val_output("accuracy", "Accuracy", 0.3).unwrap());

    assert_eq!(data(&t.val_outputs, EPOCH), &[Scalar(1.0)]);
    assert_eq!(data(&t.train_outputs, EPOCH), &[Scalar(0.0)]);
}
