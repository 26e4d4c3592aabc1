use ferrite_jobs::graph::{accuracy_graph, combined_graph, loss_graph, lr_graph};
use ferrite_jobs::series::{EPOCH, LEARNING_RATE};
use ferrite_jobs::{NamedSeries, RowValue, SeriesTable};

fn table(rows: usize, metrics: &[(&str, &str)]) -> SeriesTable {
    let mut t = SeriesTable::new();
    t.insert(EPOCH, NamedSeries::from_values("Epoch", (0..rows).map(|e| e as f64)));
    for (name, kind) in metrics {
        t.insert(*name, NamedSeries::from_values(*kind, (0..rows).map(|e| 1.0 / (e + 1) as f64)));
    }
    t
}

#[test]
fn loss_graph_matches_kind_case_insensitively() {
    let train = table(3, &[
        ("loss", "SoftmaxWithLoss"),
        ("l2", "EUCLIDEANLOSS"),
        ("accuracy", "Accuracy"),
        ("other", "InnerProduct"),
    ]);
    let data = loss_graph(&train, &SeriesTable::new()).unwrap();
    assert_eq!(data.column_ids(), vec!["loss-train", "l2-train", "train_epochs"]);
    assert_eq!(data.xs["loss-train"], "train_epochs");
    assert_eq!(data.names["l2-train"], "l2 (train)");
    assert!(data.axes.is_none());
}

#[test]
fn accuracy_graph_needs_exact_kind() {
    let val = table(3, &[
        ("accuracy", "Accuracy"),
        ("top5", "accuracy"),
        ("acc_loss", "AccuracyLoss"),
    ]);
    let data = accuracy_graph(&SeriesTable::new(), &val).unwrap();
    assert_eq!(data.column_ids(), vec!["accuracy-val", "val_epochs"]);
    assert_eq!(data.names["accuracy-val"], "accuracy (val)");
}

#[test]
fn combined_graph_puts_accuracy_on_second_axis() {
    let mut train = table(4, &[("loss", "SoftmaxWithLoss")]);
    train.insert(LEARNING_RATE, NamedSeries::from_values("LearningRate", [0.1; 4]));
    let val = table(2, &[("loss", "SoftmaxWithLoss"), ("accuracy", "Accuracy")]);

    let data = combined_graph(&train, &val).unwrap();
    assert_eq!(
        data.column_ids(),
        vec!["loss-train", "train_epochs", "loss-val", "accuracy-val", "val_epochs"]
    );
    let axes = data.axes.as_ref().unwrap();
    assert_eq!(axes.len(), 1);
    assert_eq!(axes["accuracy-val"], "y2");
    assert_eq!(data.xs["accuracy-val"], "val_epochs");
}

#[test]
fn no_matching_metrics_means_no_graph() {
    let train = table(5, &[("loss", "SoftmaxWithLoss")]);
    assert!(accuracy_graph(&train, &SeriesTable::new()).is_none());
    // An epoch series alone draws nothing.
    assert!(combined_graph(&table(5, &[]), &table(5, &[])).is_none());
}

#[test]
fn x_column_only_for_sides_with_data() {
    let train = table(3, &[("accuracy", "Accuracy")]);
    let val = table(3, &[("loss", "SoftmaxWithLoss")]);
    let data = loss_graph(&train, &val).unwrap();
    assert_eq!(data.column_ids(), vec!["loss-val", "val_epochs"]);
}

#[test]
fn downsampling_250_rows_gives_125_points() {
    let train = table(250, &[("loss", "SoftmaxWithLoss")]);
    let data = combined_graph(&train, &SeriesTable::new()).unwrap();

    let loss = data.column("loss-train").unwrap();
    let epochs = data.column("train_epochs").unwrap();
    assert_eq!(loss.values.len(), 125);
    assert_eq!(epochs.values.len(), 125);
    assert_eq!(epochs.values[0], RowValue::Scalar(0.0));
    assert_eq!(epochs.values[1], RowValue::Scalar(2.0));
    assert_eq!(epochs.values[124], RowValue::Scalar(248.0));
}

#[test]
fn fifty_rows_are_not_downsampled() {
    let train = table(50, &[("loss", "SoftmaxWithLoss")]);
    let data = loss_graph(&train, &SeriesTable::new()).unwrap();
    assert_eq!(data.column("loss-train").unwrap().values.len(), 50);
}

#[test]
fn stride_is_per_table() {
    let train = table(300, &[("loss", "SoftmaxWithLoss")]);
    let val = table(30, &[("loss", "SoftmaxWithLoss")]);
    let data = loss_graph(&train, &val).unwrap();
    assert_eq!(data.column("loss-train").unwrap().values.len(), 100);
    assert_eq!(data.column("loss-val").unwrap().values.len(), 30);
}

#[test]
fn lr_graph_needs_epoch_and_learning_rate() {
    let mut train = table(3, &[("loss", "SoftmaxWithLoss")]);
    assert!(lr_graph(&train).is_none());

    train.insert(LEARNING_RATE, NamedSeries::from_values("LearningRate", [0.1, 0.1, 0.01]));
    let data = lr_graph(&train).unwrap();
    assert_eq!(data.column_ids(), vec!["epoch", "lr"]);
    assert_eq!(data.xs["lr"], "epoch");
    assert_eq!(data.names["lr"], "Learning Rate");

    let mut no_epoch = SeriesTable::new();
    no_epoch.insert(LEARNING_RATE, NamedSeries::from_values("LearningRate", [0.1]));
    assert!(lr_graph(&no_epoch).is_none());
}

#[test]
fn columns_serialize_with_id_first() {
    let mut train = SeriesTable::new();
    train.append("loss", "SoftmaxWithLoss", 1.5, 0.0).unwrap();
    train.append("loss", "SoftmaxWithLoss", 0.5, 0.0).unwrap();
    train.append("loss", "SoftmaxWithLoss", 1.0, 2.0).unwrap();

    let data = combined_graph(&train, &SeriesTable::new()).unwrap();
    let json = serde_json::to_value(&data).unwrap();
    assert_eq!(json["columns"][0], serde_json::json!(["loss-train", [1.5, 0.5], 1.0]));
    assert_eq!(json["columns"][1], serde_json::json!(["train_epochs", 0.0, 2.0]));
    assert_eq!(json["xs"]["loss-train"], "train_epochs");
    assert_eq!(json["axes"], serde_json::json!({}));
}
