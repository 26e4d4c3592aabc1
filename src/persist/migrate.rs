use log::info;
use serde_json::{Map, Value};

use crate::error::{Result, TaskError};
use crate::series::{NamedSeries, SeriesTable, EPOCH, LEARNING_RATE};

/// Schema version written by this build.
pub const CURRENT_VERSION: u32 = 2;

type Migration = fn(Value) -> Result<Value>;

/// `MIGRATIONS[n]` upgrades a record from version `n + 1` to `n + 2`.
const MIGRATIONS: &[Migration] = &[v1_to_v2];

/// Brings a raw persisted record up to [`CURRENT_VERSION`].
///
/// A record without a `version` field predates versioning and is treated as
/// version 1.
pub fn upgrade(mut value: Value) -> Result<Value> {
    let mut version = read_version(&value)?;
    if version > CURRENT_VERSION {
        return Err(TaskError::Migration(format!(
            "record version {} is newer than supported version {}",
            version, CURRENT_VERSION
        )));
    }

    while version < CURRENT_VERSION {
        info!("upgrading task record from version {} to {}", version, version + 1);
        let step = MIGRATIONS[(version - 1) as usize];
        value = step(value)?;
        version += 1;
    }

    object_mut(&mut value)?.insert("version".into(), Value::from(CURRENT_VERSION));
    Ok(value)
}

fn read_version(value: &Value) -> Result<u32> {
    let obj = value
        .as_object()
        .ok_or_else(|| TaskError::Migration("record is not a JSON object".into()))?;
    match obj.get("version") {
        None => Ok(1),
        Some(v) => match v.as_u64() {
            Some(n) if n >= 1 => u32::try_from(n).map_err(|_| TaskError::Migration(format!(
                "record version {} is newer than supported version {}",
                n, CURRENT_VERSION
            ))),
            _ => Err(TaskError::Migration(format!("invalid record version {}", v))),
        },
    }
}

fn object_mut(value: &mut Value) -> Result<&mut Map<String, Value>> {
    value
        .as_object_mut()
        .ok_or_else(|| TaskError::Migration("record is not a JSON object".into()))
}

// ---------------------------------------------------------------------------
// v1 -> v2: flat (epoch, value) lists become named series
// ---------------------------------------------------------------------------

fn v1_to_v2(mut value: Value) -> Result<Value> {
    let obj = object_mut(&mut value)?;

    let train_loss = take_pairs(obj, "train_loss_updates")?;
    let val_loss   = take_pairs(obj, "val_loss_updates")?;
    let val_acc    = take_pairs(obj, "val_accuracy_updates")?;
    let lr         = take_pairs(obj, "lr_updates")?;

    let mut train = SeriesTable::new();
    let mut val   = SeriesTable::new();

    if let Some(tl) = train_loss {
        train.insert(EPOCH, NamedSeries::from_values("Epoch", tl.iter().map(|p| p.0)));
        train.insert("loss", NamedSeries::from_values("SoftmaxWithLoss", tl.iter().map(|p| p.1)));
        if let Some(lr) = lr {
            train.insert(LEARNING_RATE, NamedSeries::from_values("LearningRate", lr.iter().map(|p| p.1)));
        }
    }
    if let Some(vl) = val_loss {
        val.insert(EPOCH, NamedSeries::from_values("Epoch", vl.iter().map(|p| p.0)));
        val.insert("loss", NamedSeries::from_values("SoftmaxWithLoss", vl.iter().map(|p| p.1)));
        if let Some(va) = val_acc {
            val.insert("accuracy", NamedSeries::from_values("Accuracy", va.iter().map(|p| p.1)));
        }
    }

    obj.insert("train_outputs".into(), serde_json::to_value(&train)?);
    obj.insert("val_outputs".into(), serde_json::to_value(&val)?);
    Ok(value)
}

/// Removes `key` and reads it as a list of `[epoch, value]` pairs.
/// Absent, `null` and empty lists all read as `None`.
fn take_pairs(obj: &mut Map<String, Value>, key: &str) -> Result<Option<Vec<(f64, f64)>>> {
    let raw = match obj.remove(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(v) => v,
    };
    let pairs: Vec<(f64, f64)> = serde_json::from_value(raw)
        .map_err(|e| TaskError::Migration(format!("{} is not a list of [epoch, value] pairs: {}", key, e)))?;
    if pairs.is_empty() {
        Ok(None)
    } else {
        Ok(Some(pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn current_records_pass_through() {
        let v = json!({ "version": 2, "train_outputs": {} });
        assert_eq!(upgrade(v.clone()).unwrap(), v);
    }

    #[test]
    fn unversioned_record_is_version_one() {
        let out = upgrade(json!({ "train_loss_updates": [[0, 2.0]] })).unwrap();
        assert_eq!(out["version"], json!(2));
        assert_eq!(out["train_outputs"]["loss"]["data"], json!([2.0]));
        assert!(out.get("train_loss_updates").is_none());
    }

    #[test]
    fn validation_series_with_accuracy() {
        let out = upgrade(json!({
            "version": 1,
            "val_loss_updates": [[1, 0.7], [2, 0.6]],
            "val_accuracy_updates": [[1, 0.5], [2, 0.55]],
        }))
        .unwrap();
        let val: SeriesTable = serde_json::from_value(out["val_outputs"].clone()).unwrap();
        let names: Vec<&str> = val.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["epoch", "loss", "accuracy"]);
        assert_eq!(val.get("accuracy").unwrap().kind, "Accuracy");

        let train: SeriesTable = serde_json::from_value(out["train_outputs"].clone()).unwrap();
        assert!(train.is_empty());
    }

    #[test]
    fn rejects_future_and_malformed_records() {
        assert!(matches!(upgrade(json!({ "version": 99 })), Err(TaskError::Migration(_))));
        // Wider than u32: must not wrap around to a supported version.
        assert!(matches!(
            upgrade(json!({ "version": 4_294_967_298u64 })),
            Err(TaskError::Migration(_))
        ));
        assert!(matches!(upgrade(json!([1, 2])), Err(TaskError::Migration(_))));
        assert!(matches!(
            upgrade(json!({ "version": 1, "lr_updates": "oops" })),
            Err(TaskError::Migration(_))
        ));
    }
}
