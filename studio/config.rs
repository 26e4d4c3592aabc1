use std::env;
use std::path::PathBuf;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 7878;

/// Studio settings, read from the environment at startup.
///
/// | Variable            | Default     |
/// |---------------------|-------------|
/// | `HOST`              | `127.0.0.1` |
/// | `PORT`              | `7878`      |
/// | `JOBS_DIR`          | `jobs`      |
/// | `JOB_ID`            | `demo`      |
/// | `TRAIN_EPOCHS`      | `30`        |
/// | `SNAPSHOT_INTERVAL` | `5`         |
/// | `LEARNING_RATE`     | `0.01`      |
/// | `DATASET_DIR`       | unset       |
/// | `LABELS_FILE`       | unset       |
#[derive(Debug, Clone)]
pub struct StudioConfig {
    pub host: String,
    pub port: u16,
    pub jobs_dir: PathBuf,
    pub job_id: String,
    pub train_epochs: f64,
    pub snapshot_interval: f64,
    pub learning_rate: f64,
    pub dataset_dir: Option<PathBuf>,
    pub labels_file: Option<String>,
}

impl StudioConfig {
    pub fn from_env() -> Result<Self, String> {
        Ok(StudioConfig {
            host:              env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_owned()),
            port:              parse_var("PORT", DEFAULT_PORT)?,
            jobs_dir:          env::var("JOBS_DIR").unwrap_or_else(|_| "jobs".to_owned()).into(),
            job_id:            env::var("JOB_ID").unwrap_or_else(|_| "demo".to_owned()),
            train_epochs:      parse_var("TRAIN_EPOCHS", 30.0)?,
            snapshot_interval: parse_var("SNAPSHOT_INTERVAL", 5.0)?,
            learning_rate:     parse_var("LEARNING_RATE", 0.01)?,
            dataset_dir:       env::var("DATASET_DIR").ok().map(PathBuf::from),
            labels_file:       env::var("LABELS_FILE").ok(),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Directory holding the job's task record and snapshots.
    pub fn job_dir(&self) -> PathBuf {
        self.jobs_dir.join(&self.job_id)
    }

    pub fn task_path(&self) -> PathBuf {
        self.job_dir().join("task.json")
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, String> {
    match env::var(name) {
        Ok(raw) => raw.parse().map_err(|_| format!("{} has an invalid value: '{}'", name, raw)),
        Err(_)  => Ok(default),
    }
}
