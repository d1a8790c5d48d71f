use crate::orders::{RepairPolicy, StoragePolicy};
use std::path::PathBuf;
use std::time::Duration;

/// Post server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | POST_WORK_DIR | ./data | Directory holding the ledger file |
/// | POST_ORDERS_FILE | orders.json | Ledger file name |
/// | POST_MAX_STORAGE | 5 | Outstanding orders per sender, -1 = unlimited |
/// | POST_AUTO_FIX | false | Repair corrupted ledger entries instead of failing |
/// | POST_RECEIVE_TIP_DELAY_MS | 3000 | Delay before the login reminder |
/// | LOG_LEVEL | info | Log filter |
/// | LOG_JSON | false | JSON log lines |
/// | LOG_DIR | (unset) | Enables daily rolling log files |
///
/// Unparseable values fall back to the default.
///
/// # Example
///
/// ```ignore
/// POST_MAX_STORAGE=-1 POST_AUTO_FIX=true post-ledger
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: PathBuf,
    pub orders_file: String,
    /// Per-sender quota, -1 for no limit
    pub max_storage: i64,
    pub auto_fix: bool,
    pub receive_tip_delay: Duration,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
}

const DEFAULT_MAX_STORAGE: i64 = 5;
const DEFAULT_TIP_DELAY_MS: u64 = 3000;

impl Config {
    /// Load from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let max_storage = match parsed(&lookup, "POST_MAX_STORAGE") {
            Some(n) if n >= -1 => n,
            Some(n) => {
                tracing::warn!(value = n, "POST_MAX_STORAGE below -1, using default");
                DEFAULT_MAX_STORAGE
            }
            None => DEFAULT_MAX_STORAGE,
        };

        Self {
            work_dir: lookup("POST_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data")),
            orders_file: lookup("POST_ORDERS_FILE").unwrap_or_else(|| "orders.json".into()),
            max_storage,
            auto_fix: parsed(&lookup, "POST_AUTO_FIX").unwrap_or(false),
            receive_tip_delay: Duration::from_millis(
                parsed(&lookup, "POST_RECEIVE_TIP_DELAY_MS").unwrap_or(DEFAULT_TIP_DELAY_MS),
            ),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_json: parsed(&lookup, "LOG_JSON").unwrap_or(false),
            log_dir: lookup("LOG_DIR").filter(|d| !d.is_empty()),
        }
    }

    /// Override the fields tests care about
    pub fn with_overrides(work_dir: impl Into<PathBuf>, max_storage: i64, auto_fix: bool) -> Self {
        let mut config = Self::from_lookup(|_| None);
        config.work_dir = work_dir.into();
        config.max_storage = max_storage;
        config.auto_fix = auto_fix;
        config.receive_tip_delay = Duration::ZERO;
        config
    }

    /// Full path of the ledger file
    pub fn orders_path(&self) -> PathBuf {
        self.work_dir.join(&self.orders_file)
    }

    pub fn repair_policy(&self) -> RepairPolicy {
        RepairPolicy::from_auto_fix(self.auto_fix)
    }

    pub fn storage_policy(&self) -> StoragePolicy {
        StoragePolicy::new(self.max_storage)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parsed<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Invalid config value, using default");
            None
        }
    }
}
