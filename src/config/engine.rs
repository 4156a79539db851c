//! Root configuration for a composed [`Engine`](crate::builders::Engine).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{SchedulerConfig, ShardedPoolConfig, SinkConfig};

/// Environment variable overriding the scheduler worker count.
pub const ENV_WORKERS: &str = "DISPATCH_WORKERS";
/// Environment variable overriding the sharded loop count.
pub const ENV_LOOPS: &str = "DISPATCH_LOOPS";
/// Environment variable overriding the sink capacity.
pub const ENV_SINK_CAPACITY: &str = "DISPATCH_SINK_CAPACITY";
/// Environment variable switching the sink to rotating files in a directory.
pub const ENV_SINK_DIR: &str = "DISPATCH_SINK_DIR";

const DEFAULT_ROTATION_SECS: u64 = 3600;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Deadline scheduler settings.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Sharded pool settings.
    #[serde(default)]
    pub pool: ShardedPoolConfig,
    /// Optional sink; the console is used when absent.
    #[serde(default)]
    pub sink: Option<SinkConfig>,
}

impl EngineConfig {
    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns the first failing section, prefixed with its name.
    pub fn validate(&self) -> Result<(), String> {
        self.scheduler
            .validate()
            .map_err(|e| format!("scheduler invalid: {e}"))?;
        self.pool
            .validate()
            .map_err(|e| format!("pool invalid: {e}"))?;
        if let Some(sink) = &self.sink {
            sink.validate().map_err(|e| format!("sink invalid: {e}"))?;
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a parse or validation message.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from defaults overridden by the process environment.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    ///
    /// # Errors
    ///
    /// Returns a message naming the variable that failed to parse, or the
    /// validation failure.
    pub fn from_env() -> Result<Self, String> {
        // A missing .env file is normal.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from defaults overridden through `lookup`.
    ///
    /// # Errors
    ///
    /// Same as [`EngineConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(workers) = parse_var(&lookup, ENV_WORKERS)? {
            cfg.scheduler.worker_count = workers;
        }
        if let Some(loops) = parse_var(&lookup, ENV_LOOPS)? {
            cfg.pool.loop_count = loops;
        }
        if let Some(dir) = lookup(ENV_SINK_DIR) {
            cfg.sink = Some(SinkConfig::rotating_files(
                PathBuf::from(dir),
                DEFAULT_ROTATION_SECS,
            ));
        }
        if let Some(capacity) = parse_var(&lookup, ENV_SINK_CAPACITY)? {
            let sink = cfg.sink.take().unwrap_or_else(SinkConfig::console);
            cfg.sink = Some(sink.with_capacity(capacity));
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn parse_var<F>(lookup: &F, key: &str) -> Result<Option<usize>, String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<usize>()
                .map_err(|e| format!("{key}={raw:?}: {e}"))
        })
        .transpose()
}
