use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::check::{CheckConfig, CheckConfigItemResult, CheckConfigResult};
use crate::override_by_env::{entry_override, OverrideByEnv};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SinkConfig {
    #[serde(default = "SinkConfig::default_host")]
    pub host: String,
    #[serde(default = "SinkConfig::default_database")]
    pub database: String,
    #[serde(default = "SinkConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl SinkConfig {
    fn default_host() -> String {
        "localhost:8086".to_string()
    }

    fn default_database() -> String {
        "veseventsdb".to_string()
    }

    fn default_timeout_secs() -> u64 {
        5
    }

    pub fn write_url(&self) -> String {
        format!("http://{}/write?db={}", self.host, self.database)
    }
}

impl OverrideByEnv for SinkConfig {
    fn override_by_env(&mut self) {
        entry_override(&mut self.host, "VESCOLLECTOR_SINK_HOST");
        entry_override(&mut self.database, "VESCOLLECTOR_SINK_DATABASE");
        entry_override(&mut self.timeout_secs, "VESCOLLECTOR_SINK_TIMEOUT_SECS");
    }
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            database: Self::default_database(),
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

impl CheckConfig for SinkConfig {
    fn check(&self, _: &crate::Config) -> Option<CheckConfigResult> {
        let config_name = Arc::new("sink".to_string());
        let mut ret = CheckConfigResult::default();

        if self.host.is_empty() {
            ret.add_error(CheckConfigItemResult {
                config: config_name.clone(),
                item: "host".to_string(),
                message: "'host' can not be empty".to_string(),
            });
        }

        if self.timeout_secs == 0 {
            ret.add_error(CheckConfigItemResult {
                config: config_name,
                item: "timeout_secs".to_string(),
                message: "'timeout_secs' can not be zero".to_string(),
            });
        }

        if ret.is_empty() {
            None
        } else {
            Some(ret)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_url() {
        let config = SinkConfig::default();
        assert_eq!(config.write_url(), "http://localhost:8086/write?db=veseventsdb");
    }
}
