use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::check::{CheckConfig, CheckConfigItemResult, CheckConfigResult};
use crate::override_by_env::{entry_override, entry_override_option, OverrideByEnv};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    #[serde(default = "LogConfig::default_level")]
    pub level: String,
    #[serde(default = "LogConfig::default_path")]
    pub path: String,
    #[serde(default = "LogConfig::default_max_file_count")]
    pub max_file_count: Option<usize>,
    #[serde(default = "LogConfig::default_file_rotation")]
    pub file_rotation: String,
}

impl LogConfig {
    fn default_level() -> String {
        "info".to_string()
    }

    fn default_path() -> String {
        let path = std::path::Path::new("data").join("log");
        path.to_string_lossy().to_string()
    }

    fn default_max_file_count() -> Option<usize> {
        None
    }

    fn default_file_rotation() -> String {
        "daily".to_owned()
    }
}

impl OverrideByEnv for LogConfig {
    fn override_by_env(&mut self) {
        entry_override(&mut self.level, "VESCOLLECTOR_LOG_LEVEL");
        entry_override(&mut self.path, "VESCOLLECTOR_LOG_PATH");
        entry_override_option(&mut self.max_file_count, "VESCOLLECTOR_LOG_MAX_FILE_COUNT");
        entry_override(&mut self.file_rotation, "VESCOLLECTOR_LOG_FILE_ROTATION");
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            path: Self::default_path(),
            max_file_count: Self::default_max_file_count(),
            file_rotation: Self::default_file_rotation(),
        }
    }
}

impl CheckConfig for LogConfig {
    fn check(&self, _: &crate::Config) -> Option<CheckConfigResult> {
        let config_name = Arc::new("log".to_string());
        let mut ret = CheckConfigResult::default();

        if self.path.is_empty() {
            ret.add_warn(CheckConfigItemResult {
                config: config_name.clone(),
                item: "path".to_string(),
                message: "'path' is empty".to_string(),
            });
        }

        if !matches!(
            self.file_rotation.as_str(),
            "daily" | "hourly" | "minutely" | "never"
        ) {
            ret.add_error(CheckConfigItemResult {
                config: config_name,
                item: "file_rotation".to_string(),
                message: format!(
                    "unrecognized file_rotation '{}', expected daily|hourly|minutely|never",
                    self.file_rotation
                ),
            });
        }

        if ret.is_empty() {
            None
        } else {
            Some(ret)
        }
    }
}
