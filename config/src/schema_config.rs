use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::check::{CheckConfig, CheckConfigItemResult, CheckConfigResult};

/// Paths to the JSON Schema documents used to validate inbound events.
/// An empty path disables the corresponding schema; the throttle and
/// test-control fragments are only consulted when the event schema loads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchemaConfig {
    #[serde(default = "SchemaConfig::default_schema_file")]
    pub schema_file: String,
    #[serde(default = "SchemaConfig::default_base_schema_file")]
    pub base_schema_file: String,
    #[serde(default = "SchemaConfig::default_throttle_schema_file")]
    pub throttle_schema_file: String,
    #[serde(default = "SchemaConfig::default_test_control_schema_file")]
    pub test_control_schema_file: String,
}

impl SchemaConfig {
    fn default_schema_file() -> String {
        "".to_string()
    }

    fn default_base_schema_file() -> String {
        "".to_string()
    }

    fn default_throttle_schema_file() -> String {
        "".to_string()
    }

    fn default_test_control_schema_file() -> String {
        "".to_string()
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            schema_file: Self::default_schema_file(),
            base_schema_file: Self::default_base_schema_file(),
            throttle_schema_file: Self::default_throttle_schema_file(),
            test_control_schema_file: Self::default_test_control_schema_file(),
        }
    }
}

impl CheckConfig for SchemaConfig {
    fn check(&self, _: &crate::Config) -> Option<CheckConfigResult> {
        let config_name = Arc::new("schema".to_string());
        let mut ret = CheckConfigResult::default();

        if self.schema_file.is_empty()
            && !(self.base_schema_file.is_empty()
                && self.throttle_schema_file.is_empty()
                && self.test_control_schema_file.is_empty())
        {
            ret.add_warn(CheckConfigItemResult {
                config: config_name,
                item: "schema_file".to_string(),
                message: "fragment schemas are configured but 'schema_file' is empty, \
                          no validation will be undertaken"
                    .to_string(),
            });
        }

        if ret.is_empty() {
            None
        } else {
            Some(ret)
        }
    }
}
