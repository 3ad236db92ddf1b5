use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::check::{CheckConfig, CheckConfigItemResult, CheckConfigResult};
use crate::override_by_env::{entry_override, OverrideByEnv};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListenerConfig {
    #[serde(default = "ListenerConfig::default_port")]
    pub port: u16,
    #[serde(default = "ListenerConfig::default_path")]
    pub path: String,
    #[serde(default = "ListenerConfig::default_topic")]
    pub topic: String,
    #[serde(default = "ListenerConfig::default_api_version")]
    pub api_version: u32,
    #[serde(default = "ListenerConfig::default_username")]
    pub username: String,
    #[serde(default = "ListenerConfig::default_password")]
    pub password: String,
    #[serde(default = "ListenerConfig::default_record_unauthenticated")]
    pub record_unauthenticated: bool,
}

impl ListenerConfig {
    fn default_port() -> u16 {
        12233
    }

    fn default_path() -> String {
        "".to_string()
    }

    fn default_topic() -> String {
        "".to_string()
    }

    fn default_api_version() -> u32 {
        5
    }

    fn default_username() -> String {
        "".to_string()
    }

    fn default_password() -> String {
        "".to_string()
    }

    fn default_record_unauthenticated() -> bool {
        true
    }

    /// A non-empty path prefix must end with '/' so the event listener URL
    /// concatenates cleanly. Missing separators are appended, not rejected.
    pub fn introspect(&mut self) {
        if !self.path.is_empty() && !self.path.ends_with('/') {
            println!(
                "Event listener path ({}) should have terminating '/', adding one on",
                self.path
            );
            self.path.push('/');
        }
    }

    pub fn root_url(&self) -> String {
        format!(
            "/{}eventListener/v{}{}",
            self.path,
            self.api_version,
            if self.topic.is_empty() {
                String::new()
            } else {
                format!("/{}", self.topic)
            }
        )
    }

    pub fn throttle_url(&self) -> String {
        format!(
            "/{}eventListener/v{}/clientThrottlingState",
            self.path, self.api_version
        )
    }

    pub fn test_control_url(&self) -> String {
        format!("/testControl/v{}/commandList", self.api_version)
    }
}

impl OverrideByEnv for ListenerConfig {
    fn override_by_env(&mut self) {
        entry_override(&mut self.port, "VESCOLLECTOR_LISTENER_PORT");
        entry_override(&mut self.username, "VESCOLLECTOR_LISTENER_USERNAME");
        entry_override(&mut self.password, "VESCOLLECTOR_LISTENER_PASSWORD");
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            port: Self::default_port(),
            path: Self::default_path(),
            topic: Self::default_topic(),
            api_version: Self::default_api_version(),
            username: Self::default_username(),
            password: Self::default_password(),
            record_unauthenticated: Self::default_record_unauthenticated(),
        }
    }
}

impl CheckConfig for ListenerConfig {
    fn check(&self, _: &crate::Config) -> Option<CheckConfigResult> {
        let config_name = Arc::new("listener".to_string());
        let mut ret = CheckConfigResult::default();

        if self.port < 1024 {
            ret.add_error(CheckConfigItemResult {
                config: config_name.clone(),
                item: "port".to_string(),
                message: format!("invalid event listener port ({}), expected 1024..=65535", self.port),
            });
        }

        if self.username.is_empty() || self.password.is_empty() {
            ret.add_warn(CheckConfigItemResult {
                config: config_name,
                item: "username".to_string(),
                message: "credentials are empty, agents cannot authenticate".to_string(),
            });
        }

        if ret.is_empty() {
            None
        } else {
            Some(ret)
        }
    }
}
