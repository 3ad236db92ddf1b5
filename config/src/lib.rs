use std::fs::File;
use std::io;
use std::io::Read;
use std::path::{Path, PathBuf};

use check::{CheckConfig, CheckConfigResult};
use serde::{Deserialize, Serialize};

use crate::override_by_env::OverrideByEnv;
pub use crate::listener_config::*;
pub use crate::log_config::*;
pub use crate::schema_config::*;
pub use crate::sink_config::*;

mod check;
mod listener_config;
mod log_config;
mod override_by_env;
mod schema_config;
mod sink_config;

pub use check::{CheckConfigItemResult, CheckConfigResult as CheckReport};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    ///
    #[serde(default = "Default::default")]
    pub listener: ListenerConfig,

    ///
    #[serde(default = "Default::default")]
    pub schema: SchemaConfig,

    ///
    #[serde(default = "Default::default")]
    pub sink: SinkConfig,

    ///
    #[serde(default = "Default::default")]
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listener: Default::default(),
            schema: Default::default(),
            sink: Default::default(),
            log: Default::default(),
        }
    }
}

impl Config {
    pub fn override_by_env(&mut self) {
        self.listener.override_by_env();
        self.sink.override_by_env();
        self.log.override_by_env();
    }

    pub fn to_string_pretty(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_else(|_| "Failed to stringify Config".to_string())
    }

    pub fn check_all(&self) -> CheckConfigResult {
        let mut check_results = CheckConfigResult::default();

        if let Some(c) = self.listener.check(self) {
            check_results.add_all(c)
        }
        if let Some(c) = self.schema.check(self) {
            check_results.add_all(c)
        }
        if let Some(c) = self.sink.check(self) {
            check_results.add_all(c)
        }
        if let Some(c) = self.log.check(self) {
            check_results.add_all(c)
        }

        check_results
    }
}

pub fn get_config(path: impl AsRef<Path>) -> Result<Config, std::io::Error> {
    let path = path.as_ref();
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            return Err(io::Error::new(
                err.kind(),
                format!(
                    "Failed to open configuration file '{}': {:?}",
                    path.display(),
                    err
                )
                .as_str(),
            ));
        }
    };
    let mut content = String::new();
    if let Err(err) = file.read_to_string(&mut content) {
        return Err(io::Error::new(
            err.kind(),
            format!(
                "Failed to read configuration file '{}': {:?}",
                path.display(),
                err
            )
            .as_str(),
        ));
    }
    let mut config: Config = match toml::from_str(&content) {
        Ok(config) => config,
        Err(err) => {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!(
                    "Failed to parse configuration file '{}': {:?}",
                    path.display(),
                    err
                )
                .as_str(),
            ));
        }
    };
    config.listener.introspect();
    Ok(config)
}

pub fn get_config_for_test() -> Config {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path = path.join("collector.toml");
    get_config(path).unwrap()
}

pub fn check_config(path: impl AsRef<Path>, show_warnings: bool) {
    match get_config(path) {
        Ok(cfg) => {
            let mut check_results = cfg.check_all();
            check_results.introspect();
            check_results.show_warnings = show_warnings;
            println!("{}", check_results);
        }
        Err(err) => {
            println!("{}", err);
        }
    };
}
