use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::Config;

pub trait CheckConfig {
    fn check(&self, all: &Config) -> Option<CheckConfigResult>;
}

#[derive(Debug, Clone)]
pub struct CheckConfigItemResult {
    pub config: Arc<String>,
    pub item: String,
    pub message: String,
}

impl Display for CheckConfigItemResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.config, self.item, self.message)
    }
}

#[derive(Debug, Default)]
pub struct CheckConfigResult {
    pub show_warnings: bool,
    warns: Vec<CheckConfigItemResult>,
    errors: Vec<CheckConfigItemResult>,
}

impl CheckConfigResult {
    pub fn add_warn(&mut self, item: CheckConfigItemResult) {
        self.warns.push(item);
    }

    pub fn add_error(&mut self, item: CheckConfigItemResult) {
        self.errors.push(item);
    }

    pub fn add_all(&mut self, mut other: CheckConfigResult) {
        self.warns.append(&mut other.warns);
        self.errors.append(&mut other.errors);
    }

    pub fn is_empty(&self) -> bool {
        self.warns.is_empty() && self.errors.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }

    /// Sort items by config section then item name for stable output.
    pub fn introspect(&mut self) {
        let sort_key = |i: &CheckConfigItemResult| (i.config.to_string(), i.item.clone());
        self.warns.sort_by_key(sort_key);
        self.errors.sort_by_key(sort_key);
    }
}

impl Display for CheckConfigResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return writeln!(f, "Configuration check ok.");
        }
        for e in self.errors.iter() {
            writeln!(f, "error: {}", e)?;
        }
        if self.show_warnings {
            for w in self.warns.iter() {
                writeln!(f, "warning: {}", w)?;
            }
        } else if !self.warns.is_empty() {
            writeln!(f, "{} warning(s) hidden, re-run with --show-warnings", self.warns.len())?;
        }
        Ok(())
    }
}
