// re-export const header names
pub use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};

/// value
pub const APPLICATION_JSON: &str = "application/json";
pub const TEXT_PLAIN: &str = "text/plain";

/// basic auth
pub const BASIC_PREFIX: &str = "Basic ";
