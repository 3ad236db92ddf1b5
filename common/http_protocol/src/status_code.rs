use reqwest::StatusCode;

pub const OK: StatusCode = StatusCode::OK;
/// event accepted, command list or empty body in response
pub const ACCEPTED: StatusCode = StatusCode::ACCEPTED;
/// time series write acknowledged
pub const NO_CONTENT: StatusCode = StatusCode::NO_CONTENT;
/// request body is not decodable
pub const BAD_REQUEST: StatusCode = StatusCode::BAD_REQUEST;
/// sender credentials missing or wrong
pub const UNAUTHORIZED: StatusCode = StatusCode::UNAUTHORIZED;
/// path not registered with the dispatcher
pub const NOT_FOUND: StatusCode = StatusCode::NOT_FOUND;
/// request body exceeds the configured limit
pub const PAYLOAD_TOO_LARGE: StatusCode = StatusCode::PAYLOAD_TOO_LARGE;
/// unexpected handler failure
pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode::INTERNAL_SERVER_ERROR;
