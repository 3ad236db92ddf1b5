use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct EmptyResponse {}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ErrorResponse {
    error_message: String,
}

impl ErrorResponse {
    pub fn new(error_message: &str) -> ErrorResponse {
        Self {
            error_message: error_message.to_string(),
        }
    }
}

/// Policy-exception envelope returned to unauthenticated event senders,
/// `{"requestError":{"policyException":{"messageId":...,"text":...}}}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RequestError {
    #[serde(rename = "requestError")]
    pub request_error: RequestErrorBody,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RequestErrorBody {
    #[serde(rename = "policyException")]
    pub policy_exception: PolicyException,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PolicyException {
    #[serde(rename = "messageId")]
    pub message_id: String,
    pub text: String,
}

impl RequestError {
    pub fn policy_exception(message_id: &str, text: &str) -> Self {
        Self {
            request_error: RequestErrorBody {
                policy_exception: PolicyException {
                    message_id: message_id.to_string(),
                    text: text.to_string(),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_exception_wire_format() {
        let body = RequestError::policy_exception("POL0001", "Failed to authenticate");
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"requestError":{"policyException":{"messageId":"POL0001","text":"Failed to authenticate"}}}"#
        );
    }
}
