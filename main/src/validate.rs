use serde_json::Value;
use trace::{error, info, warn};

use crate::schema::EventSchema;

/// What became of a request body. Only `Accepted` bodies may feed the
/// measurement extractor; every other outcome is logged and the request
/// flow continues, the listener must always produce an HTTP response.
#[derive(Debug)]
pub enum Outcome {
    /// Body parsed; `checked` records whether a schema was consulted.
    Accepted { event: Value, checked: bool },
    /// Body parsed but violates the schema.
    Invalid { event: Value },
    /// The schema document itself failed to compile.
    SchemaError { event: Value },
    /// Body is not JSON at all.
    Malformed,
}

pub fn check_body(body: &[u8], schema: Option<&EventSchema>) -> Outcome {
    let event: Value = match serde_json::from_slice(body) {
        Ok(event) => event,
        Err(e) => {
            error!("request body is not valid JSON: {}", e);
            return Outcome::Malformed;
        }
    };

    let schema = match schema {
        Some(schema) => schema,
        None => {
            info!("body is valid JSON but not checked against any schema");
            return Outcome::Accepted {
                event,
                checked: false,
            };
        }
    };

    let compiled = match schema.compiled() {
        Ok(compiled) => compiled,
        Err(e) => {
            error!("schema is not valid: {}", e);
            return Outcome::SchemaError { event };
        }
    };

    let detail: Option<Vec<String>> = match compiled.validate(&event) {
        Ok(()) => None,
        Err(errors) => Some(errors.map(|e| e.to_string()).collect()),
    };
    match detail {
        None => {
            info!("body is valid against the schema");
            Outcome::Accepted {
                event,
                checked: true,
            }
        }
        Some(detail) => {
            warn!("body is not valid against the schema: {}", detail.join("; "));
            Outcome::Invalid { event }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::schema::EventSchema;

    fn required_event_schema() -> EventSchema {
        EventSchema::new(json!({
            "type": "object",
            "required": ["event"]
        }))
    }

    #[test]
    fn test_malformed_body_regardless_of_schema() {
        assert!(matches!(check_body(b"{not json", None), Outcome::Malformed));
        assert!(matches!(
            check_body(b"{not json", Some(&required_event_schema())),
            Outcome::Malformed
        ));
    }

    #[test]
    fn test_missing_required_field_is_invalid_not_malformed() {
        let outcome = check_body(br#"{"other": 1}"#, Some(&required_event_schema()));
        assert!(matches!(outcome, Outcome::Invalid { .. }));
    }

    #[test]
    fn test_accepted_without_schema_is_unchecked() {
        let outcome = check_body(br#"{"event": {}}"#, None);
        match outcome {
            Outcome::Accepted { checked, .. } => assert!(!checked),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_accepted_with_schema_is_checked() {
        let outcome = check_body(br#"{"event": {}}"#, Some(&required_event_schema()));
        match outcome {
            Outcome::Accepted { checked, .. } => assert!(checked),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_broken_schema_reports_schema_error() {
        let schema = EventSchema::new(json!({"type": 12}));
        let outcome = check_body(br#"{"event": {}}"#, Some(&schema));
        assert!(matches!(outcome, Outcome::SchemaError { .. }));
    }
}
