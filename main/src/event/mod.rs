use serde_json::Value;
use snafu::Snafu;

pub mod extract;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("required field '{}' is missing", path))]
    FieldMissing { path: String },

    #[snafu(display("field '{}' is not a {}", path, expected))]
    FieldType {
        path: String,
        expected: &'static str,
    },

    #[snafu(display("failed to build record: {}", source))]
    Record { source: line_protocol::Error },
}

pub const DOMAIN_HEARTBEAT: &str = "heartbeat";
pub const DOMAIN_FAULT: &str = "fault";
pub const MEASUREMENTS_FOR_VF_SCALING: &str = "measurementsForVfScalingFields";

/// Accessor view over a decoded event envelope. Named paths resolve against
/// the JSON tree and fail with a distinct field-missing error rather than a
/// lookup fault, so a malformed event is a logged condition, not a crash.
pub struct EventView<'a> {
    event: &'a Value,
}

impl<'a> EventView<'a> {
    pub fn new(root: &'a Value) -> Result<Self> {
        let event = root.get("event").ok_or_else(|| Error::FieldMissing {
            path: "event".to_string(),
        })?;
        Ok(Self { event })
    }

    fn field(&self, path: &[&str]) -> Result<&'a Value> {
        let mut current = self.event;
        let mut walked = String::from("event");
        for segment in path {
            walked.push('.');
            walked.push_str(segment);
            current = current.get(segment).ok_or_else(|| Error::FieldMissing {
                path: walked.clone(),
            })?;
        }
        Ok(current)
    }

    fn str_field(&self, path: &[&str]) -> Result<&'a str> {
        self.field(path)?.as_str().ok_or_else(|| Error::FieldType {
            path: format!("event.{}", path.join(".")),
            expected: "string",
        })
    }

    fn number_field(&self, path: &[&str]) -> Result<f64> {
        self.field(path)?.as_f64().ok_or_else(|| Error::FieldType {
            path: format!("event.{}", path.join(".")),
            expected: "number",
        })
    }

    /// The common header fields every event must carry before any
    /// downstream processing may proceed.
    pub fn common_header(&self) -> Result<CommonHeader<'a>> {
        Ok(CommonHeader {
            domain: self.str_field(&["commonEventHeader", "domain"])?,
            last_epoch_microsec: self.number_field(&["commonEventHeader", "lastEpochMicrosec"])?,
            reporting_entity_name: self
                .str_field(&["commonEventHeader", "reportingEntityName"])?,
            source_id: self.str_field(&["commonEventHeader", "sourceId"])?,
        })
    }

    pub fn sequence(&self) -> Result<&'a Value> {
        self.field(&["commonEventHeader", "sequence"])
    }

    pub fn scaling_measurements(&self) -> Option<&'a Value> {
        self.event.get(MEASUREMENTS_FOR_VF_SCALING)
    }

    pub fn fault_fields(&self) -> Option<&'a Value> {
        self.event.get("faultFields")
    }
}

#[derive(Debug)]
pub struct CommonHeader<'a> {
    pub domain: &'a str,
    pub last_epoch_microsec: f64,
    pub reporting_entity_name: &'a str,
    pub source_id: &'a str,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_common_header_requires_all_fields() {
        let event = json!({
            "event": {
                "commonEventHeader": {
                    "domain": "heartbeat",
                    "lastEpochMicrosec": 1544608845841000.0,
                    "reportingEntityName": "vm01",
                }
            }
        });
        let view = EventView::new(&event).unwrap();
        assert_eq!(
            view.common_header().unwrap_err(),
            Error::FieldMissing {
                path: "event.commonEventHeader.sourceId".to_string()
            }
        );
    }

    #[test]
    fn test_field_type_mismatch_is_distinct() {
        let event = json!({
            "event": {
                "commonEventHeader": {
                    "domain": 7,
                }
            }
        });
        let view = EventView::new(&event).unwrap();
        assert_eq!(
            view.str_field(&["commonEventHeader", "domain"]).unwrap_err(),
            Error::FieldType {
                path: "event.commonEventHeader.domain".to_string(),
                expected: "string"
            }
        );
    }

    #[test]
    fn test_missing_envelope() {
        let event = json!({"commonEventHeader": {}});
        assert!(EventView::new(&event).is_err());
    }
}
