use std::fmt::{Display, Formatter};

use snafu::Snafu;

mod builder;

pub use builder::LineBuilder;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("measurement name is empty"))]
    EmptyMeasurement,

    #[snafu(display("line for '{}' has no fields", measurement))]
    NoFields { measurement: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    U64(u64),
    I64(i64),
    F64(f64),
    Str(String),
    Bool(bool),
}

impl From<&serde_json::Value> for FieldValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Number(n) => {
                if let Some(v) = n.as_u64() {
                    FieldValue::U64(v)
                } else if let Some(v) = n.as_i64() {
                    FieldValue::I64(v)
                } else {
                    FieldValue::F64(n.as_f64().unwrap_or_default())
                }
            }
            serde_json::Value::String(s) => FieldValue::Str(s.clone()),
            serde_json::Value::Bool(b) => FieldValue::Bool(*b),
            other => FieldValue::Str(other.to_string()),
        }
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::U64(v) => write!(f, "{}", v),
            FieldValue::I64(v) => write!(f, "{}", v),
            FieldValue::F64(v) => write!(f, "{}", v),
            FieldValue::Str(v) => write!(f, "{}", v),
            FieldValue::Bool(v) => write!(f, "{}", v),
        }
    }
}

/// One time-series record: a measurement name, ordered tags and ordered
/// fields. The tag/field boundary of the serialized form is structural,
/// the single space is written between the two sections rather than
/// spliced into a finished string.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub measurement: String,
    pub tags: Vec<(String, String)>,
    pub fields: Vec<(String, FieldValue)>,
}

impl Display for Line {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.measurement)?;
        for (key, value) in self.tags.iter() {
            write!(f, ",{}={}", key, value)?;
        }
        for (i, (key, value)) in self.fields.iter().enumerate() {
            let sep = if i == 0 { ' ' } else { ',' };
            write!(f, "{}{}={}", sep, key, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_tag_field_boundary() {
        let line = Line {
            measurement: "cpuUsage".to_string(),
            tags: vec![
                ("system".to_string(), "VM01".to_string()),
                ("cpu".to_string(), "0".to_string()),
            ],
            fields: vec![
                ("cpuIdle".to_string(), FieldValue::F64(99.8998998999)),
                ("cpuUsageUser".to_string(), FieldValue::F64(0.1001001001)),
                ("cpuUsageSystem".to_string(), FieldValue::U64(0)),
            ],
        };
        assert_eq!(
            line.to_string(),
            "cpuUsage,system=VM01,cpu=0 cpuIdle=99.8998998999,cpuUsageUser=0.1001001001,cpuUsageSystem=0"
        );
    }

    #[test]
    fn test_display_without_tags() {
        let line = Line {
            measurement: "load".to_string(),
            tags: vec![],
            fields: vec![("load-shortterm".to_string(), FieldValue::Str("0.32".to_string()))],
        };
        assert_eq!(line.to_string(), "load load-shortterm=0.32");
    }

    #[test]
    fn test_field_value_from_json() {
        assert_eq!(
            FieldValue::from(&serde_json::json!(7)),
            FieldValue::U64(7)
        );
        assert_eq!(
            FieldValue::from(&serde_json::json!(-3)),
            FieldValue::I64(-3)
        );
        assert_eq!(
            FieldValue::from(&serde_json::json!(0.25)),
            FieldValue::F64(0.25)
        );
        assert_eq!(
            FieldValue::from(&serde_json::json!("true")),
            FieldValue::Str("true".to_string())
        );
        assert_eq!(
            FieldValue::from(&serde_json::json!(false)),
            FieldValue::Bool(false)
        );
    }
}
