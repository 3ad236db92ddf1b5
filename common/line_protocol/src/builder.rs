use crate::{Error, FieldValue, Line, Result};

/// Accumulates tag and field pairs in insertion order and produces a
/// [`Line`]. Building fails when the measurement name is empty or no field
/// was added, both would serialize into lines the write endpoint rejects.
#[derive(Debug, Default)]
pub struct LineBuilder {
    measurement: String,
    tags: Vec<(String, String)>,
    fields: Vec<(String, FieldValue)>,
}

impl LineBuilder {
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            tags: vec![],
            fields: vec![],
        }
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push((key.into(), value.into()));
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: FieldValue) -> Self {
        self.fields.push((key.into(), value));
        self
    }

    pub fn build(self) -> Result<Line> {
        if self.measurement.is_empty() {
            return Err(Error::EmptyMeasurement);
        }
        if self.fields.is_empty() {
            return Err(Error::NoFields {
                measurement: self.measurement,
            });
        }
        Ok(Line {
            measurement: self.measurement,
            tags: self.tags,
            fields: self.fields,
        })
    }
}
