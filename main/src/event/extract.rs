use line_protocol::{FieldValue, Line, LineBuilder};
use serde_json::{Map, Value};
use snafu::ResultExt;
use trace::{debug, info};

use super::{
    Error, EventView, RecordSnafu, Result, DOMAIN_FAULT, DOMAIN_HEARTBEAT,
};

/// One pending time-series write: the event type reported to the sink and
/// the finished line-protocol record.
#[derive(Debug)]
pub struct TimeSeriesWrite {
    pub event_type: &'static str,
    pub line: Line,
}

/// Walks a decoded event and emits a record for every recognized
/// measurement structure. Blocks are independent presence checks, a missing
/// block is skipped; a block that is present but missing its required
/// fields makes the whole event malformed.
pub fn extract(event: &Value) -> Result<Vec<TimeSeriesWrite>> {
    let view = EventView::new(event)?;
    let header = view.common_header()?;
    debug!(
        "decoded event domain={} reported at {}",
        header.domain, header.last_epoch_microsec
    );
    let source = header.source_id.to_uppercase();

    let mut writes = Vec::new();

    if header.domain == DOMAIN_HEARTBEAT {
        debug!("found heartbeat");
        let sequence = view.sequence()?;
        let line = LineBuilder::new("heartbeat")
            .tag("system", heartbeat_system(header.reporting_entity_name))
            .field("sequence", FieldValue::from(sequence))
            .build()
            .context(RecordSnafu)?;
        writes.push(TimeSeriesWrite {
            event_type: "heartbeat",
            line,
        });
    }

    if let Some(scaling) = view.scaling_measurements() {
        debug!("found measurementsForVfScalingFields");

        if let Some(groups) = scaling.get("additionalMeasurements").and_then(Value::as_array) {
            for group in groups {
                writes.push(measurement_group_record(&source, group)?);
            }
        }

        if let Some(entries) = scaling.get("cpuUsageArray").and_then(Value::as_array) {
            debug!("found cpuUsageArray");
            for entry in entries {
                writes.push(identified_record("cpuUsage", "cpu", "cpuIdentifier", &source, entry)?);
            }
        }

        if let Some(entries) = scaling.get("diskUsageArray").and_then(Value::as_array) {
            debug!("found diskUsageArray");
            for entry in entries {
                writes.push(identified_record(
                    "diskUsage",
                    "disk",
                    "diskIdentifier",
                    &source,
                    entry,
                )?);
            }
        }

        // The memory block reports one entry per VM; only the first is taken.
        if let Some(entry) = scaling
            .get("memoryUsageArray")
            .and_then(Value::as_array)
            .and_then(|entries| entries.first())
        {
            debug!("found memoryUsageArray");
            let object = as_object("memoryUsageArray", entry)?;
            let mut builder = LineBuilder::new("memoryUsage").tag("system", &source);
            for (key, value) in object {
                if key != "vmIdentifier" {
                    builder = builder.field(key.as_str(), FieldValue::from(value));
                }
            }
            writes.push(TimeSeriesWrite {
                event_type: "memoryUsage",
                line: builder.build().context(RecordSnafu)?,
            });
        }

        if let Some(entries) = scaling.get("vNicPerformanceArray").and_then(Value::as_array) {
            debug!("found vNicPerformanceArray");
            for entry in entries {
                writes.push(identified_record(
                    "vNicPerformance",
                    "vnic",
                    "vNicIdentifier",
                    &source,
                    entry,
                )?);
            }
        }
    }

    if header.domain == DOMAIN_FAULT {
        if let Some(fault) = view.fault_fields() {
            info!(
                "fault from {}: alarmCondition={}, specificProblem={}, vfStatus={}",
                source,
                fault.get("alarmCondition").and_then(serde_json::Value::as_str).unwrap_or(""),
                fault.get("specificProblem").and_then(serde_json::Value::as_str).unwrap_or(""),
                fault.get("vfStatus").and_then(serde_json::Value::as_str).unwrap_or(""),
            );
        }
    }

    Ok(writes)
}

/// One record per named group: the group name becomes the measurement,
/// every arrayOfFields entry contributes one field.
fn measurement_group_record(source: &str, group: &Value) -> Result<TimeSeriesWrite> {
    let name = group
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::FieldMissing {
            path: "additionalMeasurements.name".to_string(),
        })?;
    let fields = group
        .get("arrayOfFields")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::FieldMissing {
            path: "additionalMeasurements.arrayOfFields".to_string(),
        })?;

    let mut builder = LineBuilder::new(name).tag("system", source);
    for field in fields {
        let key = field
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::FieldMissing {
                path: "additionalMeasurements.arrayOfFields.name".to_string(),
            })?;
        let value = field.get("value").ok_or_else(|| Error::FieldMissing {
            path: "additionalMeasurements.arrayOfFields.value".to_string(),
        })?;
        builder = builder.field(key, FieldValue::from(value));
    }

    Ok(TimeSeriesWrite {
        event_type: "systemLoad",
        line: builder.build().context(RecordSnafu)?,
    })
}

/// One record per array element: the identifier key becomes the
/// distinguishing tag and is excluded from the field list.
fn identified_record(
    measurement: &'static str,
    tag_key: &'static str,
    id_key: &'static str,
    source: &str,
    entry: &Value,
) -> Result<TimeSeriesWrite> {
    let object = as_object(measurement, entry)?;
    let id = object.get(id_key).ok_or_else(|| Error::FieldMissing {
        path: format!("{}.{}", measurement, id_key),
    })?;

    let mut builder = LineBuilder::new(measurement)
        .tag("system", source)
        .tag(tag_key, tag_value(id));
    for (key, value) in object {
        if key != id_key {
            builder = builder.field(key.as_str(), FieldValue::from(value));
        }
    }

    Ok(TimeSeriesWrite {
        event_type: measurement,
        line: builder.build().context(RecordSnafu)?,
    })
}

fn as_object<'a>(what: &str, entry: &'a Value) -> Result<&'a Map<String, Value>> {
    entry.as_object().ok_or_else(|| Error::FieldType {
        path: what.to_string(),
        expected: "object",
    })
}

fn tag_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The heartbeat system tag is the uppercased reporting entity with any
/// LOCALHOST substring replaced by the compute host alias. This
/// normalization applies to heartbeats only.
fn heartbeat_system(reporting_entity: &str) -> String {
    let agent = reporting_entity.to_uppercase();
    if agent.contains("LOCALHOST") {
        agent.replace("LOCALHOST", "computehost")
    } else {
        agent
    }
}
