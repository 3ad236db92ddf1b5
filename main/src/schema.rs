use std::sync::Arc;

use config::SchemaConfig;
use jsonschema::JSONSchema;
use serde_json::Value;
use trace::{debug, warn};

/// One loaded schema document plus its compile result. Compilation happens
/// once at load; a broken document is kept around so every request that
/// would have used it reports a schema error instead of aborting anything.
pub struct EventSchema {
    document: Value,
    compiled: Result<JSONSchema, String>,
}

impl EventSchema {
    pub fn new(document: Value) -> Self {
        let compiled = JSONSchema::compile(&document).map_err(|e| e.to_string());
        Self { document, compiled }
    }

    pub fn compiled(&self) -> Result<&JSONSchema, &String> {
        self.compiled.as_ref()
    }

    pub fn document(&self) -> &Value {
        &self.document
    }
}

/// The composed schema documents: the event schema (base definitions merged
/// on top), and the throttle / test-control variants built from the event
/// schema with a topic fragment merged over it.
#[derive(Default)]
pub struct SchemaStore {
    event: Option<Arc<EventSchema>>,
    throttle: Option<Arc<EventSchema>>,
    test_control: Option<Arc<EventSchema>>,
}

impl SchemaStore {
    pub fn load(config: &SchemaConfig) -> Self {
        let mut event_document = match read_document(&config.schema_file, "event") {
            Some(document) => document,
            None => {
                warn!("event listener schema not loaded, no validation will be undertaken");
                return Self::default();
            }
        };

        // The topic variants are composed from the event schema as loaded,
        // before the base definitions are merged into it.
        let throttle = read_document(&config.throttle_schema_file, "throttle").map(|fragment| {
            let mut document = event_document.clone();
            merge(&mut document, fragment);
            Arc::new(EventSchema::new(document))
        });
        let test_control =
            read_document(&config.test_control_schema_file, "test control").map(|fragment| {
                let mut document = event_document.clone();
                merge(&mut document, fragment);
                Arc::new(EventSchema::new(document))
            });

        if let Some(base) = read_document(&config.base_schema_file, "base") {
            debug!("updating the event schema with base definitions");
            merge(&mut event_document, base);
        }

        Self {
            event: Some(Arc::new(EventSchema::new(event_document))),
            throttle,
            test_control,
        }
    }

    pub fn event(&self) -> Option<Arc<EventSchema>> {
        self.event.clone()
    }

    pub fn throttle(&self) -> Option<Arc<EventSchema>> {
        self.throttle.clone()
    }

    pub fn test_control(&self) -> Option<Arc<EventSchema>> {
        self.test_control.clone()
    }
}

/// Top-level key update, later keys win. Fragments are whole-key overlays,
/// not deep merges.
fn merge(target: &mut Value, overlay: Value) {
    if let (Value::Object(target), Value::Object(overlay)) = (target, overlay) {
        for (key, value) in overlay {
            target.insert(key, value);
        }
    }
}

fn read_document(path: &str, kind: &str) -> Option<Value> {
    if path.is_empty() {
        return None;
    }
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("{} schema file '{}' not readable: {}", kind, path, e);
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(document) => {
            debug!("loaded the {} schema file '{}'", kind, path);
            Some(document)
        }
        Err(e) => {
            warn!("{} schema file '{}' is not valid JSON: {}", kind, path, e);
            None
        }
    }
}
