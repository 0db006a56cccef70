//! Locates the interesting part of a SOAP response.

use serde_json::{Map, Value};

use super::xml;

/// Key of the fallback mapping that carries the untouched response text.
pub const RAW_RESPONSE_KEY: &str = "raw_response";

/// Ordered candidates tried while walking a parsed response.
///
/// Each list is evaluated front to back and the first hit wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRules {
    pub envelope_keys: Vec<String>,
    pub body_keys: Vec<String>,
    pub payload_keys: Vec<String>,
    /// A body entry whose name contains this marker is itself the payload.
    pub response_marker: String,
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self {
            envelope_keys: strings(&["soap:Envelope", "soap12:Envelope", "Envelope"]),
            body_keys: strings(&["soap:Body", "soap12:Body", "Body"]),
            payload_keys: strings(&["Result", "ResponseValue"]),
            response_marker: "Response".to_string(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Which rule produced the unwrapped value.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// A payload key inside a response element, e.g. `GetStatusResponse/Result`.
    Payload {
        element: String,
        key: String,
        value: Value,
    },
    /// A body entry whose name marks it as the response.
    Response { element: String, value: Value },
    /// Nothing more specific was found.
    Body(Value),
}

impl Extraction {
    pub fn value(&self) -> &Value {
        match self {
            Extraction::Payload { value, .. }
            | Extraction::Response { value, .. }
            | Extraction::Body(value) => value,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Extraction::Payload { value, .. }
            | Extraction::Response { value, .. }
            | Extraction::Body(value) => value,
        }
    }
}

/// Why a response could not be unwrapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnwrapError {
    /// The text is not well-formed XML.
    Malformed(String),
    /// No envelope or no non-empty body under the known keys.
    MissingBody { root_keys: Vec<String> },
    /// The body exists but holds text or a list instead of elements.
    BodyNotMapping(&'static str),
}

impl std::fmt::Display for UnwrapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnwrapError::Malformed(reason) => write!(f, "Malformed XML: {}", reason),
            UnwrapError::MissingBody { root_keys } => {
                write!(f, "No SOAP body found (root keys: {:?})", root_keys)
            }
            UnwrapError::BodyNotMapping(kind) => write!(f, "SOAP body is {}, not a mapping", kind),
        }
    }
}

impl std::error::Error for UnwrapError {}

/// Builds the fallback mapping carrying the untouched response text.
pub fn raw_response(raw: &str) -> Value {
    let mut map = Map::new();
    map.insert(RAW_RESPONSE_KEY.to_string(), Value::String(raw.to_string()));
    Value::Object(map)
}

/// Turns raw SOAP XML into the value a caller cares about.
#[derive(Debug, Clone, Default)]
pub struct ResponseUnwrapper {
    rules: ExtractionRules,
}

impl ResponseUnwrapper {
    pub fn new(rules: ExtractionRules) -> Self {
        Self { rules }
    }

    /// Best-effort unwrap: any failure yields `{"raw_response": xml}`.
    pub fn unwrap(&self, xml: &str) -> Value {
        match self.extract(xml) {
            Ok(extraction) => extraction.into_value(),
            Err(_) => raw_response(xml),
        }
    }

    /// Walks envelope, body and payload rules and reports which one matched.
    pub fn extract(&self, xml: &str) -> Result<Extraction, UnwrapError> {
        let document = xml::parse(xml).map_err(|e| UnwrapError::Malformed(format!("{:#}", e)))?;

        let body = self
            .find_body(&document)
            .ok_or_else(|| UnwrapError::MissingBody {
                root_keys: document
                    .as_object()
                    .map(|m| m.keys().cloned().collect())
                    .unwrap_or_default(),
            })?;

        let entries = match body {
            Value::Object(entries) => entries,
            Value::Array(_) => return Err(UnwrapError::BodyNotMapping("a list")),
            _ => return Err(UnwrapError::BodyNotMapping("text")),
        };

        match self.find_payload(entries) {
            Some(extraction) if !is_empty(extraction.value()) => Ok(extraction),
            _ => Ok(Extraction::Body(body.clone())),
        }
    }

    /// First present body key of each envelope candidate; an empty body moves
    /// on to the next envelope candidate, not to the next body key.
    fn find_body<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        self.rules
            .envelope_keys
            .iter()
            .filter_map(|key| document.get(key))
            .find_map(|envelope| {
                self.rules
                    .body_keys
                    .iter()
                    .find_map(|key| envelope.as_object()?.get(key))
                    .filter(|body| !is_empty(body))
            })
    }

    /// First body entry that matches a rule; later entries are not considered.
    fn find_payload(&self, entries: &Map<String, Value>) -> Option<Extraction> {
        for (element, value) in entries {
            let Some(fields) = value.as_object() else {
                continue;
            };

            if let Some((key, payload)) = self
                .rules
                .payload_keys
                .iter()
                .find_map(|key| fields.get(key).map(|payload| (key, payload)))
            {
                return Some(Extraction::Payload {
                    element: element.clone(),
                    key: key.clone(),
                    value: payload.clone(),
                });
            }

            if element.contains(&self.rules.response_marker) {
                return Some(Extraction::Response {
                    element: element.clone(),
                    value: value.clone(),
                });
            }
        }
        None
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
