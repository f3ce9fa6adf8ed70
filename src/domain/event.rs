use super::order::OrderId;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Where a handler reads the order correlation key from.
///
/// Providers place `custom_id` differently depending on the resource type:
/// capture events carry it at the top level or on the capture resource,
/// checkout orders carry it on each purchase unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationSource {
    /// Top-level `custom_id`, falling back to `resource.custom_id`.
    TopLevel,
    /// First `resource.purchase_units[].custom_id`, falling back to
    /// `resource.custom_id`.
    PurchaseUnits,
}

/// One webhook delivery as received from the payment provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingEvent {
    /// Provider-assigned delivery id.
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    /// Non-string values decode as `""`, which no handler claims.
    #[serde(default, deserialize_with = "string_or_empty")]
    pub event_type: String,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_id: Option<String>,
    #[serde(default, deserialize_with = "object_or_empty")]
    pub resource: Map<String, Value>,
}

impl IncomingEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            id: None,
            event_type: event_type.into(),
            custom_id: None,
            resource: Map::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_custom_id(mut self, custom_id: impl Into<String>) -> Self {
        self.custom_id = Some(custom_id.into());
        self
    }

    /// Replaces the provider payload. Non-object values leave it empty.
    pub fn with_resource(mut self, resource: Value) -> Self {
        self.resource = match resource {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self
    }

    /// The provider id of the resource the event refers to (capture, refund,
    /// checkout order).
    pub fn resource_id(&self) -> Option<&str> {
        self.resource.get("id").and_then(Value::as_str)
    }

    pub fn resource_custom_id(&self) -> Option<String> {
        self.resource.get("custom_id").and_then(scalar_to_string)
    }

    pub fn purchase_unit_custom_id(&self) -> Option<String> {
        self.resource
            .get("purchase_units")
            .and_then(Value::as_array)?
            .iter()
            .find_map(|unit| unit.get("custom_id").and_then(scalar_to_string))
    }

    /// Resolves the order correlation key from `source`.
    ///
    /// Returns `None` when the key is absent or does not coerce to a positive
    /// order id. A present but invalid key does not fall back to the
    /// secondary location.
    pub fn correlation_key(&self, source: CorrelationSource) -> Option<OrderId> {
        let raw = match source {
            CorrelationSource::TopLevel => self
                .custom_id
                .clone()
                .or_else(|| self.resource_custom_id()),
            CorrelationSource::PurchaseUnits => self
                .purchase_unit_custom_id()
                .or_else(|| self.resource_custom_id()),
        };
        raw.as_deref().and_then(OrderId::parse)
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_to_string))
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Ok(s),
        _ => Ok(String::new()),
    }
}

fn object_or_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(map)) => Ok(map),
        _ => Ok(Map::new()),
    }
}
