//! Declarative input contracts.
//!
//! A [`SchemaNode`] is the single source for both the JSON Schema advertised
//! in `tools/list` and the shape check run before a handler sees a request.

use music_mcp_types::{PropertySchema, ToolInputSchema};
use serde_json::{Map, Value};

use crate::error::ToolError;

/// JSON type of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    String,
    Boolean,
    Number,
    /// A string restricted to the listed values.
    Enum(&'static [&'static str]),
}

/// One named field of a tool's input object.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: &'static str,
    description: &'static str,
    kind: FieldKind,
    required: bool,
    minimum: Option<f64>,
    maximum: Option<f64>,
    default: Option<Value>,
    range_error: Option<(&'static str, &'static str)>,
}

impl FieldSpec {
    fn new(name: &'static str, description: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            description,
            kind,
            required: false,
            minimum: None,
            maximum: None,
            default: None,
            range_error: None,
        }
    }

    pub fn string(name: &'static str, description: &'static str) -> Self {
        Self::new(name, description, FieldKind::String)
    }

    pub fn boolean(name: &'static str, description: &'static str) -> Self {
        Self::new(name, description, FieldKind::Boolean)
    }

    pub fn number(name: &'static str, description: &'static str) -> Self {
        Self::new(name, description, FieldKind::Number)
    }

    pub fn enumeration(
        name: &'static str,
        description: &'static str,
        values: &'static [&'static str],
    ) -> Self {
        Self::new(name, description, FieldKind::Enum(values))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.minimum = Some(min);
        self
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.minimum = Some(min);
        self.maximum = Some(max);
        self
    }

    /// Advertised default, applied by the handler when the field is absent.
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Report out-of-range values with this tag and message instead of the
    /// generic `Invalid arguments`.
    pub fn range_error(mut self, tag: &'static str, message: &'static str) -> Self {
        self.range_error = Some((tag, message));
        self
    }

    fn check(&self, value: &Value) -> Result<(), ToolError> {
        let name = self.name;
        match &self.kind {
            FieldKind::String if !value.is_string() => {
                Err(ToolError::invalid(format!("Field '{name}' must be a string")))
            }
            FieldKind::Boolean if !value.is_boolean() => {
                Err(ToolError::invalid(format!("Field '{name}' must be a boolean")))
            }
            FieldKind::Number => match value.as_f64() {
                Some(number) => self.check_range(number),
                None => Err(ToolError::invalid(format!("Field '{name}' must be a number"))),
            },
            FieldKind::Enum(allowed) => match value.as_str() {
                Some(s) if allowed.contains(&s) => Ok(()),
                _ => Err(ToolError::invalid(format!(
                    "Field '{name}' must be one of: {}",
                    allowed.join(", ")
                ))),
            },
            _ => Ok(()),
        }
    }

    fn check_range(&self, number: f64) -> Result<(), ToolError> {
        let below = self.minimum.is_some_and(|min| number < min);
        let above = self.maximum.is_some_and(|max| number > max);
        if !below && !above {
            return Ok(());
        }
        if let Some((tag, message)) = self.range_error {
            return Err(ToolError::Validation {
                tag: tag.to_string(),
                message: message.to_string(),
            });
        }
        let bounds = match (self.minimum, self.maximum) {
            (Some(min), Some(max)) => format!("between {min} and {max}"),
            (Some(min), None) => format!("at least {min}"),
            (None, Some(max)) => format!("at most {max}"),
            (None, None) => return Ok(()),
        };
        Err(ToolError::invalid(format!(
            "Field '{}' must be {bounds}",
            self.name
        )))
    }

    fn to_property(&self) -> PropertySchema {
        let mut property = match &self.kind {
            FieldKind::String => PropertySchema::string(),
            FieldKind::Boolean => PropertySchema::boolean(),
            FieldKind::Number => PropertySchema::number(),
            FieldKind::Enum(values) => PropertySchema::string().enum_values(values.to_vec()),
        }
        .description(self.description);
        if let Some(min) = self.minimum {
            property = property.min(min);
        }
        if let Some(max) = self.maximum {
            property = property.max(max);
        }
        if let Some(default) = &self.default {
            property = property.default_value(default.clone());
        }
        property
    }
}

/// Input contract of one tool: an object with named fields.
#[derive(Debug, Clone, Default)]
pub struct SchemaNode {
    fields: Vec<FieldSpec>,
}

impl SchemaNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Check `arguments` against the contract.
    ///
    /// `null` is read as an empty object, unknown fields are kept but never
    /// checked, and an optional field set to `null` counts as absent.
    pub fn validate(&self, arguments: &Value) -> Result<Map<String, Value>, ToolError> {
        let arguments = match arguments {
            Value::Null => Map::new(),
            Value::Object(map) => map.clone(),
            _ => return Err(ToolError::invalid("Arguments must be an object")),
        };

        for field in &self.fields {
            match arguments.get(field.name) {
                None | Some(Value::Null) if field.required => {
                    return Err(ToolError::invalid(format!(
                        "Missing required field '{}'",
                        field.name
                    )));
                }
                None | Some(Value::Null) => {}
                Some(value) => field.check(value)?,
            }
        }
        Ok(arguments)
    }

    /// Render as the JSON Schema advertised in `tools/list`.
    pub fn to_input_schema(&self) -> ToolInputSchema {
        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
            .collect();
        self.fields
            .iter()
            .fold(ToolInputSchema::object(), |schema, field| {
                schema.property(field.name, field.to_property())
            })
            .required(required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const MODES: &[&str] = &["off", "one", "all"];

    fn schema() -> SchemaNode {
        SchemaNode::new()
            .field(FieldSpec::string("query", "Search text").required())
            .field(
                FieldSpec::number("volume", "Volume level")
                    .range(0.0, 100.0)
                    .range_error("Invalid volume range", "Volume must be between 0 and 100"),
            )
            .field(FieldSpec::number("limit", "Result cap").range(1.0, 100.0))
            .field(FieldSpec::number("position", "Seconds").min(0.0))
            .field(FieldSpec::enumeration("repeatMode", "Repeat", MODES))
            .field(FieldSpec::boolean("shuffle", "Shuffle").default_value(json!(false)))
    }

    fn message(result: Result<Map<String, Value>, ToolError>) -> String {
        result.unwrap_err().to_string()
    }

    #[test]
    fn accepts_valid_arguments_and_keeps_unknown_fields() {
        let args = json!({"query": "Abbey", "volume": 40, "extra": [1, 2]});
        let validated = schema().validate(&args).unwrap();
        assert_eq!(validated.get("extra"), Some(&json!([1, 2])));
    }

    #[test]
    fn null_arguments_are_an_empty_object() {
        let schema = SchemaNode::new().field(FieldSpec::string("name", "Name"));
        assert!(schema.validate(&Value::Null).unwrap().is_empty());
    }

    #[test]
    fn rejects_non_objects() {
        assert_eq!(
            message(schema().validate(&json!(["query"]))),
            "Arguments must be an object"
        );
    }

    #[test]
    fn rejects_missing_and_null_required_fields() {
        assert_eq!(
            message(schema().validate(&json!({}))),
            "Missing required field 'query'"
        );
        assert_eq!(
            message(schema().validate(&json!({"query": null}))),
            "Missing required field 'query'"
        );
    }

    #[test]
    fn rejects_wrong_types() {
        let cases = [
            (json!({"query": 5}), "Field 'query' must be a string"),
            (json!({"query": "a", "volume": "loud"}), "Field 'volume' must be a number"),
            (json!({"query": "a", "limit": "ten"}), "Field 'limit' must be a number"),
            (json!({"query": "a", "shuffle": "yes"}), "Field 'shuffle' must be a boolean"),
        ];
        for (args, expected) in cases {
            assert_eq!(message(schema().validate(&args)), expected);
        }
    }

    #[test]
    fn rejects_values_outside_enum() {
        assert_eq!(
            message(schema().validate(&json!({"query": "a", "repeatMode": "twice"}))),
            "Field 'repeatMode' must be one of: off, one, all"
        );
    }

    #[test]
    fn range_errors_use_custom_tag_when_declared() {
        let err = schema()
            .validate(&json!({"query": "a", "volume": 150}))
            .unwrap_err();
        assert_eq!(err.tag(), "Invalid volume range");
        assert_eq!(err.to_string(), "Volume must be between 0 and 100");

        let err = schema()
            .validate(&json!({"query": "a", "limit": 0}))
            .unwrap_err();
        assert_eq!(err.tag(), "Invalid arguments");
        assert_eq!(err.to_string(), "Field 'limit' must be between 1 and 100");

        assert_eq!(
            message(schema().validate(&json!({"query": "a", "position": -1}))),
            "Field 'position' must be at least 0"
        );
    }

    #[test]
    fn numbers_accept_integral_floats() {
        let args = json!({"query": "a", "limit": 5.0, "volume": 12.5});
        assert!(schema().validate(&args).is_ok());
    }

    #[test]
    fn bounds_are_inclusive() {
        let args = json!({"query": "a", "volume": 100, "limit": 1, "position": 0});
        assert!(schema().validate(&args).is_ok());
    }

    #[test]
    fn renders_json_schema() {
        let rendered = serde_json::to_value(schema().to_input_schema()).unwrap();
        assert_eq!(rendered["type"], "object");
        assert_eq!(rendered["required"], json!(["query"]));
        assert_eq!(rendered["properties"]["volume"]["maximum"], json!(100.0));
        assert_eq!(rendered["properties"]["limit"]["type"], "number");
        assert_eq!(rendered["properties"]["repeatMode"]["enum"], json!(MODES));
        assert_eq!(rendered["properties"]["shuffle"]["default"], json!(false));

        let input_schema = schema().to_input_schema();
        let order: Vec<_> = input_schema.properties.keys().map(String::as_str).collect();
        assert_eq!(
            order,
            vec!["query", "volume", "limit", "position", "repeatMode", "shuffle"]
        );
    }
}
