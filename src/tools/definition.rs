//! Tool descriptors and their parameter schemas
//!
//! A descriptor serializes to the JSON shape agents discover through
//! `GET /tools`: `{id, name, description, parameters: <json schema>}`.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};

use crate::calculator::type_tag;
use crate::error::{GatewayError, Result};

/// Primitive kind of a tool parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Number,
    String,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::String => "string",
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::Number => value.is_number(),
            Self::String => value.is_string(),
        }
    }
}

/// One declared parameter
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub description: Option<String>,
    pub required: bool,
}

/// Parameter schema of a tool
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSchema {
    fields: Vec<FieldSpec>,
}

impl ParameterSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required field
    pub fn required(mut self, name: &str, kind: FieldKind, description: Option<&str>) -> Self {
        self.fields.push(FieldSpec {
            name: name.to_string(),
            kind,
            description: description.map(String::from),
            required: true,
        });
        self
    }

    /// Add an optional field
    pub fn optional(mut self, name: &str, kind: FieldKind, description: Option<&str>) -> Self {
        self.fields.push(FieldSpec {
            name: name.to_string(),
            kind,
            description: description.map(String::from),
            required: false,
        });
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn required_names(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Render as a JSON-schema object
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            let mut prop = Map::new();
            prop.insert("type".to_string(), Value::String(field.kind.as_str().to_string()));
            if let Some(desc) = &field.description {
                prop.insert("description".to_string(), Value::String(desc.clone()));
            }
            properties.insert(field.name.clone(), Value::Object(prop));
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": self.required_names(),
        })
    }

    /// Check `params` against the schema.
    ///
    /// Required fields must be present with the declared kind; optional fields
    /// may be absent or null. The error reports the observed type of every
    /// declared field.
    pub fn validate(&self, tool_id: &str, params: &Value) -> Result<()> {
        let mismatched = self.fields.iter().any(|field| match params.get(&field.name) {
            None | Some(Value::Null) => field.required,
            Some(value) => !field.kind.accepts(value),
        });

        if !mismatched {
            return Ok(());
        }

        let received: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.name.clone(), Value::String(type_tag(params.get(&f.name)).to_string())))
            .collect();

        Err(GatewayError::InvalidArgument {
            message: format!("Invalid parameters for tool '{}': {}", tool_id, self.describe()),
            received: Some(Value::Object(received)),
        })
    }

    /// Human summary such as `num1: number, num2: number`
    fn describe(&self) -> String {
        self.fields
            .iter()
            .map(|f| {
                let marker = if f.required { "" } else { "?" };
                format!("{}{}: {}", f.name, marker, f.kind.as_str())
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Serialize for ParameterSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json_schema().serialize(serializer)
    }
}

/// A discoverable tool
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    /// Stable id used in `/execute/{id}` and in model decisions
    pub id: String,
    /// Human-readable name
    pub name: String,
    pub description: String,
    pub parameters: ParameterSchema,
}

impl ToolDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            parameters: ParameterSchema::new(),
        }
    }

    /// Set parameter schema
    pub fn with_parameters(mut self, parameters: ParameterSchema) -> Self {
        self.parameters = parameters;
        self
    }

    /// Validate an untyped parameter object for this tool
    pub fn validate(&self, params: &Value) -> Result<()> {
        self.parameters.validate(&self.id, params)
    }
}
