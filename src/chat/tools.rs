use serde_json::{Map, Value, json};

/// JSON schema primitive types supported for tool parameters.
#[derive(Debug, Clone, Copy)]
pub enum ToolParamType {
    Integer,
    Number,
    String,
    Boolean,
    Object,
    Array,
}

impl ToolParamType {
    fn as_str(&self) -> &'static str {
        match self {
            ToolParamType::Integer => "integer",
            ToolParamType::Number => "number",
            ToolParamType::String => "string",
            ToolParamType::Boolean => "boolean",
            ToolParamType::Object => "object",
            ToolParamType::Array => "array",
        }
    }
}

/// One function parameter definition.
#[derive(Debug, Clone)]
pub struct ToolParam {
    /// Parameter name.
    pub name: String,
    /// Optional human-readable description.
    pub description: Option<String>,
    /// JSON schema type.
    pub kind: ToolParamType,
    /// Whether the parameter is required.
    pub required: bool,
}

impl ToolParam {
    /// Builds a parameter definition.
    pub fn new(
        name: impl Into<String>,
        kind: ToolParamType,
        required: bool,
        description: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description,
            kind,
            required,
        }
    }

    fn required_string(name: &str, description: &str) -> Self {
        Self::new(
            name,
            ToolParamType::String,
            true,
            Some(description.to_string()),
        )
    }
}

/// Callable tool function declaration.
#[derive(Debug, Clone)]
pub struct ToolFunction {
    /// Function name.
    pub name: String,
    /// Function description.
    pub description: String,
    /// Parameter definitions.
    pub params: Vec<ToolParam>,
}

impl ToolFunction {
    /// Creates a function declaration.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params: Vec::new(),
        }
    }

    /// Appends one parameter definition.
    pub fn with_param(mut self, param: ToolParam) -> Self {
        self.params.push(param);
        self
    }

    fn to_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for param in &self.params {
            let mut param_def = Map::new();
            param_def.insert(
                "type".to_string(),
                Value::String(param.kind.as_str().to_string()),
            );
            if let Some(description) = &param.description {
                param_def.insert(
                    "description".to_string(),
                    Value::String(description.clone()),
                );
            }
            properties.insert(param.name.clone(), Value::Object(param_def));
            if param.required {
                required.push(Value::String(param.name.clone()));
            }
        }

        let mut schema = Map::new();
        schema.insert("type".to_string(), Value::String("object".to_string()));
        schema.insert("properties".to_string(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".to_string(), Value::Array(required));
        }
        Value::Object(schema)
    }
}

/// Tool wrapper matching the function-calling schema Ollama accepts.
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    /// Function declaration.
    pub function: ToolFunction,
}

impl ToolDefinition {
    /// Wraps a function declaration as a tool.
    pub fn from_function(function: ToolFunction) -> Self {
        Self { function }
    }

    /// Serializes the tool declaration to JSON.
    pub fn to_json(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.function.name,
                "description": self.function.description,
                "parameters": self.function.to_schema(),
            }
        })
    }
}

/// The fixed storefront tool list advertised to the model.
///
/// These declarations are advertisement only: nothing in this crate executes
/// them when the model asks for a call.
pub fn storefront_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::from_function(
            ToolFunction::new("get_weather", "Get the weather for a given city").with_param(
                ToolParam::required_string("city", "The city to get the weather for"),
            ),
        ),
        ToolDefinition::from_function(
            ToolFunction::new("process_refund", "Process a refund for a customer order")
                .with_param(ToolParam::required_string(
                    "order_id",
                    "The order ID to refund",
                ))
                .with_param(ToolParam::required_string("reason", "Reason for the refund")),
        ),
        ToolDefinition::from_function(
            ToolFunction::new("create_purchase", "Create a new purchase order for a customer")
                .with_param(ToolParam::required_string(
                    "product_id",
                    "The product ID to purchase",
                ))
                .with_param(ToolParam::new(
                    "quantity",
                    ToolParamType::Integer,
                    true,
                    Some("Quantity to purchase".to_string()),
                )),
        ),
    ]
}

/// Tool call emitted by a model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    /// Tool/function name.
    pub name: String,
    /// Arguments payload.
    pub args: Value,
}

/// Extracts tool calls from an assistant message payload.
///
/// Ollama sends arguments as a JSON object; the string-encoded form used by
/// OpenAI-compatible servers is tolerated as well.
pub fn parse_tool_calls(message: &Value) -> Vec<ToolCall> {
    let mut tool_calls = Vec::new();
    if let Some(calls) = message["tool_calls"].as_array() {
        for call in calls {
            let name = call["function"]["name"].as_str().unwrap_or("").to_string();
            let arguments = &call["function"]["arguments"];
            let args = match arguments {
                Value::String(raw) => {
                    serde_json::from_str(raw).unwrap_or(Value::String(raw.clone()))
                }
                other => other.clone(),
            };
            if !name.is_empty() {
                tool_calls.push(ToolCall { name, args });
            }
        }
    }
    tool_calls
}
