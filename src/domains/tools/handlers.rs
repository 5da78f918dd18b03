//! Tool handler traits.
//!
//! Every tool is a [`ToolDefinition`]: a typed parameter struct, a typed
//! output struct and an async `run`. The blanket [`ToolHandler`] impl turns
//! any definition into an object-safe handler that works on raw JSON, which
//! is what the registry stores and the dispatcher calls.

use async_trait::async_trait;
use rmcp::{handler::server::tool::cached_schema_for_type, model::Tool};
use schemars::JsonSchema;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use super::error::ToolError;

/// Per-call context handed to every tool.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolContext {
    /// Skip live upstream calls and serve fallback values.
    pub bypass_remote: bool,
}

impl ToolContext {
    pub fn new(bypass_remote: bool) -> Self {
        Self { bypass_remote }
    }
}

/// Parameters accepted by a tool.
///
/// Decoding is done by serde; `validate` covers the bounds serde cannot
/// express.
pub trait ToolParams: DeserializeOwned + JsonSchema + Send + 'static {
    fn validate(&self) -> Result<(), ToolError> {
        Ok(())
    }
}

/// A statically typed tool.
#[async_trait]
pub trait ToolDefinition: Send + Sync + 'static {
    /// Tool name as registered and routed.
    const NAME: &'static str;

    /// Tool description shown to clients.
    const DESCRIPTION: &'static str;

    /// HTTP method for the REST endpoint.
    const HTTP_METHOD: &'static str = "POST";

    type Params: ToolParams;
    type Output: Serialize + JsonSchema + Send + 'static;

    /// Execute the tool on already validated parameters.
    async fn run(&self, params: Self::Params, ctx: &ToolContext) -> Result<Self::Output, ToolError>;

    /// Tool metadata with input and output schemas.
    fn to_tool() -> Tool
    where
        Self: Sized,
    {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<Self::Params>(),
            annotations: None,
            output_schema: Some(cached_schema_for_type::<Self::Output>()),
            icons: None,
            meta: None,
            title: None,
        }
    }
}

/// Object-safe view of a tool, operating on JSON values.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Get the name of this tool.
    fn name(&self) -> &'static str;

    /// HTTP method for the REST endpoint.
    fn http_method(&self) -> &'static str;

    /// Tool metadata for discovery.
    fn descriptor(&self) -> Tool;

    /// Decode, validate and execute.
    async fn execute(&self, arguments: Value, ctx: &ToolContext) -> Result<Value, ToolError>;
}

#[async_trait]
impl<T> ToolHandler for T
where
    T: ToolDefinition,
{
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn http_method(&self) -> &'static str {
        T::HTTP_METHOD
    }

    fn descriptor(&self) -> Tool {
        T::to_tool()
    }

    async fn execute(&self, arguments: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let params: T::Params = parse_arguments(arguments)?;
        params.validate()?;

        let output = self.run(params, ctx).await?;
        serde_json::to_value(output)
            .map_err(|e| ToolError::internal(format!("failed to encode {} output: {}", T::NAME, e)))
    }
}

/// Decode tool arguments. A missing (`null`) argument bag is treated as `{}`.
pub fn parse_arguments<P: DeserializeOwned>(arguments: Value) -> Result<P, ToolError> {
    let arguments = match arguments {
        Value::Null => Value::Object(Default::default()),
        Value::Object(_) => arguments,
        other => {
            return Err(ToolError::invalid_argument(format!(
                "arguments must be a JSON object, got {}",
                json_type_name(&other)
            )));
        }
    };

    serde_json::from_value(arguments).map_err(|e| ToolError::invalid_argument(e.to_string()))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, JsonSchema)]
    struct EchoParams {
        text: String,
        #[serde(default)]
        repeat: u32,
    }

    impl ToolParams for EchoParams {
        fn validate(&self) -> Result<(), ToolError> {
            if self.repeat > 3 {
                return Err(ToolError::invalid_argument("repeat must be at most 3"));
            }
            Ok(())
        }
    }

    #[derive(Debug, Serialize, JsonSchema)]
    struct EchoOutput {
        text: String,
    }

    struct EchoTool;

    #[async_trait]
    impl ToolDefinition for EchoTool {
        const NAME: &'static str = "echo";
        const DESCRIPTION: &'static str = "Echo text back";
        type Params = EchoParams;
        type Output = EchoOutput;

        async fn run(&self, params: EchoParams, _ctx: &ToolContext) -> Result<EchoOutput, ToolError> {
            Ok(EchoOutput {
                text: params.text.repeat(params.repeat.max(1) as usize),
            })
        }
    }

    #[tokio::test]
    async fn test_execute_roundtrip() {
        let result = EchoTool
            .execute(json!({"text": "ab", "repeat": 2}), &ToolContext::default())
            .await
            .unwrap();
        assert_eq!(result, json!({"text": "abab"}));
    }

    #[tokio::test]
    async fn test_execute_rejects_bad_arguments() {
        let ctx = ToolContext::default();
        assert!(matches!(
            EchoTool.execute(json!({}), &ctx).await,
            Err(ToolError::InvalidArgument(_))
        ));
        assert!(matches!(
            EchoTool.execute(json!([1, 2]), &ctx).await,
            Err(ToolError::InvalidArgument(_))
        ));
        assert!(matches!(
            EchoTool.execute(json!({"text": "a", "repeat": 9}), &ctx).await,
            Err(ToolError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_null_arguments_are_empty_object() {
        #[derive(Deserialize)]
        struct NoParams {}
        assert!(parse_arguments::<NoParams>(Value::Null).is_ok());
    }

    #[test]
    fn test_descriptor_has_schemas() {
        let tool = EchoTool.descriptor();
        assert_eq!(tool.name, "echo");
        assert_eq!(EchoTool.http_method(), "POST");
        assert!(tool.input_schema.contains_key("properties"));
        assert!(tool.output_schema.is_some());
    }
}
