//! File digest tool definition.
//!
//! Reads a text resource, collapses all whitespace runs into single spaces
//! and clips the result to a character budget.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::domains::resources::ResourceResolver;
use crate::domains::tools::{ToolContext, ToolDefinition, ToolError, ToolParams};

/// Parameters for the file tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FileParams {
    /// Resource file name, relative to the resource directory.
    pub name: String,

    /// Maximum number of characters to return.
    #[serde(default = "default_max_chars")]
    #[schemars(range(min = 1))]
    pub max_chars: i64,
}

fn default_max_chars() -> i64 {
    200
}

impl ToolParams for FileParams {
    fn validate(&self) -> Result<(), ToolError> {
        if self.max_chars < 1 {
            return Err(ToolError::invalid_argument(format!(
                "max_chars must be greater than 0, got {}",
                self.max_chars
            )));
        }
        Ok(())
    }
}

/// Normalized, clipped text of a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FileDigest {
    pub name: String,
    /// Character count of `text`.
    pub chars: usize,
    pub text: String,
}

/// Collapse whitespace and keep at most `max_chars` characters.
pub fn digest_text(text: &str, max_chars: usize) -> String {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    normalized.chars().take(max_chars).collect()
}

pub struct FileTool {
    resolver: ResourceResolver,
}

impl FileTool {
    pub fn new(resolver: ResourceResolver) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl ToolDefinition for FileTool {
    const NAME: &'static str = "file";

    const DESCRIPTION: &'static str = "Whitespace-normalized text of a resource file, clipped to max_chars characters.";

    type Params = FileParams;
    type Output = FileDigest;

    #[instrument(skip_all, fields(name = %params.name))]
    async fn run(&self, params: FileParams, _ctx: &ToolContext) -> Result<FileDigest, ToolError> {
        info!("File tool called for {}", params.name);

        let text = self.resolver.read(&params.name)?;
        let max_chars = usize::try_from(params.max_chars).unwrap_or(usize::MAX);
        let text = digest_text(&text, max_chars);

        Ok(FileDigest {
            name: params.name,
            chars: text.chars().count(),
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::ToolHandler;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn tool_with(name: &str, content: &str) -> (TempDir, FileTool) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(name), content).unwrap();
        let tool = FileTool::new(ResourceResolver::new(dir.path()));
        (dir, tool)
    }

    #[test]
    fn test_digest_text() {
        assert_eq!(digest_text("  a\n\n b\t c  ", 100), "a b c");
        assert_eq!(digest_text("abcdef", 3), "abc");
        assert_eq!(digest_text("", 5), "");
        assert_eq!(digest_text("héllo wörld", 7), "héllo w");
    }

    #[tokio::test]
    async fn test_file_digest() {
        let (_dir, tool) = tool_with("notes.txt", "Line one.\n\n   Line   two.\n");
        let value = tool
            .execute(json!({"name": "notes.txt", "max_chars": 12}), &ToolContext::default())
            .await
            .unwrap();
        assert_eq!(value, json!({"name": "notes.txt", "chars": 12, "text": "Line one. Li"}));
    }

    #[tokio::test]
    async fn test_file_digest_is_idempotent() {
        let (_dir, tool) = tool_with("notes.txt", "some\ttext\nhere ");
        let args = json!({"name": "notes.txt"});
        let first = tool.execute(args.clone(), &ToolContext::default()).await.unwrap();
        let second = tool.execute(args, &ToolContext::default()).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first["text"], "some text here");
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let (_dir, tool) = tool_with("notes.txt", "x");
        let result = tool
            .execute(json!({"name": "other.txt"}), &ToolContext::default())
            .await;
        assert!(matches!(result, Err(ToolError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_rejects_bad_arguments() {
        let (_dir, tool) = tool_with("notes.txt", "x");
        for args in [
            json!({"name": "notes.txt", "max_chars": 0}),
            json!({"name": "../notes.txt"}),
            json!({"max_chars": 5}),
        ] {
            let result = tool.execute(args, &ToolContext::default()).await;
            assert!(matches!(result, Err(ToolError::InvalidArgument(_))));
        }
    }
}
