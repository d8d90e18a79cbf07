//! Callable tools.
//!
//! A [`ServerTool`] pairs the definition advertised in `tools/list` with the
//! handler that runs on `tools/call`. Whether a tool counts as read or write
//! is decided by the toolset it is added to, not by the tool itself.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use gitlab_mcp_core::{Arguments, Result};
use serde_json::{json, Value};

use crate::protocol::{ToolCallResult, ToolDefinition};

/// Executes one tool invocation.
///
/// Returning `Err` with a validation error (see
/// [`gitlab_mcp_core::Error::is_validation`]) is shown to the caller as a
/// tool error; any other `Err` is reported as an internal failure.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, args: Arguments) -> Result<ToolCallResult>;
}

/// Adapter turning an async closure into a [`ToolHandler`].
pub struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> ToolHandler for FnHandler<F>
where
    F: Fn(Arguments) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ToolCallResult>> + Send,
{
    async fn call(&self, args: Arguments) -> Result<ToolCallResult> {
        (self.0)(args).await
    }
}

/// Wrap an async closure as a shareable handler.
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn ToolHandler>
where
    F: Fn(Arguments) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ToolCallResult>> + Send + 'static,
{
    Arc::new(FnHandler(f))
}

/// A tool definition together with its handler.
#[derive(Clone)]
pub struct ServerTool {
    pub definition: ToolDefinition,
    pub handler: Arc<dyn ToolHandler>,
}

impl ServerTool {
    pub fn new(definition: ToolDefinition, handler: Arc<dyn ToolHandler>) -> Self {
        Self {
            definition,
            handler,
        }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }
}

impl fmt::Debug for ServerTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerTool")
            .field("name", &self.definition.name)
            .finish_non_exhaustive()
    }
}

/// Anything that can make tools callable.
pub trait ToolSink {
    /// Register a tool. The server replaces an earlier tool of the same name.
    fn add_tool(&mut self, tool: ServerTool);
}

// Collects in registration order, duplicates included.
impl ToolSink for Vec<ServerTool> {
    fn add_tool(&mut self, tool: ServerTool) {
        self.push(tool);
    }
}

/// Add the standard `page` and `per_page` properties to an object schema.
pub fn with_pagination(mut schema: Value) -> Value {
    let Some(object) = schema.as_object_mut() else {
        return schema;
    };

    let properties = object
        .entry("properties")
        .or_insert_with(|| Value::Object(Default::default()));

    if let Some(properties) = properties.as_object_mut() {
        properties.insert(
            "page".to_string(),
            json!({
                "type": "number",
                "description": "Page number for pagination (min 1)",
                "minimum": 1
            }),
        );
        properties.insert(
            "per_page".to_string(),
            json!({
                "type": "number",
                "description": "Number of items per page (min 1, max 100)",
                "minimum": 1,
                "maximum": 100
            }),
        );
    }

    schema
}
