//! JSON function dispatch.
//!
//! An assistant reply of the form
//!
//! ```json
//! {"function": {"name": "get_current_weather", "arguments": {"location": "Boston"}}}
//! ```
//!
//! is parsed into a [`FunctionCallRequest`], looked up in the
//! [`FunctionTable`] and invoked. The result (or the reason it could not be
//! produced) comes back as a function-role message named
//! [`FUNCTION_CALLER`]. Dispatch never fails past its boundary.

use std::sync::Arc;

use pipewright_core::error::FunctionError;
use pipewright_core::function::{Arguments, FunctionTable};
use pipewright_core::message::{Message, Role};
use serde_json::Value;
use tracing::{debug, warn};

/// Sender name on every message the dispatcher produces.
pub const FUNCTION_CALLER: &str = "function_caller";

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("{0}")]
    InvalidJson(String),

    #[error("missing or ill-typed key '{0}'")]
    MalformedCall(&'static str),

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("{0}")]
    Function(#[from] FunctionError),
}

/// A parsed function call.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCallRequest {
    pub function_name: String,
    pub arguments: Arguments,
}

impl FunctionCallRequest {
    /// Parse assistant content, checking the shape before destructuring.
    ///
    /// `arguments` may also be a JSON-encoded string holding an object, the
    /// form OpenAI-style APIs emit.
    pub fn parse(content: &str) -> Result<Self, DispatchError> {
        let value: Value = serde_json::from_str(content.trim())
            .map_err(|e| DispatchError::InvalidJson(e.to_string()))?;

        let function = value
            .get("function")
            .and_then(Value::as_object)
            .ok_or(DispatchError::MalformedCall("function"))?;

        let function_name = function
            .get("name")
            .and_then(Value::as_str)
            .ok_or(DispatchError::MalformedCall("function.name"))?
            .to_string();

        let arguments = match function.get("arguments") {
            Some(Value::Object(map)) => map.clone(),
            Some(Value::String(encoded)) => match serde_json::from_str::<Value>(encoded) {
                Ok(Value::Object(map)) => map,
                _ => return Err(DispatchError::MalformedCall("function.arguments")),
            },
            _ => return Err(DispatchError::MalformedCall("function.arguments")),
        };

        Ok(Self {
            function_name,
            arguments,
        })
    }
}

/// Routes assistant messages to registered functions.
#[derive(Debug, Clone)]
pub struct FunctionDispatcher {
    table: Arc<FunctionTable>,
}

impl FunctionDispatcher {
    pub fn new(table: Arc<FunctionTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &FunctionTable {
        &self.table
    }

    /// One output per assistant message with content, in input order.
    pub async fn dispatch(&self, messages: &[Message]) -> Vec<Message> {
        let mut replies = Vec::new();
        for message in messages {
            if let Some(reply) = self.dispatch_one(message).await {
                replies.push(reply);
            }
        }
        replies
    }

    /// Dispatch a single message. Non-assistant messages and assistant
    /// messages without content yield nothing; whitespace counts as content.
    pub async fn dispatch_one(&self, message: &Message) -> Option<Message> {
        if message.role != Role::Assistant || message.content.is_empty() {
            return None;
        }

        let content = match self.invoke(&message.content).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "Function call failed");
                format!("Error processing function call: {e}")
            }
        };

        Some(Message::function(FUNCTION_CALLER, content))
    }

    async fn invoke(&self, content: &str) -> Result<String, DispatchError> {
        let request = FunctionCallRequest::parse(content)?;

        if !self.table.contains(&request.function_name) {
            return Err(DispatchError::UnknownFunction(request.function_name));
        }

        debug!(function = %request.function_name, "Invoking function");
        Ok(self
            .table
            .call(&request.function_name, &request.arguments)
            .await?)
    }
}
