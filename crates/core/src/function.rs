//! Function trait and the function table used for JSON dispatch.
//!
//! A model asks for a function by name with a JSON object of arguments;
//! the dispatcher looks the name up in a [`FunctionTable`] and invokes it.
//! The table is assembled once through [`FunctionTableBuilder`], which
//! rejects duplicate names, and is immutable afterwards.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::FunctionError;

/// Keyword-style arguments passed to a function.
pub type Arguments = serde_json::Map<String, serde_json::Value>;

/// A function description that can be shown to a model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// The function name
    pub name: String,

    /// Description of what the function does
    pub description: String,

    /// JSON Schema describing the function's parameters
    pub parameters: serde_json::Value,
}

/// A callable registered in a [`FunctionTable`].
#[async_trait]
pub trait Function: Send + Sync {
    /// The unique name of this function (e.g., "get_current_weather").
    fn name(&self) -> &str;

    /// A description of what this function does.
    fn description(&self) -> &str;

    /// JSON Schema describing this function's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Invoke the function and return its result as plain text.
    async fn call(&self, arguments: &Arguments) -> std::result::Result<String, FunctionError>;

    /// Convert this function into a [`FunctionDefinition`].
    fn to_definition(&self) -> FunctionDefinition {
        FunctionDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Read a required string argument.
pub fn required_str<'a>(
    arguments: &'a Arguments,
    key: &str,
) -> std::result::Result<&'a str, FunctionError> {
    match arguments.get(key) {
        Some(serde_json::Value::String(s)) => Ok(s),
        Some(other) => Err(FunctionError::InvalidArguments(format!(
            "'{key}' must be a string, got {other}"
        ))),
        None => Err(FunctionError::InvalidArguments(format!(
            "Missing '{key}' argument"
        ))),
    }
}

/// Collects functions and validates their names.
#[derive(Default)]
pub struct FunctionTableBuilder {
    functions: BTreeMap<String, Arc<dyn Function>>,
}

impl FunctionTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function. Fails if the name is empty or already taken.
    pub fn register(
        mut self,
        function: Arc<dyn Function>,
    ) -> std::result::Result<Self, FunctionError> {
        let name = function.name().trim().to_string();
        if name.is_empty() {
            return Err(FunctionError::InvalidArguments(
                "Function name must not be empty".into(),
            ));
        }
        if self.functions.contains_key(&name) {
            return Err(FunctionError::Duplicate(name));
        }
        self.functions.insert(name, function);
        Ok(self)
    }

    /// Freeze the table.
    pub fn build(self) -> FunctionTable {
        FunctionTable {
            functions: self.functions,
        }
    }
}

/// An immutable name → function mapping.
pub struct FunctionTable {
    functions: BTreeMap<String, Arc<dyn Function>>,
}

impl FunctionTable {
    pub fn builder() -> FunctionTableBuilder {
        FunctionTableBuilder::new()
    }

    /// Look up a function by name.
    pub fn get(&self, name: &str) -> std::result::Result<&Arc<dyn Function>, FunctionError> {
        self.functions
            .get(name)
            .ok_or_else(|| FunctionError::NotFound(name.to_string()))
    }

    /// Look up and invoke a function.
    pub async fn call(
        &self,
        name: &str,
        arguments: &Arguments,
    ) -> std::result::Result<String, FunctionError> {
        self.get(name)?.call(arguments).await
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// All function definitions, sorted by name.
    pub fn definitions(&self) -> Vec<FunctionDefinition> {
        self.functions.values().map(|f| f.to_definition()).collect()
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.functions.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl std::fmt::Debug for FunctionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionTable")
            .field("functions", &self.names())
            .finish()
    }
}
