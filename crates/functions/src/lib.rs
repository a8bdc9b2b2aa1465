//! Built-in functions for chat agents.
//!
//! Functions are invoked by name from JSON emitted by the model, see
//! `pipewright_agent::dispatcher`.

pub mod rag_query;
pub mod weather;

use std::sync::Arc;

use pipewright_core::error::FunctionError;
use pipewright_core::function::FunctionTable;

pub use rag_query::RagPipelineFunc;
pub use weather::GetCurrentWeather;

/// The function table used by the chat agent.
pub fn default_table() -> Result<FunctionTable, FunctionError> {
    Ok(FunctionTable::builder()
        .register(Arc::new(RagPipelineFunc))?
        .register(Arc::new(GetCurrentWeather))?
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_has_both_functions() {
        let table = default_table().unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.contains("get_current_weather"));
        assert!(table.contains("rag_pipeline_func"));
    }

    #[test]
    fn definitions_expose_schemas() {
        let table = default_table().unwrap();
        let defs = table.definitions();
        let weather = defs.iter().find(|d| d.name == "get_current_weather").unwrap();
        assert_eq!(weather.parameters["required"][0], "location");
    }
}
