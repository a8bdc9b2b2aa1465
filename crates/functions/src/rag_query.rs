//! Knowledge query function: echoes the query back as a stand-in for a
//! retrieval pipeline.

use async_trait::async_trait;
use pipewright_core::error::FunctionError;
use pipewright_core::function::{Arguments, Function, required_str};

pub struct RagPipelineFunc;

#[async_trait]
impl Function for RagPipelineFunc {
    fn name(&self) -> &str {
        "rag_pipeline_func"
    }

    fn description(&self) -> &str {
        "Answer a question from the document knowledge base."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The question to look up"
                }
            },
            "required": ["query"]
        })
    }

    async fn call(&self, arguments: &Arguments) -> Result<String, FunctionError> {
        let query = required_str(arguments, "query")?;
        Ok(format!("RAG pipeline result for query: {query}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echoes_query() {
        let args = serde_json::json!({"query": "Where does Mark live?"})
            .as_object()
            .cloned()
            .unwrap();
        let out = RagPipelineFunc.call(&args).await.unwrap();
        assert_eq!(out, "RAG pipeline result for query: Where does Mark live?");
    }

    #[tokio::test]
    async fn requires_query() {
        let err = RagPipelineFunc.call(&Arguments::new()).await.unwrap_err();
        assert!(err.to_string().contains("query"));
    }
}
