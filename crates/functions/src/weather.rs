//! Weather lookup function: a fixed-answer stub.
//!
//! Always reports sunshine. It exists so the dispatch and chat loops can
//! be exercised end-to-end without a weather API.

use async_trait::async_trait;
use pipewright_core::error::FunctionError;
use pipewright_core::function::{Arguments, Function, required_str};
use tracing::debug;

pub struct GetCurrentWeather;

#[async_trait]
impl Function for GetCurrentWeather {
    fn name(&self) -> &str {
        "get_current_weather"
    }

    fn description(&self) -> &str {
        "Get the current weather for a location."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "The city name or location to report weather for"
                }
            },
            "required": ["location"]
        })
    }

    async fn call(&self, arguments: &Arguments) -> Result<String, FunctionError> {
        let location = required_str(arguments, "location")?;
        debug!(location, "Weather lookup");
        Ok(format!("Current weather in {location} is sunny."))
    }
}
