//! `pipewright dispatch`: run one function call through the dispatcher.

use std::sync::Arc;

use pipewright_agent::FunctionDispatcher;
use pipewright_core::message::Message;

pub async fn run(json: &str) -> Result<(), Box<dyn std::error::Error>> {
    let dispatcher = FunctionDispatcher::new(Arc::new(pipewright_functions::default_table()?));

    let replies = dispatcher
        .dispatch(&[Message::assistant(json).with_name("assistant")])
        .await;

    for reply in &replies {
        println!("{}", serde_json::to_string_pretty(reply)?);
    }

    Ok(())
}
