//! `pipewright chat`: interactive or single-message function-calling chat.

use std::io::Write;
use std::sync::Arc;

use pipewright_agent::{ChatAgent, FunctionDispatcher};
use tokio::io::{self, AsyncBufReadExt, BufReader};

use super::load_config;

pub async fn run(message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let provider = pipewright_providers::build_provider(&config)?;
    let dispatcher = FunctionDispatcher::new(Arc::new(pipewright_functions::default_table()?));
    let agent = ChatAgent::from_config(provider, dispatcher, &config);

    let mut log = ChatAgent::start(&config.chat.system_prompt);

    if let Some(msg) = message {
        // Single message mode
        let turn = agent.turn(&mut log, &msg).await?;
        println!("{turn}");
        return Ok(());
    }

    let mut lines = BufReader::new(io::stdin()).lines();

    loop {
        print!("User: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            println!("Exiting chat.");
            break;
        };

        if is_exit(&line) {
            println!("Exiting chat.");
            break;
        }

        match agent.turn(&mut log, line.trim()).await {
            Ok(turn) => println!("{turn}"),
            Err(e) => eprintln!("[Error] {e}"),
        }
    }

    Ok(())
}

fn is_exit(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "exit" | "quit")
}
