//! The function-calling chat agent.
//!
//! One [`ChatAgent::turn`] appends the user's message, renders the whole
//! log as a transcript and generates. A reply that looks like a JSON
//! function call is dispatched; the call and its result are appended and
//! the model is asked again, up to `max_function_rounds` extra rounds. The
//! final reply is appended to the log and returned.

use std::sync::Arc;

use pipewright_config::AppConfig;
use pipewright_core::error::ProviderError;
use pipewright_core::message::{Message, MessageLog};
use pipewright_core::provider::Provider;
use tracing::{debug, info};

use crate::dispatcher::FunctionDispatcher;
use crate::generation::Generation;
use crate::prompt::{PromptState, compose};

/// Printed when the model returns no replies.
pub const NO_REPLY: &str = "I'm sorry, I couldn't process that.";

/// Result of one chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatTurn {
    /// The assistant's final reply for this turn.
    Reply(String),
    /// The model returned no replies; nothing was appended for it.
    NoReply,
}

impl ChatTurn {
    pub fn text(&self) -> &str {
        match self {
            ChatTurn::Reply(text) => text,
            ChatTurn::NoReply => NO_REPLY,
        }
    }
}

impl std::fmt::Display for ChatTurn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Assistant: {}", self.text())
    }
}

pub struct ChatAgent {
    provider: Arc<dyn Provider>,
    dispatcher: FunctionDispatcher,
    generation: Generation,
    max_function_rounds: u32,
}

impl ChatAgent {
    pub fn new(
        provider: Arc<dyn Provider>,
        dispatcher: FunctionDispatcher,
        generation: Generation,
    ) -> Self {
        Self {
            provider,
            dispatcher,
            generation,
            max_function_rounds: 3,
        }
    }

    pub fn from_config(
        provider: Arc<dyn Provider>,
        dispatcher: FunctionDispatcher,
        config: &AppConfig,
    ) -> Self {
        Self::new(provider, dispatcher, Generation::for_chat(config))
            .with_max_function_rounds(config.chat.max_function_rounds)
    }

    pub fn with_max_function_rounds(mut self, rounds: u32) -> Self {
        self.max_function_rounds = rounds;
        self
    }

    /// A fresh log holding the system prompt.
    pub fn start(system_prompt: impl Into<String>) -> MessageLog {
        MessageLog::with_system(system_prompt)
    }

    pub async fn turn(
        &self,
        log: &mut MessageLog,
        user_input: &str,
    ) -> Result<ChatTurn, ProviderError> {
        log.push(Message::user(user_input).with_name("user"));

        let mut rounds = 0;
        loop {
            let prompt = compose(&PromptState::Chat {
                messages: log.messages(),
            });
            let response = self.provider.complete(self.generation.request(prompt)).await?;

            let Some(reply) = response.replies.into_iter().next() else {
                info!("Generator returned no replies");
                return Ok(ChatTurn::NoReply);
            };

            let assistant = Message::assistant(&reply).with_name("assistant");

            if rounds < self.max_function_rounds && looks_like_function_call(&reply) {
                rounds += 1;
                debug!(round = rounds, "Reply is a function call");
                let result = self.dispatcher.dispatch_one(&assistant).await;
                log.push(assistant);
                log.extend(result);
                continue;
            }

            log.push(assistant);
            return Ok(ChatTurn::Reply(reply));
        }
    }
}

fn looks_like_function_call(reply: &str) -> bool {
    reply.trim_start().starts_with('{')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{SequentialMockProvider, make_empty_response, make_text_response};
    use pipewright_core::message::Role;
    use pipewright_functions::default_table;

    const WEATHER_CALL: &str =
        r#"{"function": {"name": "get_current_weather", "arguments": {"location": "Boston"}}}"#;

    fn agent(provider: Arc<SequentialMockProvider>) -> ChatAgent {
        ChatAgent::new(
            provider,
            FunctionDispatcher::new(Arc::new(default_table().unwrap())),
            Generation::new("gpt-3.5-turbo"),
        )
    }

    #[tokio::test]
    async fn plain_reply_is_appended() {
        let provider = Arc::new(SequentialMockProvider::replies(&["Hello! How can I help?"]));
        let mut log = ChatAgent::start("Be helpful.");

        let turn = agent(provider.clone()).turn(&mut log, "Hi").await.unwrap();

        assert_eq!(turn, ChatTurn::Reply("Hello! How can I help?".into()));
        assert_eq!(turn.to_string(), "Assistant: Hello! How can I help?");
        assert_eq!(log.len(), 3);
        assert_eq!(provider.prompts()[0], "System: Be helpful.\nUser: Hi");
    }

    #[tokio::test]
    async fn function_call_round_trip() {
        let provider = Arc::new(SequentialMockProvider::replies(&[
            WEATHER_CALL,
            "It is sunny in Boston.",
        ]));
        let mut log = ChatAgent::start("Use your tools.");

        let turn = agent(provider.clone())
            .turn(&mut log, "What's the weather in Boston?")
            .await
            .unwrap();

        assert_eq!(turn.text(), "It is sunny in Boston.");
        let roles: Vec<Role> = log.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::Function, Role::Assistant]
        );
        assert!(
            provider.prompts()[1].ends_with("Function: Current weather in Boston is sunny.")
        );
    }

    #[tokio::test]
    async fn function_rounds_are_bounded() {
        let provider = Arc::new(SequentialMockProvider::replies(&[
            WEATHER_CALL,
            WEATHER_CALL,
            WEATHER_CALL,
        ]));
        let mut log = MessageLog::new();

        let turn = agent(provider.clone())
            .with_max_function_rounds(2)
            .turn(&mut log, "Loop forever")
            .await
            .unwrap();

        assert_eq!(provider.call_count(), 3);
        assert_eq!(turn.text(), WEATHER_CALL);
    }

    #[tokio::test]
    async fn json_reply_without_function_key_is_dispatched_as_error() {
        let provider = Arc::new(SequentialMockProvider::replies(&[
            r#"  {"answer": 42}"#,
            "The answer is 42.",
        ]));
        let mut log = MessageLog::new();

        let turn = agent(provider.clone()).turn(&mut log, "Answer in JSON").await.unwrap();

        assert_eq!(turn.text(), "The answer is 42.");
        assert_eq!(provider.call_count(), 2);
        let function = &log.messages()[2];
        assert_eq!(function.role, Role::Function);
        assert_eq!(
            function.content,
            "Error processing function call: missing or ill-typed key 'function'"
        );
        assert!(provider.prompts()[1].ends_with(
            "Function: Error processing function call: missing or ill-typed key 'function'"
        ));
    }

    #[tokio::test]
    async fn no_replies_yields_apology() {
        let provider = Arc::new(SequentialMockProvider::new(vec![make_empty_response()]));
        let mut log = MessageLog::new();

        let turn = agent(provider).turn(&mut log, "Hello?").await.unwrap();

        assert_eq!(turn, ChatTurn::NoReply);
        assert_eq!(turn.to_string(), "Assistant: I'm sorry, I couldn't process that.");
        assert_eq!(log.len(), 1);
    }

    #[tokio::test]
    async fn log_grows_across_turns() {
        let provider = Arc::new(SequentialMockProvider::new(vec![
            make_text_response("first"),
            make_text_response("second"),
        ]));
        let agent = agent(provider.clone());
        let mut log = MessageLog::new();

        agent.turn(&mut log, "one").await.unwrap();
        agent.turn(&mut log, "two").await.unwrap();

        assert_eq!(log.len(), 4);
        assert_eq!(
            provider.prompts()[1],
            "User: one\nAssistant: first\nUser: two"
        );
    }
}
