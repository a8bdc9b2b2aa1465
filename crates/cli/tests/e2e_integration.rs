//! End-to-end integration tests for the Pipewright pipelines.
//!
//! These tests wire the real collaborators together (dispatcher, function
//! table, prompt composer, hashing embedder, in-memory store) and script only
//! the generator.

use std::sync::{Arc, Mutex};

use pipewright_agent::{
    ChatAgent, DocumentSearch, ExtractionStatus, FunctionDispatcher, Generation, IndexingPipeline,
    PromptState, RagPipeline, ReflectingExtractor, compose,
};
use pipewright_core::document::{Document, DocumentStore};
use pipewright_core::error::ProviderError;
use pipewright_core::message::{Message, Role};
use pipewright_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use pipewright_functions::default_table;
use pipewright_providers::HashingEmbedder;
use pipewright_store::InMemoryDocumentStore;

// ── Mock Provider ────────────────────────────────────────────────────────

/// A mock provider that returns scripted replies in sequence.
struct ScriptedProvider {
    replies: Vec<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    fn new(replies: &[&str]) -> Self {
        Self {
            replies: replies.iter().map(|r| r.to_string()).collect(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    fn prompt(&self, index: usize) -> String {
        self.prompts.lock().unwrap()[index].clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut prompts = self.prompts.lock().unwrap();
        let reply = self.replies.get(prompts.len()).cloned().unwrap_or_else(|| {
            panic!(
                "ScriptedProvider exhausted: call #{}, have {}",
                prompts.len(),
                self.replies.len()
            )
        });
        prompts.push(request.prompt);
        Ok(ProviderResponse {
            replies: vec![reply],
            model: "e2e-model".into(),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
        })
    }
}

fn dispatcher() -> FunctionDispatcher {
    FunctionDispatcher::new(Arc::new(default_table().unwrap()))
}

const ISTANBUL: &str = "Istanbul is the largest city in Turkey, straddling the Bosporus Strait, \
    the boundary between Europe and Asia. It is considered the country's economic, cultural and \
    historic capital. Suleiman the Magnificent ruled from the city from 1520 to 1566.";

// ── Reflection loop ──────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_extraction_reflects_then_accepts() {
    let provider = Arc::new(ScriptedProvider::new(&[
        r#"{"Person": ["Suleiman"], "Location": ["Istanbul", "Turkey", "Istanbul"], "Date": []}"#,
        "DONE\n```json\n{\"Person\": [\"Suleiman the Magnificent\"], \
         \"Location\": [\"Istanbul\", \"Turkey\", \"Bosporus Strait\", \"Europe\", \"Asia\"], \
         \"Date\": [\"1520\", \"1566\"]}\n```",
    ]));

    let outcome = ReflectingExtractor::new(provider.clone(), Generation::new("gpt-4o-mini"))
        .run(ISTANBUL)
        .await
        .unwrap();

    assert_eq!(outcome.status, ExtractionStatus::Accepted);
    assert!(outcome.iterations <= 10);
    assert_eq!(provider.calls(), 2);
    assert!(provider.prompt(1).contains("\"Istanbul\", \"Turkey\", \"Istanbul\""));

    let entities = outcome.parse_entities().unwrap();
    assert_eq!(entities.person, vec!["Suleiman the Magnificent"]);
    assert!(entities.location.contains(&"Bosporus Strait".to_string()));
    assert_eq!(entities.date, vec!["1520", "1566"]);
}

#[tokio::test]
async fn e2e_extraction_stops_at_max_loops() {
    let provider = Arc::new(ScriptedProvider::new(&["not yet"; 10]));

    let outcome = ReflectingExtractor::new(provider.clone(), Generation::new("gpt-4o-mini"))
        .run(ISTANBUL)
        .await
        .unwrap();

    assert_eq!(outcome.status, ExtractionStatus::Exhausted);
    assert_eq!(outcome.iterations, 10);
    assert_eq!(provider.calls(), 10);
    assert_eq!(outcome.entities, "not yet");
}

// ── Function dispatch ────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_dispatch_weather_call() {
    let call = Message::assistant(
        r#"{"function": {"name": "get_current_weather", "arguments": {"location": "Boston"}}}"#,
    )
    .with_name("assistant");

    let replies = dispatcher().dispatch(&[call]).await;

    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].role, Role::Function);
    assert_eq!(replies[0].content, "Current weather in Boston is sunny.");
}

#[tokio::test]
async fn e2e_dispatch_malformed_json_yields_one_error() {
    let replies = dispatcher()
        .dispatch(&[Message::assistant("{\"function\": {\"name\": ").with_name("assistant")])
        .await;

    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].role, Role::Function);
    assert!(!replies[0].content.is_empty());
}

#[tokio::test]
async fn e2e_chat_function_round_trip() {
    let provider = Arc::new(ScriptedProvider::new(&[
        r#"{"function": {"name": "get_current_weather", "arguments": {"location": "Boston"}}}"#,
        "It is sunny in Boston today.",
    ]));
    let agent = ChatAgent::new(provider.clone(), dispatcher(), Generation::new("gpt-3.5-turbo"));

    let mut log = ChatAgent::start("You are a helpful assistant.");
    let turn = agent.turn(&mut log, "What's the weather in Boston?").await.unwrap();

    assert_eq!(turn.to_string(), "Assistant: It is sunny in Boston today.");
    let roles: Vec<Role> = log.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![Role::System, Role::User, Role::Assistant, Role::Function, Role::Assistant]
    );
    assert!(provider.prompt(1).contains("Function: Current weather in Boston is sunny."));
}

// ── Prompt composer ──────────────────────────────────────────────────────

#[test]
fn e2e_transcript_rendering() {
    let messages = [Message::system("x"), Message::user("y")];
    assert_eq!(
        compose(&PromptState::Chat {
            messages: &messages
        }),
        "System: x\nUser: y"
    );
}

// ── Retrieval ────────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_rag_over_in_memory_store() {
    let embedder = Arc::new(HashingEmbedder::new(256));
    let store = Arc::new(InMemoryDocumentStore::new());

    let report = IndexingPipeline::new(embedder.clone(), store.clone())
        .index(vec![
            Document::new("Leonardo da Vinci was born in the town of Vinci in Tuscany."),
            Document::new("Haystack pipelines connect components into graphs."),
            Document::new("The Bosporus Strait separates Europe from Asia."),
        ])
        .await
        .unwrap();
    assert_eq!(report.written, 3);
    assert_eq!(store.count().await.unwrap(), 3);

    let provider = Arc::new(ScriptedProvider::new(&["He was born in Vinci."]));
    let answer = RagPipeline::new(
        DocumentSearch::new(embedder, store),
        provider.clone(),
        Generation::new("gpt-4o-mini"),
    )
    .run("Where was Leonardo da Vinci born?")
    .await
    .unwrap();

    assert_eq!(answer.answer, "He was born in Vinci.");
    assert_eq!(answer.documents.len(), 1);
    assert!(answer.documents[0].content.contains("Vinci"));
    assert!(provider.prompt(0).contains("town of Vinci"));
    assert!(provider.prompt(0).ends_with("Question: Where was Leonardo da Vinci born?"));
}
