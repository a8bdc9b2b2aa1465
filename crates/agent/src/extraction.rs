//! The self-reflecting entity extractor.
//!
//! # Flow
//!
//! 1. Compose the initial extraction prompt from the source text
//! 2. Generate one reply
//! 3. Validate: a reply carrying the terminator is accepted
//! 4. Otherwise log "Reflecting on entities", keep the reply as the pending
//!    candidate and compose the revision prompt; back to 2
//!
//! The loop runs at most `max_loops` generations. When the bound is hit the
//! last candidate is returned as a best-effort result.

use std::collections::HashSet;
use std::sync::Arc;

use pipewright_config::AppConfig;
use pipewright_core::error::ProviderError;
use pipewright_core::provider::Provider;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::generation::Generation;
use crate::prompt::{PromptState, compose};
use crate::reflection::{ReflectionValidator, Verdict};

/// How an extraction run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    /// The model emitted the terminator.
    Accepted,
    /// `max_loops` generations without acceptance.
    Exhausted,
}

/// Result of [`ReflectingExtractor::run`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    /// The accepted entities (terminator removed) or the last candidate.
    pub entities: String,
    pub status: ExtractionStatus,
    /// Generation calls made.
    pub iterations: u32,
}

impl ExtractionOutcome {
    pub fn is_accepted(&self) -> bool {
        self.status == ExtractionStatus::Accepted
    }

    pub fn parse_entities(&self) -> Result<EntitySet, EntityError> {
        EntitySet::parse(&self.entities)
    }
}

/// The three entity categories, schema-checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySet {
    #[serde(rename = "Person")]
    pub person: Vec<String>,
    #[serde(rename = "Location")]
    pub location: Vec<String>,
    #[serde(rename = "Date")]
    pub date: Vec<String>,
}

const CATEGORIES: [&str; 3] = ["Person", "Location", "Date"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntityError {
    #[error("no JSON object found in entities")]
    NoJson,

    #[error("entities are not valid JSON: {0}")]
    InvalidJson(String),

    #[error("missing category '{0}'")]
    MissingCategory(&'static str),

    #[error("unexpected category '{0}'")]
    ExtraCategory(String),

    #[error("category '{0}' must be a list of strings")]
    NotAStringList(&'static str),

    #[error("duplicate entity '{entity}' in '{category}'")]
    Duplicate {
        category: &'static str,
        entity: String,
    },
}

impl EntitySet {
    /// Parse model output. Markdown code fences and text around the JSON
    /// object are ignored.
    pub fn parse(raw: &str) -> Result<Self, EntityError> {
        let start = raw.find('{').ok_or(EntityError::NoJson)?;
        let end = raw.rfind('}').ok_or(EntityError::NoJson)?;
        if end < start {
            return Err(EntityError::NoJson);
        }

        let value: Value = serde_json::from_str(&raw[start..=end])
            .map_err(|e| EntityError::InvalidJson(e.to_string()))?;
        let object = value.as_object().ok_or(EntityError::NoJson)?;

        if let Some(extra) = object.keys().find(|k| !CATEGORIES.contains(&k.as_str())) {
            return Err(EntityError::ExtraCategory(extra.clone()));
        }

        Ok(Self {
            person: string_list(object.get("Person"), "Person")?,
            location: string_list(object.get("Location"), "Location")?,
            date: string_list(object.get("Date"), "Date")?,
        })
    }

    pub fn len(&self) -> usize {
        self.person.len() + self.location.len() + self.date.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn string_list(value: Option<&Value>, category: &'static str) -> Result<Vec<String>, EntityError> {
    let items = value
        .ok_or(EntityError::MissingCategory(category))?
        .as_array()
        .ok_or(EntityError::NotAStringList(category))?;

    let mut seen = HashSet::new();
    let mut list = Vec::with_capacity(items.len());
    for item in items {
        let entity = item.as_str().ok_or(EntityError::NotAStringList(category))?;
        if !seen.insert(entity) {
            return Err(EntityError::Duplicate {
                category,
                entity: entity.to_string(),
            });
        }
        list.push(entity.to_string());
    }
    Ok(list)
}

/// Drives compose → generate → validate rounds.
pub struct ReflectingExtractor {
    provider: Arc<dyn Provider>,
    generation: Generation,
    validator: ReflectionValidator,
    max_loops: u32,
}

impl ReflectingExtractor {
    pub fn new(provider: Arc<dyn Provider>, generation: Generation) -> Self {
        Self {
            provider,
            generation,
            validator: ReflectionValidator::default(),
            max_loops: 10,
        }
    }

    pub fn from_config(provider: Arc<dyn Provider>, config: &AppConfig) -> Self {
        Self::new(provider, Generation::from_config(config))
            .with_validator(ReflectionValidator::from_config(&config.extraction))
            .with_max_loops(config.extraction.max_loops)
    }

    pub fn with_validator(mut self, validator: ReflectionValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Upper bound on generation calls; at least one.
    pub fn with_max_loops(mut self, max_loops: u32) -> Self {
        self.max_loops = max_loops.max(1);
        self
    }

    pub async fn run(&self, text: &str) -> Result<ExtractionOutcome, ProviderError> {
        let mut pending: Option<String> = None;
        let mut iterations = 0;

        info!(max_loops = self.max_loops, "Starting entity extraction");

        while iterations < self.max_loops {
            let prompt = compose(&PromptState::Extraction {
                text,
                pending: pending.as_deref(),
            });

            iterations += 1;
            let response = self.provider.complete(self.generation.request(prompt)).await?;
            let candidate = response.replies.into_iter().next().unwrap_or_default();

            match self.validator.validate(&candidate) {
                Verdict::Accepted(entities) => {
                    info!(iterations, "Entities accepted");
                    return Ok(ExtractionOutcome {
                        entities,
                        status: ExtractionStatus::Accepted,
                        iterations,
                    });
                }
                Verdict::Retry(candidate) => {
                    info!(iteration = iterations, "Reflecting on entities");
                    debug!(candidate = %candidate, "Rejected candidate");
                    pending = Some(candidate);
                }
            }
        }

        warn!(
            max_loops = self.max_loops,
            "Reflection bound reached, returning last candidate"
        );
        Ok(ExtractionOutcome {
            entities: pending.unwrap_or_default(),
            status: ExtractionStatus::Exhausted,
            iterations,
        })
    }
}
