//! Prompt rendering.
//!
//! Every prompt the workflows send is produced by [`compose`] from a
//! [`PromptState`]. Rendering is a pure function of the state: no I/O, no
//! template engine, and the same state always yields the same text.

use pipewright_core::document::Document;
use pipewright_core::message::{Message, Role};
use serde::{Deserialize, Serialize};

/// Everything a prompt can be rendered from.
#[derive(Debug, Clone, Copy)]
pub enum PromptState<'a> {
    /// Entity extraction. `pending` holds the previous round's candidate;
    /// `None` selects the initial template, `Some` the revision template.
    Extraction {
        text: &'a str,
        pending: Option<&'a str>,
    },
    /// A chat transcript.
    Chat { messages: &'a [Message] },
    /// Question answering over retrieved documents.
    Rag {
        template: &'a RagTemplate,
        question: &'a str,
        documents: &'a [Document],
    },
    /// A digest of fetched articles.
    Summary {
        style: SummaryStyle,
        articles: &'a [Document],
    },
}

/// Question-answering prompt variants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RagTemplate {
    /// Answer from the context alone.
    #[default]
    Basic,
    /// Context followed by source URLs; the answer cites the URL and is
    /// written in `language`.
    Cited { language: String },
}

/// Article digest variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStyle {
    #[default]
    Brief,
    WithUrls,
}

pub fn compose(state: &PromptState<'_>) -> String {
    match *state {
        PromptState::Extraction { text, pending: None } => initial_extraction(text),
        PromptState::Extraction {
            text,
            pending: Some(previous),
        } => revise_extraction(text, previous),
        PromptState::Chat { messages } => transcript(messages),
        PromptState::Rag {
            template,
            question,
            documents,
        } => rag(template, question, documents),
        PromptState::Summary { style, articles } => summary(style, articles),
    }
}

fn initial_extraction(text: &str) -> String {
    format!(
        r#"Extract entities from the following text
Text: {text}
The entities should be presented as key-value pairs in a JSON object.
Example:
{{
    "Person": ["value1", "value2"],
    "Location": ["value3", "value4"],
    "Date": ["value5", "value6"]
}}
If there are no possibilities for a particular category, return an empty list for this
category
Entities:"#
    )
}

fn revise_extraction(text: &str, previous: &str) -> String {
    format!(
        r#"Here was the text you were provided:
{text}
Here are the entities you previously extracted:
{previous}
Are these the correct entities?
Things to check for:
- Entity categories should exactly be "Person", "Location" and "Date"
- There should be no extra categories
- There should be no duplicate entities
- If there are no appropriate entities for a category, the category should have an empty list
If you are done say 'DONE' and return your new entities in the next line
If not, simply return the best entities you can come up with.
Entities:"#
    )
}

/// "System: ...", "User: ...", "Assistant: ..." and "Function: ..." lines.
fn transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", role_label(m.role), m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::System => "System",
        Role::User => "User",
        Role::Assistant => "Assistant",
        Role::Function => "Function",
    }
}

fn rag(template: &RagTemplate, question: &str, documents: &[Document]) -> String {
    let mut prompt = String::new();

    match template {
        RagTemplate::Basic => {
            prompt.push_str("Answer the question based on the provided context.\nContext:\n");
            for doc in documents {
                prompt.push_str(&format!("{}\n", doc.content));
            }
            prompt.push_str(&format!("Question: {question}"));
        }
        RagTemplate::Cited { language } => {
            prompt.push_str(
                "You will be provided some context, followed by the URL that this context comes from.\n\
                 Answer the question based on the context, and reference the URL from which your answer is generated.\n",
            );
            prompt.push_str(&format!("Your answer should be in {language}.\nContext:\n"));
            for doc in documents {
                prompt.push_str(&format!(
                    "{}\nURL: {}\n",
                    doc.content,
                    doc.meta_str("url").unwrap_or_default()
                ));
            }
            prompt.push_str(&format!("Question: {question}\nAnswer:"));
        }
    }

    prompt
}

fn summary(style: SummaryStyle, articles: &[Document]) -> String {
    let mut prompt = String::new();

    match style {
        SummaryStyle::Brief => {
            prompt.push_str(
                "You will be provided a few of the top posts in HackerNews.\n\
                 For each post, provide a brief summary if possible.\n\nPosts:\n",
            );
            for article in articles {
                prompt.push_str(&format!("Post:\n{}\n", article.content));
            }
        }
        SummaryStyle::WithUrls => {
            prompt.push_str(
                "You will be provided a few of the top posts in HackerNews, followed by their URL.\n\
                 For each post, provide a brief summary followed by the URL the full post can be found at.\n\nPosts:\n",
            );
            for article in articles {
                prompt.push_str(&format!(
                    "{}\nURL: {}\n",
                    article.content,
                    article.meta_str("url").unwrap_or_default()
                ));
            }
        }
    }

    prompt
}
