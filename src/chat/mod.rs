//! Retrieval-augmented chat chain for the CV chatbot.
//!
//! The language model and the vector store are external services; this
//! module only orchestrates them: condense the follow-up question with the
//! chat history, retrieve passages for the standalone question, and ask the
//! model to answer from those passages.

pub mod prompts;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who sent a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Prefix used when rendering history for the model
    pub fn prefix(&self) -> &'static str {
        match self {
            Role::User => "Human",
            Role::Assistant => "AI",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered conversation so far
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatHistory {
    messages: Vec<ChatMessage>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

/// One line per message, e.g. `Human: hi` / `AI: hello`
impl fmt::Display for ChatHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, m) in self.messages.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {}", m.role.prefix(), m.content)?;
        }
        Ok(())
    }
}

/// A retrieved passage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub page_content: String,
}

impl Document {
    pub fn new(page_content: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
        }
    }
}

/// Text completion service
pub trait LanguageModel: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// Similarity search over the CV knowledge base
pub trait Retriever: Send + Sync {
    fn retrieve(&self, query: &str) -> Result<Vec<Document>>;
}

pub fn combine_documents(docs: &[Document]) -> String {
    docs.iter()
        .map(|d| d.page_content.as_str())
        .collect::<Vec<_>>()
        .join(prompts::DOCUMENT_SEPARATOR)
}

/// Condense → retrieve → answer
pub struct ConversationalChain<L, R> {
    llm: L,
    retriever: R,
    owner: String,
}

impl<L: LanguageModel, R: Retriever> ConversationalChain<L, R> {
    /// `owner` is the person the chatbot speaks for
    pub fn new(llm: L, retriever: R, owner: impl Into<String>) -> Self {
        Self {
            llm,
            retriever,
            owner: owner.into(),
        }
    }

    pub fn condense_question(&self, question: &str, history: &ChatHistory) -> Result<String> {
        let chat_history = history.to_string();
        let prompt = prompts::fill(
            prompts::CONDENSE_QUESTION,
            &[("chat_history", chat_history.as_str()), ("question", question)],
        );
        let standalone = self
            .llm
            .complete(&prompt)
            .context("Failed to condense follow-up question")?;
        Ok(standalone.trim().to_string())
    }

    pub fn ask(&self, question: &str, history: &ChatHistory) -> Result<String> {
        let standalone = self.condense_question(question, history)?;
        tracing::debug!(standalone = %standalone, "Condensed question");

        let docs = self
            .retriever
            .retrieve(&standalone)
            .context("Failed to retrieve context documents")?;
        tracing::debug!("Retrieved {} documents", docs.len());

        let context = combine_documents(&docs);
        let prompt = prompts::fill(
            prompts::ANSWER,
            &[
                ("owner", self.owner.as_str()),
                ("context", context.as_str()),
                ("question", standalone.as_str()),
            ],
        );
        let answer = self
            .llm
            .complete(&prompt)
            .context("Failed to generate answer")?;
        Ok(answer.trim().to_string())
    }
}

/// A conversation with the chain; history only grows on successful turns
pub struct ChatSession<L, R> {
    chain: ConversationalChain<L, R>,
    history: ChatHistory,
}

impl<L: LanguageModel, R: Retriever> ChatSession<L, R> {
    pub fn new(chain: ConversationalChain<L, R>) -> Self {
        Self {
            chain,
            history: ChatHistory::new(),
        }
    }

    pub fn send(&mut self, question: &str) -> Result<String> {
        let answer = self.chain.ask(question, &self.history)?;
        self.history.push(ChatMessage::user(question));
        self.history.push(ChatMessage::assistant(answer.clone()));
        Ok(answer)
    }

    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}
