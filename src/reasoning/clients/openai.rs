//! `OpenAIGenerator` implements [`TextGenerator`] on top of OpenAI's streaming Chat
//! Completions API (or any OpenAI compatible endpoint).
//!
//! The provider streams deltas. They are forwarded as partial chunks, and once the
//! provider stream ends a complete chunk carrying the whole message is emitted, which is
//! the snapshot the loop's [`TextAccumulator`](crate::chunk::TextAccumulator) uses as the
//! round text.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cloudllm_reasoning::clients::openai::OpenAIGenerator;
//! use cloudllm_reasoning::ReasoningLoop;
//!
//! let secret_key = std::env::var("OPEN_AI_SECRET").expect("OPEN_AI_SECRET not set");
//! let generator = OpenAIGenerator::new(&secret_key, "gpt-4.1-mini").with_author("reasoning_agent");
//! let reasoning = ReasoningLoop::new(Arc::new(generator));
//! ```

use crate::reasoning::chunk::{ChunkMetadata, StreamedChunk};
use crate::reasoning::error::{BoxError, GenerationError, ReasoningResult};
use crate::reasoning::generator::{ChunkStream, GenerationRequest, TextGenerator};
use async_stream::stream;
use async_trait::async_trait;
use futures_util::stream::StreamExt;
use lazy_static::lazy_static;
use openai_rust::chat;
use openai_rust2 as openai_rust;
use std::time::Duration;
use uuid::Uuid;

const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

lazy_static! {
    /// One HTTP client for every generator so connections are pooled across rounds.
    static ref SHARED_HTTP_CLIENT: reqwest::Client = reqwest::ClientBuilder::new()
        .pool_idle_timeout(Some(Duration::from_secs(90)))
        .pool_max_idle_per_host(10)
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .timeout(Duration::from_secs(300))
        .build()
        .unwrap_or_else(|err| {
            log::warn!("Falling back to default HTTP client: {}", err);
            reqwest::Client::new()
        });
}

/// Streaming text generator backed by an OpenAI compatible chat endpoint.
pub struct OpenAIGenerator {
    /// Underlying SDK client pointing at the REST endpoint.
    client: openai_rust::Client,
    /// Model name injected into each request.
    model: String,
    /// Value for [`ChunkMetadata::author`] on every emitted chunk.
    author: String,
}

impl OpenAIGenerator {
    /// Construct a generator for api.openai.com.
    pub fn new(secret_key: &str, model: &str) -> Self {
        Self {
            client: openai_rust::Client::new_with_client(secret_key, SHARED_HTTP_CLIENT.clone()),
            model: model.to_string(),
            author: "reasoning_agent".to_string(),
        }
    }

    /// Construct a generator for a custom OpenAI compatible base URL.
    pub fn new_with_base_url(secret_key: &str, model: &str, base_url: &str) -> Self {
        Self {
            client: openai_rust::Client::new_with_client_and_base_url(
                secret_key,
                SHARED_HTTP_CLIENT.clone(),
                base_url,
            ),
            model: model.to_string(),
            author: "reasoning_agent".to_string(),
        }
    }

    /// Override the author recorded in chunk metadata (builder pattern).
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }
}

#[async_trait(?Send)]
impl TextGenerator for OpenAIGenerator {
    async fn generate(&self, request: GenerationRequest) -> ReasoningResult<ChunkStream> {
        let messages = vec![
            chat::Message {
                role: "system".to_owned(),
                content: request.instructions.system,
            },
            chat::Message {
                role: "user".to_owned(),
                content: request.instructions.user,
            },
        ];
        let chat_arguments = chat::ChatArguments::new(&self.model, messages);

        let mut upstream = match self
            .client
            .create_chat_stream(chat_arguments, Some(CHAT_COMPLETIONS_PATH.to_string()))
            .await
        {
            Ok(upstream) => upstream,
            Err(err) => {
                log::error!(
                    "OpenAIGenerator::generate(round {}): OpenAI API Error: {}",
                    request.round,
                    err
                );
                return Err(Box::new(GenerationError(format!("OpenAI API Error: {}", err))));
            }
        };

        let metadata = ChunkMetadata::from_author(self.author.clone())
            .with_invocation_id(Uuid::new_v4().to_string())
            .with_role("model");
        let round = request.round;

        Ok(Box::pin(stream! {
            let mut full_text = String::new();
            while let Some(chunk_result) = upstream.next().await {
                match chunk_result {
                    Ok(chunk) => {
                        let delta = chunk
                            .choices
                            .first()
                            .and_then(|choice| choice.delta.content.clone())
                            .unwrap_or_default();
                        let finish_reason = chunk
                            .choices
                            .first()
                            .and_then(|choice| choice.finish_reason.clone());
                        if let Some(reason) = finish_reason {
                            log::debug!("OpenAIGenerator round {} finished: {}", round, reason);
                        }
                        if delta.is_empty() {
                            continue;
                        }
                        full_text.push_str(&delta);
                        yield Ok(StreamedChunk::partial(delta).with_metadata(metadata.clone()));
                    }
                    Err(err) => {
                        log::error!(
                            "OpenAIGenerator round {}: Stream chunk error: {}",
                            round,
                            err
                        );
                        yield Err(Box::new(GenerationError(format!("Stream chunk error: {}", err))) as BoxError);
                        return;
                    }
                }
            }
            yield Ok(StreamedChunk::complete(full_text).with_metadata(metadata));
        }))
    }
}
