//! The story synthesis pipeline.
//!
//! `Generator` turns a `StoryRequest` into a finished `Story`: prompt
//! construction, the completion call, markup cleanup, title extraction,
//! end-marker truncation, a best-effort spelling-correction pass and the
//! Grundwortschatz scan. One generator instance is shared across requests;
//! it holds no mutable state.

use crate::config::Config;
use crate::prompt::{build_prompt, StoryRequest};
use crate::text;
use crate::vocabulary::{VocabularyIndex, GRUNDWORTSCHATZ};
use openai_chat::{Client, Message, Request};
use serde::Serialize;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Sampling temperature for the narrative pass.
const STORY_TEMPERATURE: f32 = 0.8;

/// Sampling temperature for the spelling-correction pass.
const CORRECTION_TEMPERATURE: f32 = 0.2;

/// Errors from story synthesis.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("API request failed: {0}")]
    Api(#[from] openai_chat::Error),

    #[error("no response from API")]
    EmptyCompletion,
}

/// A generated story with usage metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Story {
    pub title: String,
    pub content: String,
    pub grundwortschatz: Vec<String>,
    pub model: String,
    pub provider: String,
    pub tokens_used: usize,
    pub generation_time: f64,
}

/// Handles story generation.
pub struct Generator {
    client: Client,
    config: Config,
    vocabulary_source: String,
    index: VocabularyIndex,
}

impl Generator {
    /// Create a generator from the backend configuration, using the
    /// embedded Grundwortschatz.
    pub fn new(config: &Config) -> Self {
        let client = Client::new(config.api_key.clone())
            .with_base_url(config.base_url.clone())
            .with_model(config.default_model.clone());

        Self {
            client,
            config: config.clone(),
            vocabulary_source: GRUNDWORTSCHATZ.to_string(),
            index: VocabularyIndex::new(GRUNDWORTSCHATZ),
        }
    }

    /// Replace the word-list source, rebuilding the index.
    pub fn with_vocabulary_source(mut self, source: impl Into<String>) -> Self {
        self.vocabulary_source = source.into();
        self.index = VocabularyIndex::new(&self.vocabulary_source);
        self
    }

    /// Run the full synthesis pipeline for one request.
    ///
    /// Cancellation propagates by dropping the returned future; the
    /// in-flight completion call is abandoned and no story is produced.
    pub async fn generate(&self, req: &StoryRequest) -> Result<Story, GenerateError> {
        let start = Instant::now();

        let model = req
            .model
            .clone()
            .unwrap_or_else(|| self.config.default_model.clone());
        let (system_prompt, user_prompt) = build_prompt(req, &self.vocabulary_source);

        let max_tokens = estimate_max_tokens(req.laenge);

        info!(model = %model, laenge = req.laenge, "Story-Generierung gestartet");

        let request = Request::new(vec![
            Message::system(system_prompt),
            Message::user(user_prompt),
        ])
        .with_model(model.clone())
        .with_max_tokens(max_tokens)
        .with_temperature(STORY_TEMPERATURE);

        let response = self.client.complete(request).await?;
        let raw = response
            .first_text()
            .ok_or(GenerateError::EmptyCompletion)?
            .to_string();
        let mut tokens_used = response.usage.total_tokens;

        let cleaned = text::strip_markdown_emphasis(&raw);
        let (title, body) = text::parse_title(&cleaned);
        let mut body = text::truncate_at_end_marker(&body);

        if self.config.spelling_correction {
            match self.correct_spelling(&model, &body, max_tokens).await {
                Ok((corrected, tokens)) => {
                    body = text::strip_markdown_emphasis(corrected.trim());
                    tokens_used += tokens;
                }
                // Correction is best-effort; keep the uncorrected body.
                Err(e) => warn!("Rechtschreibkorrektur fehlgeschlagen: {e}"),
            }
        }

        let grundwortschatz = self.index.find_in_text(&body);
        let generation_time = start.elapsed().as_secs_f64();

        debug!(
            tokens = tokens_used,
            seconds = generation_time,
            "Story-Generierung abgeschlossen"
        );

        Ok(Story {
            title,
            content: body,
            grundwortschatz,
            model,
            provider: self.config.provider.as_str().to_string(),
            tokens_used,
            generation_time,
        })
    }

    /// Second pass that fixes spelling only.
    async fn correct_spelling(
        &self,
        model: &str,
        body: &str,
        max_tokens: usize,
    ) -> Result<(String, usize), GenerateError> {
        let request = Request::new(vec![
            Message::system("Du bist ein sorgfältiger Lektor für Kindergeschichten."),
            Message::user(format!(
                "Korrigiere im folgenden Text ausschließlich Rechtschreib- und Tippfehler. \
                 Ändere nichts an Inhalt, Wortwahl oder Satzbau und verwende keine \
                 Markdown-Formatierung. Gib nur den korrigierten Text zurück:\n\n{body}"
            )),
        ])
        .with_model(model)
        .with_max_tokens(max_tokens)
        .with_temperature(CORRECTION_TEMPERATURE);

        let response = self.client.complete(request).await?;
        let corrected = response
            .first_text()
            .ok_or(GenerateError::EmptyCompletion)?
            .to_string();
        Ok((corrected, response.usage.total_tokens))
    }
}

/// Output-token budget for a requested reading time.
fn estimate_max_tokens(laenge: u32) -> usize {
    (laenge as f64 * 100.0 * 1.3) as usize + 200
}
