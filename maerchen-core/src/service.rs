//! Request-level orchestration: admission, synthesis, cost settlement.
//!
//! `StoryService` is the surface an HTTP layer calls: it validates the
//! requested length, asks the admission gate, runs the generator and
//! settles the measured provider cost afterwards.

use crate::config::{AiProvider, Config, Limits};
use crate::gate::{Admission, AdmissionGate, GateStats};
use crate::generator::{GenerateError, Generator, Story};
use crate::prompt::StoryRequest;
use std::time::Instant;
use thiserror::Error;
use tracing::info;

/// Errors surfaced to the request handler.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The admission gate refused the request. Carries the user-facing
    /// reason with a retry hint; maps to "too many requests" upstream.
    #[error("{reason}")]
    Denied { reason: String },

    #[error("Länge darf maximal {max} Minuten sein")]
    InvalidLength { max: u32 },

    #[error("Fehler beim Generieren der Geschichte: {0}")]
    Generation(#[from] GenerateError),
}

/// Gate and generator wired together per the service control flow.
pub struct StoryService {
    gate: AdmissionGate,
    generator: Generator,
    provider: AiProvider,
    max_story_length: u32,
}

impl StoryService {
    pub fn new(config: &Config, limits: Limits) -> Self {
        Self {
            max_story_length: limits.max_story_length,
            provider: config.provider,
            generator: Generator::new(config),
            gate: AdmissionGate::new(limits),
        }
    }

    /// Admit, synthesize and settle cost for one request.
    ///
    /// A failed or abandoned generation keeps the optimistic estimate
    /// charged at admission; only a completed one adds its measured cost.
    pub async fn generate(
        &self,
        caller: &str,
        req: &StoryRequest,
    ) -> Result<Story, ServiceError> {
        if req.laenge > self.max_story_length {
            return Err(ServiceError::InvalidLength {
                max: self.max_story_length,
            });
        }

        if let Admission::Denied { reason } = self.gate.check(caller, Instant::now()) {
            info!(caller, "Anfrage abgelehnt: {reason}");
            return Err(ServiceError::Denied { reason });
        }

        let story = self.generator.generate(req).await?;
        self.gate
            .record_additional_cost(self.provider.cost_for_tokens(story.tokens_used));
        Ok(story)
    }

    /// Current gate counters.
    pub fn stats(&self) -> GateStats {
        self.gate.stats()
    }

    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }
}
