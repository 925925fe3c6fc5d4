//! Generation gateway: the only component that talks to the text-generation
//! backend.
//!
//! Each stage call either returns a schema-valid structured result or the
//! stage's deterministic fallback. Callers never observe a gateway error:
//! backend outages, timeouts, malformed JSON, and schema violations all
//! collapse to the fallback, with the failure logged.

use crate::config::LlmConfig;
use crate::{extractor, prompts, ranker, synthesizer};
use oracle_common::rpc::{RosterEntry, Submission};
use oracle_common::types::{ExtractedMetadata, GuidanceResult, HelperId, KnowledgeEntry, RankingResult};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Pipeline stage identifier, used for logging and per-stage timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extraction,
    Ranking,
    Synthesis,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Extraction => write!(f, "extraction"),
            Self::Ranking => write!(f, "ranking"),
            Self::Synthesis => write!(f, "synthesis"),
        }
    }
}

#[derive(Debug, Error)]
enum GatewayError {
    #[error("generation backend is disabled")]
    Disabled,

    #[error("backend request failed: {0}")]
    Http(String),

    #[error("backend request timed out after {0}s")]
    Timeout(u64),

    #[error("backend returned an empty response")]
    Empty,

    #[error("backend output is not valid JSON: {0}")]
    Json(String),

    #[error("backend output failed schema validation: {0}")]
    Schema(String),
}

pub struct Gateway {
    config: LlmConfig,
    client: reqwest::Client,
}

impl Gateway {
    pub fn new(config: LlmConfig) -> anyhow::Result<Self> {
        // No client-wide timeout; each request carries its stage timeout.
        let client = reqwest::Client::builder().build()?;
        Ok(Self { config, client })
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn stage_timeout(&self, stage: Stage) -> Duration {
        let secs = match stage {
            Stage::Extraction => self.config.extract_timeout_secs,
            Stage::Ranking => self.config.rank_timeout_secs,
            Stage::Synthesis => self.config.synthesize_timeout_secs,
        };
        Duration::from_secs(secs)
    }

    /// One backend round trip: prompt in, parsed JSON document out.
    async fn complete(
        &self,
        stage: Stage,
        system: &str,
        user: &str,
    ) -> Result<serde_json::Value, GatewayError> {
        if !self.config.enabled {
            return Err(GatewayError::Disabled);
        }

        let timeout = self.stage_timeout(stage);
        let body = serde_json::json!({
            "model": self.config.model,
            "prompt": format!("{system}\n\n{user}"),
            "stream": false,
            "format": "json",
            "options": { "num_predict": self.config.max_response_tokens },
        });

        let response = self
            .client
            .post(format!("{}/api/generate", self.config.endpoint))
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout(timeout.as_secs())
                } else {
                    GatewayError::Http(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(GatewayError::Http(format!(
                "HTTP {} from backend",
                response.status()
            )));
        }

        let outer: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Json(e.to_string()))?;
        let text = outer
            .get("response")
            .and_then(|v| v.as_str())
            .ok_or(GatewayError::Empty)?;
        if text.trim().is_empty() {
            return Err(GatewayError::Empty);
        }

        debug!(stage = %stage, bytes = text.len(), "backend responded");
        serde_json::from_str(text).map_err(|e| GatewayError::Json(e.to_string()))
    }

    /// Stage 1: extract structured metadata from the submission.
    pub async fn extract(&self, submission: &Submission) -> ExtractedMetadata {
        let user = prompts::extraction_prompt(submission);
        let result = self
            .complete(Stage::Extraction, prompts::EXTRACTION_SYSTEM, &user)
            .await
            .and_then(|v| extractor::parse_extraction(&v).map_err(GatewayError::Schema));

        match result {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(stage = %Stage::Extraction, error = %e, "using deterministic fallback");
                extractor::fallback(&submission.question_text)
            }
        }
    }

    /// Stage 2: rank the active roster for this request.
    ///
    /// Returns `None` only when the roster is empty, which the orchestrator
    /// rejects before invoking the pipeline.
    pub async fn rank(
        &self,
        metadata: &ExtractedMetadata,
        roster: &[RosterEntry],
        preferred: Option<HelperId>,
    ) -> Option<RankingResult> {
        let user = prompts::ranking_prompt(metadata, roster, preferred);
        let result = self
            .complete(Stage::Ranking, prompts::RANKING_SYSTEM, &user)
            .await
            .and_then(|v| ranker::parse_ranking(&v, roster).map_err(GatewayError::Schema));

        match result {
            Ok(ranking) => Some(ranking),
            Err(e) => {
                warn!(stage = %Stage::Ranking, error = %e, "using deterministic fallback");
                ranker::fallback(roster)
            }
        }
    }

    /// Stage 3: synthesize teaching guidance from the shortlist of similar
    /// prior cases.
    pub async fn synthesize(
        &self,
        question_text: &str,
        metadata: &ExtractedMetadata,
        candidates: &[KnowledgeEntry],
    ) -> GuidanceResult {
        let user = prompts::synthesis_prompt(question_text, metadata, candidates);
        let result = self
            .complete(Stage::Synthesis, prompts::SYNTHESIS_SYSTEM, &user)
            .await
            .and_then(|v| synthesizer::parse_guidance(&v, candidates).map_err(GatewayError::Schema));

        match result {
            Ok(guidance) => guidance,
            Err(e) => {
                warn!(stage = %Stage::Synthesis, error = %e, "using deterministic fallback");
                synthesizer::fallback(candidates)
            }
        }
    }
}
