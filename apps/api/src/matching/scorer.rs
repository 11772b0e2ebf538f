//! Remote Scoring Client: scores one batch of jobs against a candidate.
//!
//! The orchestration core only sees the `BatchScorer` trait. `LlmBatchScorer`
//! is the production adapter over `LlmClient`; tests plug in in-process fakes.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::llm_client::prompts::{ID_ECHO_INSTRUCTION, JSON_ONLY_SYSTEM};
use crate::llm_client::{LlmClient, LlmError};
use crate::matching::models::{BatchVerdicts, CandidateProfile, JobPosting, ScoredJob, MAX_SCORE};
use crate::matching::prompts::{MATCH_PROMPT_TEMPLATE, MATCH_SYSTEM};

/// Requirement text longer than this is cut before it goes into the prompt.
const MAX_REQUIREMENT_CHARS: usize = 200;
const MAX_EXPERIENCE_CHARS: usize = 600;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Remote scoring call failed: {0}")]
    TransientCall(String),

    #[error("Malformed scoring response: {0}")]
    MalformedResponse(String),

    #[error("Invalid scoring request: {0}")]
    InvalidRequest(String),

    #[error("Scoring task aborted: {0}")]
    Aborted(String),
}

impl From<LlmError> for ScoringError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::MissingApiKey => ScoringError::Configuration(err.to_string()),
            ref e if e.is_malformed() => ScoringError::MalformedResponse(err.to_string()),
            _ => ScoringError::TransientCall(err.to_string()),
        }
    }
}

/// A remote capability that scores a batch of jobs for one candidate.
///
/// Implementations may omit jobs they cannot evaluate. Retries are the
/// implementation's concern; an `Err` is terminal for that batch.
#[async_trait]
pub trait BatchScorer: Send + Sync {
    /// Checked once per run before any batch is dispatched.
    fn ensure_ready(&self) -> Result<(), ScoringError> {
        Ok(())
    }

    async fn score_batch(
        &self,
        candidate: &CandidateProfile,
        jobs: &[JobPosting],
    ) -> Result<BatchVerdicts, ScoringError>;
}

/// Scores batches through the chat-completions API.
pub struct LlmBatchScorer {
    llm: LlmClient,
}

impl LlmBatchScorer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl BatchScorer for LlmBatchScorer {
    fn ensure_ready(&self) -> Result<(), ScoringError> {
        self.llm.ensure_configured().map_err(ScoringError::from)
    }

    async fn score_batch(
        &self,
        candidate: &CandidateProfile,
        jobs: &[JobPosting],
    ) -> Result<BatchVerdicts, ScoringError> {
        if jobs.is_empty() {
            return Err(ScoringError::InvalidRequest(
                "batch must contain at least one job".to_string(),
            ));
        }

        let prompt = build_match_prompt(candidate, jobs)?;
        let system = format!("{MATCH_SYSTEM} {JSON_ONLY_SYSTEM}");
        let response: MatchResponse = self.llm.call_json(&prompt, &system).await?;

        Ok(response.into_verdicts())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Prompt payloads
// ────────────────────────────────────────────────────────────────────────────

/// The candidate fields the scorer needs. Cohort, education and major are always present.
#[derive(Debug, Serialize)]
struct CandidateSummary<'a> {
    cohort: &'a str,
    education: &'a str,
    major: &'a str,
    cities: &'a [String],
    skills: &'a [String],
    experience: String,
    preference: &'a str,
    competency: u8,
}

impl<'a> From<&'a CandidateProfile> for CandidateSummary<'a> {
    fn from(profile: &'a CandidateProfile) -> Self {
        Self {
            cohort: &profile.cohort,
            education: &profile.education,
            major: &profile.major,
            cities: &profile.target_cities,
            skills: &profile.skills,
            experience: truncate_chars(&profile.experience_summary, MAX_EXPERIENCE_CHARS),
            preference: &profile.preference,
            competency: profile.competency_score,
        }
    }
}

/// A job reduced to the fields worth comparing.
#[derive(Debug, Serialize)]
struct JobDigest<'a> {
    id: &'a str,
    title: &'a str,
    company: &'a str,
    city: &'a str,
    #[serde(rename = "type")]
    job_type: &'a str,
    req: String,
}

impl<'a> From<&'a JobPosting> for JobDigest<'a> {
    fn from(job: &'a JobPosting) -> Self {
        Self {
            id: &job.id,
            title: &job.title,
            company: &job.company,
            city: &job.location,
            job_type: &job.job_type,
            req: truncate_chars(&job.requirement, MAX_REQUIREMENT_CHARS),
        }
    }
}

fn build_match_prompt(
    candidate: &CandidateProfile,
    jobs: &[JobPosting],
) -> Result<String, ScoringError> {
    let candidate_json = serde_json::to_string(&CandidateSummary::from(candidate))
        .map_err(|e| ScoringError::InvalidRequest(format!("failed to serialize candidate: {e}")))?;
    let digests: Vec<JobDigest<'_>> = jobs.iter().map(JobDigest::from).collect();
    let jobs_json = serde_json::to_string(&digests)
        .map_err(|e| ScoringError::InvalidRequest(format!("failed to serialize jobs: {e}")))?;

    Ok(MATCH_PROMPT_TEMPLATE
        .replace("{id_echo_instruction}", ID_ECHO_INSTRUCTION)
        .replace("{candidate_json}", &candidate_json)
        .replace("{jobs_json}", &jobs_json))
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}…", &text[..byte_idx]),
        None => text.to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Response schema: { matches: [{ id, s, r[], k[], t }] }
// ────────────────────────────────────────────────────────────────────────────

/// Items are kept as raw values so one bad entry costs only itself.
#[derive(Debug, Deserialize)]
struct MatchResponse {
    matches: Vec<Value>,
}

impl MatchResponse {
    fn into_verdicts(self) -> BatchVerdicts {
        let mut scored = BatchVerdicts::default();
        for item in self.matches {
            match serde_json::from_value::<RemoteMatch>(item) {
                Ok(m) => scored.verdicts.push(m.into()),
                Err(e) => {
                    debug!(error = %e, "skipping unreadable match item");
                    scored.unreadable += 1;
                }
            }
        }
        scored
    }
}

#[derive(Debug, Deserialize)]
struct RemoteMatch {
    #[serde(deserialize_with = "id_as_string")]
    id: String,
    #[serde(deserialize_with = "score_as_f64")]
    s: f64,
    #[serde(default)]
    r: Vec<String>,
    #[serde(default)]
    k: Vec<String>,
    #[serde(default)]
    t: String,
}

impl From<RemoteMatch> for ScoredJob {
    fn from(m: RemoteMatch) -> Self {
        ScoredJob {
            job_id: m.id,
            score: clamp_score(m.s),
            reasons: m.r,
            risks: m.k,
            tip: m.t,
        }
    }
}

/// Models sometimes echo numeric-looking ids as numbers.
fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

/// Accepts `87` and `"87"`. Anything else makes the item unreadable.
fn score_as_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom("score out of range")),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("non-numeric score '{s}'"))),
        other => Err(serde::de::Error::custom(format!(
            "expected numeric score, got {other}"
        ))),
    }
}

fn clamp_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, f64::from(MAX_SCORE)) as u8
}
