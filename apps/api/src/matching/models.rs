//! Data model for a matching run: inputs (job postings, candidate profile),
//! outputs (match outcomes, report) and progress events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Score at or above which a match is a top-tier recommendation.
pub const TOP_TIER_MIN_SCORE: u8 = 85;
/// Score at or above which a match is a second-tier recommendation.
pub const SECOND_TIER_MIN_SCORE: u8 = 70;
/// Upper bound of every score: match scores, competency and dimensions.
pub const MAX_SCORE: u8 = 100;

/// One job posting from the catalog. Read-only to the matching core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    pub id: String,
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub job_type: String,
    #[serde(default)]
    pub requirement: String,
    pub title: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub apply_url: Option<String>,
}

/// Fixed set of sub-dimension scores, each 0–100.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DimensionScores {
    pub education: u8,
    pub skills: u8,
    pub projects: u8,
    pub internships: u8,
    pub soft_skills: u8,
}

/// Structured extraction of a résumé, produced upstream of the matching core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProfile {
    pub name: Option<String>,
    #[serde(default)]
    pub education: String,
    /// Graduation cohort, e.g. "2026届".
    #[serde(default)]
    pub cohort: String,
    #[serde(default)]
    pub major: String,
    #[serde(default)]
    pub target_cities: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience_summary: String,
    #[serde(default)]
    pub preference: String,
    #[serde(default)]
    pub competency_score: u8,
    #[serde(default)]
    pub dimension_scores: DimensionScores,
}

impl CandidateProfile {
    /// True when the extraction produced nothing a scorer could compare against.
    pub fn is_blank(&self) -> bool {
        self.education.trim().is_empty()
            && self.cohort.trim().is_empty()
            && self.major.trim().is_empty()
            && self.experience_summary.trim().is_empty()
            && self.skills.iter().all(|s| s.trim().is_empty())
    }

    /// First score field outside 0–100, as `(field, value)`.
    pub fn out_of_range_score(&self) -> Option<(&'static str, u8)> {
        let d = &self.dimension_scores;
        [
            ("competencyScore", self.competency_score),
            ("dimensionScores.education", d.education),
            ("dimensionScores.skills", d.skills),
            ("dimensionScores.projects", d.projects),
            ("dimensionScores.internships", d.internships),
            ("dimensionScores.softSkills", d.soft_skills),
        ]
        .into_iter()
        .find(|(_, value)| *value > MAX_SCORE)
    }
}

/// Three-level classification derived purely from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationTier {
    Top,
    Second,
    Baseline,
}

impl RecommendationTier {
    pub fn from_score(score: u8) -> Self {
        if score >= TOP_TIER_MIN_SCORE {
            RecommendationTier::Top
        } else if score >= SECOND_TIER_MIN_SCORE {
            RecommendationTier::Second
        } else {
            RecommendationTier::Baseline
        }
    }
}

/// One remote verdict as returned by the scorer, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredJob {
    pub job_id: String,
    pub score: u8,
    pub reasons: Vec<String>,
    pub risks: Vec<String>,
    pub tip: String,
}

/// Everything one scoring call returned for a batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchVerdicts {
    pub verdicts: Vec<ScoredJob>,
    /// Response items that could not be read as a verdict at all.
    pub unreadable: usize,
}

impl From<Vec<ScoredJob>> for BatchVerdicts {
    fn from(verdicts: Vec<ScoredJob>) -> Self {
        Self {
            verdicts,
            unreadable: 0,
        }
    }
}

/// A validated, ranked match between the candidate and one job posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOutcome {
    pub job_id: String,
    pub score: u8,
    pub reasons: Vec<String>,
    pub risks: Vec<String>,
    pub tier: RecommendationTier,
    pub tip: String,
    pub job: JobPosting,
}

/// Contiguous slice of the catalog handled by one scoring call.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub index: usize,
    /// Catalog position of the first job in this batch.
    pub offset: usize,
    pub jobs: Vec<JobPosting>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum BatchStatus {
    /// The scorer answered; `discarded` counts verdicts that failed validation.
    Scored { accepted: usize, discarded: usize },
    /// The scorer failed terminally; the batch contributed nothing.
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub index: usize,
    pub job_count: usize,
    #[serde(flatten)]
    pub status: BatchStatus,
}

/// Everything a caller needs to present or persist one matching run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReport {
    pub run_id: Uuid,
    pub outcomes: Vec<MatchOutcome>,
    pub batches: Vec<BatchSummary>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl MatchReport {
    pub fn failed_batches(&self) -> usize {
        self.batches
            .iter()
            .filter(|b| matches!(b.status, BatchStatus::Failed { .. }))
            .count()
    }
}

/// Messages sent to an optional progress channel during a run.
#[derive(Debug, Clone)]
pub enum MatchEvent {
    Progress {
        completed_batches: usize,
        total_batches: usize,
        outcomes: Vec<MatchOutcome>,
    },
    Completed(MatchReport),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(RecommendationTier::from_score(100), RecommendationTier::Top);
        assert_eq!(RecommendationTier::from_score(85), RecommendationTier::Top);
        assert_eq!(RecommendationTier::from_score(84), RecommendationTier::Second);
        assert_eq!(RecommendationTier::from_score(70), RecommendationTier::Second);
        assert_eq!(RecommendationTier::from_score(69), RecommendationTier::Baseline);
        assert_eq!(RecommendationTier::from_score(0), RecommendationTier::Baseline);
    }

    #[test]
    fn test_tier_is_total_over_all_scores() {
        for score in 0..=u8::MAX {
            let tier = RecommendationTier::from_score(score);
            let expected = match score {
                85..=u8::MAX => RecommendationTier::Top,
                70..=84 => RecommendationTier::Second,
                _ => RecommendationTier::Baseline,
            };
            assert_eq!(tier, expected, "score {score}");
        }
    }

    #[test]
    fn test_tier_serializes_lowercase() {
        let json = serde_json::to_string(&RecommendationTier::Second).unwrap();
        assert_eq!(json, r#""second""#);
    }

    #[test]
    fn test_job_posting_deserializes_camel_case_with_defaults() {
        let json = r#"{
            "id": "j-1",
            "company": "字节跳动",
            "title": "后端开发实习生",
            "jobType": "实习",
            "applyUrl": "https://example.com/apply"
        }"#;
        let job: JobPosting = serde_json::from_str(json).unwrap();
        assert_eq!(job.job_type, "实习");
        assert_eq!(job.apply_url.as_deref(), Some("https://example.com/apply"));
        assert!(job.location.is_empty());
    }

    #[test]
    fn test_blank_profile_detection() {
        assert!(CandidateProfile::default().is_blank());

        let profile = CandidateProfile {
            skills: vec!["Rust".to_string()],
            ..Default::default()
        };
        assert!(!profile.is_blank());

        let whitespace_only = CandidateProfile {
            skills: vec!["  ".to_string()],
            experience_summary: "\n".to_string(),
            ..Default::default()
        };
        assert!(whitespace_only.is_blank());
    }

    #[test]
    fn test_out_of_range_profile_scores_are_reported() {
        let mut profile = CandidateProfile {
            competency_score: 100,
            ..Default::default()
        };
        assert_eq!(profile.out_of_range_score(), None);

        profile.dimension_scores.soft_skills = 101;
        assert_eq!(
            profile.out_of_range_score(),
            Some(("dimensionScores.softSkills", 101))
        );

        profile.competency_score = 255;
        assert_eq!(profile.out_of_range_score(), Some(("competencyScore", 255)));
    }

    #[test]
    fn test_batch_is_empty_tracks_jobs() {
        let batch = Batch {
            index: 0,
            offset: 0,
            jobs: Vec::new(),
        };
        assert!(batch.is_empty());
        assert_eq!(batch.len(), 0);
    }

    #[test]
    fn test_batch_summary_flattens_status() {
        let summary = BatchSummary {
            index: 1,
            job_count: 30,
            status: BatchStatus::Failed {
                error: "timeout".to_string(),
            },
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["error"], "timeout");
        assert_eq!(value["jobCount"], 30);
    }
}
