//! Fixtures and an in-process scorer for matching tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::matching::models::{
    BatchVerdicts, CandidateProfile, DimensionScores, JobPosting, ScoredJob,
};
use crate::matching::scorer::{BatchScorer, ScoringError};

pub(crate) fn make_job(i: usize) -> JobPosting {
    JobPosting {
        id: format!("job-{i}"),
        company: format!("Company {i}"),
        location: if i % 2 == 0 { "上海" } else { "北京" }.to_string(),
        job_type: "校招".to_string(),
        requirement: "2026届本科及以上，计算机相关专业".to_string(),
        title: format!("后端开发工程师 {i}"),
        updated_at: "2025-09-01".to_string(),
        apply_url: None,
    }
}

pub(crate) fn make_jobs(n: usize) -> Vec<JobPosting> {
    (0..n).map(make_job).collect()
}

pub(crate) fn make_candidate() -> CandidateProfile {
    CandidateProfile {
        name: Some("张三".to_string()),
        education: "本科".to_string(),
        cohort: "2026届".to_string(),
        major: "计算机科学与技术".to_string(),
        target_cities: vec!["上海".to_string()],
        skills: vec!["Rust".to_string(), "Tokio".to_string(), "PostgreSQL".to_string()],
        experience_summary: "分布式存储方向实习六个月".to_string(),
        preference: "后端".to_string(),
        competency_score: 78,
        dimension_scores: DimensionScores {
            education: 80,
            skills: 85,
            projects: 70,
            internships: 75,
            soft_skills: 72,
        },
    }
}

/// Index encoded in a `make_job` id.
pub(crate) fn job_index(id: &str) -> usize {
    id.trim_start_matches("job-").parse().unwrap_or(usize::MAX)
}

/// Deterministic score spread with plenty of ties.
pub(crate) fn default_score(job: &JobPosting) -> u8 {
    ((job_index(&job.id) * 37) % 10 * 10) as u8
}

type ScoreFn = Box<dyn Fn(&JobPosting) -> Option<u8> + Send + Sync>;

/// Scorer that answers locally and records concurrency.
pub(crate) struct FakeScorer {
    score: ScoreFn,
    failing_jobs: HashSet<String>,
    panicking_jobs: HashSet<String>,
    unknown_ids: Vec<String>,
    not_ready: bool,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: AtomicUsize,
    completed: AtomicUsize,
    seen_batches: Mutex<Vec<Vec<String>>>,
}

impl FakeScorer {
    pub(crate) fn new() -> Self {
        Self {
            score: Box::new(|job| Some(default_score(job))),
            failing_jobs: HashSet::new(),
            panicking_jobs: HashSet::new(),
            unknown_ids: Vec::new(),
            not_ready: false,
            delay: Duration::from_millis(5),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            seen_batches: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_score(
        mut self,
        score: impl Fn(&JobPosting) -> Option<u8> + Send + Sync + 'static,
    ) -> Self {
        self.score = Box::new(score);
        self
    }

    /// Any batch containing `job_id` fails terminally.
    pub(crate) fn failing_on(mut self, job_id: &str) -> Self {
        self.failing_jobs.insert(job_id.to_string());
        self
    }

    pub(crate) fn panicking_on(mut self, job_id: &str) -> Self {
        self.panicking_jobs.insert(job_id.to_string());
        self
    }

    /// Every response also carries a verdict for `id`, which no batch contains.
    pub(crate) fn inventing(mut self, id: &str) -> Self {
        self.unknown_ids.push(id.to_string());
        self
    }

    pub(crate) fn unconfigured(mut self) -> Self {
        self.not_ready = true;
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Calls that got past the simulated network delay.
    pub(crate) fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn seen_batches(&self) -> Vec<Vec<String>> {
        self.seen_batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl BatchScorer for FakeScorer {
    fn ensure_ready(&self) -> Result<(), ScoringError> {
        if self.not_ready {
            return Err(ScoringError::Configuration("no API key".to_string()));
        }
        Ok(())
    }

    async fn score_batch(
        &self,
        _candidate: &CandidateProfile,
        jobs: &[JobPosting],
    ) -> Result<BatchVerdicts, ScoringError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_batches
            .lock()
            .unwrap()
            .push(jobs.iter().map(|j| j.id.clone()).collect());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);

        if jobs.iter().any(|j| self.panicking_jobs.contains(&j.id)) {
            panic!("scorer blew up");
        }
        if jobs.iter().any(|j| self.failing_jobs.contains(&j.id)) {
            return Err(ScoringError::TransientCall(
                "LLM call failed after 3 attempts".to_string(),
            ));
        }

        let mut verdicts: Vec<ScoredJob> = jobs
            .iter()
            .filter_map(|job| {
                (self.score)(job).map(|score| ScoredJob {
                    job_id: job.id.clone(),
                    score,
                    reasons: vec![format!("fits {}", job.title)],
                    risks: Vec::new(),
                    tip: "quantify impact".to_string(),
                })
            })
            .collect();
        // Scorers answer in arbitrary order.
        verdicts.reverse();
        for id in &self.unknown_ids {
            verdicts.push(ScoredJob {
                job_id: id.clone(),
                score: 99,
                reasons: Vec::new(),
                risks: Vec::new(),
                tip: String::new(),
            });
        }
        Ok(verdicts.into())
    }
}
